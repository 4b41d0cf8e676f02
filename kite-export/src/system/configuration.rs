//! Numerical configuration of the simulated system
//!
//! The configuration fixes the size of the sample in unit cells, its decomposition into domains for
//! the engine's threads, the boundary conditions and the numerical type of the Hamiltonian. The
//! energy scale is either given through `spectrum_range` or estimated during the export.

use crate::error::ConfigurationError;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Boundary condition along one lattice vector
pub enum Boundary {
    Open,
    Periodic,
    /// Periodic with a fixed twist angle in radians
    Twisted(f64),
    /// Periodic with a twist angle drawn at random by the engine
    RandomTwist,
}

impl Boundary {
    /// The engine's code for the boundary mode
    pub fn code(&self) -> u32 {
        match self {
            Boundary::Open => 0,
            Boundary::Periodic | Boundary::Twisted(_) => 1,
            Boundary::RandomTwist => 2,
        }
    }

    pub fn twist(&self) -> f64 {
        match self {
            Boundary::Twisted(angle) => *angle,
            _ => 0_f64,
        }
    }

    /// Parse a boundary mode, `twisted` requires an angle
    pub fn parse(mode: &str, angle: Option<f64>) -> Result<Self, ConfigurationError> {
        match mode.to_lowercase().as_str() {
            "open" => Ok(Boundary::Open),
            "periodic" => Ok(Boundary::Periodic),
            "twisted" => angle
                .map(Boundary::Twisted)
                .ok_or(ConfigurationError::MissingTwistAngle(0)),
            "random" => Ok(Boundary::RandomTwist),
            _ => Err(ConfigurationError::UnknownBoundary(mode.to_string())),
        }
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Boundary::Open => write!(f, "Open"),
            Boundary::Periodic => write!(f, "Periodic"),
            Boundary::Twisted(angle) => write!(f, "Fixed Twisted ({})", angle),
            Boundary::RandomTwist => write!(f, "Random Twisted"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
/// Floating point precision of the engine
pub enum Precision {
    Single,
    Double,
    /// Long double in the engine, written as double precision
    Extended,
}

impl Precision {
    pub fn code(&self) -> u32 {
        match self {
            Precision::Single => 0,
            Precision::Double => 1,
            Precision::Extended => 2,
        }
    }
}

impl TryFrom<u32> for Precision {
    type Error = ConfigurationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Precision::Single),
            1 => Ok(Precision::Double),
            2 => Ok(Precision::Extended),
            _ => Err(ConfigurationError::UnknownPrecision(value)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    divisions: Vec<usize>,
    length: Vec<usize>,
    boundaries: Vec<Boundary>,
    is_complex: bool,
    precision: Precision,
    spectrum_range: Option<[f64; 2]>,
    custom_local_energy: bool,
    print_custom_local_energy: bool,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder<(), ()> {
        ConfigurationBuilder::default()
    }

    /// Number of domains along each lattice vector
    pub fn divisions(&self) -> &[usize] {
        &self.divisions
    }

    /// Number of unit cells along each lattice vector
    pub fn length(&self) -> &[usize] {
        &self.length
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn is_complex(&self) -> bool {
        self.is_complex
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn spectrum_range(&self) -> Option<[f64; 2]> {
        self.spectrum_range
    }

    pub fn custom_local_energy(&self) -> bool {
        self.custom_local_energy
    }

    pub fn print_custom_local_energy(&self) -> bool {
        self.print_custom_local_energy
    }

    /// Check the per-dimension arrays against the dimension of the lattice
    pub fn check_dimension(&self, dim: usize) -> Result<(), ConfigurationError> {
        for (context, found) in [
            ("length", self.length.len()),
            ("boundaries", self.boundaries.len()),
            ("divisions", self.divisions.len()),
        ] {
            if found != dim {
                return Err(ConfigurationError::DimensionMismatch {
                    context,
                    expected: dim,
                    found,
                });
            }
        }
        Ok(())
    }

    /// A copy with the complex flag switched on
    pub(crate) fn into_complex(self) -> Self {
        Self {
            is_complex: true,
            ..self
        }
    }
}

/// Builder for a `Configuration`, the divisions and length are required
pub struct ConfigurationBuilder<RefDivisions, RefLength> {
    divisions: RefDivisions,
    length: RefLength,
    boundaries: Option<Vec<Boundary>>,
    is_complex: bool,
    precision: Precision,
    spectrum_range: Option<[f64; 2]>,
    custom_local_energy: bool,
    print_custom_local_energy: bool,
}

impl Default for ConfigurationBuilder<(), ()> {
    fn default() -> Self {
        Self {
            divisions: (),
            length: (),
            boundaries: None,
            is_complex: false,
            precision: Precision::Double,
            spectrum_range: None,
            custom_local_energy: false,
            print_custom_local_energy: false,
        }
    }
}

impl<RefDivisions, RefLength> ConfigurationBuilder<RefDivisions, RefLength> {
    /// Attach the number of domains along each lattice vector
    pub fn with_divisions(self, divisions: &[usize]) -> ConfigurationBuilder<Vec<usize>, RefLength> {
        ConfigurationBuilder {
            divisions: divisions.to_vec(),
            length: self.length,
            boundaries: self.boundaries,
            is_complex: self.is_complex,
            precision: self.precision,
            spectrum_range: self.spectrum_range,
            custom_local_energy: self.custom_local_energy,
            print_custom_local_energy: self.print_custom_local_energy,
        }
    }

    /// Attach the number of unit cells along each lattice vector
    pub fn with_length(self, length: &[usize]) -> ConfigurationBuilder<RefDivisions, Vec<usize>> {
        ConfigurationBuilder {
            divisions: self.divisions,
            length: length.to_vec(),
            boundaries: self.boundaries,
            is_complex: self.is_complex,
            precision: self.precision,
            spectrum_range: self.spectrum_range,
            custom_local_energy: self.custom_local_energy,
            print_custom_local_energy: self.print_custom_local_energy,
        }
    }

    /// Boundary conditions, periodic along every lattice vector when not given
    pub fn with_boundaries(mut self, boundaries: &[Boundary]) -> Self {
        self.boundaries = Some(boundaries.to_vec());
        self
    }

    pub fn with_complex(mut self, is_complex: bool) -> Self {
        self.is_complex = is_complex;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Fix the spectrum to `[minimum, maximum]` in eV instead of estimating it
    pub fn with_spectrum_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.spectrum_range = Some([minimum, maximum]);
        self
    }

    /// Let the engine read a custom local potential, and optionally print it back
    pub fn with_custom_local_energy(mut self, custom: bool, print: bool) -> Self {
        self.custom_local_energy = custom;
        self.print_custom_local_energy = print;
        self
    }
}

impl ConfigurationBuilder<Vec<usize>, Vec<usize>> {
    pub fn build(self) -> Result<Configuration, ConfigurationError> {
        if self.divisions.iter().any(|x| *x == 0) {
            return Err(ConfigurationError::NonPositive("divisions"));
        }
        if self.length.iter().any(|x| *x == 0) {
            return Err(ConfigurationError::NonPositive("length"));
        }
        if let Some([minimum, maximum]) = self.spectrum_range {
            if !(minimum < maximum) {
                return Err(ConfigurationError::InvalidSpectrumRange { minimum, maximum });
            }
        }
        for (index, (length, divisions)) in self.length.iter().zip(&self.divisions).enumerate() {
            if length % divisions != 0 {
                tracing::info!(
                    "The length {} along lattice vector {} is not a multiple of its {} divisions",
                    length,
                    index,
                    divisions
                );
            }
        }
        let boundaries = self
            .boundaries
            .unwrap_or_else(|| vec![Boundary::Periodic; self.length.len()]);

        Ok(Configuration {
            divisions: self.divisions,
            length: self.length,
            boundaries,
            is_complex: self.is_complex,
            precision: self.precision,
            spectrum_range: self.spectrum_range,
            custom_local_energy: self.custom_local_energy,
            print_custom_local_energy: self.print_custom_local_energy,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
/// The configuration as it was exported: the complex flag may have been switched on, and the energy
/// scale and shift are resolved
pub struct ResolvedConfiguration {
    configuration: Configuration,
    energy_scale: f64,
    energy_shift: f64,
    estimated: bool,
}

impl ResolvedConfiguration {
    pub(crate) fn new(
        configuration: Configuration,
        energy_scale: f64,
        energy_shift: f64,
        estimated: bool,
    ) -> Self {
        Self {
            configuration,
            energy_scale,
            energy_shift,
            estimated,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn is_complex(&self) -> bool {
        self.configuration.is_complex
    }

    pub fn energy_scale(&self) -> f64 {
        self.energy_scale
    }

    pub fn energy_shift(&self) -> f64 {
        self.energy_shift
    }

    /// True when the scale came from the spectral bound estimate rather than the user
    pub fn is_estimated(&self) -> bool {
        self.estimated
    }

    /// Map an energy in eV into the rescaled spectrum
    pub fn rescale(&self, energy: f64) -> f64 {
        (energy - self.energy_shift) / self.energy_scale
    }
}
