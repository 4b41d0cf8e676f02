//! Reads a full system description from a TOML file
//!
//! ```toml
//! [lattice]
//! vectors = [[1.0]]
//!
//! [[lattice.sublattices]]
//! name = "A"
//! position = [0.0]
//!
//! [[lattice.sublattices]]
//! name = "B"
//! position = [0.5]
//!
//! [[lattice.hoppings]]
//! relative_index = [0]
//! from = "A"
//! to = "B"
//! energy = -1.0
//!
//! [configuration]
//! divisions = [1]
//! length = [256]
//! boundaries = ["periodic"]
//!
//! [[calculation.dos]]
//! num_points = 1000
//! num_moments = 512
//! num_random = 1
//! ```
//!
//! Energies are given as a real number, a `[re, im]` pair, or a matrix whose elements are either.
//! Each calculation kind is an array of tables, but only one entry per kind is accepted.

use super::{
    Arpes, Boundary, Calculation, Conductivity, Configuration, Direction, Disorder, Distribution,
    Dos, GaussianWavePacket, Ldos, Modification, NonlinearConductivity, Placement, Precision,
    SingleShotConductivity, Spectrum, SpectrumKind, StructuralDisorder, Vertex,
};
use crate::error::{ConfigurationError, ExportError, ReaderError};
use config::{Config, File, FileFormat};
use kite_lattice::{Energy, Lattice};
use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Real(f64),
    Complex([f64; 2]),
}

impl From<RawScalar> for Complex64 {
    fn from(value: RawScalar) -> Self {
        match value {
            RawScalar::Real(re) => Complex64::new(re, 0_f64),
            RawScalar::Complex([re, im]) => Complex64::new(re, im),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawEnergy {
    Scalar(RawScalar),
    Matrix(Vec<Vec<RawScalar>>),
}

impl RawEnergy {
    fn into_energy(self, context: &str) -> Result<Energy, ReaderError> {
        match self {
            RawEnergy::Scalar(value) => Ok(Complex64::from(value).into()),
            RawEnergy::Matrix(rows) => {
                let num_rows = rows.len();
                let num_cols = rows.first().map(Vec::len).unwrap_or(0);
                if num_rows == 0 || rows.iter().any(|row| row.len() != num_cols) {
                    return Err(ReaderError::Value {
                        context: context.to_string(),
                        message: "energy matrix rows must be non-empty and of equal length".into(),
                    });
                }
                let values = rows
                    .into_iter()
                    .flatten()
                    .map(Complex64::from)
                    .collect::<Vec<_>>();
                Ok(DMatrix::from_row_slice(num_rows, num_cols, &values).into())
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

fn one_disorder_realisation() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct RawSublattice {
    name: String,
    position: Vec<f64>,
    energy: Option<RawEnergy>,
}

#[derive(Debug, Deserialize)]
struct RawAlias {
    name: String,
    original: String,
    position: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawHoppingEnergy {
    name: String,
    energy: RawEnergy,
}

#[derive(Debug, Deserialize)]
struct RawHopping {
    relative_index: Vec<i32>,
    from: String,
    to: String,
    energy: Option<RawEnergy>,
    /// Name of a registered hopping energy
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLattice {
    vectors: Vec<Vec<f64>>,
    #[serde(default)]
    sublattices: Vec<RawSublattice>,
    #[serde(default)]
    aliases: Vec<RawAlias>,
    #[serde(default)]
    hopping_energies: Vec<RawHoppingEnergy>,
    #[serde(default)]
    hoppings: Vec<RawHopping>,
}

impl RawLattice {
    fn build(self) -> Result<Lattice, ExportError> {
        let rows = self.vectors.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let mut lattice = Lattice::from_rows(&rows)?;
        for sublattice in self.sublattices {
            let energy = match sublattice.energy {
                Some(energy) => {
                    energy.into_energy(&format!("onsite energy of `{}`", sublattice.name))?
                }
                None => 0_f64.into(),
            };
            lattice.add_sublattice(&sublattice.name, &sublattice.position, energy)?;
        }
        for alias in self.aliases {
            lattice.add_alias(&alias.name, &alias.original, &alias.position)?;
        }
        for family in self.hopping_energies {
            let energy = family
                .energy
                .into_energy(&format!("hopping energy `{}`", family.name))?;
            lattice.register_hopping_energy(&family.name, energy)?;
        }
        for hopping in self.hoppings {
            let context = format!("hopping `{}` -> `{}`", hopping.from, hopping.to);
            match (hopping.energy, hopping.family) {
                (Some(energy), None) => {
                    let energy = energy.into_energy(&context)?;
                    lattice.add_hopping(&hopping.relative_index, &hopping.from, &hopping.to, energy)?
                }
                (None, Some(family)) => lattice.add_hopping(
                    &hopping.relative_index,
                    &hopping.from,
                    &hopping.to,
                    family,
                )?,
                _ => {
                    return Err(ReaderError::Value {
                        context,
                        message: "give exactly one of `energy` or `family`".into(),
                    }
                    .into())
                }
            };
        }
        Ok(lattice)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
    divisions: Vec<usize>,
    length: Vec<usize>,
    boundaries: Option<Vec<String>>,
    /// Twist angle of each twisted boundary, indexed by lattice vector
    twists: Option<Vec<f64>>,
    #[serde(default)]
    is_complex: bool,
    precision: Option<Precision>,
    spectrum_range: Option<[f64; 2]>,
    #[serde(default)]
    custom_local_energy: bool,
    #[serde(default)]
    print_custom_local_energy: bool,
}

impl RawConfiguration {
    fn build(self) -> Result<Configuration, ConfigurationError> {
        let mut builder = Configuration::builder()
            .with_divisions(&self.divisions)
            .with_length(&self.length)
            .with_complex(self.is_complex)
            .with_precision(self.precision.unwrap_or(Precision::Double))
            .with_custom_local_energy(self.custom_local_energy, self.print_custom_local_energy);
        if let Some(modes) = self.boundaries {
            let twists = self.twists.unwrap_or_default();
            let boundaries = modes
                .iter()
                .enumerate()
                .map(|(index, mode)| {
                    Boundary::parse(mode, twists.get(index).copied()).map_err(|e| match e {
                        ConfigurationError::MissingTwistAngle(_) => {
                            ConfigurationError::MissingTwistAngle(index)
                        }
                        e => e,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder.with_boundaries(&boundaries);
        }
        if let Some([minimum, maximum]) = self.spectrum_range {
            builder = builder.with_spectrum_range(minimum, maximum);
        }
        builder.build()
    }
}

#[derive(Debug, Deserialize)]
struct RawDos {
    num_points: usize,
    num_moments: usize,
    num_random: usize,
    #[serde(default = "one_disorder_realisation")]
    num_disorder: usize,
}

#[derive(Debug, Deserialize)]
struct RawLdos {
    energy: OneOrMany<f64>,
    num_moments: usize,
    position: Vec<Vec<i64>>,
    sublattice: OneOrMany<String>,
    #[serde(default = "one_disorder_realisation")]
    num_disorder: usize,
}

#[derive(Debug, Deserialize)]
struct RawArpes {
    k_vector: Vec<Vec<f64>>,
    weight: Vec<RawScalar>,
    num_moments: usize,
    #[serde(default = "one_disorder_realisation")]
    num_disorder: usize,
}

#[derive(Debug, Deserialize)]
struct RawWavePacket {
    num_points: usize,
    num_moments: usize,
    timestep: f64,
    k_vector: Vec<Vec<f64>>,
    spinor: Vec<Vec<RawScalar>>,
    width: f64,
    mean_value: Vec<f64>,
    #[serde(default)]
    probing_point: Vec<Vec<f64>>,
    #[serde(default = "one_disorder_realisation")]
    num_disorder: usize,
}

#[derive(Debug, Deserialize)]
struct RawConductivity {
    direction: String,
    num_points: usize,
    num_moments: usize,
    num_random: usize,
    #[serde(default = "one_disorder_realisation")]
    num_disorder: usize,
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    special: i32,
}

#[derive(Debug, Deserialize)]
struct RawSingleShot {
    energy: OneOrMany<f64>,
    direction: String,
    eta: OneOrMany<f64>,
    num_moments: OneOrMany<usize>,
    num_random: usize,
    #[serde(default = "one_disorder_realisation")]
    num_disorder: usize,
    #[serde(default)]
    preserve_disorder: Option<OneOrMany<bool>>,
}

#[derive(Debug, Deserialize)]
struct RawOperator {
    name: String,
    lattice: RawLattice,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawSpectrum {
    Full {
        kind: SpectrumKind,
        num_moments: usize,
        num_points: usize,
    },
    SingleShot {
        kind: SpectrumKind,
        energy: OneOrMany<f64>,
        eta: OneOrMany<f64>,
        num_moments: OneOrMany<usize>,
    },
}

#[derive(Debug, Deserialize)]
struct RawVertex {
    /// One list of operator couples per spectrum, a single name is paired with the identity
    operators: Vec<Vec<Vec<String>>>,
    spectra: Vec<RawSpectrum>,
    num_random: usize,
    #[serde(default = "one_disorder_realisation")]
    num_disorder: usize,
    #[serde(default)]
    preserve_disorder: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawCalculation {
    #[serde(default)]
    dos: Vec<RawDos>,
    #[serde(default)]
    ldos: Vec<RawLdos>,
    #[serde(default)]
    arpes: Vec<RawArpes>,
    #[serde(default)]
    gaussian_wave_packet: Vec<RawWavePacket>,
    #[serde(default)]
    conductivity_dc: Vec<RawConductivity>,
    #[serde(default)]
    conductivity_optical: Vec<RawConductivity>,
    #[serde(default)]
    conductivity_optical_nonlinear: Vec<RawConductivity>,
    #[serde(default)]
    singleshot_conductivity_dc: Vec<RawSingleShot>,
    #[serde(default)]
    operators: Vec<RawOperator>,
    vertex: Option<RawVertex>,
}

impl RawCalculation {
    fn build(self) -> Result<Calculation, ExportError> {
        let mut calculation = Calculation::new();
        for request in self.dos {
            calculation.dos(Dos {
                num_points: request.num_points,
                num_moments: request.num_moments,
                num_random: request.num_random,
                num_disorder: request.num_disorder,
            })?;
        }
        for request in self.ldos {
            calculation.ldos(Ldos::new(
                request.energy.into_vec(),
                request.num_moments,
                request.position,
                request.sublattice.into_vec(),
                request.num_disorder,
            )?)?;
        }
        for request in self.arpes {
            calculation.arpes(Arpes {
                k_vectors: request.k_vector,
                weights: request.weight.into_iter().map(Complex64::from).collect(),
                num_moments: request.num_moments,
                num_disorder: request.num_disorder,
            })?;
        }
        for request in self.gaussian_wave_packet {
            // an omitted probing point is the origin
            let probing_points = if request.probing_point.is_empty() {
                vec![vec![0_f64; request.mean_value.len()]]
            } else {
                request.probing_point
            };
            calculation.gaussian_wave_packet(GaussianWavePacket {
                num_points: request.num_points,
                num_moments: request.num_moments,
                timestep: request.timestep,
                k_vectors: request.k_vector,
                spinors: request
                    .spinor
                    .into_iter()
                    .map(|spinor| spinor.into_iter().map(Complex64::from).collect())
                    .collect(),
                width: request.width,
                mean_value: request.mean_value,
                probing_points,
                num_disorder: request.num_disorder,
            })?;
        }
        for request in self.conductivity_dc {
            calculation.conductivity_dc(linear_conductivity(request)?)?;
        }
        for request in self.conductivity_optical {
            calculation.conductivity_optical(linear_conductivity(request)?)?;
        }
        for request in self.conductivity_optical_nonlinear {
            calculation.conductivity_optical_nonlinear(NonlinearConductivity {
                direction: Direction::nonlinear(&request.direction)?,
                num_points: request.num_points,
                num_moments: request.num_moments,
                num_random: request.num_random,
                num_disorder: request.num_disorder,
                temperature: request.temperature,
                special: request.special,
            })?;
        }
        for request in self.singleshot_conductivity_dc {
            calculation.singleshot_conductivity_dc(SingleShotConductivity::new(
                request.energy.into_vec(),
                request.eta.into_vec(),
                request.num_moments.into_vec(),
                request
                    .preserve_disorder
                    .map(OneOrMany::into_vec)
                    .unwrap_or_else(|| vec![false]),
                Direction::single_shot(&request.direction)?,
                request.num_random,
                request.num_disorder,
            )?)?;
        }
        for operator in self.operators {
            let lattice = operator.lattice.build()?;
            calculation.add_operator(&operator.name, lattice)?;
        }
        if let Some(vertex) = self.vertex {
            let operators = vertex
                .operators
                .iter()
                .map(|couples| {
                    couples
                        .iter()
                        .map(|couple| match couple.as_slice() {
                            [first] => calculation.operator_pair(first, None),
                            [first, second] => calculation.operator_pair(first, Some(second.as_str())),
                            _ => Err(crate::error::CalculationError::InconsistentLengths {
                                context: "vertex operator couples",
                            }),
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?;
            let spectra = vertex
                .spectra
                .into_iter()
                .map(|spectrum| match spectrum {
                    RawSpectrum::Full {
                        kind,
                        num_moments,
                        num_points,
                    } => Ok(Spectrum::Full {
                        kind,
                        num_moments,
                        num_points,
                    }),
                    RawSpectrum::SingleShot {
                        kind,
                        energy,
                        eta,
                        num_moments,
                    } => Spectrum::single_shot(
                        kind,
                        energy.into_vec(),
                        eta.into_vec(),
                        num_moments.into_vec(),
                    ),
                })
                .collect::<Result<Vec<_>, _>>()?;
            calculation.vertex(Vertex::new(
                operators,
                spectra,
                vertex.num_random,
                vertex.num_disorder,
                vertex.preserve_disorder,
            )?)?;
        }
        Ok(calculation)
    }
}

fn linear_conductivity(request: RawConductivity) -> Result<Conductivity, ExportError> {
    Ok(Conductivity {
        direction: Direction::linear(&request.direction)?,
        num_points: request.num_points,
        num_moments: request.num_moments,
        num_random: request.num_random,
        num_disorder: request.num_disorder,
        temperature: request.temperature,
    })
}

#[derive(Debug, Default, Deserialize)]
struct RawModification {
    magnetic_field: Option<f64>,
    flux: Option<f64>,
}

impl RawModification {
    fn build(self) -> Result<Option<Modification>, ReaderError> {
        match (self.magnetic_field, self.flux) {
            (Some(field), None) => Ok(Some(Modification::MagneticField(field))),
            (None, Some(flux)) => Ok(Some(Modification::Flux(flux))),
            (None, None) => Ok(None),
            (Some(_), Some(_)) => Err(ReaderError::Value {
                context: "modification".into(),
                message: "give either `magnetic_field` or `flux`, not both".into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDisorder {
    sublattice: String,
    distribution: String,
    mean: OneOrMany<f64>,
    stdev: OneOrMany<f64>,
}

#[derive(Debug, Deserialize)]
struct RawBond {
    from_offset: Vec<i32>,
    from: String,
    to_offset: Vec<i32>,
    to: String,
    energy: RawEnergy,
}

#[derive(Debug, Deserialize)]
struct RawOnsite {
    offset: Vec<i32>,
    sublattice: String,
    energy: RawEnergy,
}

#[derive(Debug, Deserialize)]
struct RawStructuralDisorder {
    concentration: Option<f64>,
    positions: Option<Vec<Vec<i64>>>,
    #[serde(default)]
    vacancies: Vec<String>,
    #[serde(default)]
    bonds: Vec<RawBond>,
    #[serde(default)]
    onsite: Vec<RawOnsite>,
}

impl RawStructuralDisorder {
    fn build(self, lattice: &Lattice) -> Result<StructuralDisorder, ExportError> {
        let placement = match (self.concentration, self.positions) {
            (Some(concentration), None) => Placement::Concentration(concentration),
            (None, Some(positions)) => Placement::Positions(positions),
            _ => {
                return Err(ReaderError::Value {
                    context: "structural disorder".into(),
                    message: "give exactly one of `concentration` or `positions`".into(),
                }
                .into())
            }
        };
        let mut disorder = StructuralDisorder::new(lattice, placement)?;
        for vacancy in self.vacancies {
            disorder.add_vacancy(&vacancy)?;
        }
        for bond in self.bonds {
            let energy = bond
                .energy
                .into_energy(&format!("structural bond `{}` -> `{}`", bond.from, bond.to))?;
            disorder.add_bond(&bond.from_offset, &bond.from, &bond.to_offset, &bond.to, energy)?;
        }
        for onsite in self.onsite {
            let energy = onsite
                .energy
                .into_energy(&format!("structural onsite `{}`", onsite.sublattice))?;
            disorder.add_onsite(&onsite.offset, &onsite.sublattice, energy)?;
        }
        Ok(disorder)
    }
}

#[derive(Debug, Deserialize)]
struct RawSystem {
    lattice: RawLattice,
    configuration: RawConfiguration,
    #[serde(default)]
    calculation: RawCalculation,
    #[serde(default)]
    modification: RawModification,
    #[serde(default)]
    disorder: Vec<RawDisorder>,
    #[serde(default)]
    structural_disorder: Vec<RawStructuralDisorder>,
}

#[derive(Debug)]
/// Everything needed for an export, as read from disk
pub struct SystemDescription {
    pub lattice: Lattice,
    pub configuration: Configuration,
    pub calculation: Calculation,
    pub modification: Option<Modification>,
    pub disorder: Option<Disorder>,
    pub structural_disorder: Vec<StructuralDisorder>,
}

impl SystemDescription {
    /// Read and validate the system described in the TOML file at `path`
    pub fn build(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let raw: RawSystem = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(ReaderError::from)?;
        raw.build()
    }

    /// Read and validate a system described by a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ExportError> {
        let raw: RawSystem = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(ReaderError::from)?;
        raw.build()
    }
}

impl RawSystem {
    fn build(self) -> Result<SystemDescription, ExportError> {
        let lattice = self.lattice.build()?;
        let configuration = self.configuration.build()?;
        let calculation = self.calculation.build()?;
        let modification = self.modification.build()?;

        let disorder = if self.disorder.is_empty() {
            None
        } else {
            let mut disorder = Disorder::new(&lattice);
            for entry in self.disorder {
                let distribution = entry.distribution.parse::<Distribution>()?;
                disorder.add_disorder(
                    &entry.sublattice,
                    distribution,
                    &entry.mean.into_vec(),
                    &entry.stdev.into_vec(),
                )?;
            }
            Some(disorder)
        };
        let structural_disorder = self
            .structural_disorder
            .into_iter()
            .map(|raw| raw.build(&lattice))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Read a {}D lattice with {} orbitals",
            lattice.ndim(),
            lattice.num_orbitals()
        );
        Ok(SystemDescription {
            lattice,
            configuration,
            calculation,
            modification,
            disorder,
            structural_disorder,
        })
    }
}
