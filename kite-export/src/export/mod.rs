//! Export module
//!
//! Assembles the complete input of the engine for a system: the global geometry, the Hamiltonian with
//! its disorder and magnetic field, and the requested calculations. The export is built in memory by
//! the `ExportBuilder`
//!
//! ```ignore
//! let export = ExportBuilder::new()
//!     .with_lattice(&lattice)
//!     .with_configuration(&configuration)
//!     .with_calculation(&calculation)
//!     .with_disorder(&disorder)
//!     .build()?;
//! export.write("config.h5")?;
//! ```
//!
//! and every check runs before the file is created, so a failed export never leaves a partial file.
//! The caller's configuration is not modified, the energy scale and shift chosen for the export and
//! the final complex flag are available from `Export::resolved`.

mod calculation;
mod consistency;
mod disorder;
mod geometry;
mod magnetic;
mod operators;
mod scaling;

use crate::constants::SAFETY_FACTOR;
use crate::container::{Container, Group};
use crate::error::{ContainerError, ExportError};
use crate::hamiltonian::HamiltonianBuilder;
use crate::spectral::{EstimateBounds, GershgorinEstimator};
use crate::system::{
    Calculation, Configuration, Disorder, Modification, Precision, ResolvedConfiguration,
    StructuralDisorder,
};
use kite_lattice::Lattice;
use ndarray::{Array, Dimension};
use num_complex::{Complex32, Complex64};
use std::path::Path;

/// Write energies at the numerical type of the export: complex or real, in single precision or double
pub(crate) fn write_weights<D: Dimension>(
    group: &mut Group,
    name: &str,
    weights: Array<Complex64, D>,
    resolved: &ResolvedConfiguration,
) -> Result<(), ContainerError> {
    let single = resolved.configuration().precision() == Precision::Single;
    match (resolved.is_complex(), single) {
        (true, true) => group.write_array(name, weights.mapv(|w| Complex32::new(w.re as f32, w.im as f32))),
        (true, false) => group.write_array(name, weights),
        (false, true) => group.write_array(name, weights.mapv(|w| w.re as f32)),
        (false, false) => group.write_array(name, weights.mapv(|w| w.re)),
    }
}

#[derive(Clone, Debug)]
/// An assembled export, ready to be persisted
pub struct Export {
    container: Container,
    resolved: ResolvedConfiguration,
}

impl Export {
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The configuration as exported, with the energy scale and shift chosen for the system
    pub fn resolved(&self) -> &ResolvedConfiguration {
        &self.resolved
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        Ok(self.container.write(path)?)
    }
}

/// Builder for an `Export`. The lattice, configuration and calculation are required.
pub struct ExportBuilder<'a, RefLattice, RefConfiguration, RefCalculation> {
    lattice: RefLattice,
    configuration: RefConfiguration,
    calculation: RefCalculation,
    modification: Option<&'a Modification>,
    disorder: Option<&'a Disorder>,
    structural_disorder: &'a [StructuralDisorder],
    estimator: &'a dyn EstimateBounds,
    safety_factor: f64,
}

impl<'a> Default for ExportBuilder<'a, (), (), ()> {
    fn default() -> Self {
        Self {
            lattice: (),
            configuration: (),
            calculation: (),
            modification: None,
            disorder: None,
            structural_disorder: &[],
            estimator: &GershgorinEstimator,
            safety_factor: SAFETY_FACTOR,
        }
    }
}

impl<'a> ExportBuilder<'a, (), (), ()> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a, RefLattice, RefConfiguration, RefCalculation>
    ExportBuilder<'a, RefLattice, RefConfiguration, RefCalculation>
{
    pub fn with_lattice(
        self,
        lattice: &'a Lattice,
    ) -> ExportBuilder<'a, &'a Lattice, RefConfiguration, RefCalculation> {
        ExportBuilder {
            lattice,
            configuration: self.configuration,
            calculation: self.calculation,
            modification: self.modification,
            disorder: self.disorder,
            structural_disorder: self.structural_disorder,
            estimator: self.estimator,
            safety_factor: self.safety_factor,
        }
    }

    pub fn with_configuration(
        self,
        configuration: &'a Configuration,
    ) -> ExportBuilder<'a, RefLattice, &'a Configuration, RefCalculation> {
        ExportBuilder {
            lattice: self.lattice,
            configuration,
            calculation: self.calculation,
            modification: self.modification,
            disorder: self.disorder,
            structural_disorder: self.structural_disorder,
            estimator: self.estimator,
            safety_factor: self.safety_factor,
        }
    }

    pub fn with_calculation(
        self,
        calculation: &'a Calculation,
    ) -> ExportBuilder<'a, RefLattice, RefConfiguration, &'a Calculation> {
        ExportBuilder {
            lattice: self.lattice,
            configuration: self.configuration,
            calculation,
            modification: self.modification,
            disorder: self.disorder,
            structural_disorder: self.structural_disorder,
            estimator: self.estimator,
            safety_factor: self.safety_factor,
        }
    }

    /// Apply a perpendicular magnetic field
    pub fn with_modification(mut self, modification: &'a Modification) -> Self {
        self.modification = Some(modification);
        self
    }

    pub fn with_disorder(mut self, disorder: &'a Disorder) -> Self {
        self.disorder = Some(disorder);
        self
    }

    pub fn with_structural_disorder(mut self, structural_disorder: &'a [StructuralDisorder]) -> Self {
        self.structural_disorder = structural_disorder;
        self
    }

    /// Replace the estimator used when the configuration has no spectrum range
    pub fn with_estimator(mut self, estimator: &'a dyn EstimateBounds) -> Self {
        self.estimator = estimator;
        self
    }

    /// Fraction of `[-1, 1]` the estimated spectrum is mapped onto
    pub fn with_safety_factor(mut self, safety_factor: f64) -> Self {
        self.safety_factor = safety_factor;
        self
    }
}

impl<'a> ExportBuilder<'a, &'a Lattice, &'a Configuration, &'a Calculation> {
    #[tracing::instrument(name = "Export builder", level = "info", skip(self))]
    pub fn build(self) -> Result<Export, ExportError> {
        let lattice = self.lattice;
        let calculation = self.calculation;
        consistency::check_disorder(lattice, self.disorder, self.structural_disorder)?;
        let modification = self.modification.filter(|modification| {
            let applied = modification.is_applied();
            if !applied {
                tracing::info!("Ignoring {:?}, it leaves the system unchanged", modification);
            }
            applied
        });
        let configuration =
            consistency::resolve(lattice, self.configuration, calculation, modification)?;
        let resolved = scaling::resolve(
            configuration,
            lattice,
            self.disorder,
            self.structural_disorder,
            self.estimator,
            self.safety_factor,
        )?;
        tracing::info!(
            "Energy scale {:.6} eV, energy shift {:.6} eV",
            resolved.energy_scale(),
            resolved.energy_shift()
        );

        let table = HamiltonianBuilder::new()
            .with_lattice(lattice)
            .with_energy_shift(resolved.energy_shift())
            .with_complex(resolved.is_complex())
            .build()?;

        let mut container = Container::default();
        geometry::write(&mut container, lattice, &resolved)?;

        let hamiltonian = container.create_group("Hamiltonian")?;
        hamiltonian.write_array("NHoppings", table.num_hoppings().clone())?;
        hamiltonian.write_array("d", table.destinations().clone())?;
        write_weights(
            hamiltonian,
            "Hoppings",
            table.scaled_hoppings(resolved.energy_scale()),
            &resolved,
        )?;
        let configuration = resolved.configuration();
        hamiltonian.write_scalar(
            "CustomLocalEnergy",
            configuration.custom_local_energy() as i64,
        )?;
        hamiltonian.write_scalar(
            "PrintCustomLocalEnergy",
            configuration.print_custom_local_energy() as i64,
        )?;
        if let Some(modification) = modification {
            let multiplier =
                magnetic::field_multiplier(lattice, configuration.length(), modification)?;
            hamiltonian.write_scalar("MagneticFieldMul", multiplier)?;
        }
        disorder::write_onsite(hamiltonian, self.disorder, &resolved)?;
        disorder::write_structural(hamiltonian, self.structural_disorder, &resolved)?;

        let calculation_group = container.create_group("Calculation")?;
        calculation::write(calculation_group, lattice, calculation, &resolved)?;
        operators::write(calculation_group, lattice, calculation, &resolved)?;

        Ok(Export {
            container,
            resolved,
        })
    }
}

/// Export a system to `path` in one call, returning the configuration as it was exported
pub fn config_system(
    lattice: &Lattice,
    configuration: &Configuration,
    calculation: &Calculation,
    modification: Option<&Modification>,
    disorder: Option<&Disorder>,
    structural_disorder: &[StructuralDisorder],
    path: impl AsRef<Path>,
) -> Result<ResolvedConfiguration, ExportError> {
    let mut builder = ExportBuilder::new()
        .with_lattice(lattice)
        .with_configuration(configuration)
        .with_calculation(calculation)
        .with_structural_disorder(structural_disorder);
    if let Some(modification) = modification {
        builder = builder.with_modification(modification);
    }
    if let Some(disorder) = disorder {
        builder = builder.with_disorder(disorder);
    }
    let export = builder.build()?;
    export.write(path)?;
    Ok(export.resolved)
}
