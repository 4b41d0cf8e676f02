//! Checks run before anything is written
//!
//! The per-dimension arrays of the configuration must match the lattice, and the complex flag is
//! switched on whenever some part of the system cannot be represented with real numbers. Disorder
//! must be described on the exported lattice.

use crate::error::{DisorderError, ExportError};
use crate::system::{Calculation, Configuration, Disorder, Modification, StructuralDisorder};
use kite_lattice::Lattice;

/// The configuration to export, with the complex flag switched on where required
pub(super) fn resolve(
    lattice: &Lattice,
    configuration: &Configuration,
    calculation: &Calculation,
    modification: Option<&Modification>,
) -> Result<Configuration, ExportError> {
    configuration.check_dimension(lattice.ndim())?;

    let reason = if lattice.has_complex_energies() {
        Some("the lattice has complex onsite or hopping energies")
    } else if modification.is_some() {
        Some("a magnetic field is applied")
    } else if let Some(request) = calculation.requires_complex() {
        tracing::trace!("{} needs complex arithmetic", request);
        Some("the requested calculation needs complex arithmetic")
    } else {
        None
    };

    let configuration = match reason {
        Some(reason) if !configuration.is_complex() => {
            tracing::warn!("Exporting as complex because {}", reason);
            configuration.clone().into_complex()
        }
        _ => configuration.clone(),
    };

    if !configuration.is_complex()
        && calculation
            .get_operators()
            .iter()
            .any(|(_, operator)| operator.has_complex_energies())
    {
        tracing::warn!(
            "An operator has complex energies but the export is real, their imaginary parts are dropped"
        );
    }
    Ok(configuration)
}

/// Fails if a disorder object indexes the orbitals of another lattice
pub(super) fn check_disorder(
    lattice: &Lattice,
    disorder: Option<&Disorder>,
    structural_disorder: &[StructuralDisorder],
) -> Result<(), DisorderError> {
    if let Some(disorder) = disorder {
        disorder.check_lattice(lattice)?;
    }
    structural_disorder
        .iter()
        .try_for_each(|object| object.check_lattice(lattice))
}

#[cfg(test)]
mod test {
    use super::{check_disorder, resolve};
    use crate::error::{ConfigurationError, DisorderError, ExportError};
    use crate::system::{
        Arpes, Calculation, Configuration, Disorder, Distribution, Modification, Placement,
        StructuralDisorder,
    };
    use kite_lattice::Lattice;
    use num_complex::Complex64;

    fn square(hopping: Complex64) -> Lattice {
        let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0., 1.]]).unwrap();
        lattice
            .add_sublattice("A", &[0., 0.], 0.)
            .unwrap()
            .add_hopping(&[1, 0], "A", "A", hopping)
            .unwrap()
            .add_hopping(&[0, 1], "A", "A", -1.)
            .unwrap();
        lattice
    }

    fn configuration() -> Configuration {
        Configuration::builder()
            .with_divisions(&[1, 1])
            .with_length(&[64, 64])
            .build()
            .unwrap()
    }

    #[test]
    fn real_systems_stay_real() {
        let resolved = resolve(
            &square(Complex64::from(-1.)),
            &configuration(),
            &Calculation::new(),
            None,
        )
        .unwrap();
        assert!(!resolved.is_complex());
    }

    #[test]
    fn complex_flag_is_forced() {
        let calculation = Calculation::new();
        let configuration = configuration();
        assert!(resolve(&square(Complex64::new(0., 1.)), &configuration, &calculation, None)
            .unwrap()
            .is_complex());
        assert!(resolve(
            &square(Complex64::from(-1.)),
            &configuration,
            &calculation,
            Some(&Modification::MagneticField(10.))
        )
        .unwrap()
        .is_complex());

        let mut calculation = Calculation::new();
        calculation
            .arpes(Arpes {
                k_vectors: vec![vec![0., 0.]],
                weights: vec![Complex64::from(1.)],
                num_moments: 128,
                num_disorder: 1,
            })
            .unwrap();
        assert!(resolve(&square(Complex64::from(-1.)), &configuration, &calculation, None)
            .unwrap()
            .is_complex());
        // the input is left untouched
        assert!(!configuration.is_complex());
    }

    #[test]
    fn mismatched_dimensions_are_fatal() {
        let configuration = Configuration::builder()
            .with_divisions(&[1])
            .with_length(&[64])
            .build()
            .unwrap();
        assert!(matches!(
            resolve(
                &square(Complex64::from(-1.)),
                &configuration,
                &Calculation::new(),
                None
            ),
            Err(ExportError::Configuration(
                ConfigurationError::DimensionMismatch { .. }
            ))
        ));
    }

    #[test]
    fn disorder_must_describe_the_exported_lattice() {
        let lattice = square(Complex64::from(-1.));
        let mut disorder = Disorder::new(&lattice);
        disorder
            .add_disorder("A", Distribution::Uniform, &[0.], &[0.1])
            .unwrap();
        let mut structural = StructuralDisorder::new(&lattice, Placement::Concentration(0.1)).unwrap();
        structural.add_vacancy("A").unwrap();
        assert!(check_disorder(&lattice, Some(&disorder), &[structural.clone()]).is_ok());

        let mut chain = Lattice::from_rows(&[&[1.]]).unwrap();
        chain
            .add_sublattice("A", &[0.], 0.)
            .unwrap()
            .add_sublattice("B", &[0.5], 0.)
            .unwrap();
        assert!(matches!(
            check_disorder(&chain, Some(&disorder), &[]),
            Err(DisorderError::ForeignLattice {
                expected: 2,
                found: 1,
                expected_dim: 1,
                found_dim: 2,
                ..
            })
        ));
        assert!(matches!(
            check_disorder(&chain, None, &[structural]),
            Err(DisorderError::ForeignLattice { .. })
        ));
    }
}
