//! Perpendicular magnetic field
//!
//! With periodic boundaries only fields threading an integer number of flux quanta through the sample
//! are allowed. The smallest such field threads one quantum through a strip of `L[1]` unit cells, and
//! the engine receives the requested field as a multiple of it.

use crate::constants::{FLUX_QUANTUM, NM2_TO_M2};
use crate::error::MagneticError;
use crate::system::Modification;
use kite_lattice::Lattice;
use nalgebra::Vector3;

/// Area of the parallelogram spanned by the first two lattice vectors in nm^2
fn unit_cell_area(lattice: &Lattice) -> f64 {
    let vectors = lattice.vectors();
    let embed = |row: usize| {
        let mut vector = Vector3::<f64>::zeros();
        for (i, value) in vectors.row(row).iter().enumerate().take(3) {
            vector[i] = *value;
        }
        vector
    };
    embed(0).cross(&embed(1)).norm()
}

/// The smallest commensurate field in Tesla
pub(crate) fn minimum_field(lattice: &Lattice, length: &[usize]) -> Result<f64, MagneticError> {
    if lattice.ndim() < 2 || length.len() < 2 {
        return Err(MagneticError::RequiresTwoDimensions);
    }
    Ok(FLUX_QUANTUM / (length[1] as f64 * unit_cell_area(lattice) * NM2_TO_M2))
}

/// The requested field as a multiple of the minimum field
pub(crate) fn field_multiplier(
    lattice: &Lattice,
    length: &[usize],
    modification: &Modification,
) -> Result<u32, MagneticError> {
    let minimum_field = minimum_field(lattice, length)?;
    tracing::info!("The minimum commensurate field is {:.4} T", minimum_field);

    let multiplier = match modification {
        Modification::MagneticField(field) => (field / minimum_field).round() as i64,
        Modification::Flux(flux) => (flux * length[1] as f64).round() as i64,
    };
    if multiplier == 0 {
        return Err(MagneticError::SystemTooSmall { minimum_field });
    }
    let multiplier = u32::try_from(multiplier).map_err(|_| MagneticError::NegativeField(multiplier))?;
    tracing::info!(
        "The closest commensurate field is {:.4} T, {:.4} flux quanta per unit cell",
        multiplier as f64 * minimum_field,
        multiplier as f64 / length[1] as f64
    );
    Ok(multiplier)
}

#[cfg(test)]
mod test {
    use super::{field_multiplier, minimum_field};
    use crate::constants::FLUX_QUANTUM;
    use crate::error::MagneticError;
    use crate::system::Modification;
    use approx::assert_relative_eq;
    use kite_lattice::Lattice;

    fn square(a: f64) -> Lattice {
        let mut lattice = Lattice::from_rows(&[&[a, 0.], &[0., a]]).unwrap();
        lattice.add_sublattice("A", &[0., 0.], 0.).unwrap();
        lattice
    }

    #[test]
    fn minimum_field_threads_one_quantum_through_a_strip() {
        let field = minimum_field(&square(1.), &[128, 256]).unwrap();
        assert_relative_eq!(field, FLUX_QUANTUM / (256. * 1e-18), max_relative = 1e-12);
    }

    #[test]
    fn requested_fields_are_rounded_to_a_multiple() {
        let lattice = square(1.);
        let length = [128, 256];
        let minimum = minimum_field(&lattice, &length).unwrap();
        assert_eq!(
            field_multiplier(&lattice, &length, &Modification::MagneticField(3.4 * minimum)).unwrap(),
            3
        );
        assert_eq!(
            field_multiplier(&lattice, &length, &Modification::Flux(2. / 256.)).unwrap(),
            2
        );
    }

    #[test]
    fn weak_fields_and_chains_are_rejected() {
        let lattice = square(1.);
        let length = [128, 256];
        let minimum = minimum_field(&lattice, &length).unwrap();
        assert!(matches!(
            field_multiplier(&lattice, &length, &Modification::MagneticField(0.4 * minimum)),
            Err(MagneticError::SystemTooSmall { .. })
        ));
        assert!(matches!(
            field_multiplier(&lattice, &length, &Modification::MagneticField(-2. * minimum)),
            Err(MagneticError::NegativeField(-2))
        ));

        let mut chain = Lattice::from_rows(&[&[1.]]).unwrap();
        chain.add_sublattice("A", &[0.], 0.).unwrap();
        assert!(matches!(
            field_multiplier(&chain, &[128], &Modification::Flux(0.1)),
            Err(MagneticError::RequiresTwoDimensions)
        ));
    }
}
