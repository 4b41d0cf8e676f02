//! Global datasets describing the simulated sample

use crate::container::Group;
use crate::error::{ContainerError, DomainError};
use crate::system::ResolvedConfiguration;
use kite_lattice::Lattice;
use ndarray::{Array1, Array2};

pub(super) fn write(
    root: &mut Group,
    lattice: &Lattice,
    resolved: &ResolvedConfiguration,
) -> Result<(), ContainerError> {
    let configuration = resolved.configuration();
    let dim = lattice.ndim();
    let to_u32 = |values: &[usize]| values.iter().map(|x| *x as u32).collect::<Array1<u32>>();

    root.write_scalar("IS_COMPLEX", resolved.is_complex() as u32)?;
    root.write_scalar("PRECISION", configuration.precision().code())?;
    root.write_array("L", to_u32(configuration.length()))?;

    for (index, boundary) in configuration.boundaries().iter().enumerate() {
        tracing::info!("Boundary along a{}: {}", index + 1, boundary);
    }
    root.write_array(
        "Boundaries",
        configuration
            .boundaries()
            .iter()
            .map(|boundary| boundary.code())
            .collect::<Array1<u32>>(),
    )?;
    root.write_array(
        "BoundaryTwists",
        configuration
            .boundaries()
            .iter()
            .map(|boundary| boundary.twist())
            .collect::<Array1<f64>>(),
    )?;

    tracing::info!(
        "Decomposing the sample into {:?} domains, one thread each",
        configuration.divisions()
    );
    root.write_array("Divisions", to_u32(configuration.divisions()))?;
    root.write_scalar("DIM", dim as u32)?;

    let vectors = lattice.vectors();
    root.write_array(
        "LattVectors",
        Array2::from_shape_fn((dim, dim), |(i, j)| vectors[(i, j)]),
    )?;

    let positions = lattice.alias_positions();
    let counts = lattice.orbital_counts();
    let orbital_positions = positions
        .iter()
        .zip(&counts)
        .flat_map(|(position, count)| std::iter::repeat(*position).take(*count))
        .collect::<Vec<_>>();
    root.write_array(
        "OrbPositions",
        Array2::from_shape_fn((orbital_positions.len(), dim), |(i, j)| {
            orbital_positions[i][j]
        }),
    )?;
    root.write_scalar("NOrbitals", lattice.num_orbitals() as u32)?;
    root.write_scalar("EnergyScale", resolved.energy_scale())?;
    root.write_scalar("EnergyShift", resolved.energy_shift())?;
    Ok(())
}

/// The linear index of a unit cell, `x + Lx * y + Lx * Ly * z`, after checking it lies in the sample
pub(super) fn fixed_position(
    position: &[i64],
    length: &[usize],
    context: &'static str,
) -> Result<i32, DomainError> {
    if position.len() != length.len() {
        return Err(DomainError::PositionDimension {
            context,
            expected: length.len(),
            found: position.len(),
        });
    }
    if position
        .iter()
        .zip(length)
        .any(|(x, l)| *x < 0 || *x >= *l as i64)
    {
        return Err(DomainError::PositionOutOfRange {
            context,
            position: position.to_vec(),
            length: length.to_vec(),
        });
    }
    let (index, _) = position
        .iter()
        .zip(length)
        .fold((0_i64, 1_i64), |(index, stride), (x, l)| {
            (index + x * stride, stride * *l as i64)
        });
    Ok(index as i32)
}

#[cfg(test)]
mod test {
    use super::fixed_position;
    use crate::error::DomainError;

    #[test]
    fn cells_are_numbered_along_the_first_vector_first() {
        assert_eq!(fixed_position(&[3], &[16], "test").unwrap(), 3);
        assert_eq!(fixed_position(&[1, 2], &[16, 8], "test").unwrap(), 33);
        assert_eq!(fixed_position(&[1, 2, 3], &[4, 4, 4], "test").unwrap(), 1 + 8 + 48);
    }

    #[test]
    fn cells_outside_the_sample_are_rejected() {
        assert!(matches!(
            fixed_position(&[16], &[16], "test"),
            Err(DomainError::PositionOutOfRange { .. })
        ));
        assert!(matches!(
            fixed_position(&[-1, 0], &[16, 16], "test"),
            Err(DomainError::PositionOutOfRange { .. })
        ));
        assert!(matches!(
            fixed_position(&[1], &[16, 16], "test"),
            Err(DomainError::PositionDimension { expected: 2, found: 1, .. })
        ));
    }
}
