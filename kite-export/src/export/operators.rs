//! Auxiliary operators and the vertices combining them
//!
//! Each operator lattice is flattened into the orbital space of the system lattice, so operators may
//! only use sublattices the system defines. The shift belongs to the Hamiltonian alone and is not
//! applied to operators, the scale is.

use super::write_weights;
use crate::container::Group;
use crate::error::{CalculationError, ExportError};
use crate::hamiltonian::{HamiltonianBuilder, OrbitalReference};
use crate::system::{Calculation, ResolvedConfiguration, Spectrum, Vertex};
use kite_lattice::Lattice;
use ndarray::{arr1, Array1, Array2};

/// Map every alias id of `operator` onto the alias id of the same sublattice in `lattice`
fn alias_lookup(
    name: &str,
    operator: &Lattice,
    lattice: &Lattice,
) -> Result<Vec<usize>, CalculationError> {
    if operator.ndim() != lattice.ndim() {
        return Err(CalculationError::OperatorDimension {
            name: name.to_string(),
            expected: lattice.ndim(),
            found: operator.ndim(),
        });
    }
    let mut lookup = vec![0; operator.nsub()];
    for sub in operator.sublattices() {
        let parent = lattice.sublattice(sub.name()).ok_or_else(|| {
            CalculationError::UnknownOperatorSublattice {
                operator: name.to_string(),
                sublattice: sub.name().to_string(),
            }
        })?;
        lookup[sub.alias_id()] = parent.alias_id();
    }
    Ok(lookup)
}

fn write_vertex(group: &mut Group, vertex: &Vertex, resolved: &ResolvedConfiguration) -> Result<(), ExportError> {
    let scale = resolved.energy_scale();
    let vertices = group.create_group("Vertices")?;
    for (index, (operators, spectrum)) in vertex
        .operators()
        .iter()
        .zip(vertex.spectra())
        .enumerate()
    {
        let entry = vertices.create_group(&index.to_string())?;
        entry.write_array(
            "Operators",
            Array2::from_shape_fn((operators.len(), 2), |(i, j)| match j {
                0 => operators[i].0.code(),
                _ => operators[i].1.code(),
            }),
        )?;
        entry.write_scalar("Spectrum", spectrum.code())?;
        entry.write_scalar("SpectrumType", spectrum.kind().code())?;
        match spectrum {
            Spectrum::Full {
                num_moments,
                num_points,
                ..
            } => {
                entry.write_scalar("NumMoments", *num_moments as i32)?;
                entry.write_scalar("NumPoints", *num_points as i32)?;
            }
            Spectrum::SingleShot {
                energy,
                eta,
                num_moments,
                ..
            } => {
                entry.write_array(
                    "Energy",
                    energy
                        .iter()
                        .map(|energy| resolved.rescale(*energy))
                        .collect::<Array1<f64>>(),
                )?;
                entry.write_array(
                    "Gamma",
                    eta.iter().map(|eta| eta / scale).collect::<Array1<f64>>(),
                )?;
                entry.write_array(
                    "NumMoments",
                    num_moments
                        .iter()
                        .map(|moments| *moments as i32)
                        .collect::<Array1<i32>>(),
                )?;
            }
        }
    }
    Ok(())
}

/// Write `SpectralOperators` when operators or a vertex were requested
pub(super) fn write(
    calculation_group: &mut Group,
    lattice: &Lattice,
    calculation: &Calculation,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let operators = calculation.get_operators();
    let vertex = calculation.get_vertex();
    if operators.is_empty() && vertex.is_none() {
        return Ok(());
    }

    let group = calculation_group.create_group("SpectralOperators")?;
    let (num_random, num_disorder, preserve_disorder) = vertex
        .map(|vertex| {
            (
                vertex.num_random(),
                vertex.num_disorder(),
                vertex.preserve_disorder(),
            )
        })
        .unwrap_or((1, 1, false));
    group.write_scalar("NumRandom", num_random as i32)?;
    group.write_scalar("NumDisorder", num_disorder as i32)?;
    group.write_scalar("PreserveDisorder", preserve_disorder as i32)?;

    let scale = resolved.energy_scale();
    let orbital_counts = lattice.orbital_counts();
    let tables = group.create_group("Operators")?;
    for (index, (name, operator)) in operators.iter().enumerate() {
        tracing::info!("Flattening operator `{}`", name);
        let reference = OrbitalReference::new(
            alias_lookup(name, operator, lattice)?,
            orbital_counts.clone(),
        );
        let table = HamiltonianBuilder::new()
            .with_lattice(operator)
            .with_reference(&reference)
            .with_complex(resolved.is_complex())
            .build()?;
        let entry = tables.create_group(&index.to_string())?;
        entry.write_array("NHoppings", table.num_hoppings().clone())?;
        entry.write_array("d", table.destinations().clone())?;
        write_weights(entry, "Hoppings", table.scaled_hoppings(scale), resolved)?;
    }

    if let Some(vertex) = vertex {
        write_vertex(group, vertex, resolved)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::alias_lookup;
    use crate::error::CalculationError;
    use kite_lattice::Lattice;

    fn honeycomb() -> Lattice {
        let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0.5, 0.8660254037844386]]).unwrap();
        lattice
            .add_sublattice("A", &[0., 0.], 0.)
            .unwrap()
            .add_sublattice("B", &[0., 0.57735026919], 0.)
            .unwrap();
        lattice
    }

    #[test]
    fn operator_sublattices_map_onto_the_system() {
        let mut operator = Lattice::from_rows(&[&[1., 0.], &[0.5, 0.8660254037844386]]).unwrap();
        operator.add_sublattice("B", &[0., 0.57735026919], 1.).unwrap();
        assert_eq!(alias_lookup("sz", &operator, &honeycomb()).unwrap(), vec![1]);
    }

    #[test]
    fn foreign_sublattices_are_rejected() {
        let mut operator = Lattice::from_rows(&[&[1., 0.], &[0.5, 0.8660254037844386]]).unwrap();
        operator.add_sublattice("C", &[0., 0.], 1.).unwrap();
        assert!(matches!(
            alias_lookup("sz", &operator, &honeycomb()),
            Err(CalculationError::UnknownOperatorSublattice { .. })
        ));

        let mut chain = Lattice::from_rows(&[&[1.]]).unwrap();
        chain.add_sublattice("A", &[0.], 1.).unwrap();
        assert!(matches!(
            alias_lookup("sz", &chain, &honeycomb()),
            Err(CalculationError::OperatorDimension { expected: 2, found: 1, .. })
        ));
    }
}
