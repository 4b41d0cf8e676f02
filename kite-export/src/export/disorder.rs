//! Onsite and structural disorder sections of the `Hamiltonian` group

use super::{geometry::fixed_position, write_weights};
use crate::container::Group;
use crate::error::ExportError;
use crate::system::{Disorder, Placement, ResolvedConfiguration, StructuralDisorder};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Write `Disorder`, or empty placeholders the engine expects when there is no onsite disorder
pub(super) fn write_onsite(
    hamiltonian: &mut Group,
    disorder: Option<&Disorder>,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let group = hamiltonian.create_group("Disorder")?;
    let disorder = match disorder.filter(|disorder| !disorder.is_empty()) {
        Some(disorder) => disorder,
        None => {
            for name in [
                "OnsiteDisorderModelType",
                "OrbitalNum",
                "OnsiteDisorderMeanValue",
                "OnsiteDisorderMeanStdv",
            ] {
                group.write_array(name, Array2::<f64>::zeros((1, 0)))?;
            }
            return Ok(());
        }
    };

    let scale = resolved.energy_scale();
    let entries = disorder.entries();
    tracing::info!("Writing {} onsite disorder entries", entries.len());
    group.write_array(
        "OnsiteDisorderModelType",
        entries
            .iter()
            .map(|entry| entry.distribution.code())
            .collect::<Array1<i32>>(),
    )?;
    group.write_array("OrbitalNum", disorder.orbital_table())?;
    // the shift is already carried by the onsite energies
    group.write_array(
        "OnsiteDisorderMeanValue",
        entries
            .iter()
            .map(|entry| entry.mean / scale)
            .collect::<Array1<f64>>(),
    )?;
    group.write_array(
        "OnsiteDisorderMeanStdv",
        entries
            .iter()
            .map(|entry| entry.stdev / scale)
            .collect::<Array1<f64>>(),
    )?;
    Ok(())
}

fn write_placement(
    group: &mut Group,
    placement: &Placement,
    length: &[usize],
) -> Result<(), ExportError> {
    match placement {
        Placement::Concentration(concentration) => {
            group.write_scalar("Concentration", *concentration)?
        }
        Placement::Positions(positions) => {
            let positions = positions
                .iter()
                .map(|position| fixed_position(position, length, "structural disorder anchor"))
                .collect::<Result<Array1<i32>, _>>()?;
            group.write_array("FixPosition", positions)?
        }
    }
    Ok(())
}

/// Write the `Vacancy` and `StructuralDisorder` groups. Objects which remove orbitals are numbered
/// among the vacancy types, objects which perturb the Hamiltonian keep their own index.
pub(super) fn write_structural(
    hamiltonian: &mut Group,
    structural_disorder: &[StructuralDisorder],
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let length = resolved.configuration().length();
    let scale = resolved.energy_scale();

    let vacancies = hamiltonian.create_group("Vacancy")?;
    let mut vacancy_type = 0;
    for disorder in structural_disorder {
        if disorder.vacancies().is_empty() {
            continue;
        }
        let group = vacancies.create_group(&format!("Type{}", vacancy_type))?;
        group.write_array(
            "Orbitals",
            disorder
                .vacancies()
                .iter()
                .map(|orbital| *orbital as i32)
                .collect::<Array1<i32>>(),
        )?;
        write_placement(group, disorder.placement(), length)?;
        group.write_scalar("NumOrbitals", disorder.vacancies().len() as i32)?;
        vacancy_type += 1;
    }

    let perturbations = hamiltonian.create_group("StructuralDisorder")?;
    for (index, disorder) in structural_disorder.iter().enumerate() {
        if !disorder.has_perturbations() {
            continue;
        }
        for (from, to) in disorder.long_bonds() {
            tracing::warn!(
                "A structural bond spans cells {:?} and {:?}, the engine needs ghost cells at least this wide",
                from,
                to
            );
        }
        let group = perturbations.create_group(&format!("Type{}", index))?;
        write_placement(group, disorder.placement(), length)?;

        let bonds = disorder.bonds();
        let onsite = disorder.onsite();
        let nodes = disorder.nodes();
        group.write_scalar("NumBondDisorder", bonds.len() as i32)?;
        group.write_scalar("NumOnsiteDisorder", onsite.len() as i32)?;
        group.write_array(
            "NodeFrom",
            bonds.iter().map(|bond| bond.from as i32).collect::<Array1<i32>>(),
        )?;
        group.write_array(
            "NodeTo",
            bonds.iter().map(|bond| bond.to as i32).collect::<Array1<i32>>(),
        )?;
        group.write_array(
            "NodeOnsite",
            onsite.iter().map(|(node, _)| *node as i32).collect::<Array1<i32>>(),
        )?;
        group.write_scalar("NumNodes", nodes.len() as i32)?;
        group.write_array(
            "NodePosition",
            nodes.iter().map(|node| node.orbital as u32).collect::<Array1<u32>>(),
        )?;
        group.write_array(
            "NodeOffset",
            Array2::from_shape_fn((nodes.len(), disorder.dim()), |(i, j)| nodes[i].offset[j]),
        )?;
        write_weights(
            group,
            "U0",
            onsite
                .iter()
                .map(|(_, energy)| Complex64::from(energy / scale))
                .collect::<Array1<_>>(),
            resolved,
        )?;
        write_weights(
            group,
            "Hopping",
            bonds
                .iter()
                .map(|bond| bond.weight / scale)
                .collect::<Array1<_>>(),
            resolved,
        )?;
    }
    Ok(())
}
