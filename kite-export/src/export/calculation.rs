//! The `Calculation` group, one subgroup per requested observable

use super::{geometry::fixed_position, write_weights};
use crate::container::Group;
use crate::error::{CalculationError, DomainError, ExportError};
use crate::system::{
    Arpes, Calculation, Conductivity, Dos, GaussianWavePacket, Ldos, NonlinearConductivity,
    OrbitalLayout, ResolvedConfiguration, SingleShotConductivity,
};
use kite_lattice::Lattice;
use ndarray::{arr1, Array1, Array2, Array3};
use std::f64::consts::PI;

/// Write every requested calculation into `group`
pub(super) fn write(
    group: &mut Group,
    lattice: &Lattice,
    calculation: &Calculation,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let layout = OrbitalLayout::new(lattice);
    if let Some(request) = calculation.get_dos() {
        write_dos(group.create_group("dos")?, request)?;
    }
    if let Some(request) = calculation.get_ldos() {
        write_ldos(group.create_group("ldos")?, request, &layout, resolved)?;
    }
    if let Some(request) = calculation.get_arpes() {
        write_arpes(group.create_group("arpes")?, request, lattice, resolved)?;
    }
    if let Some(request) = calculation.get_gaussian_wave_packet() {
        write_wave_packet(
            group.create_group("gaussian_wave_packet")?,
            request,
            &layout,
            resolved,
        )?;
    }
    if let Some(request) = calculation.get_conductivity_dc() {
        write_conductivity(group.create_group("conductivity_dc")?, request, resolved)?;
    }
    if let Some(request) = calculation.get_conductivity_optical() {
        write_conductivity(
            group.create_group("conductivity_optical")?,
            request,
            resolved,
        )?;
    }
    if let Some(request) = calculation.get_conductivity_optical_nonlinear() {
        write_nonlinear_conductivity(
            group.create_group("conductivity_optical_nonlinear")?,
            request,
            resolved,
        )?;
    }
    if let Some(request) = calculation.get_singleshot_conductivity_dc() {
        write_singleshot(
            group.create_group("singleshot_conductivity_dc")?,
            request,
            resolved,
        )?;
    }
    Ok(())
}

fn single(value: usize) -> Array1<i32> {
    arr1(&[value as i32])
}

fn write_dos(group: &mut Group, request: &Dos) -> Result<(), ExportError> {
    tracing::info!("Requesting the density of states");
    group.write_array("NumMoments", single(request.num_moments))?;
    group.write_array("NumRandoms", single(request.num_random))?;
    group.write_array("NumPoints", single(request.num_points))?;
    group.write_array("NumDisorder", single(request.num_disorder))?;
    Ok(())
}

fn write_ldos(
    group: &mut Group,
    request: &Ldos,
    layout: &OrbitalLayout,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let length = resolved.configuration().length();
    let mut orbitals = Vec::new();
    let mut positions = Vec::new();
    for (position, sublattice) in request.probes() {
        let (first, count) = layout
            .orbitals(sublattice)
            .ok_or_else(|| DomainError::UnknownSublattice(sublattice.to_string()))?;
        let position = fixed_position(position, length, "local density of states")?;
        for orbital in first..first + count {
            orbitals.push(orbital as i32);
            positions.push(position);
        }
    }
    tracing::info!(
        "Requesting the local density of states on {} orbitals",
        orbitals.len()
    );

    group.write_scalar("NumMoments", request.num_moments() as i32)?;
    group.write_array(
        "Energy",
        request
            .energy()
            .iter()
            .map(|energy| resolved.rescale(*energy) as f32)
            .collect::<Array1<f32>>(),
    )?;
    group.write_array("Orbitals", Array1::from(orbitals))?;
    group.write_array("FixPosition", Array1::from(positions))?;
    group.write_scalar("NumDisorder", request.num_disorder() as i32)?;
    Ok(())
}

/// Wave vectors in units of the reciprocal lattice vectors, `k . A^T / 2pi`
fn relative_k_vectors(
    lattice: &Lattice,
    k_vectors: &[Vec<f64>],
    context: &'static str,
) -> Result<Array2<f64>, CalculationError> {
    let dim = lattice.ndim();
    check_vectors(k_vectors, dim, context)?;
    let vectors = lattice.vectors();
    Ok(Array2::from_shape_fn((k_vectors.len(), dim), |(n, j)| {
        (0..dim)
            .map(|i| k_vectors[n][i] * vectors[(j, i)])
            .sum::<f64>()
            / (2_f64 * PI)
    }))
}

fn check_vectors(
    vectors: &[Vec<f64>],
    dim: usize,
    context: &'static str,
) -> Result<(), CalculationError> {
    match vectors.iter().find(|vector| vector.len() != dim) {
        Some(vector) => Err(CalculationError::VectorDimension {
            context,
            expected: dim,
            found: vector.len(),
        }),
        None => Ok(()),
    }
}

fn write_arpes(
    group: &mut Group,
    request: &Arpes,
    lattice: &Lattice,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let num_orbitals = lattice.num_orbitals();
    if request.weights.len() != num_orbitals {
        return Err(CalculationError::OrbitalWeights {
            context: "arpes",
            expected: num_orbitals,
            found: request.weights.len(),
        }
        .into());
    }
    let k_vectors = relative_k_vectors(lattice, &request.k_vectors, "arpes wave vectors")?;
    tracing::info!("Requesting ARPES at {} wave vectors", k_vectors.nrows());

    group.write_array("NumMoments", single(request.num_moments))?;
    group.write_array("k_vector", k_vectors)?;
    group.write_array("NumDisorder", single(request.num_disorder))?;
    write_weights(
        group,
        "OrbitalWeights",
        Array2::from_shape_vec((1, num_orbitals), request.weights.clone())
            .map_err(|_| CalculationError::InconsistentLengths { context: "arpes" })?,
        resolved,
    )?;
    Ok(())
}

fn write_wave_packet(
    group: &mut Group,
    request: &GaussianWavePacket,
    layout: &OrbitalLayout,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let dim = layout.dim();
    let num_orbitals = layout.num_orbitals();
    let context = "gaussian wave packet";
    check_vectors(&request.k_vectors, dim, context)?;
    check_vectors(&request.probing_points, dim, context)?;
    check_vectors(std::slice::from_ref(&request.mean_value), dim, context)?;
    if request.spinors.len() != request.k_vectors.len() {
        return Err(CalculationError::InconsistentLengths { context }.into());
    }
    if let Some(spinor) = request
        .spinors
        .iter()
        .find(|spinor| spinor.len() != num_orbitals)
    {
        return Err(CalculationError::OrbitalWeights {
            context,
            expected: num_orbitals,
            found: spinor.len(),
        }
        .into());
    }
    tracing::info!(
        "Requesting a wave packet over {} wave vectors",
        request.k_vectors.len()
    );

    group.write_array("NumMoments", single(request.num_moments))?;
    group.write_array("NumPoints", single(request.num_points))?;
    group.write_array("NumDisorder", single(request.num_disorder))?;
    // the engine reads the centre as a cell index
    group.write_array(
        "mean_value",
        Array2::from_shape_fn((1, dim), |(_, i)| request.mean_value[i] as i32),
    )?;
    let points = &request.probing_points;
    group.write_array(
        "ProbingPoint",
        Array3::from_shape_fn((1, points.len(), dim), |(_, n, i)| points[n][i]),
    )?;
    group.write_array("width", arr1(&[request.width]))?;
    let spinors = &request.spinors;
    write_weights(
        group,
        "spinor",
        Array3::from_shape_fn((1, spinors.len(), num_orbitals), |(_, n, i)| {
            spinors[n][i]
        }),
        resolved,
    )?;
    let k_vectors = &request.k_vectors;
    group.write_array(
        "k_vector",
        Array2::from_shape_fn((k_vectors.len(), dim), |(n, i)| k_vectors[n][i]),
    )?;
    group.write_array("timestep", arr1(&[request.timestep as f32]))?;
    Ok(())
}

fn write_conductivity(
    group: &mut Group,
    request: &Conductivity,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    tracing::info!(
        "Requesting a linear conductivity along direction {}",
        request.direction.code()
    );
    group.write_array("NumMoments", single(request.num_moments))?;
    group.write_array("NumRandoms", single(request.num_random))?;
    group.write_array("NumPoints", single(request.num_points))?;
    group.write_array("NumDisorder", single(request.num_disorder))?;
    group.write_array(
        "Temperature",
        arr1(&[request.temperature / resolved.energy_scale()]),
    )?;
    group.write_array("Direction", arr1(&[request.direction.code() as i32]))?;
    Ok(())
}

fn write_nonlinear_conductivity(
    group: &mut Group,
    request: &NonlinearConductivity,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    tracing::info!(
        "Requesting a second order optical conductivity along direction {}",
        request.direction.code()
    );
    group.write_array("NumMoments", single(request.num_moments))?;
    group.write_array("NumRandoms", single(request.num_random))?;
    group.write_array("NumPoints", single(request.num_points))?;
    group.write_array("NumDisorder", single(request.num_disorder))?;
    group.write_array(
        "Temperature",
        arr1(&[request.temperature / resolved.energy_scale()]),
    )?;
    group.write_array("Direction", arr1(&[request.direction.code() as i32]))?;
    group.write_array("Special", arr1(&[request.special]))?;
    Ok(())
}

fn write_singleshot(
    group: &mut Group,
    request: &SingleShotConductivity,
    resolved: &ResolvedConfiguration,
) -> Result<(), ExportError> {
    let row = |values: Vec<f64>| Array2::from_shape_fn((1, values.len()), |(_, i)| values[i]);
    let num_energies = request.energy().len();
    tracing::info!(
        "Requesting the single shot conductivity at {} energies",
        num_energies
    );

    group.write_array(
        "NumMoments",
        Array2::from_shape_fn((1, num_energies), |(_, i)| {
            request.num_moments()[i] as i32
        }),
    )?;
    group.write_array("NumRandoms", single(request.num_random()))?;
    group.write_array("NumDisorder", single(request.num_disorder()))?;
    group.write_array(
        "Energy",
        row(request
            .energy()
            .iter()
            .map(|energy| resolved.rescale(*energy))
            .collect()),
    )?;
    group.write_array(
        "Gamma",
        row(request
            .eta()
            .iter()
            .map(|eta| eta / resolved.energy_scale())
            .collect()),
    )?;
    group.write_array("Direction", arr1(&[request.direction().code() as i32]))?;
    group.write_array(
        "PreserveDisorder",
        Array2::from_shape_fn((1, num_energies), |(_, i)| {
            request.preserve_disorder()[i] as i32
        }),
    )?;
    Ok(())
}
