//! Entry level constructors for the hopping table
//!
//! Onsite energies and hopping terms are first gathered as dense energy blocks between alias ids,
//! completed with their Hermitian partners, and finally split into scalar edges between orbitals.
//! An edge leaves orbital `from` of the reference cell and lands on orbital `to` of the cell displaced
//! by `offset`, which is packed into a single destination code
//!
//! `code = sum_i (offset_i + 1) * 3^i + to * 3^dim`

use super::HamiltonianError;
use crate::utilities::matrices::is_hermitian;
use kite_lattice::Lattice;
use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

#[derive(Clone, Debug, PartialEq)]
/// A dense energy block from alias `from_id` in the reference cell to alias `to_id` in the cell at
/// `relative_index`
pub(crate) struct HoppingEntry {
    pub(crate) relative_index: Vec<i32>,
    pub(crate) from_id: usize,
    pub(crate) to_id: usize,
    pub(crate) energy: DMatrix<Complex64>,
}

impl HoppingEntry {
    fn is_local(&self) -> bool {
        self.relative_index.iter().all(|x| *x == 0)
    }
}

/// A scalar edge between two orbitals, `to` is the packed destination code
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Edge {
    pub(crate) from: usize,
    pub(crate) to: usize,
    pub(crate) weight: Complex64,
}

/// One zero-offset entry per alias id carrying the onsite block, shifted along its diagonal
pub(crate) fn onsite_entries(
    lattice: &Lattice,
    alias_lookup: &[usize],
    energy_shift: f64,
) -> Vec<HoppingEntry> {
    lattice
        .sublattices()
        .iter()
        .filter(|sub| !sub.is_alias())
        .map(|sub| {
            let mut energy = sub.energy().matrix().clone();
            let matrix = Array2::from_shape_fn(energy.shape(), |(i, j)| energy[(i, j)]);
            if !is_hermitian(matrix.view()) {
                tracing::warn!(
                    "The onsite energy of sublattice {} is not Hermitian",
                    sub.name()
                );
            }
            for i in 0..energy.nrows() {
                energy[(i, i)] -= Complex64::from(energy_shift);
            }
            let alias = alias_lookup[sub.alias_id()];
            HoppingEntry {
                relative_index: vec![0; lattice.ndim()],
                from_id: alias,
                to_id: alias,
                energy,
            }
        })
        .collect()
}

/// One entry per hopping term, as registered in the lattice
pub(crate) fn hopping_entries(lattice: &Lattice, alias_lookup: &[usize]) -> Vec<HoppingEntry> {
    let sublattices = lattice.sublattices();
    lattice
        .hoppings()
        .iter()
        .flat_map(|family| {
            family.terms().iter().map(move |term| HoppingEntry {
                relative_index: term.relative_index().to_vec(),
                from_id: alias_lookup[sublattices[term.from()].alias_id()],
                to_id: alias_lookup[sublattices[term.to()].alias_id()],
                energy: family.energy().matrix().clone(),
            })
        })
        .collect()
}

/// Add the reverse of every hopping entry
///
/// A term `(from, to, offset, E)` is followed by `(to, from, -offset, E^dagger)`. For a zero offset the
/// negation is a no-op and the partner is the conjugate transpose block between the same cells.
pub(crate) fn hermitian_completion(entries: Vec<HoppingEntry>) -> Vec<HoppingEntry> {
    entries
        .into_iter()
        .flat_map(|entry| {
            let partner = HoppingEntry {
                relative_index: if entry.is_local() {
                    entry.relative_index.clone()
                } else {
                    entry.relative_index.iter().map(|x| -x).collect()
                },
                from_id: entry.to_id,
                to_id: entry.from_id,
                energy: entry.energy.adjoint(),
            };
            [entry, partner]
        })
        .collect()
}

/// Pack an offset and a target orbital into a destination code
pub(crate) fn encode_destination(offset: &[i32], orbital: usize) -> Result<usize, HamiltonianError> {
    if offset.iter().any(|x| x.abs() > 1) {
        return Err(HamiltonianError::OffsetOutOfRange(offset.to_vec()));
    }
    let relative_move = offset
        .iter()
        .rev()
        .fold(0_usize, |acc, x| acc * 3 + (x + 1) as usize);
    Ok(relative_move + orbital * 3_usize.pow(offset.len() as u32))
}

/// Unpack a destination code into the cell offset and the target orbital
pub fn decode_destination(code: usize, dim: usize) -> (Vec<i32>, usize) {
    let stride = 3_usize.pow(dim as u32);
    let mut relative_move = code % stride;
    let offset = (0..dim)
        .map(|_| {
            let component = (relative_move % 3) as i32 - 1;
            relative_move /= 3;
            component
        })
        .collect();
    (offset, code / stride)
}

/// Split every entry into scalar edges between orbitals. In real mode the imaginary part of each
/// element is discarded before any summation takes place.
pub(crate) fn flatten(
    entries: &[HoppingEntry],
    orbitals_before: &[usize],
    is_complex: bool,
) -> Result<Vec<Edge>, HamiltonianError> {
    let mut edges = Vec::with_capacity(entries.iter().map(|entry| entry.energy.len()).sum());
    for entry in entries {
        for row in 0..entry.energy.nrows() {
            for col in 0..entry.energy.ncols() {
                let value = entry.energy[(row, col)];
                edges.push(Edge {
                    from: orbitals_before[entry.from_id] + row,
                    to: encode_destination(
                        &entry.relative_index,
                        orbitals_before[entry.to_id] + col,
                    )?,
                    weight: if is_complex {
                        value
                    } else {
                        Complex64::from(value.re)
                    },
                });
            }
        }
    }
    Ok(edges)
}
