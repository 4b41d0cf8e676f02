//! Global assembly of the hopping table
//!
//! Scalar edges are collected into a sparse `num_orbitals x (num_orbitals * 3^dim)` matrix. Duplicate
//! edges are summed during compression, exact zeros are dropped, and every row is read out in
//! ascending column order before being right-padded to the widest row.

use super::{local::Edge, HamiltonianError, HoppingTable};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use num_traits::Zero;
use sprs::{CsMat, TriMat};

pub(crate) fn assemble(
    edges: &[Edge],
    orbital_counts: Vec<usize>,
    dim: usize,
) -> Result<HoppingTable, HamiltonianError> {
    let num_orbitals: usize = orbital_counts.iter().sum();
    let num_columns = num_orbitals * 3_usize.pow(dim as u32);
    if i32::try_from(num_columns).is_err() {
        return Err(HamiltonianError::DestinationOverflow(num_columns));
    }

    let mut triplets = TriMat::with_capacity((num_orbitals, num_columns), edges.len());
    for edge in edges {
        triplets.add_triplet(edge.from, edge.to, edge.weight);
    }
    let matrix: CsMat<Complex64> = triplets.to_csr();

    let rows = matrix
        .outer_iterator()
        .map(|row| {
            row.iter()
                .filter(|(_, weight)| !weight.is_zero())
                .map(|(column, weight)| (column as i32, *weight))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let max_hoppings = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut num_hoppings = Array1::zeros(num_orbitals);
    let mut destinations = Array2::zeros((num_orbitals, max_hoppings));
    let mut hoppings = Array2::zeros((num_orbitals, max_hoppings));
    for (orbital, row) in rows.iter().enumerate() {
        num_hoppings[orbital] = row.len() as u32;
        for (slot, (column, weight)) in row.iter().enumerate() {
            destinations[[orbital, slot]] = *column;
            hoppings[[orbital, slot]] = *weight;
        }
    }
    tracing::trace!(
        "Assembled {} hoppings over {} orbitals",
        num_hoppings.sum(),
        num_orbitals
    );

    Ok(HoppingTable {
        num_hoppings,
        destinations,
        hoppings,
        orbital_counts,
        dim,
    })
}
