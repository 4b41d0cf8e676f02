//! Description of the simulated system
//!
//! Everything the exporter consumes besides the lattice itself: the numerical `Configuration`, the
//! requested observables in a `Calculation`, onsite `Disorder`, `StructuralDisorder` objects and an
//! optional magnetic `Modification`. The `reader` module builds all of them from a TOML file.

mod calculation;
mod configuration;
mod disorder;
mod modification;
pub mod reader;
mod structural;

pub use calculation::*;
pub use configuration::*;
pub use disorder::*;
pub use modification::*;
pub use structural::*;

use crate::error::DisorderError;
use kite_lattice::Lattice;

#[derive(Clone, Debug, PartialEq)]
/// Where the orbitals of each sublattice sit in the orbital enumeration of a lattice
pub(crate) struct OrbitalLayout {
    dim: usize,
    /// `(name, first orbital, number of orbitals)` for every sublattice, aliases included
    sublattices: Vec<(String, usize, usize)>,
    num_orbitals: usize,
}

impl OrbitalLayout {
    pub(crate) fn new(lattice: &Lattice) -> Self {
        let before = lattice.orbitals_before();
        let counts = lattice.orbital_counts();
        let sublattices = lattice
            .sublattices()
            .iter()
            .map(|sub| {
                (
                    sub.name().to_string(),
                    before[sub.alias_id()],
                    counts[sub.alias_id()],
                )
            })
            .collect();
        Self {
            dim: lattice.ndim(),
            sublattices,
            num_orbitals: lattice.num_orbitals(),
        }
    }

    pub(crate) fn dim(&self) -> usize {
        self.dim
    }

    pub(crate) fn num_orbitals(&self) -> usize {
        self.num_orbitals
    }

    /// Fails unless `lattice` enumerates its orbitals the same way as the lattice this layout was made from
    pub(crate) fn check(&self, lattice: &Lattice, context: &'static str) -> Result<(), DisorderError> {
        let exported = Self::new(lattice);
        if *self != exported {
            return Err(DisorderError::ForeignLattice {
                context,
                expected: exported.num_orbitals,
                found: self.num_orbitals,
                expected_dim: exported.dim,
                found_dim: self.dim,
            });
        }
        Ok(())
    }

    /// The first orbital and orbital count of the named sublattice
    pub(crate) fn orbitals(&self, name: &str) -> Option<(usize, usize)> {
        self.sublattices
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, first, count)| (*first, *count))
    }
}
