//! Structural disorder
//!
//! A structural disorder object is a local pattern repeated over the system: vacancies, modified bonds
//! and modified onsite energies, anchored either at explicit unit cells or at randomly drawn cells with
//! a given concentration. Sites touched by the pattern are numbered as nodes, each node being an
//! orbital in a unit cell displaced from the anchor.

use super::OrbitalLayout;
use crate::error::DisorderError;
use kite_lattice::{Energy, Lattice};
use num_complex::Complex64;
use num_traits::Zero;

#[derive(Clone, Debug, PartialEq)]
/// Where the pattern is placed in the system
pub enum Placement {
    /// Random unit cells, as a fraction of all unit cells
    Concentration(f64),
    /// Explicit unit cells, as integer coordinates along the lattice vectors
    Positions(Vec<Vec<i64>>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// An orbital in the unit cell displaced by `offset` from the anchor
pub struct Node {
    pub offset: Vec<i32>,
    pub orbital: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// A directed bond between two nodes
pub struct Bond {
    pub from: usize,
    pub to: usize,
    pub weight: Complex64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructuralDisorder {
    layout: OrbitalLayout,
    placement: Placement,
    vacancies: Vec<usize>,
    nodes: Vec<Node>,
    /// Both directions of every bond, in insertion order
    bonds: Vec<Bond>,
    onsite: Vec<(usize, f64)>,
    /// Cell offsets of the two ends of every bond registered through `add_bond`
    bond_cells: Vec<(Vec<i32>, Vec<i32>)>,
}

impl StructuralDisorder {
    pub fn new(lattice: &Lattice, placement: Placement) -> Result<Self, DisorderError> {
        if let Placement::Concentration(concentration) = placement {
            if !(concentration > 0_f64 && concentration <= 1_f64) {
                return Err(DisorderError::InvalidConcentration(concentration));
            }
        }
        Ok(Self {
            layout: OrbitalLayout::new(lattice),
            placement,
            vacancies: Vec::new(),
            nodes: Vec::new(),
            bonds: Vec::new(),
            onsite: Vec::new(),
            bond_cells: Vec::new(),
        })
    }

    fn orbitals(&self, sublattice: &str) -> Result<(usize, usize), DisorderError> {
        self.layout
            .orbitals(sublattice)
            .ok_or_else(|| DisorderError::UnknownSublattice(sublattice.to_string()))
    }

    fn check_offset(&self, offset: &[i32], context: &'static str) -> Result<(), DisorderError> {
        if offset.len() != self.layout.dim() {
            return Err(DisorderError::OffsetDimension {
                context,
                expected: self.layout.dim(),
                found: offset.len(),
            });
        }
        Ok(())
    }

    fn node(&mut self, offset: &[i32], orbital: usize) -> usize {
        let node = Node {
            offset: offset.to_vec(),
            orbital,
        };
        match self.nodes.iter().position(|existing| *existing == node) {
            Some(index) => index,
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn push_bond(&mut self, from: usize, to: usize, weight: Complex64) {
        self.bonds.push(Bond { from, to, weight });
        self.bonds.push(Bond {
            from: to,
            to: from,
            weight: weight.conj(),
        });
    }

    /// Remove every orbital of `sublattice` in the anchor cell
    pub fn add_vacancy(&mut self, sublattice: &str) -> Result<&mut Self, DisorderError> {
        let (first, count) = self.orbitals(sublattice)?;
        self.vacancies.extend(first..first + count);
        Ok(self)
    }

    /// Add a bond between `from` in the cell at `from_offset` and `to` in the cell at `to_offset`.
    /// A bond from a site to itself is an onsite perturbation.
    pub fn add_bond(
        &mut self,
        from_offset: &[i32],
        from: &str,
        to_offset: &[i32],
        to: &str,
        energy: impl Into<Energy>,
    ) -> Result<&mut Self, DisorderError> {
        self.check_offset(from_offset, "structural bond origin")?;
        self.check_offset(to_offset, "structural bond target")?;
        if from == to && from_offset == to_offset {
            return self.add_onsite(from_offset, from, energy);
        }
        let energy = energy.into();
        let (from_first, from_count) = self.orbitals(from)?;
        let (to_first, to_count) = self.orbitals(to)?;
        if energy.shape() != (from_count, to_count) {
            return Err(DisorderError::EnergyShape {
                context: "structural bond",
                expected: (from_count, to_count),
                found: energy.shape(),
            });
        }

        let matrix = energy.matrix();
        for row in 0..from_count {
            for col in 0..to_count {
                let weight = matrix[(row, col)];
                if weight.is_zero() {
                    continue;
                }
                let a = self.node(from_offset, from_first + row);
                let b = self.node(to_offset, to_first + col);
                self.push_bond(a, b, weight);
            }
        }
        self.bond_cells
            .push((from_offset.to_vec(), to_offset.to_vec()));
        Ok(self)
    }

    /// Add an onsite perturbation on `sublattice` in the cell at `offset`. The diagonal shifts the
    /// onsite energy of each orbital, the upper triangle couples orbitals of the same site.
    pub fn add_onsite(
        &mut self,
        offset: &[i32],
        sublattice: &str,
        energy: impl Into<Energy>,
    ) -> Result<&mut Self, DisorderError> {
        self.check_offset(offset, "structural onsite")?;
        let energy = energy.into();
        let (first, count) = self.orbitals(sublattice)?;
        if energy.shape() != (count, count) {
            return Err(DisorderError::EnergyShape {
                context: "structural onsite",
                expected: (count, count),
                found: energy.shape(),
            });
        }
        let matrix = energy.matrix();
        for row in 0..count {
            let node = self.node(offset, first + row);
            if matrix[(row, row)].im != 0_f64 {
                tracing::warn!(
                    "Dropping the imaginary part of the structural onsite energy on `{}`",
                    sublattice
                );
            }
            self.onsite.push((node, matrix[(row, row)].re));
            for col in row + 1..count {
                if matrix[(row, col)].is_zero() {
                    continue;
                }
                let other = self.node(offset, first + col);
                self.push_bond(node, other, matrix[(row, col)]);
            }
        }
        Ok(self)
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Orbitals removed in the anchor cell
    pub fn vacancies(&self) -> &[usize] {
        &self.vacancies
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// `(node, energy)` for every onsite perturbation
    pub fn onsite(&self) -> &[(usize, f64)] {
        &self.onsite
    }

    pub fn dim(&self) -> usize {
        self.layout.dim()
    }

    pub(crate) fn check_lattice(&self, lattice: &Lattice) -> Result<(), DisorderError> {
        self.layout.check(lattice, "structural disorder")
    }

    /// True if the object perturbs bonds or onsite energies, as opposed to only removing orbitals
    pub fn has_perturbations(&self) -> bool {
        !self.bonds.is_empty() || !self.onsite.is_empty()
    }

    /// Bonds whose ends lie further apart than neighbouring cells
    pub fn long_bonds(&self) -> impl Iterator<Item = &(Vec<i32>, Vec<i32>)> {
        self.bond_cells.iter().filter(|(from, to)| {
            let distance: i32 = from.iter().zip(to).map(|(a, b)| (a - b).pow(2)).sum();
            distance > 1
        })
    }

    /// The largest change the pattern can make to the spectral bounds
    pub(crate) fn bound_widening(&self) -> f64 {
        let bonds: f64 = self.bonds.iter().map(|bond| bond.weight.norm()).sum();
        let onsite = self
            .onsite
            .iter()
            .fold(0_f64, |acc, (_, energy)| acc.max(energy.abs()));
        bonds + onsite
    }
}
