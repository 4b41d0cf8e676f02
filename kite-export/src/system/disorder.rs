//! Onsite disorder
//!
//! Each orbital of a sublattice can carry any number of random onsite terms. An `add_disorder` call on
//! a sublattice with `n` orbitals creates `n` entries, one per orbital. The engine receives the entries
//! as flat arrays together with a table mapping the `k`-th entry acting on each orbital to its index.

use super::OrbitalLayout;
use crate::error::DisorderError;
use kite_lattice::Lattice;
use ndarray::Array2;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Distribution {
    Gaussian,
    Uniform,
    /// A fixed shift of the onsite energy, the deviation is ignored
    Deterministic,
}

impl Distribution {
    pub fn code(&self) -> i32 {
        match self {
            Distribution::Gaussian => 1,
            Distribution::Uniform => 2,
            Distribution::Deterministic => 3,
        }
    }

    /// Half width of the energy window holding the distribution, `stdev` is the standard deviation
    pub(crate) fn half_width(&self, stdev: f64) -> f64 {
        match self {
            Distribution::Gaussian => 3_f64 * stdev,
            Distribution::Uniform => 3_f64.sqrt() * stdev,
            Distribution::Deterministic => 0_f64,
        }
    }
}

impl FromStr for Distribution {
    type Err = DisorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gaussian" => Ok(Distribution::Gaussian),
            "uniform" => Ok(Distribution::Uniform),
            "deterministic" => Ok(Distribution::Deterministic),
            _ => Err(DisorderError::UnknownDistribution(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A single random onsite term acting on one orbital
pub struct DisorderEntry {
    pub distribution: Distribution,
    /// Mean value in eV
    pub mean: f64,
    /// Standard deviation in eV
    pub stdev: f64,
    pub orbital: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// Onsite disorder of a lattice
pub struct Disorder {
    layout: OrbitalLayout,
    entries: Vec<DisorderEntry>,
}

impl Disorder {
    pub fn new(lattice: &Lattice) -> Self {
        Self {
            layout: OrbitalLayout::new(lattice),
            entries: Vec::new(),
        }
    }

    /// Add a distribution to every orbital of `sublattice`. `mean` and `stdev` hold a single value
    /// shared by every orbital, or one value per orbital.
    pub fn add_disorder(
        &mut self,
        sublattice: &str,
        distribution: Distribution,
        mean: &[f64],
        stdev: &[f64],
    ) -> Result<&mut Self, DisorderError> {
        let (first, count) = self
            .layout
            .orbitals(sublattice)
            .ok_or_else(|| DisorderError::UnknownSublattice(sublattice.to_string()))?;
        for values in [mean, stdev] {
            if values.len() != 1 && values.len() != count {
                return Err(DisorderError::OrbitalMismatch {
                    name: sublattice.to_string(),
                    expected: count,
                    found: values.len(),
                });
            }
        }
        if let Some(negative) = stdev.iter().find(|x| **x < 0_f64) {
            return Err(DisorderError::NegativeDeviation(*negative));
        }

        let value = |values: &[f64], index: usize| values[index.min(values.len() - 1)];
        for index in 0..count {
            self.entries.push(DisorderEntry {
                distribution,
                mean: value(mean, index),
                stdev: value(stdev, index),
                orbital: first + index,
            });
        }
        Ok(self)
    }

    pub fn entries(&self) -> &[DisorderEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn num_orbitals(&self) -> usize {
        self.layout.num_orbitals()
    }

    pub(crate) fn check_lattice(&self, lattice: &Lattice) -> Result<(), DisorderError> {
        self.layout.check(lattice, "onsite disorder")
    }

    /// Table of shape `[k, orbital]` holding the index of the `k`-th entry acting on each orbital,
    /// or `-1` where an orbital carries fewer than `k + 1` entries
    pub fn orbital_table(&self) -> Array2<i32> {
        let num_orbitals = self.layout.num_orbitals();
        let mut per_orbital = vec![Vec::new(); num_orbitals];
        for (index, entry) in self.entries.iter().enumerate() {
            per_orbital[entry.orbital].push(index as i32);
        }
        let depth = per_orbital.iter().map(Vec::len).max().unwrap_or(0);
        let mut table = Array2::from_elem((depth, num_orbitals), -1);
        for (orbital, indices) in per_orbital.iter().enumerate() {
            for (k, index) in indices.iter().enumerate() {
                table[[k, orbital]] = *index;
            }
        }
        table
    }
}

#[cfg(test)]
mod test {
    use super::{Disorder, Distribution};
    use crate::error::DisorderError;
    use kite_lattice::Lattice;
    use nalgebra::DMatrix;

    fn two_sites() -> Lattice {
        let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0., 1.]]).unwrap();
        lattice
            .add_sublattice("A", &[0., 0.], DMatrix::<f64>::zeros(2, 2))
            .unwrap()
            .add_sublattice("B", &[0.5, 0.5], 0.)
            .unwrap();
        lattice
    }

    #[test]
    fn distributions_parse_case_insensitively() {
        assert_eq!("Gaussian".parse::<Distribution>().unwrap(), Distribution::Gaussian);
        assert_eq!("uniform".parse::<Distribution>().unwrap().code(), 2);
        assert_eq!("Deterministic".parse::<Distribution>().unwrap().code(), 3);
        assert!(matches!(
            "Lorentzian".parse::<Distribution>(),
            Err(DisorderError::UnknownDistribution(_))
        ));
    }

    #[test]
    fn one_entry_is_created_per_orbital() {
        let mut disorder = Disorder::new(&two_sites());
        disorder
            .add_disorder("A", Distribution::Gaussian, &[0.1], &[0.2, 0.3])
            .unwrap()
            .add_disorder("B", Distribution::Uniform, &[0.], &[1.])
            .unwrap()
            .add_disorder("A", Distribution::Deterministic, &[0.5], &[0.])
            .unwrap();
        assert_eq!(disorder.entries().len(), 5);
        assert_eq!(disorder.entries()[1].orbital, 1);
        assert_eq!(disorder.entries()[1].stdev, 0.3);
        assert_eq!(disorder.entries()[2].orbital, 2);

        let table = disorder.orbital_table();
        assert_eq!(table.shape(), &[2, 3]);
        assert_eq!(table.row(0).to_vec(), vec![0, 1, 2]);
        assert_eq!(table.row(1).to_vec(), vec![3, 4, -1]);
    }

    #[test]
    fn invalid_disorder_is_rejected() {
        let mut disorder = Disorder::new(&two_sites());
        assert!(matches!(
            disorder.add_disorder("C", Distribution::Gaussian, &[0.], &[1.]),
            Err(DisorderError::UnknownSublattice(_))
        ));
        assert!(matches!(
            disorder.add_disorder("A", Distribution::Gaussian, &[0., 0., 0.], &[1.]),
            Err(DisorderError::OrbitalMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
        assert!(matches!(
            disorder.add_disorder("B", Distribution::Uniform, &[0.], &[-1.]),
            Err(DisorderError::NegativeDeviation(_))
        ));
        assert!(disorder.is_empty());
    }
}
