//! Lattice description
//!
//! A `Lattice` holds the primitive vectors of a crystal, the sites of its unit cell and the hopping
//! terms which connect them. Sites are grouped by `alias_id`: an alias shares the orbital layout of
//! the sublattice it was created from but lives at its own position, so orbitals are enumerated over
//! alias ids rather than over sublattices.
//!
//! ```ignore
//! let mut lattice = Lattice::from_rows(&[&[1.0]])?;
//! lattice
//!     .add_sublattice("A", &[0.0], 0.0)?
//!     .add_sublattice("B", &[0.5], 0.0)?
//!     .add_hopping(&[0], "A", "B", -1.0)?;
//! ```

use super::{Energy, HoppingEnergy, LatticeError};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

#[derive(Clone, Debug)]
/// A site of the unit cell
pub struct Sublattice {
    name: String,
    position: DVector<f64>,
    energy: Energy,
    alias_id: usize,
    is_alias: bool,
}

impl Sublattice {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cartesian position of the site in the unit cell
    pub fn position(&self) -> &DVector<f64> {
        &self.position
    }

    /// The onsite energy block, square with one row per orbital
    pub fn energy(&self) -> &Energy {
        &self.energy
    }

    pub fn alias_id(&self) -> usize {
        self.alias_id
    }

    pub fn is_alias(&self) -> bool {
        self.is_alias
    }

    pub fn num_orbitals(&self) -> usize {
        self.energy.shape().0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A single hopping from a site in the reference cell to a site in the cell displaced by
/// `relative_index` lattice vectors
pub struct HoppingTerm {
    relative_index: Vec<i32>,
    from: usize,
    to: usize,
}

impl HoppingTerm {
    pub fn relative_index(&self) -> &[i32] {
        &self.relative_index
    }

    /// Index of the source sublattice in `Lattice::sublattices`
    pub fn from(&self) -> usize {
        self.from
    }

    /// Index of the target sublattice in `Lattice::sublattices`
    pub fn to(&self) -> usize {
        self.to
    }
}

#[derive(Clone, Debug)]
/// A named hopping energy and every term which uses it
pub struct HoppingFamily {
    name: String,
    energy: Energy,
    terms: Vec<HoppingTerm>,
}

impl HoppingFamily {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn energy(&self) -> &Energy {
        &self.energy
    }

    pub fn terms(&self) -> &[HoppingTerm] {
        &self.terms
    }
}

#[derive(Clone, Debug)]
/// A crystal lattice, with primitive vectors stored as the rows of `vectors`
pub struct Lattice {
    vectors: DMatrix<f64>,
    sublattices: Vec<Sublattice>,
    hoppings: Vec<HoppingFamily>,
    num_aliases: usize,
    num_anonymous: usize,
}

impl Lattice {
    /// Create an empty lattice from the primitive vectors, each row of `vectors` is one vector
    pub fn new(vectors: DMatrix<f64>) -> Result<Self, LatticeError> {
        let (rows, cols) = vectors.shape();
        if rows != cols || rows == 0 || rows > 3 {
            return Err(LatticeError::VectorShape { rows, cols });
        }
        let scale = vectors.iter().fold(0_f64, |acc, x| acc.max(x.abs()));
        if scale == 0_f64 || vectors.determinant().abs() <= f64::EPSILON * scale.powi(rows as i32) {
            return Err(LatticeError::SingularVectors);
        }
        Ok(Self {
            vectors,
            sublattices: Vec::new(),
            hoppings: Vec::new(),
            num_aliases: 0,
            num_anonymous: 0,
        })
    }

    /// Create an empty lattice from a slice of primitive vectors
    pub fn from_rows(vectors: &[&[f64]]) -> Result<Self, LatticeError> {
        let rows = vectors.len();
        let cols = vectors.first().map(|row| row.len()).unwrap_or(0);
        if let Some(row) = vectors.iter().find(|row| row.len() != cols) {
            return Err(LatticeError::VectorShape {
                rows,
                cols: row.len(),
            });
        }
        let flat = vectors
            .iter()
            .flat_map(|row| row.iter().copied())
            .collect::<Vec<_>>();
        Self::new(DMatrix::from_row_slice(rows, cols, &flat))
    }

    /// The spatial dimension of the lattice
    pub fn ndim(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn vectors(&self) -> &DMatrix<f64> {
        &self.vectors
    }

    /// The reciprocal vectors as rows, satisfying `a_i . b_j = 2 pi delta_ij`
    pub fn reciprocal_vectors(&self) -> Result<DMatrix<f64>, LatticeError> {
        let inverse = self
            .vectors
            .clone()
            .try_inverse()
            .ok_or(LatticeError::SingularVectors)?;
        Ok(inverse.transpose() * (2_f64 * PI))
    }

    pub fn sublattices(&self) -> &[Sublattice] {
        &self.sublattices
    }

    pub fn sublattice(&self, name: &str) -> Option<&Sublattice> {
        self.sublattices.iter().find(|sub| sub.name == name)
    }

    fn sublattice_index(&self, name: &str) -> Result<usize, LatticeError> {
        self.sublattices
            .iter()
            .position(|sub| sub.name == name)
            .ok_or_else(|| LatticeError::UnknownSublattice(name.to_string()))
    }

    pub fn hoppings(&self) -> &[HoppingFamily] {
        &self.hoppings
    }

    pub fn hopping(&self, name: &str) -> Option<&HoppingFamily> {
        self.hoppings.iter().find(|family| family.name == name)
    }

    /// Number of distinct alias ids, which is the number of orbital blocks in the unit cell
    pub fn nsub(&self) -> usize {
        self.num_aliases
    }

    /// Number of orbitals carried by each alias id
    pub fn orbital_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_aliases];
        for sub in self.sublattices.iter().filter(|sub| !sub.is_alias) {
            counts[sub.alias_id] = sub.num_orbitals();
        }
        counts
    }

    /// Exclusive prefix sum of `orbital_counts`, the first orbital index of each alias id
    pub fn orbitals_before(&self) -> Vec<usize> {
        self.orbital_counts()
            .iter()
            .scan(0, |acc, &count| {
                let before = *acc;
                *acc += count;
                Some(before)
            })
            .collect()
    }

    /// Total number of orbitals in the unit cell
    pub fn num_orbitals(&self) -> usize {
        self.orbital_counts().iter().sum()
    }

    /// The position of each alias id, taken from the sublattice which introduced it
    pub fn alias_positions(&self) -> Vec<&DVector<f64>> {
        self.sublattices
            .iter()
            .filter(|sub| !sub.is_alias)
            .map(|sub| &sub.position)
            .collect()
    }

    /// True if any onsite or hopping energy has a nonzero imaginary part
    pub fn has_complex_energies(&self) -> bool {
        self.sublattices.iter().any(|sub| sub.energy.is_complex())
            || self.hoppings.iter().any(|family| family.energy.is_complex())
    }

    /// Add a site at Cartesian `position` with onsite energy `energy`. A square matrix defines a
    /// multi-orbital site.
    pub fn add_sublattice(
        &mut self,
        name: &str,
        position: &[f64],
        energy: impl Into<Energy>,
    ) -> Result<&mut Self, LatticeError> {
        let energy = energy.into();
        self.check_new_sublattice(name, position)?;
        if !energy.is_square() {
            let (rows, cols) = energy.shape();
            return Err(LatticeError::NonSquareOnsite {
                name: name.to_string(),
                rows,
                cols,
            });
        }
        self.sublattices.push(Sublattice {
            name: name.to_string(),
            position: DVector::from_column_slice(position),
            energy,
            alias_id: self.num_aliases,
            is_alias: false,
        });
        self.num_aliases += 1;
        Ok(self)
    }

    /// Add a site which shares the orbitals of `original` but sits at a different position
    pub fn add_alias(
        &mut self,
        name: &str,
        original: &str,
        position: &[f64],
    ) -> Result<&mut Self, LatticeError> {
        self.check_new_sublattice(name, position)?;
        let original = &self.sublattices[self.sublattice_index(original)?];
        let alias = Sublattice {
            name: name.to_string(),
            position: DVector::from_column_slice(position),
            energy: original.energy.clone(),
            alias_id: original.alias_id,
            is_alias: true,
        };
        self.sublattices.push(alias);
        Ok(self)
    }

    fn check_new_sublattice(&self, name: &str, position: &[f64]) -> Result<(), LatticeError> {
        if self.sublattice(name).is_some() {
            return Err(LatticeError::DuplicateSublattice(name.to_string()));
        }
        if position.len() != self.ndim() {
            return Err(LatticeError::DimensionMismatch {
                context: format!("position of sublattice `{}`", name),
                expected: self.ndim(),
                found: position.len(),
            });
        }
        Ok(())
    }

    /// Register a named hopping energy which can later be referenced by `add_hopping`
    pub fn register_hopping_energy(
        &mut self,
        name: &str,
        energy: impl Into<Energy>,
    ) -> Result<&mut Self, LatticeError> {
        if self.hopping(name).is_some() {
            return Err(LatticeError::DuplicateHopping(name.to_string()));
        }
        self.hoppings.push(HoppingFamily {
            name: name.to_string(),
            energy: energy.into(),
            terms: Vec::new(),
        });
        Ok(self)
    }

    /// Connect `from` in the reference cell to `to` in the cell at `relative_index`. The reverse
    /// hopping is implied and must not be added.
    pub fn add_hopping(
        &mut self,
        relative_index: &[i32],
        from: &str,
        to: &str,
        energy: impl Into<HoppingEnergy>,
    ) -> Result<&mut Self, LatticeError> {
        if relative_index.len() != self.ndim() {
            return Err(LatticeError::DimensionMismatch {
                context: format!("relative index of hopping `{}` -> `{}`", from, to),
                expected: self.ndim(),
                found: relative_index.len(),
            });
        }
        let from_index = self.sublattice_index(from)?;
        let to_index = self.sublattice_index(to)?;
        if from_index == to_index && relative_index.iter().all(|x| *x == 0) {
            return Err(LatticeError::SelfHopping(from.to_string()));
        }

        let family_index = match energy.into() {
            HoppingEnergy::Family(name) => self
                .hoppings
                .iter()
                .position(|family| family.name == name)
                .ok_or(LatticeError::UnknownHopping(name))?,
            HoppingEnergy::Value(energy) => {
                let name = format!("__anonymous__{}", self.num_anonymous);
                self.num_anonymous += 1;
                self.register_hopping_energy(&name, energy)?;
                self.hoppings.len() - 1
            }
        };

        let expected = (
            self.sublattices[from_index].num_orbitals(),
            self.sublattices[to_index].num_orbitals(),
        );
        let family = &mut self.hoppings[family_index];
        if family.energy.shape() != expected {
            return Err(LatticeError::NonConformableHopping {
                family: family.name.clone(),
                from: from.to_string(),
                to: to.to_string(),
                expected,
                found: family.energy.shape(),
            });
        }
        family.terms.push(HoppingTerm {
            relative_index: relative_index.to_vec(),
            from: from_index,
            to: to_index,
        });
        Ok(self)
    }
}
