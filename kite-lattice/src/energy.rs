//! Onsite and hopping energies
//!
//! Every energy attached to a lattice is stored as a square or rectangular complex matrix. Scalars
//! become `1x1` matrices, so single-orbital and multi-orbital sites flow through the same code.

use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::Zero;

#[derive(Clone, Debug, PartialEq)]
/// An energy matrix in eV
pub struct Energy(DMatrix<Complex64>);

impl Energy {
    /// A zero energy block of the given shape
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(DMatrix::zeros(rows, cols))
    }

    /// The underlying matrix
    pub fn matrix(&self) -> &DMatrix<Complex64> {
        &self.0
    }

    /// Consume the wrapper and return the matrix
    pub fn into_matrix(self) -> DMatrix<Complex64> {
        self.0
    }

    /// The shape of the energy block as (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.0.shape()
    }

    pub fn is_square(&self) -> bool {
        self.0.nrows() == self.0.ncols()
    }

    /// True if any element carries a nonzero imaginary part
    pub fn is_complex(&self) -> bool {
        self.0.iter().any(|value| value.im != 0_f64)
    }

    /// True if every element is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|value| value.is_zero())
    }

    /// The conjugate transpose of the block
    pub fn adjoint(&self) -> Self {
        Self(self.0.adjoint())
    }
}

impl From<f64> for Energy {
    fn from(value: f64) -> Self {
        Self(DMatrix::from_element(1, 1, Complex64::from(value)))
    }
}

impl From<Complex64> for Energy {
    fn from(value: Complex64) -> Self {
        Self(DMatrix::from_element(1, 1, value))
    }
}

impl From<DMatrix<f64>> for Energy {
    fn from(value: DMatrix<f64>) -> Self {
        Self(value.map(Complex64::from))
    }
}

impl From<DMatrix<Complex64>> for Energy {
    fn from(value: DMatrix<Complex64>) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// The energy attached to a hopping term: either the name of a registered hopping family, or an
/// anonymous value which is registered on the fly
pub enum HoppingEnergy {
    Family(String),
    Value(Energy),
}

impl From<&str> for HoppingEnergy {
    fn from(value: &str) -> Self {
        Self::Family(value.to_string())
    }
}

impl From<String> for HoppingEnergy {
    fn from(value: String) -> Self {
        Self::Family(value)
    }
}

impl From<Energy> for HoppingEnergy {
    fn from(value: Energy) -> Self {
        Self::Value(value)
    }
}

impl From<f64> for HoppingEnergy {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<Complex64> for HoppingEnergy {
    fn from(value: Complex64) -> Self {
        Self::Value(value.into())
    }
}

impl From<DMatrix<f64>> for HoppingEnergy {
    fn from(value: DMatrix<f64>) -> Self {
        Self::Value(value.into())
    }
}

impl From<DMatrix<Complex64>> for HoppingEnergy {
    fn from(value: DMatrix<Complex64>) -> Self {
        Self::Value(value.into())
    }
}
