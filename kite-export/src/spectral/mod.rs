//! Spectral bounds of the simulated Hamiltonian
//!
//! The engine expands its operators in Chebyshev polynomials, which requires the spectrum to be mapped
//! into `[-1, 1]`. When no spectrum range is given the bounds are estimated from the hopping table and
//! the disorder, and the rescaling keeps a margin set by a safety factor.

mod gershgorin;

pub use gershgorin::GershgorinEstimator;

use crate::error::HamiltonianError;
use crate::system::{Disorder, StructuralDisorder};
use kite_lattice::Lattice;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Lower and upper bound of a spectrum in eV
pub struct SpectralBounds {
    pub minimum: f64,
    pub maximum: f64,
}

impl SpectralBounds {
    /// Half width of the spectrum divided by `safety_factor`
    pub fn energy_scale(&self, safety_factor: f64) -> f64 {
        (self.maximum - self.minimum) / (2_f64 * safety_factor)
    }

    /// Centre of the spectrum
    pub fn energy_shift(&self) -> f64 {
        (self.maximum + self.minimum) / 2_f64
    }

    /// Widen both bounds by `amount`
    pub(crate) fn widen(self, amount: f64) -> Self {
        Self {
            minimum: self.minimum - amount,
            maximum: self.maximum + amount,
        }
    }
}

/// Estimates an interval containing the whole spectrum of a disordered lattice
pub trait EstimateBounds {
    fn estimate(
        &self,
        lattice: &Lattice,
        disorder: Option<&Disorder>,
        structural_disorder: &[StructuralDisorder],
    ) -> Result<SpectralBounds, HamiltonianError>;
}
