use super::{EstimateBounds, SpectralBounds};
use crate::error::HamiltonianError;
use crate::hamiltonian::HamiltonianBuilder;
use crate::system::{Disorder, StructuralDisorder};
use kite_lattice::Lattice;

#[derive(Clone, Copy, Debug, Default)]
/// Bounds the spectrum by the union of the Gershgorin discs of the Bloch Hamiltonian.
///
/// Every eigenvalue lies within `radius` of the centre of some row, where the centre is the onsite
/// energy of the orbital and the radius is the summed magnitude of every other hopping leaving it.
pub struct GershgorinEstimator;

impl EstimateBounds for GershgorinEstimator {
    #[tracing::instrument(name = "Gershgorin estimate", level = "info", skip(self, lattice, disorder, structural_disorder))]
    fn estimate(
        &self,
        lattice: &Lattice,
        disorder: Option<&Disorder>,
        structural_disorder: &[StructuralDisorder],
    ) -> Result<SpectralBounds, HamiltonianError> {
        let table = HamiltonianBuilder::new().with_lattice(lattice).build()?;

        let mut centres = vec![0_f64; table.num_orbitals()];
        let mut radii = vec![0_f64; table.num_orbitals()];
        for (from, offset, to, weight) in table.edges() {
            if to == from && offset.iter().all(|x| *x == 0) {
                centres[from] += weight.re;
            } else {
                radii[from] += weight.norm();
            }
        }
        if let Some(disorder) = disorder {
            for entry in disorder.entries() {
                centres[entry.orbital] += entry.mean;
                radii[entry.orbital] += entry.distribution.half_width(entry.stdev);
            }
        }

        let mut bounds = centres.iter().zip(&radii).fold(
            SpectralBounds {
                minimum: f64::INFINITY,
                maximum: f64::NEG_INFINITY,
            },
            |bounds, (centre, radius)| SpectralBounds {
                minimum: bounds.minimum.min(centre - radius),
                maximum: bounds.maximum.max(centre + radius),
            },
        );

        let structural = structural_disorder
            .iter()
            .map(StructuralDisorder::bound_widening)
            .fold(0_f64, f64::max);
        bounds = bounds.widen(structural);

        if bounds.maximum - bounds.minimum <= f64::EPSILON * bounds.maximum.abs().max(1_f64) {
            tracing::warn!(
                "The estimated spectrum collapses to a single energy {}, widening it by 1 eV",
                bounds.maximum
            );
            bounds = bounds.widen(1_f64);
        }
        tracing::info!(
            "Estimated spectral bounds [{:.4}, {:.4}] eV",
            bounds.minimum,
            bounds.maximum
        );
        Ok(bounds)
    }
}

#[cfg(test)]
mod test {
    use super::GershgorinEstimator;
    use crate::spectral::EstimateBounds;
    use crate::system::{Disorder, Distribution, Placement, StructuralDisorder};
    use approx::assert_relative_eq;
    use kite_lattice::Lattice;

    fn chain(onsite: f64) -> Lattice {
        let mut lattice = Lattice::from_rows(&[&[1.]]).unwrap();
        lattice
            .add_sublattice("A", &[0.], onsite)
            .unwrap()
            .add_sublattice("B", &[0.5], onsite)
            .unwrap()
            .add_hopping(&[0], "A", "B", -1.)
            .unwrap();
        lattice
    }

    #[test]
    fn two_site_chain_is_bounded_by_its_hopping() {
        let bounds = GershgorinEstimator.estimate(&chain(0.), None, &[]).unwrap();
        assert_relative_eq!(bounds.minimum, -1.);
        assert_relative_eq!(bounds.maximum, 1.);
        assert_relative_eq!(bounds.energy_scale(0.9), 1. / 0.9);
        assert_relative_eq!(bounds.energy_shift(), 0.);
    }

    #[test]
    fn onsite_energy_moves_the_centre() {
        let bounds = GershgorinEstimator.estimate(&chain(2.), None, &[]).unwrap();
        assert_relative_eq!(bounds.minimum, 1.);
        assert_relative_eq!(bounds.maximum, 3.);
    }

    #[test]
    fn disorder_widens_the_bounds() {
        let lattice = chain(0.);
        let mut disorder = Disorder::new(&lattice);
        disorder
            .add_disorder("A", Distribution::Uniform, &[0.5], &[1.])
            .unwrap();
        let bounds = GershgorinEstimator
            .estimate(&lattice, Some(&disorder), &[])
            .unwrap();
        assert_relative_eq!(bounds.minimum, -0.5 - 3_f64.sqrt());
        assert_relative_eq!(bounds.maximum, 1.5 + 3_f64.sqrt());

        let mut structural = StructuralDisorder::new(&lattice, Placement::Concentration(0.1)).unwrap();
        structural.add_onsite(&[0], "B", -0.5).unwrap();
        let bounds = GershgorinEstimator
            .estimate(&lattice, None, &[structural])
            .unwrap();
        assert_relative_eq!(bounds.minimum, -1.5);
        assert_relative_eq!(bounds.maximum, 1.5);
    }

    #[test]
    fn flat_spectra_are_widened() {
        let mut lattice = Lattice::from_rows(&[&[1.]]).unwrap();
        lattice.add_sublattice("A", &[0.], 0.3).unwrap();
        let bounds = GershgorinEstimator.estimate(&lattice, None, &[]).unwrap();
        assert_relative_eq!(bounds.minimum, -0.7);
        assert_relative_eq!(bounds.maximum, 1.3);
    }
}
