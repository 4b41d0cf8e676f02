use crate::error::ExportError;
use crate::spectral::{EstimateBounds, SpectralBounds};
use crate::system::{Configuration, Disorder, ResolvedConfiguration, StructuralDisorder};
use kite_lattice::Lattice;

/// Fix the energy scale and shift, from the spectrum range of the configuration when given and from
/// the estimated spectral bounds otherwise
pub(super) fn resolve(
    configuration: Configuration,
    lattice: &Lattice,
    disorder: Option<&Disorder>,
    structural_disorder: &[StructuralDisorder],
    estimator: &dyn EstimateBounds,
    safety_factor: f64,
) -> Result<ResolvedConfiguration, ExportError> {
    match configuration.spectrum_range() {
        Some([minimum, maximum]) => {
            tracing::info!("Using the spectrum range [{}, {}] eV", minimum, maximum);
            let bounds = SpectralBounds { minimum, maximum };
            Ok(ResolvedConfiguration::new(
                configuration,
                bounds.energy_scale(1_f64),
                bounds.energy_shift(),
                false,
            ))
        }
        None => {
            tracing::info!(
                "Estimating the spectrum bounds, set a spectrum range if the results look wrong"
            );
            let bounds = estimator.estimate(lattice, disorder, structural_disorder)?;
            Ok(ResolvedConfiguration::new(
                configuration,
                bounds.energy_scale(safety_factor),
                bounds.energy_shift(),
                true,
            ))
        }
    }
}
