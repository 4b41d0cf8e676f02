#[derive(Clone, Copy, Debug, PartialEq)]
/// A perpendicular magnetic field, snapped to the closest field commensurate with the system
pub enum Modification {
    /// Field strength in Tesla
    MagneticField(f64),
    /// Number of flux quanta per unit cell, in units of `1 / L[1]`
    Flux(f64),
}

impl Modification {
    /// False for a vanishing field or flux
    pub fn is_applied(&self) -> bool {
        match self {
            Modification::MagneticField(value) | Modification::Flux(value) => *value != 0_f64,
        }
    }
}
