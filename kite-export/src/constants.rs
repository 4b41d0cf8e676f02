// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Defines physical constants and numerical factors used in the export

pub const HBAR: f64 = 6.58211899e-16; // Reduced Planck constant in eV s
pub const FLUX_QUANTUM: f64 = 2. * std::f64::consts::PI * HBAR; // Flux quantum h / e in V s
pub const NM2_TO_M2: f64 = 1e-18; // Converts an area in nm^2 to m^2
pub const SAFETY_FACTOR: f64 = 0.9; // Fraction of [-1, 1] occupied by the rescaled spectrum
