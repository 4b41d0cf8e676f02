//! Lattice primitives for the KITE exporter
//!
//! Describes a crystal through its primitive vectors, the sites of the unit cell and the hopping terms
//! between them. The exporter consumes a `Lattice` to build the orbital-indexed hopping table.

mod energy;
mod error;
mod lattice;

pub use energy::*;
pub use error::*;
pub use lattice::*;
