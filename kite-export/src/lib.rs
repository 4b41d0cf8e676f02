// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Kite-export writes the input files of the KITE quantum transport engine
//!
//! # Overview
//! The engine evaluates spectral quantities of tight-binding systems with billions of orbitals through
//! Chebyshev expansions. It does not know about lattices: it reads a flat, orbital-indexed table of the
//! hoppings leaving each orbital of the unit cell, the size and boundary conditions of the sample, a
//! spectrum rescaled into `[-1, 1]` and the list of quantities to compute. Kite-export builds all of
//! these from a lattice described with `kite_lattice`, checks them for consistency, and writes them
//! into a single hierarchical file.
//!
//! # Usage
//! A system can be exported from Rust through the `ExportBuilder`, or from the command line by
//! describing it in a `.toml` file:
//!
//! ```toml
//! [lattice]
//! vectors = [[1.0, 0.0], [0.0, 1.0]]
//!
//! [[lattice.sublattices]]
//! name = "A"
//! position = [0.0, 0.0]
//! energy = 0.0
//!
//! [[lattice.hoppings]]
//! relative_index = [1, 0]
//! from = "A"
//! to = "A"
//! energy = -1.0
//!
//! [[lattice.hoppings]]
//! relative_index = [0, 1]
//! from = "A"
//! to = "A"
//! energy = -1.0
//!
//! [configuration]
//! divisions = [2, 2]
//! length = [256, 256]
//! boundaries = ["periodic", "periodic"]
//!
//! [[calculation.dos]]
//! num_points = 1000
//! num_moments = 512
//! num_random = 1
//! ```
//!
//! and running `kite-export system.toml -o config.h5`. Further `[[calculation.<kind>]]` tables request
//! other quantities, and `[[disorder]]`, `[[structural_disorder]]` and `[modification]` describe
//! disorder and magnetic fields.

#![allow(clippy::type_complexity)]

/// The command line application and its telemetry
pub mod app;

/// Physical constants
mod constants;

/// Hierarchical output container
pub mod container;

/// Error handling
mod error;

/// Assembly of the engine input
pub mod export;

/// Flattening of lattices into hopping tables
pub mod hamiltonian;

/// Spectral bound estimation
pub mod spectral;

/// Configuration, calculations, disorder and the system reader
pub mod system;

/// Helper functions and traits
mod utilities;

pub use error::*;
pub use export::{config_system, Export, ExportBuilder};
