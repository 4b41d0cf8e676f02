//! Sample lattices shared by the integration tests and benchmarks

use kite_lattice::Lattice;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::{thread_rng, Rng};

/// A one dimensional chain with nearest neighbour hopping `t`
pub fn chain(t: f64) -> Lattice {
    let mut lattice = Lattice::from_rows(&[&[1.]]).expect("Chain vectors are valid");
    lattice
        .add_sublattice("A", &[0.], 0.)
        .expect("Sublattice is valid")
        .add_hopping(&[1], "A", "A", t)
        .expect("Hopping is valid");
    lattice
}

/// A square lattice with nearest neighbour hopping `t`
pub fn square(t: f64) -> Lattice {
    let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0., 1.]]).expect("Square vectors are valid");
    lattice
        .add_sublattice("A", &[0., 0.], 0.)
        .expect("Sublattice is valid")
        .add_hopping(&[1, 0], "A", "A", t)
        .expect("Hopping is valid")
        .add_hopping(&[0, 1], "A", "A", t)
        .expect("Hopping is valid");
    lattice
}

/// Graphene with lattice constant 0.246 nm, nearest neighbour hopping `t` and a staggered onsite
/// potential `delta`
pub fn honeycomb(t: f64, delta: f64) -> Lattice {
    let a = 0.24595;
    let a_cc = 0.142;
    let mut lattice = Lattice::from_rows(&[&[a, 0.], &[a / 2., a / 2. * 3_f64.sqrt()]])
        .expect("Honeycomb vectors are valid");
    lattice
        .add_sublattice("A", &[0., -a_cc / 2.], -delta / 2.)
        .expect("Sublattice is valid")
        .add_sublattice("B", &[0., a_cc / 2.], delta / 2.)
        .expect("Sublattice is valid")
        .register_hopping_energy("t", t)
        .expect("Hopping energy is valid")
        .add_hopping(&[0, 0], "A", "B", "t")
        .expect("Hopping is valid")
        .add_hopping(&[1, -1], "A", "B", "t")
        .expect("Hopping is valid")
        .add_hopping(&[0, -1], "A", "B", "t")
        .expect("Hopping is valid");
    lattice
}

/// A simple cubic lattice with nearest neighbour hopping `t`
pub fn cube(t: f64) -> Lattice {
    let mut lattice = Lattice::from_rows(&[&[1., 0., 0.], &[0., 1., 0.], &[0., 0., 1.]])
        .expect("Cubic vectors are valid");
    lattice
        .add_sublattice("A", &[0., 0., 0.], 0.)
        .expect("Sublattice is valid")
        .add_hopping(&[1, 0, 0], "A", "A", t)
        .expect("Hopping is valid")
        .add_hopping(&[0, 1, 0], "A", "A", t)
        .expect("Hopping is valid")
        .add_hopping(&[0, 0, 1], "A", "A", t)
        .expect("Hopping is valid");
    lattice
}

/// A square lattice with a two orbital site and a complex spin-orbit like hopping, which is complex
/// and has off-diagonal onsite terms
pub fn two_orbital_square() -> Lattice {
    let onsite = DMatrix::from_row_slice(
        2,
        2,
        &[
            Complex64::new(0.5, 0.),
            Complex64::new(0.1, 0.),
            Complex64::new(0.1, 0.),
            Complex64::new(-0.5, 0.),
        ],
    );
    let hopping = DMatrix::from_row_slice(
        2,
        2,
        &[
            Complex64::new(-1., 0.),
            Complex64::new(0., 0.2),
            Complex64::new(0., 0.2),
            Complex64::new(-1., 0.),
        ],
    );
    let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0., 1.]]).expect("Square vectors are valid");
    lattice
        .add_sublattice("A", &[0., 0.], onsite)
        .expect("Sublattice is valid")
        .add_hopping(&[1, 0], "A", "A", hopping.clone())
        .expect("Hopping is valid")
        .add_hopping(&[0, 1], "A", "A", hopping)
        .expect("Hopping is valid");
    lattice
}

/// A square lattice with `num_sublattices` sites in the unit cell, random onsite energies and random
/// hoppings connecting every pair of sites in neighbouring cells
pub fn random_square(num_sublattices: usize) -> Lattice {
    let mut rng = thread_rng();
    let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0., 1.]]).expect("Square vectors are valid");
    for index in 0..num_sublattices {
        let x = index as f64 / num_sublattices as f64;
        lattice
            .add_sublattice(&format!("S{}", index), &[x, 0.], rng.gen_range(-1_f64..1_f64))
            .expect("Sublattice is valid");
    }
    for from in 0..num_sublattices {
        for to in 0..num_sublattices {
            for offset in [[1, 0], [0, 1], [1, 1]] {
                let energy = Complex64::new(rng.gen_range(-1_f64..1_f64), rng.gen_range(-0.5_f64..0.5_f64));
                lattice
                    .add_hopping(&offset, &format!("S{}", from), &format!("S{}", to), energy)
                    .expect("Hopping is valid");
            }
            if from < to {
                lattice
                    .add_hopping(&[0, 0], &format!("S{}", from), &format!("S{}", to), rng.gen_range(-1_f64..1_f64))
                    .expect("Hopping is valid");
            }
        }
    }
    lattice
}
