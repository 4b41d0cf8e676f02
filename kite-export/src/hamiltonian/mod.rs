//! Hamiltonian module
//!
//! Flattens a `Lattice` into the canonical hopping table consumed by the engine:
//! - `NHoppings`: the number of nonzero hoppings leaving each orbital of the unit cell
//! - `d`: the packed destination of each hopping, see `decode_destination`
//! - `Hoppings`: the weight of each hopping
//!
//! Onsite energies are zero-offset hoppings, every hopping term is paired with its Hermitian partner,
//! and rows are sorted by destination and right-padded with zeros. A table is constructed through the
//! `HamiltonianBuilder` as
//!
//! ```ignore
//! HamiltonianBuilder::new()
//!     .with_lattice(&lattice)
//!     .with_energy_shift(shift)
//!     .with_complex(true)
//!     .build()?;
//! ```
//!
//! An auxiliary operator lattice is extracted against the orbitals of a parent lattice by attaching an
//! `OrbitalReference` with `with_reference`.

mod global;
mod local;

pub use local::decode_destination;

use crate::error::HamiltonianError;
use kite_lattice::Lattice;
use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;

#[derive(Clone, Debug, PartialEq)]
/// The canonical hopping table of a lattice
pub struct HoppingTable {
    num_hoppings: Array1<u32>,
    destinations: Array2<i32>,
    hoppings: Array2<Complex64>,
    orbital_counts: Vec<usize>,
    dim: usize,
}

impl HoppingTable {
    pub fn num_hoppings(&self) -> &Array1<u32> {
        &self.num_hoppings
    }

    pub fn destinations(&self) -> &Array2<i32> {
        &self.destinations
    }

    pub fn hoppings(&self) -> &Array2<Complex64> {
        &self.hoppings
    }

    /// Number of orbitals on each alias id
    pub fn orbital_counts(&self) -> &[usize] {
        &self.orbital_counts
    }

    pub fn num_orbitals(&self) -> usize {
        self.num_hoppings.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The nonzero `(destination, weight)` pairs leaving `orbital`
    pub fn row(&self, orbital: usize) -> (ArrayView1<'_, i32>, ArrayView1<'_, Complex64>) {
        let length = self.num_hoppings[orbital] as usize;
        (
            self.destinations.row(orbital).slice_move(ndarray::s![..length]),
            self.hoppings.row(orbital).slice_move(ndarray::s![..length]),
        )
    }

    /// Every hopping as `(from, cell offset, to, weight)`
    pub fn edges(&self) -> impl Iterator<Item = (usize, Vec<i32>, usize, Complex64)> + '_ {
        (0..self.num_orbitals()).flat_map(move |from| {
            let (destinations, weights) = self.row(from);
            destinations
                .into_iter()
                .zip(weights.into_iter())
                .map(move |(code, weight)| {
                    let (offset, to) = decode_destination(*code as usize, self.dim);
                    (from, offset, to, *weight)
                })
                .collect::<Vec<_>>()
        })
    }

    /// The weights divided by the energy scale
    pub fn scaled_hoppings(&self, energy_scale: f64) -> Array2<Complex64> {
        self.hoppings.mapv(|weight| weight / energy_scale)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// The orbital layout of a parent lattice, used to extract an operator lattice in the parent's
/// orbital space
pub struct OrbitalReference {
    /// Maps each alias id of the operator to an alias id of the parent
    alias_lookup: Vec<usize>,
    /// Number of orbitals of each alias id of the parent
    orbital_counts: Vec<usize>,
}

impl OrbitalReference {
    pub fn new(alias_lookup: Vec<usize>, orbital_counts: Vec<usize>) -> Self {
        Self {
            alias_lookup,
            orbital_counts,
        }
    }

    pub fn alias_lookup(&self) -> &[usize] {
        &self.alias_lookup
    }

    pub fn orbital_counts(&self) -> &[usize] {
        &self.orbital_counts
    }
}

/// Builder for a `HoppingTable` from a reference to a `Lattice`, and optionally an `OrbitalReference`
pub struct HamiltonianBuilder<RefLattice, RefReference> {
    lattice: RefLattice,
    reference: RefReference,
    energy_shift: f64,
    is_complex: bool,
}

impl Default for HamiltonianBuilder<(), ()> {
    fn default() -> Self {
        Self {
            lattice: (),
            reference: (),
            energy_shift: 0_f64,
            is_complex: true,
        }
    }
}

impl HamiltonianBuilder<(), ()> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<RefLattice, RefReference> HamiltonianBuilder<RefLattice, RefReference> {
    /// Attach the lattice to extract
    pub fn with_lattice<'a>(
        self,
        lattice: &'a Lattice,
    ) -> HamiltonianBuilder<&'a Lattice, RefReference> {
        HamiltonianBuilder {
            lattice,
            reference: self.reference,
            energy_shift: self.energy_shift,
            is_complex: self.is_complex,
        }
    }

    /// Attach the orbital layout of a parent lattice
    pub fn with_reference<'a>(
        self,
        reference: &'a OrbitalReference,
    ) -> HamiltonianBuilder<RefLattice, &'a OrbitalReference> {
        HamiltonianBuilder {
            lattice: self.lattice,
            reference,
            energy_shift: self.energy_shift,
            is_complex: self.is_complex,
        }
    }

    /// Shift subtracted from the diagonal of every onsite block
    pub fn with_energy_shift(mut self, energy_shift: f64) -> Self {
        self.energy_shift = energy_shift;
        self
    }

    /// Keep the imaginary part of the weights, defaults to `true`
    pub fn with_complex(mut self, is_complex: bool) -> Self {
        self.is_complex = is_complex;
        self
    }
}

impl<'a> HamiltonianBuilder<&'a Lattice, ()> {
    /// Build the table in the lattice's own orbital space
    #[tracing::instrument(name = "Hamiltonian builder", level = "info", skip(self))]
    pub fn build(self) -> Result<HoppingTable, HamiltonianError> {
        let alias_lookup = (0..self.lattice.nsub()).collect::<Vec<_>>();
        let counts = resolve_orbital_counts(self.lattice, &alias_lookup, self.lattice.nsub(), None)?;
        extract(
            self.lattice,
            &alias_lookup,
            counts,
            self.energy_shift,
            self.is_complex,
        )
    }
}

impl<'a, 'b> HamiltonianBuilder<&'a Lattice, &'b OrbitalReference> {
    /// Build the table in the orbital space of the reference
    #[tracing::instrument(name = "Operator Hamiltonian builder", level = "info", skip(self))]
    pub fn build(self) -> Result<HoppingTable, HamiltonianError> {
        let reference = self.reference;
        let counts = resolve_orbital_counts(
            self.lattice,
            &reference.alias_lookup,
            reference.orbital_counts.len(),
            Some(&reference.orbital_counts),
        )?;
        extract(
            self.lattice,
            &reference.alias_lookup,
            counts,
            self.energy_shift,
            self.is_complex,
        )
    }
}

/// Orbitals per alias id of the target space, read from the onsite blocks of the lattice and
/// completed from the reference where the lattice does not define them
fn resolve_orbital_counts(
    lattice: &Lattice,
    alias_lookup: &[usize],
    nsub: usize,
    reference: Option<&[usize]>,
) -> Result<Vec<usize>, HamiltonianError> {
    if alias_lookup.len() < lattice.nsub() || alias_lookup.iter().any(|alias| *alias >= nsub) {
        return Err(HamiltonianError::ReferenceLength {
            expected: nsub,
            found: alias_lookup.len(),
        });
    }
    if lattice.nsub() == 0 {
        return Err(HamiltonianError::EmptyLattice);
    }
    let mut counts: Vec<Option<usize>> = vec![None; nsub];
    for sub in lattice.sublattices().iter().filter(|sub| !sub.is_alias()) {
        counts[alias_lookup[sub.alias_id()]] = Some(sub.num_orbitals());
    }

    match reference {
        Some(reference) => {
            counts
                .into_iter()
                .zip(reference.iter())
                .enumerate()
                .map(|(alias_id, (count, expected))| match count {
                    Some(found) if found != *expected => {
                        Err(HamiltonianError::OrbitalCountMismatch {
                            alias_id,
                            expected: *expected,
                            found,
                        })
                    }
                    _ => Ok(*expected),
                })
                .collect()
        }
        None => counts
            .into_iter()
            .enumerate()
            .map(|(alias_id, count)| count.ok_or(HamiltonianError::UndefinedOrbitalCount(alias_id)))
            .collect(),
    }
}

fn extract(
    lattice: &Lattice,
    alias_lookup: &[usize],
    orbital_counts: Vec<usize>,
    energy_shift: f64,
    is_complex: bool,
) -> Result<HoppingTable, HamiltonianError> {
    let orbitals_before = orbital_counts
        .iter()
        .scan(0, |acc, count| {
            let before = *acc;
            *acc += count;
            Some(before)
        })
        .collect::<Vec<_>>();

    tracing::trace!("Collecting onsite and hopping entries");
    let mut entries = local::onsite_entries(lattice, alias_lookup, energy_shift);
    entries.extend(local::hermitian_completion(local::hopping_entries(
        lattice,
        alias_lookup,
    )));

    tracing::trace!("Flattening {} entries into orbital edges", entries.len());
    let edges = local::flatten(&entries, &orbitals_before, is_complex)?;
    global::assemble(&edges, orbital_counts, lattice.ndim())
}

#[cfg(test)]
mod test {
    use super::{HamiltonianBuilder, OrbitalReference};
    use crate::error::HamiltonianError;
    use crate::utilities::matrices::is_hermitian;
    use approx::assert_relative_eq;
    use kite_lattice::Lattice;
    use nalgebra::DMatrix;
    use ndarray::Array2;
    use num_complex::Complex64;
    use proptest::prelude::*;

    fn chain() -> Lattice {
        let mut lattice = Lattice::from_rows(&[&[1.]]).unwrap();
        lattice
            .add_sublattice("A", &[0.], 0.)
            .unwrap()
            .add_sublattice("B", &[0.5], 0.)
            .unwrap()
            .add_hopping(&[0], "A", "B", -1.)
            .unwrap();
        lattice
    }

    /// Rebuild the dense Bloch Hamiltonian at wavevector `k` (in units of the reciprocal vectors
    /// times 2 pi) from the table
    fn bloch_hamiltonian(table: &super::HoppingTable, k: &[f64]) -> Array2<Complex64> {
        let n = table.num_orbitals();
        let mut matrix = Array2::zeros((n, n));
        for (from, offset, to, weight) in table.edges() {
            let phase: f64 = offset.iter().zip(k).map(|(o, k)| *o as f64 * k).sum();
            matrix[[from, to]] += weight * Complex64::new(0., phase).exp();
        }
        matrix
    }

    #[test]
    fn two_site_chain_has_one_hopping_per_orbital() {
        let table = HamiltonianBuilder::new()
            .with_lattice(&chain())
            .with_complex(false)
            .build()
            .unwrap();
        assert_eq!(table.num_hoppings().to_vec(), vec![1, 1]);
        assert_eq!(table.destinations()[[0, 0]], 4);
        assert_eq!(table.destinations()[[1, 0]], 1);
        assert_eq!(table.hoppings()[[0, 0]], Complex64::from(-1.));
        assert_eq!(table.hoppings()[[1, 0]], Complex64::from(-1.));
    }

    #[test]
    fn energy_shift_lands_on_the_onsite_diagonal() {
        let mut lattice = Lattice::from_rows(&[&[1.]]).unwrap();
        lattice
            .add_sublattice("A", &[0.], DMatrix::from_row_slice(2, 2, &[1., 0.5, 0.5, 1.]))
            .unwrap();
        let table = HamiltonianBuilder::new()
            .with_lattice(&lattice)
            .with_energy_shift(1.)
            .build()
            .unwrap();
        // the diagonal vanishes, leaving the off-diagonal coupling
        assert_eq!(table.num_hoppings().to_vec(), vec![1, 1]);
        assert_eq!(table.destinations()[[0, 0]], 1 + 3);
        assert_eq!(table.destinations()[[1, 0]], 1);
        assert_eq!(table.hoppings()[[0, 0]], Complex64::from(0.5));
    }

    #[test]
    fn every_orbital_has_a_row_in_the_table() {
        let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0., 1.]]).unwrap();
        lattice
            .add_sublattice("A", &[0., 0.], DMatrix::from_row_slice(2, 2, &[1., 0., 0., 2.]))
            .unwrap()
            .add_sublattice("B", &[0.5, 0.5], 0.)
            .unwrap()
            .add_hopping(&[1, 0], "B", "B", -1.)
            .unwrap();
        let table = HamiltonianBuilder::new()
            .with_lattice(&lattice)
            .build()
            .unwrap();
        assert_eq!(table.num_orbitals(), 3);
        assert_eq!(table.orbital_counts(), &[2, 1]);
        assert_eq!(table.num_hoppings().to_vec(), vec![1, 1, 2]);
        assert_eq!(table.destinations().shape(), &[3, 2]);
        // padding past NHoppings is zero
        assert_eq!(table.destinations()[[0, 1]], 0);
        assert_eq!(table.hoppings()[[1, 1]], Complex64::from(0.));
    }

    #[test]
    fn operators_follow_the_orbitals_of_the_parent() {
        let mut parent = Lattice::from_rows(&[&[1.]]).unwrap();
        parent
            .add_sublattice("A", &[0.], DMatrix::<f64>::zeros(2, 2))
            .unwrap()
            .add_sublattice("B", &[0.5], 0.)
            .unwrap();
        // the operator only knows about B, mapped onto alias 1 of the parent
        let mut operator = Lattice::from_rows(&[&[1.]]).unwrap();
        operator
            .add_sublattice("B", &[0.5], 1.)
            .unwrap()
            .add_hopping(&[1], "B", "B", 0.25)
            .unwrap();

        let reference = OrbitalReference::new(vec![1], parent.orbital_counts());
        let table = HamiltonianBuilder::new()
            .with_lattice(&operator)
            .with_reference(&reference)
            .build()
            .unwrap();
        assert_eq!(table.num_orbitals(), 3);
        assert_eq!(table.num_hoppings().to_vec(), vec![0, 0, 3]);
        let (destinations, _) = table.row(2);
        assert_eq!(destinations.to_vec(), vec![6, 7, 8]);

        let mismatched = OrbitalReference::new(vec![0], parent.orbital_counts());
        assert!(matches!(
            HamiltonianBuilder::new()
                .with_lattice(&operator)
                .with_reference(&mismatched)
                .build(),
            Err(HamiltonianError::OrbitalCountMismatch {
                alias_id: 0,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn extraction_is_deterministic() {
        let build = || {
            HamiltonianBuilder::new()
                .with_lattice(&chain())
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    fn random_lattice() -> impl Strategy<Value = Lattice> {
        (
            1_usize..=3,
            prop::collection::vec((-2_f64..2., -1_f64..1.), 1..4),
            prop::collection::vec((0_usize..3, 0_usize..3, -1_i32..=1, -1_i32..=1, -1_f64..1., -1_f64..1.), 1..6),
        )
            .prop_map(|(num_sites, onsite, hoppings)| {
                let mut lattice = Lattice::from_rows(&[&[1., 0.], &[0.3, 1.]]).unwrap();
                let num_sites = num_sites.min(onsite.len());
                for (site, (energy, _)) in onsite.iter().take(num_sites).enumerate() {
                    lattice
                        .add_sublattice(&format!("S{}", site), &[0.1 * site as f64, 0.], *energy)
                        .unwrap();
                }
                for (from, to, x, y, re, im) in hoppings {
                    let (from, to) = (from % num_sites, to % num_sites);
                    if from == to && x == 0 && y == 0 {
                        continue;
                    }
                    lattice
                        .add_hopping(
                            &[x, y],
                            &format!("S{}", from),
                            &format!("S{}", to),
                            Complex64::new(re, im),
                        )
                        .unwrap();
                }
                lattice
            })
    }

    proptest! {
        #[test]
        fn bloch_hamiltonians_are_hermitian(lattice in random_lattice(), kx in -3_f64..3., ky in -3_f64..3.) {
            let table = HamiltonianBuilder::new()
                .with_lattice(&lattice)
                .build()
                .unwrap();
            let matrix = bloch_hamiltonian(&table, &[kx, ky]);
            let scale = matrix.iter().map(|x| x.norm()).fold(1_f64, f64::max);
            prop_assert!(is_hermitian((matrix / Complex64::from(scale)).view()));
        }

        #[test]
        fn every_hopping_has_a_conjugate_partner(lattice in random_lattice()) {
            let table = HamiltonianBuilder::new()
                .with_lattice(&lattice)
                .build()
                .unwrap();
            let edges = table.edges().collect::<Vec<_>>();
            for (from, offset, to, weight) in edges.iter() {
                let reverse = offset.iter().map(|x| -x).collect::<Vec<_>>();
                let partner = edges
                    .iter()
                    .find(|(f, o, t, _)| f == to && t == from && *o == reverse);
                prop_assert!(partner.is_some());
                let (_, _, _, partner_weight) = partner.unwrap();
                assert_relative_eq!(partner_weight.re, weight.re, epsilon = 1e-12);
                assert_relative_eq!(partner_weight.im, -weight.im, epsilon = 1e-12);
            }
        }
    }
}
