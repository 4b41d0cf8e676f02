use approx::assert_relative_eq;
use kite_export::container::Data;
use kite_export::hamiltonian::decode_destination;
use kite_export::system::{
    Calculation, Configuration, Disorder, Distribution, Dos, Ldos, Placement, SingleShotConductivity,
    Direction, StructuralDisorder,
};
use kite_export::{
    config_system, CalculationError, DisorderError, DomainError, ExportBuilder, ExportError,
};
use kite_lattice::Lattice;
use proptest::prelude::*;
use utilities::{honeycomb, random_square, square};

fn two_site_chain() -> Lattice {
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

fn chain_configuration() -> Configuration {
    Configuration::builder()
        .with_divisions(&[1])
        .with_length(&[4])
        .build()
        .unwrap()
}

fn dos() -> Dos {
    Dos {
        num_points: 1000,
        num_moments: 256,
        num_random: 1,
        num_disorder: 1,
    }
}

fn u32s(data: &Data) -> Vec<u32> {
    data.as_u32().unwrap().iter().copied().collect()
}

fn i32s(data: &Data) -> Vec<i32> {
    data.as_i32().unwrap().iter().copied().collect()
}

fn f64s(data: &Data) -> Vec<f64> {
    data.as_f64().unwrap().iter().copied().collect()
}

#[test]
fn two_site_chain_exports_one_hopping_per_orbital() {
    let lattice = two_site_chain();
    let configuration = chain_configuration();
    let mut calculation = Calculation::new();
    calculation.dos(dos()).unwrap();

    let export = ExportBuilder::new()
        .with_lattice(&lattice)
        .with_configuration(&configuration)
        .with_calculation(&calculation)
        .build()
        .unwrap();
    let resolved = export.resolved();
    let container = export.container();
    let scale = resolved.energy_scale();
    assert!(!resolved.is_complex());
    assert!(resolved.is_estimated());
    // the discs of both orbitals are [-1, 1]
    assert_relative_eq!(scale, 1. / 0.9, max_relative = 1e-12);
    assert_relative_eq!(resolved.energy_shift(), 0.);

    assert_eq!(u32s(container.dataset("Hamiltonian/NHoppings").unwrap()), vec![1, 1]);
    let destinations = i32s(container.dataset("Hamiltonian/d").unwrap());
    assert_eq!(decode_destination(destinations[0] as usize, 1), (vec![0], 1));
    assert_eq!(decode_destination(destinations[1] as usize, 1), (vec![0], 0));
    for weight in f64s(container.dataset("Hamiltonian/Hoppings").unwrap()) {
        assert_relative_eq!(weight, -1. / scale, max_relative = 1e-12);
    }

    assert_eq!(u32s(container.dataset("NOrbitals").unwrap()), vec![2]);
    assert_eq!(
        f64s(container.dataset("OrbPositions").unwrap()),
        vec![0., 0.5]
    );
    assert_eq!(u32s(container.dataset("L").unwrap()), vec![4]);
    assert_eq!(u32s(container.dataset("Boundaries").unwrap()), vec![1]);
    assert_eq!(
        container
            .dataset("Hamiltonian/Disorder/OnsiteDisorderModelType")
            .map(Data::shape),
        Some(&[1_usize, 0][..])
    );
    assert!(container.group("Hamiltonian/Vacancy").unwrap().members().is_empty());
}

#[test]
fn scaling_every_energy_leaves_the_exported_weights_unchanged() {
    let configuration = Configuration::builder()
        .with_divisions(&[1, 1])
        .with_length(&[32, 32])
        .build()
        .unwrap();
    let calculation = Calculation::new();
    let reference = honeycomb(-2.8, 0.4);
    let scaled = honeycomb(-5.6, 0.8);

    let export = |lattice: &Lattice| {
        ExportBuilder::new()
            .with_lattice(lattice)
            .with_configuration(&configuration)
            .with_calculation(&calculation)
            .build()
            .unwrap()
    };
    let (reference, scaled) = (export(&reference), export(&scaled));
    assert_relative_eq!(
        scaled.resolved().energy_scale(),
        2. * reference.resolved().energy_scale(),
        max_relative = 1e-12
    );
    let weights = |export: &kite_export::Export| {
        f64s(export.container().dataset("Hamiltonian/Hoppings").unwrap())
    };
    for (a, b) in weights(&reference).iter().zip(weights(&scaled).iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn out_of_range_anchors_abort_the_export() {
    let lattice = two_site_chain();
    let configuration = chain_configuration();
    let calculation = Calculation::new();
    let mut vacancy =
        StructuralDisorder::new(&lattice, Placement::Positions(vec![vec![4]])).unwrap();
    vacancy.add_vacancy("A").unwrap();
    let structural = vec![vacancy];

    let result = ExportBuilder::new()
        .with_lattice(&lattice)
        .with_configuration(&configuration)
        .with_calculation(&calculation)
        .with_structural_disorder(&structural)
        .build();
    assert!(matches!(
        result,
        Err(ExportError::Domain(DomainError::PositionOutOfRange { .. }))
    ));
}

#[test]
fn a_second_request_of_one_kind_is_rejected() {
    let mut calculation = Calculation::new();
    calculation.dos(dos()).unwrap();
    assert!(matches!(
        calculation.dos(dos()),
        Err(CalculationError::DuplicateRequest("dos"))
    ));
}

#[test]
fn disorder_is_written_per_orbital() {
    let lattice = honeycomb(-2.8, 0.);
    let configuration = Configuration::builder()
        .with_divisions(&[1, 1])
        .with_length(&[32, 32])
        .with_spectrum_range(-10., 10.)
        .build()
        .unwrap();
    let calculation = Calculation::new();
    let mut disorder = Disorder::new(&lattice);
    disorder
        .add_disorder("A", Distribution::Gaussian, &[0.5], &[0.2])
        .unwrap()
        .add_disorder("B", Distribution::Uniform, &[-0.5], &[0.1])
        .unwrap();

    let mut bond = StructuralDisorder::new(&lattice, Placement::Concentration(0.05)).unwrap();
    bond.add_bond(&[0, 0], "A", &[0, 0], "B", -1.).unwrap();
    let mut vacancy = StructuralDisorder::new(&lattice, Placement::Positions(vec![vec![1, 2]])).unwrap();
    vacancy.add_vacancy("B").unwrap();
    let structural = vec![bond, vacancy];

    let export = ExportBuilder::new()
        .with_lattice(&lattice)
        .with_configuration(&configuration)
        .with_calculation(&calculation)
        .with_disorder(&disorder)
        .with_structural_disorder(&structural)
        .build()
        .unwrap();
    let container = export.container();

    assert_eq!(
        i32s(container.dataset("Hamiltonian/Disorder/OnsiteDisorderModelType").unwrap()),
        vec![1, 2]
    );
    assert_eq!(
        f64s(container.dataset("Hamiltonian/Disorder/OnsiteDisorderMeanValue").unwrap()),
        vec![0.05, -0.05]
    );

    let vacancies = container.group("Hamiltonian/Vacancy").unwrap();
    assert_eq!(vacancies.member_names(), vec!["Type0"]);
    assert_eq!(i32s(vacancies.dataset("Type0/Orbitals").unwrap()), vec![1]);
    assert_eq!(i32s(vacancies.dataset("Type0/FixPosition").unwrap()), vec![1 + 32 * 2]);

    let perturbations = container.group("Hamiltonian/StructuralDisorder").unwrap();
    assert_eq!(perturbations.member_names(), vec!["Type0"]);
    assert_eq!(i32s(perturbations.dataset("Type0/NumBondDisorder").unwrap()), vec![2]);
    assert_eq!(
        f64s(perturbations.dataset("Type0/Hopping").unwrap()),
        vec![-0.1, -0.1]
    );
    assert_eq!(
        perturbations
            .dataset("Type0/Concentration")
            .and_then(Data::as_f64)
            .map(|x| x.iter().copied().collect::<Vec<_>>()),
        Some(vec![0.05])
    );
}

#[test]
fn local_density_of_states_expands_every_probe() {
    let lattice = honeycomb(-2.8, 0.);
    let configuration = Configuration::builder()
        .with_divisions(&[1, 1])
        .with_length(&[16, 16])
        .with_spectrum_range(-10., 10.)
        .build()
        .unwrap();
    let mut calculation = Calculation::new();
    calculation
        .ldos(
            Ldos::new(
                vec![0., 5.],
                512,
                vec![vec![0, 0], vec![2, 1]],
                vec!["A".to_string(), "B".to_string()],
                1,
            )
            .unwrap(),
        )
        .unwrap()
        .singleshot_conductivity_dc(
            SingleShotConductivity::new(
                vec![-1., 0., 1.],
                vec![0.02],
                vec![256],
                vec![true],
                Direction::single_shot("xx").unwrap(),
                5,
                1,
            )
            .unwrap(),
        )
        .unwrap();

    let export = ExportBuilder::new()
        .with_lattice(&lattice)
        .with_configuration(&configuration)
        .with_calculation(&calculation)
        .build()
        .unwrap();
    let container = export.container();
    assert_eq!(i32s(container.dataset("Calculation/ldos/Orbitals").unwrap()), vec![0, 1]);
    assert_eq!(
        i32s(container.dataset("Calculation/ldos/FixPosition").unwrap()),
        vec![0, 2 + 16]
    );
    let energies = container.dataset("Calculation/ldos/Energy").unwrap().as_f32().unwrap();
    assert_relative_eq!(energies[1], 0.5_f32);

    let singleshot = container.group("Calculation/singleshot_conductivity_dc").unwrap();
    assert_eq!(singleshot.dataset("NumMoments").map(Data::shape), Some(&[1_usize, 3][..]));
    assert_eq!(i32s(singleshot.dataset("PreserveDisorder").unwrap()), vec![1, 1, 1]);
    assert_eq!(f64s(singleshot.dataset("Energy").unwrap()), vec![-0.1, 0., 0.1]);
}

#[test]
fn unknown_ldos_sublattices_are_domain_errors() {
    let lattice = square(-1.);
    let configuration = Configuration::builder()
        .with_divisions(&[1, 1])
        .with_length(&[16, 16])
        .build()
        .unwrap();
    let mut calculation = Calculation::new();
    calculation
        .ldos(Ldos::new(vec![0.], 128, vec![vec![0, 0]], vec!["B".to_string()], 1).unwrap())
        .unwrap();
    assert!(matches!(
        ExportBuilder::new()
            .with_lattice(&lattice)
            .with_configuration(&configuration)
            .with_calculation(&calculation)
            .build(),
        Err(ExportError::Domain(DomainError::UnknownSublattice(_)))
    ));
}

#[test]
fn disorder_of_another_lattice_aborts_the_export() {
    let mut three_sites = two_site_chain();
    three_sites.add_sublattice("C", &[0.75], 0.).unwrap();
    let mut disorder = Disorder::new(&three_sites);
    disorder
        .add_disorder("C", Distribution::Gaussian, &[0.], &[0.1])
        .unwrap();
    let mut structural = StructuralDisorder::new(&three_sites, Placement::Positions(vec![vec![0]])).unwrap();
    structural.add_onsite(&[0], "C", 0.5).unwrap();

    let lattice = utilities::chain(-1.);
    let calculation = Calculation::new();
    // estimated and user supplied spectra alike
    for configuration in [
        chain_configuration(),
        Configuration::builder()
            .with_divisions(&[1])
            .with_length(&[4])
            .with_spectrum_range(-3., 3.)
            .build()
            .unwrap(),
    ] {
        assert!(matches!(
            ExportBuilder::new()
                .with_lattice(&lattice)
                .with_configuration(&configuration)
                .with_calculation(&calculation)
                .with_disorder(&disorder)
                .build(),
            Err(ExportError::Disorder(DisorderError::ForeignLattice {
                expected: 1,
                found: 3,
                ..
            }))
        ));
        let objects = [structural.clone()];
        assert!(matches!(
            ExportBuilder::new()
                .with_lattice(&lattice)
                .with_configuration(&configuration)
                .with_calculation(&calculation)
                .with_structural_disorder(&objects)
                .build(),
            Err(ExportError::Disorder(DisorderError::ForeignLattice { .. }))
        ));
    }
}

#[cfg(not(feature = "hdf5"))]
#[test]
fn written_exports_read_back_identically() {
    let lattice = square(-1.);
    let configuration = Configuration::builder()
        .with_divisions(&[2, 2])
        .with_length(&[64, 64])
        .build()
        .unwrap();
    let mut calculation = Calculation::new();
    calculation.dos(dos()).unwrap();
    let path = std::env::temp_dir().join("kite-export-read-back.bin");

    let resolved = config_system(&lattice, &configuration, &calculation, None, None, &[], &path).unwrap();
    let container = kite_export::container::Container::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(
        f64s(container.dataset("EnergyScale").unwrap()),
        vec![resolved.energy_scale()]
    );
    assert!(container.group("Calculation/dos").is_some());
}

proptest! {
    #[test]
    fn repeated_exports_are_identical(num_sublattices in 1_usize..5) {
        let lattice = random_square(num_sublattices);
        let configuration = Configuration::builder()
            .with_divisions(&[1, 1])
            .with_length(&[16, 16])
            .build()
            .unwrap();
        let calculation = Calculation::new();
        let export = || {
            ExportBuilder::new()
                .with_lattice(&lattice)
                .with_configuration(&configuration)
                .with_calculation(&calculation)
                .build()
                .unwrap()
        };
        let (first, second) = (export(), export());
        let hamiltonian = |export: &kite_export::Export| {
            (
                export.container().dataset("Hamiltonian/d").cloned(),
                export.container().dataset("Hamiltonian/Hoppings").cloned(),
            )
        };
        prop_assert_eq!(hamiltonian(&first), hamiltonian(&second));
        prop_assert!(first.resolved().is_complex());
    }

    #[test]
    fn rows_are_padded_beyond_their_hoppings(num_sublattices in 1_usize..5) {
        let lattice = random_square(num_sublattices);
        let configuration = Configuration::builder()
            .with_divisions(&[1, 1])
            .with_length(&[16, 16])
            .with_complex(true)
            .build()
            .unwrap();
        let calculation = Calculation::new();
        let export = ExportBuilder::new()
            .with_lattice(&lattice)
            .with_configuration(&configuration)
            .with_calculation(&calculation)
            .build()
            .unwrap();
        let container = export.container();
        let num_hoppings = u32s(container.dataset("Hamiltonian/NHoppings").unwrap());
        let weights = container.dataset("Hamiltonian/Hoppings").unwrap().as_c64().unwrap();
        prop_assert_eq!(num_hoppings.len(), lattice.num_orbitals());
        for (orbital, count) in num_hoppings.iter().enumerate() {
            for slot in *count as usize..weights.shape()[1] {
                prop_assert_eq!(weights[[orbital, slot]], num_complex::Complex64::new(0., 0.));
            }
        }
    }
}
