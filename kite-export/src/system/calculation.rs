//! Requested observables
//!
//! A `Calculation` holds at most one request of each kind. The engine only evaluates a single request
//! per kind, so registering a second request of the same kind is an error rather than a silent
//! override. Auxiliary operator lattices are registered by name, and spectral-operator vertices refer
//! to them through `OperatorRef` values resolved at registration time.

use crate::error::CalculationError;
use kite_lattice::Lattice;
use num_complex::Complex64;
use serde::Deserialize;

const LINEAR_DIRECTIONS: [&str; 9] = ["xx", "yy", "zz", "xy", "xz", "yx", "yz", "zx", "zy"];
const SINGLE_SHOT_DIRECTIONS: [&str; 3] = ["xx", "yy", "zz"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A Cartesian response direction, stored as the engine's code
pub struct Direction(u32);

impl Direction {
    /// One of `xx, yy, zz, xy, xz, yx, yz, zx, zy`
    pub fn linear(label: &str) -> Result<Self, CalculationError> {
        LINEAR_DIRECTIONS
            .iter()
            .position(|direction| *direction == label)
            .map(|code| Direction(code as u32))
            .ok_or_else(|| CalculationError::UnknownDirection {
                kind: "linear conductivity",
                found: label.to_string(),
            })
    }

    /// Any three letter combination of `x, y, z`, numbered in lexicographic order from `xxx`
    pub fn nonlinear(label: &str) -> Result<Self, CalculationError> {
        let error = || CalculationError::UnknownDirection {
            kind: "nonlinear optical conductivity",
            found: label.to_string(),
        };
        if label.chars().count() != 3 {
            return Err(error());
        }
        label
            .chars()
            .try_fold(0_u32, |code, axis| match axis {
                'x' => Some(code * 3),
                'y' => Some(code * 3 + 1),
                'z' => Some(code * 3 + 2),
                _ => None,
            })
            .map(Direction)
            .ok_or_else(error)
    }

    /// One of `xx, yy, zz`
    pub fn single_shot(label: &str) -> Result<Self, CalculationError> {
        SINGLE_SHOT_DIRECTIONS
            .iter()
            .position(|direction| *direction == label)
            .map(|code| Direction(code as u32))
            .ok_or_else(|| CalculationError::UnknownDirection {
                kind: "single shot conductivity",
                found: label.to_string(),
            })
    }

    pub fn code(&self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Density of states
pub struct Dos {
    pub num_points: usize,
    pub num_moments: usize,
    pub num_random: usize,
    pub num_disorder: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// Local density of states at the given sublattices of the given unit cells
pub struct Ldos {
    energy: Vec<f64>,
    num_moments: usize,
    positions: Vec<Vec<i64>>,
    sublattices: Vec<String>,
    num_disorder: usize,
}

impl Ldos {
    /// The number of positions and sublattices must agree, or either must be a single value in
    /// which case every position is probed on every sublattice
    pub fn new(
        energy: Vec<f64>,
        num_moments: usize,
        positions: Vec<Vec<i64>>,
        sublattices: Vec<String>,
        num_disorder: usize,
    ) -> Result<Self, CalculationError> {
        let (num_positions, num_sublattices) = (positions.len(), sublattices.len());
        if num_positions == 0
            || num_sublattices == 0
            || (num_positions != num_sublattices && num_positions != 1 && num_sublattices != 1)
        {
            return Err(CalculationError::InconsistentLengths {
                context: "LDOS positions and sublattices",
            });
        }
        Ok(Self {
            energy,
            num_moments,
            positions,
            sublattices,
            num_disorder,
        })
    }

    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    pub fn num_moments(&self) -> usize {
        self.num_moments
    }

    pub fn positions(&self) -> &[Vec<i64>] {
        &self.positions
    }

    pub fn sublattices(&self) -> &[String] {
        &self.sublattices
    }

    pub fn num_disorder(&self) -> usize {
        self.num_disorder
    }

    /// Every probed `(position, sublattice)` pair, positions varying slowest
    pub fn probes(&self) -> Vec<(&[i64], &str)> {
        if self.positions.len() == self.sublattices.len() {
            self.positions
                .iter()
                .zip(&self.sublattices)
                .map(|(position, sublattice)| (position.as_slice(), sublattice.as_str()))
                .collect()
        } else {
            self.positions
                .iter()
                .flat_map(|position| {
                    self.sublattices
                        .iter()
                        .map(move |sublattice| (position.as_slice(), sublattice.as_str()))
                })
                .collect()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Angle resolved spectral function at Cartesian wavevectors
pub struct Arpes {
    pub k_vectors: Vec<Vec<f64>>,
    /// One weight per orbital of the unit cell
    pub weights: Vec<Complex64>,
    pub num_moments: usize,
    pub num_disorder: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// Time evolution of a Gaussian wave packet
pub struct GaussianWavePacket {
    pub num_points: usize,
    pub num_moments: usize,
    pub timestep: f64,
    /// Wavevectors in units of the reciprocal vectors
    pub k_vectors: Vec<Vec<f64>>,
    /// One spinor per wavevector, with one weight per orbital
    pub spinors: Vec<Vec<Complex64>>,
    pub width: f64,
    pub mean_value: Vec<f64>,
    /// Points at which the packet is probed
    pub probing_points: Vec<Vec<f64>>,
    pub num_disorder: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// Linear DC or optical conductivity
pub struct Conductivity {
    pub direction: Direction,
    pub num_points: usize,
    pub num_moments: usize,
    pub num_random: usize,
    pub num_disorder: usize,
    /// Temperature in eV
    pub temperature: f64,
}

#[derive(Clone, Debug, PartialEq)]
/// Second order optical conductivity
pub struct NonlinearConductivity {
    pub direction: Direction,
    pub num_points: usize,
    pub num_moments: usize,
    pub num_random: usize,
    pub num_disorder: usize,
    pub temperature: f64,
    /// Engine shortcut for materials with special symmetries, 0 disables it
    pub special: i32,
}

/// Broadcast a list of length one to `length`
fn broadcast<T: Clone>(values: Vec<T>, length: usize) -> Vec<T> {
    if values.len() == 1 {
        vec![values[0].clone(); length]
    } else {
        values
    }
}

/// Common length of the lists, each of which has that length or a single value
fn broadcast_length(lengths: &[usize], context: &'static str) -> Result<usize, CalculationError> {
    let length = lengths.iter().copied().max().unwrap_or(0);
    if length == 0 || lengths.iter().any(|x| *x != length && *x != 1) {
        return Err(CalculationError::InconsistentLengths { context });
    }
    Ok(length)
}

#[derive(Clone, Debug, PartialEq)]
/// DC conductivity at fixed energies
pub struct SingleShotConductivity {
    energy: Vec<f64>,
    eta: Vec<f64>,
    num_moments: Vec<usize>,
    preserve_disorder: Vec<bool>,
    direction: Direction,
    num_random: usize,
    num_disorder: usize,
}

impl SingleShotConductivity {
    /// Lists of a single value are broadcast to the length of the longest list
    pub fn new(
        energy: Vec<f64>,
        eta: Vec<f64>,
        num_moments: Vec<usize>,
        preserve_disorder: Vec<bool>,
        direction: Direction,
        num_random: usize,
        num_disorder: usize,
    ) -> Result<Self, CalculationError> {
        let length = broadcast_length(
            &[
                energy.len(),
                eta.len(),
                num_moments.len(),
                preserve_disorder.len(),
            ],
            "single shot energies, eta, moments and preserve_disorder",
        )?;
        Ok(Self {
            energy: broadcast(energy, length),
            eta: broadcast(eta, length),
            num_moments: broadcast(num_moments, length),
            preserve_disorder: broadcast(preserve_disorder, length),
            direction,
            num_random,
            num_disorder,
        })
    }

    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    pub fn eta(&self) -> &[f64] {
        &self.eta
    }

    pub fn num_moments(&self) -> &[usize] {
        &self.num_moments
    }

    pub fn preserve_disorder(&self) -> &[bool] {
        &self.preserve_disorder
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn num_random(&self) -> usize {
        self.num_random
    }

    pub fn num_disorder(&self) -> usize {
        self.num_disorder
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// An operator in a vertex: a registered operator lattice, a velocity, or the identity
pub enum OperatorRef {
    Operator(usize),
    VelocityX,
    VelocityY,
    VelocityZ,
    Identity,
}

impl OperatorRef {
    /// Registered operators are numbered from zero, the built in operators are negative
    pub fn code(&self) -> i32 {
        match self {
            OperatorRef::Operator(index) => *index as i32,
            OperatorRef::VelocityX => -1,
            OperatorRef::VelocityY => -2,
            OperatorRef::VelocityZ => -3,
            OperatorRef::Identity => -4,
        }
    }

    fn builtin(name: &str) -> Option<Self> {
        match name {
            "vx" => Some(OperatorRef::VelocityX),
            "vy" => Some(OperatorRef::VelocityY),
            "vz" => Some(OperatorRef::VelocityZ),
            "e" => Some(OperatorRef::Identity),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumKind {
    Dirac,
    Greens,
}

impl SpectrumKind {
    pub fn code(&self) -> i32 {
        match self {
            SpectrumKind::Dirac => 0,
            SpectrumKind::Greens => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// The spectral part of a vertex
pub enum Spectrum {
    /// Expansion over the full spectrum
    Full {
        kind: SpectrumKind,
        num_moments: usize,
        num_points: usize,
    },
    /// Evaluation at fixed energies, with broadening `eta`
    SingleShot {
        kind: SpectrumKind,
        energy: Vec<f64>,
        eta: Vec<f64>,
        num_moments: Vec<usize>,
    },
}

impl Spectrum {
    /// A single shot spectrum, lists of a single value are broadcast to the longest list
    pub fn single_shot(
        kind: SpectrumKind,
        energy: Vec<f64>,
        eta: Vec<f64>,
        num_moments: Vec<usize>,
    ) -> Result<Self, CalculationError> {
        let length = broadcast_length(
            &[energy.len(), eta.len(), num_moments.len()],
            "single shot spectrum energies, eta and moments",
        )?;
        Ok(Spectrum::SingleShot {
            kind,
            energy: broadcast(energy, length),
            eta: broadcast(eta, length),
            num_moments: broadcast(num_moments, length),
        })
    }

    pub fn code(&self) -> i32 {
        match self {
            Spectrum::Full { .. } => 0,
            Spectrum::SingleShot { .. } => 1,
        }
    }

    pub fn kind(&self) -> SpectrumKind {
        match self {
            Spectrum::Full { kind, .. } | Spectrum::SingleShot { kind, .. } => *kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A set of spectral operator vertices, one operator list per spectrum
pub struct Vertex {
    operators: Vec<Vec<(OperatorRef, OperatorRef)>>,
    spectra: Vec<Spectrum>,
    num_random: usize,
    num_disorder: usize,
    preserve_disorder: bool,
}

impl Vertex {
    pub fn new(
        operators: Vec<Vec<(OperatorRef, OperatorRef)>>,
        spectra: Vec<Spectrum>,
        num_random: usize,
        num_disorder: usize,
        preserve_disorder: bool,
    ) -> Result<Self, CalculationError> {
        if operators.len() != spectra.len() {
            return Err(CalculationError::VertexLengthMismatch {
                operators: operators.len(),
                spectra: spectra.len(),
            });
        }
        Ok(Self {
            operators,
            spectra,
            num_random,
            num_disorder,
            preserve_disorder,
        })
    }

    pub fn operators(&self) -> &[Vec<(OperatorRef, OperatorRef)>] {
        &self.operators
    }

    pub fn spectra(&self) -> &[Spectrum] {
        &self.spectra
    }

    pub fn num_random(&self) -> usize {
        self.num_random
    }

    pub fn num_disorder(&self) -> usize {
        self.num_disorder
    }

    pub fn preserve_disorder(&self) -> bool {
        self.preserve_disorder
    }
}

/// Fill an empty request slot, or fail if the kind was already requested
fn fill<T>(slot: &mut Option<T>, request: T, kind: &'static str) -> Result<(), CalculationError> {
    if slot.is_some() {
        return Err(CalculationError::DuplicateRequest(kind));
    }
    *slot = Some(request);
    Ok(())
}

#[derive(Clone, Debug, Default)]
/// The set of observables requested from the engine
pub struct Calculation {
    dos: Option<Dos>,
    ldos: Option<Ldos>,
    arpes: Option<Arpes>,
    gaussian_wave_packet: Option<GaussianWavePacket>,
    conductivity_dc: Option<Conductivity>,
    conductivity_optical: Option<Conductivity>,
    conductivity_optical_nonlinear: Option<NonlinearConductivity>,
    singleshot_conductivity_dc: Option<SingleShotConductivity>,
    operators: Vec<(String, Lattice)>,
    vertex: Option<Vertex>,
}

impl Calculation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dos(&mut self, request: Dos) -> Result<&mut Self, CalculationError> {
        fill(&mut self.dos, request, "dos")?;
        Ok(self)
    }

    pub fn ldos(&mut self, request: Ldos) -> Result<&mut Self, CalculationError> {
        fill(&mut self.ldos, request, "ldos")?;
        Ok(self)
    }

    pub fn arpes(&mut self, request: Arpes) -> Result<&mut Self, CalculationError> {
        fill(&mut self.arpes, request, "arpes")?;
        Ok(self)
    }

    pub fn gaussian_wave_packet(
        &mut self,
        request: GaussianWavePacket,
    ) -> Result<&mut Self, CalculationError> {
        if request.probing_points.is_empty() {
            return Err(CalculationError::NoProbingPoints);
        }
        fill(
            &mut self.gaussian_wave_packet,
            request,
            "gaussian_wave_packet",
        )?;
        Ok(self)
    }

    pub fn conductivity_dc(&mut self, request: Conductivity) -> Result<&mut Self, CalculationError> {
        fill(&mut self.conductivity_dc, request, "conductivity_dc")?;
        Ok(self)
    }

    pub fn conductivity_optical(
        &mut self,
        request: Conductivity,
    ) -> Result<&mut Self, CalculationError> {
        fill(
            &mut self.conductivity_optical,
            request,
            "conductivity_optical",
        )?;
        Ok(self)
    }

    pub fn conductivity_optical_nonlinear(
        &mut self,
        request: NonlinearConductivity,
    ) -> Result<&mut Self, CalculationError> {
        fill(
            &mut self.conductivity_optical_nonlinear,
            request,
            "conductivity_optical_nonlinear",
        )?;
        Ok(self)
    }

    pub fn singleshot_conductivity_dc(
        &mut self,
        request: SingleShotConductivity,
    ) -> Result<&mut Self, CalculationError> {
        fill(
            &mut self.singleshot_conductivity_dc,
            request,
            "singleshot_conductivity_dc",
        )?;
        Ok(self)
    }

    /// Register an operator lattice under `name`, its index is its registration order
    pub fn add_operator(&mut self, name: &str, operator: Lattice) -> Result<&mut Self, CalculationError> {
        if OperatorRef::builtin(name).is_some() || self.operators.iter().any(|(n, _)| n == name) {
            return Err(CalculationError::DuplicateOperator(name.to_string()));
        }
        self.operators.push((name.to_string(), operator));
        Ok(self)
    }

    /// Resolve an operator name: a registered operator, `vx`, `vy`, `vz` or the identity `e`
    pub fn operator_ref(&self, name: &str) -> Result<OperatorRef, CalculationError> {
        if let Some(index) = self.operators.iter().position(|(n, _)| n == name) {
            return Ok(OperatorRef::Operator(index));
        }
        OperatorRef::builtin(name).ok_or_else(|| CalculationError::UnknownOperator(name.to_string()))
    }

    /// Resolve a pair of operator names, a single name is paired with the identity
    pub fn operator_pair(
        &self,
        first: &str,
        second: Option<&str>,
    ) -> Result<(OperatorRef, OperatorRef), CalculationError> {
        let second = match second {
            Some(name) => self.operator_ref(name)?,
            None => OperatorRef::Identity,
        };
        Ok((self.operator_ref(first)?, second))
    }

    pub fn vertex(&mut self, vertex: Vertex) -> Result<&mut Self, CalculationError> {
        for pair in vertex.operators.iter().flatten() {
            for operator in [pair.0, pair.1] {
                if let OperatorRef::Operator(index) = operator {
                    if index >= self.operators.len() {
                        return Err(CalculationError::UnknownOperator(index.to_string()));
                    }
                }
            }
        }
        fill(&mut self.vertex, vertex, "vertex")?;
        Ok(self)
    }

    pub fn get_dos(&self) -> Option<&Dos> {
        self.dos.as_ref()
    }

    pub fn get_ldos(&self) -> Option<&Ldos> {
        self.ldos.as_ref()
    }

    pub fn get_arpes(&self) -> Option<&Arpes> {
        self.arpes.as_ref()
    }

    pub fn get_gaussian_wave_packet(&self) -> Option<&GaussianWavePacket> {
        self.gaussian_wave_packet.as_ref()
    }

    pub fn get_conductivity_dc(&self) -> Option<&Conductivity> {
        self.conductivity_dc.as_ref()
    }

    pub fn get_conductivity_optical(&self) -> Option<&Conductivity> {
        self.conductivity_optical.as_ref()
    }

    pub fn get_conductivity_optical_nonlinear(&self) -> Option<&NonlinearConductivity> {
        self.conductivity_optical_nonlinear.as_ref()
    }

    pub fn get_singleshot_conductivity_dc(&self) -> Option<&SingleShotConductivity> {
        self.singleshot_conductivity_dc.as_ref()
    }

    pub fn get_operators(&self) -> &[(String, Lattice)] {
        &self.operators
    }

    pub fn get_vertex(&self) -> Option<&Vertex> {
        self.vertex.as_ref()
    }

    /// True if a request needs complex arithmetic regardless of the Hamiltonian
    pub fn requires_complex(&self) -> Option<&'static str> {
        if self.arpes.is_some() {
            Some("ARPES")
        } else if self.gaussian_wave_packet.is_some() {
            Some("a Gaussian wave packet")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dos() -> Dos {
        Dos {
            num_points: 1000,
            num_moments: 512,
            num_random: 1,
            num_disorder: 1,
        }
    }

    #[test]
    fn linear_directions_follow_the_engine_table() {
        assert_eq!(Direction::linear("xx").unwrap().code(), 0);
        assert_eq!(Direction::linear("zz").unwrap().code(), 2);
        assert_eq!(Direction::linear("xy").unwrap().code(), 3);
        assert_eq!(Direction::linear("zy").unwrap().code(), 8);
        assert!(matches!(
            Direction::linear("xxx"),
            Err(CalculationError::UnknownDirection { .. })
        ));
    }

    #[test]
    fn nonlinear_directions_are_lexicographic() {
        assert_eq!(Direction::nonlinear("xxx").unwrap().code(), 0);
        assert_eq!(Direction::nonlinear("xxy").unwrap().code(), 1);
        assert_eq!(Direction::nonlinear("xyx").unwrap().code(), 3);
        assert_eq!(Direction::nonlinear("zzz").unwrap().code(), 26);
        assert!(Direction::nonlinear("xx").is_err());
        assert!(Direction::nonlinear("xwx").is_err());
    }

    #[test]
    fn single_shot_directions_are_diagonal() {
        assert_eq!(Direction::single_shot("yy").unwrap().code(), 1);
        assert!(Direction::single_shot("xy").is_err());
    }

    #[test]
    fn second_request_of_a_kind_is_rejected() {
        let mut calculation = Calculation::new();
        calculation.dos(dos()).unwrap();
        assert!(matches!(
            calculation.dos(dos()),
            Err(CalculationError::DuplicateRequest("dos"))
        ));
        assert_eq!(calculation.get_dos(), Some(&dos()));
    }

    #[test]
    fn single_values_are_broadcast_for_single_shot_requests() {
        let request = SingleShotConductivity::new(
            vec![-1., 0., 1.],
            vec![0.01],
            vec![256],
            vec![false],
            Direction::single_shot("xx").unwrap(),
            5,
            1,
        )
        .unwrap();
        assert_eq!(request.eta(), &[0.01, 0.01, 0.01]);
        assert_eq!(request.num_moments(), &[256, 256, 256]);

        assert!(matches!(
            SingleShotConductivity::new(
                vec![-1., 0., 1.],
                vec![0.01, 0.02],
                vec![256],
                vec![false],
                Direction::single_shot("xx").unwrap(),
                5,
                1,
            ),
            Err(CalculationError::InconsistentLengths { .. })
        ));
    }

    #[test]
    fn ldos_probes_broadcast_single_values() {
        let ldos = Ldos::new(
            vec![0.],
            512,
            vec![vec![0, 0], vec![1, 1]],
            vec!["A".into()],
            1,
        )
        .unwrap();
        assert_eq!(ldos.probes(), vec![(&[0_i64, 0][..], "A"), (&[1, 1][..], "A")]);

        let ldos = Ldos::new(
            vec![0.],
            512,
            vec![vec![0, 0]],
            vec!["A".into(), "B".into()],
            1,
        )
        .unwrap();
        assert_eq!(ldos.probes(), vec![(&[0_i64, 0][..], "A"), (&[0, 0][..], "B")]);

        assert!(Ldos::new(
            vec![0.],
            512,
            vec![vec![0, 0], vec![1, 1]],
            vec!["A".into(), "B".into(), "C".into()],
            1
        )
        .is_err());
    }

    #[test]
    fn operators_resolve_to_indices_and_builtins() {
        let mut calculation = Calculation::new();
        let operator = Lattice::from_rows(&[&[1.]]).unwrap();
        calculation.add_operator("sz", operator.clone()).unwrap();
        assert!(matches!(
            calculation.add_operator("vx", operator),
            Err(CalculationError::DuplicateOperator(_))
        ));
        assert_eq!(calculation.operator_ref("sz").unwrap(), OperatorRef::Operator(0));
        assert_eq!(calculation.operator_ref("vy").unwrap().code(), -2);
        assert_eq!(
            calculation.operator_pair("sz", None).unwrap(),
            (OperatorRef::Operator(0), OperatorRef::Identity)
        );
        assert!(matches!(
            calculation.operator_ref("sx"),
            Err(CalculationError::UnknownOperator(_))
        ));
    }

    #[test]
    fn vertices_need_one_operator_list_per_spectrum() {
        let spectra = vec![Spectrum::Full {
            kind: SpectrumKind::Dirac,
            num_moments: 128,
            num_points: 100,
        }];
        assert!(matches!(
            Vertex::new(vec![], spectra.clone(), 1, 1, false),
            Err(CalculationError::VertexLengthMismatch { operators: 0, spectra: 1 })
        ));
        let vertex = Vertex::new(
            vec![vec![(OperatorRef::VelocityX, OperatorRef::Identity)]],
            spectra,
            1,
            1,
            false,
        )
        .unwrap();
        let mut calculation = Calculation::new();
        calculation.vertex(vertex).unwrap();
        assert_eq!(calculation.get_vertex().unwrap().spectra()[0].code(), 0);
    }

    #[test]
    fn wave_packets_are_probed_somewhere() {
        let packet = GaussianWavePacket {
            num_points: 100,
            num_moments: 64,
            timestep: 0.1,
            k_vectors: vec![vec![0., 0.]],
            spinors: vec![vec![Complex64::from(1.)]],
            width: 0.5,
            mean_value: vec![0., 0.],
            probing_points: Vec::new(),
            num_disorder: 1,
        };
        let mut calculation = Calculation::new();
        assert!(matches!(
            calculation.gaussian_wave_packet(packet.clone()),
            Err(CalculationError::NoProbingPoints)
        ));
        assert!(calculation.get_gaussian_wave_packet().is_none());
        calculation
            .gaussian_wave_packet(GaussianWavePacket {
                probing_points: vec![vec![0., 0.]],
                ..packet
            })
            .unwrap();
        assert!(calculation.get_gaussian_wave_packet().is_some());
    }
}
