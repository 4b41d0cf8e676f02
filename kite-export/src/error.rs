use kite_lattice::LatticeError;
use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Top level error for an export, every failure aborts the export and no file is written
pub enum ExportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Calculation(#[from] CalculationError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Disorder(#[from] DisorderError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Magnetic(#[from] MagneticError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Hamiltonian(#[from] HamiltonianError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Reader(#[from] ReaderError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Shape and schema problems in the numerical configuration
pub enum ConfigurationError {
    #[error("{context}: expected {expected} entries to match the lattice dimension, found {found}")]
    #[diagnostic(code(kite_export::configuration::dimension))]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("every entry of `{0}` must be strictly positive")]
    #[diagnostic(code(kite_export::configuration::positive))]
    NonPositive(&'static str),
    #[error("the spectrum range [{minimum}, {maximum}] is empty")]
    #[diagnostic(help("give the bounds as [e_min, e_max] with e_min < e_max"))]
    InvalidSpectrumRange { minimum: f64, maximum: f64 },
    #[error("unknown boundary mode `{0}`")]
    #[diagnostic(help("choose one of `open`, `periodic`, `twisted` or `random`"))]
    UnknownBoundary(String),
    #[error("the twisted boundary along lattice vector {0} has no twist angle")]
    MissingTwistAngle(usize),
    #[error("unknown precision `{0}`")]
    #[diagnostic(help("use 0 for single, 1 for double or 2 for extended precision"))]
    UnknownPrecision(u32),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Problems in the requested calculations
pub enum CalculationError {
    #[error("direction `{found}` is not available for {kind}")]
    #[diagnostic(code(kite_export::calculation::direction))]
    UnknownDirection { kind: &'static str, found: String },
    #[error("only a single {0} request is allowed per export")]
    #[diagnostic(
        code(kite_export::calculation::duplicate),
        help("write a second configuration file for the other request")
    )]
    DuplicateRequest(&'static str),
    #[error("operator `{0}` has not been registered")]
    UnknownOperator(String),
    #[error("operator `{0}` is registered more than once")]
    DuplicateOperator(String),
    #[error("operator `{name}` has dimension {found} but the lattice has dimension {expected}")]
    OperatorDimension {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("sublattice `{sublattice}` of operator `{operator}` is not defined in the lattice")]
    UnknownOperatorSublattice { operator: String, sublattice: String },
    #[error("{context}: lengths must agree or be given as a single value")]
    #[diagnostic(code(kite_export::calculation::broadcast))]
    InconsistentLengths { context: &'static str },
    #[error("the wave packet needs at least one probing point")]
    #[diagnostic(
        code(kite_export::calculation::probing),
        help("probe the packet at its origin with a single point of zeros")
    )]
    NoProbingPoints,
    #[error("the vertex lists {operators} operator sets for {spectra} spectra")]
    VertexLengthMismatch { operators: usize, spectra: usize },
    #[error("{context}: expected {expected} orbital weights, found {found}")]
    OrbitalWeights {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{context}: expected vectors with {expected} components, found {found}")]
    VectorDimension {
        context: &'static str,
        expected: usize,
        found: usize,
    },
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Positions and sublattices which do not exist in the simulated system
pub enum DomainError {
    #[error("sublattice `{0}` does not exist in the lattice")]
    #[diagnostic(code(kite_export::domain::sublattice))]
    UnknownSublattice(String),
    #[error("{context}: positions need {expected} components, found {found}")]
    PositionDimension {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{context}: position {position:?} lies outside the system of {length:?} unit cells")]
    #[diagnostic(
        code(kite_export::domain::range),
        help("positions are unit cell indices in [0, L) along each lattice vector")
    )]
    PositionOutOfRange {
        context: &'static str,
        position: Vec<i64>,
        length: Vec<usize>,
    },
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Problems in the description of onsite or structural disorder
pub enum DisorderError {
    #[error("unknown disorder distribution `{0}`")]
    #[diagnostic(help("choose one of `Gaussian`, `Uniform` or `Deterministic`"))]
    UnknownDistribution(String),
    #[error("sublattice `{0}` does not exist in the lattice")]
    UnknownSublattice(String),
    #[error("sublattice `{name}` has {expected} orbitals but {found} values were given")]
    OrbitalMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("the standard deviation {0} must not be negative")]
    NegativeDeviation(f64),
    #[error("the concentration {0} must lie in (0, 1]")]
    InvalidConcentration(f64),
    #[error("{context}: cell offsets need {expected} components, found {found}")]
    OffsetDimension {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{context} was described on a lattice with {found} orbitals in {found_dim} dimensions, the exported lattice has {expected} orbitals in {expected_dim}")]
    #[diagnostic(
        code(kite_export::disorder::lattice),
        help("describe the disorder with the lattice that is exported")
    )]
    ForeignLattice {
        context: &'static str,
        expected: usize,
        found: usize,
        expected_dim: usize,
        found_dim: usize,
    },
    #[error("{context}: energy block is {found:?} but the sites need {expected:?}")]
    EnergyShape {
        context: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum MagneticError {
    #[error("the system is too small for the requested field, the minimum commensurate field is {minimum_field:.3} T")]
    #[diagnostic(
        code(kite_export::magnetic::too_small),
        help("increase the system length along the second lattice vector")
    )]
    SystemTooSmall { minimum_field: f64 },
    #[error("a magnetic field needs a lattice with at least two dimensions")]
    RequiresTwoDimensions,
    #[error("the field multiplier {0} must be positive")]
    #[diagnostic(help("reverse the lattice vectors to flip the field direction"))]
    NegativeField(i64),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures while flattening a lattice into the orbital hopping table
pub enum HamiltonianError {
    #[error("the lattice has no sublattices")]
    EmptyLattice,
    #[error("the number of orbitals of alias {0} is not defined")]
    #[diagnostic(code(kite_export::hamiltonian::orbitals))]
    UndefinedOrbitalCount(usize),
    #[error("alias {alias_id} has {found} orbitals but the reference defines {expected}")]
    #[diagnostic(code(kite_export::hamiltonian::orbitals))]
    OrbitalCountMismatch {
        alias_id: usize,
        expected: usize,
        found: usize,
    },
    #[error("the alias lookup of {found} entries does not map into the {expected} orbital blocks of the reference")]
    ReferenceLength { expected: usize, found: usize },
    #[error("hopping offset {0:?} reaches beyond the neighbouring unit cells")]
    #[diagnostic(
        code(kite_export::hamiltonian::offset),
        help("offsets are limited to -1, 0 or +1 along each lattice vector, enlarge the unit cell")
    )]
    OffsetOutOfRange(Vec<i32>),
    #[error("destination code {0} does not fit in a 32 bit integer")]
    DestinationOverflow(usize),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures building or persisting the output container
pub enum ContainerError {
    #[error("`{0}` already exists in the container")]
    Duplicate(String),
    #[error("`{0}` does not exist in the container")]
    Missing(String),
    #[error("IO failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode the container: {0}")]
    Encode(#[from] bincode::Error),
    #[cfg(feature = "hdf5")]
    #[error("HDF5 failure: {0}")]
    Hdf5(#[from] hdf5::Error),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures reading a system description from disk
pub enum ReaderError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("{context}: {message}")]
    #[diagnostic(code(kite_export::reader::value))]
    Value {
        context: String,
        message: String,
    },
}
