use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while a lattice is being described
pub enum LatticeError {
    #[error("lattice vectors must form a square matrix with 1 to 3 rows, found {rows}x{cols}")]
    #[diagnostic(code(kite_lattice::vectors))]
    VectorShape { rows: usize, cols: usize },
    #[error("lattice vectors are linearly dependent")]
    #[diagnostic(code(kite_lattice::vectors))]
    SingularVectors,
    #[error("{context}: expected {expected} components, found {found}")]
    #[diagnostic(code(kite_lattice::dimension))]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },
    #[error("sublattice `{0}` is defined more than once")]
    DuplicateSublattice(String),
    #[error("sublattice `{0}` does not exist in the lattice")]
    UnknownSublattice(String),
    #[error("hopping family `{0}` is defined more than once")]
    DuplicateHopping(String),
    #[error("hopping family `{0}` has not been registered")]
    UnknownHopping(String),
    #[error("onsite energy of `{name}` must be square, found {rows}x{cols}")]
    NonSquareOnsite {
        name: String,
        rows: usize,
        cols: usize,
    },
    #[error(
        "hopping `{family}` from `{from}` to `{to}` needs a {expected:?} energy block, found {found:?}"
    )]
    #[diagnostic(help("the rows follow the orbitals of the source site and the columns those of the target"))]
    NonConformableHopping {
        family: String,
        from: String,
        to: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("an onsite hopping from `{0}` to itself belongs in the sublattice energy")]
    SelfHopping(String),
}
