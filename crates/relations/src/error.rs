use thiserror::Error;

/// Everything that can go wrong when building, reading or transforming a
/// relation. None of these are fatal; the caller decides what to show.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelationError {
    #[error("cell ({row}, {col}) is outside a relation over {size} elements")]
    OutOfRange { row: usize, col: usize, size: usize },

    #[error("a relation needs at least one element")]
    InvalidSize,

    #[error("a {size}x{size} relation needs {size}² cells, got {found}")]
    ShapeMismatch { size: usize, found: usize },

    #[error("a {size}x{size} relation has more cells than can be addressed")]
    TooLarge { size: usize },

    #[error("row {row} has {len} cells, expected {size}")]
    RaggedRow { row: usize, len: usize, size: usize },

    #[error("cell ({row}, {col}) was given both true and false")]
    DuplicateEntry { row: usize, col: usize },

    #[error("history has not been seeded")]
    EmptyHistory,

    #[error("there is no current relation to transform")]
    EmptySource,

    #[error("invalid cell {found:?} in row {row}, expected '0' or '1'")]
    InvalidCell { row: usize, found: char },

    #[error("density {0} is not a probability")]
    InvalidDensity(f64),

    #[error("unknown closure `{0}`")]
    UnknownClosure(String),
}
