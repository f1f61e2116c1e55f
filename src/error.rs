//! Error types for the Kohonen SOM engine.

use thiserror::Error;

/// The main error type for SOM operations.
#[derive(Error, Debug)]
pub enum SomError {
    /// Non-positive lattice width, height or codebook dimensionality.
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// A sample or node vector does not have the lattice dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// The lattice dimensionality.
        expected: usize,
        /// The length that was supplied.
        got: usize,
    },

    /// Unrecognized persistence format tag.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Persisted snapshot is missing fields or holds invalid values.
    #[error("Corrupt state: {0}")]
    CorruptState(String),

    /// Index out of range.
    #[error("Index out of range: {index} >= {max}")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The exclusive upper bound.
        max: usize,
    },

    /// Empty input.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid argument, such as a zero iteration count.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for SOM operations.
pub type Result<T> = std::result::Result<T, SomError>;

impl From<bincode::Error> for SomError {
    fn from(err: bincode::Error) -> Self {
        SomError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SomError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            SomError::Io(err.into())
        } else {
            SomError::Serialization(err.to_string())
        }
    }
}
