//! Error types for dataset construction, splitting and caching.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Error type for dataset operations.
///
/// Ordering bugs (transforming before fitting, splitting before fitting) are
/// not represented here: they are assertion failures.
#[derive(Debug)]
pub enum DatasetError {
    /// Invalid configuration value (fold count, target range, exclusion entry).
    InvalidConfig(String),
    /// Empty data provided where non-empty was required.
    EmptyData(String),
    /// Numerical computation error (e.g. log of a non-positive value).
    Numerical(String),
    /// A required column is absent from an input file.
    MissingColumn(String),
    /// Serialization or deserialization error.
    Serialization(String),
    /// I/O error during file operations.
    Io(String),
    /// The featurizer failed as a whole.
    Featurization(String),
    /// Column length does not match the number of rows.
    LengthMismatch { expected: usize, got: usize },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            DatasetError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            DatasetError::Numerical(msg) => write!(f, "Numerical error: {}", msg),
            DatasetError::MissingColumn(name) => write!(f, "Missing column: {}", name),
            DatasetError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            DatasetError::Io(msg) => write!(f, "I/O error: {}", msg),
            DatasetError::Featurization(msg) => write!(f, "Featurization error: {}", msg),
            DatasetError::LengthMismatch { expected, got } => {
                write!(f, "Length mismatch: expected {} values, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io(err.to_string())
    }
}

impl From<bincode::Error> for DatasetError {
    fn from(err: bincode::Error) -> Self {
        DatasetError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            DatasetError::Io(err.to_string())
        } else {
            DatasetError::Serialization(err.to_string())
        }
    }
}
