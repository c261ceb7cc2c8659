//! Error type shared by the library

use std::fmt;

/// Errors reported before any numerical work starts
///
/// Numerical degeneracy (non-positive density, vanishing `M:M`) is not an
/// error: non-finite values propagate into the output field instead.
#[derive(Debug)]
pub enum SgsError {
    /// A field was sized for a different grid than the configuration
    ShapeMismatch {
        /// Name of the offending field
        field: &'static str,
        /// Padded cell count expected from the configuration
        expected: usize,
        /// Padded cell count actually supplied
        actual: usize,
    },
    /// Configuration failed validation
    InvalidConfig(String),
    /// Writing diagnostic output failed
    Io(std::io::Error),
}

impl fmt::Display for SgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SgsError::ShapeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Field '{field}' has {actual} cells, expected {expected} for the configured grid"
            ),
            SgsError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            SgsError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for SgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SgsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SgsError {
    fn from(err: std::io::Error) -> Self {
        SgsError::Io(err)
    }
}
