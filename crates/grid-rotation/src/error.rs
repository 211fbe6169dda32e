//! Error types for grid rotation.

use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while switching grid axes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridRotationError {
    /// Data, coordinate arrays and grid axes disagree in shape.
    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The grid axes are unusable.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Angle derivation or point rotation failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl GridRotationError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(what: &'static str, expected: Vec<usize>, actual: Vec<usize>) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }
}

/// Result type for grid rotation operations.
pub type Result<T> = std::result::Result<T, GridRotationError>;
