//! Error types for spherical rotations.

use thiserror::Error;

/// Errors that can occur while building or applying a rotation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// An Euler angle is NaN or outside the [0, 2π] domain.
    #[error("euler angle {name} = {value} is outside [0, 2π]")]
    InvalidAngle { name: &'static str, value: f64 },

    /// The prime-meridian anchor lies on the rotation axis, so the
    /// remaining rotational degree of freedom cannot be fixed.
    #[error("prime meridian anchor ({lat}, {lon}) lies on the rotation axis of new pole ({pole_lat}, {pole_lon})")]
    DegenerateRotation {
        lat: f64,
        lon: f64,
        pole_lat: f64,
        pole_lon: f64,
    },

    /// A latitude/longitude value is not usable.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Latitude and longitude inputs have different lengths.
    #[error("latitude array has {lats} values but longitude array has {lons}")]
    LengthMismatch { lats: usize, lons: usize },

    /// A rotation details string or array could not be parsed.
    #[error("invalid rotation details: {0}")]
    InvalidRotationDetails(String),
}

impl ProjectionError {
    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(msg: impl Into<String>) -> Self {
        Self::InvalidCoordinate(msg.into())
    }

    /// Create an InvalidRotationDetails error.
    pub fn invalid_rotation_details(msg: impl Into<String>) -> Self {
        Self::InvalidRotationDetails(msg.into())
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
