//! Pole relocation: deriving Euler angles from a new pole and a
//! prime-meridian anchor.
//!
//! A [`RotationSpec`] names the point that should become the north pole of
//! the rotated frame and a point that should sit on its prime meridian.
//! [`north_pole_to_rotation_angles`] turns that into the single Euler triple
//! whose forward rotation takes `new_pole` to latitude 90 and `pm_point` to
//! longitude 0. The inverse rotation takes the geographic north pole back to
//! `new_pole`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::angle::{adjust_lon_range, AngleUnit};
use crate::error::{ProjectionError, Result};
use crate::euler::{rotation_matrix, EulerAngles};
use crate::spherical::GeoPoint;

/// Horizontal extent below which the anchor is treated as lying on the
/// polar axis of the partially rotated frame.
const AXIS_TOLERANCE: f64 = 1e-9;

/// Where the north pole should move to, and which point fixes longitude 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationSpec {
    /// Location (geographic) of the north pole of the rotated frame.
    pub new_pole: GeoPoint,
    /// Point (geographic) that lands on longitude 0 after rotation.
    pub pm_point: GeoPoint,
}

impl Default for RotationSpec {
    fn default() -> Self {
        Self::identity()
    }
}

impl RotationSpec {
    /// Create a spec from a new pole and a prime-meridian anchor.
    pub fn new(new_pole: GeoPoint, pm_point: GeoPoint) -> Self {
        Self { new_pole, pm_point }
    }

    /// Create a spec using the default anchor at (0°N, 0°E).
    pub fn from_pole(lat: f64, lon: f64) -> Self {
        Self::new(GeoPoint::new(lat, lon), GeoPoint::new(0.0, 0.0))
    }

    /// The spec that leaves every point where it is.
    pub fn identity() -> Self {
        Self::from_pole(90.0, 0.0)
    }

    /// Build from `[np_lat, np_lon, pm_lat, pm_lon]`, the layout used when
    /// rotation details are recorded next to rotated output.
    pub fn from_details(details: [f64; 4]) -> Self {
        let [np_lat, np_lon, pm_lat, pm_lon] = details;
        Self::new(GeoPoint::new(np_lat, np_lon), GeoPoint::new(pm_lat, pm_lon))
    }

    /// The spec as `[np_lat, np_lon, pm_lat, pm_lon]`.
    pub fn details(&self) -> [f64; 4] {
        [
            self.new_pole.lat,
            self.new_pole.lon,
            self.pm_point.lat,
            self.pm_point.lon,
        ]
    }

    /// Parse `"np_lat,np_lon,pm_lat,pm_lon"`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ProjectionError::invalid_rotation_details(format!(
                "expected 4 comma separated values, got '{}'",
                s
            )));
        }

        let mut details = [0.0; 4];
        for (slot, part) in details.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                ProjectionError::invalid_rotation_details(format!("'{}' is not a number", part))
            })?;
        }

        let spec = Self::from_details(details);
        spec.validate()?;
        Ok(spec)
    }

    /// Check both points are finite with latitudes in [-90, 90].
    pub fn validate(&self) -> Result<()> {
        self.new_pole.validate()?;
        self.pm_point.validate()
    }

    /// Whether the spec derives to the zero rotation.
    pub fn is_identity(&self) -> bool {
        matches!(north_pole_to_rotation_angles(self), Ok(angles) if angles.is_zero())
    }

    /// Derive the Euler angles for this spec.
    pub fn rotation_angles(&self) -> Result<EulerAngles> {
        north_pole_to_rotation_angles(self)
    }
}

impl FromStr for RotationSpec {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for RotationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [np_lat, np_lon, pm_lat, pm_lon] = self.details();
        write!(f, "{},{},{},{}", np_lat, np_lon, pm_lat, pm_lon)
    }
}

/// Derive `(phi, theta, psi)` for a [`RotationSpec`].
///
/// * `theta = 90 - pole_lat` tips the new pole up to the top of the sphere.
/// * `psi = 90 - pole_lon` first turns the new pole onto the 90°E meridian,
///   where the x-axis turn lifts it straight to the pole. When the new pole
///   is already a geographic pole `psi` is 0 and `phi` carries the whole
///   turn about z.
/// * `phi` turns the anchor, after the `psi` and `theta` stages, onto
///   longitude 0.
///
/// The identity spec yields exactly `(0, 0, 0)`.
///
/// # Errors
/// * [`ProjectionError::InvalidCoordinate`] for non-finite or out-of-range
///   latitudes.
/// * [`ProjectionError::DegenerateRotation`] if the anchor is the new pole
///   or its antipode.
pub fn north_pole_to_rotation_angles(spec: &RotationSpec) -> Result<EulerAngles> {
    spec.validate()?;

    let pole = spec.new_pole;
    let theta = 90.0 - pole.lat;
    let psi = if pole.lat.abs() == 90.0 {
        0.0
    } else {
        adjust_lon_range(90.0 - pole.lon, AngleUnit::Degrees, 0.0)
    };

    let partial = rotation_matrix(0.0, theta.to_radians(), psi.to_radians(), false)?;
    let anchor = partial * spec.pm_point.to_cartesian();

    if anchor.x.hypot(anchor.y) < AXIS_TOLERANCE {
        return Err(ProjectionError::DegenerateRotation {
            lat: spec.pm_point.lat,
            lon: spec.pm_point.lon,
            pole_lat: pole.lat,
            pole_lon: pole.lon,
        });
    }

    let anchor_lon = anchor.y.atan2(anchor.x).to_degrees();
    let phi = adjust_lon_range(-anchor_lon, AngleUnit::Degrees, 0.0);

    let angles = EulerAngles::new(phi.to_radians(), theta.to_radians(), psi.to_radians());
    angles.validate()?;
    Ok(angles)
}
