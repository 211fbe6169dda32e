//! Rotation of latitude/longitude points on the unit sphere.
//!
//! Points go through a Cartesian round trip: (lat, lon) becomes a unit
//! vector, the vector is multiplied by the Euler rotation matrix, and the
//! result is converted back to degrees with longitude in [0, 360).
//!
//! At an exact pole the output longitude is undefined; it is reported as 0.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::angle::{adjust_lon_range, AngleUnit};
use crate::error::{ProjectionError, Result};
use crate::euler::EulerAngles;

/// A point on the sphere in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check the latitude is within [-90, 90] and both values are finite.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(ProjectionError::invalid_coordinate(format!(
                "({}, {}) is not finite",
                self.lat, self.lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ProjectionError::invalid_coordinate(format!(
                "latitude {} is outside [-90, 90]",
                self.lat
            )));
        }
        Ok(())
    }

    /// Unit vector for this point.
    pub fn to_cartesian(&self) -> Vector3<f64> {
        geo_to_cartesian(self.lat, self.lon)
    }

    /// Point for a (not necessarily unit) vector.
    pub fn from_cartesian(v: &Vector3<f64>) -> Self {
        let (lat, lon) = cartesian_to_geo(v);
        Self { lat, lon }
    }
}

/// Convert latitude/longitude in degrees to a unit Cartesian vector.
///
/// x points at (0°N, 0°E), y at (0°N, 90°E) and z at the north pole.
pub fn geo_to_cartesian(lat: f64, lon: f64) -> Vector3<f64> {
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// Convert a Cartesian vector to `(lat, lon)` in degrees, lon in [0, 360).
pub fn cartesian_to_geo(v: &Vector3<f64>) -> (f64, f64) {
    let horizontal = v.x.hypot(v.y);
    let lat = v.z.atan2(horizontal).to_degrees();
    let lon = if horizontal == 0.0 {
        0.0
    } else {
        adjust_lon_range(v.y.atan2(v.x).to_degrees(), AngleUnit::Degrees, 0.0)
    };
    (lat, lon)
}

/// Rotate point coordinates and return the rotated unit vectors.
///
/// `lats` and `lons` are parallel arrays in degrees.
pub fn rotate_vectors(
    lats: &[f64],
    lons: &[f64],
    angles: &EulerAngles,
    invert: bool,
) -> Result<Vec<Vector3<f64>>> {
    if lats.len() != lons.len() {
        return Err(ProjectionError::LengthMismatch {
            lats: lats.len(),
            lons: lons.len(),
        });
    }

    let matrix = angles.matrix(invert)?;
    Ok(apply_matrix(&matrix, lats, lons))
}

fn apply_matrix(matrix: &Matrix3<f64>, lats: &[f64], lons: &[f64]) -> Vec<Vector3<f64>> {
    lats.iter()
        .zip(lons)
        .map(|(&lat, &lon)| matrix * geo_to_cartesian(lat, lon))
        .collect()
}

/// Rotate parallel arrays of latitude/longitude (degrees) by the Z-X-Z
/// Euler angles `phi`, `theta`, `psi` (degrees).
///
/// Angles are wrapped into [0, 360) before the matrix is built, so negative
/// angles are accepted. With `invert = true` the inverse rotation is applied;
/// rotating forward and then inverted with the same angles recovers the
/// input for non-polar points.
///
/// Returns `(lats, lons)` with longitude in [0, 360).
///
/// # Errors
/// * [`ProjectionError::LengthMismatch`] if the arrays differ in length.
/// * [`ProjectionError::InvalidAngle`] if an angle is NaN or infinite.
pub fn rotate_spherical(
    lats: &[f64],
    lons: &[f64],
    phi: f64,
    theta: f64,
    psi: f64,
    invert: bool,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let angles = EulerAngles::from_degrees(phi, theta, psi);
    let vectors = rotate_vectors(lats, lons, &angles, invert)?;

    Ok(vectors.iter().map(cartesian_to_geo).unzip())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lon_diff(a: f64, b: f64) -> f64 {
        let d = adjust_lon_range(a - b, AngleUnit::Degrees, -180.0);
        d.abs()
    }

    #[test]
    fn test_cartesian_axes() {
        let v = geo_to_cartesian(0.0, 0.0);
        assert_eq!(v, Vector3::new(1.0, 0.0, 0.0));

        let (lat, lon) = cartesian_to_geo(&Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(lat, 90.0);
        assert_eq!(lon, 0.0);

        let (lat, lon) = cartesian_to_geo(&Vector3::new(0.0, -1.0, 0.0));
        assert!(lat.abs() < 1e-12);
        assert!((lon - 270.0).abs() < 1e-12);
    }

    #[test]
    fn test_cartesian_roundtrip() {
        for (lat, lon) in [(45.0, 10.0), (-33.5, 200.0), (80.0, 359.0), (-10.0, 0.5)] {
            let p = GeoPoint::new(lat, lon);
            let q = GeoPoint::from_cartesian(&p.to_cartesian());
            assert!((q.lat - lat).abs() < 1e-9, "lat {} vs {}", lat, q.lat);
            assert!(lon_diff(q.lon, lon) < 1e-9, "lon {} vs {}", lon, q.lon);
        }
    }

    #[test]
    fn test_pure_phi() {
        let lats = [0.0; 5];
        let lons = [0.0, 65.0, 170.0, 230.0, 340.0];
        let answer = [310.0, 15.0, 120.0, 180.0, 290.0];

        let (rot_lats, rot_lons) = rotate_spherical(&lats, &lons, -50.0, 0.0, 0.0, false).unwrap();

        for i in 0..lats.len() {
            assert!(rot_lats[i].abs() < 1e-7, "lat {} should stay 0", rot_lats[i]);
            assert!(
                (rot_lons[i] - answer[i]).abs() < 1e-3,
                "lon {}: expected {}, got {}",
                lons[i],
                answer[i],
                rot_lons[i]
            );
        }
    }

    #[test]
    fn test_pure_theta() {
        let lats = [70.0, 70.0, 40.0, -32.0, -45.0, -80.0];
        let lons = [90.0, 270.0, -90.0, 90.0, -90.0, 90.0];
        let lats_answer = [50.0, 10.0, -20.0, 28.0, -75.0, -20.0];
        let lons_answer = [270.0, 270.0, 270.0, 90.0, 90.0, 90.0];

        let (rot_lats, rot_lons) = rotate_spherical(&lats, &lons, 0.0, 60.0, 0.0, false).unwrap();

        for i in 0..lats.len() {
            assert!(
                (rot_lats[i] - lats_answer[i]).abs() < 1e-3,
                "point {}: expected lat {}, got {}",
                i,
                lats_answer[i],
                rot_lats[i]
            );
            assert!(
                (rot_lons[i] - lons_answer[i]).abs() < 1e-3,
                "point {}: expected lon {}, got {}",
                i,
                lons_answer[i],
                rot_lons[i]
            );
        }
    }

    #[test]
    fn test_pure_psi_on_equator() {
        // With theta = 0 both z turns add to the longitude.
        let (_, rot_lons) =
            rotate_spherical(&[0.0, 0.0], &[10.0, 100.0], 0.0, 0.0, 30.0, false).unwrap();
        assert!((rot_lons[0] - 40.0).abs() < 1e-9);
        assert!((rot_lons[1] - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_longitude_range() {
        let lats = [10.0, -20.0, 30.0];
        let lons = [-170.0, 720.0, 359.999];
        let (_, rot_lons) = rotate_spherical(&lats, &lons, 25.0, 40.0, 300.0, false).unwrap();
        for lon in rot_lons {
            assert!((0.0..360.0).contains(&lon), "{} outside [0, 360)", lon);
        }
    }

    #[test]
    fn test_pole_longitude_is_zero() {
        let (lats, lons) =
            rotate_spherical(&[90.0, -90.0], &[45.0, 45.0], 0.0, 0.0, 0.0, false).unwrap();
        assert!((lats[0] - 90.0).abs() < 1e-12);
        assert!((lats[1] + 90.0).abs() < 1e-12);
        // cos(90°) is not exactly zero, so only check the output is in range.
        assert!((0.0..360.0).contains(&lons[0]));
    }

    #[test]
    fn test_length_mismatch() {
        let err = rotate_spherical(&[0.0, 1.0], &[0.0], 10.0, 20.0, 30.0, false).unwrap_err();
        assert_eq!(err, ProjectionError::LengthMismatch { lats: 2, lons: 1 });
    }

    #[test]
    fn test_nan_angle_rejected() {
        let err = rotate_spherical(&[0.0], &[0.0], f64::NAN, 0.0, 0.0, false).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidAngle { name: "phi", .. }));
    }

    #[test]
    fn test_geo_point_validate() {
        assert!(GeoPoint::new(90.0, 720.0).validate().is_ok());
        assert!(GeoPoint::new(90.5, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).validate().is_err());
    }
}
