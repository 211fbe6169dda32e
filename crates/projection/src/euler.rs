//! Euler-angle rotation matrices.
//!
//! Rotations use the Z-X-Z sequence: turn by `phi` about the polar axis, then
//! by `theta` about the new equatorial (x) axis, then by `psi` about the
//! newest polar axis.
//!
//! The forward matrix (`inverse = false`) carries point vectors into the
//! rotated frame. Written with counter-clockwise elementary rotations it is
//!
//! ```text
//! M = Rz(phi) · Rx(theta) · Rz(psi)
//! ```
//!
//! which is the transpose of the classical frame rotation
//! `Rz(psi) · Rx(theta) · Rz(phi)` in the axis-rotation convention. A pure
//! `phi` turn therefore adds `phi` to the longitude of every point.

use std::f64::consts::TAU;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::angle::{adjust_lon_range, AngleUnit};
use crate::error::{ProjectionError, Result};

/// A Z-X-Z Euler angle triple in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    pub phi: f64,
    pub theta: f64,
    pub psi: f64,
}

impl EulerAngles {
    /// Create a triple from radians. Values are not checked until a matrix
    /// is built.
    pub fn new(phi: f64, theta: f64, psi: f64) -> Self {
        Self { phi, theta, psi }
    }

    /// Create a triple from degrees, wrapping each angle into [0, 360) first.
    pub fn from_degrees(phi: f64, theta: f64, psi: f64) -> Self {
        let wrap = |a: f64| adjust_lon_range(a, AngleUnit::Degrees, 0.0).to_radians();
        Self::new(wrap(phi), wrap(theta), wrap(psi))
    }

    /// The triple in degrees as `(phi, theta, psi)`.
    pub fn to_degrees(&self) -> (f64, f64, f64) {
        (
            self.phi.to_degrees(),
            self.theta.to_degrees(),
            self.psi.to_degrees(),
        )
    }

    /// Whether all three angles are zero.
    pub fn is_zero(&self) -> bool {
        self.phi == 0.0 && self.theta == 0.0 && self.psi == 0.0
    }

    /// Check every angle lies in [0, 2π].
    pub fn validate(&self) -> Result<()> {
        check_angle("phi", self.phi)?;
        check_angle("theta", self.theta)?;
        check_angle("psi", self.psi)?;
        Ok(())
    }

    /// Build the rotation matrix for this triple.
    pub fn matrix(&self, inverse: bool) -> Result<Matrix3<f64>> {
        rotation_matrix(self.phi, self.theta, self.psi, inverse)
    }
}

fn check_angle(name: &'static str, value: f64) -> Result<()> {
    // NaN fails the range test as well.
    if (0.0..=TAU).contains(&value) {
        Ok(())
    } else {
        Err(ProjectionError::InvalidAngle { name, value })
    }
}

/// Build the Z-X-Z rotation matrix for `(phi, theta, psi)` in radians.
///
/// With `inverse = true` the transpose is returned, which is the exact
/// inverse since the matrix is orthogonal.
///
/// # Errors
/// [`ProjectionError::InvalidAngle`] if any angle is outside [0, 2π].
pub fn rotation_matrix(phi: f64, theta: f64, psi: f64, inverse: bool) -> Result<Matrix3<f64>> {
    check_angle("phi", phi)?;
    check_angle("theta", theta)?;
    check_angle("psi", psi)?;

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_psi, cos_psi) = psi.sin_cos();

    let forward = rotate_z(sin_phi, cos_phi)
        * rotate_x(sin_theta, cos_theta)
        * rotate_z(sin_psi, cos_psi);

    Ok(if inverse { forward.transpose() } else { forward })
}

/// Counter-clockwise rotation about the z axis.
#[rustfmt::skip]
fn rotate_z(sin: f64, cos: f64) -> Matrix3<f64> {
    Matrix3::new(
        cos, -sin, 0.0,
        sin, cos, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Counter-clockwise rotation about the x axis.
#[rustfmt::skip]
fn rotate_x(sin: f64, cos: f64) -> Matrix3<f64> {
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cos, -sin,
        0.0, sin, cos,
    )
}
