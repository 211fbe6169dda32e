//! Spherical coordinate rotations.
//!
//! Relocates the north pole of a latitude/longitude frame to an arbitrary
//! point so that a curved path on the sphere can be handled as the equator of
//! a rotated frame, and inverts that rotation to restore the original frame.
//!
//! Building blocks, leaves first:
//!
//! - [`adjust_lon_range`] wraps angles into a half-open interval.
//! - [`rotation_matrix`] builds Z-X-Z Euler rotation matrices.
//! - [`rotate_spherical`] rotates batches of points via unit vectors.
//! - [`north_pole_to_rotation_angles`] derives the Euler angles for a
//!   [`RotationSpec`].
//!
//! Spherical earth only.

pub mod angle;
pub mod error;
pub mod euler;
pub mod pole;
pub mod spherical;

pub use angle::{adjust_lon_range, adjust_lon_ranges, AngleUnit};
pub use error::{ProjectionError, Result};
pub use euler::{rotation_matrix, EulerAngles};
pub use pole::{north_pole_to_rotation_angles, RotationSpec};
pub use spherical::{
    cartesian_to_geo, geo_to_cartesian, rotate_spherical, rotate_vectors, GeoPoint,
};
