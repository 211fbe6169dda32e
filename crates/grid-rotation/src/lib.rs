//! Pole relocation for regular latitude/longitude grids.
//!
//! This crate moves gridded fields into a rotated-pole frame and back. A
//! wave-packet path that curves across the globe becomes a straight equator
//! in the rotated frame; analysis runs there and the result is restored to
//! geographic coordinates with the inverse rotation.
//!
//! # Architecture
//!
//! ```text
//! GridField + RegularGrid + RotationSpec
//!      │
//!      ▼
//! AxisSwitcher::switch(invert)
//!      │
//!      ├─► projection::north_pole_to_rotation_angles (Euler triple)
//!      │
//!      ├─► projection::rotate_vectors (every grid point)
//!      │
//!      ├─► KdTree / BruteForce nearest neighbour per output cell
//!      │
//!      └─► gather each leading slab through the neighbour map
//!               │
//!               ▼
//!          GridField (same shape)
//! ```
//!
//! # Example
//!
//! ```
//! use grid_rotation::{testdata, AxisSwitcher, RotationSpec};
//!
//! let grid = testdata::global_grid(10.0).unwrap();
//! let field = testdata::negated_latitude_field(&grid);
//!
//! let spec = RotationSpec::from_pole(-90.0, 0.0);
//! let switcher = AxisSwitcher::default();
//! let rotated = switcher.rotate(&field, &grid, &spec).unwrap();
//! let restored = switcher.restore(&rotated, &grid, &spec).unwrap();
//!
//! assert_eq!(rotated.shape(), field.shape());
//! assert!(restored.max_abs_diff(&field).unwrap() <= 10.0);
//! ```

pub mod config;
pub mod coords;
pub mod error;
pub mod spatial;
pub mod switch;
pub mod testdata;
pub mod types;

// Re-export commonly used types at crate root
pub use config::RotationConfig;
pub use coords::coordinate_pairs;
pub use error::{GridRotationError, Result};
pub use projection::{GeoPoint, RotationSpec};
pub use spatial::{BruteForce, KdTree, NearestNeighbor};
pub use switch::{
    switch_and_restore, switch_regular_axes, AxisSwitcher, RestoreStats, SwitchAndRestore,
};
pub use types::{GridField, RegularGrid, SearchMethod};
