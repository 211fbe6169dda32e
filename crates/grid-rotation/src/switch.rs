//! Pole relocation of gridded fields.
//!
//! [`AxisSwitcher`] rotates every grid point into the frame described by a
//! [`RotationSpec`] and resamples the field back onto the original regular
//! grid by nearest neighbour:
//!
//! ```text
//! RotationSpec ──► Euler angles ──► rotate point cloud (unit vectors)
//!                                          │
//!                                          ▼
//!                           index (k-d tree | brute force)
//!                                          │
//!               grid cell vectors ─────────┤ nearest, lowest index on ties
//!                                          ▼
//!                        neighbour map: cell -> source point
//!                                          │
//!                                          ▼
//!                 gather every leading slab through the map
//! ```
//!
//! No averaging or interpolation takes place, so every output value is one
//! of the input values.

use nalgebra::Vector3;
use projection::{geo_to_cartesian, rotate_vectors, GeoPoint, RotationSpec};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::RotationConfig;
use crate::error::{GridRotationError, Result};
use crate::spatial::{BruteForce, KdTree, NearestNeighbor};
use crate::types::{GridField, RegularGrid, SearchMethod};

/// Rotates gridded fields into and out of a rotated-pole frame.
#[derive(Debug, Clone, Default)]
pub struct AxisSwitcher {
    config: RotationConfig,
}

impl AxisSwitcher {
    /// Create a switcher with the given configuration.
    pub fn new(config: RotationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Switch the axes of `field` into the frame of `spec`.
    ///
    /// `point_lats`/`point_lons` are the flattened coordinates of the field's
    /// trailing axes (see [`coordinate_pairs`](crate::coordinate_pairs)), and
    /// `grid` is the regular output grid. With `invert = true` the rotation
    /// runs in reverse, restoring a previously rotated field.
    ///
    /// # Errors
    /// * [`GridRotationError::ShapeMismatch`] if the field's trailing axes or
    ///   the coordinate arrays disagree with `grid`.
    /// * [`GridRotationError::Projection`] for invalid or degenerate specs.
    pub fn switch(
        &self,
        field: &GridField,
        point_lats: &[f64],
        point_lons: &[f64],
        grid: &RegularGrid,
        spec: &RotationSpec,
        invert: bool,
    ) -> Result<GridField> {
        field.check_grid(grid)?;

        let neighbors = self.neighbor_map(point_lats, point_lons, grid, spec, invert)?;
        let data = gather(field, &neighbors);

        GridField::new(data, field.shape().to_vec())
    }

    /// Rotate a field whose points are exactly the cells of `grid`.
    pub fn rotate(
        &self,
        field: &GridField,
        grid: &RegularGrid,
        spec: &RotationSpec,
    ) -> Result<GridField> {
        let (lats, lons) = grid.coordinate_pairs();
        self.switch(field, &lats, &lons, grid, spec, false)
    }

    /// Undo [`rotate`](Self::rotate) for the same `spec`.
    pub fn restore(
        &self,
        field: &GridField,
        grid: &RegularGrid,
        spec: &RotationSpec,
    ) -> Result<GridField> {
        let (lats, lons) = grid.coordinate_pairs();
        self.switch(field, &lats, &lons, grid, spec, true)
    }

    /// For every cell of `grid`, the index of the rotated point nearest to it.
    ///
    /// The map depends only on coordinates and the rotation, so it can be
    /// reused for any number of fields on the same grid.
    pub fn neighbor_map(
        &self,
        point_lats: &[f64],
        point_lons: &[f64],
        grid: &RegularGrid,
        spec: &RotationSpec,
        invert: bool,
    ) -> Result<Vec<usize>> {
        check_points(point_lats, point_lons, grid)?;

        let angles = spec.rotation_angles()?;
        let (phi, theta, psi) = angles.to_degrees();
        debug!(
            spec = %spec,
            phi,
            theta,
            psi,
            invert,
            nlat = grid.nlat(),
            nlon = grid.nlon(),
            "Derived rotation angles"
        );

        let rotated = rotate_vectors(point_lats, point_lons, &angles, invert)?;
        let index = self.build_index(rotated);

        let (cell_lats, cell_lons) = grid.coordinate_pairs();
        let cells: Vec<Vector3<f64>> = cell_lats
            .iter()
            .zip(&cell_lons)
            .map(|(&lat, &lon)| geo_to_cartesian(lat, lon))
            .collect();

        let neighbors: Option<Vec<usize>> = if self.config.use_parallel(cells.len()) {
            trace!(cells = cells.len(), "Searching neighbours in parallel");
            cells.par_iter().map(|cell| index.nearest(cell)).collect()
        } else {
            cells.iter().map(|cell| index.nearest(cell)).collect()
        };

        neighbors.ok_or_else(|| GridRotationError::invalid_grid("no points to resample from"))
    }

    fn build_index(&self, points: Vec<Vector3<f64>>) -> Box<dyn NearestNeighbor> {
        match self.config.search {
            SearchMethod::KdTree => {
                let tree = KdTree::new(points, self.config.kdtree_leaf_size);
                debug!(points = tree.len(), nodes = tree.node_count(), "Built k-d tree");
                Box::new(tree)
            }
            SearchMethod::BruteForce => {
                if points.len() >= self.config.brute_force_warn_cells {
                    warn!(
                        points = points.len(),
                        "Brute-force nearest neighbour search is O(N²) at this grid size"
                    );
                }
                Box::new(BruteForce::new(points))
            }
        }
    }
}

fn check_points(point_lats: &[f64], point_lons: &[f64], grid: &RegularGrid) -> Result<()> {
    if point_lats.len() != grid.len() {
        return Err(GridRotationError::shape_mismatch(
            "point latitudes",
            vec![grid.len()],
            vec![point_lats.len()],
        ));
    }
    if point_lons.len() != grid.len() {
        return Err(GridRotationError::shape_mismatch(
            "point longitudes",
            vec![grid.len()],
            vec![point_lons.len()],
        ));
    }
    for (&lat, &lon) in point_lats.iter().zip(point_lons) {
        GeoPoint::new(lat, lon).validate()?;
    }
    Ok(())
}

/// Resample every slab of `field` through `neighbors`.
fn gather(field: &GridField, neighbors: &[usize]) -> Vec<f32> {
    let mut out = Vec::with_capacity(field.data().len());
    for slab in field.slabs() {
        out.extend(neighbors.iter().map(|&source| slab[source]));
    }
    out
}

/// Switch the axes of `data` with the default configuration.
///
/// See [`AxisSwitcher::switch`].
pub fn switch_regular_axes(
    data: &GridField,
    point_lats: &[f64],
    point_lons: &[f64],
    grid: &RegularGrid,
    spec: &RotationSpec,
    invert: bool,
) -> Result<GridField> {
    AxisSwitcher::default().switch(data, point_lats, point_lons, grid, spec, invert)
}

/// How closely a restored field matches the original.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestoreStats {
    /// Number of cells compared (NaN cells are skipped).
    pub cells: usize,
    pub max_abs_error: f32,
    pub mean_abs_error: f64,
}

impl RestoreStats {
    /// Compare `restored` against `original`. Shapes must match.
    pub fn compare(original: &GridField, restored: &GridField) -> Result<Self> {
        if original.shape() != restored.shape() {
            return Err(GridRotationError::shape_mismatch(
                "restored field",
                original.shape().to_vec(),
                restored.shape().to_vec(),
            ));
        }

        let mut cells = 0;
        let mut max_abs_error = 0.0f32;
        let mut total = 0.0f64;
        for (a, b) in original.data().iter().zip(restored.data()) {
            let err = (a - b).abs();
            if err.is_nan() {
                continue;
            }
            cells += 1;
            max_abs_error = max_abs_error.max(err);
            total += err as f64;
        }

        let mean_abs_error = if cells == 0 { 0.0 } else { total / cells as f64 };
        Ok(Self {
            cells,
            max_abs_error,
            mean_abs_error,
        })
    }
}

/// Output of [`switch_and_restore`].
#[derive(Debug, Clone)]
pub struct SwitchAndRestore {
    pub rotated: GridField,
    pub restored: GridField,
    pub stats: RestoreStats,
}

/// Rotate `field` into the frame of `spec`, rotate it back, and measure how
/// much the nearest-neighbour round trip changed it.
pub fn switch_and_restore(
    field: &GridField,
    grid: &RegularGrid,
    spec: &RotationSpec,
    config: RotationConfig,
) -> Result<SwitchAndRestore> {
    let switcher = AxisSwitcher::new(config)?;

    let rotated = switcher.rotate(field, grid, spec)?;
    let restored = switcher.restore(&rotated, grid, spec)?;
    let stats = RestoreStats::compare(field, &restored)?;

    debug!(
        spec = %spec,
        max_abs_error = stats.max_abs_error,
        mean_abs_error = stats.mean_abs_error,
        "Switch and restore complete"
    );

    Ok(SwitchAndRestore {
        rotated,
        restored,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{constant_field, global_grid, index_field, latitude_field};
    use projection::ProjectionError;

    fn coarse_grid() -> RegularGrid {
        global_grid(10.0).unwrap()
    }

    #[test]
    fn test_identity_exact() {
        let grid = coarse_grid();
        let field = index_field(&grid);
        let (lats, lons) = grid.coordinate_pairs();

        let identity = RotationSpec::identity();
        let result = switch_regular_axes(&field, &lats, &lons, &grid, &identity, false).unwrap();
        assert_eq!(result, field);

        let back = switch_regular_axes(&field, &lats, &lons, &grid, &identity, true).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_values_come_from_input() {
        let grid = coarse_grid();
        let field = index_field(&grid);
        let spec = RotationSpec::from_details([30.0, 200.0, 0.0, 0.0]);

        let rotated = AxisSwitcher::default().rotate(&field, &grid, &spec).unwrap();
        let n = grid.len() as f32;
        assert!(rotated.data().iter().all(|v| *v >= 0.0 && *v < n && v.fract() == 0.0));
    }

    #[test]
    fn test_search_methods_agree() {
        let grid = coarse_grid();
        let field = index_field(&grid);
        let spec = RotationSpec::from_details([20.0, 260.0, 0.0, 180.0]);

        let kdtree = AxisSwitcher::new(RotationConfig {
            search: SearchMethod::KdTree,
            kdtree_leaf_size: 3,
            ..Default::default()
        })
        .unwrap();
        let brute = AxisSwitcher::new(RotationConfig {
            search: SearchMethod::BruteForce,
            ..Default::default()
        })
        .unwrap();

        let a = kdtree.rotate(&field, &grid, &spec).unwrap();
        let b = brute.rotate(&field, &grid, &spec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let grid = coarse_grid();
        let field = index_field(&grid);
        let spec = RotationSpec::from_details([-35.0, 75.0, 10.0, 300.0]);

        let sequential = AxisSwitcher::new(RotationConfig {
            parallel: false,
            ..Default::default()
        })
        .unwrap();
        let parallel = AxisSwitcher::new(RotationConfig {
            parallel: true,
            parallel_min_cells: 0,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            sequential.rotate(&field, &grid, &spec).unwrap(),
            parallel.rotate(&field, &grid, &spec).unwrap()
        );
    }

    #[test]
    fn test_trailing_shape_mismatch() {
        let grid = coarse_grid();
        let (lats, lons) = grid.coordinate_pairs();
        let [nlat, nlon] = grid.shape();
        let field = GridField::new(vec![0.0; nlat * nlon], vec![nlon, nlat]).unwrap();

        let err = switch_regular_axes(&field, &lats, &lons, &grid, &RotationSpec::identity(), false)
            .unwrap_err();
        assert!(matches!(err, GridRotationError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let grid = global_grid(30.0).unwrap();
        let field = index_field(&grid);
        let (mut lats, lons) = grid.coordinate_pairs();
        lats[5] = f64::NAN;
        let spec = RotationSpec::from_details([20.0, 260.0, 0.0, 180.0]);

        for search in [SearchMethod::KdTree, SearchMethod::BruteForce] {
            let switcher = AxisSwitcher::new(RotationConfig {
                search,
                kdtree_leaf_size: 1,
                ..Default::default()
            })
            .unwrap();

            let err = switcher
                .switch(&field, &lats, &lons, &grid, &spec, false)
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    GridRotationError::Projection(ProjectionError::InvalidCoordinate(_))
                ),
                "{}: {:?}",
                search,
                err
            );
        }
    }

    #[test]
    fn test_point_latitude_out_of_range() {
        let grid = coarse_grid();
        let field = constant_field(&grid, 1.0);
        let (mut lats, mut lons) = grid.coordinate_pairs();
        lats[0] = 95.0;

        let identity = RotationSpec::identity();
        assert!(switch_regular_axes(&field, &lats, &lons, &grid, &identity, false).is_err());

        lats[0] = 90.0;
        lons[3] = f64::INFINITY;
        assert!(switch_regular_axes(&field, &lats, &lons, &grid, &identity, false).is_err());
    }

    #[test]
    fn test_point_count_mismatch() {
        let grid = coarse_grid();
        let field = constant_field(&grid, 1.0);
        let (lats, lons) = grid.coordinate_pairs();

        let identity = RotationSpec::identity();
        let err = switch_regular_axes(&field, &lats[1..], &lons, &grid, &identity, false)
            .unwrap_err();
        assert_eq!(
            err,
            GridRotationError::ShapeMismatch {
                what: "point latitudes",
                expected: vec![grid.len()],
                actual: vec![grid.len() - 1],
            }
        );
    }

    #[test]
    fn test_degenerate_spec_propagates() {
        let grid = coarse_grid();
        let field = latitude_field(&grid);
        let spec = RotationSpec::from_details([40.0, 10.0, 40.0, 10.0]);

        let err = AxisSwitcher::default().rotate(&field, &grid, &spec).unwrap_err();
        assert!(matches!(
            err,
            GridRotationError::Projection(projection::ProjectionError::DegenerateRotation { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RotationConfig {
            kdtree_leaf_size: 0,
            ..Default::default()
        };
        assert!(AxisSwitcher::new(config).is_err());
    }

    #[test]
    fn test_restore_stats() {
        let a = GridField::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = GridField::new(vec![1.0, 2.5, 2.0, f32::NAN], vec![2, 2]).unwrap();

        let stats = RestoreStats::compare(&a, &b).unwrap();
        assert_eq!(stats.cells, 3);
        assert_eq!(stats.max_abs_error, 1.0);
        assert!((stats.mean_abs_error - 0.5).abs() < 1e-12);

        let c = GridField::new(vec![0.0; 4], vec![4, 1]).unwrap();
        assert!(RestoreStats::compare(&a, &c).is_err());
    }
}
