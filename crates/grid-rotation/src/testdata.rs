//! Synthetic fields for tests and diagnostics.
//!
//! Fields whose values are a known function of position make resampling
//! errors easy to read off: after a rotation to a new pole at 90°S, a field
//! of `-lat` should come back as `+lat`, and a restored field should match
//! the original to within one grid cell.

use crate::error::{GridRotationError, Result};
use crate::types::{GridField, RegularGrid};

/// Build an axis from `start` to `end` (inclusive when it lands on a step).
fn axis(start: f64, end: f64, step: f64, inclusive: bool) -> Vec<f64> {
    let count = ((end - start) / step).round() as usize;
    let count = if inclusive { count + 1 } else { count };
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// A global grid: latitudes -90..=90 (south to north), longitudes 0..360
/// (the 360 column is not repeated), both spaced by `resolution` degrees.
///
/// # Errors
/// [`GridRotationError::InvalidGrid`] unless `resolution` is in (0, 180].
pub fn global_grid(resolution: f64) -> Result<RegularGrid> {
    if !(resolution > 0.0 && resolution <= 180.0) {
        return Err(GridRotationError::invalid_grid(format!(
            "resolution {} must be in (0, 180]",
            resolution
        )));
    }

    let lats = axis(-90.0, 90.0, resolution, true);
    let lons = axis(0.0, 360.0, resolution, false);
    RegularGrid::new(lats, lons)
}

/// Field whose value is the latitude of each cell.
pub fn latitude_field(grid: &RegularGrid) -> GridField {
    fill(grid, |lat, _| lat as f32)
}

/// Field whose value is minus the latitude of each cell.
pub fn negated_latitude_field(grid: &RegularGrid) -> GridField {
    fill(grid, |lat, _| -lat as f32)
}

/// Field whose value is the longitude of each cell.
pub fn longitude_field(grid: &RegularGrid) -> GridField {
    fill(grid, |_, lon| lon as f32)
}

/// Field with the same value everywhere.
pub fn constant_field(grid: &RegularGrid, value: f32) -> GridField {
    fill(grid, |_, _| value)
}

/// Field whose value is the flattened index of each cell.
pub fn index_field(grid: &RegularGrid) -> GridField {
    let data = (0..grid.len()).map(|i| i as f32).collect();
    GridField::on_grid(grid, data)
}

/// Stack 2-D fields on the same grid along a new leading axis.
///
/// Returns `None` if the list is empty or the fields differ in shape.
pub fn stack_fields(fields: &[GridField]) -> Option<GridField> {
    let first = fields.first()?;
    if fields.iter().any(|f| f.shape() != first.shape()) {
        return None;
    }

    let mut shape = vec![fields.len()];
    shape.extend_from_slice(first.shape());
    let data = fields.iter().flat_map(|f| f.data().iter().copied()).collect();

    GridField::new(data, shape).ok()
}

fn fill(grid: &RegularGrid, value: impl Fn(f64, f64) -> f32) -> GridField {
    let mut data = Vec::with_capacity(grid.len());
    for &lat in grid.lats() {
        for &lon in grid.lons() {
            data.push(value(lat, lon));
        }
    }
    GridField::on_grid(grid, data)
}
