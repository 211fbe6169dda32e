//! Core types for grid rotation.

use serde::{Deserialize, Serialize};

use crate::coords::coordinate_pairs;
use crate::error::{GridRotationError, Result};

/// A regular latitude/longitude grid.
///
/// The lattice is the cross product of the two axes. Axis order is kept as
/// given (south-to-north or north-to-south both work). Flattened layouts are
/// row-major: latitude varies slowest, longitude fastest, so cell
/// `(i_lat, i_lon)` lives at `i_lat * nlon + i_lon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularGrid {
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl RegularGrid {
    /// Create a grid from latitude and longitude axes (degrees).
    ///
    /// # Errors
    /// [`GridRotationError::InvalidGrid`] if an axis is empty, a value is not
    /// finite, or a latitude is outside [-90, 90].
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Result<Self> {
        if lats.is_empty() || lons.is_empty() {
            return Err(GridRotationError::invalid_grid(format!(
                "axes must be non-empty (got {} latitudes, {} longitudes)",
                lats.len(),
                lons.len()
            )));
        }

        if let Some(lat) = lats.iter().find(|v| !v.is_finite() || v.abs() > 90.0) {
            return Err(GridRotationError::invalid_grid(format!(
                "latitude {} is outside [-90, 90]",
                lat
            )));
        }

        if let Some(lon) = lons.iter().find(|v| !v.is_finite()) {
            return Err(GridRotationError::invalid_grid(format!(
                "longitude {} is not finite",
                lon
            )));
        }

        Ok(Self { lats, lons })
    }

    /// Latitude axis.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude axis.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn nlat(&self) -> usize {
        self.lats.len()
    }

    pub fn nlon(&self) -> usize {
        self.lons.len()
    }

    /// Shape of a single 2-D slab on this grid: `[nlat, nlon]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.nlat(), self.nlon()]
    }

    /// Total number of grid cells.
    pub fn len(&self) -> usize {
        self.nlat() * self.nlon()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened index of cell `(i_lat, i_lon)`.
    pub fn flat_index(&self, i_lat: usize, i_lon: usize) -> usize {
        i_lat * self.nlon() + i_lon
    }

    /// Flattened `(lats, lons)` for every cell, in layout order.
    pub fn coordinate_pairs(&self) -> (Vec<f64>, Vec<f64>) {
        coordinate_pairs(&self.lats, &self.lons)
    }

    /// Largest spacing between neighbouring latitudes, in degrees.
    pub fn lat_resolution(&self) -> f64 {
        max_spacing(&self.lats)
    }

    /// Largest spacing between neighbouring longitudes, in degrees.
    pub fn lon_resolution(&self) -> f64 {
        max_spacing(&self.lons)
    }
}

fn max_spacing(axis: &[f64]) -> f64 {
    axis.windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max)
}

/// A gridded data field.
///
/// The trailing two axes are `[nlat, nlon]` of a [`RegularGrid`]; any number
/// of leading axes (time, level, ...) may precede them. Data is row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridField {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl GridField {
    /// Create a field from row-major data and its shape.
    ///
    /// # Errors
    /// [`GridRotationError::ShapeMismatch`] if the shape has fewer than two
    /// axes or its product differs from `data.len()`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self> {
        if shape.len() < 2 {
            return Err(GridRotationError::shape_mismatch(
                "field shape",
                vec![0, 0],
                shape,
            ));
        }

        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(GridRotationError::shape_mismatch(
                "field data",
                vec![expected],
                vec![data.len()],
            ));
        }

        Ok(Self { data, shape })
    }

    /// Create a single 2-D slab on `grid`.
    pub fn from_grid(grid: &RegularGrid, data: Vec<f32>) -> Result<Self> {
        Self::new(data, grid.shape().to_vec())
    }

    /// Build a 2-D slab whose length is known to match `grid`.
    pub(crate) fn on_grid(grid: &RegularGrid, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), grid.len());
        Self {
            data,
            shape: grid.shape().to_vec(),
        }
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// The last two axes, `[nlat, nlon]`.
    pub fn trailing_shape(&self) -> [usize; 2] {
        let n = self.shape.len();
        [self.shape[n - 2], self.shape[n - 1]]
    }

    /// Number of values in one 2-D slab.
    pub fn slab_len(&self) -> usize {
        let [nlat, nlon] = self.trailing_shape();
        nlat * nlon
    }

    /// Number of 2-D slabs (product of the leading axes).
    pub fn num_slabs(&self) -> usize {
        self.shape[..self.shape.len() - 2].iter().product()
    }

    /// Iterate over the 2-D slabs in order.
    pub fn slabs(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks(self.slab_len().max(1))
    }

    /// Check the trailing axes match `grid`.
    pub fn check_grid(&self, grid: &RegularGrid) -> Result<()> {
        let trailing = self.trailing_shape();
        if trailing != grid.shape() {
            return Err(GridRotationError::shape_mismatch(
                "field trailing axes",
                grid.shape().to_vec(),
                trailing.to_vec(),
            ));
        }
        Ok(())
    }

    /// Largest absolute difference to another field of the same shape.
    ///
    /// Returns `None` if the shapes differ. Cells where either value is NaN
    /// are skipped.
    pub fn max_abs_diff(&self, other: &GridField) -> Option<f32> {
        if self.shape != other.shape {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| (a - b).abs())
                .filter(|d| !d.is_nan())
                .fold(0.0, f32::max),
        )
    }
}

/// Nearest-neighbour search strategy for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// k-d tree over unit vectors, O(N log N).
    #[default]
    KdTree,
    /// Exhaustive scan, O(N²). Only practical for coarse grids.
    BruteForce,
}

impl SearchMethod {
    /// Parse a known method name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kdtree" | "kd_tree" | "kd-tree" => Some(Self::KdTree),
            "brute_force" | "bruteforce" | "brute-force" | "brute" => Some(Self::BruteForce),
            _ => None,
        }
    }

    /// Parse from string (case-insensitive), falling back to the default.
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Get the method name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KdTree => "kdtree",
            Self::BruteForce => "brute_force",
        }
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
