//! Configuration for grid rotation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GridRotationError, Result};
use crate::types::SearchMethod;

/// Configuration for the axis switcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Nearest-neighbour search strategy.
    pub search: SearchMethod,

    /// Run the per-cell search on the rayon thread pool.
    pub parallel: bool,

    /// Grids with fewer cells than this are searched sequentially.
    pub parallel_min_cells: usize,

    /// Maximum number of points in a k-d tree leaf.
    pub kdtree_leaf_size: usize,

    /// Log a warning when brute-force search runs on a grid this large.
    pub brute_force_warn_cells: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            search: SearchMethod::KdTree,
            parallel: true,
            parallel_min_cells: 4096,
            kdtree_leaf_size: 16,
            brute_force_warn_cells: 100_000,
        }
    }
}

impl RotationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ROTATION_SEARCH") {
            match SearchMethod::parse(&val) {
                Some(search) => config.search = search,
                None => warn!(
                    value = %val,
                    fallback = %config.search,
                    "Unknown ROTATION_SEARCH value"
                ),
            }
        }

        if let Ok(val) = std::env::var("ROTATION_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("ROTATION_PARALLEL_MIN_CELLS") {
            if let Ok(cells) = val.parse() {
                config.parallel_min_cells = cells;
            }
        }

        if let Ok(val) = std::env::var("ROTATION_KDTREE_LEAF_SIZE") {
            if let Ok(size) = val.parse() {
                config.kdtree_leaf_size = size;
            }
        }

        if let Ok(val) = std::env::var("ROTATION_BRUTE_FORCE_WARN_CELLS") {
            if let Ok(cells) = val.parse() {
                config.brute_force_warn_cells = cells;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.kdtree_leaf_size == 0 {
            return Err(GridRotationError::ConfigError(
                "kdtree_leaf_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a grid of `cells` cells should be searched in parallel.
    pub fn use_parallel(&self, cells: usize) -> bool {
        self.parallel && cells >= self.parallel_min_cells
    }
}
