//! Domain configuration, fixed at startup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and > 0, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("cell size {cell_size} is smaller than the collision radius {radius}")]
    CellSmallerThanRadius { cell_size: f32, radius: f32 },

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("grid of {cols}x{rows} cells exceeds the limit of {max} cells", max = MAX_GRID_CELLS)]
    GridTooLarge { cols: u64, rows: u64 },
}

/// Upper bound on `cols * rows`; every cell owns a lock and a bucket.
pub const MAX_GRID_CELLS: u64 = 1 << 22;

/// Simulation domain `[0, width] x [0, height]` and kernel parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: f32,
    pub height: f32,
    /// Center distance below which two particles overlap.
    pub radius: f32,
    /// Grid cell edge; must be >= `radius` so overlaps never skip a cell.
    pub cell_size: f32,
    /// `None` sizes the pool to the available hardware concurrency.
    pub worker_count: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            radius: 8.0,
            cell_size: 8.0,
            worker_count: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("radius", self.radius),
            ("cell_size", self.cell_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.cell_size < self.radius {
            return Err(ConfigError::CellSmallerThanRadius {
                cell_size: self.cell_size,
                radius: self.radius,
            });
        }
        let (cols, rows) = self.grid_dims();
        match cols.checked_mul(rows) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => return Err(ConfigError::GridTooLarge { cols, rows }),
        }
        if self.worker_count == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Grid columns and rows for this domain, at least one each.
    pub fn grid_dims(&self) -> (u64, u64) {
        let axis = |extent: f32| {
            (f64::from(extent) / f64::from(self.cell_size))
                .ceil()
                .max(1.0) as u64
        };
        (axis(self.width), axis(self.height))
    }

    /// Worker count after resolving `None` against the host.
    pub fn resolved_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }
}
