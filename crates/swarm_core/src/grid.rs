//! Uniform spatial grid with one lock per cell.
//!
//! The grid covers `[0, width] x [0, height]` with square cells of
//! `cell_size`. Because `cell_size >= radius`, two overlapping particles are
//! always binned into the same cell or into 8-adjacent cells, so collision
//! resolution only needs to look at each cell and its neighbors.

use crate::particle::ParticleId;
use glam::Vec2;
use std::ops::Range;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Integer cell coordinates, always inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// True when `other` is this cell or one of its 8 neighbors.
    pub fn is_adjacent_or_same(&self, other: CellCoord) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

/// Membership of one cell pair, handed to the resolver while both locks are held.
#[derive(Debug, Clone, Copy)]
pub enum CellPair<'a> {
    /// A cell paired with itself.
    Same(&'a [ParticleId]),
    /// Two distinct neighboring cells, in visiting order (origin, neighbor).
    Adjacent(&'a [ParticleId], &'a [ParticleId]),
}

/// Neighbor offsets `(dx, dy)` lexicographically >= `(0, 0)`.
///
/// For any two distinct neighbors exactly one of `d` and `-d` is listed, so
/// each unordered cell pair is visited once.
const FORWARD_NEIGHBORS: [(i64, i64); 5] = [(0, 0), (0, 1), (1, -1), (1, 0), (1, 1)];

pub struct SpatialGrid {
    cell_size: f32,
    cols: u32,
    rows: u32,
    cells: Box<[Mutex<Vec<ParticleId>>]>,
}

impl SpatialGrid {
    /// Build a grid covering `[0, width] x [0, height]`; at least one cell per axis.
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cols = (width / cell_size).ceil().max(1.0) as u32;
        let rows = (height / cell_size).ceil().max(1.0) as u32;
        let cells = (0..cols as usize * rows as usize)
            .map(|_| Mutex::new(Vec::new()))
            .collect();
        Self {
            cell_size,
            cols,
            rows,
            cells,
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell containing `position`, clamped to the grid. NaN maps to the low edge.
    #[inline]
    pub fn cell_of(&self, position: Vec2) -> CellCoord {
        // `as u32` saturates and maps NaN to 0
        let x = (position.x / self.cell_size)
            .floor()
            .clamp(0.0, (self.cols - 1) as f32) as u32;
        let y = (position.y / self.cell_size)
            .floor()
            .clamp(0.0, (self.rows - 1) as f32) as u32;
        CellCoord::new(x, y)
    }

    #[inline]
    fn flat(&self, coord: CellCoord) -> usize {
        coord.y as usize * self.cols as usize + coord.x as usize
    }

    #[inline]
    fn lock(&self, flat: usize) -> MutexGuard<'_, Vec<ParticleId>> {
        // Index lists hold no cross-entry invariant, so a poisoned cell is still usable.
        self.cells[flat].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Empty every cell. Must not run concurrently with `insert`.
    pub fn clear_all(&self) {
        for flat in 0..self.cells.len() {
            self.lock(flat).clear();
        }
    }

    /// Append `id` to the cell under that cell's lock.
    #[inline]
    pub fn insert(&self, coord: CellCoord, id: ParticleId) {
        self.lock(self.flat(coord)).push(id);
    }

    /// Copy of one cell's membership.
    pub fn cell_contents(&self, coord: CellCoord) -> Vec<ParticleId> {
        self.lock(self.flat(coord)).clone()
    }

    /// Total number of binned entries across all cells.
    pub fn binned_count(&self) -> usize {
        (0..self.cells.len()).map(|flat| self.lock(flat).len()).sum()
    }

    /// Visit every cell pair whose origin row lies in `rows`.
    ///
    /// Each occupied origin cell is paired with itself and with its forward
    /// neighbors, so over the full row range every unordered pair of
    /// neighboring cells is visited exactly once. Both locks are taken in
    /// ascending flat-index order and held for the duration of the callback;
    /// pairs with an empty side are skipped.
    pub fn for_each_cell_pair_in_range<F>(&self, rows: Range<u32>, mut f: F)
    where
        F: FnMut(CellPair<'_>),
    {
        let row_end = rows.end.min(self.rows);
        for cy in rows.start..row_end {
            for cx in 0..self.cols {
                let origin = CellCoord::new(cx, cy);
                let a = self.flat(origin);
                if self.lock(a).is_empty() {
                    continue;
                }

                for (dx, dy) in FORWARD_NEIGHBORS {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= self.cols as i64 || ny >= self.rows as i64 {
                        continue;
                    }
                    let b = self.flat(CellCoord::new(nx as u32, ny as u32));

                    if a == b {
                        let cell = self.lock(a);
                        f(CellPair::Same(cell.as_slice()));
                        continue;
                    }

                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    let lo_guard = self.lock(lo);
                    let hi_guard = self.lock(hi);
                    if lo_guard.is_empty() || hi_guard.is_empty() {
                        continue;
                    }
                    let (first, second) = if a < b {
                        (lo_guard.as_slice(), hi_guard.as_slice())
                    } else {
                        (hi_guard.as_slice(), lo_guard.as_slice())
                    };
                    f(CellPair::Adjacent(first, second));
                    // Release in reverse acquisition order.
                    drop(hi_guard);
                    drop(lo_guard);
                }
            }
        }
    }
}

impl std::fmt::Debug for SpatialGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialGrid")
            .field("cell_size", &self.cell_size)
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .finish()
    }
}
