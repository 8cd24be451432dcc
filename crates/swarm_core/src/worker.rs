//! Update worker pool internals.
//!
//! Every worker owns a fixed slice of grid rows for collision resolution and,
//! per tick, a slice of particle indices for integration, binning and
//! boundary handling. One tick runs as:
//!
//! ```text
//! tick_start ─ integrate + bin (own indices) ─ binned ─ resolve (own rows)
//!            ─ resolved ─ reflect bounds (own indices) ─ tick_done
//! ```
//!
//! `tick_start` and `tick_done` include the driver thread.

use crate::collision::{integrate, reflect_bounds, resolve_pair};
use crate::grid::{CellPair, SpatialGrid};
use crate::particle::{ParticleId, ParticleStore};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier, PoisonError, RwLock};

/// State shared by the driver and all workers.
pub(crate) struct Shared {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) radius: f32,
    pub(crate) worker_count: usize,
    pub(crate) grid: SpatialGrid,
    /// Write-locked by the driver only between ticks; read-locked by workers
    /// for the span of a tick.
    pub(crate) store: RwLock<ParticleStore>,
    pub(crate) tick_start: Barrier,
    binned: Barrier,
    resolved: Barrier,
    pub(crate) tick_done: Barrier,
    pub(crate) shutdown: AtomicBool,
    /// Overlapping pairs resolved in the current tick.
    pub(crate) collisions: AtomicU64,
}

impl Shared {
    pub(crate) fn new(
        width: f32,
        height: f32,
        radius: f32,
        worker_count: usize,
        grid: SpatialGrid,
    ) -> Self {
        Self {
            width,
            height,
            radius,
            worker_count,
            grid,
            store: RwLock::new(ParticleStore::new()),
            tick_start: Barrier::new(worker_count + 1),
            binned: Barrier::new(worker_count),
            resolved: Barrier::new(worker_count),
            tick_done: Barrier::new(worker_count + 1),
            shutdown: AtomicBool::new(false),
            collisions: AtomicU64::new(0),
        }
    }
}

/// `ceil(rows / workers)` rows per worker; trailing workers may get none.
pub(crate) fn row_slice(worker: usize, workers: usize, rows: u32) -> Range<u32> {
    let per_worker = rows.div_ceil(workers as u32);
    let start = (worker as u32 * per_worker).min(rows);
    let end = (start + per_worker).min(rows);
    start..end
}

/// Contiguous particle-index slice for `worker` out of `len` particles.
pub(crate) fn index_slice(worker: usize, workers: usize, len: usize) -> Range<usize> {
    let per_worker = len.div_ceil(workers);
    let start = (worker * per_worker).min(len);
    let end = (start + per_worker).min(len);
    start..end
}

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) rows: Range<u32>,
}

impl Worker {
    pub(crate) fn run(self, shared: Arc<Shared>) {
        tracing::debug!(worker = self.id, rows = ?self.rows, "worker started");
        loop {
            shared.tick_start.wait();
            if shared.shutdown.load(Ordering::Acquire) {
                break;
            }
            self.tick(&shared);
            shared.tick_done.wait();
        }
        tracing::debug!(worker = self.id, "worker stopped");
    }

    fn tick(&self, shared: &Shared) {
        // Only the driver writes the store, and never while a tick is in flight.
        let store = shared.store.read().unwrap_or_else(PoisonError::into_inner);
        let indices = index_slice(self.id, shared.worker_count, store.len());

        // Integrate + bin
        for index in indices.clone() {
            let id = ParticleId::new(index as u32);
            // SAFETY: index slices are disjoint and nothing else touches
            // particles before `binned`.
            let particle = unsafe { store.slot_mut(id) };
            integrate(particle);
            shared.grid.insert(shared.grid.cell_of(particle.position), id);
        }

        shared.binned.wait();

        let resolved = resolve_rows(&shared.grid, &store, self.rows.clone(), shared.radius);
        shared.collisions.fetch_add(resolved, Ordering::Relaxed);

        shared.resolved.wait();

        for index in indices {
            // SAFETY: cell locks are no longer used this tick; index slices are disjoint.
            let particle = unsafe { store.slot_mut(ParticleId::new(index as u32)) };
            reflect_bounds(particle, shared.width, shared.height);
        }
    }
}

/// Resolve every overlapping pair reachable from origin cells in `rows`.
/// Returns the number of pairs that overlapped.
///
/// Must only run after binning completed for the whole store.
pub(crate) fn resolve_rows(
    grid: &SpatialGrid,
    store: &ParticleStore,
    rows: Range<u32>,
    radius: f32,
) -> u64 {
    let mut resolved = 0;
    grid.for_each_cell_pair_in_range(rows, |pair| match pair {
        CellPair::Same(ids) => {
            for (k, &p) in ids.iter().enumerate() {
                for &q in &ids[k + 1..] {
                    // SAFETY: we hold this cell's lock, every particle is
                    // binned in exactly one cell, and p != q.
                    let (a, b) = unsafe { store.pair_mut(p, q) };
                    if resolve_pair(a, b, radius) {
                        resolved += 1;
                    }
                }
            }
        }
        CellPair::Adjacent(first, second) => {
            for &p in first {
                for &q in second {
                    // SAFETY: we hold both cell locks; p and q live in
                    // different cells, so they are distinct.
                    let (a, b) = unsafe { store.pair_mut(p, q) };
                    if resolve_pair(a, b, radius) {
                        resolved += 1;
                    }
                }
            }
        }
    });
    resolved
}
