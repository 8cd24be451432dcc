//! Frame driver: owns the worker pool and runs ticks.

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::grid::SpatialGrid;
use crate::input::InputChannel;
use crate::particle::{Particle, ParticleStore};
use crate::surface::ParticleVertex;
use crate::time::SimulationTime;
use crate::worker::{row_slice, Shared, Worker};
use rayon::prelude::*;
use std::sync::atomic::Ordering;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use swarm_metrics::{Counter, PhaseProfiler, TickTimer};

/// Ticks kept in the rolling timing window.
const TIMING_WINDOW: usize = 120;

/// Summary of one completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Particles admitted from the input channel at the start of the tick.
    pub spawned: usize,
    pub particle_count: usize,
    /// Overlapping pairs resolved this tick.
    pub collisions: u64,
}

/// Driver-side instrumentation (no-ops without the `metrics` feature).
pub struct TickMetrics {
    pub timer: TickTimer,
    pub counters: Counter,
    pub phases: PhaseProfiler,
}

impl TickMetrics {
    fn new() -> Self {
        Self {
            timer: TickTimer::new(TIMING_WINDOW),
            counters: Counter::new(),
            phases: PhaseProfiler::new(),
        }
    }
}

/// A running particle simulation backed by a fixed pool of worker threads.
///
/// `tick` advances the world by one step; between ticks the store can be
/// inspected through `with_particles` or packed with `snapshot`.
pub struct Simulation {
    config: SimConfig,
    shared: Arc<Shared>,
    input: InputChannel,
    workers: Vec<JoinHandle<()>>,
    time: SimulationTime,
    metrics: TickMetrics,
}

impl Simulation {
    /// Validate `config`, build the grid and start the worker pool.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let worker_count = config.resolved_worker_count();
        let grid = SpatialGrid::new(config.width, config.height, config.cell_size);
        let rows = grid.rows();

        tracing::info!(
            workers = worker_count,
            cols = grid.cols(),
            rows,
            rows_per_worker = rows.div_ceil(worker_count as u32),
            "starting particle simulation"
        );

        let shared = Arc::new(Shared::new(
            config.width,
            config.height,
            config.radius,
            worker_count,
            grid,
        ));

        let workers = spawn_workers(&shared, rows, |id, body| {
            std::thread::Builder::new()
                .name(format!("swarm-worker-{id}"))
                .spawn(body)
        })?;

        Ok(Self {
            config,
            shared,
            input: InputChannel::new(),
            workers,
            time: SimulationTime::new(),
            metrics: TickMetrics::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.shared.worker_count
    }

    pub fn time(&self) -> &SimulationTime {
        &self.time
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// Grid state as left by the last tick (binning of that tick).
    pub fn grid(&self) -> &SpatialGrid {
        &self.shared.grid
    }

    /// Producer handle; clone it into spawner threads.
    pub fn input(&self) -> InputChannel {
        self.input.clone()
    }

    /// Queue a particle for admission at the start of the next tick.
    pub fn enqueue(&self, particle: Particle) {
        self.input.enqueue(particle);
    }

    /// Run one full tick and block until every worker has finished it.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.metrics.timer.begin();

        let shared = &self.shared;
        let input = &self.input;

        let spawned = self.metrics.phases.time_phase("drain", || -> Result<usize> {
            let mut store = shared
                .store
                .write()
                .map_err(|_| SimError::Poisoned("particle store"))?;
            Ok(input.drain_into(&mut store))
        })?;

        self.metrics.phases.time_phase("workers", || {
            // Workers are parked on `tick_start`, so nothing can be inserting.
            shared.grid.clear_all();
            shared.collisions.store(0, Ordering::Relaxed);
            shared.tick_start.wait();
            shared.tick_done.wait();
        });

        let collisions = shared.collisions.load(Ordering::Relaxed);
        let particle_count = self.with_particles(|store| store.len())?;
        self.time.advance_tick();

        self.metrics.timer.end();
        self.metrics.counters.increment("spawned", spawned as u64);
        self.metrics.counters.increment("collisions", collisions);
        self.metrics.counters.set("particles", particle_count as u64);

        let report = TickReport {
            tick: self.time.tick_count(),
            spawned,
            particle_count,
            collisions,
        };
        tracing::trace!(
            tick = report.tick,
            spawned,
            particles = particle_count,
            collisions,
            "tick complete"
        );
        Ok(report)
    }

    /// Run `f` against the particle store between ticks.
    pub fn with_particles<R>(&self, f: impl FnOnce(&ParticleStore) -> R) -> Result<R> {
        let store = self
            .shared
            .store
            .read()
            .map_err(|_| SimError::Poisoned("particle store"))?;
        Ok(f(&store))
    }

    /// Pack `{position, color}` of every particle, in id order.
    pub fn snapshot(&self) -> Result<Vec<ParticleVertex>> {
        self.with_particles(|store| store.par_iter().map(ParticleVertex::from).collect())
    }

    /// Stop issuing ticks and join every worker.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        if self.workers.is_empty() {
            return Ok(());
        }
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.tick_start.wait();

        let mut result = Ok(());
        for (id, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() && result.is_ok() {
                result = Err(SimError::WorkerPanicked(id));
            }
        }
        tracing::info!(ticks = self.time.tick_count(), "particle simulation stopped");
        result
    }
}

/// Spawn one thread per worker behind a start gate.
///
/// Workers enter the tick loop only after every spawn succeeded. On failure
/// the gates close, the threads already started return without touching a
/// barrier, and they are joined before the error is reported.
fn spawn_workers<S>(shared: &Arc<Shared>, rows: u32, mut spawn: S) -> Result<Vec<JoinHandle<()>>>
where
    S: FnMut(usize, Box<dyn FnOnce() + Send>) -> std::io::Result<JoinHandle<()>>,
{
    let count = shared.worker_count;
    let mut handles = Vec::with_capacity(count);
    let mut gates = Vec::with_capacity(count);

    for id in 0..count {
        let worker = Worker {
            id,
            rows: row_slice(id, count, rows),
        };
        let shared = Arc::clone(shared);
        let (open, gate) = mpsc::channel::<()>();
        let body: Box<dyn FnOnce() + Send> = Box::new(move || {
            if gate.recv().is_ok() {
                worker.run(shared);
            }
        });

        match spawn(id, body) {
            Ok(handle) => {
                handles.push(handle);
                gates.push(open);
            }
            Err(err) => {
                drop(gates);
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(SimError::Spawn(err));
            }
        }
    }

    for open in gates {
        let _ = open.send(());
    }
    Ok(handles)
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(%err, "worker pool did not shut down cleanly");
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("workers", &self.workers.len())
            .field("tick", &self.time.tick_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};
    use std::sync::atomic::AtomicUsize;

    fn config(workers: usize) -> SimConfig {
        SimConfig {
            width: 200.0,
            height: 200.0,
            radius: 8.0,
            cell_size: 8.0,
            worker_count: Some(workers),
        }
    }

    fn at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::ZERO, Vec4::ONE)
    }

    #[test]
    fn empty_tick_completes() -> Result<()> {
        let mut sim = Simulation::new(config(3))?;
        let report = sim.tick()?;
        assert_eq!(report, TickReport { tick: 1, spawned: 0, particle_count: 0, collisions: 0 });
        sim.shutdown()
    }

    #[test]
    fn spawned_particles_join_the_same_tick() -> Result<()> {
        let mut sim = Simulation::new(config(2))?;
        sim.enqueue(at(10.0, 10.0));
        sim.input().enqueue(at(50.0, 50.0));

        let report = sim.tick()?;
        assert_eq!(report.spawned, 2);
        assert_eq!(report.particle_count, 2);
        assert_eq!(sim.grid().binned_count(), 2);

        let report = sim.tick()?;
        assert_eq!(report.spawned, 0);
        assert_eq!(report.tick, 2);
        sim.shutdown()
    }

    #[test]
    fn invalid_config_rejected() {
        let err = Simulation::new(config(0)).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn snapshot_carries_position_and_color() -> Result<()> {
        let mut sim = Simulation::new(config(2))?;
        sim.enqueue(Particle::new(Vec2::new(20.0, 30.0), Vec2::new(1.0, 0.0), Vec4::new(0.2, 0.6, 1.0, 1.0)));
        sim.tick()?;

        let vertices = sim.snapshot()?;
        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].position, [21.0, 30.0]);
        assert_eq!(vertices[0].color, [0.2, 0.6, 1.0, 1.0]);
        sim.shutdown()
    }

    #[test]
    fn drop_joins_workers() -> Result<()> {
        let mut sim = Simulation::new(config(4))?;
        sim.enqueue(at(1.0, 1.0));
        sim.tick()?;
        drop(sim);
        Ok(())
    }

    #[test]
    fn failed_spawn_releases_started_workers() {
        let grid = SpatialGrid::new(200.0, 200.0, 8.0);
        let rows = grid.rows();
        let shared = Arc::new(Shared::new(200.0, 200.0, 8.0, 4, grid));
        let exited = Arc::new(AtomicUsize::new(0));

        let result = spawn_workers(&shared, rows, |id, body| {
            if id == 2 {
                return Err(std::io::Error::other("thread limit reached"));
            }
            let exited = Arc::clone(&exited);
            Ok(std::thread::spawn(move || {
                body();
                exited.fetch_add(1, Ordering::SeqCst);
            }))
        });

        assert!(matches!(result, Err(SimError::Spawn(_))));
        // Both started workers left before the error came back
        assert_eq!(exited.load(Ordering::SeqCst), 2);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn counters_track_spawns() -> Result<()> {
        let mut sim = Simulation::new(config(1))?;
        sim.enqueue(at(100.0, 100.0));
        sim.enqueue(at(104.0, 100.0));
        let report = sim.tick()?;
        assert_eq!(report.collisions, 1);
        if swarm_metrics::ENABLED {
            assert_eq!(sim.metrics().counters.get("spawned"), 2);
            assert_eq!(sim.metrics().counters.get("collisions"), 1);
            assert_eq!(sim.metrics().timer.samples(), 1);
        }
        sim.shutdown()
    }
}
