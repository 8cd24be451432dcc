//! Swarm Runtime
//!
//! Headless binary that boots the particle engine and drives it frame by frame

mod surface;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use swarm_core::time::FramePacer;
use swarm_core::{Frame, PresentationSurface, Simulation};
use swarm_services::{BlockSpawner, Settings, StreamSpawner};
use surface::HeadlessSurface;

const DEFAULT_SETTINGS_PATH: &str = "swarm.json";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Swarm v{}", swarm_core::VERSION);

    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {settings_path}"))?;
    let sim_config = settings.simulation.clone();

    let mut sim = Simulation::new(sim_config.clone()).context("starting simulation")?;

    let block = BlockSpawner::new(&settings.spawn, sim_config.width, sim_config.radius);
    let queued = block.submit(&sim.input());
    tracing::info!(queued, "initial block queued");

    // The stream spawner runs as an independent producer on its own clock.
    let stop = Arc::new(AtomicBool::new(false));
    let producer = StreamSpawner::new(&settings.spawn, sim_config.width, sim_config.radius)
        .map(|mut stream| {
            let input = sim.input();
            let stop = Arc::clone(&stop);
            let target_fps = settings.display.target_fps;
            std::thread::Builder::new()
                .name("swarm-spawner".to_string())
                .spawn(move || {
                    let mut pacer = FramePacer::new(target_fps);
                    let mut frame = 0u64;
                    while !stop.load(Ordering::Relaxed) {
                        if let Some(request) = stream.poll(frame) {
                            request.submit(&input);
                        }
                        frame += 1;
                        pacer.wait();
                    }
                })
        })
        .transpose()
        .context("starting spawner thread")?;

    let mut surface = HeadlessSurface::new(settings.display.title.clone());
    let mut pacer = FramePacer::new(settings.display.target_fps);
    let point_size = 2.0 * sim_config.radius;
    let mut frames = 0u64;

    if settings.display.max_frames.is_none() {
        tracing::warn!("no frame budget set; running until killed, workers will not be joined");
    }

    while settings.display.max_frames.map_or(true, |max| frames < max) {
        let report = sim.tick().context("running tick")?;
        let vertices = sim.snapshot()?;
        surface.present(&Frame {
            tick: report.tick,
            vertices: &vertices,
            interval: pacer.interval(),
            point_size,
        })?;
        frames += 1;
        pacer.wait();
    }

    stop.store(true, Ordering::Relaxed);
    if let Some(handle) = producer {
        if handle.join().is_err() {
            tracing::warn!("spawner thread panicked");
        }
    }

    tracing::info!(
        frames = surface.frames_presented(),
        bytes = surface.bytes_presented(),
        "{}",
        surface.status_line()
    );
    sim.shutdown().context("shutting down worker pool")?;
    Ok(())
}
