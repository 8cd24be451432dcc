//! Headless presentation surface
//!
//! Stands in for a window: it accepts every frame, keeps an FPS estimate and
//! logs a window-title style status line twice a second.

use std::time::{Duration, Instant};
use swarm_core::{Frame, PresentationSurface, Result, SimError};
use swarm_metrics::TickTimer;

const TITLE_REFRESH: Duration = Duration::from_millis(500);

pub struct HeadlessSurface {
    title: String,
    timer: TickTimer,
    last_present: Option<Instant>,
    last_title: Instant,
    frames_presented: u64,
    bytes_presented: u64,
}

impl HeadlessSurface {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            timer: TickTimer::new(60),
            last_present: None,
            last_title: Instant::now(),
            frames_presented: 0,
            bytes_presented: 0,
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn bytes_presented(&self) -> u64 {
        self.bytes_presented
    }

    pub fn status_line(&self) -> String {
        format!("{} [{:.1} FPS]", self.title, self.timer.fps())
    }
}

impl PresentationSurface for HeadlessSurface {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        if frame.point_size <= 0.0 {
            return Err(SimError::Surface(format!(
                "point size must be positive, got {}",
                frame.point_size
            )));
        }

        let now = Instant::now();
        if let Some(last) = self.last_present.replace(now) {
            self.timer.record(now - last);
        }
        self.frames_presented += 1;
        self.bytes_presented += frame.as_bytes().len() as u64;

        if now.duration_since(self.last_title) >= TITLE_REFRESH {
            self.last_title = now;
            tracing::info!(
                tick = frame.tick,
                particles = frame.vertices.len(),
                "{}",
                self.status_line()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::ParticleVertex;

    #[test]
    fn counts_frames_and_bytes() -> Result<()> {
        let mut surface = HeadlessSurface::new("Thread collisions");
        let vertices = vec![ParticleVertex { position: [1.0, 2.0], color: [1.0; 4] }; 3];
        for tick in 1..=2 {
            surface.present(&Frame {
                tick,
                vertices: &vertices,
                interval: Duration::ZERO,
                point_size: 16.0,
            })?;
        }
        assert_eq!(surface.frames_presented(), 2);
        assert_eq!(surface.bytes_presented(), 2 * 3 * 24);
        assert!(surface.status_line().starts_with("Thread collisions ["));
        Ok(())
    }

    #[test]
    fn rejects_degenerate_point_size() {
        let mut surface = HeadlessSurface::new("t");
        let err = surface
            .present(&Frame {
                tick: 1,
                vertices: &[],
                interval: Duration::ZERO,
                point_size: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, SimError::Surface(_)));
    }
}
