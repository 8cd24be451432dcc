//! Spawn sources
//!
//! Spawners only produce [`SpawnRequest`]s; pushing them into a simulation's
//! input channel is up to the caller, from whichever thread it likes.

use crate::settings::SpawnSettings;
use glam::{Vec2, Vec4};
use swarm_core::math::DeterministicRng;
use swarm_core::{InputChannel, Particle};

/// An externally supplied new particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Vec4,
}

impl SpawnRequest {
    pub fn into_particle(self) -> Particle {
        Particle::new(self.position, self.velocity, self.color)
    }

    pub fn submit(self, input: &InputChannel) {
        input.enqueue(self.into_particle());
    }
}

/// Lays particles out on a lattice in the middle quarter of the domain,
/// row by row from `y = 100`.
#[derive(Debug, Clone)]
pub struct BlockSpawner {
    count: u32,
    step: f32,
    left: f32,
    right: f32,
    top: f32,
    velocity: Vec2,
    color: Vec4,
}

impl BlockSpawner {
    pub fn new(settings: &SpawnSettings, width: f32, radius: f32) -> Self {
        Self {
            count: settings.block_count,
            step: radius * settings.spacing_factor,
            left: 3.0 * width / 8.0,
            right: 5.0 * width / 8.0,
            top: 100.0,
            velocity: Vec2::from_array(settings.block_velocity),
            color: Vec4::from_array(settings.block_color),
        }
    }

    pub fn requests(&self) -> Vec<SpawnRequest> {
        let mut out = Vec::with_capacity(self.count as usize);
        let mut cursor = Vec2::new(self.left, self.top);
        for _ in 0..self.count {
            out.push(SpawnRequest {
                position: cursor,
                velocity: self.velocity,
                color: self.color,
            });
            cursor.x += self.step;
            if cursor.x > self.right {
                cursor.y += self.step;
                cursor.x = self.left;
            }
        }
        out
    }

    /// Enqueue the whole block in one batch.
    pub fn submit(&self, input: &InputChannel) -> usize {
        let requests = self.requests();
        let count = requests.len();
        input.enqueue_batch(requests.into_iter().map(SpawnRequest::into_particle));
        count
    }
}

/// Drips single particles in from the top-center of the domain.
#[derive(Debug, Clone)]
pub struct StreamSpawner {
    every_frames: u32,
    origin: Vec2,
    jitter: f32,
    velocity: Vec2,
    color: Vec4,
    rng: DeterministicRng,
}

impl StreamSpawner {
    /// `None` when the stream is disabled in `settings`.
    pub fn new(settings: &SpawnSettings, width: f32, radius: f32) -> Option<Self> {
        let every_frames = settings.stream_every_frames.filter(|&n| n > 0)?;
        Some(Self {
            every_frames,
            origin: Vec2::new(width / 2.0, radius),
            jitter: radius,
            velocity: Vec2::from_array(settings.stream_velocity),
            color: Vec4::from_array(settings.stream_color),
            rng: DeterministicRng::new(settings.seed),
        })
    }

    /// Request for `frame`, if this frame emits one.
    pub fn poll(&mut self, frame: u64) -> Option<SpawnRequest> {
        if frame % self.every_frames as u64 != 0 {
            return None;
        }
        let dx = self.rng.range_f32(-self.jitter, self.jitter);
        Some(SpawnRequest {
            position: self.origin + Vec2::new(dx, 0.0),
            velocity: self.velocity,
            color: self.color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_wraps_rows_inside_middle_quarter() {
        let settings = SpawnSettings::default();
        let block = BlockSpawner::new(&settings, 1000.0, 8.0);
        let requests = block.requests();

        assert_eq!(requests.len(), 512);
        assert_eq!(requests[0].position, Vec2::new(375.0, 100.0));
        assert!((requests[1].position.x - (375.0 + 9.6)).abs() < 1e-3);
        assert!(requests.iter().all(|r| r.position.x >= 375.0 && r.position.x <= 625.0));
        assert!(requests.iter().any(|r| r.position.y > 100.0));
        assert!(requests
            .iter()
            .all(|r| r.velocity == Vec2::new(0.0, -1.0) && r.color == Vec4::new(0.2, 0.6, 1.0, 1.0)));
    }

    #[test]
    fn block_particles_do_not_overlap() {
        let block = BlockSpawner::new(&SpawnSettings::default(), 1000.0, 8.0);
        let requests = block.requests();
        for (i, a) in requests.iter().enumerate() {
            for b in &requests[i + 1..] {
                assert!(a.position.distance(b.position) >= 8.0 - 1e-3);
            }
        }
    }

    #[test]
    fn block_submit_fills_channel() {
        let input = InputChannel::new();
        let settings = SpawnSettings {
            block_count: 20,
            ..SpawnSettings::default()
        };
        let block = BlockSpawner::new(&settings, 1000.0, 8.0);
        assert_eq!(block.submit(&input), 20);
        assert_eq!(input.pending(), 20);
    }

    #[test]
    fn stream_emits_on_schedule() {
        let settings = SpawnSettings {
            stream_every_frames: Some(3),
            ..SpawnSettings::default()
        };
        let mut stream = StreamSpawner::new(&settings, 1000.0, 8.0).unwrap();
        let emitted: Vec<u64> = (0..10).filter(|&f| stream.poll(f).is_some()).collect();
        assert_eq!(emitted, vec![0, 3, 6, 9]);

        let request = stream.poll(12).unwrap();
        assert!((request.position.x - 500.0).abs() <= 8.0);
        assert_eq!(request.position.y, 8.0);
        let particle = request.into_particle();
        assert_eq!(particle.density, 0.0);
    }

    #[test]
    fn stream_disabled_by_default() {
        assert!(StreamSpawner::new(&SpawnSettings::default(), 1000.0, 8.0).is_none());
        let zero = SpawnSettings {
            stream_every_frames: Some(0),
            ..SpawnSettings::default()
        };
        assert!(StreamSpawner::new(&zero, 1000.0, 8.0).is_none());
    }
}
