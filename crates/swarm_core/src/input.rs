//! Staging buffer for newly spawned particles.
//!
//! Producers (spawners, input handlers) may enqueue from any thread at any
//! time. The frame driver drains the whole queue once per tick, before
//! binning, so new particles join that tick's update.

use crate::particle::{Particle, ParticleStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to the shared spawn queue.
#[derive(Clone, Default)]
pub struct InputChannel {
    pending: Arc<Mutex<Vec<Particle>>>,
}

impl InputChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Particle>> {
        // A panicking producer can at worst leave a fully pushed particle behind.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enqueue(&self, particle: Particle) {
        self.lock().push(particle);
    }

    /// Enqueue several particles under one lock, preserving order.
    pub fn enqueue_batch<I>(&self, particles: I)
    where
        I: IntoIterator<Item = Particle>,
    {
        self.lock().extend(particles);
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Move every pending particle into `store` in enqueue order and clear
    /// the queue. Returns how many were admitted.
    pub fn drain_into(&self, store: &mut ParticleStore) -> usize {
        let batch = std::mem::take(&mut *self.lock());
        let admitted = batch.len();
        store.reserve(admitted);
        for particle in batch {
            store.append(particle);
        }
        admitted
    }
}

impl std::fmt::Debug for InputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputChannel")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleId;
    use glam::{Vec2, Vec4};

    fn particle_x(x: f32) -> Particle {
        Particle::new(Vec2::new(x, 0.0), Vec2::ZERO, Vec4::ONE)
    }

    #[test]
    fn drain_preserves_order_and_empties_queue() {
        let input = InputChannel::new();
        input.enqueue(particle_x(1.0));
        input.enqueue_batch([particle_x(2.0), particle_x(3.0)]);
        assert_eq!(input.pending(), 3);

        let mut store = ParticleStore::new();
        assert_eq!(input.drain_into(&mut store), 3);
        assert_eq!(input.pending(), 0);

        let xs: Vec<f32> = store.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);

        // Second drain admits nothing and keeps existing ids stable
        assert_eq!(input.drain_into(&mut store), 0);
        assert_eq!(store.get(ParticleId::new(0)).map(|p| p.position.x), Some(1.0));
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let input = InputChannel::new();
        let producers: Vec<_> = (0..4)
            .map(|t| {
                let input = input.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        input.enqueue(particle_x((t * 100 + i) as f32));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let mut store = ParticleStore::new();
        assert_eq!(input.drain_into(&mut store), 400);
        let mut xs: Vec<u32> = store.iter().map(|p| p.position.x as u32).collect();
        xs.sort_unstable();
        assert_eq!(xs, (0..400).collect::<Vec<_>>());
    }
}
