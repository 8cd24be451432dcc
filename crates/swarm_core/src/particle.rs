//! Particle records and the arena that owns them.
//!
//! Particles are addressed by [`ParticleId`], a stable slot index. The store
//! only ever grows, so an id handed out once stays valid for the lifetime of
//! the store and never moves mid-tick.

use glam::{Vec2, Vec4};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cell::UnsafeCell;

/// A single simulated particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Reserved for force accumulation; not read by the update kernel.
    pub force: Vec2,
    /// Reserved.
    pub density: f32,
    /// Reserved.
    pub pressure: f32,
    pub color: Vec4,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, color: Vec4) -> Self {
        Self {
            position,
            velocity,
            force: Vec2::ZERO,
            density: 0.0,
            pressure: 0.0,
            color,
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO, Vec4::ONE)
    }
}

/// Stable handle to a particle slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(u32);

impl ParticleId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

struct Slot(UnsafeCell<Particle>);

// SAFETY: mutable access to a slot only happens through `ParticleStore::slot_mut`
// and `ParticleStore::pair_mut`, whose callers must hold the exclusive right to
// that particle for the current phase (its index range or its cell lock).
// Shared reads through `get`/`iter` only happen while no worker is inside a tick.
unsafe impl Sync for Slot {}

/// Contiguous particle arena; the single source of truth for physical state.
///
/// Not internally synchronized. Outside a tick it behaves like a `Vec`; inside
/// a tick the worker pool mutates slots under the ownership rules documented
/// on [`ParticleStore::slot_mut`].
#[derive(Default)]
pub struct ParticleStore {
    slots: Vec<Slot>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Append a particle and return its handle.
    pub fn append(&mut self, particle: Particle) -> ParticleId {
        debug_assert!(self.slots.len() < u32::MAX as usize, "particle store full");
        let id = ParticleId::new(self.slots.len() as u32);
        self.slots.push(Slot(UnsafeCell::new(particle)));
        id
    }

    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Copy of the particle at `id`, or `None` if the slot does not exist.
    pub fn get(&self, id: ParticleId) -> Option<Particle> {
        self.slots.get(id.index()).map(|slot| {
            // SAFETY: see `impl Sync for Slot`; no tick is in flight while a
            // shared reference to the store is held outside the worker pool.
            unsafe { *slot.0.get() }
        })
    }

    /// Overwrite position and velocity. Returns `false` for an unknown id.
    pub fn set_position_velocity(&mut self, id: ParticleId, position: Vec2, velocity: Vec2) -> bool {
        match self.slots.get_mut(id.index()) {
            Some(slot) => {
                let particle = slot.0.get_mut();
                particle.position = position;
                particle.velocity = velocity;
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticleId> {
        (0..self.slots.len() as u32).map(ParticleId::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        // SAFETY: as in `get`.
        self.slots.iter().map(|slot| unsafe { &*slot.0.get() })
    }

    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = &Particle> + '_ {
        // SAFETY: as in `get`; parallel readers never race a writer.
        self.slots.par_iter().map(|slot| unsafe { &*slot.0.get() })
    }

    /// Mutable access to one particle from a shared store.
    ///
    /// # Safety
    ///
    /// `id` must be in bounds, and the caller must be the only thread touching
    /// this particle until the returned reference is dropped: either it owns
    /// the particle's index range in a lock-free phase, or it holds the lock of
    /// the cell the particle is binned into.
    #[allow(clippy::mut_from_ref)]
    #[inline]
    pub(crate) unsafe fn slot_mut(&self, id: ParticleId) -> &mut Particle {
        debug_assert!(id.index() < self.slots.len());
        &mut *self.slots.get_unchecked(id.index()).0.get()
    }

    /// Mutable access to two distinct particles.
    ///
    /// # Safety
    ///
    /// Same contract as [`slot_mut`](Self::slot_mut) for both ids, and `a != b`.
    #[allow(clippy::mut_from_ref)]
    #[inline]
    pub(crate) unsafe fn pair_mut(&self, a: ParticleId, b: ParticleId) -> (&mut Particle, &mut Particle) {
        debug_assert_ne!(a, b);
        (self.slot_mut(a), self.slot_mut(b))
    }
}

impl std::fmt::Debug for ParticleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleStore")
            .field("len", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::ZERO, Vec4::new(0.2, 0.6, 1.0, 1.0))
    }

    #[test]
    fn append_returns_sequential_ids() {
        let mut store = ParticleStore::new();
        let a = store.append(particle_at(1.0, 2.0));
        let b = store.append(particle_at(3.0, 4.0));

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b).map(|p| p.position), Some(Vec2::new(3.0, 4.0)));
        assert!(store.get(ParticleId::new(2)).is_none());
    }

    #[test]
    fn set_position_velocity_leaves_other_fields() {
        let mut store = ParticleStore::new();
        let mut seed = particle_at(0.0, 0.0);
        seed.density = 1.5;
        let id = store.append(seed);

        assert!(store.set_position_velocity(id, Vec2::new(5.0, 6.0), Vec2::new(-1.0, 0.5)));
        let p = store.get(id).unwrap();
        assert_eq!(p.position, Vec2::new(5.0, 6.0));
        assert_eq!(p.velocity, Vec2::new(-1.0, 0.5));
        assert_eq!(p.density, 1.5);
        assert_eq!(p.color, seed.color);

        assert!(!store.set_position_velocity(ParticleId::new(9), Vec2::ZERO, Vec2::ZERO));
    }

    #[test]
    fn new_particle_zeroes_reserved_fields() {
        let p = particle_at(1.0, 1.0);
        assert_eq!(p.force, Vec2::ZERO);
        assert_eq!(p.density, 0.0);
        assert_eq!(p.pressure, 0.0);
    }

    #[test]
    fn par_iter_matches_iter() {
        let mut store = ParticleStore::with_capacity(64);
        for i in 0..64 {
            store.append(particle_at(i as f32, 0.0));
        }
        let serial: Vec<f32> = store.iter().map(|p| p.position.x).collect();
        let parallel: Vec<f32> = store.par_iter().map(|p| p.position.x).collect();
        assert_eq!(serial, parallel);
        assert_eq!(store.ids().count(), 64);
    }
}
