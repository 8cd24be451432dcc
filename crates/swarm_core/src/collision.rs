//! Per-particle and pairwise update kernel.
//!
//! These functions are pure with respect to their arguments; the worker pool
//! decides who may call them on which particles.

use crate::particle::Particle;
use glam::Vec2;

/// Separation axis used when two particles sit exactly on top of each other.
pub const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Advance one tick: `position += velocity`.
#[inline]
pub fn integrate(particle: &mut Particle) {
    particle.position += particle.velocity;
}

/// Separate an overlapping pair and absorb its momentum.
///
/// If the centers are closer than `radius`, both particles are pushed apart
/// along the line between them by half the overlap each, and both velocities
/// are zeroed (perfectly inelastic). Returns whether the pair overlapped.
#[inline]
pub fn resolve_pair(p: &mut Particle, q: &mut Particle, radius: f32) -> bool {
    let delta = p.position - q.position;
    let dist_sq = delta.dot(delta);
    // A NaN distance (non-finite partner) never counts as overlap.
    if dist_sq.is_nan() || dist_sq >= radius * radius {
        return false;
    }

    let dist = dist_sq.sqrt();
    let overlap = (radius - dist) * 0.5;
    let normal = if dist > 0.0 { delta / dist } else { FALLBACK_NORMAL };

    p.position += normal * overlap;
    q.position -= normal * overlap;
    p.velocity = Vec2::ZERO;
    q.velocity = Vec2::ZERO;
    true
}

/// Clamp to `[0, width] x [0, height]`, reflecting the velocity component
/// on each axis that was out of range.
#[inline]
pub fn reflect_bounds(particle: &mut Particle, width: f32, height: f32) {
    let Particle {
        position, velocity, ..
    } = particle;

    if position.x < 0.0 {
        position.x = 0.0;
        velocity.x = -velocity.x;
    } else if position.x > width {
        position.x = width;
        velocity.x = -velocity.x;
    }

    if position.y < 0.0 {
        position.y = 0.0;
        velocity.y = -velocity.y;
    } else if position.y > height {
        position.y = height;
        velocity.y = -velocity.y;
    }
}
