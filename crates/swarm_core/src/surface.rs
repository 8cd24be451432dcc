//! Contract with whatever displays the swarm.
//!
//! The core never draws. After each tick the driver can pack the store into
//! [`ParticleVertex`] records (interleaved position + color, ready for a
//! vertex buffer) and hand them to a [`PresentationSurface`] as a [`Frame`].

use crate::error::Result;
use crate::particle::Particle;
use bytemuck::{Pod, Zeroable};
use std::time::Duration;

/// Per-particle record uploaded for drawing.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl From<&Particle> for ParticleVertex {
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            color: particle.color.to_array(),
        }
    }
}

/// Read-only view of one finished tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub tick: u64,
    pub vertices: &'a [ParticleVertex],
    /// Target presentation interval (zero when unpaced).
    pub interval: Duration,
    /// Point sprite diameter in domain units.
    pub point_size: f32,
}

impl Frame<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }
}

pub trait PresentationSurface {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()>;
}
