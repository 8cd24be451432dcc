//! Swarm Core
//!
//! Contains the particle update engine:
//! - Particle store (arena addressed by stable handles)
//! - Uniform spatial grid with per-cell locks
//! - Spawn input channel
//! - Worker pool running the bin / resolve barrier protocol
//! - Frame driver and presentation contract

pub mod collision;
pub mod config;
pub mod error;
pub mod grid;
pub mod input;
pub mod math;
pub mod particle;
pub mod simulation;
pub mod surface;
pub mod time;
mod worker;

pub use glam;

pub use config::{ConfigError, SimConfig};
pub use error::{Result, SimError};
pub use grid::{CellCoord, CellPair, SpatialGrid};
pub use input::InputChannel;
pub use particle::{Particle, ParticleId, ParticleStore};
pub use simulation::{Simulation, TickMetrics, TickReport};
pub use surface::{Frame, ParticleVertex, PresentationSurface};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
