//! Swarm Services Layer
//!
//! Settings files and spawn sources that feed the simulation.

pub mod settings;
pub mod spawner;

pub use settings::{DisplaySettings, Settings, SettingsError, SpawnSettings};
pub use spawner::{BlockSpawner, SpawnRequest, StreamSpawner};
