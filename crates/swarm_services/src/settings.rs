//! Settings management

use serde::{Deserialize, Serialize};
use std::path::Path;
use swarm_core::{ConfigError, SimConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read or write settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid simulation settings: {0}")]
    Invalid(#[from] ConfigError),
}

/// Everything the runtime reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimConfig,
    pub spawn: SpawnSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Particles laid out in the initial block.
    pub block_count: u32,
    pub block_color: [f32; 4],
    pub block_velocity: [f32; 2],
    /// Lattice spacing of the block, in radii.
    pub spacing_factor: f32,
    /// Emit one streamed particle every N frames; `None` disables the stream.
    pub stream_every_frames: Option<u32>,
    pub stream_velocity: [f32; 2],
    pub stream_color: [f32; 4],
    pub seed: u64,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            block_count: 512,
            block_color: [0.2, 0.6, 1.0, 1.0],
            block_velocity: [0.0, -1.0],
            spacing_factor: 1.2,
            stream_every_frames: None,
            stream_velocity: [0.0, 2.0],
            stream_color: [1.0, 0.5, 0.2, 1.0],
            seed: 0x5EED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub title: String,
    pub target_fps: u32,
    /// Stop after this many frames and shut the pool down cleanly. `None`
    /// runs until the process is killed, which skips joining the workers.
    pub max_frames: Option<u64>,
}

/// 30 seconds at the default frame rate.
pub const DEFAULT_MAX_FRAMES: u64 = 1800;

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            title: "Thread collisions".to_string(),
            target_fps: swarm_core::time::TARGET_FPS,
            max_frames: Some(DEFAULT_MAX_FRAMES),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.simulation.validate()?;
        Ok(settings)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
