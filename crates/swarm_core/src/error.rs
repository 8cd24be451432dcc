use crate::config::ConfigError;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors surfaced by the simulation driver.
///
/// Physical edge cases (out-of-range positions, coincident particles) are
/// handled in the kernel and never show up here.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{0} lock poisoned by a panicked thread")]
    Poisoned(&'static str),

    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),

    #[error("presentation surface error: {0}")]
    Surface(String),
}
