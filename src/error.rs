use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the engine's fallible edges (parsing, loading,
/// Monte Carlo control and the worker channel). The per-run simulation
/// path itself never fails.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid set score: {0:?}")]
    InvalidScore(String),

    #[error("Monte Carlo aggregation needs at least one iteration")]
    NoIterations,

    #[error("simulation cancelled")]
    Cancelled,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to start simulation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("simulation worker is no longer running")]
    WorkerDisconnected,
}

pub type Result<T> = std::result::Result<T, SimError>;
