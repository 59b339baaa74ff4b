//! # Cycle Engine Error Types
//!
//! All errors that can occur while configuring or running the cycle engine.
//!
//! Draining an empty store is NOT here: it returns an empty batch.

use thiserror::Error;

/// Which kind of worker a failure came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskRole {
    /// The single production worker.
    Producer,
    /// A collection worker, by collector name.
    Collector(String),
}

impl std::fmt::Display for TaskRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Producer => f.write_str("producer"),
            Self::Collector(name) => write!(f, "collector '{name}'"),
        }
    }
}

/// Errors that can occur in the cycle engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// Configuration rejected before anything was started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text was not valid TOML for this schema.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Configuration file could not be read.
    #[error("cannot read config {path}: {reason}")]
    ConfigRead {
        /// Path that was attempted.
        path: String,
        /// OS-level reason.
        reason: String,
    },

    /// A worker thread could not be started.
    #[error("failed to spawn worker: {0}")]
    WorkerSpawn(String),

    /// A worker died mid-cycle. The cycle's barriers were still released.
    #[error("{task} aborted during cycle {cycle}")]
    TaskAborted {
        /// 1-based cycle number.
        cycle: usize,
        /// The worker that died.
        task: TaskRole,
    },

    /// The worker crew hung up before the run finished.
    #[error("worker crew disconnected")]
    CrewDisconnected,
}

/// Result type for cycle engine operations.
pub type CycleResult<T> = Result<T, CycleError>;
