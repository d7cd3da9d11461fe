use std::path::PathBuf;
use thiserror::Error;

use crate::metrics::ProcessId;

/// A process can no longer be sampled. Routine while workers come and go.
///
/// Processes the current user may not inspect are hidden by the OS layer and
/// surface as `NotFound`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessGone {
    #[error("process {0} no longer exists")]
    NotFound(ProcessId),

    #[error("process {0} has exited and is waiting to be reaped")]
    Zombie(ProcessId),
}

impl ProcessGone {
    pub fn pid(&self) -> ProcessId {
        match self {
            ProcessGone::NotFound(pid) | ProcessGone::Zombie(pid) => *pid,
        }
    }
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("monitor is already running")]
    AlreadyStarted,

    #[error("monitor session has finished; create a new monitor to measure again")]
    Finished,

    #[error("failed to spawn sampling thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("sampling thread panicked")]
    SamplerPanicked,
}

#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file {path} is invalid: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Worker {index} failed: {reason}")]
    Worker { index: usize, reason: String },

    #[error("Plot viewer failed: {0}")]
    Viewer(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;
