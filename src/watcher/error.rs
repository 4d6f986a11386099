//! Error types for the reload watcher system.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher and coordinator operations.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    WatchSetupFailed { path: PathBuf, reason: String },

    #[error("Cannot create sentinel file {path}: {reason}")]
    SentinelUnwritable { path: PathBuf, reason: String },

    #[error("Coordinator is already started")]
    AlreadyStarted,

    #[error("Invalid watch configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
