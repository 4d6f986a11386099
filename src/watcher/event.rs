//! Events flowing through the reload pipeline.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use super::signal::ReloadToken;

/// Which part of the system produced a [`WatchEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchSource {
    /// OS-native filesystem notification.
    Native,
    /// Sentinel mtime poller.
    Poll,
    /// Programmatic `trigger_now` call.
    Manual,
}

impl fmt::Display for WatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WatchSource::Native => "native",
            WatchSource::Poll => "poll",
            WatchSource::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// A relevant change observed by a watcher. Consumed immediately by the gate.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub observed_at: SystemTime,
    pub source: WatchSource,
}

impl WatchEvent {
    pub fn new(path: PathBuf, source: WatchSource) -> Self {
        Self {
            path,
            observed_at: SystemTime::now(),
            source,
        }
    }

    /// Event for a manual trigger, attributed to the sentinel path.
    pub fn manual(sentinel: PathBuf) -> Self {
        Self::new(sentinel, WatchSource::Manual)
    }
}

/// Broadcast to subscribers for every accepted trigger.
#[derive(Debug, Clone)]
pub struct ReloadEvent {
    /// Token after the bump.
    pub token: ReloadToken,
    /// Path that caused the trigger.
    pub path: PathBuf,
    pub source: WatchSource,
    pub triggered_at: SystemTime,
}
