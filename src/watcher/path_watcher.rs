//! Watcher capability and the handle returned by `start`.

use std::fmt;
use std::sync::Arc;

use super::error::WatchError;
use super::event::WatchEvent;

/// Callback receiving every relevant event a watcher observes.
///
/// Called from the watcher's own thread.
pub type EventSink = Arc<dyn Fn(WatchEvent) + Send + Sync>;

/// Trait for strategies that observe filesystem locations.
///
/// Implementations own whatever OS resources they need; everything is released
/// when the returned handle is stopped or dropped.
pub trait PathWatcher: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Begin observing and deliver events to `on_event`.
    fn start(&self, on_event: EventSink) -> Result<WatchHandle, WatchError>;
}

/// Running watcher. Stopping is idempotent; dropping stops it.
pub struct WatchHandle {
    name: &'static str,
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchHandle {
    /// Wrap the teardown for a running watcher.
    pub fn new(name: &'static str, stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name,
            stop: Some(Box::new(stop)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_active(&self) -> bool {
        self.stop.is_some()
    }

    /// Release the watcher's resources. Later calls do nothing.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
            crate::debug_event!(self.name, "stopped");
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}
