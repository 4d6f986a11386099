//! Sentinel poller.
//!
//! Stats a single file on a fixed tick and emits when its modification time
//! moves forward. Never lists directories, so each tick is O(1). Used for the
//! sentinel on every platform and as the fallback strategy.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use crossbeam_channel::{bounded, select, tick};

use super::error::WatchError;
use super::event::{WatchEvent, WatchSource};
use super::path_watcher::{EventSink, PathWatcher, WatchHandle};

/// Default tick interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Default minimum advance of the mtime past the last fired value.
pub const DEFAULT_POLL_THRESHOLD: Duration = Duration::from_secs(1);

/// Change detection for one file's modification time.
///
/// The baseline is whatever the file showed when polling began, so a file
/// touched before start never fires.
#[derive(Debug, Clone)]
pub struct SentinelProbe {
    /// Value seen at the previous tick.
    previous: Option<SystemTime>,
    /// Value that last produced an event (or the baseline).
    last_fired: Option<SystemTime>,
    threshold: Duration,
}

impl SentinelProbe {
    pub fn new(baseline: Option<SystemTime>, threshold: Duration) -> Self {
        Self {
            previous: baseline,
            last_fired: baseline,
            threshold,
        }
    }

    /// Feed the current modification time; `None` means the stat failed.
    ///
    /// Returns `true` when the change should be emitted.
    pub fn observe(&mut self, current: Option<SystemTime>) -> bool {
        // Transient failures are "no change" and keep the previous value
        let Some(current) = current else {
            return false;
        };

        let advanced = self.previous.is_none_or(|previous| current > previous);
        let past_threshold = match self.last_fired {
            Some(last) => current
                .duration_since(last)
                .map(|elapsed| elapsed > self.threshold)
                .unwrap_or(false),
            None => true,
        };

        self.previous = Some(current);

        if advanced && past_threshold {
            self.last_fired = Some(current);
            true
        } else {
            false
        }
    }
}

/// Polls one file's modification time on a background thread.
#[derive(Debug, Clone)]
pub struct PollingWatcher {
    path: PathBuf,
    interval: Duration,
    threshold: Duration,
}

impl PollingWatcher {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            interval: DEFAULT_POLL_INTERVAL,
            threshold: DEFAULT_POLL_THRESHOLD,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PathWatcher for PollingWatcher {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn start(&self, on_event: EventSink) -> Result<WatchHandle, WatchError> {
        if self.interval.is_zero() {
            return Err(WatchError::InvalidConfig {
                reason: "poll interval must be greater than zero".to_string(),
            });
        }

        let path = self.path.clone();
        let mut probe = SentinelProbe::new(modified_time(&path), self.threshold);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let ticker = tick(self.interval);

        crate::debug_event!(
            "poll",
            "watching",
            "{} every {:?}",
            path.display(),
            self.interval
        );

        let worker = thread::Builder::new()
            .name("retouch-poll".to_string())
            .spawn(move || {
                loop {
                    select! {
                        // Sender dropped by the handle
                        recv(shutdown_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            if probe.observe(modified_time(&path)) {
                                crate::log_event!("poll", "changed", "{}", path.display());
                                on_event(WatchEvent::new(path.clone(), WatchSource::Poll));
                            }
                        }
                    }
                }
            })
            .map_err(|e| WatchError::InitFailed {
                reason: format!("failed to spawn poll thread: {e}"),
            })?;

        Ok(WatchHandle::new("poll", move || {
            drop(shutdown_tx);
            if worker.join().is_err() {
                tracing::warn!("[poll] worker thread panicked");
            }
        }))
    }
}

/// Modification time, or `None` if the file is missing or unreadable.
pub(crate) fn modified_time(path: &Path) -> Option<SystemTime> {
    match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(time) => Some(time),
        Err(e) => {
            tracing::trace!("[poll] stat {} failed: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_probe_ignores_stale_baseline() {
        let base = SystemTime::now();
        let mut probe = SentinelProbe::new(Some(base), secs(1));

        assert!(!probe.observe(Some(base)));
        assert!(!probe.observe(Some(base)));
    }

    #[test]
    fn test_probe_fires_on_advance_past_threshold() {
        let base = SystemTime::now();
        let mut probe = SentinelProbe::new(Some(base), secs(1));

        assert!(probe.observe(Some(base + secs(2))));
        // Same value on the next tick is not a new change
        assert!(!probe.observe(Some(base + secs(2))));
        assert!(probe.observe(Some(base + secs(4))));
    }

    #[test]
    fn test_probe_respects_threshold() {
        let base = SystemTime::now();
        let mut probe = SentinelProbe::new(Some(base), secs(1));

        assert!(!probe.observe(Some(base + Duration::from_millis(500))));
        assert!(probe.observe(Some(base + Duration::from_millis(1500))));
    }

    #[test]
    fn test_probe_stat_failure_is_no_change() {
        let base = SystemTime::now();
        let mut probe = SentinelProbe::new(Some(base), Duration::ZERO);

        assert!(!probe.observe(None));
        assert!(!probe.observe(Some(base)));
        assert!(probe.observe(Some(base + secs(1))));
    }

    #[test]
    fn test_probe_missing_baseline_fires_on_first_appearance() {
        let mut probe = SentinelProbe::new(None, secs(1));
        assert!(!probe.observe(None));
        assert!(probe.observe(Some(SystemTime::now())));
    }

    #[test]
    fn test_probe_ignores_mtime_moving_backwards() {
        let base = SystemTime::now();
        let mut probe = SentinelProbe::new(Some(base), Duration::ZERO);

        assert!(!probe.observe(Some(base - secs(10))));
    }

    #[test]
    fn test_polling_watcher_emits_and_stops() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = temp_dir.path().join(".retouch");
        fs::write(&sentinel, "").unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        let sink: EventSink = Arc::new(move |event: WatchEvent| {
            let _ = tx.send(event);
        });

        let watcher = PollingWatcher::new(sentinel.clone())
            .interval(Duration::from_millis(20))
            .threshold(Duration::ZERO);
        let mut handle = watcher.start(sink).unwrap();

        // Baseline is not reported
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());

        set_mtime(&sentinel, SystemTime::now() + secs(5));
        let event = rx.recv_timeout(secs(3)).expect("poll event");
        assert_eq!(event.path, sentinel);
        assert_eq!(event.source, WatchSource::Poll);

        handle.stop();
        handle.stop();

        set_mtime(&sentinel, SystemTime::now() + secs(10));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_polling_watcher_survives_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = temp_dir.path().join("not-yet");

        let (tx, rx) = crossbeam_channel::unbounded();
        let sink: EventSink = Arc::new(move |event: WatchEvent| {
            let _ = tx.send(event);
        });

        let _handle = PollingWatcher::new(sentinel.clone())
            .interval(Duration::from_millis(20))
            .start(sink)
            .unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        fs::write(&sentinel, "").unwrap();
        assert!(rx.recv_timeout(secs(3)).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let watcher = PollingWatcher::new(PathBuf::from("x")).interval(Duration::ZERO);
        let sink: EventSink = Arc::new(|_: WatchEvent| {});
        assert!(matches!(
            watcher.start(sink),
            Err(WatchError::InvalidConfig { .. })
        ));
    }
}
