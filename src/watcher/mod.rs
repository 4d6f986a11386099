//! File-change-triggered reload signals.
//!
//! A [`ReloadCoordinator`] watches a sentinel file (and optionally source
//! roots), gates bursts through a [`Debouncer`], and hands subscribers a fresh
//! [`ReloadToken`] for every accepted trigger.
//!
//! # Architecture
//!
//! ```text
//! ReloadCoordinator
//!   - WatchConfig (immutable per run)
//!   - Gate: Debouncer + TriggerSignal (one lock)
//!   - Subscribers (dispatch thread) + broadcast channel
//!         |
//!    +----------+-----------+
//!    |                      |
//! PollingWatcher       NativeWatcher
//! (sentinel mtime)     (notify, filtered)
//! ```

mod coordinator;
mod debouncer;
mod error;
mod event;
mod filter;
mod native;
mod path_watcher;
mod polling;
mod sentinel;
mod signal;
mod strategy;
mod watch_config;

pub use coordinator::{ReloadCallback, ReloadCoordinator, StartReport, SubscriptionId};
pub use debouncer::Debouncer;
pub use error::WatchError;
pub use event::{ReloadEvent, WatchEvent, WatchSource};
pub use filter::EventFilter;
pub use native::NativeWatcher;
pub use path_watcher::{EventSink, PathWatcher, WatchHandle};
pub use polling::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_THRESHOLD, PollingWatcher, SentinelProbe};
pub use sentinel::{ensure_sentinel, touch_sentinel};
pub use signal::{ReloadToken, TriggerSignal};
pub use strategy::WatcherStrategy;
pub use watch_config::{DEFAULT_DEBOUNCE, DEFAULT_EXCLUDED, WatchConfig, WatchConfigBuilder};
