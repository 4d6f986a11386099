//! Touch a file, get a fresh identity token.
//!
//! `retouch` watches a sentinel file (and optionally source directories) and
//! hands subscribers a new [`ReloadToken`] whenever a change survives the
//! debounce gate. A presentation layer keys its content on the token and
//! rebuilds when it changes.
//!
//! ```no_run
//! use retouch::{ReloadCoordinator, WatchConfig};
//!
//! # fn main() -> Result<(), retouch::WatchError> {
//! let coordinator = ReloadCoordinator::new();
//! coordinator.subscribe(|token| println!("rebuild with {token}"));
//!
//! let config = WatchConfig::builder("/home/me/.retouch-reload")
//!     .path("src")
//!     .extension("rs")
//!     .build()?;
//! coordinator.start(config)?;
//!
//! // Elsewhere, e.g. a keyboard shortcut:
//! coordinator.trigger_now();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging;
pub mod watcher;

pub use config::{LoggingConfig, Settings, WatchSettings};
pub use watcher::{
    Debouncer, ReloadCoordinator, ReloadEvent, ReloadToken, StartReport, SubscriptionId,
    TriggerSignal, WatchConfig, WatchError, WatchEvent, WatchSource, WatcherStrategy,
};
