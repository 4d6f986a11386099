//! Runtime selection between native events and polling.

use std::fmt;

use notify::{RecommendedWatcher, Watcher, WatcherKind};
use serde::{Deserialize, Serialize};

/// Strategy for watching source roots.
///
/// The sentinel is always polled regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatcherStrategy {
    /// Probe the host and pick the best available.
    #[default]
    Auto,
    /// OS filesystem notifications.
    Native,
    /// Sentinel polling only.
    Polling,
}

impl WatcherStrategy {
    /// Check what the host supports.
    ///
    /// Native is chosen when `notify` has a real event backend on this
    /// platform and one can actually be constructed (inotify instance limits
    /// can make that fail).
    pub fn probe() -> Self {
        match RecommendedWatcher::kind() {
            WatcherKind::PollWatcher | WatcherKind::NullWatcher => return Self::Polling,
            _ => {}
        }

        match notify::recommended_watcher(|_: notify::Result<notify::Event>| {}) {
            Ok(_) => Self::Native,
            Err(e) => {
                tracing::warn!("[strategy] native watcher unavailable: {e}");
                Self::Polling
            }
        }
    }

    /// Resolve `Auto` to a concrete strategy.
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::probe(),
            other => other,
        }
    }
}

impl fmt::Display for WatcherStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Native => "native",
            Self::Polling => "polling",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_never_returns_auto() {
        assert_ne!(WatcherStrategy::Auto.resolve(), WatcherStrategy::Auto);
    }

    #[test]
    fn test_explicit_strategies_are_kept() {
        assert_eq!(WatcherStrategy::Native.resolve(), WatcherStrategy::Native);
        assert_eq!(WatcherStrategy::Polling.resolve(), WatcherStrategy::Polling);
    }

    #[test]
    fn test_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: WatcherStrategy,
        }
        let parsed: Wrapper = toml::from_str("strategy = \"polling\"").unwrap();
        assert_eq!(parsed.strategy, WatcherStrategy::Polling);
        assert_eq!(WatcherStrategy::Native.to_string(), "native");
    }
}
