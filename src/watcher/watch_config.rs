//! Immutable configuration for one coordinator run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::WatchError;
use super::filter::EventFilter;
use super::polling::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_THRESHOLD};
use super::strategy::WatcherStrategy;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Fragments excluded unless configured otherwise.
pub const DEFAULT_EXCLUDED: &[&str] = &[".git", ".svn", ".hg", "build", "target", "node_modules"];

/// What to watch and how. Fixed for the lifetime of a run; restart to change.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    sentinel_path: PathBuf,
    roots: Vec<PathBuf>,
    debounce: Duration,
    poll_interval: Duration,
    poll_threshold: Duration,
    extensions: Vec<String>,
    excluded: Vec<String>,
    strategy: WatcherStrategy,
}

impl WatchConfig {
    /// Create a builder. The sentinel is always part of the watched paths.
    pub fn builder(sentinel_path: impl Into<PathBuf>) -> WatchConfigBuilder {
        WatchConfigBuilder::new(sentinel_path.into())
    }

    pub fn sentinel_path(&self) -> &Path {
        &self.sentinel_path
    }

    /// Source roots, excluding the sentinel.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every watched path: the sentinel followed by the roots.
    pub fn paths(&self) -> Vec<PathBuf> {
        std::iter::once(self.sentinel_path.clone())
            .chain(self.roots.iter().cloned())
            .collect()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn poll_threshold(&self) -> Duration {
        self.poll_threshold
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn strategy(&self) -> WatcherStrategy {
        self.strategy
    }

    /// Filter applied to native events.
    pub fn filter(&self) -> EventFilter {
        EventFilter::new(&self.extensions, self.excluded.iter().cloned())
    }
}

/// Builder for [`WatchConfig`].
#[derive(Debug, Clone)]
pub struct WatchConfigBuilder {
    sentinel_path: PathBuf,
    roots: Vec<PathBuf>,
    debounce: Duration,
    poll_interval: Duration,
    poll_threshold: Duration,
    extensions: Vec<String>,
    excluded: Vec<String>,
    strategy: WatcherStrategy,
}

impl WatchConfigBuilder {
    fn new(sentinel_path: PathBuf) -> Self {
        Self {
            sentinel_path,
            roots: Vec::new(),
            debounce: DEFAULT_DEBOUNCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_threshold: DEFAULT_POLL_THRESHOLD,
            extensions: Vec::new(),
            excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            strategy: WatcherStrategy::Auto,
        }
    }

    /// Add a source root to watch recursively.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path != self.sentinel_path && !self.roots.contains(&path) {
            self.roots.push(path);
        }
        self
    }

    pub fn paths(self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        paths.into_iter().fold(self, |builder, path| builder.path(path))
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn poll_threshold(mut self, threshold: Duration) -> Self {
        self.poll_threshold = threshold;
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    pub fn extensions(mut self, exts: impl IntoIterator<Item = String>) -> Self {
        self.extensions.extend(exts);
        self
    }

    /// Replace the excluded fragments.
    pub fn excluded(mut self, fragments: impl IntoIterator<Item = String>) -> Self {
        self.excluded = fragments.into_iter().collect();
        self
    }

    pub fn strategy(mut self, strategy: WatcherStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<WatchConfig, WatchError> {
        if self.debounce.is_zero() {
            return Err(WatchError::InvalidConfig {
                reason: "debounce interval must be greater than zero".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(WatchError::InvalidConfig {
                reason: "poll interval must be greater than zero".to_string(),
            });
        }

        Ok(WatchConfig {
            sentinel_path: self.sentinel_path,
            roots: self.roots,
            debounce: self.debounce,
            poll_interval: self.poll_interval,
            poll_threshold: self.poll_threshold,
            extensions: self.extensions,
            excluded: self.excluded,
            strategy: self.strategy,
        })
    }
}
