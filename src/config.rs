//! Configuration module for retouch.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.retouch/settings.toml`, searched upwards)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `RETOUCH_` and use double
//! underscores to separate nested levels:
//! - `RETOUCH_WATCH__DEBOUNCE_MS=250` sets `watch.debounce_ms`
//! - `RETOUCH_WATCH__STRATEGY=polling` sets `watch.strategy`
//! - `RETOUCH_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::watcher::{
    DEFAULT_DEBOUNCE, DEFAULT_EXCLUDED, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_THRESHOLD,
    WatchConfig, WatchError, WatcherStrategy,
};

/// Directory holding the settings file.
pub const CONFIG_DIR: &str = ".retouch";

/// Sentinel file name used when none is configured.
pub const DEFAULT_SENTINEL_NAME: &str = ".retouch-reload";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// What to watch and how
    #[serde(default)]
    pub watch: WatchSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for every module
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `retouch::watcher = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchSettings {
    /// File whose modification time triggers a reload
    #[serde(default = "default_sentinel_path")]
    pub sentinel_path: PathBuf,

    /// Source roots watched recursively
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Minimum spacing between two reloads
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Sentinel poll tick
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How far the sentinel mtime must advance past the last fired value
    #[serde(default = "default_poll_threshold_ms")]
    pub poll_threshold_ms: u64,

    /// Extensions of interest; empty means every file
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Path fragments that are never reported
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,

    /// Strategy for source roots
    #[serde(default)]
    pub strategy: WatcherStrategy,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_sentinel_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_SENTINEL_NAME)
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}
fn default_poll_threshold_ms() -> u64 {
    DEFAULT_POLL_THRESHOLD.as_millis() as u64
}
fn default_excluded() -> Vec<String> {
    DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            logging: LoggingConfig::default(),
            watch: WatchSettings::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            sentinel_path: default_sentinel_path(),
            paths: Vec::new(),
            debounce_ms: default_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_threshold_ms: default_poll_threshold_ms(),
            extensions: Vec::new(),
            excluded: default_excluded(),
            strategy: WatcherStrategy::default(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore (__) separates nested levels
            .merge(Env::prefixed("RETOUCH_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by looking for a `.retouch` directory
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Build the validated watch configuration for a coordinator run
    pub fn watch_config(&self) -> Result<WatchConfig, WatchError> {
        let watch = &self.watch;
        WatchConfig::builder(watch.sentinel_path.clone())
            .paths(watch.paths.iter().cloned())
            .debounce(Duration::from_millis(watch.debounce_ms))
            .poll_interval(Duration::from_millis(watch.poll_interval_ms))
            .poll_threshold(Duration::from_millis(watch.poll_threshold_ms))
            .extensions(watch.extensions.iter().cloned())
            .excluded(watch.excluded.iter().cloned())
            .strategy(watch.strategy)
            .build()
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        let mut settings = Settings::default();
        if let Ok(current_dir) = std::env::current_dir() {
            settings.watch.paths = vec![current_dir];
        }

        settings.save(&config_path)?;
        Ok(config_path)
    }
}
