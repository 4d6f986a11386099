use retouch::{Settings, WatcherStrategy};
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_env_overrides_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(
        &config_path,
        "[watch]\ndebounce_ms = 300\npoll_interval_ms = 150\n",
    )
    .unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("RETOUCH_WATCH__DEBOUNCE_MS", "250");
        env::set_var("RETOUCH_WATCH__STRATEGY", "polling");
    }

    let settings = Settings::load_from(&config_path).unwrap();

    unsafe {
        env::remove_var("RETOUCH_WATCH__DEBOUNCE_MS");
        env::remove_var("RETOUCH_WATCH__STRATEGY");
    }

    // Environment wins over the file
    assert_eq!(settings.watch.debounce_ms, 250);
    assert_eq!(settings.watch.strategy, WatcherStrategy::Polling);
    // File value used when no env var
    assert_eq!(settings.watch.poll_interval_ms, 150);

    let config = settings.watch_config().unwrap();
    assert_eq!(config.debounce(), Duration::from_millis(250));
    assert_eq!(config.poll_interval(), Duration::from_millis(150));
}
