//! End-to-end tests for the reload coordinator through its public API.

use std::fs::{self, File};
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, SystemTime};

use crossbeam_channel::{Receiver, unbounded};
use retouch::watcher::touch_sentinel;
use retouch::{ReloadCoordinator, ReloadToken, WatchConfig, WatcherStrategy};
use tempfile::TempDir;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

fn collect(coordinator: &ReloadCoordinator) -> Receiver<ReloadToken> {
    let (tx, rx) = unbounded();
    coordinator.subscribe(move |token| {
        let _ = tx.send(token);
    });
    rx
}

fn polling_config(sentinel: &Path) -> WatchConfig {
    WatchConfig::builder(sentinel)
        .debounce(ms(100))
        .poll_interval(ms(20))
        .strategy(WatcherStrategy::Polling)
        .build()
        .unwrap()
}

#[test]
fn test_stale_sentinel_does_not_fire_on_start() {
    let temp_dir = TempDir::new().unwrap();
    let sentinel = temp_dir.path().join(".retouch-reload");
    fs::write(&sentinel, "").unwrap();

    let coordinator = ReloadCoordinator::new();
    let rx = collect(&coordinator);

    // Touched while stopped
    set_mtime(&sentinel, SystemTime::now() + Duration::from_secs(30));

    let report = coordinator.start(polling_config(&sentinel)).unwrap();
    assert!(!report.is_degraded());
    assert!(rx.recv_timeout(ms(300)).is_err(), "stale timestamp fired");

    // A timestamp newer than the one observed at start does count
    let before = coordinator.token();
    set_mtime(&sentinel, mtime(&sentinel) + Duration::from_secs(5));

    let token = rx.recv_timeout(Duration::from_secs(3)).expect("sentinel touch");
    assert_ne!(token, before);
    assert_eq!(coordinator.token(), token);
}

#[test]
fn test_external_touch_triggers_reload() {
    let temp_dir = TempDir::new().unwrap();
    let sentinel = temp_dir.path().join("nested/.retouch-reload");

    let coordinator = ReloadCoordinator::new();
    let rx = collect(&coordinator);

    let config = WatchConfig::builder(&sentinel)
        .poll_interval(ms(20))
        .poll_threshold(Duration::ZERO)
        .strategy(WatcherStrategy::Polling)
        .build()
        .unwrap();
    coordinator.start(config).unwrap();

    // Created by start
    assert!(sentinel.is_file());

    sleep(ms(50));
    touch_sentinel(&sentinel).unwrap();

    assert!(rx.recv_timeout(Duration::from_secs(3)).is_ok());
    assert!(coordinator.signal().last_triggered_at().is_some());
}

#[test]
fn test_no_events_after_stop() {
    let temp_dir = TempDir::new().unwrap();
    let sentinel = temp_dir.path().join(".retouch-reload");

    let coordinator = ReloadCoordinator::new();
    let rx = collect(&coordinator);

    coordinator.start(polling_config(&sentinel)).unwrap();
    coordinator.stop();
    coordinator.stop();

    set_mtime(&sentinel, SystemTime::now() + Duration::from_secs(30));
    assert!(rx.recv_timeout(ms(300)).is_err());

    // Manual triggering does not depend on the watchers
    assert!(coordinator.trigger_now().is_some());
    assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
}

#[test]
fn test_manual_and_file_triggers_share_the_gate() {
    let temp_dir = TempDir::new().unwrap();
    let sentinel = temp_dir.path().join(".retouch-reload");

    let coordinator = ReloadCoordinator::new();
    let rx = collect(&coordinator);

    let config = WatchConfig::builder(&sentinel)
        .debounce(Duration::from_secs(5))
        .poll_interval(ms(20))
        .poll_threshold(Duration::ZERO)
        .strategy(WatcherStrategy::Polling)
        .build()
        .unwrap();
    coordinator.start(config).unwrap();

    let token = coordinator.trigger_now().unwrap();
    set_mtime(&sentinel, SystemTime::now() + Duration::from_secs(30));

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), token);
    // The sentinel change landed inside the window and was dropped
    assert!(rx.recv_timeout(ms(300)).is_err());
    assert_eq!(coordinator.token(), token);
}

#[test]
fn test_bursts_and_spaced_triggers() {
    let temp_dir = TempDir::new().unwrap();
    let sentinel = temp_dir.path().join(".retouch-reload");

    let coordinator = ReloadCoordinator::new();
    let rx = collect(&coordinator);
    coordinator.start(polling_config(&sentinel)).unwrap();

    let mut accepted = Vec::new();
    for _ in 0..3 {
        // Burst of three, then wait out the 100ms window
        accepted.extend((0..3).filter_map(|_| coordinator.trigger_now()));
        sleep(ms(150));
    }

    assert_eq!(accepted.len(), 3);

    let delivered: Vec<ReloadToken> = (0..3)
        .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap())
        .collect();
    assert_eq!(delivered, accepted);
    assert!(rx.recv_timeout(ms(100)).is_err());

    let mut unique = delivered.clone();
    unique.dedup();
    assert_eq!(unique.len(), 3);
}

#[test]
fn test_source_change_reaches_subscribers() {
    if WatcherStrategy::probe() != WatcherStrategy::Native {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("project");
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("build")).unwrap();

    let coordinator = ReloadCoordinator::new();
    let rx = collect(&coordinator);

    let config = WatchConfig::builder(temp_dir.path().join(".retouch-reload"))
        .path(&root)
        .debounce(ms(100))
        .extension("txt")
        .excluded(vec!["build".to_string()])
        .strategy(WatcherStrategy::Native)
        .build()
        .unwrap();

    let report = coordinator.start(config).unwrap();
    assert_eq!(report.strategy, WatcherStrategy::Native);
    assert!(report.watchers.contains(&"native"));

    fs::write(root.join("build/output.tmp"), "artifact").unwrap();
    assert!(rx.recv_timeout(ms(500)).is_err(), "excluded path fired");

    fs::write(root.join("src/App.txt"), "hello").unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());

    coordinator.stop();
}
