//! Watch command - companion process for editors without a touch hook.
//!
//! Watches source roots natively and touches the sentinel once per debounced
//! burst of saves. The app side picks the touch up through its own
//! coordinator, so the two processes only share a path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use retouch::watcher::{
    Debouncer, EventSink, NativeWatcher, PathWatcher, WatchConfig, WatchEvent, WatcherStrategy,
    ensure_sentinel, touch_sentinel,
};

pub async fn run_watch(config: WatchConfig) -> anyhow::Result<()> {
    if config.roots().is_empty() {
        anyhow::bail!("No paths to watch. Pass directories or set watch.paths in settings.toml");
    }

    let strategy = config.strategy().resolve();
    if strategy != WatcherStrategy::Native {
        anyhow::bail!(
            "Native file events are unavailable ({strategy}); call `retouch touch` from your editor instead"
        );
    }

    let sentinel: PathBuf = config.sentinel_path().to_path_buf();
    ensure_sentinel(&sentinel)?;
    let gate = Arc::new(Mutex::new(Debouncer::new(config.debounce())));

    let sink: EventSink = {
        let sentinel = sentinel.clone();
        let own_touch = reported_path(&sentinel);
        Arc::new(move |event: WatchEvent| {
            // Our own touch when the sentinel lives under a watched root
            if event.path == own_touch {
                return;
            }
            if !gate.lock().accept(&event) {
                return;
            }
            match touch_sentinel(&sentinel) {
                Ok(_) => {
                    retouch::log_event!("watch", "touched", "{}", event.path.display());
                }
                Err(e) => tracing::error!("[watch] {e}"),
            }
        })
    };

    let watcher = NativeWatcher::new(config.roots().to_vec(), config.filter());
    let mut handle = watcher.start(sink)?;

    eprintln!(
        "Watching {} path(s); touching {} on change. Ctrl-C to stop.",
        config.roots().len(),
        sentinel.display()
    );

    tokio::signal::ctrl_c().await?;
    handle.stop();
    Ok(())
}

/// The path native events carry for `path`: watched roots are canonicalized,
/// so relative or symlinked spellings must be resolved to compare.
fn reported_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
