//! OS-native filesystem notifications via `notify`.
//!
//! Filters are applied where events are emitted, so build artifacts and VCS
//! churn never reach the debouncer. The backend may coalesce several writes
//! into one notification; the debouncer makes that irrelevant.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::{Event, EventKind, RecursiveMode, Watcher};

use super::error::WatchError;
use super::event::{WatchEvent, WatchSource};
use super::filter::EventFilter;
use super::path_watcher::{EventSink, PathWatcher, WatchHandle};

/// Recursive watcher over a set of source roots.
#[derive(Debug, Clone)]
pub struct NativeWatcher {
    roots: Vec<PathBuf>,
    filter: EventFilter,
}

impl NativeWatcher {
    pub fn new(roots: Vec<PathBuf>, filter: EventFilter) -> Self {
        // Backends may report canonical paths (e.g. /private/var on macOS)
        let roots: Vec<PathBuf> = roots
            .into_iter()
            .map(|root| std::fs::canonicalize(&root).unwrap_or(root))
            .collect();
        let filter = filter.with_roots(roots.iter().cloned());
        Self { roots, filter }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl PathWatcher for NativeWatcher {
    fn name(&self) -> &'static str {
        "native"
    }

    fn start(&self, on_event: EventSink) -> Result<WatchHandle, WatchError> {
        let active = Arc::new(AtomicBool::new(true));
        let filter = self.filter.clone();
        let gate = active.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if !gate.load(Ordering::Acquire) {
                return;
            }
            match res {
                Ok(event) => {
                    if !is_relevant(&event.kind) {
                        return;
                    }
                    for path in event.paths {
                        if filter.matches(&path) {
                            crate::debug_event!(
                                "native",
                                "changed",
                                "{:?} {}",
                                event.kind,
                                path.display()
                            );
                            on_event(WatchEvent::new(path, WatchSource::Native));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("[native] file watch error: {e}");
                }
            }
        })?;

        let mut watched = 0usize;
        for root in &self.roots {
            if !root.exists() {
                tracing::warn!("[native] skipping missing path {}", root.display());
                continue;
            }
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| WatchError::WatchSetupFailed {
                    path: root.clone(),
                    reason: e.to_string(),
                })?;
            crate::debug_event!("native", "watching", "{}", root.display());
            watched += 1;
        }

        crate::log_event!("native", "started", "{watched} of {} roots", self.roots.len());

        Ok(WatchHandle::new("native", move || {
            // Callbacks already past the gate may still complete
            active.store(false, Ordering::Release);
            drop(watcher);
        }))
    }
}

/// Content changes only; access events are noise.
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
