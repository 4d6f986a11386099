//! Reload coordinator: the single object hosts interact with.
//!
//! # Pipeline
//!
//! ```text
//! PollingWatcher (sentinel) --+
//! NativeWatcher (roots) ------+--> Gate { Debouncer, TriggerSignal }
//! trigger_now() --------------+        |
//!                                      +--> dispatch thread --> callbacks
//!                                      +--> broadcast channel
//! ```
//!
//! Accepting an event, bumping the token and enqueueing the notification happen
//! under one lock, so notifications leave in acceptance order and concurrent
//! events cannot both pass the gate.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Instant, SystemTime};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use super::debouncer::Debouncer;
use super::error::WatchError;
use super::event::{ReloadEvent, WatchEvent};
use super::native::NativeWatcher;
use super::path_watcher::{EventSink, PathWatcher, WatchHandle};
use super::polling::PollingWatcher;
use super::sentinel::ensure_sentinel;
use super::signal::{ReloadToken, TriggerSignal};
use super::strategy::WatcherStrategy;
use super::watch_config::{DEFAULT_DEBOUNCE, WatchConfig};

/// Capacity of the async notification channel.
const BROADCAST_CAPACITY: usize = 64;

/// Callback invoked with the new token on every accepted trigger.
pub type ReloadCallback = Arc<dyn Fn(ReloadToken) + Send + Sync>;

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of a successful `start`.
///
/// Setup problems that leave the coordinator usable are collected here
/// instead of failing the start.
#[derive(Debug)]
pub struct StartReport {
    /// Strategy used for source roots after probing. Left as configured
    /// when there are no roots.
    pub strategy: WatcherStrategy,
    /// Names of the watchers that are running.
    pub watchers: Vec<&'static str>,
    /// Non-fatal problems (`WatchSetupFailed`, `SentinelUnwritable`).
    pub warnings: Vec<WatchError>,
}

impl StartReport {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

type Subscribers = Arc<RwLock<Vec<(SubscriptionId, ReloadCallback)>>>;

/// Debounce state and token share one lock.
struct Gate {
    debouncer: Debouncer,
    signal: TriggerSignal,
}

/// State reachable from watcher threads.
struct Shared {
    gate: Mutex<Gate>,
    /// Sentinel of the active run; empty while stopped.
    sentinel: Mutex<PathBuf>,
    subscribers: Subscribers,
    dispatch: Sender<ReloadEvent>,
    broadcast: broadcast::Sender<ReloadEvent>,
}

impl Shared {
    fn deliver(&self, event: WatchEvent) -> Option<ReloadToken> {
        self.deliver_at(event, Instant::now())
    }

    fn deliver_at(&self, event: WatchEvent, now: Instant) -> Option<ReloadToken> {
        let mut gate = self.gate.lock();

        if !gate.debouncer.accept_at(now) {
            crate::debug_event!(
                "coordinator",
                "suppressed",
                "{} ({})",
                event.path.display(),
                event.source
            );
            return None;
        }

        let triggered_at = SystemTime::now();
        let token = gate.signal.bump(triggered_at);
        let reload = ReloadEvent {
            token,
            path: event.path,
            source: event.source,
            triggered_at,
        };

        crate::log_event!(
            "coordinator",
            "reload",
            "{token} from {} ({})",
            reload.path.display(),
            reload.source
        );

        // Both sends are non-blocking; doing them under the gate keeps order
        if self.dispatch.send(reload.clone()).is_err() {
            tracing::warn!("[coordinator] dispatch thread is gone");
        }
        if self.broadcast.send(reload).is_err() {
            crate::debug_event!("coordinator", "no async listeners");
        }

        Some(token)
    }
}

/// Active watchers for one run.
struct Running {
    config: WatchConfig,
    handles: Vec<WatchHandle>,
}

/// Turns file changes and manual requests into reload tokens.
///
/// Constructed explicitly and shared by reference (or `Arc`) with whatever
/// needs it. Manual triggering works whether or not watching is started.
pub struct ReloadCoordinator {
    shared: Arc<Shared>,
    next_subscription: AtomicU64,
    running: Mutex<Option<Running>>,
}

impl ReloadCoordinator {
    /// Create a coordinator with the default debounce interval.
    pub fn new() -> Self {
        let (dispatch_tx, dispatch_rx) = unbounded();
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let subscribers: Subscribers = Arc::new(RwLock::new(Vec::new()));

        spawn_dispatcher(dispatch_rx, subscribers.clone());

        Self {
            shared: Arc::new(Shared {
                gate: Mutex::new(Gate {
                    debouncer: Debouncer::new(DEFAULT_DEBOUNCE),
                    signal: TriggerSignal::new(),
                }),
                sentinel: Mutex::new(PathBuf::new()),
                subscribers,
                dispatch: dispatch_tx,
                broadcast: broadcast_tx,
            }),
            next_subscription: AtomicU64::new(1),
            running: Mutex::new(None),
        }
    }

    /// Start watching with `config`.
    ///
    /// Fails with [`WatchError::AlreadyStarted`] while a run is active; call
    /// [`stop`](Self::stop) first to apply a new configuration.
    pub fn start(&self, config: WatchConfig) -> Result<StartReport, WatchError> {
        self.start_with(config, |config: &WatchConfig| -> Box<dyn PathWatcher> {
            Box::new(NativeWatcher::new(config.roots().to_vec(), config.filter()))
        })
    }

    /// `start` with the watcher used for source roots under the native
    /// strategy supplied by the caller.
    pub(crate) fn start_with(
        &self,
        config: WatchConfig,
        roots_watcher: impl FnOnce(&WatchConfig) -> Box<dyn PathWatcher>,
    ) -> Result<StartReport, WatchError> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Err(WatchError::AlreadyStarted);
        }

        let mut warnings = Vec::new();

        match ensure_sentinel(config.sentinel_path()) {
            Ok(true) => {
                crate::log_event!(
                    "coordinator",
                    "created sentinel",
                    "{}",
                    config.sentinel_path().display()
                );
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("[coordinator] {e}; manual triggers still work");
                warnings.push(e);
            }
        }

        self.shared.gate.lock().debouncer.set_interval(config.debounce());

        let sink = self.sink();
        let mut handles = Vec::new();

        let poller = PollingWatcher::new(config.sentinel_path().to_path_buf())
            .interval(config.poll_interval())
            .threshold(config.poll_threshold());
        handles.push(poller.start(sink.clone())?);
        *self.shared.sentinel.lock() = config.sentinel_path().to_path_buf();

        let mut strategy = config.strategy();
        if !config.roots().is_empty() {
            strategy = strategy.resolve();
            match strategy {
                WatcherStrategy::Native => match roots_watcher(&config).start(sink) {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        tracing::warn!("[coordinator] {e}; falling back to sentinel polling");
                        warnings.push(e);
                    }
                },
                _ => {
                    tracing::warn!(
                        "[coordinator] {strategy} strategy: {} source roots are not watched",
                        config.roots().len()
                    );
                }
            }
        }

        let watchers: Vec<&'static str> = handles.iter().map(WatchHandle::name).collect();
        crate::log_event!(
            "coordinator",
            "started",
            "{} via {}",
            config.sentinel_path().display(),
            watchers.join("+")
        );

        *running = Some(Running { config, handles });

        Ok(StartReport {
            strategy,
            watchers,
            warnings,
        })
    }

    /// Stop all watchers. Does nothing if not started.
    pub fn stop(&self) {
        // Release the lock before joining worker threads
        let running = self.running.lock().take();

        if let Some(mut running) = running {
            *self.shared.sentinel.lock() = PathBuf::new();
            for handle in &mut running.handles {
                handle.stop();
            }
            crate::log_event!("coordinator", "stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Configuration of the active run.
    pub fn config(&self) -> Option<WatchConfig> {
        self.running.lock().as_ref().map(|r| r.config.clone())
    }

    /// Request a reload as if the sentinel had been touched.
    ///
    /// Subject to the same debounce gate as file events. Returns the new token
    /// if the trigger was accepted.
    pub fn trigger_now(&self) -> Option<ReloadToken> {
        // Not the run lock: `start` holds that through watcher setup
        let path = self.shared.sentinel.lock().clone();
        self.shared.deliver(WatchEvent::manual(path))
    }

    /// Register a callback for every accepted trigger.
    ///
    /// Callbacks run on a dedicated dispatch thread, in acceptance order.
    /// Marshal to a UI thread from inside the callback if needed.
    pub fn subscribe(
        &self,
        callback: impl Fn(ReloadToken) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.shared
            .subscribers
            .write()
            .push((id, Arc::new(callback)));
        crate::debug_event!("coordinator", "subscribed", "{id:?}");
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.shared.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    /// Async stream of accepted triggers.
    pub fn notifications(&self) -> broadcast::Receiver<ReloadEvent> {
        self.shared.broadcast.subscribe()
    }

    /// Current identity token.
    pub fn token(&self) -> ReloadToken {
        self.shared.gate.lock().signal.token()
    }

    /// Snapshot of the trigger signal.
    pub fn signal(&self) -> TriggerSignal {
        self.shared.gate.lock().signal.clone()
    }

    fn sink(&self) -> EventSink {
        let shared = self.shared.clone();
        Arc::new(move |event: WatchEvent| {
            shared.deliver(event);
        })
    }
}

impl Default for ReloadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReloadCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Deliver accepted triggers to callbacks until every sender is gone.
fn spawn_dispatcher(rx: Receiver<ReloadEvent>, subscribers: Subscribers) {
    let spawned = thread::Builder::new()
        .name("retouch-dispatch".to_string())
        .spawn(move || {
            for event in rx.iter() {
                // Snapshot so callbacks may (un)subscribe or trigger re-entrantly
                let callbacks: Vec<ReloadCallback> = subscribers
                    .read()
                    .iter()
                    .map(|(_, callback)| callback.clone())
                    .collect();

                for callback in callbacks {
                    callback(event.token);
                }
            }
        });

    if let Err(e) = spawned {
        tracing::error!("[coordinator] failed to spawn dispatch thread: {e}");
    }
}
