//! Listen command - run a coordinator and print tokens.
//!
//! Stands in for a presentation layer: every accepted trigger prints the new
//! token on stdout. Enter on stdin is forwarded as a manual trigger.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

use retouch::{ReloadCoordinator, ReloadEvent, WatchConfig};

pub async fn run_listen(config: WatchConfig) -> anyhow::Result<()> {
    let coordinator = ReloadCoordinator::new();
    let notifications = coordinator.notifications();

    let report = coordinator.start(config)?;
    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }
    eprintln!(
        "Listening via {} (roots: {}). Enter to reload, Ctrl-C to exit.",
        report.watchers.join("+"),
        report.strategy
    );
    println!("{}", coordinator.token());

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("[listen] cannot listen for Ctrl-C: {e}");
        }
    };
    let input = BufReader::new(tokio::io::stdin());
    listen_until(&coordinator, notifications, input, shutdown).await;

    coordinator.stop();
    Ok(())
}

/// Print tokens and forward input lines until `shutdown` resolves.
///
/// Returns how many tokens were printed.
async fn listen_until<R>(
    coordinator: &ReloadCoordinator,
    mut notifications: broadcast::Receiver<ReloadEvent>,
    input: R,
    shutdown: impl Future<Output = ()>,
) -> usize
where
    R: AsyncBufRead + Unpin,
{
    // One future for the whole loop so a signal between passes is not lost
    tokio::pin!(shutdown);

    let mut lines = input.lines();
    let mut input_open = true;
    let mut printed = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            line = lines.next_line(), if input_open => {
                match line {
                    Ok(Some(_)) => {
                        if coordinator.trigger_now().is_none() {
                            retouch::debug_event!("listen", "manual trigger debounced");
                        }
                    }
                    // EOF or unreadable stdin: keep listening to files only
                    Ok(None) | Err(_) => input_open = false,
                }
            }

            event = notifications.recv() => {
                match event {
                    Ok(event) => {
                        println!("{}", event.token);
                        printed += 1;
                        retouch::log_event!(
                            "listen",
                            "reload",
                            "{} ({})",
                            event.path.display(),
                            event.source
                        );
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!("[listen] lagged by {n} notifications");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    printed
}
