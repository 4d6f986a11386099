//! Touch command - the manual trigger for external processes.

use std::path::Path;

use retouch::watcher::touch_sentinel;

pub fn run_touch(sentinel: &Path) -> anyhow::Result<()> {
    touch_sentinel(sentinel)?;
    retouch::log_event!("touch", "updated", "{}", sentinel.display());
    println!("Touched {}", sentinel.display());
    Ok(())
}
