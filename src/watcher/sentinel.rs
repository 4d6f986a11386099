//! Sentinel file helpers.
//!
//! The sentinel's modification time is the whole protocol: anything able to
//! update it triggers a reload. Content is never read.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::time::SystemTime;

use super::error::WatchError;

/// Make sure the sentinel exists, creating an empty file if absent.
///
/// Returns `true` if the file was created. Existing files are left untouched
/// so their timestamp does not change.
pub fn ensure_sentinel(path: &Path) -> Result<bool, WatchError> {
    if path.is_file() {
        return Ok(false);
    }

    let unwritable = |e: std::io::Error| WatchError::SentinelUnwritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(unwritable)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(unwritable)?;

    crate::debug_event!("sentinel", "created", "{}", path.display());
    Ok(true)
}

/// Set the sentinel's modification time to now, creating it if needed.
pub fn touch_sentinel(path: &Path) -> Result<SystemTime, WatchError> {
    ensure_sentinel(path)?;

    let now = SystemTime::now();
    OpenOptions::new()
        .append(true)
        .open(path)
        .and_then(|file| file.set_modified(now))
        .map_err(|e| WatchError::SentinelUnwritable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(now)
}
