//! Identity token that changes on every accepted reload trigger.

use std::fmt;
use std::time::SystemTime;

/// Opaque identity value handed to the presentation layer.
///
/// Content keyed on a token is discarded and rebuilt when the token changes.
/// Only equality is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReloadToken(u64);

#[cfg(test)]
impl ReloadToken {
    /// Position in the acceptance sequence.
    pub(crate) fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Last-triggered state owned by the coordinator.
#[derive(Debug, Clone)]
pub struct TriggerSignal {
    token: ReloadToken,
    last_triggered_at: Option<SystemTime>,
}

impl TriggerSignal {
    pub fn new() -> Self {
        Self {
            token: ReloadToken(0),
            last_triggered_at: None,
        }
    }

    pub fn token(&self) -> ReloadToken {
        self.token
    }

    pub fn last_triggered_at(&self) -> Option<SystemTime> {
        self.last_triggered_at
    }

    /// Record an accepted trigger and regenerate the token.
    ///
    /// Only the accept path may call this; every call yields a token distinct
    /// from all previous ones.
    pub(crate) fn bump(&mut self, at: SystemTime) -> ReloadToken {
        self.token = ReloadToken(self.token.0.wrapping_add(1));
        self.last_triggered_at = Some(at);
        self.token
    }
}

impl Default for TriggerSignal {
    fn default() -> Self {
        Self::new()
    }
}
