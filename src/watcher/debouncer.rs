//! Rate-limiting gate for reload triggers.
//!
//! Editors often write a file several times per save (atomic rename, formatter,
//! auto-save). The gate lets the first event of a burst through and drops the
//! rest until the interval has elapsed. Dropped events are not re-queued.

use std::time::{Duration, Instant};

use super::event::WatchEvent;

/// Leading-edge debounce gate.
///
/// Not internally synchronized: the owner serializes access (the coordinator
/// keeps it under the same lock as the trigger signal).
#[derive(Debug)]
pub struct Debouncer {
    /// When the last event was forwarded.
    last_accepted_at: Option<Instant>,
    /// Minimum spacing between two forwarded events.
    interval: Duration,
}

impl Debouncer {
    /// Create a new gate with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            last_accepted_at: None,
            interval,
        }
    }

    /// Create a new gate with the interval in milliseconds.
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Offer an event to the gate.
    ///
    /// Returns `true` if the event was forwarded, `false` if it was suppressed.
    pub fn accept(&mut self, event: &WatchEvent) -> bool {
        let forwarded = self.accept_at(Instant::now());
        if !forwarded {
            crate::debug_event!(
                "debounce",
                "suppressed",
                "{} ({})",
                event.path.display(),
                event.source
            );
        }
        forwarded
    }

    /// Offer an event observed at `now`.
    pub fn accept_at(&mut self, now: Instant) -> bool {
        let open = match self.last_accepted_at {
            Some(last) => now.saturating_duration_since(last) > self.interval,
            None => true,
        };

        if open {
            self.last_accepted_at = Some(now);
        }
        open
    }

    /// Change the interval. The last accepted timestamp is kept.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.last_accepted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::thread::sleep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_event_always_accepted() {
        let mut debouncer = Debouncer::from_millis(300);
        assert!(debouncer.accept_at(Instant::now()));
        assert!(debouncer.last_accepted_at().is_some());
    }

    #[test]
    fn test_burst_collapses_to_one() {
        let mut debouncer = Debouncer::from_millis(300);
        let base = Instant::now();

        let accepted = (0..10)
            .filter(|i| debouncer.accept_at(base + ms(i * 20)))
            .count();

        assert_eq!(accepted, 1);
    }

    #[test]
    fn test_spaced_events_all_accepted() {
        let mut debouncer = Debouncer::from_millis(100);
        let base = Instant::now();

        for i in 0..5 {
            assert!(debouncer.accept_at(base + ms(i * 150)), "event {i}");
        }
    }

    #[test]
    fn test_window_is_measured_from_last_accept() {
        // 0 accepted, 100 and 250 dropped, 400 accepted
        let mut debouncer = Debouncer::from_millis(300);
        let base = Instant::now();

        assert!(debouncer.accept_at(base));
        assert!(!debouncer.accept_at(base + ms(100)));
        assert!(!debouncer.accept_at(base + ms(250)));
        assert!(debouncer.accept_at(base + ms(400)));
    }

    #[test]
    fn test_exact_interval_boundary_is_suppressed() {
        let mut debouncer = Debouncer::from_millis(300);
        let base = Instant::now();

        assert!(debouncer.accept_at(base));
        assert!(!debouncer.accept_at(base + ms(300)));
        assert!(debouncer.accept_at(base + ms(301)));
    }

    #[test]
    fn test_dropped_events_do_not_extend_window() {
        let mut debouncer = Debouncer::from_millis(100);
        let base = Instant::now();

        assert!(debouncer.accept_at(base));
        assert!(!debouncer.accept_at(base + ms(90)));
        // 110ms after the accepted event, only 20ms after the dropped one
        assert!(debouncer.accept_at(base + ms(110)));
    }

    #[test]
    fn test_accept_with_real_clock() {
        let mut debouncer = Debouncer::from_millis(50);
        let event = WatchEvent::manual(PathBuf::from("/tmp/.retouch"));

        assert!(debouncer.accept(&event));
        assert!(!debouncer.accept(&event));

        sleep(ms(70));
        assert!(debouncer.accept(&event));
    }

    #[test]
    fn test_set_interval_keeps_last_accept() {
        let mut debouncer = Debouncer::from_millis(50);
        let base = Instant::now();

        assert!(debouncer.accept_at(base));
        debouncer.set_interval(ms(500));
        assert_eq!(debouncer.interval(), ms(500));
        assert!(!debouncer.accept_at(base + ms(100)));
    }
}
