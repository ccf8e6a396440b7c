//! Shared utility functions

use tokio::time::{Duration, Instant};

/// Trailing-edge debouncer
///
/// Each `push` replaces the pending value and restarts the quiet period; the
/// value becomes due only once `interval` has passed without another push.
/// Time is passed in explicitly so callers can drive it from `sleep_until`.
#[derive(Debug)]
pub struct Debouncer<T> {
    interval: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    /// Queue `value`, superseding anything still pending
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.interval));
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its quiet period has elapsed
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if *at <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_due_after_interval() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.push("ap", start);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(499)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(500)), Some("ap"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_push_restarts_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.push("a", start);
        debouncer.push("ap", start + Duration::from_millis(300));
        debouncer.push("app", start + Duration::from_millis(600));

        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(1100))
        );
        assert_eq!(debouncer.take_due(start + Duration::from_millis(900)), None);
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(1100)),
            Some("app")
        );
    }

    #[test]
    fn test_flush_ignores_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        assert_eq!(debouncer.flush(), None::<String>);

        debouncer.push("x".to_string(), Instant::now());
        assert_eq!(debouncer.flush().as_deref(), Some("x"));
        assert_eq!(debouncer.deadline(), None);
    }
}
