use std::time::Duration;

use tokio::time::Instant;

/// Coalesces bursts of values, releasing only the latest once the input has
/// been quiet for the configured timeout.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    timeout: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: None,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.timeout);
    }

    /// When the pending value becomes ready, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Take the pending value regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    /// Forget the pending value.
    pub fn clear(&mut self) {
        self.deadline = None;
        self.pending = None;
    }
}
