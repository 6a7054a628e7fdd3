use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::LockScreenConfig;

/// Reasons a candidate PIN is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PinValidationError {
    /// The PIN does not have the configured number of characters.
    #[error("PIN must be {expected} digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    /// The PIN contains something other than ASCII digits.
    #[error("PIN must only contain digits")]
    NotNumeric,
    /// The PIN is on the blacklist.
    #[error("PIN is too easy to guess")]
    Blacklisted,
}

/// Check a PIN chosen by the user against the lock screen settings.
pub fn validate_pin(config: &LockScreenConfig, pin: &str) -> Result<(), PinValidationError> {
    let actual = pin.chars().count();
    if actual != config.pin_size {
        return Err(PinValidationError::WrongLength {
            expected: config.pin_size,
            actual,
        });
    }
    if !pin.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(PinValidationError::NotNumeric);
    }
    if config.is_blacklisted(pin) {
        return Err(PinValidationError::Blacklisted);
    }
    Ok(())
}

/// Whether the app should lock after spending `backgrounded_for` in background.
pub fn should_lock(config: &LockScreenConfig, backgrounded_for: Duration) -> bool {
    backgrounded_for >= config.grace_period()
}

/// What happens after a wrong PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The user may try again.
    Retry { remaining: u32 },
    /// No attempts left; the session must be signed out.
    SignOut,
}

/// Failed PIN attempt counter for one unlock session.
#[derive(Debug, Clone)]
pub struct PinAttempts {
    max_attempts: u32,
    failed: u32,
}

impl PinAttempts {
    /// Tracker allowing `config.max_attempts_before_logout` failures (at least one).
    pub fn new(config: &LockScreenConfig) -> Self {
        Self {
            max_attempts: config.max_attempts_before_logout.max(1),
            failed: 0,
        }
    }

    /// Attempts left before sign-out.
    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.failed)
    }

    /// Register a wrong PIN.
    pub fn record_failure(&mut self) -> AttemptOutcome {
        self.failed = self.failed.saturating_add(1).min(self.max_attempts);
        match self.remaining() {
            0 => {
                warn!(failed = self.failed, "PIN attempts exhausted");
                AttemptOutcome::SignOut
            }
            remaining => {
                debug!(remaining, "wrong PIN entered");
                AttemptOutcome::Retry { remaining }
            }
        }
    }

    /// Register a correct PIN, resetting the counter.
    pub fn record_success(&mut self) {
        self.failed = 0;
    }
}
