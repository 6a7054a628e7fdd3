//! Lock screen and PIN code settings shared by the app shell.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};

/// PIN validation, failed-attempt tracking and grace-period locking.
pub mod pin;

pub use pin::{AttemptOutcome, PinAttempts, PinValidationError, should_lock, validate_pin};

/// Whether the PIN is mandatory or not.
pub const IS_PIN_MANDATORY: bool = true;

/// PINs that are too easy to guess and are refused.
pub const PIN_BLACKLIST: [&str; 2] = ["0000", "1234"];

/// Number of digits in a PIN.
pub const PIN_SIZE: usize = 4;

/// Failed attempts allowed before the user is signed out.
pub const MAX_PIN_CODE_ATTEMPTS_NUMBER_BEFORE_LOGOUT: u32 = 3;

/// Time spent in background before the app locks itself.
pub const GRACE_PERIOD: Duration = Duration::from_secs(90);

/// Lock screen settings, defaulting to the constants above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockScreenConfig {
    /// Whether the user must set up a PIN.
    pub is_pin_mandatory: bool,
    /// Refused PINs.
    pub pin_blacklist: BTreeSet<String>,
    /// Number of digits in a PIN.
    pub pin_size: usize,
    /// Failed attempts allowed before sign-out.
    pub max_attempts_before_logout: u32,
    /// Background time before locking, in milliseconds.
    pub grace_period_ms: u64,
}

impl Default for LockScreenConfig {
    fn default() -> Self {
        Self {
            is_pin_mandatory: IS_PIN_MANDATORY,
            pin_blacklist: PIN_BLACKLIST.iter().map(|pin| (*pin).to_owned()).collect(),
            pin_size: PIN_SIZE,
            max_attempts_before_logout: MAX_PIN_CODE_ATTEMPTS_NUMBER_BEFORE_LOGOUT,
            grace_period_ms: GRACE_PERIOD.as_millis() as u64,
        }
    }
}

impl LockScreenConfig {
    /// Background time before locking.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Whether `pin` is on the blacklist.
    pub fn is_blacklisted(&self, pin: &str) -> bool {
        self.pin_blacklist.contains(pin)
    }
}
