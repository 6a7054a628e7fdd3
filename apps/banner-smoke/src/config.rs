//! Environment-backed configuration for `banner-smoke`.

use std::{env, time::Duration};

use lock_screen_config::{LockScreenConfig, PinValidationError, validate_pin};
use pinned_banner::DEFAULT_DEBOUNCE;
use thiserror::Error;

const DEFAULT_PINNED_COUNT: usize = 3;
const DEFAULT_USER_ID: &str = "@jean-philippe.martin-modernisation.fr:agent.dinum.tchap.gouv.fr";
const DEFAULT_ALIAS_PREFIX: &str = "Pinned demo";

/// Runtime configuration used by the smoke run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeConfig {
    /// Quiet period applied to pinned events updates.
    pub debounce: Duration,
    /// Number of pinned messages published in the demo room.
    pub pinned_count: usize,
    /// Session user ID the identifier helpers run against.
    pub user_id: String,
    /// Prefix of the generated room alias.
    pub alias_prefix: String,
    /// Optional PIN checked against the lock screen policy.
    pub pin: Option<String>,
}

impl SmokeConfig {
    /// Parse configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let debounce_ms = parse_optional_u64("BANNER_SMOKE_DEBOUNCE_MS", &mut lookup)?
            .unwrap_or(DEFAULT_DEBOUNCE.as_millis() as u64);
        let pinned_count = parse_optional_usize("BANNER_SMOKE_PINNED_COUNT", &mut lookup)?
            .unwrap_or(DEFAULT_PINNED_COUNT);
        let user_id = optional_trimmed_env("BANNER_SMOKE_USER_ID", &mut lookup)
            .unwrap_or_else(|| DEFAULT_USER_ID.to_owned());
        let alias_prefix = optional_trimmed_env("BANNER_SMOKE_ALIAS_PREFIX", &mut lookup)
            .unwrap_or_else(|| DEFAULT_ALIAS_PREFIX.to_owned());
        let pin = optional_trimmed_env("BANNER_SMOKE_PIN", &mut lookup);

        if pinned_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "BANNER_SMOKE_PINNED_COUNT",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if let Some(pin) = &pin {
            validate_pin(&LockScreenConfig::default(), pin)
                .map_err(|source| ConfigError::InvalidPin { source })?;
        }

        Ok(Self {
            debounce: Duration::from_millis(debounce_ms),
            pinned_count,
            user_id,
            alias_prefix,
            pin,
        })
    }
}

/// Errors produced while parsing runtime configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid {key}='{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    /// `BANNER_SMOKE_PIN` does not satisfy the lock screen policy.
    #[error("invalid BANNER_SMOKE_PIN: {source}")]
    InvalidPin { source: PinValidationError },
}

fn optional_trimmed_env<F>(key: &'static str, lookup: &mut F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_optional_u64<F>(key: &'static str, lookup: &mut F) -> Result<Option<u64>, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value,
            reason: err.to_string(),
        })
}

fn parse_optional_usize<F>(
    key: &'static str,
    lookup: &mut F,
) -> Result<Option<usize>, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value
        .parse::<usize>()
        .map(Some)
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value,
            reason: err.to_string(),
        })
}
