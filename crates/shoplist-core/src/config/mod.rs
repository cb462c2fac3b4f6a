//! Sync configuration.
//!
//! Values come from defaults, optionally overridden by environment variables:
//!
//! | Variable                      | Field                | Default |
//! |-------------------------------|----------------------|---------|
//! | `SHOPLIST_NETWORK_DELAY_MS`   | `network_delay_ms`   | 1000    |
//! | `SHOPLIST_FAILURE_RATE`       | `failure_rate`       | 0.2     |
//! | `SHOPLIST_MAX_RETRIES`        | `max_retries`        | 3       |
//! | `SHOPLIST_INITIAL_BACKOFF_MS` | `initial_backoff_ms` | 1000    |

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sync::RetryPolicy;
use crate::util::normalize_text_option;

pub const ENV_NETWORK_DELAY_MS: &str = "SHOPLIST_NETWORK_DELAY_MS";
pub const ENV_FAILURE_RATE: &str = "SHOPLIST_FAILURE_RATE";
pub const ENV_MAX_RETRIES: &str = "SHOPLIST_MAX_RETRIES";
pub const ENV_INITIAL_BACKOFF_MS: &str = "SHOPLIST_INITIAL_BACKOFF_MS";

/// Simulated remote and retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Simulated round-trip latency per sync attempt
    pub network_delay_ms: u64,
    /// Probability in `[0, 1]` that an attempt fails with a network error
    pub failure_rate: f64,
    /// Additional attempts after a network failure
    pub max_retries: u32,
    /// First backoff wait; doubles on each retry
    pub initial_backoff_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network_delay_ms: 1000,
            failure_rate: 0.2,
            max_retries: 3,
            initial_backoff_ms: 1000,
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, ENV_NETWORK_DELAY_MS)? {
            config.network_delay_ms = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_FAILURE_RATE)? {
            config.failure_rate = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_MAX_RETRIES)? {
            config.max_retries = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_INITIAL_BACKOFF_MS)? {
            config.initial_backoff_ms = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Override the failure rate
    #[must_use]
    pub const fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate;
        self
    }

    /// Reject settings the sync engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(Error::InvalidInput(format!(
                "failure rate must be between 0 and 1, got {}",
                self.failure_rate
            )));
        }
        Ok(())
    }

    pub const fn network_delay(&self) -> Duration {
        Duration::from_millis(self.network_delay_ms)
    }

    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.initial_backoff_ms),
        )
    }
}

fn parse_var<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = normalize_text_option(lookup(key)) else {
        return Ok(None);
    };
    raw.parse()
        .map(Some)
        .map_err(|_| Error::InvalidInput(format!("{key} has invalid value '{raw}'")))
}
