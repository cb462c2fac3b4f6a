//! Bounded retry with exponential backoff

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// How often and how patiently a failed sync is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each later retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// Backoff before retry number `retry` (0-based): `initial * 2^retry`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(Duration::MAX)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent.
///
/// `operation` receives the 1-based attempt number. Only errors for which
/// [`Error::is_retryable`](crate::Error::is_retryable) holds are retried.
/// Cancelling `cancel` while a backoff wait is pending drops the scheduled
/// retry; the call then yields `Ok(None)` with neither a value nor an error.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<Option<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retry = 0;
    loop {
        let attempt = retry + 1;
        match operation(attempt).await {
            Ok(value) => {
                if retry > 0 {
                    tracing::info!(attempt, "Sync succeeded after retry");
                }
                return Ok(Some(value));
            }
            Err(error) if error.is_retryable() && retry < policy.max_retries => {
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    %error,
                    "Sync attempt failed, retrying"
                );

                tokio::select! {
                    () = cancel.cancelled() => {
                        tracing::info!(attempt, "Sync retry cancelled");
                        return Ok(None);
                    }
                    () = tokio::time::sleep(delay) => {}
                }
                retry += 1;
            }
            Err(error) => {
                if error.is_retryable() {
                    tracing::warn!(attempt, %error, "Sync retries exhausted");
                }
                return Err(error);
            }
        }
    }
}
