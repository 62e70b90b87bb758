//! Generic retry decorator with exponential backoff.
//!
//! Deliberately knows nothing about fallbacks: the service picks a
//! degraded path only after this budget is exhausted. Backoff sleeps are
//! plain `tokio::time::sleep`, so one caller's retry loop never stalls
//! unrelated queries.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles per retry (1 s, 2 s, 4 s).
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Backoff policy: how many retries, starting from which delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total calls this policy allows (initial attempt + retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before the `retry`-th retry (1-based): `base × 2^(retry−1)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay * 2u32.pow(exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// Runs `op`, retrying failures per `policy`. Returns the last error
/// once the budget is exhausted.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                warn!(
                    retry,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "backing call failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
