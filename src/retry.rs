// SPDX-License-Identifier: MIT
//! Bounded retry for store calls.
//!
//! A command's fetch and save may hit a transiently locked or slow database.
//! [`retry_store`] retries those with exponentially increasing delays, but
//! gives up immediately on errors [`StoreError::is_transient`] rules out
//! (a corrupt list column will not get better on the third read).

use std::time::Duration;

use tracing::{debug, warn};

use crate::store::StoreError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first try).
    pub max_attempts: u32,
    /// Delay before the second attempt; multiplied by `multiplier` after
    /// each failure, capped at `max_delay`.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Config suitable for unit tests (no real waiting).
    pub fn instant() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        }
    }

    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Build from the configured attempt count, keeping default delays.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Retry a store operation with exponential backoff.
///
/// Calls `f()` up to `config.max_attempts` times, sleeping between attempts.
/// Non-transient errors are returned on the spot without further attempts.
pub async fn retry_store<F, Fut, T>(config: &RetryConfig, mut f: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, StoreError>>,
{
    assert!(
        config.max_attempts > 0,
        "RetryConfig.max_attempts must be at least 1"
    );

    let mut delay = config.initial_delay;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "store retry succeeded");
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= config.max_attempts => {
                warn!(attempt, err = %e, "store retry attempts exhausted");
                return Err(e);
            }
            Err(e) => {
                warn!(
                    attempt,
                    max = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    err = %e,
                    "store call failed — retrying"
                );
                tokio::time::sleep(delay).await;
                let next_ms = (delay.as_millis() as f64 * config.multiplier) as u128;
                delay = Duration::from_millis(next_ms.min(config.max_delay.as_millis()) as u64);
            }
        }
    }
}
