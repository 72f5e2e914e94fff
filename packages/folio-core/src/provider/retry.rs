//! Retry policy for rate-limited provider calls.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Delay between attempts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Same pause before every retry.
    Fixed { delay_ms: u64 },
    /// `initial_ms * factor^(retry - 1)`, capped at `max_ms`.
    Exponential {
        initial_ms: u64,
        factor: f64,
        max_ms: u64,
    },
}

impl Backoff {
    /// Pause before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Backoff::Exponential {
                initial_ms,
                factor,
                max_ms,
            } => {
                let exp = retry.saturating_sub(1) as i32;
                let ms = (initial_ms as f64 * factor.max(1.0).powi(exp)).min(max_ms as f64);
                Duration::from_millis(ms as u64)
            }
        }
    }
}

/// How many times to try a rate-limited call and how long to wait in between.
///
/// Only [`Error::RateLimited`] is retried; any other error is returned at once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Three attempts, twelve seconds apart (Alpha Vantage free tier pacing).
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed { delay_ms: 12_000 },
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Backoff::Fixed { delay_ms: 0 })
    }

    /// Run `op`, sleeping the calling thread between attempts.
    pub fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// Run `op` with a caller-supplied sleep function.
    pub fn run_with_sleep<T, F, S>(&self, mut op: F, mut sleep: S) -> Result<T>
    where
        F: FnMut() -> Result<T>,
        S: FnMut(Duration),
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op() {
                Err(err) if err.is_rate_limited() && attempt < attempts => {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        error = %err,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    sleep(delay);
                    attempt += 1;
                }
                Err(Error::RateLimited { provider }) => {
                    warn!(%provider, attempts, "giving up after repeated rate limiting");
                    return Err(Error::RateLimited { provider });
                }
                other => return other,
            }
        }
    }
}
