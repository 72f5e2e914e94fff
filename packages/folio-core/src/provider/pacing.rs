//! Minimum spacing between outgoing provider calls.

use std::time::{Duration, Instant};
use tracing::debug;

/// Keeps successive calls at least `min_interval` apart.
///
/// Alpha Vantage's free tier allows five calls a minute; a 12 s interval
/// stays under it without ever seeing a throttle notice.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// No spacing at all.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// How long a call made at `now` would have to wait.
    pub fn wait_time(&self, now: Instant) -> Duration {
        match self.last_call {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Block the calling thread until the next call is allowed.
    pub fn pace(&mut self) {
        self.pace_with(Instant::now(), std::thread::sleep);
    }

    /// Wait via `sleep` as needed for a call at `now`, then record the call.
    pub fn pace_with<S>(&mut self, now: Instant, mut sleep: S)
    where
        S: FnMut(Duration),
    {
        let wait = self.wait_time(now);
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "pacing provider call");
            sleep(wait);
        }
        self.last_call = Some(now + wait);
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::disabled()
    }
}
