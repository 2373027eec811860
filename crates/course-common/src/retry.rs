/// Retry with capped exponential backoff for calls to upstream services.
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first; 0 means a single attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(5_000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): `initial * 2^retry`,
    /// capped at `max_backoff`, plus up to a quarter of that as jitter.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        let base = self
            .initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff));
        let base_ms = base.as_millis() as u64;
        base + Duration::from_millis(jitter_ms((base_ms / 4).max(1)))
    }

    /// Run `call` until it succeeds, fails with an error `retryable` rejects,
    /// or the retry budget is spent. Returns the last error.
    pub async fn run<T, E, Fut, F>(
        &self,
        operation: &str,
        retryable: impl Fn(&E) -> bool,
        mut call: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry = 0;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retry >= self.max_retries || !retryable(&err) {
                return Err(err);
            }
            let delay = self.delay(retry);
            retry += 1;
            warn!(
                operation,
                retry,
                delay_ms = delay.as_millis(),
                error = %err,
                "upstream call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Cheap jitter in `0..=max` from the clock's sub-second nanos.
fn jitter_ms(max: u64) -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    nanos % (max + 1)
}
