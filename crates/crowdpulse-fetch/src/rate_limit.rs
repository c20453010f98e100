//! Pacing and retry utilities for the community fetcher.
//!
//! Every request waits a randomized delay drawn from [`Pacing`] before it is
//! sent, so bursts of concurrent tasks do not hit a source in lockstep.
//! [`retry_with_backoff`] optionally re-attempts transient failures; the
//! default configuration uses zero retries, so a failed target/page is simply
//! skipped for the run.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::FetchError;

/// Cap on a single backoff sleep.
const MAX_BACKOFF_MS: u64 = 60_000;

/// Inclusive range of the randomized pre-request delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Pacing {
    /// Builds a pacing range, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        if min_ms <= max_ms {
            Self { min_ms, max_ms }
        } else {
            Self {
                min_ms: max_ms,
                max_ms: min_ms,
            }
        }
    }

    /// No delay at all. Used by tests against a local mock server.
    #[must_use]
    pub fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    /// Draws one delay uniformly from `[min_ms, max_ms]`.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    pub(crate) async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Returns `true` if `err` is worth another attempt after a backoff delay.
fn is_retriable(err: &FetchError) -> bool {
    err.is_transient()
}

/// Computes the sleep before retry number `attempt` (1-based):
/// `base * 2^(attempt-1)`, capped, with ±25 % jitter.
fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> Duration {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(10));
    let capped = computed.min(MAX_BACKOFF_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(jittered)
}

/// Executes `operation`, retrying transient errors up to `max_retries` times.
///
/// Non-transient errors are returned immediately without sleeping. With
/// `max_retries = 0` the operation is attempted exactly once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = backoff_delay(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
