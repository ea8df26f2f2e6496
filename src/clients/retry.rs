//! Bounded, jittered retry around single call attempts.
//!
//! The orchestrator never looks at response payloads; it dispatches purely on
//! the error classification produced by the REST and GraphQL clients. Delays
//! are drawn uniformly from a short range so that many sessions retrying at
//! once do not stampede the API in lockstep.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::clients::ApiError;

/// Number of attempts made for one logical API call.
pub const API_CALL_RETRY_ATTEMPTS: u32 = 5;

/// Retry policy applied to each logical REST or GraphQL call.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use shopify_admin_api::RetryPolicy;
///
/// // Tighter policy for latency-sensitive paths.
/// let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_millis(300));
/// assert_eq!(policy.max_attempts(), 3);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    wait_min: Duration,
    wait_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: API_CALL_RETRY_ATTEMPTS,
            wait_min: Duration::from_secs(1),
            wait_max: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt ceiling and jitter range.
    ///
    /// `max_attempts` counts the initial attempt, so `1` disables retries
    /// entirely; `0` is treated as `1`.
    #[must_use]
    pub fn new(max_attempts: u32, wait_min: Duration, wait_max: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            wait_min,
            wait_max,
        }
    }

    /// Returns the attempt ceiling.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    // Uniform random delay in [wait_min, wait_max].
    fn backoff(&self) -> Duration {
        let min = self.wait_min.as_secs_f64();
        let max = self.wait_max.as_secs_f64();
        if max <= min {
            return self.wait_min;
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(min..=max))
    }

    /// Runs `op` until it succeeds, fails with a non-retryable classification,
    /// or the attempt ceiling is reached.
    ///
    /// On exhaustion the last classified error is returned unchanged.
    pub(crate) async fn run<T, F, Fut>(
        &self,
        retryable: fn(&ApiError) -> bool,
        mut op: F,
    ) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && retryable(&error) => {
                    let delay = self.backoff();
                    tracing::debug!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "retrying Shopify API call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
