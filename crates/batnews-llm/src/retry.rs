//! Retry with exponential back-off and jitter for model calls.
//!
//! Model calls are billed per request, so the default retry count is zero and
//! callers fall back to local heuristics once retries are exhausted.

use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Upper bound for a single delay, before jitter.
    pub backoff_max_ms: u64,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), without jitter.
    #[must_use]
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(self.backoff_max_ms)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx, and model
/// output that was empty or not the expected JSON.
///
/// **Not retriable:** other HTTP statuses (bad key, bad request) and an
/// invalid base URL.
#[must_use]
pub fn is_retriable(err: &LlmError) -> bool {
    match err {
        LlmError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LlmError::Status { status } => *status == 429 || *status >= 500,
        LlmError::EmptyResponse | LlmError::MissingJson { .. } | LlmError::Deserialize { .. } => {
            true
        }
        LlmError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation`, retrying transient failures up to `policy.max_retries` times.
///
/// Each delay is `base × 2^(attempt-1)`, capped at `backoff_max_ms`, then
/// scaled by a random factor in `[0.75, 1.25)`.
///
/// # Errors
///
/// Returns the last error once it is not retriable or retries are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = policy.base_delay_ms(attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    call = label,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "model call failed, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
