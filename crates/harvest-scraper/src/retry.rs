//! Retry with exponential backoff for page fetches.
//!
//! Transient failures (network errors, HTTP 429, HTTP 5xx) are retried after
//! a growing delay. Everything else propagates on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

/// Returns `true` if `err` is worth another attempt after a backoff delay.
fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Http(_) => true,
        ProviderError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries` extra
/// times. The wait before retry `n` (1-based) is
/// `backoff_base_secs * 2^(n-1)` seconds.
///
/// With `max_retries = 2` the operation is attempted at most 3 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient page fetch error; retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
