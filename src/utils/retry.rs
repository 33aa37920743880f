use crate::utils::error::{Result, SyncError};
use std::future::Future;
use std::time::Duration;

const MAX_DELAY_MS: u64 = 30_000;

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay doubles after each failed attempt, starting at `backoff_base_ms`
/// and capped at 30 s. Errors that are not transient are returned as-is.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_with_backoff_if(max_retries, backoff_base_ms, SyncError::is_transient, operation).await
}

/// Same as [`retry_with_backoff`], retrying only errors accepted by `should_retry`.
pub async fn retry_with_backoff_if<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    should_retry: fn(&SyncError) -> bool,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !should_retry(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10))
                    .min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Retryable error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
