use anyhow::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(Into::into) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Polls until the operation yields a value, at most `max_polls` times.
///
/// Returns `Ok(None)` when every poll came back empty. Errors end polling.
pub async fn poll_until<F, Fut, T>(
    mut operation: F,
    max_polls: usize,
    interval_ms: u64,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for poll in 1..=max_polls {
        if let Some(value) = operation().await? {
            return Ok(Some(value));
        }
        debug!("Poll {poll}/{max_polls} found nothing yet");
        if poll < max_polls {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }
    Ok(None)
}
