//! Retry logic with backoff for client calls
//!
//! Transient failures (network errors, 5xx answers, provider timeouts) are
//! retried up to `max_attempts` extra times. The default [`RetryConfig`] is a
//! fixed two-second delay with two retries, as used by the pathway fetch.
//!
//! # Example
//!
//! ```no_run
//! use study_pathways::retry::{IsRetryable, with_retry};
//! use study_pathways::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{Error, ProviderError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, 5xx answers) return `true`.
/// Permanent failures (bad request, unknown task, invalid response) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

fn is_transient_status(status: u16) -> bool {
    status >= 500 || status == 429
}

impl IsRetryable for ProviderError {
    fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => is_transient_status(*status),
            ProviderError::Transport { .. } | ProviderError::Timeout { .. } => true,
            ProviderError::InvalidResponse { .. }
            | ProviderError::EmptyResponse { .. }
            | ProviderError::NoExtractableText
            | ProviderError::NotConfigured { .. } => false,
        }
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Connection problems and timeouts; a response that arrived but
            // could not be decoded is permanent
            Error::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| is_transient_status(s.as_u16()))
            }
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            Error::Http { status, .. } => is_transient_status(*status),
            Error::Provider(e) => e.is_retryable(),
            // The server is full; capacity frees up as tasks expire
            Error::StoreFull { .. } => true,
            Error::Config { .. }
            | Error::InvalidRequest(_)
            | Error::NotFound(_)
            | Error::Timeout { .. }
            | Error::GenerationFailed { .. }
            | Error::Cancelled
            | Error::ShuttingDown
            | Error::Serialization(_)
            | Error::ApiServerError(_)
            | Error::NotSupported(_)
            | Error::Other(_) => false,
        }
    }
}

/// Execute an async operation with backoff retry logic
///
/// Returns the successful result or the last error after all retry attempts
/// are exhausted. `config.max_attempts` counts retries, so the operation runs
/// at most `max_attempts + 1` times.
///
/// # Example
///
/// ```no_run
/// use study_pathways::retry::with_retry;
/// use study_pathways::config::RetryConfig;
/// use study_pathways::error::Error;
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let html = with_retry(&config, || async {
///     Ok::<String, Error>("<div>pathway</div>".to_string())
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(
                        error = %e,
                        "Operation failed with non-retryable error"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// The actual delay will be between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
