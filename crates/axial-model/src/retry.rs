//! Retry with exponential backoff for transient model API failures.
//!
//! Quota and overload responses (429, 503), other server errors, connect failures and transport
//! timeouts are retried. Everything else fails the call immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ModelError;

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Configuration for retry behavior on transient model errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryConfig {
    /// Default backoff with a custom attempt budget.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Wait before the next attempt. A server-suggested delay overrides the
    /// computed backoff.
    fn wait_for(&self, backoff: Duration, error: &ModelError) -> Duration {
        match error {
            ModelError::Unavailable {
                retry_after_secs: Some(secs),
                ..
            } => Duration::from_secs(*secs).min(MAX_RETRY_AFTER),
            _ => backoff,
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or the attempt budget is spent.
///
/// # Errors
///
/// Returns the last error from `op`.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ModelError>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < config.max_attempts => {
                let wait = config.wait_for(delay, &e);
                tracing::warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    ?wait,
                    error = %e,
                    "transient model error, retrying"
                );
                tokio::time::sleep(wait).await;
                delay = std::cmp::min(delay * 2, config.max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
