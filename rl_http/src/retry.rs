use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::errors::HttpError;
use crate::errors::Result;

/// Configuration for the retry stage
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts after the initial try
    pub max_retries: u32,

    /// First backoff delay; doubles on each further retry
    pub base_delay: Duration,

    /// Upper bound for a single backoff delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 6, base_delay: Duration::from_secs(2), max_delay: Duration::from_secs(64) }
    }
}

impl RetryConfig {
    /// No retries: every failure surfaces immediately
    pub fn disabled() -> Self {
        Self { max_retries: 0, ..Default::default() }
    }
}

/// Retry stage for transient outbound failures
///
/// Wraps one async operation, retrying transport errors and retryable
/// statuses with exponential backoff. Terminal failures pass through
/// unchanged. The stage knows nothing about rate limiting; compose it
/// inside or outside an admission gate as the call chain requires.
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a retry policy with default configuration
    pub fn new() -> Self {
        Self::with_config(RetryConfig::default())
    }

    /// Create a retry policy with custom configuration
    pub fn with_config(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `op`, retrying transient failures with exponential backoff
    ///
    /// The cancellation token is consulted during each backoff sleep;
    /// cancelling returns [`HttpError::Cancelled`] without another
    /// attempt.
    pub async fn run<F, Fut, T>(&self, cancel: &CancellationToken, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.config.base_delay;
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.config.max_retries && is_transient(&err) => {
                    attempt += 1;
                    tracing::debug!("Retrying after {err} (attempt {attempt}/{})", self.config.max_retries);

                    tokio::select! {
                        _ = cancel.cancelled() => return Err(HttpError::Cancelled),
                        _ = tokio::time::sleep(delay.min(self.config.max_delay)) => {}
                    }

                    delay = delay.saturating_mul(2);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a failure is worth retrying
fn is_transient(err: &HttpError) -> bool {
    match err {
        HttpError::RequestFailed(err) => err.is_timeout() || err.is_connect() || err.is_request(),
        HttpError::Status(status) => status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS,
        _ => false,
    }
}
