//! Retry utilities with exponential backoff for throttled catalog requests.

use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the initial backoff delay
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

/// Per-call retry bookkeeping. Never shared between fetches.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    config: RetryConfig,
}

impl RetryState {
    pub fn new(config: RetryConfig) -> Self {
        Self { attempt: 0, config }
    }

    /// Zero-based number of the attempt in flight
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Backoff before the next attempt: `initial_delay * multiplier^attempt`
    ///
    /// Saturates at `Duration::MAX` once the product no longer fits.
    pub fn delay(&self) -> Duration {
        let exponent = i32::try_from(self.attempt).unwrap_or(i32::MAX);
        let factor = self.config.backoff_multiplier.powi(exponent);
        Duration::try_from_secs_f64(self.config.initial_delay.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX)
    }

    /// Whether another attempt is left in the budget
    pub fn can_retry(&self) -> bool {
        self.attempt + 1 < self.config.max_attempts
    }

    fn advance(&mut self) {
        self.attempt += 1;
    }
}

/// Upstream conditions worth waiting out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Service unavailable (503), the catalog's throttling answer
    ServiceUnavailable,
}

impl TransientError {
    /// Classify an HTTP status
    pub fn from_status(status: reqwest::StatusCode) -> Option<Self> {
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            Some(TransientError::ServiceUnavailable)
        } else {
            None
        }
    }

    /// Classify a transport error; only errors carrying a 503 status are transient
    pub fn from_reqwest_error(err: &reqwest::Error) -> Option<Self> {
        err.status().and_then(Self::from_status)
    }

    /// Check if a SourceError represents a transient error
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::ServiceUnavailable => Some(TransientError::ServiceUnavailable),
            _ => None,
        }
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T> {
    /// Operation succeeded
    Success(T),
    /// Operation kept failing with a transient error until the budget ran out
    TransientFailure(TransientError, u32),
    /// Operation failed with a permanent error
    PermanentFailure(SourceError),
}

/// Execute an async operation, backing off on transient errors
///
/// Permanent errors are returned on the attempt that produced them. The delay
/// is an awaited timer, so dropping the future cancels any pending wait.
pub async fn with_retry_detailed<T, F, Fut>(config: RetryConfig, operation: F) -> RetryResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let mut state = RetryState::new(config);
    let mut operation = operation;

    loop {
        match operation().await {
            Ok(result) => {
                if state.attempt() > 0 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} transient failures",
                        state.attempt() + 1,
                        state.attempt()
                    );
                }
                return RetryResult::Success(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::from_source_error(&error) else {
                    return RetryResult::PermanentFailure(error);
                };

                if !state.can_retry() {
                    tracing::warn!(
                        "Giving up after {} attempts: {:?}",
                        state.attempt() + 1,
                        transient
                    );
                    return RetryResult::TransientFailure(transient, state.attempt() + 1);
                }

                let delay = state.delay();
                tracing::warn!(
                    "Transient error on attempt {}/{}: {:?}, retrying in {:?}",
                    state.attempt() + 1,
                    config.max_attempts,
                    transient,
                    delay
                );
                sleep(delay).await;
                state.advance();
            }
        }
    }
}
