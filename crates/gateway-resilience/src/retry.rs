//! Bounded retry with exponential backoff.
//!
//! Attempts run strictly one after another. Every transport failure and every
//! non-success upstream status is retried the same way; the delay before
//! attempt `n + 1` is `min(base_delay * 2^(n - 1), max_delay)`.

use gateway_core::GatewayError;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Failure of a single upstream attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Connection-level failure, no status observed
    Transport(String),
    /// Upstream answered with a non-success status
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },
    /// Failure that must not be retried
    Abort(GatewayError),
}

impl AttemptError {
    fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Abort(_) => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Transport(message) => message.clone(),
            Self::Status { status, body } if body.is_empty() => format!("HTTP {status}"),
            Self::Status { body, .. } => body.clone(),
            Self::Abort(error) => error.to_string(),
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Status { status, .. } => write!(f, "upstream status {status}"),
            Self::Abort(error) => write!(f, "aborted: {error}"),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failure
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(4000),
        }
    }
}

/// Retry policy implementation
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration (3 attempts, 1s doubling, 4s cap)
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Delay scheduled after failed attempt `attempt` (1-indexed)
    #[must_use]
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self
            .config
            .base_delay
            .saturating_mul(1_u32 << exponent);
        delay.min(self.config.max_delay)
    }

    /// Execute an upstream call with retry logic
    ///
    /// Dropping the returned future cancels any pending backoff timer.
    ///
    /// # Errors
    /// Returns `UpstreamExhausted` once every attempt failed, or the wrapped
    /// error of an [`AttemptError::Abort`] immediately.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_status = None;
        let mut last_message = String::new();

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(result) => {
                    debug!(attempt, outcome = "success", "Upstream attempt finished");
                    return Ok(result);
                }
                Err(AttemptError::Abort(error)) => {
                    warn!(attempt, outcome = "aborted", error = %error, "Upstream attempt aborted");
                    return Err(error);
                }
                Err(error) => {
                    if let Some(status) = error.status() {
                        last_status = Some(status);
                    }
                    last_message = error.message();

                    if attempt == max_attempts {
                        warn!(
                            attempt,
                            max_attempts,
                            outcome = "failed",
                            error = %error,
                            "Upstream attempts exhausted"
                        );
                        break;
                    }

                    let delay = self.delay_after_attempt(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        outcome = "retrying",
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying after upstream failure"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(GatewayError::upstream_exhausted(
            max_attempts,
            last_status,
            &last_message,
        ))
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[test]
    fn test_delay_calculation() {
        let policy = RetryPolicy::with_defaults();

        assert_eq!(policy.delay_after_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after_attempt(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_after_attempt(4), Duration::from_millis(4000)); // Capped
        assert_eq!(policy.delay_after_attempt(40), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_two_failures() {
        let policy = RetryPolicy::with_defaults();
        let counter = Arc::new(AtomicU32::new(0));
        let started = Instant::now();
        let attempt_times = Arc::new(Mutex::new(Vec::new()));

        let result: Result<u32, GatewayError> = policy
            .execute(|| {
                let c = Arc::clone(&counter);
                let times = Arc::clone(&attempt_times);
                async move {
                    if let Ok(mut times) = times.lock() {
                        times.push(started.elapsed());
                    }
                    let attempt = c.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(AttemptError::Status {
                            status: 503,
                            body: "unavailable".to_string(),
                        })
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        let times = attempt_times.lock().expect("lock").clone();
        let tolerance = Duration::from_millis(50);
        assert!(times[0] < tolerance);
        let first_gap = times[1] - times[0];
        let second_gap = times[2] - times[1];
        assert!(first_gap >= Duration::from_millis(1000) && first_gap < Duration::from_millis(1000) + tolerance);
        assert!(second_gap >= Duration::from_millis(2000) && second_gap < Duration::from_millis(2000) + tolerance);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted() {
        let policy = RetryPolicy::with_defaults();
        let counter = Arc::new(AtomicU32::new(0));

        let result: Result<u32, GatewayError> = policy
            .execute(|| {
                let c = Arc::clone(&counter);
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    Err(AttemptError::Status {
                        status: 500 + n as u16,
                        body: format!("boom {n}"),
                    })
                }
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(
            result,
            Err(GatewayError::UpstreamExhausted {
                attempts: 3,
                status: Some(502),
                message: "boom 2".to_string(),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_only_failures_have_no_status() {
        let policy = RetryPolicy::with_defaults();

        let result: Result<(), GatewayError> = policy
            .execute(|| async { Err(AttemptError::Transport("connection refused".to_string())) })
            .await;

        match result {
            Err(GatewayError::UpstreamExhausted { status, message, .. }) => {
                assert_eq!(status, None);
                assert_eq!(message, "connection refused");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_kept_when_last_failure_is_transport() {
        let policy = RetryPolicy::with_defaults();
        let counter = Arc::new(AtomicU32::new(0));

        let result: Result<(), GatewayError> = policy
            .execute(|| {
                let c = Arc::clone(&counter);
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(AttemptError::Status {
                            status: 429,
                            body: String::new(),
                        })
                    } else {
                        Err(AttemptError::Transport("reset by peer".to_string()))
                    }
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(GatewayError::UpstreamExhausted { status: Some(429), .. })
        ));
    }

    #[tokio::test]
    async fn test_abort_is_not_retried() {
        let policy = RetryPolicy::with_defaults();
        let counter = Arc::new(AtomicU32::new(0));

        let result: Result<u32, GatewayError> = policy
            .execute(|| {
                let c = Arc::clone(&counter);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(AttemptError::Abort(GatewayError::internal("bad request body")))
                }
            })
            .await;

        assert!(matches!(result, Err(GatewayError::Internal { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1); // No retries
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_retry_never_fires() {
        let policy = RetryPolicy::with_defaults();
        let counter = Arc::new(AtomicU32::new(0));

        let call = policy.execute(|| {
            let c = Arc::clone(&counter);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AttemptError::Transport("down".to_string()))
            }
        });

        // First attempt runs, then the executor sleeps 1s; cancel before that.
        let timed_out = tokio::time::timeout(Duration::from_millis(500), call).await;
        assert!(timed_out.is_err());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
