//! Generic bounded polling for long-running provider jobs.
//!
//! Voice and render providers hand back a job id and expect the caller to
//! poll until the artifact is ready. The loop here separates three outcomes
//! a status check can have: the job finished, the job is still running, or
//! the job failed on the provider side. A failed *check* (transport error)
//! is none of those; it is logged and retried until the attempt budget runs
//! out.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for one polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Operation name for logging and error text.
    pub operation: String,
    /// Maximum number of status checks before timing out.
    pub max_attempts: u32,
    /// Delay after the first check (doubles each attempt).
    pub base_delay: Duration,
    /// Delay cap.
    pub max_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            operation: "poll".to_string(),
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl PollConfig {
    /// Create a new poll config with the given operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Default::default()
        }
    }

    /// Create a fixed-interval config (no backoff).
    pub fn fixed(operation: impl Into<String>, interval: Duration, max_attempts: u32) -> Self {
        Self {
            operation: operation.into(),
            max_attempts,
            base_delay: interval,
            max_delay: interval,
        }
    }

    /// Set the maximum number of status checks.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the base delay between checks.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the delay cap.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Calculate the delay following a given zero-based attempt.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

/// What one status check concluded about the remote job.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// Job finished; carries the payload.
    Ready(T),
    /// Job still running, check again later.
    Pending,
    /// Job failed on the provider side; polling further is pointless.
    Failed(String),
}

/// Why a polling loop stopped without a payload.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("{operation} did not finish after {attempts} attempts")]
    TimedOut { operation: String, attempts: u32 },

    #[error("{operation} failed: {detail}")]
    Failed { operation: String, detail: String },

    #[error("{operation} cancelled")]
    Cancelled { operation: String },
}

impl PollError {
    pub fn attempts(&self) -> Option<u32> {
        match self {
            PollError::TimedOut { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// Poll `check` until it reports a terminal outcome or the attempt budget
/// is exhausted.
///
/// Each call to `check` consumes one attempt, whether it returns `Pending`
/// or fails at the transport level. A `Failed` outcome stops immediately
/// with the provider's detail. Sleeps between checks follow
/// `min(base_delay * 2^n, max_delay)` and are cooperative: cancelling the
/// token wakes the loop and returns [`PollError::Cancelled`].
///
/// # Example
/// ```ignore
/// let config = PollConfig::fixed("avatar_render", Duration::from_secs(10), 30);
/// let url = poll(&config, &cancel, || async {
///     client.job_status(&job_id).await
/// })
/// .await?;
/// ```
pub async fn poll<F, Fut, T, E>(
    config: &PollConfig,
    cancel: &CancellationToken,
    check: F,
) -> Result<T, PollError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                operation: config.operation.clone(),
            });
        }

        match check().await {
            Ok(PollOutcome::Ready(value)) => {
                debug!(
                    "{} ready after {} attempt(s)",
                    config.operation,
                    attempt + 1
                );
                return Ok(value);
            }
            Ok(PollOutcome::Failed(detail)) => {
                return Err(PollError::Failed {
                    operation: config.operation.clone(),
                    detail,
                });
            }
            Ok(PollOutcome::Pending) => {
                debug!(
                    "{} pending (attempt {}/{})",
                    config.operation,
                    attempt + 1,
                    config.max_attempts
                );
            }
            Err(e) => {
                warn!(
                    "{} status check failed (attempt {}/{}): {}",
                    config.operation,
                    attempt + 1,
                    config.max_attempts,
                    e
                );
            }
        }

        let delay = config.delay_for_attempt(attempt);
        attempt += 1;
        if attempt >= config.max_attempts {
            return Err(PollError::TimedOut {
                operation: config.operation.clone(),
                attempts: attempt,
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(PollError::Cancelled {
                    operation: config.operation.clone(),
                });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_schedule_doubles_and_caps() {
        let config = PollConfig::new("test")
            .with_base_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(30));

        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(16));
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(30));
        assert_eq!(config.delay_for_attempt(9), Duration::from_secs(30));
    }

    #[test]
    fn test_fixed_interval_never_backs_off() {
        let config = PollConfig::fixed("test", Duration::from_secs(10), 30);
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(20), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_ready_after_two_pending_makes_three_checks() {
        let config = PollConfig::new("test")
            .with_max_attempts(10)
            .with_base_delay(Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let result = poll(&config, &cancel, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Ok::<_, String>(PollOutcome::Pending)
                } else {
                    Ok(PollOutcome::Ready(42))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_consumes_exact_attempt_budget() {
        let config = PollConfig::new("test")
            .with_max_attempts(4)
            .with_base_delay(Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let result: Result<u32, _> = poll(&config, &cancel, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(PollOutcome::Pending) }
        })
        .await;

        match result {
            Err(PollError::TimedOut { attempts, .. }) => assert_eq!(attempts, 4),
            other => panic!("Expected timeout, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_provider_failure_stops_after_second_check() {
        let config = PollConfig::new("test")
            .with_max_attempts(10)
            .with_base_delay(Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let result: Result<u32, _> = poll(&config, &cancel, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok::<_, String>(PollOutcome::Pending)
                } else {
                    Ok(PollOutcome::Failed("server error".to_string()))
                }
            }
        })
        .await;

        match result {
            Err(PollError::Failed { detail, .. }) => assert_eq!(detail, "server error"),
            other => panic!("Expected failure, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_check_error_consumes_attempt_but_continues() {
        let config = PollConfig::new("test")
            .with_max_attempts(5)
            .with_base_delay(Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let result = poll(&config, &cancel, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("connection reset".to_string())
                } else {
                    Ok(PollOutcome::Ready("done"))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_check() {
        let config = PollConfig::new("test");
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<u32, _> = poll(&config, &cancel, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(PollOutcome::Pending) }
        })
        .await;

        assert!(matches!(result, Err(PollError::Cancelled { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_wakes_sleep() {
        let config = PollConfig::new("test")
            .with_max_attempts(5)
            .with_base_delay(Duration::from_secs(60))
            .with_max_delay(Duration::from_secs(60));
        let cancel = CancellationToken::new();

        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                poll(&config, &cancel, || async {
                    Ok::<_, String>(PollOutcome::<u32>::Pending)
                })
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poll did not react to cancellation")
            .unwrap();
        assert!(matches!(result, Err(PollError::Cancelled { .. })));
    }
}
