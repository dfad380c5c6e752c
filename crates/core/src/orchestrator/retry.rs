//! Bounded exponential backoff for transient platform failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::config::RetryConfig;
use crate::error::PlatformError;
use crate::metrics::PLATFORM_RETRIES;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before retry number `attempt` (1-based): initial * 2^(attempt-1), capped.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails with a non-retryable kind, or the
    /// attempts run out. Each attempt is bounded by `timeout`; elapsing is an
    /// upstream failure.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        timeout: Duration,
        mut op: F,
    ) -> Result<T, PlatformError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PlatformError>>,
    {
        let mut attempt = 1;
        loop {
            let result = match tokio::time::timeout(timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(PlatformError::Upstream(format!(
                    "{} timed out after {} ms",
                    operation,
                    timeout.as_millis()
                ))),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.kind().is_retryable() && attempt < self.max_attempts => {
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {} ms",
                        operation,
                        attempt,
                        self.max_attempts,
                        e,
                        backoff.as_millis()
                    );
                    PLATFORM_RETRIES.with_label_values(&[operation]).inc();
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(&RetryConfig {
            max_attempts,
            initial_backoff_ms: 1,
            max_backoff_ms: 4,
        })
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(&RetryConfig {
            max_attempts: 10,
            initial_backoff_ms: 500,
            max_backoff_ms: 3000,
        });
        assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(2000));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(3000));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(3000));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(policy(0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_upstream_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run("op", Duration::from_secs(1), || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(PlatformError::Upstream("flaky".to_string()))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_upstream_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy(2)
            .run("op", Duration::from_secs(1), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PlatformError::Upstream("down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(PlatformError::Upstream(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_not_retried() {
        for err in [
            PlatformError::Rejected("bad format".to_string()),
            PlatformError::Auth("expired".to_string()),
            PlatformError::NotFound("gone".to_string()),
        ] {
            let calls = AtomicU32::new(0);
            let kind = err.kind();
            let mut err = Some(err);
            let result: Result<(), _> = policy(5)
                .run("op", Duration::from_secs(1), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let e = err.take().unwrap_or(PlatformError::Internal("again".into()));
                    async move { Err(e) }
                })
                .await;

            assert_eq!(result.unwrap_err().kind(), kind);
            assert_eq!(calls.load(Ordering::SeqCst), 1, "{} retried", kind);
        }
    }

    #[tokio::test]
    async fn test_timeout_is_upstream() {
        let result: Result<(), _> = policy(1)
            .run("slow_op", Duration::from_millis(10), || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, PlatformError::Upstream(_)));
        assert!(err.to_string().contains("slow_op timed out"));
    }
}
