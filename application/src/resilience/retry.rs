//! Exponential backoff for rate-limited generation calls.

use crate::ports::generator::GenerationError;
use crate::ports::progress::ConversationNotifier;
use roundtable_domain::RetryPolicy;
use std::future::Future;
use tracing::warn;

/// Retries an operation while it fails with a rate-limit signal.
///
/// Every other error propagates on the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation`, retrying up to `max_retries` times on rate limits.
    ///
    /// Retry N waits `initial_delay * multiplier^(N-1)`, or longer if the
    /// provider asked for it. After the last retry the rate-limit error is
    /// returned unchanged.
    pub async fn execute<T, F, Fut>(
        &self,
        label: &str,
        progress: &dyn ConversationNotifier,
        mut operation: F,
    ) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_rate_limited() => err,
                Err(err) => return Err(err),
            };

            if attempt >= self.policy.max_retries {
                warn!(
                    operation = label,
                    retries = self.policy.max_retries,
                    "Giving up after repeated rate limiting"
                );
                return Err(err);
            }

            let mut wait = self.policy.delay_for(attempt);
            if let Some(hint) = err.retry_after() {
                wait = wait.max(hint);
            }
            attempt += 1;

            warn!(
                operation = label,
                attempt,
                max_retries = self.policy.max_retries,
                wait_secs = wait.as_secs_f64(),
                "Rate limit hit, retrying"
            );
            progress.on_retry(label, attempt, self.policy.max_retries, wait);
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingProgress {
        waits: Mutex<Vec<(u32, Duration)>>,
    }

    impl ConversationNotifier for RecordingProgress {
        fn on_retry(&self, _label: &str, attempt: u32, _max: u32, wait: Duration) {
            self.waits.lock().unwrap().push((attempt, wait));
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            initial_delay_seconds: 1.0,
            max_retries,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let executor = RetryExecutor::new(policy(3));
        let progress = RecordingProgress::default();
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), _> = executor
            .execute("test", &progress, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GenerationError::RateLimited { retry_after: None }) }
            })
            .await;

        assert!(matches!(result, Err(GenerationError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            *progress.waits.lock().unwrap(),
            vec![
                (1, Duration::from_secs(1)),
                (2, Duration::from_secs(2)),
                (3, Duration::from_secs(4)),
            ]
        );
        assert!(start.elapsed() >= Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_rate_limits() {
        let executor = RetryExecutor::new(policy(5));
        let calls = AtomicU32::new(0);

        let result = executor
            .execute("test", &RecordingProgress::default(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(GenerationError::RequestFailed("429 Too Many Requests".to_string()))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_rate_limit_error_propagates_immediately() {
        let executor = RetryExecutor::new(policy(5));
        let progress = RecordingProgress::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = executor
            .execute("test", &progress, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GenerationError::Timeout) }
            })
            .await;

        assert!(matches!(result, Err(GenerationError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(progress.waits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_extends_wait() {
        let executor = RetryExecutor::new(policy(1));
        let progress = RecordingProgress::default();
        let calls = AtomicU32::new(0);

        let _ = executor
            .execute("test", &progress, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(GenerationError::RateLimited {
                            retry_after: Some(Duration::from_secs(9)),
                        })
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert_eq!(
            *progress.waits.lock().unwrap(),
            vec![(1, Duration::from_secs(9))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_calls_once() {
        let executor = RetryExecutor::new(RetryPolicy::no_retry());
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = executor
            .execute("test", &RecordingProgress::default(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GenerationError::RateLimited { retry_after: None }) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
