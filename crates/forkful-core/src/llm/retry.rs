//! Retry policy for transient provider failures.
//!
//! A `RetryPolicy` bundles the attempt bound, the backoff schedule and the
//! predicate that decides which errors are worth another attempt. It is built
//! from config and handed to the analyzer, so callers never hard-code a loop.

use crate::config::RetryConfig;
use crate::error::{AnalysisError, ProviderError};
use std::future::Future;
use std::time::Duration;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// `base * 2^retry`, capped at `cap`
    Exponential { base: Duration, cap: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (0 = first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, cap } => {
                let ms = (base.as_millis() as u64).saturating_mul(2u64.saturating_pow(retry));
                Duration::from_millis(ms).min(cap)
            }
        }
    }
}

/// Decides whether a failed attempt should be retried.
pub type RetryPredicate = fn(&ProviderError) -> bool;

/// Bounded retry with a pluggable backoff and retryable-error predicate.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay schedule
    pub backoff: Backoff,
    /// Which errors get another attempt
    pub retryable: RetryPredicate,
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart, transient errors only.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed(Duration::from_secs(1)),
            retryable: ProviderError::is_retryable,
        }
    }
}

fn retry_everything(_: &ProviderError) -> bool {
    true
}

impl RetryPolicy {
    /// Build a policy from the `[retry]` config section.
    pub fn from_config(config: &RetryConfig) -> Self {
        let delay = Duration::from_millis(config.delay_ms);
        let backoff = match config.backoff.as_str() {
            "exponential" => Backoff::Exponential {
                base: delay,
                cap: Duration::from_millis(config.max_delay_ms),
            },
            _ => Backoff::Fixed(delay),
        };
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff,
            retryable: if config.retry_all_errors {
                retry_everything
            } else {
                ProviderError::is_retryable
            },
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Replace the retryable-error predicate.
    pub fn with_predicate(mut self, retryable: RetryPredicate) -> Self {
        self.retryable = retryable;
        self
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt bound is reached.
    ///
    /// `op` receives the 1-based attempt number. A non-retryable error is
    /// returned as `AnalysisError::Provider`; running out of attempts returns
    /// `AnalysisError::RetriesExhausted` with the last error.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, AnalysisError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !(self.retryable)(&e) => {
                    tracing::debug!("Attempt {attempt} failed with non-retryable error: {e}");
                    return Err(AnalysisError::Provider(e));
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::warn!("Giving up after {attempt} attempts: {e}");
                    return Err(AnalysisError::RetriesExhausted {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = self.backoff.delay(attempt - 1);
                    tracing::warn!(
                        "Attempt {attempt}/{max_attempts} failed: {e}. Retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> ProviderError {
        ProviderError::transport("mock", "connection refused")
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Backoff::Fixed(Duration::from_millis(1)),
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed(Duration::from_millis(1000));
        assert_eq!(backoff.delay(0), Duration::from_millis(1000));
        assert_eq!(backoff.delay(5), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_exponential() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(1000),
            cap: Duration::from_millis(30_000),
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(1000));
        assert_eq!(backoff.delay(1), Duration::from_millis(2000));
        assert_eq!(backoff.delay(3), Duration::from_millis(8000));
        assert_eq!(backoff.delay(10), Duration::from_millis(30_000));
    }

    #[test]
    fn test_from_config() {
        let policy = RetryPolicy::from_config(&RetryConfig::default());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Backoff::Fixed(Duration::from_millis(1000)));
        assert!(!(policy.retryable)(&ProviderError::from_status("x", 401, "")));

        let config = RetryConfig {
            backoff: "exponential".to_string(),
            retry_all_errors: true,
            ..RetryConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert!(matches!(policy.backoff, Backoff::Exponential { .. }));
        assert!((policy.retryable)(&ProviderError::from_status("x", 401, "")));
    }

    #[tokio::test]
    async fn test_succeeds_on_last_allowed_attempt() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(unavailable())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_always_failing_stops_at_bound() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(unavailable()) }
            })
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, AnalysisError::RetriesExhausted { attempts: 3, .. }));
        assert!(err.to_string().contains("3 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProviderError::from_status("mock", 401, "bad key")) }
            })
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AnalysisError::Provider(ProviderError::Unauthenticated { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_all_errors_predicate() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(2)
            .with_predicate(retry_everything)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProviderError::from_status("mock", 400, "bad request")) }
            })
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AnalysisError::RetriesExhausted { attempts: 2, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::no_retry()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(unavailable()) }
            })
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AnalysisError::RetriesExhausted { attempts: 1, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
