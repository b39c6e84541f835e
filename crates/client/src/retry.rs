//! Retry classification for Helio errors.
//!
//! The generic attempt loop lives in `helio-common`; this module supplies
//! the classifier that knows the Helio taxonomy and the `with_retry`
//! convenience every route layer reaches for.
//!
//! Backoff is deliberately asymmetric: connect timeouts wait a fixed two
//! seconds, every other retryable failure retries immediately. See the
//! `backoff_asymmetry_is_preserved` test.

use std::future::Future;

use helio_common::{Retry, RetryClassifier, RetryDecision};
use helio_domain::{ErrorKind, HelioError, Result};

/// Classifier over the closed Helio error taxonomy.
///
/// An empty kind set means every error is retryable; otherwise only the
/// listed kinds are. Connect timeouts are always retryable and carry their
/// fixed backoff regardless of the set.
#[derive(Debug, Clone, Default)]
pub struct RetryableKinds {
    kinds: Vec<ErrorKind>,
}

impl RetryableKinds {
    /// Retry only the listed kinds.
    pub fn only(kinds: impl Into<Vec<ErrorKind>>) -> Self {
        Self { kinds: kinds.into() }
    }

    /// Retry any error.
    pub fn any() -> Self {
        Self { kinds: Vec::new() }
    }
}

impl RetryClassifier<HelioError> for RetryableKinds {
    fn classify(&self, error: &HelioError, _attempt: u32) -> RetryDecision {
        if let Some(delay) = error.backoff_hint() {
            return RetryDecision::RetryAfter(delay);
        }
        if self.kinds.is_empty() || self.kinds.contains(&error.kind()) {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// Run `operation` with up to `max_retry` total attempts.
///
/// `retryable` empty retries everything; otherwise only the listed kinds.
pub async fn with_retry<T, F, Fut>(
    max_retry: u32,
    retryable: &[ErrorKind],
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let policy = RetryableKinds::only(retryable.to_vec());
    Retry::new(max_retry).run(&policy, operation).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn network_error() -> HelioError {
        HelioError::Network { message: "connection reset".into() }
    }

    fn connect_timeout() -> HelioError {
        HelioError::ConnectTimeout { url: "https://api.helio.example".into() }
    }

    #[tokio::test]
    async fn succeeds_after_retryable_failures_in_exactly_n_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = with_retry(3, &[], move || {
            let calls = calls_clone.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(network_error())
                } else {
                    Ok(42u64)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_reraise_the_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<u64> = with_retry(2, &[], move || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(network_error())
            }
        })
        .await;

        assert!(matches!(result, Err(HelioError::Network { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_listed_kinds_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<u64> = with_retry(5, &[ErrorKind::Network], move || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(HelioError::Auth { message: "bad token".into() })
            }
        })
        .await;

        assert!(matches!(result, Err(HelioError::Auth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Documented, not corrected: connect timeouts back off a fixed two
    /// seconds while every other retryable failure retries immediately.
    #[tokio::test(start_paused = true)]
    async fn backoff_asymmetry_is_preserved() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let started = tokio::time::Instant::now();

        let result = with_retry(3, &[], move || {
            let calls = calls_clone.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(connect_timeout())
                } else {
                    Ok(42u64)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        // Two connect-timeout failures, one fixed pause each.
        assert_eq!(started.elapsed(), Duration::from_secs(4));

        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let started = tokio::time::Instant::now();

        let result = with_retry(3, &[], move || {
            let calls = calls_clone.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(network_error())
                } else {
                    Ok(7u64)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        // Other retryable failures wait nothing at all.
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn connect_timeouts_retry_even_outside_the_listed_kinds() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = with_retry(2, &[ErrorKind::Auth], move || {
            let calls = calls_clone.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(connect_timeout())
                } else {
                    Ok(1u64)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
