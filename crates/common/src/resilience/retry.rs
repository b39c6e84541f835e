//! Generic bounded-retry engine.
//!
//! The engine owns the attempt loop; a [`RetryClassifier`] owns the decision
//! of whether a given failure is worth another attempt and with what delay.
//! On a non-retryable failure or on exhaustion the original error is
//! returned unchanged, so callers see exactly what the operation produced.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Decision for whether to retry a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry immediately.
    Retry,
    /// Retry after the given delay.
    RetryAfter(Duration),
    /// Give up and return the error to the caller.
    Stop,
}

/// Determines whether an error should be retried.
pub trait RetryClassifier<E> {
    /// Classify the error observed on the given attempt (1-based).
    fn classify(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Adapter turning a closure into a classifier; handy for one-off call sites.
pub struct ClassifyFn<F>(pub F);

impl<E, F> RetryClassifier<E> for ClassifyFn<F>
where
    F: Fn(&E, u32) -> RetryDecision,
{
    fn classify(&self, error: &E, attempt: u32) -> RetryDecision {
        (self.0)(error, attempt)
    }
}

/// Bounded-retry executor.
///
/// `max_retry` is the total number of attempts, the initial try included.
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    max_retry: u32,
}

impl Retry {
    /// Create an executor allowing `max_retry` total attempts (minimum 1).
    pub fn new(max_retry: u32) -> Self {
        Self { max_retry: max_retry.max(1) }
    }

    /// Run the operation until it succeeds, the classifier stops the loop,
    /// or attempts are exhausted.
    pub async fn run<T, E, P, F, Fut>(&self, policy: &P, mut operation: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        P: RetryClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1u32;
        loop {
            match operation().await {
                Ok(value) => {
                    debug!(attempt, "operation succeeded");
                    return Ok(value);
                }
                Err(error) => {
                    if attempt >= self.max_retry {
                        warn!(attempt, error = %error, "retries exhausted");
                        return Err(error);
                    }
                    match policy.classify(&error, attempt) {
                        RetryDecision::Stop => {
                            debug!(attempt, error = %error, "error not retryable");
                            return Err(error);
                        }
                        RetryDecision::Retry => {
                            debug!(attempt, error = %error, "retrying immediately");
                        }
                        RetryDecision::RetryAfter(delay) => {
                            debug!(attempt, error = %error, ?delay, "retrying after backoff");
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                        }
                    }
                    attempt += 1;
                }
            }
        }
    }
}
