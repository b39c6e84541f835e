//! Resilience primitives: bounded retry and bounded-concurrency fan-out.

mod concurrency;
mod retry;

pub use concurrency::{gather_bounded, gather_bounded_results};
pub use retry::{ClassifyFn, Retry, RetryClassifier, RetryDecision};
