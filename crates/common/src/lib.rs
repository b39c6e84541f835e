//! Common utilities shared across Helio crates.
//!
//! Everything here is generic over the caller's error type; nothing in this
//! crate knows about HTTP or the Helio API surface.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod resilience;

pub use resilience::{
    gather_bounded, gather_bounded_results, ClassifyFn, Retry, RetryClassifier, RetryDecision,
};
