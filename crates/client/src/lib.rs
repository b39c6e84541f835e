//! # Helio Client
//!
//! Request-execution core for the Helio analytics platform REST API.
//!
//! This crate contains the one subsystem every route function is built on:
//! - [`RequestExecutor`] — a single HTTP call with response classification
//! - [`paginate`] — the generic offset/limit pagination loop
//! - [`with_retry`] — bounded retry over any envelope-producing operation
//! - [`contract`] — the fail-fast "always return a well-formed envelope" gate
//!
//! Bounded fan-out lives in `helio-common` ([`helio_common::gather_bounded`])
//! and is re-exported here for route-layer convenience. The per-entity route
//! builders, entity types, and credential loading are out of scope; they sit
//! on top of this crate.

pub mod auth;
pub mod contract;
mod conversions;
pub mod executor;
pub mod http;
pub mod pagination;
pub mod retry;

pub use auth::{AuthProvider, BearerTokenAuth, DeveloperTokenAuth, NoAuth};
pub use contract::{enforce, enforced};
pub use executor::{RequestExecutor, RequestSpec};
pub use helio_common::{gather_bounded, gather_bounded_results};
pub use http::{HttpSession, SessionConfig};
pub use pagination::{paginate, BodyTransform, OffsetStrategy, PageRequest, PaginateConfig};
pub use retry::{with_retry, RetryableKinds};
