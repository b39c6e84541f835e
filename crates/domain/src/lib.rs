//! # Helio Domain
//!
//! Domain types shared by every layer of the Helio client:
//! - [`ResponseEnvelope`] and its supporting value types
//! - [`HelioError`], the closed error taxonomy, and the [`Result`] alias
//!
//! This crate has no I/O and no async code; it only defines the vocabulary
//! the execution core and the route layers speak.

pub mod envelope;
pub mod errors;

pub use envelope::{CallContext, Payload, RequestMetadata, ResponseEnvelope};
pub use errors::{ErrorKind, HelioError, PageStage, Result};
