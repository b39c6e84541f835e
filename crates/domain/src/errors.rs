//! Error types used throughout the Helio client.
//!
//! Every failure mode is a closed variant with a fixed field set; callers
//! match on [`ErrorKind`] when they only care about the category (retry
//! classification does exactly that).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pagination stage in which a caller-supplied closure failed.
///
/// Distinguishes request-construction bugs from response-parsing bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageStage {
    /// The body transform applied before the page request was sent.
    BodyTransform,
    /// The record-extraction function applied to a page response.
    RecordExtraction,
}

impl std::fmt::Display for PageStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BodyTransform => write!(f, "body transform"),
            Self::RecordExtraction => write!(f, "record extraction"),
        }
    }
}

/// Main error type for the Helio client core.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HelioError {
    /// Transport-level failure: connection refused, DNS, TLS handshake.
    #[error("Network error: {message}")]
    Network {
        /// Human-readable transport failure description.
        message: String,
    },

    /// Connect or read timeout. The only variant with a fixed retry backoff.
    #[error("Connect timeout for {url}")]
    ConnectTimeout {
        /// URL the timed-out request targeted.
        url: String,
    },

    /// The response body is an intermediary's network-policy block page.
    ///
    /// Raised even when the transport status is 2xx; block detection takes
    /// priority over normal success classification.
    #[error("Request blocked by network policy (status {status}, ip {ip_address:?})")]
    NetworkPolicyBlock {
        /// First IPv4 token found inside the block page, when present.
        ip_address: Option<String>,
        /// Transport status the block page arrived with.
        status: u16,
        /// URL whose response carried the block page.
        url: String,
    },

    /// A caller-supplied closure failed during pagination.
    #[error("Pagination error while processing {stage} for {caller_label}: {detail}")]
    Pagination {
        /// Which pagination stage failed.
        stage: PageStage,
        /// Label of the route function driving the loop.
        caller_label: String,
        /// Underlying failure description.
        detail: String,
    },

    /// A decorated callable broke the envelope contract.
    #[error("Contract violation in {caller_label}: {reason}")]
    ContractViolation {
        /// Label of the callable that produced the bad value.
        caller_label: String,
        /// What was wrong with the returned value.
        reason: String,
    },

    /// Authentication material could not be produced or applied.
    #[error("Authentication error: {message}")]
    Auth {
        /// Failure description.
        message: String,
    },

    /// Invalid client or request configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Failure description.
        message: String,
    },

    /// Malformed caller input (bad URL, unserializable body).
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Failure description.
        message: String,
    },

    /// Invariant breakage inside the client itself.
    #[error("Internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

/// Field-less discriminant for [`HelioError`], used for retry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// [`HelioError::Network`]
    Network,
    /// [`HelioError::ConnectTimeout`]
    ConnectTimeout,
    /// [`HelioError::NetworkPolicyBlock`]
    NetworkPolicyBlock,
    /// [`HelioError::Pagination`]
    Pagination,
    /// [`HelioError::ContractViolation`]
    ContractViolation,
    /// [`HelioError::Auth`]
    Auth,
    /// [`HelioError::Config`]
    Config,
    /// [`HelioError::InvalidInput`]
    InvalidInput,
    /// [`HelioError::Internal`]
    Internal,
}

impl HelioError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::ConnectTimeout { .. } => ErrorKind::ConnectTimeout,
            Self::NetworkPolicyBlock { .. } => ErrorKind::NetworkPolicyBlock,
            Self::Pagination { .. } => ErrorKind::Pagination,
            Self::ContractViolation { .. } => ErrorKind::ContractViolation,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Config { .. } => ErrorKind::Config,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Fixed backoff a connect timeout asks for before the next attempt.
    ///
    /// Only connect timeouts carry one; every other retryable failure is
    /// retried immediately. The asymmetry is deliberate and documented in
    /// the retry test suite.
    pub fn backoff_hint(&self) -> Option<Duration> {
        match self {
            Self::ConnectTimeout { .. } => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for Helio client operations.
pub type Result<T> = std::result::Result<T, HelioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_variants() {
        let err = HelioError::NetworkPolicyBlock {
            ip_address: Some("10.0.0.5".into()),
            status: 403,
            url: "https://api.helio.example/v1/users".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NetworkPolicyBlock);
        assert!(err.backoff_hint().is_none());
    }

    #[test]
    fn connect_timeout_carries_fixed_backoff() {
        let err = HelioError::ConnectTimeout { url: "https://api.helio.example".into() };
        assert_eq!(err.backoff_hint(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn pagination_errors_name_their_stage() {
        let construct = HelioError::Pagination {
            stage: PageStage::BodyTransform,
            caller_label: "list_datasets".into(),
            detail: "missing filter key".into(),
        };
        let parse = HelioError::Pagination {
            stage: PageStage::RecordExtraction,
            caller_label: "list_datasets".into(),
            detail: "expected array".into(),
        };
        assert!(construct.to_string().contains("body transform"));
        assert!(parse.to_string().contains("record extraction"));
    }
}
