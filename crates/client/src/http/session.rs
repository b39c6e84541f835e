//! Network session wrapper around `reqwest`.
//!
//! A session may be shared across many concurrent calls (the client is
//! stateless); ownership decides teardown. The executor builds a scoped
//! session when the caller supplies none and drops it on every exit path; a
//! caller-supplied session is never torn down by the core.

use std::time::Duration;

use helio_domain::{HelioError, Result};
use reqwest::Client as ReqwestClient;

use crate::conversions::request_error;

/// Configuration for an HTTP session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Default per-request timeout.
    pub timeout: Duration,
    /// Value for the `User-Agent` header.
    pub user_agent: String,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("helio-client/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_tls: true,
        }
    }
}

impl SessionConfig {
    /// Set the default per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Toggle TLS certificate verification.
    #[must_use]
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }
}

/// A pooled HTTP session.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: ReqwestClient,
}

impl HttpSession {
    /// Build a session from configuration.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());

        if !config.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(request_error)?;
        Ok(Self { client })
    }

    /// Session with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&SessionConfig::default())
    }

    /// The underlying pooled client.
    pub(crate) fn client(&self) -> &ReqwestClient {
        &self.client
    }
}

impl TryFrom<SessionConfig> for HttpSession {
    type Error = HelioError;

    fn try_from(config: SessionConfig) -> Result<Self> {
        Self::new(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_verifies_tls() {
        let config = SessionConfig::default();
        assert!(config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_chain_applies_overrides() {
        let config = SessionConfig::default()
            .timeout(Duration::from_secs(5))
            .user_agent("routes-test")
            .verify_tls(false);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "routes-test");
        assert!(HttpSession::new(&config).is_ok());
    }
}
