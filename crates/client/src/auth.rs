//! Authentication seam.
//!
//! The executor has no auth-scheme knowledge; an [`AuthProvider`] supplies a
//! header fragment and the executor merges it last, so auth headers win over
//! defaults and caller overrides. Route layers bring their own providers;
//! the ones here cover the platform's common schemes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use helio_domain::Result;

/// Supplies the authentication header fragment for outgoing requests.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Headers to merge into the outgoing request.
    ///
    /// Called once per physical request, so token-caching providers can
    /// hand out a fresh value on retried attempts.
    async fn auth_headers(&self) -> Result<BTreeMap<String, String>>;
}

/// No authentication; for public endpoints and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl AuthProvider for NoAuth {
    async fn auth_headers(&self) -> Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }
}

/// OAuth-style bearer token.
#[derive(Clone)]
pub struct BearerTokenAuth {
    token: String,
}

impl BearerTokenAuth {
    /// Provider that sends `Authorization: Bearer <token>`.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AuthProvider for BearerTokenAuth {
    async fn auth_headers(&self) -> Result<BTreeMap<String, String>> {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", self.token));
        Ok(headers)
    }
}

/// Service-account developer token, the platform's non-interactive scheme.
#[derive(Clone)]
pub struct DeveloperTokenAuth {
    token: String,
}

impl DeveloperTokenAuth {
    /// Provider that sends `X-Helio-Developer-Token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AuthProvider for DeveloperTokenAuth {
    async fn auth_headers(&self) -> Result<BTreeMap<String, String>> {
        let mut headers = BTreeMap::new();
        headers.insert("X-Helio-Developer-Token".to_string(), self.token.clone());
        Ok(headers)
    }
}
