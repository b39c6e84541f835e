//! Single-call request execution and response classification.
//!
//! One [`RequestExecutor::execute`] call produces exactly one
//! [`ResponseEnvelope`]. HTTP-level failures (4xx/5xx) are normal returns
//! with `success = false`; only transport failures, block pages, and
//! malformed input surface as errors. Raw transport errors never leak past
//! this module for ordinary HTTP failures.

use std::collections::BTreeMap;
use std::time::Duration;

use helio_domain::{CallContext, HelioError, Payload, RequestMetadata, ResponseEnvelope, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::auth::AuthProvider;
use crate::conversions::transport_error;
use crate::http::{HttpSession, SessionConfig};

/// Marker string an intermediary's block page carries in its body.
pub const BLOCK_PAGE_MARKER: &str = "blocked by your organization's network policy";

static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    let pattern = Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("static pattern compiles");
    pattern
});

/// Everything describing one outgoing request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Caller header overrides, merged over the defaults.
    pub headers: BTreeMap<String, String>,
    /// JSON body, when one is sent.
    pub body: Option<Value>,
    /// Query parameters.
    pub params: BTreeMap<String, String>,
    /// Per-call timeout override; the session default applies otherwise.
    pub timeout: Option<Duration>,
    /// TLS verification for a scoped session. Ignored when the executor was
    /// handed a session, whose TLS settings are already fixed.
    pub verify_tls: bool,
}

impl RequestSpec {
    /// A spec with default headers, no body, and no parameters.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            params: BTreeMap::new(),
            timeout: None,
            verify_tls: true,
        }
    }

    /// Add a header override.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace the query parameters wholesale.
    #[must_use]
    pub fn params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Set a per-call timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Toggle TLS verification for a scoped session.
    #[must_use]
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }
}

/// Performs one HTTP call and classifies the raw transport response.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    session: Option<HttpSession>,
}

impl RequestExecutor {
    /// Executor that builds a scoped session for every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor over a caller-owned session. The session is shared, never
    /// torn down here.
    pub fn with_session(session: HttpSession) -> Self {
        Self { session: Some(session) }
    }

    /// Execute one request, negotiating JSON or text from the content type.
    #[instrument(skip_all, fields(method = %spec.method, url = %spec.url, caller = %ctx.caller_label))]
    pub async fn execute(
        &self,
        spec: RequestSpec,
        auth: &dyn AuthProvider,
        ctx: CallContext,
    ) -> Result<ResponseEnvelope> {
        self.run(spec, auth, ctx, false).await
    }

    /// Streaming variant: the payload is the raw response bytes.
    #[instrument(skip_all, fields(method = %spec.method, url = %spec.url, caller = %ctx.caller_label))]
    pub async fn execute_raw(
        &self,
        spec: RequestSpec,
        auth: &dyn AuthProvider,
        ctx: CallContext,
    ) -> Result<ResponseEnvelope> {
        self.run(spec, auth, ctx, true).await
    }

    async fn run(
        &self,
        spec: RequestSpec,
        auth: &dyn AuthProvider,
        ctx: CallContext,
        raw: bool,
    ) -> Result<ResponseEnvelope> {
        let headers = assemble_headers(&spec, auth).await?;

        let response = match &self.session {
            Some(session) => send(session, &spec, &headers).await?,
            None => {
                // Scoped session: built here, dropped on every exit path.
                let config = SessionConfig::default().verify_tls(spec.verify_tls);
                let session = HttpSession::new(&config)?;
                send(&session, &spec, &headers).await?
            }
        };

        classify(response, spec, headers, ctx, raw).await
    }
}

/// Defaults, then caller overrides, then the auth fragment. Auth wins.
async fn assemble_headers(
    spec: &RequestSpec,
    auth: &dyn AuthProvider,
) -> Result<BTreeMap<String, String>> {
    let mut headers = BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Connection".to_string(), "keep-alive".to_string()),
        ("Accept".to_string(), "application/json, text/plain, */*".to_string()),
    ]);
    headers.extend(spec.headers.clone());
    headers.extend(auth.auth_headers().await?);
    Ok(headers)
}

async fn send(
    session: &HttpSession,
    spec: &RequestSpec,
    headers: &BTreeMap<String, String>,
) -> Result<reqwest::Response> {
    let mut header_map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str()).map_err(|err| {
            HelioError::InvalidInput { message: format!("invalid header name {name:?}: {err}") }
        })?;
        let value = HeaderValue::try_from(value.as_str()).map_err(|err| {
            HelioError::InvalidInput { message: format!("invalid header value for {name}: {err}") }
        })?;
        header_map.insert(name, value);
    }

    let mut request = session
        .client()
        .request(spec.method.clone(), &spec.url)
        .headers(header_map);
    if !spec.params.is_empty() {
        request = request.query(&spec.params);
    }
    if let Some(body) = &spec.body {
        request = request.json(body);
    }
    if let Some(timeout) = spec.timeout {
        request = request.timeout(timeout);
    }

    debug!("sending request");
    request.send().await.map_err(|err| transport_error(err, &spec.url))
}

async fn classify(
    response: reqwest::Response,
    spec: RequestSpec,
    sent_headers: BTreeMap<String, String>,
    ctx: CallContext,
    raw: bool,
) -> Result<ResponseEnvelope> {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("").to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let url = spec.url.clone();
    let bytes = response.bytes().await.map_err(|err| transport_error(err, &url))?;
    let text_view = String::from_utf8_lossy(&bytes);

    // Block detection outranks success classification, whatever the status.
    if let Some(ip_address) = detect_block_page(&text_view) {
        return Err(HelioError::NetworkPolicyBlock {
            ip_address,
            status: status.as_u16(),
            url,
        });
    }

    let ok = ResponseEnvelope::status_is_ok(status.as_u16());
    debug!(status = status.as_u16(), ok, "classified response");

    let payload = if raw {
        Payload::Bytes(bytes.to_vec())
    } else if !ok {
        Payload::Text(reason)
    } else if is_json(&content_type) {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Payload::Json(value),
            // Unparseable JSON falls back to the raw text, never an error.
            Err(_) => Payload::Text(text_view.into_owned()),
        }
    } else {
        Payload::Text(text_view.into_owned())
    };

    Ok(ResponseEnvelope {
        status: status.as_u16(),
        payload,
        success: ok,
        request_metadata: RequestMetadata {
            url: spec.url,
            method: spec.method.to_string(),
            headers: sent_headers,
            body: spec.body,
            params: spec.params,
        },
        diagnostic: ctx,
    })
}

fn is_json(content_type: &str) -> bool {
    content_type.contains("application/json") || content_type.contains("+json")
}

/// `Some(ip)` when the body is a block page. The IP is the first
/// IPv4-looking token inside the marker's container element, falling back to
/// anywhere in the body; a block page without one is still a block.
fn detect_block_page(body: &str) -> Option<Option<String>> {
    let idx = body.find(BLOCK_PAGE_MARKER)?;
    let tail = &body[idx..];
    let container = tail.split("</").next().unwrap_or(tail);
    let ip = IPV4_RE
        .find(container)
        .or_else(|| IPV4_RE.find(tail))
        .or_else(|| IPV4_RE.find(body))
        .map(|m| m.as_str().to_string());
    Some(ip)
}
