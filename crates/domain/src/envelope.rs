//! The normalized result of a single network call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a response, shaped by the negotiated content type.
///
/// The shape is never normalized across endpoints; whatever the server sent
/// is what the caller gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Payload {
    /// Parsed JSON document.
    Json(Value),
    /// Plain text (also the fallback when a JSON body fails to parse).
    Text(String),
    /// Raw bytes from the streaming variant.
    Bytes(Vec<u8>),
}

impl Payload {
    /// The JSON document, when this payload is JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text body, when this payload is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Echo of the request that produced an envelope, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// Final request URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Headers as sent, auth fragment included.
    pub headers: BTreeMap<String, String>,
    /// JSON body, when one was sent.
    pub body: Option<Value>,
    /// Query parameters, when any were sent.
    pub params: BTreeMap<String, String>,
}

/// Explicit caller context threaded through the execution core by value.
///
/// Replaces any notion of walking stack frames to find out who asked for a
/// call: the route layer states its identity up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Name of the route function on whose behalf the call runs.
    pub caller_label: String,
    /// Source location of the route function, when known.
    pub call_site: Option<String>,
}

impl CallContext {
    /// Context for a named route function.
    pub fn labeled(caller_label: impl Into<String>) -> Self {
        Self { caller_label: caller_label.into(), call_site: None }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, call_site: impl Into<String>) -> Self {
        self.call_site = Some(call_site.into());
        self
    }
}

/// Normalized result of one physical network call.
///
/// One envelope is created per call by the request executor. The pagination
/// loop never mutates intermediate envelopes; it only replaces the payload
/// of the final envelope it returns with the accumulated record array.
/// Envelopes are value objects owned by whichever call produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Transport status code.
    pub status: u16,
    /// Response body in its negotiated shape.
    pub payload: Payload,
    /// True iff the status was in [200, 400) and the body was not a
    /// network-policy block page.
    pub success: bool,
    /// Echo of the request that produced this envelope.
    pub request_metadata: RequestMetadata,
    /// Who asked for the call.
    pub diagnostic: CallContext,
}

impl ResponseEnvelope {
    /// Whether a transport status counts as ok before block-page screening.
    pub fn status_is_ok(status: u16) -> bool {
        (200..400).contains(&status)
    }

    /// Assemble an envelope from already-classified parts.
    ///
    /// This is the loose construction path used by adapters that bridge
    /// dynamic values into the core; it performs no validation. Pass the
    /// result through the contract gate before handing it to shared
    /// machinery.
    pub fn from_parts(
        status: u16,
        payload: Payload,
        success: bool,
        request_metadata: RequestMetadata,
        diagnostic: CallContext,
    ) -> Self {
        Self { status, payload, success, request_metadata, diagnostic }
    }

    /// Replace the payload, consuming the envelope.
    ///
    /// Used by the pagination loop to install the accumulated record array
    /// on the final envelope.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_ok_range_is_half_open() {
        assert!(!ResponseEnvelope::status_is_ok(199));
        assert!(ResponseEnvelope::status_is_ok(200));
        assert!(ResponseEnvelope::status_is_ok(302));
        assert!(ResponseEnvelope::status_is_ok(399));
        assert!(!ResponseEnvelope::status_is_ok(400));
        assert!(!ResponseEnvelope::status_is_ok(503));
    }

    #[test]
    fn with_payload_only_touches_the_payload() {
        let envelope = ResponseEnvelope::from_parts(
            200,
            Payload::Json(json!({"page": 3})),
            true,
            RequestMetadata { url: "https://api.helio.example/v1/users".into(), ..Default::default() },
            CallContext::labeled("list_users"),
        );
        let replaced = envelope.clone().with_payload(Payload::Json(json!([1, 2, 3])));
        assert_eq!(replaced.status, envelope.status);
        assert_eq!(replaced.request_metadata, envelope.request_metadata);
        assert_eq!(replaced.payload, Payload::Json(json!([1, 2, 3])));
    }
}
