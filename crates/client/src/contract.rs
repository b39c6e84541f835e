//! Envelope contract enforcement.
//!
//! The compiler already guarantees route callables return a
//! [`ResponseEnvelope`]; what it cannot guarantee is that the envelope is
//! well formed. Values assembled through the loose
//! [`ResponseEnvelope::from_parts`] path (legacy and dynamic adapters) can
//! carry a success flag that disagrees with the status, or a status outside
//! the HTTP range. This gate fails fast on such values before any shared
//! machinery (pagination, retry, fan-out) or caller-side processing touches
//! them; a malformed value is never coerced.

use std::future::Future;

use helio_domain::{HelioError, ResponseEnvelope, Result};
use tracing::warn;

/// Validate envelope well-formedness, failing with a contract violation.
pub fn enforce(caller_label: &str, envelope: &ResponseEnvelope) -> Result<()> {
    if !(100..=599).contains(&envelope.status) {
        return violation(
            caller_label,
            format!("status {} is outside the HTTP range", envelope.status),
        );
    }
    let ok = ResponseEnvelope::status_is_ok(envelope.status);
    if envelope.success != ok {
        return violation(
            caller_label,
            format!(
                "success flag {} disagrees with status {}",
                envelope.success, envelope.status
            ),
        );
    }
    Ok(())
}

/// Await an envelope-producing operation and apply [`enforce`] to its result
/// before the caller sees it.
pub async fn enforced<F>(caller_label: &str, operation: F) -> Result<ResponseEnvelope>
where
    F: Future<Output = Result<ResponseEnvelope>>,
{
    let envelope = operation.await?;
    enforce(caller_label, &envelope)?;
    Ok(envelope)
}

fn violation(caller_label: &str, reason: String) -> Result<()> {
    warn!(caller = caller_label, %reason, "envelope contract violation");
    Err(HelioError::ContractViolation { caller_label: caller_label.to_string(), reason })
}
