//! Conversions from transport errors into the domain taxonomy.
//!
//! Kept on the client side so `helio-domain` never learns about `reqwest`.

use helio_domain::HelioError;

/// Map a transport failure, attributing timeouts to the dedicated
/// connect-timeout variant so retry classification can give them their
/// fixed backoff. A plain connection refusal is an ordinary network error
/// and retries immediately.
pub(crate) fn transport_error(err: reqwest::Error, url: &str) -> HelioError {
    if err.is_timeout() {
        return HelioError::ConnectTimeout { url: url.to_string() };
    }
    if err.is_builder() {
        return HelioError::InvalidInput { message: err.to_string() };
    }
    HelioError::Network { message: err.to_string() }
}

/// Map a failure from request assembly, before any URL is known.
pub(crate) fn request_error(err: reqwest::Error) -> HelioError {
    if err.is_builder() {
        return HelioError::InvalidInput { message: err.to_string() };
    }
    HelioError::Internal { message: err.to_string() }
}
