//! Typed error hierarchy for the sentinel-ops crate.
//!
//! `SentinelError` is the single error type surfaced by every library
//! operation. Variants map to real system boundaries:
//! - `Auth` covers the Microsoft identity platform token endpoint (missing
//!   tokens, failed grant exchanges).
//! - `Api` covers non-success responses from the Sentinel REST API —
//!   except 404, which is *not* an error in this crate (see `client`).
//! - The four transport variants mirror the distinct transport failure
//!   categories the connector reports: TLS, connection, timeout, and the
//!   generic request failure. Each carries its fixed human-readable label
//!   in the `Display` output.
//! - `Parse` wraps `serde_json::Error` for malformed response bodies.
//! - `Config` covers invalid connector configuration detected before any
//!   network traffic (empty resource host, non-object parameters).

use reqwest::StatusCode;
use std::error::Error as _;

/// Unified error type for all sentinel-ops library operations.
///
/// The `#[source]` attribute on inner errors enables `Error::source()`
/// chaining so callers and logging frameworks can traverse the full cause
/// chain.
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    /// Authentication failure at the Microsoft identity platform.
    ///
    /// Covers:
    /// - A missing `accessToken` when an operation requires one (the
    ///   connector has never been authenticated).
    /// - Non-2xx responses from `/oauth2/v2.0/token`. The message carries
    ///   the provider's `error_description` (AADSTS codes) when available,
    ///   else the HTTP status line.
    /// - A token response that cannot be parsed.
    #[error("authentication failed: {message}")]
    Auth {
        /// Human-readable description of the authentication failure.
        message: String,
        /// The underlying transport or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The Sentinel API returned a non-success HTTP status other than 404.
    ///
    /// The message preserves the provider's `error.message` body field when
    /// the response body parses as JSON, formatted as
    /// `Response [{status}:{reason} Details: {message}]`.
    #[error("{message}")]
    Api {
        /// The HTTP status code returned by the API.
        status: StatusCode,
        /// Pre-formatted status + reason + provider detail message.
        message: String,
    },

    /// A TLS negotiation failure occurred.
    #[error("An SSL error occurred")]
    Ssl(#[source] reqwest::Error),

    /// The connection to the server could not be established.
    #[error("A connection error occurred")]
    Connection(#[source] reqwest::Error),

    /// The request exceeded the transport timeout.
    #[error("The request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Any other transport-level request failure.
    #[error("There was an error while handling the request")]
    Request(#[source] reqwest::Error),

    /// JSON deserialization failed when parsing a response body.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Writing the connector configuration to durable storage failed.
    #[error("failed to persist configuration: {0}")]
    Persist(#[from] std::io::Error),

    /// The connector configuration or operation parameters are invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The dispatched operation name is not in the published operation set.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl SentinelError {
    /// Classifies a `reqwest::Error` into the matching transport variant.
    ///
    /// TLS failures surface from reqwest as connect errors with a
    /// TLS-related cause, so the TLS check runs before `is_connect()`.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SentinelError::Timeout(err)
        } else if is_tls_error(&err) {
            SentinelError::Ssl(err)
        } else if err.is_connect() {
            SentinelError::Connection(err)
        } else {
            SentinelError::Request(err)
        }
    }
}

/// Walks the source chain looking for a TLS-related cause.
///
/// reqwest does not expose a dedicated TLS predicate, so the chain is
/// inspected for the error text emitted by rustls and native-tls.
fn is_tls_error(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = err.source();
    while let Some(cause) = source {
        let text = cause.to_string().to_ascii_lowercase();
        if text.contains("tls") || text.contains("certificate") || text.contains("ssl") {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, SentinelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn auth_error_displays_provider_detail() {
        let err = SentinelError::Auth {
            message: "Response 401: Unauthorized \n Error Message: AADSTS70008".to_string(),
            source: None,
        };
        let msg = err.to_string();
        assert!(
            msg.contains("AADSTS70008"),
            "display should include the provider error code"
        );
        assert!(
            msg.contains("authentication failed"),
            "display should indicate auth failure"
        );
    }

    #[test]
    fn api_error_preserves_formatted_message() {
        let err = SentinelError::Api {
            status: StatusCode::FORBIDDEN,
            message: "Response [403:Forbidden Details: Insufficient permissions]".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"), "display should include status code");
        assert!(
            msg.contains("Insufficient permissions"),
            "display should include provider detail"
        );
    }

    #[test]
    fn auth_error_with_source_chains_correctly() {
        let json_err: serde_json::Error = serde_json::from_str::<String>("not-json").unwrap_err();
        let err = SentinelError::Auth {
            message: "failed to parse token response".to_string(),
            source: Some(Box::new(json_err)),
        };
        assert!(
            err.source().is_some(),
            "Auth error with source should have a chained cause"
        );
    }

    #[test]
    fn unknown_operation_names_the_operation() {
        let err = SentinelError::UnknownOperation("frobnicate_incident".to_string());
        assert!(err.to_string().contains("frobnicate_incident"));
    }

    #[test]
    fn config_error_displays_reason() {
        let err = SentinelError::Config("resource host is empty".to_string());
        assert!(err.to_string().contains("resource host is empty"));
    }

    #[test]
    fn error_is_send_and_sync() {
        // SentinelError must be Send + Sync for use across async task
        // boundaries.
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SentinelError>();
    }
}
