//! Authenticated HTTP client for the Microsoft Sentinel SecurityInsights API.
//!
//! `SentinelClient` wraps a `reqwest::Client`, the token manager, and the
//! host-owned connector configuration behind a `Mutex`. Every operation
//! handler funnels through [`SentinelClient::request`], which:
//!
//! 1. obtains a valid bearer credential via the token manager's
//!    validate-or-refresh (refreshing and persisting under the
//!    configuration lock, so concurrent calls on an expired token perform
//!    a single refresh exchange rather than racing);
//! 2. attaches the `Authorization`, `Content-Type: application/json`, and
//!    `consistencylevel: eventual` headers (the provider requires the
//!    latter for cross-partition queries) plus the fixed API version;
//! 3. classifies the response — see [`ApiResponse`]. A 404 is returned to
//!    the caller as a value, never as an error: callers checking "does
//!    not exist" rely on this.

use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::error;

use crate::auth::Authenticator;
use crate::config::{ConfigStore, ConnectorConfig, ConnectorInfo};
use crate::error::{Result, SentinelError};
use crate::paths::API_VERSION;

/// Connect timeout for resource API calls. Covers TCP + TLS handshake.
const API_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall round-trip timeout for resource API calls. Sentinel responses
/// are JSON documents, not bulk downloads; two minutes covers slow
/// cross-partition queries.
const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of a resource API call, classified by status code.
#[derive(Debug)]
pub enum ApiResponse {
    /// 2xx with a JSON body.
    Json(Value),
    /// 2xx with an empty body (deletes and some accepts).
    Success,
    /// 404 — handed back to the caller as a value, never an error.
    NotFound {
        /// The HTTP status code (always 404 today).
        status: u16,
        /// Parsed response body, or the raw text as a JSON string.
        body: Value,
    },
}

impl ApiResponse {
    /// Collapses the response into the JSON value handed to the host:
    /// parsed body, boolean success sentinel, or the raw not-found object.
    pub fn into_value(self) -> Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::Success => Value::Bool(true),
            ApiResponse::NotFound { status, body } => serde_json::json!({
                "status_code": status,
                "response": body,
            }),
        }
    }

    /// For list endpoints: unwraps the provider's `value` array from a
    /// JSON body; other outcomes collapse as [`ApiResponse::into_value`].
    pub fn into_value_array(self) -> Value {
        match self {
            ApiResponse::Json(value) => value.get("value").cloned().unwrap_or(Value::Null),
            other => other.into_value(),
        }
    }
}

/// Authenticated client bound to one connector configuration.
///
/// The configuration sits behind a `tokio::sync::Mutex` because the token
/// manager needs `&mut` access to merge refreshed credentials while
/// handlers only need to read it. The lock is held across the
/// expiry-check → refresh → persist sequence, which serializes refreshes
/// per configuration; it is released before the resource API round-trip.
pub struct SentinelClient {
    http: reqwest::Client,
    host: String,
    auth: Authenticator,
    config: Mutex<ConnectorConfig>,
    info: ConnectorInfo,
    store: Arc<dyn ConfigStore>,
}

impl SentinelClient {
    /// Builds a client for the given configuration against the public
    /// cloud endpoints. Fails when the configured resource host is empty.
    pub fn new(
        config: ConnectorConfig,
        info: ConnectorInfo,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self> {
        let auth = Authenticator::new(&config)?;
        let host = auth.host().to_string();
        Self::build(config, info, store, auth, host)
    }

    /// Constructor that accepts explicit resource and authority base URLs,
    /// bypassing host normalization. Used by tests to point both the
    /// resource API and the token endpoint at local mock servers.
    pub fn with_endpoints(
        config: ConnectorConfig,
        info: ConnectorInfo,
        store: Arc<dyn ConfigStore>,
        api_base: &str,
        authority: &str,
    ) -> Result<Self> {
        let auth = Authenticator::with_authority(&config, authority)?;
        Self::build(config, info, store, auth, api_base.to_string())
    }

    fn build(
        config: ConnectorConfig,
        info: ConnectorInfo,
        store: Arc<dyn ConfigStore>,
        auth: Authenticator,
        host: String,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(API_CONNECT_TIMEOUT)
            .timeout(API_REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(SentinelError::Request)?;

        Ok(SentinelClient {
            http,
            host,
            auth,
            config: Mutex::new(config),
            info,
            store,
        })
    }

    /// A point-in-time copy of the connector configuration, including any
    /// token fields merged by refreshes since construction.
    pub async fn config_snapshot(&self) -> ConnectorConfig {
        self.config.lock().await.clone()
    }

    /// Health check: with no stored token, performs the one-time
    /// authorization-code exchange and persists the result; with a stored
    /// token, delegates to validate-or-refresh. Returns `true` when the
    /// configured credentials work.
    pub async fn check(&self) -> Result<bool> {
        let mut config = self.config.lock().await;
        if !config.has_token() {
            let code = config.code.clone().ok_or_else(|| SentinelError::Auth {
                message: "authorization code missing from configuration".to_string(),
                source: None,
            })?;
            let state = self.auth.acquire_token(&code).await?;
            crate::auth::apply_token(&mut config, state);
            let config_id = config.config_id.clone();
            self.store
                .update_connector_config(&self.info, &config, &config_id)
                .await?;
        } else {
            self.auth
                .validate_token(&mut config, &self.info, self.store.as_ref())
                .await?;
        }
        Ok(true)
    }

    /// Shared request helper used by every operation handler.
    ///
    /// `path` is relative to the resource host and starts with `/`.
    /// `query` pairs are appended after the fixed `api-version`; `body`
    /// is serialized as JSON when present.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        // Obtain (and, when expired, refresh + persist) the bearer
        // credential under the configuration lock, then release it before
        // the resource round-trip.
        let bearer = {
            let mut config = self.config.lock().await;
            self.auth
                .validate_token(&mut config, &self.info, self.store.as_ref())
                .await?
        };

        let url = format!("{}{}", self.host, path);
        let mut request = self
            .http
            .request(method, &url)
            .header("Authorization", bearer)
            .header("Content-Type", "application/json")
            .header("consistencylevel", "eventual")
            .query(&[("api-version", API_VERSION)]);
        if let Some(pairs) = query {
            request = request.query(pairs);
        }
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|err| {
            let classified = SentinelError::from_transport(err);
            error!(error = %classified, "transport failure");
            classified
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(SentinelError::from_transport)?;

        match status.as_u16() {
            200 | 201 | 202 | 204 => {
                if text.is_empty() {
                    Ok(ApiResponse::Success)
                } else {
                    Ok(ApiResponse::Json(serde_json::from_str(&text)?))
                }
            }
            404 => Ok(ApiResponse::NotFound {
                status: 404,
                body: serde_json::from_str(&text).unwrap_or(Value::String(text)),
            }),
            _ => {
                let message = api_error_message(status, &text);
                error!(%status, detail = %message, "api request failed");
                Err(SentinelError::Api { status, message })
            }
        }
    }
}

/// Builds the failure message for a non-success resource response:
/// `Response [{status}:{reason} Details: {message}]` when the body carries
/// an `error.message` field, else `Response [{status}:{reason}]`.
fn api_error_message(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("");
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str().map(str::to_owned))
        });
    match detail {
        Some(message) => format!(
            "Response [{}:{} Details: {}]",
            status.as_u16(),
            reason,
            message
        ),
        None => format!("Response [{}:{}]", status.as_u16(), reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Response collapsing ──────────────────────────────────────────

    #[test]
    fn json_response_collapses_to_its_body() {
        let resp = ApiResponse::Json(serde_json::json!({"name": "incident-1"}));
        assert_eq!(resp.into_value(), serde_json::json!({"name": "incident-1"}));
    }

    #[test]
    fn empty_success_collapses_to_true_sentinel() {
        assert_eq!(ApiResponse::Success.into_value(), Value::Bool(true));
    }

    #[test]
    fn not_found_collapses_to_raw_response_object() {
        let resp = ApiResponse::NotFound {
            status: 404,
            body: serde_json::json!({"error": {"code": "NotFound"}}),
        };
        let value = resp.into_value();
        assert_eq!(value["status_code"], 404);
        assert_eq!(value["response"]["error"]["code"], "NotFound");
    }

    #[test]
    fn value_array_unwraps_provider_collection() {
        let resp = ApiResponse::Json(serde_json::json!({"value": [{"id": 1}, {"id": 2}]}));
        let value = resp.into_value_array();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn value_array_passes_not_found_through() {
        let resp = ApiResponse::NotFound {
            status: 404,
            body: Value::String(String::new()),
        };
        assert_eq!(resp.into_value_array()["status_code"], 404);
    }

    // ── Error message shaping ────────────────────────────────────────

    #[test]
    fn api_error_includes_provider_message() {
        let body = r#"{"error": {"code": "BadRequest", "message": "Invalid watchlist alias"}}"#;
        let msg = api_error_message(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            msg,
            "Response [400:Bad Request Details: Invalid watchlist alias]"
        );
    }

    #[test]
    fn api_error_falls_back_to_status_line() {
        let msg = api_error_message(StatusCode::BAD_GATEWAY, "");
        assert_eq!(msg, "Response [502:Bad Gateway]");
    }
}
