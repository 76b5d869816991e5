//! Delegated OAuth2 authentication for the Microsoft identity platform.
//!
//! Implements the on-behalf-of token lifecycle against Azure AD's
//! `/oauth2/v2.0/token` endpoint: a one-time `authorization_code` exchange
//! when the connector is first configured, and a silent `refresh_token`
//! exchange whenever the stored token has expired. Unlike a cached
//! in-process token, the credential here lives in the host-owned
//! [`ConnectorConfig`] so it survives process restarts — expiry is tracked
//! as absolute epoch seconds rather than a process-local instant.
//!
//! Token lifecycle (checked lazily on each validate call):
//! - unauthenticated → valid: `acquire_token` (authorization_code grant)
//! - valid → expired: wall clock passes `expiresOn`
//! - expired → valid: `refresh_token` grant + persistence of the merged
//!   configuration via [`ConfigStore`]

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::config::{ConfigStore, ConnectorConfig, ConnectorInfo};
use crate::error::{Result, SentinelError};

/// OAuth scope requesting delegated management-plane access plus a
/// refresh token (`offline_access`).
pub const SCOPE: &str = "https://management.azure.com/user_impersonation offline_access user.read";

/// Public-cloud authority. `Authenticator::with_authority` overrides this
/// for tests (and sovereign clouds).
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Redirect URI substituted when the configuration leaves it unset.
const DEFAULT_REDIRECT_URI: &str = "https://localhost/myapp";

/// Connect timeout for the token endpoint. Covers TCP + TLS handshake.
const TOKEN_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall round-trip timeout for token requests. Token responses are
/// small; 30 seconds is generous for Azure AD.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Form body sent to the token endpoint, serialized as
/// `application/x-www-form-urlencoded` by reqwest's `.form()`.
///
/// `code` is set for the authorization_code grant, `refresh_token` for the
/// refresh grant; the remaining fields are common to both.
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    scope: &'a str,
    grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

/// Subset of the Azure AD token response that the connector needs.
/// Extra fields (`ext_expires_in`, `id_token`, ...) are ignored by serde.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The delegated access token.
    pub access_token: String,
    /// Lifetime of the token in seconds from now.
    pub expires_in: u64,
    /// Replacement refresh token. Azure AD usually rotates it, but may
    /// omit it on refresh responses.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A token response normalized into the shape stored in the connector
/// configuration: relative `expires_in` resolved to absolute epoch seconds.
#[derive(Debug, Clone)]
pub struct TokenState {
    /// The delegated access token (stored as `accessToken`).
    pub access_token: String,
    /// Absolute expiry, epoch seconds (stored as `expiresOn`).
    pub expires_on: f64,
    /// Replacement refresh token, when the provider issued one.
    pub refresh_token: Option<String>,
}

/// Provider error body returned by the token endpoint on failed grants.
#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Current wall-clock time as fractional epoch seconds.
pub(crate) fn epoch_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Normalizes the configured resource value to an `https://` absolute URL.
///
/// `http://` prefixes are upgraded, schemeless values get `https://`
/// prepended, and an empty value is a configuration error (the original
/// behavior indexed into the string unguarded).
pub fn normalize_host(resource: &str) -> Result<String> {
    if resource.is_empty() {
        return Err(SentinelError::Config("resource host is empty".to_string()));
    }
    if let Some(rest) = resource.strip_prefix("http://") {
        Ok(format!("https://{rest}"))
    } else if resource.starts_with("https://") {
        Ok(resource.to_string())
    } else {
        Ok(format!("https://{resource}"))
    }
}

/// Resolves a token response against the current clock.
///
/// `expiresOn = now + expires_in`; the provider's relative lifetime never
/// reaches storage.
pub fn normalize_token_response(resp: TokenResponse, now: f64) -> TokenState {
    TokenState {
        access_token: resp.access_token,
        expires_on: now + resp.expires_in as f64,
        refresh_token: resp.refresh_token,
    }
}

/// Merges a fresh token into the connector configuration.
///
/// When the refresh response omitted a new refresh token, the previously
/// stored one is retained — dropping it would break every later refresh.
pub(crate) fn apply_token(config: &mut ConnectorConfig, state: TokenState) {
    config.access_token = Some(state.access_token);
    config.expires_on = Some(state.expires_on);
    if state.refresh_token.is_some() {
        config.refresh_token = state.refresh_token;
    }
}

/// Token manager for a single connector configuration.
///
/// Cheap to construct — every operation call re-derives one from the
/// configuration. Holds no token state of its own; the credential of
/// record lives in the [`ConnectorConfig`].
pub struct Authenticator {
    http: reqwest::Client,
    token_url: String,
    host: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl Authenticator {
    /// Builds a token manager from the connector configuration, deriving
    /// the normalized resource host and the public-cloud token endpoint.
    ///
    /// Fails with `SentinelError::Config` when `resource` is empty.
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        Self::with_authority(config, DEFAULT_AUTHORITY)
    }

    /// Same as [`Authenticator::new`] but against a custom authority base.
    /// Used by tests to point the token endpoint at a local mock server.
    pub fn with_authority(config: &ConnectorConfig, authority: &str) -> Result<Self> {
        let host = normalize_host(&config.resource)?;
        let http = reqwest::Client::builder()
            .connect_timeout(TOKEN_CONNECT_TIMEOUT)
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(SentinelError::Request)?;

        Ok(Authenticator {
            http,
            token_url: format!("{}/{}/oauth2/v2.0/token", authority, config.tenant_id),
            host,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config
                .redirect_uri
                .clone()
                .filter(|uri| !uri.is_empty())
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
        })
    }

    /// The normalized `https://` resource host derived from the
    /// configuration.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Exchanges the one-time authorization code for an initial token.
    /// Used exactly once, when no access token exists yet.
    pub async fn acquire_token(&self, code: &str) -> Result<TokenState> {
        let request = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri: &self.redirect_uri,
            scope: SCOPE,
            grant_type: "authorization_code",
            code: Some(code),
            refresh_token: None,
        };
        let resp = self.exchange(&request).await?;
        Ok(normalize_token_response(resp, epoch_now()))
    }

    /// Exchanges a stored refresh token for a new token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenState> {
        let request = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri: &self.redirect_uri,
            scope: SCOPE,
            grant_type: "refresh_token",
            code: None,
            refresh_token: Some(refresh_token),
        };
        let resp = self.exchange(&request).await?;
        Ok(normalize_token_response(resp, epoch_now()))
    }

    /// Performs one grant exchange against the token endpoint.
    ///
    /// The body is read as text before the status check so that on failure
    /// the provider's `error_description` (AADSTS codes) can be surfaced —
    /// `error_for_status()` would discard it.
    async fn exchange(&self, request: &TokenRequest<'_>) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(request)
            .send()
            .await
            .map_err(|err| auth_transport_error(err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| auth_transport_error(err))?;

        if !matches!(status.as_u16(), 200 | 201 | 204) {
            let message = token_error_message(status, &body);
            error!(%status, "token exchange failed");
            return Err(SentinelError::Auth {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|err| SentinelError::Auth {
            message: "malformed token response".to_string(),
            source: Some(Box::new(err)),
        })
    }

    /// Returns a currently valid bearer credential, refreshing and
    /// persisting first when the stored token has expired.
    ///
    /// This is the sole token state machine: missing `accessToken` is an
    /// authentication error (the caller must have run the health check
    /// first); a live token is returned without side effects; an expired
    /// token triggers exactly one refresh exchange, one merge into the
    /// configuration, and one persistence call keyed by `config_id`.
    pub async fn validate_token(
        &self,
        config: &mut ConnectorConfig,
        info: &ConnectorInfo,
        store: &dyn ConfigStore,
    ) -> Result<String> {
        if !config.has_token() {
            error!("error occurred while connecting server: unauthorized");
            return Err(SentinelError::Auth {
                message: "Error occurred while connecting server: Unauthorized".to_string(),
                source: None,
            });
        }

        let expires_on = config.expires_on.unwrap_or(0.0);
        if epoch_now() > expires_on {
            info!(expires_on, "token expired, performing refresh exchange");
            let refresh = config.refresh_token.clone().ok_or_else(|| SentinelError::Auth {
                message: "refresh token missing from stored configuration".to_string(),
                source: None,
            })?;
            let state = self.refresh_token(&refresh).await?;
            apply_token(config, state);
            let config_id = config.config_id.clone();
            store
                .update_connector_config(info, config, &config_id)
                .await?;
        } else {
            info!(expires_on, "token is valid");
        }

        Ok(format!(
            "Bearer {}",
            config.access_token.as_deref().unwrap_or_default()
        ))
    }
}

/// Wraps a transport failure on the token endpoint as an Auth error,
/// preserving the cause chain.
fn auth_transport_error(err: reqwest::Error) -> SentinelError {
    SentinelError::Auth {
        message: format!("token endpoint unreachable: {err}"),
        source: Some(Box::new(err)),
    }
}

/// Builds the failure message for a non-success token response:
/// `Response {status}: {reason} \n Error Message: {error_description}`
/// when the body carries a provider error, else the bare status line.
fn token_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("");
    if !body.is_empty() {
        if let Ok(provider) = serde_json::from_str::<ProviderError>(body) {
            if provider.error.is_some() {
                return format!(
                    "Response {}: {} \n Error Message: {}",
                    status.as_u16(),
                    reason,
                    provider.error_description.unwrap_or_default()
                );
            }
        }
    }
    format!("{}:{}", status.as_u16(), reason)
}
