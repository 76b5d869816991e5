//! Connector configuration, host identity, and the persistence boundary.
//!
//! The host orchestration runtime owns a mutable configuration record per
//! connector instance. The record is created once (first-time setup with an
//! authorization code) and then mutated in place by the token manager on
//! every refresh, so it must round-trip through the host's storage with the
//! exact key names the host uses — hence the explicit serde renames on the
//! token fields.
//!
//! Durable storage itself is external: the crate only sees it through the
//! [`ConfigStore`] trait. Two implementations ship here — a file-backed
//! store for the CLI and an in-memory store for tests and embedding hosts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Mutable connector configuration record, owned by the host.
///
/// Invariant: once `access_token` is present, `expires_on` and
/// `refresh_token` are present and consistent. Absence of `access_token`
/// means the connector has never been authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Application (client) ID registered in the identity platform.
    pub client_id: String,

    /// Client secret for the registered application.
    pub client_secret: String,

    /// Directory (tenant) ID used to build the token endpoint.
    pub tenant_id: String,

    /// Management-plane host the resource API lives on. May be given with
    /// or without a scheme; normalized to `https://` at client construction.
    pub resource: String,

    /// Authentication flavor selected by the host. Informational only —
    /// this connector implements the delegated (on-behalf-of) flow.
    #[serde(default)]
    pub auth_type: Option<String>,

    /// One-time authorization code from the interactive consent step.
    /// Consumed by the first `check` call; not used again afterwards.
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI registered for the application. When unset, the
    /// token manager substitutes its default.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Whether to verify TLS certificates on outbound calls.
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Current delegated access token. `None` until first authentication.
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Absolute expiry of `access_token`, as epoch seconds.
    #[serde(rename = "expiresOn", default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<f64>,

    /// Refresh token paired with `access_token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Identifier the host uses to address this record in durable storage.
    #[serde(default)]
    pub config_id: String,
}

fn default_verify_ssl() -> bool {
    true
}

impl ConnectorConfig {
    /// Returns `true` once the connector has authenticated at least once.
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Host-supplied identity record used to address the persistence call.
/// Not interpreted by the connector beyond being passed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorInfo {
    /// Name of the connector as registered with the host.
    pub connector_name: String,

    /// Version string of the connector registration.
    pub connector_version: String,
}

/// Durable storage for the connector configuration.
///
/// The token manager calls this after every refresh so a subsequent
/// process start observes the refreshed token. Implementations must
/// overwrite the record addressed by `config_id` atomically enough that
/// a reader never sees a token without its expiry.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Durably overwrites the stored configuration record.
    async fn update_connector_config(
        &self,
        info: &ConnectorInfo,
        config: &ConnectorConfig,
        config_id: &str,
    ) -> Result<()>;
}

/// In-memory [`ConfigStore`] that records every persisted snapshot.
///
/// Used by the integration tests to assert how many times the token
/// manager persisted, and by embedding hosts that keep configuration in
/// their own storage layer.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    saved: std::sync::Mutex<Vec<ConnectorConfig>>,
}

impl MemoryConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `update_connector_config` has been called.
    pub fn save_count(&self) -> usize {
        self.saved.lock().expect("store lock poisoned").len()
    }

    /// The most recently persisted configuration snapshot, if any.
    pub fn last_saved(&self) -> Option<ConnectorConfig> {
        self.saved.lock().expect("store lock poisoned").last().cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn update_connector_config(
        &self,
        _info: &ConnectorInfo,
        config: &ConnectorConfig,
        _config_id: &str,
    ) -> Result<()> {
        self.saved
            .lock()
            .expect("store lock poisoned")
            .push(config.clone());
        Ok(())
    }
}

/// File-backed [`ConfigStore`] used by the CLI.
///
/// Writes the full configuration record as pretty-printed JSON so the
/// next invocation picks up the refreshed token.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Creates a store that persists to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn update_connector_config(
        &self,
        _info: &ConnectorInfo,
        config: &ConnectorConfig,
        _config_id: &str,
    ) -> Result<()> {
        let body = serde_json::to_vec_pretty(config)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }
}
