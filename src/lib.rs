//! Async Rust client for the Microsoft Sentinel SecurityInsights REST API.
//!
//! Provides delegated (on-behalf-of) OAuth2 token lifecycle management —
//! authorization-code bootstrap, lazy expiry detection, silent refresh
//! with durable persistence — and a uniform operation-dispatch surface
//! over the Sentinel resource families: threat-intelligence indicators,
//! incidents (with alerts, entities, bookmarks), incident relations and
//! comments, watchlists, and watchlist items.
//!
//! # Modules
//!
//! - [`auth`] — token manager: grant exchanges, normalization, validate-or-refresh.
//! - [`client`] — authenticated HTTP client and shared request helper.
//! - [`config`] — connector configuration record and the persistence boundary.
//! - [`dispatch`] — static operation registry and the `execute` entry point.
//! - [`error`] — typed error hierarchy (`SentinelError`).
//! - [`paths`] — workspace-scoped resource path construction.
//! - [`payload`] — payload pruning and STIX pattern shaping.
//! - endpoint families: [`indicators`], [`incidents`], [`relations`],
//!   [`comments`], [`watchlists`], [`watchlist_items`].
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sentinel_ops::client::SentinelClient;
//! use sentinel_ops::config::{ConnectorConfig, ConnectorInfo, FileConfigStore};
//!
//! let config: ConnectorConfig = serde_json::from_str(&config_json)?;
//! let info = ConnectorInfo {
//!     connector_name: "microsoft-sentinel".into(),
//!     connector_version: "1.0.0".into(),
//! };
//! let store = Arc::new(FileConfigStore::new("connector.json"));
//! let client = SentinelClient::new(config, info, store)?;
//! client.check().await?;
//! let incidents = sentinel_ops::dispatch::execute(&client, "get_incident_list", &params).await?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod comments;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod incidents;
pub mod indicators;
pub mod paths;
pub mod payload;
pub mod relations;
pub mod watchlist_items;
pub mod watchlists;
