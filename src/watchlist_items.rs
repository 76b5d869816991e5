//! Watchlist item operations.
//!
//! Items live under a watchlist's alias. As with comments, the provider
//! expects the item identifier in the URL on creation, so
//! `create_watchlist_item` generates a v4 UUID client-side.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::client::SentinelClient;
use crate::error::{Result, SentinelError};
use crate::paths::Workspace;
use crate::payload::{is_truthy, non_empty, parse_params, prune};
use crate::watchlists::required_alias;

/// Parameters for the watchlist item operations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WatchlistItemParams {
    /// Alias of the owning watchlist.
    #[serde(rename = "watchlistAlias")]
    pub alias: Option<String>,

    /// Item identifier for the single-item operations.
    #[serde(rename = "watchlistItemId")]
    pub item_id: Option<String>,

    /// Entity tag of the record being replaced.
    pub etag: Option<String>,

    /// The item's column values, keyed by the watchlist schema.
    #[serde(rename = "itemsKeyValue")]
    pub items_key_value: Option<Value>,

    /// Raw override for the `properties` sub-object.
    pub custom_attributes: Option<Value>,

    /// Continuation token for the list operation.
    #[serde(rename = "$skipToken")]
    pub skip_token: Option<String>,
}

fn required_item_id(params: &WatchlistItemParams) -> Result<String> {
    non_empty(params.item_id.clone())
        .ok_or_else(|| SentinelError::Config("watchlistItemId is required".to_string()))
}

fn item_body(params: &WatchlistItemParams) -> Value {
    let mut body = json!({
        "etag": params.etag,
        "properties": {
            "itemsKeyValue": params.items_key_value,
        }
    });
    if let Some(extra) = &params.custom_attributes {
        if is_truthy(extra) {
            body["properties"] = extra.clone();
        }
    }
    prune(body)
}

/// Creates a watchlist item under a client-generated v4 UUID.
pub async fn create_watchlist_item(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistItemParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let item_id = Uuid::new_v4().to_string();
    let body = item_body(&p);
    let resp = client
        .request(
            Method::PUT,
            &ws.watchlist_item(&alias, &item_id),
            None,
            Some(&body),
        )
        .await?;
    Ok(resp.into_value())
}

/// Lists the items of a watchlist, returning the full response.
pub async fn get_all_watchlist_items(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistItemParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let mut query = Vec::new();
    if let Some(token) = non_empty(p.skip_token.clone()) {
        query.push(("$skipToken".to_string(), token));
    }
    let resp = client
        .request(Method::GET, &ws.watchlist_items(&alias), Some(&query), None)
        .await?;
    Ok(resp.into_value())
}

/// Fetches a single watchlist item.
pub async fn get_watchlist_item(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistItemParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let item_id = required_item_id(&p)?;
    let resp = client
        .request(Method::GET, &ws.watchlist_item(&alias, &item_id), None, None)
        .await?;
    Ok(resp.into_value())
}

/// Replaces a watchlist item's values.
pub async fn update_watchlist_item(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistItemParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let item_id = required_item_id(&p)?;
    let body = item_body(&p);
    let resp = client
        .request(
            Method::PUT,
            &ws.watchlist_item(&alias, &item_id),
            None,
            Some(&body),
        )
        .await?;
    Ok(resp.into_value())
}

/// Deletes a watchlist item, translating success into a confirmation
/// message. A 404 is handed back as the raw response value.
pub async fn delete_watchlist_item(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistItemParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let item_id = required_item_id(&p)?;
    let resp = client
        .request(
            Method::DELETE,
            &ws.watchlist_item(&alias, &item_id),
            None,
            Some(&json!({})),
        )
        .await?;
    match resp {
        crate::client::ApiResponse::NotFound { .. } => Ok(resp.into_value()),
        _ => Ok(json!({
            "result": format!("Successfully deleted the watchlist item {item_id}")
        })),
    }
}
