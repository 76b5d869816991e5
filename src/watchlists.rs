//! Watchlist operations.
//!
//! Watchlists are named reference datasets addressed by alias. Create and
//! update are both PUT against the alias path with the same property
//! whitelist; `custom_attributes` replaces the `properties` sub-object
//! wholesale. The list operation supports only `$skipToken` paging.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::SentinelClient;
use crate::error::{Result, SentinelError};
use crate::paths::Workspace;
use crate::payload::{is_truthy, non_empty, parse_params, prune};

/// Parameters for the watchlist operations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WatchlistParams {
    /// Alias addressing the watchlist within the workspace.
    #[serde(rename = "watchlistAlias")]
    pub alias: Option<String>,

    /// Entity tag of the record being replaced.
    pub etag: Option<String>,

    /// Display name shown in the portal.
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,

    /// Column used as the search key across the items.
    #[serde(rename = "itemsSearchKey")]
    pub items_search_key: Option<String>,

    /// Provider label for the watchlist.
    pub provider: Option<String>,

    /// Source label for the watchlist.
    pub source: Option<String>,

    /// Free-text description.
    pub description: Option<String>,

    /// Raw override for the `properties` sub-object.
    pub custom_attributes: Option<Value>,

    /// Continuation token for the list operation.
    #[serde(rename = "$skipToken")]
    pub skip_token: Option<String>,
}

pub(crate) fn required_alias(alias: &Option<String>) -> Result<String> {
    non_empty(alias.clone())
        .ok_or_else(|| SentinelError::Config("watchlistAlias is required".to_string()))
}

fn watchlist_body(params: &WatchlistParams) -> Value {
    let mut body = json!({
        "etag": params.etag,
        "properties": {
            "displayName": params.display_name,
            "itemsSearchKey": params.items_search_key,
            "provider": params.provider,
            "source": params.source,
            "description": params.description,
        }
    });
    if let Some(extra) = &params.custom_attributes {
        if is_truthy(extra) {
            body["properties"] = extra.clone();
        }
    }
    prune(body)
}

/// Creates a watchlist under the given alias.
pub async fn create_watchlist(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let body = watchlist_body(&p);
    let resp = client
        .request(Method::PUT, &ws.watchlist(&alias), None, Some(&body))
        .await?;
    Ok(resp.into_value())
}

/// Lists the workspace's watchlists, returning the full response.
pub async fn get_all_watchlist(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistParams = parse_params(params)?;
    let mut query = Vec::new();
    if let Some(token) = non_empty(p.skip_token.clone()) {
        query.push(("$skipToken".to_string(), token));
    }
    let resp = client
        .request(Method::GET, &ws.watchlists(), Some(&query), None)
        .await?;
    Ok(resp.into_value())
}

/// Fetches a single watchlist by alias.
pub async fn get_watchlist(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let resp = client
        .request(Method::GET, &ws.watchlist(&alias), None, None)
        .await?;
    Ok(resp.into_value())
}

/// Replaces a watchlist; same body shape as creation.
pub async fn update_watchlist(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let body = watchlist_body(&p);
    let resp = client
        .request(Method::PUT, &ws.watchlist(&alias), None, Some(&body))
        .await?;
    Ok(resp.into_value())
}

/// Deletes a watchlist, translating success into a confirmation message.
/// A 404 is handed back as the raw response value.
pub async fn delete_watchlist(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: WatchlistParams = parse_params(params)?;
    let alias = required_alias(&p.alias)?;
    let resp = client
        .request(Method::DELETE, &ws.watchlist(&alias), None, Some(&json!({})))
        .await?;
    match resp {
        crate::client::ApiResponse::NotFound { .. } => Ok(resp.into_value()),
        _ => Ok(json!({
            "result": format!("Successfully deleted the watchlist {alias}")
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_uses_property_whitelist_and_prunes_empties() {
        let params: WatchlistParams = serde_json::from_value(json!({
            "watchlistAlias": "vip-ips",
            "displayName": "VIP addresses",
            "itemsSearchKey": "ip",
            "provider": "",
            "source": "csv"
        }))
        .unwrap();
        let body = watchlist_body(&params);
        assert_eq!(body["properties"]["displayName"], "VIP addresses");
        assert_eq!(body["properties"]["itemsSearchKey"], "ip");
        assert_eq!(body["properties"]["source"], "csv");
        assert!(
            body["properties"].get("provider").is_none(),
            "empty provider must be pruned"
        );
        assert!(body.get("etag").is_none(), "unset etag must be pruned");
    }

    #[test]
    fn custom_attributes_replace_properties_wholesale() {
        let params: WatchlistParams = serde_json::from_value(json!({
            "watchlistAlias": "vip-ips",
            "displayName": "ignored",
            "custom_attributes": {"numberOfLinesToSkip": 1}
        }))
        .unwrap();
        let body = watchlist_body(&params);
        assert_eq!(body["properties"], json!({"numberOfLinesToSkip": 1}));
    }

    #[test]
    fn missing_alias_is_a_config_error() {
        assert!(matches!(
            required_alias(&None),
            Err(SentinelError::Config(_))
        ));
    }
}
