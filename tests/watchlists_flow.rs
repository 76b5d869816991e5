//! Integration tests for the watchlist and watchlist-item endpoint
//! families using wiremock.

use std::sync::Arc;

use sentinel_ops::client::SentinelClient;
use sentinel_ops::config::{ConnectorConfig, ConnectorInfo, MemoryConfigStore};
use sentinel_ops::dispatch;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.OperationalInsights/workspaces/ws-1/providers/Microsoft.SecurityInsights";

fn mock_client(server: &MockServer) -> SentinelClient {
    let config: ConnectorConfig = serde_json::from_value(json!({
        "client_id": "cid",
        "client_secret": "secret",
        "tenant_id": "tenant-1",
        "resource": server.uri(),
        "accessToken": "mock-token",
        "expiresOn": chrono::Utc::now().timestamp() as f64 + 3600.0,
        "refresh_token": "refresh",
        "config_id": "cfg-1"
    }))
    .unwrap();
    let info = ConnectorInfo {
        connector_name: "microsoft-sentinel".to_string(),
        connector_version: "1.0.0".to_string(),
    };
    SentinelClient::with_endpoints(
        config,
        info,
        Arc::new(MemoryConfigStore::new()),
        &server.uri(),
        &server.uri(),
    )
    .unwrap()
}

fn params(extra: serde_json::Value) -> serde_json::Value {
    let mut params = json!({
        "WorkspaceSubscriptionId": "sub-1",
        "WorkspaceResourceGroup": "rg-1",
        "WorkspaceName": "ws-1"
    });
    params
        .as_object_mut()
        .unwrap()
        .extend(extra.as_object().unwrap().clone());
    params
}

// ── watchlists ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_watchlist_puts_property_whitelist() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("PUT"))
        .and(path(format!("{BASE}/watchlists/vip-ips")))
        .and(body_partial_json(json!({
            "properties": {
                "displayName": "VIP addresses",
                "itemsSearchKey": "ip",
                "source": "csv"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "vip-ips",
            "properties": {"displayName": "VIP addresses"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatch::execute(
        &client,
        "create_watchlist",
        &params(json!({
            "watchlistAlias": "vip-ips",
            "displayName": "VIP addresses",
            "itemsSearchKey": "ip",
            "source": "csv"
        })),
    )
    .await
    .unwrap();
    assert_eq!(result["name"], "vip-ips");
}

#[tokio::test]
async fn get_all_watchlist_passes_skip_token_and_returns_full_response() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/watchlists")))
        .and(query_param("$skipToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"name": "vip-ips"}],
            "nextLink": "https://example/page-3"
        })))
        .mount(&server)
        .await;

    let result = dispatch::execute(
        &client,
        "get_all_watchlist",
        &params(json!({"$skipToken": "page-2"})),
    )
    .await
    .unwrap();

    // Full response including the paging link, not just the value array.
    assert_eq!(result["nextLink"], "https://example/page-3");
}

#[tokio::test]
async fn get_missing_watchlist_returns_raw_404() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path(format!("{BASE}/watchlists/ghost")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NotFound", "message": "Watchlist not found"}
        })))
        .mount(&server)
        .await;

    let result = dispatch::execute(
        &client,
        "get_watchlist",
        &params(json!({"watchlistAlias": "ghost"})),
    )
    .await
    .expect("404 must be a value, not an error");
    assert_eq!(result["status_code"], 404);
}

#[tokio::test]
async fn delete_watchlist_returns_confirmation_message() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/watchlists/vip-ips")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = dispatch::execute(
        &client,
        "delete_watchlist",
        &params(json!({"watchlistAlias": "vip-ips"})),
    )
    .await
    .unwrap();
    assert_eq!(result["result"], "Successfully deleted the watchlist vip-ips");
}

// ── watchlist items ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_watchlist_item_puts_under_generated_uuid() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("PUT"))
        .and(path_regex(format!(
            "^{BASE}/watchlists/vip-ips/watchlistItems/[0-9a-f]{{8}}-[0-9a-f]{{4}}-[0-9a-f]{{4}}-[0-9a-f]{{4}}-[0-9a-f]{{12}}$"
        )))
        .and(body_partial_json(json!({
            "properties": {"itemsKeyValue": {"ip": "10.0.0.1"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": {"itemsKeyValue": {"ip": "10.0.0.1"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatch::execute(
        &client,
        "create_watchlist_item",
        &params(json!({
            "watchlistAlias": "vip-ips",
            "itemsKeyValue": {"ip": "10.0.0.1"}
        })),
    )
    .await
    .unwrap();
    assert_eq!(result["properties"]["itemsKeyValue"]["ip"], "10.0.0.1");
}

#[tokio::test]
async fn update_watchlist_item_targets_existing_item() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("PUT"))
        .and(path(format!(
            "{BASE}/watchlists/vip-ips/watchlistItems/item-42"
        )))
        .and(body_partial_json(json!({
            "properties": {"itemsKeyValue": {"ip": "10.0.0.2"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "item-42"
        })))
        .mount(&server)
        .await;

    let result = dispatch::execute(
        &client,
        "update_watchlist_item",
        &params(json!({
            "watchlistAlias": "vip-ips",
            "watchlistItemId": "item-42",
            "itemsKeyValue": {"ip": "10.0.0.2"}
        })),
    )
    .await
    .unwrap();
    assert_eq!(result["name"], "item-42");
}

#[tokio::test]
async fn delete_watchlist_item_returns_confirmation_message() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("DELETE"))
        .and(path(format!(
            "{BASE}/watchlists/vip-ips/watchlistItems/item-42"
        )))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = dispatch::execute(
        &client,
        "delete_watchlist_item",
        &params(json!({
            "watchlistAlias": "vip-ips",
            "watchlistItemId": "item-42"
        })),
    )
    .await
    .unwrap();
    assert_eq!(
        result["result"],
        "Successfully deleted the watchlist item item-42"
    );
}
