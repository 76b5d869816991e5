//! Operation dispatch: name → handler.
//!
//! The host invokes operations by exact string name. The published set is
//! captured in [`OPERATIONS`] and mirrored in `manifest/operations.toml`;
//! `tests/manifest_validation.rs` cross-checks the two so the registry
//! cannot drift from the published catalogue. Dispatch itself is a
//! compile-time match — there is no runtime registration.

use serde_json::Value;

use crate::client::SentinelClient;
use crate::error::{Result, SentinelError};
use crate::{comments, incidents, indicators, relations, watchlist_items, watchlists};

/// The published operation set, in catalogue order.
pub const OPERATIONS: &[&str] = &[
    "create_threat_intelligence_indicator",
    "get_all_threat_intelligence_indicators",
    "get_threat_intelligence_indicator",
    "update_threat_intelligence_indicator",
    "delete_threat_intelligence_indicator",
    "get_incident_list",
    "get_incident",
    "update_incident",
    "get_alert_list",
    "get_entities_list",
    "get_bookmarks_list",
    "create_incident_relations",
    "get_all_incident_relations",
    "get_incident_relations",
    "update_incident_relations",
    "delete_incident_relation",
    "create_incident_comment",
    "get_all_incident_comments",
    "get_incident_comment",
    "update_incident_comment",
    "delete_incident_comment",
    "create_watchlist",
    "get_all_watchlist",
    "get_watchlist",
    "update_watchlist",
    "delete_watchlist",
    "create_watchlist_item",
    "get_all_watchlist_items",
    "get_watchlist_item",
    "update_watchlist_item",
    "delete_watchlist_item",
];

/// Dispatches an operation by name.
///
/// Unknown names return [`SentinelError::UnknownOperation`]; validating
/// against the published set up front is the host's contract, but the
/// crate refuses explicitly rather than panicking.
pub async fn execute(client: &SentinelClient, operation: &str, params: &Value) -> Result<Value> {
    match operation {
        "create_threat_intelligence_indicator" => indicators::create_indicator(client, params).await,
        "get_all_threat_intelligence_indicators" => {
            indicators::get_all_indicators(client, params).await
        }
        "get_threat_intelligence_indicator" => indicators::get_indicator(client, params).await,
        "update_threat_intelligence_indicator" => indicators::update_indicator(client, params).await,
        "delete_threat_intelligence_indicator" => indicators::delete_indicator(client, params).await,
        "get_incident_list" => incidents::get_incident_list(client, params).await,
        "get_incident" => incidents::get_incident(client, params).await,
        "update_incident" => incidents::update_incident(client, params).await,
        "get_alert_list" => incidents::get_alert_list(client, params).await,
        "get_entities_list" => incidents::get_entities_list(client, params).await,
        "get_bookmarks_list" => incidents::get_bookmarks_list(client, params).await,
        "create_incident_relations" => relations::create_incident_relations(client, params).await,
        "get_all_incident_relations" => {
            relations::get_all_incident_relations(client, params).await
        }
        "get_incident_relations" => relations::get_incident_relations(client, params).await,
        "update_incident_relations" => relations::update_incident_relations(client, params).await,
        "delete_incident_relation" => relations::delete_incident_relation(client, params).await,
        "create_incident_comment" => comments::create_incident_comment(client, params).await,
        "get_all_incident_comments" => comments::get_all_incident_comments(client, params).await,
        "get_incident_comment" => comments::get_incident_comment(client, params).await,
        "update_incident_comment" => comments::update_incident_comment(client, params).await,
        "delete_incident_comment" => comments::delete_incident_comment(client, params).await,
        "create_watchlist" => watchlists::create_watchlist(client, params).await,
        "get_all_watchlist" => watchlists::get_all_watchlist(client, params).await,
        "get_watchlist" => watchlists::get_watchlist(client, params).await,
        "update_watchlist" => watchlists::update_watchlist(client, params).await,
        "delete_watchlist" => watchlists::delete_watchlist(client, params).await,
        "create_watchlist_item" => watchlist_items::create_watchlist_item(client, params).await,
        "get_all_watchlist_items" => {
            watchlist_items::get_all_watchlist_items(client, params).await
        }
        "get_watchlist_item" => watchlist_items::get_watchlist_item(client, params).await,
        "update_watchlist_item" => watchlist_items::update_watchlist_item(client, params).await,
        "delete_watchlist_item" => watchlist_items::delete_watchlist_item(client, params).await,
        unknown => Err(SentinelError::UnknownOperation(unknown.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn published_set_has_thirty_one_operations() {
        assert_eq!(OPERATIONS.len(), 31);
    }

    #[test]
    fn published_set_has_no_duplicates() {
        let unique: HashSet<_> = OPERATIONS.iter().collect();
        assert_eq!(unique.len(), OPERATIONS.len());
    }

    #[test]
    fn every_resource_family_is_covered() {
        // Five indicator ops, six incident ops (incl. the three
        // POST-to-list sub-resources), five relations, five comments,
        // five watchlists, five watchlist items.
        let count = |prefix: &str| OPERATIONS.iter().filter(|op| op.contains(prefix)).count();
        assert_eq!(count("threat_intelligence_indicator"), 5);
        assert_eq!(count("relation"), 5);
        assert_eq!(count("comment"), 5);
        assert_eq!(count("watchlist_item"), 5);
    }
}
