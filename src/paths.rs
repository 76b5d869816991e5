//! Workspace-scoped resource paths for the SecurityInsights provider.
//!
//! Every operation addresses resources under one Log Analytics workspace:
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}
//!   /providers/Microsoft.OperationalInsights/workspaces/{ws}
//!   /providers/Microsoft.SecurityInsights/...
//! ```
//!
//! [`Workspace`] carries the three identifiers (deserialized straight from
//! the caller's operation parameters under the host's key names) and
//! builds the per-resource paths. The API version is fixed and appended as
//! a query parameter by the request helper.

use serde::Deserialize;

/// API version sent with every resource call.
pub const API_VERSION: &str = "2022-11-01";

/// Workspace identifiers present in every operation's parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Workspace {
    /// Azure subscription that owns the workspace.
    #[serde(rename = "WorkspaceSubscriptionId", default)]
    pub subscription_id: String,

    /// Resource group that owns the workspace.
    #[serde(rename = "WorkspaceResourceGroup", default)]
    pub resource_group: String,

    /// Log Analytics workspace name.
    #[serde(rename = "WorkspaceName", default)]
    pub name: String,
}

impl Workspace {
    /// The SecurityInsights provider root for this workspace.
    fn base(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.OperationalInsights/workspaces/{}/providers/Microsoft.SecurityInsights",
            self.subscription_id, self.resource_group, self.name
        )
    }

    /// POST target for creating a threat-intelligence indicator.
    pub fn threat_indicator_create(&self) -> String {
        format!("{}/threatIntelligence/main/createIndicator", self.base())
    }

    /// Collection path for threat-intelligence indicators.
    pub fn threat_indicators(&self) -> String {
        format!("{}/threatIntelligence/main/indicators", self.base())
    }

    /// Single threat-intelligence indicator by ID.
    pub fn threat_indicator(&self, id: &str) -> String {
        format!("{}/threatIntelligence/main/indicators/{}", self.base(), id)
    }

    /// Collection path for incidents.
    pub fn incidents(&self) -> String {
        format!("{}/incidents", self.base())
    }

    /// Single incident by ID.
    pub fn incident(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}", self.base(), incident_id)
    }

    /// Alerts attached to an incident (POST-to-list endpoint).
    pub fn incident_alerts(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}/alerts", self.base(), incident_id)
    }

    /// Entities attached to an incident (POST-to-list endpoint).
    pub fn incident_entities(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}/entities", self.base(), incident_id)
    }

    /// Bookmarks attached to an incident (POST-to-list endpoint).
    pub fn incident_bookmarks(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}/bookmarks", self.base(), incident_id)
    }

    /// Relation collection for an incident.
    pub fn incident_relations(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}/relations", self.base(), incident_id)
    }

    /// Single named relation on an incident.
    pub fn incident_relation(&self, incident_id: &str, relation_name: &str) -> String {
        format!(
            "{}/incidents/{}/relations/{}",
            self.base(),
            incident_id,
            relation_name
        )
    }

    /// Comment collection for an incident.
    pub fn incident_comments(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}/comments", self.base(), incident_id)
    }

    /// Single comment on an incident.
    pub fn incident_comment(&self, incident_id: &str, comment_id: &str) -> String {
        format!(
            "{}/incidents/{}/comments/{}",
            self.base(),
            incident_id,
            comment_id
        )
    }

    /// Watchlist collection for the workspace.
    pub fn watchlists(&self) -> String {
        format!("{}/watchlists", self.base())
    }

    /// Single watchlist by alias.
    pub fn watchlist(&self, alias: &str) -> String {
        format!("{}/watchlists/{}", self.base(), alias)
    }

    /// Item collection for a watchlist.
    pub fn watchlist_items(&self, alias: &str) -> String {
        format!("{}/watchlists/{}/watchlistItems", self.base(), alias)
    }

    /// Single watchlist item.
    pub fn watchlist_item(&self, alias: &str, item_id: &str) -> String {
        format!(
            "{}/watchlists/{}/watchlistItems/{}",
            self.base(),
            alias,
            item_id
        )
    }
}
