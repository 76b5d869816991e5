//! Incident operations: listing with a composed filter, single-incident
//! fetch and update, and the POST-to-list sub-resources (alerts, entities,
//! bookmarks).
//!
//! The list operation composes its `$filter` from the structured
//! parameters (creation time, status, severity) and any raw expression
//! the caller supplies, joined with `and`. Update bodies follow the
//! incident property whitelist, with `custom_attributes` replacing the
//! `properties` sub-object wholesale.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::SentinelClient;
use crate::error::{Result, SentinelError};
use crate::paths::Workspace;
use crate::payload::{is_truthy, non_empty, parse_params, prune, query_value};

/// Parameters for the incident list operation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncidentListParams {
    /// Lower bound on `properties/createdTimeUtc` (ISO 8601).
    pub created_datetime: Option<String>,

    /// Incident status filter (`New`, `Active`, `Closed`).
    #[serde(rename = "Status")]
    pub status: Option<String>,

    /// Incident severity filter (`Informational` .. `High`).
    #[serde(rename = "Severity")]
    pub severity: Option<String>,

    /// Raw OData filter appended verbatim to the composed expression.
    #[serde(rename = "$filter")]
    pub filter: Option<String>,

    /// OData ordering expression.
    #[serde(rename = "$orderby")]
    pub orderby: Option<String>,

    /// Maximum number of results.
    #[serde(rename = "$top")]
    pub top: Value,

    /// Continuation token from a previous page.
    #[serde(rename = "$skipToken")]
    pub skip_token: Option<String>,
}

/// Parameters for the single-incident operations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncidentParams {
    /// Incident identifier in the workspace.
    #[serde(rename = "incidentId")]
    pub incident_id: Option<String>,

    /// Entity tag of the record being replaced.
    pub etag: Option<String>,

    /// Updated description.
    #[serde(rename = "Description")]
    pub description: Option<String>,

    /// Updated title.
    #[serde(rename = "Title")]
    pub title: Option<String>,

    /// Updated severity.
    #[serde(rename = "Severity")]
    pub severity: Option<String>,

    /// Closing classification (`Undetermined`, `TruePositive`, ...).
    pub classification: Option<String>,

    /// Classification comment.
    #[serde(rename = "Comment")]
    pub comment: Option<String>,

    /// Classification reason.
    pub reason: Option<String>,

    /// Updated status.
    #[serde(rename = "Status")]
    pub status: Option<String>,

    /// Raw override for the `properties` sub-object.
    pub custom_attributes: Option<Value>,
}

/// Composes the incident `$filter` expression from the structured
/// parameters plus any raw filter, joined with `and`.
fn incident_filter(params: &IncidentListParams) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(created) = non_empty(params.created_datetime.clone()) {
        parts.push(format!("properties/createdTimeUtc ge {created}"));
    }
    if let Some(status) = non_empty(params.status.clone()) {
        parts.push(format!("properties/status eq '{status}'"));
    }
    if let Some(severity) = non_empty(params.severity.clone()) {
        parts.push(format!("properties/severity eq '{severity}'"));
    }
    if let Some(raw) = non_empty(params.filter.clone()) {
        parts.push(raw);
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" and "))
    }
}

/// The incident ID parameter, required by every per-incident operation.
pub(crate) fn required_incident_id(id: &Option<String>) -> Result<String> {
    non_empty(id.clone())
        .ok_or_else(|| SentinelError::Config("incidentId is required".to_string()))
}

/// Lists incidents, returning the provider response unmodified.
pub async fn get_incident_list(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IncidentListParams = parse_params(params)?;

    let mut query = Vec::new();
    if let Some(filter) = incident_filter(&p) {
        query.push(("$filter".to_string(), filter));
    }
    if let Some(orderby) = non_empty(p.orderby.clone()) {
        query.push(("$orderby".to_string(), orderby));
    }
    if let Some(top) = query_value(&p.top) {
        query.push(("$top".to_string(), top));
    }
    if let Some(token) = non_empty(p.skip_token.clone()) {
        query.push(("$skipToken".to_string(), token));
    }

    let resp = client
        .request(Method::GET, &ws.incidents(), Some(&query), None)
        .await?;
    Ok(resp.into_value())
}

/// Fetches a single incident by ID.
pub async fn get_incident(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IncidentParams = parse_params(params)?;
    let id = required_incident_id(&p.incident_id)?;
    let resp = client.request(Method::GET, &ws.incident(&id), None, None).await?;
    Ok(resp.into_value())
}

/// Replaces an incident's mutable properties.
pub async fn update_incident(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IncidentParams = parse_params(params)?;
    let id = required_incident_id(&p.incident_id)?;

    let mut body = json!({
        "etag": p.etag,
        "properties": {
            "description": p.description,
            "title": p.title,
            "severity": p.severity,
            "classification": p.classification,
            "classificationComment": p.comment,
            "classificationReason": p.reason,
            "status": p.status,
        }
    });
    if let Some(extra) = &p.custom_attributes {
        if is_truthy(extra) {
            body["properties"] = extra.clone();
        }
    }
    let body = prune(body);

    let resp = client
        .request(Method::PUT, &ws.incident(&id), None, Some(&body))
        .await?;
    Ok(resp.into_value())
}

/// Lists the alerts attached to an incident, unwrapping the `value` array.
pub async fn get_alert_list(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IncidentParams = parse_params(params)?;
    let id = required_incident_id(&p.incident_id)?;
    let resp = client
        .request(Method::POST, &ws.incident_alerts(&id), None, Some(&json!({})))
        .await?;
    Ok(resp.into_value_array())
}

/// Lists the entities attached to an incident, returning the full
/// response (the provider includes metadata beside the entity array).
pub async fn get_entities_list(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IncidentParams = parse_params(params)?;
    let id = required_incident_id(&p.incident_id)?;
    let resp = client
        .request(Method::POST, &ws.incident_entities(&id), None, Some(&json!({})))
        .await?;
    Ok(resp.into_value())
}

/// Lists the bookmarks attached to an incident, unwrapping the `value`
/// array.
pub async fn get_bookmarks_list(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IncidentParams = parse_params(params)?;
    let id = required_incident_id(&p.incident_id)?;
    let resp = client
        .request(Method::POST, &ws.incident_bookmarks(&id), None, Some(&json!({})))
        .await?;
    Ok(resp.into_value_array())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_composes_structured_parts_in_order() {
        let params: IncidentListParams = serde_json::from_value(json!({
            "created_datetime": "2026-01-01T00:00:00Z",
            "Status": "Active",
            "Severity": "High"
        }))
        .unwrap();
        assert_eq!(
            incident_filter(&params).unwrap(),
            "properties/createdTimeUtc ge 2026-01-01T00:00:00Z and properties/status eq 'Active' and properties/severity eq 'High'"
        );
    }

    #[test]
    fn raw_filter_is_appended_verbatim() {
        let params: IncidentListParams = serde_json::from_value(json!({
            "Status": "New",
            "$filter": "properties/title eq 'phishing'"
        }))
        .unwrap();
        assert_eq!(
            incident_filter(&params).unwrap(),
            "properties/status eq 'New' and properties/title eq 'phishing'"
        );
    }

    #[test]
    fn empty_parameters_compose_no_filter() {
        let params = IncidentListParams::default();
        assert!(incident_filter(&params).is_none());
    }

    #[test]
    fn update_body_uses_property_whitelist() {
        let p: IncidentParams = serde_json::from_value(json!({
            "incidentId": "inc-1",
            "etag": "\"0300\"",
            "Title": "Escalated",
            "Severity": "High",
            "Status": "Active",
            "Comment": "confirmed"
        }))
        .unwrap();
        let mut body = json!({
            "etag": p.etag,
            "properties": {
                "description": p.description,
                "title": p.title,
                "severity": p.severity,
                "classification": p.classification,
                "classificationComment": p.comment,
                "classificationReason": p.reason,
                "status": p.status,
            }
        });
        if let Some(extra) = &p.custom_attributes {
            if is_truthy(extra) {
                body["properties"] = extra.clone();
            }
        }
        let body = prune(body);
        assert_eq!(body["etag"], "\"0300\"");
        assert_eq!(body["properties"]["title"], "Escalated");
        assert_eq!(body["properties"]["classificationComment"], "confirmed");
        assert!(
            body["properties"].get("description").is_none(),
            "unset whitelist fields must be pruned"
        );
    }

    #[test]
    fn missing_incident_id_is_a_config_error() {
        assert!(matches!(
            required_incident_id(&None),
            Err(SentinelError::Config(_))
        ));
        assert!(matches!(
            required_incident_id(&Some(String::new())),
            Err(SentinelError::Config(_))
        ));
    }
}
