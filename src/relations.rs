//! Incident relation operations.
//!
//! A relation links an incident to another workspace resource (bookmark,
//! alert, ...) by its full resource ID under a caller-chosen relation
//! name. Create and update share the same body shape.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::SentinelClient;
use crate::error::{Result, SentinelError};
use crate::incidents::required_incident_id;
use crate::paths::Workspace;
use crate::payload::{non_empty, odata_query, parse_params, ODataParams};

/// Parameters for the relation operations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RelationParams {
    /// Incident the relation belongs to.
    #[serde(rename = "incidentId")]
    pub incident_id: Option<String>,

    /// Caller-chosen relation name.
    #[serde(rename = "relationName")]
    pub relation_name: Option<String>,

    /// Full resource ID of the related resource.
    #[serde(rename = "resourceId")]
    pub resource_id: Option<String>,
}

fn required_relation_name(params: &RelationParams) -> Result<String> {
    non_empty(params.relation_name.clone())
        .ok_or_else(|| SentinelError::Config("relationName is required".to_string()))
}

fn relation_body(params: &RelationParams) -> Value {
    json!({
        "properties": {
            "relatedResourceId": params.resource_id,
        }
    })
}

/// Creates a named relation on an incident.
pub async fn create_incident_relations(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: RelationParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let name = required_relation_name(&p)?;
    let body = relation_body(&p);
    let resp = client
        .request(
            Method::PUT,
            &ws.incident_relation(&incident_id, &name),
            None,
            Some(&body),
        )
        .await?;
    Ok(resp.into_value())
}

/// Lists the relations on an incident, returning the full response.
pub async fn get_all_incident_relations(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: RelationParams = parse_params(params)?;
    let odata: ODataParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let query = odata_query(&odata, true);
    let resp = client
        .request(
            Method::GET,
            &ws.incident_relations(&incident_id),
            Some(&query),
            None,
        )
        .await?;
    Ok(resp.into_value())
}

/// Fetches a single named relation.
pub async fn get_incident_relations(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: RelationParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let name = required_relation_name(&p)?;
    let resp = client
        .request(
            Method::GET,
            &ws.incident_relation(&incident_id, &name),
            None,
            None,
        )
        .await?;
    Ok(resp.into_value())
}

/// Replaces a named relation; same body shape as creation.
pub async fn update_incident_relations(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: RelationParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let name = required_relation_name(&p)?;
    let body = relation_body(&p);
    let resp = client
        .request(
            Method::PUT,
            &ws.incident_relation(&incident_id, &name),
            None,
            Some(&body),
        )
        .await?;
    Ok(resp.into_value())
}

/// Deletes a named relation, translating success into a confirmation
/// message. A 404 is handed back as the raw response value.
pub async fn delete_incident_relation(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: RelationParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let name = required_relation_name(&p)?;
    let resp = client
        .request(
            Method::DELETE,
            &ws.incident_relation(&incident_id, &name),
            None,
            Some(&json!({})),
        )
        .await?;
    match resp {
        crate::client::ApiResponse::NotFound { .. } => Ok(resp.into_value()),
        _ => Ok(json!({
            "result": format!(
                "Successfully deleted the incident relation '{name}' for specific incident '{incident_id}'"
            )
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_nests_related_resource_id_under_properties() {
        let params: RelationParams = serde_json::from_value(json!({
            "incidentId": "inc-1",
            "relationName": "bookmark-link",
            "resourceId": "/subscriptions/s/resourceGroups/r/providers/x/bookmarks/b"
        }))
        .unwrap();
        let body = relation_body(&params);
        assert_eq!(
            body["properties"]["relatedResourceId"],
            "/subscriptions/s/resourceGroups/r/providers/x/bookmarks/b"
        );
    }

    #[test]
    fn missing_relation_name_is_a_config_error() {
        let params = RelationParams::default();
        assert!(matches!(
            required_relation_name(&params),
            Err(SentinelError::Config(_))
        ));
    }
}
