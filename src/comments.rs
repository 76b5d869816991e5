//! Incident comment operations.
//!
//! The provider expects the comment identifier in the URL even on
//! creation, so `create_incident_comment` generates a random 128-bit
//! integer identifier client-side — the same addressing scheme the portal
//! uses.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::SentinelClient;
use crate::error::{Result, SentinelError};
use crate::incidents::required_incident_id;
use crate::paths::Workspace;
use crate::payload::{non_empty, odata_query, parse_params, ODataParams};

/// Parameters for the comment operations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentParams {
    /// Incident the comment belongs to.
    #[serde(rename = "incidentId")]
    pub incident_id: Option<String>,

    /// Comment identifier for the single-comment operations.
    #[serde(rename = "incidentcommentId")]
    pub comment_id: Option<String>,

    /// Comment message body.
    pub message: Option<String>,
}

fn required_comment_id(params: &CommentParams) -> Result<String> {
    non_empty(params.comment_id.clone())
        .ok_or_else(|| SentinelError::Config("incidentcommentId is required".to_string()))
}

fn comment_body(params: &CommentParams) -> Value {
    json!({
        "properties": {
            "message": params.message,
        }
    })
}

/// Creates a comment under a client-generated 128-bit identifier.
pub async fn create_incident_comment(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: CommentParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let comment_id = rand::random::<u128>().to_string();
    let body = comment_body(&p);
    let resp = client
        .request(
            Method::PUT,
            &ws.incident_comment(&incident_id, &comment_id),
            None,
            Some(&body),
        )
        .await?;
    Ok(resp.into_value())
}

/// Lists the comments on an incident, returning the full response.
pub async fn get_all_incident_comments(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: CommentParams = parse_params(params)?;
    let odata: ODataParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let query = odata_query(&odata, true);
    let resp = client
        .request(
            Method::GET,
            &ws.incident_comments(&incident_id),
            Some(&query),
            None,
        )
        .await?;
    Ok(resp.into_value())
}

/// Fetches a single comment.
pub async fn get_incident_comment(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: CommentParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let comment_id = required_comment_id(&p)?;
    let resp = client
        .request(
            Method::GET,
            &ws.incident_comment(&incident_id, &comment_id),
            None,
            None,
        )
        .await?;
    Ok(resp.into_value())
}

/// Replaces a comment's message.
pub async fn update_incident_comment(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: CommentParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let comment_id = required_comment_id(&p)?;
    let body = comment_body(&p);
    let resp = client
        .request(
            Method::PUT,
            &ws.incident_comment(&incident_id, &comment_id),
            None,
            Some(&body),
        )
        .await?;
    Ok(resp.into_value())
}

/// Deletes a comment, translating success into a confirmation message.
/// A 404 is handed back as the raw response value.
pub async fn delete_incident_comment(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: CommentParams = parse_params(params)?;
    let incident_id = required_incident_id(&p.incident_id)?;
    let comment_id = required_comment_id(&p)?;
    let resp = client
        .request(
            Method::DELETE,
            &ws.incident_comment(&incident_id, &comment_id),
            None,
            Some(&json!({})),
        )
        .await?;
    match resp {
        crate::client::ApiResponse::NotFound { .. } => Ok(resp.into_value()),
        _ => Ok(json!({
            "result": format!(
                "Successfully deleted the incident comment {comment_id} for a particular incident {incident_id}"
            )
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_nests_message_under_properties() {
        let params: CommentParams = serde_json::from_value(json!({
            "incidentId": "inc-1",
            "message": "triaged by SOC"
        }))
        .unwrap();
        assert_eq!(comment_body(&params)["properties"]["message"], "triaged by SOC");
    }

    #[test]
    fn generated_comment_identifiers_fit_128_bits() {
        // The identifier is a decimal u128; 2^128 has 39 digits.
        let id = rand::random::<u128>().to_string();
        assert!(id.len() <= 39);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn missing_comment_id_is_a_config_error() {
        let params = CommentParams::default();
        assert!(matches!(
            required_comment_id(&params),
            Err(SentinelError::Config(_))
        ));
    }
}
