//! Threat-intelligence indicator operations.
//!
//! Indicators are STIX-patterned observables stored under the workspace's
//! `threatIntelligence/main` collection. Write operations build the
//! indicator body from a fixed field whitelist; a caller-supplied
//! `additional_fields` record replaces the `properties` sub-object
//! wholesale rather than merging. Every body is pruned of empty fields
//! before sending.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::SentinelClient;
use crate::error::{Result, SentinelError};
use crate::paths::Workspace;
use crate::payload::{
    comma_list, is_truthy, non_empty, odata_query, parse_params, prune, stix_pattern,
    stix_pattern_type, ODataParams,
};

/// Caller parameters read by the indicator write operations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    /// Indicator confidence; passed through as given (number or string).
    pub confidence: Value,

    /// Free-text description.
    pub description: Option<String>,

    /// Display name shown in the portal.
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,

    /// Comma-separated tag list.
    #[serde(rename = "threatIntelligenceTags")]
    pub threat_intelligence_tags: Option<String>,

    /// Comma-separated threat type list.
    #[serde(rename = "threatTypes")]
    pub threat_types: Option<String>,

    /// Comma-separated indicator type list.
    #[serde(rename = "indicatorTypes")]
    pub indicator_types: Option<String>,

    /// Comma-separated label list.
    pub labels: Option<String>,

    /// Pattern type, as a friendly label or a STIX identifier.
    #[serde(rename = "patternType")]
    pub pattern_type: Option<String>,

    /// Observable value embedded into the STIX pattern expression.
    pub pattern: Option<String>,

    /// Source system of the indicator.
    pub source: Option<String>,

    /// Raw override for the `properties` sub-object. Replaces the
    /// whitelist-built properties wholesale when non-empty.
    pub additional_fields: Option<Value>,

    /// Indicator ID for the single-resource operations.
    pub id: Option<String>,
}

/// Builds the indicator write body from the parameter whitelist.
fn indicator_payload(params: &IndicatorParams) -> Value {
    let pattern_type = params.pattern_type.as_deref().and_then(stix_pattern_type);
    let pattern = match (pattern_type, params.pattern.as_deref()) {
        (Some(kind), Some(value)) if !value.is_empty() => Value::String(stix_pattern(kind, value)),
        _ => Value::Null,
    };

    let mut payload = json!({
        "kind": "indicator",
        "properties": {
            "confidence": params.confidence,
            "description": params.description,
            "displayName": params.display_name,
            "threatIntelligenceTags": comma_list(params.threat_intelligence_tags.as_deref()),
            "threatTypes": comma_list(params.threat_types.as_deref()),
            "indicatorTypes": comma_list(params.indicator_types.as_deref()),
            "labels": comma_list(params.labels.as_deref()),
            "patternType": pattern_type,
            "pattern": pattern,
            "source": params.source,
        }
    });

    if let Some(extra) = &params.additional_fields {
        if is_truthy(extra) {
            payload["properties"] = extra.clone();
        }
    }

    prune(payload)
}

/// The indicator ID parameter, required by the single-resource operations.
fn required_id(params: &IndicatorParams) -> Result<String> {
    non_empty(params.id.clone())
        .ok_or_else(|| SentinelError::Config("indicator id is required".to_string()))
}

/// Creates a threat-intelligence indicator.
pub async fn create_indicator(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IndicatorParams = parse_params(params)?;
    let body = indicator_payload(&p);
    let resp = client
        .request(Method::POST, &ws.threat_indicator_create(), None, Some(&body))
        .await?;
    Ok(resp.into_value())
}

/// Lists indicators with optional OData filtering, unwrapping the
/// provider's `value` array.
pub async fn get_all_indicators(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let odata: ODataParams = parse_params(params)?;
    let query = odata_query(&odata, true);
    let resp = client
        .request(Method::GET, &ws.threat_indicators(), Some(&query), None)
        .await?;
    Ok(resp.into_value_array())
}

/// Fetches a single indicator by ID.
pub async fn get_indicator(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IndicatorParams = parse_params(params)?;
    let id = required_id(&p)?;
    let resp = client
        .request(Method::GET, &ws.threat_indicator(&id), None, None)
        .await?;
    Ok(resp.into_value())
}

/// Replaces an indicator with a body built from the same whitelist as
/// creation.
pub async fn update_indicator(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IndicatorParams = parse_params(params)?;
    let id = required_id(&p)?;
    let body = indicator_payload(&p);
    let resp = client
        .request(Method::PUT, &ws.threat_indicator(&id), None, Some(&body))
        .await?;
    Ok(resp.into_value())
}

/// Deletes an indicator, translating success into a confirmation message.
/// A 404 is handed back to the caller as the raw response value.
pub async fn delete_indicator(client: &SentinelClient, params: &Value) -> Result<Value> {
    let ws: Workspace = parse_params(params)?;
    let p: IndicatorParams = parse_params(params)?;
    let id = required_id(&p)?;
    let resp = client
        .request(Method::DELETE, &ws.threat_indicator(&id), None, None)
        .await?;
    match resp {
        crate::client::ApiResponse::NotFound { .. } => Ok(resp.into_value()),
        _ => Ok(json!({
            "result": format!("Successfully deleted the indicator {id}")
        })),
    }
}
