//! Request payload shaping shared by the operation handlers.
//!
//! Three concerns live here:
//! - [`prune`] — the recursive empty-value filter applied to every write
//!   body and query set, so the provider never receives empty filter or
//!   body fields;
//! - comma-separated list shaping for the indicator tag/type fields;
//! - STIX pattern construction, including the mapping from the host's
//!   friendly pattern-type labels to STIX observable type identifiers.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Deserializes a typed parameter struct from the caller's raw parameter
/// record. Unrecognized keys are ignored; handlers read a fixed subset.
pub(crate) fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T> {
    Ok(serde_json::from_value(params.clone())?)
}

/// Recursively strips empty and falsy values from a JSON object.
///
/// Dropped: `null`, `false`, numeric zero, empty strings, empty arrays,
/// and nested objects that become empty after pruning. Non-empty arrays
/// pass through unchanged (they are not recursed into). Idempotent:
/// pruning a pruned object is a no-op.
pub fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut pruned = Map::new();
            for (key, entry) in map {
                match entry {
                    Value::Object(_) => {
                        let nested = prune(entry);
                        if nested.as_object().is_some_and(|m| !m.is_empty()) {
                            pruned.insert(key, nested);
                        }
                    }
                    other => {
                        if is_truthy(&other) {
                            pruned.insert(key, other);
                        }
                    }
                }
            }
            Value::Object(pruned)
        }
        other => other,
    }
}

/// Truthiness for scalar and array values, matching the pruning contract.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Filters out absent and empty-string parameter values.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Splits a comma-separated parameter into a JSON string array.
/// Absent or empty input yields `Null`, which pruning drops.
pub fn comma_list(value: Option<&str>) -> Value {
    match value {
        Some(s) if !s.is_empty() => {
            Value::Array(s.split(',').map(|item| Value::String(item.to_string())).collect())
        }
        _ => Value::Null,
    }
}

/// Maps the host's pattern-type labels to STIX observable type
/// identifiers. STIX identifiers are also accepted verbatim so callers
/// may pass either form.
pub fn stix_pattern_type(label: &str) -> Option<&'static str> {
    match label {
        "Domain Name" | "domain-name" => Some("domain-name"),
        "File" | "file" => Some("file"),
        "IPv4 Address" | "ipv4-addr" => Some("ipv4-addr"),
        "IPv6 Address" | "ipv6-addr" => Some("ipv6-addr"),
        "URL" | "url" => Some("url"),
        _ => None,
    }
}

/// Builds the STIX pattern expression for an indicator:
/// `[{type}:value = {value}]`.
pub fn stix_pattern(pattern_type: &str, value: &str) -> String {
    format!("[{pattern_type}:value = {value}]")
}

/// Normalizes a parameter that may arrive as a number or a string into a
/// query-string value. Empty strings and nulls are dropped.
pub(crate) fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// OData paging/filtering parameters shared by the list operations.
///
/// `$top` is typed as a raw value because hosts pass it as either a number
/// or a string.
#[derive(Debug, Default, Deserialize)]
pub struct ODataParams {
    /// OData filter expression, relative to the resource `properties`.
    #[serde(rename = "$filter", default)]
    pub filter: Option<String>,

    /// OData ordering expression, relative to the resource `properties`.
    #[serde(rename = "$orderby", default)]
    pub orderby: Option<String>,

    /// Maximum number of results to return.
    #[serde(rename = "$top", default)]
    pub top: Value,

    /// Continuation token from a previous page.
    #[serde(rename = "$skipToken", default)]
    pub skip_token: Option<String>,
}

/// Builds the query pairs for an OData list call, dropping empty values.
///
/// When `prefix_properties` is set, `$filter` and `$orderby` expressions
/// are prefixed with `properties/` — the indicator, relation, and comment
/// collections expose their filterable fields under that sub-object.
pub(crate) fn odata_query(params: &ODataParams, prefix_properties: bool) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(filter) = non_empty(params.filter.clone()) {
        let expr = if prefix_properties {
            format!("properties/{filter}")
        } else {
            filter
        };
        query.push(("$filter".to_string(), expr));
    }
    if let Some(orderby) = non_empty(params.orderby.clone()) {
        let expr = if prefix_properties {
            format!("properties/{orderby}")
        } else {
            orderby
        };
        query.push(("$orderby".to_string(), expr));
    }
    if let Some(top) = query_value(&params.top) {
        query.push(("$top".to_string(), top));
    }
    if let Some(token) = non_empty(params.skip_token.clone()) {
        query.push(("$skipToken".to_string(), token));
    }
    query
}
