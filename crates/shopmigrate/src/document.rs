//! Field accessors for loosely-typed source documents.
//!
//! The source store hands back raw JSON. These helpers pull typed values out
//! at the phase boundary, tolerating the extended JSON forms the Data API
//! emits for identifiers, numbers and dates. Nothing past the per-phase
//! transform step sees the loose shape.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{Error, Result};

/// A loosely-typed source record.
pub type Document = Value;

/// Returns the source identifier of a document.
///
/// Handles both plain string ids and the `{"$oid": "..."}` wrapper.
/// Documents without a usable id yield `"unknown"` so error entries stay
/// traceable.
#[must_use]
pub fn id_of(doc: &Document) -> String {
    doc.get("_id")
        .and_then(ref_id)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reads an identifier value: a plain string, a number, or an
/// `{"$oid": "..."}` wrapper.
#[must_use]
pub fn ref_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => obj.get("$oid").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// Required string field.
pub fn require_str(doc: &Document, name: &str) -> Result<String> {
    doc.get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| missing(name, "string"))
}

/// Required numeric field. Accepts plain JSON numbers as well as the
/// `$numberInt` / `$numberLong` / `$numberDouble` / `$numberDecimal`
/// wrappers.
pub fn require_f64(doc: &Document, name: &str) -> Result<f64> {
    doc.get(name).and_then(as_number).ok_or_else(|| missing(name, "number"))
}

/// Required boolean field.
pub fn require_bool(doc: &Document, name: &str) -> Result<bool> {
    doc.get(name)
        .and_then(Value::as_bool)
        .ok_or_else(|| missing(name, "boolean"))
}

/// Optional integer field; non-numeric values read as absent.
#[must_use]
pub fn opt_i64(doc: &Document, name: &str) -> Option<i64> {
    let value = doc.get(name)?;
    value.as_i64().or_else(|| as_number(value).map(|f| f as i64))
}

/// String-array field; a missing or malformed value reads as empty.
#[must_use]
pub fn string_array(doc: &Document, name: &str) -> Vec<String> {
    doc.get(name)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Timestamp field. Accepts RFC 3339 strings, `{"$date": "..."}` and
/// `{"$date": {"$numberLong": "<millis>"}}`; anything else reads as absent.
#[must_use]
pub fn datetime(doc: &Document, name: &str) -> Option<DateTime<Utc>> {
    parse_datetime(doc.get(name)?)
}

fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_rfc3339(s),
        Value::Object(obj) => match obj.get("$date")? {
            Value::String(s) => parse_rfc3339(s),
            Value::Object(inner) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        },
        _ => None,
    }
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(obj) => ["$numberDecimal", "$numberDouble", "$numberLong", "$numberInt"]
            .iter()
            .find_map(|k| obj.get(*k))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
        _ => None,
    }
}

fn missing(name: &str, expected: &str) -> Error {
    Error::Transform(format!("missing or invalid {expected} field '{name}'"))
}
