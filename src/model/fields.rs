// src/model/fields.rs
//! Loose-JSON field access.
//!
//! Folder pages carry records whose shape depends on `targetType`; fields
//! may be missing, null, empty, or numbers where strings are expected.
//! These helpers flatten all of that into trimmed strings.

use serde_json::{Map, Value};

/// Whether a value counts as present: not null, not empty, not zero, not false.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Renders a scalar as text. Null becomes the empty string.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Trimmed text of the first present field among `keys`, or `""`.
pub fn first_text(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| is_present(value))
        .map(|value| text_of(value).trim().to_string())
        .unwrap_or_default()
}

/// Trimmed text of a single field, or `""`.
pub fn field_text(object: &Map<String, Value>, key: &str) -> String {
    first_text(object, &[key])
}

/// Reads an integer that may arrive as a JSON number or a numeric string.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
