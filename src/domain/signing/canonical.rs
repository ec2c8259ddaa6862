//! Canonical form for signed gateway payloads.
//!
//! The gateway rebuilds the canonical text on its side and verifies the
//! signature against it, so two payloads with the same content must
//! serialize to identical bytes regardless of field construction order.

use serde_json::{Map, Value};

/// Returns `value` with the keys of every object, at every depth, sorted
/// by code point. Arrays keep their order and scalars pass through.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            let mut sorted = Map::new();
            for (key, child) in entries {
                sorted.insert(key.clone(), canonicalize(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        scalar => scalar.clone(),
    }
}

/// Minified text of the canonical form.
pub fn to_canonical_string(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&canonicalize(value))
}
