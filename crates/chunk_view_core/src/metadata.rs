//! crates/chunk_view_core/src/metadata.rs
//!
//! Defensive lookups on the schema-less metadata attached to a chunk.
//!
//! Metadata is user-supplied JSON with no fixed schema. Every consumer goes
//! through these helpers, which treat an absent mapping and an absent key as
//! ordinary conditions rather than errors.

use serde_json::{Map, Value};

/// A string-keyed mapping of arbitrary JSON values.
pub type Metadata = Map<String, Value>;

/// Looks up `key` as a direct entry of `metadata`.
///
/// Returns `None` when the mapping itself is absent or the key is not one of
/// its own entries.
pub fn field<'a>(metadata: Option<&'a Metadata>, key: &str) -> Option<&'a Value> {
    metadata?.get(key)
}

pub fn has_field(metadata: Option<&Metadata>, key: &str) -> bool {
    field(metadata, key).is_some()
}

/// Reads a field as a scalar string.
///
/// Strings are returned as-is and numbers in their decimal form. Booleans,
/// nulls and nested values are not scalar text and yield `None`.
pub fn field_as_string(metadata: Option<&Metadata>, key: &str) -> Option<String> {
    match field(metadata, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Renders a value for display: strings without quotes, anything else as
/// compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Displayable `(key, value)` pairs in key order.
pub fn entries(metadata: Option<&Metadata>) -> Vec<(&str, String)> {
    metadata
        .map(|map| {
            map.iter()
                .map(|(key, value)| (key.as_str(), render_value(value)))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("test metadata must be an object"),
        }
    }

    #[test]
    fn absent_mapping_has_no_fields() {
        assert!(field(None, "page").is_none());
        assert!(!has_field(None, "page"));
        assert!(entries(None).is_empty());
    }

    #[test]
    fn own_entries_are_found() {
        let meta = metadata(json!({ "page": "scan_0042", "count": 3 }));
        assert_eq!(field(Some(&meta), "page"), Some(&json!("scan_0042")));
        assert!(!has_field(Some(&meta), "missing"));
    }

    #[test]
    fn prototype_like_keys_are_plain_misses() {
        let meta = metadata(json!({ "page": 1 }));
        assert!(field(Some(&meta), "__proto__").is_none());
        assert!(field(Some(&meta), "constructor").is_none());
        assert!(field(Some(&meta), "toString").is_none());
    }

    #[test]
    fn scalar_strings() {
        let meta = metadata(json!({
            "s": "abc",
            "n": 57,
            "b": true,
            "o": { "nested": 1 },
            "z": null
        }));
        assert_eq!(field_as_string(Some(&meta), "s").as_deref(), Some("abc"));
        assert_eq!(field_as_string(Some(&meta), "n").as_deref(), Some("57"));
        assert!(field_as_string(Some(&meta), "b").is_none());
        assert!(field_as_string(Some(&meta), "o").is_none());
        assert!(field_as_string(Some(&meta), "z").is_none());
    }

    #[test]
    fn entries_render_in_key_order() {
        let meta = metadata(json!({ "b": "two", "a": [1, 2] }));
        assert_eq!(
            entries(Some(&meta)),
            vec![("a", "[1,2]".to_string()), ("b", "two".to_string())]
        );
    }
}
