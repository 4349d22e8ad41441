//! Field discovery over batches of schema-less documents.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// A schema-less document: field name to JSON value, in insertion order.
pub type Document = Map<String, Value>;

/// Return the document as a record if it is a non-empty JSON object.
///
/// `null`, scalars, arrays and `{}` are not indexable documents.
pub fn as_record(value: &Value) -> Option<&Document> {
    match value {
        Value::Object(map) if !map.is_empty() => Some(map),
        _ => None,
    }
}

/// Union of the field names found across `docs`, in order of first
/// appearance, leaving out `reserved` names and non-record entries.
///
/// An empty result means the batch has nothing to index.
pub fn discover_fields(docs: &[Value], reserved: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();

    for doc in docs.iter().filter_map(as_record) {
        for key in doc.keys() {
            if reserved.contains(&key.as_str()) {
                continue;
            }
            if seen.insert(key.as_str()) {
                fields.push(key.clone());
            }
        }
    }

    fields
}

/// Append the fields of `extra` missing from `base`, keeping `base` first.
pub fn merge_fields(base: &[String], extra: &[String]) -> Vec<String> {
    let mut merged = base.to_vec();
    for field in extra {
        if !merged.contains(field) {
            merged.push(field.clone());
        }
    }
    merged
}
