use serde_json::Value;

use crate::{config::EngineConfig, discovery::Document, doc_id::DocumentId};

/// The searchable form of a document.
///
/// Holds one lowercased string per active field plus the serialized original.
/// Never modified once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    doc_id: String,
    fields: Vec<(String, String)>,
    payload: String,
}

impl NormalizedDocument {
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Normalized value of `field`, if it was part of the active field set.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// The original document serialized as JSON.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Convert one field value to its indexable string.
///
/// Strings are trimmed and lowercased, other scalars go through their
/// canonical JSON text first, `null` becomes empty, and records and arrays
/// are serialized as compact JSON.
pub fn normalize_value(value: &Value) -> String {
    let text = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    };
    text.trim().to_lowercase()
}

/// Normalize a query string the same way string field values are.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Build the normalized form of `doc` over `fields`.
///
/// Fields missing from the document normalize to the empty string.
pub fn normalize_document(
    doc: &Document,
    fields: &[String],
    config: &EngineConfig,
) -> NormalizedDocument {
    let doc_id =
        DocumentId::resolve(doc, &config.id_field, &config.id_prefix)
            .into_string();

    let fields = fields
        .iter()
        .map(|name| {
            let value = doc.get(name).map(normalize_value).unwrap_or_default();
            (name.clone(), value)
        })
        .collect();

    NormalizedDocument {
        doc_id,
        fields,
        payload: Value::Object(doc.clone()).to_string(),
    }
}
