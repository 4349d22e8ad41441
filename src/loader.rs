use std::path::Path;

use serde_json::{Deserializer, Value};

use crate::error::{Error, Result};

/// Read a batch of documents from a JSON file.
///
/// Accepts a single document, an array of documents, or a stream of
/// documents such as JSON Lines. Top-level arrays are flattened one level.
pub fn load_documents(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    parse_documents(&content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_documents(content: &str) -> serde_json::Result<Vec<Value>> {
    let mut docs = Vec::new();
    for value in Deserializer::from_str(content).into_iter::<Value>() {
        match value? {
            Value::Array(items) => docs.extend(items),
            other => docs.push(other),
        }
    }
    Ok(docs)
}
