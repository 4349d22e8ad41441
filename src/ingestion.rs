use std::collections::HashSet;

use rayon::prelude::*;
use serde_json::Value;

use crate::{
    config::EngineConfig,
    discovery::as_record,
    normalize::{NormalizedDocument, normalize_document},
    raw_store::RawStore,
};

/// A batch ready to be written: each valid document next to its normalized
/// form, in input order.
pub struct PreparedBatch<'a> {
    pub normalized: Vec<NormalizedDocument>,
    pub originals: Vec<&'a Value>,
}

impl PreparedBatch<'_> {
    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Count the documents whose identifier is already stored or appears
    /// earlier in the batch.
    pub fn shadowed(&self, raw: &RawStore) -> usize {
        let mut seen = HashSet::new();
        self.normalized
            .iter()
            .filter(|n| raw.contains(n.doc_id()) || !seen.insert(n.doc_id()))
            .count()
    }
}

/// Normalize every valid document of `docs` against `fields`.
///
/// Normalization runs in parallel; records that are null, not objects or
/// empty are dropped.
pub fn prepare_batch<'a>(
    docs: &'a [Value],
    fields: &[String],
    config: &EngineConfig,
) -> PreparedBatch<'a> {
    let (normalized, originals): (Vec<_>, Vec<_>) = docs
        .par_iter()
        .filter_map(|doc| {
            let record = as_record(doc)?;
            Some((normalize_document(record, fields, config), doc))
        })
        .unzip();

    PreparedBatch {
        normalized,
        originals,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_invalid_documents_and_keeps_order() {
        let docs = vec![
            json!({"docId": "1", "title": "One"}),
            Value::Null,
            json!({}),
            json!("text"),
            json!({"docId": "2", "title": "Two"}),
        ];
        let config = EngineConfig::default();
        let batch = prepare_batch(&docs, &names(&["title"]), &config);

        assert_eq!(batch.len(), 2);
        let ids: Vec<&str> =
            batch.normalized.iter().map(|n| n.doc_id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(batch.originals[1]["title"], "Two");
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let config = EngineConfig::default();
        let batch = prepare_batch(&[], &names(&["title"]), &config);
        assert!(batch.is_empty());
    }

    #[test]
    fn shadowed_counts_stored_and_repeated_ids() {
        let docs = vec![
            json!({"docId": "old", "title": "a"}),
            json!({"docId": "new", "title": "b"}),
            json!({"docId": "new", "title": "c"}),
            json!({"title": "generated"}),
        ];
        let config = EngineConfig::default();
        let batch = prepare_batch(&docs, &names(&["title"]), &config);

        let mut raw = RawStore::new();
        raw.insert("old".into(), json!({"title": "a"}));
        assert_eq!(batch.shadowed(&raw), 2);
    }
}
