use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Result,
    normalize::normalize_query,
    raw_store::RawStore,
    tantivy_index::{FieldIndex, FieldMatch},
};

/// One deduplicated result: the identifier and its original document.
///
/// `doc` is `None` when the identifier is no longer in the raw store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub id: String,
    pub doc: Option<Value>,
}

/// Response of a search. `total` is the number of returned hits.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub hits: Vec<Hit>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_hits(hits: Vec<Hit>) -> Self {
        Self {
            total: hits.len(),
            hits,
        }
    }
}

/// Union per-field match lists by identifier.
///
/// Fields are visited in order and each list in rank order; the first
/// occurrence of an identifier wins. Stops once `limit` identifiers are
/// collected.
pub fn merge_hits(
    per_field: Vec<Vec<FieldMatch>>,
    limit: usize,
) -> Vec<FieldMatch> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for field_matches in per_field {
        for m in field_matches {
            if merged.len() >= limit {
                return merged;
            }
            if seen.insert(m.doc_id.clone()) {
                merged.push(m);
            }
        }
    }

    merged
}

/// Execute the query pipeline against an active index.
///
/// 1. Normalize the query and split it with the index analyzer
/// 2. Match every field independently
/// 3. Merge and deduplicate by identifier, capped at `limit`
/// 4. Hydrate from the raw store
pub fn execute_search(
    index: &FieldIndex,
    raw: &RawStore,
    query: &str,
    limit: usize,
    recover_from_payload: bool,
) -> Result<SearchResponse> {
    let query = normalize_query(query);
    if query.is_empty() || limit == 0 {
        return Ok(SearchResponse::empty());
    }

    let tokens = index.tokenize(&query);
    if tokens.is_empty() {
        return Ok(SearchResponse::empty());
    }

    let per_field = index.search(&tokens, limit)?;
    let hits = merge_hits(per_field, limit)
        .into_iter()
        .map(|m| hydrate(raw, m, recover_from_payload))
        .collect();

    Ok(SearchResponse::from_hits(hits))
}

fn hydrate(raw: &RawStore, m: FieldMatch, recover: bool) -> Hit {
    let doc = match raw.get(&m.doc_id) {
        Some(doc) => Some(doc.clone()),
        None if recover => serde_json::from_str(&m.payload).ok(),
        None => None,
    };
    Hit { id: m.doc_id, doc }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{config::EngineConfig, normalize::normalize_document};

    fn fm(id: &str) -> FieldMatch {
        FieldMatch {
            doc_id: id.to_string(),
            payload: format!(r#"{{"docId":"{id}"}}"#),
        }
    }

    fn merged_ids(per_field: Vec<Vec<FieldMatch>>, limit: usize) -> Vec<String> {
        merge_hits(per_field, limit)
            .into_iter()
            .map(|m| m.doc_id)
            .collect()
    }

    #[test]
    fn merge_dedups_across_fields() {
        let per_field = vec![
            vec![fm("a"), fm("b")],
            vec![fm("b"), fm("c"), fm("a")],
        ];
        assert_eq!(merged_ids(per_field, 10), vec!["a", "b", "c"]);
    }

    #[test]
    fn merge_caps_after_dedup() {
        let per_field = vec![vec![fm("a"), fm("a"), fm("a")], vec![fm("b")]];
        assert_eq!(merged_ids(per_field, 2), vec!["a", "b"]);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_hits(Vec::new(), 5).is_empty());
        assert!(merged_ids(vec![vec![fm("a")]], 0).is_empty());
    }

    fn setup() -> (FieldIndex, RawStore) {
        let config = EngineConfig::default();
        let fields = vec!["title".to_string(), "ministry".to_string()];
        let mut index = FieldIndex::create(&fields, &config).unwrap();
        let mut raw = RawStore::new();

        let docs = [
            json!({"docId": "r1", "title": "Budget Report", "ministry": "Finance"}),
            json!({"docId": "r2", "title": "Finance Plan", "ministry": "Budget Office"}),
        ];
        let normalized: Vec<_> = docs
            .iter()
            .map(|d| {
                normalize_document(d.as_object().unwrap(), &fields, &config)
            })
            .collect();
        index.insert_batch(&normalized, 0).unwrap();
        for (n, d) in normalized.iter().zip(docs) {
            raw.insert(n.doc_id().to_string(), d);
        }
        (index, raw)
    }

    #[test]
    fn hits_carry_original_documents() {
        let (index, raw) = setup();
        let response =
            execute_search(&index, &raw, "  BUDGET ", 20, false).unwrap();

        assert_eq!(response.total, 2);
        assert_eq!(response.hits[0].id, "r1");
        let doc = response.hits[0].doc.as_ref().unwrap();
        assert_eq!(doc["ministry"], "Finance");
        assert_eq!(doc["title"], "Budget Report");
    }

    #[test]
    fn multi_field_match_is_returned_once() {
        let (index, raw) = setup();
        let response =
            execute_search(&index, &raw, "finance budget", 20, false).unwrap();
        let mut ids: Vec<&str> =
            response.hits.iter().map(|h| h.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn blank_or_symbol_queries_return_nothing() {
        let (index, raw) = setup();
        for q in ["", "   ", "?!"] {
            let response = execute_search(&index, &raw, q, 20, false).unwrap();
            assert_eq!(response, SearchResponse::empty());
        }
    }

    #[test]
    fn missing_raw_entry_yields_null_doc() {
        let (index, _) = setup();
        let empty = RawStore::new();
        let response =
            execute_search(&index, &empty, "report", 20, false).unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.hits[0].doc, None);
    }

    #[test]
    fn missing_raw_entry_recovered_from_payload() {
        let (index, _) = setup();
        let empty = RawStore::new();
        let response =
            execute_search(&index, &empty, "report", 20, true).unwrap();
        let doc = response.hits[0].doc.as_ref().unwrap();
        assert_eq!(doc["ministry"], "Finance");
    }

    #[test]
    fn response_serializes_with_external_keys() {
        let response = SearchResponse::from_hits(vec![Hit {
            id: "a".into(),
            doc: None,
        }]);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"total": 1, "hits": [{"id": "a", "doc": null}]})
        );
    }
}
