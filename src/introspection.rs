//! Counts and snapshots of the raw store for operational diagnosis.

use serde::Serialize;
use serde_json::Value;

use crate::raw_store::RawStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsResponse {
    pub docs_count: usize,
}

/// Full enumeration of the raw store. Not meant for request paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub total_docs: usize,
    pub sample_doc: Option<Value>,
    pub all_doc_ids: Vec<String>,
}

pub fn stats(raw: &RawStore) -> StatsResponse {
    StatsResponse {
        docs_count: raw.len(),
    }
}

pub fn snapshot(raw: &RawStore) -> DebugSnapshot {
    DebugSnapshot {
        total_docs: raw.len(),
        sample_doc: raw.sample().cloned(),
        all_doc_ids: raw.ids().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_store() {
        let raw = RawStore::new();
        assert_eq!(stats(&raw), StatsResponse { docs_count: 0 });
        assert_eq!(
            serde_json::to_value(snapshot(&raw)).unwrap(),
            json!({"totalDocs": 0, "sampleDoc": null, "allDocIds": []})
        );
    }

    #[test]
    fn snapshot_lists_ids_in_insertion_order() {
        let mut raw = RawStore::new();
        raw.insert("b".into(), json!({"n": 1}));
        raw.insert("a".into(), json!({"n": 2}));

        let snap = snapshot(&raw);
        assert_eq!(snap.total_docs, 2);
        assert_eq!(snap.sample_doc, Some(json!({"n": 1})));
        assert_eq!(snap.all_doc_ids, vec!["b", "a"]);
        assert_eq!(
            serde_json::to_value(stats(&raw)).unwrap(),
            json!({"docs_count": 2})
        );
    }
}
