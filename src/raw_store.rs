use std::collections::HashMap;

use serde_json::Value;

/// Original documents keyed by identifier.
///
/// Reusing an identifier overwrites the stored document but keeps its
/// original insertion position.
#[derive(Debug, Default)]
pub struct RawStore {
    docs: HashMap<String, Value>,
    order: Vec<String>,
}

impl RawStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `doc` under `id`. Returns `true` when `id` was not present.
    pub fn insert(&mut self, id: String, doc: Value) -> bool {
        if let Some(slot) = self.docs.get_mut(&id) {
            *slot = doc;
            return false;
        }
        self.order.push(id.clone());
        self.docs.insert(id, doc);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.docs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// The earliest stored document.
    pub fn sample(&self) -> Option<&Value> {
        self.order.first().and_then(|id| self.docs.get(id))
    }

    /// All identifiers in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn clear(&mut self) {
        self.docs.clear();
        self.order.clear();
    }
}
