use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use serde_json::Value;

use crate::discovery::Document;

/// Process-wide sequence for generated identifiers.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identifier of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    value: String,
    generated: bool,
}

impl DocumentId {
    /// Take the identifier from `id_field` when it holds a non-empty string
    /// or a number, otherwise generate a fresh one.
    pub fn resolve(doc: &Document, id_field: &str, prefix: &str) -> Self {
        let supplied = match doc.get(id_field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        match supplied {
            Some(value) => Self {
                value,
                generated: false,
            },
            None => Self::generate(prefix),
        }
    }

    /// Generate `<prefix>_<unix millis>_<sequence>`.
    ///
    /// The sequence is atomically incremented, so two calls never return the
    /// same value within a process even when the clock does not advance.
    pub fn generate(prefix: &str) -> Self {
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            value: format!("{prefix}_{millis}_{seq}"),
            generated: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
