use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest writer budget the index library accepts for a single thread.
pub const MIN_WRITER_MEMORY_BYTES: usize = 15_000_000;

/// Longest token, in bytes, the index library keeps as a single term.
pub const MAX_TOKEN_BYTES: usize = u16::MAX as usize - 5;

/// How query tokens combine inside a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// A field matches when any query token matches.
    #[default]
    Any,
    /// A field matches only when every query token matches.
    All,
}

/// Engine settings. Every key is optional when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Field carrying a caller-supplied document identifier.
    pub id_field: String,
    /// Internal marker holding the serialized original document.
    pub payload_field: String,
    /// Prefix of generated identifiers.
    pub id_prefix: String,
    /// Result cap used when a search does not give one.
    pub default_limit: usize,
    pub match_mode: MatchMode,
    /// Let a query token match stored tokens that contain it.
    pub partial_match: bool,
    /// Tokens of this many bytes or more are not indexed.
    pub max_token_len: usize,
    pub writer_memory_bytes: usize,
    /// Hydrate hits missing from the raw store from the indexed payload.
    pub recover_from_payload: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_field: "docId".to_string(),
            payload_field: "__raw".to_string(),
            id_prefix: "doc".to_string(),
            default_limit: 20,
            match_mode: MatchMode::Any,
            partial_match: true,
            max_token_len: MAX_TOKEN_BYTES,
            writer_memory_bytes: MIN_WRITER_MEMORY_BYTES,
            recover_from_payload: false,
        }
    }
}

impl EngineConfig {
    /// Load settings from a JSON file, filling missing keys with defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Field names that never take part in field discovery.
    pub fn reserved_fields(&self) -> [&str; 2] {
        [self.id_field.as_str(), self.payload_field.as_str()]
    }

    pub fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("id_field", &self.id_field),
            ("payload_field", &self.payload_field),
        ] {
            if name.is_empty() {
                return Err(Error::Config(format!("{key} must not be empty")));
            }
        }
        if self.id_field == self.payload_field {
            return Err(Error::Config(format!(
                "id_field and payload_field must differ (both {:?})",
                self.id_field
            )));
        }
        if self.id_prefix.is_empty() {
            return Err(Error::Config("id_prefix must not be empty".into()));
        }
        if self.default_limit == 0 {
            return Err(Error::Config(
                "default_limit must be at least 1".into(),
            ));
        }
        if self.max_token_len == 0 || self.max_token_len > MAX_TOKEN_BYTES {
            return Err(Error::Config(format!(
                "max_token_len must be between 1 and {MAX_TOKEN_BYTES}"
            )));
        }
        if self.writer_memory_bytes < MIN_WRITER_MEMORY_BYTES {
            return Err(Error::Config(format!(
                "writer_memory_bytes must be at least {MIN_WRITER_MEMORY_BYTES}"
            )));
        }
        Ok(())
    }
}
