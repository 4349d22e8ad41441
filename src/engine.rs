use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    config::EngineConfig,
    discovery::{discover_fields, merge_fields},
    error::{Error, Result},
    ingestion::prepare_batch,
    introspection::{self, DebugSnapshot, StatsResponse},
    raw_store::RawStore,
    search::{SearchResponse, execute_search},
    tantivy_index::FieldIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AddResponse {
    pub indexed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// Lifecycle of the index: created by the first batch with fields,
/// dropped by `clear`.
#[derive(Debug, Default)]
enum IndexState {
    #[default]
    Uninitialized,
    Active(FieldIndex),
}

impl IndexState {
    /// Move to `Active` over `fields` if not there yet.
    ///
    /// When no field is left to index nothing is created and `None` is
    /// returned, so the next batch runs discovery again.
    fn get_or_create(
        &mut self,
        fields: &[String],
        config: &EngineConfig,
    ) -> Result<Option<&mut FieldIndex>> {
        if let IndexState::Uninitialized = self {
            let index = match fields {
                [] => None,
                _ => Some(FieldIndex::create(fields, config)?),
            };
            let Some(index) = index.filter(|index| index.num_fields() > 0)
            else {
                warn!("no indexable fields discovered, index not created");
                return Ok(None);
            };
            info!(fields = ?index.field_names(), "index created");
            *self = IndexState::Active(index);
        }

        match self {
            IndexState::Active(index) => Ok(Some(index)),
            IndexState::Uninitialized => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
struct EngineState {
    index: IndexState,
    raw: RawStore,
}

/// The document engine: one index and one raw store behind a single
/// read-write lock.
///
/// Share it across request handlers with an `Arc`. Writers (`add_documents`,
/// `clear`) are exclusive; `search`, `stats` and `debug` run concurrently.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    state: RwLock<EngineState>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: RwLock::new(EngineState::default()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, EngineState>> {
        self.state
            .write()
            .map_err(|_| Error::LockPoisoned("engine state"))
    }

    /// Index a batch and keep the originals for retrieval.
    ///
    /// Invalid entries (null, non-object, empty object) are skipped. A batch
    /// without any indexable field is a no-op. If the index rejects the
    /// batch, nothing from it is stored and the error is returned.
    pub fn add_documents(&self, docs: &[Value]) -> Result<AddResponse> {
        let batch_fields =
            discover_fields(docs, &self.config.reserved_fields());

        let mut guard = self.write()?;
        let state = &mut *guard;

        let Some(index) =
            state.index.get_or_create(&batch_fields, &self.config)?
        else {
            return Ok(AddResponse::default());
        };
        if batch_fields.is_empty() {
            debug!(docs = docs.len(), "batch has no indexable fields");
            return Ok(AddResponse::default());
        }

        let active_fields = merge_fields(&index.field_names(), &batch_fields);
        let batch = prepare_batch(docs, &active_fields, &self.config);
        let indexed = batch.len();
        let shadowed = batch.shadowed(&state.raw);

        if let Err(err) = index.insert_batch(&batch.normalized, shadowed) {
            error!(docs = indexed, error = %err, "failed to index batch");
            return Err(Error::BatchRejected {
                count: indexed,
                reason: err.to_string(),
            });
        }

        for (norm, original) in batch.normalized.iter().zip(batch.originals) {
            state.raw.insert(norm.doc_id().to_string(), original.clone());
        }

        info!(indexed, shadowed, total = state.raw.len(), "batch indexed");
        Ok(AddResponse { indexed })
    }

    /// Search every indexed field for `query`.
    ///
    /// `limit` defaults to the configured cap. Never fails: an empty query,
    /// an uninitialized index or an internal error all give an empty
    /// response.
    pub fn search(&self, query: &str, limit: Option<usize>) -> SearchResponse {
        let limit = limit.unwrap_or(self.config.default_limit);
        if query.trim().is_empty() || limit == 0 {
            return SearchResponse::empty();
        }

        let state = self.read();
        let IndexState::Active(index) = &state.index else {
            return SearchResponse::empty();
        };

        match execute_search(
            index,
            &state.raw,
            query,
            limit,
            self.config.recover_from_payload,
        ) {
            Ok(response) => response,
            Err(err) => {
                warn!(query, error = %err, "search failed, returning no hits");
                SearchResponse::empty()
            }
        }
    }

    /// Drop the index and every stored document. Idempotent.
    pub fn clear(&self) -> ClearResponse {
        let mut state =
            self.state.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = state.raw.len();
        *state = EngineState::default();
        self.state.clear_poison();
        info!(docs = dropped, "engine cleared");
        ClearResponse { cleared: true }
    }

    pub fn stats(&self) -> StatsResponse {
        introspection::stats(&self.read().raw)
    }

    pub fn debug(&self) -> DebugSnapshot {
        introspection::snapshot(&self.read().raw)
    }

    /// The stored original for `id`.
    pub fn get(&self, id: &str) -> Option<Value> {
        self.read().raw.get(id).cloned()
    }

    /// Fields fixed when the index was created; empty before that.
    pub fn indexed_fields(&self) -> Vec<String> {
        match &self.read().index {
            IndexState::Active(index) => index.field_names(),
            IndexState::Uninitialized => Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.read().index, IndexState::Active(_))
    }
}
