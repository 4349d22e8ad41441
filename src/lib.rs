//! docdex - an in-memory search engine for schema-less JSON documents.
//!
//! Documents of any shape are added in batches. The fields of the first batch
//! become the searchable schema of a [Tantivy](https://github.com/quickwit-oss/tantivy)
//! index held in RAM, while the untouched originals are kept in a raw store
//! and returned with every hit.
//!
//! # Quick start
//!
//! ```no_run
//! use docdex::{Engine, EngineConfig};
//! use serde_json::json;
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! engine
//!     .add_documents(&[json!({"title": "Budget Report", "ministry": "Finance"})])
//!     .unwrap();
//!
//! let response = engine.search("budget", Some(10));
//! for hit in &response.hits {
//!     println!("{} {:?}", hit.id, hit.doc);
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod doc_id;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod introspection;
pub mod loader;
pub mod normalize;
pub mod raw_store;
pub mod search;
pub mod tantivy_index;

pub use config::{EngineConfig, MatchMode};
pub use doc_id::DocumentId;
pub use engine::{AddResponse, ClearResponse, Engine};
pub use error::{Error, Result};
pub use introspection::{DebugSnapshot, StatsResponse};
pub use search::{Hit, SearchResponse};
