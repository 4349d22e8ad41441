use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("index error: {0}")]
    Index(#[from] tantivy::TantivyError),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("batch of {count} documents rejected: {reason}")]
    BatchRejected { count: usize, reason: String },
}
