use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] tracker_core::CoreError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store is locked by another writer: {0}")]
    LockConflict(String),

    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },
}
