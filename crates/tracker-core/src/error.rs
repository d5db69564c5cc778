use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown block: {0}")]
    UnknownBlock(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("decision id already exists: {0}")]
    DuplicateId(String),

    #[error("decision not found: {0}")]
    DecisionNotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
