use thiserror::Error;
use tracker_store::StoreError;

/// Failures inside the hub client. Apart from construction these never
/// leave the client: the request surface logs them and answers `None`.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("hub answered {0}")]
    Status(reqwest::StatusCode),

    #[error("undecodable response body: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
