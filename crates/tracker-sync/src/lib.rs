//! Two-way synchronization between the local tracker and the context hub.

pub mod config;
pub mod error;
pub mod hub;
pub mod reconcile;

pub use config::{HubConfig, SyncConfig};
pub use error::{HubError, SyncError};
pub use hub::{HubApi, HubClient};
pub use reconcile::{Overview, PushOutcome, Reconciler, SkipReason, SoftFailure, SyncReport};
