//! Data model and pure operations for the decision tracker.

pub mod decision;
pub mod error;
pub mod remote;
pub mod state;
pub mod vocab;

pub use decision::{Block, Decision, HistoryAction, HistoryEntry, Status};
pub use error::CoreError;
pub use remote::RemoteDecision;
pub use state::{DecisionUpdate, NewDecision, TrackerState};
