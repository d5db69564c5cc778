//! Starting dataset used when no state file exists yet.
//!
//! The built-in seed is the decision register from the February 2026
//! management meetings, kept in `seed.json` next to this file.

use crate::error::StoreError;
use tracker_core::{Decision, TrackerState};

const BUILTIN: &str = include_str!("seed.json");

/// What `load` returns before anything has been saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Seed {
    #[default]
    Builtin,
    Empty,
}

impl Seed {
    pub fn state(self) -> Result<TrackerState, StoreError> {
        let decisions = match self {
            Seed::Builtin => builtin_decisions()?,
            Seed::Empty => Vec::new(),
        };
        Ok(TrackerState {
            decisions,
            history: Vec::new(),
        })
    }
}

pub fn builtin_decisions() -> Result<Vec<Decision>, StoreError> {
    Ok(serde_json::from_str(BUILTIN)?)
}
