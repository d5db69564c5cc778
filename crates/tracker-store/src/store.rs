use crate::error::StoreError;
use crate::lockfile::WriteLock;
use crate::seed::Seed;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracker_core::TrackerState;

/// The tracker document on disk: a single JSON file holding
/// `{decisions: [...], history: [...]}`.
///
/// Every write goes through [`WriteLock`], so a crash mid-save leaves the
/// previous document in place.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    seed: Seed,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: Seed::default(),
        }
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether anything has been persisted yet.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the current document, or the seed when nothing is persisted.
    pub fn load(&self) -> Result<TrackerState, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), seed = ?self.seed, "no state file, using seed");
            return self.seed.state();
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Persist `state`, replacing the previous document.
    pub fn save(&self, state: &TrackerState) -> Result<(), StoreError> {
        let lock = WriteLock::acquire(&self.path)?;
        Self::write_locked(lock, state)
    }

    /// Run a locked load -> mutate -> save cycle.
    ///
    /// The lock is held from before the load until after the write, so two
    /// concurrent mutators cannot interleave: the second one fails with
    /// [`StoreError::LockConflict`]. The document is only rewritten when `f`
    /// actually changed the state; otherwise the file is left untouched.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TrackerState) -> Result<T, E>,
        E: From<StoreError>,
    {
        let lock = WriteLock::acquire(&self.path)?;
        let mut state = self.load()?;
        let before = state.clone();

        let out = f(&mut state)?;

        if state != before {
            Self::write_locked(lock, &state)?;
        } else {
            debug!(path = %self.path.display(), "state unchanged, skipping write");
        }
        Ok(out)
    }

    fn write_locked(mut lock: WriteLock, state: &TrackerState) -> Result<(), StoreError> {
        let mut json = serde_json::to_string_pretty(state)?;
        json.push('\n');
        lock.write_all(json.as_bytes())?;
        debug!(
            path = %lock.target().display(),
            decisions = state.decisions.len(),
            history = state.history.len(),
            "saving state"
        );
        lock.commit()
    }
}
