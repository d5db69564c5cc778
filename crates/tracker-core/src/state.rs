use crate::decision::{Block, Decision, HistoryEntry, Status};
use crate::error::CoreError;
use crate::vocab;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The whole persisted document: `{decisions: [...], history: [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackerState {
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Input for a manually entered decision.
#[derive(Debug, Clone)]
pub struct NewDecision {
    /// Explicit id; generated from the block when absent or blank.
    pub id: Option<String>,
    pub block: Block,
    pub decision: String,
    pub responsible: String,
    pub deadline: Option<String>,
    pub check_date: Option<String>,
    pub status: Status,
    pub comment: String,
    pub source: String,
}

impl NewDecision {
    pub fn new(block: Block, decision: impl Into<String>) -> Self {
        Self {
            id: None,
            block,
            decision: decision.into(),
            responsible: String::new(),
            deadline: None,
            check_date: None,
            status: Status::Active,
            comment: String::new(),
            source: String::new(),
        }
    }
}

/// Field overwrites for an existing decision. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct DecisionUpdate {
    pub status: Option<Status>,
    pub comment: Option<String>,
    /// An empty string clears the deadline.
    pub deadline: Option<String>,
    pub responsible: Option<String>,
}

impl TrackerState {
    pub fn find(&self, id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn count_in_block(&self, block: Block) -> usize {
        self.decisions.iter().filter(|d| d.block == block).count()
    }

    /// Next id for `block`: prefix plus `count in block + 1`, zero-padded
    /// to two digits. Skips forward past ids that are already taken.
    pub fn next_id(&self, block: Block) -> String {
        let prefix = vocab::id_prefix(block);
        let mut seq = self.count_in_block(block) + 1;
        loop {
            let candidate = format!("{}-{:02}", prefix, seq);
            if !self.contains_id(&candidate) {
                return candidate;
            }
            seq += 1;
        }
    }

    /// Decisions matching the optional block and status filters, in store order.
    pub fn filtered(
        &self,
        block: Option<Block>,
        status: Option<Status>,
    ) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(move |d| {
            block.map_or(true, |b| d.block == b) && status.map_or(true, |s| d.status == s)
        })
    }

    pub fn linked_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_linked()).count()
    }

    /// Most recent `sync_pull`/`sync_push` entry.
    pub fn last_sync(&self) -> Option<&HistoryEntry> {
        self.history.iter().rev().find(|h| h.action.is_sync())
    }

    /// Append a manually entered decision and log an `add` entry.
    pub fn add_decision(
        &mut self,
        new: NewDecision,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<String, CoreError> {
        let id = match new.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => {
                if self.contains_id(explicit) {
                    return Err(CoreError::DuplicateId(explicit.to_string()));
                }
                explicit.to_string()
            }
            None => self.next_id(new.block),
        };

        self.decisions.push(Decision {
            id: id.clone(),
            hub_id: None,
            block: new.block,
            decision: new.decision,
            responsible: new.responsible,
            deadline: new.deadline.filter(|s| !s.trim().is_empty()),
            check_date: new.check_date.filter(|s| !s.trim().is_empty()),
            status: new.status,
            comment: new.comment,
            date_created: Some(today.format("%Y-%m-%d").to_string()),
            source: new.source,
            tags: None,
        });
        self.history.push(HistoryEntry::added(id.clone(), now));
        Ok(id)
    }

    /// Apply `update` to decision `id`, logging a `status_change` entry
    /// only when the status actually moves.
    pub fn update_decision(
        &mut self,
        id: &str,
        update: DecisionUpdate,
        now: NaiveDateTime,
    ) -> Result<(), CoreError> {
        let decision = self
            .decisions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| CoreError::DecisionNotFound(id.to_string()))?;

        let old_status = decision.status;
        if let Some(status) = update.status {
            decision.status = status;
        }
        if let Some(comment) = update.comment {
            decision.comment = comment;
        }
        if let Some(deadline) = update.deadline {
            decision.deadline = Some(deadline).filter(|s| !s.trim().is_empty());
        }
        if let Some(responsible) = update.responsible {
            decision.responsible = responsible;
        }

        let new_status = decision.status;
        if old_status != new_status {
            self.history
                .push(HistoryEntry::status_change(id, old_status, new_status, now));
        }
        Ok(())
    }
}
