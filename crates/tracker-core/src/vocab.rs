//! Translation tables between local and hub vocabulary.
//!
//! The hub has a coarser status model (`active`/`archived`/`superseded`),
//! so mapping a local status onto the hub is lossy: `overdue`, `deferred`
//! and `no_deadline` all collapse to `active`. Pulling the record back
//! yields `active`, never the original finer status.

use crate::decision::{Block, Status};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hub domain of the `open` block, and the domain assumed for hub records
/// that carry none.
pub const DEFAULT_DOMAIN: &str = "general";

/// Status values understood by the hub.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HubStatus {
    Active,
    Archived,
    Superseded,
}

impl HubStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for HubStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a hub domain onto a local block. Unknown domains land in `open`.
pub fn block_for_domain(domain: &str) -> Block {
    match domain {
        "hr" => Block::Structure,
        "sales" | "marketing" => Block::Sales,
        "management" => Block::Coo,
        "finance" => Block::Finance,
        "operations" | "china" | "logistics" => Block::Ops,
        _ => Block::Open,
    }
}

pub fn domain_for_block(block: Block) -> &'static str {
    match block {
        Block::Structure => "hr",
        Block::Sales => "sales",
        Block::Coo => "management",
        Block::Finance => "finance",
        Block::Ops => "operations",
        Block::Open => DEFAULT_DOMAIN,
    }
}

/// Map a hub status onto a local status. Unmapped values become `active`.
pub fn status_from_hub(hub_status: &str) -> Status {
    match hub_status {
        "archived" | "superseded" => Status::Done,
        _ => Status::Active,
    }
}

/// Total over local statuses; only `done` is archived on the hub.
pub fn status_to_hub(status: Status) -> HubStatus {
    match status {
        Status::Active | Status::Overdue | Status::Deferred | Status::NoDeadline => {
            HubStatus::Active
        }
        Status::Done => HubStatus::Archived,
    }
}

pub fn id_prefix(block: Block) -> char {
    match block {
        Block::Structure => 'S',
        Block::Sales => 'P',
        Block::Coo => 'C',
        Block::Finance => 'F',
        Block::Ops => 'O',
        Block::Open => 'Q',
    }
}
