use crate::error::CoreError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// `source` value stamped on decisions that were pulled from the hub.
pub const HUB_SOURCE: &str = "Context Hub";

/// Local category grouping decisions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Structure,
    Sales,
    Coo,
    Finance,
    Ops,
    Open,
}

impl Block {
    pub const ALL: [Block; 6] = [
        Block::Structure,
        Block::Sales,
        Block::Coo,
        Block::Finance,
        Block::Ops,
        Block::Open,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Sales => "sales",
            Self::Coo => "coo",
            Self::Finance => "finance",
            Self::Ops => "ops",
            Self::Open => "open",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Block {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Block::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| CoreError::UnknownBlock(s.to_string()))
    }
}

/// Local decision status. Finer-grained than the hub's status model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Overdue,
    Active,
    Done,
    Deferred,
    NoDeadline,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Overdue,
        Status::Active,
        Status::Done,
        Status::Deferred,
        Status::NoDeadline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Active => "active",
            Self::Done => "done",
            Self::Deferred => "deferred",
            Self::NoDeadline => "no_deadline",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// A tracked organizational decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    /// `<BlockPrefix>-<seq>`, unique within the store.
    pub id: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub hub_id: Option<String>,
    pub block: Block,
    pub decision: String,
    #[serde(default)]
    pub responsible: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub check_date: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub comment: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Decision {
    /// True once the decision is bound to a hub record.
    pub fn is_linked(&self) -> bool {
        self.hub_id.is_some()
    }

    pub fn is_hub_origin(&self) -> bool {
        self.source == HUB_SOURCE
    }

    /// Title key used for dedup: lowercased and trimmed.
    pub fn title_key(&self) -> String {
        normalize_title(&self.decision)
    }
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Add,
    StatusChange,
    SyncPull,
    SyncPush,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::StatusChange => "status_change",
            Self::SyncPull => "sync_pull",
            Self::SyncPush => "sync_push",
        }
    }

    pub fn is_sync(&self) -> bool {
        matches!(self, Self::SyncPull | Self::SyncPush)
    }
}

/// Append-only audit record. Never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub timestamp: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Status>,
}

impl HistoryEntry {
    pub fn added(id: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            action: HistoryAction::Add,
            id: Some(id.into()),
            count: None,
            timestamp,
            from: None,
            to: None,
        }
    }

    pub fn status_change(
        id: impl Into<String>,
        from: Status,
        to: Status,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            action: HistoryAction::StatusChange,
            id: Some(id.into()),
            count: None,
            timestamp,
            from: Some(from),
            to: Some(to),
        }
    }

    /// A `sync_pull`/`sync_push` entry recording how many records moved.
    pub fn sync(action: HistoryAction, count: usize, timestamp: NaiveDateTime) -> Self {
        Self {
            action,
            id: None,
            count: Some(count),
            timestamp,
            from: None,
            to: None,
        }
    }
}

// Older files store absent values as "".
fn empty_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}
