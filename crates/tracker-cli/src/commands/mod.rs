pub mod add;
pub mod history;
pub mod list;
pub mod status;
pub mod sync;
pub mod update;

use anyhow::{Context as _, Result};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracker_core::{Block, Status};
use tracker_store::{Seed, StateStore};
use tracker_sync::{HubClient, HubConfig, Reconciler, SyncConfig};

pub const ENV_DATA_FILE: &str = "TRACKER_DATA_FILE";
pub const ENV_SEED: &str = "TRACKER_SEED";
pub const DEFAULT_DATA_FILE: &str = "decisions.json";

/// Global options shared by every command.
pub struct Context {
    pub json: bool,
    pub data_file: Option<PathBuf>,
    pub hub_url: Option<String>,
}

impl Context {
    pub fn store(&self) -> StateStore {
        let path = self
            .data_file
            .clone()
            .or_else(|| env::var_os(ENV_DATA_FILE).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
        let seed = match env::var(ENV_SEED).as_deref() {
            Ok("empty") => Seed::Empty,
            _ => Seed::Builtin,
        };
        debug!(path = %path.display(), ?seed, "using state file");
        StateStore::new(path).with_seed(seed)
    }

    pub fn hub_config(&self) -> HubConfig {
        let mut config = HubConfig::from_env();
        if let Some(url) = &self.hub_url {
            config.base_url = url.clone();
        }
        config
    }

    pub fn reconciler(&self) -> Result<Reconciler<HubClient>> {
        let hub = HubClient::new(self.hub_config()).context("failed to set up hub client")?;
        Ok(Reconciler::new(hub, self.store(), SyncConfig::default()))
    }
}

pub fn parse_block(raw: &str) -> Result<Block> {
    raw.parse::<Block>()
        .with_context(|| format!("expected one of: {}", names(&Block::ALL.map(|b| b.as_str()))))
}

pub fn parse_status(raw: &str) -> Result<Status> {
    raw.parse::<Status>()
        .with_context(|| format!("expected one of: {}", names(&Status::ALL.map(|s| s.as_str()))))
}

fn names(all: &[&str]) -> String {
    all.join(", ")
}

pub fn block_label(block: Block) -> &'static str {
    match block {
        Block::Structure => "Люди и структура ОК",
        Block::Sales => "Продажи и BD",
        Block::Coo => "Роль COO и управление",
        Block::Finance => "Финансы",
        Block::Ops => "Операционка",
        Block::Open => "Открытые вопросы",
    }
}

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Overdue => "Просрочено",
        Status::Active => "В работе",
        Status::Done => "Выполнено",
        Status::Deferred => "Отложено",
        Status::NoDeadline => "Без срока",
    }
}
