use super::Context;
use anyhow::{Context as _, Result};
use tracker_core::{HistoryAction, HistoryEntry};

pub fn run(ctx: &Context, max_count: usize) -> Result<()> {
    let state = ctx.store().load().context("failed to load decisions")?;
    let entries: Vec<&HistoryEntry> = state.history.iter().rev().take(max_count).collect();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    for h in entries {
        let when = h.timestamp.format("%Y-%m-%d %H:%M:%S");
        let subject = h.id.as_deref().unwrap_or("-");
        match h.action {
            HistoryAction::Add => println!("{}  add            {}", when, subject),
            HistoryAction::StatusChange => println!(
                "{}  status_change  {} {} -> {}",
                when,
                subject,
                h.from.map(|s| s.as_str()).unwrap_or("?"),
                h.to.map(|s| s.as_str()).unwrap_or("?"),
            ),
            HistoryAction::SyncPull => {
                println!("{}  sync_pull      {} added", when, h.count.unwrap_or(0))
            }
            HistoryAction::SyncPush => {
                println!("{}  sync_push      {} pushed", when, h.count.unwrap_or(0))
            }
        }
    }
    Ok(())
}
