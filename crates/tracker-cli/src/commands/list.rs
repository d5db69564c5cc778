use super::{block_label, parse_block, parse_status, status_label, Context};
use anyhow::{Context as _, Result};
use tracker_core::{Block, Decision};

pub fn run(ctx: &Context, block: Option<String>, status: Option<String>) -> Result<()> {
    let block = block.as_deref().map(parse_block).transpose()?;
    let status = status.as_deref().map(parse_status).transpose()?;

    let state = ctx.store().load().context("failed to load decisions")?;
    let decisions: Vec<&Decision> = state.filtered(block, status).collect();

    if ctx.json {
        let out = serde_json::json!({
            "decisions": decisions,
            "history": state.history,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if decisions.is_empty() {
        println!("No matching decisions.");
        return Ok(());
    }

    let mut first = true;
    for b in Block::ALL {
        let in_block: Vec<_> = decisions.iter().filter(|d| d.block == b).collect();
        if in_block.is_empty() {
            continue;
        }
        if !first {
            println!();
        }
        first = false;
        println!("{} ({})", block_label(b), b);
        for d in in_block {
            print_line(d);
        }
    }

    Ok(())
}

fn print_line(d: &Decision) {
    println!("  {:<6} [{}] {}", d.id, status_label(d.status), d.decision);
    let mut details = Vec::new();
    if !d.responsible.is_empty() {
        details.push(format!("owner: {}", d.responsible));
    }
    if let Some(deadline) = &d.deadline {
        details.push(format!("deadline: {}", deadline));
    }
    if let Some(check) = &d.check_date {
        details.push(format!("check: {}", check));
    }
    if let Some(hub_id) = &d.hub_id {
        details.push(format!("hub: {}", hub_id));
    }
    if !details.is_empty() {
        println!("         {}", details.join(" | "));
    }
    if !d.comment.is_empty() {
        println!("         {}", d.comment);
    }
}
