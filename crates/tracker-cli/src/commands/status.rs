use super::Context;
use anyhow::{Context as _, Result};

pub fn run(ctx: &Context) -> Result<()> {
    let reconciler = ctx.reconciler()?;
    let overview = reconciler.overview().context("failed to read sync status")?;
    let hub_url = ctx.hub_config().base_url;

    if ctx.json {
        let out = serde_json::json!({
            "hub_url": hub_url,
            "configured": overview.configured,
            "hub_ok": overview.hub_ok,
            "hub_stats": overview.hub_stats,
            "local_total": overview.local_total,
            "linked": overview.linked,
            "local_only": overview.local_only,
            "last_sync": overview.last_sync,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Hub:        {}", hub_url);
    if !overview.configured {
        println!("Status:     not configured (set CONTEXT_HUB_KEY)");
    } else if overview.hub_ok {
        println!("Status:     available");
    } else {
        println!("Status:     unavailable");
    }
    if let Some(stats) = &overview.hub_stats {
        println!("Hub stats:  {}", stats);
    }
    println!(
        "Local:      {} decisions, {} linked, {} local-only",
        overview.local_total, overview.linked, overview.local_only
    );
    match &overview.last_sync {
        Some(h) => println!(
            "Last sync:  {} ({} records) at {}",
            h.action.as_str(),
            h.count.unwrap_or(0),
            h.timestamp.format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("Last sync:  never"),
    }
    Ok(())
}
