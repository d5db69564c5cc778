use super::Context;
use anyhow::{Context as _, Result};
use tracker_sync::{PushOutcome, SyncReport};

pub fn pull(ctx: &Context) -> Result<()> {
    let report = ctx.reconciler()?.pull().context("pull failed")?;
    print_report(ctx, &report)
}

pub fn push(ctx: &Context) -> Result<()> {
    let report = ctx.reconciler()?.push().context("push failed")?;
    print_report(ctx, &report)
}

pub fn full(ctx: &Context) -> Result<()> {
    let report = ctx.reconciler()?.full_sync().context("sync failed")?;
    print_report(ctx, &report)
}

fn print_report(ctx: &Context, report: &SyncReport) -> Result<()> {
    if ctx.json {
        let outcomes: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| match o {
                PushOutcome::Pushed { id, hub_id } => {
                    serde_json::json!({ "id": id, "pushed": true, "hub_id": hub_id })
                }
                PushOutcome::Skipped { id, reason } => {
                    serde_json::json!({ "id": id, "pushed": false, "reason": reason.to_string() })
                }
            })
            .collect();
        let out = serde_json::json!({
            "count": report.count,
            "message": report.message,
            "failure": report.failure.map(|f| f.to_string()),
            "outcomes": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", report.message);
    for outcome in &report.outcomes {
        match outcome {
            PushOutcome::Pushed { id, hub_id } => println!("  {} -> {}", id, hub_id),
            PushOutcome::Skipped { id, reason } => println!("  {} skipped: {}", id, reason),
        }
    }
    Ok(())
}
