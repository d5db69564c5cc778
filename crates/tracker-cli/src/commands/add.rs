use super::{parse_block, parse_status, Context};
use anyhow::{Context as _, Result};
use chrono::Local;
use tracker_core::NewDecision;
use tracker_store::StoreError;

pub struct AddArgs {
    pub decision: String,
    pub block: String,
    pub id: Option<String>,
    pub responsible: String,
    pub deadline: Option<String>,
    pub check_date: Option<String>,
    pub status: String,
    pub comment: String,
    pub source: String,
}

pub fn run(ctx: &Context, args: AddArgs) -> Result<()> {
    let new = NewDecision {
        id: args.id,
        block: parse_block(&args.block)?,
        decision: args.decision,
        responsible: args.responsible,
        deadline: args.deadline,
        check_date: args.check_date,
        status: parse_status(&args.status)?,
        comment: args.comment,
        source: args.source,
    };

    let now = Local::now().naive_local();
    let store = ctx.store();
    let id = store
        .update(|state| {
            state
                .add_decision(new, now.date(), now)
                .map_err(StoreError::from)
        })
        .context("failed to add decision")?;

    if ctx.json {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("Added decision {}", id);
    }
    Ok(())
}
