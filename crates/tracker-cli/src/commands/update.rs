use super::{parse_status, Context};
use anyhow::{Context as _, Result};
use chrono::Local;
use tracker_core::DecisionUpdate;
use tracker_store::StoreError;

pub fn run(
    ctx: &Context,
    id: String,
    status: Option<String>,
    comment: Option<String>,
    deadline: Option<String>,
    responsible: Option<String>,
) -> Result<()> {
    let update = DecisionUpdate {
        status: status.as_deref().map(parse_status).transpose()?,
        comment,
        deadline,
        responsible,
    };

    let now = Local::now().naive_local();
    let store = ctx.store();
    let (from, to) = store
        .update(|state| {
            let from = state.find(&id).map(|d| d.status);
            state
                .update_decision(&id, update, now)
                .map_err(StoreError::from)?;
            let to = state.find(&id).map(|d| d.status);
            Ok::<_, StoreError>((from, to))
        })
        .with_context(|| format!("failed to update decision '{}'", id))?;

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({ "id": id, "from": from, "to": to })
        );
        return Ok(());
    }

    match (from, to) {
        (Some(from), Some(to)) if from != to => {
            println!("Updated decision {} ({} -> {})", id, from, to)
        }
        _ => println!("Updated decision {}", id),
    }
    Ok(())
}
