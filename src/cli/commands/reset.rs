//! chefai reset - Start over as a Beginner

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct ResetArgs {}

pub fn run(ctx: &AppContext, _args: &ResetArgs) -> Result<()> {
    let before = ctx.session.reset();

    if ctx.robot_mode {
        let payload = serde_json::json!({
            "status": "ok",
            "reset": true,
            "cleared_interactions": before.interaction_count,
            "location": ctx.store.location(),
            "storage_warning": ctx.storage_note(),
        });
        emit_json(&payload)
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Session Reset")
            .kv("Cleared", &format!("{} interactions", before.interaction_count))
            .kv("Tier", "Beginner")
            .kv("Location", &ctx.store.location());
        if let Some(warning) = ctx.storage_note() {
            layout.note(&format!("Storage problem: {warning}"));
        }
        emit_human(layout);
        Ok(())
    }
}
