//! chefai feedback - Rate a suggestion

use clap::Args;
use uuid::Uuid;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::suggestions::Rating;

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Suggestion id (defaults to the most recent suggestion)
    #[arg(long)]
    pub id: Option<Uuid>,

    /// How it turned out: liked or disliked
    #[arg(long, short)]
    pub rating: Rating,
}

pub fn run(ctx: &AppContext, args: &FeedbackArgs) -> Result<()> {
    let outcome = ctx.session.record_feedback(args.id, args.rating)?;

    if ctx.robot_mode {
        let payload = serde_json::json!({
            "status": "ok",
            "feedback": outcome,
            "storage_warning": ctx.storage_note(),
        });
        emit_json(&payload)
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Feedback Recorded")
            .kv("Recipe", &outcome.recipe)
            .kv("Rating", &outcome.rating.to_string())
            .kv("Pairs updated", &outcome.pairs_updated.to_string());
        if let Some(warning) = ctx.storage_note() {
            layout.note(&format!("Storage problem: {warning}"));
        }
        emit_human(layout);
        Ok(())
    }
}
