//! chefai status - Skill tier, progress and recent activity

use clap::Args;
use serde_json::{Value, json};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, percent, progress_bar};
use crate::error::Result;

use super::history::{summary, summary_line};

#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Number of recent suggestions to list (defaults to output.recent)
    #[arg(long)]
    pub recent: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &StatusArgs) -> Result<()> {
    let snapshot = ctx.session.snapshot();
    let recent = ctx
        .session
        .history(args.recent.unwrap_or(ctx.config.output.recent));
    let preferred = ctx
        .session
        .read(|s| s.recommender().preferred_cuisine().map(|c| c.to_string()));

    if ctx.robot_mode {
        let payload = json!({
            "status": "ok",
            "skill": snapshot,
            "preferred_cuisine": preferred,
            "recent": recent.iter().map(summary).collect::<Vec<Value>>(),
            "storage": {
                "backend": ctx.store.name(),
                "location": ctx.store.location(),
                "warning": ctx.storage_note(),
            },
        });
        return emit_json(&payload);
    }

    let next = snapshot.next_threshold.map_or_else(
        || "Master reached".to_string(),
        |next| format!("{} of {next} interactions", snapshot.interaction_count),
    );
    let mut layout = HumanLayout::new();
    layout
        .title("Chef Status")
        .section("Skill")
        .kv("Tier", snapshot.tier.label())
        .kv("Interactions", &snapshot.interaction_count.to_string())
        .kv("Progress", &format!("{} {next}", progress_bar(snapshot.progress, 20)))
        .kv("Last confidence", &percent(snapshot.confidence))
        .blank()
        .section("Knowledge")
        .kv("Ingredients", &snapshot.known_ingredients.to_string())
        .kv("Recipe templates", &snapshot.recipe_templates.to_string())
        .kv("Learned pairs", &snapshot.ingredient_pairs.to_string())
        .kv("Ratings given", &snapshot.feedback_count.to_string())
        .kv("Preferred cuisine", preferred.as_deref().unwrap_or("(none)"))
        .blank()
        .section("Storage")
        .kv("Backend", ctx.store.name())
        .kv("Location", &ctx.store.location())
        .kv("Suggestions made", &snapshot.history_count.to_string());
    if let Some(warning) = ctx.storage_note() {
        layout.kv("Warning", &warning);
    }
    if !recent.is_empty() {
        layout.blank().section("Recent");
        for entry in &recent {
            layout.bullet(&summary_line(entry));
        }
    }
    emit_human(layout);
    Ok(())
}
