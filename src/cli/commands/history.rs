//! chefai history - Past suggestions, most recent first

use clap::Args;
use serde_json::{Value, json};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, percent};
use crate::error::Result;
use crate::suggestions::SuggestionResult;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of entries to show
    #[arg(long, short = 'n', default_value_t = 10)]
    pub limit: usize,

    /// Include full reasoning for each entry
    #[arg(long)]
    pub full: bool,
}

pub fn run(ctx: &AppContext, args: &HistoryArgs) -> Result<()> {
    let entries = ctx.session.history(args.limit);
    let snapshot = ctx.session.snapshot();

    if ctx.robot_mode {
        let items: Vec<Value> = if args.full {
            entries.iter().map(|e| json!(e)).collect()
        } else {
            entries.iter().map(summary).collect()
        };
        let payload = json!({
            "status": "ok",
            "total": snapshot.history_count,
            "retained": snapshot.history_retained,
            "entries": items,
        });
        return emit_json(&payload);
    }

    let mut layout = HumanLayout::new().with_wrap(ctx.config.output.wrap_width);
    layout.title("Suggestion History");
    if entries.is_empty() {
        layout.push_line("No suggestions yet. Try `chefai suggest chicken, garlic`.");
    }
    for entry in &entries {
        layout.push_line(summary_line(entry));
        if args.full {
            for (idx, step) in entry.reasoning.iter().enumerate() {
                layout.numbered(idx + 1, step);
            }
            layout.kv("Id", &entry.id.to_string()).blank();
        }
    }
    if !entries.is_empty() {
        layout.blank().note(&format!(
            "Showing {} of {} suggestions ({} kept).",
            entries.len(),
            snapshot.history_count,
            snapshot.history_retained
        ));
    }
    emit_human(layout);
    Ok(())
}

/// Compact JSON view of one suggestion.
pub(crate) fn summary(entry: &SuggestionResult) -> Value {
    json!({
        "id": entry.id,
        "recipe": entry.template.name,
        "template_id": entry.template.id,
        "confidence": entry.confidence,
        "tier": entry.tier,
        "ingredients": entry.ingredients,
        "created_at": entry.created_at,
    })
}

/// One-line human view of one suggestion.
pub(crate) fn summary_line(entry: &SuggestionResult) -> String {
    format!(
        "{}  {} ({}, {}) from {}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.template.name,
        percent(entry.confidence),
        entry.tier,
        entry.ingredients.join(", ")
    )
}
