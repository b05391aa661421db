//! chefai suggest - Pick a recipe for the given ingredients

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, percent, progress_bar};
use crate::error::{ChefError, Result};
use crate::kitchen::parse_ingredients;
use crate::suggestions::{SessionSnapshot, SuggestionResult};

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Ingredients, comma-separated (quote multi-word names: "soy sauce, rice")
    #[arg(required = true, num_args = 1.., value_name = "INGREDIENTS")]
    pub ingredients: Vec<String>,
}

impl SuggestArgs {
    /// All positional words as one ingredient list.
    #[must_use]
    pub fn text(&self) -> String {
        self.ingredients.join(", ")
    }
}

pub fn run(ctx: &AppContext, args: &SuggestArgs) -> Result<()> {
    let outcome = parse_ingredients(&args.text()).and_then(|set| ctx.session.suggest(&set));
    let result = match outcome {
        Ok(result) => result,
        Err(err @ (ChefError::Validation(_) | ChefError::NoMatch { .. })) => {
            return report_retry(ctx, &err);
        }
        Err(err) => return Err(err),
    };
    let snapshot = ctx.session.snapshot();

    if ctx.robot_mode {
        let payload = serde_json::json!({
            "status": "ok",
            "suggestion": result,
            "skill": snapshot,
            "storage_warning": ctx.storage_note(),
        });
        emit_json(&payload)
    } else {
        emit_human(render_human(ctx, &result, &snapshot));
        Ok(())
    }
}

/// Input the user can fix: say so and leave the session as it was.
fn report_retry(ctx: &AppContext, err: &ChefError) -> Result<()> {
    if ctx.robot_mode {
        let payload = serde_json::json!({
            "status": "retry",
            "code": err.code(),
            "message": err.to_string(),
        });
        emit_json(&payload)
    } else {
        let mut layout = HumanLayout::new();
        layout
            .push_line(err.to_string())
            .note("Nothing was recorded. Try a different set of ingredients.");
        emit_human(layout);
        Ok(())
    }
}

fn render_human(ctx: &AppContext, result: &SuggestionResult, snapshot: &SessionSnapshot) -> HumanLayout {
    let mut layout = HumanLayout::new().with_wrap(ctx.config.output.wrap_width);
    let recipe = &result.recipe;

    layout.section("Thinking it through");
    for (idx, step) in result.reasoning.iter().enumerate() {
        layout.numbered(idx + 1, step);
    }
    layout.blank().title(&recipe.title);
    layout
        .kv("Cuisine", result.template.cuisine.as_str())
        .kv("Difficulty", &recipe.difficulty)
        .kv("Total time", &recipe.total_time)
        .kv("Confidence", &percent(result.confidence))
        .blank()
        .section("Ingredients");
    for line in &recipe.ingredients {
        let mut text = format!("{} {}", line.amount, line.item);
        if let Some(prep) = &line.preparation {
            text.push_str(", ");
            text.push_str(prep);
        }
        if !line.on_hand {
            text.push_str(" (to buy)");
        }
        layout.bullet(&text);
    }
    layout.blank().section("Steps");
    for step in &recipe.steps {
        layout.numbered(step.number, &format!("{} ({})", step.instruction, step.time));
    }
    if !recipe.sides.is_empty() {
        layout.blank().kv("Serve with", &recipe.sides.join(", "));
    }

    layout.blank();
    if let Some(tier) = result.promoted_to {
        layout.push_line(format!("Skill up! You are now {tier}."));
    }
    layout.kv(
        "Skill",
        &format!(
            "{} {} {}",
            snapshot.tier,
            progress_bar(snapshot.progress, 20),
            snapshot
                .next_threshold
                .map_or_else(|| "max tier".to_string(), |next| format!("{}/{next}", snapshot.interaction_count))
        ),
    );
    layout.kv("Suggestion id", &result.id.to_string());
    if let Some(warning) = ctx.storage_note() {
        layout.note(&format!("Storage problem: {warning}"));
    }
    layout
}
