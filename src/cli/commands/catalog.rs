//! chefai catalog - List recipe templates

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::kitchen::CuisineStyle;
use crate::kitchen::render::difficulty_label;

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {
    /// Only templates of this cuisine
    #[arg(long)]
    pub cuisine: Option<CuisineStyle>,
}

pub fn run(ctx: &AppContext, args: &CatalogArgs) -> Result<()> {
    let templates = ctx.session.read(|s| {
        s.recommender()
            .knowledge()
            .catalog
            .iter()
            .filter(|t| args.cuisine.is_none_or(|c| t.cuisine == c))
            .cloned()
            .collect::<Vec<_>>()
    });

    if ctx.robot_mode {
        let payload = serde_json::json!({
            "status": "ok",
            "count": templates.len(),
            "templates": templates,
        });
        return emit_json(&payload);
    }

    let mut layout = HumanLayout::new();
    layout.title("Recipe Catalog");
    for template in &templates {
        let required: Vec<&str> = template.required.iter().map(String::as_str).collect();
        layout.push_line(format!(
            "{:>3}  {} [{}, {}] needs {}",
            template.id,
            template.name,
            template.cuisine,
            difficulty_label(template.difficulty),
            required.join(", ")
        ));
    }
    if templates.is_empty() {
        layout.push_line("No templates match.");
    }
    emit_human(layout);
    Ok(())
}
