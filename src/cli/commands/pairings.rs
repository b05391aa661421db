//! chefai pairings - Learned compatibility for one ingredient

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::kitchen::normalize_tag;

#[derive(Args, Debug)]
pub struct PairingsArgs {
    /// Ingredient to look up (aliases accepted)
    pub ingredient: String,

    /// Maximum number of partners to show
    #[arg(long, short = 'n', default_value_t = 10)]
    pub limit: usize,
}

pub fn run(ctx: &AppContext, args: &PairingsArgs) -> Result<()> {
    let mut partners = ctx.session.read(|s| s.pairings(&args.ingredient));
    partners.truncate(args.limit);
    let ingredient = normalize_tag(&args.ingredient);

    if ctx.robot_mode {
        let payload = serde_json::json!({
            "status": "ok",
            "ingredient": ingredient,
            "pairings": partners,
        });
        return emit_json(&payload);
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Pairings for {ingredient}"));
    if partners.is_empty() {
        layout.push_line("No ratings involve this ingredient yet. Rate suggestions with `chefai feedback`.");
    }
    for pairing in &partners {
        layout.kv(&pairing.partner, &format!("{:+.1}", pairing.score));
    }
    emit_human(layout);
    Ok(())
}
