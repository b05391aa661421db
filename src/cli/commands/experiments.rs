//! chefai experiments - Untried pairings suggested by past ratings

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, percent};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ExperimentsArgs {
    /// Maximum number of pairs to show
    #[arg(long, short = 'n', default_value_t = 10)]
    pub limit: usize,
}

pub fn run(ctx: &AppContext, args: &ExperimentsArgs) -> Result<()> {
    let mut experiments = ctx.session.read(|s| s.experiments());
    let total = experiments.len();
    experiments.truncate(args.limit);

    if ctx.robot_mode {
        let payload = serde_json::json!({
            "status": "ok",
            "experiments": experiments,
            "total": total,
        });
        return emit_json(&payload);
    }

    let mut layout = HumanLayout::new().with_wrap(ctx.config.output.wrap_width);
    layout.title("Pairings to Try");
    if experiments.is_empty() {
        layout.push_line("Nothing to suggest yet. Like a few suggestions with `chefai feedback` first.");
    }
    for experiment in &experiments {
        layout.bullet(&format!(
            "{} + {} ({} confidence, both go well with {})",
            experiment.ingredients[0],
            experiment.ingredients[1],
            percent(experiment.confidence),
            experiment.via,
        ));
    }
    emit_human(layout);
    Ok(())
}
