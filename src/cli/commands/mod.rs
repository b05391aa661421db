//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod catalog;
pub mod completions;
pub mod experiments;
pub mod feedback;
pub mod history;
pub mod pairings;
pub mod reset;
pub mod status;
pub mod suggest;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Suggest(args) => suggest::run(ctx, args),
        Commands::Status(args) => status::run(ctx, args),
        Commands::History(args) => history::run(ctx, args),
        Commands::Feedback(args) => feedback::run(ctx, args),
        Commands::Pairings(args) => pairings::run(ctx, args),
        Commands::Experiments(args) => experiments::run(ctx, args),
        Commands::Catalog(args) => catalog::run(ctx, args),
        Commands::Reset(args) => reset::run(ctx, args),
        Commands::Completions(args) => completions::run(args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest a recipe for the ingredients you have
    Suggest(suggest::SuggestArgs),

    /// Show skill tier, progress and recent suggestions
    Status(status::StatusArgs),

    /// List past suggestions, most recent first
    History(history::HistoryArgs),

    /// Rate a suggestion to teach ingredient pairings
    Feedback(feedback::FeedbackArgs),

    /// Show learned pairing scores for an ingredient
    Pairings(pairings::PairingsArgs),

    /// Suggest untried ingredient pairs from what you liked
    Experiments(experiments::ExperimentsArgs),

    /// List recipe templates in the knowledge base
    Catalog(catalog::CatalogArgs),

    /// Forget all progress and history
    Reset(reset::ResetArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
