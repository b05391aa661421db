//! Command-line interface

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod commands;
pub mod output;

pub use commands::Commands;

/// chefai - recipe suggestions from what's in your kitchen
#[derive(Parser, Debug)]
#[command(name = "chefai", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit JSON on stdout instead of human-readable text
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the global and data-root ones
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
