//! CLI argument definitions using clap
//!
//! Commands:
//! - shardbatch replay --plan <path> [--config <path>] [--verbose]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shardbatch - deterministic reconciliation of sharded batch writes
#[derive(Parser, Debug)]
#[command(name = "shardbatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a batch plan and print the reconciled results
    Replay {
        /// Path to the batch plan (JSON)
        #[arg(long)]
        plan: PathBuf,

        /// Path to the engine configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log per-unit execution events
        #[arg(long, short)]
        verbose: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
