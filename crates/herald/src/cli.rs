//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Herald - autonomous posting agent: generate, validate, publish, sleep
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Autonomous posting agent: generate, validate, publish, sleep", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Whether logs should be emitted as JSON.
    pub fn json_logs(&self) -> bool {
        matches!(&self.command, Commands::Run(args) if args.json_logs)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the posting loop until Ctrl-C
    Run(RunArgs),

    /// Validate configuration and credentials, then exit
    Check {
        /// Configuration file overriding ./herald.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file overriding ./herald.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Options for `herald run`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Configuration file overriding ./herald.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log posts instead of publishing them
    #[arg(long)]
    pub dry_run: bool,

    /// Seed for content, tag and delay choices
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run a single cycle without the trailing sleep, then exit
    #[arg(long)]
    pub once: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}
