//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Whisk - Configure layered build environments from a project document
#[derive(Parser, Debug)]
#[command(name = "whisk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a product/mode/site/version selection and write the build environment
    Configure(commands::configure::ConfigureArgs),

    /// Validate and lint a whisk.yaml document without writing anything
    Validate(commands::validate::ValidateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Logs go to stderr; stdout carries summaries and listings
        let _ = env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .try_init();

        match self.command {
            Commands::Configure(args) => commands::configure::execute(args, &self.color),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
