//! # Whisk CLI
//!
//! This is the binary entry point for the `whisk` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors; any error is printed and the
//!   process exits with status 1.
//!
//! The resolution logic lives in the `whisk` library crate, so the binary is
//! a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
