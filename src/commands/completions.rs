//! # Completions Command Implementation
//!
//! Prints a `clap_complete` script covering every `whisk` subcommand and
//! flag. Product, mode and site names are document data and are not
//! completed; `whisk configure --list` shows them.
//!
//! ```bash
//! whisk completions bash > ~/.local/share/bash-completion/completions/whisk
//! whisk completions zsh > ~/.zfunc/_whisk
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `args.shell` to stdout.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
