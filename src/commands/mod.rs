//! # CLI Command Implementations
//!
//! One module per `whisk` subcommand. Each module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `whisk` library.

pub mod completions;
pub mod configure;
pub mod validate;
