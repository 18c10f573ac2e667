//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a
//! `whisk.yaml` document without resolving a selection.
//!
//! ## Functionality
//!
//! - **Schema Validation**: Parses the document, checks its schema version,
//!   substitutes `%{NAME}` references and rejects unknown fields.
//! - **Structural Checks**: Product layers exist in the product's default
//!   version, core layers exist in every version, subproduct names are
//!   unique and multiconfig settings are consistent.
//! - **Style Checks**: Trailing whitespace, tab characters and a missing
//!   final newline are reported as warnings.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use whisk::defaults;
use whisk::lint::{self, Severity};
use whisk::output::{emoji, OutputConfig};

/// Validate a whisk.yaml document
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the document to validate
    #[arg(value_name = "FILE", env = "WHISK_CONF", default_value = defaults::CONF_FILE)]
    pub file: PathBuf,

    /// Use strict validation (fail on warnings).
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Validating document: {}",
        emoji(&out, "🔍", "[SCAN]"),
        args.file.display()
    );

    let report = lint::check(&args.file, std::env::vars().collect());

    if let Some([products, versions, modes, sites]) = report.counts {
        println!("{} Document parsed successfully", emoji(&out, "✅", "[OK]"));
        println!("\n{} Document Summary:", emoji(&out, "📊", "[INFO]"));
        println!("   Products: {}", products);
        println!("   Versions: {}", versions);
        println!("   Modes: {}", modes);
        println!("   Sites: {}", sites);
    }

    if report.findings.is_empty() {
        println!("\n{} No problems found", emoji(&out, "✅", "[OK]"));
    } else {
        println!("\n{} Findings:", emoji(&out, "🔎", "[LINT]"));
        for finding in &report.findings {
            let marker = match finding.severity {
                Severity::Error => emoji(&out, "❌", "[ERR]"),
                Severity::Warning => emoji(&out, "⚠️", "[WARN]"),
            };
            println!("{} {}", marker, finding);
        }
    }

    let has_errors = report.has_errors();
    let has_warnings = report.has_warnings();

    println!();
    if has_errors {
        println!("{} Validation failed", emoji(&out, "❌", "[ERR]"));
        anyhow::bail!("Validation of {} failed", args.file.display());
    }
    if has_warnings && args.strict {
        println!(
            "{} Validation failed (strict mode: warnings treated as errors)",
            emoji(&out, "❌", "[ERR]")
        );
        anyhow::bail!("Validation of {} produced warnings", args.file.display());
    }
    if has_warnings {
        println!(
            "{} Validation passed with warnings",
            emoji(&out, "⚠️", "[WARN]")
        );
    } else {
        println!("{} Validation passed", emoji(&out, "✅", "[OK]"));
    }

    Ok(())
}
