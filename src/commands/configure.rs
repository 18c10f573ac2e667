//! # Configure Command Implementation
//!
//! `whisk configure` is the command the shell bootstrap runs on every
//! invocation. It resolves the selection, writes the environment file the
//! bootstrap sources afterwards, and rewrites the build configuration when a
//! write is needed.
//!
//! ## Functionality
//!
//! - **Listing**: `--list` prints the available products, modes, sites and
//!   versions with the current choices marked, and exits.
//! - **Initialization**: `--init` is the only time the version and build
//!   directory may be chosen freely.
//! - **Switching**: `--product`, `--mode` and `--site` change the selection
//!   of an initialized environment and imply a rewrite of the configuration.
//! - **Fetching**: `--fetch` runs the document's fetch commands first.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use whisk::config::Project;
use whisk::defaults;
use whisk::engine::{self, Request};
use whisk::output::{highlight_headings, OutputConfig};
use whisk::selection::Overrides;
use whisk::suggestions;

/// Configure the build environment
#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Path to the project document
    #[arg(long, value_name = "FILE", env = "WHISK_CONF", default_value = defaults::CONF_FILE)]
    pub conf: PathBuf,

    /// Where to write the environment file sourced by the shell
    #[arg(long, value_name = "FILE", env = "WHISK_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Initialize a new build environment
    #[arg(long)]
    pub init: bool,

    /// Change build product(s); may be repeated or hold a space separated list
    #[arg(long, visible_alias = "products", value_name = "PRODUCT")]
    pub product: Vec<String>,

    /// Change build mode
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Change build site
    #[arg(long, value_name = "SITE")]
    pub site: Option<String>,

    /// Set the downstream version (only with --init)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Set the build directory (only with --init)
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// List products, modes, sites and versions
    #[arg(long)]
    pub list: bool,

    /// Write out new config files (useful if product configuration has changed)
    #[arg(long)]
    pub write: bool,

    /// Ignore cached user configuration
    #[arg(short = 'n', long)]
    pub no_config: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Fetch required layers
    #[arg(long)]
    pub fetch: bool,

    /// Do not use pyrex even if the version configures it
    #[arg(long)]
    pub no_pyrex: bool,
}

/// Execute the `configure` command.
pub fn execute(args: ConfigureArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    if !args.conf.exists() {
        return Err(suggestions::config_not_found(&args.conf));
    }
    let project = Project::load(&args.conf)?;

    if args.list {
        print!(
            "{}",
            highlight_headings(&out, &engine::list(&project, args.no_config))
        );
        return Ok(());
    }

    let overrides = Overrides {
        products: args.product,
        mode: args.mode,
        site: args.site,
        version: args.version,
        build_dir: args.build_dir,
        init: args.init,
    };
    let implied_write = args.write || overrides.implies_write();

    let request = Request {
        overrides,
        write: args.write,
        no_config: args.no_config,
        fetch: args.fetch,
        quiet: args.quiet,
        no_pyrex: args.no_pyrex,
        env_file: args.env_file,
        tool_dir: tool_dir(),
        cwd: std::env::current_dir()?,
    };

    let outcome = engine::configure(&project, &request)?;
    if let Some(conf) = &outcome.conf {
        log::info!("wrote {}", conf.site_conf.display());
        log::info!("wrote {}", conf.bblayers_conf.display());
    }

    if !args.quiet && (!implied_write || args.init) {
        print!("{}", outcome.summary());
    }

    Ok(())
}

/// Directory of the running executable, put on `PATH` by the environment file.
fn tool_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
}
