//! # Configuration Engine
//!
//! Runs one `configure` invocation end to end:
//!
//! 1. load the cache (unless disabled),
//! 2. resolve the [`Selection`],
//! 3. resolve the compatibility profile of the actual version,
//! 4. resolve layers and subproducts,
//! 5. run fetch commands when asked to,
//! 6. write the environment file,
//! 7. write the build-system configuration when a write is implied,
//! 8. persist the selection to the cache.
//!
//! Every check happens before the first file is written, so a failed
//! invocation leaves the environment file, the configuration and the cache
//! exactly as they were. The cache is written last; a crash between the
//! artifacts and the cache is tolerated since the next invocation can always
//! override what it finds.

use std::path::PathBuf;

use crate::cache::CacheStore;
use crate::compat::{self, CompatProfile};
use crate::config::Project;
use crate::emit::{self, environment::EnvOptions, ConfPaths, Resolved};
use crate::error::Result;
use crate::fetch;
use crate::layers::{self, LayerPlan};
use crate::selection::{self, Overrides, Selection};

/// Everything a `configure` invocation asks for.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub overrides: Overrides,
    /// Rewrite the build configuration even if nothing changed
    pub write: bool,
    /// Neither read nor write the cache
    pub no_config: bool,
    pub fetch: bool,
    /// Suppress progress output
    pub quiet: bool,
    pub no_pyrex: bool,
    /// Where to write the environment file, if anywhere
    pub env_file: Option<PathBuf>,
    /// Directory put on `PATH` by the environment file
    pub tool_dir: Option<PathBuf>,
    /// Base for a relative `--build-dir`
    pub cwd: PathBuf,
}

/// What a successful invocation resolved and wrote.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub selection: Selection,
    pub compat: CompatProfile,
    pub plan: LayerPlan,
    /// Build-system files, when they were rewritten
    pub conf: Option<ConfPaths>,
    pub env_file: Option<PathBuf>,
}

impl Outcome {
    /// Human readable summary of the selection.
    pub fn summary(&self) -> String {
        let selection = &self.selection;
        let mut version = selection.version.to_string();
        if selection.version.as_str() != selection.actual_version {
            version.push_str(&format!(" ({})", selection.actual_version));
        }
        format!(
            "PRODUCT    = {}\nMODE       = {}\nSITE       = {}\nVERSION    = {}\n",
            selection.products.join(" "),
            selection.mode,
            selection.site,
            version
        )
    }
}

fn cache_store(project: &Project, no_config: bool) -> CacheStore {
    CacheStore::new(project.cache_path(), !no_config)
}

/// Render the `--list` output for a project.
pub fn list(project: &Project, no_config: bool) -> String {
    let cache = cache_store(project, no_config).load();
    selection::render_choices(project, &selection::baseline(project, &cache))
}

/// Resolve and materialize a build environment.
pub fn configure(project: &Project, request: &Request) -> Result<Outcome> {
    let store = cache_store(project, request.no_config);
    let cache = store.load();

    let selection = selection::resolve(project, &cache, &request.overrides, &request.cwd)?;
    let version = layers::actual_version(project, &selection)?;
    let compat = compat::resolve(version, &project.root);
    let plan = layers::resolve(project, &selection)?;

    if request.fetch {
        let commands = fetch::collect(project, &selection, &plan)?;
        fetch::run(project, &commands, request.quiet)?;
    }

    let resolved = Resolved {
        project,
        selection: &selection,
        plan: &plan,
        compat: &compat,
    };

    if let Some(path) = &request.env_file {
        let options = EnvOptions {
            init: request.overrides.init,
            no_pyrex: request.no_pyrex,
            tool_dir: request.tool_dir.clone(),
        };
        emit::write_env_file(path, &emit::environment::render(&resolved, &options))?;
    }

    let conf = if request.write || request.overrides.implies_write() {
        Some(emit::write_conf_files(&resolved)?)
    } else {
        None
    };

    store.save(&selection.snapshot())?;

    Ok(Outcome {
        selection,
        compat,
        plan,
        conf,
        env_file: request.env_file.clone(),
    })
}
