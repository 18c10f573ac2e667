//! Default values for whisk configuration.
//!
//! This module provides centralized default values used across the engine
//! and the commands, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Default configuration document name, overridable with `--conf` or
/// the `WHISK_CONF` environment variable.
pub const CONF_FILE: &str = "whisk.yaml";

/// Cache file name under the project root when the document sets no `cache`.
pub const CACHE_FILE: &str = ".config.yaml";

/// Build directory, relative to the project root, when nothing else names one.
pub const BUILD_DIR: &str = "build";

/// The requested-version sentinel that defers to the products' default version.
pub const DEFAULT_VERSION: &str = "default";

/// Name of the implicit pseudo-product every build includes.
pub const CORE: &str = "core";

/// Variable injected into the substitution environment holding the
/// absolute project root.
pub const PROJECT_ROOT_VAR: &str = "WHISK_PROJECT_ROOT";

/// Returns the default cache path for a project root.
pub fn default_cache_path(project_root: &Path) -> PathBuf {
    project_root.join(CACHE_FILE)
}
