//! # Configuration Document
//!
//! This module defines the typed records that make up a `whisk.yaml`
//! project document, and the loading pipeline that turns a file on disk into
//! a validated [`Project`].
//!
//! ## Loading Pipeline
//!
//! 1. The file is parsed into an untyped [`serde_yaml::Value`] tree.
//! 2. The top-level `version` is checked; only schema versions 1 and 2 are
//!    understood.
//! 3. The absolute project root is computed from the document's directory and
//!    its `project_root` field, and exposed to the document itself as
//!    `WHISK_PROJECT_ROOT`.
//! 4. Every string in the tree goes through [`template::substitute`].
//! 5. The tree is deserialized into [`Document`]. Unknown fields are rejected.
//! 6. Cross references are checked: each product's `default_version` must be a
//!    declared version and layer names must be unique within a version.
//!
//! Anything that fails here is a document error and aborts before any
//! resolution takes place.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::path::Path;
//! use whisk::config::Project;
//!
//! let yaml = r#"
//! version: 2
//! versions:
//!   dunfell:
//!     oeinit: "%{WHISK_PROJECT_ROOT}/poky/oe-init-build-env"
//! products:
//!   widget:
//!     default_version: dunfell
//! "#;
//! let project = Project::parse(yaml, Path::new("/src/whisk.yaml"), HashMap::new()).unwrap();
//! assert_eq!(project.document.versions["dunfell"].oeinit, "/src/poky/oe-init-build-env");
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::defaults;
use crate::error::{Error, Result};
use crate::template;

/// The whole project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    /// Document schema version (1 or 2)
    pub version: u32,
    /// Project root, relative to the document's directory
    #[serde(default)]
    pub project_root: Option<String>,
    /// Path of the user cache file
    #[serde(default)]
    pub cache: Option<String>,
    #[serde(default)]
    pub defaults: Defaults,
    /// Commands run before any version or layer specific fetch
    #[serde(default)]
    pub fetch: Option<FetchSpec>,
    #[serde(default)]
    pub versions: BTreeMap<String, Version>,
    #[serde(default)]
    pub products: BTreeMap<String, Product>,
    #[serde(default)]
    pub modes: BTreeMap<String, Mode>,
    #[serde(default)]
    pub sites: BTreeMap<String, Site>,
    /// The implicit pseudo-product included in every build
    #[serde(default)]
    pub core: Core,
    #[serde(default)]
    pub hooks: Hooks,
}

/// Values used when neither the command line nor the cache provides one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    /// Build directory, relative to the project root
    #[serde(default)]
    pub build_dir: Option<String>,
}

/// A list of shell commands that fetch sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSpec {
    #[serde(default)]
    pub commands: Vec<String>,
}

/// Returns the commands of an optional fetch block.
pub fn fetch_commands(fetch: &Option<FetchSpec>) -> &[String] {
    fetch.as_ref().map(|f| f.commands.as_slice()).unwrap_or(&[])
}

/// A downstream build-system release and the layers it is made of.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Version {
    #[serde(default)]
    pub description: String,
    /// Compatibility profile name, `auto`, or absent for auto-detection
    #[serde(default)]
    pub compat: Option<String>,
    /// Downstream init script sourced by the environment file
    pub oeinit: String,
    #[serde(default)]
    pub bitbakedir: Option<String>,
    #[serde(default)]
    pub pyrex: Option<Pyrex>,
    /// Layer declarations, in the order they appear in the manifest
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub fetch: Option<FetchSpec>,
    #[serde(default)]
    pub tags: Value,
}

impl Version {
    /// Look up a layer declaration by name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// Containerised init wrapper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pyrex {
    pub root: String,
    pub conf: String,
}

/// A named collection of layer paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub paths: Vec<String>,
    /// Paths masked out even when the layer is required
    #[serde(default)]
    pub bbmask: Vec<String>,
    #[serde(default)]
    pub fetch: Option<FetchSpec>,
}

/// A buildable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    #[serde(default)]
    pub description: String,
    pub default_version: String,
    /// Names of the layer collections this product requires
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default = "default_true")]
    pub multiconfig_enabled: bool,
    #[serde(default)]
    pub multiconfigs: Vec<String>,
    /// Named variants; when absent the product is its own sole subproduct
    #[serde(default)]
    pub subproducts: Option<BTreeMap<String, Subproduct>>,
    #[serde(default)]
    pub conf: Option<String>,
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
    #[serde(default)]
    pub fetch: Option<FetchSpec>,
    #[serde(default)]
    pub tags: Value,
}

fn default_true() -> bool {
    true
}

/// A variant of a product with its own generated configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subproduct {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conf: Option<String>,
    #[serde(default)]
    pub tags: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Maintainer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A build mode (e.g. debug or release).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mode {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conf: Option<String>,
    #[serde(default)]
    pub tags: Value,
}

/// A build site (e.g. a lab or an office with its own mirrors).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Site {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conf: Option<String>,
    #[serde(default)]
    pub tags: Value,
}

/// Settings shared by every product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Core {
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub conf: Option<String>,
    /// Text appended verbatim to the layer manifest
    #[serde(default)]
    pub layerconf: Option<String>,
}

/// Shell fragments and variables handed to the environment file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hooks {
    #[serde(default)]
    pub pre_init: Option<String>,
    #[serde(default)]
    pub post_init: Option<String>,
    #[serde(default)]
    pub env_passthrough_vars: Vec<String>,
}

/// A loaded and validated project.
#[derive(Debug, Clone)]
pub struct Project {
    pub document: Document,
    /// Path the document was loaded from
    pub path: PathBuf,
    /// Absolute project root
    pub root: PathBuf,
    /// Substitution environment, also injected into fetch commands
    pub env: HashMap<String, String>,
}

impl Project {
    /// Load a project document using the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, std::env::vars().collect())
    }

    /// Load a project document with an explicit base environment.
    pub fn load_with_env(path: &Path, env: HashMap<String, String>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path, env)
    }

    /// Parse document text as if it had been read from `path`.
    pub fn parse(content: &str, path: &Path, mut env: HashMap<String, String>) -> Result<Self> {
        let raw: Value = serde_yaml::from_str(content)?;
        check_version(&raw, path)?;

        let relative_root = raw
            .get("project_root")
            .and_then(Value::as_str)
            .unwrap_or(".");
        let root = project_root(path, relative_root)?;
        env.insert(
            defaults::PROJECT_ROOT_VAR.to_string(),
            root.to_string_lossy().into_owned(),
        );

        let substituted = template::substitute(raw, &env)?;
        let document: Document =
            serde_yaml::from_value(substituted).map_err(|e| Error::ConfigParse {
                message: format!("Error validating {}: {}", path.display(), e),
                hint: None,
            })?;
        check_references(&document)?;

        log::debug!(
            "loaded {} (schema v{}, root {})",
            path.display(),
            document.version,
            root.display()
        );

        Ok(Self {
            document,
            path: path.to_path_buf(),
            root,
            env,
        })
    }

    /// Location of the user cache file.
    pub fn cache_path(&self) -> PathBuf {
        match &self.document.cache {
            Some(cache) => self.root.join(cache),
            None => defaults::default_cache_path(&self.root),
        }
    }

    /// Build directory used when neither the command line nor the cache names one.
    pub fn default_build_dir(&self) -> PathBuf {
        let dir = self
            .document
            .defaults
            .build_dir
            .as_deref()
            .unwrap_or(defaults::BUILD_DIR);
        self.root.join(dir)
    }
}

fn check_version(raw: &Value, path: &Path) -> Result<()> {
    let version = raw.get("version").ok_or_else(|| Error::ConfigParse {
        message: format!("Config file '{}' missing version", path.display()),
        hint: Some("Add 'version: 2' at the top of the file".to_string()),
    })?;

    match version.as_u64() {
        Some(1) | Some(2) => Ok(()),
        _ => Err(Error::UnsupportedVersion {
            version: describe(version),
            path: path.display().to_string(),
        }),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn project_root(path: &Path, relative_root: &str) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(std::path::absolute(dir.join(relative_root))?)
}

fn check_references(document: &Document) -> Result<()> {
    for (name, product) in &document.products {
        if !document.versions.contains_key(&product.default_version) {
            return Err(Error::ConfigParse {
                message: format!(
                    "Product '{}' has default_version '{}' which is not a declared version",
                    name, product.default_version
                ),
                hint: Some(format!(
                    "Declared versions are: {}",
                    document
                        .versions
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            });
        }
    }

    for (name, version) in &document.versions {
        let mut seen = HashSet::new();
        for layer in &version.layers {
            if !seen.insert(layer.name.as_str()) {
                return Err(Error::ConfigParse {
                    message: format!(
                        "Version '{}' declares layer '{}' more than once",
                        name, layer.name
                    ),
                    hint: None,
                });
            }
        }
    }

    Ok(())
}
