//! # Selection Resolver
//!
//! Combines three layered sources into one [`Selection`]:
//!
//! 1. explicit command-line [`Overrides`] (highest precedence),
//! 2. the cached selection of the previous invocation,
//! 3. the document's `defaults` (lowest precedence).
//!
//! ## Initialized Environments
//!
//! An environment becomes initialized on an invocation flagged `init`. After
//! that the requested version and the build directory are frozen: asking for
//! a different one is an error that tells the user to initialize a new
//! environment.
//!
//! ## The `default` Version
//!
//! The requested version is either an explicit version name or `default`.
//! `default` is an indirect pointer that is re-resolved on every invocation
//! against the currently selected products' `default_version`. Switching
//! between products that share a default version is therefore allowed, but
//! switching to a product whose default version differs from the one the
//! environment was initialized with is rejected unless re-initializing.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::path::Path;
//! use whisk::cache::CacheSnapshot;
//! use whisk::config::Project;
//! use whisk::selection::{self, Overrides};
//!
//! let yaml = r#"
//! version: 2
//! versions:
//!   dunfell: {oeinit: oe-init-build-env}
//! products:
//!   widget: {default_version: dunfell}
//! modes:
//!   debug: {}
//! sites:
//!   lab: {}
//! "#;
//! let project = Project::parse(yaml, Path::new("/src/whisk.yaml"), HashMap::new()).unwrap();
//! let overrides = Overrides {
//!     products: vec!["widget".to_string()],
//!     mode: Some("debug".to_string()),
//!     site: Some("lab".to_string()),
//!     init: true,
//!     ..Default::default()
//! };
//! let selection =
//!     selection::resolve(&project, &CacheSnapshot::default(), &overrides, Path::new("/src")).unwrap();
//! assert_eq!(selection.actual_version, "dunfell");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cache::CacheSnapshot;
use crate::config::Project;
use crate::defaults;
use crate::error::{Error, Result};
use crate::suggestions;

/// The version a user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedVersion {
    /// Follow the selected products' default version
    Default,
    /// A specific version name
    Explicit(String),
}

impl RequestedVersion {
    pub fn parse(value: &str) -> Self {
        if value == defaults::DEFAULT_VERSION {
            Self::Default
        } else {
            Self::Explicit(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => defaults::DEFAULT_VERSION,
            Self::Explicit(name) => name,
        }
    }
}

impl fmt::Display for RequestedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Product arguments; each may hold a whitespace separated list
    pub products: Vec<String>,
    pub mode: Option<String>,
    pub site: Option<String>,
    pub version: Option<String>,
    /// Build directory, relative to the invocation's working directory
    pub build_dir: Option<PathBuf>,
    /// First-time initialization of the environment
    pub init: bool,
}

impl Overrides {
    /// Whether the generated configuration files must be rewritten.
    pub fn implies_write(&self) -> bool {
        self.init
            || !self.products.is_empty()
            || self.mode.is_some()
            || self.site.is_some()
            || self.version.is_some()
    }

    fn product_names(&self) -> Vec<String> {
        self.products
            .iter()
            .flat_map(|arg| arg.split_whitespace())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// The selection before command-line overrides: cache over document defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub products: Vec<String>,
    pub mode: Option<String>,
    pub site: Option<String>,
    pub version: RequestedVersion,
    /// Actual version the environment was last configured with, if any
    pub actual_version: Option<String>,
    pub build_dir: PathBuf,
}

/// Merge the cache over the document defaults.
pub fn baseline(project: &Project, cache: &CacheSnapshot) -> Baseline {
    let defaults = &project.document.defaults;
    Baseline {
        products: cache
            .products
            .clone()
            .unwrap_or_else(|| defaults.products.clone()),
        mode: cache.mode.clone().or_else(|| defaults.mode.clone()),
        site: cache.site.clone().or_else(|| defaults.site.clone()),
        version: cache
            .version
            .as_deref()
            .map(RequestedVersion::parse)
            .unwrap_or(RequestedVersion::Default),
        actual_version: cache.actual_version.clone().filter(|v| !v.is_empty()),
        build_dir: cache
            .build_dir
            .clone()
            .unwrap_or_else(|| project.default_build_dir()),
    }
}

/// A fully resolved, validated selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected products, sorted and de-duplicated
    pub products: Vec<String>,
    pub mode: String,
    pub site: String,
    pub version: RequestedVersion,
    /// Always a declared version name
    pub actual_version: String,
    /// Absolute build directory
    pub build_dir: PathBuf,
}

impl Selection {
    /// The cache record for this selection.
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            cache_version: None,
            mode: Some(self.mode.clone()),
            products: Some(self.products.clone()),
            site: Some(self.site.clone()),
            version: Some(self.version.to_string()),
            actual_version: Some(self.actual_version.clone()),
            build_dir: Some(self.build_dir.clone()),
        }
    }
}

/// Resolve the selection for one invocation.
///
/// `cwd` anchors a relative `--build-dir`.
pub fn resolve(
    project: &Project,
    cache: &CacheSnapshot,
    overrides: &Overrides,
    cwd: &Path,
) -> Result<Selection> {
    let doc = &project.document;
    let base = baseline(project, cache);

    let products = if overrides.products.is_empty() {
        base.products.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
    } else {
        overrides.product_names()
    };
    for product in &products {
        check_known("product", product, doc.products.keys())?;
    }

    let mode = overrides.mode.clone().or(base.mode);
    if let Some(mode) = &mode {
        check_known("mode", mode, doc.modes.keys())?;
    }

    let site = overrides.site.clone().or(base.site);
    if let Some(site) = &site {
        check_known("site", site, doc.sites.keys())?;
    }

    let version = match &overrides.version {
        Some(requested) if overrides.init => RequestedVersion::parse(requested),
        Some(requested) if *requested != base.version.as_str() => {
            return Err(Error::VersionLocked {
                requested: requested.clone(),
            });
        }
        _ => base.version,
    };
    if let RequestedVersion::Explicit(name) = &version {
        if !doc.versions.contains_key(name) {
            let mut choices: Vec<String> = doc.versions.keys().cloned().collect();
            choices.push(defaults::DEFAULT_VERSION.to_string());
            return Err(suggestions::unknown_selection("version", name, &choices));
        }
    }

    let build_dir = match &overrides.build_dir {
        Some(dir) if !overrides.init => {
            return Err(Error::BuildDirLocked {
                requested: dir.display().to_string(),
            });
        }
        Some(dir) => cwd.join(dir),
        None => base.build_dir,
    };

    if products.is_empty() {
        return Err(Error::MissingSelection { kind: "product" });
    }
    let mode = mode.ok_or(Error::MissingSelection { kind: "mode" })?;
    let site = site.ok_or(Error::MissingSelection { kind: "site" })?;

    let actual_version = match &version {
        RequestedVersion::Explicit(name) => name.clone(),
        RequestedVersion::Default => {
            resolve_default_version(project, &products, base.actual_version.as_deref(), overrides.init)?
        }
    };

    log::debug!(
        "selected products={:?} mode={} site={} version={} ({})",
        products,
        mode,
        site,
        version,
        actual_version
    );

    Ok(Selection {
        products,
        mode,
        site,
        version,
        actual_version,
        build_dir,
    })
}

/// Resolve `default` against the selected products.
///
/// All products must agree on one default version. Outside of
/// initialization it must also equal the version the environment was
/// configured with.
fn resolve_default_version(
    project: &Project,
    products: &[String],
    current: Option<&str>,
    init: bool,
) -> Result<String> {
    let mut by_version: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for name in products {
        if let Some(product) = project.document.products.get(name) {
            by_version
                .entry(product.default_version.as_str())
                .or_default()
                .push(name.as_str());
        }
    }

    if by_version.len() > 1 {
        return Err(Error::ConflictingDefaultVersions {
            conflicts: by_version
                .iter()
                .map(|(version, names)| (version.to_string(), names.join(" ")))
                .collect(),
        });
    }

    let Some((required, names)) = by_version.into_iter().next() else {
        return Err(Error::MissingSelection { kind: "product" });
    };

    if init || current == Some(required) {
        Ok(required.to_string())
    } else {
        Err(Error::VersionChange {
            current: current.unwrap_or_default().to_string(),
            required: required.to_string(),
            products: names.join(" "),
        })
    }
}

fn check_known<'a>(
    kind: &'static str,
    value: &str,
    names: impl Iterator<Item = &'a String>,
) -> Result<()> {
    let names: Vec<String> = names.cloned().collect();
    if names.iter().any(|n| n == value) {
        Ok(())
    } else {
        Err(suggestions::unknown_selection(kind, value, &names))
    }
}

/// Render every choice of every kind, marking the current ones with `*`.
pub fn render_choices(project: &Project, base: &Baseline) -> String {
    let doc = &project.document;
    let mut out = String::new();

    out.push_str("Possible products:\n");
    out.push_str(&render_table(
        doc.products
            .iter()
            .map(|(name, p)| (base.products.contains(name), name.as_str(), p.description.as_str())),
    ));
    out.push_str("Possible modes:\n");
    out.push_str(&render_table(doc.modes.iter().map(|(name, m)| {
        (base.mode.as_deref() == Some(name), name.as_str(), m.description.as_str())
    })));
    out.push_str("Possible sites:\n");
    out.push_str(&render_table(doc.sites.iter().map(|(name, s)| {
        (base.site.as_deref() == Some(name), name.as_str(), s.description.as_str())
    })));
    out.push_str("Possible versions:\n");
    out.push_str(&render_table(
        doc.versions
            .iter()
            .map(|(name, v)| {
                (base.version.as_str() == name, name.as_str(), v.description.as_str())
            })
            .chain(std::iter::once((
                base.version == RequestedVersion::Default,
                defaults::DEFAULT_VERSION,
                "",
            ))),
    ));
    out
}

fn render_table<'a>(rows: impl Iterator<Item = (bool, &'a str, &'a str)>) -> String {
    let rows: Vec<_> = rows.collect();
    let width = rows.iter().map(|(_, name, _)| name.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(current, name, description)| {
            let marker = if *current { " *" } else { "  " };
            let line = format!("{}  {:<width$}  {}", marker, name, description, width = width);
            format!("{}\n", line.trim_end())
        })
        .collect()
}
