//! # Compatibility Profiles
//!
//! Downstream build-system releases renamed a handful of variables over
//! time: the override separator changed from `_` to `:`, and the hash
//! exclusion and environment passthrough variables were renamed. A
//! [`CompatProfile`] captures the naming scheme one release expects so the
//! artifact emitter never hardcodes it.
//!
//! ## Resolution
//!
//! A version either names its profile explicitly with `compat: <name>`, or
//! leaves it to detection (`compat: auto` or no `compat` at all):
//!
//! - An explicit known name selects that profile. An unknown explicit name
//!   keeps its name but gets the latest naming scheme.
//! - Detection reads `LAYERSERIES_CORENAMES` from the version's layers (see
//!   [`crate::layerseries`]). The first detected name found in the table wins;
//!   if none is known the profile is `latest`. If nothing is detected at all the oldest supported release is
//!   assumed, since it predates the metadata line.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use crate::config::Version;
use crate::layerseries;

/// Sentinel requesting detection from layer metadata.
pub const AUTO: &str = "auto";

/// Profile used when a name is not in the table.
pub const LATEST: &str = "latest";

/// Assumed when detection finds no metadata at all.
pub const FALLBACK: &str = "pyro";

/// Variable naming scheme expected by one downstream release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatProfile {
    /// Release name written to `WHISK_COMPAT`
    pub name: String,
    /// Separator between a variable and an override such as `append`
    pub override_sep: &'static str,
    /// Variable listing names excluded from task hashes
    pub hashbase_var: &'static str,
    /// Variable listing environment variables passed into the build
    pub env_passthrough_var: &'static str,
    /// `LCONF_VERSION` written to the layer manifest
    pub lconf_version: u32,
}

#[derive(Debug, Clone, Copy)]
struct Scheme {
    override_sep: &'static str,
    hashbase_var: &'static str,
    env_passthrough_var: &'static str,
    lconf_version: u32,
}

const LEGACY: Scheme = Scheme {
    override_sep: "_",
    hashbase_var: "BB_HASHBASE_WHITELIST",
    env_passthrough_var: "BB_ENV_EXTRAWHITE",
    lconf_version: 7,
};

const COLON_OVERRIDES: Scheme = Scheme {
    override_sep: ":",
    ..LEGACY
};

const MODERN: Scheme = Scheme {
    override_sep: ":",
    hashbase_var: "BB_BASEHASH_IGNORE_VARS",
    env_passthrough_var: "BB_ENV_PASSTHROUGH_ADDITIONS",
    lconf_version: 7,
};

static TABLE: LazyLock<HashMap<&'static str, Scheme>> = LazyLock::new(|| {
    let legacy = [
        "pyro",
        "rocko",
        "sumo",
        "thud",
        "warrior",
        "zeus",
        "dunfell",
        "gatesgarth",
        "hardknott",
    ];
    let modern = [
        "kirkstone",
        "langdale",
        "mickledore",
        "nanbield",
        "scarthgap",
        "styhead",
        "walnascar",
        LATEST,
    ];

    let mut table = HashMap::new();
    for name in legacy {
        table.insert(name, LEGACY);
    }
    table.insert("honister", COLON_OVERRIDES);
    for name in modern {
        table.insert(name, MODERN);
    }
    table
});

impl CompatProfile {
    /// Look up a profile by release name.
    pub fn lookup(name: &str) -> Option<Self> {
        TABLE.get(name).map(|scheme| Self::build(name, *scheme))
    }

    /// The latest naming scheme under the given name.
    fn latest_as(name: &str) -> Self {
        Self::build(name, MODERN)
    }

    fn build(name: &str, scheme: Scheme) -> Self {
        Self {
            name: name.to_string(),
            override_sep: scheme.override_sep,
            hashbase_var: scheme.hashbase_var,
            env_passthrough_var: scheme.env_passthrough_var,
            lconf_version: scheme.lconf_version,
        }
    }

    /// Whether a release name is in the table.
    pub fn is_known(name: &str) -> bool {
        TABLE.contains_key(name)
    }
}

/// Resolve the profile for a version.
///
/// Relative layer paths are resolved against `root` during detection.
pub fn resolve(version: &Version, root: &Path) -> CompatProfile {
    match version.compat.as_deref() {
        Some(name) if name != AUTO => CompatProfile::lookup(name).unwrap_or_else(|| {
            log::warn!(
                "Unknown compat '{}', assuming the latest variable names",
                name
            );
            CompatProfile::latest_as(name)
        }),
        _ => from_detected(&layerseries::detect(&version.layers, root)),
    }
}

/// Choose a profile from detected core names.
pub fn from_detected(names: &[String]) -> CompatProfile {
    if let Some(profile) = names.iter().find_map(|n| CompatProfile::lookup(n)) {
        log::debug!("detected compat '{}'", profile.name);
        return profile;
    }

    match names.first() {
        Some(first) => {
            log::warn!(
                "Unknown layer series '{}', assuming the latest variable names",
                first
            );
            CompatProfile::latest_as(LATEST)
        }
        None => {
            log::debug!("no layer series declared, assuming '{}'", FALLBACK);
            CompatProfile::build(FALLBACK, LEGACY)
        }
    }
}
