//! # Error Handling
//!
//! This module defines the centralized error type for `whisk`. Every failure
//! the engine can hit is fatal to the invocation, so the variants exist to
//! produce precise, human-readable messages rather than to be matched on and
//! recovered from.
//!
//! The variants fall into four groups:
//!
//! - **Document errors**: the configuration file could not be read, parsed,
//!   substituted or failed schema checks. Raised before any resolution.
//! - **Selection errors**: an unknown or missing product/mode/site/version,
//!   or an attempt to change something that is frozen after initialization.
//!   Raised before any file is written.
//! - **Structural errors**: missing layer collections, duplicate subproduct
//!   names and invalid multiconfig combinations. Raised before any file is
//!   written.
//! - **External failures**: a fetch command exited non-zero.

use thiserror::Error;

use crate::suggestions;

/// Main error type for whisk operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document could not be interpreted.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The document declares a schema version this tool does not understand.
    #[error("Bad version {version} in config file '{path}' (supported versions are 1 and 2)")]
    UnsupportedVersion { version: String, path: String },

    /// A `%{NAME}` reference names a variable that is not defined.
    #[error("Couldn't substitute all environment variables ({name} is undefined)")]
    UndefinedVariable { name: String },

    /// A product, mode, site or version name is not declared in the document.
    #[error("Unknown {kind} '{value}'.{} Please choose from:\n{}", suggestion.as_ref().map(|s| format!(" Did you mean '{}'?", s)).unwrap_or_default(), suggestions::listing(choices))]
    UnknownSelection {
        kind: &'static str,
        value: String,
        /// Every valid name for this kind, sorted
        choices: Vec<String>,
        /// The closest valid name, if one is close enough to be a likely typo
        suggestion: Option<String>,
    },

    /// No product, mode or site could be determined from any source.
    #[error("{}", missing_selection_message(kind))]
    MissingSelection { kind: &'static str },

    /// A different version was requested after the environment was initialized.
    #[error("The version cannot be changed after the environment is initialized. Please initialize a new environment with '--version={requested}'")]
    VersionLocked { requested: String },

    /// The build directory was changed after the environment was initialized.
    #[error("Build directory cannot be changed after environment is initialized. Please initialize a new environment with '--build-dir={requested}'")]
    BuildDirLocked { requested: String },

    /// The default version of the selected products differs from the one the
    /// environment was initialized with.
    #[error("Build environment is configured to build version '{current}' and cannot be changed to version '{required}' required to build products: {products}. Please initialize a new environment with `--product='{products}' --version=default`")]
    VersionChange {
        current: String,
        required: String,
        products: String,
    },

    /// Selected products disagree on their default version.
    #[error("Multiple products with different default versions were chosen. They are:\n{}", suggestions::table(conflicts))]
    ConflictingDefaultVersions {
        /// Pairs of (version, space separated products requiring it)
        conflicts: Vec<(String, String)>,
    },

    /// A product requires layer collections the resolved version lacks.
    #[error("Product '{product}' requires layer collection(s) '{layers}' which is not present in version '{version}'")]
    MissingLayers {
        product: String,
        layers: String,
        version: String,
    },

    /// Two products declare the same subproduct name.
    #[error("Subproduct name '{name}' is used by both product '{first}' and product '{second}'")]
    DuplicateSubproduct {
        name: String,
        first: String,
        second: String,
    },

    /// A product opted out of multiconfig but declares multiconfig features.
    #[error("Product '{product}' has multiconfig_enabled set to false, so it cannot declare {feature}")]
    MulticonfigConflict {
        product: String,
        feature: &'static str,
    },

    /// A non-multiconfig product was combined with other products.
    #[error("Product '{product}' does not support multiconfig and must be the only product selected (selected: {selected})")]
    NonMulticonfigCombination { product: String, selected: String },

    /// A fetch command exited with a non-zero status.
    #[error("Fetch command '{command}' failed:\n{output}")]
    FetchFailed { command: String, output: String },

    /// The cache file could not be written.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

fn missing_selection_message(kind: &str) -> String {
    match kind {
        "product" => "One or more products must be specified with --product".to_string(),
        "mode" => "A build mode must be specified with --mode".to_string(),
        "site" => "A site must be specified with --site".to_string(),
        other => format!("A {} must be specified with --{}", other, other),
    }
}
