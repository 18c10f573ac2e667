//! # Document Linting
//!
//! `whisk validate` checks a document without resolving a selection or
//! writing anything. It reports [`Finding`]s in three groups:
//!
//! - **Load errors**: anything [`Project::load`] rejects (unsupported schema
//!   version, undefined `%{NAME}` references, unknown fields, dangling
//!   `default_version`).
//! - **Structural errors**: checks that `configure` would only hit for some
//!   selections, run here for every product and version at once.
//! - **Text warnings**: trailing whitespace, tab characters and a missing
//!   final newline.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::compat::{self, CompatProfile};
use crate::config::{Document, Project};
use crate::layers;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single lint result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// File and line, or a path into the document
    pub location: String,
    pub message: String,
}

impl Finding {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// All findings for one document.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub findings: Vec<Finding>,
    /// Number of products, versions, modes and sites, when the document loaded
    pub counts: Option<[usize; 4]>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Warning)
    }
}

/// Lint the document at `path` against the given environment.
pub fn check(path: &Path, env: HashMap<String, String>) -> Report {
    let mut report = Report::default();
    let name = path.display().to_string();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            report.findings.push(Finding::error(name, e.to_string()));
            return report;
        }
    };

    match Project::parse(&content, path, env) {
        Ok(project) => {
            let doc = &project.document;
            report.counts = Some([
                doc.products.len(),
                doc.versions.len(),
                doc.modes.len(),
                doc.sites.len(),
            ]);
            report.findings.extend(lint_document(doc));
        }
        Err(e) => report.findings.push(Finding::error(name.clone(), e.to_string())),
    }

    report.findings.extend(lint_text(&content, &name));
    report
}

/// Structural checks over every product and version.
pub fn lint_document(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (version_name, version) in &doc.versions {
        if let Some(name) = version.compat.as_deref() {
            if name != compat::AUTO && !CompatProfile::is_known(name) {
                findings.push(Finding::warning(
                    format!("versions.{}.compat", version_name),
                    format!("unknown compat '{}', the latest variable names will be used", name),
                ));
            }
        }

        let missing: Vec<&str> = doc
            .core
            .layers
            .iter()
            .filter(|l| version.layer(l).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            findings.push(Finding::error(
                format!("versions.{}", version_name),
                format!(
                    "core requires layer collection(s) '{}' which is not present",
                    missing.join(" ")
                ),
            ));
        }
    }

    for (name, product) in &doc.products {
        let location = format!("products.{}", name);

        if let Some(version) = doc.versions.get(&product.default_version) {
            let missing: Vec<&str> = product
                .layers
                .iter()
                .filter(|l| version.layer(l).is_none())
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                findings.push(Finding::error(
                    location.clone(),
                    format!(
                        "requires layer collection(s) '{}' which is not present in default version '{}'",
                        missing.join(" "),
                        product.default_version
                    ),
                ));
            }
        }

        if !product.multiconfig_enabled {
            if product.subproducts.is_some() {
                findings.push(Finding::error(
                    location.clone(),
                    "multiconfig_enabled is false but subproducts are declared",
                ));
            }
            if !product.multiconfigs.is_empty() {
                findings.push(Finding::error(
                    location.clone(),
                    "multiconfig_enabled is false but multiconfigs are declared",
                ));
            }
        }

        if product.targets.is_empty() {
            findings.push(Finding::warning(location, "declares no targets"));
        }
    }

    if let Err(e) = layers::subproduct_map(doc) {
        findings.push(Finding::error("products", e.to_string()));
    }

    let defaults = &doc.defaults;
    for product in &defaults.products {
        if !doc.products.contains_key(product) {
            findings.push(Finding::warning(
                "defaults.products",
                format!("unknown product '{}'", product),
            ));
        }
    }
    if let Some(mode) = defaults.mode.as_ref().filter(|m| !doc.modes.contains_key(*m)) {
        findings.push(Finding::warning("defaults.mode", format!("unknown mode '{}'", mode)));
    }
    if let Some(site) = defaults.site.as_ref().filter(|s| !doc.sites.contains_key(*s)) {
        findings.push(Finding::warning("defaults.site", format!("unknown site '{}'", site)));
    }

    findings
}

/// Text style checks over the raw document.
pub fn lint_text(content: &str, name: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let location = format!("{}:{}", name, idx + 1);
        if line.contains('\t') {
            findings.push(Finding::warning(location.clone(), "tab character"));
        }
        if line.ends_with(' ') || line.ends_with('\t') {
            findings.push(Finding::warning(location, "trailing whitespace"));
        }
    }

    if !content.is_empty() && !content.ends_with('\n') {
        let line = content.lines().count();
        findings.push(Finding::warning(
            format!("{}:{}", name, line),
            "no new line character at the end of file",
        ));
    }

    findings
}
