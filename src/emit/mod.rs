//! # Artifact Emitter
//!
//! Serializes a resolved configuration into the files the downstream build
//! system and the shell bootstrap consume:
//!
//! - the environment file, sourced by the shell ([`environment`]),
//! - `conf/site.conf` and the per-subproduct multiconfig files ([`site`]),
//! - `conf/bblayers.conf`, the layer manifest ([`manifest`]).
//!
//! Rendering is a pure function of [`Resolved`]: maps are sorted and layers
//! keep their declaration order, so the same inputs always produce
//! byte-identical files. Only the `write_*` functions touch the disk.

pub mod environment;
pub mod manifest;
pub mod site;

use std::fs;
use std::path::{Path, PathBuf};

use crate::compat::CompatProfile;
use crate::config::Project;
use crate::error::Result;
use crate::layers::LayerPlan;
use crate::selection::Selection;

/// Banner written at the top of every generated build-system file.
pub const GENERATED: &str = "# This file was dynamically generated by whisk\n";

/// Everything the emitter renders from.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub project: &'a Project,
    pub selection: &'a Selection,
    pub plan: &'a LayerPlan,
    pub compat: &'a CompatProfile,
}

/// Paths of the build-system files written for a build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfPaths {
    pub site_conf: PathBuf,
    pub bblayers_conf: PathBuf,
    pub multiconfig_dir: PathBuf,
}

impl ConfPaths {
    pub fn new(build_dir: &Path) -> Self {
        Self {
            site_conf: build_dir.join("conf").join("site.conf"),
            bblayers_conf: build_dir.join("conf").join("bblayers.conf"),
            multiconfig_dir: build_dir.join("whisk").join("conf").join("multiconfig"),
        }
    }
}

/// Write `site.conf`, `bblayers.conf` and every multiconfig file under the
/// selection's build directory.
pub fn write_conf_files(resolved: &Resolved<'_>) -> Result<ConfPaths> {
    let paths = ConfPaths::new(&resolved.selection.build_dir);

    write_file(&paths.site_conf, &site::render_site_conf(resolved))?;
    for (name, content) in site::render_multiconfigs(resolved) {
        write_file(&paths.multiconfig_dir.join(format!("product-{}.conf", name)), &content)?;
    }
    write_file(&paths.bblayers_conf, &manifest::render(resolved))?;

    log::debug!(
        "wrote build configuration under {}",
        resolved.selection.build_dir.display()
    );
    Ok(paths)
}

/// Write the environment file.
pub fn write_env_file(path: &Path, content: &str) -> Result<()> {
    write_file(path, content)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixture::Fixture;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_conf_files_layout() {
        let temp = TempDir::new().unwrap();
        let mut fixture = Fixture::new(&["board"], "dunfell");
        fixture.selection.build_dir = temp.path().join("build");

        let paths = write_conf_files(&fixture.resolved()).unwrap();
        assert!(paths.site_conf.exists());
        assert!(paths.bblayers_conf.exists());
        for name in ["board-lite", "tool"] {
            assert!(paths
                .multiconfig_dir
                .join(format!("product-{}.conf", name))
                .exists());
        }
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut fixture = Fixture::new(&["board"], "dunfell");
        fixture.selection.build_dir = temp.path().join("build");

        let paths = write_conf_files(&fixture.resolved()).unwrap();
        let first = fs::read(&paths.site_conf).unwrap();
        let first_layers = fs::read(&paths.bblayers_conf).unwrap();

        write_conf_files(&fixture.resolved()).unwrap();
        assert_eq!(fs::read(&paths.site_conf).unwrap(), first);
        assert_eq!(fs::read(&paths.bblayers_conf).unwrap(), first_layers);
    }

    #[test]
    fn test_write_env_file_creates_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/env.sh");
        write_env_file(&path, "export A=1\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "export A=1\n");
    }
}
