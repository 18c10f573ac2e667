//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_document(documents::TWO_VERSIONS);
//!     fixture.configure().arg("--list").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::documents;
    pub use super::TestFixture;
}

/// Project documents used across the E2E tests.
#[allow(dead_code)]
pub mod documents {
    /// Two versions with one product each, plus a product sharing `kirkstone`.
    pub const TWO_VERSIONS: &str = r#"version: 2
defaults:
  mode: debug
  site: lab
core:
  layers: [core]
  conf: CORE_SETTING = "1"
versions:
  dunfell:
    compat: dunfell
    oeinit: "%{WHISK_PROJECT_ROOT}/poky/oe-init-build-env"
    layers:
      - name: core
        paths: ["%{WHISK_PROJECT_ROOT}/poky/meta"]
  kirkstone:
    compat: kirkstone
    oeinit: "%{WHISK_PROJECT_ROOT}/poky/oe-init-build-env"
    layers:
      - name: core
        paths: ["%{WHISK_PROJECT_ROOT}/poky/meta"]
      - name: bsp
        paths: ["%{WHISK_PROJECT_ROOT}/meta-bsp"]
products:
  old:
    description: Legacy board
    default_version: dunfell
    targets: [old-image]
  board:
    description: Current board
    default_version: kirkstone
    layers: [bsp]
    targets: [board-image]
  gadget:
    description: Current gadget
    default_version: kirkstone
    targets: [gadget-image]
modes:
  debug:
    description: Debug build
  release:
    description: Release build
sites:
  lab:
    description: Lab mirrors
"#;

    /// References a variable the test environment never defines.
    pub const UNDEFINED_VARIABLE: &str = r#"version: 2
versions:
  v1:
    oeinit: "%{WHISK_TEST_NEVER_SET}/oe-init-build-env"
products:
  p:
    default_version: v1
modes:
  m: {}
sites:
  s: {}
"#;
}

/// A temporary project directory with an optional `whisk.yaml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `whisk.yaml` with the given content.
    pub fn with_document(self, content: &str) -> Self {
        self.temp_dir
            .child("whisk.yaml")
            .write_str(content)
            .expect("Failed to write document");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    pub fn env_file(&self) -> PathBuf {
        self.path().join("env.sh")
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// A `whisk` command running in the fixture directory, isolated from
    /// any `WHISK_*` settings of the calling environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("whisk");
        cmd.current_dir(self.path())
            .env_remove("WHISK_CONF")
            .env_remove("WHISK_ENV_FILE")
            .env("NO_COLOR", "1");
        cmd
    }

    /// `whisk configure` writing its environment file into the fixture.
    pub fn configure(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("configure").arg("--env-file").arg(self.env_file());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
