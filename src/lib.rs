//! # Whisk Library
//!
//! Whisk turns a declarative project document (`whisk.yaml`) into a
//! configured layered build environment. A user picks one or more
//! *products*, a *mode*, a *site* and a *version*; whisk validates the
//! combination, remembers it between invocations and writes the files the
//! downstream build system reads.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::path::Path;
//! use whisk::config::Project;
//!
//! let yaml = r#"
//! version: 2
//! versions:
//!   kirkstone:
//!     oeinit: "%{WHISK_PROJECT_ROOT}/poky/oe-init-build-env"
//! products:
//!   widget:
//!     default_version: kirkstone
//! modes:
//!   debug: {}
//! sites:
//!   lab: {}
//! "#;
//! let project = Project::parse(yaml, Path::new("/src/whisk.yaml"), HashMap::new()).unwrap();
//! assert!(project.document.products.contains_key("widget"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Document (`config`, `template`)**: The typed project document and the
//!   `%{NAME}` substitution applied to every string in it.
//! - **Selection (`selection`, `cache`)**: Merging command line choices with
//!   the cached selection and the document defaults, and enforcing what may
//!   change after initialization.
//! - **Layers (`layers`, `compat`, `layerseries`)**: Which layer paths are
//!   included and masked, which subproducts exist, and which downstream
//!   naming conventions apply to the selected version.
//! - **Artifacts (`emit`)**: The environment file, `site.conf`,
//!   `bblayers.conf` and one multiconfig file per subproduct.
//! - **Fetching (`fetch`)**: Shell commands that populate layer sources.
//!
//! ## Execution Flow
//!
//! [`engine::configure`] drives one invocation: load the cache, resolve the
//! selection, resolve layers, optionally fetch, write the environment file,
//! write the build configuration when needed, and finally save the cache.
//! Every validation runs before the first write.

pub mod cache;
pub mod compat;
pub mod config;
pub mod defaults;
pub mod emit;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod layers;
pub mod layerseries;
pub mod lint;
pub mod output;
pub mod selection;
pub mod suggestions;
pub mod template;
