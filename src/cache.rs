//! Persistent user selection cache.
//!
//! The cache remembers the last resolved selection so later invocations may
//! omit any of product, mode, site or version. It is a small YAML record
//! stamped with [`CACHE_VERSION`]; a record with any other stamp is ignored
//! wholesale, exactly as if the file did not exist.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Schema version of the cache record.
pub const CACHE_VERSION: u32 = 1;

/// The last persisted selection. Every field is optional so an absent or
/// stale cache is simply the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default)]
    pub cache_version: Option<u32>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<String>>,
    #[serde(default)]
    pub site: Option<String>,
    /// Requested version, `default` or a version name
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub actual_version: Option<String>,
    #[serde(default)]
    pub build_dir: Option<PathBuf>,
}

impl CacheSnapshot {
    /// True when nothing was loaded.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Reads and writes the cache file.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    enabled: bool,
}

impl CacheStore {
    /// Create a store for `path`. A disabled store never reads or writes.
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last snapshot, or an empty one.
    pub fn load(&self) -> CacheSnapshot {
        if !self.enabled {
            return CacheSnapshot::default();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("no cache at {}: {}", self.path.display(), e);
                return CacheSnapshot::default();
            }
        };

        let snapshot: CacheSnapshot = match serde_yaml::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Ignoring unreadable cache {}: {}", self.path.display(), e);
                return CacheSnapshot::default();
            }
        };

        if snapshot.cache_version != Some(CACHE_VERSION) {
            log::debug!(
                "ignoring cache {} with version {:?}",
                self.path.display(),
                snapshot.cache_version
            );
            return CacheSnapshot::default();
        }

        snapshot
    }

    /// Persist a snapshot, stamped with the current cache version.
    ///
    /// The file is written to a temporary sibling and renamed into place so
    /// readers never observe a partial record.
    pub fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let stamped = CacheSnapshot {
            cache_version: Some(CACHE_VERSION),
            ..snapshot.clone()
        };
        let content = serde_yaml::to_string(&stamped)?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(&self.path).map_err(|e| Error::Cache {
            message: format!("Failed to write {}: {}", self.path.display(), e.error),
        })?;

        log::debug!("saved cache to {}", self.path.display());
        Ok(())
    }
}
