//! Layer-series detection from `conf/layer.conf` metadata.
//!
//! The downstream core layer announces the release names it is compatible
//! with in a line such as:
//!
//! ```text
//! LAYERSERIES_CORENAMES = "kirkstone"
//! ```
//!
//! [`detect`] walks a version's layers in declaration order and returns the
//! tokens of the first such line it finds. Missing directories and unreadable
//! files simply do not match.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Layer;

/// Metadata file looked up under every layer path.
pub const LAYER_CONF: &str = "conf/layer.conf";

static CORENAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*LAYERSERIES_CORENAMES\s*=\s*"([^"]*)"\s*$"#)
        .expect("corenames pattern is valid")
});

/// Return the core names declared by the first layer path that has any.
///
/// Relative layer paths are resolved against `base`.
pub fn detect(layers: &[Layer], base: &Path) -> Vec<String> {
    for layer in layers {
        for path in &layer.paths {
            let conf = base.join(path).join(LAYER_CONF);
            let Ok(content) = std::fs::read_to_string(&conf) else {
                continue;
            };
            if let Some(names) = parse_corenames(&content) {
                log::debug!(
                    "layer '{}' declares series {:?} in {}",
                    layer.name,
                    names,
                    conf.display()
                );
                return names;
            }
        }
    }
    Vec::new()
}

fn parse_corenames(content: &str) -> Option<Vec<String>> {
    content.lines().find_map(|line| {
        CORENAMES.captures(line).map(|caps| {
            caps[1]
                .split_whitespace()
                .map(str::to_string)
                .collect()
        })
    })
}
