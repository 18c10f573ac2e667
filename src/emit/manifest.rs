//! `bblayers.conf` rendering.

use std::fmt::{self, Write as _};

use super::{Resolved, GENERATED};

/// Render `conf/bblayers.conf`: per-entry masks, then the requested layer
/// paths in declaration order, then the core `layerconf` text.
pub fn render(resolved: &Resolved<'_>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_into(&mut out, resolved);
    out
}

fn render_into(out: &mut String, resolved: &Resolved<'_>) -> fmt::Result {
    let plan = resolved.plan;

    out.push_str(GENERATED);
    writeln!(out, "LCONF_VERSION = \"{}\"", resolved.compat.lconf_version)?;
    out.push_str("BBPATH = \"${TOPDIR}\"\nBBFILES ?= \"\"\n\n");

    for mask in &plan.masks {
        for path in &mask.paths {
            writeln!(out, "BBMASK_{} += \"{}\"", mask.entry, path)?;
        }
        writeln!(out)?;
    }

    for path in &plan.layer_paths {
        writeln!(out, "BBLAYERS += \"{}\"", path)?;
    }
    writeln!(out)?;

    let layerconf = resolved.project.document.core.layerconf.as_deref();
    writeln!(out, "{}", layerconf.unwrap_or_default())?;
    out.push_str("# This line gives devtool a place to add its layers\nBBLAYERS += \"\"\n");
    Ok(())
}
