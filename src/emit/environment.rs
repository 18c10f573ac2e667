//! Environment file rendering.
//!
//! The environment file is sourced by the shell bootstrap after every
//! `configure`. It exports the resolved selection and, on initialization,
//! sources the downstream init script (directly or through pyrex).

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use super::Resolved;
use crate::layers;

/// Variables always added to the downstream passthrough list.
const PASSTHROUGH: &[&str] = &[
    "WHISK_PROJECT_ROOT",
    "WHISK_PRODUCTS",
    "WHISK_SUBPRODUCTS",
    "WHISK_MODE",
    "WHISK_SITE",
    "WHISK_ACTUAL_VERSION",
    "WHISK_COMPAT",
];

/// Options that only affect the environment file.
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    /// First-time initialization; sources the init script
    pub init: bool,
    /// Source the init script directly even if the version configures pyrex
    pub no_pyrex: bool,
    /// Directory prepended to `PATH` on initialization
    pub tool_dir: Option<PathBuf>,
}

/// Render the environment file.
pub fn render(resolved: &Resolved<'_>, options: &EnvOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_into(&mut out, resolved, options);
    out
}

fn render_into(out: &mut String, resolved: &Resolved<'_>, options: &EnvOptions) -> fmt::Result {
    let project = resolved.project;
    let selection = resolved.selection;
    let hooks = &project.document.hooks;

    writeln!(out, "export WHISK_PRODUCTS=\"{}\"", selection.products.join(" "))?;
    writeln!(
        out,
        "export WHISK_SUBPRODUCTS=\"{}\"",
        resolved.plan.selected_subproducts.join(" ")
    )?;
    writeln!(out, "export WHISK_MODE=\"{}\"", selection.mode)?;
    writeln!(out, "export WHISK_SITE=\"{}\"", selection.site)?;
    writeln!(out, "export WHISK_VERSION=\"{}\"", selection.version)?;
    writeln!(out, "export WHISK_ACTUAL_VERSION=\"{}\"", selection.actual_version)?;
    writeln!(out, "export WHISK_COMPAT=\"{}\"", resolved.compat.name)?;
    writeln!(out)?;
    writeln!(out, "export WHISK_BUILD_DIR={}", selection.build_dir.display())?;
    writeln!(out, "export WHISK_INIT={}", options.init)?;

    push_hook(out, hooks.pre_init.as_deref());

    // The actual version was validated during selection.
    if let (true, Ok(version)) = (options.init, layers::actual_version(project, selection)) {
        if let Some(bitbakedir) = &version.bitbakedir {
            writeln!(out, "export BITBAKEDIR=\"{}\"", bitbakedir)?;
        }

        writeln!(out, "export WHISK_PROJECT_ROOT=\"{}\"", project.root.display())?;
        let passthrough: Vec<&str> = PASSTHROUGH
            .iter()
            .copied()
            .chain(hooks.env_passthrough_vars.iter().map(String::as_str))
            .collect();
        writeln!(
            out,
            "export {var}=\"${{{var}}} {}\"",
            passthrough.join(" "),
            var = resolved.compat.env_passthrough_var
        )?;
        if let Some(tool_dir) = &options.tool_dir {
            writeln!(out, "PATH=\"{}:$PATH\"", tool_dir.display())?;
        }

        match (&version.pyrex, options.no_pyrex) {
            (Some(pyrex), false) => {
                writeln!(out, "PYREX_CONFIG_BIND=\"{}\"", project.root.display())?;
                writeln!(out, "PYREX_ROOT=\"{}\"", pyrex.root)?;
                writeln!(out, "PYREX_OEINIT=\"{}\"", version.oeinit)?;
                writeln!(out, "PYREXCONFFILE=\"{}\"", pyrex.conf)?;
                writeln!(out)?;
                writeln!(out, ". {}/pyrex-init-build-env $WHISK_BUILD_DIR", pyrex.root)?;
            }
            _ => writeln!(out, ". {} $WHISK_BUILD_DIR", version.oeinit)?,
        }
    }

    push_hook(out, hooks.post_init.as_deref());
    out.push_str("unset WHISK_BUILD_DIR WHISK_INIT\n");
    Ok(())
}

fn push_hook(out: &mut String, hook: Option<&str>) {
    out.push_str(hook.unwrap_or_default());
    out.push('\n');
}
