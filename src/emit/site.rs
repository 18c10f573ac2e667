//! `site.conf` and per-subproduct multiconfig rendering.

use std::fmt::{self, Write as _};

use super::{Resolved, GENERATED};

/// Render `conf/site.conf`.
pub fn render_site_conf(resolved: &Resolved<'_>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = site_conf_into(&mut out, resolved);
    out
}

fn site_conf_into(out: &mut String, resolved: &Resolved<'_>) -> fmt::Result {
    let document = &resolved.project.document;
    let selection = resolved.selection;
    let plan = resolved.plan;
    let compat = resolved.compat;
    let legacy_aliases = document.version < 2;

    out.push_str(GENERATED);
    let site_conf = document.sites.get(&selection.site).and_then(|s| s.conf.as_deref());
    writeln!(out, "{}", site_conf.unwrap_or_default())?;
    let mode_conf = document.modes.get(&selection.mode).and_then(|m| m.conf.as_deref());
    writeln!(out, "{}", mode_conf.unwrap_or_default())?;

    if legacy_aliases {
        out.push_str(
            "DEPLOY_DIR_BASE ?= \"${TOPDIR}/deploy/${WHISK_MODE}/${WHISK_ACTUAL_VERSION}\"\n\
             WHISK_DEPLOY_DIR_BASE ?= \"${DEPLOY_DIR_BASE}\"\n\
             \n\
             WHISK_DEPLOY_DIR_core = \"${WHISK_DEPLOY_DIR_BASE}/core\"\n\
             DEPLOY_DIR_core = \"${WHISK_DEPLOY_DIR_core}\"\n",
        );
    } else {
        out.push_str(
            "WHISK_DEPLOY_DIR_BASE ?= \"${TOPDIR}/deploy/${WHISK_MODE}/${WHISK_ACTUAL_VERSION}\"\n\
             \n\
             WHISK_DEPLOY_DIR_core = \"${WHISK_DEPLOY_DIR_BASE}/core\"\n",
        );
    }

    out.push_str(
        "BBPATH .= \":${TOPDIR}/whisk\"\n\
         \n\
         WHISK_PRODUCT ?= \"core\"\n\
         WHISK_SUBPRODUCT ?= \"${WHISK_PRODUCT}\"\n\
         \n\
         # Set TMPDIR to a version specific location\n\
         TMPDIR_BASE ?= \"${TOPDIR}/tmp/${WHISK_MODE}/${WHISK_ACTUAL_VERSION}\"\n\
         \n\
         TMPDIR = \"${TMPDIR_BASE}/${WHISK_SUBPRODUCT}\"\n\
         \n\
         # Set the deploy directory to output to a well-known location\n\
         DEPLOY_DIR = \"${WHISK_DEPLOY_DIR_${WHISK_SUBPRODUCT}}\"\n\
         DEPLOY_DIR_IMAGE = \"${DEPLOY_DIR}/images\"\n",
    );

    let core_targets: Vec<String> = selection
        .products
        .iter()
        .map(|p| format!("${{WHISK_TARGETS_{}}}", p))
        .collect();
    writeln!(out, "WHISK_TARGETS_core = \"{}\"", core_targets.join(" "))?;

    for (name, product) in &document.products {
        let mut targets = product.targets.clone();
        targets.sort();
        writeln!(out, "WHISK_TARGETS_{} = \"{}\"", name, targets.join(" "))?;
        for (sub, _) in plan.subproducts.iter().filter(|(_, info)| info.product == *name) {
            if legacy_aliases {
                writeln!(out, "DEPLOY_DIR_{sub} = \"${{WHISK_DEPLOY_DIR_{sub}}}\"", sub = sub)?;
            }
            writeln!(
                out,
                "WHISK_DEPLOY_DIR_{sub} = \"${{WHISK_DEPLOY_DIR_BASE}}/{sub}\"",
                sub = sub
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "BBMULTICONFIG = \"{}\"", plan.multiconfigs.join(" "))?;
    writeln!(out, "BBMASK += \"${{BBMASK_${{WHISK_PRODUCT}}}}\"")?;
    writeln!(out)?;
    writeln!(
        out,
        "{}{}append = \" WHISK_PROJECT_ROOT\"",
        compat.hashbase_var, compat.override_sep
    )?;

    if let Some(product) = &plan.non_multiconfig_product {
        writeln!(out)?;
        writeln!(out, "WHISK_PRODUCT = \"{}\"", product)?;
        writeln!(out, "require conf/multiconfig/product-{}.conf", product)?;
    }

    writeln!(out, "{}", document.core.conf.as_deref().unwrap_or_default())?;
    Ok(())
}

/// Render one multiconfig file per subproduct in the document, keyed by
/// subproduct name.
pub fn render_multiconfigs(resolved: &Resolved<'_>) -> Vec<(String, String)> {
    let document = &resolved.project.document;
    resolved
        .plan
        .subproducts
        .iter()
        .map(|(name, info)| {
            let product = document.products.get(&info.product);
            let mut out = String::from(GENERATED);
            out.push_str(&format!("WHISK_PRODUCT = \"{}\"\n", info.product));
            out.push_str(&format!(
                "WHISK_PRODUCT_DESCRIPTION = \"{}\"\n",
                product.map(|p| p.description.as_str()).unwrap_or_default()
            ));
            out.push_str(&format!("WHISK_SUBPRODUCT = \"{}\"\n", name));
            out.push_str(&format!(
                "WHISK_SUBPRODUCT_DESCRIPTION = \"{}\"\n\n",
                info.description
            ));
            out.push_str(product.and_then(|p| p.conf.as_deref()).unwrap_or_default());
            out.push('\n');
            if let Some(conf) = &info.conf {
                out.push_str(conf);
                out.push('\n');
            }
            (name.clone(), out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::fixture::{Fixture, DOC};
    use super::*;

    #[test]
    fn test_site_conf_carries_mode_site_and_core_text() {
        let fixture = Fixture::new(&["board"], "dunfell");
        let text = render_site_conf(&fixture.resolved());

        assert!(text.starts_with(GENERATED));
        assert!(text.contains("SITE_MIRROR = \"lab\"\n"));
        assert!(text.contains("DEBUG_BUILD = \"1\"\n"));
        assert!(text.ends_with("CORE_SETTING = \"1\"\n"));
    }

    #[test]
    fn test_site_conf_targets_and_deploy_dirs() {
        let fixture = Fixture::new(&["board"], "dunfell");
        let text = render_site_conf(&fixture.resolved());

        assert!(text.contains("WHISK_TARGETS_core = \"${WHISK_TARGETS_board}\"\n"));
        assert!(text.contains("WHISK_TARGETS_board = \"image-a image-b\"\n"));
        assert!(text.contains("WHISK_TARGETS_tool = \"\"\n"));
        assert!(text.contains("WHISK_DEPLOY_DIR_board-lite = \"${WHISK_DEPLOY_DIR_BASE}/board-lite\"\n"));
        assert!(text.contains("WHISK_DEPLOY_DIR_tool = \"${WHISK_DEPLOY_DIR_BASE}/tool\"\n"));
        assert!(text.contains("BBMULTICONFIG = \"product-board-lite\"\n"));
        assert!(text.contains("\nWHISK_DEPLOY_DIR_BASE ?= "));
        assert!(!text.contains("\nDEPLOY_DIR_BASE ?="));
        assert!(!text.contains("\nDEPLOY_DIR_core ="));
    }

    #[test]
    fn test_site_conf_follows_compat_profile() {
        let legacy = render_site_conf(&Fixture::new(&["board"], "dunfell").resolved());
        assert!(legacy.contains("BB_HASHBASE_WHITELIST_append = \" WHISK_PROJECT_ROOT\"\n"));

        let modern = render_site_conf(&Fixture::new(&["board"], "kirkstone").resolved());
        assert!(modern.contains("BB_BASEHASH_IGNORE_VARS:append = \" WHISK_PROJECT_ROOT\"\n"));
    }

    #[test]
    fn test_site_conf_legacy_document_aliases() {
        let doc = DOC.replacen("version: 2", "version: 1", 1);
        let fixture = Fixture::from_doc(&doc, &["board"], "dunfell");
        let text = render_site_conf(&fixture.resolved());

        assert!(text.contains("DEPLOY_DIR_BASE ?= \"${TOPDIR}/deploy/${WHISK_MODE}/${WHISK_ACTUAL_VERSION}\"\n"));
        assert!(text.contains("DEPLOY_DIR_core = \"${WHISK_DEPLOY_DIR_core}\"\n"));
        assert!(text.contains("DEPLOY_DIR_board-lite = \"${WHISK_DEPLOY_DIR_board-lite}\"\n"));
    }

    #[test]
    fn test_site_conf_non_multiconfig_product() {
        let fixture = Fixture::new(&["tool"], "dunfell");
        let text = render_site_conf(&fixture.resolved());

        assert!(text.contains("BBMULTICONFIG = \"\"\n"));
        assert!(text.contains("WHISK_PRODUCT = \"tool\"\nrequire conf/multiconfig/product-tool.conf\n"));
    }

    #[test]
    fn test_multiconfig_files() {
        let fixture = Fixture::new(&["board"], "dunfell");
        let files = render_multiconfigs(&fixture.resolved());
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["board-lite", "tool"]);

        let lite = &files[0].1;
        assert!(lite.starts_with(GENERATED));
        assert!(lite.contains("WHISK_PRODUCT = \"board\"\n"));
        assert!(lite.contains("WHISK_PRODUCT_DESCRIPTION = \"The board\"\n"));
        assert!(lite.contains("WHISK_SUBPRODUCT = \"board-lite\"\n"));
        assert!(lite.contains("WHISK_SUBPRODUCT_DESCRIPTION = \"Lite\"\n"));
        assert!(lite.contains("MACHINE = \"board\"\n"));
    }
}
