//! # Layer and Subproduct Resolution
//!
//! Given a [`Selection`], this module works out which layer collections the
//! build needs and which generated per-subproduct configurations exist.
//!
//! ## Entries
//!
//! Every build includes the implicit `core` pseudo-product next to the
//! selected products. Both kinds are modelled as an [`Entry`] exposing the
//! same capabilities: a name and the layers it requires. A product always
//! builds on top of core, so its effective requirements are core's layers
//! plus its own.
//!
//! ## Checks
//!
//! - Every layer an entry requires must be declared by the actual version.
//! - Subproduct names are unique across *all* products in the document. A
//!   product without `subproducts` is its own sole subproduct.
//! - A selected product with `multiconfig_enabled: false` may declare neither
//!   subproducts nor multiconfigs, and must be the only selected product.
//!
//! The result is a [`LayerPlan`], consumed by the fetch orchestrator and the
//! artifact emitter.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::{Core, Document, Product, Project, Version};
use crate::defaults;
use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::suggestions;

/// A participant in the build: the core pseudo-product or a real product.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Core(&'a Core),
    Product { name: &'a str, product: &'a Product },
}

impl<'a> Entry<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Entry::Core(_) => defaults::CORE,
            Entry::Product { name, .. } => name,
        }
    }

    /// Layers this entry declares itself.
    pub fn layers(&self) -> &'a [String] {
        match *self {
            Entry::Core(core) => &core.layers,
            Entry::Product { product, .. } => &product.layers,
        }
    }
}

/// Core followed by the selected products, in selection order.
pub fn entries<'a>(document: &'a Document, selection: &Selection) -> Vec<Entry<'a>> {
    std::iter::once(Entry::Core(&document.core))
        .chain(selection.products.iter().filter_map(|name| {
            document
                .products
                .get_key_value(name)
                .map(|(name, product)| Entry::Product { name, product })
        }))
        .collect()
}

/// One subproduct and the product it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubproductInfo {
    pub product: String,
    pub description: String,
    /// Extra configuration of a declared subproduct
    pub conf: Option<String>,
}

/// Paths masked out of the build for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMask {
    pub entry: String,
    pub paths: Vec<String>,
}

/// Everything resolved about layers and subproducts for one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPlan {
    /// Required layer names, in version declaration order
    pub requested: Vec<String>,
    /// Paths of the required layers, in declaration order
    pub layer_paths: Vec<String>,
    /// Masks for core and each selected product, in that order
    pub masks: Vec<EntryMask>,
    /// Every subproduct of every product in the document
    pub subproducts: BTreeMap<String, SubproductInfo>,
    /// Subproducts of the selected products, sorted
    pub selected_subproducts: Vec<String>,
    /// Multiconfig names to enable, sorted; empty for a non-multiconfig build
    pub multiconfigs: Vec<String>,
    /// The single selected product when it opted out of multiconfig
    pub non_multiconfig_product: Option<String>,
}

/// Resolve the layer plan for a selection.
pub fn resolve(project: &Project, selection: &Selection) -> Result<LayerPlan> {
    let document = &project.document;
    let version = actual_version(project, selection)?;
    let entries = entries(document, selection);

    check_available(&entries, version, &selection.actual_version)?;

    let requested_set: HashSet<&str> = entries
        .iter()
        .flat_map(|e| e.layers())
        .map(String::as_str)
        .collect();
    let requested: Vec<String> = version
        .layers
        .iter()
        .filter(|l| requested_set.contains(l.name.as_str()))
        .map(|l| l.name.clone())
        .collect();
    let layer_paths = version
        .layers
        .iter()
        .filter(|l| requested_set.contains(l.name.as_str()))
        .flat_map(|l| l.paths.iter().cloned())
        .collect();

    let masks = entries
        .iter()
        .map(|entry| EntryMask {
            entry: entry.name().to_string(),
            paths: masked_paths(version, &required_by(entry, document)),
        })
        .collect();

    let subproducts = subproduct_map(document)?;
    let non_multiconfig_product = check_multiconfig(document, selection)?;

    let selected: BTreeSet<&str> = selection.products.iter().map(String::as_str).collect();
    let selected_subproducts: Vec<String> = subproducts
        .iter()
        .filter(|(_, info)| selected.contains(info.product.as_str()))
        .map(|(name, _)| name.clone())
        .collect();

    let multiconfigs = if non_multiconfig_product.is_some() {
        Vec::new()
    } else {
        let mut names: BTreeSet<String> = selected_subproducts
            .iter()
            .map(|sub| format!("product-{}", sub))
            .collect();
        for name in &selection.products {
            if let Some(product) = document.products.get(name) {
                names.extend(product.multiconfigs.iter().cloned());
            }
        }
        names.into_iter().collect()
    };

    log::debug!("requested layers: {:?}", requested);

    Ok(LayerPlan {
        requested,
        layer_paths,
        masks,
        subproducts,
        selected_subproducts,
        multiconfigs,
        non_multiconfig_product,
    })
}

/// The version record of the selection's actual version.
pub fn actual_version<'a>(project: &'a Project, selection: &Selection) -> Result<&'a Version> {
    project
        .document
        .versions
        .get(&selection.actual_version)
        .ok_or_else(|| {
            let names: Vec<String> = project.document.versions.keys().cloned().collect();
            suggestions::unknown_selection("version", &selection.actual_version, &names)
        })
}

fn required_by<'a>(entry: &Entry<'a>, document: &'a Document) -> HashSet<&'a str> {
    let mut required: HashSet<&str> = entry.layers().iter().map(String::as_str).collect();
    if let Entry::Product { .. } = entry {
        required.extend(document.core.layers.iter().map(String::as_str));
    }
    required
}

fn masked_paths(version: &Version, required: &HashSet<&str>) -> Vec<String> {
    version
        .layers
        .iter()
        .flat_map(|layer| {
            if required.contains(layer.name.as_str()) {
                layer.bbmask.iter()
            } else {
                layer.paths.iter()
            }
        })
        .cloned()
        .collect()
}

fn check_available(
    entries: &[Entry<'_>],
    version: &Version,
    version_name: &str,
) -> Result<()> {
    for entry in entries {
        let mut seen = HashSet::new();
        let missing: Vec<&str> = entry
            .layers()
            .iter()
            .map(String::as_str)
            .filter(|name| version.layer(name).is_none() && seen.insert(*name))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingLayers {
                product: entry.name().to_string(),
                layers: missing.join(" "),
                version: version_name.to_string(),
            });
        }
    }
    Ok(())
}

/// Map every subproduct name in the document to its product.
pub fn subproduct_map(document: &Document) -> Result<BTreeMap<String, SubproductInfo>> {
    let mut map: BTreeMap<String, SubproductInfo> = BTreeMap::new();

    for (product_name, product) in &document.products {
        let declared: Vec<(String, SubproductInfo)> = match &product.subproducts {
            None => vec![(
                product_name.clone(),
                SubproductInfo {
                    product: product_name.clone(),
                    description: product.description.clone(),
                    conf: None,
                },
            )],
            Some(subs) => subs
                .iter()
                .map(|(name, sub)| {
                    (
                        name.clone(),
                        SubproductInfo {
                            product: product_name.clone(),
                            description: sub.description.clone(),
                            conf: sub.conf.clone(),
                        },
                    )
                })
                .collect(),
        };

        for (name, info) in declared {
            if let Some(existing) = map.get(&name) {
                return Err(Error::DuplicateSubproduct {
                    name,
                    first: existing.product.clone(),
                    second: product_name.clone(),
                });
            }
            map.insert(name, info);
        }
    }

    Ok(map)
}

/// Validate multiconfig flags of the selected products.
///
/// Returns the selected product when it is a non-multiconfig build.
fn check_multiconfig(document: &Document, selection: &Selection) -> Result<Option<String>> {
    let mut non_multiconfig = None;

    for name in &selection.products {
        let Some(product) = document.products.get(name) else {
            continue;
        };
        if product.multiconfig_enabled {
            continue;
        }
        if product.subproducts.is_some() {
            return Err(Error::MulticonfigConflict {
                product: name.clone(),
                feature: "subproducts",
            });
        }
        if !product.multiconfigs.is_empty() {
            return Err(Error::MulticonfigConflict {
                product: name.clone(),
                feature: "multiconfigs",
            });
        }
        if selection.products.len() > 1 {
            return Err(Error::NonMulticonfigCombination {
                product: name.clone(),
                selected: selection.products.join(" "),
            });
        }
        non_multiconfig = Some(name.clone());
    }

    Ok(non_multiconfig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::RequestedVersion;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    const DOC: &str = r#"
version: 2
core:
  layers: [c]
versions:
  v1:
    oeinit: oe-init-build-env
    layers:
      - name: a
        paths: [/l/a]
      - name: b
        paths: [/l/b1, /l/b2]
        bbmask: [/l/b1/recipes-broken]
      - name: c
        paths: [/l/c]
      - name: d
        paths: [/l/d]
products:
  p:
    default_version: v1
    layers: [a, b]
    multiconfigs: [extra]
  q:
    default_version: v1
    layers: [d]
    subproducts:
      q-small: {description: Small}
      q-large: {conf: 'SIZE = "large"'}
  solo:
    default_version: v1
    multiconfig_enabled: false
"#;

    fn project(yaml: &str) -> Project {
        Project::parse(yaml, Path::new("/work/whisk.yaml"), HashMap::new()).unwrap()
    }

    fn selection(products: &[&str]) -> Selection {
        Selection {
            products: products.iter().map(|p| p.to_string()).collect(),
            mode: "m".to_string(),
            site: "s".to_string(),
            version: RequestedVersion::Default,
            actual_version: "v1".to_string(),
            build_dir: PathBuf::from("/work/build"),
        }
    }

    fn mask_for<'a>(plan: &'a LayerPlan, entry: &str) -> &'a [String] {
        &plan
            .masks
            .iter()
            .find(|m| m.entry == entry)
            .unwrap()
            .paths
    }

    #[test]
    fn test_entry_capabilities() {
        let project = project(DOC);
        let entries = entries(&project.document, &selection(&["p"]));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), "core");
        assert_eq!(entries[0].layers(), ["c".to_string()]);
        assert_eq!(entries[1].name(), "p");
    }

    #[test]
    fn test_layer_union_and_masks() {
        let project = project(DOC);
        let plan = resolve(&project, &selection(&["p"])).unwrap();

        assert_eq!(plan.requested, vec!["a", "b", "c"]);
        assert_eq!(plan.layer_paths, vec!["/l/a", "/l/b1", "/l/b2", "/l/c"]);

        // The product masks only what lies outside the resolved set, plus bbmask
        assert_eq!(mask_for(&plan, "p"), ["/l/b1/recipes-broken", "/l/d"]);
        // Core masks the product layers it does not need itself
        assert_eq!(mask_for(&plan, "core"), ["/l/a", "/l/b1", "/l/b2", "/l/d"]);
    }

    #[test]
    fn test_missing_layers_names_product_and_version() {
        let yaml = DOC.replace("layers: [d]", "layers: [d, x, y, x]");
        let project = project(&yaml);
        let err = resolve(&project, &selection(&["q"])).unwrap_err();
        match err {
            Error::MissingLayers {
                product,
                layers,
                version,
            } => {
                assert_eq!(product, "q");
                assert_eq!(layers, "x y");
                assert_eq!(version, "v1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_core_layer() {
        let yaml = DOC.replace("layers: [c]", "layers: [c, zz]");
        let err = resolve(&project(&yaml), &selection(&["p"])).unwrap_err();
        assert!(matches!(err, Error::MissingLayers { ref product, .. } if product == "core"));
    }

    #[test]
    fn test_subproducts_and_multiconfigs() {
        let project = project(DOC);
        let plan = resolve(&project, &selection(&["p", "q"])).unwrap();

        assert_eq!(
            plan.subproducts.keys().collect::<Vec<_>>(),
            vec!["p", "q-large", "q-small", "solo"]
        );
        assert_eq!(plan.selected_subproducts, vec!["p", "q-large", "q-small"]);
        assert_eq!(
            plan.multiconfigs,
            vec!["extra", "product-p", "product-q-large", "product-q-small"]
        );
        assert_eq!(plan.subproducts["q-small"].product, "q");
        assert_eq!(plan.subproducts["q-large"].conf.as_deref(), Some("SIZE = \"large\""));
        assert!(plan.non_multiconfig_product.is_none());
    }

    #[test]
    fn test_duplicate_subproduct_names_both_products() {
        let yaml = DOC.replace("q-small: {description: Small}", "p: {description: Clash}");
        let err = resolve(&project(&yaml), &selection(&["solo"])).unwrap_err();
        match err {
            Error::DuplicateSubproduct {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "p");
                assert_eq!(first, "p");
                assert_eq!(second, "q");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_multiconfig_product_alone() {
        let project = project(DOC);
        let plan = resolve(&project, &selection(&["solo"])).unwrap();
        assert_eq!(plan.non_multiconfig_product.as_deref(), Some("solo"));
        assert!(plan.multiconfigs.is_empty());
    }

    #[test]
    fn test_non_multiconfig_product_combined() {
        let err = resolve(&project(DOC), &selection(&["p", "solo"])).unwrap_err();
        assert!(matches!(err, Error::NonMulticonfigCombination { ref product, .. } if product == "solo"));
    }

    #[test]
    fn test_non_multiconfig_with_subproducts_or_multiconfigs() {
        let yaml = DOC.replace(
            "    multiconfig_enabled: false\n",
            "    multiconfig_enabled: false\n    subproducts: {s1: {}}\n",
        );
        let err = resolve(&project(&yaml), &selection(&["solo"])).unwrap_err();
        assert!(matches!(err, Error::MulticonfigConflict { feature: "subproducts", .. }));

        let yaml = DOC.replace(
            "    multiconfig_enabled: false\n",
            "    multiconfig_enabled: false\n    multiconfigs: [m]\n",
        );
        let err = resolve(&project(&yaml), &selection(&["solo"])).unwrap_err();
        assert!(matches!(err, Error::MulticonfigConflict { feature: "multiconfigs", .. }));
    }
}
