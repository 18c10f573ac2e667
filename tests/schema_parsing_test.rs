//! Document parsing tests using datatest-stable for test data discovery
//!
//! Every YAML file in `tests/testdata` must load as a project, pass the
//! structural lint and resolve layers for each of its products.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use whisk::config::Project;
use whisk::layers;
use whisk::lint::{self, Severity};
use whisk::selection::{RequestedVersion, Selection};

fn test_document_parsing(path: &Path) -> datatest_stable::Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read test file {}: {}", path.display(), e))?;

    let project = Project::parse(&content, path, HashMap::new())
        .map_err(|e| format!("Failed to parse document {}: {}", path.display(), e))?;
    let doc = &project.document;

    assert!(
        !doc.products.is_empty(),
        "Document {} should declare at least one product",
        path.display()
    );
    for (name, version) in &doc.versions {
        assert!(
            !version.oeinit.contains("%{"),
            "{}: oeinit of {} was not substituted",
            path.display(),
            name
        );
    }

    let errors: Vec<String> = lint::lint_document(doc)
        .into_iter()
        .filter(|f| f.severity == Severity::Error)
        .map(|f| f.to_string())
        .collect();
    assert!(errors.is_empty(), "{}: {:?}", path.display(), errors);

    for (name, product) in &doc.products {
        let selection = Selection {
            products: vec![name.clone()],
            mode: doc.modes.keys().next().cloned().unwrap_or_default(),
            site: doc.sites.keys().next().cloned().unwrap_or_default(),
            version: RequestedVersion::Default,
            actual_version: product.default_version.clone(),
            build_dir: PathBuf::from("/tmp/build"),
        };
        let plan = layers::resolve(&project, &selection)
            .map_err(|e| format!("{}: product {}: {}", path.display(), name, e))?;
        assert!(plan.subproducts.values().any(|s| s.product == *name));
    }

    Ok(())
}

datatest_stable::harness!(test_document_parsing, "tests/testdata", r".*\.yaml$");
