//! # Fetch Orchestration
//!
//! Layers usually live in separate repositories that must be checked out
//! before a build. The document declares the shell commands that do this at
//! several levels, and `configure --fetch` runs them in a fixed order:
//!
//! 1. global `fetch.commands`,
//! 2. the actual version's `fetch.commands`,
//! 3. each requested layer's `fetch.commands`, in declaration order,
//! 4. each selected product's `fetch.commands`, in selection order.
//!
//! Every command runs through `sh -c` with the project root as working
//! directory and the substitution environment (including
//! `WHISK_PROJECT_ROOT`) injected. The first failing command stops the run
//! with [`Error::FetchFailed`] carrying its captured output. Commands that
//! already succeeded are not rolled back.

use std::process::Command;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{fetch_commands, Project};
use crate::error::{Error, Result};
use crate::layers::{self, LayerPlan};
use crate::selection::Selection;

/// A fetch command and where it was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCommand {
    /// Human readable origin, e.g. `layer 'meta-foo'`
    pub origin: String,
    pub command: String,
}

/// Gather the fetch commands for a resolved selection, in execution order.
pub fn collect(project: &Project, selection: &Selection, plan: &LayerPlan) -> Result<Vec<FetchCommand>> {
    let document = &project.document;
    let version = layers::actual_version(project, selection)?;
    let mut commands = Vec::new();

    let mut push = |origin: String, list: &[String]| {
        commands.extend(list.iter().map(|command| FetchCommand {
            origin: origin.clone(),
            command: command.clone(),
        }));
    };

    push("global".to_string(), fetch_commands(&document.fetch));
    push(
        format!("version '{}'", selection.actual_version),
        fetch_commands(&version.fetch),
    );
    for layer in version.layers.iter().filter(|l| plan.requested.contains(&l.name)) {
        push(format!("layer '{}'", layer.name), fetch_commands(&layer.fetch));
    }
    for name in &selection.products {
        if let Some(product) = document.products.get(name) {
            push(format!("product '{}'", name), fetch_commands(&product.fetch));
        }
    }

    Ok(commands)
}

/// Run fetch commands in order, stopping at the first failure.
pub fn run(project: &Project, commands: &[FetchCommand], quiet: bool) -> Result<()> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(commands.len() as u64)
    };
    bar.set_style(
        ProgressStyle::with_template("Fetching: {percent:>3}%|{bar:40}| {pos}/{len} [{elapsed}<{eta}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for fetch in commands {
        log::debug!("fetch ({}): {}", fetch.origin, fetch.command);
        let output = Command::new("sh")
            .arg("-c")
            .arg(&fetch.command)
            .current_dir(&project.root)
            .envs(&project.env)
            .output()
            .map_err(|e| Error::FetchFailed {
                command: fetch.command.clone(),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            bar.abandon();
            let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
            captured.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Error::FetchFailed {
                command: fetch.command.clone(),
                output: captured,
            });
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::RequestedVersion;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const DOC: &str = r#"
version: 2
fetch:
  commands: [g1]
core:
  layers: [base]
versions:
  v1:
    oeinit: oe-init-build-env
    fetch:
      commands: [v1]
    layers:
      - name: base
        fetch: {commands: [base]}
      - name: unused
        fetch: {commands: [unused]}
      - name: extra
        fetch: {commands: [extra1, extra2]}
products:
  p:
    default_version: v1
    layers: [extra]
    fetch:
      commands: [prod]
"#;

    fn setup(yaml: &str, root: &std::path::Path) -> (Project, Selection, LayerPlan) {
        let project = Project::parse(yaml, &root.join("whisk.yaml"), HashMap::new()).unwrap();
        let selection = Selection {
            products: vec!["p".to_string()],
            mode: "m".to_string(),
            site: "s".to_string(),
            version: RequestedVersion::Default,
            actual_version: "v1".to_string(),
            build_dir: PathBuf::from("build"),
        };
        let plan = layers::resolve(&project, &selection).unwrap();
        (project, selection, plan)
    }

    #[test]
    fn test_collect_order() {
        let temp = TempDir::new().unwrap();
        let (project, selection, plan) = setup(DOC, temp.path());
        let commands: Vec<String> = collect(&project, &selection, &plan)
            .unwrap()
            .into_iter()
            .map(|c| c.command)
            .collect();
        assert_eq!(commands, vec!["g1", "v1", "base", "extra1", "extra2", "prod"]);
    }

    #[test]
    fn test_run_in_project_root_with_environment() {
        let temp = TempDir::new().unwrap();
        let (project, _, _) = setup(DOC, temp.path());
        let commands = vec![FetchCommand {
            origin: "test".to_string(),
            command: "echo \"$WHISK_PROJECT_ROOT\" > fetched.txt".to_string(),
        }];

        run(&project, &commands, true).unwrap();

        let written = std::fs::read_to_string(temp.path().join("fetched.txt")).unwrap();
        assert_eq!(written.trim(), project.root.to_string_lossy());
    }

    #[test]
    fn test_run_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        let (project, _, _) = setup(DOC, temp.path());
        let commands: Vec<FetchCommand> = ["touch one", "echo broken; exit 3", "touch two"]
            .iter()
            .map(|c| FetchCommand {
                origin: "test".to_string(),
                command: c.to_string(),
            })
            .collect();

        let err = run(&project, &commands, true).unwrap_err();
        match err {
            Error::FetchFailed { command, output } => {
                assert_eq!(command, "echo broken; exit 3");
                assert!(output.contains("broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(temp.path().join("one").exists());
        assert!(!temp.path().join("two").exists());
    }
}
