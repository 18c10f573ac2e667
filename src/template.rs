//! # Template Substitution
//!
//! Every string in the configuration document may reference variables with
//! `%{NAME}`. Substitution runs once over the whole parsed tree, before the
//! document is deserialized into typed records, so references work the same
//! inside nested hook text, command lists and layer paths.
//!
//! ## Syntax
//!
//! - `%{NAME}` is replaced by the value of `NAME` in the environment.
//! - `%%` produces a literal `%`.
//! - Any other `%` is copied through unchanged.
//!
//! Only mapping values and sequence items are rewritten; mapping keys and
//! non-string scalars are left as they are. A reference to an undefined
//! variable aborts the whole pass with [`Error::UndefinedVariable`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(%|\{([A-Za-z_][A-Za-z0-9_]*)\})").expect("placeholder pattern is valid")
});

/// Substitute every `%{NAME}` reference in a single string.
pub fn substitute_str(input: &str, env: &HashMap<String, String>) -> Result<String> {
    let mut missing: Option<String> = None;
    let result = PLACEHOLDER.replace_all(input, |caps: &Captures| match caps.get(2) {
        None => "%".to_string(),
        Some(name) => match env.get(name.as_str()) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| name.as_str().to_string());
                String::new()
            }
        },
    });

    match missing {
        Some(name) => Err(Error::UndefinedVariable { name }),
        None => Ok(result.into_owned()),
    }
}

/// Substitute every string in a YAML tree.
///
/// Consumes the tree and returns the rewritten one; on error nothing of the
/// partially rewritten tree escapes.
pub fn substitute(value: Value, env: &HashMap<String, String>) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_str(&s, env)?)),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| substitute(item, env))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key, substitute(item, env)?);
            }
            Ok(Value::Mapping(out))
        }
        Value::Tagged(mut tagged) => {
            tagged.value = substitute(tagged.value, env)?;
            Ok(Value::Tagged(tagged))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_defined_variable() {
        let env = env(&[("FOO", "bar")]);
        assert_eq!(substitute_str("a-%{FOO}-b", &env).unwrap(), "a-bar-b");
    }

    #[test]
    fn test_substitute_undefined_variable_names_it() {
        let err = substitute_str("%{NOPE}/x", &HashMap::new()).unwrap_err();
        match err {
            Error::UndefinedVariable { name } => assert_eq!(name, "NOPE"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_escape_and_stray_percent() {
        let env = env(&[("X", "1")]);
        assert_eq!(substitute_str("100%% %{X}", &env).unwrap(), "100% 1");
        assert_eq!(substitute_str("50% off", &env).unwrap(), "50% off");
        assert_eq!(substitute_str("%{", &env).unwrap(), "%{");
        assert_eq!(substitute_str("%%{X}", &env).unwrap(), "%{X}");
    }

    #[test]
    fn test_substitute_nested_tree_leaves_keys_alone() {
        let env = env(&[("ROOT", "/src"), ("K", "nope")]);
        let doc: Value = serde_yaml::from_str(
            r#"
"%{K}":
  paths:
    - "%{ROOT}/meta"
    - 3
  enabled: true
"#,
        )
        .unwrap();

        let out = substitute(doc, &env).unwrap();
        let inner = &out["%{K}"];
        assert_eq!(inner["paths"][0].as_str(), Some("/src/meta"));
        assert_eq!(inner["paths"][1].as_i64(), Some(3));
        assert_eq!(inner["enabled"].as_bool(), Some(true));
    }

    #[test]
    fn test_substitute_tree_fails_on_any_undefined() {
        let doc: Value = serde_yaml::from_str("a: [ok, '%{MISSING}']").unwrap();
        assert!(matches!(
            substitute(doc, &HashMap::new()),
            Err(Error::UndefinedVariable { .. })
        ));
    }

    proptest! {
        /// Strings without a percent sign are returned unchanged
        #[test]
        fn plain_strings_are_untouched(input in "[^%]*") {
            let out = substitute_str(&input, &HashMap::new()).unwrap();
            prop_assert_eq!(out, input);
        }

        /// A lone reference expands to exactly the variable's value
        #[test]
        fn reference_expands_to_value(name in "[A-Z_][A-Z0-9_]{0,8}", value in "[^%]*") {
            let mut env = HashMap::new();
            env.insert(name.clone(), value.clone());
            let out = substitute_str(&format!("%{{{}}}", name), &env).unwrap();
            prop_assert_eq!(out, value);
        }

        /// Doubled percent signs collapse to one
        #[test]
        fn escapes_collapse(count in 0usize..10) {
            let input = "%%".repeat(count);
            let out = substitute_str(&input, &HashMap::new()).unwrap();
            prop_assert_eq!(out, "%".repeat(count));
        }
    }
}
