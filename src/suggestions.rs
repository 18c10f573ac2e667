//! # Error Suggestions
//!
//! Helpers for building error messages that tell the user what went wrong
//! *and* what the valid alternatives are: aligned choice listings, small
//! tables, and "did you mean" hints for mistyped names.
//!
//! ## Usage
//!
//! ```
//! use whisk::suggestions;
//!
//! let modes = vec!["debug".to_string(), "release".to_string()];
//! let err = suggestions::unknown_selection("mode", "relase", &modes);
//! assert!(err.to_string().contains("Did you mean 'release'?"));
//! ```

use std::path::Path;

use crate::error::Error;

/// Build an [`Error::UnknownSelection`] for `value`, listing `choices` and
/// suggesting the closest one when it looks like a typo.
pub fn unknown_selection(kind: &'static str, value: &str, choices: &[String]) -> Error {
    let mut sorted = choices.to_vec();
    sorted.sort();
    let suggestion = find_similar(value, &sorted).map(str::to_string);
    Error::UnknownSelection {
        kind,
        value: value.to_string(),
        choices: sorted,
        suggestion,
    }
}

/// Generate an error for when the configuration document is not found.
///
/// Includes hints about the `--conf` flag and the `WHISK_CONF` variable.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a whisk.yaml file in your project root\n\
         hint: Use --conf to specify a different path\n\
         hint: Set WHISK_CONF environment variable",
        path = path.display()
    )
}

/// Render names one per line, indented by two spaces.
pub fn listing(choices: &[String]) -> String {
    choices
        .iter()
        .map(|c| format!("  {}", c))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render two-column rows with the first column padded to a common width.
pub fn table(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(k, v)| format!("{:<width$}  {}", k, v, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
pub fn find_similar<'a>(input: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate.as_str(), distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // Single rolling row instead of the full matrix.
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, ca) in a_chars.iter().enumerate() {
        let mut current = Vec::with_capacity(b_chars.len() + 1);
        current.push(i + 1);
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let value = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
            current.push(value);
        }
        previous = current;
    }

    previous[b_chars.len()]
}
