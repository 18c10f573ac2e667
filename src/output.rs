//! # Output Configuration
//!
//! Controls how `whisk` decorates what it prints on the terminal. The
//! environment file and the build configuration are never decorated; this
//! only concerns human-facing output such as the selection summary, the
//! `--list` tables and the `validate` report.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Colors are detected on stderr when running under the shell bootstrap,
//! since stdout is usually captured there.
//!
//! ## Usage
//!
//! ```
//! use whisk::output::{emoji, OutputConfig};
//!
//! let config = OutputConfig::from_env_and_flag("never");
//! assert_eq!(emoji(&config, "✅", "[OK]"), "[OK]");
//! ```

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: "always" forces colors on
    /// (even over `NO_COLOR`), "never" forces them off, anything else
    /// detects support from the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stderr().features().colors_supported()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Highlight the `Possible ...:` headings of a `--list` table.
pub fn highlight_headings(config: &OutputConfig, text: &str) -> String {
    if !config.use_color {
        return text.to_string();
    }

    text.lines()
        .map(|line| {
            if line.starts_with("Possible ") {
                console::style(line).bold().to_string()
            } else if let Some(rest) = line.strip_prefix(" *") {
                format!("{}{}", console::style(" *").green(), rest)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        + if text.ends_with('\n') { "\n" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_always() {
        let config = OutputConfig::from_env_and_flag("always");
        assert!(config.use_color);
    }

    #[test]
    fn test_color_never() {
        let config = OutputConfig::from_env_and_flag("NEVER");
        assert!(!config.use_color);
    }

    #[test]
    fn test_emoji_helper_with_color() {
        let config = OutputConfig { use_color: true };
        assert_eq!(emoji(&config, "🔍", "[SCAN]"), "🔍");
    }

    #[test]
    fn test_emoji_helper_without_color() {
        let config = OutputConfig { use_color: false };
        assert_eq!(emoji(&config, "🔍", "[SCAN]"), "[SCAN]");
    }

    #[test]
    fn test_highlight_headings_plain() {
        let text = "Possible products:\n *  p1\n    p2\n";
        let config = OutputConfig { use_color: false };
        assert_eq!(highlight_headings(&config, text), text);
    }

    #[test]
    fn test_highlight_headings_keeps_rows() {
        console::set_colors_enabled(true);
        let text = "Possible products:\n *  p1\n    p2\n";
        let config = OutputConfig { use_color: true };
        let styled = highlight_headings(&config, text);
        assert!(styled.contains("  p1\n"));
        assert!(styled.ends_with("    p2\n"));
        assert!(styled.contains("\u{1b}["));
    }
}
