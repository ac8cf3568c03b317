//! # notefmt
//!
//! A deterministic formatting engine that rewrites unstructured plain text
//! into well-formed Markdown: headings, lists, emphasis, callouts and
//! variable placeholders, inferred from content alone.
//!
//! The engine is a pure function of its inputs. It never performs I/O, never
//! panics on malformed input, and always produces a [`FormatResult`]. Fenced
//! code blocks are treated as opaque and pass through byte-identical.
//!
//! ## Example
//!
//! ```text
//! let result = notefmt::format("Languages: Python, Go, and Rust", &[]);
//! // result.formatted contains "**Languages:**" followed by three bullets
//! ```
//!
//! ## Pipeline
//!
//! Raw text flows through: custom rules → whitespace normalization →
//! early-exit detectors (JSON, YAML front matter, source code, delimited
//! tables) → segmentation → eight ordered stage groups (first pass) →
//! spacing post-processing → a second stabilizing pass. If the second pass
//! produces different output than the first, the second pass wins, since it
//! is closer to a fixed point.

pub mod classify;
pub mod detect;
pub mod pipeline;
pub mod post;
pub mod rules;
pub mod segment;
pub mod stage;
pub mod stages;
pub mod text;

use serde::{Deserialize, Serialize};

/// A user-authored regex find/replace rule, applied before the core pipeline.
///
/// The rule list is owned and persisted by the caller; the engine treats it
/// as a read-only, ordered input for one invocation. A rule whose pattern
/// fails to compile is skipped for that call without affecting other rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    pub id: String,
    pub name: String,
    pub pattern: String,
    pub replacement: String,
    pub active: bool,
}

/// The sole externally observable output of a format call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatResult {
    /// The formatted Markdown text.
    pub formatted: String,
    /// Human-readable summary of which stages or detectors fired,
    /// e.g. "JSON Prettify" or "Headers, Lists +2 more", or "Standard"
    /// when nothing applied.
    #[serde(rename = "formatType")]
    pub format_type: String,
}

/// Format plain text into Markdown.
///
/// This is the single entry point of the engine. It never fails: malformed
/// custom rule patterns are skipped per-rule with a diagnostic, and every
/// heuristic models "no match" rather than an error.
pub fn format(text: &str, custom_rules: &[CustomRule]) -> FormatResult {
    pipeline::run(text, custom_rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_empty_input() {
        let result = format("", &[]);
        assert_eq!(result.formatted, "");
        assert_eq!(result.format_type, "Standard");
    }

    #[test]
    fn test_format_never_panics_on_odd_input() {
        for input in ["\u{feff}", "```", "````\n", "---", ">>>", "\0\0", "hi -- there"] {
            let _ = format(input, &[]);
        }
    }
}
