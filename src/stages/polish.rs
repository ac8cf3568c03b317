//! Final polish stages.
//!
//! Closing periods on paragraph-final prose lines, em dashes for double
//! hyphens, and a single ellipsis character for three dots.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::stage::{Applied, Stage};
use crate::text::{is_structural_line, word_count};

pub fn stages() -> Vec<Stage> {
    vec![
        Stage { label: "Closing Periods", run: closing_periods },
        Stage { label: "Punctuation", run: punctuation },
    ]
}

/// Minimum size for a line to deserve an appended period.
const MIN_CHARS: usize = 30;
const MIN_WORDS: usize = 6;

/// A prose line at a true paragraph boundary (blank line or end of document
/// follows) that is substantial and lacks terminal punctuation receives an
/// appended period.
fn closing_periods(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let at_boundary = i + 1 >= lines.len() || lines[i + 1].trim().is_empty();
        let trimmed = line.trim_end();
        let eligible = at_boundary
            && trimmed.len() >= MIN_CHARS
            && word_count(trimmed) >= MIN_WORDS
            && !is_structural_line(trimmed)
            && trimmed.chars().last().map_or(false, |c| c.is_alphanumeric())
            && !ends_in_url(trimmed);
        if eligible {
            out.push(format!("{}.", trimmed));
        } else {
            out.push((*line).to_string());
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

fn ends_in_url(line: &str) -> bool {
    line.rsplit(|c: char| c.is_whitespace())
        .next()
        .map_or(false, |w| w.contains("://") || w.starts_with("www."))
}

static DOUBLE_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^-\s])\s*--\s*([^-\s])").unwrap());
static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3}").unwrap());

/// `--` between words becomes a spaced em dash; `...` becomes `…`.
/// Divider lines made only of dashes are structural and never match.
fn punctuation(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            if is_structural_line(line) {
                return line.to_string();
            }
            let fixed = DOUBLE_HYPHEN.replace_all(line, "$1 — $2").into_owned();
            ELLIPSIS.replace_all(&fixed, "…").into_owned()
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_period_appended() {
        let line = "This sentence is long enough to deserve a closing period";
        let out = closing_periods(line);
        assert_eq!(out.text, format!("{}.", line));
    }

    #[test]
    fn test_short_lines_skipped() {
        assert!(!closing_periods("Too short to touch").applied);
    }

    #[test]
    fn test_non_boundary_lines_skipped() {
        let text = "A line that would otherwise easily qualify for periods\ncontinues here";
        let out = closing_periods(text);
        assert!(!out.text.contains("periods."));
    }

    #[test]
    fn test_url_endings_skipped() {
        let line = "All of the documentation lives at https://docs.example.com/latest";
        assert!(!closing_periods(line).applied);
    }

    #[test]
    fn test_em_dash() {
        let out = punctuation("Fast -- and loose");
        assert_eq!(out.text, "Fast — and loose");
    }

    #[test]
    fn test_ellipsis() {
        let out = punctuation("Wait for it...");
        assert_eq!(out.text, "Wait for it…");
    }

    #[test]
    fn test_divider_line_untouched() {
        assert!(!punctuation("---").applied);
    }
}
