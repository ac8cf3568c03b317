//! Early-exit detectors.
//!
//! Cheap whole-document classifiers that short-circuit the full pipeline
//! when the input is clearly already a known, non-prose format. They run in
//! a fixed order against the whitespace-normalized document; the first hit
//! wins and its result bypasses segmentation and every later stage.
//!
//! Order matters: JSON is checked before source-code density so that brace
//! heavy objects are not misclassified as source.

use once_cell::sync::Lazy;
use regex::Regex;

/// Result of a matched detector: the final text plus its format label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub formatted: String,
    pub label: &'static str,
}

/// Run all detectors in order; `None` means the full pipeline should run.
pub fn early_exit(text: &str) -> Option<Detection> {
    detect_json(text)
        .or_else(|| detect_front_matter(text))
        .or_else(|| detect_source_code(text))
        .or_else(|| detect_delimited_table(text))
}

/// Whole-document JSON object or array: pretty-print inside a json fence.
fn detect_json(text: &str) -> Option<Detection> {
    let trimmed = text.trim();
    let balanced = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !balanced {
        return None;
    }
    // A parse failure is a decline, not an error.
    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    if !(value.is_object() || value.is_array()) {
        return None;
    }
    let pretty = serde_json::to_string_pretty(&value).ok()?;
    log::debug!("early exit: JSON document ({} bytes)", trimmed.len());
    Some(Detection { formatted: format!("```json\n{}\n```", pretty), label: "JSON Prettify" })
}

/// A document that is one leading `---` front-matter block of `key: value`
/// lines (and nothing else of substance) is left as-is.
fn detect_front_matter(text: &str) -> Option<Detection> {
    static KEY_LINE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+\s*:").unwrap());

    let lines: Vec<&str> = text.lines().collect();
    if lines.first().map(|l| l.trim()) != Some("---") {
        return None;
    }
    let close = lines.iter().skip(1).position(|l| l.trim() == "---")? + 1;
    let body = &lines[1..close];
    if body.is_empty() || !lines[close + 1..].iter().all(|l| l.trim().is_empty()) {
        return None;
    }
    let shaped = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .all(|l| KEY_LINE.is_match(l) || l.starts_with(' ') || l.trim_start().starts_with('-'));
    if !shaped {
        return None;
    }
    // Validate that the block is actually parseable YAML mapping data.
    let parsed: serde_yaml::Value = serde_yaml::from_str(&body.join("\n")).ok()?;
    if !parsed.is_mapping() {
        return None;
    }
    log::debug!("early exit: YAML front matter ({} keys)", body.len());
    Some(Detection { formatted: text.trim_end().to_string(), label: "YAML Front Matter" })
}

/// Source-code density: when more than half of the non-empty lines look like
/// code, the whole document is wrapped in a fence instead of being formatted.
fn detect_source_code(text: &str) -> Option<Detection> {
    static CODE_LINE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r#"(?x)
            ^\s*(fn|def|class|import|from|const|let|var|return|if|elif|else|for|while|pub|use|
                 function|public|private|static|void|int|package|struct|impl|match|try|except|
                 catch|finally)\b
            | [;{}]\s*$
            | ^\s*[}{)\]]\s*$
            | ^\s*(//|\#include|/\*|\*|--\s)
            | =>
            | ::
            | [\w)\]]\s*=\s*[\w"'\[({]
            "#,
        )
        .unwrap()
    });

    if text.contains("```") {
        return None;
    }
    let non_empty: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if non_empty.len() < 3 {
        return None;
    }
    let code_like = non_empty.iter().filter(|l| CODE_LINE.is_match(l)).count();
    if code_like * 2 <= non_empty.len() {
        return None;
    }
    log::debug!("early exit: source code ({}/{} code-like lines)", code_like, non_empty.len());
    Some(Detection {
        formatted: format!("```\n{}\n```", text.trim_end()),
        label: "Auto-Code Block",
    })
}

/// Tab- or pipe-delimited rows with a consistent column count become a
/// Markdown table. Declines when the input is already a Markdown table.
fn detect_delimited_table(text: &str) -> Option<Detection> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 || lines.len() != text.trim().lines().count() {
        return None;
    }
    if lines.iter().any(|l| l.trim_start().starts_with('|')) {
        return None;
    }
    let delimiter = if lines.iter().all(|l| l.contains('\t')) {
        '\t'
    } else if lines.iter().all(|l| l.contains('|')) {
        '|'
    } else {
        return None;
    };
    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|l| l.split(delimiter).map(|c| c.trim().to_string()).collect())
        .collect();
    let columns = rows[0].len();
    if columns < 2 || !rows.iter().all(|r| r.len() == columns) {
        return None;
    }

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(format!("| {} |", rows[0].join(" | ")));
    out.push(format!("|{}|", vec![" --- "; columns].join("|")));
    for row in &rows[1..] {
        out.push(format!("| {} |", row.join(" | ")));
    }
    log::debug!("early exit: delimited table ({} rows x {} cols)", rows.len(), columns);
    Some(Detection { formatted: out.join("\n"), label: "Table Auto-Format" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_prettify() {
        let d = detect_json(r#"{"a":1,"b":2}"#).unwrap();
        assert_eq!(d.label, "JSON Prettify");
        assert_eq!(d.formatted, "```json\n{\n  \"a\": 1,\n  \"b\": 2\n}\n```");
    }

    #[test]
    fn test_json_declines_malformed() {
        assert!(detect_json(r#"{"a":1,"#).is_none());
        assert!(detect_json("not json at all").is_none());
    }

    #[test]
    fn test_json_checked_before_code() {
        // A JSON object must not fall through to source-code detection.
        let d = early_exit("{\n  \"key\": \"value\",\n  \"n\": 2\n}").unwrap();
        assert_eq!(d.label, "JSON Prettify");
    }

    #[test]
    fn test_front_matter() {
        let text = "---\ntitle: My Note\ntags:\n  - rust\n---\n";
        let d = detect_front_matter(text).unwrap();
        assert_eq!(d.label, "YAML Front Matter");
    }

    #[test]
    fn test_front_matter_declines_divider_only() {
        assert!(detect_front_matter("---\n").is_none());
        assert!(detect_front_matter("---\nJust prose here\n---\n").is_none());
    }

    #[test]
    fn test_source_code_density() {
        let code = "def main():\n    x = 1\n    return x\nprint(main())";
        let d = detect_source_code(code).unwrap();
        assert_eq!(d.label, "Auto-Code Block");
        assert!(d.formatted.starts_with("```\n"));
    }

    #[test]
    fn test_source_code_declines_prose() {
        let prose = "This is a note about dogs.\nDogs are great.\nEveryone likes dogs.";
        assert!(detect_source_code(prose).is_none());
    }

    #[test]
    fn test_tab_table() {
        let d = detect_delimited_table("Name\tAge\nAlice\t30\nBob\t25").unwrap();
        assert_eq!(d.label, "Table Auto-Format");
        assert!(d.formatted.contains("| Name | Age |"));
        assert!(d.formatted.contains("| --- | --- |"));
    }

    #[test]
    fn test_table_declines_inconsistent_columns() {
        assert!(detect_delimited_table("a\tb\nc\td\te").is_none());
    }

    #[test]
    fn test_table_declines_existing_markdown() {
        assert!(detect_delimited_table("| a | b |\n| c | d |").is_none());
    }
}
