//! List formatting stages.
//!
//! Normalizes bullet and numbering styles, splits run-on single-line lists,
//! bulletizes runs of short lines after a header, extracts colon-introduced
//! inline lists, and rewrites narrative "First ... Then ... Finally ..."
//! sequences as numbered lists.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::stage::{Applied, Stage};
use crate::text::{
    capitalize_first, is_header_line, is_structural_line, looks_like_sentence, split_sentences,
    word_count,
};

pub fn stages() -> Vec<Stage> {
    vec![
        Stage { label: "Step Headers", run: step_headers },
        Stage { label: "List Style", run: list_style },
        Stage { label: "List Split", run: list_split },
        Stage { label: "Auto-Bullets", run: auto_bullets },
        Stage { label: "Inline Lists", run: inline_lists },
        Stage { label: "Numbered Sequence", run: narrative_sequence },
    ]
}

static STEP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Step|Phase|Stage)\s+(\d+)\s*:\s*(.*)$").unwrap());

/// `Step N:` / `Phase N:` lines become `###` sub-headers.
fn step_headers(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        match STEP_LINE.captures(line) {
            Some(caps) => {
                let rest = caps[3].trim();
                if rest.is_empty() {
                    out.push(format!("### {} {}:", &caps[1], &caps[2]));
                } else {
                    out.push(format!("### {} {}: {}", &caps[1], &caps[2], rest));
                }
            }
            None => out.push(line.to_string()),
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

static UNICODE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[•◦▪‣·*+]\s+").unwrap());
static PAREN_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)(\d+)\)\s+").unwrap());

/// Normalize bullet markers to `- ` and `1)` numbering to `1.`.
fn list_style(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if let Some(caps) = UNICODE_BULLET.captures(line) {
            let indent = caps[1].to_string();
            out.push(format!("{}- {}", indent, &line[caps[0].len()..]));
        } else if let Some(caps) = PAREN_NUMBER.captures(line) {
            out.push(format!("{}{}. {}", &caps[1], &caps[2], &line[caps[0].len()..]));
        } else {
            out.push(line.to_string());
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

/// Longest an average run-on item may be before splitting looks wrong.
const RUNON_MAX_AVG_LEN: usize = 60;

static INLINE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s(\d{1,2})[.)]\s").unwrap());

/// Split run-on single-line lists (`- a - b - c` and `1. a 2. b 3. c`)
/// one item per line.
fn list_split(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if let Some(items) = split_runon_bullets(line) {
            out.extend(items);
        } else if let Some(items) = split_runon_numbered(line) {
            out.extend(items);
        } else {
            out.push(line.to_string());
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

fn split_runon_bullets(line: &str) -> Option<Vec<String>> {
    let rest = line.strip_prefix("- ")?;
    let items: Vec<&str> = rest.split(" - ").map(str::trim).collect();
    if items.len() < 3 || items.iter().any(|i| i.is_empty()) {
        return None;
    }
    let avg = items.iter().map(|i| i.len()).sum::<usize>() / items.len();
    if avg >= RUNON_MAX_AVG_LEN {
        return None;
    }
    Some(items.iter().map(|i| format!("- {}", i)).collect())
}

fn split_runon_numbered(line: &str) -> Option<Vec<String>> {
    if !line.starts_with("1.") && !line.starts_with("1)") {
        return None;
    }
    let starts: Vec<usize> = INLINE_NUMBER.find_iter(line).map(|m| m.start()).collect();
    if starts.len() < 2 {
        return None;
    }
    let mut boundaries = vec![0usize];
    boundaries.extend(&starts);
    let items: Vec<String> = boundaries
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let end = boundaries.get(i + 1).copied().unwrap_or(line.len());
            line[b..end].trim().to_string()
        })
        .collect();
    if items.len() < 3 {
        return None;
    }
    let avg = items.iter().map(|i| i.len()).sum::<usize>() / items.len();
    if avg >= RUNON_MAX_AVG_LEN {
        return None;
    }
    // Normalize `N)` markers while splitting.
    Some(
        items
            .iter()
            .map(|i| match PAREN_NUMBER.captures(i) {
                Some(caps) => format!("{}. {}", &caps[2], &i[caps[0].len()..]),
                None => i.clone(),
            })
            .collect(),
    )
}

/// Maximum words for a line to count as a bulletizable fragment.
const AUTO_BULLET_MAX_WORDS: usize = 15;

/// A run of three or more consecutive short, capitalized, non-sentence
/// lines directly after a header is rewritten as a bullet list.
fn auto_bullets(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        out.push(lines[i].to_string());
        if is_header_line(lines[i]) {
            let mut j = i + 1;
            while j < lines.len() && lines[j].trim().is_empty() {
                out.push(lines[j].to_string());
                j += 1;
            }
            let mut k = j;
            while k < lines.len() && is_bulletizable(lines[k]) {
                k += 1;
            }
            if k - j >= 3 {
                for line in &lines[j..k] {
                    out.push(format!("- {}", line.trim()));
                }
                i = k;
            } else {
                // Blank lines after the header were already emitted.
                i = j;
            }
            continue;
        }
        i += 1;
    }
    Applied::from_rewrite(text, out.join("\n"))
}

fn is_bulletizable(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && word_count(trimmed) <= AUTO_BULLET_MAX_WORDS
        && trimmed.chars().next().map_or(false, |c| c.is_uppercase() || c.is_ascii_digit())
        && !is_structural_line(trimmed)
        && !trimmed.ends_with(['.', '!', '?'])
}

/// Sentence starters that disqualify a phrase from being a list label.
const LABEL_STOPWORDS: &[&str] = &[
    "However", "Although", "Because", "While", "When", "If", "After", "Before", "Since", "Note",
    "Warning", "Tip", "Important", "Example", "Remember", "Caution", "TODO",
];

static INLINE_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z]*(?:\s+[A-Za-z]+){0,2}):\s+(.+)$").unwrap());

/// `Category: a, b, and c` (or semicolon-separated) becomes a bolded label
/// plus a bullet list, gated on the label being short, capitalized and
/// verb-free, and on the items being list-shaped.
fn inline_lists(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        match extract_inline_list(line.trim()) {
            Some(lines) => out.extend(lines),
            None => out.push(line.to_string()),
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

fn extract_inline_list(line: &str) -> Option<Vec<String>> {
    let caps = INLINE_LIST.captures(line)?;
    let label = caps[1].to_string();
    let rest = &caps[2];
    let first_word = label.split_whitespace().next().unwrap_or("");
    if LABEL_STOPWORDS.contains(&first_word) || looks_like_sentence(&label) {
        return None;
    }
    if rest.contains(". ") {
        return None;
    }
    let raw: Vec<&str> =
        if rest.contains(';') { rest.split(';').collect() } else { rest.split(',').collect() };
    if raw.len() < 3 {
        return None;
    }
    let items: Vec<String> = raw
        .iter()
        .map(|i| {
            i.trim()
                .trim_start_matches("and ")
                .trim_start_matches("or ")
                .trim_end_matches('.')
                .trim()
                .to_string()
        })
        .collect();
    if items.iter().any(|i| i.is_empty() || word_count(i) > 5 || looks_like_sentence(i)) {
        return None;
    }
    let mut out = vec![format!("**{}:**", label), String::new()];
    out.extend(items.iter().map(|i| format!("- {}", i)));
    Some(out)
}

static SEQUENCE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(First|Second|Third|Fourth|Fifth|Then|Next|After that|Afterwards|Finally|Lastly)\b[, ]*")
        .unwrap()
});

/// Narrative sequences ("First, ... Then, ... Finally, ...") become a
/// numbered list with the sequence words stripped.
fn narrative_sequence(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    let flush = |run: &mut Vec<&str>, out: &mut Vec<String>| {
        if run.is_empty() {
            return;
        }
        match sequence_to_list(&run.join(" ")) {
            Some(items) => out.extend(items),
            None => out.extend(run.iter().map(|l| (*l).to_string())),
        }
        run.clear();
    };

    for line in &lines {
        if line.trim().is_empty() || is_structural_line(line) {
            flush(&mut run, &mut out);
            out.push((*line).to_string());
        } else {
            run.push(line);
        }
    }
    flush(&mut run, &mut out);
    Applied::from_rewrite(text, out.join("\n"))
}

fn sequence_to_list(paragraph: &str) -> Option<Vec<String>> {
    let sentences = split_sentences(paragraph);
    let markers = sentences.iter().filter(|s| SEQUENCE_MARKER.is_match(s)).count();
    if !(markers >= 3 || (markers >= 2 && sentences.len() <= 4)) {
        return None;
    }
    Some(
        sentences
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let stripped = SEQUENCE_MARKER.replace(s, "");
                format!("{}. {}", i + 1, capitalize_first(stripped.trim()))
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_headers() {
        let out = step_headers("Step 1: Gather ingredients\nStep 2: Mix them");
        assert_eq!(out.text, "### Step 1: Gather ingredients\n### Step 2: Mix them");
    }

    #[test]
    fn test_bullet_normalization() {
        let out = list_style("• one\n* two\n+ three\n2) four");
        assert_eq!(out.text, "- one\n- two\n- three\n2. four");
    }

    #[test]
    fn test_runon_bullet_split() {
        let out = list_split("- apples - oranges - pears");
        assert_eq!(out.text, "- apples\n- oranges\n- pears");
    }

    #[test]
    fn test_runon_split_respects_length_guard() {
        let long = format!("- {} - {} - {}", "x".repeat(70), "y".repeat(70), "z".repeat(70));
        assert!(!list_split(&long).applied);
    }

    #[test]
    fn test_runon_numbered_split() {
        let out = list_split("1. wake up 2. make coffee 3. write code");
        assert_eq!(out.text, "1. wake up\n2. make coffee\n3. write code");
    }

    #[test]
    fn test_auto_bullets_after_header() {
        let text = "## Features\nFast startup\nSmall binary\nNo dependencies";
        let out = auto_bullets(text);
        assert_eq!(out.text, "## Features\n- Fast startup\n- Small binary\n- No dependencies");
    }

    #[test]
    fn test_auto_bullets_needs_three_lines() {
        let text = "## Features\nFast startup\nSmall binary";
        assert!(!auto_bullets(text).applied);
    }

    #[test]
    fn test_inline_list_extraction() {
        let out = inline_lists("Languages: Python, Go, and Rust");
        assert_eq!(out.text, "**Languages:**\n\n- Python\n- Go\n- Rust");
    }

    #[test]
    fn test_inline_list_rejects_sentence_labels() {
        assert!(!inline_lists("Because: a, b, and c").applied);
        assert!(!inline_lists("This is: a, b, and c").applied);
    }

    #[test]
    fn test_inline_list_rejects_prose_commas() {
        let line = "Summary: we tried hard, we failed anyway, and we learned several things today";
        assert!(!inline_lists(line).applied);
    }

    #[test]
    fn test_narrative_sequence() {
        let p = "First, open the box. Then, remove the parts. Finally, assemble everything.";
        let out = narrative_sequence(p);
        assert_eq!(out.text, "1. Open the box.\n2. Remove the parts.\n3. Assemble everything.");
    }

    #[test]
    fn test_narrative_sequence_needs_markers() {
        let p = "Open the box. Remove the parts. Assemble everything carefully now.";
        assert!(!narrative_sequence(p).applied);
    }
}
