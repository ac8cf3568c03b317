//! Structural detection stages.
//!
//! These run first: they recognize section boundaries that the author left
//! as plain text (chat transcripts, XML-ish tags, ALL-CAPS banners, colon
//! terminated labels, short standalone titles) and rewrite them as Markdown
//! headers before any other stage sees the document.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::stage::{Applied, Stage};
use crate::text::{
    is_structural_line, looks_like_sentence, starts_with_greeting, title_case, word_count,
};

pub fn stages() -> Vec<Stage> {
    vec![
        Stage { label: "Chat Transcript", run: chat_transcript },
        Stage { label: "Section Tags", run: section_tags },
        Stage { label: "Caps Headers", run: caps_headers },
        Stage { label: "Keyword Headers", run: keyword_headers },
        Stage { label: "Colon Headers", run: colon_headers },
        Stage { label: "Standalone Headers", run: standalone_headers },
    ]
}

static ROLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(System|User|Assistant|Human|AI|Model)\s*:\s*(.*)$").unwrap());

/// Chat-transcript role markers become `## Role` headers, but only when at
/// least two distinct marker lines are present; a lone "User:" is more
/// likely an ordinary label.
fn chat_transcript(text: &str) -> Applied {
    let marker_lines = text.lines().filter(|l| ROLE_MARKER.is_match(l)).count();
    if marker_lines < 2 {
        return Applied::unchanged(text);
    }
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        match ROLE_MARKER.captures(line) {
            Some(caps) => {
                let role = &caps[1];
                let rest = caps[2].trim();
                if rest.is_empty() {
                    out.push(format!("## {}", role));
                } else {
                    out.push(format!("## {}", role));
                    out.push(String::new());
                    out.push(rest.to_string());
                }
            }
            None => out.push(line.to_string()),
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

static SECTION_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<(/?)(instructions|context|task|examples?|input|output|constraints|system|rules|steps)>\s*$",
    )
    .unwrap()
});

/// Known XML-style section tags: the opening tag becomes a header, the
/// closing tag becomes a divider.
fn section_tags(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        match SECTION_TAG.captures(line.trim()) {
            Some(caps) => {
                if &caps[1] == "/" {
                    out.push("---".to_string());
                } else {
                    out.push(format!("## {}", title_case(&caps[2])));
                }
            }
            None => out.push(line.to_string()),
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

const CAPS_VOCABULARY: &[&str] = &[
    "INSTRUCTIONS", "CONTEXT", "EXAMPLES", "EXAMPLE", "OUTPUT", "OUTPUT FORMAT", "CONSTRAINTS",
    "REQUIREMENTS", "TASK", "TASKS", "ROLE", "NOTES", "BACKGROUND", "STEPS", "GOALS", "GOAL",
    "RULES", "OVERVIEW", "SUMMARY", "DEFINITIONS", "AUDIENCE", "TONE", "INPUT", "WORKFLOW",
];

static CAPS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z &/]*:?$").unwrap());

/// ALL-CAPS section names from a fixed vocabulary become title-cased
/// headers. Already-correct output never matches since it carries lowercase.
fn caps_headers(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        let trimmed = line.trim();
        if CAPS_LINE.is_match(trimmed) {
            let name = trimmed.trim_end_matches(':');
            if CAPS_VOCABULARY.contains(&name) {
                out.push(format!("## {}", title_case(name)));
                continue;
            }
        }
        out.push(line.to_string());
    }
    Applied::from_rewrite(text, out.join("\n"))
}

/// Keyword labels mapped to their canonical header.
const KEYWORD_HEADERS: &[(&str, &str)] = &[
    ("background", "Context"),
    ("context", "Context"),
    ("objective", "Task"),
    ("goal", "Task"),
    ("goals", "Task"),
    ("purpose", "Task"),
    ("requirements", "Constraints"),
    ("deliverables", "Output Format"),
    ("output", "Output Format"),
    ("instructions", "Instructions"),
    ("examples", "Examples"),
    ("steps", "Steps"),
    ("summary", "Summary"),
    ("overview", "Overview"),
];

static KEYWORD_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z]+)\s*:\s*$").unwrap());

/// Promote lines like `background:` to their canonical `## Context` header.
fn keyword_headers(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if let Some(caps) = KEYWORD_LINE.captures(line.trim()) {
            let keyword = caps[1].to_lowercase();
            if let Some((_, header)) =
                KEYWORD_HEADERS.iter().find(|(k, _)| *k == keyword.as_str())
            {
                out.push(format!("## {}", header));
                continue;
            }
        }
        out.push(line.to_string());
    }
    Applied::from_rewrite(text, out.join("\n"))
}

/// Phrases that introduce a remark rather than a section.
const NON_HEADER_TERMS: &[&str] = &[
    "Note", "Warning", "Tip", "Important", "Caution", "Hint", "Remember", "Example", "TODO",
    "Answer", "Question", "PS",
];

static COLON_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z']*(?:\s+[A-Za-z'][A-Za-z']*){0,3}):$").unwrap());

/// Generic `Word Word:` lines become headers, unless the phrase is a known
/// remark introducer or reads like a sentence fragment (two "and"s).
fn colon_headers(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if let Some(caps) = COLON_HEADER.captures(line.trim()) {
            let phrase = &caps[1];
            let and_count = phrase.split_whitespace().filter(|w| *w == "and").count();
            if !NON_HEADER_TERMS.contains(&phrase) && and_count < 2 {
                out.push(format!("## {}", phrase));
                continue;
            }
        }
        out.push(line.to_string());
    }
    Applied::from_rewrite(text, out.join("\n"))
}

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[.,!?;:"()\[\]]"#).unwrap());

/// A short, capitalized, punctuation-free standalone line immediately
/// preceding a substantial paragraph is promoted to a header. Guarded
/// against greetings and sentence-shaped phrases so conversational openers
/// like "Hi there" stay untouched.
fn standalone_headers(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let promotable = {
            let words = word_count(trimmed);
            (2..=5).contains(&words)
                && trimmed.chars().next().map_or(false, |c| c.is_uppercase())
                && !PUNCTUATION.is_match(trimmed)
                && !is_structural_line(trimmed)
                && !starts_with_greeting(trimmed)
                && !looks_like_sentence(trimmed)
                && (i == 0 || lines[i - 1].trim().is_empty())
                && follows_substantial_paragraph(&lines, i)
        };
        if promotable {
            out.push(format!("## {}", trimmed));
        } else {
            out.push((*line).to_string());
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

/// Whether a prose paragraph of at least 20 words starts right after line
/// `i` (optionally separated by a single blank line).
fn follows_substantial_paragraph(lines: &[&str], i: usize) -> bool {
    let mut start = i + 1;
    if start < lines.len() && lines[start].trim().is_empty() {
        start += 1;
    }
    let mut words = 0;
    for line in lines.iter().skip(start) {
        if line.trim().is_empty() {
            break;
        }
        if is_structural_line(line) {
            return false;
        }
        words += word_count(line);
    }
    words >= 20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_transcript_needs_two_markers() {
        let one = "User: hello there";
        assert!(!chat_transcript(one).applied);

        let two = "System: be nice\nUser: hello";
        let out = chat_transcript(two);
        assert!(out.applied);
        assert!(out.text.contains("## System"));
        assert!(out.text.contains("## User"));
        assert!(out.text.contains("be nice"));
    }

    #[test]
    fn test_section_tags() {
        let out = section_tags("<instructions>\nDo the thing.\n</instructions>");
        assert_eq!(out.text, "## Instructions\nDo the thing.\n---");
    }

    #[test]
    fn test_caps_headers_vocabulary_only() {
        let out = caps_headers("OUTPUT FORMAT:\ntext");
        assert_eq!(out.text, "## Output Format\ntext");
        assert!(!caps_headers("SHOUTING AT CLOUDS").applied);
    }

    #[test]
    fn test_keyword_headers() {
        let out = keyword_headers("background:\nWe sell hats.");
        assert_eq!(out.text, "## Context\nWe sell hats.");
        assert!(!keyword_headers("unknownword:\nx").applied);
    }

    #[test]
    fn test_colon_headers_guards() {
        assert_eq!(colon_headers("Project Setup:").text, "## Project Setup");
        assert!(!colon_headers("Note:").applied);
        assert!(!colon_headers("Cats and Dogs and Fish:").applied);
    }

    #[test]
    fn test_standalone_header_promotion() {
        let para = "This paragraph talks about many things at considerable length, \
                    going on for well over twenty words so the heuristic can fire properly.";
        let text = format!("Project Overview\n\n{}", para);
        let out = standalone_headers(&text);
        assert!(out.text.starts_with("## Project Overview"));
    }

    #[test]
    fn test_standalone_header_rejects_conversational() {
        let para = "This paragraph talks about many things at considerable length, \
                    going on for well over twenty words so the heuristic could fire.";
        for opener in ["Hi there everyone", "We should talk soon"] {
            let text = format!("{}\n\n{}", opener, para);
            assert!(!standalone_headers(&text).applied, "promoted: {}", opener);
        }
    }
}
