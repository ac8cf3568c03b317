//! Shared line and word predicates used across the stage pipeline.
//!
//! Every heuristic guard lives here as a named function so the stage bodies
//! stay auditable and each guard can be tested on its own. All predicates
//! operate on a single line or phrase; none of them allocate unless they
//! need to return a new string.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+]\s").unwrap());
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s").unwrap());
static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*```").unwrap());

/// Minor words kept lowercase in title case unless they open the phrase.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "nor", "of", "on", "or", "per", "the",
    "to", "up", "via", "with",
];

const GREETINGS: &[&str] = &[
    "hello", "hi", "hey", "dear", "thanks", "thank", "greetings", "howdy", "welcome",
];

/// Abbreviations that end with a period but do not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "mr", "mrs", "ms", "dr", "st", "no", "approx", "dept", "fig",
];

pub fn is_header_line(line: &str) -> bool {
    HEADER_RE.is_match(line)
}

pub fn is_bullet_line(line: &str) -> bool {
    BULLET_RE.is_match(line)
}

pub fn is_numbered_line(line: &str) -> bool {
    NUMBERED_RE.is_match(line)
}

pub fn is_blockquote_line(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

pub fn is_fence_line(line: &str) -> bool {
    FENCE_RE.is_match(line)
}

pub fn is_table_row(line: &str) -> bool {
    let t = line.trim();
    t.starts_with('|') && t.ends_with('|')
}

/// A structural line is anything the prose-only transforms must not touch.
pub fn is_structural_line(line: &str) -> bool {
    is_header_line(line)
        || is_bullet_line(line)
        || is_numbered_line(line)
        || is_blockquote_line(line)
        || is_fence_line(line)
        || is_table_row(line)
        || line.trim() == "---"
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

pub fn starts_with_greeting(s: &str) -> bool {
    match s.split_whitespace().next() {
        Some(first) => {
            let w = first.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            GREETINGS.contains(&w.as_str())
        }
        None => false,
    }
}

/// Whether the phrase reads like a sentence fragment rather than a heading:
/// it starts with a pronoun or carries a common linking/auxiliary verb.
pub fn looks_like_sentence(s: &str) -> bool {
    static PRONOUN_START: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)^(i|we|you|he|she|it|they|my|our|your|this|that|these|those)\b").unwrap()
    });
    static VERB: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)\b(is|are|was|were|be|been|am|have|has|had|do|does|did|can|could|will|would|should|must|need|want|make|makes|use|uses|get|gets)\b",
        )
        .unwrap()
    });
    PRONOUN_START.is_match(s) || VERB.is_match(s)
}

pub fn ends_with_sentence_punctuation(s: &str) -> bool {
    matches!(s.trim_end().chars().last(), Some('.' | '!' | '?' | ',' | ';' | ':'))
}

/// Uppercase the first alphabetic character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut done = false;
    s.chars()
        .map(|c| {
            if !done && c.is_alphabetic() {
                done = true;
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// Full title case: every word is recased, minor words stay lowercase unless
/// they open or close the phrase. Used where the source casing is noise
/// (ALL-CAPS section names, synthesized titles).
pub fn title_case(s: &str) -> String {
    let words: Vec<&str> = s.split_whitespace().collect();
    let last = words.len().saturating_sub(1);
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let lower = w.to_lowercase();
            if i != 0 && i != last && MINOR_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize_first(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Gentle title case for existing headers: words that already carry capitals
/// beyond the first letter (acronyms, identifiers) are left untouched.
pub fn title_case_soft(s: &str) -> String {
    let words: Vec<&str> = s.split_whitespace().collect();
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let has_inner_caps = w.chars().skip(1).any(|c| c.is_uppercase());
            if has_inner_caps || !w.chars().next().map_or(false, |c| c.is_alphabetic()) {
                (*w).to_string()
            } else {
                let lower = w.to_lowercase();
                if i != 0 && MINOR_WORDS.contains(&lower.as_str()) {
                    lower
                } else {
                    capitalize_first(w)
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split prose into sentences. Breaks after `.`, `!` or `?` when followed by
/// whitespace and an uppercase letter, digit or quote, skipping common
/// abbreviations and decimal numbers.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let next_ws = chars.get(i + 1).map_or(true, |n| n.is_whitespace());
            let upper_follows = chars
                .iter()
                .skip(i + 1)
                .find(|n| !n.is_whitespace())
                .map_or(true, |n| n.is_uppercase() || n.is_ascii_digit() || *n == '"' || *n == '\'');
            if next_ws && upper_follows && !ends_with_abbreviation(&current) {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    sentences.push(trimmed);
                }
                current.clear();
            }
        }
        i += 1;
    }
    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
    sentences
}

/// Apply `f` only to the parts of a line outside existing backtick spans.
/// Lines with unbalanced backticks are returned untouched.
pub fn map_outside_code_spans(line: &str, f: impl Fn(&str) -> String) -> String {
    if !line.contains('`') {
        return f(line);
    }
    let parts: Vec<&str> = line.split('`').collect();
    if parts.len() % 2 == 0 {
        return line.to_string();
    }
    parts
        .iter()
        .enumerate()
        .map(|(i, p)| if i % 2 == 0 { f(p) } else { (*p).to_string() })
        .collect::<Vec<_>>()
        .join("`")
}

fn ends_with_abbreviation(current: &str) -> bool {
    let before = current.trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'));
    let last_word = before.rsplit(|c: char| c.is_whitespace()).next().unwrap_or("");
    let normalized = last_word.trim_start_matches('(').to_lowercase();
    // Single letters ("a."), initials and decimals never end a sentence.
    if normalized.len() <= 1 || normalized.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return true;
    }
    ABBREVIATIONS.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_predicates() {
        assert!(is_header_line("## Context"));
        assert!(!is_header_line("#hashtag"));
        assert!(is_bullet_line("- item"));
        assert!(is_bullet_line("  * item"));
        assert!(is_numbered_line("1. item"));
        assert!(is_numbered_line("2) item"));
        assert!(is_blockquote_line("> quoted"));
        assert!(is_fence_line("```rust"));
        assert!(is_fence_line("   ```"));
        assert!(is_table_row("| a | b |"));
    }

    #[test]
    fn test_title_case_minor_words() {
        assert_eq!(title_case("the rise of the machines"), "The Rise of the Machines");
        assert_eq!(title_case("OUTPUT FORMAT"), "Output Format");
    }

    #[test]
    fn test_title_case_soft_preserves_acronyms() {
        assert_eq!(title_case_soft("working with JSON and APIs"), "Working with JSON and APIs");
    }

    #[test]
    fn test_split_sentences_basic() {
        let s = split_sentences("First sentence. Second one! Third?");
        assert_eq!(s, vec!["First sentence.", "Second one!", "Third?"]);
    }

    #[test]
    fn test_split_sentences_abbreviations() {
        let s = split_sentences("Use tools e.g. hammers. Then stop.");
        assert_eq!(s.len(), 2);
        assert!(s[0].contains("e.g. hammers"));
    }

    #[test]
    fn test_looks_like_sentence() {
        assert!(looks_like_sentence("This is a test"));
        assert!(looks_like_sentence("We should go"));
        assert!(!looks_like_sentence("Project Overview"));
    }

    #[test]
    fn test_starts_with_greeting() {
        assert!(starts_with_greeting("Hello there, world"));
        assert!(!starts_with_greeting("Project Goals"));
    }
}
