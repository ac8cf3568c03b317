//! Semantic formatting stages.
//!
//! Recognizes meaning-bearing shapes: role declarations become blockquoted
//! ROLE callouts, negative constraints get their lead verb bolded,
//! bracketed placeholders become `{{..}}` variables, known callout prefixes
//! become blockquotes, `Key: value` lines are bolded, bare URLs are linked,
//! dividers and blockquotes get tidy spacing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::stage::{Applied, Stage};
use crate::text::{capitalize_first, is_header_line, is_structural_line, split_sentences, word_count};

pub fn stages() -> Vec<Stage> {
    vec![
        Stage { label: "Role Quote", run: role_quote },
        Stage { label: "Constraint Emphasis", run: constraint_emphasis },
        Stage { label: "Placeholders", run: placeholders },
        Stage { label: "Callouts", run: callouts },
        Stage { label: "Key Values", run: key_values },
        Stage { label: "Links", run: bare_links },
        Stage { label: "Dividers", run: dividers },
    ]
}

static ROLE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(you are (a|an|the)\b|act as\b)").unwrap());

/// A role-declaration line becomes `> **ROLE:** ...`; trailing sentences on
/// the same line move to their own paragraph below the quote.
fn role_quote(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if is_structural_line(line) || !ROLE_DECLARATION.is_match(line.trim()) {
            out.push(line.to_string());
            continue;
        }
        let sentences = split_sentences(line.trim());
        match sentences.split_first() {
            Some((role, rest)) => {
                out.push(format!("> **ROLE:** {}", capitalize_first(role)));
                if !rest.is_empty() {
                    out.push(String::new());
                    out.push(rest.join(" "));
                }
            }
            None => out.push(line.to_string()),
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

static NEGATIVE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)- (Do not|Don't|Never|Avoid|Must not)\b(.*)$").unwrap());

/// Bulleted negative constraints get their lead verb bolded.
fn constraint_emphasis(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| match NEGATIVE_BULLET.captures(line) {
            Some(caps) => format!("{}- **{}**{}", &caps[1], &caps[2], &caps[3]),
            None => line.to_string(),
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Za-z][A-Za-z0-9 _-]{0,30})\]").unwrap());

/// `[Name]` placeholders become `{{Name}}` template variables. Checkboxes,
/// footnotes, image alt text, Markdown links and header-line brackets are
/// all excluded.
fn placeholders(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            if is_header_line(line) {
                return line.to_string();
            }
            let bytes = line.as_bytes();
            BRACKETED
                .replace_all(line, |caps: &Captures<'_>| {
                    let whole = caps.get(0).expect("group 0 always present");
                    let inner = &caps[1];
                    let prev = whole.start().checked_sub(1).map(|i| bytes[i] as char);
                    let next = bytes.get(whole.end()).map(|b| *b as char);
                    let checkbox = inner.len() == 1 && inner.eq_ignore_ascii_case("x");
                    let excluded = checkbox
                        || prev == Some('!')
                        || prev == Some('[')
                        || prev == Some('^')
                        || next == Some('(')
                        || next == Some(']');
                    if excluded {
                        whole.as_str().to_string()
                    } else {
                        format!("{{{{{}}}}}", inner)
                    }
                })
                .into_owned()
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

static CALLOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Note|Warning|Tip|Important|Caution|TODO|FIXME|Reminder)\s*:\s+(.+)$").unwrap()
});

/// Known callout prefixes become blockquoted bold-label callouts.
fn callouts(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| match CALLOUT.captures(line.trim()) {
            Some(caps) => format!("> **{}:** {}", &caps[1], &caps[2]),
            None => line.to_string(),
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

/// Keys that introduce something other than a key-value fact.
const KEY_STOPWORDS: &[&str] = &[
    "However", "Although", "Because", "While", "When", "If", "After", "Before", "Since", "Note",
    "Warning", "Tip", "Important", "Example", "Remember", "Caution", "TODO", "FIXME", "Reminder",
];

static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z]*(?:\s[A-Za-z]+)?):\s+(.+)$").unwrap());

/// `Key: value` lines (key at most two words, single-sentence value)
/// are rewritten with a bolded key.
fn key_values(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            if is_structural_line(line) {
                return line.to_string();
            }
            match KEY_VALUE.captures(line) {
                Some(caps) => {
                    let key = &caps[1];
                    let value = &caps[2];
                    let first_word = key.split_whitespace().next().unwrap_or("");
                    if KEY_STOPWORDS.contains(&first_word)
                        || value.contains(". ")
                        || word_count(value) > 20
                    {
                        line.to_string()
                    } else {
                        format!("**{}:** {}", key, value)
                    }
                }
                None => line.to_string(),
            }
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<>()\[\]]+").unwrap());

/// Bare URLs become autolinks unless already inside Markdown link syntax.
fn bare_links(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            let bytes = line.as_bytes();
            BARE_URL
                .replace_all(line, |caps: &Captures<'_>| {
                    let whole = caps.get(0).expect("group 0 always present");
                    let prev = whole.start().checked_sub(1).map(|i| bytes[i] as char);
                    if matches!(prev, Some('<' | '(' | '"')) {
                        whole.as_str().to_string()
                    } else {
                        // Trailing sentence punctuation stays outside the link.
                        let url = whole.as_str().trim_end_matches(['.', ',', ';', '!', '?']);
                        let tail = &whole.as_str()[url.len()..];
                        format!("<{}>{}", url, tail)
                    }
                })
                .into_owned()
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

static DASH_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-{3,}\s*$").unwrap());
static QUOTE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s*(\S)").unwrap());

/// Dash-only lines normalize to `---`; blockquote markers get exactly one
/// space after `>`.
fn dividers(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            if DASH_LINE.is_match(line) {
                "---".to_string()
            } else if line.starts_with('>') {
                QUOTE_SPACING.replace(line, |caps: &Captures<'_>| format!("> {}", &caps[1])).into_owned()
            } else {
                line.to_string()
            }
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}
