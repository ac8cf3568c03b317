//! Inline formatting stages.
//!
//! Line-scoped transforms that never touch header, blockquote or fence
//! lines. Technical tokens (paths, env vars, identifier casings, CLI flags,
//! acronyms) are wrapped in inline code; ALL-CAPS phrases are bolded and
//! title-cased; `Term - definition` lines and technical quoted spans get
//! emphasis. Existing code spans on a line are never rewritten: each line is
//! processed only between its backticks.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::stage::{Applied, Stage};
use crate::text::{
    is_blockquote_line, is_bullet_line, is_fence_line, is_header_line, is_numbered_line,
    is_table_row, map_outside_code_spans, title_case, word_count,
};

pub fn stages() -> Vec<Stage> {
    vec![
        Stage { label: "Bold Phrases", run: bold_caps_phrases },
        Stage { label: "Inline Code", run: wrap_inline_code },
        Stage { label: "Term Definitions", run: term_definitions },
        Stage { label: "Quoted Terms", run: quoted_terms },
    ]
}

fn skip_line(line: &str) -> bool {
    is_header_line(line) || is_blockquote_line(line) || is_fence_line(line) || is_table_row(line)
}

fn per_line(text: &str, skip: fn(&str) -> bool, f: impl Fn(&str) -> String) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| if skip(line) { line.to_string() } else { map_outside_code_spans(line, &f) })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}|\$[A-Z_]{2,}\b").unwrap());
static FILE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\s)((?:~|\.{1,2})?/[A-Za-z0-9_.-]+(?:/[A-Za-z0-9_.-]+)+/?)").unwrap()
});
static CLI_FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|\s)(--[a-z][a-z0-9-]+)\b").unwrap());
static SNAKE_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z][a-z0-9]*(?:_[a-z0-9]+)+\b").unwrap());
static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z]+(?:[A-Z][a-z0-9]+)+\b").unwrap());
static PASCAL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[A-Z][a-z0-9]+){2,}\b").unwrap());

/// Branded names that merely look like identifiers; wrapping them in code
/// would read as a mistake.
const CASING_STOPWORDS: &[&str] = &[
    "JavaScript", "TypeScript", "GitHub", "GitLab", "YouTube", "LinkedIn", "WordPress",
    "PowerPoint", "OpenAI", "ChatGPT", "MacBook", "WhatsApp", "PayPal", "DevOps", "iPhone",
    "iPad", "eBay", "macOS",
];

const ACRONYMS: &[&str] = &[
    "API", "JSON", "XML", "YAML", "HTML", "CSS", "SQL", "HTTP", "HTTPS", "URL", "URI", "REST",
    "CRUD", "JWT", "CLI", "GUI", "IDE", "SDK", "CSV", "PDF", "CPU", "GPU", "RAM", "DNS", "TCP",
    "UDP", "SSH", "TLS", "SSL", "FTP", "SMTP", "UUID", "ORM", "CDN", "DOM", "CORS",
];

static ACRONYM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b({})\b", ACRONYMS.join("|"))).unwrap()
});

fn wrap_inline_code(text: &str) -> Applied {
    per_line(text, skip_line, wrap_tokens)
}

/// Claim candidate ranges from every pattern in priority order, reject any
/// that overlap an earlier claim, then wrap all claims in one pass. The
/// input part is backtick-free by construction, so no claim can land inside
/// an existing code span.
fn wrap_tokens(part: &str) -> String {
    let mut claims: Vec<(usize, usize)> = Vec::new();
    let mut claim = |claims: &mut Vec<(usize, usize)>, start: usize, end: usize| {
        if !claims.iter().any(|&(s, e)| start < e && s < end) {
            claims.push((start, end));
        }
    };

    for m in ENV_VAR.find_iter(part) {
        claim(&mut claims, m.start(), m.end());
    }
    for caps in FILE_PATH.captures_iter(part) {
        if let Some(g) = caps.get(2) {
            claim(&mut claims, g.start(), g.end());
        }
    }
    for caps in CLI_FLAG.captures_iter(part) {
        if let Some(g) = caps.get(2) {
            claim(&mut claims, g.start(), g.end());
        }
    }
    for m in SNAKE_CASE.find_iter(part) {
        claim(&mut claims, m.start(), m.end());
    }
    for re in [&CAMEL_CASE, &PASCAL_CASE] {
        for m in re.find_iter(part) {
            if !CASING_STOPWORDS.contains(&m.as_str()) {
                claim(&mut claims, m.start(), m.end());
            }
        }
    }
    for m in ACRONYM.find_iter(part) {
        claim(&mut claims, m.start(), m.end());
    }

    if claims.is_empty() {
        return part.to_string();
    }
    claims.sort_unstable();
    let mut out = String::with_capacity(part.len() + claims.len() * 2);
    let mut cursor = 0;
    for (start, end) in claims {
        out.push_str(&part[cursor..start]);
        out.push('`');
        out.push_str(&part[start..end]);
        out.push('`');
        cursor = end;
    }
    out.push_str(&part[cursor..]);
    out
}

static CAPS_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9]+(?:\s+[A-Z][A-Z0-9]+)+\b").unwrap());

/// Multi-word ALL-CAPS phrases outside headers and lists are bolded and
/// title-cased; a phrase made entirely of known acronyms is left for the
/// code wrapper instead. Single caps tokens are never touched.
fn bold_caps_phrases(text: &str) -> Applied {
    per_line(
        text,
        |l| skip_line(l) || is_bullet_line(l) || is_numbered_line(l),
        |part| {
            CAPS_PHRASE
                .replace_all(part, |caps: &Captures<'_>| {
                    let phrase = &caps[0];
                    let all_acronyms =
                        phrase.split_whitespace().all(|w| ACRONYMS.contains(&w));
                    if all_acronyms {
                        phrase.to_string()
                    } else {
                        format!("**{}**", title_case(phrase))
                    }
                })
                .into_owned()
        },
    )
}

static TERM_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z0-9' ]{0,40}?)\s+-\s+(.+)$").unwrap());

/// `Term - definition` lines (term up to three words) become
/// `**Term** — definition`.
fn term_definitions(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            if skip_line(line) || is_bullet_line(line) {
                return line.to_string();
            }
            match TERM_DEF.captures(line) {
                Some(caps) if word_count(&caps[1]) <= 3 => {
                    format!("**{}** — {}", caps[1].trim(), &caps[2])
                }
                _ => line.to_string(),
            }
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"\n]{1,60})""#).unwrap());

const CONVERSATIONAL: &[&str] =
    &["yes", "no", "ok", "okay", "sure", "hello", "hi", "thanks", "maybe", "please", "why", "how"];

/// Quoted spans of 1-4 words that look technical (underscores, internal
/// caps, or every word capitalized) are bolded; conversational quotes and
/// full sentences keep their quotation marks.
fn quoted_terms(text: &str) -> Applied {
    per_line(text, skip_line, |part| {
        QUOTED
            .replace_all(part, |caps: &Captures<'_>| {
                let inner = &caps[1];
                if is_technical_quote(inner) {
                    format!("**{}**", inner)
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    })
}

fn is_technical_quote(inner: &str) -> bool {
    let words = word_count(inner);
    if !(1..=4).contains(&words) || inner.contains('`') {
        return false;
    }
    if inner.ends_with(['.', '!', '?']) || CONVERSATIONAL.contains(&inner.to_lowercase().as_str()) {
        return false;
    }
    let technical_token = inner.contains('_')
        || inner.split_whitespace().any(|w| w.chars().skip(1).any(|c| c.is_uppercase()));
    let all_capitalized = inner
        .split_whitespace()
        .all(|w| w.chars().next().map_or(false, |c| c.is_uppercase()));
    technical_token || all_capitalized
}
