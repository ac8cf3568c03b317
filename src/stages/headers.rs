//! Header promotion, auto-sectioning and title synthesis.
//!
//! `N. Heading` lines at paragraph boundaries become headers; headerless
//! documents get section headers from the weighted classifier (one kind per
//! document, first match wins); a document title is synthesized from the
//! first block when absent; and all headers receive title casing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{classify, SectionKind};
use crate::stage::{Applied, Stage};
use crate::text::{
    ends_with_sentence_punctuation, is_header_line, is_structural_line, starts_with_greeting,
    title_case, title_case_soft, word_count,
};

pub fn stages() -> Vec<Stage> {
    vec![
        Stage { label: "Numbered Headings", run: numbered_headings },
        Stage { label: "Auto-Sections", run: auto_sections },
        Stage { label: "Title", run: synthesize_title },
        Stage { label: "Header Case", run: title_case_headers },
    ]
}

static NUMBERED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s+([A-Z].*)$").unwrap());

/// `N. Heading Text` at a true line boundary (blank above and below, no
/// sentence punctuation) becomes `## N. Heading Text`. Adjacent numbered
/// lines are list items, not headings, and are left alone.
fn numbered_headings(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let heading = NUMBERED_HEADING
            .captures(line)
            .filter(|caps| {
                !ends_with_sentence_punctuation(&caps[2])
                    && word_count(&caps[2]) <= 8
                    && (i == 0 || lines[i - 1].trim().is_empty())
                    && (i + 1 >= lines.len() || lines[i + 1].trim().is_empty())
            })
            .map(|caps| format!("## {}. {}", &caps[1], &caps[2]));
        match heading {
            Some(h) => out.push(h),
            None => out.push((*line).to_string()),
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}

/// Share of blocks that may already carry headers before auto-sectioning
/// backs off entirely.
const HEADERED_RATIO_CUTOFF: f64 = 0.3;

static FIRST_PERSON: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(I|[Mm]y|[Mm]yself)\b").unwrap());

/// Strong first-person narrative signal: biographical text must not be
/// section-tagged no matter what keywords it happens to contain.
fn is_first_person_narrative(block: &str) -> bool {
    FIRST_PERSON.find_iter(block).count() >= 3
}

fn auto_sections(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();

    // Blocks are contiguous runs of non-blank lines.
    let mut blocks: Vec<(usize, usize)> = Vec::new();
    let mut start: Option<usize> = None;
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                blocks.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        blocks.push((s, lines.len()));
    }
    if blocks.is_empty() {
        return Applied::unchanged(text);
    }

    let headered = blocks.iter().filter(|(s, _)| is_header_line(lines[*s])).count();
    if headered as f64 / blocks.len() as f64 >= HEADERED_RATIO_CUTOFF {
        return Applied::unchanged(text);
    }

    let mut insert_before: Vec<(usize, SectionKind)> = Vec::new();
    let mut used: Vec<SectionKind> = Vec::new();
    for (s, e) in &blocks {
        if is_header_line(lines[*s]) {
            continue;
        }
        let block = lines[*s..*e].join("\n");
        if is_first_person_narrative(&block) {
            continue;
        }
        if let Some(kind) = classify(&block) {
            // One header per kind per document; the first match wins.
            if !used.contains(&kind) {
                used.push(kind);
                insert_before.push((*s, kind));
            }
        }
    }
    if insert_before.is_empty() {
        return Applied::unchanged(text);
    }

    let mut out: Vec<String> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some((_, kind)) = insert_before.iter().find(|(at, _)| *at == i) {
            out.push(format!("## {}", kind.label()));
            out.push(String::new());
        }
        out.push((*line).to_string());
    }
    Applied::changed(out.join("\n"))
}

static TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^title\s*:\s*(.+)$").unwrap());
static ROLE_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\byou are (?:a|an|the)\s+([a-z][a-z -]*[a-z])").unwrap());
static MAKER_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:create|build|design|write|develop)\s+(?:a|an|the)\s+([a-z][a-z -]*[a-z])")
        .unwrap()
});

/// Synthesize a document-level `# Title` when none exists: an explicit
/// `Title:` prefix wins, then a role or maker phrase in the first block,
/// then direct title-casing of a short punctuation-free first line.
fn synthesize_title(text: &str) -> Applied {
    if text.lines().any(|l| l.starts_with("# ")) {
        return Applied::unchanged(text);
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let first_idx = match lines.iter().position(|l| !l.trim().is_empty()) {
        Some(i) => i,
        None => return Applied::unchanged(text),
    };
    let first_line = lines[first_idx].trim();
    if is_structural_line(first_line) {
        return Applied::unchanged(text);
    }

    // Explicit Title: prefix replaces the line itself.
    if let Some(caps) = TITLE_PREFIX.captures(first_line) {
        let mut out: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
        out[first_idx] = format!("# {}", title_case(caps[1].trim()));
        return Applied::changed(out.join("\n"));
    }

    let block: String = lines[first_idx..]
        .iter()
        .take_while(|l| !l.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let phrase = ROLE_PHRASE
        .captures(&block)
        .or_else(|| MAKER_PHRASE.captures(&block))
        .map(|caps| caps[1].trim().to_string())
        .filter(|p| (1..=6).contains(&word_count(p)));

    let title = match phrase {
        Some(p) => Some(title_case(&p)),
        None => {
            // A line followed by more text is mid-paragraph prose, not a
            // title candidate; only a standalone first line qualifies.
            let standalone =
                first_idx + 1 >= lines.len() || lines[first_idx + 1].trim().is_empty();
            let words = word_count(first_line);
            let plain = standalone
                && (2..=8).contains(&words)
                && !ends_with_sentence_punctuation(first_line)
                && !first_line.contains(['.', ',', ':', ';', '!', '?', '"'])
                && !starts_with_greeting(first_line);
            if plain {
                // The first line itself becomes the title.
                let mut out: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
                out[first_idx] = format!("# {}", title_case(first_line));
                return Applied::changed(out.join("\n"));
            }
            None
        }
    };

    match title {
        Some(t) => {
            let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);
            out.push(format!("# {}", t));
            out.push(String::new());
            out.extend(lines.iter().map(|l| (*l).to_string()));
            Applied::changed(out.join("\n"))
        }
        None => Applied::unchanged(text),
    }
}

static HEADER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());

/// Title-case every header line; minor words stay lowercase unless they
/// open the phrase, acronyms and identifiers keep their casing.
fn title_case_headers(text: &str) -> Applied {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        match HEADER_LINE.captures(line) {
            Some(caps) => out.push(format!("{} {}", &caps[1], title_case_soft(&caps[2]))),
            None => out.push(line.to_string()),
        }
    }
    Applied::from_rewrite(text, out.join("\n"))
}
