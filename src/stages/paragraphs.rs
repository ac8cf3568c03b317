//! Paragraph splitting.
//!
//! Long wall-of-text paragraphs are split at sentence boundaries following a
//! transition word once enough words have accumulated; a mechanical fallback
//! chunks very long paragraphs into roughly three sentences apiece. Headers,
//! lists, blockquotes and other structural lines pass through untouched and
//! never count toward the thresholds.

use crate::stage::{Applied, Stage};
use crate::text::{is_structural_line, split_sentences, word_count};

pub fn stages() -> Vec<Stage> {
    vec![Stage { label: "Paragraph Split", run: split_paragraphs }]
}

/// Words after which a paragraph is considered long enough to split.
const SPLIT_WORDS: usize = 45;
/// Minimum words accumulated in a chunk before a transition may break it.
const CHUNK_MIN_WORDS: usize = 20;
/// Word threshold for the mechanical sentence-chunk fallback.
const FALLBACK_WORDS: usize = 80;
const FALLBACK_MIN_SENTENCES: usize = 4;
const FALLBACK_CHUNK: usize = 3;

const TRANSITIONS: &[&str] = &[
    "However", "Therefore", "Additionally", "Furthermore", "Moreover", "Meanwhile",
    "Consequently", "Nevertheless", "First", "Second", "Third", "Next", "Then", "Finally",
    "Instead", "Otherwise", "In addition", "On the other hand", "As a result", "For example",
];

fn starts_with_transition(sentence: &str) -> bool {
    TRANSITIONS.iter().any(|t| {
        sentence.starts_with(t)
            && sentence[t.len()..].chars().next().map_or(true, |c| c == ',' || c.is_whitespace())
    })
}

fn split_paragraphs(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    let flush = |run: &mut Vec<&str>, out: &mut Vec<String>| {
        if run.is_empty() {
            return;
        }
        match split_one(&run.join(" ")) {
            // Soft-wrapped lines are only rejoined when a split happens.
            Some(chunks) => out.extend(chunks),
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

/// Split one paragraph into chunk lines with blank separators, or `None`
/// when no threshold is met.
fn split_one(paragraph: &str) -> Option<Vec<String>> {
    if word_count(paragraph) < SPLIT_WORDS {
        return None;
    }
    let sentences = split_sentences(paragraph);
    if sentences.len() < 2 {
        return None;
    }

    let mut chunks: Vec<Vec<&str>> = vec![Vec::new()];
    for sentence in &sentences {
        let current_words: usize =
            chunks.last().map(|c| c.iter().map(|s| word_count(s)).sum()).unwrap_or(0);
        if current_words >= CHUNK_MIN_WORDS && starts_with_transition(sentence) {
            chunks.push(Vec::new());
        }
        chunks.last_mut().expect("chunks never empty").push(sentence.as_str());
    }

    if chunks.len() == 1
        && word_count(paragraph) >= FALLBACK_WORDS
        && sentences.len() >= FALLBACK_MIN_SENTENCES
    {
        chunks = sentences.chunks(FALLBACK_CHUNK).map(|c| c.iter().map(|s| s.as_str()).collect()).collect();
    }

    if chunks.len() == 1 {
        return None;
    }

    let mut out = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            out.push(String::new());
        }
        out.push(chunk.join(" "));
    }
    Some(out)
}
