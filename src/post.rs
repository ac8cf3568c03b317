//! Post-processing: blank-line spacing around structural elements and
//! deduplication of accidentally repeated headers.
//!
//! Runs on the reassembled document between the two pipeline passes. Code
//! segments are exempt; only prose spacing is adjusted.

use crate::segment::{reassemble, segment, SegmentKind};
use crate::text::{is_blockquote_line, is_bullet_line, is_header_line, is_numbered_line};

/// Normalize spacing: insert a blank line before headers, bullet lists,
/// numbered lists and blockquotes where missing, collapse runs of three or
/// more newlines to two, and drop immediately repeated identical headers.
pub fn normalize_spacing(text: &str) -> String {
    let mut segments = segment(text);
    for seg in segments.iter_mut() {
        if seg.kind == SegmentKind::Prose {
            seg.content = space_prose(&seg.content);
        }
    }
    reassemble(&segments)
}

fn needs_leading_blank(prev: &str, line: &str) -> bool {
    if prev.trim().is_empty() {
        return false;
    }
    if is_header_line(line) {
        return true;
    }
    // Dividers sit on their own, separated from both neighbors.
    if line.trim() == "---" || prev.trim() == "---" {
        return true;
    }
    // The first item of a list run gets a blank line; siblings stay tight.
    if is_bullet_line(line) && !is_bullet_line(prev) && !is_header_line(prev) {
        return true;
    }
    if is_numbered_line(line) && !is_numbered_line(prev) && !is_header_line(prev) {
        return true;
    }
    if is_blockquote_line(line) && !is_blockquote_line(prev) {
        return true;
    }
    false
}

fn space_prose(content: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut blank_run = 0usize;

    for line in content.split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            // Collapse three or more newlines down to a single blank line.
            if blank_run >= 2 && out.last().map_or(true, |l| l.trim().is_empty()) {
                continue;
            }
            out.push(String::new());
            continue;
        }

        // Drop a header identical to the previous header with nothing but
        // blank lines in between.
        if is_header_line(line) {
            let prev_header = out.iter().rev().find(|l| !l.trim().is_empty());
            if prev_header.map(|h| h.as_str()) == Some(line) {
                blank_run = 0;
                continue;
            }
        }

        if let Some(prev) = out.last() {
            if blank_run == 0 && needs_leading_blank(prev, line) {
                out.push(String::new());
            }
        }
        blank_run = 0;
        out.push(line.to_string());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_before_header() {
        let out = normalize_spacing("some text\n## Header\nmore text");
        assert_eq!(out, "some text\n\n## Header\nmore text");
    }

    #[test]
    fn test_blank_before_list_run_only() {
        let out = normalize_spacing("intro line\n- one\n- two");
        assert_eq!(out, "intro line\n\n- one\n- two");
    }

    #[test]
    fn test_collapse_extra_blanks() {
        let out = normalize_spacing("a\n\n\n\nb");
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn test_divider_spacing() {
        let out = normalize_spacing("before the break\n---\nafter the break");
        assert_eq!(out, "before the break\n\n---\n\nafter the break");
    }

    #[test]
    fn test_duplicate_header_dropped() {
        let out = normalize_spacing("## Steps\n## Steps\ncontent");
        assert_eq!(out, "## Steps\ncontent");
    }

    #[test]
    fn test_code_segments_untouched() {
        let text = "a\n```\nx\n## Header\n\n\n\ny\n```\nb";
        let out = normalize_spacing(text);
        assert!(out.contains("```\nx\n## Header\n\n\n\ny\n```"));
    }

    #[test]
    fn test_already_spaced_is_stable() {
        let text = "intro\n\n## Header\n\n- one\n- two";
        assert_eq!(normalize_spacing(text), text);
    }
}
