//! Fence-tracking segmenter.
//!
//! Splits raw text into an ordered sequence of prose and code segments.
//! A line matching a fence marker (three backticks, optionally indented)
//! toggles code mode; a segment covers the span between fence-open and
//! fence-close inclusive. Ordering is load-bearing: reassembly is a plain
//! `join("\n")` over segment contents, which reconstructs the document
//! exactly modulo transforms applied to prose segments.

use crate::text::is_fence_line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Prose,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub content: String,
}

impl Segment {
    fn new(kind: SegmentKind, lines: &[&str]) -> Self {
        Segment { kind, content: lines.join("\n") }
    }
}

/// Split text into prose/code segments. An unterminated fence at end of
/// input still yields a trailing code segment; no closing fence is invented.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut in_code = false;

    for line in text.split('\n') {
        if is_fence_line(line) {
            if in_code {
                buffer.push(line);
                segments.push(Segment::new(SegmentKind::Code, &buffer));
                buffer.clear();
                in_code = false;
            } else {
                if !buffer.is_empty() {
                    segments.push(Segment::new(SegmentKind::Prose, &buffer));
                    buffer.clear();
                }
                buffer.push(line);
                in_code = true;
            }
        } else {
            buffer.push(line);
        }
    }

    if !buffer.is_empty() {
        let kind = if in_code { SegmentKind::Code } else { SegmentKind::Prose };
        segments.push(Segment::new(kind, &buffer));
    }
    segments
}

/// Concatenate segments back into a single document.
pub fn reassemble(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.content.as_str()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_prose_only() {
        let segs = segment("hello\nworld");
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].kind, SegmentKind::Prose);
        assert_eq!(segs[0].content, "hello\nworld");
    }

    #[test]
    fn test_segment_code_block() {
        let text = "before\n```rust\nfn main() {}\n```\nafter";
        let segs = segment(text);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].kind, SegmentKind::Prose);
        assert_eq!(segs[1].kind, SegmentKind::Code);
        assert_eq!(segs[1].content, "```rust\nfn main() {}\n```");
        assert_eq!(segs[2].kind, SegmentKind::Prose);
    }

    #[test]
    fn test_segment_unterminated_fence() {
        let text = "prose\n```\ncode forever";
        let segs = segment(text);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].kind, SegmentKind::Code);
        assert_eq!(segs[1].content, "```\ncode forever");
    }

    #[test]
    fn test_reassemble_roundtrip() {
        for text in ["a\n```\nb\n```\nc", "", "one line", "```\nopen", "\n\n```\n\n```\n\n"] {
            assert_eq!(reassemble(&segment(text)), text);
        }
    }

    #[test]
    fn test_indented_fence_toggles() {
        let text = "p\n   ```\nx\n   ```";
        let segs = segment(text);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].kind, SegmentKind::Code);
    }
}
