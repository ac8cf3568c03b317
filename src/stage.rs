//! Stage contract and pipeline runner.
//!
//! A stage is a pure text transform with an applied/not-applied signal. The
//! runner threads prose segments through every stage in order, folding an
//! immutable transform log of the labels that fired. Code segments are never
//! handed to a stage; they pass through the runner byte-identical.

use crate::segment::{reassemble, segment, SegmentKind};

/// Result of one transform: the (possibly unchanged) text and whether the
/// stage found anything to do. A stage that detects no applicable pattern
/// must leave the text byte-identical and report `applied == false`; the
/// stabilizer's pass comparison depends on this being honest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    pub applied: bool,
}

impl Applied {
    pub fn changed(text: String) -> Self {
        Applied { text, applied: true }
    }

    pub fn unchanged(text: &str) -> Self {
        Applied { text: text.to_string(), applied: false }
    }

    /// Wrap a rewrite, deriving the applied flag from an actual difference.
    pub fn from_rewrite(original: &str, rewritten: String) -> Self {
        if rewritten == original {
            Applied::unchanged(original)
        } else {
            Applied::changed(rewritten)
        }
    }
}

/// A labeled pure transform. Stateless and safe to call on identical input
/// arbitrarily many times within a pass.
pub struct Stage {
    pub label: &'static str,
    pub run: fn(&str) -> Applied,
}

/// Run every stage over the prose segments of `text`, in order, returning
/// the reassembled document and the ordered list of stage labels that fired.
pub fn run_pass(text: &str, stages: &[Stage]) -> (String, Vec<&'static str>) {
    let mut labels: Vec<&'static str> = Vec::new();
    let mut segments = segment(text);

    for seg in segments.iter_mut() {
        if seg.kind == SegmentKind::Code {
            continue;
        }
        for stage in stages {
            let out = (stage.run)(&seg.content);
            if out.applied {
                if !labels.contains(&stage.label) {
                    labels.push(stage.label);
                }
                log::debug!("stage applied: {}", stage.label);
            }
            seg.content = out.text;
        }
    }

    (reassemble(&segments), labels)
}

/// Synthesize the human-readable format label from a transform log:
/// deduplicated, capped at three distinct labels with a "+N more" suffix,
/// or "Standard" when nothing fired.
pub fn summarize(labels: &[&str]) -> String {
    let mut distinct: Vec<&str> = Vec::new();
    for l in labels {
        if !distinct.contains(l) {
            distinct.push(*l);
        }
    }
    match distinct.len() {
        0 => "Standard".to_string(),
        1..=3 => distinct.join(", "),
        n => format!("{} +{} more", distinct[..3].join(", "), n - 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(text: &str) -> Applied {
        Applied::from_rewrite(text, text.to_uppercase())
    }

    fn noop(text: &str) -> Applied {
        Applied::unchanged(text)
    }

    #[test]
    fn test_run_pass_skips_code_segments() {
        let stages = [Stage { label: "Upper", run: upper }];
        let (out, labels) = run_pass("abc\n```\ncode\n```\ndef", &stages);
        assert_eq!(out, "ABC\n```\ncode\n```\nDEF");
        assert_eq!(labels, vec!["Upper"]);
    }

    #[test]
    fn test_noop_stage_reports_nothing() {
        let stages = [Stage { label: "Noop", run: noop }];
        let (out, labels) = run_pass("abc", &stages);
        assert_eq!(out, "abc");
        assert!(labels.is_empty());
    }

    #[test]
    fn test_summarize_caps_at_three() {
        assert_eq!(summarize(&[]), "Standard");
        assert_eq!(summarize(&["A"]), "A");
        assert_eq!(summarize(&["A", "B", "C"]), "A, B, C");
        assert_eq!(summarize(&["A", "B", "C", "D", "E"]), "A, B, C +2 more");
        assert_eq!(summarize(&["A", "A", "B"]), "A, B");
    }
}
