//! Pipeline orchestration.
//!
//! One call in, one [`FormatResult`] out: custom rules, whitespace
//! normalization, early-exit detection, the first stage pass, spacing
//! post-processing, and the stabilizing second pass. The stabilizer runs
//! the whole stage pipeline once more on its own output and adopts the
//! second pass when it differs, which is closer to a fixed point. This is
//! a single refinement, not iteration to convergence.

use crate::segment::{reassemble, segment, SegmentKind};
use crate::stage::{run_pass, summarize};
use crate::{detect, post, rules, stages, CustomRule, FormatResult};

/// Execute the full pipeline.
pub fn run(text: &str, custom_rules: &[CustomRule]) -> FormatResult {
    let (text, rules_applied) = rules::apply(text, custom_rules);
    let normalized = normalize_whitespace(&text);

    if let Some(hit) = detect::early_exit(&normalized) {
        return FormatResult { formatted: hit.formatted, format_type: hit.label.to_string() };
    }

    let stage_list = stages::all();
    let (pass1, mut labels) = run_pass(&normalized, &stage_list);
    let spaced = post::normalize_spacing(&pass1);

    let (pass2, _) = run_pass(&spaced, &stage_list);
    let formatted = if pass2 != spaced {
        log::debug!("stabilizer: second pass differed, adopting it");
        pass2
    } else {
        spaced
    };

    if rules_applied {
        labels.insert(0, "Custom Rules");
    }
    FormatResult { formatted, format_type: summarize(&labels) }
}

/// Normalize line endings and prose whitespace before anything else looks
/// at the document: strip a UTF-8 BOM, convert CRLF/CR to LF, trim trailing
/// whitespace on prose lines, and collapse runs of blank prose lines. Code
/// segments keep their bytes.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut segments = segment(&unified);
    for seg in segments.iter_mut() {
        if seg.kind != SegmentKind::Prose {
            continue;
        }
        let mut out: Vec<&str> = Vec::new();
        let mut blanks = 0usize;
        for line in seg.content.split('\n') {
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                blanks += 1;
                if blanks >= 2 {
                    continue;
                }
            } else {
                blanks = 0;
            }
            out.push(trimmed);
        }
        seg.content = out.join("\n");
    }
    reassemble(&segments)
}
