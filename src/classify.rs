//! Weighted section classifier.
//!
//! Scores a prose block against per-kind indicator patterns and returns the
//! best-scoring section kind, but only when the score strictly exceeds a
//! fixed confidence threshold. Ties and near-misses yield no classification;
//! the engine favors precision over recall, so an unheadered block is always
//! preferable to a wrong header.
//!
//! The weights and the threshold are empirically tuned values. Treat any
//! change here as a behavior change, not a cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{is_bullet_line, is_numbered_line};

/// Minimum score a kind must strictly exceed to be accepted. A single weak
/// keyword hit is never enough.
pub const SCORE_THRESHOLD: i32 = 3;

/// The closed set of section categories a prose block may be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Role,
    Context,
    Task,
    Instructions,
    Steps,
    Output,
    Constraints,
    Examples,
    Tone,
    Audience,
    Input,
    Definitions,
    Workflow,
}

impl SectionKind {
    pub const ALL: [SectionKind; 13] = [
        SectionKind::Role,
        SectionKind::Context,
        SectionKind::Task,
        SectionKind::Instructions,
        SectionKind::Steps,
        SectionKind::Output,
        SectionKind::Constraints,
        SectionKind::Examples,
        SectionKind::Tone,
        SectionKind::Audience,
        SectionKind::Input,
        SectionKind::Definitions,
        SectionKind::Workflow,
    ];

    /// Canonical display label used when the kind is promoted to a header.
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Role => "Role",
            SectionKind::Context => "Context",
            SectionKind::Task => "Task",
            SectionKind::Instructions => "Instructions",
            SectionKind::Steps => "Steps",
            SectionKind::Output => "Output Format",
            SectionKind::Constraints => "Constraints",
            SectionKind::Examples => "Examples",
            SectionKind::Tone => "Tone",
            SectionKind::Audience => "Audience",
            SectionKind::Input => "Input",
            SectionKind::Definitions => "Definitions",
            SectionKind::Workflow => "Workflow",
        }
    }
}

struct Indicator {
    pattern: Regex,
    weight: i32,
}

fn ind(pattern: &str, weight: i32) -> Indicator {
    Indicator { pattern: Regex::new(pattern).unwrap(), weight }
}

static INDICATORS: Lazy<Vec<(SectionKind, Vec<Indicator>)>> = Lazy::new(|| {
    use SectionKind::*;
    vec![
        (
            Role,
            vec![
                ind(r"(?i)\byou are (a|an|the)\b", 3),
                ind(r"(?i)\bact(ing)? as\b", 3),
                ind(r"(?i)\byour role\b", 3),
                ind(r"(?i)\b(assistant|expert|specialist)\b", 1),
                ind(r"(?i)\bpersona\b", 2),
            ],
        ),
        (
            Context,
            vec![
                ind(r"(?i)\bcontext\b", 3),
                ind(r"(?i)\bbackground\b", 2),
                ind(r"(?i)\bsituation\b", 2),
                ind(r"(?i)\bfor (context|reference)\b", 3),
                ind(r"(?i)\bcurrently\b", 1),
            ],
        ),
        (
            Task,
            vec![
                ind(r"(?i)\byour task\b", 4),
                ind(r"(?i)\bgoal is\b", 3),
                ind(r"(?i)\b(i need you to|please (write|create|build|generate|make))\b", 3),
                ind(r"(?i)\bobjective\b", 2),
                ind(r"(?i)\bdeliverables?\b", 2),
            ],
        ),
        (
            Instructions,
            vec![
                ind(r"(?i)\bfollow (these|the) (instructions|guidelines|rules)\b", 4),
                ind(r"(?i)\binstructions?\b", 2),
                ind(r"(?i)\bmake sure (to|you)\b", 2),
                ind(r"(?i)\byou (should|must)\b", 2),
                ind(r"(?i)\bguidelines\b", 2),
            ],
        ),
        (
            Steps,
            vec![
                ind(r"(?im)^step \d", 4),
                ind(r"(?i)\bstep[- ]by[- ]step\b", 3),
                ind(r"(?i)\bprocedure\b", 2),
                ind(r"(?i)\b(first|next|then|finally),", 1),
                ind(r"(?i)\bprocess\b", 1),
            ],
        ),
        (
            Output,
            vec![
                ind(r"(?i)\boutput (format|should|must)\b", 4),
                ind(r"(?i)\brespond (with|in|using)\b", 3),
                ind(r"(?i)\b(json|markdown|csv|xml|yaml) (format|output)\b", 3),
                ind(r"(?i)\bformat(ted)? as\b", 2),
                ind(r"(?i)\breturn (a|an|the|only)\b", 2),
            ],
        ),
        (
            Constraints,
            vec![
                ind(r"(?i)\bmust not\b", 3),
                ind(r"(?i)\bwithin \d+ (words|characters|sentences)\b", 3),
                ind(r"(?i)\bdo not\b", 2),
                ind(r"(?i)\bavoid\b", 2),
                ind(r"(?i)\bnever\b", 2),
                ind(r"(?i)\b(limit|restricted?|constraints?|at most|no more than)\b", 2),
            ],
        ),
        (
            Examples,
            vec![
                ind(r"(?i)\bfor example\b", 3),
                ind(r"(?im)^examples?\b", 3),
                ind(r"(?i)\bsample (input|output|response)\b", 3),
                ind(r"(?i)\be\.g\.", 2),
                ind(r"(?i)\bsuch as\b", 1),
            ],
        ),
        (
            Tone,
            vec![
                ind(r"(?i)\b(friendly|formal|casual|professional|playful|concise) (tone|voice|style)\b", 4),
                ind(r"(?i)\btone\b", 3),
                ind(r"(?i)\bwriting style\b", 3),
                ind(r"(?i)\bsound (like|friendly|formal|casual)\b", 2),
            ],
        ),
        (
            Audience,
            vec![
                ind(r"(?i)\baudience\b", 3),
                ind(r"(?i)\b(aimed|intended|written) (at|for)\b", 3),
                ind(r"(?i)\bfor (children|kids|students|developers|executives)\b", 3),
                ind(r"(?i)\breaders?\b", 2),
                ind(r"(?i)\b(beginners?|non[- ]technical|experts?)\b", 1),
            ],
        ),
        (
            Input,
            vec![
                ind(r"(?i)\bthe user (will|provides?|gives?|submits?)\b", 3),
                ind(r"(?i)\bprovided (below|text|data|document)\b", 3),
                ind(r"(?i)\binput\b", 2),
                ind(r"(?i)\bgiven (a|an|the)\b", 2),
            ],
        ),
        (
            Definitions,
            vec![
                ind(r"(?i)\bglossary\b", 4),
                ind(r"(?i)\bdefinitions?\b", 3),
                ind(r"(?i)\bterminology\b", 3),
                ind(r"(?i)\b(means|refers to|is defined as)\b", 2),
            ],
        ),
        (
            Workflow,
            vec![
                ind(r"(?i)\bworkflow\b", 3),
                ind(r"(?i)\bfrom start to finish\b", 3),
                ind(r"(?i)\bpipeline\b", 2),
                ind(r"(?i)\bend[- ]to[- ]end\b", 2),
                ind(r"(?i)\bhand(s|ed)? off\b", 2),
            ],
        ),
    ]
});

/// Score a block against one kind's indicators, including the structural
/// density boosts for list-heavy blocks.
pub fn score(kind: SectionKind, block: &str) -> i32 {
    let mut total = 0;
    for (k, indicators) in INDICATORS.iter() {
        if *k != kind {
            continue;
        }
        for i in indicators {
            if i.pattern.is_match(block) {
                total += i.weight;
            }
        }
    }
    let numbered = block.lines().filter(|l| is_numbered_line(l)).count();
    let bulleted = block.lines().filter(|l| is_bullet_line(l)).count();
    if kind == SectionKind::Steps && numbered >= 3 {
        total += 2;
    }
    if kind == SectionKind::Instructions && bulleted >= 3 {
        total += 2;
    }
    total
}

/// Classify a block: highest-scoring kind iff its score strictly exceeds
/// [`SCORE_THRESHOLD`] and no other kind ties it.
pub fn classify(block: &str) -> Option<SectionKind> {
    let mut best: Option<(SectionKind, i32)> = None;
    let mut tied = false;
    for kind in SectionKind::ALL {
        let s = score(kind, block);
        match best {
            Some((_, b)) if s > b => {
                best = Some((kind, s));
                tied = false;
            }
            Some((_, b)) if s == b && s > 0 => tied = true,
            None => best = Some((kind, s)),
            _ => {}
        }
    }
    match best {
        Some((kind, s)) if s > SCORE_THRESHOLD && !tied => Some(kind),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_weak_hit_is_rejected() {
        // One weak keyword must never clear the threshold. This guards
        // against, e.g., a personal bio mentioning "workflow" once.
        let bio = "I enjoy optimizing my personal workflow and drinking coffee.";
        assert_eq!(classify(bio), None);
        assert!(score(SectionKind::Workflow, bio) <= SCORE_THRESHOLD);
    }

    #[test]
    fn test_strong_output_block() {
        let block = "The output format must be JSON format. Respond with an array of objects.";
        assert_eq!(classify(block), Some(SectionKind::Output));
    }

    #[test]
    fn test_constraints_block() {
        let block = "Do not exceed the limit. Avoid slang. Never mention pricing.";
        assert_eq!(classify(block), Some(SectionKind::Constraints));
    }

    #[test]
    fn test_steps_density_boost() {
        let block = "1. Open the file\n2. Edit the line\n3. Save it\nA step-by-step process.";
        assert!(score(SectionKind::Steps, block) > SCORE_THRESHOLD);
        assert_eq!(classify(block), Some(SectionKind::Steps));
    }

    #[test]
    fn test_labels() {
        assert_eq!(SectionKind::Output.label(), "Output Format");
        assert_eq!(SectionKind::Steps.label(), "Steps");
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(classify(""), None);
    }
}
