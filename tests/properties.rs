//! Property-based tests for the formatting engine.
//!
//! The entry point is a total function: any string in, a result out, no
//! panics. Fenced code blocks must survive the whole pipeline byte-identical.

use notefmt::format;
use proptest::prelude::*;

/// Arbitrary short documents, including control characters and non-ASCII.
fn any_document() -> impl Strategy<Value = String> {
    proptest::string::string_regex(".{0,400}").expect("valid strategy regex")
}

/// Plain prose paragraphs: sentences of neutral words, lowercase, with
/// terminal periods. Nothing in them resembles a header, list, transition
/// word or section keyword, so formatting is limited to casing and spacing
/// repairs and must reach a fixed point in one call.
fn prose_paragraph() -> impl Strategy<Value = String> {
    let word = proptest::sample::select(vec![
        "plum", "stone", "river", "cloud", "amber", "quiet", "little", "garden", "walks",
        "slowly", "evening", "window", "yellow", "basket", "corner", "meadow",
    ]);
    let sentence =
        proptest::collection::vec(word, 3..9).prop_map(|w| format!("{}.", w.join(" ")));
    proptest::collection::vec(sentence, 2..5).prop_map(|s| s.join(" "))
}

fn prose_document() -> impl Strategy<Value = String> {
    proptest::collection::vec(prose_paragraph(), 1..4).prop_map(|p| p.join("\n\n"))
}

/// Code-fence body lines: no backticks, so the fence stays well formed.
fn fence_body() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        proptest::string::string_regex("[a-z0-9 _;=()]{0,30}").expect("valid strategy regex"),
        0..6,
    )
}

proptest! {
    #[test]
    fn test_format_never_panics(input in any_document()) {
        let _ = format(&input, &[]);
    }

    #[test]
    fn test_format_type_never_empty(input in any_document()) {
        let result = format(&input, &[]);
        prop_assert!(!result.format_type.is_empty());
    }

    #[test]
    fn test_output_has_unix_line_endings(input in any_document()) {
        let result = format(&input, &[]);
        prop_assert!(!result.formatted.contains('\r'));
    }

    #[test]
    fn test_format_is_idempotent_on_prose(input in prose_document()) {
        let once = format(&input, &[]);
        let twice = format(&once.formatted, &[]);
        prop_assert_eq!(twice.formatted, once.formatted);
    }

    #[test]
    fn test_format_is_deterministic(input in any_document()) {
        let a = format(&input, &[]);
        let b = format(&input, &[]);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_code_fences_pass_through(body in fence_body()) {
        let fence = format!("```\n{}\n```", body.join("\n"));
        let input = format!(
            "An introductory prose sentence for this document.\n\n{}\n\nA closing prose line.",
            fence
        );
        let result = format(&input, &[]);
        prop_assert!(
            result.formatted.contains(&fence),
            "fence altered in output: {}",
            result.formatted
        );
    }

    #[test]
    fn test_invalid_rule_patterns_never_panic(pattern in ".{0,40}") {
        let rule = notefmt::CustomRule {
            id: "p".to_string(),
            name: "property rule".to_string(),
            pattern,
            replacement: "x".to_string(),
            active: true,
        };
        let _ = format("Some ordinary text to run the rules against.", &[rule]);
    }
}
