//! Early-exit detector behavior through the public entry point.

use notefmt::format;

#[test]
fn test_json_array_prettified() {
    let result = format("[1,2,3]", &[]);
    assert_eq!(result.formatted, "```json\n[\n  1,\n  2,\n  3\n]\n```");
    assert_eq!(result.format_type, "JSON Prettify");
}

#[test]
fn test_json_scalar_falls_through() {
    // A bare JSON scalar is prose, not a document to prettify.
    let result = format("42", &[]);
    assert_ne!(result.format_type, "JSON Prettify");
}

#[test]
fn test_front_matter_left_untouched() {
    let input = "---\ntitle: My Note\ndate: 2024-01-01\ntags:\n  - rust\n  - notes\n---";
    let result = format(input, &[]);
    assert_eq!(result.formatted, input);
    assert_eq!(result.format_type, "YAML Front Matter");
}

#[test]
fn test_source_code_wrapped_in_fence() {
    let input = "def main():\n    total = compute()\n    return total\nprint(main())";
    let result = format(input, &[]);
    assert_eq!(result.format_type, "Auto-Code Block");
    assert!(result.formatted.starts_with("```\n"));
    assert!(result.formatted.ends_with("\n```"));
    assert!(result.formatted.contains("def main():"));
}

#[test]
fn test_already_fenced_code_is_not_rewrapped() {
    let input = "```\ndef main():\n    return 1\n```";
    let result = format(input, &[]);
    assert_ne!(result.format_type, "Auto-Code Block");
    assert!(result.formatted.contains("def main():"));
}

#[test]
fn test_tab_table_converted() {
    let result = format("Name\tRole\nAlice\tAdmin\nBob\tViewer", &[]);
    assert_eq!(result.format_type, "Table Auto-Format");
    assert_eq!(
        result.formatted,
        "| Name | Role |\n| --- | --- |\n| Alice | Admin |\n| Bob | Viewer |"
    );
}

#[test]
fn test_pipe_table_converted() {
    let result = format("name | age\nAlice | 30", &[]);
    assert_eq!(result.format_type, "Table Auto-Format");
    assert!(result.formatted.contains("| name | age |"));
}

#[test]
fn test_detectors_skip_mixed_documents() {
    // A table-ish pair of lines inside a larger prose document must not
    // trigger the whole-document table detector.
    let input = "Here are the results we collected.\n\na\tb\nc\td";
    let result = format(input, &[]);
    assert_ne!(result.format_type, "Table Auto-Format");
}
