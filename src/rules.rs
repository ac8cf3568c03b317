//! Custom rule engine.
//!
//! Applies user-supplied regex replacement rules as a pre-pass before the
//! core pipeline. Each rule is independently failable: a pattern that does
//! not compile is inert for that call, logged, and never aborts the other
//! rules or the pipeline.

use regex::Regex;

use crate::CustomRule;

/// Apply every active rule in order. Returns the rewritten text and whether
/// any rule changed anything.
pub fn apply(text: &str, rules: &[CustomRule]) -> (String, bool) {
    let mut current = text.to_string();
    let mut applied = false;

    for rule in rules.iter().filter(|r| r.active) {
        let re = match Regex::new(&rule.pattern) {
            Ok(re) => re,
            Err(err) => {
                log::warn!("skipping custom rule '{}': invalid pattern: {}", rule.name, err);
                continue;
            }
        };
        let replaced = re.replace_all(&current, rule.replacement.as_str()).into_owned();
        if replaced != current {
            applied = true;
            current = replaced;
        }
    }

    (current, applied)
}
