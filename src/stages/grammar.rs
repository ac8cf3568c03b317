//! Grammar correction stages.
//!
//! Fixed-table corrections only: contraction apostrophes, the standalone
//! pronoun "i", accidentally repeated words, spacing around punctuation,
//! sentence and list-item capitalization, and a list of common misspellings.
//! Nothing here attempts real language understanding.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::stage::{Applied, Stage};
use crate::text::{
    capitalize_first, is_fence_line, is_header_line, is_structural_line, is_table_row,
    map_outside_code_spans,
};

pub fn stages() -> Vec<Stage> {
    vec![
        Stage { label: "Contractions", run: fix_contractions },
        Stage { label: "Word Repeats", run: collapse_repeats },
        Stage { label: "Spacing", run: fix_spacing },
        Stage { label: "Capitalization", run: fix_capitalization },
        Stage { label: "Spelling", run: fix_spelling },
    ]
}

const CONTRACTIONS: &[(&str, &str)] = &[
    ("dont", "don't"),
    ("cant", "can't"),
    ("wont", "won't"),
    ("isnt", "isn't"),
    ("arent", "aren't"),
    ("wasnt", "wasn't"),
    ("werent", "weren't"),
    ("doesnt", "doesn't"),
    ("didnt", "didn't"),
    ("hasnt", "hasn't"),
    ("havent", "haven't"),
    ("hadnt", "hadn't"),
    ("wouldnt", "wouldn't"),
    ("couldnt", "couldn't"),
    ("shouldnt", "shouldn't"),
    ("youre", "you're"),
    ("youve", "you've"),
    ("youll", "you'll"),
    ("theyre", "they're"),
    ("theyve", "they've"),
    ("thats", "that's"),
    ("whats", "what's"),
    ("heres", "here's"),
    ("theres", "there's"),
    ("lets", "let's"),
    ("im", "i'm"),
    ("ive", "i've"),
];

const MISSPELLINGS: &[(&str, &str)] = &[
    ("teh", "the"),
    ("recieve", "receive"),
    ("seperate", "separate"),
    ("definately", "definitely"),
    ("occured", "occurred"),
    ("untill", "until"),
    ("wich", "which"),
    ("becuase", "because"),
    ("beleive", "believe"),
    ("alot", "a lot"),
    ("adress", "address"),
    ("enviroment", "environment"),
    ("neccessary", "necessary"),
    ("accomodate", "accommodate"),
    ("tommorow", "tomorrow"),
    ("existance", "existence"),
    ("langauge", "language"),
    ("recomend", "recommend"),
];

fn build_table(pairs: &[(&'static str, &'static str)]) -> Vec<(Regex, &'static str)> {
    pairs
        .iter()
        .map(|(wrong, right)| (Regex::new(&format!(r"(?i)\b{}\b", wrong)).unwrap(), *right))
        .collect()
}

static CONTRACTION_TABLE: Lazy<Vec<(Regex, &'static str)>> =
    Lazy::new(|| build_table(CONTRACTIONS));
static MISSPELLING_TABLE: Lazy<Vec<(Regex, &'static str)>> =
    Lazy::new(|| build_table(MISSPELLINGS));

/// Replace preserving the casing of the matched word's first letter.
fn apply_table(text: &str, table: &[(Regex, &'static str)]) -> String {
    let mut current = text.to_string();
    for (re, right) in table {
        current = re
            .replace_all(&current, |caps: &Captures<'_>| {
                let matched = &caps[0];
                if matched.chars().next().map_or(false, |c| c.is_uppercase()) {
                    capitalize_first(right)
                } else {
                    (*right).to_string()
                }
            })
            .into_owned();
    }
    current
}

fn fix_contractions(text: &str) -> Applied {
    let fixed = apply_table(text, &CONTRACTION_TABLE);
    // "i'm" / "i've" always carry a capital I.
    let fixed = fixed.replace("i'm", "I'm").replace("i've", "I've");
    Applied::from_rewrite(text, fixed)
}

fn fix_spelling(text: &str) -> Applied {
    Applied::from_rewrite(text, apply_table(text, &MISSPELLING_TABLE))
}

/// Short words that repeat legitimately.
const LEGITIMATE_REPEATS: &[&str] = &["ha", "blah", "no", "so", "very", "really", "bye"];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z']+").unwrap());

/// Collapse an immediately repeated word ("the the") into one occurrence.
fn collapse_repeats(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            let mut result = line.to_string();
            loop {
                let mut removed = None;
                let mut prev: Option<(String, usize, usize)> = None;
                for m in WORD.find_iter(&result) {
                    let word = m.as_str().to_lowercase();
                    if let Some((prev_word, _, prev_end)) = &prev {
                        let gap = &result[*prev_end..m.start()];
                        if *prev_word == word
                            && gap.chars().all(|c| c == ' ')
                            && !gap.is_empty()
                            && !LEGITIMATE_REPEATS.contains(&word.as_str())
                        {
                            removed = Some((*prev_end, m.end()));
                            break;
                        }
                    }
                    prev = Some((word, m.start(), m.end()));
                }
                match removed {
                    Some((start, end)) => result.replace_range(start..end, ""),
                    None => break,
                }
            }
            result
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

static DOUBLE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\S)  +").unwrap());
static MISSING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z]{2,})([.!?,;])([A-Z][a-z])").unwrap());

/// Collapse double spaces and restore the space after sentence punctuation,
/// leaving URLs, abbreviations and ellipses alone.
fn fix_spacing(text: &str) -> Applied {
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            if is_fence_line(line) || is_table_row(line) {
                return line.to_string();
            }
            let mut fixed =
                DOUBLE_SPACE.replace_all(line, |caps: &Captures<'_>| format!("{} ", &caps[1])).into_owned();
            if !line.contains("http") && !line.contains("www.") && !line.contains('@') {
                fixed = MISSING_SPACE
                    .replace_all(&fixed, |caps: &Captures<'_>| {
                        format!("{}{} {}", &caps[1], &caps[2], &caps[3])
                    })
                    .into_owned();
            }
            fixed
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

/// Words that open code snippets; capitalizing them would corrupt commands.
const CODE_KEYWORDS: &[&str] = &[
    "let", "const", "var", "def", "import", "return", "if", "for", "while", "function", "class",
    "print", "echo", "cd", "git", "npm", "cargo", "python", "pip", "curl", "sudo", "docker",
    "make", "ls", "mkdir",
];

static LIST_ITEM_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*(?:-|\d+\.)\s+)([a-z][a-z']*)\b").unwrap());
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?]\s+)([a-z][a-z']*)\b").unwrap());
static STANDALONE_I: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[\s(])i([\s,.!?;)]|$)").unwrap());

fn is_code_keyword(word: &str) -> bool {
    CODE_KEYWORDS.contains(&word)
}

/// Whether the line at `i` opens a sentence: it starts the document, or the
/// previous line is blank, structural, or ends a sentence. Soft-wrapped
/// continuation lines fail this and keep their casing.
fn opens_sentence(lines: &[&str], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    let prev = lines[i - 1].trim_end();
    prev.is_empty() || is_structural_line(prev) || prev.ends_with(['.', '!', '?', ':'])
}

/// Capitalize list items, sentence openers, paragraph-leading letters and
/// the standalone pronoun "i".
fn fix_capitalization(text: &str) -> Applied {
    let lines: Vec<&str> = text.split('\n').collect();
    let out: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if is_fence_line(line) || is_header_line(line) {
                return (*line).to_string();
            }
            let fixed = map_outside_code_spans(line, |part| {
                let mut p = STANDALONE_I
                    .replace_all(part, |caps: &Captures<'_>| format!("{}I{}", &caps[1], &caps[2]))
                    .into_owned();
                p = LIST_ITEM_START
                    .replace(&p, |caps: &Captures<'_>| {
                        if is_code_keyword(&caps[2]) {
                            caps[0].to_string()
                        } else {
                            format!("{}{}", &caps[1], capitalize_first(&caps[2]))
                        }
                    })
                    .into_owned();
                p = SENTENCE_START
                    .replace_all(&p, |caps: &Captures<'_>| {
                        if is_code_keyword(&caps[2]) {
                            caps[0].to_string()
                        } else {
                            format!("{}{}", &caps[1], capitalize_first(&caps[2]))
                        }
                    })
                    .into_owned();
                p
            });
            // A prose line opening with a lowercase letter gets the same
            // treatment as a sentence start, but only when it actually
            // starts one.
            let first_word: String =
                fixed.chars().take_while(|c| c.is_alphanumeric() || *c == '\'').collect();
            if opens_sentence(&lines, i)
                && fixed.chars().next().map_or(false, |c| c.is_lowercase())
                && !first_word.is_empty()
                && !is_code_keyword(&first_word)
            {
                capitalize_first(&fixed)
            } else {
                fixed
            }
        })
        .collect();
    Applied::from_rewrite(text, out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contractions() {
        let out = fix_contractions("Dont worry, it doesnt matter and im fine.");
        assert_eq!(out.text, "Don't worry, it doesn't matter and I'm fine.");
    }

    #[test]
    fn test_contraction_word_boundary() {
        // "wontons" must not become "won'tons".
        assert!(!fix_contractions("We ate wontons.").applied);
    }

    #[test]
    fn test_repeated_word_collapse() {
        let out = collapse_repeats("This is is the the test.");
        assert_eq!(out.text, "This is the test.");
    }

    #[test]
    fn test_legitimate_repeats_kept() {
        assert!(!collapse_repeats("That was very very funny, ha ha.").applied);
    }

    #[test]
    fn test_spacing_fixes() {
        let out = fix_spacing("Too  many spaces.And no gap here.");
        assert_eq!(out.text, "Too many spaces. And no gap here.");
    }

    #[test]
    fn test_spacing_leaves_urls() {
        assert!(!fix_spacing("See https://example.com/a.Bad?x=1 now").applied);
    }

    #[test]
    fn test_capitalization() {
        let out = fix_capitalization("- first item\nthe sentence starts. another follows.");
        assert_eq!(out.text, "- First item\nThe sentence starts. Another follows.");
    }

    #[test]
    fn test_code_keywords_not_capitalized() {
        assert!(!fix_capitalization("- git commit everything").applied);
    }

    #[test]
    fn test_continuation_lines_keep_their_casing() {
        let text = "The cat walked across the yard and then\nsat down near the fence for a while.";
        assert!(!fix_capitalization(text).applied);
    }

    #[test]
    fn test_line_after_sentence_end_capitalized() {
        let out = fix_capitalization("The first sentence ends here.\nthe next one starts fresh.");
        assert!(out.text.contains("\nThe next one starts fresh."));
    }

    #[test]
    fn test_standalone_i() {
        let out = fix_capitalization("well, i think i agree.");
        assert_eq!(out.text, "Well, I think I agree.");
    }

    #[test]
    fn test_spelling() {
        let out = fix_spelling("Teh system will recieve a seperate update.");
        assert_eq!(out.text, "The system will receive a separate update.");
    }
}
