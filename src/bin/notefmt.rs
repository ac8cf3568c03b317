//! Command-line interface for notefmt
//! Formats a plain-text note into Markdown and prints it to stdout (or
//! rewrites the file in place with --write).
//!
//! Usage:
//!   notefmt [path]                 - Format a file (stdin when omitted)
//!   notefmt [path] --rules r.json  - Apply custom regex rules first
//!   notefmt [path] --write         - Rewrite the file in place
//!   notefmt [path] --label        - Print the format label to stderr

use clap::{Arg, ArgAction, Command};
use std::fs;
use std::io::Read;
use std::process;

use notefmt::{format, CustomRule};

fn main() {
    env_logger::init();

    let matches = Command::new("notefmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Deterministic plain-text to Markdown formatter")
        .arg(Arg::new("path").help("Path to the text file to format (stdin when omitted)").index(1))
        .arg(
            Arg::new("rules")
                .long("rules")
                .short('r')
                .help("JSON file containing an array of custom regex rules"),
        )
        .arg(
            Arg::new("write")
                .long("write")
                .short('w')
                .action(ArgAction::SetTrue)
                .help("Rewrite the input file in place (requires a path)"),
        )
        .arg(
            Arg::new("label")
                .long("label")
                .short('l')
                .action(ArgAction::SetTrue)
                .help("Print the format label to stderr"),
        )
        .get_matches();

    let path = matches.get_one::<String>("path");
    let input = match read_input(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let rules = match matches.get_one::<String>("rules") {
        Some(rules_path) => match load_rules(rules_path) {
            Ok(rules) => rules,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Vec::new(),
    };

    let result = format(&input, &rules);

    if matches.get_flag("label") {
        eprintln!("{}", result.format_type);
    }

    if matches.get_flag("write") {
        let Some(path) = path else {
            eprintln!("Error: --write requires a file path");
            process::exit(1);
        };
        if let Err(e) = fs::write(path, &result.formatted) {
            eprintln!("Error: failed to write {}: {}", path, e);
            process::exit(1);
        }
    } else {
        println!("{}", result.formatted);
    }
}

fn read_input(path: Option<&String>) -> Result<String, String> {
    match path {
        Some(p) => fs::read_to_string(p).map_err(|e| format!("failed to read {}: {}", p, e)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

fn load_rules(path: &str) -> Result<Vec<CustomRule>, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path, e))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid rules file {}: {}", path, e))
}
