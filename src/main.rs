//! CLI tool to parse and check Perl-style source files.

use std::fs;
use std::process::ExitCode;

use perlish_rs::{Classifier, Scanner, formatter, statements};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a log subscriber when `RUST_LOG` is set; stay silent otherwise.
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(EnvFilter::from_default_env())
        .init();
}

/// Print every statement as an indented tree. Returns whether any
/// statement held an error.
fn run_parse(content: &str) -> bool {
    let mut had_error = false;
    for node in statements(content.chars()) {
        had_error |= !node.errors().is_empty();
        println!("{}", formatter::pretty(&node));
    }
    had_error
}

/// List every error node with its position.
fn run_check(path: &str, content: &str) -> bool {
    let mut count = 0usize;
    let mut total = 0usize;
    for node in statements(content.chars()) {
        total += 1;
        for error in node.errors() {
            count += 1;
            eprintln!("{path}:{}: {}", error.span, error.kind);
        }
    }
    if count == 0 {
        eprintln!("{path}: ok ({total} statement(s))");
    }
    count > 0
}

/// Dump the lexeme stream, one lexeme per line.
fn run_tokens(path: &str, content: &str) -> bool {
    let mut had_error = false;
    for item in Classifier::new(Scanner::new(content.chars())) {
        match item {
            Ok(lexeme) => {
                println!("{}\t{:?}\t{}", lexeme.span(), lexeme.category, lexeme.text());
            }
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
            }
        }
    }
    had_error
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: perlish <command> [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  parse   Print the syntax tree of each statement");
        eprintln!("  check   Report syntax errors with their positions");
        eprintln!("  tokens  Print the classified lexeme stream");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  perlish parse script.pl");
        eprintln!("  RUST_LOG=debug perlish check lib/*.pm");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let files = &args[2..];

    if !matches!(command, "parse" | "check" | "tokens") {
        eprintln!("Unknown command: {command}");
        return ExitCode::from(2);
    }
    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    init_tracing();

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        had_error |= match command {
            "parse" => run_parse(&content),
            "check" => run_check(path, &content),
            _ => run_tokens(path, &content),
        };
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
