#![allow(dead_code)]

use perlish_rs::{Node, ParseErrorKind, parse, sexp};

/// Parse `input`, asserting it holds exactly one statement.
pub fn one(input: &str) -> Node {
    let mut nodes = parse(input);
    assert_eq!(
        nodes.len(),
        1,
        "expected one statement\n--- input ---\n{input}\n--- got ---\n{nodes:#?}"
    );
    nodes.remove(0)
}

/// Compact rendering of every statement in `input`.
pub fn render(input: &str) -> Vec<String> {
    parse(input).iter().map(sexp).collect()
}

/// Compact rendering of the single statement in `input`.
pub fn render_one(input: &str) -> String {
    sexp(&one(input))
}

/// Parse `input` and assert no statement holds an error node.
pub fn assert_clean(input: &str) -> Vec<Node> {
    let nodes = parse(input);
    for node in &nodes {
        let errors = node.errors();
        assert!(
            errors.is_empty(),
            "unexpected errors {errors:?}\n--- input ---\n{input}\n--- statement ---\n{}",
            sexp(node)
        );
    }
    nodes
}

/// Kinds of every error node, across all statements, in source order.
pub fn error_kinds(input: &str) -> Vec<ParseErrorKind> {
    parse(input)
        .iter()
        .flat_map(|node| {
            node.errors()
                .into_iter()
                .map(|e| e.kind.clone())
                .collect::<Vec<_>>()
        })
        .collect()
}
