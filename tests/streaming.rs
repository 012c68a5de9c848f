//! Streaming behaviour of the statement iterator.

use std::cell::Cell;

use perlish_rs::{Node, parse, sexp, statements};
use pretty_assertions::assert_eq;

#[test]
fn stream_unbounded_input() {
    let nodes: Vec<Node> = statements("$x++;\n".chars().cycle()).take(3).collect();
    assert_eq!(nodes.len(), 3);
    assert!(nodes.iter().all(|n| sexp(n) == "(post++ $x)"));
}

#[test]
fn stream_reads_only_what_it_needs() {
    let read = Cell::new(0usize);
    let tail = " ".repeat(4096);
    let source = format!("first();{tail}second();");
    let mut stream = statements(source.chars().inspect(|_| read.set(read.get() + 1)));

    assert_eq!(stream.next(), Some(Node::call("first", vec![])));
    assert!(read.get() < 64, "read {} characters", read.get());
    assert_eq!(stream.next(), Some(Node::call("second", vec![])));
    assert_eq!(stream.next(), None);
}

#[test]
fn stream_matches_whole_string_parse() {
    let source = "use strict;\n\
                  my %seen;\n\
                  for my $w (@words) { next if $seen{$w}++; print \"$w\\n\"; }\n\
                  if ($x) { a(); } elsif ($y) { b(); } else { c(); }\n\
                  try { risky(); } catch ($e) { warn $e; }\n\
                  $total = $a ? $b : $c\n";
    let streamed: Vec<Node> = statements(source.chars()).collect();
    assert_eq!(streamed, parse(source));
    assert_eq!(streamed.len(), 6);
}

#[test]
fn stream_chunked_source() {
    let chunks = ["if ($ready) ", "{ go(); }\n", "else { wait", "(); }\nlast;"];
    let nodes: Vec<Node> = statements(chunks.iter().flat_map(|c| c.chars())).collect();
    let kinds: Vec<_> = nodes.iter().map(Node::kind_name).collect();
    assert_eq!(kinds, ["If", "Last"]);
}

#[test]
fn stream_if_at_end_of_input() {
    let nodes: Vec<Node> = statements("if ($x) { 1; }".chars()).collect();
    assert_eq!(nodes.len(), 1);
    assert_eq!(sexp(&nodes[0]), "(if $x (block 1))");
}

#[test]
fn stream_survives_errors() {
    let nodes: Vec<Node> = statements("1 +;\n`;\n2;".chars()).collect();
    let kinds: Vec<_> = nodes.iter().map(Node::kind_name).collect();
    assert_eq!(kinds, ["BinaryOp", "Error", "Number"]);
    assert!(!nodes[0].errors().is_empty());
}

#[test]
fn stream_stops_at_end_marker() {
    let nodes: Vec<Node> = statements("ok();\n__END__\nthis is not code {".chars()).collect();
    assert_eq!(nodes, [Node::call("ok", vec![])]);
}
