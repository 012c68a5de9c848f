//! Statement parsing through the public API.

mod common;

use common::{assert_clean, one, render, render_one};
use perlish_rs::{Node, parse};
use pretty_assertions::assert_eq;

// -----------------------------------------------------------
// Declarations and simple statements.
// -----------------------------------------------------------

#[test]
fn parse_declarations() {
    assert_eq!(render_one("my $x;"), "(my $x)");
    assert_eq!(render_one("our $VERSION = '1.0';"), "(our $VERSION '1.0')");
    assert_eq!(render_one("my ($a, $b) = @_;"), "(my ($a $b) @_)");
    assert_eq!(render_one("local $_ = shift;"), "(local $_ (call shift))");
}

#[test]
fn parse_declaration_with_compound_assignment_is_not_folded() {
    assert_eq!(render_one("my $n += 1;"), "(+= (my $n) 1)");
}

#[test]
fn parse_hash_and_array_initializers() {
    assert_eq!(
        render_one("my %h = (a => 1, b => [1, 2]);"),
        "(my %h (list 'a' 1 'b' (array 1 2)))"
    );
    assert_eq!(render_one("my $r = { a => 1 };"), "(my $r (hash 'a' 1))");
    assert_eq!(render_one("my @w = qw(x y);"), "(my @w (list 'x' 'y'))");
}

#[test]
fn parse_statement_sequence() {
    assert_eq!(
        render("my $x = 1;\n$x++;\nprint $x;\n"),
        ["(my $x 1)", "(post++ $x)", "(print $x)"]
    );
}

#[test]
fn parse_statement_without_final_terminator() {
    assert_eq!(render("foo(); bar()"), ["(call foo)", "(call bar)"]);
}

#[test]
fn parse_empty_statements_produce_nothing() {
    assert!(parse(";;\n;").is_empty());
    assert!(parse("").is_empty());
    assert_eq!(render(";; 1;"), ["1"]);
}

// -----------------------------------------------------------
// Postfix modifiers.
// -----------------------------------------------------------

#[test]
fn parse_postfix_if_returns() {
    assert_eq!(
        render_one("return 0 if $n == 0;"),
        "(if (== $n 0) (block (return 0)))"
    );
}

#[test]
fn parse_postfix_if_matches_block_form() {
    assert_eq!(one("print 'hi' if $ok;"), one("if ($ok) { print 'hi'; }"));
    assert_eq!(
        one("warn 'x' unless $quiet;"),
        one("unless ($quiet) { warn 'x'; }")
    );
}

#[test]
fn parse_postfix_loops() {
    assert_eq!(render_one("$i++ while $i < 10;"), "(while (< $i 10) (block (post++ $i)))");
    assert_eq!(render_one("sleep 1 until $ready;"), "(until $ready (block (call sleep 1)))");
    assert_eq!(render_one("say for @list;"), "(foreach @list (block (say)))");
}

#[test]
fn parse_modifier_inside_parens_is_not_split() {
    assert_eq!(render_one("foo(1) if ($x);"), "(if $x (block (call foo 1)))");
}

#[test]
fn parse_postfix_modifier_after_leading_group() {
    assert_eq!(
        render_one("($a, $b) = (1, 2) if $x;"),
        "(if $x (block (= (list $a $b) (list 1 2))))"
    );
    assert_eq!(
        render_one("[1, 2]->[0] unless $x;"),
        "(unless $x (block ([] (array 1 2) 0)))"
    );
}

// -----------------------------------------------------------
// Conditionals and loops.
// -----------------------------------------------------------

#[test]
fn parse_if_elsif_else_is_one_statement() {
    let nodes = parse(
        "if ($a) { 1; }\nelsif ($b) { 2; }\nelsif ($c) { 3; }\nelse { 4; }\nprint 'done';",
    );
    assert_eq!(nodes.len(), 2);
    let Node::If {
        elsif, else_block, ..
    } = &nodes[0]
    else {
        panic!("expected if, got {:?}", nodes[0]);
    };
    assert_eq!(elsif.len(), 2);
    assert_eq!(else_block.as_deref(), Some(&[Node::number("4")][..]));
}

#[test]
fn parse_if_chain_renders() {
    assert_eq!(
        render_one("if ($x > 0) { pos(); } elsif ($x < 0) { neg(); } else { zero(); }"),
        "(if (> $x 0) (block (call pos)) (elsif (< $x 0) (block (call neg))) (else (block (call zero))))"
    );
}

#[test]
fn parse_unless_else() {
    assert_eq!(
        render_one("unless ($ok) { fail(); } else { pass(); }"),
        "(unless $ok (block (call fail)) (else (block (call pass))))"
    );
}

#[test]
fn parse_while_and_until() {
    assert_eq!(render_one("while ($i < 10) { $i++; }"), "(while (< $i 10) (block (post++ $i)))");
    assert_eq!(render_one("until ($done) { step(); }"), "(until $done (block (call step)))");
}

#[test]
fn parse_foreach_forms() {
    assert_eq!(
        render_one("foreach my $item (@items) { print $item; }"),
        "(foreach (my $item) @items (block (print $item)))"
    );
    assert_eq!(render_one("for (@items) { print; }"), "(foreach @items (block (print)))");
    assert_eq!(render_one("for $x (1, 2) { }"), "(foreach $x (list 1 2) (block))");
}

#[test]
fn parse_c_style_for() {
    assert_eq!(
        render_one("for (my $i = 0; $i < 10; $i++) { next if $i % 2; }"),
        "(for (my $i 0) (< $i 10) (post++ $i) (block (if (% $i 2) (block (next)))))"
    );
    assert_eq!(render_one("for (;;) { last; }"), "(for _ _ _ (block (last)))");
}

#[test]
fn parse_labelled_loops() {
    assert_eq!(
        render_one("OUTER: for my $i (1..3) { next OUTER if $i == 2; }"),
        "(foreach OUTER: (my $i) (.. 1 3) (block (if (== $i 2) (block (next OUTER)))))"
    );
    assert_eq!(
        render_one("LINE: while ($more) { last LINE; }"),
        "(while LINE: $more (block (last LINE)))"
    );
}

#[test]
fn parse_bare_block_and_do_block() {
    assert_eq!(render_one("{ local $x = 1; }"), "(block (local $x 1))");
    assert_eq!(render_one("my $v = do { 1; };"), "(my $v (do (block 1)))");
}

// -----------------------------------------------------------
// Subroutines, packages and modules.
// -----------------------------------------------------------

#[test]
fn parse_named_sub_with_signature() {
    assert_eq!(
        render_one("sub add($x, $y = 10) { return $x + $y; }"),
        "(sub add (params $x (param $y 10)) (block (return (+ $x $y))))"
    );
}

#[test]
fn parse_sub_forward_declaration() {
    assert_eq!(render_one("sub later;"), "(sub later (block))");
}

#[test]
fn parse_anonymous_sub() {
    assert_eq!(render_one("my $cb = sub { 1 };"), "(my $cb (sub (block 1)))");
}

#[test]
fn parse_anonymous_sub_called_in_place() {
    assert_eq!(
        render("sub { 1 }->();\nok();"),
        ["(->() (sub (block 1)))", "(call ok)"]
    );
}

#[test]
fn parse_return_list() {
    assert_eq!(render_one("return (1, 2);"), "(return (list 1 2))");
    assert_eq!(render_one("return 1, 2;"), "(return (list 1 2))");
    assert_eq!(render_one("return;"), "(return)");
}

#[test]
fn parse_special_blocks() {
    assert_eq!(render_one("BEGIN { init(); }"), "(sub BEGIN (block (call init)))");
    assert_eq!(render_one("END { done(); }"), "(sub END (block (call done)))");
}

#[test]
fn parse_package_forms() {
    assert_eq!(render_one("package Foo::Bar 1.02;"), "(package Foo::Bar 1.02)");
    assert_eq!(
        render_one("package Foo { sub x { } }"),
        "(package Foo (block (sub x (block))))"
    );
}

#[test]
fn parse_use_forms() {
    assert_eq!(render_one("use strict;"), "(use strict)");
    assert_eq!(render_one("use v5.36;"), "(use v5.36)");
    assert_eq!(
        render_one("use List::Util qw(max min);"),
        "(use List::Util 'max' 'min')"
    );
    assert_eq!(render_one("use Carp 1.50 'croak';"), "(use Carp 1.50 'croak')");
    assert_eq!(render_one("no warnings 'once';"), "(no warnings 'once')");
}

#[test]
fn parse_require() {
    assert_eq!(render_one("require Foo::Bar;"), "(require Foo::Bar)");
    assert_eq!(render_one("require 'lib.pl';"), "(require 'lib.pl')");
}

#[test]
fn parse_class_with_fields_and_methods() {
    let input = "class Point 1.0 :isa(Shape) {\n  field $x :param = 0;\n  method norm { return $x; }\n}";
    assert_eq!(
        render_one(input),
        "(class Point (version 1.0) (isa Shape) \
         (block (field $x (attrs param) 0) (method norm (block (return $x)))))"
    );
}

#[test]
fn parse_field_attribute_arguments() {
    assert_eq!(
        render_one("field @items :reader(get_items);"),
        "(field @items (attrs reader(get_items)))"
    );
}

// -----------------------------------------------------------
// Exceptions and topicalizers.
// -----------------------------------------------------------

#[test]
fn parse_try_catch_finally() {
    assert_eq!(
        render_one("try { risky(); } catch ($e) { warn $e; } finally { cleanup(); }"),
        "(try (block (call risky)) (catch $e (block (warn $e))) (finally (block (call cleanup))))"
    );
}

#[test]
fn parse_try_followed_by_statement() {
    assert_eq!(
        render("try { a(); } catch ($e) { }\nb();"),
        ["(try (block (call a)) (catch $e (block)))", "(call b)"]
    );
}

#[test]
fn parse_given_when_default() {
    assert_eq!(
        render_one("given ($x) { when (1) { say 'one'; } default { say 'other'; } }"),
        "(given $x (block (when 1 (block (say 'one'))) (default (block (say 'other')))))"
    );
}

// -----------------------------------------------------------
// Output builtins.
// -----------------------------------------------------------

#[test]
fn parse_print_filehandles() {
    assert_eq!(render_one(r#"print STDERR "oops\n";"#), r#"(print (fh STDERR) "oops\n")"#);
    assert_eq!(render_one("print {$out} 'x';"), "(print (fh $out) 'x')");
    assert_eq!(render_one("print $fh $line;"), "(print (fh $fh) $line)");
    assert_eq!(render_one("print $a, $b;"), "(print $a $b)");
}

#[test]
fn parse_print_called_like_a_function() {
    assert_eq!(render_one("print('a', 'b');"), "(call print 'a' 'b')");
}

#[test]
fn parse_die_and_warn() {
    assert_eq!(
        render_one("open(my $fh, '<', $path) or die \"no: $!\";"),
        "(or (call open (my $fh) '<' $path) (die \"no: $!\"))"
    );
    assert_eq!(render_one("warn('careful');"), "(warn 'careful')");
}

// -----------------------------------------------------------
// A realistic program.
// -----------------------------------------------------------

#[test]
fn parse_small_program_cleanly() {
    let source = r#"
use strict;
use warnings;

# Count words per line.
my %count;
while (my $line = shift @lines) {
    chomp $line;
    next unless length $line;
    for my $word (split /\s+/, $line) {
        $count{lc $word}++;
    }
}

foreach my $word (sort { $count{$b} <=> $count{$a} } keys %count) {
    printf "%-20s %d\n", $word, $count{$word};
}
"#;
    let nodes = assert_clean(source);
    let kinds: Vec<_> = nodes.iter().map(Node::kind_name).collect();
    assert_eq!(kinds, ["Use", "Use", "Declaration", "While", "Foreach"]);
}
