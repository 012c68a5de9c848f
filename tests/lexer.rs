//! Scanner and classifier tests through the public API.

use perlish_rs::{
    Category, Classifier, LexErrorKind, Scanner, Sigil, Span, TokenKind, tokenize,
};
use pretty_assertions::assert_eq;

fn texts(input: &str) -> Vec<String> {
    tokenize(input)
        .expect("tokenize")
        .into_iter()
        .map(|t| t.text)
        .collect()
}

fn categories(input: &str) -> Vec<Category> {
    Classifier::new(Scanner::new(input.chars()))
        .map(|item| item.expect("lexeme").category)
        .collect()
}

// -----------------------------------------------------------
// Basic scanning.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    assert!(tokenize("").expect("tokenize").is_empty());
    assert!(tokenize("  \t\n\n # only a comment\n").expect("tokenize").is_empty());
}

#[test]
fn lex_statement_texts() {
    assert_eq!(
        texts("my @list = (1, 2) x 3;"),
        ["my", "@list", "=", "(", "1", ",", "2", ")", "x", "3", ";"]
    );
}

#[test]
fn lex_numbers() {
    assert_eq!(texts("0x1F 0b101 1_000 3.14 1e10"), ["0x1F", "0b101", "1_000", "3.14", "1e10"]);
    assert!(
        tokenize("0x1F 42")
            .expect("tokenize")
            .iter()
            .all(|t| t.kind == TokenKind::Number)
    );
}

#[test]
fn lex_fat_comma_and_arrow() {
    let kinds: Vec<_> = tokenize("a => $r->[0]")
        .expect("tokenize")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds[1], TokenKind::FatComma);
    assert_eq!(kinds[3], TokenKind::Arrow);
}

#[test]
fn lex_special_variables() {
    assert_eq!(texts("$_ @_ $0 $1 $@ $! $$"), ["$_", "@_", "$0", "$1", "$@", "$!", "$$"]);
}

#[test]
fn lex_array_length_variable() {
    let tokens = tokenize("$#list").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "$#list");
    assert_eq!(
        tokens[0].kind,
        TokenKind::Variable {
            sigil: Sigil::Scalar
        }
    );
}

#[test]
fn lex_last_index_of_expression() {
    let tokens = tokenize("$#{$r} $#$r").expect("tokenize");
    let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["$#", "{", "$r", "}", "$#", "$r"]);
    assert_eq!(tokens[0].kind, TokenKind::DerefSigil(Sigil::Scalar));
    assert_eq!(tokens[4].kind, TokenKind::DerefSigil(Sigil::Scalar));
}

#[test]
fn lex_leading_dot_fraction() {
    let tokens = tokenize("(.5, $a . 2)").expect("tokenize");
    assert_eq!(tokens[1].text, ".5");
    assert_eq!(tokens[1].kind, TokenKind::Number);
    assert_eq!(tokens[4].kind, TokenKind::Operator);
    assert_eq!(tokens[4].text, ".");
}

// -----------------------------------------------------------
// Quote-like literals.
// -----------------------------------------------------------

#[test]
fn lex_quote_operators() {
    let tokens = tokenize("q{it's} qq(a\\tb)").expect("tokenize");
    assert_eq!(tokens[0].text, "it's");
    assert_eq!(
        tokens[0].kind,
        TokenKind::String {
            interpolated: false
        }
    );
    assert_eq!(tokens[1].text, "a\tb");
    assert_eq!(
        tokens[1].kind,
        TokenKind::String { interpolated: true }
    );
}

#[test]
fn lex_regex_forms() {
    let tokens = tokenize("m{^a+}x qr/\\d+/i").expect("tokenize");
    assert_eq!(tokens[0].text, "^a+");
    assert_eq!(
        tokens[0].kind,
        TokenKind::Regex {
            flags: "x".to_string()
        }
    );
    assert_eq!(tokens[1].text, "\\d+");
}

#[test]
fn lex_regex_keeps_escaped_paired_delimiters() {
    let tokens = tokenize(r"m{a\{2\}} qr(\() m!a\!b!").expect("tokenize");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].text, r"a\{2\}");
    assert_eq!(tokens[1].text, r"\(");
    assert_eq!(tokens[2].text, "a!b");
}

#[test]
fn lex_quote_word_after_arrow_is_method() {
    let tokens = tokenize("$obj->q").expect("tokenize");
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].text, "q");
}

// -----------------------------------------------------------
// Slash and percent disambiguation.
// -----------------------------------------------------------

#[test]
fn lex_slash_at_statement_start_is_regex() {
    let tokens = tokenize("/foo/ and print;").expect("tokenize");
    assert!(matches!(tokens[0].kind, TokenKind::Regex { .. }));
}

#[test]
fn lex_slash_after_control_keyword_is_regex() {
    let tokens = tokenize("if /x/").expect("tokenize");
    assert!(matches!(tokens[1].kind, TokenKind::Regex { .. }));
}

#[test]
fn lex_slash_after_paren_value_is_division() {
    assert_eq!(texts("($a + $b) / 2"), ["(", "$a", "+", "$b", ")", "/", "2"]);
}

#[test]
fn lex_percent_after_operator_is_hash() {
    let tokens = tokenize("$n % 2 + keys %h").expect("tokenize");
    assert_eq!(tokens[1].kind, TokenKind::Operator);
    assert_eq!(tokens[5].kind, TokenKind::Variable { sigil: Sigil::Hash });
}

#[test]
fn lex_slash_after_nullary_builtin_is_division() {
    assert_eq!(texts("time / 60"), ["time", "/", "60"]);
    let tokens = tokenize("split /,/, $s").expect("tokenize");
    assert!(matches!(tokens[1].kind, TokenKind::Regex { .. }));
}

#[test]
fn lex_percent_after_block_is_hash() {
    let tokens = tokenize("if ($x) { f(); }\n%h = ();").expect("tokenize");
    assert_eq!(tokens[10].text, "%h");
    assert_eq!(tokens[10].kind, TokenKind::Variable { sigil: Sigil::Hash });

    let tokens = tokenize("map { $_ } %h").expect("tokenize");
    assert_eq!(tokens[4].kind, TokenKind::Variable { sigil: Sigil::Hash });
}

#[test]
fn lex_percent_after_subscript_is_modulus() {
    let tokens = tokenize("$h{a}{b} % 2").expect("tokenize");
    assert_eq!(tokens[7].kind, TokenKind::Operator);
    assert_eq!(tokens[7].text, "%");
}

// -----------------------------------------------------------
// Lexer errors.
// -----------------------------------------------------------

#[test]
fn lex_error_unterminated_string() {
    let err = tokenize("print \"never closed;").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(err.span, Span { line: 1, column: 7 });
}

#[test]
fn lex_error_unterminated_regex_and_qw() {
    let err = tokenize("$x =~ /abc").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::UnterminatedRegex);
    let err = tokenize("qw(a b").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::UnterminatedQuoteWords);
}

#[test]
fn lex_error_unexpected_character() {
    let err = tokenize("my $x = `ls`;").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('`'));
}

#[test]
fn lex_error_display_includes_location() {
    let err = tokenize("\n  'open").expect_err("should fail");
    assert_eq!(
        err.to_string(),
        "unterminated string literal at line 2, column 3"
    );
}

#[test]
fn scanner_keeps_going_after_an_error() {
    let items: Vec<_> = Scanner::new("`; 1;".chars()).collect();
    assert!(items[0].is_err());
    let rest: Vec<_> = items[1..]
        .iter()
        .map(|item| item.as_ref().expect("token").text.clone())
        .collect();
    assert_eq!(rest, [";", "1", ";"]);
}

// -----------------------------------------------------------
// Classification.
// -----------------------------------------------------------

#[test]
fn classify_statement() {
    assert_eq!(
        categories("my $x = defined $y ? 1 : 0;"),
        [
            Category::Declarator,
            Category::Variable,
            Category::BinaryOperator,
            Category::Builtin,
            Category::Variable,
            Category::Question,
            Category::Literal,
            Category::Colon,
            Category::Literal,
            Category::Terminator,
        ]
    );
}

#[test]
fn classify_brackets_and_keywords() {
    assert_eq!(
        categories("foreach (@a) { last }"),
        [
            Category::ControlKeyword,
            Category::LeftParen,
            Category::Variable,
            Category::RightParen,
            Category::LeftBrace,
            Category::Keyword,
            Category::RightBrace,
        ]
    );
}

#[test]
fn classify_booleans_and_word_operators() {
    assert_eq!(
        categories("true or not false"),
        [
            Category::Literal,
            Category::BinaryOperator,
            Category::UnaryOperator,
            Category::Literal,
        ]
    );
}

#[test]
fn classify_postfix_deref_sigil() {
    assert_eq!(
        categories("$r->%*"),
        [
            Category::Variable,
            Category::Arrow,
            Category::PostfixDerefSigil,
            Category::BinaryOperator,
        ]
    );
}

#[test]
fn classify_method_named_like_keyword() {
    assert_eq!(
        categories("$logger->warn"),
        [Category::Variable, Category::Arrow, Category::Identifier]
    );
}
