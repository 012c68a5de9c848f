//! Streaming scanner and parser for Perl-style source.
//!
//! Source text flows through three lazy stages: the [`Scanner`] turns
//! characters into tokens, the [`Classifier`] tags each token with a
//! [`Category`], and the [`Parser`] buffers one statement at a time and
//! yields it as a [`Node`]. Syntax errors never abort parsing; they are
//! embedded in the tree as [`Node::Error`] and parsing resumes at the
//! next statement.
//!
//! # Quick start
//!
//! ## Parse statements one at a time
//!
//! ```
//! use perlish_rs::{statements, sexp};
//!
//! let rendered: Vec<String> = statements("my $x = 1 + 2 * 3; print $x;".chars())
//!     .map(|node| sexp(&node))
//!     .collect();
//! assert_eq!(rendered, ["(my $x (+ 1 (* 2 3)))", "(print $x)"]);
//! ```
//!
//! ## Reject any malformed input
//!
//! ```
//! use perlish_rs::{Error, parse_str};
//!
//! assert!(parse_str("if ($x) { y(); }").is_ok());
//! assert!(matches!(parse_str("my $x = ;"), Err(Error::Parse(_))));
//! assert!(matches!(parse_str("print \"open"), Err(Error::Lex(_))));
//! ```
//!
//! ## Build expected trees
//!
//! ```
//! use perlish_rs::{Node, parse};
//!
//! let expected = Node::if_then(Node::scalar("ok"), vec![Node::call("done", vec![])]);
//! assert_eq!(parse("done() if $ok;"), [expected]);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod depth;
pub mod formatter;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Block, CatchClause, ElsifClause, Node};
pub use formatter::{format, pretty, sexp};
pub use lexeme::{Category, Classifier, Lexeme};
pub use lexer::{LexError, LexErrorKind, Scanner, tokenize};
pub use parser::{ParseError, ParseErrorKind, Parser, parse};
pub use token::{Sigil, Span, Token, TokenKind};

/// Unified error type covering both scanning and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A scanner error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// The first error node of a parsed statement.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Lazily parse a character stream into statements.
///
/// Nothing is read until the first statement is requested, and each
/// statement is parsed as soon as its last lexeme arrives.
pub fn statements<I>(chars: I) -> Parser<Classifier<Scanner<I::IntoIter>>>
where
    I: IntoIterator<Item = char>,
{
    Parser::new(Classifier::new(Scanner::new(chars.into_iter())))
}

/// Scan and parse a whole source string, failing on the first error.
///
/// Scan errors are reported before any parsing happens. Otherwise the
/// first embedded [`Node::Error`], in source order, is returned.
pub fn parse_str(input: &str) -> Result<Vec<Node>, Error> {
    let tokens = tokenize(input)?;
    let lexemes = Classifier::new(tokens.into_iter().map(Ok::<_, LexError>));
    let nodes: Vec<Node> = Parser::new(lexemes).collect();
    if let Some(error) = nodes.iter().find_map(|node| node.errors().first().copied()) {
        return Err(error.clone().into());
    }
    Ok(nodes)
}
