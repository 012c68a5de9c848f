//! Lexeme-to-AST parsing.
//!
//! [`Parser`] pulls lexemes one at a time, buffers them until a statement
//! is complete, and yields one [`Node`] per statement. Malformed input is
//! reported through [`Node::Error`] nodes embedded where the missing or
//! unexpected construct was; the iterator itself never fails.

use std::fmt;
use std::iter::Peekable;

use tracing::debug;

use crate::ast::Node;
use crate::lexeme::{Classifier, Lexeme};
use crate::lexer::{LexError, LexErrorKind, Scanner};
use crate::token::Span;

pub mod boundary;
mod expr;
mod postfix;
pub mod precedence;
mod stmt;

use boundary::{Boundary, Offer};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A scan error inside the statement.
    Scan(LexErrorKind),
    /// Opening delimiter without a matching close.
    Unclosed { delimiter: String },
    /// A required piece of syntax is missing.
    Expected {
        expected: &'static str,
        found: Option<String>,
    },
    /// Binary operator without a right-hand side.
    MissingOperand { operator: String },
    /// `?` without its `:`.
    MissingTernaryColon,
    /// Ternary branch with nothing in it.
    EmptyBranch,
    /// Lexeme where no production applies.
    Unexpected { found: String },
    /// Input ended where an expression was required.
    UnexpectedEnd,
    /// `elsif`, `else`, `catch` or `finally` with nothing to attach to.
    Dangling { keyword: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan(kind) => write!(f, "{kind}"),
            Self::Unclosed { delimiter } => {
                write!(f, "unclosed '{delimiter}'")
            }
            Self::Expected {
                expected,
                found: None,
            } => write!(f, "expected {expected}"),
            Self::Expected {
                expected,
                found: Some(t),
            } => write!(f, "expected {expected}, got '{t}'"),
            Self::MissingOperand { operator } => {
                write!(f, "missing right operand for '{operator}'")
            }
            Self::MissingTernaryColon => write!(f, "missing ':' in ternary"),
            Self::EmptyBranch => write!(f, "empty ternary branch"),
            Self::Unexpected { found } => write!(f, "unexpected '{found}'"),
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::Dangling { keyword } => {
                write!(f, "'{keyword}' without a preceding block")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self {
            kind: ParseErrorKind::Scan(error.kind),
            span: error.span,
        }
    }
}

/// Parse a whole source string, keeping every statement.
#[must_use]
pub fn parse(input: &str) -> Vec<Node> {
    Parser::new(Classifier::new(Scanner::new(input.chars()))).collect()
}

/// Streaming statement parser.
///
/// Holds at most one in-flight statement. Dropping it stops the upstream
/// scanner as well.
pub struct Parser<I>
where
    I: Iterator<Item = Result<Lexeme, LexError>>,
{
    lexemes: Peekable<I>,
    buffer: Vec<Lexeme>,
    scan_error: Option<LexError>,
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Lexeme, LexError>>,
{
    pub fn new(lexemes: I) -> Self {
        Self {
            lexemes: lexemes.peekable(),
            buffer: Vec::new(),
            scan_error: None,
        }
    }

    /// Pull lexemes into the buffer until the statement is complete or
    /// the input runs out.
    fn fill(&mut self) {
        let mut boundary = Boundary::default();
        loop {
            let offer = match self.lexemes.peek() {
                None => return,
                Some(Err(_)) => None,
                Some(Ok(lexeme)) => Some(boundary.offer(lexeme)),
            };
            match offer {
                None => {
                    if let Some(Err(error)) = self.lexemes.next() {
                        debug!(%error, "scan error inside statement");
                        self.scan_error.get_or_insert(error);
                    }
                }
                Some(Offer::EndBefore) => return,
                Some(offer) => {
                    if let Some(Ok(lexeme)) = self.lexemes.next() {
                        self.buffer.push(lexeme);
                    }
                    if offer == Offer::TakeAndEnd {
                        return;
                    }
                }
            }
        }
    }
}

impl<I> Iterator for Parser<I>
where
    I: Iterator<Item = Result<Lexeme, LexError>>,
{
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            self.fill();
            let span = std::mem::take(&mut self.buffer);
            if let Some(error) = self.scan_error.take() {
                debug!(lexemes = span.len(), "emitting statement as scan error");
                return Some(Node::Error(error.into()));
            }
            if span.is_empty() {
                return None;
            }
            if let Some(node) = stmt::parse_statement(&span) {
                debug!(kind = node.kind_name(), lexemes = span.len(), "statement");
                return Some(node);
            }
        }
    }
}
