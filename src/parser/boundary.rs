//! Statement completion.
//!
//! A [`Boundary`] is fed lexemes in order and decides where the current
//! statement ends. The streaming loop and block bodies share it, so a
//! statement splits the same way at top level and inside a block.

use crate::depth::nesting_delta;
use crate::lexeme::{Category, Lexeme};

/// Decision for one offered lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Part of the statement; keep going.
    Take,
    /// Part of the statement, which is now complete.
    TakeAndEnd,
    /// Not part of the statement; it ended just before this lexeme.
    EndBefore,
}

/// Continuation keywords a closed block may be followed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chain {
    None,
    /// `if`/`unless`, continued by `elsif`/`else`.
    Conditional,
    /// `try`, continued by `catch`/`finally`.
    Try,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Head {
    /// Nothing seen yet.
    Unknown,
    /// A leading bare word: a label, `BEGIN`/`END`, or an expression.
    Word { special_block: bool },
    /// `sub`: a declaration when a name follows, else an anonymous sub
    /// inside an expression.
    Sub,
    /// Ends only at a depth-zero terminator.
    Simple,
    /// Also ends when its block closes at depth zero.
    BlockBearing(Chain),
}

/// Incremental statement-end detector.
#[derive(Debug, Clone)]
pub struct Boundary {
    head: Head,
    depth: isize,
    awaiting: bool,
    chain_closed: bool,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            head: Head::Unknown,
            depth: 0,
            awaiting: false,
            chain_closed: false,
        }
    }
}

fn head_of(lexeme: &Lexeme) -> Head {
    match (lexeme.category, lexeme.text()) {
        (Category::ControlKeyword, "if" | "unless" | "elsif" | "else") => {
            Head::BlockBearing(Chain::Conditional)
        }
        (Category::ControlKeyword, _) | (Category::LeftBrace, _) => Head::BlockBearing(Chain::None),
        (Category::Keyword, "try" | "catch" | "finally") => Head::BlockBearing(Chain::Try),
        (Category::Keyword, "sub") => Head::Sub,
        (
            Category::Keyword,
            "class" | "package" | "method" | "given" | "when" | "default" | "match"
            | "case",
        ) => Head::BlockBearing(Chain::None),
        (Category::Identifier, word) => Head::Word {
            special_block: matches!(word, "BEGIN" | "END"),
        },
        _ => Head::Simple,
    }
}

/// Whether `lexeme` continues a chain whose last block just closed.
fn continues(chain: Chain, lexeme: &Lexeme) -> bool {
    match chain {
        Chain::None => false,
        Chain::Conditional => {
            lexeme.category == Category::ControlKeyword && matches!(lexeme.text(), "elsif" | "else")
        }
        Chain::Try => {
            lexeme.category == Category::Keyword && matches!(lexeme.text(), "catch" | "finally")
        }
    }
}

impl Boundary {
    /// Offer the next lexeme to the statement being collected.
    pub fn offer(&mut self, lexeme: &Lexeme) -> Offer {
        if self.awaiting {
            self.awaiting = false;
            let Head::BlockBearing(chain) = self.head else {
                return Offer::EndBefore;
            };
            if !continues(chain, lexeme) {
                return Offer::EndBefore;
            }
            if matches!(lexeme.text(), "else" | "finally") {
                self.chain_closed = true;
            }
        }

        match self.head {
            Head::Unknown => self.head = head_of(lexeme),
            Head::Word { special_block } => {
                if lexeme.category == Category::Colon {
                    // `LABEL:`; the real head comes next.
                    self.head = Head::Unknown;
                    return Offer::Take;
                }
                self.head = if special_block && lexeme.category == Category::LeftBrace {
                    Head::BlockBearing(Chain::None)
                } else {
                    Head::Simple
                };
            }
            Head::Sub => {
                self.head = if lexeme.is_word() {
                    Head::BlockBearing(Chain::None)
                } else {
                    Head::Simple
                };
            }
            Head::Simple | Head::BlockBearing(_) => {}
        }

        self.depth += nesting_delta(lexeme.category);
        if self.depth < 0 {
            return Offer::TakeAndEnd;
        }
        if self.depth > 0 {
            return Offer::Take;
        }
        match (lexeme.category, self.head) {
            (Category::Terminator, _) => Offer::TakeAndEnd,
            (Category::RightBrace, Head::BlockBearing(Chain::None)) => Offer::TakeAndEnd,
            (Category::RightBrace, Head::BlockBearing(_)) if self.chain_closed => Offer::TakeAndEnd,
            (Category::RightBrace, Head::BlockBearing(_)) => {
                self.awaiting = true;
                Offer::Take
            }
            _ => Offer::Take,
        }
    }
}

/// Split a lexeme span into statement spans.
#[must_use]
pub fn split_statements(span: &[Lexeme]) -> Vec<&[Lexeme]> {
    let mut statements = Vec::new();
    let mut boundary = Boundary::default();
    let mut start = 0;
    let mut i = 0;
    while i < span.len() {
        match boundary.offer(&span[i]) {
            Offer::Take => i += 1,
            Offer::TakeAndEnd => {
                i += 1;
                statements.push(&span[start..i]);
                start = i;
                boundary = Boundary::default();
            }
            Offer::EndBefore => {
                statements.push(&span[start..i]);
                start = i;
                boundary = Boundary::default();
            }
        }
    }
    if start < span.len() {
        statements.push(&span[start..]);
    }
    statements
}
