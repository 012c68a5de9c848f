//! Expression engine: precedence climbing, unary and primary parsing.
//!
//! A [`Cursor`] walks one bounded lexeme span. Nested groups are handed to
//! fresh cursors over their inner span, so no production ever reads past
//! its own closing delimiter.

use tracing::trace;

use crate::ast::{Block, Node};
use crate::depth;
use crate::lexeme::{self, Category, Lexeme};
use crate::token::{Sigil, Span, TokenKind};

use super::precedence::{self, Assoc};
use super::stmt;
use super::{ParseError, ParseErrorKind};

pub(super) fn error(kind: ParseErrorKind, span: Span) -> Node {
    Node::Error(ParseError::new(kind, span))
}

pub(super) fn expected(what: &'static str, found: Option<&Lexeme>, at: Span) -> Node {
    error(
        ParseErrorKind::Expected {
            expected: what,
            found: found.map(|l| l.text().to_string()),
        },
        found.map_or(at, Lexeme::span),
    )
}

/// Parse a span holding one expression, or a comma list of them.
pub(super) fn parse_expression(span: &[Lexeme], anchor: Span) -> Node {
    Cursor::new(span, anchor).parse_full()
}

/// Parse the comma-separated contents of a bracketed group.
///
/// Empty elements are skipped. A bare word (or `-word`) directly before
/// `=>` is a string.
pub(super) fn parse_elements(span: &[Lexeme], anchor: Span) -> Vec<Node> {
    let mut elements = Vec::new();
    let mut offset = 0;
    for segment in depth::split_at_top_level(span, Category::Comma) {
        let separator = span.get(offset + segment.len());
        offset += segment.len() + 1;
        if segment.is_empty() {
            continue;
        }
        let key = separator
            .filter(|l| l.is_fat_comma())
            .and_then(|_| bareword_key(segment));
        elements.push(match key {
            Some(value) => Node::string(&value),
            None => parse_expression(segment, anchor),
        });
    }
    elements
}

/// `word` or `-word` spelled as a string key.
pub(super) fn bareword_key(segment: &[Lexeme]) -> Option<String> {
    match segment {
        [word] if word.is_word() => Some(word.text().to_string()),
        [minus, word] if minus.is_operator("-") && word.is_word() => {
            Some(format!("-{}", word.text()))
        }
        _ => None,
    }
}

/// Index or slice list inside `[...]` or `{...}`.
pub(super) fn parse_subscript(span: &[Lexeme], anchor: Span) -> Node {
    if span.is_empty() {
        expected("subscript", None, anchor)
    } else if depth::has_top_level(span, Category::Comma) {
        Node::List(parse_elements(span, anchor))
    } else {
        parse_expression(span, anchor)
    }
}

/// Hash subscript: a lone word is a string key.
pub(super) fn parse_hash_key(span: &[Lexeme], anchor: Span) -> Node {
    bareword_key(span).map_or_else(
        || parse_subscript(span, anchor),
        |value| Node::string(&value),
    )
}

/// Variable node for a variable lexeme.
pub(super) fn as_variable(lexeme: &Lexeme) -> Option<Node> {
    let TokenKind::Variable { sigil } = lexeme.token.kind else {
        return None;
    };
    Some(variable(sigil, lexeme.text()))
}

fn variable(sigil: Sigil, text: &str) -> Node {
    Node::variable(sigil, text.strip_prefix(sigil.as_char()).unwrap_or(text))
}

/// Whether `lexeme` can begin an argument of a list operator.
fn starts_operand(lexeme: &Lexeme) -> bool {
    match lexeme.category {
        Category::Literal
        | Category::Identifier
        | Category::Builtin
        | Category::Variable
        | Category::PostfixDerefSigil
        | Category::LeftParen
        | Category::LeftBracket
        | Category::LeftBrace
        | Category::Declarator
        | Category::UnaryOperator => true,
        Category::Keyword => matches!(
            lexeme.text(),
            "sub"
                | "do"
                | "require"
                | "return"
                | "die"
                | "warn"
                | "print"
                | "say"
                | "last"
                | "next"
                | "redo"
        ),
        Category::BinaryOperator => matches!(lexeme.text(), "-" | "+"),
        _ => false,
    }
}

/// Whether `lexeme` can begin the operand of a named unary builtin.
/// Braces and signs after `shift` or `pop` belong to the outer expression.
fn starts_named_operand(lexeme: &Lexeme) -> bool {
    starts_operand(lexeme)
        && !matches!(
            lexeme.category,
            Category::LeftBrace | Category::BinaryOperator
        )
}

/// `:name` or `:name(ARGS)` after a declaration head.
pub(super) struct Attribute<'a> {
    pub(super) name: &'a str,
    pub(super) args: Option<&'a [Lexeme]>,
}

/// Position within one bounded lexeme span.
pub(super) struct Cursor<'a> {
    pub(super) span: &'a [Lexeme],
    pub(super) pos: usize,
    anchor: Span,
}

impl<'a> Cursor<'a> {
    pub(super) const fn new(span: &'a [Lexeme], anchor: Span) -> Self {
        Self {
            span,
            pos: 0,
            anchor,
        }
    }

    pub(super) fn peek(&self) -> Option<&'a Lexeme> {
        self.span.get(self.pos)
    }

    pub(super) fn peek_at(&self, offset: usize) -> Option<&'a Lexeme> {
        self.span.get(self.pos + offset)
    }

    pub(super) fn advance(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.span.get(self.pos)?;
        self.pos += 1;
        Some(lexeme)
    }

    pub(super) fn next_is(&self, category: Category) -> bool {
        self.peek().is_some_and(|l| l.category == category)
    }

    /// Consume the next lexeme if it is `category` spelled `text`.
    pub(super) fn eat(&mut self, category: Category, text: &str) -> Option<&'a Lexeme> {
        if self.peek().is_some_and(|l| l.is(category, text)) {
            self.advance()
        } else {
            None
        }
    }

    /// Position for an error at the current point.
    pub(super) fn here(&self) -> Span {
        self.peek()
            .or_else(|| self.span.last())
            .map_or(self.anchor, Lexeme::span)
    }

    /// Everything not yet consumed; the cursor ends up exhausted.
    pub(super) fn take_rest(&mut self) -> &'a [Lexeme] {
        let rest = self.span.get(self.pos..).unwrap_or_default();
        self.pos = self.span.len();
        rest
    }

    pub(super) fn skip_to(&mut self, offset: usize) {
        self.pos = self.pos.saturating_add(offset).min(self.span.len());
    }

    pub(super) fn rest(&self) -> &'a [Lexeme] {
        self.span.get(self.pos..).unwrap_or_default()
    }

    /// Inner span of the group whose opener was just consumed, leaving
    /// the cursor after its close.
    pub(super) fn take_group(&mut self, open: &Lexeme) -> Result<&'a [Lexeme], ParseError> {
        let start = self.pos.saturating_sub(1);
        let Some(close) = open.category.closer() else {
            return Err(ParseError::new(
                ParseErrorKind::Unexpected {
                    found: open.text().to_string(),
                },
                open.span(),
            ));
        };
        match depth::find_matching_close(self.span, open.category, close, start) {
            Ok(end) => {
                self.pos = end + 1;
                Ok(&self.span[start + 1..end])
            }
            Err(error) => {
                self.pos = self.span.len();
                Err(error)
            }
        }
    }

    /// Brace-delimited block at the cursor.
    ///
    /// Without a `{` the rest of the span is consumed and the block holds
    /// a single error.
    pub(super) fn parse_block(&mut self) -> Block {
        match self.peek() {
            Some(open) if open.category == Category::LeftBrace => {
                self.pos += 1;
                match self.take_group(open) {
                    Ok(inner) => stmt::parse_block(inner),
                    Err(e) => vec![Node::Error(e)],
                }
            }
            found => {
                let node = expected("'{'", found, self.here());
                self.pos = self.span.len();
                vec![node]
            }
        }
    }

    /// Parenthesized signature, if one follows.
    pub(super) fn parse_params(&mut self) -> Vec<Node> {
        let Some(open) = self.peek().filter(|l| l.category == Category::LeftParen) else {
            return Vec::new();
        };
        self.pos += 1;
        match self.take_group(open) {
            Ok(inner) => stmt::parse_signature(inner, open.span()),
            Err(e) => vec![Node::Error(e)],
        }
    }

    pub(super) fn parse_attributes(&mut self) -> Vec<Attribute<'a>> {
        let mut attributes = Vec::new();
        while self.next_is(Category::Colon) && self.peek_at(1).is_some_and(Lexeme::is_word) {
            let Some(name) = self.peek_at(1) else {
                break;
            };
            self.pos += 2;
            let mut args = None;
            if let Some(open) = self.peek().filter(|l| l.category == Category::LeftParen) {
                self.pos += 1;
                args = self.take_group(open).ok();
            }
            attributes.push(Attribute {
                name: name.text(),
                args,
            });
        }
        attributes
    }

    /// The whole span as one expression or comma list; anything left over
    /// is an error.
    pub(super) fn parse_full(mut self) -> Node {
        if self.span.is_empty() {
            return error(ParseErrorKind::UnexpectedEnd, self.anchor);
        }
        let first = self.parse_expr(precedence::LOWEST);
        let node = if self.next_is(Category::Comma) {
            let mut items = vec![first];
            while self.next_is(Category::Comma) {
                self.pos += 1;
                if self.peek().is_some() && !self.next_is(Category::Comma) {
                    items.push(self.parse_expr(precedence::LOWEST));
                }
            }
            Node::List(items)
        } else {
            first
        };
        self.finish(node)
    }

    /// `node` if the span is exhausted, otherwise an error at the first
    /// unconsumed lexeme.
    pub(super) fn finish(&self, node: Node) -> Node {
        match self.peek() {
            None => node,
            Some(extra) => error(
                ParseErrorKind::Unexpected {
                    found: extra.text().to_string(),
                },
                extra.span(),
            ),
        }
    }

    /// Precedence climbing: operators binding at least as tight as `min`.
    pub(super) fn parse_expr(&mut self, min: u8) -> Node {
        let mut left = self.parse_unary();
        while let Some(lexeme) = self.peek() {
            if lexeme.category == Category::Question {
                if precedence::TERNARY < min {
                    break;
                }
                left = self.parse_ternary(left);
                continue;
            }
            if lexeme.category != Category::BinaryOperator {
                break;
            }
            let Some((level, assoc)) = precedence::binary_precedence(lexeme.text()) else {
                break;
            };
            if level < min {
                break;
            }
            self.pos += 1;
            let next_min = match assoc {
                Assoc::Left => level + 1,
                Assoc::Right => level,
            };
            let right = if self.peek().is_some() {
                self.parse_expr(next_min)
            } else {
                error(
                    ParseErrorKind::MissingOperand {
                        operator: lexeme.text().to_string(),
                    },
                    lexeme.span(),
                )
            };
            left = Node::binary(lexeme.text(), left, right);
        }
        left
    }

    fn parse_ternary(&mut self, condition: Node) -> Node {
        let question = self.pos;
        let at = self.span[question].span();
        self.pos += 1;

        let Some(colon) = depth::find_ternary_colon(self.span, question) else {
            let then_branch = parse_branch(self.take_rest(), at);
            return Node::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(error(ParseErrorKind::MissingTernaryColon, at)),
            };
        };

        let then_branch = parse_branch(&self.span[question + 1..colon], at);
        self.pos = colon + 1;
        let else_branch = if self.peek().is_some() {
            self.parse_expr(precedence::TERNARY)
        } else {
            error(ParseErrorKind::EmptyBranch, self.span[colon].span())
        };
        Node::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    fn operand_after(&mut self, op: &Lexeme, min: Option<u8>) -> Node {
        if self.peek().is_none() {
            return error(
                ParseErrorKind::MissingOperand {
                    operator: op.text().to_string(),
                },
                op.span(),
            );
        }
        match min {
            Some(level) => self.parse_expr(level),
            None => self.parse_unary(),
        }
    }

    /// Prefix operators, then a primary with its postfix chain.
    pub(super) fn parse_unary(&mut self) -> Node {
        let Some(lexeme) = self.peek() else {
            return error(ParseErrorKind::UnexpectedEnd, self.here());
        };
        let op = lexeme.text();
        let before_brace = self
            .peek_at(1)
            .is_some_and(|l| l.category == Category::LeftBrace);
        match lexeme.category {
            Category::UnaryOperator if op == "not" => {
                self.pos += 1;
                let operand = self.operand_after(lexeme, Some(precedence::NOT));
                Node::prefix(op, operand)
            }
            Category::BinaryOperator if op == "+" && before_brace => {
                // `+{` is always an anonymous hash.
                self.pos += 1;
                let primary = self.parse_primary();
                self.parse_postfix(primary)
            }
            Category::UnaryOperator | Category::BinaryOperator
                if lexeme.category == Category::UnaryOperator || matches!(op, "-" | "+") =>
            {
                self.pos += 1;
                let min = (!matches!(op, "++" | "--")).then_some(precedence::EXPONENT);
                let operand = self.operand_after(lexeme, min);
                Node::prefix(op, operand)
            }
            _ => {
                let primary = self.parse_primary();
                self.parse_postfix(primary)
            }
        }
    }

    pub(super) fn parse_primary(&mut self) -> Node {
        let Some(lexeme) = self.advance() else {
            return error(ParseErrorKind::UnexpectedEnd, self.here());
        };
        trace!(text = lexeme.text(), category = ?lexeme.category, "primary");
        let text = lexeme.text();
        match (&lexeme.token.kind, lexeme.category) {
            (TokenKind::Number, _) => Node::number(text),
            (TokenKind::String { interpolated }, _) => Node::String {
                value: text.to_string(),
                interpolated: *interpolated,
            },
            (TokenKind::QuoteWords(words), _) => Node::List(
                words
                    .iter()
                    .map(|w| Node::string(w))
                    .collect(),
            ),
            (TokenKind::Regex { flags }, _) => Node::RegexLiteral {
                pattern: text.to_string(),
                flags: flags.clone(),
            },
            (TokenKind::Variable { sigil }, _) => variable(*sigil, text),
            (TokenKind::DerefSigil(sigil), _) => self.parse_dereference(*sigil, lexeme),
            (_, Category::Literal) => Node::Boolean(text == "true"),
            (_, Category::LeftBracket) => match self.take_group(lexeme) {
                Ok(inner) => Node::ArrayLiteral(parse_elements(inner, lexeme.span())),
                Err(e) => Node::Error(e),
            },
            (_, Category::LeftBrace) => match self.take_group(lexeme) {
                Ok(inner) => Node::HashLiteral(parse_elements(inner, lexeme.span())),
                Err(e) => Node::Error(e),
            },
            (_, Category::LeftParen) => self.parse_parenthesized(lexeme),
            (_, Category::Declarator) => self.parse_declaration(lexeme),
            (_, Category::Keyword) => self.parse_keyword(lexeme),
            (_, Category::Identifier | Category::Builtin) => self.parse_word(lexeme),
            _ => error(
                ParseErrorKind::Unexpected {
                    found: text.to_string(),
                },
                lexeme.span(),
            ),
        }
    }

    /// `(...)`: a list when a top-level comma is present, otherwise the
    /// inner expression.
    fn parse_parenthesized(&mut self, open: &Lexeme) -> Node {
        match self.take_group(open) {
            Err(e) => Node::Error(e),
            Ok([]) => Node::List(Vec::new()),
            Ok(inner) if depth::has_top_level(inner, Category::Comma) => {
                Node::List(parse_elements(inner, open.span()))
            }
            Ok(inner) => parse_expression(inner, open.span()),
        }
    }

    /// `@{ EXPR }`, `@$ref`, `$$ref`.
    fn parse_dereference(&mut self, sigil: Sigil, lexeme: &Lexeme) -> Node {
        let target = match self.peek() {
            Some(open) if open.category == Category::LeftBrace => {
                self.pos += 1;
                match self.take_group(open) {
                    Ok(inner) => parse_expression(inner, open.span()),
                    Err(e) => Node::Error(e),
                }
            }
            Some(next)
                if matches!(
                    next.category,
                    Category::Variable | Category::PostfixDerefSigil
                ) =>
            {
                self.parse_primary()
            }
            found => return expected("reference after sigil", found, lexeme.span()),
        };
        // `$#{...}` and `$#$ref`: last index of the referenced array
        if lexeme.text() == "$#" {
            return Node::prefix("$#", target);
        }
        Node::Dereference {
            sigil,
            target: Box::new(target),
        }
    }

    /// `my $x`, `our ($a, @b)`, `local $h{key}`; the initializer is left
    /// to the enclosing assignment.
    fn parse_declaration(&mut self, lexeme: &Lexeme) -> Node {
        let targets = match self.peek() {
            Some(open) if open.category == Category::LeftParen => {
                self.pos += 1;
                match self.take_group(open) {
                    Ok(inner) => parse_elements(inner, open.span()),
                    Err(e) => vec![Node::Error(e)],
                }
            }
            Some(_) => {
                let target = self.parse_primary();
                vec![self.parse_postfix(target)]
            }
            None => vec![expected("variable", None, lexeme.span())],
        };
        Node::Declaration {
            declarator: lexeme.text().to_string(),
            targets,
            initializer: None,
        }
    }

    fn parse_keyword(&mut self, lexeme: &Lexeme) -> Node {
        let keyword = lexeme.text();
        let before_paren = self.next_is(Category::LeftParen);
        match keyword {
            "print" | "say" | "do" | "require" if before_paren => self.parse_call(lexeme),
            "sub" => {
                let params = self.parse_params();
                self.parse_attributes();
                let body = self.parse_block();
                Node::Sub {
                    name: None,
                    params,
                    body,
                }
            }
            "do" if self.next_is(Category::LeftBrace) => Node::DoBlock(self.parse_block()),
            "do" => Node::Call {
                name: keyword.to_string(),
                args: vec![self.operand_after(lexeme, Some(precedence::NAMED_UNARY))],
            },
            "require" => {
                let target = match self.peek() {
                    Some(word) if word.is_word() => {
                        self.pos += 1;
                        Node::Bareword(word.text().to_string())
                    }
                    _ => self.operand_after(lexeme, Some(precedence::NAMED_UNARY)),
                };
                Node::Require(Box::new(target))
            }
            "print" | "say" => {
                let filehandle = self.parse_filehandle();
                let args = self.parse_list_args();
                if keyword == "print" {
                    Node::Print { filehandle, args }
                } else {
                    Node::Say { filehandle, args }
                }
            }
            "die" | "warn" => {
                let args = self.parse_call_args();
                if keyword == "die" {
                    Node::Die(args)
                } else {
                    Node::Warn(args)
                }
            }
            "return" => {
                let mut args = self.parse_list_args();
                let value = match args.len() {
                    0 => None,
                    1 => args.pop(),
                    _ => Some(Node::List(args)),
                };
                Node::Return(value.map(Box::new))
            }
            "last" | "next" | "redo" => {
                let label = self
                    .peek()
                    .filter(|l| l.category == Category::Identifier)
                    .map(|l| l.text().to_string());
                if label.is_some() {
                    self.pos += 1;
                }
                match keyword {
                    "last" => Node::Last(label),
                    "next" => Node::Next(label),
                    _ => Node::Redo(label),
                }
            }
            _ => error(
                ParseErrorKind::Unexpected {
                    found: keyword.to_string(),
                },
                lexeme.span(),
            ),
        }
    }

    /// `print FH LIST`, `print {$fh} LIST`, `print $fh LIST`.
    fn parse_filehandle(&mut self) -> Option<Box<Node>> {
        let first = self.peek()?;
        let second = self.peek_at(1);
        let handle = match first.category {
            Category::LeftBrace => {
                self.pos += 1;
                match self.take_group(first) {
                    Ok(inner) => parse_expression(inner, first.span()),
                    Err(e) => Node::Error(e),
                }
            }
            Category::Identifier
                if second.is_none_or(|l| {
                    !matches!(
                        l.category,
                        Category::Comma
                            | Category::LeftParen
                            | Category::Arrow
                            | Category::BinaryOperator
                            | Category::Question
                    )
                }) =>
            {
                self.pos += 1;
                Node::Bareword(first.text().to_string())
            }
            Category::Variable
                if second.is_some_and(|l| {
                    matches!(l.category, Category::Literal | Category::Variable)
                }) =>
            {
                self.pos += 1;
                as_variable(first)?
            }
            _ => return None,
        };
        Some(Box::new(handle))
    }

    /// Arguments of a list operator: comma-separated expressions up to the
    /// end of the span or a low-precedence word operator.
    pub(super) fn parse_list_args(&mut self) -> Vec<Node> {
        let mut args = Vec::new();
        while self.peek().is_some_and(starts_operand) {
            args.push(self.parse_expr(precedence::ASSIGNMENT));
            if !self.next_is(Category::Comma) {
                break;
            }
            while self.next_is(Category::Comma) {
                self.pos += 1;
            }
        }
        args
    }

    /// Parenthesized argument list if one follows, else list-operator
    /// arguments.
    fn parse_call_args(&mut self) -> Vec<Node> {
        match self.peek() {
            Some(open) if open.category == Category::LeftParen => {
                self.pos += 1;
                match self.take_group(open) {
                    Ok(inner) => parse_elements(inner, open.span()),
                    Err(e) => vec![Node::Error(e)],
                }
            }
            _ => self.parse_list_args(),
        }
    }

    /// `NAME(ARGS)` with the cursor on `(`.
    fn parse_call(&mut self, name: &Lexeme) -> Node {
        let args = self.parse_call_args();
        Node::call(name.text(), args)
    }

    fn parse_word(&mut self, lexeme: &Lexeme) -> Node {
        let name = lexeme.text();
        let next = self.peek();
        if next.is_some_and(Lexeme::is_fat_comma) {
            return Node::string(name);
        }
        if next.is_some_and(|l| l.category == Category::LeftParen) {
            return self.parse_call(lexeme);
        }

        if lexeme.category == Category::Builtin {
            if lexeme::is_nullary(name) {
                return Node::call(name, Vec::new());
            }
            if lexeme::is_named_unary(name) {
                let args = if next.is_some_and(starts_named_operand) {
                    vec![self.parse_expr(precedence::NAMED_UNARY)]
                } else {
                    Vec::new()
                };
                return Node::call(name, args);
            }
            let mut args = Vec::new();
            if lexeme::takes_block(name) && self.next_is(Category::LeftBrace) {
                args.push(Node::block(self.parse_block()));
                if self.next_is(Category::Comma) {
                    self.pos += 1;
                }
            }
            args.extend(self.parse_list_args());
            return Node::call(name, args);
        }

        // A user sub called as a list operator: `croak "message"`.
        if next.is_some_and(|l| {
            matches!(
                l.category,
                Category::Literal | Category::Variable | Category::PostfixDerefSigil
            )
        }) {
            let args = self.parse_list_args();
            return Node::call(name, args);
        }
        Node::bareword(name)
    }
}

fn parse_branch(span: &[Lexeme], at: Span) -> Node {
    if span.is_empty() {
        error(ParseErrorKind::EmptyBranch, at)
    } else {
        Cursor::new(span, at).parse_full()
    }
}
