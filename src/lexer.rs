use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use crate::lexeme::{self, Category};
use crate::token::{Sigil, Span, Token, TokenKind};

/// Classifies a scanner error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Unterminated quoted string (`"..."`, `'...'`, `q(...)`).
    UnterminatedString,
    /// Unterminated regex literal.
    UnterminatedRegex,
    /// Unterminated `qw` list.
    UnterminatedQuoteWords,
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string literal")
            }
            Self::UnterminatedRegex => {
                write!(f, "unterminated regex literal")
            }
            Self::UnterminatedQuoteWords => {
                write!(f, "unterminated qw list")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch}")
            }
        }
    }
}

/// Error produced during scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize a whole source string, stopping at the first scan error.
///
/// # Errors
///
/// Returns `LexError` on unterminated literals or characters that
/// cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Scanner::new(input.chars()).collect()
}

/// Operators matched greedily, longest spelling first.
const OPERATORS: &[&str] = &[
    "<=>", "**=", "||=", "&&=", "//=", "...", "<<=", ">>=", "..", "->", "=>", "==", "!=", "<=",
    ">=", "++", "--", "**", "=~", "!~", "&&", "||", "//", "+=", "-=", "*=", "/=", ".=", "%=", "|=",
    "&=", "^=", "<<", ">>", "~~", "+", "-", "*", "/", "%", ".", "=", "<", ">", "!", "~", "\\", "?",
    ":", ",", ";", "(", ")", "[", "]", "{", "}", "&", "|", "^",
];

const fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

const fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Closing partner of a paired quote delimiter.
const fn closing_delimiter(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        _ => None,
    }
}

/// Characters allowed right after `q`, `qq`, `qw`, `m` or `qr`.
const fn is_quote_delimiter(ch: char) -> bool {
    !ch.is_ascii_alphanumeric()
        && !ch.is_whitespace()
        && !matches!(ch, '_' | ',' | ';' | '=' | ')' | ']' | '}' | '>')
}

fn operator_kind(op: &str) -> TokenKind {
    match op {
        "(" => TokenKind::OpenParen,
        ")" => TokenKind::CloseParen,
        "[" => TokenKind::OpenBracket,
        "]" => TokenKind::CloseBracket,
        "{" => TokenKind::OpenBrace,
        "}" => TokenKind::CloseBrace,
        "," => TokenKind::Comma,
        "=>" => TokenKind::FatComma,
        ";" => TokenKind::Semicolon,
        "?" => TokenKind::Question,
        ":" => TokenKind::Colon,
        "->" => TokenKind::Arrow,
        _ => TokenKind::Operator,
    }
}

/// Body of a delimited literal that hit end of input.
struct Unterminated {
    consumed: String,
}

/// Pull-based scanner over a character stream.
///
/// Yields one token at a time and never looks further ahead than the
/// token being built. A malformed literal is reported as an `Err` item;
/// scanning then resumes just after its opening delimiter.
pub struct Scanner<I: Iterator<Item = char>> {
    chars: I,
    lookahead: VecDeque<char>,
    line: usize,
    col: usize,
    prev: Option<Category>,
    /// The previous token ended an operand.
    after_operand: bool,
    /// One entry per open `{`: whether it opened a code block.
    braces: Vec<bool>,
    /// The previous token was a `}` closing a code block.
    after_block: bool,
    done: bool,
}

impl<I: Iterator<Item = char>> Scanner<I> {
    pub fn new(chars: I) -> Self {
        let mut scanner = Self {
            chars,
            lookahead: VecDeque::new(),
            line: 1,
            col: 1,
            prev: None,
            after_operand: false,
            braces: Vec::new(),
            after_block: false,
            done: false,
        };
        if scanner.peek() == Some('\u{FEFF}') {
            scanner.lookahead.pop_front();
        }
        scanner
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&mut self, offset: usize) -> Option<char> {
        while self.lookahead.len() <= offset {
            let ch = self.chars.next()?;
            self.lookahead.push_back(ch);
        }
        self.lookahead.get(offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.lookahead.pop_front().or_else(|| self.chars.next())?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Advance and record the character in `raw`.
    fn advance_into(&mut self, raw: &mut String) -> Option<char> {
        let ch = self.advance()?;
        raw.push(ch);
        Some(ch)
    }

    /// Push consumed characters back and restore the position they
    /// started at.
    fn rewind(&mut self, consumed: &str, at: Span) {
        for ch in consumed.chars().rev() {
            self.lookahead.push_front(ch);
        }
        self.line = at.line;
        self.col = at.column;
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\n' | '\r' | '\u{0C}' => {
                    self.advance();
                }
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                '=' if self.col == 1 && self.peek_at(1).is_some_and(|c| c.is_ascii_alphabetic()) => {
                    self.skip_pod();
                }
                _ => break,
            }
        }
    }

    /// Skip a POD block through its `=cut` line.
    fn skip_pod(&mut self) {
        loop {
            let mut line = String::new();
            while let Some(ch) = self.advance() {
                if ch == '\n' {
                    break;
                }
                line.push(ch);
            }
            if line.starts_with("=cut") || self.peek().is_none() {
                return;
            }
        }
    }

    fn scan_token(&mut self, ch: char) -> Option<Result<Token, LexError>> {
        let start = self.span();
        let result = match ch {
            '0'..='9' => Ok(self.read_number(start)),
            '"' | '\'' => {
                self.advance();
                self.read_quoted(ch, start)
            }
            c if is_ident_start(c) => return self.read_word(start),
            '$' | '@' => self.read_sigil(ch, start),
            '.' if !self.after_operand && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                Ok(self.read_number(start))
            }
            '%' if !self.after_operand => self.read_sigil(ch, start),
            '/' if !self.after_operand => {
                trace!(line = start.line, column = start.column, "slash opens regex");
                self.advance();
                self.read_regex('/', start)
            }
            _ => self.read_operator(start),
        };
        Some(result)
    }

    fn read_number(&mut self, start: Span) -> Token {
        let mut text = String::new();
        let radix_prefix = self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x' | 'X' | 'b' | 'B'));
        if radix_prefix {
            self.advance_into(&mut text);
            self.advance_into(&mut text);
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.advance_into(&mut text);
            }
            return Token::new(TokenKind::Number, text, start.line, start.column);
        }

        self.read_digits(&mut text);
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance_into(&mut text);
            self.read_digits(&mut text);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.advance_into(&mut text);
                if signed {
                    self.advance_into(&mut text);
                }
                self.read_digits(&mut text);
            }
        }
        Token::new(TokenKind::Number, text, start.line, start.column)
    }

    fn read_digits(&mut self, text: &mut String) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance_into(text);
        }
    }

    /// Read an identifier, absorbing `::` package separators.
    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while self.peek().is_some_and(is_ident_continue) {
            self.advance_into(&mut text);
        }
        while self.peek() == Some(':')
            && self.peek_at(1) == Some(':')
            && self.peek_at(2).is_some_and(is_ident_start)
        {
            self.advance_into(&mut text);
            self.advance_into(&mut text);
            while self.peek().is_some_and(is_ident_continue) {
                self.advance_into(&mut text);
            }
        }
        text
    }

    fn read_word(&mut self, start: Span) -> Option<Result<Token, LexError>> {
        let word = self.read_identifier();

        if word == "__END__" || word == "__DATA__" {
            debug!(line = start.line, "end of program text");
            self.done = true;
            return None;
        }

        let quote_like = self.prev != Some(Category::Arrow)
            && matches!(word.as_str(), "q" | "qq" | "qw" | "m" | "qr")
            && self.peek().is_some_and(is_quote_delimiter);
        if quote_like {
            let Some(open) = self.advance() else {
                return Some(Err(LexError {
                    kind: LexErrorKind::UnterminatedString,
                    span: start,
                }));
            };
            return Some(match word.as_str() {
                "qw" => self.read_quote_words(open, start),
                "m" | "qr" => self.read_regex(open, start),
                _ => self.read_quote_operator(word == "qq", open, start),
            });
        }

        let is_version = word.len() > 1
            && word.starts_with('v')
            && word[1..].bytes().all(|b| b.is_ascii_digit());
        if is_version {
            let mut text = word;
            while self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                self.advance_into(&mut text);
                self.read_digits(&mut text);
            }
            return Some(Ok(Token::new(
                TokenKind::Number,
                text,
                start.line,
                start.column,
            )));
        }

        Some(Ok(Token::new(
            TokenKind::Identifier,
            word,
            start.line,
            start.column,
        )))
    }

    /// Read up to the closing delimiter, honoring nesting for paired
    /// delimiters. A backslash before a delimiter character is dropped,
    /// except in a `pattern` with paired delimiters where `\{` stays a
    /// literal brace. Every other backslash sequence is kept verbatim.
    fn read_delimited(&mut self, open: char, pattern: bool) -> Result<String, Unterminated> {
        let close = closing_delimiter(open).unwrap_or(open);
        let paired = close != open;
        let mut consumed = String::new();
        let mut body = String::new();
        let mut depth = 0usize;

        loop {
            let Some(ch) = self.advance_into(&mut consumed) else {
                return Err(Unterminated { consumed });
            };
            match ch {
                '\\' => match self.advance_into(&mut consumed) {
                    Some(next) if (next == open || next == close) && !(pattern && paired) => {
                        body.push(next);
                    }
                    Some(next) => {
                        body.push('\\');
                        body.push(next);
                    }
                    None => return Err(Unterminated { consumed }),
                },
                c if c == close && depth == 0 => return Ok(body),
                c if c == close => {
                    depth -= 1;
                    body.push(c);
                }
                c if paired && c == open => {
                    depth += 1;
                    body.push(c);
                }
                c => body.push(c),
            }
        }
    }

    fn recover(&mut self, kind: LexErrorKind, start: Span, resume: Span, consumed: &str) -> LexError {
        self.rewind(consumed, resume);
        let error = LexError { kind, span: start };
        debug!(%error, "scanner resuming after opening delimiter");
        error
    }

    fn read_quoted(&mut self, quote: char, start: Span) -> Result<Token, LexError> {
        let resume = self.span();
        let interpolated = quote == '"';
        let mut consumed = String::new();
        let mut value = String::new();

        loop {
            match self.advance_into(&mut consumed) {
                None => {
                    return Err(self.recover(
                        LexErrorKind::UnterminatedString,
                        start,
                        resume,
                        &consumed,
                    ));
                }
                Some('\\') => {
                    let Some(next) = self.advance_into(&mut consumed) else {
                        return Err(self.recover(
                            LexErrorKind::UnterminatedString,
                            start,
                            resume,
                            &consumed,
                        ));
                    };
                    if interpolated {
                        push_double_quoted_escape(&mut value, next);
                    } else {
                        push_single_quoted_escape(&mut value, next, quote);
                    }
                }
                Some(c) if c == quote => break,
                Some(c) => value.push(c),
            }
        }

        Ok(Token::new(
            TokenKind::String { interpolated },
            value,
            start.line,
            start.column,
        ))
    }

    fn read_quote_operator(
        &mut self,
        interpolated: bool,
        open: char,
        start: Span,
    ) -> Result<Token, LexError> {
        let resume = self.span();
        let body = self.read_delimited(open, false).map_err(|failed| {
            self.recover(
                LexErrorKind::UnterminatedString,
                start,
                resume,
                &failed.consumed,
            )
        })?;

        let mut value = String::new();
        let mut chars = body.chars();
        while let Some(ch) = chars.next() {
            match (ch, chars.clone().next()) {
                ('\\', Some(next)) => {
                    chars.next();
                    if interpolated {
                        push_double_quoted_escape(&mut value, next);
                    } else {
                        push_single_quoted_escape(&mut value, next, '\\');
                    }
                }
                _ => value.push(ch),
            }
        }

        Ok(Token::new(
            TokenKind::String { interpolated },
            value,
            start.line,
            start.column,
        ))
    }

    fn read_quote_words(&mut self, open: char, start: Span) -> Result<Token, LexError> {
        let resume = self.span();
        let body = self.read_delimited(open, false).map_err(|failed| {
            self.recover(
                LexErrorKind::UnterminatedQuoteWords,
                start,
                resume,
                &failed.consumed,
            )
        })?;
        let words = body.split_whitespace().map(str::to_string).collect();
        Ok(Token::new(
            TokenKind::QuoteWords(words),
            body,
            start.line,
            start.column,
        ))
    }

    fn read_regex(&mut self, open: char, start: Span) -> Result<Token, LexError> {
        let resume = self.span();
        let pattern = self.read_delimited(open, true).map_err(|failed| {
            self.recover(
                LexErrorKind::UnterminatedRegex,
                start,
                resume,
                &failed.consumed,
            )
        })?;
        let mut flags = String::new();
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.advance_into(&mut flags);
        }
        Ok(Token::new(
            TokenKind::Regex { flags },
            pattern,
            start.line,
            start.column,
        ))
    }

    fn read_sigil(&mut self, ch: char, start: Span) -> Result<Token, LexError> {
        let Some(sigil) = Sigil::from_char(ch) else {
            return self.read_operator(start);
        };
        let next = self.peek_at(1);
        let after = self.peek_at(2);
        let unexpected = LexError {
            kind: LexErrorKind::UnexpectedCharacter(ch),
            span: start,
        };

        match next {
            Some(c) if is_ident_start(c) => {}
            Some(':') if after == Some(':') => {}
            Some('*' | '[' | '{') => {
                self.advance();
                return Ok(Token::new(
                    TokenKind::DerefSigil(sigil),
                    ch.to_string(),
                    start.line,
                    start.column,
                ));
            }
            Some('$') if sigil != Sigil::Scalar || after.is_some_and(|c| is_ident_start(c) || c == '$' || c == '{') => {
                self.advance();
                return Ok(Token::new(
                    TokenKind::DerefSigil(sigil),
                    ch.to_string(),
                    start.line,
                    start.column,
                ));
            }
            Some(c @ ('0'..='9' | '@' | '!' | '&' | '/' | '\\' | '$')) if sigil == Sigil::Scalar => {
                self.advance();
                let mut text = String::from(ch);
                self.advance_into(&mut text);
                if c.is_ascii_digit() {
                    self.read_digits(&mut text);
                }
                return Ok(Token::new(
                    TokenKind::Variable { sigil },
                    text,
                    start.line,
                    start.column,
                ));
            }
            Some('#') if sigil == Sigil::Scalar && after.is_some_and(is_ident_start) => {
                self.advance();
                self.advance();
                let text = format!("$#{}", self.read_identifier());
                return Ok(Token::new(
                    TokenKind::Variable { sigil },
                    text,
                    start.line,
                    start.column,
                ));
            }
            Some('#') if sigil == Sigil::Scalar && matches!(after, Some('{' | '$')) => {
                self.advance();
                self.advance();
                return Ok(Token::new(
                    TokenKind::DerefSigil(sigil),
                    "$#",
                    start.line,
                    start.column,
                ));
            }
            _ if sigil == Sigil::Hash => return self.read_operator(start),
            _ => {
                self.advance();
                if next == Some('#') {
                    self.advance();
                }
                return Err(unexpected);
            }
        }

        self.advance();
        let mut text = String::from(ch);
        if self.peek() == Some(':') {
            self.advance_into(&mut text);
            self.advance_into(&mut text);
        }
        text.push_str(&self.read_identifier());
        Ok(Token::new(
            TokenKind::Variable { sigil },
            text,
            start.line,
            start.column,
        ))
    }

    /// Record the context a following `/`, `%` or `.` is scanned in.
    fn remember(&mut self, token: &Token) {
        let category = match (self.prev, &token.kind) {
            (Some(Category::Arrow), TokenKind::Identifier) => Category::Identifier,
            _ => lexeme::categorize(token),
        };
        let closed_block = match token.kind {
            TokenKind::OpenBrace => {
                let block = lexeme::brace_opens_block(self.prev, self.after_block);
                self.braces.push(block);
                false
            }
            TokenKind::CloseBrace => self.braces.pop().unwrap_or(true),
            _ => false,
        };
        self.after_operand = lexeme::ends_operand(token, category, closed_block);
        self.after_block = closed_block;
        self.prev = Some(category);
    }

    fn read_operator(&mut self, start: Span) -> Result<Token, LexError> {
        let window: String = (0..3).filter_map(|i| self.peek_at(i)).collect();
        let Some(op) = OPERATORS.iter().find(|op| window.starts_with(**op)) else {
            let ch = self.advance().unwrap_or_default();
            return Err(LexError {
                kind: LexErrorKind::UnexpectedCharacter(ch),
                span: start,
            });
        };
        for _ in 0..op.chars().count() {
            self.advance();
        }
        Ok(Token::new(
            operator_kind(op),
            *op,
            start.line,
            start.column,
        ))
    }
}

fn push_double_quoted_escape(value: &mut String, escaped: char) {
    match escaped {
        'n' => value.push('\n'),
        't' => value.push('\t'),
        'r' => value.push('\r'),
        '0' => value.push('\0'),
        'a' => value.push('\u{07}'),
        'e' => value.push('\u{1B}'),
        '"' => value.push('"'),
        '\\' => value.push('\\'),
        // interpolation markers and unknown escapes stay visible
        other => {
            value.push('\\');
            value.push(other);
        }
    }
}

fn push_single_quoted_escape(value: &mut String, escaped: char, quote: char) {
    if escaped == quote || escaped == '\\' {
        value.push(escaped);
    } else {
        value.push('\\');
        value.push(escaped);
    }
}

impl<I: Iterator<Item = char>> Iterator for Scanner<I> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            self.skip_trivia();
            let Some(ch) = self.peek() else {
                self.done = true;
                return None;
            };
            let Some(item) = self.scan_token(ch) else {
                continue;
            };
            if let Ok(token) = &item {
                self.remember(token);
            }
            return Some(item);
        }
    }
}
