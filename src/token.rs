use std::fmt;

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Variable kind marked by the leading punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sigil {
    /// `$`
    Scalar,
    /// `@`
    Array,
    /// `%`
    Hash,
}

impl Sigil {
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '$' => Some(Self::Scalar),
            '@' => Some(Self::Array),
            '%' => Some(Self::Hash),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Scalar => '$',
            Self::Array => '@',
            Self::Hash => '%',
        }
    }
}

impl fmt::Display for Sigil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Token kinds produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Numeric literal, including `0x`/`0b` forms and `v5.36` version strings.
    Number,
    /// Quoted string. `text` holds the decoded body.
    String { interpolated: bool },
    /// `qw(...)` list, pre-split on whitespace. `text` holds the raw body.
    QuoteWords(Vec<String>),
    /// `/pattern/flags`, `m{...}` or `qr/.../`. `text` holds the pattern.
    Regex { flags: String },
    /// Bareword, keyword or `::`-qualified name.
    Identifier,
    /// Sigil-prefixed variable. `text` holds the full spelling (`$foo`).
    Variable { sigil: Sigil },
    /// A lone sigil directly followed by `*`, `[`, `{` or `$`.
    DerefSigil(Sigil),
    /// Any other operator (`+`, `<=>`, `=~`, `..`, ...).
    Operator,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `,`
    Comma,
    /// `=>`
    FatComma,
    /// `;`
    Semicolon,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `->`
    Arrow,
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            span: Span { line, column },
        }
    }
}
