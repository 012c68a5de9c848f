//! Token-to-lexeme classification.
//!
//! Every token is tagged with a closed [`Category`] drawn from static
//! keyword and operator tables. Classification is a pure function of the
//! token plus the category of the lexeme immediately before it.

use crate::lexer::LexError;
use crate::token::{Span, Token, TokenKind};

/// Conditional and loop keywords.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "if", "unless", "elsif", "else", "while", "until", "for", "foreach",
];

/// Variable declarators.
pub const DECLARATORS: &[&str] = &["my", "our", "state", "local"];

/// Reserved words with a dedicated production.
pub const KEYWORDS: &[&str] = &[
    "sub", "class", "method", "field", "package", "use", "no", "require", "return", "last", "next",
    "redo", "do", "try", "catch", "finally", "given", "when", "default", "match", "case", "print",
    "say", "die", "warn",
];

/// Word spellings of binary operators.
pub const WORD_OPERATORS: &[&str] = &[
    "eq", "ne", "lt", "gt", "le", "ge", "cmp", "and", "or", "xor", "x", "isa",
];

/// Builtins taking at most one operand, binding tighter than comparisons.
pub const NAMED_UNARY_BUILTINS: &[&str] = &[
    "defined", "ref", "scalar", "lc", "uc", "lcfirst", "ucfirst", "fc", "length", "chr", "ord",
    "int", "abs", "sqrt", "hex", "oct", "exp", "log", "sin", "cos", "exists", "delete", "shift",
    "pop", "keys", "values", "each", "chomp", "chop", "chdir", "rmdir", "readline", "close",
    "undef", "exit", "rand", "srand", "quotemeta", "caller", "sleep", "lock",
];

/// Builtins taking every argument up to a low-precedence word operator.
pub const LIST_BUILTINS: &[&str] = &[
    "push", "unshift", "splice", "join", "split", "map", "grep", "sort", "reverse", "sprintf",
    "printf", "open", "binmode", "bless", "localtime", "gmtime", "unlink", "mkdir", "substr",
    "index", "rindex", "pack", "unpack", "system", "exec", "kill", "eval", "atan2", "select",
    "seek", "read", "sysread", "syswrite", "chmod", "chown",
];

/// Builtins that never take an operand unless called with parentheses.
pub const NULLARY_BUILTINS: &[&str] = &["wantarray", "time", "times", "wait", "fork"];

/// Builtins accepting a leading block argument (`map { ... } @list`).
pub const BLOCK_BUILTINS: &[&str] = &["map", "grep", "sort", "eval"];

/// Semantic category of a lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Number, string, quote-words, regex or boolean literal.
    Literal,
    Identifier,
    /// Builtin function name; usable as a call target.
    Builtin,
    ControlKeyword,
    Declarator,
    Keyword,
    BinaryOperator,
    UnaryOperator,
    Variable,
    PostfixDerefSigil,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    /// `,` or `=>`.
    Comma,
    Terminator,
    Question,
    Colon,
    Arrow,
}

impl Category {
    /// Whether a lexeme of this category ends an operand, so that a
    /// following `/` or `%` is an infix operator.
    #[must_use]
    pub const fn is_value(self) -> bool {
        matches!(
            self,
            Self::Literal
                | Self::Identifier
                | Self::Variable
                | Self::RightParen
                | Self::RightBracket
                | Self::RightBrace
        )
    }

    #[must_use]
    pub const fn is_opener(self) -> bool {
        matches!(self, Self::LeftParen | Self::LeftBracket | Self::LeftBrace)
    }

    #[must_use]
    pub const fn is_closer(self) -> bool {
        matches!(
            self,
            Self::RightParen | Self::RightBracket | Self::RightBrace
        )
    }

    /// Closing partner of an opening delimiter.
    #[must_use]
    pub const fn closer(self) -> Option<Self> {
        match self {
            Self::LeftParen => Some(Self::RightParen),
            Self::LeftBracket => Some(Self::RightBracket),
            Self::LeftBrace => Some(Self::RightBrace),
            _ => None,
        }
    }
}

/// A token annotated with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub category: Category,
}

impl Lexeme {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.token.text
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.token.span
    }

    /// Category and text both match.
    #[must_use]
    pub fn is(&self, category: Category, text: &str) -> bool {
        self.category == category && self.token.text == text
    }

    /// Operator lexeme (binary or unary) spelled `text`.
    #[must_use]
    pub fn is_operator(&self, text: &str) -> bool {
        matches!(
            self.category,
            Category::BinaryOperator | Category::UnaryOperator
        ) && self.token.text == text
    }

    /// Bare word token, regardless of the category it was given.
    #[must_use]
    pub const fn is_word(&self) -> bool {
        matches!(self.token.kind, TokenKind::Identifier)
    }

    #[must_use]
    pub fn is_fat_comma(&self) -> bool {
        matches!(self.token.kind, TokenKind::FatComma)
    }
}

/// Whether `token` ends an operand, so that a following `/` is division
/// and `%` is modulus. Nullary builtins are operands; a `}` that closed a
/// code block is not.
#[must_use]
pub fn ends_operand(token: &Token, category: Category, closed_block: bool) -> bool {
    match category {
        Category::Builtin => is_nullary(&token.text),
        Category::RightBrace => !closed_block,
        other => other.is_value(),
    }
}

/// Whether a `{` following `prev` opens a code block rather than a
/// subscript or an anonymous hash. `after_block` is set when `prev` is a
/// `}` that itself closed a code block.
#[must_use]
pub const fn brace_opens_block(prev: Option<Category>, after_block: bool) -> bool {
    match prev {
        None => true,
        Some(Category::RightBrace) => after_block,
        Some(category) => matches!(
            category,
            Category::Terminator
                | Category::RightParen
                | Category::LeftBrace
                | Category::ControlKeyword
                | Category::Keyword
                | Category::Builtin
                | Category::Identifier
                | Category::Literal
        ),
    }
}

#[must_use]
pub fn is_named_unary(word: &str) -> bool {
    NAMED_UNARY_BUILTINS.contains(&word)
}

#[must_use]
pub fn is_nullary(word: &str) -> bool {
    NULLARY_BUILTINS.contains(&word)
}

#[must_use]
pub fn takes_block(word: &str) -> bool {
    BLOCK_BUILTINS.contains(&word)
}

fn word_category(word: &str) -> Category {
    if CONTROL_KEYWORDS.contains(&word) {
        Category::ControlKeyword
    } else if DECLARATORS.contains(&word) {
        Category::Declarator
    } else if KEYWORDS.contains(&word) {
        Category::Keyword
    } else if WORD_OPERATORS.contains(&word) {
        Category::BinaryOperator
    } else if word == "not" {
        Category::UnaryOperator
    } else if word == "true" || word == "false" {
        Category::Literal
    } else if NAMED_UNARY_BUILTINS.contains(&word)
        || LIST_BUILTINS.contains(&word)
        || NULLARY_BUILTINS.contains(&word)
    {
        Category::Builtin
    } else {
        Category::Identifier
    }
}

fn operator_category(op: &str) -> Category {
    match op {
        "!" | "~" | "\\" | "++" | "--" => Category::UnaryOperator,
        _ => Category::BinaryOperator,
    }
}

/// Context-free category of a token.
#[must_use]
pub fn categorize(token: &Token) -> Category {
    match &token.kind {
        TokenKind::Number
        | TokenKind::String { .. }
        | TokenKind::QuoteWords(_)
        | TokenKind::Regex { .. } => Category::Literal,
        TokenKind::Identifier => word_category(&token.text),
        TokenKind::Variable { .. } => Category::Variable,
        TokenKind::DerefSigil(_) => Category::PostfixDerefSigil,
        TokenKind::Operator => operator_category(&token.text),
        TokenKind::OpenParen => Category::LeftParen,
        TokenKind::CloseParen => Category::RightParen,
        TokenKind::OpenBracket => Category::LeftBracket,
        TokenKind::CloseBracket => Category::RightBracket,
        TokenKind::OpenBrace => Category::LeftBrace,
        TokenKind::CloseBrace => Category::RightBrace,
        TokenKind::Comma | TokenKind::FatComma => Category::Comma,
        TokenKind::Semicolon => Category::Terminator,
        TokenKind::Question => Category::Question,
        TokenKind::Colon => Category::Colon,
        TokenKind::Arrow => Category::Arrow,
    }
}

/// Classify a token given the category of the lexeme before it.
///
/// A word right after `->` is always a method name, so keywords such as
/// `print` or `default` stay plain identifiers there.
#[must_use]
pub fn classify(token: Token, prev: Option<Category>) -> Lexeme {
    let category = match (&token.kind, prev) {
        (TokenKind::Identifier, Some(Category::Arrow)) => Category::Identifier,
        _ => categorize(&token),
    };
    Lexeme { token, category }
}

/// Iterator adaptor turning scanner output into lexemes.
pub struct Classifier<I> {
    tokens: I,
    prev: Option<Category>,
}

impl<I> Classifier<I>
where
    I: Iterator<Item = Result<Token, LexError>>,
{
    pub const fn new(tokens: I) -> Self {
        Self { tokens, prev: None }
    }
}

impl<I> Iterator for Classifier<I>
where
    I: Iterator<Item = Result<Token, LexError>>,
{
    type Item = Result<Lexeme, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.tokens.next()?;
        Some(item.map(|token| {
            let lexeme = classify(token, self.prev);
            self.prev = Some(lexeme.category);
            lexeme
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Sigil;

    fn word(text: &str) -> Token {
        Token::new(TokenKind::Identifier, text, 1, 1)
    }

    #[test]
    fn word_operators_are_binary() {
        for op in ["eq", "ne", "cmp", "and", "or", "x"] {
            assert_eq!(categorize(&word(op)), Category::BinaryOperator, "{op}");
        }
        assert_eq!(categorize(&word("not")), Category::UnaryOperator);
    }

    #[test]
    fn builtins_are_not_plain_keywords() {
        assert_eq!(categorize(&word("push")), Category::Builtin);
        assert_eq!(categorize(&word("defined")), Category::Builtin);
        assert_eq!(categorize(&word("print")), Category::Keyword);
        assert_eq!(categorize(&word("frobnicate")), Category::Identifier);
    }

    #[test]
    fn keyword_after_arrow_is_identifier() {
        let lexeme = classify(word("print"), Some(Category::Arrow));
        assert_eq!(lexeme.category, Category::Identifier);
        let lexeme = classify(word("print"), Some(Category::Terminator));
        assert_eq!(lexeme.category, Category::Keyword);
    }

    #[test]
    fn operand_context() {
        let op = Token::new(TokenKind::Operator, "+", 1, 1);
        let var = Token::new(TokenKind::Variable { sigil: Sigil::Scalar }, "$x", 1, 1);
        let close = Token::new(TokenKind::CloseBrace, "}", 1, 1);
        assert!(!ends_operand(&op, Category::BinaryOperator, false));
        assert!(!ends_operand(&word("if"), Category::ControlKeyword, false));
        assert!(ends_operand(&var, Category::Variable, false));
        assert!(ends_operand(&word("time"), Category::Builtin, false));
        assert!(!ends_operand(&word("split"), Category::Builtin, false));
        assert!(ends_operand(&close, Category::RightBrace, false));
        assert!(!ends_operand(&close, Category::RightBrace, true));
    }

    #[test]
    fn brace_context() {
        assert!(brace_opens_block(None, false));
        assert!(brace_opens_block(Some(Category::RightParen), false));
        assert!(brace_opens_block(Some(Category::Builtin), false));
        assert!(brace_opens_block(Some(Category::RightBrace), true));
        assert!(!brace_opens_block(Some(Category::RightBrace), false));
        assert!(!brace_opens_block(Some(Category::Variable), false));
        assert!(!brace_opens_block(Some(Category::BinaryOperator), false));
        assert!(!brace_opens_block(Some(Category::Arrow), false));
    }

    #[test]
    fn fat_comma_is_comma() {
        let token = Token::new(TokenKind::FatComma, "=>", 1, 1);
        assert_eq!(categorize(&token), Category::Comma);
    }
}
