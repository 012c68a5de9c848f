//! Nesting-aware scanning over lexeme spans.
//!
//! Every place that needs to find a matching delimiter or a same-level
//! boundary goes through these helpers.

use crate::lexeme::{Category, Lexeme};
use crate::parser::{ParseError, ParseErrorKind};

/// +1 for an opening bracket/brace/paren, -1 for a closing one.
#[must_use]
pub const fn nesting_delta(category: Category) -> isize {
    if category.is_opener() {
        1
    } else if category.is_closer() {
        -1
    } else {
        0
    }
}

/// Index of the `close` lexeme matching the `open` lexeme at `start`.
///
/// # Errors
///
/// Returns `ParseErrorKind::Unclosed` when the span ends first.
pub fn find_matching_close(
    span: &[Lexeme],
    open: Category,
    close: Category,
    start: usize,
) -> Result<usize, ParseError> {
    let mut depth = 0usize;
    for (i, lexeme) in span.iter().enumerate().skip(start) {
        if lexeme.category == open {
            depth += 1;
        } else if lexeme.category == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Ok(i);
            }
        }
    }

    let (delimiter, at) = span.get(start).map_or_else(
        || (String::new(), span.last().map(Lexeme::span).unwrap_or_default()),
        |l| (l.text().to_string(), l.span()),
    );
    Err(ParseError {
        kind: ParseErrorKind::Unclosed { delimiter },
        span: at,
    })
}

/// Positions in `span` at nesting depth zero where `pred` holds, scanning
/// from `start` and stopping if the scan leaves the enclosing group.
pub fn top_level_positions(
    span: &[Lexeme],
    start: usize,
    mut pred: impl FnMut(&Lexeme) -> bool,
) -> Vec<usize> {
    let mut depth = 0isize;
    let mut found = Vec::new();
    for (i, lexeme) in span.iter().enumerate().skip(start) {
        if depth == 0 && pred(lexeme) {
            found.push(i);
        }
        depth += nesting_delta(lexeme.category);
        if depth < 0 {
            break;
        }
    }
    found
}

/// First depth-zero position at or after `start` where `pred` holds.
pub fn find_at_top_level(
    span: &[Lexeme],
    start: usize,
    mut pred: impl FnMut(&Lexeme) -> bool,
) -> Option<usize> {
    let mut depth = 0isize;
    for (i, lexeme) in span.iter().enumerate().skip(start) {
        if depth == 0 && pred(lexeme) {
            return Some(i);
        }
        depth += nesting_delta(lexeme.category);
        if depth < 0 {
            return None;
        }
    }
    None
}

/// Whether a `category` lexeme occurs at depth zero.
#[must_use]
pub fn has_top_level(span: &[Lexeme], category: Category) -> bool {
    find_at_top_level(span, 0, |l| l.category == category).is_some()
}

/// Split on `separator` lexemes at depth zero. An empty span yields no
/// segments; a trailing separator yields a trailing empty segment.
#[must_use]
pub fn split_at_top_level(span: &[Lexeme], separator: Category) -> Vec<&[Lexeme]> {
    if span.is_empty() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut from = 0;
    for at in top_level_positions(span, 0, |l| l.category == separator) {
        segments.push(&span[from..at]);
        from = at + 1;
    }
    segments.push(&span[from..]);
    segments
}

/// Index of the `:` closing the ternary whose `?` sits at `start`.
///
/// Nested groups are skipped, and every unmatched `?` met on the way
/// must be closed by its own `:` before ours counts.
#[must_use]
pub fn find_ternary_colon(span: &[Lexeme], start: usize) -> Option<usize> {
    let mut pending = 0usize;
    let mut depth = 0isize;
    for (i, lexeme) in span.iter().enumerate().skip(start + 1) {
        if depth == 0 {
            match lexeme.category {
                Category::Question => pending += 1,
                Category::Colon if pending == 0 => return Some(i),
                Category::Colon => pending -= 1,
                _ => {}
            }
        }
        depth += nesting_delta(lexeme.category);
        if depth < 0 {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexeme::Classifier;
    use crate::lexer::Scanner;

    fn lex(input: &str) -> Vec<Lexeme> {
        Classifier::new(Scanner::new(input.chars()))
            .collect::<Result<_, _>>()
            .expect("should lex")
    }

    fn texts(span: &[Lexeme]) -> Vec<&str> {
        span.iter().map(Lexeme::text).collect()
    }

    #[test]
    fn matching_close_skips_nested_pairs() {
        let span = lex("( a ( b ) ( c ( d ) ) ) e");
        let close =
            find_matching_close(&span, Category::LeftParen, Category::RightParen, 0).unwrap();
        assert_eq!(close, 11);
        assert_eq!(span[close + 1].text(), "e");
    }

    #[test]
    fn matching_close_reports_unclosed() {
        let span = lex("{ a { b }");
        let err =
            find_matching_close(&span, Category::LeftBrace, Category::RightBrace, 0).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::Unclosed {
                delimiter: "{".to_string()
            }
        );
    }

    #[test]
    fn split_ignores_nested_commas() {
        let span = lex("a, f(b, c), [d, e], { x => 1, y => 2 }");
        let segments = split_at_top_level(&span, Category::Comma);
        assert_eq!(segments.len(), 4);
        assert_eq!(texts(segments[1]), ["f", "(", "b", ",", "c", ")"]);
    }

    #[test]
    fn split_keeps_trailing_empty_segment() {
        let span = lex("1, 2,");
        let segments = split_at_top_level(&span, Category::Comma);
        assert_eq!(segments.len(), 3);
        assert!(segments[2].is_empty());
        assert!(split_at_top_level(&[], Category::Comma).is_empty());
    }

    #[test]
    fn ternary_colon_skips_nested_ternaries() {
        let span = lex("$a ? $b ? 1 : 2 : 3");
        assert_eq!(find_ternary_colon(&span, 1), Some(7));
        assert_eq!(find_ternary_colon(&span, 3), Some(5));
    }

    #[test]
    fn ternary_colon_skips_groups() {
        let span = lex("$a ? f($b ? 1 : 2) : 3");
        assert_eq!(find_ternary_colon(&span, 1), Some(10));
        assert_eq!(find_ternary_colon(&lex("$a ? 1"), 1), None);
    }

    #[test]
    fn top_level_membership() {
        assert!(has_top_level(&lex("1, 2"), Category::Comma));
        assert!(!has_top_level(&lex("f(1, 2)"), Category::Comma));
    }
}
