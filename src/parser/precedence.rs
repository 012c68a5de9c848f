//! Binary operator precedence table.
//!
//! Higher levels bind tighter. Levels follow the conventional Perl
//! ordering, lowest first.

/// Associativity of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Threshold that admits every operator.
pub const LOWEST: u8 = 1;
/// Operand level of the `not` word operator.
pub const NOT: u8 = 3;
/// Level of `=` and the compound assignments; also the level of one
/// element in a comma-separated list.
pub const ASSIGNMENT: u8 = 4;
/// Level of `?:`.
pub const TERNARY: u8 = 5;
/// Operand level of named unary builtins such as `defined` or `ref`.
pub const NAMED_UNARY: u8 = 13;
/// Level of `**`, the only operator binding tighter than prefix `-` or `!`.
pub const EXPONENT: u8 = 19;

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", ".=", "%=", "x=", "**=", "&=", "|=", "^=", "<<=", ">>=", "&&=",
    "||=", "//=",
];

#[must_use]
pub fn is_assignment(op: &str) -> bool {
    ASSIGNMENT_OPERATORS.contains(&op)
}

/// Precedence and associativity of a binary operator, or `None` when
/// `op` is not one.
#[must_use]
pub fn binary_precedence(op: &str) -> Option<(u8, Assoc)> {
    if is_assignment(op) {
        return Some((ASSIGNMENT, Assoc::Right));
    }
    let entry = match op {
        "or" | "xor" => (1, Assoc::Left),
        "and" => (2, Assoc::Left),
        ".." | "..." => (6, Assoc::Left),
        "||" | "//" => (7, Assoc::Left),
        "&&" => (8, Assoc::Left),
        "|" | "^" => (9, Assoc::Left),
        "&" => (10, Assoc::Left),
        "==" | "!=" | "<=>" | "eq" | "ne" | "cmp" | "~~" => (11, Assoc::Left),
        "<" | ">" | "<=" | ">=" | "lt" | "gt" | "le" | "ge" => (12, Assoc::Left),
        "isa" => (NAMED_UNARY, Assoc::Left),
        "<<" | ">>" => (14, Assoc::Left),
        "+" | "-" | "." => (15, Assoc::Left),
        "*" | "/" | "%" | "x" => (16, Assoc::Left),
        "=~" | "!~" => (17, Assoc::Left),
        "**" => (EXPONENT, Assoc::Right),
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(op: &str) -> u8 {
        binary_precedence(op).map(|(p, _)| p).expect("known operator")
    }

    #[test]
    fn ordering_matches_conventional_table() {
        assert!(level("or") < level("and"));
        assert!(level("and") < level("="));
        assert!(level("=") < TERNARY);
        assert!(TERNARY < level(".."));
        assert!(level("||") < level("&&"));
        assert!(level("==") < level("<"));
        assert!(level("+") < level("*"));
        assert!(level("*") < level("=~"));
        assert!(level("=~") < level("**"));
    }

    #[test]
    fn right_associative_operators() {
        for op in ["=", "+=", "//=", "**"] {
            assert_eq!(binary_precedence(op).map(|(_, a)| a), Some(Assoc::Right), "{op}");
        }
        assert_eq!(binary_precedence("-").map(|(_, a)| a), Some(Assoc::Left));
    }

    #[test]
    fn non_operators() {
        assert_eq!(binary_precedence(","), None);
        assert_eq!(binary_precedence("->"), None);
        assert_eq!(binary_precedence("!"), None);
    }
}
