//! Shorthand constructors for syntax tree nodes.
//!
//! The parser builds its leaves through these, and they keep expected
//! trees in tests readable.

use crate::ast::{Block, ElsifClause, Node};
use crate::token::Sigil;

impl Node {
    /// Numeric literal in source spelling.
    #[must_use]
    pub fn number(spelling: &str) -> Self {
        Self::Number(spelling.to_string())
    }

    /// Single-quoted (non-interpolating) string.
    #[must_use]
    pub fn string(value: &str) -> Self {
        Self::String {
            value: value.to_string(),
            interpolated: false,
        }
    }

    /// Double-quoted (interpolating) string.
    #[must_use]
    pub fn interpolated(value: &str) -> Self {
        Self::String {
            value: value.to_string(),
            interpolated: true,
        }
    }

    #[must_use]
    pub fn variable(sigil: Sigil, name: &str) -> Self {
        Self::Variable {
            sigil,
            name: name.to_string(),
        }
    }

    /// `$name`
    #[must_use]
    pub fn scalar(name: &str) -> Self {
        Self::variable(Sigil::Scalar, name)
    }

    /// `@name`
    #[must_use]
    pub fn array(name: &str) -> Self {
        Self::variable(Sigil::Array, name)
    }

    /// `%name`
    #[must_use]
    pub fn hash(name: &str) -> Self {
        Self::variable(Sigil::Hash, name)
    }

    #[must_use]
    pub fn bareword(name: &str) -> Self {
        Self::Bareword(name.to_string())
    }

    /// Infix node for `op`: an assignment for `=` and the compound
    /// assignments, a pattern match for `=~`/`!~`, otherwise a binary op.
    #[must_use]
    pub fn binary(op: &str, left: Self, right: Self) -> Self {
        let op = op.to_string();
        if crate::parser::precedence::is_assignment(&op) {
            Self::Assignment {
                op,
                target: Box::new(left),
                value: Box::new(right),
            }
        } else if op == "=~" || op == "!~" {
            Self::PatternMatch {
                op,
                target: Box::new(left),
                pattern: Box::new(right),
            }
        } else {
            Self::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
    }

    /// Prefix operator application.
    #[must_use]
    pub fn prefix(op: &str, operand: Self) -> Self {
        Self::UnaryOp {
            op: op.to_string(),
            operand: Box::new(operand),
            postfix: false,
        }
    }

    /// Postfix `++`/`--`.
    #[must_use]
    pub fn postfix(op: &str, operand: Self) -> Self {
        Self::UnaryOp {
            op: op.to_string(),
            operand: Box::new(operand),
            postfix: true,
        }
    }

    #[must_use]
    pub fn ternary(condition: Self, then_branch: Self, else_branch: Self) -> Self {
        Self::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// Call of a named function or builtin.
    #[must_use]
    pub fn call(name: &str, args: Vec<Self>) -> Self {
        Self::Call {
            name: name.to_string(),
            args,
        }
    }

    #[must_use]
    pub fn method_call(invocant: Self, method: &str, args: Vec<Self>) -> Self {
        Self::MethodCall {
            invocant: Box::new(invocant),
            method: method.to_string(),
            args,
        }
    }

    /// `my $x`, without an initializer.
    #[must_use]
    pub fn declare(declarator: &str, targets: Vec<Self>) -> Self {
        Self::Declaration {
            declarator: declarator.to_string(),
            targets,
            initializer: None,
        }
    }

    /// Set the initializer of a declaration. Other nodes are returned
    /// unchanged.
    #[must_use]
    pub fn initialized(self, value: Self) -> Self {
        match self {
            Self::Declaration {
                declarator,
                targets,
                ..
            } => Self::Declaration {
                declarator,
                targets,
                initializer: Some(Box::new(value)),
            },
            other => other,
        }
    }

    /// `if (COND) { ... }` without further clauses.
    #[must_use]
    pub fn if_then(condition: Self, then_block: Block) -> Self {
        Self::If {
            condition: Box::new(condition),
            then_block,
            elsif: Vec::new(),
            else_block: None,
        }
    }

    /// `unless (COND) { ... }` without further clauses.
    #[must_use]
    pub fn unless_then(condition: Self, then_block: Block) -> Self {
        Self::Unless {
            condition: Box::new(condition),
            then_block,
            elsif: Vec::new(),
            else_block: None,
        }
    }

    /// Append an `elsif` clause to an `if`/`unless` chain.
    #[must_use]
    pub fn elsif(mut self, condition: Self, block: Block) -> Self {
        if let Self::If { elsif, .. } | Self::Unless { elsif, .. } = &mut self {
            elsif.push(ElsifClause { condition, block });
        }
        self
    }

    /// Set the `else` block of an `if`/`unless` chain.
    #[must_use]
    pub fn otherwise(mut self, block: Block) -> Self {
        if let Self::If { else_block, .. } | Self::Unless { else_block, .. } = &mut self {
            *else_block = Some(block);
        }
        self
    }

    /// Unlabelled bare block.
    #[must_use]
    pub const fn block(body: Block) -> Self {
        Self::Block { label: None, body }
    }

    /// Attach a loop label. Only loops and bare blocks carry one; other
    /// nodes are returned unchanged.
    #[must_use]
    pub fn labelled(mut self, name: &str) -> Self {
        match &mut self {
            Self::While { label, .. }
            | Self::Until { label, .. }
            | Self::Foreach { label, .. }
            | Self::For { label, .. }
            | Self::Block { label, .. } => *label = Some(name.to_string()),
            _ => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::sexp;

    #[test]
    fn binary_picks_the_node_kind() {
        assert_eq!(
            Node::binary("+=", Node::scalar("x"), Node::number("1")).kind_name(),
            "Assignment"
        );
        assert_eq!(
            Node::binary("=~", Node::scalar("x"), Node::number("1")).kind_name(),
            "PatternMatch"
        );
        assert_eq!(
            Node::binary("eq", Node::scalar("x"), Node::number("1")).kind_name(),
            "BinaryOp"
        );
    }

    #[test]
    fn build_conditional_chain() {
        let node = Node::if_then(Node::scalar("a"), vec![Node::number("1")])
            .elsif(Node::scalar("b"), vec![Node::number("2")])
            .otherwise(vec![Node::number("3")]);
        assert_eq!(
            sexp(&node),
            "(if $a (block 1) (elsif $b (block 2)) (else (block 3)))"
        );
    }

    #[test]
    fn build_declaration() {
        let node = Node::declare("my", vec![Node::scalar("x")]).initialized(Node::number("5"));
        assert_eq!(sexp(&node), "(my $x 5)");
    }

    #[test]
    fn labels_only_attach_to_loops_and_blocks() {
        let node = Node::block(vec![]).labelled("OUTER");
        assert!(matches!(node, Node::Block { label: Some(ref l), .. } if l == "OUTER"));
        assert_eq!(Node::number("1").labelled("X"), Node::number("1"));
    }

    #[test]
    fn chain_helpers_ignore_other_nodes() {
        let node = Node::number("1").elsif(Node::number("2"), vec![]).otherwise(vec![]);
        assert_eq!(node, Node::number("1"));
    }
}
