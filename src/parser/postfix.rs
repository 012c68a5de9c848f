//! Postfix chains: subscripts, arrow forms, method calls and postfix
//! increment. Each step wraps the node built so far.

use crate::ast::Node;
use crate::lexeme::{Category, Lexeme};
use crate::token::{Sigil, TokenKind};

use super::expr::{self, Cursor};

/// Whether a direct `[...]`/`{...}` (no arrow) can follow `node`.
fn accepts_subscript(node: &Node) -> bool {
    match node {
        Node::Variable { sigil, .. } | Node::Dereference { sigil, .. } => {
            matches!(sigil, Sigil::Scalar | Sigil::Array)
        }
        Node::ArrayAccess { .. } | Node::HashAccess { .. } | Node::CodeCall { .. } => true,
        _ => false,
    }
}

fn is_lvalue(node: &Node) -> bool {
    matches!(
        node,
        Node::Variable { .. }
            | Node::ArrayAccess { .. }
            | Node::HashAccess { .. }
            | Node::Dereference { .. }
            | Node::PostfixDeref { .. }
    )
}

/// Re-sigil a container base: `$a` indexed by `[...]` names `@a`.
fn container(node: Node, sigil: Sigil) -> Node {
    match node {
        Node::Variable { name, .. } => Node::Variable { sigil, name },
        Node::Dereference { target, .. } => Node::Dereference { sigil, target },
        other => other,
    }
}

impl Cursor<'_> {
    pub(super) fn parse_postfix(&mut self, mut node: Node) -> Node {
        while let Some(next) = self.peek() {
            node = match next.category {
                Category::LeftBracket | Category::LeftBrace if accepts_subscript(&node) => {
                    self.pos += 1;
                    self.direct_subscript(node, next)
                }
                Category::Arrow => {
                    self.pos += 1;
                    self.arrow(node, next)
                }
                Category::UnaryOperator
                    if matches!(next.text(), "++" | "--") && is_lvalue(&node) =>
                {
                    self.pos += 1;
                    Node::postfix(next.text(), node)
                }
                _ => break,
            };
        }
        node
    }

    /// `$a[0]`, `$h{k}`, `@a[1, 2]`, `@h{qw(a b)}`, `$$r[0]`, `$x[0][1]`.
    fn direct_subscript(&mut self, base: Node, open: &Lexeme) -> Node {
        let inner = match self.take_group(open) {
            Ok(inner) => inner,
            Err(e) => return Node::Error(e),
        };
        let bracket = open.category == Category::LeftBracket;
        let inner = if bracket {
            expr::parse_subscript(inner, open.span())
        } else {
            expr::parse_hash_key(inner, open.span())
        };
        let sigil = match &base {
            Node::Variable { sigil, .. } | Node::Dereference { sigil, .. } => Some(*sigil),
            _ => None,
        };

        match (sigil, bracket) {
            (Some(Sigil::Array), true) => Node::ArraySlice {
                base: Box::new(base),
                indices: Box::new(inner),
            },
            (Some(Sigil::Array), false) => Node::HashSlice {
                base: Box::new(container(base, Sigil::Hash)),
                keys: Box::new(inner),
            },
            (_, true) => Node::ArrayAccess {
                base: Box::new(container(base, Sigil::Array)),
                index: Box::new(inner),
            },
            (_, false) => Node::HashAccess {
                base: Box::new(container(base, Sigil::Hash)),
                key: Box::new(inner),
            },
        }
    }

    fn arrow(&mut self, base: Node, arrow: &Lexeme) -> Node {
        let Some(next) = self.advance() else {
            return expected_member(None, arrow);
        };
        match next.category {
            Category::LeftBracket => match self.take_group(next) {
                Ok(inner) => Node::ArrayAccess {
                    base: Box::new(base),
                    index: Box::new(expr::parse_subscript(inner, next.span())),
                },
                Err(e) => Node::Error(e),
            },
            Category::LeftBrace => match self.take_group(next) {
                Ok(inner) => Node::HashAccess {
                    base: Box::new(base),
                    key: Box::new(expr::parse_hash_key(inner, next.span())),
                },
                Err(e) => Node::Error(e),
            },
            Category::LeftParen => match self.take_group(next) {
                Ok(inner) => Node::CodeCall {
                    target: Box::new(base),
                    args: expr::parse_elements(inner, next.span()),
                },
                Err(e) => Node::Error(e),
            },
            Category::PostfixDerefSigil => self.postfix_deref(base, next),
            Category::Variable => {
                let args = self.method_args();
                Node::method_call(base, next.text(), args)
            }
            _ if next.is_word() => {
                let args = self.method_args();
                Node::method_call(base, next.text(), args)
            }
            _ => expected_member(Some(next), arrow),
        }
    }

    fn method_args(&mut self) -> Vec<Node> {
        let Some(open) = self.peek().filter(|l| l.category == Category::LeftParen) else {
            return Vec::new();
        };
        self.pos += 1;
        match self.take_group(open) {
            Ok(inner) => expr::parse_elements(inner, open.span()),
            Err(e) => vec![Node::Error(e)],
        }
    }

    /// `->@*`, `->%*`, `->$*`, `->@[...]`, `->@{...}`.
    fn postfix_deref(&mut self, base: Node, lexeme: &Lexeme) -> Node {
        let TokenKind::DerefSigil(sigil) = lexeme.token.kind else {
            return expected_member(Some(lexeme), lexeme);
        };
        match self.peek() {
            Some(star) if star.is_operator("*") => {
                self.pos += 1;
                Node::PostfixDeref {
                    base: Box::new(base),
                    sigil,
                }
            }
            Some(open)
                if matches!(
                    open.category,
                    Category::LeftBracket | Category::LeftBrace
                ) =>
            {
                self.pos += 1;
                let inner = match self.take_group(open) {
                    Ok(inner) => inner,
                    Err(e) => return Node::Error(e),
                };
                let indices = if open.category == Category::LeftBracket {
                    expr::parse_subscript(inner, open.span())
                } else {
                    expr::parse_hash_key(inner, open.span())
                };
                Node::PostfixDerefSlice {
                    base: Box::new(base),
                    sigil,
                    indices: Box::new(indices),
                }
            }
            found => expr::expected("'*', '[' or '{' after postfix sigil", found, lexeme.span()),
        }
    }
}

fn expected_member(found: Option<&Lexeme>, arrow: &Lexeme) -> Node {
    expr::expected(
        "subscript, method or dereference after '->'",
        found,
        arrow.span(),
    )
}
