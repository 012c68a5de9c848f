//! Parenthesized text rendering of syntax trees.
//!
//! [`sexp`] gives the compact one-line form used in tests and
//! diagnostics, for example `(+ 1 (* 2 3))`. [`format`] renders whole
//! programs, one top-level statement per line, breaking any form wider
//! than [`WIDTH`] columns over several indented lines.

use std::fmt;

use crate::ast::{Block, Node};

/// Column limit for [`format`].
pub const WIDTH: usize = 72;

const INDENT: &str = "  ";

/// Intermediate tree: an atom or a parenthesized list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sexp {
    Atom(String),
    List(Vec<Self>),
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(text) => f.write_str(text),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn atom(text: impl Into<String>) -> Sexp {
    Sexp::Atom(text.into())
}

/// List headed by the atom `head`.
fn form(head: &str, rest: impl IntoIterator<Item = Sexp>) -> Sexp {
    let mut items = vec![atom(head)];
    items.extend(rest);
    Sexp::List(items)
}

fn nodes<'a>(items: impl IntoIterator<Item = &'a Node>) -> impl Iterator<Item = Sexp> {
    items.into_iter().map(build)
}

fn block(body: &Block) -> Sexp {
    form("block", nodes(body))
}

fn label(label: Option<&str>) -> Option<Sexp> {
    label.map(|name| atom(format!("{name}:")))
}

fn single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

#[allow(clippy::too_many_lines)]
fn build(node: &Node) -> Sexp {
    match node {
        Node::Number(spelling) => atom(spelling.as_str()),
        Node::String {
            value,
            interpolated: true,
        } => atom(format!("{value:?}")),
        Node::String { value, .. } => atom(single_quoted(value)),
        Node::Boolean(value) => atom(value.to_string()),
        Node::Variable { sigil, name } => atom(format!("{sigil}{name}")),
        Node::Bareword(name) => atom(name.as_str()),
        Node::RegexLiteral { pattern, flags } => atom(format!("/{pattern}/{flags}")),
        Node::BinaryOp { op, left, right }
        | Node::Assignment {
            op,
            target: left,
            value: right,
        }
        | Node::PatternMatch {
            op,
            target: left,
            pattern: right,
        } => form(op, [build(left), build(right)]),
        Node::UnaryOp {
            op,
            operand,
            postfix,
        } => {
            let head = if *postfix {
                format!("post{op}")
            } else {
                op.clone()
            };
            form(&head, [build(operand)])
        }
        Node::Ternary {
            condition,
            then_branch,
            else_branch,
        } => form(
            "?:",
            [build(condition), build(then_branch), build(else_branch)],
        ),
        Node::Declaration {
            declarator,
            targets,
            initializer,
        } => {
            let targets = match targets.as_slice() {
                [single] => build(single),
                many => Sexp::List(nodes(many).collect()),
            };
            form(
                declarator,
                std::iter::once(targets).chain(initializer.as_deref().map(build)),
            )
        }
        Node::If {
            condition,
            then_block,
            elsif,
            else_block,
        }
        | Node::Unless {
            condition,
            then_block,
            elsif,
            else_block,
        } => {
            let head = if matches!(node, Node::If { .. }) {
                "if"
            } else {
                "unless"
            };
            let mut items = vec![build(condition), block(then_block)];
            items.extend(
                elsif
                    .iter()
                    .map(|clause| form("elsif", [build(&clause.condition), block(&clause.block)])),
            );
            items.extend(else_block.iter().map(|body| form("else", [block(body)])));
            form(head, items)
        }
        Node::While {
            label: name,
            condition,
            body,
        }
        | Node::Until {
            label: name,
            condition,
            body,
        } => {
            let head = if matches!(node, Node::While { .. }) {
                "while"
            } else {
                "until"
            };
            form(
                head,
                label(name.as_deref())
                    .into_iter()
                    .chain([build(condition), block(body)]),
            )
        }
        Node::Foreach {
            label: name,
            declarator,
            variable,
            iterable,
            body,
        } => {
            let variable = variable.as_deref().map(|var| match declarator {
                Some(declarator) => form(declarator, [build(var)]),
                None => build(var),
            });
            form(
                "foreach",
                label(name.as_deref())
                    .into_iter()
                    .chain(variable)
                    .chain([build(iterable), block(body)]),
            )
        }
        Node::For {
            label: name,
            init,
            condition,
            step,
            body,
        } => {
            let clause = |part: Option<&Node>| part.map_or_else(|| atom("_"), build);
            form(
                "for",
                label(name.as_deref()).into_iter().chain([
                    clause(init.as_deref()),
                    clause(condition.as_deref()),
                    clause(step.as_deref()),
                    block(body),
                ]),
            )
        }
        Node::Block { label: name, body } => {
            form("block", label(name.as_deref()).into_iter().chain(nodes(body)))
        }
        Node::DoBlock(body) => form("do", [block(body)]),
        Node::Call { name, args } => form("call", std::iter::once(atom(name)).chain(nodes(args))),
        Node::CodeCall { target, args } => {
            form("->()", std::iter::once(build(target)).chain(nodes(args)))
        }
        Node::Sub { name, params, body } => {
            let params = (!params.is_empty()).then(|| form("params", nodes(params)));
            form(
                "sub",
                name.as_deref()
                    .map(atom)
                    .into_iter()
                    .chain(params)
                    .chain([block(body)]),
            )
        }
        Node::Parameter {
            variable,
            default: None,
        } => build(variable),
        Node::Parameter {
            variable,
            default: Some(default),
        } => form("param", [build(variable), build(default)]),
        Node::Return(value) => form("return", value.as_deref().map(build)),
        Node::Last(name) => form("last", name.as_deref().map(atom)),
        Node::Next(name) => form("next", name.as_deref().map(atom)),
        Node::Redo(name) => form("redo", name.as_deref().map(atom)),
        Node::Print { filehandle, args } | Node::Say { filehandle, args } => {
            let head = if matches!(node, Node::Print { .. }) {
                "print"
            } else {
                "say"
            };
            let filehandle = filehandle.as_deref().map(|fh| form("fh", [build(fh)]));
            form(head, filehandle.into_iter().chain(nodes(args)))
        }
        Node::Die(args) => form("die", nodes(args)),
        Node::Warn(args) => form("warn", nodes(args)),
        Node::ArrayLiteral(items) => form("array", nodes(items)),
        Node::HashLiteral(items) => form("hash", nodes(items)),
        Node::List(items) => form("list", nodes(items)),
        Node::ArrayAccess { base, index } => form("[]", [build(base), build(index)]),
        Node::ArraySlice { base, indices } => form("@[]", [build(base), build(indices)]),
        Node::HashAccess { base, key } => form("{}", [build(base), build(key)]),
        Node::HashSlice { base, keys } => form("@{}", [build(base), build(keys)]),
        Node::Dereference { sigil, target } => form(&format!("deref{sigil}"), [build(target)]),
        Node::PostfixDeref { base, sigil } => form(&format!("->{sigil}*"), [build(base)]),
        Node::PostfixDerefSlice {
            base,
            sigil,
            indices,
        } => form(&format!("->{sigil}[]"), [build(base), build(indices)]),
        Node::MethodCall {
            invocant,
            method,
            args,
        } => form(
            "->",
            [build(invocant), atom(method)].into_iter().chain(nodes(args)),
        ),
        Node::Class {
            name,
            version,
            parent,
            body,
        } => form(
            "class",
            std::iter::once(atom(name))
                .chain(version.as_deref().map(|v| form("version", [atom(v)])))
                .chain(parent.as_deref().map(|p| form("isa", [atom(p)])))
                .chain(body.as_ref().map(block)),
        ),
        Node::Field {
            variable,
            attributes,
            default,
        } => {
            let attributes =
                (!attributes.is_empty()).then(|| form("attrs", attributes.iter().map(atom)));
            form(
                "field",
                std::iter::once(build(variable))
                    .chain(attributes)
                    .chain(default.as_deref().map(build)),
            )
        }
        Node::Method { name, params, body } => {
            let params = (!params.is_empty()).then(|| form("params", nodes(params)));
            form(
                "method",
                std::iter::once(atom(name))
                    .chain(params)
                    .chain([block(body)]),
            )
        }
        Node::Package {
            name,
            version,
            block: body,
        } => form(
            "package",
            std::iter::once(atom(name))
                .chain(version.as_deref().map(atom))
                .chain(body.as_ref().map(block)),
        ),
        Node::Use {
            negated,
            module,
            version,
            imports,
        } => form(
            if *negated { "no" } else { "use" },
            module
                .as_deref()
                .map(atom)
                .into_iter()
                .chain(version.as_deref().map(atom))
                .chain(nodes(imports)),
        ),
        Node::Require(target) => form("require", [build(target)]),
        Node::Try {
            body,
            catch,
            finally,
        } => {
            let catch = catch.as_ref().map(|clause| {
                form(
                    "catch",
                    clause
                        .variable
                        .as_deref()
                        .map(build)
                        .into_iter()
                        .chain([block(&clause.block)]),
                )
            });
            let finally = finally.as_ref().map(|body| form("finally", [block(body)]));
            form(
                "try",
                std::iter::once(block(body)).chain(catch).chain(finally),
            )
        }
        Node::Given { topic, body } => form("given", [build(topic), block(body)]),
        Node::When { condition, body } => form("when", [build(condition), block(body)]),
        Node::Default(body) => form("default", [block(body)]),
        Node::Match { subject, body } => form("match", [build(subject), block(body)]),
        Node::Case { pattern, body } => form("case", [build(pattern), block(body)]),
        Node::Error(error) => form("error", [atom(format!("{:?}", error.to_string()))]),
    }
}

/// Compact single-line rendering of one node.
#[must_use]
pub fn sexp(node: &Node) -> String {
    build(node).to_string()
}

/// Render `node` starting at `indent` levels, breaking lists that would
/// overflow [`WIDTH`] one child per line.
fn write_pretty(out: &mut String, expr: &Sexp, indent: usize) {
    let flat = expr.to_string();
    let items = match expr {
        Sexp::List(items) if indent * INDENT.len() + flat.len() > WIDTH && items.len() > 1 => {
            items
        }
        _ => {
            out.push_str(&flat);
            return;
        }
    };
    out.push('(');
    let (head, rest) = items.split_at(1);
    write_pretty(out, &head[0], indent);
    for item in rest {
        out.push('\n');
        for _ in 0..=indent {
            out.push_str(INDENT);
        }
        write_pretty(out, item, indent + 1);
    }
    out.push(')');
}

/// Indented rendering of one node, wrapped at [`WIDTH`] columns.
#[must_use]
pub fn pretty(node: &Node) -> String {
    let mut out = String::new();
    write_pretty(&mut out, &build(node), 0);
    out
}

/// Render a statement sequence, one top-level statement per line.
#[must_use]
pub fn format(statements: &[Node]) -> String {
    let mut out = String::new();
    for node in statements {
        write_pretty(&mut out, &build(node), 0);
        out.push('\n');
    }
    out
}
