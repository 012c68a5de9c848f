//! Statement-level syntax tree.
//!
//! Each node owns its children exclusively. Optional parts are `Option`
//! fields; required parts are always present, possibly as
//! [`Node::Error`] when the source was malformed.

use crate::parser::ParseError;
use crate::token::Sigil;

/// Ordered statement list of a block body.
pub type Block = Vec<Node>;

/// One `elsif (COND) { ... }` link of a conditional chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElsifClause {
    pub condition: Node,
    pub block: Block,
}

/// `catch ($e) { ... }` clause of a `try`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchClause {
    pub variable: Option<Box<Node>>,
    pub block: Block,
}

/// A parsed statement or expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Numeric literal in source spelling (`42`, `0x1f`, `1_000`, `v5.36`).
    Number(String),
    String {
        value: String,
        interpolated: bool,
    },
    Boolean(bool),
    Variable {
        sigil: Sigil,
        name: String,
    },
    /// Unquoted identifier used as a value (class name, filehandle).
    Bareword(String),
    BinaryOp {
        op: String,
        left: Box<Self>,
        right: Box<Self>,
    },
    UnaryOp {
        op: String,
        operand: Box<Self>,
        postfix: bool,
    },
    Ternary {
        condition: Box<Self>,
        then_branch: Box<Self>,
        else_branch: Box<Self>,
    },
    /// `my $x`, `our ($a, @b) = ...`.
    Declaration {
        declarator: String,
        targets: Vec<Self>,
        initializer: Option<Box<Self>>,
    },
    Assignment {
        op: String,
        target: Box<Self>,
        value: Box<Self>,
    },
    If {
        condition: Box<Self>,
        then_block: Block,
        elsif: Vec<ElsifClause>,
        else_block: Option<Block>,
    },
    Unless {
        condition: Box<Self>,
        then_block: Block,
        elsif: Vec<ElsifClause>,
        else_block: Option<Block>,
    },
    While {
        label: Option<String>,
        condition: Box<Self>,
        body: Block,
    },
    Until {
        label: Option<String>,
        condition: Box<Self>,
        body: Block,
    },
    /// `foreach my $x (LIST) { ... }`; no variable means the topic `$_`.
    Foreach {
        label: Option<String>,
        declarator: Option<String>,
        variable: Option<Box<Self>>,
        iterable: Box<Self>,
        body: Block,
    },
    /// C-style `for (INIT; COND; STEP) { ... }`.
    For {
        label: Option<String>,
        init: Option<Box<Self>>,
        condition: Option<Box<Self>>,
        step: Option<Box<Self>>,
        body: Block,
    },
    Block {
        label: Option<String>,
        body: Block,
    },
    DoBlock(Block),
    Call {
        name: String,
        args: Vec<Self>,
    },
    /// `$code->(ARGS)`.
    CodeCall {
        target: Box<Self>,
        args: Vec<Self>,
    },
    /// Named or anonymous subroutine; also `BEGIN`/`END` blocks.
    Sub {
        name: Option<String>,
        params: Vec<Self>,
        body: Block,
    },
    Parameter {
        variable: Box<Self>,
        default: Option<Box<Self>>,
    },
    Return(Option<Box<Self>>),
    Last(Option<String>),
    Next(Option<String>),
    Redo(Option<String>),
    Print {
        filehandle: Option<Box<Self>>,
        args: Vec<Self>,
    },
    Say {
        filehandle: Option<Box<Self>>,
        args: Vec<Self>,
    },
    Die(Vec<Self>),
    Warn(Vec<Self>),
    ArrayLiteral(Vec<Self>),
    HashLiteral(Vec<Self>),
    List(Vec<Self>),
    /// `$a[0]` (base `@a`) or `$r->[0]` (base `$r`).
    ArrayAccess {
        base: Box<Self>,
        index: Box<Self>,
    },
    ArraySlice {
        base: Box<Self>,
        indices: Box<Self>,
    },
    /// `$h{k}` (base `%h`) or `$r->{k}` (base `$r`).
    HashAccess {
        base: Box<Self>,
        key: Box<Self>,
    },
    HashSlice {
        base: Box<Self>,
        keys: Box<Self>,
    },
    /// Circumfix dereference: `@{ EXPR }`, `%$ref`, `$$ref`.
    Dereference {
        sigil: Sigil,
        target: Box<Self>,
    },
    /// `$r->@*`, `$r->%*`, `$r->$*`.
    PostfixDeref {
        base: Box<Self>,
        sigil: Sigil,
    },
    /// `$r->@[...]`, `$r->@{...}`, `$r->%[...]`, `$r->%{...}`.
    PostfixDerefSlice {
        base: Box<Self>,
        sigil: Sigil,
        indices: Box<Self>,
    },
    MethodCall {
        invocant: Box<Self>,
        method: String,
        args: Vec<Self>,
    },
    Class {
        name: String,
        version: Option<String>,
        parent: Option<String>,
        body: Option<Block>,
    },
    Field {
        variable: Box<Self>,
        attributes: Vec<String>,
        default: Option<Box<Self>>,
    },
    Method {
        name: String,
        params: Vec<Self>,
        body: Block,
    },
    Package {
        name: String,
        version: Option<String>,
        block: Option<Block>,
    },
    /// `use`/`no`. `module` is `None` for `use VERSION`.
    Use {
        negated: bool,
        module: Option<String>,
        version: Option<String>,
        imports: Vec<Self>,
    },
    Require(Box<Self>),
    Try {
        body: Block,
        catch: Option<CatchClause>,
        finally: Option<Block>,
    },
    Given {
        topic: Box<Self>,
        body: Block,
    },
    When {
        condition: Box<Self>,
        body: Block,
    },
    Default(Block),
    Match {
        subject: Box<Self>,
        body: Block,
    },
    Case {
        pattern: Box<Self>,
        body: Block,
    },
    RegexLiteral {
        pattern: String,
        flags: String,
    },
    /// `TARGET =~ PATTERN` or `TARGET !~ PATTERN`.
    PatternMatch {
        op: String,
        target: Box<Self>,
        pattern: Box<Self>,
    },
    Error(ParseError),
}

impl Node {
    /// Short kind name, used by the renderer and in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::String { .. } => "String",
            Self::Boolean(_) => "Boolean",
            Self::Variable { .. } => "Variable",
            Self::Bareword(_) => "Bareword",
            Self::BinaryOp { .. } => "BinaryOp",
            Self::UnaryOp { .. } => "UnaryOp",
            Self::Ternary { .. } => "Ternary",
            Self::Declaration { .. } => "Declaration",
            Self::Assignment { .. } => "Assignment",
            Self::If { .. } => "If",
            Self::Unless { .. } => "Unless",
            Self::While { .. } => "While",
            Self::Until { .. } => "Until",
            Self::Foreach { .. } => "Foreach",
            Self::For { .. } => "For",
            Self::Block { .. } => "Block",
            Self::DoBlock(_) => "DoBlock",
            Self::Call { .. } => "Call",
            Self::CodeCall { .. } => "CodeCall",
            Self::Sub { .. } => "Sub",
            Self::Parameter { .. } => "Parameter",
            Self::Return(_) => "Return",
            Self::Last(_) => "Last",
            Self::Next(_) => "Next",
            Self::Redo(_) => "Redo",
            Self::Print { .. } => "Print",
            Self::Say { .. } => "Say",
            Self::Die(_) => "Die",
            Self::Warn(_) => "Warn",
            Self::ArrayLiteral(_) => "ArrayLiteral",
            Self::HashLiteral(_) => "HashLiteral",
            Self::List(_) => "List",
            Self::ArrayAccess { .. } => "ArrayAccess",
            Self::ArraySlice { .. } => "ArraySlice",
            Self::HashAccess { .. } => "HashAccess",
            Self::HashSlice { .. } => "HashSlice",
            Self::Dereference { .. } => "Dereference",
            Self::PostfixDeref { .. } => "PostfixDeref",
            Self::PostfixDerefSlice { .. } => "PostfixDerefSlice",
            Self::MethodCall { .. } => "MethodCall",
            Self::Class { .. } => "Class",
            Self::Field { .. } => "Field",
            Self::Method { .. } => "Method",
            Self::Package { .. } => "Package",
            Self::Use { .. } => "Use",
            Self::Require(_) => "Require",
            Self::Try { .. } => "Try",
            Self::Given { .. } => "Given",
            Self::When { .. } => "When",
            Self::Default(_) => "Default",
            Self::Match { .. } => "Match",
            Self::Case { .. } => "Case",
            Self::RegexLiteral { .. } => "RegexLiteral",
            Self::PatternMatch { .. } => "PatternMatch",
            Self::Error(_) => "Error",
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        let mut out: Vec<&Self> = Vec::new();
        match self {
            Self::Number(_)
            | Self::String { .. }
            | Self::Boolean(_)
            | Self::Variable { .. }
            | Self::Bareword(_)
            | Self::Last(_)
            | Self::Next(_)
            | Self::Redo(_)
            | Self::RegexLiteral { .. }
            | Self::Package { block: None, .. }
            | Self::Error(_) => {}
            Self::BinaryOp { left, right, .. } => {
                out.push(left.as_ref());
                out.push(right.as_ref());
            }
            Self::UnaryOp { operand, .. } => out.push(operand),
            Self::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push(condition.as_ref());
                out.push(then_branch.as_ref());
                out.push(else_branch.as_ref());
            }
            Self::Declaration {
                targets,
                initializer,
                ..
            } => {
                out.extend(targets);
                out.extend(initializer.as_deref());
            }
            Self::Assignment { target, value, .. } => {
                out.push(target.as_ref());
                out.push(value.as_ref());
            }
            Self::If {
                condition,
                then_block,
                elsif,
                else_block,
            }
            | Self::Unless {
                condition,
                then_block,
                elsif,
                else_block,
            } => {
                out.push(condition.as_ref());
                out.extend(then_block);
                for clause in elsif {
                    out.push(&clause.condition);
                    out.extend(&clause.block);
                }
                out.extend(else_block.iter().flatten());
            }
            Self::While {
                condition, body, ..
            }
            | Self::Until {
                condition, body, ..
            }
            | Self::When {
                condition, body, ..
            } => {
                out.push(condition.as_ref());
                out.extend(body);
            }
            Self::Foreach {
                variable,
                iterable,
                body,
                ..
            } => {
                out.extend(variable.as_deref());
                out.push(iterable.as_ref());
                out.extend(body);
            }
            Self::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                out.extend(init.as_deref());
                out.extend(condition.as_deref());
                out.extend(step.as_deref());
                out.extend(body);
            }
            Self::Block { body, .. }
            | Self::DoBlock(body)
            | Self::Default(body)
            | Self::Package {
                block: Some(body), ..
            } => out.extend(body),
            Self::Call { args, .. }
            | Self::Die(args)
            | Self::Warn(args)
            | Self::ArrayLiteral(args)
            | Self::HashLiteral(args)
            | Self::List(args)
            | Self::Use { imports: args, .. } => out.extend(args),
            Self::CodeCall { target, args } => {
                out.push(target.as_ref());
                out.extend(args);
            }
            Self::Sub { params, body, .. } | Self::Method { params, body, .. } => {
                out.extend(params);
                out.extend(body);
            }
            Self::Parameter { variable, default } => {
                out.push(variable.as_ref());
                out.extend(default.as_deref());
            }
            Self::Return(value) => out.extend(value.as_deref()),
            Self::Print { filehandle, args } | Self::Say { filehandle, args } => {
                out.extend(filehandle.as_deref());
                out.extend(args);
            }
            Self::ArrayAccess { base, index: inner }
            | Self::ArraySlice {
                base,
                indices: inner,
            }
            | Self::HashAccess { base, key: inner }
            | Self::HashSlice { base, keys: inner }
            | Self::PostfixDerefSlice {
                base,
                indices: inner,
                ..
            } => {
                out.push(base.as_ref());
                out.push(inner.as_ref());
            }
            Self::Dereference { target, .. } => out.push(target),
            Self::PostfixDeref { base, .. } => out.push(base),
            Self::MethodCall { invocant, args, .. } => {
                out.push(invocant.as_ref());
                out.extend(args);
            }
            Self::Class { body, .. } => out.extend(body.iter().flatten()),
            Self::Field {
                variable, default, ..
            } => {
                out.push(variable.as_ref());
                out.extend(default.as_deref());
            }
            Self::Require(target) => out.push(target),
            Self::Try {
                body,
                catch,
                finally,
            } => {
                out.extend(body);
                if let Some(clause) = catch {
                    out.extend(clause.variable.as_deref());
                    out.extend(&clause.block);
                }
                out.extend(finally.iter().flatten());
            }
            Self::Given { topic: head, body }
            | Self::Match {
                subject: head,
                body,
            }
            | Self::Case {
                pattern: head,
                body,
            } => {
                out.push(head.as_ref());
                out.extend(body);
            }
            Self::PatternMatch {
                target, pattern, ..
            } => {
                out.push(target.as_ref());
                out.push(pattern.as_ref());
            }
        }
        out
    }

    /// Every `Error` node in this subtree, depth-first.
    #[must_use]
    pub fn errors(&self) -> Vec<&ParseError> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Self::Error(error) = node {
                found.push(error);
            }
            stack.extend(node.children().into_iter().rev());
        }
        found
    }
}
