//! Statement dispatch and block-bearing productions.

use tracing::trace;

use crate::ast::{Block, CatchClause, ElsifClause, Node};
use crate::depth;
use crate::lexeme::{Category, Lexeme};
use crate::token::{Span, TokenKind};

use super::ParseErrorKind;
use super::boundary;
use super::expr::{self, Cursor};

const MODIFIERS: &[&str] = &["if", "unless", "while", "until", "for", "foreach"];

fn is_modifier(lexeme: &Lexeme) -> bool {
    lexeme.category == Category::ControlKeyword && MODIFIERS.contains(&lexeme.text())
}

/// Parse one buffered statement. Returns `None` for an empty statement.
pub(super) fn parse_statement(span: &[Lexeme]) -> Option<Node> {
    let span = match span {
        [rest @ .., last] if last.category == Category::Terminator => rest,
        _ => span,
    };
    let first = span.first()?;

    let (label, body) = match span {
        [name, colon, rest @ ..]
            if name.category == Category::Identifier && colon.category == Category::Colon =>
        {
            (Some(name.text()), rest)
        }
        _ => (None, span),
    };
    if body.is_empty() {
        return Some(expr::expected("statement after label", None, first.span()));
    }

    let node = postfix_modifier(body).unwrap_or_else(|| dispatch(body));
    Some(match label {
        Some(label) => node.labelled(label),
        None => node,
    })
}

/// Statement list of a block body.
pub(super) fn parse_block(inner: &[Lexeme]) -> Block {
    boundary::split_statements(inner)
        .into_iter()
        .filter_map(parse_statement)
        .collect()
}

/// `STMT if COND;` and friends, rewritten to the block form.
fn postfix_modifier(span: &[Lexeme]) -> Option<Node> {
    if span.first()?.category == Category::ControlKeyword {
        return None;
    }
    let at = depth::find_at_top_level(span, 0, is_modifier)?;
    let keyword = &span[at];
    trace!(modifier = keyword.text(), "postfix modifier");

    let inner = vec![dispatch(&span[..at])];
    let condition = match &span[at + 1..] {
        [] => expr::expected("condition", None, keyword.span()),
        cond => expr::parse_expression(cond, keyword.span()),
    };
    Some(match keyword.text() {
        "if" => Node::if_then(condition, inner),
        "unless" => Node::unless_then(condition, inner),
        "while" => Node::While {
            label: None,
            condition: Box::new(condition),
            body: inner,
        },
        "until" => Node::Until {
            label: None,
            condition: Box::new(condition),
            body: inner,
        },
        _ => Node::Foreach {
            label: None,
            declarator: None,
            variable: None,
            iterable: Box::new(condition),
            body: inner,
        },
    })
}

fn dispatch(span: &[Lexeme]) -> Node {
    let Some(head) = span.first() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, Span::default());
    };
    trace!(head = head.text(), category = ?head.category, "statement");
    let mut cursor = Cursor::new(span, head.span());
    let second = span.get(1);

    let node = match (head.category, head.text()) {
        (Category::ControlKeyword, "if" | "unless") => parse_conditional(&mut cursor),
        (Category::ControlKeyword, "while" | "until") => parse_while(&mut cursor),
        (Category::ControlKeyword, "for" | "foreach") => parse_for(&mut cursor),
        (Category::ControlKeyword | Category::Keyword, "elsif" | "else" | "catch" | "finally") => {
            return expr::error(
                ParseErrorKind::Dangling {
                    keyword: head.text().to_string(),
                },
                head.span(),
            );
        }
        (Category::LeftBrace, _) => Node::block(cursor.parse_block()),
        (Category::Keyword, "sub") if second.is_some_and(Lexeme::is_word) => {
            parse_named_sub(&mut cursor)
        }
        (Category::Keyword, "class") => parse_class(&mut cursor),
        (Category::Keyword, "field") => parse_field(&mut cursor),
        (Category::Keyword, "method") => parse_method(&mut cursor),
        (Category::Keyword, "package") => parse_package(&mut cursor),
        (Category::Keyword, "use" | "no") => parse_use(&mut cursor),
        (Category::Keyword, "try") => parse_try(&mut cursor),
        (Category::Keyword, "given" | "when" | "match" | "case") => parse_topic(&mut cursor),
        (Category::Keyword, "default") => {
            cursor.advance();
            Node::Default(cursor.parse_block())
        }
        (Category::Identifier, "BEGIN" | "END")
            if second.is_some_and(|l| l.category == Category::LeftBrace) =>
        {
            cursor.advance();
            Node::Sub {
                name: Some(head.text().to_string()),
                params: Vec::new(),
                body: cursor.parse_block(),
            }
        }
        (Category::Declarator, _) => {
            return fold_declaration(expr::parse_expression(span, head.span()));
        }
        _ => return expr::parse_expression(span, head.span()),
    };
    cursor.finish(node)
}

/// `my $x = EXPR` parses as an assignment onto a declaration; fold the
/// value into the declaration's initializer.
fn fold_declaration(node: Node) -> Node {
    match node {
        Node::Assignment { op, target, value }
            if op == "="
                && matches!(
                    *target,
                    Node::Declaration {
                        initializer: None,
                        ..
                    }
                ) =>
        {
            (*target).initialized(*value)
        }
        other => other,
    }
}

/// `(EXPR)` after a keyword. Without a `(`, the cursor skips to the next
/// top-level `{` so the block can still be parsed.
fn parse_condition(cursor: &mut Cursor<'_>, keyword: &Lexeme) -> Node {
    match cursor.peek() {
        Some(open) if open.category == Category::LeftParen => {
            cursor.advance();
            match cursor.take_group(open) {
                Ok([]) => expr::expected("condition", None, open.span()),
                Ok(inner) => expr::parse_expression(inner, open.span()),
                Err(e) => Node::Error(e),
            }
        }
        found => {
            let node = expr::expected("'(' after keyword", found, keyword.span());
            let skip = depth::find_at_top_level(cursor.rest(), 0, |l| {
                l.category == Category::LeftBrace
            });
            cursor.skip_to(skip.unwrap_or(usize::MAX));
            node
        }
    }
}

fn parse_conditional(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let condition = Box::new(parse_condition(cursor, keyword));
    let then_block = cursor.parse_block();

    let mut elsif = Vec::new();
    while let Some(link) = cursor.eat(Category::ControlKeyword, "elsif") {
        let condition = parse_condition(cursor, link);
        let block = cursor.parse_block();
        elsif.push(ElsifClause { condition, block });
    }
    let else_block = cursor
        .eat(Category::ControlKeyword, "else")
        .map(|_| cursor.parse_block());

    if keyword.text() == "unless" {
        Node::Unless {
            condition,
            then_block,
            elsif,
            else_block,
        }
    } else {
        Node::If {
            condition,
            then_block,
            elsif,
            else_block,
        }
    }
}

fn parse_while(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let condition = Box::new(parse_condition(cursor, keyword));
    let body = cursor.parse_block();
    if keyword.text() == "until" {
        Node::Until {
            label: None,
            condition,
            body,
        }
    } else {
        Node::While {
            label: None,
            condition,
            body,
        }
    }
}

/// One clause of a C-style `for`; empty clauses are absent.
fn for_clause(segment: &[Lexeme], keyword: &Lexeme) -> Option<Box<Node>> {
    if segment.is_empty() {
        return None;
    }
    let node = if segment[0].category == Category::Declarator {
        fold_declaration(expr::parse_expression(segment, keyword.span()))
    } else {
        expr::parse_expression(segment, keyword.span())
    };
    Some(Box::new(node))
}

/// `foreach [my] [$var] (LIST) BLOCK` or `for (INIT; COND; STEP) BLOCK`.
fn parse_for(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let declarator = cursor
        .peek()
        .filter(|l| l.category == Category::Declarator)
        .map(|l| l.text().to_string());
    if declarator.is_some() {
        cursor.advance();
    }
    let variable = cursor.peek().and_then(expr::as_variable);
    if variable.is_some() {
        cursor.advance();
    }

    let list = match cursor.peek() {
        Some(open) if open.category == Category::LeftParen => {
            cursor.advance();
            cursor.take_group(open).map_err(Node::Error)
        }
        found => Err(expr::expected("'(' after loop variable", found, keyword.span())),
    };

    if let Ok(inner) = list {
        if declarator.is_none()
            && variable.is_none()
            && depth::has_top_level(inner, Category::Terminator)
        {
            let clauses = depth::split_at_top_level(inner, Category::Terminator);
            let [init, condition, step] = clauses.as_slice() else {
                cursor.parse_block();
                return expr::expected("three clauses in 'for (;;)'", None, keyword.span());
            };
            let (init, condition, step) = (
                for_clause(init, keyword),
                for_clause(condition, keyword),
                for_clause(step, keyword),
            );
            return Node::For {
                label: None,
                init,
                condition,
                step,
                body: cursor.parse_block(),
            };
        }
    }

    let iterable = match list {
        Ok([]) => Node::List(Vec::new()),
        Ok(inner) => expr::parse_expression(inner, keyword.span()),
        Err(node) => node,
    };
    Node::Foreach {
        label: None,
        declarator,
        variable: variable.map(Box::new),
        iterable: Box::new(iterable),
        body: cursor.parse_block(),
    }
}

/// Parameter list of a signature: `$x`, `@rest`, `$y = 10`.
pub(super) fn parse_signature(inner: &[Lexeme], anchor: Span) -> Vec<Node> {
    depth::split_at_top_level(inner, Category::Comma)
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| parse_parameter(segment, anchor))
        .collect()
}

fn parse_parameter(segment: &[Lexeme], anchor: Span) -> Node {
    let Some(variable) = segment.first().and_then(expr::as_variable) else {
        return expr::expected("parameter", segment.first(), anchor);
    };
    let default = match &segment[1..] {
        [] => None,
        [op, rest @ ..] if is_default_operator(op) => Some(if rest.is_empty() {
            expr::error(
                ParseErrorKind::MissingOperand {
                    operator: op.text().to_string(),
                },
                op.span(),
            )
        } else {
            expr::parse_expression(rest, op.span())
        }),
        [other, ..] => Some(expr::expected("'=' or ','", Some(other), anchor)),
    };
    Node::Parameter {
        variable: Box::new(variable),
        default: default.map(Box::new),
    }
}

fn is_default_operator(lexeme: &Lexeme) -> bool {
    lexeme.category == Category::BinaryOperator && matches!(lexeme.text(), "=" | "//=" | "||=")
}

/// Consume a word lexeme, or report what was found instead.
fn expect_name(cursor: &mut Cursor<'_>, what: &'static str, after: &Lexeme) -> Result<String, Node> {
    match cursor.peek() {
        Some(word) if word.is_word() => {
            cursor.advance();
            Ok(word.text().to_string())
        }
        found => Err(expr::expected(what, found, after.span())),
    }
}

fn take_version(cursor: &mut Cursor<'_>) -> Option<String> {
    let version = cursor
        .peek()
        .filter(|l| l.token.kind == TokenKind::Number)?;
    cursor.advance();
    Some(version.text().to_string())
}

fn parse_named_sub(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let name = match expect_name(cursor, "subroutine name", keyword) {
        Ok(name) => name,
        Err(node) => return node,
    };
    let params = cursor.parse_params();
    cursor.parse_attributes();
    // `sub name;` is a forward declaration.
    let body = if cursor.peek().is_some() {
        cursor.parse_block()
    } else {
        Vec::new()
    };
    Node::Sub {
        name: Some(name),
        params,
        body,
    }
}

/// `class NAME [VERSION] [:isa(PARENT)] (; | BLOCK)`.
fn parse_class(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let name = match expect_name(cursor, "class name", keyword) {
        Ok(name) => name,
        Err(node) => return node,
    };
    let version = take_version(cursor);
    let parent = cursor
        .parse_attributes()
        .into_iter()
        .find(|a| a.name == "isa")
        .and_then(|a| a.args?.first())
        .map(|l| l.text().to_string());
    let body = cursor
        .next_is(Category::LeftBrace)
        .then(|| cursor.parse_block());
    Node::Class {
        name,
        version,
        parent,
        body,
    }
}

/// `field $x [:param] [:reader(NAME)] [= EXPR]`.
fn parse_field(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let Some(variable) = cursor.peek().and_then(expr::as_variable) else {
        return expr::expected("field variable", cursor.peek(), keyword.span());
    };
    cursor.advance();

    let attributes = cursor
        .parse_attributes()
        .into_iter()
        .map(|a| match a.args {
            Some(args) => {
                let args: Vec<&str> = args.iter().map(Lexeme::text).collect();
                format!("{}({})", a.name, args.join(" "))
            }
            None => a.name.to_string(),
        })
        .collect();

    let default = match cursor.peek() {
        Some(op) if is_default_operator(op) => {
            cursor.advance();
            let value = match cursor.take_rest() {
                [] => expr::error(
                    ParseErrorKind::MissingOperand {
                        operator: op.text().to_string(),
                    },
                    op.span(),
                ),
                rest => expr::parse_expression(rest, op.span()),
            };
            Some(Box::new(value))
        }
        _ => None,
    };
    Node::Field {
        variable: Box::new(variable),
        attributes,
        default,
    }
}

fn parse_method(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let name = match expect_name(cursor, "method name", keyword) {
        Ok(name) => name,
        Err(node) => return node,
    };
    let params = cursor.parse_params();
    cursor.parse_attributes();
    Node::Method {
        name,
        params,
        body: cursor.parse_block(),
    }
}

/// `package NAME [VERSION] (; | BLOCK)`.
fn parse_package(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let name = match expect_name(cursor, "package name", keyword) {
        Ok(name) => name,
        Err(node) => return node,
    };
    let version = take_version(cursor);
    let block = cursor
        .next_is(Category::LeftBrace)
        .then(|| cursor.parse_block());
    Node::Package {
        name,
        version,
        block,
    }
}

/// `use VERSION`, `use MODULE [VERSION] [LIST]`, and the `no` forms.
fn parse_use(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let negated = keyword.text() == "no";

    if let Some(version) = take_version(cursor) {
        return Node::Use {
            negated,
            module: None,
            version: Some(version),
            imports: Vec::new(),
        };
    }
    let module = match expect_name(cursor, "module name or version", keyword) {
        Ok(name) => name,
        Err(node) => return node,
    };
    let version = if cursor.peek_at(1).is_some_and(|l| l.category == Category::Comma) {
        None
    } else {
        take_version(cursor)
    };
    let imports = match cursor.take_rest() {
        [] => Vec::new(),
        rest => match expr::parse_expression(rest, keyword.span()) {
            Node::List(items) => items,
            node => vec![node],
        },
    };
    Node::Use {
        negated,
        module: Some(module),
        version,
        imports,
    }
}

/// `try BLOCK [catch ($e) BLOCK] [finally BLOCK]`.
fn parse_try(cursor: &mut Cursor<'_>) -> Node {
    cursor.advance();
    let body = cursor.parse_block();

    let catch = cursor.eat(Category::Keyword, "catch").map(|_| {
        let variable = match cursor.peek() {
            Some(open) if open.category == Category::LeftParen => {
                cursor.advance();
                Some(Box::new(match cursor.take_group(open) {
                    Ok([]) => expr::expected("catch variable", None, open.span()),
                    Ok([var]) => expr::as_variable(var)
                        .unwrap_or_else(|| expr::expected("catch variable", Some(var), open.span())),
                    Ok([_, extra, ..]) => expr::expected("')'", Some(extra), open.span()),
                    Err(e) => Node::Error(e),
                }))
            }
            _ => None,
        };
        CatchClause {
            variable,
            block: cursor.parse_block(),
        }
    });
    let finally = cursor
        .eat(Category::Keyword, "finally")
        .map(|_| cursor.parse_block());

    Node::Try {
        body,
        catch,
        finally,
    }
}

/// `given`, `when`, `match` and `case`: a parenthesized head and a block.
fn parse_topic(cursor: &mut Cursor<'_>) -> Node {
    let Some(keyword) = cursor.advance() else {
        return expr::error(ParseErrorKind::UnexpectedEnd, cursor.here());
    };
    let head = Box::new(parse_condition(cursor, keyword));
    let body = cursor.parse_block();
    match keyword.text() {
        "given" => Node::Given { topic: head, body },
        "when" => Node::When {
            condition: head,
            body,
        },
        "match" => Node::Match {
            subject: head,
            body,
        },
        _ => Node::Case {
            pattern: head,
            body,
        },
    }
}
