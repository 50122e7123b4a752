//! ESTree output shape.
//!
//! Parsing is unchanged; once the tree is complete each node is rewritten
//! bottom-up into its ESTree form. Literals become `Literal`, object members
//! `Property`, class methods `MethodDefinition` with a `FunctionExpression`
//! value, and directives turn back into expression statements.

use crate::dialect::Dialect;
use ecma_ast::{Function, LiteralValue, Node, NodeKind, RegexInfo};
use ecma_core::text::{SourceLocation, TextPos};
use ecma_scanner::{Plugin, Tokenizer};
use std::mem;

pub(crate) struct Estree;

impl Dialect for Estree {
    fn plugin(&self) -> Plugin {
        Plugin::Estree
    }

    fn finish_node_shape(&self, node: &mut Node, tok: &Tokenizer) {
        let kind = mem::replace(&mut node.kind, NodeKind::NullLiteral {});
        node.kind = match kind {
            NodeKind::StringLiteral { value } => literal(node, tok, LiteralValue::String(value), None, None),
            NodeKind::NumericLiteral { value } => literal(node, tok, LiteralValue::Number(value), None, None),
            NodeKind::BooleanLiteral { value } => literal(node, tok, LiteralValue::Bool(value), None, None),
            NodeKind::NullLiteral {} => literal(node, tok, LiteralValue::Null, None, None),
            NodeKind::RegExpLiteral { pattern, flags } => {
                literal(node, tok, LiteralValue::Null, Some(RegexInfo { pattern, flags }), None)
            }
            NodeKind::BigIntLiteral { value } => literal(node, tok, LiteralValue::Null, None, Some(value)),

            NodeKind::ObjectProperty { key, computed, shorthand, value, decorators, .. } => NodeKind::Property {
                key,
                value,
                kind: "init",
                method: false,
                shorthand,
                computed,
                decorators,
            },
            NodeKind::ObjectMethod { kind, key, computed, function, decorators, .. } => {
                let value = function_value(node, &key, computed, function, tok);
                NodeKind::Property {
                    key,
                    value: Box::new(value),
                    kind: if kind == "method" { "init" } else { kind },
                    method: kind == "method",
                    shorthand: false,
                    computed,
                    decorators,
                }
            }
            NodeKind::ClassMethod { kind, key, computed, modifiers, function } => {
                let value = function_value(node, &key, computed, function, tok);
                NodeKind::MethodDefinition {
                    key,
                    value: Box::new(value),
                    kind,
                    computed,
                    r#static: modifiers.r#static,
                    decorators: modifiers.decorators,
                }
            }

            NodeKind::Program { source_type, interpreter, mut body, directives } => {
                prepend_directives(&mut body, directives.unwrap_or_default(), tok);
                NodeKind::Program { source_type, interpreter, body, directives: None }
            }
            NodeKind::BlockStatement { mut body, directives } => {
                prepend_directives(&mut body, directives.unwrap_or_default(), tok);
                NodeKind::BlockStatement { body, directives: None }
            }
            other => other,
        };
    }
}

fn literal(
    node: &Node,
    tok: &Tokenizer,
    value: LiteralValue,
    regex: Option<RegexInfo>,
    bigint: Option<String>,
) -> NodeKind {
    let raw = node.extra.raw.clone().unwrap_or_else(|| tok.slice(node.start, node.end));
    NodeKind::Literal { value, raw, regex, bigint }
}

/// The `FunctionExpression` holding a method's parameters and body. It
/// starts at the type parameters or the opening parenthesis.
fn function_value(
    method: &Node,
    key: &Node,
    computed: bool,
    function: Function,
    tok: &Tokenizer,
) -> Node {
    let mut start = tok.next_token_start_since(key.end);
    if computed && tok.char_at(start) == Some(']') {
        start = tok.next_token_start_since(start + 1);
    }
    if matches!(tok.char_at(start), Some('?' | '!')) {
        start = tok.next_token_start_since(start + 1);
    }
    if let Some(type_parameters) = &function.type_parameters {
        start = type_parameters.start;
    }
    spanned(method, start, NodeKind::FunctionExpression { function }, tok)
}

fn spanned(outer: &Node, start: TextPos, kind: NodeKind, tok: &Tokenizer) -> Node {
    let loc = SourceLocation::new(tok.position_of(start), outer.loc.end, outer.loc.filename.clone());
    let mut node = Node::new(kind, start, outer.end, loc);
    if outer.range.is_some() {
        node.range = Some([start, outer.end]);
    }
    node
}

/// Turn each `Directive` into an expression statement carrying the raw
/// directive text, in front of the other statements.
fn prepend_directives(body: &mut Vec<Node>, directives: Vec<Node>, tok: &Tokenizer) {
    if directives.is_empty() {
        return;
    }
    let mut statements = Vec::with_capacity(directives.len() + body.len());
    for mut directive in directives {
        let NodeKind::Directive { value } = mem::replace(&mut directive.kind, NodeKind::EmptyStatement {}) else {
            continue;
        };
        let mut expression = *value;
        let raw = expression.extra.raw.clone().unwrap_or_else(|| tok.slice(expression.start, expression.end));
        let cooked = match mem::replace(&mut expression.kind, NodeKind::NullLiteral {}) {
            NodeKind::DirectiveLiteral { value } => value,
            _ => String::new(),
        };
        let unquoted: String = raw.chars().skip(1).take(raw.chars().count().saturating_sub(2)).collect();
        expression.kind = NodeKind::Literal { value: LiteralValue::String(cooked), raw, regex: None, bigint: None };
        directive.kind = NodeKind::ExpressionStatement { expression: Box::new(expression), directive: Some(unquoted) };
        statements.push(directive);
    }
    statements.append(body);
    *body = statements;
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::{parse, parse_expression};
    use ecma_ast::{LiteralValue, Node, NodeKind};
    use ecma_scanner::Plugin;

    fn estree() -> ParserOptions {
        ParserOptions::default().with_plugins([Plugin::Estree])
    }

    fn body(source: &str) -> Vec<Node> {
        let file = parse(source, estree()).unwrap();
        let NodeKind::File { program, .. } = file.kind else {
            panic!("expected a file");
        };
        let NodeKind::Program { body, directives, .. } = program.kind else {
            panic!("expected a program");
        };
        assert!(directives.is_none());
        body
    }

    #[test]
    fn test_literals() {
        let node = parse_expression("[1, 'a', true, null, /x/g]", estree()).unwrap();
        let NodeKind::ArrayExpression { elements } = &node.kind else {
            panic!("expected an array");
        };
        let raws: Vec<_> = elements
            .iter()
            .flatten()
            .map(|e| match &e.kind {
                NodeKind::Literal { raw, .. } => raw.as_str(),
                _ => panic!("expected a literal, got {}", e.type_name()),
            })
            .collect();
        assert_eq!(raws, ["1", "'a'", "true", "null", "/x/g"]);
        let Some(Some(regex)) = elements.last() else {
            panic!("expected a regex element");
        };
        assert!(matches!(&regex.kind, NodeKind::Literal { regex: Some(info), .. } if info.flags == "g"));
    }

    #[test]
    fn test_object_members_become_properties() {
        let node = parse_expression("({ a: 1, b, get c() { return 1; }, d() {} })", estree()).unwrap();
        let NodeKind::ObjectExpression { properties } = &node.kind else {
            panic!("expected an object");
        };
        let shapes: Vec<_> = properties
            .iter()
            .map(|p| match &p.kind {
                NodeKind::Property { kind, method, shorthand, .. } => (*kind, *method, *shorthand),
                _ => panic!("expected a property"),
            })
            .collect();
        assert_eq!(shapes, [("init", false, false), ("init", false, true), ("get", false, false), ("init", true, false)]);
        let NodeKind::Property { value, .. } = &properties[3].kind else {
            panic!("expected a property");
        };
        assert_eq!(value.type_name(), "FunctionExpression");
    }

    #[test]
    fn test_class_methods_become_method_definitions() {
        let source = "class A { static [k] () {} }";
        let body = body(source);
        let NodeKind::ClassDeclaration { class } = &body[0].kind else {
            panic!("expected a class");
        };
        let NodeKind::ClassBody { body: members } = &class.body.kind else {
            panic!("expected a class body");
        };
        let NodeKind::MethodDefinition { value, r#static, computed, kind, .. } = &members[0].kind else {
            panic!("expected a method definition");
        };
        assert!(*r#static && *computed);
        assert_eq!(*kind, "method");
        assert_eq!(value.start as usize, source.find("()").unwrap());
        assert_eq!(value.end, members[0].end);
    }

    #[test]
    fn test_directives_become_statements() {
        let body = body("'use strict'; foo;");
        let NodeKind::ExpressionStatement { expression, directive } = &body[0].kind else {
            panic!("expected an expression statement");
        };
        assert_eq!(directive.as_deref(), Some("use strict"));
        assert!(matches!(&expression.kind, NodeKind::Literal { value: LiteralValue::String(s), .. } if s == "use strict"));
        assert_eq!(body.len(), 2);
    }
}
