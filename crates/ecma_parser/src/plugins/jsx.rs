//! JSX elements and fragments.
//!
//! The tokenizer side lives in `ecma_scanner::jsx`; this module turns the
//! tag, text and brace tokens it produces into `JSX*` nodes.

use crate::dialect::Dialect;
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{LiteralValue, Node, NodeKind, TokenType, TokenValue};
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::{Plugin, Tokenizer, TokenizerHook};

pub(crate) struct Jsx;

struct JsxTokens;

static JSX_TOKENS: JsxTokens = JsxTokens;

impl TokenizerHook for JsxTokens {
    fn name(&self) -> &'static str {
        "jsx"
    }

    fn tokenize_ambiguous(&self, tok: &mut Tokenizer, code: char) -> ParseResult<bool> {
        // `<` inside a type annotation is never a tag.
        if tok.state.in_type {
            return Ok(false);
        }
        tok.jsx_tokenize_ambiguous(code)
    }

    fn update_context(&self, tok: &mut Tokenizer, prev: TokenType) -> bool {
        tok.jsx_update_context(prev)
    }
}

impl Dialect for Jsx {
    fn plugin(&self) -> Plugin {
        Plugin::Jsx
    }

    fn tokenizer_hook(&self) -> Option<&'static dyn TokenizerHook> {
        Some(&JSX_TOKENS)
    }

    fn primary_expression(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        match p.cur() {
            TokenType::JsxText => {
                let value = p.value().to_string();
                let node = p.parse_literal(
                    NodeKind::JSXText { value: value.clone() },
                    Some(LiteralValue::String(value)),
                )?;
                Ok(Some(node))
            }
            TokenType::JsxTagStart => Ok(Some(parse_element(p)?)),
            // A `<` read where no expression was expected can still only
            // start an element here.
            TokenType::Relational if p.is_relational("<") && p.tok.char_at(p.start() + 1) != Some('!') => {
                p.tok.state.pos = p.start() + 1;
                p.tok.finish_token(TokenType::JsxTagStart, TokenValue::None);
                Ok(Some(parse_element(p)?))
            }
            _ => Ok(None),
        }
    }
}

/// An element or fragment; the current token is the opening tag start.
fn parse_element(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.next()?;
    parse_element_at(p, start)
}

fn parse_element_at(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let opening = parse_opening_element_at(p, start)?;
    let mut closing = None;
    let mut children = Vec::new();

    let self_closing = matches!(opening.kind, NodeKind::JSXOpeningElement { self_closing: true, .. });
    if !self_closing {
        loop {
            match p.cur() {
                TokenType::JsxTagStart => {
                    let child_start = p.start_node();
                    p.next()?;
                    if p.eat(TokenType::Slash)? {
                        closing = Some(parse_closing_element_at(p, child_start)?);
                        break;
                    }
                    children.push(parse_element_at(p, child_start)?);
                }
                TokenType::JsxText => {
                    let value = p.value().to_string();
                    children.push(p.parse_literal(
                        NodeKind::JSXText { value: value.clone() },
                        Some(LiteralValue::String(value)),
                    )?);
                }
                TokenType::BraceL => {
                    if p.lookahead()?.token_type == TokenType::Ellipsis {
                        children.push(parse_spread_child(p)?);
                    } else {
                        children.push(parse_expression_container(p)?);
                    }
                }
                _ => return Err(p.unexpected()),
            }
        }
        if let Some(closing) = &closing {
            check_closing_tag(p, &opening, closing)?;
        }
    }

    if p.is_relational("<") {
        return Err(p.raise(p.start(), &messages::JSX_ADJACENT_ELEMENTS, &[]));
    }

    let kind = if matches!(opening.kind, NodeKind::JSXOpeningFragment {}) {
        let Some(closing) = closing else {
            return Err(p.raise(opening.start, &messages::JSX_MISMATCHED_FRAGMENT, &[]));
        };
        NodeKind::JSXFragment {
            opening_fragment: Box::new(opening),
            closing_fragment: Box::new(closing),
            children,
        }
    } else {
        NodeKind::JSXElement {
            opening_element: Box::new(opening),
            closing_element: closing.map(Box::new),
            children,
        }
    };
    Ok(p.finish_node(start, kind))
}

fn check_closing_tag(p: &Parser, opening: &Node, closing: &Node) -> ParseResult<()> {
    match (&opening.kind, &closing.kind) {
        (NodeKind::JSXOpeningFragment {}, NodeKind::JSXClosingFragment {}) => Ok(()),
        (NodeKind::JSXOpeningFragment {}, _) => {
            Err(p.raise(closing.start, &messages::JSX_MISMATCHED_FRAGMENT, &[]))
        }
        (NodeKind::JSXOpeningElement { name, .. }, NodeKind::JSXClosingFragment {}) => {
            Err(p.raise(closing.start, &messages::JSX_MISMATCHED_CLOSE, &[&qualified_name(name)]))
        }
        (NodeKind::JSXOpeningElement { name: open, .. }, NodeKind::JSXClosingElement { name: close }) => {
            let expected = qualified_name(open);
            if qualified_name(close) != expected {
                return Err(p.raise(closing.start, &messages::JSX_MISMATCHED_CLOSE, &[&expected]));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// The source spelling of an element name, for matching tags.
fn qualified_name(name: &Node) -> String {
    match &name.kind {
        NodeKind::JSXIdentifier { name } => name.clone(),
        NodeKind::JSXNamespacedName { namespace, name } => {
            format!("{}:{}", qualified_name(namespace), qualified_name(name))
        }
        NodeKind::JSXMemberExpression { object, property } => {
            format!("{}.{}", qualified_name(object), qualified_name(property))
        }
        _ => String::new(),
    }
}

// ============================================================================
// Tags
// ============================================================================

fn parse_opening_element_at(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    if p.eat(TokenType::JsxTagEnd)? {
        return Ok(p.finish_node(start, NodeKind::JSXOpeningFragment {}));
    }
    let name = parse_element_name(p)?;
    let type_parameters = if p.has_plugin(Plugin::Typescript) && p.is_relational("<") {
        Some(Box::new(super::typescript::parse_type_arguments(p)?))
    } else {
        None
    };
    let mut attributes = Vec::new();
    while !p.is(TokenType::Slash) && !p.is(TokenType::JsxTagEnd) {
        attributes.push(parse_attribute(p)?);
    }
    let self_closing = p.eat(TokenType::Slash)?;
    p.expect(TokenType::JsxTagEnd)?;
    Ok(p.finish_node(
        start,
        NodeKind::JSXOpeningElement { name: Box::new(name), attributes, self_closing, type_parameters },
    ))
}

/// `</name>` or `</>`; the `</` is consumed.
fn parse_closing_element_at(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    if p.eat(TokenType::JsxTagEnd)? {
        return Ok(p.finish_node(start, NodeKind::JSXClosingFragment {}));
    }
    let name = parse_element_name(p)?;
    p.expect(TokenType::JsxTagEnd)?;
    Ok(p.finish_node(start, NodeKind::JSXClosingElement { name: Box::new(name) }))
}

fn parse_identifier(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let name = match p.cur() {
        TokenType::JsxName => p.value().to_string(),
        token => match token.keyword() {
            Some(keyword) => keyword.to_string(),
            None => return Err(p.unexpected()),
        },
    };
    p.next()?;
    Ok(p.finish_node(start, NodeKind::JSXIdentifier { name }))
}

fn parse_namespaced_name(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let name = parse_identifier(p)?;
    if !p.eat(TokenType::Colon)? {
        return Ok(name);
    }
    let local = parse_identifier(p)?;
    Ok(p.finish_node(
        start,
        NodeKind::JSXNamespacedName { namespace: Box::new(name), name: Box::new(local) },
    ))
}

/// `a`, `a:b` or `a.b.c`.
fn parse_element_name(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let mut node = parse_namespaced_name(p)?;
    if matches!(node.kind, NodeKind::JSXNamespacedName { .. }) {
        if p.is(TokenType::Dot) {
            return Err(p.raise(p.start(), &messages::JSX_NAMESPACE_MEMBER, &[]));
        }
        return Ok(node);
    }
    while p.eat(TokenType::Dot)? {
        let property = parse_identifier(p)?;
        node = p.finish_node(
            start,
            NodeKind::JSXMemberExpression { object: Box::new(node), property: Box::new(property) },
        );
    }
    Ok(node)
}

// ============================================================================
// Attributes and children
// ============================================================================

fn parse_attribute(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    if p.eat(TokenType::BraceL)? {
        p.expect(TokenType::Ellipsis)?;
        let argument = p.parse_maybe_assign()?;
        p.expect(TokenType::BraceR)?;
        return Ok(p.finish_node(start, NodeKind::JSXSpreadAttribute { argument: Box::new(argument) }));
    }
    let name = parse_namespaced_name(p)?;
    let value = if p.eat(TokenType::Eq)? {
        Some(Box::new(parse_attribute_value(p)?))
    } else {
        None
    };
    Ok(p.finish_node(start, NodeKind::JSXAttribute { name: Box::new(name), value }))
}

fn parse_attribute_value(p: &mut Parser) -> ParseResult<Node> {
    match p.cur() {
        TokenType::BraceL => {
            let container = parse_expression_container(p)?;
            if let NodeKind::JSXExpressionContainer { expression } = &container.kind {
                if matches!(expression.kind, NodeKind::JSXEmptyExpression {}) {
                    return Err(p.raise(container.start, &messages::JSX_EMPTY_EXPRESSION, &[]));
                }
            }
            Ok(container)
        }
        TokenType::JsxTagStart | TokenType::String => p.parse_expr_atom(None),
        _ => Err(p.raise(p.start(), &messages::JSX_INVALID_ATTRIBUTE_VALUE, &[])),
    }
}

/// `{expr}`, or `{}` holding an empty expression.
fn parse_expression_container(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.next()?;
    let expression = if p.is(TokenType::BraceR) {
        let state = p.state();
        let empty_start = NodeStart { pos: state.last_tok_end, loc: state.last_tok_end_loc };
        p.finish_node_at(empty_start, NodeKind::JSXEmptyExpression {}, state.start, state.start_loc)
    } else {
        p.parse_expression()?
    };
    p.expect(TokenType::BraceR)?;
    Ok(p.finish_node(start, NodeKind::JSXExpressionContainer { expression: Box::new(expression) }))
}

fn parse_spread_child(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.next()?;
    p.expect(TokenType::Ellipsis)?;
    let expression = p.parse_expression()?;
    p.expect(TokenType::BraceR)?;
    Ok(p.finish_node(start, NodeKind::JSXSpreadChild { expression: Box::new(expression) }))
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parse_expression;
    use ecma_ast::{Node, NodeKind};
    use ecma_scanner::Plugin;

    fn jsx(source: &str) -> Node {
        let options = ParserOptions::default().with_plugins([Plugin::Jsx]);
        parse_expression(source, options).unwrap()
    }

    fn jsx_error(source: &str) -> String {
        let options = ParserOptions::default().with_plugins([Plugin::Jsx]);
        parse_expression(source, options).unwrap_err().to_string()
    }

    #[test]
    fn test_element_with_attributes_and_children() {
        let node = jsx(r#"<div id="a" {...rest} hidden>hi {name}</div>"#);
        let NodeKind::JSXElement { opening_element, closing_element, children } = &node.kind else {
            panic!("expected an element, got {}", node.type_name());
        };
        let NodeKind::JSXOpeningElement { attributes, self_closing, .. } = &opening_element.kind else {
            panic!("expected an opening element");
        };
        assert!(!self_closing);
        let kinds: Vec<_> = attributes.iter().map(Node::type_name).collect();
        assert_eq!(kinds, ["JSXAttribute", "JSXSpreadAttribute", "JSXAttribute"]);
        assert!(closing_element.is_some());
        let kinds: Vec<_> = children.iter().map(Node::type_name).collect();
        assert_eq!(kinds, ["JSXText", "JSXExpressionContainer"]);
        assert!(matches!(&children[0].kind, NodeKind::JSXText { value } if value == "hi "));
    }

    #[test]
    fn test_self_closing_and_member_names() {
        let node = jsx("<a.b.c x={1} />");
        let NodeKind::JSXElement { opening_element, closing_element, children } = &node.kind else {
            panic!("expected an element");
        };
        assert!(closing_element.is_none());
        assert!(children.is_empty());
        let NodeKind::JSXOpeningElement { name, self_closing: true, .. } = &opening_element.kind else {
            panic!("expected a self-closing element");
        };
        assert_eq!(name.type_name(), "JSXMemberExpression");
    }

    #[test]
    fn test_fragment_and_nested_elements() {
        let node = jsx("<><a></a><b/></>");
        let NodeKind::JSXFragment { children, .. } = &node.kind else {
            panic!("expected a fragment");
        };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_namespaced_attribute_and_entities() {
        let node = jsx(r#"<svg:rect xlink:href="a&amp;b">&lt;</svg:rect>"#);
        let NodeKind::JSXElement { opening_element, children, .. } = &node.kind else {
            panic!("expected an element");
        };
        let NodeKind::JSXOpeningElement { name, attributes, .. } = &opening_element.kind else {
            panic!("expected an opening element");
        };
        assert_eq!(name.type_name(), "JSXNamespacedName");
        let NodeKind::JSXAttribute { value: Some(value), .. } = &attributes[0].kind else {
            panic!("expected an attribute with a value");
        };
        assert_eq!(value.string_value(), Some("a&b"));
        assert!(matches!(&children[0].kind, NodeKind::JSXText { value } if value == "<"));
    }

    #[test]
    fn test_empty_expression_child() {
        let node = jsx("<a>{/* note */}</a>");
        let NodeKind::JSXElement { children, .. } = &node.kind else {
            panic!("expected an element");
        };
        let NodeKind::JSXExpressionContainer { expression } = &children[0].kind else {
            panic!("expected an expression container");
        };
        assert_eq!(expression.type_name(), "JSXEmptyExpression");
    }

    #[test]
    fn test_spread_child() {
        let node = jsx("<a>{...items}</a>");
        let NodeKind::JSXElement { children, .. } = &node.kind else {
            panic!("expected an element");
        };
        assert_eq!(children[0].type_name(), "JSXSpreadChild");
    }

    #[test]
    fn test_mismatched_closing_tags() {
        assert!(jsx_error("<a></b>").starts_with("Expected corresponding JSX closing tag for <a>"));
        assert!(jsx_error("<></a>").starts_with("Expected corresponding JSX closing tag for <>"));
        assert!(jsx_error("<a.b></a.c>").starts_with("Expected corresponding JSX closing tag for <a.b>"));
    }

    #[test]
    fn test_adjacent_elements_are_rejected() {
        assert!(jsx_error("<a/><b/>").starts_with("Adjacent JSX elements must be wrapped"));
    }

    #[test]
    fn test_invalid_attribute_values() {
        assert!(jsx_error("<a b={} />").starts_with("JSX attributes must only be assigned a non-empty expression"));
        assert!(jsx_error("<a b=1 />").starts_with("JSX value should be either an expression or a quoted JSX text"));
    }

    #[test]
    fn test_unterminated_contents() {
        assert!(jsx_error("<a>text").starts_with("Unterminated JSX contents"));
    }

    #[test]
    fn test_less_than_still_compares_after_operand() {
        let node = jsx("a < b");
        assert_eq!(node.type_name(), "BinaryExpression");
    }
}
