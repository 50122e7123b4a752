//! Assignment targets and binding patterns.
//!
//! Destructuring targets are first parsed as expressions (an object or
//! array literal on the left of `=`, or arrow parameters) and converted here
//! once it is known they are patterns. [`Parser::check_lval`] then validates
//! the converted target.

use crate::dialect::{Hook, LvalCheck};
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{Node, NodeKind, TokenType};
use ecma_core::collections::FxHashSet;
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::identifier::{is_strict_bind_only_reserved_word, is_strict_bind_reserved_word};
use ecma_scanner::Plugin;
use std::mem;

impl Parser {
    // ========================================================================
    // Expression to pattern conversion
    // ========================================================================

    /// Convert an expression to the pattern it denotes. Nodes that cannot be
    /// patterns are left alone for [`Parser::check_lval`] to report.
    pub(crate) fn to_assignable(
        &mut self,
        node: Node,
        is_binding: bool,
        context: &str,
    ) -> ParseResult<Node> {
        let mut node = match self.hook_to_assignable(node, is_binding)? {
            Hook::Done(node) => return Ok(node),
            Hook::Pass(node) => node,
        };

        let kind = mem::replace(&mut node.kind, NodeKind::NullLiteral {});
        node.kind = match kind {
            NodeKind::ObjectExpression { properties } => {
                let last = properties.len().saturating_sub(1);
                let mut converted = Vec::with_capacity(properties.len());
                for (index, property) in properties.into_iter().enumerate() {
                    converted.push(self.to_assignable_object_member(property, is_binding, index == last, context)?);
                }
                if let (Some(pos), Some(last)) = (node.extra.trailing_comma, converted.last()) {
                    if matches!(last.kind, NodeKind::RestElement { .. }) {
                        return Err(self.raise(pos, &messages::REST_TRAILING_COMMA, &[]));
                    }
                }
                NodeKind::ObjectPattern { properties: converted, type_annotation: None }
            }
            NodeKind::ObjectProperty { method, key, computed, shorthand, value, decorators } => {
                let value = Box::new(self.to_assignable(*value, is_binding, context)?);
                NodeKind::ObjectProperty { method, key, computed, shorthand, value, decorators }
            }
            NodeKind::SpreadElement { argument } => {
                if !matches!(argument.kind, NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }) {
                    return Err(self.raise(argument.start, &messages::INVALID_REST_TARGET, &[]));
                }
                let argument = Box::new(self.to_assignable(*argument, is_binding, context)?);
                NodeKind::RestElement { argument, type_annotation: None }
            }
            NodeKind::ArrayExpression { elements } => {
                let trailing_comma = node.extra.trailing_comma;
                let elements = self.to_assignable_elements(elements, is_binding, context, trailing_comma)?;
                NodeKind::ArrayPattern { elements, type_annotation: None }
            }
            NodeKind::AssignmentExpression { operator, left, right } => {
                if operator != "=" {
                    return Err(self.raise(left.end, &messages::INVALID_DEFAULT_OPERATOR, &[]));
                }
                NodeKind::AssignmentPattern { left, right }
            }
            NodeKind::ParenthesizedExpression { expression } => {
                let expression = Box::new(self.to_assignable(*expression, is_binding, context)?);
                NodeKind::ParenthesizedExpression { expression }
            }
            other => other,
        };
        Ok(node)
    }

    fn to_assignable_object_member(
        &mut self,
        property: Node,
        is_binding: bool,
        is_last: bool,
        context: &str,
    ) -> ParseResult<Node> {
        match &property.kind {
            NodeKind::ObjectMethod { kind, key, .. } => {
                let message = if matches!(*kind, "get" | "set") {
                    &messages::PATTERN_HAS_ACCESSOR
                } else {
                    &messages::PATTERN_HAS_METHOD
                };
                Err(self.raise(key.start, message, &[]))
            }
            NodeKind::SpreadElement { .. } if !is_last => {
                Err(self.raise(property.start, &messages::REST_NOT_LAST, &[]))
            }
            _ => self.to_assignable(property, is_binding, context),
        }
    }

    /// Convert the items of an array literal or argument list. Only the last
    /// item may be a spread; it becomes the rest element.
    fn to_assignable_elements(
        &mut self,
        elements: Vec<Option<Node>>,
        is_binding: bool,
        context: &str,
        trailing_comma: Option<TextPos>,
    ) -> ParseResult<Vec<Option<Node>>> {
        let last = elements.len().saturating_sub(1);
        let mut converted = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            let Some(element) = element else {
                converted.push(None);
                continue;
            };
            let is_spread = matches!(element.kind, NodeKind::SpreadElement { .. });
            let is_rest = matches!(element.kind, NodeKind::RestElement { .. });
            if index == last && (is_spread || is_rest) {
                let element = if is_spread {
                    self.spread_to_rest(element, is_binding, context)?
                } else {
                    element
                };
                if let Some(pos) = trailing_comma {
                    return Err(self.raise(pos, &messages::REST_TRAILING_COMMA, &[]));
                }
                converted.push(Some(element));
                continue;
            }
            if is_spread || is_rest {
                return Err(self.raise(element.start, &messages::REST_NOT_LAST, &[]));
            }
            converted.push(Some(self.to_assignable(element, is_binding, context)?));
        }
        Ok(converted)
    }

    fn spread_to_rest(&mut self, mut element: Node, is_binding: bool, context: &str) -> ParseResult<Node> {
        let NodeKind::SpreadElement { argument } =
            mem::replace(&mut element.kind, NodeKind::NullLiteral {})
        else {
            return Ok(element);
        };
        let argument = self.to_assignable(*argument, is_binding, context)?;
        if !matches!(
            argument.kind,
            NodeKind::Identifier { .. }
                | NodeKind::MemberExpression { .. }
                | NodeKind::ArrayPattern { .. }
                | NodeKind::ObjectPattern { .. }
        ) {
            return Err(self.unexpected_at(argument.start));
        }
        element.kind = NodeKind::RestElement { argument: Box::new(argument), type_annotation: None };
        Ok(element)
    }

    /// Convert a list of arrow parameters.
    pub(crate) fn to_assignable_list(
        &mut self,
        exprs: Vec<Node>,
        is_binding: bool,
        context: &str,
    ) -> ParseResult<Vec<Node>> {
        let elements = exprs.into_iter().map(Some).collect();
        let converted = self.to_assignable_elements(elements, is_binding, context, None)?;
        Ok(converted.into_iter().flatten().collect())
    }

    // ========================================================================
    // Target validation
    // ========================================================================

    /// Check that `expr` may be assigned to, or with `is_binding` bound.
    /// `clashes` collects bound names to reject duplicates.
    pub(crate) fn check_lval(
        &self,
        expr: &Node,
        is_binding: bool,
        mut clashes: Option<&mut FxHashSet<String>>,
        context: &str,
    ) -> ParseResult<()> {
        match self.hook_check_lval(expr, is_binding)? {
            LvalCheck::Inner(inner) => return self.check_lval(inner, is_binding, clashes, context),
            LvalCheck::NotMine => {}
        }

        match &expr.kind {
            NodeKind::Identifier { name, .. } => {
                let state = self.state();
                let reserved = if is_binding {
                    is_strict_bind_reserved_word(name, state.in_module)
                } else {
                    is_strict_bind_only_reserved_word(name)
                };
                if state.strict && reserved {
                    let message = if is_binding {
                        &messages::BINDING_IN_STRICT
                    } else {
                        &messages::ASSIGN_IN_STRICT
                    };
                    return Err(self.raise(expr.start, message, &[name]));
                }
                if let Some(names) = clashes {
                    if !names.insert(name.clone()) {
                        return Err(self.raise(expr.start, &messages::ARGUMENT_NAME_CLASH, &[]));
                    }
                }
                Ok(())
            }
            NodeKind::MemberExpression { .. } => {
                if is_binding {
                    return Err(self.raise(expr.start, &messages::BINDING_MEMBER, &[]));
                }
                Ok(())
            }
            NodeKind::ObjectPattern { properties, .. } => {
                for property in properties {
                    let target = match &property.kind {
                        NodeKind::ObjectProperty { value, .. } => value,
                        _ => property,
                    };
                    self.check_lval(target, is_binding, clashes.as_deref_mut(), "object destructuring pattern")?;
                }
                Ok(())
            }
            NodeKind::ArrayPattern { elements, .. } => {
                for element in elements.iter().flatten() {
                    self.check_lval(element, is_binding, clashes.as_deref_mut(), "array destructuring pattern")?;
                }
                Ok(())
            }
            NodeKind::AssignmentPattern { left, .. } => {
                self.check_lval(left, is_binding, clashes, "assignment pattern")
            }
            NodeKind::RestElement { argument, .. } => {
                self.check_lval(argument, is_binding, clashes, "rest element")
            }
            NodeKind::ParenthesizedExpression { expression } => {
                self.check_lval(expression, is_binding, clashes, context)
            }
            _ => {
                let message = if is_binding {
                    &messages::BINDING_INVALID_LVAL
                } else {
                    &messages::INVALID_LVAL
                };
                Err(self.raise(expr.start, message, &[context]))
            }
        }
    }

    // ========================================================================
    // Binding patterns
    // ========================================================================

    pub(crate) fn parse_binding_identifier(&mut self) -> ParseResult<Node> {
        self.parse_identifier(false)
    }

    /// An identifier or a destructuring pattern in binding position.
    pub(crate) fn parse_binding_atom(&mut self) -> ParseResult<Node> {
        match self.cur() {
            TokenType::BracketL => {
                let start = self.start_node();
                self.next()?;
                let elements = self.parse_binding_list(TokenType::BracketR, true, false)?;
                Ok(self.finish_node(start, NodeKind::ArrayPattern { elements, type_annotation: None }))
            }
            TokenType::BraceL => self.parse_obj(true, None),
            _ => self.parse_binding_identifier(),
        }
    }

    /// Binding elements up to `close`; the opening token is consumed.
    /// `allow_empty` admits array holes; `allow_modifiers` admits
    /// constructor parameter properties.
    pub(crate) fn parse_binding_list(
        &mut self,
        close: TokenType,
        allow_empty: bool,
        allow_modifiers: bool,
    ) -> ParseResult<Vec<Option<Node>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
            }
            if allow_empty && self.is(TokenType::Comma) {
                elements.push(None);
                continue;
            }
            if self.eat(close)? {
                break;
            }
            if self.is(TokenType::Ellipsis) {
                let mut rest = self.parse_rest()?;
                self.hook_binding_annotation(&mut rest)?;
                elements.push(Some(rest));
                if self.is(TokenType::Comma) {
                    let message = if self.lookahead()?.token_type == close {
                        &messages::REST_TRAILING_COMMA
                    } else {
                        &messages::REST_NOT_LAST
                    };
                    return Err(self.raise(self.start(), message, &[]));
                }
                self.expect(close)?;
                break;
            }
            if self.is(TokenType::At) {
                self.expect_plugin(Plugin::Decorators, None)?;
                return Err(self.raise(self.start(), &messages::PARAMETER_DECORATOR, &[]));
            }
            elements.push(Some(self.parse_assignable_list_item(allow_modifiers)?));
        }
        Ok(elements)
    }

    fn parse_assignable_list_item(&mut self, allow_modifiers: bool) -> ParseResult<Node> {
        if let Some(node) = self.hook_assignable_list_item(allow_modifiers)? {
            return Ok(node);
        }
        let mut left = self.parse_maybe_default(None, None)?;
        self.hook_binding_annotation(&mut left)?;
        let start = NodeStart::of(&left);
        self.parse_maybe_default(Some(start), Some(left))
    }

    /// `...target` in binding position.
    pub(crate) fn parse_rest(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        self.expect(TokenType::Ellipsis)?;
        let argument = self.parse_binding_atom()?;
        Ok(self.finish_node(start, NodeKind::RestElement { argument: Box::new(argument), type_annotation: None }))
    }

    /// A binding target with an optional `= default`. `left` is an already
    /// parsed target starting at `start`.
    pub(crate) fn parse_maybe_default(
        &mut self,
        start: Option<NodeStart>,
        left: Option<Node>,
    ) -> ParseResult<Node> {
        let start = start.unwrap_or_else(|| self.start_node());
        let left = match left {
            Some(left) => left,
            None => self.parse_binding_atom()?,
        };
        if !self.eat(TokenType::Eq)? {
            return Ok(left);
        }
        let right = self.parse_maybe_assign()?;
        Ok(self.finish_node(start, NodeKind::AssignmentPattern { left: Box::new(left), right: Box::new(right) }))
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::{parse, parse_expression};
    use ecma_ast::NodeKind;

    fn error(source: &str) -> String {
        parse(source, ParserOptions::default()).unwrap_err().message
    }

    #[test]
    fn test_object_and_array_patterns() {
        let node = parse_expression("[a, , { b, c: [d] }, ...e] = f", ParserOptions::default()).unwrap();
        let NodeKind::AssignmentExpression { left, .. } = &node.kind else {
            panic!("expected assignment");
        };
        let NodeKind::ArrayPattern { elements, .. } = &left.kind else {
            panic!("expected array pattern, got {}", left.type_name());
        };
        assert_eq!(elements.len(), 4);
        assert!(elements[1].is_none());
        assert_eq!(elements[2].as_ref().unwrap().type_name(), "ObjectPattern");
        assert_eq!(elements[3].as_ref().unwrap().type_name(), "RestElement");
    }

    #[test]
    fn test_member_targets() {
        assert!(parse("[a.b, c[0]] = d", ParserOptions::default()).is_ok());
        assert!(error("var [a.b] = c").starts_with("Unexpected token, expected \",\""));
        assert!(error("[a + b] = c").starts_with("Invalid left-hand side in array destructuring pattern"));
        assert!(error("(a.b) => 1").starts_with("Binding member expression"));
    }

    #[test]
    fn test_rest_position() {
        assert!(error("[...a, b] = c").starts_with("Rest element must be last element"));
        assert!(error("[...a,] = c").starts_with("Unexpected trailing comma after rest element"));
        assert!(error("function f(...a, b) {}").starts_with("Rest element must be last element"));
        assert!(error("function f(...a,) {}").starts_with("Unexpected trailing comma after rest element"));
    }

    #[test]
    fn test_object_rest() {
        assert!(parse("({ a, ...b } = c)", ParserOptions::default()).is_ok());
        assert!(parse("var { a, ...b } = c", ParserOptions::default()).is_ok());
        assert!(error("({ ...[a] } = c)").starts_with("Invalid rest operator's argument"));
        assert!(error("var { ...a, b } = c").starts_with("Rest element must be last element"));
    }

    #[test]
    fn test_methods_in_patterns() {
        assert!(error("({ a() {} } = b)").starts_with("Object pattern can't contain methods"));
        assert!(error("({ get a() {} } = b)").starts_with("Object pattern can't contain getter or setter"));
    }

    #[test]
    fn test_compound_default_operator() {
        assert!(error("[a += 1] = b").starts_with("Only '=' operator can be used"));
    }

    #[test]
    fn test_strict_eval_and_arguments() {
        assert!(error("'use strict'; eval = 1").starts_with("Assigning to 'eval' in strict mode"));
        assert!(error("'use strict'; var arguments").starts_with("Binding 'arguments' in strict mode"));
        assert!(parse("eval = 1", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_parameter_decorators() {
        let err = parse("function f(@a b) {}", ParserOptions::default()).unwrap_err();
        assert!(err.is_missing_plugin());
    }
}
