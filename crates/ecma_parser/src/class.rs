//! Classes and decorators.
//!
//! Decorators are collected on `State::decorator_stack` as they are parsed
//! and taken by the class (or export) they end up applying to. Each class
//! body and each decorator argument list gets its own frame, so decorators
//! inside them cannot leak onto an outer class.

use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{Class, MemberModifiers, Node, NodeKind, TokenType};
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::Plugin;
use std::mem;

fn is_named(key: &Node, name: &str) -> bool {
    key.is_identifier(name) || key.string_value() == Some(name)
}

fn is_nonstatic_constructor(key: &Node, computed: bool, modifiers: &MemberModifiers) -> bool {
    !computed && !modifiers.r#static && is_named(key, "constructor")
}

impl Parser {
    // ========================================================================
    // Decorators
    // ========================================================================

    /// Decorators in front of a class or `export`. They are left on the
    /// decorator stack for [`Parser::take_decorators`].
    pub(crate) fn parse_decorators(&mut self, allow_export: bool) -> ParseResult<()> {
        while self.is(TokenType::At) {
            let decorator = self.parse_decorator()?;
            if let Some(frame) = self.tok.state.decorator_stack.last_mut() {
                frame.push(decorator);
            }
        }
        if self.is(TokenType::Export) {
            if !allow_export {
                return Err(self.unexpected());
            }
        } else if !self.is(TokenType::Class) {
            return Err(self.raise(self.start(), &messages::LEADING_DECORATOR, &[]));
        }
        Ok(())
    }

    /// `@expr`, where `expr` is a dotted name or a parenthesized expression,
    /// optionally called.
    fn parse_decorator(&mut self) -> ParseResult<Node> {
        self.expect_plugin(Plugin::Decorators, None)?;
        let start = self.start_node();
        self.next()?;

        self.tok.state.decorator_stack.push(Vec::new());
        let expression = self.parse_decorator_expression();
        self.tok.state.decorator_stack.pop();

        Ok(self.finish_node(start, NodeKind::Decorator { expression: Box::new(expression?) }))
    }

    fn parse_decorator_expression(&mut self) -> ParseResult<Node> {
        let expr_start = self.start_node();
        let mut expr = if self.eat(TokenType::ParenL)? {
            let expr = self.parse_expression()?;
            self.expect(TokenType::ParenR)?;
            expr
        } else {
            let mut expr = self.parse_identifier(false)?;
            while self.eat(TokenType::Dot)? {
                let property = self.parse_identifier(true)?;
                expr = self.finish_node(
                    expr_start,
                    NodeKind::MemberExpression {
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: false,
                    },
                );
            }
            expr
        };
        if self.eat(TokenType::ParenL)? {
            let arguments = self.parse_call_arguments(TokenType::ParenR, false, false, None)?;
            self.to_referenced_list(&arguments)?;
            expr = self.finish_node(
                expr_start,
                NodeKind::CallExpression { callee: Box::new(expr), arguments, type_parameters: None },
            );
        }
        Ok(expr)
    }

    /// Take the pending decorators of the current frame.
    pub(crate) fn take_decorators(&mut self) -> Vec<Node> {
        self.tok
            .state
            .decorator_stack
            .last_mut()
            .map(mem::take)
            .unwrap_or_default()
    }

    pub(crate) fn has_pending_decorators(&self) -> bool {
        self.state().decorator_stack.last().is_some_and(|frame| !frame.is_empty())
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// A class declaration or expression at `class`. Pending decorators
    /// attach to it and move its start back to the first one.
    pub(crate) fn parse_class(
        &mut self,
        start: NodeStart,
        is_statement: bool,
        optional_id: bool,
    ) -> ParseResult<Node> {
        self.next()?;
        let decorators = self.take_decorators();
        let start = decorators.first().map(NodeStart::of).unwrap_or(start);

        // Class code is always strict.
        let old_strict = mem::replace(&mut self.tok.state.strict, true);
        let class = self.parse_class_parts(start, decorators, is_statement, optional_id);
        self.tok.state.strict = old_strict;
        let class = class?;

        let kind = if is_statement {
            NodeKind::ClassDeclaration { class }
        } else {
            NodeKind::ClassExpression { class }
        };
        Ok(self.finish_node(start, kind))
    }

    /// Everything after `class`. Dialects that prefix a class with their own
    /// keywords (`declare`, `abstract`) call this directly.
    pub(crate) fn parse_class_parts(
        &mut self,
        start: NodeStart,
        decorators: Vec<Node>,
        is_statement: bool,
        optional_id: bool,
    ) -> ParseResult<Class> {
        let id = if self.is(TokenType::Name) {
            Some(Box::new(self.parse_binding_identifier()?))
        } else if optional_id || !is_statement {
            None
        } else {
            return Err(self.unexpected());
        };
        let type_parameters = if self.is_relational("<") {
            self.hook_type_parameters()?.map(Box::new)
        } else {
            None
        };

        let placeholder = self.finish_node_at(start, NodeKind::ClassBody { body: Vec::new() }, start.pos, start.loc);
        let mut class = Class {
            id,
            super_class: None,
            body: Box::new(placeholder),
            decorators,
            type_parameters,
            super_type_parameters: None,
            implements: Vec::new(),
            r#abstract: false,
            declare: false,
        };
        if self.eat(TokenType::Extends)? {
            class.super_class = Some(Box::new(self.parse_expr_subscripts(None)?));
        }
        self.hook_class_heritage(&mut class)?;
        class.body = Box::new(self.parse_class_body()?);
        Ok(class)
    }

    fn parse_class_body(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        self.tok.state.class_level += 1;
        self.tok.state.decorator_stack.push(Vec::new());
        let body = self.parse_class_members();
        self.tok.state.decorator_stack.pop();
        self.tok.state.class_level -= 1;
        let body = body?;
        Ok(self.finish_node(start, NodeKind::ClassBody { body }))
    }

    fn parse_class_members(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenType::BraceL)?;
        let mut members = Vec::new();
        let mut decorators: Vec<Node> = Vec::new();
        let mut had_constructor = false;

        while !self.eat(TokenType::BraceR)? {
            if self.eat(TokenType::Semi)? {
                if !decorators.is_empty() {
                    return Err(self.raise(self.state().last_tok_end, &messages::TRAILING_CLASS_DECORATOR, &[]));
                }
                continue;
            }
            if self.is(TokenType::At) {
                decorators.push(self.parse_decorator()?);
                continue;
            }

            let start = decorators.first().map(NodeStart::of).unwrap_or_else(|| self.start_node());
            let modifiers = MemberModifiers {
                decorators: mem::take(&mut decorators),
                ..MemberModifiers::default()
            };
            members.push(self.parse_class_member(start, modifiers, &mut had_constructor)?);
        }

        if !decorators.is_empty() {
            return Err(self.raise(self.start(), &messages::TRAILING_CLASS_DECORATOR, &[]));
        }
        Ok(members)
    }

    fn is_class_method(&self) -> bool {
        self.is(TokenType::ParenL) || (self.has_type_dialect() && self.is_relational("<"))
    }

    fn is_class_property(&self) -> bool {
        matches!(self.cur(), TokenType::Eq | TokenType::Semi | TokenType::BraceR)
            || (self.has_type_dialect() && self.is(TokenType::Colon))
    }

    fn parse_class_member(
        &mut self,
        start: NodeStart,
        mut modifiers: MemberModifiers,
        had_constructor: &mut bool,
    ) -> ParseResult<Node> {
        self.hook_class_member_modifiers(&mut modifiers)?;

        if self.is(TokenType::Name) && self.value() == "static" {
            let contains_esc = self.state().contains_esc;
            let key = self.parse_identifier(true)?;
            // A method or field named `static`.
            if self.is_class_method() {
                return self.push_class_method(start, key, false, modifiers, "method", false, false);
            }
            if self.is_class_property() {
                return self.push_class_property(start, key, false, modifiers, None);
            }
            if contains_esc {
                return Err(self.unexpected_at(key.start));
            }
            modifiers.r#static = true;
            self.hook_class_member_modifiers(&mut modifiers)?;
        }

        if let Some(member) = self.hook_class_member(start, &mut modifiers)? {
            return Ok(member);
        }
        self.parse_class_member_with_static(start, modifiers, had_constructor)
    }

    fn parse_class_member_with_static(
        &mut self,
        start: NodeStart,
        mut modifiers: MemberModifiers,
        had_constructor: &mut bool,
    ) -> ParseResult<Node> {
        let variance = self.hook_variance()?;
        let variance_pos = variance.as_ref().map(|v| v.start);

        if self.eat(TokenType::Star)? {
            if let Some(pos) = variance_pos {
                return Err(self.unexpected_at(pos));
            }
            let (key, computed) = self.parse_class_property_name(&modifiers)?;
            if matches!(key.kind, NodeKind::PrivateName { .. }) {
                return self.push_class_private_method(start, key, modifiers, "method", true, false);
            }
            if is_nonstatic_constructor(&key, computed, &modifiers) {
                return Err(self.raise(key.start, &messages::CONSTRUCTOR_IS_GENERATOR, &[]));
            }
            return self.push_class_method(start, key, computed, modifiers, "method", true, false);
        }

        let contains_esc = self.state().contains_esc;
        let (key, computed) = self.parse_class_property_name(&modifiers)?;
        let is_private = matches!(key.kind, NodeKind::PrivateName { .. });
        let simple_name = if computed || contains_esc { None } else { key.identifier_name().map(str::to_string) };
        self.hook_class_member_key_suffix(&mut modifiers)?;

        if self.is_class_method() {
            if let Some(pos) = variance_pos {
                return Err(self.unexpected_at(pos));
            }
            if is_private {
                return self.push_class_private_method(start, key, modifiers, "method", false, false);
            }
            let is_constructor = is_nonstatic_constructor(&key, computed, &modifiers);
            if is_constructor {
                if !modifiers.decorators.is_empty() {
                    return Err(self.raise(key.start, &messages::DECORATED_CONSTRUCTOR, &[]));
                }
                if *had_constructor && !self.has_plugin(Plugin::Typescript) {
                    return Err(self.raise(key.start, &messages::DUPLICATE_CONSTRUCTOR, &[]));
                }
                *had_constructor = true;
            }
            let kind = if is_constructor { "constructor" } else { "method" };
            return self.push_class_method(start, key, computed, modifiers, kind, false, false);
        }

        if self.is_class_property() {
            return if is_private {
                self.push_class_private_property(start, key, modifiers)
            } else {
                self.push_class_property(start, key, computed, modifiers, variance)
            };
        }

        match simple_name.as_deref() {
            Some("async") if !self.is_line_terminator()? => {
                let is_generator = self.eat(TokenType::Star)?;
                let (key, computed) = self.parse_class_property_name(&modifiers)?;
                if matches!(key.kind, NodeKind::PrivateName { .. }) {
                    return self.push_class_private_method(start, key, modifiers, "method", is_generator, true);
                }
                if is_nonstatic_constructor(&key, computed, &modifiers) {
                    return Err(self.raise(key.start, &messages::CONSTRUCTOR_IS_ASYNC, &[]));
                }
                return self.push_class_method(start, key, computed, modifiers, "method", is_generator, true);
            }
            // `get\n*gen() {}` is a field named `get` followed by a generator.
            Some(name @ ("get" | "set")) if !(self.is(TokenType::Star) && self.can_insert_semicolon()) => {
                let kind = if name == "get" { "get" } else { "set" };
                let (key, computed) = self.parse_class_property_name(&modifiers)?;
                let key_start = key.start;
                let method = if matches!(key.kind, NodeKind::PrivateName { .. }) {
                    self.push_class_private_method(start, key, modifiers, kind, false, false)?
                } else {
                    if is_nonstatic_constructor(&key, computed, &modifiers) {
                        return Err(self.raise(key_start, &messages::CONSTRUCTOR_IS_ACCESSOR, &[]));
                    }
                    self.push_class_method(start, key, computed, modifiers, kind, false, false)?
                };
                if let Some(function) = method.kind.function() {
                    self.check_getter_setter_params(kind, function, start.pos)?;
                }
                return Ok(method);
            }
            _ => {}
        }

        if self.can_insert_semicolon() {
            return if is_private {
                self.push_class_private_property(start, key, modifiers)
            } else {
                self.push_class_property(start, key, computed, modifiers, variance)
            };
        }
        Err(self.unexpected())
    }

    fn parse_class_property_name(&mut self, modifiers: &MemberModifiers) -> ParseResult<(Node, bool)> {
        let (key, computed) = self.parse_property_name()?;
        if !computed && modifiers.r#static && is_named(&key, "prototype") {
            return Err(self.raise(key.start, &messages::STATIC_PROTOTYPE, &[]));
        }
        if let NodeKind::PrivateName { id } = &key.kind {
            if id.is_identifier("constructor") {
                return Err(self.raise(key.start, &messages::PRIVATE_CONSTRUCTOR, &[]));
            }
        }
        Ok((key, computed))
    }

    // ========================================================================
    // Members
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn push_class_method(
        &mut self,
        start: NodeStart,
        key: Node,
        computed: bool,
        modifiers: MemberModifiers,
        kind: &'static str,
        is_generator: bool,
        is_async: bool,
    ) -> ParseResult<Node> {
        if modifiers.readonly {
            return Err(self.raise(start.pos, &messages::TS_CLASS_METHOD_HAS_READONLY, &[]));
        }
        let function = self.parse_method_with(is_generator, is_async, kind, true, start.pos)?;
        if let Some(type_parameters) = &function.type_parameters {
            let message = match kind {
                "constructor" => Some(&messages::TS_CONSTRUCTOR_WITH_TYPE_PARAMETERS),
                "get" | "set" => Some(&messages::TS_ACCESSOR_WITH_TYPE_PARAMETERS),
                _ => None,
            };
            if let Some(message) = message {
                return Err(self.raise(type_parameters.start, message, &[]));
            }
        }
        let key = Box::new(key);
        let node = if function.body.is_none() {
            NodeKind::TSDeclareMethod { kind, key, computed, modifiers, function }
        } else {
            NodeKind::ClassMethod { kind, key, computed, modifiers, function }
        };
        Ok(self.finish_node(start, node))
    }

    fn push_class_private_method(
        &mut self,
        start: NodeStart,
        key: Node,
        modifiers: MemberModifiers,
        kind: &'static str,
        is_generator: bool,
        is_async: bool,
    ) -> ParseResult<Node> {
        self.expect_plugin(Plugin::ClassPrivateMethods, Some(key.start))?;
        let function = self.parse_method(is_generator, is_async, kind, start.pos)?;
        Ok(self.finish_node(
            start,
            NodeKind::ClassPrivateMethod { kind, key: Box::new(key), modifiers, function },
        ))
    }

    fn push_class_property(
        &mut self,
        start: NodeStart,
        key: Node,
        computed: bool,
        modifiers: MemberModifiers,
        variance: Option<Node>,
    ) -> ParseResult<Node> {
        if !computed && is_named(&key, "constructor") {
            return Err(self.raise(key.start, &messages::CONSTRUCTOR_CLASS_FIELD, &[]));
        }
        let (value, type_annotation) = self.parse_class_property_value(&key, &modifiers, true)?;
        Ok(self.finish_node(
            start,
            NodeKind::ClassProperty {
                key: Box::new(key),
                value,
                computed,
                modifiers,
                type_annotation,
                variance: variance.map(Box::new),
            },
        ))
    }

    fn push_class_private_property(
        &mut self,
        start: NodeStart,
        key: Node,
        modifiers: MemberModifiers,
    ) -> ParseResult<Node> {
        self.expect_plugin(Plugin::ClassPrivateProperties, Some(key.start))?;
        let (value, type_annotation) = self.parse_class_property_value(&key, &modifiers, false)?;
        Ok(self.finish_node(
            start,
            NodeKind::ClassPrivateProperty { key: Box::new(key), value, modifiers, type_annotation },
        ))
    }

    /// Annotation, initializer and terminator of a field. A public field
    /// that carries only a type annotation is type syntax and needs no
    /// plugin.
    fn parse_class_property_value(
        &mut self,
        key: &Node,
        modifiers: &MemberModifiers,
        is_public: bool,
    ) -> ParseResult<(Option<Box<Node>>, Option<Box<Node>>)> {
        let type_annotation = if self.is(TokenType::Colon) {
            self.hook_after_colon()?.map(Box::new)
        } else {
            None
        };
        if is_public && type_annotation.is_none() {
            self.expect_plugin(Plugin::ClassProperties, None)?;
        }

        let old_in_class_property = mem::replace(&mut self.tok.state.in_class_property, true);
        let value = self.parse_class_property_initializer(key, modifiers, is_public);
        let value = value.and_then(|value| self.semicolon().map(|()| value));
        self.tok.state.in_class_property = old_in_class_property;
        Ok((value?, type_annotation))
    }

    fn parse_class_property_initializer(
        &mut self,
        key: &Node,
        modifiers: &MemberModifiers,
        is_public: bool,
    ) -> ParseResult<Option<Box<Node>>> {
        if !self.is(TokenType::Eq) {
            return Ok(None);
        }
        let eq_pos: TextPos = self.start();
        if modifiers.declare {
            return Err(self.raise(eq_pos, &messages::TS_DECLARE_FIELD_INITIALIZER, &[]));
        }
        if modifiers.r#abstract {
            let name = key.identifier_name().unwrap_or_default().to_string();
            return Err(self.raise(key.start, &messages::TS_ABSTRACT_PROPERTY_INITIALIZER, &[&name]));
        }
        if is_public {
            self.expect_plugin(Plugin::ClassProperties, None)?;
        }
        self.next()?;
        Ok(Some(Box::new(self.parse_maybe_assign()?)))
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parse;
    use ecma_ast::{Class, Node, NodeKind};
    use ecma_scanner::Plugin;

    fn class_with(source: &str, plugins: &[Plugin]) -> Class {
        let options = ParserOptions::default().with_plugins(plugins.iter().copied());
        let file = parse(source, options).unwrap();
        let NodeKind::File { program, .. } = file.kind else {
            panic!();
        };
        let NodeKind::Program { mut body, .. } = program.kind else {
            panic!();
        };
        match body.remove(0).kind {
            NodeKind::ClassDeclaration { class } => class,
            NodeKind::ExpressionStatement { expression, .. } => match expression.kind {
                NodeKind::ClassExpression { class } => class,
                other => panic!("expected a class, got {}", other.type_name()),
            },
            other => panic!("expected a class, got {}", other.type_name()),
        }
    }

    fn members(class: &Class) -> &[Node] {
        let NodeKind::ClassBody { body } = &class.body.kind else {
            panic!();
        };
        body
    }

    fn error_with(source: &str, plugins: &[Plugin]) -> String {
        let options = ParserOptions::default().with_plugins(plugins.iter().copied());
        parse(source, options).unwrap_err().to_string()
    }

    fn error(source: &str) -> String {
        error_with(source, &[])
    }

    #[test]
    fn test_methods_and_accessors() {
        let class = class_with(
            "class A extends B { constructor() { super(); } static m() {} get x() {} set x(v) {} *g() {} async a() {} }",
            &[],
        );
        assert!(class.super_class.is_some());
        let kinds: Vec<_> = members(&class)
            .iter()
            .map(|m| match &m.kind {
                NodeKind::ClassMethod { kind, modifiers, .. } => (*kind, modifiers.r#static),
                other => panic!("unexpected {}", other.type_name()),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("constructor", false),
                ("method", true),
                ("get", false),
                ("set", false),
                ("method", false),
                ("method", false),
            ]
        );
    }

    #[test]
    fn test_members_named_like_modifiers() {
        let class = class_with("class A { static() {} get() {} async() {} static static() {} }", &[]);
        let names: Vec<_> = members(&class)
            .iter()
            .map(|m| match &m.kind {
                NodeKind::ClassMethod { key, modifiers, .. } => {
                    (key.identifier_name().unwrap_or_default().to_string(), modifiers.r#static)
                }
                other => panic!("unexpected {}", other.type_name()),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                ("static".to_string(), false),
                ("get".to_string(), false),
                ("async".to_string(), false),
                ("static".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_constructor_rules() {
        assert_eq!(error("class A { constructor() {} constructor() {} }"), "Duplicate constructor in the same class (1:27)");
        assert_eq!(error("class A { get constructor() {} }"), "Constructor can't have get/set modifier (1:14)");
        assert_eq!(error("class A { *constructor() {} }"), "Constructor can't be a generator (1:11)");
        assert_eq!(error("class A { async constructor() {} }"), "Constructor can't be an async function (1:16)");
        assert_eq!(error("class A { static prototype() {} }"), "Classes may not have static property named prototype (1:17)");
        assert!(parse("class A { static constructor() {} }", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_class_properties_need_plugins() {
        let err = parse("class A { x = 1 }", ParserOptions::default()).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["classProperties".to_string()]));
        let class = class_with("class A { x = 1; static y; [z] = 2 }", &[Plugin::ClassProperties]);
        assert_eq!(members(&class).len(), 3);
        assert!(matches!(&members(&class)[2].kind, NodeKind::ClassProperty { computed: true, .. }));
        assert_eq!(
            error_with("class A { constructor = 1 }", &[Plugin::ClassProperties]),
            "Classes may not have a field named 'constructor' (1:10)"
        );
    }

    #[test]
    fn test_private_members() {
        let plugins = [Plugin::ClassPrivateProperties, Plugin::ClassPrivateMethods];
        let class = class_with("class A { #x = 1; #m() { return this.#x; } }", &plugins);
        assert!(matches!(members(&class)[0].kind, NodeKind::ClassPrivateProperty { .. }));
        assert!(matches!(members(&class)[1].kind, NodeKind::ClassPrivateMethod { .. }));
        assert_eq!(
            error_with("class A { #constructor() {} }", &plugins),
            "#constructor is a reserved word (1:10)"
        );
        let err = parse("class A { #m() {} }", ParserOptions::default().with_plugins([Plugin::ClassPrivateProperties]))
            .unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["classPrivateMethods".to_string()]));
    }

    #[test]
    fn test_class_bodies_are_strict() {
        assert_eq!(error("class A { m() { with (a) {} } }"), "'with' in strict mode (1:16)");
        assert_eq!(error("class let {}"), "let is a reserved word in strict mode (1:6)");
    }

    #[test]
    fn test_decorators() {
        let class = class_with("@a @b.c(1) class A { @d m() {} }", &[Plugin::Decorators]);
        assert_eq!(class.decorators.len(), 2);
        let NodeKind::ClassMethod { modifiers, .. } = &members(&class)[0].kind else {
            panic!();
        };
        assert_eq!(modifiers.decorators.len(), 1);
        assert_eq!(members(&class)[0].start, 21);

        let err = parse("@a class A {}", ParserOptions::default()).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["decorators".to_string()]));
        assert_eq!(
            error_with("@a function f() {}", &[Plugin::Decorators]),
            "Leading decorators must be attached to a class declaration (1:3)"
        );
        assert_eq!(
            error_with("class A { @a }", &[Plugin::Decorators]),
            "You have trailing decorators with no method (1:14)"
        );
        assert_eq!(
            error_with("class A { @a constructor() {} }", &[Plugin::Decorators]),
            "You can't attach decorators to a class constructor (1:13)"
        );
    }

    #[test]
    fn test_class_expression_decorator_start() {
        let class = class_with("(@dec class {})", &[Plugin::Decorators]);
        assert!(class.id.is_none());
        assert_eq!(class.decorators.len(), 1);
    }
}
