//! Functions, methods and arrows.

use crate::dialect::ReturnSignature;
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{Function, Node, NodeKind, TokenType};
use ecma_core::collections::FxHashSet;
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::Plugin;
use std::mem;

fn has_simple_params(function: &Function) -> bool {
    function
        .params
        .iter()
        .all(|param| matches!(param.kind, NodeKind::Identifier { .. }))
}

fn has_use_strict(body: &Node) -> bool {
    let NodeKind::BlockStatement { directives, .. } = &body.kind else {
        return false;
    };
    directives.iter().flatten().any(|directive| match &directive.kind {
        NodeKind::Directive { value } => {
            matches!(&value.kind, NodeKind::DirectiveLiteral { value } if value == "use strict")
        }
        _ => false,
    })
}

/// Grammar flags a function body replaces and restores.
struct FunctionScope {
    in_function: bool,
    in_method: Option<&'static str>,
    in_generator: bool,
    in_async: bool,
    in_class_property: bool,
    maybe_in_arrow_parameters: bool,
}

impl Parser {
    fn save_function_scope(&self) -> FunctionScope {
        let state = self.state();
        FunctionScope {
            in_function: state.in_function,
            in_method: state.in_method,
            in_generator: state.in_generator,
            in_async: state.in_async,
            in_class_property: state.in_class_property,
            maybe_in_arrow_parameters: state.maybe_in_arrow_parameters,
        }
    }

    fn restore_function_scope(&mut self, scope: FunctionScope) {
        let state = &mut self.tok.state;
        state.in_function = scope.in_function;
        state.in_method = scope.in_method;
        state.in_generator = scope.in_generator;
        state.in_async = scope.in_async;
        state.in_class_property = scope.in_class_property;
        state.maybe_in_arrow_parameters = scope.maybe_in_arrow_parameters;
    }

    /// A function declaration or expression; `function` (and `async`) are
    /// already consumed. With `optional_id` a declaration may be anonymous,
    /// as after `export default`.
    pub(crate) fn parse_function(
        &mut self,
        start: NodeStart,
        is_statement: bool,
        is_async: bool,
        optional_id: bool,
    ) -> ParseResult<Node> {
        let scope = self.save_function_scope();
        let result = self.parse_function_inner(is_statement, is_async, optional_id, start.pos);
        self.restore_function_scope(scope);
        let function = result?;

        let kind = if function.body.is_none() {
            NodeKind::TSDeclareFunction { function, declare: false }
        } else if is_statement {
            NodeKind::FunctionDeclaration { function }
        } else {
            NodeKind::FunctionExpression { function }
        };
        Ok(self.finish_node(start, kind))
    }

    fn parse_function_inner(
        &mut self,
        is_statement: bool,
        is_async: bool,
        optional_id: bool,
        start_pos: TextPos,
    ) -> ParseResult<Function> {
        let mut function = Function { r#async: is_async, ..Default::default() };
        function.generator = self.eat(TokenType::Star)?;
        if function.generator && is_async {
            self.expect_plugin(Plugin::AsyncGenerators, None)?;
        }

        // A declaration's name binds in the enclosing scope, an expression's
        // inside the function.
        if is_statement {
            function.id = self.parse_function_id(!optional_id)?;
        }
        let state = &mut self.tok.state;
        state.in_function = true;
        state.in_method = None;
        state.in_class_property = false;
        state.maybe_in_arrow_parameters = false;
        state.in_async = is_async;
        state.in_generator = function.generator;
        if !is_statement {
            function.id = self.parse_function_id(false)?;
        }

        self.parse_function_params(&mut function, false)?;
        self.parse_function_body_and_finish(&mut function, is_statement, false, start_pos)?;
        Ok(function)
    }

    fn parse_function_id(&mut self, required: bool) -> ParseResult<Option<Box<Node>>> {
        if required || self.is(TokenType::Name) {
            Ok(Some(Box::new(self.parse_binding_identifier()?)))
        } else {
            Ok(None)
        }
    }

    /// Type parameters and the parenthesized parameter list.
    pub(crate) fn parse_function_params(
        &mut self,
        function: &mut Function,
        allow_modifiers: bool,
    ) -> ParseResult<()> {
        if self.is_relational("<") {
            function.type_parameters = self.hook_type_parameters()?.map(Box::new);
        }
        let old_in_parameters = mem::replace(&mut self.tok.state.in_parameters, true);
        let result = self
            .expect(TokenType::ParenL)
            .and_then(|()| self.parse_binding_list(TokenType::ParenR, false, allow_modifiers));
        self.tok.state.in_parameters = old_in_parameters;
        function.params = result?.into_iter().flatten().collect();
        Ok(())
    }

    /// Return annotation and body. A dialect may let the function end
    /// without a body when `allow_bodiless` is set.
    pub(crate) fn parse_function_body_and_finish(
        &mut self,
        function: &mut Function,
        allow_bodiless: bool,
        is_method: bool,
        start_pos: TextPos,
    ) -> ParseResult<()> {
        if self.is(TokenType::Colon) {
            if let Some(signature) = self.hook_return_type()? {
                function.return_type = signature.return_type.map(Box::new);
                function.predicate = signature.predicate.map(Box::new);
            }
        }
        if allow_bodiless && !self.is(TokenType::BraceL) && self.hook_bodiless_function()? {
            return Ok(());
        }
        self.parse_function_body(function, false, is_method, start_pos)?;
        Ok(())
    }

    /// Parse the body into `function.body`. `allow_expression` admits a
    /// concise arrow body; returns whether one was parsed.
    pub(crate) fn parse_function_body(
        &mut self,
        function: &mut Function,
        allow_expression: bool,
        is_method: bool,
        start_pos: TextPos,
    ) -> ParseResult<bool> {
        let is_expression = allow_expression && !self.is(TokenType::BraceL);
        let old_in_parameters = mem::replace(&mut self.tok.state.in_parameters, false);
        let old_in_async = mem::replace(&mut self.tok.state.in_async, function.r#async);

        let result = if is_expression {
            self.parse_maybe_assign().map(|body| function.body = Some(Box::new(body)))
        } else {
            self.parse_function_block(function)
        };
        let result = result.and_then(|()| {
            self.check_function_params(function, is_method, allow_expression, start_pos)
        });

        self.tok.state.in_parameters = old_in_parameters;
        self.tok.state.in_async = old_in_async;
        result.map(|()| is_expression)
    }

    fn parse_function_block(&mut self, function: &mut Function) -> ParseResult<()> {
        let state = &mut self.tok.state;
        let old_in_generator = mem::replace(&mut state.in_generator, function.generator);
        let old_in_function = mem::replace(&mut state.in_function, true);
        let old_labels = mem::take(&mut state.labels);

        let body = self.parse_block(true);

        let state = &mut self.tok.state;
        state.in_generator = old_in_generator;
        state.in_function = old_in_function;
        state.labels = old_labels;
        function.body = Some(Box::new(body?));
        Ok(())
    }

    /// Parameter rules that depend on the body: duplicate names, reserved
    /// names under strict mode, and `"use strict"` with non-simple
    /// parameters.
    fn check_function_params(
        &mut self,
        function: &Function,
        is_method: bool,
        is_arrow: bool,
        start_pos: TextPos,
    ) -> ParseResult<()> {
        let simple = has_simple_params(function);
        let body_strict = function.body.as_deref().is_some_and(has_use_strict);
        if body_strict && !simple {
            return Err(self.raise(start_pos, &messages::ILLEGAL_USE_STRICT, &[]));
        }
        if is_arrow && self.state().no_arrow_param_at.contains(&start_pos) {
            return Ok(());
        }

        let old_strict = self.state().strict;
        self.tok.state.strict = old_strict || body_strict;
        let result = self.check_param_bindings(function, is_method || is_arrow || !simple);
        self.tok.state.strict = old_strict;
        result
    }

    fn check_param_bindings(&self, function: &Function, always: bool) -> ParseResult<()> {
        if !always && !self.state().strict {
            return Ok(());
        }
        if let Some(id) = &function.id {
            self.check_lval(id, true, None, "function name")?;
        }
        let mut names = FxHashSet::default();
        for param in &function.params {
            self.check_lval(param, true, Some(&mut names), "function parameter list")?;
        }
        Ok(())
    }

    /// An arrow function whose parameters were parsed as expressions; the
    /// `=>` is already consumed.
    pub(crate) fn parse_arrow_expression(
        &mut self,
        start: NodeStart,
        params: Vec<Node>,
        is_async: bool,
        signature: ReturnSignature,
    ) -> ParseResult<Node> {
        let scope = self.save_function_scope();
        let state = &mut self.tok.state;
        state.in_function = true;
        state.in_generator = false;
        state.maybe_in_arrow_parameters = false;

        let mut function = Function {
            r#async: is_async,
            return_type: signature.return_type.map(Box::new),
            predicate: signature.predicate.map(Box::new),
            ..Default::default()
        };
        let result = self.parse_arrow_params_and_body(&mut function, params, start.pos);
        self.restore_function_scope(scope);
        let expression = result?;
        Ok(self.finish_node(
            start,
            NodeKind::ArrowFunctionExpression { function, expression: Some(expression) },
        ))
    }

    fn parse_arrow_params_and_body(
        &mut self,
        function: &mut Function,
        params: Vec<Node>,
        start_pos: TextPos,
    ) -> ParseResult<bool> {
        function.params = if self.state().no_arrow_param_at.contains(&start_pos) {
            params
        } else {
            self.to_assignable_list(params, true, "arrow function parameters")?
        };
        self.parse_function_body(function, true, false, start_pos)
    }

    /// Convert and check the parameters of an arrow parsed while its start
    /// was listed in `no_arrow_param_at`.
    pub(crate) fn finish_arrow_validation(&mut self, arrow: &mut Node) -> ParseResult<()> {
        let Some(function) = arrow.kind.function_mut() else {
            return Ok(());
        };
        let params = mem::take(&mut function.params);
        function.params = self.to_assignable_list(params, true, "arrow function parameters")?;
        self.check_param_bindings(function, true)
    }

    /// The parameters and body of an object method.
    pub(crate) fn parse_method(
        &mut self,
        is_generator: bool,
        is_async: bool,
        kind: &'static str,
        start_pos: TextPos,
    ) -> ParseResult<Function> {
        self.parse_method_with(is_generator, is_async, kind, false, start_pos)
    }

    /// Like [`Parser::parse_method`]; `allow_bodiless` lets a dialect end a
    /// class method at its signature.
    pub(crate) fn parse_method_with(
        &mut self,
        is_generator: bool,
        is_async: bool,
        kind: &'static str,
        allow_bodiless: bool,
        start_pos: TextPos,
    ) -> ParseResult<Function> {
        let scope = self.save_function_scope();
        let state = &mut self.tok.state;
        state.in_function = true;
        state.in_method = Some(kind);
        state.in_generator = is_generator;
        state.in_async = is_async;
        state.maybe_in_arrow_parameters = false;

        let mut function = Function { generator: is_generator, r#async: is_async, ..Default::default() };
        let result = self
            .parse_function_params(&mut function, kind == "constructor")
            .and_then(|()| {
                self.parse_function_body_and_finish(&mut function, allow_bodiless, true, start_pos)
            });
        self.restore_function_scope(scope);
        result.map(|()| function)
    }

    /// Arity rules for accessors.
    pub(crate) fn check_getter_setter_params(
        &self,
        kind: &str,
        function: &Function,
        pos: TextPos,
    ) -> ParseResult<()> {
        match kind {
            "get" if !function.params.is_empty() => {
                Err(self.raise(pos, &messages::GETTER_PARAMS, &[]))
            }
            "set" if function.params.len() != 1 => {
                Err(self.raise(pos, &messages::SETTER_PARAMS, &[]))
            }
            "set" if matches!(function.params[0].kind, NodeKind::RestElement { .. }) => {
                Err(self.raise(pos, &messages::SETTER_REST, &[]))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::{parse, parse_expression};
    use ecma_ast::{NodeKind, SourceType};
    fn error(source: &str) -> String {
        parse(source, ParserOptions::default()).unwrap_err().message
    }

    #[test]
    fn test_function_flags() {
        let node = parse_expression("async function* f() {}", ParserOptions::default()).unwrap();
        let function = node.kind.function().unwrap();
        assert!(function.generator && function.r#async);

        let node = parse_expression("function* f(a, b = 1) { yield a }", ParserOptions::default()).unwrap();
        let function = node.kind.function().unwrap();
        assert!(function.generator);
        assert!(!function.r#async);
        assert_eq!(function.params.len(), 2);
        assert_eq!(function.params[1].type_name(), "AssignmentPattern");
    }

    #[test]
    fn test_duplicate_params() {
        assert!(parse("function f(a, a) {}", ParserOptions::default()).is_ok());
        assert!(error("'use strict'; function f(a, a) {}").starts_with("Argument name clash"));
        assert!(error("function f(a, [a]) {}").starts_with("Argument name clash"));
        assert!(error("(a, a) => 1").starts_with("Argument name clash"));
    }

    #[test]
    fn test_use_strict_with_complex_params() {
        assert!(error("function f(a = 1) { 'use strict' }").starts_with("Illegal 'use strict' directive"));
        assert!(parse("function f(a) { 'use strict' }", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_use_strict_applies_to_function_name() {
        assert!(error("function eval() { 'use strict' }").starts_with("Binding 'eval' in strict mode"));
        assert!(parse("function eval() {}", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_yield_is_identifier_outside_generators() {
        assert!(parse("function f() { var yield = 1 }", ParserOptions::default()).is_ok());
        assert!(error("function* f() { var yield = 1 }")
            .starts_with("Can not use 'yield' as identifier inside a generator"));
    }

    #[test]
    fn test_await_binding_in_async_function() {
        assert!(error("async function f() { var await }")
            .starts_with("Can not use 'await' as identifier inside an async function"));
        assert!(parse("function f() { var await }", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_generator_expression_name_is_checked_inside() {
        assert!(error("(function* yield() {})").starts_with("Can not use 'yield' as identifier"));
        assert!(parse("function* yield() {}", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_arrow_body_kinds() {
        let file = parse("x => x; y => { return y }", ParserOptions::default()).unwrap();
        let NodeKind::File { program, .. } = &file.kind else { panic!("expected file") };
        let NodeKind::Program { body, .. } = &program.kind else { panic!("expected program") };
        let expressions: Vec<_> = body
            .iter()
            .map(|statement| match &statement.kind {
                NodeKind::ExpressionStatement { expression, .. } => match &expression.kind {
                    NodeKind::ArrowFunctionExpression { expression, .. } => *expression,
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(expressions, vec![Some(true), Some(false)]);
    }

    #[test]
    fn test_module_function_is_strict() {
        let options = ParserOptions::default().with_source_type(SourceType::Module);
        let err = parse("function f(a, a) {}", options).unwrap_err();
        assert!(err.message.starts_with("Argument name clash"));
    }

    #[test]
    fn test_accessor_arity() {
        assert!(error("({ set a() {} })").starts_with("setter must have exactly one formal parameter"));
        assert!(parse("({ get a() {}, set a(v) {} })", ParserOptions::default()).is_ok());
    }
}
