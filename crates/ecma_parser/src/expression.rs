//! Expression grammar.
//!
//! Binary operators are parsed by precedence climbing in
//! [`Parser::parse_expr_op`]; everything above them is recursive descent.
//! A parenthesized list or call argument list may turn out to be arrow
//! parameters, so its items are parsed as expressions and converted to
//! patterns once the `=>` shows up. Errors that only matter when the list is
//! *not* converted (a shorthand default such as `{ a = 1 }`, a duplicate
//! `__proto__`) are recorded in [`ExpressionErrors`] and raised later.

use crate::dialect::{Hook, ReturnSignature};
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{LiteralValue, Node, NodeKind, TemplateValue, TokenType, TokenValue};
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::{Plugin, TokContext};
use std::mem;

/// Errors recorded while it is still unknown whether an expression will be
/// reinterpreted as a pattern.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionErrors {
    /// `{ a = 1 }`, valid only as a pattern.
    pub shorthand_assign: Option<TextPos>,
    /// A second `__proto__` key, valid only as a pattern.
    pub double_proto: Option<TextPos>,
    /// Something a dialect parsed that is valid only before `=>`.
    pub needs_arrow: Option<TextPos>,
    /// Set for the items of a parenthesized list, which may still become
    /// arrow parameters.
    pub in_parens: bool,
}

/// Markers kept while parsing a list that may turn out to be arrow
/// parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArrowParamMarkers {
    maybe_in_arrow_parameters: bool,
    yield_at: Option<TextPos>,
    await_at: Option<TextPos>,
}

#[derive(Debug, Default)]
struct SubscriptState {
    optional_chain_member: bool,
    stop: bool,
}

const OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", ">>>=", "|=", "^=", "&=", "**=", "||=", "&&=",
    "??=", "++", "--", "!", "~", "+", "-", "typeof", "void", "delete", "throw", "??", "||", "&&",
    "|", "^", "&", "==", "!=", "===", "!==", "<", ">", "<=", ">=", "in", "instanceof", "<<", ">>",
    ">>>", "*", "/", "%", "**",
];

/// The static spelling of an operator token's text.
pub(crate) fn intern_operator(op: &str) -> &'static str {
    OPERATORS.iter().copied().find(|known| *known == op).unwrap_or("?")
}

fn is_arrow_at(expr: &Node, pos: Option<TextPos>) -> bool {
    matches!(expr.kind, NodeKind::ArrowFunctionExpression { .. }) && Some(expr.start) == pos
}

impl Parser {
    // ========================================================================
    // Sequences and assignment
    // ========================================================================

    /// Parse a full expression, including the comma operator.
    pub fn parse_expression(&mut self) -> ParseResult<Node> {
        self.parse_expression_with(false, None)
    }

    pub(crate) fn parse_expression_with(
        &mut self,
        no_in: bool,
        mut errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        let expr = self.parse_maybe_assign_with(no_in, errors.as_deref_mut(), false)?;
        if !self.is(TokenType::Comma) {
            return Ok(expr);
        }
        let mut expressions = vec![expr];
        while self.eat(TokenType::Comma)? {
            expressions.push(self.parse_maybe_assign_with(no_in, errors.as_deref_mut(), false)?);
        }
        self.to_referenced_list(&expressions)?;
        Ok(self.finish_node(start, NodeKind::SequenceExpression { expressions }))
    }

    /// Let the dialects reject expressions that may not be used as values.
    pub(crate) fn to_referenced_list<'a>(
        &self,
        exprs: impl IntoIterator<Item = &'a Node>,
    ) -> ParseResult<()> {
        for expr in exprs {
            self.hook_check_referenced(expr)?;
        }
        Ok(())
    }

    pub fn parse_maybe_assign(&mut self) -> ParseResult<Node> {
        self.parse_maybe_assign_with(false, None, false)
    }

    /// An assignment expression. `paren_item` marks an item of a list that
    /// may hold dialect-only items such as type casts.
    pub(crate) fn parse_maybe_assign_with(
        &mut self,
        no_in: bool,
        errors: Option<&mut ExpressionErrors>,
        paren_item: bool,
    ) -> ParseResult<Node> {
        if let Some(node) = self.hook_maybe_assign(no_in)? {
            return Ok(node);
        }
        self.base_maybe_assign(no_in, errors, paren_item)
    }

    /// The assignment rule without the dialect hook, for dialects that wrap
    /// it.
    pub(crate) fn base_maybe_assign(
        &mut self,
        no_in: bool,
        errors: Option<&mut ExpressionErrors>,
        paren_item: bool,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        if self.is_contextual("yield") && self.state().in_generator {
            let mut left = self.parse_yield(no_in)?;
            if paren_item {
                left = self.hook_paren_item(left, start)?;
            }
            return Ok(left);
        }

        let owns_errors = errors.is_none();
        let mut own_errors = ExpressionErrors::default();
        let errors = match errors {
            Some(errors) => errors,
            None => &mut own_errors,
        };

        if matches!(self.cur(), TokenType::ParenL | TokenType::Name) {
            self.tok.state.potential_arrow_at = Some(self.start());
        }

        let mut left = self.parse_maybe_conditional(no_in, errors)?;
        if paren_item {
            left = self.hook_paren_item(left, start)?;
        }

        if self.cur().is_assign() {
            let operator = intern_operator(self.value());
            let left = if operator == "=" {
                let left = self.to_assignable(left, false, "assignment expression")?;
                errors.shorthand_assign = None;
                errors.double_proto = None;
                left
            } else {
                left
            };
            self.check_lval(&left, false, None, "assignment expression")?;
            if left.is_parenthesized()
                && matches!(left.kind, NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. })
            {
                return Err(self.raise(left.start, &messages::PARENTHESIZED_ARROW_PARAM, &[]));
            }
            self.next()?;
            let right = self.parse_maybe_assign_with(no_in, None, false)?;
            return Ok(self.finish_node(
                start,
                NodeKind::AssignmentExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            ));
        }

        if owns_errors {
            if let Some(pos) = errors.shorthand_assign {
                return Err(self.unexpected_at(pos));
            }
            if let Some(pos) = errors.double_proto {
                return Err(self.raise(pos, &messages::PROTO_REDEFINITION, &[]));
            }
        }
        Ok(left)
    }

    // ========================================================================
    // Conditional and binary operators
    // ========================================================================

    fn parse_maybe_conditional(
        &mut self,
        no_in: bool,
        errors: &mut ExpressionErrors,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        let potential_arrow_at = self.state().potential_arrow_at;
        let expr = self.parse_expr_ops(no_in, errors)?;
        if is_arrow_at(&expr, potential_arrow_at) || errors.shorthand_assign.is_some() {
            return Ok(expr);
        }
        match self.hook_conditional(expr, start, no_in, errors)? {
            Hook::Done(node) => Ok(node),
            Hook::Pass(test) => self.base_conditional(test, no_in, start),
        }
    }

    /// `test ? consequent : alternate`, or `test` itself when no `?` follows.
    pub(crate) fn base_conditional(
        &mut self,
        test: Node,
        no_in: bool,
        start: NodeStart,
    ) -> ParseResult<Node> {
        if !self.eat(TokenType::Question)? {
            return Ok(test);
        }
        let consequent = self.parse_maybe_assign()?;
        self.expect(TokenType::Colon)?;
        let alternate = self.parse_maybe_assign_with(no_in, None, false)?;
        Ok(self.finish_node(
            start,
            NodeKind::ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        ))
    }

    fn parse_expr_ops(&mut self, no_in: bool, errors: &mut ExpressionErrors) -> ParseResult<Node> {
        let start = self.start_node();
        let potential_arrow_at = self.state().potential_arrow_at;
        let expr = self.parse_maybe_unary(Some(&mut *errors))?;
        if is_arrow_at(&expr, potential_arrow_at) || errors.shorthand_assign.is_some() {
            return Ok(expr);
        }
        self.parse_expr_op(expr, start, 0, no_in)
    }

    /// Precedence climbing: fold operators binding tighter than `min_prec`
    /// into `left`.
    pub(crate) fn parse_expr_op(
        &mut self,
        left: Node,
        left_start: NodeStart,
        min_prec: u8,
        no_in: bool,
    ) -> ParseResult<Node> {
        let left = match self.hook_binary_operator(left, left_start, min_prec, no_in)? {
            Hook::Done(node) => return Ok(node),
            Hook::Pass(node) => node,
        };
        let token = self.cur();
        let Some(prec) = token.binop() else {
            return Ok(left);
        };
        let prec = prec as u8;
        if (no_in && token == TokenType::In) || prec <= min_prec {
            return Ok(left);
        }

        let operator = intern_operator(self.value());
        if operator == "**" && !left.is_parenthesized() {
            if let NodeKind::UnaryExpression { argument, .. } = &left.kind {
                return Err(self.raise(argument.start, &messages::EXPONENT_AFTER_UNARY, &[]));
            }
        }
        if token == TokenType::NullishCoalescing {
            self.expect_plugin(Plugin::NullishCoalescingOperator, None)?;
        }

        self.next()?;
        let right_start = self.start_node();
        let right = self.parse_maybe_unary(None)?;
        let right_prec = if token.right_associative() { prec - 1 } else { prec };
        let right = self.parse_expr_op(right, right_start, right_prec, no_in)?;

        let (left, right) = (Box::new(left), Box::new(right));
        let logical = matches!(
            token,
            TokenType::LogicalOr | TokenType::LogicalAnd | TokenType::NullishCoalescing
        );
        let kind = if logical {
            NodeKind::LogicalExpression { left, operator, right }
        } else {
            NodeKind::BinaryExpression { left, operator, right }
        };
        let node = self.finish_node(left_start, kind);

        let next = self.cur();
        let is_and_or = |t: TokenType| matches!(t, TokenType::LogicalOr | TokenType::LogicalAnd);
        if (token == TokenType::NullishCoalescing && is_and_or(next))
            || (next == TokenType::NullishCoalescing && is_and_or(token))
        {
            return Err(self.raise(self.start(), &messages::NULLISH_MIXED_WITH_LOGICAL, &[]));
        }
        self.parse_expr_op(node, left_start, min_prec, no_in)
    }

    // ========================================================================
    // Unary operators
    // ========================================================================

    pub(crate) fn parse_maybe_unary(
        &mut self,
        mut errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        if let Some(node) = self.hook_maybe_unary()? {
            return Ok(node);
        }
        let start = self.start_node();
        let state = self.state();
        if self.is_contextual("await")
            && (state.in_async
                || (!state.in_function && self.options.allow_await_outside_function))
        {
            return self.parse_await();
        }

        let token = self.cur();
        if token.prefix() {
            if token == TokenType::Throw {
                self.expect_plugin(Plugin::ThrowExpressions, None)?;
            }
            let operator = intern_operator(self.value());
            self.next()?;
            let argument = self.parse_maybe_unary(None)?;
            if let Some(pos) = errors.as_ref().and_then(|e| e.shorthand_assign) {
                return Err(self.unexpected_at(pos));
            }

            if token == TokenType::IncDec {
                self.check_lval(&argument, false, None, "prefix operation")?;
                return Ok(self.finish_node(
                    start,
                    NodeKind::UpdateExpression { operator, prefix: true, argument: Box::new(argument) },
                ));
            }
            if self.state().strict && operator == "delete" {
                match &argument.kind {
                    NodeKind::Identifier { .. } => {
                        return Err(self.raise(start.pos, &messages::DELETE_LOCAL, &[]));
                    }
                    NodeKind::MemberExpression { property, .. }
                    | NodeKind::OptionalMemberExpression { property, .. }
                        if matches!(property.kind, NodeKind::PrivateName { .. }) =>
                    {
                        return Err(self.raise(start.pos, &messages::DELETE_PRIVATE, &[]));
                    }
                    _ => {}
                }
            }
            return Ok(self.finish_node(
                start,
                NodeKind::UnaryExpression { operator, prefix: true, argument: Box::new(argument) },
            ));
        }

        let mut expr = self.parse_expr_subscripts(errors.as_deref_mut())?;
        if errors.is_some_and(|e| e.shorthand_assign.is_some()) {
            return Ok(expr);
        }
        while self.cur().postfix() && !self.can_insert_semicolon() {
            let operator = intern_operator(self.value());
            self.check_lval(&expr, false, None, "postfix operation")?;
            self.next()?;
            expr = self.finish_node(
                start,
                NodeKind::UpdateExpression { operator, prefix: false, argument: Box::new(expr) },
            );
        }
        Ok(expr)
    }

    fn parse_await(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        self.next()?;
        let state = &mut self.tok.state;
        if state.maybe_in_arrow_parameters && state.await_in_possible_arrow_parameters.is_none() {
            state.await_in_possible_arrow_parameters = Some(start.pos);
        }
        if self.state().in_parameters {
            return Err(self.raise(start.pos, &messages::AWAIT_IN_PARAMETER, &[]));
        }
        if self.is(TokenType::Star) {
            return Err(self.raise(start.pos, &messages::AWAIT_STAR, &[]));
        }
        let argument = self.parse_maybe_unary(None)?;
        Ok(self.finish_node(start, NodeKind::AwaitExpression { argument: Box::new(argument) }))
    }

    fn parse_yield(&mut self, no_in: bool) -> ParseResult<Node> {
        let start = self.start_node();
        if self.state().in_parameters {
            return Err(self.raise(start.pos, &messages::YIELD_IN_PARAMETER, &[]));
        }
        let state = &mut self.tok.state;
        if state.maybe_in_arrow_parameters && state.yield_in_possible_arrow_parameters.is_none() {
            state.yield_in_possible_arrow_parameters = Some(start.pos);
        }
        self.next()?;
        let (delegate, argument) = if self.is(TokenType::Semi)
            || self.has_preceding_line_break()
            || (!self.is(TokenType::Star) && !self.cur().starts_expr())
        {
            (false, None)
        } else {
            let delegate = self.eat(TokenType::Star)?;
            (delegate, Some(Box::new(self.parse_maybe_assign_with(no_in, None, false)?)))
        };
        Ok(self.finish_node(start, NodeKind::YieldExpression { delegate, argument }))
    }

    // ========================================================================
    // Calls and member access
    // ========================================================================

    pub(crate) fn parse_expr_subscripts(
        &mut self,
        mut errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        let potential_arrow_at = self.state().potential_arrow_at;
        let expr = self.parse_expr_atom(errors.as_deref_mut())?;
        if is_arrow_at(&expr, potential_arrow_at)
            || errors.is_some_and(|e| e.shorthand_assign.is_some())
        {
            return Ok(expr);
        }
        self.parse_subscripts(expr, start, false)
    }

    /// Member accesses, calls and tagged templates after `base`. With
    /// `no_calls` (the callee of `new`) the first argument list ends it.
    pub(crate) fn parse_subscripts(
        &mut self,
        base: Node,
        start: NodeStart,
        no_calls: bool,
    ) -> ParseResult<Node> {
        let maybe_async_arrow = self.at_possible_async_arrow(&base);
        let mut chain = SubscriptState::default();
        let mut base = base;
        loop {
            base = self.parse_subscript(base, start, no_calls, &mut chain, maybe_async_arrow)?;
            if chain.stop {
                return Ok(base);
            }
        }
    }

    pub(crate) fn at_possible_async_arrow(&self, base: &Node) -> bool {
        let state = self.state();
        state.potential_arrow_at == Some(base.start)
            && base.is_identifier("async")
            && state.last_tok_end == base.end
            && !self.can_insert_semicolon()
    }

    fn parse_subscript(
        &mut self,
        base: Node,
        start: NodeStart,
        no_calls: bool,
        chain: &mut SubscriptState,
        maybe_async_arrow: bool,
    ) -> ParseResult<Node> {
        let base = match self.hook_subscript(base, start, no_calls, &mut chain.stop)? {
            Hook::Done(node) => return Ok(node),
            Hook::Pass(node) => node,
        };

        if !no_calls && self.eat(TokenType::DoubleColon)? {
            let callee = self.parse_no_call_expr()?;
            chain.stop = true;
            let node = self.finish_node(
                start,
                NodeKind::BindExpression { object: Some(Box::new(base)), callee: Box::new(callee) },
            );
            return self.parse_subscripts(node, start, no_calls);
        }

        if self.is(TokenType::QuestionDot) {
            self.expect_plugin(Plugin::OptionalChaining, None)?;
            chain.optional_chain_member = true;
            if no_calls && self.lookahead()?.token_type == TokenType::ParenL {
                chain.stop = true;
                return Ok(base);
            }
            self.next()?;
            let object = Box::new(base);
            if self.eat(TokenType::BracketL)? {
                let property = Box::new(self.parse_expression()?);
                self.expect(TokenType::BracketR)?;
                return Ok(self.finish_node(
                    start,
                    NodeKind::OptionalMemberExpression { object, property, computed: true, optional: true },
                ));
            }
            if self.eat(TokenType::ParenL)? {
                let arguments = self.parse_call_arguments(TokenType::ParenR, false, false, None)?;
                self.to_referenced_list(&arguments)?;
                return Ok(self.finish_node(
                    start,
                    NodeKind::OptionalCallExpression {
                        callee: object,
                        arguments,
                        optional: true,
                        type_parameters: None,
                    },
                ));
            }
            let property = Box::new(self.parse_identifier(true)?);
            return Ok(self.finish_node(
                start,
                NodeKind::OptionalMemberExpression { object, property, computed: false, optional: true },
            ));
        }

        if self.eat(TokenType::Dot)? {
            let property = self.parse_maybe_private_name()?;
            if matches!(base.kind, NodeKind::Super {}) && matches!(property.kind, NodeKind::PrivateName { .. }) {
                return Err(self.raise(property.start, &messages::SUPER_PRIVATE_ACCESS, &[]));
            }
            return Ok(self.finish_member(start, base, property, false, chain));
        }

        if self.eat(TokenType::BracketL)? {
            let property = self.parse_expression()?;
            self.expect(TokenType::BracketR)?;
            return Ok(self.finish_member(start, base, property, true, chain));
        }

        if !no_calls && self.is(TokenType::ParenL) {
            let outer = self.enter_possible_arrow_params();
            self.next()?;
            let mut arg_errors = ExpressionErrors::default();
            let is_import = matches!(base.kind, NodeKind::Import {});
            let arguments = self.parse_call_arguments(
                TokenType::ParenR,
                maybe_async_arrow,
                is_import,
                if maybe_async_arrow { Some(&mut arg_errors) } else { None },
            )?;
            let inner = self.leave_possible_arrow_params(outer);

            if maybe_async_arrow {
                if let Some(signature) = self.parse_arrow_head()? {
                    chain.stop = true;
                    self.check_arrow_param_markers(inner)?;
                    return self.parse_arrow_expression(start, arguments, true, signature);
                }
                if let Some(pos) = arg_errors.shorthand_assign {
                    return Err(self.unexpected_at(pos));
                }
                if let Some(pos) = arg_errors.double_proto {
                    return Err(self.raise(pos, &messages::PROTO_REDEFINITION, &[]));
                }
            }
            self.carry_arrow_param_markers(inner);
            self.to_referenced_list(&arguments)?;

            if chain.optional_chain_member {
                return Ok(self.finish_node(
                    start,
                    NodeKind::OptionalCallExpression {
                        callee: Box::new(base),
                        arguments,
                        optional: false,
                        type_parameters: None,
                    },
                ));
            }
            return self.finish_call_expression(start, base, arguments);
        }

        if self.is(TokenType::BackQuote) {
            if chain.optional_chain_member {
                return Err(self.raise(start.pos, &messages::OPTIONAL_CHAIN_TEMPLATE, &[]));
            }
            let quasi = self.parse_template(true)?;
            return Ok(self.finish_node(
                start,
                NodeKind::TaggedTemplateExpression {
                    tag: Box::new(base),
                    quasi: Box::new(quasi),
                    type_parameters: None,
                },
            ));
        }

        chain.stop = true;
        Ok(base)
    }

    fn finish_member(
        &self,
        start: NodeStart,
        object: Node,
        property: Node,
        computed: bool,
        chain: &SubscriptState,
    ) -> Node {
        let (object, property) = (Box::new(object), Box::new(property));
        let kind = if chain.optional_chain_member {
            NodeKind::OptionalMemberExpression { object, property, computed, optional: false }
        } else {
            NodeKind::MemberExpression { object, property, computed }
        };
        self.finish_node(start, kind)
    }

    /// Build a call, applying the argument rules of `import(...)`.
    pub(crate) fn finish_call_expression(
        &self,
        start: NodeStart,
        callee: Node,
        arguments: Vec<Node>,
    ) -> ParseResult<Node> {
        if matches!(callee.kind, NodeKind::Import {}) {
            if arguments.len() != 1 {
                return Err(self.raise(start.pos, &messages::IMPORT_CALL_ARITY, &[]));
            }
            if let Some(arg) = arguments.first() {
                if matches!(arg.kind, NodeKind::SpreadElement { .. }) {
                    return Err(self.raise(arg.start, &messages::IMPORT_CALL_SPREAD, &[]));
                }
            }
        }
        Ok(self.finish_node(
            start,
            NodeKind::CallExpression { callee: Box::new(callee), arguments, type_parameters: None },
        ))
    }

    /// Call arguments up to `close`; the opening paren is consumed.
    pub(crate) fn parse_call_arguments(
        &mut self,
        close: TokenType,
        possible_async_arrow: bool,
        dynamic_import: bool,
        mut errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Vec<Node>> {
        let mut arguments = Vec::new();
        let mut inner_paren_start = None;
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(close)? {
                    if dynamic_import {
                        let pos = self.state().last_tok_start;
                        return Err(self.raise(pos, &messages::IMPORT_CALL_TRAILING_COMMA, &[]));
                    }
                    break;
                }
            }
            if self.is(TokenType::ParenL) && inner_paren_start.is_none() {
                inner_paren_start = Some(self.start());
            }
            if let Some(argument) = self.parse_expr_list_item(false, errors.as_deref_mut())? {
                arguments.push(argument);
            }
        }
        if possible_async_arrow && inner_paren_start.is_some() && self.should_parse_async_arrow() {
            return Err(self.unexpected());
        }
        Ok(arguments)
    }

    fn should_parse_async_arrow(&self) -> bool {
        self.is(TokenType::Arrow) || (self.is(TokenType::Colon) && self.has_type_dialect())
    }

    /// A member expression without calls, as the callee of `new`.
    pub(crate) fn parse_no_call_expr(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        let atom = self.parse_expr_atom(None)?;
        self.parse_subscripts(atom, start, true)
    }

    // ========================================================================
    // Atoms
    // ========================================================================

    pub(crate) fn parse_expr_atom(
        &mut self,
        errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        if let Some(node) = self.hook_primary_expression()? {
            return Ok(node);
        }
        let can_be_arrow = self.state().potential_arrow_at == Some(self.start());
        match self.cur() {
            TokenType::Super => self.parse_super(),
            TokenType::Import => {
                if self.lookahead()?.token_type == TokenType::Dot {
                    return self.parse_import_meta_property();
                }
                self.expect_plugin(Plugin::DynamicImport, None)?;
                let start = self.start_node();
                self.next()?;
                if !self.is(TokenType::ParenL) {
                    return Err(self.unexpected_expecting(TokenType::ParenL));
                }
                Ok(self.finish_node(start, NodeKind::Import {}))
            }
            TokenType::This => {
                let start = self.start_node();
                self.next()?;
                Ok(self.finish_node(start, NodeKind::ThisExpression {}))
            }
            TokenType::Name => self.parse_name_or_arrow(can_be_arrow),
            TokenType::Do => {
                self.expect_plugin(Plugin::DoExpressions, None)?;
                let start = self.start_node();
                self.next()?;
                let old_in_function = mem::replace(&mut self.tok.state.in_function, false);
                let old_labels = mem::take(&mut self.tok.state.labels);
                let body = self.parse_block(false)?;
                self.tok.state.in_function = old_in_function;
                self.tok.state.labels = old_labels;
                Ok(self.finish_node(start, NodeKind::DoExpression { body: Box::new(body) }))
            }
            TokenType::Regexp => {
                let (pattern, flags) = match &self.state().value {
                    TokenValue::Regex { pattern, flags } => (pattern.clone(), flags.clone()),
                    _ => Default::default(),
                };
                self.parse_literal(NodeKind::RegExpLiteral { pattern, flags }, None)
            }
            TokenType::Num => {
                let value = match self.state().value {
                    TokenValue::Num(value) => value,
                    _ => f64::NAN,
                };
                self.parse_literal(NodeKind::NumericLiteral { value }, Some(LiteralValue::Number(value)))
            }
            TokenType::BigInt => {
                let value = self.value().to_string();
                self.parse_literal(
                    NodeKind::BigIntLiteral { value: value.clone() },
                    Some(LiteralValue::String(value)),
                )
            }
            TokenType::String => {
                let value = self.value().to_string();
                self.parse_literal(
                    NodeKind::StringLiteral { value: value.clone() },
                    Some(LiteralValue::String(value)),
                )
            }
            TokenType::Null => {
                let start = self.start_node();
                self.next()?;
                Ok(self.finish_node(start, NodeKind::NullLiteral {}))
            }
            TokenType::True | TokenType::False => {
                let start = self.start_node();
                let value = self.is(TokenType::True);
                self.next()?;
                Ok(self.finish_node(start, NodeKind::BooleanLiteral { value }))
            }
            TokenType::ParenL => self.parse_paren_and_distinguish(can_be_arrow),
            TokenType::BracketL => {
                let start = self.start_node();
                self.next()?;
                let (elements, trailing_comma) =
                    self.parse_expr_list(TokenType::BracketR, true, errors)?;
                self.to_referenced_list(elements.iter().flatten())?;
                let mut node = self.finish_node(start, NodeKind::ArrayExpression { elements });
                node.extra.trailing_comma = trailing_comma;
                Ok(node)
            }
            TokenType::BraceL => self.parse_obj(false, errors),
            TokenType::Function => self.parse_function_expression(),
            TokenType::At | TokenType::Class => {
                if self.is(TokenType::At) {
                    self.parse_decorators(false)?;
                }
                let start = self.start_node();
                self.parse_class(start, false, false)
            }
            TokenType::New => self.parse_new(),
            TokenType::BackQuote => self.parse_template(false),
            TokenType::DoubleColon => {
                let start = self.start_node();
                self.next()?;
                let callee = self.parse_no_call_expr()?;
                if !matches!(callee.kind, NodeKind::MemberExpression { .. }) {
                    return Err(self.raise(callee.start, &messages::BIND_ON_OBJECT_PROPERTY, &[]));
                }
                Ok(self.finish_node(start, NodeKind::BindExpression { object: None, callee: Box::new(callee) }))
            }
            TokenType::Relational if self.is_relational("<") => {
                self.expect_one_plugin(&[Plugin::Jsx, Plugin::Flow, Plugin::Typescript], None)?;
                Err(self.unexpected())
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_super(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        let state = self.state();
        let allow_outside = self.options.allow_super_outside_method;
        if state.in_method.is_none() && !state.in_class_property && !allow_outside {
            return Err(self.raise(start.pos, &messages::SUPER_OUTSIDE_METHOD, &[]));
        }
        let in_constructor = state.in_method == Some("constructor");
        self.next()?;
        if !matches!(self.cur(), TokenType::ParenL | TokenType::BracketL | TokenType::Dot) {
            return Err(self.raise(start.pos, &messages::SUPER_WITHOUT_ACCESS, &[]));
        }
        if self.is(TokenType::ParenL) && !in_constructor && !allow_outside {
            return Err(self.raise(start.pos, &messages::SUPER_CALL_OUTSIDE_CONSTRUCTOR, &[]));
        }
        Ok(self.finish_node(start, NodeKind::Super {}))
    }

    /// An identifier, or the start of an `async function` or an arrow whose
    /// parameter list is a single name.
    fn parse_name_or_arrow(&mut self, can_be_arrow: bool) -> ParseResult<Node> {
        let start = self.start_node();
        let contains_esc = self.state().contains_esc;
        let id = self.parse_identifier(false)?;
        let is_async = !contains_esc && id.is_identifier("async");

        if is_async && self.is(TokenType::Function) && !self.can_insert_semicolon() {
            self.next()?;
            return self.parse_function(start, false, true, false);
        }
        if can_be_arrow && is_async && self.is(TokenType::Name) {
            let param = self.parse_identifier(false)?;
            self.expect(TokenType::Arrow)?;
            return self.parse_arrow_expression(start, vec![param], true, ReturnSignature::default());
        }
        if can_be_arrow && self.is(TokenType::Arrow) {
            if self.has_preceding_line_break() {
                return Err(self.raise(self.start(), &messages::NO_LINE_BREAK_BEFORE_ARROW, &[]));
            }
            self.next()?;
            return self.parse_arrow_expression(start, vec![id], false, ReturnSignature::default());
        }
        Ok(id)
    }

    /// A literal token, keeping its source text in `extra.raw`.
    pub(crate) fn parse_literal(
        &mut self,
        kind: NodeKind,
        raw_value: Option<LiteralValue>,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        let raw = self.tok.slice(self.start(), self.state().end);
        self.next()?;
        let mut node = self.finish_node(start, kind);
        node.extra.raw = Some(raw);
        node.extra.raw_value = raw_value;
        Ok(node)
    }

    fn parse_function_expression(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        self.next()?;
        if self.state().in_generator && self.is(TokenType::Dot) {
            if matches!(
                self.tok.cur_context(),
                TokContext::FunctionExpression | TokContext::FunctionStatement
            ) {
                self.tok.state.context.pop();
            }
            let meta = self.finish_node(start, NodeKind::identifier("function"));
            self.next()?;
            return self.parse_meta_property(start, meta, "sent");
        }
        self.parse_function(start, false, false, false)
    }

    fn parse_new(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        let meta = self.parse_identifier(true)?;
        if self.eat(TokenType::Dot)? {
            let node = self.parse_meta_property(start, meta, "target")?;
            let state = self.state();
            if !state.in_function && !state.in_class_property {
                let message = if self.has_plugin(Plugin::ClassProperties) {
                    &messages::NEW_TARGET_OUTSIDE_FUNCTION_OR_PROPERTY
                } else {
                    &messages::NEW_TARGET_OUTSIDE_FUNCTION
                };
                return Err(self.raise(node.start, message, &[]));
            }
            return Ok(node);
        }

        let callee = self.parse_no_call_expr()?;
        match callee.kind {
            NodeKind::Import {} => {
                return Err(self.raise(callee.start, &messages::NEW_IMPORT, &[]));
            }
            NodeKind::OptionalMemberExpression { .. } | NodeKind::OptionalCallExpression { .. } => {
                let pos = self.state().last_tok_end;
                return Err(self.raise(pos, &messages::OPTIONAL_CHAIN_NEW, &[]));
            }
            _ => {}
        }
        if self.is(TokenType::QuestionDot) {
            return Err(self.raise(self.start(), &messages::OPTIONAL_CHAIN_NEW, &[]));
        }

        let type_parameters = if self.is_relational("<") {
            self.hook_type_arguments_for_new()?.map(Box::new)
        } else {
            None
        };
        let arguments = if self.eat(TokenType::ParenL)? {
            let (arguments, _) = self.parse_expr_list(TokenType::ParenR, false, None)?;
            let arguments: Vec<Node> = arguments.into_iter().flatten().collect();
            self.to_referenced_list(&arguments)?;
            arguments
        } else {
            Vec::new()
        };
        Ok(self.finish_node(
            start,
            NodeKind::NewExpression { callee: Box::new(callee), arguments, type_parameters },
        ))
    }

    // ========================================================================
    // Meta properties
    // ========================================================================

    fn parse_meta_property(
        &mut self,
        start: NodeStart,
        meta: Node,
        property_name: &str,
    ) -> ParseResult<Node> {
        let meta_name = meta.identifier_name().unwrap_or_default().to_string();
        if meta_name == "function" && property_name == "sent" {
            if self.is_contextual("sent") {
                self.expect_plugin(Plugin::FunctionSent, None)?;
            } else if !self.has_plugin(Plugin::FunctionSent) {
                return Err(self.unexpected());
            }
        }
        let contains_esc = self.state().contains_esc;
        let property = self.parse_identifier(true)?;
        if !property.is_identifier(property_name) || contains_esc {
            return Err(self.raise(
                property.start,
                &messages::INVALID_META_PROPERTY,
                &[&meta_name, property_name],
            ));
        }
        Ok(self.finish_node(
            start,
            NodeKind::MetaProperty { meta: Box::new(meta), property: Box::new(property) },
        ))
    }

    fn parse_import_meta_property(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        let id = self.parse_identifier(true)?;
        self.expect(TokenType::Dot)?;
        if self.is_contextual("meta") {
            self.expect_plugin(Plugin::ImportMeta, None)?;
        } else if !self.has_plugin(Plugin::ImportMeta) {
            return Err(self.raise(id.start, &messages::IMPORT_CALL_NEEDS_ARGUMENT, &[]));
        }
        if !self.in_module {
            return Err(self.raise(id.start, &messages::IMPORT_META_OUTSIDE_MODULE, &[]));
        }
        self.saw_unambiguous_esm = true;
        self.parse_meta_property(start, id, "meta")
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// An identifier. `liberal` accepts keywords, as after `.` or as a
    /// property key.
    pub fn parse_identifier(&mut self, liberal: bool) -> ParseResult<Node> {
        let start = self.start_node();
        let name = self.parse_identifier_name(liberal)?;
        Ok(self.finish_node(start, NodeKind::identifier(name)))
    }

    pub(crate) fn parse_identifier_name(&mut self, liberal: bool) -> ParseResult<String> {
        let pos = self.start();
        let token = self.cur();
        let name = if token == TokenType::Name {
            self.value().to_string()
        } else if let Some(keyword) = token.keyword() {
            // `class` and `function` opened a context the tokenizer will
            // never see closed.
            if matches!(keyword, "class" | "function") && !self.prev_token_is_dot() {
                self.tok.state.context.pop();
            }
            keyword.to_string()
        } else {
            return Err(self.unexpected());
        };

        if !liberal {
            self.check_reserved_word(&name, pos, token.is_keyword(), false)?;
            if name == "await" && self.state().in_async {
                return Err(self.raise(pos, &messages::AWAIT_AS_IDENTIFIER, &[]));
            }
        }
        self.next()?;
        Ok(name)
    }

    fn prev_token_is_dot(&self) -> bool {
        let state = self.state();
        let (start, end) = (state.last_tok_start, state.last_tok_end);
        match end.saturating_sub(start) {
            1 => self.tok.char_at(start) == Some('.'),
            2 => self.tok.char_at(start) == Some('?') && self.tok.char_at(start + 1) == Some('.'),
            _ => false,
        }
    }

    /// Reject `word` where an identifier reference or binding is expected.
    pub(crate) fn check_reserved_word(
        &self,
        word: &str,
        pos: TextPos,
        check_keywords: bool,
        is_binding: bool,
    ) -> ParseResult<()> {
        use ecma_scanner::identifier::{
            is_keyword, is_reserved_word, is_strict_bind_only_reserved_word, is_strict_reserved_word,
        };
        let state = self.state();
        if state.strict
            && ((is_strict_reserved_word(word, state.in_module)
                && !is_reserved_word(word, state.in_module))
                || (is_binding && is_strict_bind_only_reserved_word(word)))
        {
            return Err(self.raise(pos, &messages::RESERVED_WORD_STRICT, &[word]));
        }
        if state.in_generator && word == "yield" {
            return Err(self.raise(pos, &messages::YIELD_AS_IDENTIFIER, &[]));
        }
        if is_reserved_word(word, state.in_module) || (check_keywords && is_keyword(word)) {
            return Err(self.raise(pos, &messages::RESERVED_WORD, &[word]));
        }
        Ok(())
    }

    /// A property name after `.`, which may be a `#private` name in a class.
    pub(crate) fn parse_maybe_private_name(&mut self) -> ParseResult<Node> {
        if !self.is(TokenType::Hash) {
            return self.parse_identifier(true);
        }
        self.expect_one_plugin(
            &[Plugin::ClassPrivateProperties, Plugin::ClassPrivateMethods],
            None,
        )?;
        let start = self.start_node();
        self.next()?;
        let id = self.parse_identifier(true)?;
        Ok(self.finish_node(start, NodeKind::PrivateName { id: Box::new(id) }))
    }

    // ========================================================================
    // Parentheses and arrows
    // ========================================================================

    pub(crate) fn enter_possible_arrow_params(&mut self) -> ArrowParamMarkers {
        let state = &mut self.tok.state;
        ArrowParamMarkers {
            maybe_in_arrow_parameters: mem::replace(&mut state.maybe_in_arrow_parameters, true),
            yield_at: state.yield_in_possible_arrow_parameters.take(),
            await_at: state.await_in_possible_arrow_parameters.take(),
        }
    }

    /// Restore the enclosing markers and return what the list itself saw.
    pub(crate) fn leave_possible_arrow_params(
        &mut self,
        outer: ArrowParamMarkers,
    ) -> ArrowParamMarkers {
        let state = &mut self.tok.state;
        ArrowParamMarkers {
            maybe_in_arrow_parameters: mem::replace(
                &mut state.maybe_in_arrow_parameters,
                outer.maybe_in_arrow_parameters,
            ),
            yield_at: mem::replace(&mut state.yield_in_possible_arrow_parameters, outer.yield_at),
            await_at: mem::replace(&mut state.await_in_possible_arrow_parameters, outer.await_at),
        }
    }

    /// The list was not arrow parameters after all; what it saw belongs to
    /// the enclosing list.
    pub(crate) fn carry_arrow_param_markers(&mut self, inner: ArrowParamMarkers) {
        let state = &mut self.tok.state;
        state.yield_in_possible_arrow_parameters =
            state.yield_in_possible_arrow_parameters.or(inner.yield_at);
        state.await_in_possible_arrow_parameters =
            state.await_in_possible_arrow_parameters.or(inner.await_at);
    }

    pub(crate) fn check_arrow_param_markers(&self, inner: ArrowParamMarkers) -> ParseResult<()> {
        if let Some(pos) = inner.yield_at {
            return Err(self.raise(pos, &messages::YIELD_IN_PARAMETER, &[]));
        }
        if let Some(pos) = inner.await_at {
            return Err(self.raise(pos, &messages::AWAIT_IN_PARAMETER, &[]));
        }
        Ok(())
    }

    /// A parenthesized expression, or the parameters of an arrow function.
    fn parse_paren_and_distinguish(&mut self, can_be_arrow: bool) -> ParseResult<Node> {
        let start = self.start_node();
        let can_be_arrow = can_be_arrow && !self.state().no_arrow_at.contains(&start.pos);
        self.expect(TokenType::ParenL)?;

        let outer = self.enter_possible_arrow_params();
        let inner_start = self.start_node();
        let mut items = Vec::new();
        let mut errors = ExpressionErrors { in_parens: true, ..ExpressionErrors::default() };
        let mut first = true;
        let mut spread_start = None;
        let mut optional_comma_start = None;
        while !self.is(TokenType::ParenR) {
            if first {
                first = false;
            } else {
                if !self.is(TokenType::Comma) {
                    let pos = errors.needs_arrow.unwrap_or(self.start());
                    return Err(self.raise(pos, &messages::UNEXPECTED_TOKEN_EXPECTED, &[","]));
                }
                self.next()?;
                if self.is(TokenType::ParenR) {
                    optional_comma_start = Some(self.start());
                    break;
                }
            }
            if self.is(TokenType::Ellipsis) {
                let rest_start = self.start_node();
                spread_start = Some(rest_start.pos);
                let rest = self.parse_rest()?;
                items.push(self.hook_paren_item(rest, rest_start)?);
                if self.is(TokenType::Comma) && self.lookahead()?.token_type == TokenType::ParenR {
                    return Err(self.raise(self.start(), &messages::REST_TRAILING_COMMA, &[]));
                }
                break;
            }
            items.push(self.parse_maybe_assign_with(false, Some(&mut errors), true)?);
        }
        let (inner_end, inner_end_loc) = (self.start(), self.state().start_loc);
        self.expect(TokenType::ParenR)?;
        let inner = self.leave_possible_arrow_params(outer);

        if can_be_arrow {
            if let Some(signature) = self.parse_arrow_head()? {
                for item in &items {
                    if item.is_parenthesized() {
                        return Err(self.unexpected_at(item.extra.paren_start.unwrap_or(item.start)));
                    }
                }
                self.check_arrow_param_markers(inner)?;
                return self.parse_arrow_expression(start, items, false, signature);
            }
        }
        self.carry_arrow_param_markers(inner);

        if items.is_empty() {
            return Err(self.unexpected_at(self.state().last_tok_start));
        }
        let misplaced = optional_comma_start
            .or(spread_start)
            .or(errors.shorthand_assign)
            .or(errors.needs_arrow);
        if let Some(pos) = misplaced {
            return Err(self.unexpected_at(pos));
        }
        if let Some(pos) = errors.double_proto {
            return Err(self.raise(pos, &messages::PROTO_REDEFINITION, &[]));
        }

        let mut value = if items.len() > 1 {
            self.to_referenced_list(&items)?;
            self.finish_node_at(
                inner_start,
                NodeKind::SequenceExpression { expressions: items },
                inner_end,
                inner_end_loc,
            )
        } else {
            let Some(mut item) = items.pop() else {
                return Err(self.unexpected());
            };
            let was_parenthesized = mem::replace(&mut item.extra.parenthesized, true);
            self.to_referenced_list([&item])?;
            item.extra.parenthesized = was_parenthesized;
            item
        };

        if !self.options.create_parenthesized_expressions {
            value.extra.parenthesized = true;
            value.extra.paren_start = Some(start.pos);
            return Ok(value);
        }
        Ok(self.finish_node(start, NodeKind::ParenthesizedExpression { expression: Box::new(value) }))
    }

    /// After a list that may be arrow parameters: an optional return
    /// annotation, then `=>`. Nothing is consumed unless an arrow follows.
    pub(crate) fn parse_arrow_head(&mut self) -> ParseResult<Option<ReturnSignature>> {
        let mut signature = None;
        if self.is(TokenType::Colon) {
            signature = self.hook_arrow_return_type()?;
            if signature.is_none() {
                return Ok(None);
            }
        }
        if !self.is(TokenType::Arrow) {
            return Ok(None);
        }
        if self.has_preceding_line_break() {
            return Err(self.raise(self.start(), &messages::NO_LINE_BREAK_BEFORE_ARROW, &[]));
        }
        self.next()?;
        Ok(Some(signature.unwrap_or_default()))
    }

    // ========================================================================
    // Object literals
    // ========================================================================

    /// An object literal, or with `is_pattern` an object binding pattern.
    pub(crate) fn parse_obj(
        &mut self,
        is_pattern: bool,
        mut errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        let mut properties = Vec::new();
        let mut has_proto = false;
        let mut first_rest: Option<TextPos> = None;
        let mut trailing_comma = None;
        let mut first = true;
        self.next()?;

        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                let comma = self.state().last_tok_start;
                if self.eat(TokenType::BraceR)? {
                    trailing_comma = Some(comma);
                    break;
                }
            }

            if self.is(TokenType::At) {
                self.expect_plugin(Plugin::Decorators, None)?;
                return Err(self.raise(self.start(), &messages::OBJECT_LITERAL_DECORATOR, &[]));
            }

            if self.is(TokenType::Ellipsis) {
                if !is_pattern {
                    properties.push(self.parse_spread(errors.as_deref_mut())?);
                    continue;
                }
                let rest = self.parse_rest()?;
                if let NodeKind::RestElement { argument, .. } = &rest.kind {
                    if !matches!(argument.kind, NodeKind::Identifier { .. }) {
                        return Err(self.raise(argument.start, &messages::INVALID_REST_TARGET, &[]));
                    }
                }
                if let Some(pos) = first_rest {
                    return Err(self.raise(pos, &messages::MULTIPLE_REST, &[]));
                }
                first_rest = Some(rest.start);
                properties.push(rest);
                if self.is(TokenType::Comma) && self.lookahead()?.token_type == TokenType::BraceR {
                    return Err(self.raise(self.start(), &messages::REST_TRAILING_COMMA, &[]));
                }
                if self.is(TokenType::Comma) {
                    return Err(self.raise(self.start(), &messages::REST_NOT_LAST, &[]));
                }
                continue;
            }

            let property = self.parse_object_member(is_pattern, errors.as_deref_mut())?;
            if !is_pattern {
                self.check_proto(&property, &mut has_proto, errors.as_deref_mut())?;
            }
            properties.push(property);
        }

        let kind = if is_pattern {
            NodeKind::ObjectPattern { properties, type_annotation: None }
        } else {
            NodeKind::ObjectExpression { properties }
        };
        let mut node = self.finish_node(start, kind);
        node.extra.trailing_comma = trailing_comma;
        Ok(node)
    }

    fn parse_object_member(
        &mut self,
        is_pattern: bool,
        errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        let mut is_generator = false;
        let mut is_async = false;
        if !is_pattern {
            is_generator = self.eat(TokenType::Star)?;
        }
        let contains_esc = self.state().contains_esc;

        let (key, computed) = if !is_pattern && self.is_contextual("async") {
            if is_generator {
                return Err(self.unexpected());
            }
            let async_id = self.parse_identifier(true)?;
            let is_key = matches!(
                self.cur(),
                TokenType::Colon | TokenType::ParenL | TokenType::BraceR | TokenType::Eq | TokenType::Comma
            ) || self.has_preceding_line_break();
            if is_key {
                (async_id, false)
            } else {
                is_async = true;
                is_generator = self.eat(TokenType::Star)?;
                if is_generator {
                    self.expect_plugin(Plugin::AsyncGenerators, None)?;
                }
                self.parse_property_name()?
            }
        } else {
            self.parse_property_name()?
        };

        self.parse_obj_prop_value(start, key, computed, is_generator, is_async, is_pattern, contains_esc, errors)
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_obj_prop_value(
        &mut self,
        start: NodeStart,
        key: Node,
        computed: bool,
        is_generator: bool,
        is_async: bool,
        is_pattern: bool,
        contains_esc: bool,
        errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        let type_parameters = if self.is_relational("<") && self.has_type_dialect() {
            let type_parameters = self.hook_type_parameters()?;
            if !self.is(TokenType::ParenL) {
                return Err(self.unexpected());
            }
            type_parameters
        } else {
            None
        };

        if is_async || is_generator || self.is(TokenType::ParenL) {
            if is_pattern {
                return Err(self.unexpected());
            }
            let mut function = self.parse_method(is_generator, is_async, "method", start.pos)?;
            if type_parameters.is_some() {
                function.type_parameters = type_parameters.map(Box::new);
            }
            return Ok(self.finish_node(
                start,
                NodeKind::ObjectMethod {
                    method: true,
                    kind: "method",
                    key: Box::new(key),
                    computed,
                    function,
                    decorators: Vec::new(),
                },
            ));
        }

        let accessor = !contains_esc
            && !computed
            && !is_pattern
            && (key.is_identifier("get") || key.is_identifier("set"))
            && self.starts_property_name();
        if accessor {
            let kind = if key.is_identifier("get") { "get" } else { "set" };
            let (key, computed) = self.parse_property_name()?;
            let function = self.parse_method(false, false, kind, start.pos)?;
            self.check_getter_setter_params(kind, &function, start.pos)?;
            return Ok(self.finish_node(
                start,
                NodeKind::ObjectMethod {
                    method: false,
                    kind,
                    key: Box::new(key),
                    computed,
                    function,
                    decorators: Vec::new(),
                },
            ));
        }

        if self.eat(TokenType::Colon)? {
            let value = if is_pattern {
                self.parse_maybe_default(None, None)?
            } else {
                self.parse_maybe_assign_with(false, errors, false)?
            };
            return Ok(self.finish_node(
                start,
                NodeKind::ObjectProperty {
                    method: false,
                    key: Box::new(key),
                    computed,
                    shorthand: false,
                    value: Box::new(value),
                    decorators: Vec::new(),
                },
            ));
        }

        let Some(name) = key.identifier_name().filter(|_| !computed) else {
            return Err(self.unexpected());
        };
        self.check_reserved_word(name, key.start, true, is_pattern)?;
        if name == "await" && self.state().in_async {
            return Err(self.raise(key.start, &messages::AWAIT_AS_IDENTIFIER, &[]));
        }
        let value = if is_pattern {
            self.parse_maybe_default(Some(NodeStart::of(&key)), Some(key.clone()))?
        } else if self.is(TokenType::Eq) {
            let Some(errors) = errors else {
                return Err(self.unexpected());
            };
            if errors.shorthand_assign.is_none() {
                errors.shorthand_assign = Some(self.start());
            }
            self.parse_maybe_default(Some(NodeStart::of(&key)), Some(key.clone()))?
        } else {
            key.clone()
        };
        Ok(self.finish_node(
            start,
            NodeKind::ObjectProperty {
                method: false,
                key: Box::new(key),
                computed: false,
                shorthand: true,
                value: Box::new(value),
                decorators: Vec::new(),
            },
        ))
    }

    pub(crate) fn starts_property_name(&self) -> bool {
        let token = self.cur();
        matches!(
            token,
            TokenType::Name
                | TokenType::String
                | TokenType::Num
                | TokenType::BigInt
                | TokenType::BracketL
                | TokenType::Hash
        ) || token.is_keyword()
    }

    /// A property key. Returns the key and whether it is computed.
    pub(crate) fn parse_property_name(&mut self) -> ParseResult<(Node, bool)> {
        if self.eat(TokenType::BracketL)? {
            let key = self.parse_maybe_assign()?;
            self.expect(TokenType::BracketR)?;
            return Ok((key, true));
        }
        let old_in_property_name = mem::replace(&mut self.tok.state.in_property_name, true);
        let key = if matches!(self.cur(), TokenType::Num | TokenType::String | TokenType::BigInt) {
            self.parse_expr_atom(None)
        } else {
            self.parse_maybe_private_name()
        };
        self.tok.state.in_property_name = old_in_property_name;
        Ok((key?, false))
    }

    fn check_proto(
        &self,
        property: &Node,
        has_proto: &mut bool,
        errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<()> {
        let NodeKind::ObjectProperty { key, computed: false, shorthand: false, .. } = &property.kind
        else {
            return Ok(());
        };
        let is_proto = key.is_identifier("__proto__") || key.string_value() == Some("__proto__");
        if !is_proto {
            return Ok(());
        }
        if *has_proto {
            match errors {
                Some(errors) => {
                    if errors.double_proto.is_none() {
                        errors.double_proto = Some(key.start);
                    }
                }
                None => return Err(self.raise(key.start, &messages::PROTO_REDEFINITION, &[])),
            }
        }
        *has_proto = true;
        Ok(())
    }

    // ========================================================================
    // Lists, spread and templates
    // ========================================================================

    /// Items up to `close`, which is consumed. `allow_empty` admits holes.
    /// Also returns the position of a trailing comma.
    pub(crate) fn parse_expr_list(
        &mut self,
        close: TokenType,
        allow_empty: bool,
        mut errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<(Vec<Option<Node>>, Option<TextPos>)> {
        let mut elements = Vec::new();
        let mut trailing_comma = None;
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.is(close) {
                    trailing_comma = Some(self.state().last_tok_start);
                    self.next()?;
                    break;
                }
            }
            elements.push(self.parse_expr_list_item(allow_empty, errors.as_deref_mut())?);
        }
        Ok((elements, trailing_comma))
    }

    fn parse_expr_list_item(
        &mut self,
        allow_empty: bool,
        errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Option<Node>> {
        if allow_empty && self.is(TokenType::Comma) {
            return Ok(None);
        }
        if self.is(TokenType::Ellipsis) {
            return Ok(Some(self.parse_spread(errors)?));
        }
        Ok(Some(self.parse_maybe_assign_with(false, errors, true)?))
    }

    pub(crate) fn parse_spread(
        &mut self,
        errors: Option<&mut ExpressionErrors>,
    ) -> ParseResult<Node> {
        let start = self.start_node();
        self.next()?;
        let argument = self.parse_maybe_assign_with(false, errors, false)?;
        Ok(self.finish_node(start, NodeKind::SpreadElement { argument: Box::new(argument) }))
    }

    /// A template literal; the current token is the opening backquote.
    pub(crate) fn parse_template(&mut self, is_tagged: bool) -> ParseResult<Node> {
        let start = self.start_node();
        self.next()?;
        let mut expressions = Vec::new();
        let mut quasis = vec![self.parse_template_element(is_tagged)?];
        while !self.is(TokenType::BackQuote) {
            self.expect(TokenType::DollarBraceL)?;
            expressions.push(self.parse_expression()?);
            self.expect(TokenType::BraceR)?;
            quasis.push(self.parse_template_element(is_tagged)?);
        }
        self.next()?;
        Ok(self.finish_node(start, NodeKind::TemplateLiteral { expressions, quasis }))
    }

    fn parse_template_element(&mut self, is_tagged: bool) -> ParseResult<Node> {
        let start = self.start_node();
        if !self.is(TokenType::Template) {
            return Err(self.unexpected());
        }
        let cooked = match &self.state().value {
            TokenValue::Str(cooked) => Some(cooked.clone()),
            _ => None,
        };
        if cooked.is_none() {
            if !is_tagged {
                let pos = self.state().invalid_template_escape_position.unwrap_or(start.pos);
                return Err(self.raise(pos, &messages::INVALID_TEMPLATE_ESCAPE, &[]));
            }
            self.tok.state.invalid_template_escape_position = None;
        }
        let raw = self
            .tok
            .slice(self.start(), self.state().end)
            .replace("\r\n", "\n")
            .replace('\r', "\n");
        self.next()?;
        let tail = self.is(TokenType::BackQuote);
        Ok(self.finish_node(
            start,
            NodeKind::TemplateElement { value: TemplateValue { raw, cooked }, tail },
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parse_expression;
    use ecma_ast::{Node, NodeKind};
    use ecma_scanner::Plugin;

    fn expr(source: &str) -> Node {
        parse_expression(source, ParserOptions::default()).unwrap()
    }

    fn expr_with(source: &str, plugins: &[Plugin]) -> Node {
        let options = ParserOptions::default().with_plugins(plugins.iter().copied());
        parse_expression(source, options).unwrap()
    }

    fn error(source: &str) -> String {
        parse_expression(source, ParserOptions::default()).unwrap_err().to_string()
    }

    #[test]
    fn test_precedence_climbing() {
        let node = expr("a + b * c - d");
        let NodeKind::BinaryExpression { left, operator, right } = &node.kind else {
            panic!("expected binary expression, got {}", node.type_name());
        };
        assert_eq!(*operator, "-");
        assert!(right.is_identifier("d"));
        let NodeKind::BinaryExpression { operator, right, .. } = &left.kind else {
            panic!("expected nested binary expression");
        };
        assert_eq!(*operator, "+");
        assert!(matches!(right.kind, NodeKind::BinaryExpression { operator: "*", .. }));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let node = expr("a ** b ** c");
        let NodeKind::BinaryExpression { left, right, .. } = &node.kind else {
            panic!("expected binary expression");
        };
        assert!(left.is_identifier("a"));
        assert!(matches!(right.kind, NodeKind::BinaryExpression { operator: "**", .. }));
    }

    #[test]
    fn test_unary_before_exponent_is_rejected() {
        assert!(error("-a ** 2").starts_with("Illegal expression."));
        assert!(parse_expression("(-a) ** 2", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_logical_expressions() {
        let node = expr("a || b && c");
        assert_eq!(node.type_name(), "LogicalExpression");
        let node = expr_with("a ?? b", &[Plugin::NullishCoalescingOperator]);
        assert!(matches!(node.kind, NodeKind::LogicalExpression { operator: "??", .. }));
    }

    #[test]
    fn test_nullish_requires_plugin() {
        let err = parse_expression("a ?? b", ParserOptions::default()).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["nullishCoalescingOperator".to_string()]));
    }

    #[test]
    fn test_nullish_mixed_with_logical() {
        let options = ParserOptions::default().with_plugins([Plugin::NullishCoalescingOperator]);
        let err = parse_expression("a ?? b || c", options).unwrap_err();
        assert!(err.message.starts_with("Nullish coalescing operator(??) requires parens"));
    }

    #[test]
    fn test_arrow_functions() {
        let node = expr("(a, b) => a + b");
        let NodeKind::ArrowFunctionExpression { function, expression } = &node.kind else {
            panic!("expected arrow, got {}", node.type_name());
        };
        assert_eq!(function.params.len(), 2);
        assert_eq!(*expression, Some(true));

        let node = expr("x => { return x }");
        assert!(matches!(node.kind, NodeKind::ArrowFunctionExpression { expression: Some(false), .. }));

        let node = expr("({ a, b: [c] = [] }, ...rest) => c");
        let function = node.kind.function().unwrap();
        assert_eq!(function.params[0].type_name(), "ObjectPattern");
        assert_eq!(function.params[1].type_name(), "RestElement");
    }

    #[test]
    fn test_async_arrows_and_calls() {
        let node = expr("async (a) => await a");
        let function = node.kind.function().unwrap();
        assert!(function.r#async);
        assert_eq!(node.start, 0);

        let node = expr("async x => x");
        assert!(node.kind.function().unwrap().r#async);

        let node = expr("async(a, b)");
        assert_eq!(node.type_name(), "CallExpression");
    }

    #[test]
    fn test_parenthesized_marks_extra() {
        let node = expr("(a, b)");
        assert_eq!(node.type_name(), "SequenceExpression");
        assert!(node.extra.parenthesized);
        assert_eq!(node.extra.paren_start, Some(0));
        assert_eq!((node.start, node.end), (1, 5));

        let options = ParserOptions { create_parenthesized_expressions: true, ..Default::default() };
        let node = parse_expression("(a)", options).unwrap();
        assert_eq!(node.type_name(), "ParenthesizedExpression");
    }

    #[test]
    fn test_invalid_parenthesized_lists() {
        assert_eq!(error("()"), "Unexpected token (1:1)");
        assert_eq!(error("(a, )"), "Unexpected token (1:4)");
        assert_eq!(error("(...a)"), "Unexpected token (1:1)");
        assert_eq!(error("((a)) => 1"), "Unexpected token (1:1)");
    }

    #[test]
    fn test_shorthand_default_only_in_patterns() {
        assert_eq!(error("({ a = 1 })"), "Unexpected token (1:5)");
        let node = expr("({ a = 1 } = b)");
        let NodeKind::AssignmentExpression { left, .. } = &node.kind else {
            panic!("expected assignment");
        };
        assert_eq!(left.type_name(), "ObjectPattern");
    }

    #[test]
    fn test_duplicate_proto() {
        assert!(error("({ __proto__: a, '__proto__': b })").starts_with("Redefinition of __proto__"));
        assert!(parse_expression("({ __proto__: a, __proto__: b } = c)", ParserOptions::default()).is_ok());
        assert!(parse_expression("({ __proto__, __proto__: b })", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_object_members() {
        let node = expr("({ a, get b() { return 1 }, set b(v) {}, async *c() {}, [d]: 1, 'e'() {} })");
        let NodeKind::ObjectExpression { properties } = &node.kind else {
            panic!("expected object");
        };
        let kinds: Vec<&str> = properties
            .iter()
            .map(|p| match &p.kind {
                NodeKind::ObjectMethod { kind, .. } => *kind,
                _ => p.type_name(),
            })
            .collect();
        assert_eq!(kinds, ["ObjectProperty", "get", "set", "method", "ObjectProperty", "method"]);
        assert!(error("({ get a(x) {} })").starts_with("getter must not have any formal parameters"));
        assert!(error("({ set a(...x) {} })").starts_with("setter function argument must not be a rest parameter"));
    }

    #[test]
    fn test_member_and_calls() {
        let node = expr("a.b[c](d).e`f`");
        assert_eq!(node.type_name(), "TaggedTemplateExpression");
        let node = expr("new a.b(c)");
        assert_eq!(node.type_name(), "NewExpression");
        let node = expr("new a");
        assert!(matches!(&node.kind, NodeKind::NewExpression { arguments, .. } if arguments.is_empty()));
    }

    #[test]
    fn test_optional_chaining() {
        let plugins = [Plugin::OptionalChaining];
        let node = expr_with("a?.b.c", &plugins);
        let NodeKind::OptionalMemberExpression { object, optional, .. } = &node.kind else {
            panic!("expected optional member, got {}", node.type_name());
        };
        assert!(!optional);
        assert!(matches!(object.kind, NodeKind::OptionalMemberExpression { optional: true, .. }));

        let node = expr_with("a?.(b)", &plugins);
        assert!(matches!(node.kind, NodeKind::OptionalCallExpression { optional: true, .. }));

        let options = ParserOptions::default().with_plugins(plugins);
        let err = parse_expression("new a?.b()", options.clone()).unwrap_err();
        assert!(err.message.starts_with("constructors in/after an Optional Chain"));
        let err = parse_expression("a?.b`c`", options).unwrap_err();
        assert!(err.message.starts_with("Tagged Template Literals are not allowed"));
    }

    #[test]
    fn test_templates() {
        let node = expr("`a${b}c${d}`");
        let NodeKind::TemplateLiteral { expressions, quasis } = &node.kind else {
            panic!("expected template");
        };
        assert_eq!(expressions.len(), 2);
        assert_eq!(quasis.len(), 3);
        assert!(matches!(quasis[2].kind, NodeKind::TemplateElement { tail: true, .. }));

        assert!(error("`\\u{`").starts_with("Invalid escape sequence in template"));
        let node = expr("tag`\\u{`");
        let NodeKind::TaggedTemplateExpression { quasi, .. } = &node.kind else {
            panic!("expected tagged template");
        };
        let NodeKind::TemplateLiteral { quasis, .. } = &quasi.kind else {
            panic!("expected template");
        };
        let NodeKind::TemplateElement { value, .. } = &quasis[0].kind else {
            panic!("expected element");
        };
        assert_eq!(value.cooked, None);
        assert_eq!(value.raw, "\\u{");
    }

    #[test]
    fn test_literal_extra() {
        let node = expr("0x10");
        assert!(matches!(node.kind, NodeKind::NumericLiteral { value } if value == 16.0));
        assert_eq!(node.extra.raw.as_deref(), Some("0x10"));
        let node = expr("'a'");
        assert_eq!(node.extra.raw.as_deref(), Some("'a'"));
    }

    #[test]
    fn test_invalid_assignment_targets() {
        assert!(error("a + b = c").starts_with("Invalid left-hand side in assignment expression"));
        assert!(error("++a()").starts_with("Invalid left-hand side in prefix operation"));
        assert!(error("a()++").starts_with("Invalid left-hand side in postfix operation"));
        assert!(error("({a}) = 1").starts_with("Invalid parenthesized assignment pattern"));
    }

    #[test]
    fn test_super_and_meta_properties() {
        assert!(error("super.a").starts_with("super is only allowed in object methods and classes"));
        assert!(parse_expression("({ m() { return super.a } })", ParserOptions::default()).is_ok());
        assert!(error("new.target").starts_with("new.target can only be used in functions"));
        assert!(parse_expression("function f() { return new.target }", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_dynamic_import() {
        let plugins = [Plugin::DynamicImport];
        let node = expr_with("import('a')", &plugins);
        assert!(matches!(&node.kind, NodeKind::CallExpression { callee, .. } if callee.type_name() == "Import"));
        let options = ParserOptions::default().with_plugins(plugins);
        let err = parse_expression("import('a', 'b')", options.clone()).unwrap_err();
        assert!(err.message.starts_with("import() requires exactly one argument"));
        let err = parse_expression("new import('a')", options).unwrap_err();
        assert!(err.message.starts_with("Cannot use new with import(...)"));
        let err = parse_expression("import('a')", ParserOptions::default()).unwrap_err();
        assert!(err.is_missing_plugin());
    }

    #[test]
    fn test_yield_and_await_in_arrow_params() {
        let source = "function* g() { (a = yield) => a }";
        let err = parse_expression(source, ParserOptions::default()).unwrap_err();
        assert!(err.message.starts_with("Yield expression is not allowed in formal parameters"));
        let source = "async function f() { async (a = await b) => a }";
        let err = parse_expression(source, ParserOptions::default()).unwrap_err();
        assert!(err.message.starts_with("await is not allowed in async function parameters"));
        assert!(parse_expression("function* g() { (yield) }", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_jsx_without_plugin_reports_missing_plugin() {
        let err = parse_expression("<div />", ParserOptions::default()).unwrap_err();
        assert!(err.is_missing_plugin());
        assert_eq!(err.pos, 0);
    }

    #[test]
    fn test_do_expressions() {
        let node = expr_with("do { 1 }", &[Plugin::DoExpressions]);
        assert_eq!(node.type_name(), "DoExpression");
    }

    #[test]
    fn test_function_bind() {
        let node = expr_with("a::b.c", &[Plugin::FunctionBind]);
        assert!(matches!(&node.kind, NodeKind::BindExpression { object: Some(_), .. }));
        let node = expr_with("::a.b", &[Plugin::FunctionBind]);
        assert!(matches!(&node.kind, NodeKind::BindExpression { object: None, .. }));
    }
}
