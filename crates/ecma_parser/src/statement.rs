//! Statements, blocks and programs.

use crate::dialect::StatementContext;
use crate::expression::ExpressionErrors;
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{LiteralValue, Node, NodeKind, TokenType};
use ecma_core::collections::FxHashSet;
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::{Label, LabelKind, Plugin};

/// Whether a statement starting with `token_type` is a loop.
fn is_loop(token_type: TokenType) -> bool {
    matches!(token_type, TokenType::Do | TokenType::For | TokenType::While)
}

impl Parser {
    // ========================================================================
    // Program and blocks
    // ========================================================================

    /// Parse the whole input as a `Program`.
    pub(crate) fn parse_program(&mut self) -> ParseResult<Node> {
        let start = self.start_node();
        self.tok.next_token()?;

        let interpreter = if self.is(TokenType::InterpreterDirective) {
            let node_start = self.start_node();
            let value = self.value().to_string();
            self.next()?;
            Some(Box::new(self.finish_node(node_start, NodeKind::InterpreterDirective { value })))
        } else {
            None
        };

        let (body, directives) = self.parse_block_body(TokenType::Eof, true, true)?;
        let source_type = if self.in_module { "module" } else { "script" };
        Ok(self.finish_node(
            start,
            NodeKind::Program { source_type, interpreter, body, directives: Some(directives) },
        ))
    }

    /// A `{ ... }` block. `allow_directives` is set for function bodies.
    pub(crate) fn parse_block(&mut self, allow_directives: bool) -> ParseResult<Node> {
        let start = self.start_node();
        self.expect(TokenType::BraceL)?;
        let (body, directives) = self.parse_block_body(TokenType::BraceR, allow_directives, false)?;
        Ok(self.finish_node(start, NodeKind::BlockStatement { body, directives: Some(directives) }))
    }

    /// Statements up to and including `end`, split into the directive
    /// prologue and the rest. A `"use strict"` directive switches the
    /// remainder of the body to strict mode.
    pub(crate) fn parse_block_body(
        &mut self,
        end: TokenType,
        allow_directives: bool,
        top_level: bool,
    ) -> ParseResult<(Vec<Node>, Vec<Node>)> {
        let context = if top_level { StatementContext::TOP_LEVEL } else { StatementContext::BLOCK };
        let mut body = Vec::new();
        let mut directives = Vec::new();
        let mut parsed_non_directive = !allow_directives;
        let mut old_strict = None;
        let mut octal_position: Option<TextPos> = None;

        while !self.eat(end)? {
            if !parsed_non_directive && octal_position.is_none() && self.state().contains_octal {
                octal_position = self.state().octal_position;
            }
            let stmt = self.parse_statement(context)?;
            if !parsed_non_directive {
                match self.into_directive(stmt) {
                    Ok(directive) => {
                        let is_use_strict = matches!(
                            &directive.kind,
                            NodeKind::Directive { value }
                                if matches!(&value.kind, NodeKind::DirectiveLiteral { value } if value == "use strict")
                        );
                        directives.push(directive);
                        if is_use_strict && old_strict.is_none() {
                            old_strict = Some(self.state().strict);
                            self.set_strict(true)?;
                            if let Some(pos) = octal_position {
                                return Err(self.raise(pos, &messages::OCTAL_IN_STRICT, &[]));
                            }
                        }
                        continue;
                    }
                    Err(stmt) => {
                        parsed_non_directive = true;
                        body.push(stmt);
                        continue;
                    }
                }
            }
            body.push(stmt);
        }

        if old_strict == Some(false) {
            self.set_strict(false)?;
        }
        Ok((body, directives))
    }

    /// Switch strict mode, rescanning a string or number token that was
    /// read under the old mode.
    fn set_strict(&mut self, strict: bool) -> ParseResult<()> {
        self.tok.state.strict = strict;
        if self.is(TokenType::Num) || self.is(TokenType::String) {
            self.tok.rescan_current()?;
        }
        Ok(())
    }

    /// Turn an unparenthesized string expression statement into a
    /// `Directive`, or hand the statement back.
    fn into_directive(&self, stmt: Node) -> Result<Node, Node> {
        let is_directive = matches!(
            &stmt.kind,
            NodeKind::ExpressionStatement { expression, .. }
                if matches!(expression.kind, NodeKind::StringLiteral { .. }) && !expression.is_parenthesized()
        );
        if !is_directive {
            return Err(stmt);
        }
        let NodeKind::ExpressionStatement { expression, .. } = stmt.kind else {
            return Err(stmt);
        };
        let raw = self.tok.slice(expression.start, expression.end);
        let value: String = raw.chars().skip(1).take(raw.chars().count().saturating_sub(2)).collect();

        let mut literal = self.finish_node_at(
            NodeStart::of(&expression),
            NodeKind::DirectiveLiteral { value: value.clone() },
            expression.end,
            expression.loc.end,
        );
        literal.extra.raw = Some(raw);
        literal.extra.raw_value = Some(LiteralValue::String(value));

        Ok(self.finish_node_at(
            NodeStart { pos: stmt.start, loc: stmt.loc.start },
            NodeKind::Directive { value: Box::new(literal) },
            stmt.end,
            stmt.loc.end,
        ))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn parse_statement(&mut self, context: StatementContext) -> ParseResult<Node> {
        if self.is(TokenType::At) {
            self.parse_decorators(true)?;
        }
        self.parse_statement_content(context)
    }

    fn parse_statement_content(&mut self, context: StatementContext) -> ParseResult<Node> {
        if let Some(node) = self.hook_statement_keyword(context)? {
            return Ok(node);
        }

        let start = self.start_node();
        let start_type = self.cur();
        match start_type {
            TokenType::Break => return self.parse_break_continue(start, true),
            TokenType::Continue => return self.parse_break_continue(start, false),
            TokenType::Debugger => {
                self.next()?;
                self.semicolon()?;
                return Ok(self.finish_node(start, NodeKind::DebuggerStatement {}));
            }
            TokenType::Do => return self.parse_do_while(start),
            TokenType::For => return self.parse_for(start),
            TokenType::Function => {
                // `function.sent` is an expression.
                if self.lookahead()?.token_type != TokenType::Dot {
                    if !context.declaration {
                        self.check_single_statement_function(context)?;
                    }
                    self.next()?;
                    if !context.declaration && self.is(TokenType::Star) {
                        return Err(self.raise(self.start(), &messages::GENERATOR_IN_SINGLE_STATEMENT, &[]));
                    }
                    return self.parse_function(start, true, false, false);
                }
            }
            TokenType::Class => {
                if !context.declaration {
                    return Err(self.unexpected());
                }
                return self.parse_class(start, true, false);
            }
            TokenType::If => return self.parse_if(start),
            TokenType::Return => return self.parse_return(start),
            TokenType::Switch => return self.parse_switch(start),
            TokenType::Throw => return self.parse_throw(start),
            TokenType::Try => return self.parse_try(start),
            TokenType::Const | TokenType::Var => {
                let kind = if start_type == TokenType::Const { "const" } else { "var" };
                if !context.declaration && kind != "var" {
                    return Err(self.raise(start.pos, &messages::LEXICAL_IN_SINGLE_STATEMENT, &[]));
                }
                self.next()?;
                return self.parse_var_statement(start, kind);
            }
            TokenType::While => return self.parse_while(start),
            TokenType::With => return self.parse_with(start),
            TokenType::BraceL => return self.parse_block(false),
            TokenType::Semi => {
                self.next()?;
                return Ok(self.finish_node(start, NodeKind::EmptyStatement {}));
            }
            TokenType::Import => {
                let next = self.lookahead()?.token_type;
                if next != TokenType::ParenL && next != TokenType::Dot {
                    return self.parse_module_item(start, context);
                }
            }
            TokenType::Export => return self.parse_module_item(start, context),
            TokenType::Name => {
                if self.is_let_declaration()? {
                    if !context.declaration {
                        return Err(self.raise(start.pos, &messages::LEXICAL_IN_SINGLE_STATEMENT, &[]));
                    }
                    self.next()?;
                    return self.parse_var_statement(start, "let");
                }
                if self.is_async_function()? {
                    if !context.declaration {
                        return Err(self.unexpected());
                    }
                    self.next()?;
                    self.next()?;
                    return self.parse_function(start, true, true, false);
                }
            }
            _ => {}
        }

        let expr = self.parse_expression()?;
        if start_type == TokenType::Name && matches!(expr.kind, NodeKind::Identifier { .. }) && self.eat(TokenType::Colon)? {
            return self.parse_labeled_statement(start, expr);
        }
        self.parse_expression_statement(start, expr)
    }

    fn check_single_statement_function(&self, context: StatementContext) -> ParseResult<()> {
        if self.state().strict {
            Err(self.raise(self.start(), &messages::FUNCTION_IN_SINGLE_STATEMENT, &[]))
        } else if !context.sloppy_function {
            Err(self.raise(self.start(), &messages::FUNCTION_IN_SLOPPY_SINGLE_STATEMENT, &[]))
        } else {
            Ok(())
        }
    }

    /// `let` starts a declaration when a binding follows it.
    pub(crate) fn is_let_declaration(&mut self) -> ParseResult<bool> {
        if !self.is_contextual("let") {
            return Ok(false);
        }
        let next = self.lookahead()?;
        Ok(matches!(next.token_type, TokenType::Name | TokenType::BracketL | TokenType::BraceL))
    }

    /// `async function` with no line break in between.
    pub(crate) fn is_async_function(&mut self) -> ParseResult<bool> {
        if !self.is_contextual("async") {
            return Ok(false);
        }
        let next = self.lookahead()?;
        Ok(next.token_type == TokenType::Function
            && !self.tok.has_line_break_between(self.state().end, next.start))
    }

    pub(crate) fn parse_expression_statement(&mut self, start: NodeStart, expr: Node) -> ParseResult<Node> {
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::ExpressionStatement { expression: Box::new(expr), directive: None },
        ))
    }

    fn parse_paren_expression(&mut self) -> ParseResult<Node> {
        self.expect(TokenType::ParenL)?;
        let expr = self.parse_expression()?;
        self.expect(TokenType::ParenR)?;
        Ok(expr)
    }

    fn parse_break_continue(&mut self, start: NodeStart, is_break: bool) -> ParseResult<Node> {
        self.next()?;
        let label = if self.is_line_terminator()? {
            None
        } else if !self.is(TokenType::Name) {
            return Err(self.unexpected());
        } else {
            let label = self.parse_identifier(false)?;
            self.semicolon()?;
            Some(label)
        };

        let name = label.as_ref().and_then(|label| label.identifier_name());
        let found = self.state().labels.iter().any(|lab| {
            if name.is_some() && lab.name.as_deref() != name {
                return false;
            }
            match lab.kind {
                Some(kind) => is_break || kind == LabelKind::Loop,
                None => name.is_some() && is_break,
            }
        });
        let keyword = if is_break { "break" } else { "continue" };
        if !found {
            return Err(self.raise(start.pos, &messages::ILLEGAL_BREAK_CONTINUE, &[keyword]));
        }

        let label = label.map(Box::new);
        let kind = if is_break {
            NodeKind::BreakStatement { label }
        } else {
            NodeKind::ContinueStatement { label }
        };
        Ok(self.finish_node(start, kind))
    }

    /// Parse a loop body with an unnamed loop label in scope.
    fn parse_loop_body(&mut self, statement_start: TextPos) -> ParseResult<Node> {
        self.push_label(Label { name: None, kind: Some(LabelKind::Loop), statement_start });
        let body = self.parse_statement(StatementContext::BODY);
        self.pop_label();
        body
    }

    fn parse_do_while(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.next()?;
        let body = self.parse_loop_body(start.pos)?;
        self.expect(TokenType::While)?;
        let test = self.parse_paren_expression()?;
        self.eat(TokenType::Semi)?;
        Ok(self.finish_node(
            start,
            NodeKind::DoWhileStatement { body: Box::new(body), test: Box::new(test) },
        ))
    }

    fn parse_while(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let body = self.parse_loop_body(start.pos)?;
        Ok(self.finish_node(
            start,
            NodeKind::WhileStatement { test: Box::new(test), body: Box::new(body) },
        ))
    }

    // ========================================================================
    // for, for-in, for-of
    // ========================================================================

    fn parse_for(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.next()?;
        let state = self.state();
        let await_allowed = state.in_async
            || (!state.in_function && self.options.allow_await_outside_function);
        let await_at = if await_allowed && self.eat_contextual("await")? {
            Some(self.state().last_tok_start)
        } else {
            None
        };
        self.expect(TokenType::ParenL)?;

        if self.is(TokenType::Semi) {
            if let Some(pos) = await_at {
                return Err(self.unexpected_at(pos));
            }
            return self.parse_for_rest(start, None);
        }

        let is_let = self.is_let_declaration()?;
        if self.is(TokenType::Var) || self.is(TokenType::Const) || is_let {
            let init_start = self.start_node();
            let kind = if is_let {
                "let"
            } else if self.is(TokenType::Const) {
                "const"
            } else {
                "var"
            };
            self.next()?;
            let declarations = self.parse_var(true, kind, false)?;
            let init = self.finish_node(
                init_start,
                NodeKind::VariableDeclaration { kind, declarations, declare: false },
            );

            let is_for_of = self.is_contextual("of");
            if self.is(TokenType::In) || is_for_of {
                if let NodeKind::VariableDeclaration { declarations, .. } = &init.kind {
                    if declarations.len() == 1 {
                        self.check_for_in_of_declarator(&declarations[0], kind, is_for_of)?;
                        return self.parse_for_in(start, init, await_at);
                    }
                }
            }
            if let Some(pos) = await_at {
                return Err(self.unexpected_at(pos));
            }
            return self.parse_for_rest(start, Some(init));
        }

        if await_at.is_none() && self.is_contextual("async") && self.is_lookahead_contextual("of")? {
            self.check_for_of_async()?;
        }
        let mut errors = ExpressionErrors::default();
        let init = self.parse_expression_with(true, Some(&mut errors))?;
        let is_for_of = self.is_contextual("of");
        if self.is(TokenType::In) || is_for_of {
            let description = if is_for_of { "for-of statement" } else { "for-in statement" };
            let init = self.to_assignable(init, false, description)?;
            self.check_lval(&init, false, None, description)?;
            return self.parse_for_in(start, init, await_at);
        }
        if let Some(pos) = errors.shorthand_assign {
            return Err(self.unexpected_at(pos));
        }
        if let Some(pos) = errors.double_proto {
            return Err(self.raise(pos, &messages::PROTO_REDEFINITION, &[]));
        }
        if let Some(pos) = await_at {
            return Err(self.unexpected_at(pos));
        }
        self.parse_for_rest(start, Some(init))
    }

    /// `for (async of x)` is ambiguous with an async arrow and rejected;
    /// `for (async of => x; ;)` is an ordinary loop.
    fn check_for_of_async(&mut self) -> ParseResult<()> {
        let snapshot = self.tok.state.clone();
        let pos = self.start();
        self.next()?;
        let is_arrow = self.lookahead()?.token_type == TokenType::Arrow;
        self.tok.state = snapshot;
        if is_arrow {
            Ok(())
        } else {
            Err(self.raise(pos, &messages::FOR_OF_ASYNC, &[]))
        }
    }

    /// Only a sloppy-mode `for (var x = 0 in y)` keeps its initializer.
    fn check_for_in_of_declarator(&self, declarator: &Node, kind: &str, is_for_of: bool) -> ParseResult<()> {
        let NodeKind::VariableDeclarator { id, init: Some(init), .. } = &declarator.kind else {
            return Ok(());
        };
        let allowed = !is_for_of
            && !self.state().strict
            && kind == "var"
            && matches!(id.kind, NodeKind::Identifier { .. });
        if allowed {
            return Ok(());
        }
        let loop_kind = if is_for_of { "for-of" } else { "for-in" };
        Err(self.raise(init.start, &messages::FOR_IN_OF_INITIALIZER, &[loop_kind]))
    }

    fn parse_for_rest(&mut self, start: NodeStart, init: Option<Node>) -> ParseResult<Node> {
        self.expect(TokenType::Semi)?;
        let test = if self.is(TokenType::Semi) { None } else { Some(self.parse_expression()?) };
        self.expect(TokenType::Semi)?;
        let update = if self.is(TokenType::ParenR) { None } else { Some(self.parse_expression()?) };
        self.expect(TokenType::ParenR)?;
        let body = self.parse_loop_body(start.pos)?;
        Ok(self.finish_node(
            start,
            NodeKind::ForStatement {
                init: init.map(Box::new),
                test: test.map(Box::new),
                update: update.map(Box::new),
                body: Box::new(body),
            },
        ))
    }

    fn parse_for_in(&mut self, start: NodeStart, left: Node, await_at: Option<TextPos>) -> ParseResult<Node> {
        let is_for_in = self.is(TokenType::In);
        self.next()?;
        if is_for_in {
            if let Some(pos) = await_at {
                return Err(self.unexpected_at(pos));
            }
        }
        let right = if is_for_in { self.parse_expression()? } else { self.parse_maybe_assign()? };
        self.expect(TokenType::ParenR)?;
        let body = self.parse_loop_body(start.pos)?;

        let (left, right, body) = (Box::new(left), Box::new(right), Box::new(body));
        let kind = if is_for_in {
            NodeKind::ForInStatement { left, right, body }
        } else {
            NodeKind::ForOfStatement { r#await: await_at.is_some(), left, right, body }
        };
        Ok(self.finish_node(start, kind))
    }

    // ========================================================================
    // Variable declarations
    // ========================================================================

    /// `var`/`let`/`const` declarations after the keyword, through the
    /// terminating semicolon.
    pub(crate) fn parse_var_statement(&mut self, start: NodeStart, kind: &'static str) -> ParseResult<Node> {
        let declarations = self.parse_var(false, kind, false)?;
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::VariableDeclaration { kind, declarations, declare: false },
        ))
    }

    /// A comma-separated declarator list. `is_for` relaxes the initializer
    /// rules for a `for` head; `ambient` lets a `const` go uninitialized in a
    /// TypeScript `declare` context.
    pub(crate) fn parse_var(&mut self, is_for: bool, kind: &'static str, ambient: bool) -> ParseResult<Vec<Node>> {
        let mut declarations = Vec::new();
        loop {
            let start = self.start_node();
            let mut id = self.parse_binding_atom()?;
            let context = if is_for { "for-in statement" } else { "variable declaration" };
            self.check_lval(&id, true, None, context)?;
            if kind != "var" && id.is_identifier("let") {
                return Err(self.raise(id.start, &messages::LET_IN_LEXICAL_BINDING, &[]));
            }

            let mut definite = false;
            self.hook_var_declarator_id(&mut id, &mut definite)?;

            let init = if self.eat(TokenType::Eq)? {
                Some(Box::new(self.parse_maybe_assign_with(is_for, None, false)?))
            } else {
                let for_head = is_for && (self.is(TokenType::In) || self.is_contextual("of"));
                if kind == "const" && !for_head && !ambient {
                    return Err(self.raise(self.state().last_tok_end, &messages::CONST_WITHOUT_INITIALIZER, &["const"]));
                }
                if !matches!(id.kind, NodeKind::Identifier { .. }) && !for_head {
                    return Err(self.raise(self.state().last_tok_end, &messages::PATTERN_WITHOUT_INITIALIZER, &[]));
                }
                None
            };

            declarations.push(self.finish_node(
                start,
                NodeKind::VariableDeclarator { id: Box::new(id), init, definite },
            ));
            if !self.eat(TokenType::Comma)? {
                break;
            }
        }
        Ok(declarations)
    }

    // ========================================================================
    // Other statements
    // ========================================================================

    fn parse_if(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_statement(StatementContext::IF_OR_LABEL)?;
        let alternate = if self.eat(TokenType::Else)? {
            Some(Box::new(self.parse_statement(StatementContext::IF_OR_LABEL)?))
        } else {
            None
        };
        Ok(self.finish_node(
            start,
            NodeKind::IfStatement { test: Box::new(test), consequent: Box::new(consequent), alternate },
        ))
    }

    fn parse_return(&mut self, start: NodeStart) -> ParseResult<Node> {
        if !self.state().in_function && !self.options.allow_return_outside_function {
            return Err(self.raise(start.pos, &messages::ILLEGAL_RETURN, &[]));
        }
        self.next()?;
        let argument = if self.is_line_terminator()? {
            None
        } else {
            let argument = self.parse_expression()?;
            self.semicolon()?;
            Some(Box::new(argument))
        };
        Ok(self.finish_node(start, NodeKind::ReturnStatement { argument }))
    }

    fn parse_switch(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.next()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(TokenType::BraceL)?;
        self.push_label(Label { name: None, kind: Some(LabelKind::Switch), statement_start: start.pos });
        let cases = self.parse_switch_cases();
        self.pop_label();
        let cases = cases?;
        Ok(self.finish_node(
            start,
            NodeKind::SwitchStatement { discriminant: Box::new(discriminant), cases },
        ))
    }

    fn parse_switch_cases(&mut self) -> ParseResult<Vec<Node>> {
        let mut cases = Vec::new();
        let mut current: Option<(NodeStart, Option<Box<Node>>, Vec<Node>)> = None;
        let mut saw_default = false;

        while !self.is(TokenType::BraceR) {
            if self.is(TokenType::Case) || self.is(TokenType::Default) {
                let is_case = self.is(TokenType::Case);
                if let Some((case_start, test, consequent)) = current.take() {
                    cases.push(self.finish_node(case_start, NodeKind::SwitchCase { test, consequent }));
                }
                let case_start = self.start_node();
                self.next()?;
                let test = if is_case {
                    Some(Box::new(self.parse_expression()?))
                } else {
                    if saw_default {
                        return Err(self.raise(self.state().last_tok_start, &messages::MULTIPLE_DEFAULTS, &[]));
                    }
                    saw_default = true;
                    None
                };
                self.expect(TokenType::Colon)?;
                current = Some((case_start, test, Vec::new()));
            } else {
                let Some((_, _, consequent)) = current.as_mut() else {
                    return Err(self.unexpected());
                };
                let stmt = self.parse_statement(StatementContext::BLOCK)?;
                consequent.push(stmt);
            }
        }
        if let Some((case_start, test, consequent)) = current {
            cases.push(self.finish_node(case_start, NodeKind::SwitchCase { test, consequent }));
        }
        self.next()?;
        Ok(cases)
    }

    fn parse_throw(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.next()?;
        let last_end = self.state().last_tok_end;
        if self.tok.has_line_break_between(last_end, self.start()) {
            return Err(self.raise(last_end, &messages::NEWLINE_AFTER_THROW, &[]));
        }
        let argument = self.parse_expression()?;
        self.semicolon()?;
        Ok(self.finish_node(start, NodeKind::ThrowStatement { argument: Box::new(argument) }))
    }

    fn parse_try(&mut self, start: NodeStart) -> ParseResult<Node> {
        self.next()?;
        let block = self.parse_block(false)?;

        let handler = if self.is(TokenType::Catch) {
            let clause_start = self.start_node();
            self.next()?;
            let param = if self.eat(TokenType::ParenL)? {
                let mut param = self.parse_binding_atom()?;
                let mut clashes = FxHashSet::default();
                self.check_lval(&param, true, Some(&mut clashes), "catch clause")?;
                self.hook_binding_annotation(&mut param)?;
                self.expect(TokenType::ParenR)?;
                Some(Box::new(param))
            } else {
                self.expect_plugin(Plugin::OptionalCatchBinding, None)?;
                None
            };
            let body = self.parse_block(false)?;
            Some(Box::new(self.finish_node(clause_start, NodeKind::CatchClause { param, body: Box::new(body) })))
        } else {
            None
        };

        let finalizer = if self.eat(TokenType::Finally)? {
            Some(Box::new(self.parse_block(false)?))
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.raise(start.pos, &messages::MISSING_CATCH_OR_FINALLY, &[]));
        }
        Ok(self.finish_node(start, NodeKind::TryStatement { block: Box::new(block), handler, finalizer }))
    }

    fn parse_with(&mut self, start: NodeStart) -> ParseResult<Node> {
        if self.state().strict {
            return Err(self.raise(start.pos, &messages::STRICT_WITH, &[]));
        }
        self.next()?;
        let object = self.parse_paren_expression()?;
        let body = self.parse_statement(StatementContext::BODY)?;
        Ok(self.finish_node(start, NodeKind::WithStatement { object: Box::new(object), body: Box::new(body) }))
    }

    fn parse_labeled_statement(&mut self, start: NodeStart, label: Node) -> ParseResult<Node> {
        let name = label.identifier_name().unwrap_or_default().to_string();
        if self.state().labels.iter().any(|lab| lab.name.as_deref() == Some(name.as_str())) {
            return Err(self.raise(label.start, &messages::LABEL_REDECLARATION, &[&name]));
        }

        let kind = if is_loop(self.cur()) {
            Some(LabelKind::Loop)
        } else if self.is(TokenType::Switch) {
            Some(LabelKind::Switch)
        } else {
            None
        };
        // Labels stacked on the same statement all target it.
        let body_start = self.start();
        for lab in self.tok.state.labels.iter_mut().rev() {
            if lab.statement_start != start.pos {
                break;
            }
            lab.statement_start = body_start;
            lab.kind = kind;
        }
        self.push_label(Label { name: Some(name), kind, statement_start: body_start });
        let body = self.parse_statement(StatementContext::IF_OR_LABEL);
        self.pop_label();
        let body = body?;

        Ok(self.finish_node(
            start,
            NodeKind::LabeledStatement { body: Box::new(body), label: Box::new(label) },
        ))
    }

}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parse;
    use ecma_ast::{Node, NodeKind, SourceType};
    use ecma_scanner::Plugin;

    fn program(source: &str) -> Node {
        program_with(source, ParserOptions::default())
    }

    fn program_with(source: &str, options: ParserOptions) -> Node {
        let file = parse(source, options).unwrap();
        let NodeKind::File { program, .. } = file.kind else {
            panic!("expected a file");
        };
        *program
    }

    fn body(source: &str) -> Vec<Node> {
        let NodeKind::Program { body, .. } = program(source).kind else {
            panic!("expected a program");
        };
        body
    }

    fn error(source: &str) -> String {
        parse(source, ParserOptions::default()).unwrap_err().to_string()
    }

    fn module_error(source: &str) -> String {
        let options = ParserOptions::default().with_source_type(SourceType::Module);
        parse(source, options).unwrap_err().to_string()
    }

    #[test]
    fn test_directives() {
        let NodeKind::Program { body, directives: Some(directives), .. } = program("'use strict'; \"other\"\nfoo;").kind else {
            panic!();
        };
        assert_eq!(directives.len(), 2);
        assert_eq!(body.len(), 1);
        let NodeKind::Directive { value } = &directives[0].kind else {
            panic!();
        };
        assert!(matches!(&value.kind, NodeKind::DirectiveLiteral { value } if value == "use strict"));
        assert_eq!(value.extra.raw.as_deref(), Some("'use strict'"));
    }

    #[test]
    fn test_parenthesized_string_is_not_a_directive() {
        let NodeKind::Program { body, directives: Some(directives), .. } = program("('use strict'); with (a) {}").kind else {
            panic!();
        };
        assert!(directives.is_empty());
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_use_strict_applies_to_rest_of_body() {
        assert_eq!(error("'use strict'; with (a) {}"), "'with' in strict mode (1:14)");
        assert!(parse("function f() { 'use strict'; } with (a) {}", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_octal_before_use_strict() {
        assert_eq!(error("function f() { '\\01'; 'use strict'; }"), "Octal literal in strict mode (1:17)");
    }

    #[test]
    fn test_variable_declarations() {
        let stmts = body("var a = 1, b; let [c] = d; const {e} = f;");
        let kinds: Vec<_> = stmts
            .iter()
            .map(|s| match &s.kind {
                NodeKind::VariableDeclaration { kind, declarations, .. } => (*kind, declarations.len()),
                _ => panic!("unexpected {}", s.type_name()),
            })
            .collect();
        assert_eq!(kinds, vec![("var", 2), ("let", 1), ("const", 1)]);
        assert_eq!(stmts[0].end, 13);
    }

    #[test]
    fn test_declaration_initializers() {
        assert_eq!(error("const a;"), "Missing initializer in const declaration (1:7)");
        assert_eq!(error("var [a];"), "Complex binding patterns require an initialization value (1:6)");
        assert_eq!(
            error("let let = 1;"),
            "'let' is not allowed to be used as a name in 'let' or 'const' declarations. (1:4)"
        );
    }

    #[test]
    fn test_let_as_identifier() {
        let stmts = body("let = 1; let\n(a);");
        assert!(matches!(stmts[0].kind, NodeKind::ExpressionStatement { .. }));
        assert!(matches!(stmts[1].kind, NodeKind::ExpressionStatement { .. }));
    }

    #[test]
    fn test_for_loops() {
        let stmts = body("for (;;) {} for (var i = 0; i < n; i++); for (x in y); for (const [k, v] of m);");
        let types: Vec<_> = stmts.iter().map(|s| s.type_name()).collect();
        assert_eq!(types, vec!["ForStatement", "ForStatement", "ForInStatement", "ForOfStatement"]);
    }

    #[test]
    fn test_for_in_of_initializers() {
        assert!(parse("for (var a = 1 in b);", ParserOptions::default()).is_ok());
        assert_eq!(error("for (let a = 1 of b);"), "for-of loop variable declaration may not have an initializer. (1:13)");
        assert_eq!(error("for (async of x);"), "The left-hand side of a for-of loop may not be 'async'. (1:5)");
        assert_eq!(error("for ((a + b) in c);"), "Invalid left-hand side in for-in statement (1:6)");
    }

    #[test]
    fn test_for_await() {
        let stmts = body("async function f() { for await (const x of y); }");
        let NodeKind::FunctionDeclaration { function } = &stmts[0].kind else {
            panic!();
        };
        let Some(block) = &function.body else { panic!() };
        let NodeKind::BlockStatement { body, .. } = &block.kind else { panic!() };
        assert!(matches!(body[0].kind, NodeKind::ForOfStatement { r#await: true, .. }));
        assert!(parse("async function f() { for await (x in y); }", ParserOptions::default()).is_err());
    }

    #[test]
    fn test_labels_and_jumps() {
        assert!(parse("a: for (;;) { continue a; } b: { break b; }", ParserOptions::default()).is_ok());
        assert_eq!(error("a: { continue a; }"), "Unsyntactic continue (1:5)");
        assert_eq!(error("break;"), "Unsyntactic break (1:0)");
        assert_eq!(error("a: a: ;"), "Label 'a' is already declared (1:3)");
        assert!(parse("a: b: while (1) continue a;", ParserOptions::default()).is_ok());
        assert!(parse("switch (x) { case 1: break; }", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_switch() {
        let stmts = body("switch (x) { case 1: a; b; default: c }");
        let NodeKind::SwitchStatement { cases, .. } = &stmts[0].kind else {
            panic!();
        };
        assert_eq!(cases.len(), 2);
        assert!(matches!(&cases[0].kind, NodeKind::SwitchCase { test: Some(_), consequent } if consequent.len() == 2));
        assert_eq!(error("switch (x) { default: default: }"), "Multiple default clauses (1:22)");
    }

    #[test]
    fn test_try_statements() {
        assert_eq!(error("try {}"), "Missing catch or finally clause (1:0)");
        let err = parse("try {} catch {}", ParserOptions::default()).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["optionalCatchBinding".to_string()]));
        let options = ParserOptions::default().with_plugins([Plugin::OptionalCatchBinding]);
        assert!(parse("try {} catch {} finally {}", options).is_ok());
        assert_eq!(error("try {} catch ([a, a]) {}"), "Argument name clash (1:18)");
    }

    #[test]
    fn test_throw_and_return() {
        assert_eq!(error("throw\nx;"), "Illegal newline after throw (1:5)");
        assert_eq!(error("return 1;"), "'return' outside of function (1:0)");
        let options = ParserOptions { allow_return_outside_function: true, ..ParserOptions::default() };
        assert!(parse("return 1;", options).is_ok());
    }

    #[test]
    fn test_single_statement_contexts() {
        assert_eq!(error("if (a) let x = 1;"), "Lexical declaration cannot appear in a single-statement context (1:7)");
        assert!(parse("if (a) function f() {}", ParserOptions::default()).is_ok());
        assert_eq!(
            error("while (a) function f() {}"),
            "In non-strict mode code, functions can only be declared at top level, inside a block, or as the body of an if statement (1:10)"
        );
        assert_eq!(
            error("'use strict'; if (a) function f() {}"),
            "In strict mode code, functions can only be declared at top level or inside a block (1:21)"
        );
        assert_eq!(error("if (a) class A {}"), "Unexpected token (1:7)");
        assert_eq!(
            error("if (a) function* g() {}"),
            "Generators can only be declared at the top level or inside a block (1:15)"
        );
        assert_eq!(
            error("a: function* f() {}"),
            "Generators can only be declared at the top level or inside a block (1:11)"
        );
        assert!(parse("a: function f() {}", ParserOptions::default()).is_ok());
        assert!(parse("a: { function* f() {} }", ParserOptions::default()).is_ok());
    }

    #[test]
    fn test_module_code_is_strict() {
        assert_eq!(module_error("with (a) {}"), "'with' in strict mode (1:0)");
    }

    #[test]
    fn test_interpreter_directive() {
        let NodeKind::Program { interpreter, body, .. } = program("#!/usr/bin/env node\nfoo();").kind else {
            panic!();
        };
        let interpreter = interpreter.expect("interpreter directive");
        assert!(matches!(&interpreter.kind, NodeKind::InterpreterDirective { value } if value == "/usr/bin/env node"));
        assert_eq!(body.len(), 1);
    }
}
