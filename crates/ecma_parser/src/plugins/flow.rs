//! Flow.
//!
//! Flow types share the type-mode tokenizer hook with TypeScript and are
//! parsed by the free functions below with `in_type` set. The one ambiguity
//! Flow adds to expressions is `a ? (b) : c => d`, where a parenthesized
//! consequent with a return annotation can swallow the conditional's colon.
//! [`parse_conditional`] reparses the consequent with the offending arrow
//! starts listed in `no_arrow_at` until a single reading is left.

use super::{at_type_parameters_start, try_jsx_expression, type_cast_to_parameter};
use crate::dialect::{Dialect, Hook, LvalCheck, ReturnSignature, StatementContext};
use crate::expression::ExpressionErrors;
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{Class, LiteralValue, Node, NodeKind, TokenType, TokenValue};
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::{Plugin, TokContext, Tokenizer, TokenizerHook};
use std::mem;
use tracing::trace;

pub(crate) struct Flow;

impl Dialect for Flow {
    fn plugin(&self) -> Plugin {
        Plugin::Flow
    }

    fn tokenizer_hook(&self) -> Option<&'static dyn TokenizerHook> {
        Some(&super::TYPE_TOKENS)
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn maybe_assign(&self, p: &mut Parser, no_in: bool) -> ParseResult<Option<Node>> {
        let mut jsx_error = None;
        if p.is(TokenType::JsxTagStart) {
            match try_jsx_expression(p, no_in) {
                Ok(node) => return Ok(Some(node)),
                Err(err) => jsx_error = Some(err),
            }
        }
        if jsx_error.is_none() && !p.is_relational("<") {
            return Ok(None);
        }
        match p.try_speculative(|p| parse_generic_arrow(p, no_in)) {
            Ok(arrow) => Ok(Some(arrow)),
            Err(arrow_error) => {
                trace!(pos = arrow_error.pos, "not a generic arrow");
                Err(jsx_error.unwrap_or(arrow_error))
            }
        }
    }

    fn subscript(
        &self,
        p: &mut Parser,
        base: Node,
        start: NodeStart,
        no_calls: bool,
        stop: &mut bool,
    ) -> ParseResult<Hook<Node>> {
        // A conditional consequent decided that `async (...)` is a call.
        if !no_calls
            && base.start == start.pos
            && base.is_identifier("async")
            && p.is(TokenType::ParenL)
            && p.state().no_arrow_at.contains(&start.pos)
        {
            p.next()?;
            let arguments = p.parse_call_arguments(TokenType::ParenR, false, false, None)?;
            p.to_referenced_list(&arguments)?;
            return Ok(Hook::Done(p.finish_call_expression(start, base, arguments)?));
        }
        if !p.is_relational("<") {
            return Ok(Hook::Pass(base));
        }

        if !no_calls && p.at_possible_async_arrow(&base) {
            if let Some(arrow) = p.try_parse(|p| parse_generic_async_arrow(p, start)) {
                *stop = true;
                return Ok(Hook::Done(arrow));
            }
        }
        if no_calls {
            return Ok(Hook::Pass(base));
        }

        let callee = base.clone();
        let call = p.try_parse(|p| {
            let type_arguments = Box::new(parse_type_arguments(p)?);
            if !p.eat(TokenType::ParenL)? {
                return Ok(None);
            }
            let arguments = p.parse_call_arguments(TokenType::ParenR, false, false, None)?;
            p.to_referenced_list(&arguments)?;
            let mut call = p.finish_call_expression(start, callee, arguments)?;
            if let NodeKind::CallExpression { type_parameters, .. } = &mut call.kind {
                *type_parameters = Some(type_arguments);
            }
            Ok(Some(call))
        });
        Ok(match call {
            Some(call) => Hook::Done(call),
            None => Hook::Pass(base),
        })
    }

    fn paren_item(&self, p: &mut Parser, mut expr: Node, start: NodeStart) -> ParseResult<Hook<Node>> {
        if p.is(TokenType::Question) {
            let NodeKind::Identifier { optional, .. } = &mut expr.kind else {
                return Err(p.unexpected());
            };
            *optional = true;
            p.next()?;
            p.reset_end(&mut expr);
        }
        if !p.is(TokenType::Colon) {
            return Ok(Hook::Pass(expr));
        }
        let type_annotation = parse_type_annotation(p)?;
        Ok(Hook::Done(p.finish_node(
            start,
            NodeKind::TypeCastExpression { expression: Box::new(expr), type_annotation: Box::new(type_annotation) },
        )))
    }

    fn arrow_return_type(&self, p: &mut Parser) -> ParseResult<Option<ReturnSignature>> {
        Ok(p.try_parse(|p| {
            let old_no_anon = mem::replace(&mut p.tok.state.no_anon_function_type, true);
            let signature = parse_return_signature(p);
            p.tok.state.no_anon_function_type = old_no_anon;
            let signature = signature?;
            if p.can_insert_semicolon() || !p.is(TokenType::Arrow) {
                return Ok(None);
            }
            Ok(Some(signature))
        }))
    }

    fn conditional(
        &self,
        p: &mut Parser,
        test: Node,
        start: NodeStart,
        no_in: bool,
        errors: &mut ExpressionErrors,
    ) -> ParseResult<Hook<Node>> {
        if !p.is(TokenType::Question) {
            return Ok(Hook::Pass(test));
        }
        if !errors.in_parens {
            return Ok(Hook::Done(parse_conditional(p, test, start, no_in)?));
        }
        // `(x?: T) => x` reads like the start of a conditional.
        let fallback = test.clone();
        match p.try_speculative(|p| parse_conditional(p, test, start, no_in)) {
            Ok(node) => Ok(Hook::Done(node)),
            Err(err) => {
                errors.needs_arrow.get_or_insert(err.pos);
                Ok(Hook::Done(fallback))
            }
        }
    }

    fn check_referenced(&self, p: &Parser, expr: &Node) -> ParseResult<()> {
        if let NodeKind::TypeCastExpression { type_annotation, .. } = &expr.kind {
            if !expr.is_parenthesized() {
                return Err(p.raise(type_annotation.start, &messages::FLOW_TYPE_CAST_UNWRAPPED, &[]));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Statements and modules
    // ------------------------------------------------------------------------

    fn statement_keyword(&self, p: &mut Parser, _context: StatementContext) -> ParseResult<Option<Node>> {
        if !p.is(TokenType::Name) || p.state().contains_esc {
            return Ok(None);
        }
        let keyword = match p.value() {
            "declare" => "declare",
            "interface" => "interface",
            "type" => "type",
            "opaque" => "opaque",
            _ => return Ok(None),
        };
        let start = p.start_node();
        let next = p.lookahead()?;
        let declaration = match keyword {
            "declare" => {
                let declarable = match next.token_type {
                    TokenType::Class | TokenType::Function | TokenType::Var | TokenType::Const | TokenType::Export => {
                        true
                    }
                    TokenType::Name => {
                        matches!(next.value.str_or_empty(), "module" | "type" | "opaque" | "interface" | "let")
                    }
                    _ => false,
                };
                if !declarable {
                    return Ok(None);
                }
                p.next()?;
                parse_declare(p, start, false)?
            }
            "interface" | "type" if next.token_type == TokenType::Name => {
                p.next()?;
                if keyword == "interface" {
                    parse_interface(p, start)?
                } else {
                    parse_type_alias(p, start)?
                }
            }
            "opaque" if next.token_type == TokenType::Name && next.value.str_or_empty() == "type" => {
                p.next()?;
                parse_opaque_type(p, start, false)?
            }
            _ => return Ok(None),
        };
        trace!(kind = declaration.type_name(), pos = start.pos, "flow declaration");
        Ok(Some(declaration))
    }

    fn export_declaration(&self, p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
        if p.is_contextual("type") {
            let declaration_start = p.start_node();
            match p.lookahead()?.token_type {
                TokenType::BraceL => {
                    p.next()?;
                    let specifiers = p.parse_export_specifiers()?;
                    let source = p.parse_export_from(false)?;
                    p.check_named_exports(start.pos, None, &specifiers, source.is_some())?;
                    return Ok(Some(p.finish_node(
                        start,
                        NodeKind::ExportNamedDeclaration {
                            declaration: None,
                            specifiers,
                            source: source.map(Box::new),
                            export_kind: Some("type"),
                        },
                    )));
                }
                TokenType::Star => {
                    p.next()?;
                    p.next()?;
                    p.expect_contextual("from")?;
                    let source = p.parse_module_source()?;
                    p.semicolon()?;
                    return Ok(Some(p.finish_node(
                        start,
                        NodeKind::ExportAllDeclaration { source: Box::new(source), export_kind: Some("type") },
                    )));
                }
                TokenType::Name => {
                    p.next()?;
                    let alias = parse_type_alias(p, declaration_start)?;
                    return export_type_declaration(p, start, alias).map(Some);
                }
                _ => return Ok(None),
            }
        }
        if p.is_contextual("opaque") && p.is_lookahead_contextual("type")? {
            let declaration_start = p.start_node();
            p.next()?;
            let opaque = parse_opaque_type(p, declaration_start, false)?;
            return export_type_declaration(p, start, opaque).map(Some);
        }
        if p.is_contextual("interface") && p.lookahead()?.token_type == TokenType::Name {
            let declaration_start = p.start_node();
            p.next()?;
            let interface = parse_interface(p, declaration_start)?;
            return export_type_declaration(p, start, interface).map(Some);
        }
        Ok(None)
    }

    fn import_declaration(&self, p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
        if p.is(TokenType::String) {
            return Ok(None);
        }
        let kind = if p.is(TokenType::Typeof) {
            Some("typeof")
        } else if p.is_contextual("type") {
            Some("type")
        } else {
            None
        };
        let mut import_kind = "value";
        if let Some(kind) = kind {
            let next = p.lookahead()?;
            if kind == "type" && next.token_type == TokenType::Star {
                return Err(p.unexpected_at(next.start));
            }
            let consumes_keyword = matches!(next.token_type, TokenType::BraceL | TokenType::Star)
                || ((next.token_type == TokenType::Name || next.token_type.is_keyword())
                    && next.value.str_or_empty() != "from");
            if consumes_keyword {
                p.next()?;
                import_kind = kind;
            }
        }
        let import = p.parse_import_with_kind(start, Some(import_kind))?;
        check_import_specifiers(p, &import)?;
        Ok(Some(import))
    }

    fn import_specifier(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        let start = p.start_node();
        let first = p.parse_identifier(true)?;
        let kind = match first.identifier_name() {
            Some("type") => Some("type"),
            Some("typeof") => Some("typeof"),
            _ => None,
        };
        let at_name = |p: &Parser| p.is(TokenType::Name) || p.cur().is_keyword();

        let (imported, local, import_kind) = if p.is_contextual("as") && !p.is_lookahead_contextual("as")? {
            let as_ident = p.parse_identifier(true)?;
            if kind.is_some() && !at_name(&*p) {
                // `{ type as }` imports a type named `as`.
                (as_ident.clone(), as_ident, kind)
            } else {
                let local = p.parse_identifier(false)?;
                (first, local, None)
            }
        } else if kind.is_some() && at_name(&*p) {
            let imported = p.parse_identifier(true)?;
            let local = if p.eat_contextual("as")? { p.parse_identifier(false)? } else { imported.clone() };
            (imported, local, kind)
        } else {
            (first.clone(), first, None)
        };
        p.check_lval(&local, true, None, "import specifier")?;
        Ok(Some(p.finish_node(
            start,
            NodeKind::ImportSpecifier { imported: Box::new(imported), local: Box::new(local), import_kind },
        )))
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn after_colon(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(Some(parse_type_annotation(p)?))
    }

    fn type_parameters(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(Some(parse_type_parameters(p)?))
    }

    fn type_arguments_for_new(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        if !p.is_relational("<") {
            return Ok(None);
        }
        Ok(p.try_parse(|p| parse_type_arguments(p).map(Some)))
    }

    fn return_type(&self, p: &mut Parser) -> ParseResult<Option<ReturnSignature>> {
        Ok(Some(parse_return_signature(p)?))
    }

    // ------------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------------

    fn variance(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        parse_variance(p)
    }

    fn class_heritage(&self, p: &mut Parser, class: &mut Class) -> ParseResult<()> {
        if class.super_class.is_some() && p.is_relational("<") {
            class.super_type_parameters = Some(Box::new(parse_type_arguments(p)?));
        }
        if p.eat_contextual("implements")? {
            loop {
                let start = p.start_node();
                let id = Box::new(parse_restricted_identifier(p, true)?);
                let type_parameters = parse_optional_type_arguments(p)?;
                class.implements.push(p.finish_node(start, NodeKind::ClassImplements { id, type_parameters }));
                if !p.eat(TokenType::Comma)? {
                    break;
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Functions and bindings
    // ------------------------------------------------------------------------

    fn binding_annotation(&self, p: &mut Parser, pattern: &mut Node) -> ParseResult<()> {
        let mut changed = false;
        if p.is(TokenType::Question) {
            let NodeKind::Identifier { optional, .. } = &mut pattern.kind else {
                return Err(p.raise(pattern.start, &messages::FLOW_OPTIONAL_BINDING_PATTERN, &[]));
            };
            *optional = true;
            p.next()?;
            changed = true;
        }
        if p.is(TokenType::Colon) {
            let annotation = parse_type_annotation(p)?;
            let Some(slot) = pattern.kind.type_annotation_slot() else {
                return Err(p.unexpected_at(annotation.start));
            };
            *slot = Some(Box::new(annotation));
            changed = true;
        }
        if changed {
            p.reset_end(pattern);
        }
        Ok(())
    }

    fn to_assignable(&self, p: &mut Parser, mut node: Node, is_binding: bool) -> ParseResult<Hook<Node>> {
        match mem::replace(&mut node.kind, NodeKind::NullLiteral {}) {
            NodeKind::TypeCastExpression { expression, type_annotation } => {
                let expression = Box::new(p.to_assignable(*expression, is_binding, "parenthesized pattern")?);
                node.kind = NodeKind::TypeCastExpression { expression, type_annotation };
                Ok(Hook::Done(type_cast_to_parameter(p, node)))
            }
            kind => {
                node.kind = kind;
                Ok(Hook::Pass(node))
            }
        }
    }

    fn check_lval<'n>(&self, _p: &Parser, node: &'n Node, _is_binding: bool) -> ParseResult<LvalCheck<'n>> {
        match &node.kind {
            NodeKind::TypeCastExpression { expression, .. } => Ok(LvalCheck::Inner(expression.as_ref())),
            _ => Ok(LvalCheck::NotMine),
        }
    }

    fn var_declarator_id(&self, p: &mut Parser, id: &mut Node, _definite: &mut bool) -> ParseResult<()> {
        if p.is(TokenType::Colon) {
            let annotation = parse_type_annotation(p)?;
            if let Some(slot) = id.kind.type_annotation_slot() {
                *slot = Some(Box::new(annotation));
                p.reset_end(id);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    fn finish_node_shape(&self, node: &mut Node, _tok: &Tokenizer) {
        match &mut node.kind {
            NodeKind::ExportNamedDeclaration { export_kind, .. }
            | NodeKind::ExportAllDeclaration { export_kind, .. }
            | NodeKind::DeclareExportAllDeclaration { export_kind, .. } => {
                export_kind.get_or_insert("value");
            }
            _ => {}
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// `<T>(x: T) => x`. Anything but an unparenthesized arrow after the type
/// parameters fails with the expected-arrow error.
fn parse_generic_arrow(p: &mut Parser, no_in: bool) -> ParseResult<Node> {
    let type_parameters = parse_type_parameters(p)?;
    let forward = p.state().no_arrow_param_at.contains(&type_parameters.start);
    if forward {
        let pos = p.start();
        p.tok.state.no_arrow_param_at.push(pos);
    }
    let expr = p.base_maybe_assign(no_in, None, false);
    if forward {
        p.tok.state.no_arrow_param_at.pop();
    }
    let mut expr = expr?;
    if !matches!(expr.kind, NodeKind::ArrowFunctionExpression { .. }) || expr.extra.parenthesized {
        return Err(p.raise(type_parameters.start, &messages::FLOW_EXPECTED_ARROW, &[]));
    }
    p.reset_start(&mut expr, NodeStart::of(&type_parameters));
    if let NodeKind::ArrowFunctionExpression { function, .. } = &mut expr.kind {
        function.type_parameters = Some(Box::new(type_parameters));
    }
    Ok(expr)
}

/// `async <T>(x: T) => x`, after `async`.
fn parse_generic_async_arrow(p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
    let type_parameters = parse_type_parameters(p)?;
    p.expect(TokenType::ParenL)?;
    let old_in_parameters = mem::replace(&mut p.tok.state.in_parameters, true);
    let params = p.parse_binding_list(TokenType::ParenR, false, false);
    p.tok.state.in_parameters = old_in_parameters;
    let params: Vec<Node> = params?.into_iter().flatten().collect();
    let Some(signature) = p.parse_arrow_head()? else {
        return Ok(None);
    };
    let mut arrow = p.parse_arrow_expression(start, params, true, signature)?;
    if let NodeKind::ArrowFunctionExpression { function, .. } = &mut arrow.kind {
        function.type_parameters = Some(Box::new(type_parameters));
    }
    Ok(Some(arrow))
}

/// `test ? consequent : alternate`, at the `?`.
///
/// An arrow with a return annotation in the consequent may have eaten the
/// colon that belongs to the conditional. Arrows whose parameters cannot be
/// bindings are ruled out first; if the colon is still missing and exactly
/// one arrow remains, that arrow is reparsed as a parenthesized expression.
fn parse_conditional(p: &mut Parser, test: Node, start: NodeStart, no_in: bool) -> ParseResult<Node> {
    p.expect(TokenType::Question)?;
    let snapshot = p.tok.state.clone();
    let original_no_arrow_at = snapshot.no_arrow_at.clone();

    let (mut consequent, mut failed) = parse_consequent(p)?;
    let (mut valid, mut invalid) = (Vec::new(), Vec::new());
    collect_arrows(p, &mut consequent, false, &mut valid, &mut invalid)?;

    if failed || !invalid.is_empty() {
        let mut no_arrow_at = original_no_arrow_at.clone();
        if !invalid.is_empty() {
            no_arrow_at.append(&mut invalid);
            p.tok.state = snapshot.clone();
            p.tok.state.no_arrow_at = no_arrow_at.clone();
            (consequent, failed) = parse_consequent(p)?;
            valid.clear();
            collect_arrows(p, &mut consequent, false, &mut valid, &mut invalid)?;
        }
        if failed && valid.len() > 1 {
            return Err(p.raise(snapshot.start, &messages::FLOW_AMBIGUOUS_ARROW, &[]));
        }
        if failed && valid.len() == 1 {
            trace!(pos = valid[0], "conditional arrow reparsed as parenthesized");
            no_arrow_at.push(valid[0]);
            p.tok.state = snapshot;
            p.tok.state.no_arrow_at = no_arrow_at;
            let (reparsed, _) = parse_consequent(p)?;
            consequent = reparsed;
        }
    }
    collect_arrows(p, &mut consequent, true, &mut Vec::new(), &mut Vec::new())?;
    p.tok.state.no_arrow_at = original_no_arrow_at;
    p.expect(TokenType::Colon)?;

    let forward = p.state().no_arrow_param_at.contains(&start.pos);
    if forward {
        let pos = p.start();
        p.tok.state.no_arrow_param_at.push(pos);
    }
    let alternate = p.parse_maybe_assign_with(no_in, None, false);
    if forward {
        p.tok.state.no_arrow_param_at.pop();
    }
    let alternate = alternate?;
    Ok(p.finish_node(
        start,
        NodeKind::ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        },
    ))
}

/// The consequent, with arrow parameter conversion deferred for an arrow
/// starting right here. The flag is set when no `:` follows.
fn parse_consequent(p: &mut Parser) -> ParseResult<(Node, bool)> {
    let pos = p.start();
    p.tok.state.no_arrow_param_at.push(pos);
    let consequent = p.parse_maybe_assign();
    p.tok.state.no_arrow_param_at.pop();
    let consequent = consequent?;
    Ok((consequent, !p.is(TokenType::Colon)))
}

/// Sort the annotated arrows of a consequent into those whose parameters can
/// be bindings and those that cannot. With `settle`, every arrow gets its
/// parameters converted and checked instead.
fn collect_arrows(
    p: &mut Parser,
    node: &mut Node,
    settle: bool,
    valid: &mut Vec<TextPos>,
    invalid: &mut Vec<TextPos>,
) -> ParseResult<()> {
    if let NodeKind::ConditionalExpression { consequent, alternate, .. } = &mut node.kind {
        collect_arrows(p, consequent, settle, valid, invalid)?;
        return collect_arrows(p, alternate, settle, valid, invalid);
    }
    let NodeKind::ArrowFunctionExpression { function, .. } = &mut node.kind else {
        return Ok(());
    };
    let annotated = function.type_parameters.is_none() && function.return_type.is_some();
    let assignable = function.params.iter().all(|param| is_assignable(param, true));
    if let Some(body) = function.body.as_deref_mut() {
        collect_arrows(p, body, settle, valid, invalid)?;
    }
    if settle {
        return p.finish_arrow_validation(node);
    }
    if annotated {
        if assignable {
            valid.push(node.start);
        } else {
            invalid.push(node.start);
        }
    }
    Ok(())
}

/// Whether an expression could be converted to an assignment target.
fn is_assignable(node: &Node, is_binding: bool) -> bool {
    match &node.kind {
        NodeKind::Identifier { .. }
        | NodeKind::ObjectPattern { .. }
        | NodeKind::ArrayPattern { .. }
        | NodeKind::AssignmentPattern { .. }
        | NodeKind::RestElement { .. } => true,
        NodeKind::ObjectExpression { properties } => {
            let last = properties.len().saturating_sub(1);
            properties.iter().enumerate().all(|(i, property)| match &property.kind {
                NodeKind::ObjectMethod { .. } => false,
                NodeKind::SpreadElement { .. } if i != last => false,
                _ => is_assignable(property, is_binding),
            })
        }
        NodeKind::ObjectProperty { value, .. } => is_assignable(value, is_binding),
        NodeKind::SpreadElement { argument } => is_assignable(argument, is_binding),
        NodeKind::ArrayExpression { elements } => elements.iter().flatten().all(|e| is_assignable(e, is_binding)),
        NodeKind::AssignmentExpression { operator, .. } => *operator == "=",
        NodeKind::ParenthesizedExpression { expression } | NodeKind::TypeCastExpression { expression, .. } => {
            is_assignable(expression, is_binding)
        }
        NodeKind::MemberExpression { .. } | NodeKind::OptionalMemberExpression { .. } => !is_binding,
        _ => false,
    }
}

// ============================================================================
// Imports and exports
// ============================================================================

fn export_type_declaration(p: &mut Parser, start: NodeStart, declaration: Node) -> ParseResult<Node> {
    p.check_named_exports(start.pos, Some(&declaration), &[], false)?;
    Ok(p.finish_node(
        start,
        NodeKind::ExportNamedDeclaration {
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
            export_kind: Some("type"),
        },
    ))
}

/// Checks on import bindings that depend on the kind of the whole import.
fn check_import_specifiers(p: &Parser, import: &Node) -> ParseResult<()> {
    let NodeKind::ImportDeclaration { specifiers, import_kind, .. } = &import.kind else {
        return Ok(());
    };
    let type_import = matches!(import_kind, Some("type" | "typeof"));
    for specifier in specifiers {
        match &specifier.kind {
            NodeKind::ImportSpecifier { imported, local, import_kind: specifier_kind } => {
                let name = local.identifier_name().unwrap_or_default();
                if type_import && specifier_kind.is_some() {
                    return Err(p.raise(specifier.start, &messages::FLOW_IMPORT_TYPE_SHORTHAND, &[]));
                }
                if type_import || specifier_kind.is_some() {
                    check_reserved_type(p, name, local.start)?;
                } else if local.start == imported.start {
                    p.check_reserved_word(name, specifier.start, true, true)?;
                }
            }
            NodeKind::ImportDefaultSpecifier { local } if type_import => {
                let name = local.identifier_name().unwrap_or_default();
                if *import_kind == Some("typeof") && RESERVED_TYPES.contains(&name) {
                    return Err(p.raise(local.start, &messages::FLOW_TYPEOF_DEFAULT_IMPORT, &[]));
                }
                check_reserved_type(p, name, local.start)?;
            }
            NodeKind::ImportNamespaceSpecifier { local } if type_import => {
                check_reserved_type(p, local.identifier_name().unwrap_or_default(), local.start)?;
            }
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// Declarations
// ============================================================================

/// Names a type declaration may not take.
const RESERVED_TYPES: &[&str] = &[
    "_", "any", "bool", "boolean", "empty", "extends", "false", "interface", "mixed", "null", "number", "static",
    "string", "true", "typeof", "void",
];

fn check_reserved_type(p: &Parser, word: &str, pos: TextPos) -> ParseResult<()> {
    if RESERVED_TYPES.contains(&word) {
        return Err(p.raise(pos, &messages::FLOW_RESERVED_TYPE, &[word]));
    }
    Ok(())
}

/// An identifier that names a type.
fn parse_restricted_identifier(p: &mut Parser, liberal: bool) -> ParseResult<Node> {
    check_reserved_type(p, p.value(), p.start())?;
    p.parse_identifier(liberal)
}

/// The parts shared by interfaces and declared classes.
struct Interfaceish {
    id: Box<Node>,
    type_parameters: Option<Box<Node>>,
    extends: Vec<Node>,
    mixins: Vec<Node>,
    implements: Vec<Node>,
    body: Box<Node>,
}

fn parse_interfaceish(p: &mut Parser, is_class: bool) -> ParseResult<Interfaceish> {
    let id = Box::new(parse_restricted_identifier(p, !is_class)?);
    let type_parameters = parse_optional_type_parameters(p)?;
    let mut extends = Vec::new();
    if p.eat(TokenType::Extends)? {
        loop {
            extends.push(parse_interface_extends(p)?);
            if is_class || !p.eat(TokenType::Comma)? {
                break;
            }
        }
    }
    let mixins = if p.eat_contextual("mixins")? { parse_interface_extends_list(p)? } else { Vec::new() };
    let implements = if p.eat_contextual("implements")? { parse_interface_extends_list(p)? } else { Vec::new() };
    let body = parse_object_type(
        p,
        ObjectTypeOptions { allow_static: is_class, allow_proto: is_class, ..ObjectTypeOptions::default() },
    )?;
    Ok(Interfaceish { id, type_parameters, extends, mixins, implements, body: Box::new(body) })
}

fn parse_interface_extends_list(p: &mut Parser) -> ParseResult<Vec<Node>> {
    let mut list = vec![parse_interface_extends(p)?];
    while p.eat(TokenType::Comma)? {
        list.push(parse_interface_extends(p)?);
    }
    Ok(list)
}

fn parse_interface_extends(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let first = p.parse_identifier(false)?;
    let id = Box::new(parse_qualified_type_identifier(p, start, first)?);
    let type_parameters = parse_optional_type_arguments(p)?;
    Ok(p.finish_node(start, NodeKind::InterfaceExtends { id, type_parameters }))
}

/// `interface I { ... }`, after `interface`.
fn parse_interface(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let Interfaceish { id, type_parameters, extends, mixins, implements, body } = parse_interfaceish(p, false)?;
    Ok(p.finish_node(
        start,
        NodeKind::InterfaceDeclaration { id, type_parameters, extends, implements, mixins, body },
    ))
}

fn parse_type_alias_parts(p: &mut Parser) -> ParseResult<(Box<Node>, Option<Box<Node>>, Box<Node>)> {
    let id = Box::new(parse_restricted_identifier(p, false)?);
    let type_parameters = parse_optional_type_parameters(p)?;
    let right = Box::new(parse_type_initialiser(p, TokenType::Eq)?);
    p.semicolon()?;
    Ok((id, type_parameters, right))
}

/// `type T = ...`, after `type`.
fn parse_type_alias(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let (id, type_parameters, right) = parse_type_alias_parts(p)?;
    Ok(p.finish_node(start, NodeKind::TypeAlias { id, type_parameters, right }))
}

/// `opaque type T: Super = Impl`, after `opaque`. A declared opaque type has
/// no implementation.
fn parse_opaque_type(p: &mut Parser, start: NodeStart, declare: bool) -> ParseResult<Node> {
    p.expect_contextual("type")?;
    let id = Box::new(parse_restricted_identifier(p, true)?);
    let type_parameters = parse_optional_type_parameters(p)?;
    let supertype = if p.is(TokenType::Colon) {
        Some(Box::new(parse_type_initialiser(p, TokenType::Colon)?))
    } else {
        None
    };
    if declare {
        p.semicolon()?;
        return Ok(p.finish_node(start, NodeKind::DeclareOpaqueType { id, type_parameters, supertype }));
    }
    let impltype = Box::new(parse_type_initialiser(p, TokenType::Eq)?);
    p.semicolon()?;
    Ok(p.finish_node(start, NodeKind::OpaqueType { id, type_parameters, supertype, impltype }))
}

/// The declaration after `declare`.
fn parse_declare(p: &mut Parser, start: NodeStart, inside_module: bool) -> ParseResult<Node> {
    if p.eat(TokenType::Class)? {
        let Interfaceish { id, type_parameters, extends, mixins, implements, body } = parse_interfaceish(p, true)?;
        return Ok(p.finish_node(
            start,
            NodeKind::DeclareClass { id, type_parameters, extends, implements, mixins, body },
        ));
    }
    if p.is(TokenType::Function) {
        return parse_declare_function(p, start);
    }
    if p.is(TokenType::Var) || p.is(TokenType::Const) || p.is_contextual("let") {
        p.next()?;
        let mut id = p.parse_identifier(false)?;
        if p.is(TokenType::Colon) {
            let annotation = parse_type_annotation(p)?;
            if let NodeKind::Identifier { type_annotation, .. } = &mut id.kind {
                *type_annotation = Some(Box::new(annotation));
            }
            p.reset_end(&mut id);
        }
        p.semicolon()?;
        return Ok(p.finish_node(start, NodeKind::DeclareVariable { id: Box::new(id) }));
    }
    if p.is(TokenType::Export) {
        return parse_declare_export(p, start, inside_module);
    }
    if p.eat_contextual("module")? {
        if p.eat(TokenType::Dot)? {
            p.expect_contextual("exports")?;
            let type_annotation = Box::new(parse_type_annotation(p)?);
            p.semicolon()?;
            return Ok(p.finish_node(start, NodeKind::DeclareModuleExports { type_annotation }));
        }
        if inside_module {
            return Err(p.raise(p.state().last_tok_start, &messages::FLOW_NESTED_DECLARE_MODULE, &[]));
        }
        return parse_declare_module(p, start);
    }
    if p.eat_contextual("type")? {
        let (id, type_parameters, right) = parse_type_alias_parts(p)?;
        return Ok(p.finish_node(start, NodeKind::DeclareTypeAlias { id, type_parameters, right }));
    }
    if p.eat_contextual("opaque")? {
        return parse_opaque_type(p, start, true);
    }
    if p.eat_contextual("interface")? {
        let Interfaceish { id, type_parameters, extends, mixins, implements, body } = parse_interfaceish(p, false)?;
        return Ok(p.finish_node(
            start,
            NodeKind::DeclareInterface { id, type_parameters, extends, implements, mixins, body },
        ));
    }
    Err(p.unexpected())
}

/// `declare function f(x: T): R;`. The signature becomes a function type
/// annotation on the id.
fn parse_declare_function(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    p.next()?;
    // The `function` keyword opened a context no body will close.
    if matches!(p.tok.cur_context(), TokContext::FunctionStatement | TokContext::FunctionExpression) {
        p.tok.state.context.pop();
    }
    let mut id = p.parse_identifier(false)?;
    let signature_start = p.start_node();
    let type_parameters = parse_optional_type_parameters(p)?;
    p.expect(TokenType::ParenL)?;
    let mut params = Vec::new();
    let rest = parse_function_type_params(p, &mut params)?;
    p.expect(TokenType::ParenR)?;
    let (return_type, predicate) = parse_type_and_predicate(p)?;
    let Some(return_type) = return_type else {
        let pos = predicate.as_ref().map_or(p.start(), |predicate| predicate.start);
        return Err(p.unexpected_at(pos));
    };
    let function_type = p.finish_node(
        signature_start,
        NodeKind::FunctionTypeAnnotation { type_parameters, params, rest, return_type: Box::new(return_type) },
    );
    let (end, end_loc) = (function_type.end, function_type.loc.end);
    let annotation = p.finish_node_at(
        signature_start,
        NodeKind::TypeAnnotation { type_annotation: Box::new(function_type) },
        end,
        end_loc,
    );
    if let NodeKind::Identifier { type_annotation, .. } = &mut id.kind {
        *type_annotation = Some(Box::new(annotation));
    }
    p.reset_end(&mut id);
    p.semicolon()?;
    Ok(p.finish_node(start, NodeKind::DeclareFunction { id: Box::new(id), predicate: predicate.map(Box::new) }))
}

/// `declare module M { ... }`, after `module`. The module is ES when it
/// declares exports and CommonJS when it declares `module.exports`.
fn parse_declare_module(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let id = if p.is(TokenType::String) { p.parse_expr_atom(None)? } else { p.parse_identifier(false)? };
    let body_start = p.start_node();
    p.expect(TokenType::BraceL)?;
    let mut body = Vec::new();
    while !p.is(TokenType::BraceR) {
        let item_start = p.start_node();
        if p.eat(TokenType::Import)? {
            if !p.is_contextual("type") && !p.is(TokenType::Typeof) {
                return Err(p.raise(p.state().last_tok_start, &messages::FLOW_DECLARE_MODULE_IMPORT, &[]));
            }
            body.push(p.parse_import(item_start)?);
            continue;
        }
        if !p.eat_contextual("declare")? {
            return Err(p.raise(p.start(), &messages::FLOW_DECLARE_MODULE_STATEMENT, &[]));
        }
        body.push(parse_declare(p, item_start, true)?);
    }
    p.expect(TokenType::BraceR)?;
    let kind = declare_module_kind(p, &body)?;
    let block = p.finish_node(body_start, NodeKind::BlockStatement { body, directives: Some(Vec::new()) });
    Ok(p.finish_node(start, NodeKind::DeclareModule { id: Box::new(id), body: Box::new(block), kind }))
}

fn declare_module_kind(p: &Parser, body: &[Node]) -> ParseResult<&'static str> {
    let mut kind = None;
    let mut has_module_exports = false;
    for item in body {
        if is_es_module_item(item) {
            if kind == Some("CommonJS") {
                return Err(p.raise(item.start, &messages::FLOW_DECLARE_MODULE_MIXED, &[]));
            }
            kind = Some("ES");
        } else if matches!(item.kind, NodeKind::DeclareModuleExports { .. }) {
            if has_module_exports {
                return Err(p.raise(item.start, &messages::FLOW_DUPLICATE_MODULE_EXPORTS, &[]));
            }
            if kind == Some("ES") {
                return Err(p.raise(item.start, &messages::FLOW_DECLARE_MODULE_MIXED, &[]));
            }
            kind = Some("CommonJS");
            has_module_exports = true;
        }
    }
    Ok(kind.unwrap_or("CommonJS"))
}

/// Exported values make a declared module an ES module; exported types do
/// not.
fn is_es_module_item(item: &Node) -> bool {
    match &item.kind {
        NodeKind::DeclareExportAllDeclaration { .. } => true,
        NodeKind::DeclareExportDeclaration { declaration, .. } => declaration.as_ref().map_or(true, |declaration| {
            !matches!(declaration.kind, NodeKind::TypeAlias { .. } | NodeKind::InterfaceDeclaration { .. })
        }),
        _ => false,
    }
}

/// `declare export ...`, at `export`.
fn parse_declare_export(p: &mut Parser, start: NodeStart, inside_module: bool) -> ParseResult<Node> {
    p.expect(TokenType::Export)?;
    if p.eat(TokenType::Default)? {
        let declaration = if p.is(TokenType::Function) || p.is(TokenType::Class) {
            let inner = p.start_node();
            parse_declare(p, inner, inside_module)?
        } else {
            let ty = parse_type(p)?;
            p.semicolon()?;
            ty
        };
        return Ok(p.finish_node(
            start,
            NodeKind::DeclareExportDeclaration {
                r#default: true,
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
            },
        ));
    }

    let unsupported = p.is(TokenType::Const)
        || p.is_contextual("let")
        || ((p.is_contextual("type") || p.is_contextual("interface")) && !inside_module);
    if unsupported {
        let (label, suggestion) = match p.value() {
            "const" => ("const", "declare export var"),
            "let" => ("let", "declare export var"),
            "type" => ("type", "export type"),
            _ => ("interface", "export interface"),
        };
        return Err(p.raise(p.start(), &messages::FLOW_DECLARE_EXPORT_TYPE, &[label, suggestion]));
    }

    if p.is(TokenType::Var) || p.is(TokenType::Function) || p.is(TokenType::Class) || p.is_contextual("opaque") {
        let inner = p.start_node();
        let declaration = parse_declare(p, inner, inside_module)?;
        return Ok(p.finish_node(
            start,
            NodeKind::DeclareExportDeclaration {
                r#default: false,
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
            },
        ));
    }
    if p.is(TokenType::Star) || p.is(TokenType::BraceL) || p.is_contextual("interface") || p.is_contextual("type") {
        let mut export = p.parse_export(start)?;
        export.kind = match mem::replace(&mut export.kind, NodeKind::NullLiteral {}) {
            NodeKind::ExportNamedDeclaration { declaration, specifiers, source, .. } => {
                NodeKind::DeclareExportDeclaration { r#default: false, declaration, specifiers, source }
            }
            NodeKind::ExportAllDeclaration { source, export_kind } => {
                NodeKind::DeclareExportAllDeclaration { source, export_kind }
            }
            kind => kind,
        };
        return Ok(export);
    }
    Err(p.unexpected())
}

// ============================================================================
// Annotations and predicates
// ============================================================================

/// `: T`, at the colon.
fn parse_type_annotation(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let ty = parse_type_initialiser(p, TokenType::Colon)?;
    Ok(p.finish_node(start, NodeKind::TypeAnnotation { type_annotation: Box::new(ty) }))
}

/// `token T`: the token, then a type, all in type mode.
fn parse_type_initialiser(p: &mut Parser, token: TokenType) -> ParseResult<Node> {
    p.in_type(|p| {
        p.expect(token)?;
        parse_type(p)
    })
}

/// A return annotation with an optional `%checks` predicate. The annotation
/// ends with its type, before any predicate.
fn parse_return_signature(p: &mut Parser) -> ParseResult<ReturnSignature> {
    let start = p.start_node();
    let (ty, predicate) = parse_type_and_predicate(p)?;
    let return_type = ty.map(|ty| {
        let (end, end_loc) = (ty.end, ty.loc.end);
        p.finish_node_at(start, NodeKind::TypeAnnotation { type_annotation: Box::new(ty) }, end, end_loc)
    });
    Ok(ReturnSignature { return_type, predicate })
}

/// `: T %checks`, `: T` or `: %checks`, at the colon.
fn parse_type_and_predicate(p: &mut Parser) -> ParseResult<(Option<Node>, Option<Node>)> {
    let ty = p.in_type(|p| {
        p.expect(TokenType::Colon)?;
        if p.is(TokenType::Modulo) {
            return Ok(None);
        }
        parse_type(p).map(Some)
    })?;
    let predicate = if p.is(TokenType::Modulo) { Some(parse_predicate(p)?) } else { None };
    Ok((ty, predicate))
}

/// `%checks` or `%checks(expr)`. Nothing may separate `%` from `checks`.
fn parse_predicate(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.expect(TokenType::Modulo)?;
    let checks_loc = p.state().start_loc;
    p.expect_contextual("checks")?;
    if start.loc.line != checks_loc.line || start.loc.column + 1 != checks_loc.column {
        return Err(p.raise(start.pos, &messages::FLOW_CHECKS_SPACING, &[]));
    }
    if p.eat(TokenType::ParenL)? {
        let value = p.outside_type(|p| p.parse_expression())?;
        p.expect(TokenType::ParenR)?;
        return Ok(p.finish_node(start, NodeKind::DeclaredPredicate { value: Box::new(value) }));
    }
    Ok(p.finish_node(start, NodeKind::InferredPredicate {}))
}

fn parse_variance(p: &mut Parser) -> ParseResult<Option<Node>> {
    if !p.is(TokenType::PlusMin) {
        return Ok(None);
    }
    let start = p.start_node();
    let kind = if p.value() == "+" { "plus" } else { "minus" };
    p.next()?;
    Ok(Some(p.finish_node(start, NodeKind::Variance { kind })))
}

// ============================================================================
// Type parameters and arguments
// ============================================================================

fn parse_optional_type_parameters(p: &mut Parser) -> ParseResult<Option<Box<Node>>> {
    if !at_type_parameters_start(p) {
        return Ok(None);
    }
    Ok(Some(Box::new(parse_type_parameters(p)?)))
}

/// `<T, +U: Bound = Default>`. Once one parameter has a default, every
/// later one needs one too.
fn parse_type_parameters(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    if !at_type_parameters_start(p) {
        return Err(p.unexpected());
    }
    let params = p.in_type(|p| {
        p.next()?;
        let mut params = Vec::new();
        let mut default_required = false;
        loop {
            let param = parse_type_parameter(p, default_required)?;
            if matches!(param.kind, NodeKind::TypeParameter { r#default: Some(_), .. }) {
                default_required = true;
            }
            params.push(param);
            if !p.is_relational(">") {
                p.expect(TokenType::Comma)?;
            }
            if p.is_relational(">") {
                break;
            }
        }
        Ok(params)
    })?;
    p.expect_relational(">")?;
    Ok(p.finish_node(start, NodeKind::TypeParameterDeclaration { params }))
}

fn parse_type_parameter(p: &mut Parser, default_required: bool) -> ParseResult<Node> {
    let start = p.start_node();
    let variance = parse_variance(p)?.map(Box::new);
    check_reserved_type(p, p.value(), p.start())?;
    let name = p.parse_identifier_name(false)?;
    let bound = if p.is(TokenType::Colon) { Some(Box::new(parse_type_annotation(p)?)) } else { None };
    let default = if p.eat(TokenType::Eq)? {
        Some(Box::new(parse_type(p)?))
    } else if default_required {
        return Err(p.raise(start.pos, &messages::FLOW_MISSING_TYPE_PARAMETER_DEFAULT, &[]));
    } else {
        None
    };
    Ok(p.finish_node(start, NodeKind::TypeParameter { name, variance, bound, r#default: default }))
}

fn parse_optional_type_arguments(p: &mut Parser) -> ParseResult<Option<Box<Node>>> {
    if !p.is_relational("<") {
        return Ok(None);
    }
    Ok(Some(Box::new(parse_type_arguments(p)?)))
}

/// `<A, B>` at a use site. The closing `>` is followed by an operand-less
/// position, so a `/` after it divides.
fn parse_type_arguments(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let params = p.in_type(|p| {
        // Type arguments may open inside JSX or a template; read them with
        // only the outermost context in force.
        let base = p.tok.state.context.first().copied();
        let outer = mem::replace(&mut p.tok.state.context, base.into_iter().collect());
        let old_no_anon = mem::replace(&mut p.tok.state.no_anon_function_type, false);
        let params = p.expect_relational("<").and_then(|()| {
            let mut params = Vec::new();
            while !p.is_relational(">") {
                params.push(parse_type(p)?);
                if !p.is_relational(">") {
                    p.expect(TokenType::Comma)?;
                }
            }
            Ok(params)
        });
        p.tok.state.no_anon_function_type = old_no_anon;
        p.tok.state.context = outer;
        params
    })?;
    p.tok.state.expr_allowed = false;
    p.expect_relational(">")?;
    Ok(p.finish_node(start, NodeKind::TypeParameterInstantiation { params }))
}

// ============================================================================
// Types
// ============================================================================

/// A type. An anonymous function type without parentheses (`A => B`) is
/// not allowed while `no_anon_function_type` is set, which is how an arrow's
/// return annotation leaves the `=>` to the arrow.
fn parse_type(p: &mut Parser) -> ParseResult<Node> {
    let ty = p.in_type(parse_union_type)?;
    let state = &mut p.tok.state;
    state.expr_allowed = state.expr_allowed || state.no_anon_function_type;
    Ok(ty)
}

fn parse_union_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.eat(TokenType::BitwiseOr)?;
    let first = parse_intersection_type(p)?;
    if !p.is(TokenType::BitwiseOr) {
        return Ok(first);
    }
    let mut types = vec![first];
    while p.eat(TokenType::BitwiseOr)? {
        types.push(parse_intersection_type(p)?);
    }
    Ok(p.finish_node(start, NodeKind::UnionTypeAnnotation { types }))
}

fn parse_intersection_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.eat(TokenType::BitwiseAnd)?;
    let first = parse_anon_function_without_parens(p)?;
    if !p.is(TokenType::BitwiseAnd) {
        return Ok(first);
    }
    let mut types = vec![first];
    while p.eat(TokenType::BitwiseAnd)? {
        types.push(parse_anon_function_without_parens(p)?);
    }
    Ok(p.finish_node(start, NodeKind::IntersectionTypeAnnotation { types }))
}

fn parse_anon_function_without_parens(p: &mut Parser) -> ParseResult<Node> {
    let param = parse_prefix_type(p)?;
    if p.state().no_anon_function_type || !p.eat(TokenType::Arrow)? {
        return Ok(param);
    }
    let start = NodeStart::of(&param);
    let param = reinterpret_as_function_type_param(p, param);
    let return_type = parse_type(p)?;
    Ok(p.finish_node(
        start,
        NodeKind::FunctionTypeAnnotation {
            type_parameters: None,
            params: vec![param],
            rest: None,
            return_type: Box::new(return_type),
        },
    ))
}

/// `T` in `T => U` is the type of an unnamed parameter.
fn reinterpret_as_function_type_param(p: &Parser, ty: Node) -> Node {
    let (start, end, end_loc) = (NodeStart::of(&ty), ty.end, ty.loc.end);
    p.finish_node_at(
        start,
        NodeKind::FunctionTypeParam { name: None, optional: false, type_annotation: Box::new(ty) },
        end,
        end_loc,
    )
}

fn parse_prefix_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    if p.eat(TokenType::Question)? {
        let ty = parse_prefix_type(p)?;
        return Ok(p.finish_node(start, NodeKind::NullableTypeAnnotation { type_annotation: Box::new(ty) }));
    }
    parse_postfix_type(p)
}

/// `T[]`, which may not start on a new line.
fn parse_postfix_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let mut ty = parse_primary_type(p)?;
    while p.is(TokenType::BracketL) && !p.can_insert_semicolon() {
        p.expect(TokenType::BracketL)?;
        p.expect(TokenType::BracketR)?;
        ty = p.finish_node(start, NodeKind::ArrayTypeAnnotation { element_type: Box::new(ty) });
    }
    Ok(ty)
}

fn parse_primary_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    match p.cur() {
        TokenType::Name => {
            if p.eat_contextual("interface")? {
                return parse_interface_type(p, start);
            }
            let id = p.parse_identifier(false)?;
            parse_ident_type(p, start, id)
        }
        TokenType::BraceL => parse_object_type(
            p,
            ObjectTypeOptions { allow_spread: true, allow_inexact: true, ..ObjectTypeOptions::default() },
        ),
        TokenType::BraceBarL => parse_object_type(
            p,
            ObjectTypeOptions { allow_exact: true, allow_spread: true, ..ObjectTypeOptions::default() },
        ),
        TokenType::BracketL => parse_tuple_type(p),
        TokenType::Relational if p.value() == "<" => {
            let type_parameters = Some(Box::new(parse_type_parameters(p)?));
            p.expect(TokenType::ParenL)?;
            let mut params = Vec::new();
            let rest = parse_function_type_params(p, &mut params)?;
            p.expect(TokenType::ParenR)?;
            p.expect(TokenType::Arrow)?;
            let return_type = Box::new(parse_type(p)?);
            Ok(p.finish_node(start, NodeKind::FunctionTypeAnnotation { type_parameters, params, rest, return_type }))
        }
        TokenType::ParenL => parse_parenthesized_type(p, start),
        TokenType::String => {
            let value = p.value().to_string();
            p.parse_literal(
                NodeKind::StringLiteralTypeAnnotation { value: value.clone() },
                Some(LiteralValue::String(value)),
            )
        }
        TokenType::True | TokenType::False => {
            let value = p.is(TokenType::True);
            p.next()?;
            Ok(p.finish_node(start, NodeKind::BooleanLiteralTypeAnnotation { value }))
        }
        TokenType::PlusMin if p.value() == "-" => {
            p.next()?;
            if !p.is(TokenType::Num) {
                return Err(p.unexpected_expecting(TokenType::Num));
            }
            let value = -token_number(p);
            let mut literal =
                p.parse_literal(NodeKind::NumberLiteralTypeAnnotation { value }, Some(LiteralValue::Number(value)))?;
            p.reset_start(&mut literal, start);
            literal.extra.raw = Some(p.tok.slice(start.pos, literal.end));
            Ok(literal)
        }
        TokenType::Num => {
            let value = token_number(p);
            p.parse_literal(NodeKind::NumberLiteralTypeAnnotation { value }, Some(LiteralValue::Number(value)))
        }
        TokenType::Void => keyword_type(p, start, NodeKind::VoidTypeAnnotation {}),
        TokenType::Null => keyword_type(p, start, NodeKind::NullLiteralTypeAnnotation {}),
        TokenType::This => keyword_type(p, start, NodeKind::ThisTypeAnnotation {}),
        TokenType::Star => keyword_type(p, start, NodeKind::ExistsTypeAnnotation {}),
        TokenType::Typeof => {
            p.next()?;
            let argument = Box::new(parse_primary_type(p)?);
            Ok(p.finish_node(start, NodeKind::TypeofTypeAnnotation { argument }))
        }
        _ => Err(p.unexpected()),
    }
}

fn keyword_type(p: &mut Parser, start: NodeStart, kind: NodeKind) -> ParseResult<Node> {
    p.next()?;
    Ok(p.finish_node(start, kind))
}

fn token_number(p: &Parser) -> f64 {
    match p.state().value {
        TokenValue::Num(value) => value,
        _ => f64::NAN,
    }
}

/// A named type: a builtin, or a possibly qualified generic reference.
fn parse_ident_type(p: &mut Parser, start: NodeStart, id: Node) -> ParseResult<Node> {
    let kind = match id.identifier_name().unwrap_or_default() {
        "any" => NodeKind::AnyTypeAnnotation {},
        "bool" | "boolean" => NodeKind::BooleanTypeAnnotation {},
        "mixed" => NodeKind::MixedTypeAnnotation {},
        "empty" => NodeKind::EmptyTypeAnnotation {},
        "number" => NodeKind::NumberTypeAnnotation {},
        "string" => NodeKind::StringTypeAnnotation {},
        "symbol" => NodeKind::SymbolTypeAnnotation {},
        _ => {
            let id = Box::new(parse_qualified_type_identifier(p, start, id)?);
            let type_parameters = parse_optional_type_arguments(p)?;
            return Ok(p.finish_node(start, NodeKind::GenericTypeAnnotation { id, type_parameters }));
        }
    };
    Ok(p.finish_node(start, kind))
}

fn parse_qualified_type_identifier(p: &mut Parser, start: NodeStart, mut node: Node) -> ParseResult<Node> {
    while p.eat(TokenType::Dot)? {
        let id = Box::new(p.parse_identifier(false)?);
        node = p.finish_node(start, NodeKind::QualifiedTypeIdentifier { qualification: Box::new(node), id });
    }
    Ok(node)
}

/// `interface extends A { ... }` as a type, after `interface`.
fn parse_interface_type(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let extends = if p.eat(TokenType::Extends)? { parse_interface_extends_list(p)? } else { Vec::new() };
    let body = Box::new(parse_object_type(p, ObjectTypeOptions::default())?);
    Ok(p.finish_node(start, NodeKind::InterfaceTypeAnnotation { extends, body }))
}

/// A parenthesized type, or the parameter list of a function type. A
/// leading `name:` or `name?` means parameters; otherwise the first type is
/// read as grouped and reinterpreted if a `,` or `) =>` follows.
fn parse_parenthesized_type(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    p.expect(TokenType::ParenL)?;
    let mut params = Vec::new();
    if !p.is(TokenType::ParenR) && !p.is(TokenType::Ellipsis) {
        let grouped = if p.is(TokenType::Name) {
            !matches!(p.lookahead()?.token_type, TokenType::Question | TokenType::Colon)
        } else {
            true
        };
        if grouped {
            let old_no_anon = mem::replace(&mut p.tok.state.no_anon_function_type, false);
            let ty = parse_type(p);
            p.tok.state.no_anon_function_type = old_no_anon;
            let ty = ty?;
            let function_follows = !p.state().no_anon_function_type
                && (p.is(TokenType::Comma)
                    || (p.is(TokenType::ParenR) && p.lookahead()?.token_type == TokenType::Arrow));
            if !function_follows {
                p.expect(TokenType::ParenR)?;
                return Ok(ty);
            }
            p.eat(TokenType::Comma)?;
            params.push(reinterpret_as_function_type_param(p, ty));
        }
    }
    let rest = parse_function_type_params(p, &mut params)?;
    p.expect(TokenType::ParenR)?;
    p.expect(TokenType::Arrow)?;
    let return_type = Box::new(parse_type(p)?);
    Ok(p.finish_node(
        start,
        NodeKind::FunctionTypeAnnotation { type_parameters: None, params, rest, return_type },
    ))
}

/// Function type parameters up to the closing paren, which is left for the
/// caller. Returns the rest parameter.
fn parse_function_type_params(p: &mut Parser, params: &mut Vec<Node>) -> ParseResult<Option<Box<Node>>> {
    while !p.is(TokenType::ParenR) && !p.is(TokenType::Ellipsis) {
        params.push(parse_function_type_param(p)?);
        if !p.is(TokenType::ParenR) {
            p.expect(TokenType::Comma)?;
        }
    }
    if p.eat(TokenType::Ellipsis)? {
        return Ok(Some(Box::new(parse_function_type_param(p)?)));
    }
    Ok(None)
}

fn parse_function_type_param(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    if matches!(p.lookahead()?.token_type, TokenType::Colon | TokenType::Question) {
        let name = Box::new(p.parse_identifier(false)?);
        let optional = p.eat(TokenType::Question)?;
        let type_annotation = Box::new(parse_type_initialiser(p, TokenType::Colon)?);
        return Ok(p.finish_node(start, NodeKind::FunctionTypeParam { name: Some(name), optional, type_annotation }));
    }
    let type_annotation = Box::new(parse_type(p)?);
    Ok(p.finish_node(start, NodeKind::FunctionTypeParam { name: None, optional: false, type_annotation }))
}

fn parse_tuple_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.expect(TokenType::BracketL)?;
    let mut types = Vec::new();
    while !p.is(TokenType::BracketR) && !p.is(TokenType::Eof) {
        types.push(parse_type(p)?);
        if p.is(TokenType::BracketR) {
            break;
        }
        p.expect(TokenType::Comma)?;
    }
    p.expect(TokenType::BracketR)?;
    Ok(p.finish_node(start, NodeKind::TupleTypeAnnotation { types }))
}

// ============================================================================
// Object types
// ============================================================================

/// Which member forms an object type accepts. Object type literals allow
/// spreads; class and interface bodies allow `static` (classes only) and
/// `proto` (declared classes only).
#[derive(Debug, Clone, Copy, Default)]
struct ObjectTypeOptions {
    allow_static: bool,
    allow_exact: bool,
    allow_spread: bool,
    allow_proto: bool,
    allow_inexact: bool,
}

enum ObjectTypeMember {
    Property(Node),
    Indexer(Node),
    CallProperty(Node),
    /// A lone `...` marking the object inexact.
    Inexact,
}

fn parse_object_type(p: &mut Parser, options: ObjectTypeOptions) -> ParseResult<Node> {
    p.in_type(|p| {
        let start = p.start_node();
        let exact = options.allow_exact && p.is(TokenType::BraceBarL);
        let (open, close) =
            if exact { (TokenType::BraceBarL, TokenType::BraceBarR) } else { (TokenType::BraceL, TokenType::BraceR) };
        p.expect(open)?;

        let mut properties = Vec::new();
        let mut indexers = Vec::new();
        let mut call_properties = Vec::new();
        let mut inexact_start = None;
        while !p.is(close) {
            match parse_object_type_member(p, options)? {
                ObjectTypeMember::Property(node) => properties.push(node),
                ObjectTypeMember::Indexer(node) => indexers.push(node),
                ObjectTypeMember::CallProperty(node) => call_properties.push(node),
                ObjectTypeMember::Inexact => inexact_start = Some(p.state().last_tok_start),
            }
            object_type_semicolon(p)?;
            if let Some(pos) = inexact_start {
                if !p.is(TokenType::BraceR) && !p.is(TokenType::BraceBarR) {
                    return Err(p.raise(pos, &messages::FLOW_EXACT_INDEXER, &[]));
                }
            }
        }
        p.expect(close)?;
        let inexact = options.allow_spread && inexact_start.is_some();
        Ok(p.finish_node(
            start,
            NodeKind::ObjectTypeAnnotation { properties, indexers, call_properties, exact, inexact },
        ))
    })
}

fn object_type_semicolon(p: &mut Parser) -> ParseResult<()> {
    if p.eat(TokenType::Semi)? || p.eat(TokenType::Comma)? || p.is(TokenType::BraceR) || p.is(TokenType::BraceBarR) {
        return Ok(());
    }
    Err(p.unexpected())
}

/// `static` and `proto` are modifiers unless they are the key itself.
fn eat_member_modifier(p: &mut Parser, name: &str) -> ParseResult<Option<TextPos>> {
    if !p.is_contextual(name) {
        return Ok(None);
    }
    if matches!(p.lookahead()?.token_type, TokenType::Colon | TokenType::Question) {
        return Ok(None);
    }
    let pos = p.start();
    p.next()?;
    Ok(Some(pos))
}

fn parse_object_type_member(p: &mut Parser, options: ObjectTypeOptions) -> ParseResult<ObjectTypeMember> {
    let start = p.start_node();
    let proto_start = if options.allow_proto { eat_member_modifier(p, "proto")? } else { None };
    let is_static = options.allow_static && proto_start.is_none() && eat_member_modifier(p, "static")?.is_some();
    let variance = parse_variance(p)?;

    if p.eat(TokenType::BracketL)? {
        if let Some(pos) = proto_start {
            return Err(p.unexpected_at(pos));
        }
        if p.is(TokenType::BracketL) {
            return Err(p.unexpected());
        }
        return Ok(ObjectTypeMember::Indexer(parse_object_type_indexer(p, start, is_static, variance)?));
    }
    if p.is(TokenType::ParenL) || p.is_relational("<") {
        if let Some(pos) = proto_start.or(variance.as_ref().map(|v| v.start)) {
            return Err(p.unexpected_at(pos));
        }
        let value_start = p.start_node();
        let value = Box::new(parse_object_type_methodish(p, value_start)?);
        return Ok(ObjectTypeMember::CallProperty(
            p.finish_node(start, NodeKind::ObjectTypeCallProperty { value, r#static: is_static }),
        ));
    }

    let mut kind = "init";
    if p.is_contextual("get") || p.is_contextual("set") {
        if matches!(p.lookahead()?.token_type, TokenType::Name | TokenType::String | TokenType::Num) {
            kind = if p.is_contextual("get") { "get" } else { "set" };
            p.next()?;
        }
    }
    parse_object_type_property(p, start, options, is_static, proto_start, variance, kind)
}

fn parse_object_type_indexer(
    p: &mut Parser,
    start: NodeStart,
    is_static: bool,
    variance: Option<Node>,
) -> ParseResult<Node> {
    let (id, key) = if p.lookahead()?.token_type == TokenType::Colon {
        let id = Box::new(parse_object_property_key(p)?);
        (Some(id), parse_type_initialiser(p, TokenType::Colon)?)
    } else {
        (None, parse_type(p)?)
    };
    p.expect(TokenType::BracketR)?;
    let value = Box::new(parse_type_initialiser(p, TokenType::Colon)?);
    Ok(p.finish_node(
        start,
        NodeKind::ObjectTypeIndexer {
            id,
            key: Box::new(key),
            value,
            variance: variance.map(Box::new),
            r#static: is_static,
        },
    ))
}

#[allow(clippy::too_many_arguments)]
fn parse_object_type_property(
    p: &mut Parser,
    start: NodeStart,
    options: ObjectTypeOptions,
    is_static: bool,
    proto_start: Option<TextPos>,
    variance: Option<Node>,
    kind: &'static str,
) -> ParseResult<ObjectTypeMember> {
    if p.eat(TokenType::Ellipsis)? {
        let ellipsis = p.state().last_tok_start;
        let inexact = matches!(p.cur(), TokenType::Comma | TokenType::Semi | TokenType::BraceR | TokenType::BraceBarR);
        if inexact {
            if !options.allow_spread {
                return Err(p.raise(ellipsis, &messages::FLOW_INEXACT_IN_DECLARATION, &[]));
            }
            if !options.allow_inexact {
                return Err(p.raise(ellipsis, &messages::FLOW_INEXACT_IN_EXACT, &[]));
            }
            if let Some(variance) = &variance {
                return Err(p.raise(variance.start, &messages::FLOW_INEXACT_VARIANCE, &[]));
            }
            return Ok(ObjectTypeMember::Inexact);
        }
        if !options.allow_spread {
            return Err(p.raise(ellipsis, &messages::FLOW_SPREAD_IN_DECLARATION, &[]));
        }
        if let Some(pos) = proto_start {
            return Err(p.unexpected_at(pos));
        }
        if let Some(variance) = &variance {
            return Err(p.raise(variance.start, &messages::FLOW_SPREAD_VARIANCE, &[]));
        }
        let argument = Box::new(parse_type(p)?);
        return Ok(ObjectTypeMember::Property(p.finish_node(start, NodeKind::ObjectTypeSpreadProperty { argument })));
    }

    let key = Box::new(parse_object_property_key(p)?);
    let (value, method, optional, variance) = if p.is_relational("<") || p.is(TokenType::ParenL) {
        if let Some(pos) = proto_start.or(variance.as_ref().map(|v| v.start)) {
            return Err(p.unexpected_at(pos));
        }
        let value = parse_object_type_methodish(p, start)?;
        if kind != "init" {
            check_accessor_arity(p, kind, &value, start.pos)?;
        }
        (value, true, false, None)
    } else {
        if kind != "init" {
            return Err(p.unexpected());
        }
        let optional = p.eat(TokenType::Question)?;
        (parse_type_initialiser(p, TokenType::Colon)?, false, optional, variance)
    };
    Ok(ObjectTypeMember::Property(p.finish_node(
        start,
        NodeKind::ObjectTypeProperty {
            key,
            value: Box::new(value),
            r#static: is_static,
            proto: proto_start.is_some(),
            kind,
            method,
            optional,
            variance: variance.map(Box::new),
        },
    )))
}

fn parse_object_property_key(p: &mut Parser) -> ParseResult<Node> {
    if matches!(p.cur(), TokenType::Num | TokenType::String) {
        return p.parse_expr_atom(None);
    }
    p.parse_identifier(true)
}

/// The signature of a method or call property: `<T>(x: T): R`.
fn parse_object_type_methodish(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let type_parameters = parse_optional_type_parameters(p)?;
    p.expect(TokenType::ParenL)?;
    let mut params = Vec::new();
    let rest = parse_function_type_params(p, &mut params)?;
    p.expect(TokenType::ParenR)?;
    let return_type = Box::new(parse_type_initialiser(p, TokenType::Colon)?);
    Ok(p.finish_node(start, NodeKind::FunctionTypeAnnotation { type_parameters, params, rest, return_type }))
}

fn check_accessor_arity(p: &Parser, kind: &str, value: &Node, pos: TextPos) -> ParseResult<()> {
    let NodeKind::FunctionTypeAnnotation { params, rest, .. } = &value.kind else {
        return Ok(());
    };
    let count = params.len() + usize::from(rest.is_some());
    if kind == "get" && count != 0 {
        return Err(p.raise(pos, &messages::GETTER_PARAMS, &[]));
    }
    if kind == "set" && count != 1 {
        return Err(p.raise(pos, &messages::SETTER_PARAMS, &[]));
    }
    if kind == "set" && rest.is_some() {
        return Err(p.raise(pos, &messages::SETTER_REST, &[]));
    }
    Ok(())
}
