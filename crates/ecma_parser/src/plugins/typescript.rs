//! TypeScript.
//!
//! Types are parsed by the free functions below with `in_type` set, so the
//! tokenizer reads `<` and `>` as single brackets. Where an expression could
//! still be a generic arrow, a type assertion or a call with type arguments,
//! the alternatives are tried speculatively.

use super::{at_type_parameters_start, look_ahead, try_jsx_expression, type_cast_to_parameter};
use crate::dialect::{Dialect, Hook, LvalCheck, ReturnSignature, StatementContext};
use crate::expression::ExpressionErrors;
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{Class, MappedModifier, MemberModifiers, ModifierFlags, Node, NodeKind, TokenType};
use ecma_diagnostics::{messages, ParseResult};
use ecma_scanner::{Plugin, State, TokenizerHook};
use std::mem;
use tracing::trace;

pub(crate) struct TypeScript;

impl Dialect for TypeScript {
    fn plugin(&self) -> Plugin {
        Plugin::Typescript
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

        let arrow_error = match p.try_speculative(|p| parse_generic_arrow(p, no_in)) {
            Ok(arrow) => return Ok(Some(arrow)),
            Err(err) => err,
        };
        if let Some(err) = jsx_error {
            return Err(err);
        }
        trace!(pos = arrow_error.pos, "not a generic arrow");
        if arrow_error.reason_code == messages::TS_EXPECTED_ARROW.code {
            // Type parameters without an arrow: read `<T>x` as an assertion.
            return Ok(None);
        }
        match p.try_speculative(|p| p.base_maybe_assign(no_in, None, false)) {
            Ok(node) => Ok(Some(node)),
            Err(_) => Err(arrow_error),
        }
    }

    fn maybe_unary(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        if p.has_plugin(Plugin::Jsx) || !p.is_relational("<") {
            return Ok(None);
        }
        let start = p.start_node();
        let type_annotation = p.in_type(|p| {
            p.next()?;
            parse_type_or_const(p)
        })?;
        p.expect_relational(">")?;
        let expression = p.parse_maybe_unary(None)?;
        Ok(Some(p.finish_node(
            start,
            NodeKind::TSTypeAssertion {
                type_annotation: Box::new(type_annotation),
                expression: Box::new(expression),
            },
        )))
    }

    fn binary_operator(
        &self,
        p: &mut Parser,
        left: Node,
        left_start: NodeStart,
        min_prec: u8,
        no_in: bool,
    ) -> ParseResult<Hook<Node>> {
        let relational = TokenType::Relational.binop().map_or(0, |prec| prec as u8);
        if relational <= min_prec || p.has_preceding_line_break() || !p.is_contextual("as") {
            return Ok(Hook::Pass(left));
        }
        let type_annotation = p.in_type(|p| {
            p.next()?;
            parse_type_or_const(p)
        })?;
        let node = p.finish_node(
            left_start,
            NodeKind::TSAsExpression { expression: Box::new(left), type_annotation: Box::new(type_annotation) },
        );
        // The token after the type was read as a single bracket.
        if p.is(TokenType::Relational) {
            p.tok.rescan_current()?;
        }
        Ok(Hook::Done(p.parse_expr_op(node, left_start, min_prec, no_in)?))
    }

    fn subscript(
        &self,
        p: &mut Parser,
        base: Node,
        start: NodeStart,
        no_calls: bool,
        stop: &mut bool,
    ) -> ParseResult<Hook<Node>> {
        if p.is(TokenType::Bang) && !p.has_preceding_line_break() {
            p.tok.state.expr_allowed = false;
            p.next()?;
            return Ok(Hook::Done(
                p.finish_node(start, NodeKind::TSNonNullExpression { expression: Box::new(base) }),
            ));
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

        let callee = base.clone();
        let call = p.try_parse(|p| {
            let type_arguments = Box::new(parse_type_arguments(p)?);
            if !no_calls && p.eat(TokenType::ParenL)? {
                let arguments = p.parse_call_arguments(TokenType::ParenR, false, false, None)?;
                p.to_referenced_list(&arguments)?;
                let mut call = p.finish_call_expression(start, callee, arguments)?;
                if let NodeKind::CallExpression { type_parameters, .. } = &mut call.kind {
                    *type_parameters = Some(type_arguments);
                }
                return Ok(Some(call));
            }
            if p.is(TokenType::BackQuote) {
                let quasi = p.parse_template(true)?;
                return Ok(Some(p.finish_node(
                    start,
                    NodeKind::TaggedTemplateExpression {
                        tag: Box::new(callee),
                        quasi: Box::new(quasi),
                        type_parameters: Some(type_arguments),
                    },
                )));
            }
            Ok(None)
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
            let return_type = parse_type_or_predicate_annotation(p, TokenType::Colon)?;
            if p.can_insert_semicolon() || !p.is(TokenType::Arrow) {
                return Ok(None);
            }
            Ok(Some(ReturnSignature { return_type: Some(return_type), predicate: None }))
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
        if !errors.in_parens || !p.is(TokenType::Question) {
            return Ok(Hook::Pass(test));
        }
        // `(x?: T) => x` reads like the start of a conditional.
        let fallback = test.clone();
        match p.try_speculative(|p| p.base_conditional(test, no_in, start)) {
            Ok(node) => Ok(Hook::Done(node)),
            Err(err) => {
                errors.needs_arrow.get_or_insert(err.pos);
                Ok(Hook::Done(fallback))
            }
        }
    }

    fn check_referenced(&self, p: &Parser, expr: &Node) -> ParseResult<()> {
        if let NodeKind::TypeCastExpression { type_annotation, .. } = &expr.kind {
            return Err(p.raise(type_annotation.start, &messages::TS_UNEXPECTED_TYPE_ANNOTATION, &[]));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Statements and modules
    // ------------------------------------------------------------------------

    fn statement_keyword(&self, p: &mut Parser, _context: StatementContext) -> ParseResult<Option<Node>> {
        parse_declaration(p)
    }

    fn export_declaration(&self, p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
        if p.eat(TokenType::Import)? {
            return Ok(Some(parse_import_equals(p, start, true)?));
        }
        if p.eat(TokenType::Eq)? {
            let expression = p.parse_expression()?;
            p.semicolon()?;
            return Ok(Some(p.finish_node(start, NodeKind::TSExportAssignment { expression: Box::new(expression) })));
        }
        if p.eat_contextual("as")? {
            p.expect_contextual("namespace")?;
            let id = p.parse_identifier(false)?;
            p.semicolon()?;
            return Ok(Some(p.finish_node(start, NodeKind::TSNamespaceExportDeclaration { id: Box::new(id) })));
        }
        if p.is(TokenType::Default) {
            return parse_export_default_declaration(p, start);
        }
        if p.is_contextual("type") && p.lookahead()?.token_type == TokenType::BraceL {
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

        let Some(declaration) = parse_declaration(p)? else {
            return Ok(None);
        };
        let export_kind = if is_type_only(&declaration) { "type" } else { "value" };
        p.check_named_exports(start.pos, Some(&declaration), &[], false)?;
        Ok(Some(p.finish_node(
            start,
            NodeKind::ExportNamedDeclaration {
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
                export_kind: Some(export_kind),
            },
        )))
    }

    fn import_declaration(&self, p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
        if p.is(TokenType::Name) && p.lookahead()?.token_type == TokenType::Eq {
            return Ok(Some(parse_import_equals(p, start, false)?));
        }
        Ok(None)
    }

    fn import_kind(&self, p: &mut Parser) -> ParseResult<Option<&'static str>> {
        if p.is_contextual("type") {
            let next = p.lookahead()?;
            let type_only = matches!(next.token_type, TokenType::BraceL | TokenType::Star)
                || (next.token_type == TokenType::Name && next.value.str_or_empty() != "from");
            if type_only {
                p.next()?;
                return Ok(Some("type"));
            }
        }
        Ok(Some("value"))
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
        Ok(p.try_parse(|p| {
            let type_arguments = parse_type_arguments(p)?;
            Ok(p.is(TokenType::ParenL).then_some(type_arguments))
        }))
    }

    fn return_type(&self, p: &mut Parser) -> ParseResult<Option<ReturnSignature>> {
        let return_type = parse_type_or_predicate_annotation(p, TokenType::Colon)?;
        Ok(Some(ReturnSignature { return_type: Some(return_type), predicate: None }))
    }

    // ------------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------------

    fn class_member_modifiers(&self, p: &mut Parser, modifiers: &mut MemberModifiers) -> ParseResult<()> {
        const ALLOWED: &[&str] = &["declare", "private", "public", "protected", "abstract", "readonly"];
        while let Some(word) = parse_modifier(p, ALLOWED)? {
            let pos = p.state().last_tok_start;
            let Some(flag) = ModifierFlags::from_keyword(word) else {
                continue;
            };
            if flag.intersects(ModifierFlags::ACCESSIBILITY) {
                if modifiers.accessibility.is_some() {
                    return Err(p.raise(pos, &messages::TS_DUPLICATE_ACCESSIBILITY, &[]));
                }
                modifiers.accessibility = Some(word);
                continue;
            }
            let seen = match word {
                "declare" => &mut modifiers.declare,
                "abstract" => &mut modifiers.r#abstract,
                _ => &mut modifiers.readonly,
            };
            if mem::replace(seen, true) {
                return Err(p.raise(pos, &messages::TS_DUPLICATE_MODIFIER, &[word]));
            }
        }
        Ok(())
    }

    fn class_member(
        &self,
        p: &mut Parser,
        start: NodeStart,
        modifiers: &mut MemberModifiers,
    ) -> ParseResult<Option<Node>> {
        let Some(mut signature) = try_parse_index_signature(p, start)? else {
            return Ok(None);
        };
        if let Some(accessibility) = modifiers.accessibility {
            return Err(p.raise(signature.start, &messages::TS_INDEX_SIGNATURE_MODIFIER, &[accessibility]));
        }
        if let NodeKind::TSIndexSignature { readonly, r#static, .. } = &mut signature.kind {
            *readonly = modifiers.readonly;
            *r#static = modifiers.r#static;
        }
        Ok(Some(signature))
    }

    fn class_member_key_suffix(&self, p: &mut Parser, modifiers: &mut MemberModifiers) -> ParseResult<()> {
        if p.eat(TokenType::Question)? {
            modifiers.optional = true;
        } else if p.eat(TokenType::Bang)? {
            modifiers.definite = true;
        }
        Ok(())
    }

    fn class_heritage(&self, p: &mut Parser, class: &mut Class) -> ParseResult<()> {
        if class.super_class.is_some() && p.is_relational("<") {
            class.super_type_parameters = Some(Box::new(parse_type_arguments(p)?));
        }
        if p.eat_contextual("implements")? {
            class.implements = parse_heritage_clause(p, "implements")?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Functions and bindings
    // ------------------------------------------------------------------------

    fn bodiless_function(&self, p: &mut Parser) -> ParseResult<bool> {
        p.is_line_terminator()
    }

    fn binding_annotation(&self, p: &mut Parser, pattern: &mut Node) -> ParseResult<()> {
        let mut changed = false;
        if p.is(TokenType::Question) {
            let NodeKind::Identifier { optional, .. } = &mut pattern.kind else {
                return Err(p.raise(pattern.start, &messages::TS_OPTIONAL_BINDING_PATTERN, &[]));
            };
            *optional = true;
            p.next()?;
            changed = true;
        }
        if p.is(TokenType::Colon) {
            let annotation = parse_type_annotation(p)?;
            let Some(slot) = pattern.kind.type_annotation_slot() else {
                return Err(p.raise(annotation.start, &messages::TS_UNEXPECTED_TYPE_ANNOTATION, &[]));
            };
            *slot = Some(Box::new(annotation));
            changed = true;
        }
        if changed {
            p.reset_end(pattern);
        }
        Ok(())
    }

    fn assignable_list_item(&self, p: &mut Parser, allow_modifiers: bool) -> ParseResult<Option<Node>> {
        // `this` may be declared as a parameter to give it a type.
        if p.is(TokenType::This) {
            let mut this = p.parse_identifier(true)?;
            p.hook_binding_annotation(&mut this)?;
            return Ok(Some(this));
        }

        let start = p.start_node();
        let accessibility = parse_modifier(p, &["public", "private", "protected"])?;
        let readonly = parse_modifier(p, &["readonly"])?.is_some();
        if accessibility.is_none() && !readonly {
            return Ok(None);
        }
        if !allow_modifiers {
            return Err(p.raise(start.pos, &messages::TS_PARAMETER_PROPERTY_OUTSIDE_CONSTRUCTOR, &[]));
        }

        let mut left = p.parse_maybe_default(None, None)?;
        p.hook_binding_annotation(&mut left)?;
        let parameter = p.parse_maybe_default(Some(NodeStart::of(&left)), Some(left))?;
        if !matches!(parameter.kind, NodeKind::Identifier { .. } | NodeKind::AssignmentPattern { .. }) {
            return Err(p.raise(start.pos, &messages::TS_PARAMETER_PROPERTY_PATTERN, &[]));
        }
        Ok(Some(p.finish_node(
            start,
            NodeKind::TSParameterProperty { accessibility, readonly, parameter: Box::new(parameter) },
        )))
    }

    fn to_assignable(&self, p: &mut Parser, mut node: Node, is_binding: bool) -> ParseResult<Hook<Node>> {
        match mem::replace(&mut node.kind, NodeKind::NullLiteral {}) {
            NodeKind::TypeCastExpression { expression, type_annotation } => {
                let expression = Box::new(p.to_assignable(*expression, is_binding, "parenthesized pattern")?);
                node.kind = NodeKind::TypeCastExpression { expression, type_annotation };
                Ok(Hook::Done(type_cast_to_parameter(p, node)))
            }
            NodeKind::TSNonNullExpression { expression } => {
                if is_binding {
                    return Err(p.raise(node.start, &messages::TS_NON_NULL_IN_BINDING, &[]));
                }
                let expression = Box::new(p.to_assignable(*expression, false, "non-null assertion")?);
                node.kind = NodeKind::TSNonNullExpression { expression };
                Ok(Hook::Done(node))
            }
            NodeKind::TSAsExpression { expression, type_annotation } => {
                if is_binding {
                    return Err(p.raise(node.start, &messages::TS_UNEXPECTED_TYPE_CAST, &[]));
                }
                let expression = Box::new(p.to_assignable(*expression, false, "type assertion")?);
                node.kind = NodeKind::TSAsExpression { expression, type_annotation };
                Ok(Hook::Done(node))
            }
            NodeKind::TSTypeAssertion { type_annotation, expression } => {
                if is_binding {
                    return Err(p.raise(node.start, &messages::TS_UNEXPECTED_TYPE_CAST, &[]));
                }
                let expression = Box::new(p.to_assignable(*expression, false, "type assertion")?);
                node.kind = NodeKind::TSTypeAssertion { type_annotation, expression };
                Ok(Hook::Done(node))
            }
            kind => {
                node.kind = kind;
                Ok(Hook::Pass(node))
            }
        }
    }

    fn check_lval<'n>(&self, p: &Parser, node: &'n Node, is_binding: bool) -> ParseResult<LvalCheck<'n>> {
        match &node.kind {
            NodeKind::TSParameterProperty { parameter, .. } => Ok(LvalCheck::Inner(parameter.as_ref())),
            NodeKind::TSNonNullExpression { .. } if is_binding => {
                Err(p.raise(node.start, &messages::TS_NON_NULL_IN_BINDING, &[]))
            }
            NodeKind::TSAsExpression { .. } | NodeKind::TSTypeAssertion { .. } if is_binding => {
                Err(p.raise(node.start, &messages::TS_UNEXPECTED_TYPE_CAST, &[]))
            }
            NodeKind::TSNonNullExpression { expression }
            | NodeKind::TSAsExpression { expression, .. }
            | NodeKind::TSTypeAssertion { expression, .. } => Ok(LvalCheck::Inner(expression.as_ref())),
            NodeKind::TypeCastExpression { .. } => Err(p.raise(node.start, &messages::TS_UNEXPECTED_TYPE_CAST, &[])),
            _ => Ok(LvalCheck::NotMine),
        }
    }

    fn var_declarator_id(&self, p: &mut Parser, id: &mut Node, definite: &mut bool) -> ParseResult<()> {
        if matches!(id.kind, NodeKind::Identifier { .. }) && p.eat(TokenType::Bang)? {
            *definite = true;
        }
        if p.is(TokenType::Colon) {
            let annotation = parse_type_annotation(p)?;
            if let Some(slot) = id.kind.type_annotation_slot() {
                *slot = Some(Box::new(annotation));
                p.reset_end(id);
            }
        }
        Ok(())
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// `<T>(x: T) => x`. Anything but an unparenthesized arrow after the type
/// parameters fails with the expected-arrow error.
fn parse_generic_arrow(p: &mut Parser, no_in: bool) -> ParseResult<Node> {
    let type_parameters = parse_type_parameters(p)?;
    let mut expr = p.base_maybe_assign(no_in, None, false)?;
    if !matches!(expr.kind, NodeKind::ArrowFunctionExpression { .. }) || expr.extra.parenthesized {
        return Err(p.raise(type_parameters.start, &messages::TS_EXPECTED_ARROW, &[]));
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
    let return_type = if p.is(TokenType::Colon) {
        Some(parse_type_or_predicate_annotation(p, TokenType::Colon)?)
    } else {
        None
    };
    if !p.eat(TokenType::Arrow)? {
        return Ok(None);
    }
    let signature = ReturnSignature { return_type, predicate: None };
    let mut arrow = p.parse_arrow_expression(start, params, true, signature)?;
    if let NodeKind::ArrowFunctionExpression { function, .. } = &mut arrow.kind {
        function.type_parameters = Some(Box::new(type_parameters));
    }
    Ok(Some(arrow))
}

/// `export default interface` and `export default abstract class`; any
/// other default export is left to the base grammar.
fn parse_export_default_declaration(p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
    let is_interface = look_ahead(p, |p| {
        p.next()?;
        Ok(p.is_contextual("interface") && p.lookahead()?.token_type == TokenType::Name)
    });
    let is_abstract_class = look_ahead(p, |p| {
        p.next()?;
        Ok(p.is_contextual("abstract") && p.lookahead()?.token_type == TokenType::Class)
    });
    if !is_interface && !is_abstract_class {
        return Ok(None);
    }

    p.next()?;
    let declaration_start = p.start_node();
    p.next()?;
    let declaration = if is_interface {
        parse_interface(p, declaration_start)?
    } else {
        let mut class = p.parse_class(declaration_start, true, true)?;
        mark_abstract(&mut class);
        class
    };
    p.check_duplicate_export(start.pos, "default")?;
    Ok(Some(p.finish_node(start, NodeKind::ExportDefaultDeclaration { declaration: Box::new(declaration) })))
}

// ============================================================================
// Declarations
// ============================================================================

const DECLARATION_KEYWORDS: &[&str] =
    &["declare", "abstract", "enum", "interface", "type", "namespace", "module", "global"];

/// A declaration introduced by a TypeScript keyword, or `None` when the
/// keyword is only an identifier here.
fn parse_declaration(p: &mut Parser) -> ParseResult<Option<Node>> {
    let start = p.start_node();
    if p.is(TokenType::Const) {
        if !p.is_lookahead_contextual("enum")? {
            return Ok(None);
        }
        p.next()?;
        p.next()?;
        return Ok(Some(parse_enum(p, start, true)?));
    }
    if !p.is(TokenType::Name) || p.state().contains_esc {
        return Ok(None);
    }
    let Some(keyword) = DECLARATION_KEYWORDS.iter().copied().find(|k| *k == p.value()) else {
        return Ok(None);
    };
    let next = p.lookahead()?;
    if p.tok.has_line_break_between(p.state().end, next.start) {
        return Ok(None);
    }

    let next_is_name = next.token_type == TokenType::Name;
    let declaration = match keyword {
        "declare" => return parse_declare(p, start, &next),
        "abstract" if next.token_type == TokenType::Class => {
            p.next()?;
            let mut class = p.parse_class(start, true, false)?;
            mark_abstract(&mut class);
            class
        }
        "enum" if next_is_name => {
            p.next()?;
            parse_enum(p, start, false)?
        }
        "interface" if next_is_name => {
            p.next()?;
            parse_interface(p, start)?
        }
        "type" if next_is_name => {
            p.next()?;
            parse_type_alias(p, start)?
        }
        "namespace" if next_is_name => {
            p.next()?;
            parse_namespace(p, start)?
        }
        "module" if next.token_type == TokenType::String => {
            p.next()?;
            parse_ambient_module(p, start)?
        }
        "module" if next_is_name => {
            p.next()?;
            parse_namespace(p, start)?
        }
        "global" if next.token_type == TokenType::BraceL => parse_ambient_module(p, start)?,
        _ => return Ok(None),
    };
    trace!(kind = declaration.type_name(), pos = start.pos, "typescript declaration");
    Ok(Some(declaration))
}

/// `declare` followed by a declaration, which becomes ambient.
fn parse_declare(p: &mut Parser, start: NodeStart, next: &State) -> ParseResult<Option<Node>> {
    let declarable = match next.token_type {
        TokenType::Function | TokenType::Class | TokenType::Var | TokenType::Const => true,
        TokenType::Name => matches!(
            next.value.str_or_empty(),
            "let" | "global" | "enum" | "interface" | "type" | "namespace" | "module" | "abstract"
        ),
        _ => false,
    };
    if !declarable {
        return Ok(None);
    }
    p.next()?;

    let inner_start = p.start_node();
    let mut declaration = if p.is(TokenType::Function) {
        p.next()?;
        p.parse_function(inner_start, true, false, false)?
    } else if p.is(TokenType::Class) {
        p.parse_class(inner_start, true, false)?
    } else if let Some(kind) = ambient_var_kind(p)? {
        p.next()?;
        let declarations = p.parse_var(false, kind, true)?;
        p.semicolon()?;
        p.finish_node(inner_start, NodeKind::VariableDeclaration { kind, declarations, declare: false })
    } else if p.is_contextual("global") {
        parse_ambient_module(p, inner_start)?
    } else {
        parse_declaration(p)?.ok_or_else(|| p.unexpected())?
    };
    mark_declare(&mut declaration);
    p.reset_start(&mut declaration, start);
    Ok(Some(declaration))
}

fn ambient_var_kind(p: &mut Parser) -> ParseResult<Option<&'static str>> {
    Ok(match p.cur() {
        TokenType::Var => Some("var"),
        TokenType::Const if !p.is_lookahead_contextual("enum")? => Some("const"),
        TokenType::Name if p.is_contextual("let") => Some("let"),
        _ => None,
    })
}

fn mark_declare(node: &mut Node) {
    match &mut node.kind {
        NodeKind::TSDeclareFunction { declare, .. }
        | NodeKind::VariableDeclaration { declare, .. }
        | NodeKind::TSEnumDeclaration { declare, .. }
        | NodeKind::TSInterfaceDeclaration { declare, .. }
        | NodeKind::TSTypeAliasDeclaration { declare, .. }
        | NodeKind::TSModuleDeclaration { declare, .. } => *declare = true,
        NodeKind::ClassDeclaration { class } => class.declare = true,
        _ => {}
    }
}

fn mark_abstract(node: &mut Node) {
    if let NodeKind::ClassDeclaration { class } | NodeKind::ClassExpression { class } = &mut node.kind {
        class.r#abstract = true;
    }
}

/// Declarations that only exist at the type level.
fn is_type_only(node: &Node) -> bool {
    match &node.kind {
        NodeKind::TSInterfaceDeclaration { .. } | NodeKind::TSTypeAliasDeclaration { .. } => true,
        NodeKind::TSDeclareFunction { declare, .. }
        | NodeKind::VariableDeclaration { declare, .. }
        | NodeKind::TSEnumDeclaration { declare, .. }
        | NodeKind::TSModuleDeclaration { declare, .. } => *declare,
        NodeKind::ClassDeclaration { class } => class.declare,
        _ => false,
    }
}

fn parse_enum(p: &mut Parser, start: NodeStart, is_const: bool) -> ParseResult<Node> {
    let id = p.parse_identifier(false)?;
    p.expect(TokenType::BraceL)?;
    let members = parse_delimited_list(p, TokenType::BraceR, parse_enum_member)?;
    p.expect(TokenType::BraceR)?;
    Ok(p.finish_node(
        start,
        NodeKind::TSEnumDeclaration { id: Box::new(id), members, r#const: is_const, declare: false },
    ))
}

fn parse_enum_member(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let id = if p.is(TokenType::String) { p.parse_expr_atom(None)? } else { p.parse_identifier(true)? };
    let initializer = if p.eat(TokenType::Eq)? { Some(Box::new(p.parse_maybe_assign()?)) } else { None };
    Ok(p.finish_node(start, NodeKind::TSEnumMember { id: Box::new(id), initializer }))
}

fn parse_interface(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let id = p.parse_identifier(false)?;
    let type_parameters = try_parse_type_parameters(p)?;
    let extends = if p.eat(TokenType::Extends)? { parse_heritage_clause(p, "extends")? } else { Vec::new() };
    let body_start = p.start_node();
    let members = p.in_type(parse_object_type_members)?;
    let body = p.finish_node(body_start, NodeKind::TSInterfaceBody { body: members });
    Ok(p.finish_node(
        start,
        NodeKind::TSInterfaceDeclaration {
            id: Box::new(id),
            type_parameters,
            extends,
            body: Box::new(body),
            declare: false,
        },
    ))
}

fn parse_type_alias(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let id = p.parse_identifier(false)?;
    let type_parameters = try_parse_type_parameters(p)?;
    let type_annotation = p.in_type(|p| {
        p.expect(TokenType::Eq)?;
        parse_type(p)
    })?;
    p.semicolon()?;
    Ok(p.finish_node(
        start,
        NodeKind::TSTypeAliasDeclaration {
            id: Box::new(id),
            type_parameters,
            type_annotation: Box::new(type_annotation),
            declare: false,
        },
    ))
}

/// `namespace A.B { ... }`; each dotted segment nests a declaration.
fn parse_namespace(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let id = p.parse_identifier(false)?;
    let body = if p.eat(TokenType::Dot)? {
        let inner_start = p.start_node();
        parse_namespace(p, inner_start)?
    } else {
        parse_module_block(p)?
    };
    Ok(p.finish_node(
        start,
        NodeKind::TSModuleDeclaration { id: Box::new(id), body: Some(Box::new(body)), declare: false, global: false },
    ))
}

/// `module "name" { ... }` or `global { ... }`. The body may be omitted.
fn parse_ambient_module(p: &mut Parser, start: NodeStart) -> ParseResult<Node> {
    let global = p.is_contextual("global");
    let id = if global {
        p.parse_identifier(false)?
    } else if p.is(TokenType::String) {
        p.parse_expr_atom(None)?
    } else {
        return Err(p.unexpected());
    };
    let body = if p.is(TokenType::BraceL) {
        Some(Box::new(parse_module_block(p)?))
    } else {
        p.semicolon()?;
        None
    };
    Ok(p.finish_node(start, NodeKind::TSModuleDeclaration { id: Box::new(id), body, declare: false, global }))
}

fn parse_module_block(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.expect(TokenType::BraceL)?;
    let (body, _) = p.parse_block_body(TokenType::BraceR, false, true)?;
    Ok(p.finish_node(start, NodeKind::TSModuleBlock { body }))
}

/// `import a = require("m")` or `import a = B.c`, after `import`.
fn parse_import_equals(p: &mut Parser, start: NodeStart, is_export: bool) -> ParseResult<Node> {
    let id = p.parse_identifier(false)?;
    p.expect(TokenType::Eq)?;
    let module_reference = if p.is_contextual("require") && p.lookahead()?.token_type == TokenType::ParenL {
        let reference_start = p.start_node();
        p.next()?;
        p.expect(TokenType::ParenL)?;
        if !p.is(TokenType::String) {
            return Err(p.unexpected_expecting(TokenType::String));
        }
        let expression = p.parse_expr_atom(None)?;
        p.expect(TokenType::ParenR)?;
        p.finish_node(reference_start, NodeKind::TSExternalModuleReference { expression: Box::new(expression) })
    } else {
        parse_entity_name(p, false)?
    };
    p.semicolon()?;
    Ok(p.finish_node(
        start,
        NodeKind::TSImportEqualsDeclaration { is_export, id: Box::new(id), module_reference: Box::new(module_reference) },
    ))
}

/// The `extends` list of an interface or the `implements` list of a class.
fn parse_heritage_clause(p: &mut Parser, descriptor: &str) -> ParseResult<Vec<Node>> {
    let start = p.start();
    let list = parse_delimited_list(p, TokenType::BraceL, |p| {
        let start = p.start_node();
        let expression = parse_entity_name(p, false)?;
        let type_parameters =
            if p.is_relational("<") { Some(Box::new(parse_type_arguments(p)?)) } else { None };
        Ok(p.finish_node(
            start,
            NodeKind::TSExpressionWithTypeArguments { expression: Box::new(expression), type_parameters },
        ))
    })?;
    if list.is_empty() {
        return Err(p.raise(start, &messages::TS_EMPTY_HERITAGE, &[descriptor]));
    }
    Ok(list)
}

// ============================================================================
// Modifiers and signatures
// ============================================================================

/// Consume one of `allowed` when it is used as a modifier, that is when a
/// member name follows on the same line.
fn parse_modifier(p: &mut Parser, allowed: &[&'static str]) -> ParseResult<Option<&'static str>> {
    if !p.is(TokenType::Name) || p.state().contains_esc {
        return Ok(None);
    }
    let Some(modifier) = allowed.iter().copied().find(|m| *m == p.value()) else {
        return Ok(None);
    };
    Ok(p.try_parse(|p| {
        p.next()?;
        let follows = !p.has_preceding_line_break()
            && (p.starts_property_name()
                || matches!(p.cur(), TokenType::BraceL | TokenType::Star | TokenType::Ellipsis));
        Ok(follows.then_some(modifier))
    }))
}

/// `[key: T]: U`, when the bracket unambiguously opens one.
fn try_parse_index_signature(p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
    let is_index = p.is(TokenType::BracketL)
        && look_ahead(p, |p| {
            p.next()?;
            Ok(p.eat(TokenType::Name)? && p.is(TokenType::Colon))
        });
    if !is_index {
        return Ok(None);
    }
    p.expect(TokenType::BracketL)?;
    let mut id = p.parse_identifier(false)?;
    let annotation = parse_type_annotation(p)?;
    if let Some(slot) = id.kind.type_annotation_slot() {
        *slot = Some(Box::new(annotation));
    }
    p.reset_end(&mut id);
    p.expect(TokenType::BracketR)?;
    let type_annotation = try_parse_type_annotation(p)?;
    parse_type_member_semicolon(p)?;
    Ok(Some(p.finish_node(
        start,
        NodeKind::TSIndexSignature { parameters: vec![id], type_annotation, readonly: false, r#static: false },
    )))
}

/// Type parameters, a parenthesized parameter list and the return type
/// introduced by `return_token`, which is required after `=>`.
fn fill_signature(
    p: &mut Parser,
    return_token: TokenType,
) -> ParseResult<(Option<Box<Node>>, Vec<Node>, Option<Box<Node>>)> {
    let type_parameters = try_parse_type_parameters(p)?;
    p.expect(TokenType::ParenL)?;
    let mut parameters = Vec::new();
    for pattern in p.parse_binding_list(TokenType::ParenR, false, false)?.into_iter().flatten() {
        if !matches!(
            pattern.kind,
            NodeKind::Identifier { .. }
                | NodeKind::RestElement { .. }
                | NodeKind::ObjectPattern { .. }
                | NodeKind::ArrayPattern { .. }
        ) {
            return Err(p.raise(pattern.start, &messages::TS_UNSUPPORTED_SIGNATURE_PARAMETER, &[pattern.type_name()]));
        }
        parameters.push(pattern);
    }
    let type_annotation = if return_token == TokenType::Arrow || p.is(return_token) {
        Some(Box::new(parse_type_or_predicate_annotation(p, return_token)?))
    } else {
        None
    };
    Ok((type_parameters, parameters, type_annotation))
}

// ============================================================================
// Type annotations
// ============================================================================

/// `: T`, starting at the colon.
fn parse_type_annotation(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let type_annotation = p.in_type(|p| {
        p.expect(TokenType::Colon)?;
        parse_type(p)
    })?;
    Ok(p.finish_node(start, NodeKind::TSTypeAnnotation { type_annotation: Box::new(type_annotation) }))
}

fn try_parse_type_annotation(p: &mut Parser) -> ParseResult<Option<Box<Node>>> {
    if !p.is(TokenType::Colon) {
        return Ok(None);
    }
    Ok(Some(Box::new(parse_type_annotation(p)?)))
}

/// A type with no leading token, wrapped as an annotation.
fn parse_bare_type_annotation(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let type_annotation = parse_type(p)?;
    Ok(p.finish_node(start, NodeKind::TSTypeAnnotation { type_annotation: Box::new(type_annotation) }))
}

/// A return type after `return_token`, which may be a type predicate:
/// `x is T`, `asserts x`, `asserts x is T` or `asserts this`.
fn parse_type_or_predicate_annotation(p: &mut Parser, return_token: TokenType) -> ParseResult<Node> {
    p.in_type(|p| {
        let start = p.start_node();
        p.expect(return_token)?;
        let asserts = p
            .try_parse(|p| {
                if !p.is_contextual("asserts") || p.has_preceding_line_break() {
                    return Ok(None);
                }
                p.next()?;
                Ok((p.is(TokenType::Name) || p.is(TokenType::This)).then_some(()))
            })
            .is_some();

        let annotation = if asserts && p.is(TokenType::This) {
            let parameter_name = parse_this_type(p)?;
            let type_annotation = if p.is_contextual("is") && !p.has_preceding_line_break() {
                p.next()?;
                Some(Box::new(parse_bare_type_annotation(p)?))
            } else {
                None
            };
            p.finish_node(
                start,
                NodeKind::TSTypePredicate { parameter_name: Box::new(parameter_name), type_annotation, asserts },
            )
        } else if let Some(parameter_name) = try_parse_predicate_prefix(p) {
            let type_annotation = parse_bare_type_annotation(p)?;
            p.finish_node(
                start,
                NodeKind::TSTypePredicate {
                    parameter_name: Box::new(parameter_name),
                    type_annotation: Some(Box::new(type_annotation)),
                    asserts,
                },
            )
        } else if asserts {
            let parameter_name = p.parse_identifier(false)?;
            p.finish_node(
                start,
                NodeKind::TSTypePredicate { parameter_name: Box::new(parameter_name), type_annotation: None, asserts },
            )
        } else {
            parse_type(p)?
        };
        Ok(p.finish_node(start, NodeKind::TSTypeAnnotation { type_annotation: Box::new(annotation) }))
    })
}

/// `x is`, consumed only when both tokens are there.
fn try_parse_predicate_prefix(p: &mut Parser) -> Option<Node> {
    if !p.is(TokenType::Name) {
        return None;
    }
    p.try_parse(|p| {
        let id = p.parse_identifier(false)?;
        if !p.is_contextual("is") || p.has_preceding_line_break() {
            return Ok(None);
        }
        p.next()?;
        Ok(Some(id))
    })
}

// ============================================================================
// Types
// ============================================================================

/// A type, including a conditional `A extends B ? C : D`. Runs with
/// `in_type` set.
fn parse_type(p: &mut Parser) -> ParseResult<Node> {
    let check_type = parse_non_conditional_type(p)?;
    if p.has_preceding_line_break() || !p.is(TokenType::Extends) {
        return Ok(check_type);
    }
    p.next()?;
    let start = NodeStart::of(&check_type);
    let extends_type = parse_non_conditional_type(p)?;
    p.expect(TokenType::Question)?;
    let true_type = parse_type(p)?;
    p.expect(TokenType::Colon)?;
    let false_type = parse_type(p)?;
    Ok(p.finish_node(
        start,
        NodeKind::TSConditionalType {
            check_type: Box::new(check_type),
            extends_type: Box::new(extends_type),
            true_type: Box::new(true_type),
            false_type: Box::new(false_type),
        },
    ))
}

/// A type, or `const` in `x as const` and `<const>x`.
fn parse_type_or_const(p: &mut Parser) -> ParseResult<Node> {
    if !p.is(TokenType::Const) {
        return parse_type(p);
    }
    let start = p.start_node();
    let type_name = p.parse_identifier(true)?;
    Ok(p.finish_node(start, NodeKind::TSTypeReference { type_name: Box::new(type_name), type_parameters: None }))
}

fn parse_non_conditional_type(p: &mut Parser) -> ParseResult<Node> {
    if is_start_of_function_type(p) {
        return parse_function_or_constructor_type(p, false);
    }
    if p.is(TokenType::New) {
        return parse_function_or_constructor_type(p, true);
    }
    parse_union_or_intersection(p, true)
}

fn parse_function_or_constructor_type(p: &mut Parser, is_constructor: bool) -> ParseResult<Node> {
    let start = p.start_node();
    if is_constructor {
        p.expect(TokenType::New)?;
    }
    let (type_parameters, parameters, type_annotation) = fill_signature(p, TokenType::Arrow)?;
    let kind = if is_constructor {
        NodeKind::TSConstructorType { type_parameters, parameters, type_annotation }
    } else {
        NodeKind::TSFunctionType { type_parameters, parameters, type_annotation }
    };
    Ok(p.finish_node(start, kind))
}

/// `<` always starts a function type; `(` does when what follows can only
/// be a parameter list.
fn is_start_of_function_type(p: &mut Parser) -> bool {
    if p.is_relational("<") {
        return true;
    }
    p.is(TokenType::ParenL)
        && look_ahead(p, |p| {
            p.next()?;
            if p.is(TokenType::ParenR) || p.is(TokenType::Ellipsis) {
                return Ok(true);
            }
            if !skip_parameter_start(p)? {
                return Ok(false);
            }
            if matches!(p.cur(), TokenType::Colon | TokenType::Comma | TokenType::Question | TokenType::Eq) {
                return Ok(true);
            }
            Ok(p.eat(TokenType::ParenR)? && p.is(TokenType::Arrow))
        })
}

fn skip_parameter_start(p: &mut Parser) -> ParseResult<bool> {
    match p.cur() {
        TokenType::Name | TokenType::This => {
            p.next()?;
            Ok(true)
        }
        TokenType::BraceL => {
            p.parse_obj(true, None)?;
            Ok(true)
        }
        TokenType::BracketL => {
            p.next()?;
            p.parse_binding_list(TokenType::BracketR, true, false)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// `A | B` (with `union`) over `A & B` over type operators. A leading
/// operator is allowed; a single member is returned as it is.
fn parse_union_or_intersection(p: &mut Parser, union: bool) -> ParseResult<Node> {
    let operator = if union { TokenType::BitwiseOr } else { TokenType::BitwiseAnd };
    let constituent = |p: &mut Parser| {
        if union {
            parse_union_or_intersection(p, false)
        } else {
            parse_type_operator_or_higher(p)
        }
    };

    p.eat(operator)?;
    let first = constituent(p)?;
    if !p.is(operator) {
        return Ok(first);
    }
    let start = NodeStart::of(&first);
    let mut types = vec![first];
    while p.eat(operator)? {
        types.push(constituent(p)?);
    }
    let kind = if union { NodeKind::TSUnionType { types } } else { NodeKind::TSIntersectionType { types } };
    Ok(p.finish_node(start, kind))
}

fn parse_type_operator_or_higher(p: &mut Parser) -> ParseResult<Node> {
    let operator = ["keyof", "unique", "readonly"].into_iter().find(|op| p.is_contextual(op));
    if let Some(operator) = operator {
        let start = p.start_node();
        p.next()?;
        let type_annotation = parse_type_operator_or_higher(p)?;
        if operator == "readonly"
            && !matches!(type_annotation.kind, NodeKind::TSArrayType { .. } | NodeKind::TSTupleType { .. })
        {
            return Err(p.raise(start.pos, &messages::TS_READONLY_NOT_ARRAY, &[]));
        }
        return Ok(p.finish_node(
            start,
            NodeKind::TSTypeOperator { operator, type_annotation: Box::new(type_annotation) },
        ));
    }

    if p.is_contextual("infer") {
        let start = p.start_node();
        p.next()?;
        let parameter_start = p.start_node();
        let name = p.parse_identifier_name(false)?;
        let type_parameter =
            p.finish_node(parameter_start, NodeKind::TSTypeParameter { name, constraint: None, r#default: None });
        return Ok(p.finish_node(start, NodeKind::TSInferType { type_parameter: Box::new(type_parameter) }));
    }

    parse_array_type_or_higher(p)
}

/// `T[]` and `T[K]` suffixes, which may not start a new line.
fn parse_array_type_or_higher(p: &mut Parser) -> ParseResult<Node> {
    let mut ty = parse_non_array_type(p)?;
    while !p.has_preceding_line_break() && p.eat(TokenType::BracketL)? {
        let start = NodeStart::of(&ty);
        if p.eat(TokenType::BracketR)? {
            ty = p.finish_node(start, NodeKind::TSArrayType { element_type: Box::new(ty) });
        } else {
            let index_type = parse_type(p)?;
            p.expect(TokenType::BracketR)?;
            ty = p.finish_node(
                start,
                NodeKind::TSIndexedAccessType { object_type: Box::new(ty), index_type: Box::new(index_type) },
            );
        }
    }
    Ok(ty)
}

fn keyword_type(name: &str) -> Option<NodeKind> {
    Some(match name {
        "any" => NodeKind::TSAnyKeyword {},
        "unknown" => NodeKind::TSUnknownKeyword {},
        "boolean" => NodeKind::TSBooleanKeyword {},
        "bigint" => NodeKind::TSBigIntKeyword {},
        "never" => NodeKind::TSNeverKeyword {},
        "number" => NodeKind::TSNumberKeyword {},
        "object" => NodeKind::TSObjectKeyword {},
        "string" => NodeKind::TSStringKeyword {},
        "symbol" => NodeKind::TSSymbolKeyword {},
        "undefined" => NodeKind::TSUndefinedKeyword {},
        _ => return None,
    })
}

fn parse_non_array_type(p: &mut Parser) -> ParseResult<Node> {
    match p.cur() {
        TokenType::Name | TokenType::Void | TokenType::Null => {
            let keyword = match p.cur() {
                TokenType::Void => Some(NodeKind::TSVoidKeyword {}),
                TokenType::Null => Some(NodeKind::TSNullKeyword {}),
                _ => keyword_type(p.value()),
            };
            let next_char = p.tok.char_at(p.tok.next_token_start());
            match keyword {
                Some(kind) if next_char != Some('.') => {
                    let start = p.start_node();
                    p.next()?;
                    Ok(p.finish_node(start, kind))
                }
                _ => parse_type_reference(p),
            }
        }
        TokenType::String | TokenType::Num | TokenType::BigInt | TokenType::True | TokenType::False => {
            let start = p.start_node();
            let literal = p.parse_expr_atom(None)?;
            Ok(p.finish_node(start, NodeKind::TSLiteralType { literal: Box::new(literal) }))
        }
        TokenType::PlusMin if p.value() == "-" => {
            let start = p.start_node();
            let next = p.lookahead()?.token_type;
            if next != TokenType::Num && next != TokenType::BigInt {
                return Err(p.unexpected());
            }
            let literal = p.parse_maybe_unary(None)?;
            Ok(p.finish_node(start, NodeKind::TSLiteralType { literal: Box::new(literal) }))
        }
        TokenType::BackQuote => {
            let start = p.start_node();
            let literal = p.parse_template(false)?;
            if matches!(&literal.kind, NodeKind::TemplateLiteral { expressions, .. } if !expressions.is_empty()) {
                return Err(p.raise(literal.start, &messages::TS_TEMPLATE_TYPE_SUBSTITUTION, &[]));
            }
            Ok(p.finish_node(start, NodeKind::TSLiteralType { literal: Box::new(literal) }))
        }
        TokenType::This => {
            let this = parse_this_type(p)?;
            if !p.is_contextual("is") || p.has_preceding_line_break() {
                return Ok(this);
            }
            p.next()?;
            let start = NodeStart::of(&this);
            let type_annotation = parse_bare_type_annotation(p)?;
            Ok(p.finish_node(
                start,
                NodeKind::TSTypePredicate {
                    parameter_name: Box::new(this),
                    type_annotation: Some(Box::new(type_annotation)),
                    asserts: false,
                },
            ))
        }
        TokenType::Typeof => {
            let start = p.start_node();
            p.next()?;
            let expr_name = parse_entity_name(p, true)?;
            Ok(p.finish_node(start, NodeKind::TSTypeQuery { expr_name: Box::new(expr_name) }))
        }
        TokenType::BraceL => {
            if look_ahead(p, is_start_of_mapped_type) {
                parse_mapped_type(p)
            } else {
                let start = p.start_node();
                let members = parse_object_type_members(p)?;
                Ok(p.finish_node(start, NodeKind::TSTypeLiteral { members }))
            }
        }
        TokenType::BracketL => parse_tuple_type(p),
        TokenType::ParenL => {
            let start = p.start_node();
            p.next()?;
            let type_annotation = parse_type(p)?;
            p.expect(TokenType::ParenR)?;
            Ok(p.finish_node(start, NodeKind::TSParenthesizedType { type_annotation: Box::new(type_annotation) }))
        }
        _ => Err(p.unexpected()),
    }
}

fn parse_this_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.expect(TokenType::This)?;
    Ok(p.finish_node(start, NodeKind::TSThisType {}))
}

fn parse_type_reference(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let type_name = parse_entity_name(p, false)?;
    let type_parameters = if !p.has_preceding_line_break() && p.is_relational("<") {
        Some(Box::new(parse_type_arguments(p)?))
    } else {
        None
    };
    Ok(p.finish_node(start, NodeKind::TSTypeReference { type_name: Box::new(type_name), type_parameters }))
}

/// `A.B.C` as nested qualified names. Segments after a dot may be reserved
/// words when `allow_reserved` is set.
fn parse_entity_name(p: &mut Parser, allow_reserved: bool) -> ParseResult<Node> {
    let mut entity = p.parse_identifier(false)?;
    while p.eat(TokenType::Dot)? {
        let start = NodeStart::of(&entity);
        let right = p.parse_identifier(allow_reserved)?;
        entity = p.finish_node(start, NodeKind::TSQualifiedName { left: Box::new(entity), right: Box::new(right) });
    }
    Ok(entity)
}

fn is_start_of_mapped_type(p: &mut Parser) -> ParseResult<bool> {
    p.next()?;
    if p.eat(TokenType::PlusMin)? {
        return Ok(p.is_contextual("readonly"));
    }
    if p.is_contextual("readonly") {
        p.next()?;
    }
    if !p.eat(TokenType::BracketL)? || !p.eat(TokenType::Name)? {
        return Ok(false);
    }
    Ok(p.is(TokenType::In))
}

/// A `+`/`-` sigil in front of a mapped type modifier.
fn mapped_modifier_sign(p: &mut Parser) -> ParseResult<Option<MappedModifier>> {
    if !p.is(TokenType::PlusMin) {
        return Ok(None);
    }
    let sign = if p.value() == "+" { MappedModifier::Plus } else { MappedModifier::Minus };
    p.next()?;
    Ok(Some(sign))
}

/// `{ readonly [K in T]?: U }`
fn parse_mapped_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.expect(TokenType::BraceL)?;

    let readonly = match mapped_modifier_sign(p)? {
        Some(sign) => {
            p.expect_contextual("readonly")?;
            Some(sign)
        }
        None => p.eat_contextual("readonly")?.then_some(MappedModifier::True),
    };

    p.expect(TokenType::BracketL)?;
    let parameter_start = p.start_node();
    let name = p.parse_identifier_name(false)?;
    p.expect(TokenType::In)?;
    let constraint = parse_type(p)?;
    let type_parameter = p.finish_node(
        parameter_start,
        NodeKind::TSTypeParameter { name, constraint: Some(Box::new(constraint)), r#default: None },
    );
    p.expect(TokenType::BracketR)?;

    let optional = match mapped_modifier_sign(p)? {
        Some(sign) => {
            p.expect(TokenType::Question)?;
            Some(sign)
        }
        None => p.eat(TokenType::Question)?.then_some(MappedModifier::True),
    };
    let type_annotation = if p.eat(TokenType::Colon)? { Some(Box::new(parse_type(p)?)) } else { None };
    p.semicolon()?;
    p.expect(TokenType::BraceR)?;

    Ok(p.finish_node(
        start,
        NodeKind::TSMappedType { readonly, type_parameter: Box::new(type_parameter), optional, type_annotation },
    ))
}

/// `[A, B?, ...C[]]`. Required elements may not follow optional ones, and
/// only one rest element is allowed.
fn parse_tuple_type(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    p.expect(TokenType::BracketL)?;
    let element_types = parse_delimited_list(p, TokenType::BracketR, |p| {
        if p.is(TokenType::Ellipsis) {
            let start = p.start_node();
            p.next()?;
            let type_annotation = parse_type(p)?;
            return Ok(p.finish_node(start, NodeKind::TSRestType { type_annotation: Box::new(type_annotation) }));
        }
        let ty = parse_type(p)?;
        if !p.eat(TokenType::Question)? {
            return Ok(ty);
        }
        let start = NodeStart::of(&ty);
        Ok(p.finish_node(start, NodeKind::TSOptionalType { type_annotation: Box::new(ty) }))
    })?;
    p.expect(TokenType::BracketR)?;

    let mut seen_optional = false;
    let mut seen_rest = false;
    for element in &element_types {
        match element.kind {
            NodeKind::TSOptionalType { .. } => seen_optional = true,
            NodeKind::TSRestType { .. } => {
                if seen_rest {
                    return Err(p.raise(element.start, &messages::TS_ONLY_ONE_REST_IN_TUPLE, &[]));
                }
                seen_rest = true;
            }
            _ if seen_optional => {
                return Err(p.raise(element.start, &messages::TS_OPTIONAL_AFTER_REST, &[]));
            }
            _ => {}
        }
    }
    Ok(p.finish_node(start, NodeKind::TSTupleType { element_types }))
}

// ============================================================================
// Object type members
// ============================================================================

fn parse_object_type_members(p: &mut Parser) -> ParseResult<Vec<Node>> {
    p.expect(TokenType::BraceL)?;
    let mut members = Vec::new();
    while !p.is(TokenType::BraceR) {
        members.push(parse_type_member(p)?);
    }
    p.expect(TokenType::BraceR)?;
    Ok(members)
}

fn parse_type_member_semicolon(p: &mut Parser) -> ParseResult<()> {
    if p.eat(TokenType::Comma)? {
        return Ok(());
    }
    p.semicolon()
}

fn parse_type_member(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    if p.is(TokenType::ParenL) || p.is_relational("<") {
        return parse_signature_member(p, start, false);
    }
    if p.is(TokenType::New) {
        let key_start = p.start_node();
        p.next()?;
        if p.is(TokenType::ParenL) || p.is_relational("<") {
            return parse_signature_member(p, start, true);
        }
        let key = p.finish_node(key_start, NodeKind::identifier("new".to_string()));
        return parse_property_or_method_signature(p, start, key, false, false);
    }

    if let Some(modifier) = parse_modifier(p, &["public", "private", "protected", "static", "declare", "abstract"])? {
        return Err(p.raise(start.pos, &messages::TS_INVALID_MODIFIER_ON_TYPE_MEMBER, &[modifier]));
    }
    let readonly = parse_modifier(p, &["readonly"])?.is_some();
    if let Some(mut signature) = try_parse_index_signature(p, start)? {
        if let NodeKind::TSIndexSignature { readonly: slot, .. } = &mut signature.kind {
            *slot = readonly;
        }
        return Ok(signature);
    }
    let (key, computed) = p.parse_property_name()?;
    parse_property_or_method_signature(p, start, key, computed, readonly)
}

fn parse_signature_member(p: &mut Parser, start: NodeStart, is_construct: bool) -> ParseResult<Node> {
    let (type_parameters, parameters, type_annotation) = fill_signature(p, TokenType::Colon)?;
    parse_type_member_semicolon(p)?;
    let kind = if is_construct {
        NodeKind::TSConstructSignatureDeclaration { type_parameters, parameters, type_annotation }
    } else {
        NodeKind::TSCallSignatureDeclaration { type_parameters, parameters, type_annotation }
    };
    Ok(p.finish_node(start, kind))
}

fn parse_property_or_method_signature(
    p: &mut Parser,
    start: NodeStart,
    key: Node,
    computed: bool,
    readonly: bool,
) -> ParseResult<Node> {
    let optional = p.eat(TokenType::Question)?;
    let key = Box::new(key);
    if !readonly && (p.is(TokenType::ParenL) || p.is_relational("<")) {
        let (type_parameters, parameters, type_annotation) = fill_signature(p, TokenType::Colon)?;
        parse_type_member_semicolon(p)?;
        return Ok(p.finish_node(
            start,
            NodeKind::TSMethodSignature { key, computed, optional, type_parameters, parameters, type_annotation },
        ));
    }
    let type_annotation = try_parse_type_annotation(p)?;
    parse_type_member_semicolon(p)?;
    Ok(p.finish_node(
        start,
        NodeKind::TSPropertySignature { key, computed, optional, readonly, type_annotation, initializer: None },
    ))
}

// ============================================================================
// Type parameters and arguments
// ============================================================================

/// Elements separated by commas up to (not including) `close`. A trailing
/// comma is allowed.
fn parse_delimited_list(
    p: &mut Parser,
    close: TokenType,
    mut element: impl FnMut(&mut Parser) -> ParseResult<Node>,
) -> ParseResult<Vec<Node>> {
    let is_close = |p: &Parser| {
        if close == TokenType::Relational {
            p.is_relational(">")
        } else {
            p.is(close)
        }
    };
    let mut list = Vec::new();
    while !is_close(p) {
        list.push(element(p)?);
        if p.eat(TokenType::Comma)? {
            continue;
        }
        if !is_close(p) {
            return Err(p.unexpected_expecting(TokenType::Comma));
        }
    }
    Ok(list)
}

fn try_parse_type_parameters(p: &mut Parser) -> ParseResult<Option<Box<Node>>> {
    if !p.is_relational("<") {
        return Ok(None);
    }
    Ok(Some(Box::new(parse_type_parameters(p)?)))
}

/// `<T extends U = V, ...>`. The `<` may have been read as a JSX tag start.
fn parse_type_parameters(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    if !at_type_parameters_start(p) {
        return Err(p.unexpected());
    }
    p.next()?;
    let params = parse_delimited_list(p, TokenType::Relational, |p| {
        let start = p.start_node();
        let name = p.parse_identifier_name(false)?;
        let constraint = eat_then_parse_type(p, TokenType::Extends)?;
        let default = eat_then_parse_type(p, TokenType::Eq)?;
        Ok(p.finish_node(start, NodeKind::TSTypeParameter { name, constraint, r#default: default }))
    })?;
    if params.is_empty() {
        return Err(p.raise(start.pos, &messages::TS_EMPTY_TYPE_PARAMETERS, &[]));
    }
    p.expect_relational(">")?;
    Ok(p.finish_node(start, NodeKind::TSTypeParameterDeclaration { params }))
}

fn eat_then_parse_type(p: &mut Parser, token: TokenType) -> ParseResult<Option<Box<Node>>> {
    if !p.is(token) {
        return Ok(None);
    }
    let ty = p.in_type(|p| {
        p.next()?;
        parse_type(p)
    })?;
    Ok(Some(Box::new(ty)))
}

/// `<A, B>` after a type name, callee or JSX element name. The list is
/// read in type mode with the token contexts of the surrounding expression
/// set aside.
pub(crate) fn parse_type_arguments(p: &mut Parser) -> ParseResult<Node> {
    let start = p.start_node();
    let params = p.in_type(|p| {
        let base = p.tok.state.context.first().copied();
        let outer = mem::replace(&mut p.tok.state.context, base.into_iter().collect());
        let params = p
            .expect_relational("<")
            .and_then(|()| parse_delimited_list(p, TokenType::Relational, parse_type));
        p.tok.state.context = outer;
        params
    })?;
    if params.is_empty() {
        return Err(p.raise(start.pos, &messages::TS_EMPTY_TYPE_ARGUMENTS, &[]));
    }
    p.tok.state.expr_allowed = false;
    p.expect_relational(">")?;
    Ok(p.finish_node(start, NodeKind::TSTypeParameterInstantiation { params }))
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::{parse, parse_expression};
    use ecma_ast::{MappedModifier, Node, NodeKind, SourceType};
    use ecma_scanner::Plugin;

    fn ts() -> ParserOptions {
        ParserOptions::default().with_plugins([Plugin::Typescript])
    }

    fn ts_module() -> ParserOptions {
        ts().with_source_type(SourceType::Module)
    }

    fn body_with(source: &str, options: ParserOptions) -> Vec<Node> {
        let file = parse(source, options).unwrap();
        let NodeKind::File { program, .. } = file.kind else {
            panic!("expected a file");
        };
        let NodeKind::Program { body, .. } = program.kind else {
            panic!("expected a program");
        };
        body
    }

    fn body(source: &str) -> Vec<Node> {
        body_with(source, ts())
    }

    fn error(source: &str) -> String {
        parse(source, ts()).unwrap_err().message
    }

    fn types(nodes: &[Node]) -> Vec<&'static str> {
        nodes.iter().map(Node::type_name).collect()
    }

    fn alias_type(source: &str) -> Node {
        let mut body = body(source);
        let NodeKind::TSTypeAliasDeclaration { type_annotation, .. } = body.remove(0).kind else {
            panic!("expected a type alias");
        };
        *type_annotation
    }

    #[test]
    fn test_variable_and_parameter_annotations() {
        let body = body("let x: number = 1; function f(a?: string, ...rest: number[]): void {}");
        let NodeKind::VariableDeclaration { declarations, .. } = &body[0].kind else {
            panic!("expected a variable declaration");
        };
        let NodeKind::VariableDeclarator { id, .. } = &declarations[0].kind else {
            panic!("expected a declarator");
        };
        let NodeKind::Identifier { type_annotation: Some(annotation), .. } = &id.kind else {
            panic!("expected an annotated identifier");
        };
        assert!(matches!(&annotation.kind, NodeKind::TSTypeAnnotation { type_annotation } if type_annotation.type_name() == "TSNumberKeyword"));

        let NodeKind::FunctionDeclaration { function } = &body[1].kind else {
            panic!("expected a function");
        };
        assert!(matches!(&function.params[0].kind, NodeKind::Identifier { optional: true, type_annotation: Some(_), .. }));
        assert!(matches!(&function.params[1].kind, NodeKind::RestElement { type_annotation: Some(_), .. }));
        assert!(function.return_type.is_some());
    }

    #[test]
    fn test_definite_assignment() {
        let body = body("let x!: number;");
        let NodeKind::VariableDeclaration { declarations, .. } = &body[0].kind else {
            panic!("expected a variable declaration");
        };
        assert!(matches!(&declarations[0].kind, NodeKind::VariableDeclarator { definite: true, init: None, .. }));
    }

    #[test]
    fn test_generic_arrow_and_type_assertion() {
        let arrow = parse_expression("<T>(x: T): T => x", ts()).unwrap();
        let NodeKind::ArrowFunctionExpression { function, .. } = &arrow.kind else {
            panic!("expected an arrow, got {}", arrow.type_name());
        };
        assert!(function.type_parameters.is_some());
        assert!(function.return_type.is_some());
        assert_eq!(arrow.start, 0);

        let assertion = parse_expression("<any>value", ts()).unwrap();
        assert_eq!(assertion.type_name(), "TSTypeAssertion");
    }

    #[test]
    fn test_generic_arrow_in_tsx() {
        let options = ParserOptions::default().with_plugins([Plugin::Typescript, Plugin::Jsx]);
        let arrow = parse_expression("<T,>(x: T) => x", options.clone()).unwrap();
        assert_eq!(arrow.type_name(), "ArrowFunctionExpression");
        let element = parse_expression("<div>text</div>", options).unwrap();
        assert_eq!(element.type_name(), "JSXElement");
    }

    #[test]
    fn test_as_and_non_null() {
        let node = parse_expression("x as const", ts()).unwrap();
        let NodeKind::TSAsExpression { type_annotation, .. } = &node.kind else {
            panic!("expected an as expression");
        };
        assert!(matches!(&type_annotation.kind, NodeKind::TSTypeReference { type_name, .. } if type_name.is_identifier("const")));

        let node = parse_expression("a!.b", ts()).unwrap();
        let NodeKind::MemberExpression { object, .. } = &node.kind else {
            panic!("expected a member expression");
        };
        assert_eq!(object.type_name(), "TSNonNullExpression");

        let node = parse_expression("a as any > 1", ts()).unwrap();
        assert!(matches!(&node.kind, NodeKind::BinaryExpression { operator: ">", .. }));
    }

    #[test]
    fn test_call_type_arguments_and_comparisons() {
        let node = parse_expression("f<number>(1)", ts()).unwrap();
        assert!(matches!(&node.kind, NodeKind::CallExpression { type_parameters: Some(_), .. }));

        let node = parse_expression("a < b && c > d", ts()).unwrap();
        let NodeKind::LogicalExpression { left, right, .. } = &node.kind else {
            panic!("expected a logical expression");
        };
        assert_eq!(left.type_name(), "BinaryExpression");
        assert_eq!(right.type_name(), "BinaryExpression");

        let node = parse_expression("new Map<string, number>()", ts()).unwrap();
        assert!(matches!(&node.kind, NodeKind::NewExpression { type_parameters: Some(_), .. }));
    }

    #[test]
    fn test_union_conditional_and_indexed_types() {
        let ty = alias_type("type A<T> = T extends string ? 'a' | 'b' : T[keyof T];");
        let NodeKind::TSConditionalType { true_type, false_type, .. } = &ty.kind else {
            panic!("expected a conditional type");
        };
        assert!(matches!(&true_type.kind, NodeKind::TSUnionType { types } if types.len() == 2));
        assert_eq!(false_type.type_name(), "TSIndexedAccessType");
    }

    #[test]
    fn test_mapped_type() {
        let ty = alias_type("type P<T> = { -readonly [K in keyof T]+?: T[K] };");
        let NodeKind::TSMappedType { readonly, optional, type_parameter, .. } = &ty.kind else {
            panic!("expected a mapped type, got {}", ty.type_name());
        };
        assert_eq!(*readonly, Some(MappedModifier::Minus));
        assert_eq!(*optional, Some(MappedModifier::Plus));
        assert!(matches!(&type_parameter.kind, NodeKind::TSTypeParameter { name, constraint: Some(_), .. } if name == "K"));
    }

    #[test]
    fn test_tuple_types() {
        let ty = alias_type("type T = [number, string?, ...boolean[]];");
        let NodeKind::TSTupleType { element_types } = &ty.kind else {
            panic!("expected a tuple");
        };
        assert_eq!(types(element_types), ["TSNumberKeyword", "TSOptionalType", "TSRestType"]);

        assert_eq!(error("type T = [string?, number];"), "A required element cannot follow an optional element.");
        assert_eq!(error("type T = [...a, ...b];"), "A tuple type cannot contain more than one rest element.");
    }

    #[test]
    fn test_function_and_object_types() {
        let ty = alias_type("type F = (a: number, b?: string) => void;");
        assert!(matches!(&ty.kind, NodeKind::TSFunctionType { parameters, .. } if parameters.len() == 2));

        let ty = alias_type("type G = (string | number)[];");
        assert_eq!(ty.type_name(), "TSArrayType");

        let ty = alias_type("type O = { (x: number): string; new (): O; readonly a: number; m?(): void; [k: string]: any };");
        let NodeKind::TSTypeLiteral { members } = &ty.kind else {
            panic!("expected a type literal");
        };
        assert_eq!(
            types(members),
            [
                "TSCallSignatureDeclaration",
                "TSConstructSignatureDeclaration",
                "TSPropertySignature",
                "TSMethodSignature",
                "TSIndexSignature"
            ]
        );
        assert!(matches!(&members[2].kind, NodeKind::TSPropertySignature { readonly: true, .. }));
    }

    #[test]
    fn test_type_predicates() {
        let body = body("function isString(x: any): x is string { return true; } function check(x: any): asserts x {}");
        let predicate = |node: &Node| -> Node {
            let NodeKind::FunctionDeclaration { function } = &node.kind else {
                panic!("expected a function");
            };
            let return_type = function.return_type.as_ref().unwrap();
            let NodeKind::TSTypeAnnotation { type_annotation } = &return_type.kind else {
                panic!("expected an annotation");
            };
            (**type_annotation).clone()
        };
        assert!(matches!(predicate(&body[0]).kind, NodeKind::TSTypePredicate { asserts: false, type_annotation: Some(_), .. }));
        assert!(matches!(predicate(&body[1]).kind, NodeKind::TSTypePredicate { asserts: true, type_annotation: None, .. }));
    }

    #[test]
    fn test_declarations() {
        let body = body(
            "interface A<T> extends B, C<T> { x: T }\n\
             enum E { A = 1, B }\n\
             const enum F { X }\n\
             namespace N.M { let y = 1; }\n\
             declare module \"m\";\n\
             declare function f(): void;\n\
             declare const c: number;\n\
             type = 1;",
        );
        assert_eq!(
            types(&body),
            [
                "TSInterfaceDeclaration",
                "TSEnumDeclaration",
                "TSEnumDeclaration",
                "TSModuleDeclaration",
                "TSModuleDeclaration",
                "TSDeclareFunction",
                "VariableDeclaration",
                "ExpressionStatement"
            ]
        );
        assert!(matches!(&body[0].kind, NodeKind::TSInterfaceDeclaration { extends, .. } if extends.len() == 2));
        assert!(matches!(&body[2].kind, NodeKind::TSEnumDeclaration { r#const: true, .. }));
        let NodeKind::TSModuleDeclaration { body: Some(inner), .. } = &body[3].kind else {
            panic!("expected a namespace body");
        };
        assert_eq!(inner.type_name(), "TSModuleDeclaration");
        assert!(matches!(&body[4].kind, NodeKind::TSModuleDeclaration { declare: true, body: None, .. }));
        assert!(matches!(&body[5].kind, NodeKind::TSDeclareFunction { declare: true, .. }));
        assert!(matches!(&body[6].kind, NodeKind::VariableDeclaration { declare: true, .. }));
        assert_eq!(body[6].start, body[0].start + "interface A<T> extends B, C<T> { x: T }\nenum E { A = 1, B }\nconst enum F { X }\nnamespace N.M { let y = 1; }\ndeclare module \"m\";\ndeclare function f(): void;\n".len() as u32);
    }

    #[test]
    fn test_class_members() {
        let body = body(
            "abstract class A<T> extends B<T> implements C<T>, D {\n\
               private readonly x: number;\n\
               static y?: string;\n\
               z!: T;\n\
               constructor(public w: string, readonly v = 1) { super(); }\n\
               abstract m(): void;\n\
               [key: string]: any;\n\
             }",
        );
        let NodeKind::ClassDeclaration { class } = &body[0].kind else {
            panic!("expected a class");
        };
        assert!(class.r#abstract);
        assert!(class.type_parameters.is_some() && class.super_type_parameters.is_some());
        assert_eq!(class.implements.len(), 2);

        let NodeKind::ClassBody { body: members } = &class.body.kind else {
            panic!("expected a class body");
        };
        assert_eq!(
            types(members),
            ["ClassProperty", "ClassProperty", "ClassProperty", "ClassMethod", "TSDeclareMethod", "TSIndexSignature"]
        );
        let NodeKind::ClassProperty { modifiers, .. } = &members[0].kind else {
            panic!("expected a property");
        };
        assert_eq!(modifiers.accessibility, Some("private"));
        assert!(modifiers.readonly);
        assert!(matches!(&members[1].kind, NodeKind::ClassProperty { modifiers, .. } if modifiers.r#static && modifiers.optional));
        assert!(matches!(&members[2].kind, NodeKind::ClassProperty { modifiers, .. } if modifiers.definite));

        let NodeKind::ClassMethod { function, .. } = &members[3].kind else {
            panic!("expected the constructor");
        };
        assert!(matches!(
            &function.params[0].kind,
            NodeKind::TSParameterProperty { accessibility: Some("public"), readonly: false, .. }
        ));
        assert!(matches!(
            &function.params[1].kind,
            NodeKind::TSParameterProperty { accessibility: None, readonly: true, parameter } if parameter.type_name() == "AssignmentPattern"
        ));
    }

    #[test]
    fn test_modules() {
        let body = body_with(
            "import fs = require(\"fs\");\n\
             import type { A } from \"./a\";\n\
             export interface I {}\n\
             export type { A };\n\
             export = fs;",
            ts_module(),
        );
        assert_eq!(
            types(&body),
            [
                "TSImportEqualsDeclaration",
                "ImportDeclaration",
                "ExportNamedDeclaration",
                "ExportNamedDeclaration",
                "TSExportAssignment"
            ]
        );
        assert!(matches!(&body[1].kind, NodeKind::ImportDeclaration { import_kind: Some("type"), .. }));
        assert!(matches!(&body[2].kind, NodeKind::ExportNamedDeclaration { export_kind: Some("type"), .. }));
        assert!(matches!(&body[3].kind, NodeKind::ExportNamedDeclaration { export_kind: Some("type"), declaration: None, .. }));

        // Allowed in a script too.
        let body = body_with("import x = A.B.C;", ts());
        assert!(matches!(&body[0].kind, NodeKind::TSImportEqualsDeclaration { is_export: false, .. }));
    }

    #[test]
    fn test_errors() {
        assert_eq!(error("let x: Array<> = [];"), "Type argument list cannot be empty.");
        assert_eq!(error("function f<>() {}"), "Type parameter list cannot be empty.");
        assert_eq!(error("function f(public x) {}"), "A parameter property is only allowed in a constructor implementation.");
        assert_eq!(error("class A { readonly m() {} }"), "Class methods cannot have the 'readonly' modifier.");
        assert_eq!(error("class A { constructor<T>() {} }"), "Type parameters cannot appear on a constructor declaration.");
        assert_eq!(error("class A { public private x; }"), "Accessibility modifier already seen.");
        assert_eq!(error("type T = readonly string;"), "'readonly' type modifier is only permitted on array and tuple literal types.");
        assert_eq!(error("class A extends B implements {}"), "'implements' list cannot be empty.");
        assert_eq!(error("(x: number);"), "Did not expect a type annotation here.");
    }

    #[test]
    fn test_optional_arrow_parameters() {
        let node = parse_expression("(a?: number, b?) => a", ts()).unwrap();
        let NodeKind::ArrowFunctionExpression { function, .. } = &node.kind else {
            panic!("expected an arrow, got {}", node.type_name());
        };
        assert!(matches!(&function.params[0].kind, NodeKind::Identifier { optional: true, type_annotation: Some(_), .. }));
        assert!(matches!(&function.params[1].kind, NodeKind::Identifier { optional: true, type_annotation: None, .. }));

        let node = parse_expression("(a ? b : c)", ts()).unwrap();
        assert_eq!(node.type_name(), "ConditionalExpression");
    }
}
