//! Dialect hooks.
//!
//! A dialect (JSX, Flow, TypeScript, ESTree) extends the base grammar by
//! implementing [`Dialect`]. The parser consults the enabled dialects at fixed
//! points, in the order typescript, flow, jsx, estree; the first dialect that
//! handles a point wins and the base rule runs only if none does. Every
//! method has a default that declines, so a dialect implements only the
//! points it cares about.

use crate::expression::ExpressionErrors;
use crate::node_builder::NodeStart;
use crate::parser::Parser;
use ecma_ast::{Class, MemberModifiers, Node};
use ecma_diagnostics::ParseResult;
use ecma_scanner::{Plugin, Tokenizer, TokenizerHook};

/// Outcome of a hook that takes ownership of a node: either the dialect
/// produced the final node, or it hands the input back untouched.
#[derive(Debug)]
pub enum Hook<T> {
    Done(T),
    Pass(T),
}

/// A function's return annotation and Flow predicate.
#[derive(Debug, Default)]
pub struct ReturnSignature {
    pub return_type: Option<Node>,
    pub predicate: Option<Node>,
}

/// Where a statement appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementContext {
    /// Declarations are allowed (statement lists, not `if` bodies).
    pub declaration: bool,
    pub top_level: bool,
    /// A sloppy-mode function declaration may stand alone here, as the body
    /// of an `if` or a label.
    pub sloppy_function: bool,
}

impl StatementContext {
    pub const TOP_LEVEL: Self = Self { declaration: true, top_level: true, sloppy_function: true };
    pub const BLOCK: Self = Self { declaration: true, top_level: false, sloppy_function: true };
    /// The body of a loop or `with`.
    pub const BODY: Self = Self { declaration: false, top_level: false, sloppy_function: false };
    /// The body of an `if` or a labeled statement.
    pub const IF_OR_LABEL: Self = Self { declaration: false, top_level: false, sloppy_function: true };
}

/// What an assignment-target check made of a node.
pub enum LvalCheck<'n> {
    /// Not a dialect node; the base rules apply.
    NotMine,
    /// Check this inner node instead.
    Inner(&'n Node),
}

#[allow(unused_variables)]
pub trait Dialect: Sync {
    fn plugin(&self) -> Plugin;

    fn tokenizer_hook(&self) -> Option<&'static dyn TokenizerHook> {
        None
    }

    // -- Expressions --

    /// An assignment expression starting at a token the base grammar
    /// misreads, such as the `<` of a generic arrow.
    fn maybe_assign(&self, p: &mut Parser, no_in: bool) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    fn maybe_unary(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    fn primary_expression(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// An infix operator after `left`.
    fn binary_operator(
        &self,
        p: &mut Parser,
        left: Node,
        left_start: NodeStart,
        min_prec: u8,
        no_in: bool,
    ) -> ParseResult<Hook<Node>> {
        Ok(Hook::Pass(left))
    }

    /// A subscript after `base`. Set `stop` when no further subscripts may
    /// follow.
    fn subscript(
        &self,
        p: &mut Parser,
        base: Node,
        start: NodeStart,
        no_calls: bool,
        stop: &mut bool,
    ) -> ParseResult<Hook<Node>> {
        Ok(Hook::Pass(base))
    }

    /// An item inside parentheses, such as a type cast `(x: T)`.
    fn paren_item(&self, p: &mut Parser, expr: Node, start: NodeStart) -> ParseResult<Hook<Node>> {
        Ok(Hook::Pass(expr))
    }

    /// A return annotation between arrow parameters and `=>`. Must decline
    /// unless the annotation is followed by `=>`.
    fn arrow_return_type(&self, p: &mut Parser) -> ParseResult<Option<ReturnSignature>> {
        Ok(None)
    }

    /// The `?` after `test`.
    fn conditional(
        &self,
        p: &mut Parser,
        test: Node,
        start: NodeStart,
        no_in: bool,
        errors: &mut ExpressionErrors,
    ) -> ParseResult<Hook<Node>> {
        Ok(Hook::Pass(test))
    }

    /// Check an expression used as a value, e.g. reject a bare type cast.
    fn check_referenced(&self, p: &Parser, expr: &Node) -> ParseResult<()> {
        Ok(())
    }

    // -- Statements and modules --

    fn statement_keyword(&self, p: &mut Parser, context: StatementContext) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// The rest of an `export` declaration; `export` is already consumed.
    fn export_declaration(&self, p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// The rest of an `import` declaration; `import` is already consumed.
    fn import_declaration(&self, p: &mut Parser, start: NodeStart) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// `type`/`typeof` after `import`.
    fn import_kind(&self, p: &mut Parser) -> ParseResult<Option<&'static str>> {
        Ok(None)
    }

    fn import_specifier(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    // -- Types --

    /// A `: T` annotation; the current token is `:`.
    fn after_colon(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// A type parameter declaration at `<`.
    fn type_parameters(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// Type arguments after the callee of `new`.
    fn type_arguments_for_new(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// A function return annotation; the current token is `:`.
    fn return_type(&self, p: &mut Parser) -> ParseResult<Option<ReturnSignature>> {
        Ok(None)
    }

    // -- Classes --

    fn class_member_modifiers(
        &self,
        p: &mut Parser,
        modifiers: &mut MemberModifiers,
    ) -> ParseResult<()> {
        Ok(())
    }

    /// A variance sigil (`+`/`-`) in front of a property key.
    fn variance(&self, p: &mut Parser) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// A class member the base grammar does not know, such as an index
    /// signature.
    fn class_member(
        &self,
        p: &mut Parser,
        start: NodeStart,
        modifiers: &mut MemberModifiers,
    ) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    /// Markers between a member key and its value (`?`, `!`).
    fn class_member_key_suffix(
        &self,
        p: &mut Parser,
        modifiers: &mut MemberModifiers,
    ) -> ParseResult<()> {
        Ok(())
    }

    /// Type arguments of the superclass and `implements` clauses.
    fn class_heritage(&self, p: &mut Parser, class: &mut Class) -> ParseResult<()> {
        Ok(())
    }

    // -- Functions and bindings --

    /// Whether a function or method may end here without a body.
    fn bodiless_function(&self, p: &mut Parser) -> ParseResult<bool> {
        Ok(false)
    }

    /// Annotations after a parameter binding (`x?: T`).
    fn binding_annotation(&self, p: &mut Parser, pattern: &mut Node) -> ParseResult<()> {
        Ok(())
    }

    /// A parameter the base grammar does not know, such as a parameter
    /// property.
    fn assignable_list_item(&self, p: &mut Parser, allow_modifiers: bool) -> ParseResult<Option<Node>> {
        Ok(None)
    }

    fn to_assignable(&self, p: &mut Parser, node: Node, is_binding: bool) -> ParseResult<Hook<Node>> {
        Ok(Hook::Pass(node))
    }

    fn check_lval<'n>(&self, p: &Parser, node: &'n Node, is_binding: bool) -> ParseResult<LvalCheck<'n>> {
        Ok(LvalCheck::NotMine)
    }

    /// Annotations after the id of a variable declarator.
    fn var_declarator_id(&self, p: &mut Parser, id: &mut Node, definite: &mut bool) -> ParseResult<()> {
        Ok(())
    }

    // -- Output --

    /// Reshape a finished node. Called bottom-up over the whole tree once
    /// parsing succeeded; `tok` gives access to the source text.
    fn finish_node_shape(&self, node: &mut Node, tok: &Tokenizer) {}
}

// ============================================================================
// Dispatch
// ============================================================================

/// Ask each dialect in turn; the first `Some` wins.
macro_rules! first_some {
    ($parser:ident, |$d:ident| $call:expr) => {{
        let mut found = None;
        for i in 0..$parser.dialects.len() {
            let $d = $parser.dialects[i];
            if let Some(value) = $call? {
                found = Some(value);
                break;
            }
        }
        Ok(found)
    }};
}

/// Thread a node through each dialect until one takes it.
macro_rules! first_done {
    ($parser:ident, $value:ident, |$d:ident, $v:ident| $call:expr) => {{
        let mut $v = $value;
        let mut done = false;
        for i in 0..$parser.dialects.len() {
            let $d = $parser.dialects[i];
            match $call? {
                Hook::Done(node) => {
                    $v = node;
                    done = true;
                    break;
                }
                Hook::Pass(node) => $v = node,
            }
        }
        Ok(if done { Hook::Done($v) } else { Hook::Pass($v) })
    }};
}

impl Parser {
    pub fn has_type_dialect(&self) -> bool {
        self.has_plugin(Plugin::Flow) || self.has_plugin(Plugin::Typescript)
    }

    pub(crate) fn hook_maybe_assign(&mut self, no_in: bool) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.maybe_assign(self, no_in))
    }

    pub(crate) fn hook_maybe_unary(&mut self) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.maybe_unary(self))
    }

    pub(crate) fn hook_primary_expression(&mut self) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.primary_expression(self))
    }

    pub(crate) fn hook_binary_operator(
        &mut self,
        left: Node,
        left_start: NodeStart,
        min_prec: u8,
        no_in: bool,
    ) -> ParseResult<Hook<Node>> {
        first_done!(self, left, |d, node| d.binary_operator(self, node, left_start, min_prec, no_in))
    }

    pub(crate) fn hook_subscript(
        &mut self,
        base: Node,
        start: NodeStart,
        no_calls: bool,
        stop: &mut bool,
    ) -> ParseResult<Hook<Node>> {
        first_done!(self, base, |d, node| d.subscript(self, node, start, no_calls, stop))
    }

    pub(crate) fn hook_paren_item(&mut self, expr: Node, start: NodeStart) -> ParseResult<Node> {
        let hooked: ParseResult<Hook<Node>> =
            first_done!(self, expr, |d, node| d.paren_item(self, node, start));
        Ok(match hooked? {
            Hook::Done(node) | Hook::Pass(node) => node,
        })
    }

    pub(crate) fn hook_arrow_return_type(&mut self) -> ParseResult<Option<ReturnSignature>> {
        first_some!(self, |d| d.arrow_return_type(self))
    }

    pub(crate) fn hook_conditional(
        &mut self,
        test: Node,
        start: NodeStart,
        no_in: bool,
        errors: &mut ExpressionErrors,
    ) -> ParseResult<Hook<Node>> {
        first_done!(self, test, |d, node| d.conditional(self, node, start, no_in, errors))
    }

    pub(crate) fn hook_check_referenced(&self, expr: &Node) -> ParseResult<()> {
        for dialect in &self.dialects {
            dialect.check_referenced(self, expr)?;
        }
        Ok(())
    }

    pub(crate) fn hook_statement_keyword(&mut self, context: StatementContext) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.statement_keyword(self, context))
    }

    pub(crate) fn hook_export_declaration(&mut self, start: NodeStart) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.export_declaration(self, start))
    }

    pub(crate) fn hook_import_declaration(&mut self, start: NodeStart) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.import_declaration(self, start))
    }

    pub(crate) fn hook_import_kind(&mut self) -> ParseResult<Option<&'static str>> {
        first_some!(self, |d| d.import_kind(self))
    }

    pub(crate) fn hook_import_specifier(&mut self) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.import_specifier(self))
    }

    pub(crate) fn hook_after_colon(&mut self) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.after_colon(self))
    }

    pub(crate) fn hook_type_parameters(&mut self) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.type_parameters(self))
    }

    pub(crate) fn hook_type_arguments_for_new(&mut self) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.type_arguments_for_new(self))
    }

    pub(crate) fn hook_return_type(&mut self) -> ParseResult<Option<ReturnSignature>> {
        first_some!(self, |d| d.return_type(self))
    }

    pub(crate) fn hook_class_member_modifiers(&mut self, modifiers: &mut MemberModifiers) -> ParseResult<()> {
        for i in 0..self.dialects.len() {
            let dialect = self.dialects[i];
            dialect.class_member_modifiers(self, modifiers)?;
        }
        Ok(())
    }

    pub(crate) fn hook_variance(&mut self) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.variance(self))
    }

    pub(crate) fn hook_class_member(
        &mut self,
        start: NodeStart,
        modifiers: &mut MemberModifiers,
    ) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.class_member(self, start, modifiers))
    }

    pub(crate) fn hook_class_member_key_suffix(&mut self, modifiers: &mut MemberModifiers) -> ParseResult<()> {
        for i in 0..self.dialects.len() {
            let dialect = self.dialects[i];
            dialect.class_member_key_suffix(self, modifiers)?;
        }
        Ok(())
    }

    pub(crate) fn hook_class_heritage(&mut self, class: &mut Class) -> ParseResult<()> {
        for i in 0..self.dialects.len() {
            let dialect = self.dialects[i];
            dialect.class_heritage(self, class)?;
        }
        Ok(())
    }

    pub(crate) fn hook_bodiless_function(&mut self) -> ParseResult<bool> {
        for i in 0..self.dialects.len() {
            let dialect = self.dialects[i];
            if dialect.bodiless_function(self)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn hook_binding_annotation(&mut self, pattern: &mut Node) -> ParseResult<()> {
        for i in 0..self.dialects.len() {
            let dialect = self.dialects[i];
            dialect.binding_annotation(self, pattern)?;
        }
        Ok(())
    }

    pub(crate) fn hook_assignable_list_item(&mut self, allow_modifiers: bool) -> ParseResult<Option<Node>> {
        first_some!(self, |d| d.assignable_list_item(self, allow_modifiers))
    }

    pub(crate) fn hook_to_assignable(&mut self, node: Node, is_binding: bool) -> ParseResult<Hook<Node>> {
        first_done!(self, node, |d, node| d.to_assignable(self, node, is_binding))
    }

    pub(crate) fn hook_check_lval<'n>(&self, node: &'n Node, is_binding: bool) -> ParseResult<LvalCheck<'n>> {
        for dialect in &self.dialects {
            match dialect.check_lval(self, node, is_binding)? {
                LvalCheck::NotMine => {}
                handled => return Ok(handled),
            }
        }
        Ok(LvalCheck::NotMine)
    }

    pub(crate) fn hook_var_declarator_id(&mut self, id: &mut Node, definite: &mut bool) -> ParseResult<()> {
        for i in 0..self.dialects.len() {
            let dialect = self.dialects[i];
            dialect.var_declarator_id(self, id, definite)?;
        }
        Ok(())
    }
}
