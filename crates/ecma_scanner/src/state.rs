//! Parser state.
//!
//! Everything the tokenizer and parser mutate while moving through the input
//! lives in [`State`], and `State` is a plain value: cloning it is how the
//! parser takes a snapshot before a speculative parse, and assigning the clone
//! back is how it rolls back. Recorded tokens and comments live outside the
//! state in append-only buffers; the state only remembers how long those
//! buffers were, and the tokenizer truncates them to that length before
//! appending, so a restored snapshot also discards anything a failed branch
//! recorded.

use crate::context::TokContext;
use ecma_ast::{Node, TokenType, TokenValue};
use ecma_core::collections::FxHashSet;
use ecma_core::text::{Position, TextPos};

/// What an enclosing label or loop may be targeted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Loop,
    Switch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// `None` for the implicit label of an unlabeled loop or switch.
    pub name: Option<String>,
    /// `None` for a label on a non-loop statement.
    pub kind: Option<LabelKind>,
    pub statement_start: TextPos,
}

#[derive(Debug, Clone)]
pub struct State {
    pub strict: bool,
    pub in_module: bool,

    // Grammar flags
    pub in_method: Option<&'static str>,
    pub in_function: bool,
    pub in_parameters: bool,
    pub maybe_in_arrow_parameters: bool,
    pub in_generator: bool,
    pub in_async: bool,
    pub in_property_name: bool,
    pub in_type: bool,
    pub in_class_property: bool,
    pub no_anon_function_type: bool,
    pub class_level: u32,

    /// Start of an expression that may turn out to be an arrow's parameters.
    pub potential_arrow_at: Option<TextPos>,
    /// Starts of parenthesized expressions that must not become arrows.
    pub no_arrow_at: Vec<TextPos>,
    pub no_arrow_param_at: Vec<TextPos>,
    /// First `yield` seen while arrow parameters were still ambiguous.
    pub yield_in_possible_arrow_parameters: Option<TextPos>,
    /// First `await` seen while async arrow parameters were still ambiguous.
    pub await_in_possible_arrow_parameters: Option<TextPos>,

    pub labels: Vec<Label>,
    /// Decorators waiting for the class or member they apply to.
    pub decorator_stack: Vec<Vec<Node>>,

    // Position
    pub pos: TextPos,
    pub line_start: TextPos,
    pub cur_line: u32,

    // Current token
    pub token_type: TokenType,
    pub value: TokenValue,
    pub start: TextPos,
    pub end: TextPos,
    pub start_loc: Position,
    pub end_loc: Position,

    // Previous token
    pub last_tok_start: TextPos,
    pub last_tok_end: TextPos,
    pub last_tok_start_loc: Position,
    pub last_tok_end_loc: Position,

    pub context: Vec<TokContext>,
    pub expr_allowed: bool,

    // Facts about the current token
    pub contains_esc: bool,
    pub contains_octal: bool,
    pub octal_position: Option<TextPos>,
    pub invalid_template_escape_position: Option<TextPos>,

    pub exported_identifiers: FxHashSet<String>,

    // Checkpoints into the tokenizer's recording buffers
    pub tokens_len: usize,
    pub comments_len: usize,
    pub comment_ws_len: usize,
}

impl State {
    pub fn new(start_line: u32, strict: bool, in_module: bool) -> Self {
        let start_loc = Position::new(start_line, 0);
        Self {
            strict,
            in_module,
            in_method: None,
            in_function: false,
            in_parameters: false,
            maybe_in_arrow_parameters: false,
            in_generator: false,
            in_async: false,
            in_property_name: false,
            in_type: false,
            in_class_property: false,
            no_anon_function_type: false,
            class_level: 0,
            potential_arrow_at: None,
            no_arrow_at: Vec::new(),
            no_arrow_param_at: Vec::new(),
            yield_in_possible_arrow_parameters: None,
            await_in_possible_arrow_parameters: None,
            labels: Vec::new(),
            decorator_stack: vec![Vec::new()],
            pos: 0,
            line_start: 0,
            cur_line: start_line,
            token_type: TokenType::Eof,
            value: TokenValue::None,
            start: 0,
            end: 0,
            start_loc,
            end_loc: start_loc,
            last_tok_start: 0,
            last_tok_end: 0,
            last_tok_start_loc: start_loc,
            last_tok_end_loc: start_loc,
            context: vec![TokContext::BraceStatement],
            expr_allowed: true,
            contains_esc: false,
            contains_octal: false,
            octal_position: None,
            invalid_template_escape_position: None,
            exported_identifiers: FxHashSet::default(),
            tokens_len: 0,
            comments_len: 0,
            comment_ws_len: 0,
        }
    }

    /// The line/column of the scan position.
    #[inline]
    pub fn cur_position(&self) -> Position {
        Position::new(self.cur_line, self.pos - self.line_start)
    }
}
