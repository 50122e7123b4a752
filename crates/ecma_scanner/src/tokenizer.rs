//! The tokenizer.
//!
//! A pull scanner over the source characters. The parser calls [`Tokenizer::next`]
//! to advance; the decoded token is written into [`State`]. Characters whose
//! meaning depends on grammatical position (`/`, `{`, `` ` ``, and for dialects
//! `<` and `>`) are resolved with the token context stack and the
//! `expr_allowed` flag, both of which are updated after every token.
//!
//! Dialects extend the tokenizer through [`TokenizerHook`]: each registered hook
//! may claim a character before the base rules see it, and may take over the
//! context update for the tokens it introduces.

use crate::char_codes::*;
use crate::context::TokContext;
use crate::identifier::{is_identifier_char, is_identifier_start};
use crate::plugins::{Plugin, PluginSet};
use crate::state::State;
use ecma_ast::{Comment, CommentKind, CommentWhitespace, Token, TokenEntry, TokenType, TokenValue};
use ecma_core::text::{LineMap, Position, SourceLocation, TextPos};
use ecma_diagnostics::{messages, DiagnosticMessage, ParseResult, SyntaxError};
use std::sync::Arc;

/// Regular expression flags accepted after the closing `/`.
const VALID_REGEX_FLAGS: &[char] = &['g', 'm', 's', 'i', 'y', 'u'];

/// A tokenizer extension installed by a dialect.
pub trait TokenizerHook: Sync {
    fn name(&self) -> &'static str;

    /// Claim the character at the scan position. Returns `true` if a token
    /// was finished.
    fn tokenize_ambiguous(&self, _tok: &mut Tokenizer, _code: char) -> ParseResult<bool> {
        Ok(false)
    }

    /// Update the context stack after a token was finished. Returns `true`
    /// if the base rules should be skipped.
    fn update_context(&self, _tok: &mut Tokenizer, _prev: TokenType) -> bool {
        false
    }
}

/// Settings that shape what the tokenizer records.
#[derive(Debug, Clone)]
pub struct TokenizerOptions {
    /// Record every token (and comment) in source order.
    pub tokens: bool,
    /// Attach `[start, end]` ranges to recorded tokens and comments.
    pub ranges: bool,
    pub plugins: PluginSet,
    pub source_filename: Option<Arc<str>>,
    pub start_line: u32,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            tokens: false,
            ranges: false,
            plugins: PluginSet::new(),
            source_filename: None,
            start_line: 1,
        }
    }
}

/// Tokens and comments recorded during a parse.
#[derive(Debug, Default)]
pub struct Recording {
    pub tokens: Vec<TokenEntry>,
    pub comments: Vec<Comment>,
    pub comment_whitespace: Vec<CommentWhitespace>,
}

pub struct Tokenizer {
    /// The source text, one entry per Unicode scalar value.
    pub input: Vec<char>,
    pub state: State,
    /// Set while scanning ahead; nothing is recorded.
    pub is_lookahead: bool,
    pub options: TokenizerOptions,
    pub hooks: Vec<&'static dyn TokenizerHook>,
    tokens: Vec<TokenEntry>,
    comments: Vec<Comment>,
    comment_whitespace: Vec<CommentWhitespace>,
    line_map: LineMap,
}

impl Tokenizer {
    pub fn new(source: &str, options: TokenizerOptions, strict: bool, in_module: bool) -> Self {
        let input: Vec<char> = source.chars().collect();
        let line_map = LineMap::new(&input, options.start_line);
        let state = State::new(options.start_line, strict, in_module);
        Self {
            input,
            state,
            is_lookahead: false,
            options,
            hooks: Vec::new(),
            tokens: Vec::new(),
            comments: Vec::new(),
            comment_whitespace: Vec::new(),
            line_map,
        }
    }

    // ========================================================================
    // Character access
    // ========================================================================

    #[inline]
    pub fn len(&self) -> TextPos {
        self.input.len() as TextPos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    #[inline]
    pub fn char_at(&self, pos: TextPos) -> Option<char> {
        self.input.get(pos as usize).copied()
    }

    /// The character at the scan position.
    #[inline]
    pub fn cur_char(&self) -> Option<char> {
        self.char_at(self.state.pos)
    }

    /// The character `offset` places past the scan position.
    #[inline]
    pub fn peek(&self, offset: TextPos) -> Option<char> {
        self.char_at(self.state.pos + offset)
    }

    /// The source text between two offsets.
    pub fn slice(&self, start: TextPos, end: TextPos) -> String {
        let end = (end as usize).min(self.input.len());
        let start = (start as usize).min(end);
        self.input[start..end].iter().collect()
    }

    fn push_slice(&self, out: &mut String, start: TextPos, end: TextPos) {
        out.extend(&self.input[start as usize..end as usize]);
    }

    pub fn has_line_break_between(&self, start: TextPos, end: TextPos) -> bool {
        let end = (end as usize).min(self.input.len());
        let start = (start as usize).min(end);
        self.input[start..end].iter().copied().any(is_line_break)
    }

    /// Whether a line break separates the previous token from the current one.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.has_line_break_between(self.state.last_tok_end, self.state.start)
    }

    #[inline]
    pub fn cur_context(&self) -> TokContext {
        self.state
            .context
            .last()
            .copied()
            .unwrap_or(TokContext::BraceStatement)
    }

    #[inline]
    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.options.plugins.contains(plugin)
    }

    #[inline]
    pub fn is(&self, token_type: TokenType) -> bool {
        self.state.token_type == token_type
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub fn position_of(&self, pos: TextPos) -> Position {
        self.line_map.position_of(pos)
    }

    /// Build a syntax error at `pos`.
    pub fn raise(&self, pos: TextPos, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        SyntaxError::new(message, args, pos, self.position_of(pos))
    }

    pub fn expect_plugin(&self, plugin: Plugin, pos: Option<TextPos>) -> ParseResult<()> {
        if self.has_plugin(plugin) {
            return Ok(());
        }
        let name = plugin.name();
        Err(self
            .raise(pos.unwrap_or(self.state.start), &messages::MISSING_PLUGIN, &[name])
            .with_missing_plugin(&[name]))
    }

    pub fn expect_one_plugin(&self, plugins: &[Plugin], pos: Option<TextPos>) -> ParseResult<()> {
        if plugins.iter().any(|p| self.has_plugin(*p)) {
            return Ok(());
        }
        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        Err(self
            .raise(
                pos.unwrap_or(self.state.start),
                &messages::MISSING_ONE_OF_PLUGINS,
                &[&names.join(", ")],
            )
            .with_missing_plugin(&names))
    }

    // ========================================================================
    // Recording
    // ========================================================================

    fn push_current_token(&mut self) {
        let state = &self.state;
        let token = Token {
            token_type: state.token_type,
            value: state.value.clone(),
            start: state.start,
            end: state.end,
            loc: SourceLocation::new(
                state.start_loc,
                state.end_loc,
                self.options.source_filename.clone(),
            ),
            range: self.options.ranges.then_some([state.start, state.end]),
        };
        self.record_token(TokenEntry::Token(token));
    }

    fn record_token(&mut self, entry: TokenEntry) {
        self.tokens.truncate(self.state.tokens_len);
        self.tokens.push(entry);
        self.state.tokens_len = self.tokens.len();
    }

    fn push_comment(
        &mut self,
        kind: CommentKind,
        text: (TextPos, TextPos),
        start: TextPos,
        start_loc: Position,
    ) -> Option<usize> {
        if self.is_lookahead {
            return None;
        }
        let end = self.state.pos;
        let comment = Comment {
            kind,
            value: self.slice(text.0, text.1),
            start,
            end,
            loc: SourceLocation::new(
                start_loc,
                self.state.cur_position(),
                self.options.source_filename.clone(),
            ),
            range: self.options.ranges.then_some([start, end]),
        };
        if self.options.tokens {
            self.record_token(TokenEntry::Comment(comment.clone()));
        }
        self.comments.truncate(self.state.comments_len);
        self.comments.push(comment);
        self.state.comments_len = self.comments.len();
        Some(self.comments.len() - 1)
    }

    fn push_comment_whitespace(&mut self, start: TextPos, end: TextPos, comments: Vec<usize>) {
        self.comment_whitespace.truncate(self.state.comment_ws_len);
        self.comment_whitespace.push(CommentWhitespace {
            start,
            end,
            comments,
        });
        self.state.comment_ws_len = self.comment_whitespace.len();
    }

    /// Hand over everything recorded on the surviving parse path.
    pub fn take_recording(&mut self) -> Recording {
        self.tokens.truncate(self.state.tokens_len);
        self.comments.truncate(self.state.comments_len);
        self.comment_whitespace.truncate(self.state.comment_ws_len);
        Recording {
            tokens: std::mem::take(&mut self.tokens),
            comments: std::mem::take(&mut self.comments),
            comment_whitespace: std::mem::take(&mut self.comment_whitespace),
        }
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Move to the next token.
    pub fn next(&mut self) -> ParseResult<()> {
        if self.options.tokens && !self.is_lookahead {
            self.push_current_token();
        }
        self.state.last_tok_end = self.state.end;
        self.state.last_tok_start = self.state.start;
        self.state.last_tok_end_loc = self.state.end_loc;
        self.state.last_tok_start_loc = self.state.start_loc;
        self.next_token()
    }

    /// Consume the current token if it has the given type.
    pub fn eat(&mut self, token_type: TokenType) -> ParseResult<bool> {
        if self.is(token_type) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Scan the token after the current one without consuming anything.
    pub fn lookahead(&mut self) -> ParseResult<State> {
        let old = self.state.clone();
        self.is_lookahead = true;
        let result = self.next();
        self.is_lookahead = false;
        let ahead = std::mem::replace(&mut self.state, old);
        result.map(|()| ahead)
    }

    /// Offset of the next non-whitespace, non-comment character after the
    /// current token.
    pub fn next_token_start(&self) -> TextPos {
        self.next_token_start_since(self.state.pos)
    }

    pub fn next_token_start_since(&self, mut pos: TextPos) -> TextPos {
        while let Some(ch) = self.char_at(pos) {
            if is_line_break(ch) || is_white_space_single_line(ch) {
                pos += 1;
            } else if ch == '/' && self.char_at(pos + 1) == Some('/') {
                pos += 2;
                while self.char_at(pos).is_some_and(|c| !is_line_break(c)) {
                    pos += 1;
                }
            } else if ch == '/' && self.char_at(pos + 1) == Some('*') {
                pos += 2;
                while pos < self.len()
                    && !(self.char_at(pos) == Some('*') && self.char_at(pos + 1) == Some('/'))
                {
                    pos += 1;
                }
                pos = (pos + 2).min(self.len());
            } else {
                break;
            }
        }
        pos
    }

    /// Read a single token, updating the state.
    pub fn next_token(&mut self) -> ParseResult<()> {
        let cur_context = self.cur_context();
        if !cur_context.preserve_space() {
            self.skip_space()?;
        }
        self.state.contains_octal = false;
        self.state.octal_position = None;
        self.state.contains_esc = false;
        self.state.start = self.state.pos;
        self.state.start_loc = self.state.cur_position();

        let Some(code) = self.cur_char() else {
            self.finish_token(TokenType::Eof, TokenValue::None);
            return Ok(());
        };
        if cur_context == TokContext::Template {
            self.read_tmpl_token()
        } else {
            self.read_token(code)
        }
    }

    /// Rescan the current token from its start, under the current flags.
    ///
    /// Used when a directive switches the enclosing body to strict mode after
    /// the following token was already read.
    pub fn rescan_current(&mut self) -> ParseResult<()> {
        self.state.pos = self.state.start;
        self.state.cur_line = self.state.start_loc.line;
        self.state.line_start = self.state.start - self.state.start_loc.column;
        self.next_token()
    }

    fn read_token(&mut self, code: char) -> ParseResult<()> {
        for i in 0..self.hooks.len() {
            let hook = self.hooks[i];
            if hook.tokenize_ambiguous(self, code)? {
                return Ok(());
            }
        }
        if is_identifier_start(code) || code == '\\' {
            self.read_word()
        } else {
            self.get_token_from_code(code)
        }
    }

    /// Finish the current token and update the context stack.
    pub fn finish_token(&mut self, token_type: TokenType, value: TokenValue) {
        self.state.end = self.state.pos;
        self.state.end_loc = self.state.cur_position();
        let prev = self.state.token_type;
        self.state.token_type = token_type;
        self.state.value = value;
        self.update_context(prev);
    }

    /// Finish an operator token of `size` characters, with its text as value.
    pub fn finish_op(&mut self, token_type: TokenType, size: TextPos) {
        let text = self.slice(self.state.pos, self.state.pos + size);
        self.state.pos += size;
        self.finish_token(token_type, TokenValue::Str(text));
    }

    fn finish_punct(&mut self, token_type: TokenType) -> ParseResult<()> {
        self.state.pos += 1;
        self.finish_token(token_type, TokenValue::None);
        Ok(())
    }

    // ========================================================================
    // Context
    // ========================================================================

    fn update_context(&mut self, prev: TokenType) {
        for i in 0..self.hooks.len() {
            let hook = self.hooks[i];
            if hook.update_context(self, prev) {
                return;
            }
        }
        self.base_update_context(prev);
    }

    /// The context rules for the base grammar.
    pub fn base_update_context(&mut self, prev: TokenType) {
        use TokenType as T;
        let token_type = self.state.token_type;
        if token_type.is_keyword() && matches!(prev, T::Dot | T::QuestionDot) {
            self.state.expr_allowed = false;
            return;
        }
        match token_type {
            T::ParenR | T::BraceR => {
                if self.state.context.len() == 1 {
                    self.state.expr_allowed = true;
                    return;
                }
                let mut out = self.state.context.pop();
                if out == Some(TokContext::BraceStatement)
                    && matches!(
                        self.cur_context(),
                        TokContext::FunctionExpression | TokContext::FunctionStatement
                    )
                {
                    out = self.state.context.pop();
                }
                self.state.expr_allowed = !out.is_some_and(TokContext::is_expr);
            }
            T::Name => {
                let value = self.state.value.str_or_empty();
                self.state.expr_allowed = prev != T::Dot
                    && ((value == "of" && !self.state.expr_allowed)
                        || (value == "yield" && self.state.in_generator));
            }
            T::BraceL => {
                let context = if self.brace_is_block(prev) {
                    TokContext::BraceStatement
                } else {
                    TokContext::BraceExpression
                };
                self.state.context.push(context);
                self.state.expr_allowed = true;
            }
            T::DollarBraceL => {
                self.state.context.push(TokContext::TemplateQuasi);
                self.state.expr_allowed = true;
            }
            T::ParenL => {
                let context = if matches!(prev, T::If | T::For | T::With | T::While) {
                    TokContext::ParenStatement
                } else {
                    TokContext::ParenExpression
                };
                self.state.context.push(context);
                self.state.expr_allowed = true;
            }
            T::IncDec => {}
            T::Function | T::Class => {
                let cur = self.cur_context();
                let is_expression = prev.before_expr()
                    && prev != T::Else
                    && !(prev == T::Semi && cur != TokContext::ParenStatement)
                    && !(prev == T::Return
                        && self.has_line_break_between(self.state.last_tok_end, self.state.start))
                    && !(matches!(prev, T::Colon | T::BraceL) && cur == TokContext::BraceStatement);
                self.state.context.push(if is_expression {
                    TokContext::FunctionExpression
                } else {
                    TokContext::FunctionStatement
                });
                self.state.expr_allowed = false;
            }
            T::BackQuote => {
                if self.cur_context() == TokContext::Template {
                    self.state.context.pop();
                } else {
                    self.state.context.push(TokContext::Template);
                }
                self.state.expr_allowed = false;
            }
            _ => self.state.expr_allowed = token_type.before_expr(),
        }
    }

    /// Whether a `{` after `prev` opens a block rather than an object literal.
    fn brace_is_block(&self, prev: TokenType) -> bool {
        use TokenType as T;
        let parent = self.cur_context();
        if matches!(
            parent,
            TokContext::FunctionExpression | TokContext::FunctionStatement
        ) {
            return true;
        }
        if prev == T::Colon
            && matches!(parent, TokContext::BraceStatement | TokContext::BraceExpression)
        {
            return !parent.is_expr();
        }
        if prev == T::Return || (prev == T::Name && self.state.expr_allowed) {
            return self.has_line_break_between(self.state.last_tok_end, self.state.start);
        }
        match prev {
            T::Else | T::Semi | T::Eof | T::ParenR | T::Arrow => true,
            T::BraceL => parent == TokContext::BraceStatement,
            T::Var | T::Const | T::Name => false,
            // `class C<T> {`
            T::Relational => true,
            _ => !self.state.expr_allowed,
        }
    }

    // ========================================================================
    // Whitespace and comments
    // ========================================================================

    fn skip_space(&mut self) -> ParseResult<()> {
        let space_start = self.state.pos;
        let mut comments = Vec::new();
        while let Some(ch) = self.cur_char() {
            match ch {
                ' ' | '\t' | '\u{A0}' => self.state.pos += 1,
                '\r' | '\n' | '\u{2028}' | '\u{2029}' => {
                    self.state.pos += 1;
                    if ch == '\r' && self.cur_char() == Some('\n') {
                        self.state.pos += 1;
                    }
                    self.state.cur_line += 1;
                    self.state.line_start = self.state.pos;
                }
                '/' => match self.peek(1) {
                    Some('*') => comments.extend(self.skip_block_comment()?),
                    Some('/') => comments.extend(self.skip_line_comment(2)),
                    _ => break,
                },
                // `<!--` opens a line comment in scripts.
                '<' if !self.state.in_module
                    && self.peek(1) == Some('!')
                    && self.peek(2) == Some('-')
                    && self.peek(3) == Some('-') =>
                {
                    comments.extend(self.skip_line_comment(4));
                }
                // `-->` opens a line comment at the start of a line in scripts.
                '-' if !self.state.in_module
                    && self.peek(1) == Some('-')
                    && self.peek(2) == Some('>')
                    && (space_start == 0 || self.state.line_start > space_start) =>
                {
                    comments.extend(self.skip_line_comment(3));
                }
                _ if is_white_space_single_line(ch) => self.state.pos += 1,
                _ => break,
            }
        }
        if !comments.is_empty() {
            self.push_comment_whitespace(space_start, self.state.pos, comments);
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> ParseResult<Option<usize>> {
        let start = self.state.pos;
        let start_loc = self.state.cur_position();
        let text_start = start + 2;
        let mut end = text_start;
        loop {
            match self.char_at(end) {
                None => return Err(self.raise(start, &messages::UNTERMINATED_COMMENT, &[])),
                Some('*') if self.char_at(end + 1) == Some('/') => break,
                _ => end += 1,
            }
        }
        self.state.pos = end + 2;

        let mut i = text_start;
        while i < end {
            let ch = self.input[i as usize];
            if is_line_break(ch) {
                if ch == '\r' && self.char_at(i + 1) == Some('\n') {
                    i += 1;
                }
                self.state.cur_line += 1;
                self.state.line_start = i + 1;
            }
            i += 1;
        }
        Ok(self.push_comment(CommentKind::Block, (text_start, end), start, start_loc))
    }

    fn skip_line_comment(&mut self, start_skip: TextPos) -> Option<usize> {
        let start = self.state.pos;
        let start_loc = self.state.cur_position();
        self.state.pos += start_skip;
        while self.cur_char().is_some_and(|ch| !is_line_break(ch)) {
            self.state.pos += 1;
        }
        self.push_comment(
            CommentKind::Line,
            (start + start_skip, self.state.pos),
            start,
            start_loc,
        )
    }

    // ========================================================================
    // Punctuation and operators
    // ========================================================================

    pub fn get_token_from_code(&mut self, code: char) -> ParseResult<()> {
        use TokenType as T;
        match code {
            '#' => self.read_token_number_sign(),
            '.' => self.read_token_dot(),
            '(' => self.finish_punct(T::ParenL),
            ')' => self.finish_punct(T::ParenR),
            ';' => self.finish_punct(T::Semi),
            ',' => self.finish_punct(T::Comma),
            '[' => self.finish_punct(T::BracketL),
            ']' => self.finish_punct(T::BracketR),
            '{' => {
                if self.has_plugin(Plugin::Flow) && self.peek(1) == Some('|') {
                    self.finish_op(T::BraceBarL, 2);
                    Ok(())
                } else {
                    self.finish_punct(T::BraceL)
                }
            }
            '}' => self.finish_punct(T::BraceR),
            ':' => {
                if self.has_plugin(Plugin::FunctionBind) && self.peek(1) == Some(':') {
                    self.finish_op(T::DoubleColon, 2);
                    Ok(())
                } else {
                    self.finish_punct(T::Colon)
                }
            }
            '?' => self.read_token_question(),
            '@' => self.finish_punct(T::At),
            '`' => self.finish_punct(T::BackQuote),
            '0' => match self.peek(1) {
                Some('x' | 'X') => self.read_radix_number(16),
                Some('o' | 'O') => self.read_radix_number(8),
                Some('b' | 'B') => self.read_radix_number(2),
                _ => self.read_number(false),
            },
            '1'..='9' => self.read_number(false),
            '"' | '\'' => self.read_string(code),
            '/' => self.read_token_slash(),
            '%' | '*' => self.read_token_mult_modulo(code),
            '|' | '&' => self.read_token_pipe_amp(code),
            '^' => {
                if self.peek(1) == Some('=') {
                    self.finish_op(T::Assign, 2);
                } else {
                    self.finish_op(T::BitwiseXor, 1);
                }
                Ok(())
            }
            '+' | '-' => {
                let next = self.peek(1);
                if next == Some(code) {
                    self.finish_op(T::IncDec, 2);
                } else if next == Some('=') {
                    self.finish_op(T::Assign, 2);
                } else {
                    self.finish_op(T::PlusMin, 1);
                }
                Ok(())
            }
            '<' | '>' => self.read_token_lt_gt(code),
            '=' | '!' => self.read_token_eq_excl(code),
            '~' => {
                self.finish_op(T::Tilde, 1);
                Ok(())
            }
            _ => Err(self.raise(
                self.state.pos,
                &messages::UNEXPECTED_CHARACTER,
                &[&code.to_string()],
            )),
        }
    }

    fn read_token_number_sign(&mut self) -> ParseResult<()> {
        if self.state.pos == 0 && self.peek(1) == Some('!') {
            return self.read_interpreter_directive();
        }
        if self.peek(1).is_some_and(is_digit) {
            return Err(self.raise(self.state.pos, &messages::UNEXPECTED_DIGIT_AFTER_HASH, &[]));
        }
        if self.state.class_level > 0 {
            self.expect_one_plugin(
                &[Plugin::ClassPrivateProperties, Plugin::ClassPrivateMethods],
                Some(self.state.pos),
            )?;
            return self.finish_punct(TokenType::Hash);
        }
        Err(self.raise(self.state.pos, &messages::UNEXPECTED_CHARACTER, &["#"]))
    }

    fn read_interpreter_directive(&mut self) -> ParseResult<()> {
        let start = self.state.pos;
        self.state.pos += 2;
        while self.cur_char().is_some_and(|ch| !is_line_break(ch)) {
            self.state.pos += 1;
        }
        let value = self.slice(start + 2, self.state.pos);
        self.finish_token(TokenType::InterpreterDirective, TokenValue::Str(value));
        Ok(())
    }

    fn read_token_dot(&mut self) -> ParseResult<()> {
        if self.peek(1).is_some_and(is_digit) {
            return self.read_number(true);
        }
        if self.peek(1) == Some('.') && self.peek(2) == Some('.') {
            self.state.pos += 3;
            self.finish_token(TokenType::Ellipsis, TokenValue::None);
        } else {
            self.finish_punct(TokenType::Dot)?;
        }
        Ok(())
    }

    fn read_token_question(&mut self) -> ParseResult<()> {
        let next = self.peek(1);
        let next2 = self.peek(2);
        if next == Some('?') && !self.state.in_type {
            if next2 == Some('=') {
                self.expect_plugin(Plugin::LogicalAssignment, Some(self.state.pos))?;
                self.finish_op(TokenType::Assign, 3);
            } else {
                self.finish_op(TokenType::NullishCoalescing, 2);
            }
        } else if next == Some('.') && !next2.is_some_and(is_digit) {
            self.state.pos += 2;
            self.finish_token(TokenType::QuestionDot, TokenValue::None);
        } else {
            self.finish_punct(TokenType::Question)?;
        }
        Ok(())
    }

    fn read_token_slash(&mut self) -> ParseResult<()> {
        if self.state.expr_allowed {
            self.state.pos += 1;
            return self.read_regexp();
        }
        if self.peek(1) == Some('=') {
            self.finish_op(TokenType::Assign, 2);
        } else {
            self.finish_op(TokenType::Slash, 1);
        }
        Ok(())
    }

    fn read_token_mult_modulo(&mut self, code: char) -> ParseResult<()> {
        let mut token_type = if code == '*' {
            TokenType::Star
        } else {
            TokenType::Modulo
        };
        let mut width = 1;
        let mut next = self.peek(1);
        if code == '*' && next == Some('*') {
            width += 1;
            next = self.peek(2);
            token_type = TokenType::Exponent;
        }
        if next == Some('=') && !self.state.in_type {
            width += 1;
            token_type = TokenType::Assign;
        }
        self.finish_op(token_type, width);
        Ok(())
    }

    fn read_token_pipe_amp(&mut self, code: char) -> ParseResult<()> {
        let next = self.peek(1);
        if next == Some(code) {
            if self.peek(2) == Some('=') {
                self.expect_plugin(Plugin::LogicalAssignment, Some(self.state.pos))?;
                self.finish_op(TokenType::Assign, 3);
            } else if code == '|' {
                self.finish_op(TokenType::LogicalOr, 2);
            } else {
                self.finish_op(TokenType::LogicalAnd, 2);
            }
            return Ok(());
        }
        if code == '|' && next == Some('}') && self.has_plugin(Plugin::Flow) {
            self.finish_op(TokenType::BraceBarR, 2);
            return Ok(());
        }
        if next == Some('=') {
            self.finish_op(TokenType::Assign, 2);
        } else if code == '|' {
            self.finish_op(TokenType::BitwiseOr, 1);
        } else {
            self.finish_op(TokenType::BitwiseAnd, 1);
        }
        Ok(())
    }

    fn read_token_lt_gt(&mut self, code: char) -> ParseResult<()> {
        let next = self.peek(1);
        if next == Some(code) {
            let size = if code == '>' && self.peek(2) == Some('>') { 3 } else { 2 };
            if self.peek(size) == Some('=') {
                self.finish_op(TokenType::Assign, size + 1);
            } else {
                self.finish_op(TokenType::BitShift, size);
            }
            return Ok(());
        }
        if code == '<'
            && self.state.in_module
            && next == Some('!')
            && self.peek(2) == Some('-')
            && self.peek(3) == Some('-')
        {
            return Err(self.raise(self.state.pos, &messages::HTML_COMMENT_IN_MODULE, &[]));
        }
        let size = if next == Some('=') { 2 } else { 1 };
        self.finish_op(TokenType::Relational, size);
        Ok(())
    }

    fn read_token_eq_excl(&mut self, code: char) -> ParseResult<()> {
        let next = self.peek(1);
        if next == Some('=') {
            let size = if self.peek(2) == Some('=') { 3 } else { 2 };
            self.finish_op(TokenType::Equality, size);
        } else if code == '=' && next == Some('>') {
            self.state.pos += 2;
            self.finish_token(TokenType::Arrow, TokenValue::None);
        } else if code == '=' {
            self.finish_op(TokenType::Eq, 1);
        } else {
            self.finish_op(TokenType::Bang, 1);
        }
        Ok(())
    }

    // ========================================================================
    // Regular expressions
    // ========================================================================

    fn read_regexp(&mut self) -> ParseResult<()> {
        let content_start = self.state.pos;
        let mut escaped = false;
        let mut in_class = false;
        loop {
            let Some(ch) = self.cur_char() else {
                return Err(self.raise(self.state.start, &messages::UNTERMINATED_REGEXP, &[]));
            };
            if is_line_break(ch) {
                return Err(self.raise(self.state.start, &messages::UNTERMINATED_REGEXP, &[]));
            }
            if escaped {
                escaped = false;
            } else {
                match ch {
                    '[' => in_class = true,
                    ']' if in_class => in_class = false,
                    '/' if !in_class => break,
                    _ => {}
                }
                escaped = ch == '\\';
            }
            self.state.pos += 1;
        }
        let pattern = self.slice(content_start, self.state.pos);
        self.state.pos += 1;

        let mut flags = String::new();
        while let Some(ch) = self.cur_char() {
            if VALID_REGEX_FLAGS.contains(&ch) {
                if flags.contains(ch) {
                    return Err(self.raise(
                        self.state.pos + 1,
                        &messages::DUPLICATE_REGEXP_FLAG,
                        &[],
                    ));
                }
                self.state.pos += 1;
                flags.push(ch);
            } else if is_identifier_char(ch) || ch == '\\' {
                return Err(self.raise(self.state.pos + 1, &messages::INVALID_REGEXP_FLAG, &[]));
            } else {
                break;
            }
        }
        self.finish_token(TokenType::Regexp, TokenValue::Regex { pattern, flags });
        Ok(())
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    /// Read digits of `radix`. With `len`, exactly that many digits must be
    /// read. Separators are only accepted when `allow_separator` is set.
    fn read_int(
        &mut self,
        radix: u32,
        len: Option<u32>,
        allow_separator: bool,
    ) -> ParseResult<Option<f64>> {
        let start = self.state.pos;
        let mut total = 0f64;
        let mut count = 0;
        while len.map_or(true, |len| count < len) {
            let Some(ch) = self.cur_char() else { break };
            if ch == '_' {
                let pos = self.state.pos;
                let prev = pos.checked_sub(1).and_then(|p| self.char_at(p));
                let next = self.char_at(pos + 1);
                if self.has_plugin(Plugin::NumericSeparator) {
                    if !allow_separator {
                        return Err(self.raise(pos, &messages::NUMERIC_SEPARATOR_IN_ESCAPE, &[]));
                    }
                    if !is_allowed_separator_sibling(next, radix)
                        || is_forbidden_separator_sibling(prev, radix)
                        || is_forbidden_separator_sibling(next, radix)
                    {
                        return Err(self.raise(pos, &messages::UNEXPECTED_NUMERIC_SEPARATOR, &[]));
                    }
                    self.state.pos += 1;
                    count += 1;
                    continue;
                }
                if allow_separator
                    && prev.is_some_and(|p| digit_value(p).is_some_and(|v| v < radix))
                    && is_allowed_separator_sibling(next, radix)
                {
                    self.expect_plugin(Plugin::NumericSeparator, Some(pos))?;
                }
                break;
            }
            let Some(value) = digit_value(ch).filter(|v| *v < radix) else {
                break;
            };
            self.state.pos += 1;
            total = total * radix as f64 + value as f64;
            count += 1;
        }
        let read = self.state.pos - start;
        if read == 0 || len.is_some_and(|len| read != len) {
            return Ok(None);
        }
        Ok(Some(total))
    }

    fn read_radix_number(&mut self, radix: u32) -> ParseResult<()> {
        let start = self.state.pos;
        self.state.pos += 2;
        let Some(value) = self.read_int(radix, None, true)? else {
            return Err(self.raise(
                start + 2,
                &messages::EXPECTED_NUMBER_IN_RADIX,
                &[&radix.to_string()],
            ));
        };
        let mut is_bigint = false;
        if self.cur_char() == Some('n') {
            self.expect_plugin(Plugin::BigInt, Some(self.state.pos))?;
            self.state.pos += 1;
            is_bigint = true;
        }
        if self.cur_char().is_some_and(is_identifier_start) {
            return Err(self.raise(self.state.pos, &messages::IDENTIFIER_AFTER_NUMBER, &[]));
        }
        if is_bigint {
            let text = self.numeric_text(start);
            self.finish_token(TokenType::BigInt, TokenValue::Str(text));
        } else {
            self.finish_token(TokenType::Num, TokenValue::Num(value));
        }
        Ok(())
    }

    fn read_number(&mut self, starts_with_dot: bool) -> ParseResult<()> {
        let start = self.state.pos;
        let mut is_float = false;
        if !starts_with_dot && self.read_int(10, None, true)?.is_none() {
            return Err(self.raise(start, &messages::INVALID_NUMBER, &[]));
        }
        let mut octal = self.state.pos - start >= 2 && self.char_at(start) == Some('0');
        if octal {
            if self.state.strict {
                return Err(self.raise(start, &messages::LEGACY_OCTAL_IN_STRICT, &[]));
            }
            let digits = &self.input[start as usize..self.state.pos as usize];
            if let Some(offset) = digits.iter().position(|&c| c == '_') {
                return Err(self.raise(
                    start + offset as u32,
                    &messages::ZERO_DIGIT_NUMERIC_SEPARATOR,
                    &[],
                ));
            }
            if digits.iter().any(|c| matches!(c, '8' | '9')) {
                octal = false;
            }
        }

        let mut next = self.cur_char();
        if next == Some('.') && !octal {
            self.state.pos += 1;
            self.read_int(10, None, true)?;
            is_float = true;
            next = self.cur_char();
        }
        if matches!(next, Some('e' | 'E')) && !octal {
            self.state.pos += 1;
            if matches!(self.cur_char(), Some('+' | '-')) {
                self.state.pos += 1;
            }
            if self.read_int(10, None, true)?.is_none() {
                return Err(self.raise(start, &messages::INVALID_NUMBER, &[]));
            }
            is_float = true;
            next = self.cur_char();
        }

        let mut is_bigint = false;
        if next == Some('n') {
            self.expect_plugin(Plugin::BigInt, Some(self.state.pos))?;
            if is_float || octal {
                return Err(self.raise(start, &messages::INVALID_BIGINT, &[]));
            }
            self.state.pos += 1;
            is_bigint = true;
        }
        if self.cur_char().is_some_and(is_identifier_start) {
            return Err(self.raise(self.state.pos, &messages::IDENTIFIER_AFTER_NUMBER, &[]));
        }

        let text = self.numeric_text(start);
        if is_bigint {
            self.finish_token(TokenType::BigInt, TokenValue::Str(text));
            return Ok(());
        }
        let value = if octal {
            text.chars()
                .filter_map(|c| c.to_digit(8))
                .fold(0f64, |acc, d| acc * 8.0 + d as f64)
        } else {
            text.parse::<f64>()
                .map_err(|_| self.raise(start, &messages::INVALID_NUMBER, &[]))?
        };
        self.finish_token(TokenType::Num, TokenValue::Num(value));
        Ok(())
    }

    /// The literal text from `start` with separators and the bigint suffix removed.
    fn numeric_text(&self, start: TextPos) -> String {
        self.input[start as usize..self.state.pos as usize]
            .iter()
            .filter(|c| **c != '_' && **c != 'n')
            .collect()
    }

    // ========================================================================
    // Strings, templates and escapes
    // ========================================================================

    fn read_string(&mut self, quote: char) -> ParseResult<()> {
        let mut out = String::new();
        self.state.pos += 1;
        let mut chunk_start = self.state.pos;
        loop {
            let Some(ch) = self.cur_char() else {
                return Err(self.raise(self.state.start, &messages::UNTERMINATED_STRING, &[]));
            };
            if ch == quote {
                break;
            }
            if ch == '\\' {
                self.push_slice(&mut out, chunk_start, self.state.pos);
                self.read_escaped_char(false, &mut out)?;
                chunk_start = self.state.pos;
            } else if ch == '\u{2028}' || ch == '\u{2029}' {
                self.state.pos += 1;
                self.state.cur_line += 1;
                self.state.line_start = self.state.pos;
            } else if is_line_break(ch) {
                return Err(self.raise(self.state.start, &messages::UNTERMINATED_STRING, &[]));
            } else {
                self.state.pos += 1;
            }
        }
        self.push_slice(&mut out, chunk_start, self.state.pos);
        self.state.pos += 1;
        self.finish_token(TokenType::String, TokenValue::Str(out));
        Ok(())
    }

    /// Read template text up to the next `` ` `` or `${`.
    ///
    /// The token value is the cooked text, or `None` when it contains an
    /// escape that is only legal in tagged templates.
    fn read_tmpl_token(&mut self) -> ParseResult<()> {
        let mut out = String::new();
        let mut chunk_start = self.state.pos;
        let mut contains_invalid = false;
        loop {
            let Some(ch) = self.cur_char() else {
                return Err(self.raise(self.state.start, &messages::UNTERMINATED_TEMPLATE, &[]));
            };
            if ch == '`' || (ch == '$' && self.peek(1) == Some('{')) {
                if self.state.pos == self.state.start && self.is(TokenType::Template) {
                    if ch == '$' {
                        self.state.pos += 2;
                        self.finish_token(TokenType::DollarBraceL, TokenValue::None);
                    } else {
                        self.state.pos += 1;
                        self.finish_token(TokenType::BackQuote, TokenValue::None);
                    }
                    return Ok(());
                }
                self.push_slice(&mut out, chunk_start, self.state.pos);
                let value = if contains_invalid {
                    TokenValue::None
                } else {
                    TokenValue::Str(out)
                };
                self.finish_token(TokenType::Template, value);
                return Ok(());
            }
            if ch == '\\' {
                self.push_slice(&mut out, chunk_start, self.state.pos);
                if !self.read_escaped_char(true, &mut out)? {
                    contains_invalid = true;
                }
                chunk_start = self.state.pos;
            } else if is_line_break(ch) {
                self.push_slice(&mut out, chunk_start, self.state.pos);
                self.state.pos += 1;
                if ch == '\r' {
                    if self.cur_char() == Some('\n') {
                        self.state.pos += 1;
                    }
                    out.push('\n');
                } else {
                    out.push(ch);
                }
                self.state.cur_line += 1;
                self.state.line_start = self.state.pos;
                chunk_start = self.state.pos;
            } else {
                self.state.pos += 1;
            }
        }
    }

    /// Decode the escape sequence at the scan position (which is on the
    /// backslash) into `out`. Inside templates, an invalid escape records its
    /// position and returns `false` instead of failing.
    fn read_escaped_char(&mut self, in_template: bool, out: &mut String) -> ParseResult<bool> {
        let throw_on_invalid = !in_template;
        self.state.pos += 1;
        let Some(ch) = self.cur_char() else {
            return Ok(true);
        };
        self.state.pos += 1;
        match ch {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'v' => out.push('\u{B}'),
            'f' => out.push('\u{C}'),
            'x' => match self.read_hex_char(2, throw_on_invalid)? {
                Some(code) => out.push(char::from_u32(code).unwrap_or('\u{FFFD}')),
                None => return Ok(false),
            },
            'u' => return self.read_unicode_escape(throw_on_invalid, out),
            '\r' | '\n' | '\u{2028}' | '\u{2029}' => {
                if ch == '\r' && self.cur_char() == Some('\n') {
                    self.state.pos += 1;
                }
                self.state.line_start = self.state.pos;
                self.state.cur_line += 1;
            }
            '0'..='7' => {
                let code_pos = self.state.pos - 1;
                let mut digits: String = self.input[code_pos as usize..]
                    .iter()
                    .take(3)
                    .take_while(|c| is_octal_digit(**c))
                    .collect();
                let mut octal = u32::from_str_radix(&digits, 8).unwrap_or(0);
                if octal > 255 {
                    digits.pop();
                    octal = u32::from_str_radix(&digits, 8).unwrap_or(0);
                }
                let after = self.char_at(code_pos + digits.len() as TextPos);
                if digits != "0" || matches!(after, Some('8' | '9')) {
                    if !self.note_legacy_escape(code_pos, in_template)? {
                        return Ok(false);
                    }
                }
                self.state.pos = code_pos + digits.len() as TextPos;
                out.push(char::from_u32(octal).unwrap_or('\0'));
            }
            '8' | '9' => {
                if !self.note_legacy_escape(self.state.pos - 1, in_template)? {
                    return Ok(false);
                }
                out.push(ch);
            }
            _ => out.push(ch),
        }
        Ok(true)
    }

    /// Handle a legacy octal or `\8`/`\9` escape at `code_pos`.
    fn note_legacy_escape(&mut self, code_pos: TextPos, in_template: bool) -> ParseResult<bool> {
        if in_template {
            self.state.invalid_template_escape_position = Some(code_pos);
            return Ok(false);
        }
        if self.state.strict {
            return Err(self.raise(code_pos, &messages::OCTAL_IN_STRICT, &[]));
        }
        if !self.state.contains_octal {
            self.state.contains_octal = true;
            self.state.octal_position = Some(code_pos);
        }
        Ok(true)
    }

    fn read_unicode_escape(&mut self, throw_on_invalid: bool, out: &mut String) -> ParseResult<bool> {
        let Some(code) = self.read_code_point(throw_on_invalid)? else {
            return Ok(false);
        };
        if (0xD800..=0xDBFF).contains(&code) {
            if let Some(low) = self.peek_low_surrogate(self.state.pos) {
                self.state.pos += 6;
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                return Ok(true);
            }
        }
        out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        Ok(true)
    }

    /// A `\uXXXX` low surrogate escape at `pos`, if there is one.
    fn peek_low_surrogate(&self, pos: TextPos) -> Option<u32> {
        if self.char_at(pos) != Some('\\') || self.char_at(pos + 1) != Some('u') {
            return None;
        }
        let mut code = 0;
        for i in 0..4 {
            code = code * 16 + self.char_at(pos + 2 + i)?.to_digit(16)?;
        }
        (0xDC00..=0xDFFF).contains(&code).then_some(code)
    }

    /// Read the code point after `\u`, in either `{...}` or four-digit form.
    fn read_code_point(&mut self, throw_on_invalid: bool) -> ParseResult<Option<u32>> {
        if self.cur_char() != Some('{') {
            return self.read_hex_char(4, throw_on_invalid);
        }
        self.state.pos += 1;
        let code_pos = self.state.pos;
        let len = self.input[code_pos as usize..]
            .iter()
            .position(|c| *c == '}')
            .unwrap_or(0) as u32;
        let code = self.read_hex_char(len, throw_on_invalid)?;
        self.state.pos += 1;
        match code {
            Some(code) if code > 0x10FFFF => {
                if throw_on_invalid {
                    return Err(self.raise(code_pos, &messages::CODE_POINT_OUT_OF_BOUNDS, &[]));
                }
                self.state.invalid_template_escape_position = Some(code_pos - 2);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn read_hex_char(&mut self, len: u32, throw_on_invalid: bool) -> ParseResult<Option<u32>> {
        let code_pos = self.state.pos;
        match self.read_int(16, Some(len), false)? {
            Some(value) => Ok(Some(value as u32)),
            None if throw_on_invalid => Err(self.raise(code_pos, &messages::BAD_ESCAPE, &[])),
            None => {
                self.state.pos = code_pos - 1;
                self.state.invalid_template_escape_position = Some(code_pos - 1);
                Ok(None)
            }
        }
    }

    // ========================================================================
    // Words
    // ========================================================================

    /// Read an identifier name, decoding `\u` escapes.
    pub fn read_word1(&mut self) -> ParseResult<String> {
        self.state.contains_esc = false;
        let mut word = String::new();
        let mut first = true;
        let mut chunk_start = self.state.pos;
        while let Some(ch) = self.cur_char() {
            if is_identifier_char(ch) {
                self.state.pos += 1;
            } else if ch == '\\' {
                self.state.contains_esc = true;
                self.push_slice(&mut word, chunk_start, self.state.pos);
                let esc_start = self.state.pos;
                self.state.pos += 1;
                if self.cur_char() != Some('u') {
                    return Err(self.raise(
                        self.state.pos,
                        &messages::EXPECTING_UNICODE_ESCAPE,
                        &[],
                    ));
                }
                self.state.pos += 1;
                let escaped = self
                    .read_code_point(true)?
                    .and_then(char::from_u32)
                    .filter(|c| {
                        if first {
                            is_identifier_start(*c)
                        } else {
                            is_identifier_char(*c)
                        }
                    });
                let Some(escaped) = escaped else {
                    return Err(self.raise(esc_start, &messages::INVALID_UNICODE_ESCAPE, &[]));
                };
                word.push(escaped);
                chunk_start = self.state.pos;
            } else {
                break;
            }
            first = false;
        }
        self.push_slice(&mut word, chunk_start, self.state.pos);
        Ok(word)
    }

    fn read_word(&mut self) -> ParseResult<()> {
        let word = self.read_word1()?;
        let token_type = match TokenType::from_keyword(&word) {
            Some(keyword) => {
                if self.state.contains_esc {
                    return Err(self.raise(self.state.start, &messages::ESCAPED_KEYWORD, &[&word]));
                }
                keyword
            }
            None => TokenType::Name,
        };
        self.finish_token(token_type, TokenValue::Str(word));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer(source: &str, plugins: &[Plugin], in_module: bool) -> Tokenizer {
        let options = TokenizerOptions {
            tokens: true,
            plugins: plugins.iter().copied().collect(),
            ..TokenizerOptions::default()
        };
        Tokenizer::new(source, options, in_module, in_module)
    }

    fn lex_with(source: &str, plugins: &[Plugin]) -> ParseResult<Vec<(TokenType, TokenValue)>> {
        let mut tok = tokenizer(source, plugins, false);
        tok.next_token()?;
        let mut out = Vec::new();
        while !tok.is(TokenType::Eof) {
            out.push((tok.state.token_type, tok.state.value.clone()));
            tok.next()?;
        }
        Ok(out)
    }

    fn types(source: &str) -> Vec<TokenType> {
        lex_with(source, &[])
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    fn str_value(s: &str) -> TokenValue {
        TokenValue::Str(s.to_string())
    }

    #[test]
    fn test_slash_is_division_after_operand() {
        use TokenType::*;
        assert_eq!(types("a / b / c"), vec![Name, Slash, Name, Slash, Name]);
        assert_eq!(types("x = /ab+c/gi"), vec![Name, Eq, Regexp]);
        assert_eq!(types("(a) / 2"), vec![ParenL, Name, ParenR, Slash, Num]);
    }

    #[test]
    fn test_regexp_value() {
        let tokens = lex_with("/[/]\\//y", &[]).unwrap();
        assert_eq!(
            tokens[0].1,
            TokenValue::Regex {
                pattern: "[/]\\/".into(),
                flags: "y".into()
            }
        );
    }

    #[test]
    fn test_regexp_flag_errors() {
        let err = lex_with("/a/gg", &[]).unwrap_err();
        assert_eq!(err.reason_code, "DuplicateRegExpFlags");
        let err = lex_with("/a/gz", &[]).unwrap_err();
        assert_eq!(err.reason_code, "MalformedRegExpFlags");
        let err = lex_with("/abc\n/", &[]).unwrap_err();
        assert_eq!(err.pos, 0);
    }

    #[test]
    fn test_brace_block_versus_object() {
        use TokenType::*;
        // A block followed by a regexp statement.
        assert_eq!(types("{}/foo/g"), vec![BraceL, BraceR, Regexp]);
        // An object literal followed by division.
        assert_eq!(
            types("x = {}/foo/g"),
            vec![Name, Eq, BraceL, BraceR, Slash, Name, Slash, Name]
        );
    }

    #[test]
    fn test_function_expression_body_ends_expression() {
        use TokenType::*;
        let toks = types("x = function(){} / 1");
        assert_eq!(toks[toks.len() - 2], Slash);
        let toks = types("function f(){} /1/g");
        assert_eq!(toks.last(), Some(&Regexp));
    }

    #[test]
    fn test_template_tokens() {
        use TokenType::*;
        let tokens = lex_with("`a${b}c`", &[]).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            kinds,
            vec![BackQuote, Template, DollarBraceL, Name, BraceR, Template, BackQuote]
        );
        assert_eq!(tokens[1].1, str_value("a"));
        assert_eq!(tokens[5].1, str_value("c"));
    }

    #[test]
    fn test_template_invalid_escape_is_not_an_error() {
        let mut tok = tokenizer("`\\unicode`", &[], false);
        tok.next_token().unwrap();
        tok.next().unwrap();
        assert!(tok.is(TokenType::Template));
        assert_eq!(tok.state.value, TokenValue::None);
        assert_eq!(tok.state.invalid_template_escape_position, Some(2));
    }

    #[test]
    fn test_template_normalizes_crlf() {
        let tokens = lex_with("`a\r\nb`", &[]).unwrap();
        assert_eq!(tokens[1].1, str_value("a\nb"));
    }

    #[test]
    fn test_numbers() {
        let num = |src: &str| match lex_with(src, &[Plugin::NumericSeparator]).unwrap()[0].1 {
            TokenValue::Num(n) => n,
            ref other => panic!("not a number: {other:?}"),
        };
        assert_eq!(num("0x1F"), 31.0);
        assert_eq!(num("0o17"), 15.0);
        assert_eq!(num("0b101"), 5.0);
        assert_eq!(num("017"), 15.0);
        assert_eq!(num("019"), 19.0);
        assert_eq!(num("1e3"), 1000.0);
        assert_eq!(num(".5"), 0.5);
        assert_eq!(num("1_000_000"), 1_000_000.0);
        assert_eq!(num("0xFF_FF"), 65535.0);
    }

    #[test]
    fn test_number_errors() {
        let err = lex_with("1_000", &[]).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["numericSeparator".to_string()]));
        let err = lex_with("1__0", &[Plugin::NumericSeparator]).unwrap_err();
        assert_eq!(err.reason_code, "UnexpectedNumericSeparator");
        let err = lex_with("3in x", &[]).unwrap_err();
        assert_eq!(err.reason_code, "NumberIdentifier");
        let err = lex_with("0x", &[]).unwrap_err();
        assert_eq!(err.message, "Expected number in radix 16");
        assert_eq!(err.pos, 2);
    }

    #[test]
    fn test_separator_after_leading_zero() {
        let err = lex_with("0_1", &[Plugin::NumericSeparator]).unwrap_err();
        assert_eq!(err.reason_code, "ZeroDigitNumericSeparator");
        assert_eq!(err.pos, 1);
        let err = lex_with("08_1", &[Plugin::NumericSeparator]).unwrap_err();
        assert_eq!(err.reason_code, "ZeroDigitNumericSeparator");
        assert_eq!(err.pos, 2);
    }

    #[test]
    fn test_legacy_octal_in_strict() {
        let mut tok = tokenizer("010", &[], true);
        let err = tok.next_token().unwrap_err();
        assert_eq!(err.reason_code, "StrictOctalLiteral");
    }

    #[test]
    fn test_bigint() {
        let tokens = lex_with("0x1_0n 10n", &[Plugin::BigInt, Plugin::NumericSeparator]).unwrap();
        assert_eq!(tokens[0], (TokenType::BigInt, str_value("0x10")));
        assert_eq!(tokens[1], (TokenType::BigInt, str_value("10")));
        let err = lex_with("10n", &[]).unwrap_err();
        assert_eq!(err.missing_plugin, Some(vec!["bigInt".to_string()]));
        let err = lex_with("1.5n", &[Plugin::BigInt]).unwrap_err();
        assert_eq!(err.reason_code, "InvalidBigIntLiteral");
    }

    #[test]
    fn test_string_escapes() {
        let value = |src: &str| lex_with(src, &[]).unwrap()[0].1.clone();
        assert_eq!(value(r#""\x41B\u{43}""#), str_value("ABC"));
        assert_eq!(value(r#""\u{1F600}""#), str_value("\u{1F600}"));
        assert_eq!(value(r#""😀""#), str_value("\u{1F600}"));
        assert_eq!(value(r#""\uD83D""#), str_value("\u{FFFD}"));
        assert_eq!(value("\"a\\\nb\""), str_value("ab"));
        assert_eq!(value(r#"'\101'"#), str_value("A"));
        assert_eq!(value(r#"'\0'"#), str_value("\0"));
    }

    #[test]
    fn test_octal_escape_is_recorded() {
        let mut tok = tokenizer(r#""\07""#, &[], false);
        tok.next_token().unwrap();
        assert!(tok.state.contains_octal);
        assert_eq!(tok.state.octal_position, Some(2));
    }

    #[test]
    fn test_string_errors() {
        let err = lex_with("\"abc", &[]).unwrap_err();
        assert_eq!(err.reason_code, "UnterminatedString");
        assert_eq!(err.loc, Position::new(1, 0));
        let err = lex_with("x = 'a\nb'", &[]).unwrap_err();
        assert_eq!(err.pos, 4);
        let err = lex_with(r#""\u{110000}""#, &[]).unwrap_err();
        assert_eq!(err.reason_code, "InvalidCodePoint");
        let err = lex_with(r#""\xZ1""#, &[]).unwrap_err();
        assert_eq!(err.reason_code, "InvalidEscapeSequence");
    }

    #[test]
    fn test_identifier_escapes() {
        let tokens = lex_with("\\u0061bc", &[]).unwrap();
        assert_eq!(tokens[0], (TokenType::Name, str_value("abc")));
        let err = lex_with("\\u0076ar", &[]).unwrap_err();
        assert_eq!(err.message, "Escape sequence in keyword var");
        let err = lex_with("a\\u002d", &[]).unwrap_err();
        assert_eq!(err.reason_code, "EscapedCharNotAnIdentifier");
        let err = lex_with("a\\x41", &[]).unwrap_err();
        assert_eq!(err.reason_code, "MissingUnicodeEscape");
    }

    #[test]
    fn test_operators() {
        use TokenType::*;
        assert_eq!(
            types("a ?? b ?. c ? .5 : d"),
            vec![Name, NullishCoalescing, Name, QuestionDot, Name, Question, Num, Colon, Name]
        );
        assert_eq!(types("a **= b >>>= c"), vec![Name, Assign, Name, Assign, Name]);
        assert_eq!(types("a !== b => ..."), vec![Name, Equality, Name, Arrow, Ellipsis]);
        assert_eq!(types("x++ + ~y"), vec![Name, IncDec, PlusMin, Tilde, Name]);
        let err = lex_with("a ||= b", &[]).unwrap_err();
        assert!(err.is_missing_plugin());
        assert_eq!(
            lex_with("a ||= b", &[Plugin::LogicalAssignment]).unwrap()[1],
            (Assign, str_value("||="))
        );
    }

    #[test]
    fn test_keyword_after_dot_is_not_an_expression_start() {
        use TokenType::*;
        assert_eq!(types("a.if / 2"), vec![Name, Dot, If, Slash, Num]);
    }

    #[test]
    fn test_comments_are_recorded_with_whitespace_runs() {
        let mut tok = tokenizer("/* a */ x // b\n y", &[], false);
        tok.next_token().unwrap();
        while !tok.is(TokenType::Eof) {
            tok.next().unwrap();
        }
        // Consuming eof records it.
        tok.next().unwrap();
        let recording = tok.take_recording();
        assert_eq!(recording.comments.len(), 2);
        assert_eq!(recording.comments[0].value, " a ");
        assert!(recording.comments[0].is_block());
        assert_eq!(recording.comments[1].value, " b");
        assert_eq!(recording.comment_whitespace.len(), 2);
        assert_eq!(recording.comment_whitespace[0].start, 0);
        assert_eq!(recording.comment_whitespace[0].end, 8);
        assert_eq!(recording.comment_whitespace[1].comments, vec![1]);
        // Comments are interleaved with tokens: comment, x, comment, y, eof.
        assert_eq!(recording.tokens.len(), 5);
        assert!(matches!(recording.tokens[0], TokenEntry::Comment(_)));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = lex_with("x /* y", &[]).unwrap_err();
        assert_eq!(err.reason_code, "UnterminatedComment");
        assert_eq!(err.pos, 2);
    }

    #[test]
    fn test_html_comments_in_scripts() {
        use TokenType::*;
        assert_eq!(types("a <!-- b\nc"), vec![Name, Name]);
        assert_eq!(types("a\n--> b\nc"), vec![Name, Name]);
        assert_eq!(types("a --> b"), vec![Name, IncDec, Relational, Name]);
    }

    #[test]
    fn test_html_comment_in_module() {
        let mut tok = tokenizer("<!-- x", &[], true);
        let err = tok.next_token().unwrap_err();
        assert_eq!(err.reason_code, "UnexpectedHTMLComment");
    }

    #[test]
    fn test_interpreter_directive() {
        let tokens = lex_with("#!/usr/bin/env node\nx", &[]).unwrap();
        assert_eq!(
            tokens[0],
            (TokenType::InterpreterDirective, str_value("/usr/bin/env node"))
        );
        assert_eq!(tokens[1].0, TokenType::Name);
    }

    #[test]
    fn test_hash_outside_class() {
        let err = lex_with("#x", &[]).unwrap_err();
        assert_eq!(err.message, "Unexpected character '#'");
    }

    #[test]
    fn test_private_name_requires_plugin() {
        let mut tok = tokenizer("#x", &[], false);
        tok.state.class_level = 1;
        let err = tok.next_token().unwrap_err();
        assert_eq!(
            err.missing_plugin,
            Some(vec![
                "classPrivateProperties".to_string(),
                "classPrivateMethods".to_string()
            ])
        );
    }

    #[test]
    fn test_positions_track_lines() {
        let mut tok = tokenizer("a\r\n  b\u{2028}c", &[], false);
        tok.next_token().unwrap();
        tok.next().unwrap();
        assert_eq!(tok.state.start_loc, Position::new(2, 2));
        tok.next().unwrap();
        assert_eq!(tok.state.start_loc, Position::new(3, 0));
        assert!(tok.has_preceding_line_break());
    }

    #[test]
    fn test_lookahead_restores_state() {
        let mut tok = tokenizer("let /* c */ x = 1", &[], false);
        tok.next_token().unwrap();
        let ahead = tok.lookahead().unwrap();
        assert_eq!(ahead.token_type, TokenType::Name);
        assert_eq!(ahead.value, str_value("x"));
        assert_eq!(tok.state.value, str_value("let"));
        assert_eq!(tok.next_token_start(), 12);
        assert_eq!(tok.take_recording().comments.len(), 0);
    }

    #[test]
    fn test_restored_snapshot_discards_recorded_comments() {
        let mut tok = tokenizer("a /* one */ b", &[], false);
        tok.next_token().unwrap();
        let snapshot = tok.state.clone();
        tok.next().unwrap();
        tok.state = snapshot;
        tok.next().unwrap();
        let recording = tok.take_recording();
        assert_eq!(recording.comments.len(), 1);
        assert_eq!(recording.comment_whitespace.len(), 1);
    }

    #[test]
    fn test_rescan_current_applies_strict_mode() {
        let mut tok = tokenizer("\n  010", &[], false);
        tok.next_token().unwrap();
        assert!(tok.is(TokenType::Num));
        tok.state.strict = true;
        let err = tok.rescan_current().unwrap_err();
        assert_eq!(err.loc, Position::new(2, 2));
    }
}
