//! The parser core.
//!
//! [`Parser`] owns the tokenizer and the enabled dialects. The grammar itself
//! is spread over `expression.rs`, `statement.rs` and `lval.rs` as further
//! `impl Parser` blocks; this file holds the token-level helpers every rule
//! uses and the speculation combinators.

use crate::dialect::Dialect;
use crate::options::ParserOptions;
use crate::plugins;
use ecma_ast::{SourceType, TokenType};
use ecma_core::text::TextPos;
use ecma_diagnostics::{messages, DiagnosticMessage, ParseResult, SyntaxError};
use ecma_scanner::{Label, Plugin, State, Tokenizer, TokenizerOptions};
use std::sync::Arc;
use tracing::trace;

/// A parser for one source text.
pub struct Parser {
    pub tok: Tokenizer,
    pub options: ParserOptions,
    pub(crate) dialects: Vec<&'static dyn Dialect>,
    pub(crate) filename: Option<Arc<str>>,
    pub(crate) in_module: bool,
    /// Set once an `import`/`export` declaration has been parsed.
    pub(crate) saw_unambiguous_esm: bool,
}

impl Parser {
    /// Create a parser. `unambiguous` input is parsed as a module; the driver
    /// decides afterwards whether to fall back to a script.
    pub fn new(source: &str, options: ParserOptions) -> ParseResult<Self> {
        options.validate()?;
        let in_module = options.source_type != SourceType::Script;
        let strict = options.is_strict(in_module);
        let filename: Option<Arc<str>> = options.source_filename.as_deref().map(Arc::from);
        let plugin_set = options.plugin_set();
        let tokenizer_options = TokenizerOptions {
            tokens: options.tokens,
            ranges: options.ranges,
            plugins: plugin_set,
            source_filename: filename.clone(),
            start_line: options.start_line,
        };
        let mut tok = Tokenizer::new(source, tokenizer_options, strict, in_module);
        let dialects = plugins::dialects_for(plugin_set);
        tok.hooks = dialects.iter().filter_map(|d| d.tokenizer_hook()).collect();
        Ok(Self {
            tok,
            options,
            dialects,
            filename,
            in_module,
            saw_unambiguous_esm: false,
        })
    }

    // ========================================================================
    // Token access
    // ========================================================================

    #[inline]
    pub fn state(&self) -> &State {
        &self.tok.state
    }

    #[inline]
    pub fn cur(&self) -> TokenType {
        self.tok.state.token_type
    }

    #[inline]
    pub fn is(&self, token_type: TokenType) -> bool {
        self.tok.is(token_type)
    }

    /// The string value of the current token, or `""`.
    #[inline]
    pub fn value(&self) -> &str {
        self.tok.state.value.str_or_empty()
    }

    #[inline]
    pub fn start(&self) -> TextPos {
        self.tok.state.start
    }

    pub fn next(&mut self) -> ParseResult<()> {
        self.tok.next()
    }

    pub fn eat(&mut self, token_type: TokenType) -> ParseResult<bool> {
        self.tok.eat(token_type)
    }

    pub fn expect(&mut self, token_type: TokenType) -> ParseResult<()> {
        if self.eat(token_type)? {
            Ok(())
        } else {
            Err(self.unexpected_expecting(token_type))
        }
    }

    /// Scan the next token without consuming the current one.
    pub fn lookahead(&mut self) -> ParseResult<State> {
        self.tok.lookahead()
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.tok.has_preceding_line_break()
    }

    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.tok.has_plugin(plugin)
    }

    pub fn expect_plugin(&self, plugin: Plugin, pos: Option<TextPos>) -> ParseResult<()> {
        self.tok.expect_plugin(plugin, pos)
    }

    pub fn expect_one_plugin(&self, plugins: &[Plugin], pos: Option<TextPos>) -> ParseResult<()> {
        self.tok.expect_one_plugin(plugins, pos)
    }

    // ========================================================================
    // Contextual keywords and operators
    // ========================================================================

    /// Whether the current token is the unescaped name `name`.
    pub fn is_contextual(&self, name: &str) -> bool {
        self.is(TokenType::Name) && self.value() == name && !self.tok.state.contains_esc
    }

    pub fn eat_contextual(&mut self, name: &str) -> ParseResult<bool> {
        if self.is_contextual(name) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn expect_contextual(&mut self, name: &str) -> ParseResult<()> {
        if self.eat_contextual(name)? {
            Ok(())
        } else {
            Err(self.raise(self.start(), &messages::UNEXPECTED_TOKEN_EXPECTED, &[name]))
        }
    }

    /// Whether the token after the current one is the name `name`.
    pub fn is_lookahead_contextual(&mut self, name: &str) -> ParseResult<bool> {
        let next = self.lookahead()?;
        Ok(next.token_type == TokenType::Name && next.value.str_or_empty() == name)
    }

    /// Whether the current token is the relational operator `op` (`<` or `>`).
    pub fn is_relational(&self, op: &str) -> bool {
        self.is(TokenType::Relational) && self.value() == op
    }

    pub fn eat_relational(&mut self, op: &str) -> ParseResult<bool> {
        if self.is_relational(op) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn expect_relational(&mut self, op: &str) -> ParseResult<()> {
        if self.eat_relational(op)? {
            Ok(())
        } else {
            Err(self.raise(self.start(), &messages::UNEXPECTED_TOKEN_EXPECTED, &[op]))
        }
    }

    // ========================================================================
    // Automatic semicolon insertion
    // ========================================================================

    pub fn can_insert_semicolon(&self) -> bool {
        self.is(TokenType::Eof) || self.is(TokenType::BraceR) || self.has_preceding_line_break()
    }

    pub fn is_line_terminator(&mut self) -> ParseResult<bool> {
        Ok(self.eat(TokenType::Semi)? || self.can_insert_semicolon())
    }

    /// Consume a statement terminator, explicit or inserted.
    pub fn semicolon(&mut self) -> ParseResult<()> {
        if self.is_line_terminator()? {
            Ok(())
        } else {
            Err(self.unexpected_expecting(TokenType::Semi))
        }
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub fn raise(&self, pos: TextPos, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        self.tok.raise(pos, message, args)
    }

    /// "Unexpected token" at the current token.
    pub fn unexpected(&self) -> SyntaxError {
        self.unexpected_at(self.start())
    }

    pub fn unexpected_at(&self, pos: TextPos) -> SyntaxError {
        self.raise(pos, &messages::UNEXPECTED_TOKEN, &[])
    }

    pub fn unexpected_expecting(&self, expected: TokenType) -> SyntaxError {
        self.raise(self.start(), &messages::UNEXPECTED_TOKEN_EXPECTED, &[expected.label()])
    }

    // ========================================================================
    // Speculation
    // ========================================================================

    /// Run `f`, rolling all parser state back if it fails.
    ///
    /// The error of the failed attempt is handed back so the caller can
    /// re-raise it when no alternative succeeds either.
    pub fn try_speculative<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let snapshot = self.tok.state.clone();
        let pos = snapshot.start;
        trace!(pos, "speculative parse");
        match f(self) {
            Ok(value) => {
                trace!(pos, end = self.tok.state.last_tok_end, "speculation committed");
                Ok(value)
            }
            Err(err) => {
                trace!(pos, error = %err, "speculation rolled back");
                self.tok.state = snapshot;
                Err(err)
            }
        }
    }

    /// Like [`Parser::try_speculative`], but `f` may also decline with
    /// `Ok(None)`. Either way the state is restored and `None` returned.
    pub fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<Option<T>>) -> Option<T> {
        let snapshot = self.tok.state.clone();
        match self.try_speculative(f) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                trace!(pos = snapshot.start, "speculation declined");
                self.tok.state = snapshot;
                None
            }
            Err(_) => None,
        }
    }

    // ========================================================================
    // Labels
    // ========================================================================

    pub(crate) fn push_label(&mut self, label: Label) {
        trace!(name = ?label.name, kind = ?label.kind, "enter label");
        self.tok.state.labels.push(label);
    }

    pub(crate) fn pop_label(&mut self) {
        if let Some(label) = self.tok.state.labels.pop() {
            trace!(name = ?label.name, "leave label");
        }
    }

    // ========================================================================
    // Scoped flags
    // ========================================================================

    /// Run `f` with `in_type` set, restoring the previous value afterwards.
    pub fn in_type<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let old = self.tok.state.in_type;
        self.tok.state.in_type = true;
        let result = f(self);
        self.tok.state.in_type = old;
        result
    }

    /// Run `f` with `in_type` cleared.
    pub fn outside_type<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let old = self.tok.state.in_type;
        self.tok.state.in_type = false;
        let result = f(self);
        self.tok.state.in_type = old;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(source: &str) -> Parser {
        let mut parser = Parser::new(source, ParserOptions::default()).unwrap();
        parser.tok.next_token().unwrap();
        parser
    }

    #[test]
    fn test_contextual_names() {
        let mut p = parser("of \\u006ff");
        assert!(p.is_contextual("of"));
        p.next().unwrap();
        assert!(!p.is_contextual("of"));
    }

    #[test]
    fn test_try_parse_restores_state() {
        let mut p = parser("a + b");
        let got = p.try_parse(|p| {
            p.next()?;
            p.next()?;
            Ok(None::<()>)
        });
        assert!(got.is_none());
        assert!(p.is(TokenType::Name));
        assert_eq!(p.value(), "a");

        let err = p.try_speculative(|p| {
            p.next()?;
            p.expect(TokenType::Semi)
        });
        assert!(err.is_err());
        assert_eq!(p.start(), 0);
    }

    #[test]
    fn test_semicolon_insertion() {
        let mut p = parser("a\nb");
        p.next().unwrap();
        assert!(p.can_insert_semicolon());
        let mut p = parser("a b");
        p.next().unwrap();
        let err = p.semicolon().unwrap_err();
        assert_eq!(err.message, "Unexpected token, expected \";\"");
    }
}
