//! JSX tokenization.
//!
//! Inside a JSX element the tokenizer reads text, tag names with dashes and
//! attribute strings without escapes. These functions are driven by the JSX
//! dialect's [`TokenizerHook`](crate::TokenizerHook).

use crate::char_codes::is_line_break;
use crate::context::TokContext;
use crate::identifier::{is_identifier_char, is_identifier_start};
use crate::tokenizer::Tokenizer;
use crate::xhtml::lookup_entity;
use ecma_ast::{TokenType, TokenValue};
use ecma_diagnostics::{messages, ParseResult};

impl Tokenizer {
    /// Claim characters whose meaning changes inside JSX.
    pub fn jsx_tokenize_ambiguous(&mut self, code: char) -> ParseResult<bool> {
        if self.state.in_property_name {
            return Ok(false);
        }
        let context = self.cur_context();
        if context == TokContext::JsxChild {
            self.jsx_read_token()?;
            return Ok(true);
        }
        if matches!(context, TokContext::JsxOpenTag | TokContext::JsxCloseTag) {
            if is_identifier_start(code) {
                self.jsx_read_word();
                return Ok(true);
            }
            if code == '>' {
                self.state.pos += 1;
                self.finish_token(TokenType::JsxTagEnd, TokenValue::None);
                return Ok(true);
            }
            if matches!(code, '"' | '\'') && context == TokContext::JsxOpenTag {
                self.jsx_read_string(code)?;
                return Ok(true);
            }
        }
        if code == '<' && self.state.expr_allowed {
            self.state.pos += 1;
            self.finish_token(TokenType::JsxTagStart, TokenValue::None);
            return Ok(true);
        }
        Ok(false)
    }

    /// Context rules for JSX tokens. Returns `true` when the base rules
    /// must not run.
    pub fn jsx_update_context(&mut self, prev: TokenType) -> bool {
        let token_type = self.state.token_type;
        let context = self.cur_context();
        match token_type {
            TokenType::BraceL if context == TokContext::JsxOpenTag => {
                self.state.context.push(TokContext::BraceExpression);
            }
            TokenType::BraceL if context == TokContext::JsxChild => {
                self.state.context.push(TokContext::TemplateQuasi);
            }
            TokenType::BraceL => return false,
            TokenType::Slash if prev == TokenType::JsxTagStart => {
                // `</`: the tag start opened a child and an open tag.
                self.state.context.pop();
                self.state.context.pop();
                self.state.context.push(TokContext::JsxCloseTag);
                self.state.expr_allowed = false;
                return true;
            }
            TokenType::JsxTagStart => {
                self.state.context.push(TokContext::JsxChild);
                self.state.context.push(TokContext::JsxOpenTag);
                self.state.expr_allowed = false;
                return true;
            }
            TokenType::JsxTagEnd => {
                let out = self.state.context.pop();
                if (out == Some(TokContext::JsxOpenTag) && prev == TokenType::Slash)
                    || out == Some(TokContext::JsxCloseTag)
                {
                    self.state.context.pop();
                    self.state.expr_allowed = self.cur_context() == TokContext::JsxChild;
                } else {
                    self.state.expr_allowed = true;
                }
                return true;
            }
            _ => return false,
        }
        self.state.expr_allowed = true;
        true
    }

    /// Read JSX text up to the next `<` or `{`.
    pub fn jsx_read_token(&mut self) -> ParseResult<()> {
        let mut out = String::new();
        let mut chunk_start = self.state.pos;
        loop {
            let Some(ch) = self.cur_char() else {
                return Err(self.raise(self.state.start, &messages::JSX_UNTERMINATED_CONTENTS, &[]));
            };
            match ch {
                '<' | '{' => {
                    if self.state.pos == self.state.start {
                        if ch == '<' && self.state.expr_allowed {
                            self.state.pos += 1;
                            self.finish_token(TokenType::JsxTagStart, TokenValue::None);
                            return Ok(());
                        }
                        return self.get_token_from_code(ch);
                    }
                    out.push_str(&self.slice(chunk_start, self.state.pos));
                    self.finish_token(TokenType::JsxText, TokenValue::Str(out));
                    return Ok(());
                }
                '&' => {
                    out.push_str(&self.slice(chunk_start, self.state.pos));
                    out.push(self.jsx_read_entity());
                    chunk_start = self.state.pos;
                }
                _ if is_line_break(ch) => {
                    out.push_str(&self.slice(chunk_start, self.state.pos));
                    self.jsx_read_new_line(true, &mut out);
                    chunk_start = self.state.pos;
                }
                _ => self.state.pos += 1,
            }
        }
    }

    /// Consume a line break, appending it to `out`. With `normalize_crlf`,
    /// `\r\n` is appended as `\n`.
    fn jsx_read_new_line(&mut self, normalize_crlf: bool, out: &mut String) {
        let ch = self.cur_char();
        self.state.pos += 1;
        if ch == Some('\r') && self.cur_char() == Some('\n') {
            self.state.pos += 1;
            out.push_str(if normalize_crlf { "\n" } else { "\r\n" });
        } else if let Some(ch) = ch {
            out.push(ch);
        }
        self.state.cur_line += 1;
        self.state.line_start = self.state.pos;
    }

    /// Read an attribute string. Entities are decoded, backslashes are not.
    fn jsx_read_string(&mut self, quote: char) -> ParseResult<()> {
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
            if ch == '&' {
                out.push_str(&self.slice(chunk_start, self.state.pos));
                out.push(self.jsx_read_entity());
                chunk_start = self.state.pos;
            } else if is_line_break(ch) {
                out.push_str(&self.slice(chunk_start, self.state.pos));
                self.jsx_read_new_line(false, &mut out);
                chunk_start = self.state.pos;
            } else {
                self.state.pos += 1;
            }
        }
        out.push_str(&self.slice(chunk_start, self.state.pos));
        self.state.pos += 1;
        self.finish_token(TokenType::String, TokenValue::Str(out));
        Ok(())
    }

    /// Decode an entity at `&`. If the reference is not recognized, only the
    /// ampersand is consumed.
    fn jsx_read_entity(&mut self) -> char {
        let start = self.state.pos;
        self.state.pos += 1;
        let mut name = String::new();
        let mut decoded = None;
        while self.state.pos < self.len() && name.len() < 10 {
            let Some(ch) = self.cur_char() else { break };
            self.state.pos += 1;
            if ch == ';' {
                decoded = if let Some(hex) = name.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                } else if let Some(dec) = name.strip_prefix('#') {
                    dec.parse::<u32>().ok().and_then(char::from_u32)
                } else {
                    lookup_entity(&name)
                };
                break;
            }
            name.push(ch);
        }
        match decoded {
            Some(ch) => ch,
            None => {
                self.state.pos = start + 1;
                '&'
            }
        }
    }

    /// Read a JSX tag or attribute name, which may contain dashes.
    fn jsx_read_word(&mut self) {
        let start = self.state.pos;
        while self
            .cur_char()
            .is_some_and(|ch| is_identifier_char(ch) || ch == '-')
        {
            self.state.pos += 1;
        }
        let word = self.slice(start, self.state.pos);
        self.finish_token(TokenType::JsxName, TokenValue::Str(word));
    }
}

#[cfg(test)]
mod tests {
    use crate::plugins::Plugin;
    use crate::tokenizer::{Tokenizer, TokenizerHook, TokenizerOptions};
    use ecma_ast::{TokenType, TokenValue};
    use ecma_diagnostics::ParseResult;

    struct JsxHook;

    impl TokenizerHook for JsxHook {
        fn name(&self) -> &'static str {
            "jsx"
        }

        fn tokenize_ambiguous(&self, tok: &mut Tokenizer, code: char) -> ParseResult<bool> {
            tok.jsx_tokenize_ambiguous(code)
        }

        fn update_context(&self, tok: &mut Tokenizer, prev: TokenType) -> bool {
            tok.jsx_update_context(prev)
        }
    }

    static JSX: JsxHook = JsxHook;

    fn lex(source: &str) -> ParseResult<Vec<(TokenType, TokenValue)>> {
        let options = TokenizerOptions {
            plugins: [Plugin::Jsx].into_iter().collect(),
            ..TokenizerOptions::default()
        };
        let mut tok = Tokenizer::new(source, options, false, false);
        tok.hooks.push(&JSX);
        tok.next_token()?;
        let mut out = Vec::new();
        while !tok.is(TokenType::Eof) {
            out.push((tok.state.token_type, tok.state.value.clone()));
            tok.next()?;
        }
        Ok(out)
    }

    fn kinds(source: &str) -> Vec<TokenType> {
        lex(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_element_with_text_and_expression() {
        use TokenType::*;
        assert_eq!(
            kinds("<a b=\"c\">hi {x}</a>"),
            vec![
                JsxTagStart, JsxName, JsxName, Eq, String, JsxTagEnd, JsxText, BraceL, Name,
                BraceR, JsxTagStart, Slash, JsxName, JsxTagEnd
            ]
        );
    }

    #[test]
    fn test_self_closing_element_resumes_expression() {
        use TokenType::*;
        assert_eq!(
            kinds("x = <br/> / 2"),
            vec![Name, Eq, JsxTagStart, JsxName, Slash, JsxTagEnd, Slash, Num]
        );
    }

    #[test]
    fn test_dashed_names_and_entities() {
        let tokens = lex("<data-x y='a&amp;b'>&lt;&#65;&#x42;&bogus;</data-x>").unwrap();
        assert_eq!(tokens[1].1, TokenValue::Str("data-x".into()));
        assert_eq!(tokens[4].1, TokenValue::Str("a&b".into()));
        assert_eq!(tokens[6].1, TokenValue::Str("<AB&bogus;".into()));
    }

    #[test]
    fn test_text_keeps_line_breaks() {
        let tokens = lex("<a>\r\n  x\n</a>").unwrap();
        assert_eq!(tokens[3].1, TokenValue::Str("\n  x\n".into()));
    }

    #[test]
    fn test_unterminated_contents() {
        let err = lex("<a>text").unwrap_err();
        assert_eq!(err.reason_code, "UnterminatedJsxContent");
    }

    #[test]
    fn test_less_than_is_relational_after_operand() {
        use TokenType::*;
        assert_eq!(kinds("a < b"), vec![Name, Relational, Name]);
    }
}
