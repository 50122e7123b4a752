//! Recorded tokens.

use crate::comment::Comment;
use crate::token_type::TokenType;
use ecma_core::text::{SourceLocation, TextPos};
use serde::Serialize;

/// The decoded value attached to a token.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    #[default]
    None,
    Str(String),
    Num(f64),
    Regex { pattern: String, flags: String },
}

impl TokenValue {
    /// The string payload, for names, strings, templates and operators.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The string payload, or the empty string.
    pub fn str_or_empty(&self) -> &str {
        self.as_str().unwrap_or("")
    }
}

/// A finished token, as recorded when `tokens` output is requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "is_none_value")]
    pub value: TokenValue,
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[TextPos; 2]>,
}

fn is_none_value(value: &TokenValue) -> bool {
    matches!(value, TokenValue::None)
}

/// The output token list interleaves comments with tokens in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenEntry {
    Token(Token),
    Comment(Comment),
}

impl TokenEntry {
    pub fn start(&self) -> TextPos {
        match self {
            TokenEntry::Token(t) => t.start,
            TokenEntry::Comment(c) => c.start,
        }
    }
}
