//! Source comments.

use ecma_core::text::{SourceLocation, TextPos};
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CommentKind {
    #[serde(rename = "CommentBlock")]
    Block,
    #[serde(rename = "CommentLine")]
    Line,
}

/// A `/* */` or `//` comment. `value` excludes the delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[TextPos; 2]>,
}

impl Comment {
    #[inline]
    pub fn is_block(&self) -> bool {
        self.kind == CommentKind::Block
    }
}

/// A run of whitespace and comments between two tokens.
///
/// The tokenizer records one of these for every gap that contains at least
/// one comment. `leading_node`, `trailing_node` and `container_node` are
/// resolved during attachment, so only offsets and comment indices are kept
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWhitespace {
    pub start: TextPos,
    pub end: TextPos,
    /// Indices into the recorded comment list.
    pub comments: Vec<usize>,
}
