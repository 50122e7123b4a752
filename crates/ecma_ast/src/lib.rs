//! ecma_ast: Syntax tree, token and comment definitions.
//!
//! Nodes follow the shape of the widely used Babel AST: every node carries
//! `start`/`end` character offsets, a line/column `loc`, and optional comment
//! lists, and serializes to the familiar JSON form.

pub mod comment;
pub mod node;
pub mod token;
pub mod token_type;
pub mod types;
pub mod visitor;

pub use comment::{Comment, CommentKind, CommentWhitespace};
pub use node::*;
pub use token::{Token, TokenEntry, TokenValue};
pub use token_type::{OperatorPrecedence, TokenType};
pub use types::{ModifierFlags, SourceType};
