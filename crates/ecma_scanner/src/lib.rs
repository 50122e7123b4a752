//! ecma_scanner: Tokenizer for ECMAScript source text.
//!
//! Produces tokens on demand for the parser, with:
//! - A token context stack for `/`, `{` and template disambiguation
//! - Templates, regular expressions, numeric separators and bigints
//! - JSX text, names and entities
//! - Snapshot and rollback of all tokenizer state through [`State`]
//! - Hooks that let syntax dialects claim characters and contexts

pub mod char_codes;
pub mod context;
pub mod identifier;
mod jsx;
pub mod plugins;
pub mod state;
pub mod tokenizer;
pub mod xhtml;

pub use context::TokContext;
pub use plugins::{Plugin, PluginSet};
pub use state::{Label, LabelKind, State};
pub use tokenizer::{Recording, Tokenizer, TokenizerHook, TokenizerOptions};
