//! Token contexts.
//!
//! The tokenizer keeps a stack of these to decide what an ambiguous character
//! means at the current position: whether `/` starts a regular expression,
//! whether `{` opens a block or an object, and when template or JSX text is
//! being read.

/// A grammatical context the tokenizer is inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokContext {
    BraceStatement,
    BraceExpression,
    /// The `${ ... }` part of a template.
    TemplateQuasi,
    ParenStatement,
    ParenExpression,
    /// Inside a template literal's text.
    Template,
    FunctionExpression,
    FunctionStatement,
    JsxOpenTag,
    JsxCloseTag,
    /// Between the tags of a JSX element, where text is read.
    JsxChild,
}

impl TokContext {
    /// The token that opened this context.
    pub fn token(self) -> &'static str {
        match self {
            TokContext::BraceStatement | TokContext::BraceExpression => "{",
            TokContext::TemplateQuasi => "${",
            TokContext::ParenStatement | TokContext::ParenExpression => "(",
            TokContext::Template => "`",
            TokContext::FunctionExpression | TokContext::FunctionStatement => "function",
            TokContext::JsxOpenTag => "<tag",
            TokContext::JsxCloseTag => "</tag",
            TokContext::JsxChild => "<tag>...</tag>",
        }
    }

    /// Whether the context is an expression, so a closing token ends one.
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            TokContext::BraceExpression
                | TokContext::ParenExpression
                | TokContext::Template
                | TokContext::FunctionExpression
                | TokContext::JsxChild
        )
    }

    /// Whether whitespace is significant, so it must not be skipped.
    pub fn preserve_space(self) -> bool {
        matches!(self, TokContext::Template | TokContext::JsxChild)
    }
}
