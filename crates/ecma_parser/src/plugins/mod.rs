//! The dialect plugins.
//!
//! Each dialect is a stateless unit struct; everything it needs to remember
//! lives in the tokenizer [`State`](ecma_scanner::State) so that speculative
//! parses roll it back together with the token position.

mod estree;
mod flow;
mod jsx;
mod typescript;

use crate::dialect::Dialect;
use crate::parser::Parser;
use ecma_ast::{Node, NodeKind, TokenType};
use ecma_diagnostics::{ParseResult, SyntaxError};
use ecma_scanner::{PluginSet, TokContext, Tokenizer, TokenizerHook};
use tracing::debug;

static TYPESCRIPT: typescript::TypeScript = typescript::TypeScript;
static FLOW: flow::Flow = flow::Flow;
static JSX: jsx::Jsx = jsx::Jsx;
static ESTREE: estree::Estree = estree::Estree;

/// The dialects for `plugins`, in dispatch order.
pub(crate) fn dialects_for(plugins: PluginSet) -> Vec<&'static dyn Dialect> {
    let all: [&'static dyn Dialect; 4] = [&TYPESCRIPT, &FLOW, &JSX, &ESTREE];
    let dialects: Vec<&'static dyn Dialect> =
        all.into_iter().filter(|d| plugins.contains(d.plugin())).collect();
    debug!(dialects = ?dialects.iter().map(|d| d.plugin().name()).collect::<Vec<_>>(), "dialects enabled");
    dialects
}

// ============================================================================
// Shared by the type dialects
// ============================================================================

/// Inside a type, `<` and `>` are always single-character brackets, so
/// `Array<Array<T>>` closes twice instead of shifting.
pub(crate) struct TypeTokens;

pub(crate) static TYPE_TOKENS: TypeTokens = TypeTokens;

impl TokenizerHook for TypeTokens {
    fn name(&self) -> &'static str {
        "types"
    }

    fn tokenize_ambiguous(&self, tok: &mut Tokenizer, code: char) -> ParseResult<bool> {
        if tok.state.in_type && matches!(code, '<' | '>') {
            tok.finish_op(TokenType::Relational, 1);
            return Ok(true);
        }
        Ok(false)
    }
}

/// At a JSX tag start, try the JSX reading first. On failure the token
/// contexts the tag start opened are dropped, so the `<` can be read again
/// as the start of a type parameter list.
pub(crate) fn try_jsx_expression(p: &mut Parser, no_in: bool) -> Result<Node, SyntaxError> {
    let result = p.try_speculative(|p| p.base_maybe_assign(no_in, None, false));
    if result.is_err() && p.tok.cur_context() == TokContext::JsxOpenTag {
        p.tok.state.context.pop();
        p.tok.state.context.pop();
    }
    result
}

/// Whether `p` is at the `<` of a type parameter list, which the JSX
/// tokenizer may have read as a tag start.
pub(crate) fn at_type_parameters_start(p: &Parser) -> bool {
    p.is_relational("<") || p.is(TokenType::JsxTagStart)
}

/// Answer a question about the tokens ahead. The parser position is always
/// restored; a parse error counts as "no".
pub(crate) fn look_ahead(p: &mut Parser, f: impl FnOnce(&mut Parser) -> ParseResult<bool>) -> bool {
    let snapshot = p.tok.state.clone();
    let answer = f(p);
    p.tok.state = snapshot;
    matches!(answer, Ok(true))
}

/// Move the type annotation of a type cast onto the expression it wraps,
/// turning `(x: T)` into the parameter `x: T`.
pub(crate) fn type_cast_to_parameter(p: &Parser, mut cast: Node) -> Node {
    let NodeKind::TypeCastExpression { expression, type_annotation } = cast.kind else {
        return cast;
    };
    let mut expression = *expression;
    let end = type_annotation.end;
    let end_loc = type_annotation.loc.end;
    if let Some(slot) = expression.kind.type_annotation_slot() {
        *slot = Some(type_annotation);
        expression.end = end;
        expression.loc.end = end_loc;
        if p.options.ranges {
            expression.range = Some([expression.start, end]);
        }
        expression
    } else {
        cast.kind = NodeKind::TypeCastExpression { expression: Box::new(expression), type_annotation };
        cast
    }
}

#[cfg(test)]
mod tests {
    use super::dialects_for;
    use ecma_scanner::{Plugin, PluginSet};

    fn names(plugins: &[Plugin]) -> Vec<&'static str> {
        let set: PluginSet = plugins.iter().copied().collect();
        dialects_for(set).iter().map(|d| d.plugin().name()).collect()
    }

    #[test]
    fn test_dispatch_order() {
        assert_eq!(names(&[Plugin::Estree, Plugin::Jsx, Plugin::Typescript]), vec!["typescript", "jsx", "estree"]);
        assert_eq!(names(&[Plugin::Jsx, Plugin::Flow]), vec!["flow", "jsx"]);
        assert!(names(&[Plugin::ClassProperties]).is_empty());
    }
}
