//! ecma_parser: a recursive descent parser for ECMAScript with JSX, Flow,
//! TypeScript and ESTree dialects.
//!
//! [`parse`] turns a source text into a `File` node and [`parse_expression`]
//! a single expression. Both are pure functions of their input and options;
//! a malformed input yields a [`SyntaxError`] and never a panic.
//!
//! ```text
//! source ──► Tokenizer ──► Parser (+ dialect hooks) ──► comment attachment
//!                                                   ──► dialect output shape
//! ```

mod class;
mod comments;
mod dialect;
mod expression;
mod function;
mod lval;
mod module;
mod node_builder;
mod options;
mod parser;
mod plugins;
mod statement;

pub use ecma_ast::{Comment, Node, NodeKind, SourceType, TokenEntry};
pub use ecma_diagnostics::{ParseResult, SyntaxError};
pub use ecma_scanner::Plugin;
pub use options::ParserOptions;
pub use parser::Parser;

use ecma_ast::visitor::walk_postorder_mut;
use ecma_ast::TokenType;
use tracing::{debug, trace};

/// Parse a whole program.
///
/// With [`SourceType::Unambiguous`] the input is parsed as a module first.
/// If that fails, or the module contains no `import`/`export`, the result is
/// a script.
pub fn parse(source: &str, options: ParserOptions) -> ParseResult<Node> {
    if options.source_type != SourceType::Unambiguous {
        return parse_file(source, options).map(|(file, _)| file);
    }
    let module_options = options.clone().with_source_type(SourceType::Module);
    match parse_file(source, module_options) {
        Ok((file, true)) => Ok(file),
        Ok((mut file, false)) => {
            trace!("no module syntax, relabelling as script");
            if let NodeKind::File { program, .. } = &mut file.kind {
                if let NodeKind::Program { source_type, .. } = &mut program.kind {
                    *source_type = SourceType::Script.as_str();
                }
            }
            Ok(file)
        }
        Err(module_error) => {
            trace!(pos = module_error.pos, "module parse failed, retrying as script");
            let script_options = options.with_source_type(SourceType::Script);
            parse_file(source, script_options).map(|(file, _)| file).map_err(|_| module_error)
        }
    }
}

/// Parse a single expression that must span the whole input.
///
/// Comments inside the expression are attached to its nodes; there is no
/// surrounding `File` to carry the flat list.
pub fn parse_expression(source: &str, options: ParserOptions) -> ParseResult<Node> {
    debug!(plugins = ?options.plugins, "parse expression");
    let mut parser = Parser::new(source, options)?;
    parser.tok.next_token()?;
    let mut expr = parser.parse_expression()?;
    if !parser.is(TokenType::Eof) {
        return Err(parser.unexpected());
    }
    finish_tree(&mut parser, &mut expr);
    Ok(expr)
}

/// Render a tree as JSON in the ESTree/Babel shape.
pub fn to_json(node: &Node) -> serde_json::Result<String> {
    serde_json::to_string(node)
}

/// Like [`to_json`], indented.
pub fn to_json_pretty(node: &Node) -> serde_json::Result<String> {
    serde_json::to_string_pretty(node)
}

/// One parse with the given source type. Also reports whether any
/// `import`/`export` was seen.
fn parse_file(source: &str, options: ParserOptions) -> ParseResult<(Node, bool)> {
    debug!(source_type = options.source_type.as_str(), plugins = ?options.plugins, "parse start");
    let mut parser = Parser::new(source, options)?;
    let start = parser.start_node();
    let program = parser.parse_program()?;
    let mut file = parser.finish_node(
        start,
        NodeKind::File { program: Box::new(program), comments: Vec::new(), tokens: None },
    );
    let (comments, tokens) = finish_tree(&mut parser, &mut file);
    if let NodeKind::File { comments: file_comments, tokens: file_tokens, .. } = &mut file.kind {
        *file_comments = comments;
        *file_tokens = parser.options.tokens.then_some(tokens);
    }
    debug!(end = file.end, "parse finished");
    Ok((file, parser.saw_unambiguous_esm))
}

/// Attach comments and let each dialect reshape the finished nodes, leaves
/// first. Hands back the recorded comments and tokens.
fn finish_tree(parser: &mut Parser, root: &mut Node) -> (Vec<Comment>, Vec<TokenEntry>) {
    let recording = parser.tok.take_recording();
    comments::attach_comments(root, &recording.comments, &recording.comment_whitespace, &parser.tok.input);
    let dialects = parser.dialects.clone();
    let tok = &parser.tok;
    walk_postorder_mut(root, &mut |node| {
        for dialect in &dialects {
            dialect.finish_node_shape(node, tok);
        }
    });
    (recording.comments, recording.tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(file: &Node) -> &Node {
        let NodeKind::File { program, .. } = &file.kind else {
            panic!("expected a file");
        };
        program
    }

    fn source_type(file: &Node) -> &'static str {
        let NodeKind::Program { source_type, .. } = &program(file).kind else {
            panic!("expected a program");
        };
        source_type
    }

    #[test]
    fn test_file_spans_whole_input() {
        let file = parse("a;\n// done\n", ParserOptions::default()).unwrap();
        assert_eq!((file.start, file.end), (0, 10));
        let NodeKind::File { comments, tokens, .. } = &file.kind else {
            panic!("expected a file");
        };
        assert_eq!(comments.len(), 1);
        assert!(tokens.is_none());
    }

    #[test]
    fn test_unambiguous_source_type() {
        let options = ParserOptions::default().with_source_type(SourceType::Unambiguous);
        let file = parse("import x from \"x\";", options.clone()).unwrap();
        assert_eq!(source_type(&file), "module");
        let file = parse("var x = 1;", options.clone()).unwrap();
        assert_eq!(source_type(&file), "script");
        // `with` is a strict mode error, so only the script reading succeeds.
        let file = parse("with (a) b;", options).unwrap();
        assert_eq!(source_type(&file), "script");
    }

    #[test]
    fn test_unambiguous_reports_module_error() {
        let options = ParserOptions::default().with_source_type(SourceType::Unambiguous);
        let err = parse("import x from \"x\"; with (a) b;", options).unwrap_err();
        assert_eq!(err.message, "'with' in strict mode");
    }

    #[test]
    fn test_tokens_recorded_on_request() {
        let options = ParserOptions { tokens: true, ..ParserOptions::default() };
        let file = parse("let x = 1;", options).unwrap();
        let NodeKind::File { tokens: Some(tokens), .. } = &file.kind else {
            panic!("expected recorded tokens");
        };
        // let, x, =, 1, ;, eof
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_parse_expression_requires_full_input() {
        assert!(parse_expression("a + b", ParserOptions::default()).is_ok());
        let err = parse_expression("a b", ParserOptions::default()).unwrap_err();
        assert_eq!(err.pos, 2);
    }

    #[test]
    fn test_to_json_shape() {
        let expr = parse_expression("x", ParserOptions::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&expr).unwrap()).unwrap();
        assert_eq!(json["type"], "Identifier");
        assert_eq!(json["name"], "x");
        assert_eq!(json["loc"]["start"]["line"], 1);
        assert!(json.get("range").is_none());
    }
}
