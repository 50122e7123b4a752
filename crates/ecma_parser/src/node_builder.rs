//! Node construction.
//!
//! A rule records where its node starts with [`Parser::start_node`] before
//! consuming anything, and builds the node once its last token has been
//! consumed with [`Parser::finish_node`]. The end of a finished node is the
//! end of the previous token.

use crate::parser::Parser;
use ecma_ast::{Node, NodeKind};
use ecma_core::text::{Position, SourceLocation, TextPos};

/// Where a node begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStart {
    pub pos: TextPos,
    pub loc: Position,
}

impl NodeStart {
    /// The start of an already finished node.
    pub fn of(node: &Node) -> Self {
        Self {
            pos: node.start,
            loc: node.loc.start,
        }
    }
}

impl Parser {
    /// The start of the current token.
    #[inline]
    pub fn start_node(&self) -> NodeStart {
        NodeStart {
            pos: self.tok.state.start,
            loc: self.tok.state.start_loc,
        }
    }

    /// Finish a node ending at the previous token.
    pub fn finish_node(&self, start: NodeStart, kind: NodeKind) -> Node {
        let state = &self.tok.state;
        self.finish_node_at(start, kind, state.last_tok_end, state.last_tok_end_loc)
    }

    pub fn finish_node_at(
        &self,
        start: NodeStart,
        kind: NodeKind,
        end: TextPos,
        end_loc: Position,
    ) -> Node {
        let loc = SourceLocation::new(start.loc, end_loc, self.filename.clone());
        let mut node = Node::new(kind, start.pos, end, loc);
        if self.options.ranges {
            node.range = Some([start.pos, end]);
        }
        node
    }

    /// Move the start of `node` back to `start`.
    pub fn reset_start(&self, node: &mut Node, start: NodeStart) {
        node.start = start.pos;
        node.loc.start = start.loc;
        if self.options.ranges {
            node.range = Some([start.pos, node.end]);
        }
    }

    /// Move the end of `node` to the end of the previous token.
    pub fn reset_end(&self, node: &mut Node) {
        node.end = self.tok.state.last_tok_end;
        node.loc.end = self.tok.state.last_tok_end_loc;
        if self.options.ranges {
            node.range = Some([node.start, node.end]);
        }
    }

    /// Copy the span of `from` onto `node`.
    pub fn copy_span(&self, node: &mut Node, from: &Node) {
        node.start = from.start;
        node.end = from.end;
        node.loc = from.loc.clone();
        node.range = from.range;
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parser::Parser;
    use ecma_ast::NodeKind;

    #[test]
    fn test_finish_node_spans_consumed_tokens() {
        let options = ParserOptions {
            ranges: true,
            source_filename: Some("a.js".into()),
            ..ParserOptions::default()
        };
        let mut p = Parser::new("  foo bar", options).unwrap();
        p.tok.next_token().unwrap();
        let start = p.start_node();
        p.next().unwrap();
        let node = p.finish_node(start, NodeKind::identifier("foo"));
        assert_eq!((node.start, node.end), (2, 5));
        assert_eq!(node.range, Some([2, 5]));
        assert_eq!(node.loc.start.column, 2);
        assert_eq!(node.loc.end.column, 5);
        assert_eq!(node.loc.filename.as_deref(), Some("a.js"));
    }
}
