//! Comment attachment.
//!
//! The tokenizer records every gap between two tokens that holds comments.
//! Once the tree is complete each gap is resolved against it: the innermost
//! node whose span encloses the gap is the container, and among the
//! container's direct children the one ending where the gap starts takes the
//! comments as trailing comments while the one starting where the gap ends
//! takes them as leading comments. A gap with neither neighbour becomes the
//! container's inner comments, except after a trailing comma in a list, where
//! the comments trail the last element.

use ecma_ast::{Comment, CommentWhitespace, Node, NodeKind};

/// Distribute `comments` over `root` according to the recorded gaps.
pub(crate) fn attach_comments(root: &mut Node, comments: &[Comment], gaps: &[CommentWhitespace], input: &[char]) {
    for gap in gaps {
        let gap_comments: Vec<Comment> = gap.comments.iter().filter_map(|&i| comments.get(i).cloned()).collect();
        if !gap_comments.is_empty() {
            attach_gap(root, gap, gap_comments, input);
        }
    }
}

/// Indices of the direct children that matter for one gap.
#[derive(Default)]
struct Neighbours {
    enclosing: Option<usize>,
    before: Option<usize>,
    after: Option<usize>,
    last_before: Option<usize>,
}

fn neighbours(node: &Node, gap: &CommentWhitespace) -> Neighbours {
    let mut found = Neighbours::default();
    let mut index = 0;
    node.for_each_child(&mut |child: &Node| {
        if child.start <= gap.start && child.end >= gap.end {
            found.enclosing.get_or_insert(index);
        } else if child.start < child.end {
            if child.end == gap.start {
                found.before.get_or_insert(index);
            }
            if child.start == gap.end {
                found.after.get_or_insert(index);
            }
            if child.end <= gap.start {
                found.last_before = Some(index);
            }
        }
        index += 1;
    });
    found
}

fn attach_gap(node: &mut Node, gap: &CommentWhitespace, comments: Vec<Comment>, input: &[char]) {
    let found = neighbours(node, gap);
    if let Some(index) = found.enclosing {
        with_child(node, index, |child| attach_gap(child, gap, comments, input));
        return;
    }

    match (found.before, found.after) {
        (None, None) => {
            let after_comma = gap.start > 0 && input.get(gap.start as usize - 1) == Some(&',');
            match found.last_before {
                Some(index) if after_comma && is_list(&node.kind) => {
                    with_child(node, index, |child| child.trailing_comments.extend(comments));
                }
                _ => node.inner_comments.extend(comments),
            }
        }
        (before, after) => {
            if let Some(index) = before {
                let trailing = comments.clone();
                with_child(node, index, |child| child.trailing_comments.extend(trailing));
            }
            if let Some(index) = after {
                with_child(node, index, |child| child.leading_comments.extend(comments));
            }
        }
    }
}

/// Containers whose children form a comma-separated list.
fn is_list(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ObjectExpression { .. }
            | NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayExpression { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::CallExpression { .. }
            | NodeKind::OptionalCallExpression { .. }
            | NodeKind::NewExpression { .. }
    )
}

fn with_child(node: &mut Node, target: usize, f: impl FnOnce(&mut Node)) {
    let mut f = Some(f);
    let mut index = 0;
    node.for_each_child_mut(&mut |child: &mut Node| {
        if index == target {
            if let Some(f) = f.take() {
                f(child);
            }
        }
        index += 1;
    });
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parse;
    use ecma_ast::{Node, NodeKind};

    fn body(source: &str) -> Vec<Node> {
        let file = parse(source, ParserOptions::default()).unwrap();
        let NodeKind::File { program, .. } = file.kind else {
            panic!("expected a file");
        };
        let NodeKind::Program { body, .. } = program.kind else {
            panic!("expected a program");
        };
        body
    }

    fn values(comments: &[ecma_ast::Comment]) -> Vec<&str> {
        comments.iter().map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn test_leading_and_trailing_statement_comments() {
        let body = body("// first\na; /* between */\nb; // last");
        assert_eq!(values(&body[0].leading_comments), vec![" first"]);
        assert_eq!(values(&body[0].trailing_comments), vec![" between "]);
        assert_eq!(values(&body[1].leading_comments), vec![" between "]);
        assert_eq!(values(&body[1].trailing_comments), vec![" last"]);
    }

    #[test]
    fn test_comment_between_operands() {
        let body = body("a /* c */ + b;");
        let NodeKind::ExpressionStatement { expression, .. } = &body[0].kind else {
            panic!("expected an expression statement");
        };
        let NodeKind::BinaryExpression { left, right, .. } = &expression.kind else {
            panic!("expected a binary expression");
        };
        assert_eq!(values(&left.trailing_comments), vec![" c "]);
        assert!(right.leading_comments.is_empty());
        assert!(expression.inner_comments.is_empty());
    }

    #[test]
    fn test_inner_comments_of_empty_block() {
        let body = body("function f() { /* empty */ }");
        let NodeKind::FunctionDeclaration { function } = &body[0].kind else {
            panic!("expected a function declaration");
        };
        let block = function.body.as_ref().unwrap();
        assert_eq!(values(&block.inner_comments), vec![" empty "]);
    }

    #[test]
    fn test_comment_after_trailing_comma() {
        let body = body("f(a, /* tail */);\n({ b: 1, /* tail */ });");
        let NodeKind::ExpressionStatement { expression, .. } = &body[0].kind else {
            panic!("expected an expression statement");
        };
        let NodeKind::CallExpression { arguments, .. } = &expression.kind else {
            panic!("expected a call");
        };
        assert_eq!(values(&arguments[0].trailing_comments), vec![" tail "]);
        assert!(expression.inner_comments.is_empty());

        let NodeKind::ExpressionStatement { expression, .. } = &body[1].kind else {
            panic!("expected an expression statement");
        };
        let NodeKind::ObjectExpression { properties } = &expression.kind else {
            panic!("expected an object");
        };
        assert_eq!(values(&properties[0].trailing_comments), vec![" tail "]);
    }

    #[test]
    fn test_file_lists_every_comment() {
        let file = parse("/* a */ x; // b", ParserOptions::default()).unwrap();
        let NodeKind::File { comments, .. } = &file.kind else {
            panic!("expected a file");
        };
        assert_eq!(values(comments), vec![" a ", " b"]);
    }
}
