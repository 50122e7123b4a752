//! Tree traversal.
//!
//! [`Walk`] is implemented for every type that can appear as a node field, so
//! the generated `for_each_child` can visit children without knowing which
//! fields hold nodes. On top of that sit the generic pre-order and post-order
//! walkers used by comment attachment and output reshaping.

use crate::comment::Comment;
use crate::node::*;
use crate::token::TokenEntry;

/// Something that may contain child nodes.
pub trait Walk {
    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node));
    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Node));
}

impl Walk for Node {
    #[inline]
    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        f(self)
    }

    #[inline]
    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        f(self)
    }
}

impl<T: Walk> Walk for Box<T> {
    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        (**self).walk(f)
    }

    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        (**self).walk_mut(f)
    }
}

impl<T: Walk> Walk for Option<T> {
    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        if let Some(inner) = self {
            inner.walk(f);
        }
    }

    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        if let Some(inner) = self {
            inner.walk_mut(f);
        }
    }
}

impl<T: Walk> Walk for Vec<T> {
    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        for item in self {
            item.walk(f);
        }
    }

    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        for item in self {
            item.walk_mut(f);
        }
    }
}

macro_rules! leaf_walk {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Walk for $ty {
                #[inline]
                fn walk<'a>(&'a self, _: &mut dyn FnMut(&'a Node)) {}
                #[inline]
                fn walk_mut(&mut self, _: &mut dyn FnMut(&mut Node)) {}
            }
        )*
    };
}

leaf_walk!(
    bool,
    f64,
    String,
    &'static str,
    LiteralValue,
    TemplateValue,
    RegexInfo,
    MappedModifier,
    Comment,
    TokenEntry,
);

/// Implements [`Walk`] for a field group by walking the listed fields in order.
macro_rules! group_walk {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl Walk for $ty {
            fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
                $( self.$field.walk(f); )*
            }

            fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
                $( self.$field.walk_mut(f); )*
            }
        }
    };
}

// Source order: decorators and type parameters precede the rest.
group_walk!(MemberModifiers { decorators });
group_walk!(Function {
    id,
    type_parameters,
    params,
    return_type,
    predicate,
    body
});
group_walk!(Class {
    decorators,
    id,
    type_parameters,
    super_class,
    super_type_parameters,
    implements,
    body
});

/// Visit `node` and its descendants in pre-order. Returning `false` from
/// `f` skips the node's children.
pub fn walk_preorder<'a>(node: &'a Node, f: &mut dyn FnMut(&'a Node) -> bool) {
    if f(node) {
        node.for_each_child(&mut |child| walk_preorder(child, f));
    }
}

/// Visit `node` and its descendants in post-order, children first.
pub fn walk_postorder_mut(node: &mut Node, f: &mut dyn FnMut(&mut Node)) {
    node.for_each_child_mut(&mut |child| walk_postorder_mut(child, f));
    f(node);
}

/// Count the nodes in a tree, including the root.
pub fn count_nodes(node: &Node) -> usize {
    let mut count = 0;
    walk_preorder(node, &mut |_| {
        count += 1;
        true
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecma_core::text::{Position, SourceLocation};

    fn leaf(kind: NodeKind, start: u32, end: u32) -> Node {
        let loc = SourceLocation::new(Position::new(1, start), Position::new(1, end), None);
        Node::new(kind, start, end, loc)
    }

    fn sample() -> Node {
        // a + b * c
        let mul = leaf(
            NodeKind::BinaryExpression {
                left: Box::new(leaf(NodeKind::identifier("b"), 4, 5)),
                operator: "*",
                right: Box::new(leaf(NodeKind::identifier("c"), 8, 9)),
            },
            4,
            9,
        );
        leaf(
            NodeKind::BinaryExpression {
                left: Box::new(leaf(NodeKind::identifier("a"), 0, 1)),
                operator: "+",
                right: Box::new(mul),
            },
            0,
            9,
        )
    }

    #[test]
    fn test_preorder() {
        let tree = sample();
        let mut seen = Vec::new();
        walk_preorder(&tree, &mut |n| {
            seen.push(n.identifier_name().unwrap_or(n.type_name()).to_string());
            true
        });
        assert_eq!(seen, ["BinaryExpression", "a", "BinaryExpression", "b", "c"]);
        assert_eq!(count_nodes(&tree), 5);
    }

    #[test]
    fn test_preorder_skip_children() {
        let tree = sample();
        let mut seen = 0;
        walk_preorder(&tree, &mut |_| {
            seen += 1;
            false
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_postorder_mut_children_first() {
        let mut tree = sample();
        let mut order = Vec::new();
        walk_postorder_mut(&mut tree, &mut |n| order.push(n.start));
        assert_eq!(order, [0, 4, 8, 4, 0]);
    }
}
