//! Whole-tree property tests.
//!
//! Checks the guarantees every parse must hold: determinism, nested spans,
//! and the behavior of the scenarios the parser is specified against.

use ecma_parser::{parse, parse_expression, Node, NodeKind, ParserOptions, Plugin, SourceType};

const MODULE_SOURCE: &str = r#"
import { a } from "./a";
/* block */
export default class Counter extends Base {
  static from(values) { return new Counter(...values); }
  constructor(start = 0) { super(); this.count = start; }
  *[Symbol.iterator]() { for (let i = 0; i < this.count; i++) yield i; }
}
export const total = (xs) => xs.reduce((sum, { n = 0 }) => sum + n, 0); // sum
label: while (a) { if (!a) break label; else continue; }
const tpl = `x ${a ? (1, 2) : [3, , 4]} y`;
"#;

fn parse_module(source: &str, plugins: &[Plugin]) -> Node {
    let options = ParserOptions::default()
        .with_source_type(SourceType::Module)
        .with_plugins(plugins.iter().copied());
    parse(source, options).unwrap_or_else(|err| panic!("{err}"))
}

/// Helper: assert every node lies inside its parent and inside the input.
fn assert_spans_nested(node: &Node, len: u32) {
    assert!(node.start <= node.end && node.end <= len, "{} {}..{}", node.type_name(), node.start, node.end);
    let start = (node.loc.start.line, node.loc.start.column);
    let end = (node.loc.end.line, node.loc.end.column);
    assert!(start <= end, "{} loc {:?} > {:?}", node.type_name(), start, end);
    node.for_each_child(&mut |child: &Node| {
        assert!(
            node.start <= child.start && child.end <= node.end,
            "{} {}..{} escapes {} {}..{}",
            child.type_name(),
            child.start,
            child.end,
            node.type_name(),
            node.start,
            node.end
        );
        assert_spans_nested(child, len);
    });
}

// ============================================================================
// Whole-tree invariants
// ============================================================================

#[test]
fn test_parse_is_deterministic() {
    let first = parse_module(MODULE_SOURCE, &[]);
    let second = parse_module(MODULE_SOURCE, &[]);
    assert_eq!(first, second);
}

#[test]
fn test_spans_are_nested() {
    let len = MODULE_SOURCE.chars().count() as u32;
    assert_spans_nested(&parse_module(MODULE_SOURCE, &[]), len);

    let tsx = "const el = <List items={xs as Item[]}>{(x: Item) => <li>{x.name}</li>}</List>;\nenum E { A }";
    let len = tsx.chars().count() as u32;
    assert_spans_nested(&parse_module(tsx, &[Plugin::Typescript, Plugin::Jsx]), len);

    let flow = "type T = { a: ?string };\nfunction f<U>(x: U, y?: T): U { return (x: any); }";
    let len = flow.chars().count() as u32;
    assert_spans_nested(&parse_module(flow, &[Plugin::Flow]), len);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    let node = parse_expression("1+2*3", ParserOptions::default()).unwrap();
    let NodeKind::BinaryExpression { operator: "+", right, .. } = &node.kind else {
        panic!("expected an addition");
    };
    assert!(matches!(&right.kind, NodeKind::BinaryExpression { operator: "*", .. }));
}

#[test]
fn test_exponent_groups_right() {
    let node = parse_expression("2**3**2", ParserOptions::default()).unwrap();
    let NodeKind::BinaryExpression { operator: "**", left, right } = &node.kind else {
        panic!("expected an exponent");
    };
    assert_eq!(left.type_name(), "NumericLiteral");
    assert!(matches!(&right.kind, NodeKind::BinaryExpression { operator: "**", .. }));
}

#[test]
fn test_arrow_versus_parenthesized() {
    let arrow = parse_expression("(x) => x", ParserOptions::default()).unwrap();
    let NodeKind::ArrowFunctionExpression { function, .. } = &arrow.kind else {
        panic!("expected an arrow");
    };
    assert_eq!(function.params.len(), 1);

    let paren = parse_expression("(x)", ParserOptions::default()).unwrap();
    assert!(paren.is_identifier("x"));
    assert!(paren.extra.parenthesized);
}

#[test]
fn test_self_closing_jsx_is_gated() {
    let options = ParserOptions::default().with_plugins([Plugin::Jsx]);
    let node = parse_expression("<div/>", options).unwrap();
    let NodeKind::JSXElement { opening_element, .. } = &node.kind else {
        panic!("expected a JSX element");
    };
    assert!(matches!(&opening_element.kind, NodeKind::JSXOpeningElement { self_closing: true, .. }));

    let err = parse_expression("<div/>", ParserOptions::default()).unwrap_err();
    assert_eq!(err.pos, 0);
}

#[test]
fn test_declarator_type_annotation() {
    let file = parse_module("let x: number = 1", &[Plugin::Typescript]);
    let NodeKind::File { program, .. } = &file.kind else {
        panic!("expected a file");
    };
    let NodeKind::Program { body, .. } = &program.kind else {
        panic!("expected a program");
    };
    let NodeKind::VariableDeclaration { declarations, .. } = &body[0].kind else {
        panic!("expected a declaration");
    };
    let NodeKind::VariableDeclarator { id, .. } = &declarations[0].kind else {
        panic!("expected a declarator");
    };
    let NodeKind::Identifier { type_annotation: Some(annotation), .. } = &id.kind else {
        panic!("expected an annotated identifier");
    };
    let NodeKind::TSTypeAnnotation { type_annotation } = &annotation.kind else {
        panic!("expected a type annotation");
    };
    assert_eq!(type_annotation.type_name(), "TSNumberKeyword");
}

#[test]
fn test_unterminated_string_points_at_quote() {
    let err = parse("\n  \"abc", ParserOptions::default()).unwrap_err();
    assert_eq!((err.loc.line, err.loc.column), (2, 2));
    assert_eq!(err.pos, 3);
}

#[test]
fn test_return_line_break_inserts_semicolon() {
    let options = ParserOptions { allow_return_outside_function: true, ..ParserOptions::default() };
    let file = parse("return\n1", options).unwrap();
    let NodeKind::File { program, .. } = &file.kind else {
        panic!("expected a file");
    };
    let NodeKind::Program { body, .. } = &program.kind else {
        panic!("expected a program");
    };
    assert_eq!(body.len(), 2);
    assert!(matches!(&body[0].kind, NodeKind::ReturnStatement { argument: None }));
    assert_eq!(body[1].type_name(), "ExpressionStatement");
}

#[test]
fn test_missing_dialect_names_plugin() {
    let err = parse("let x: number = 1;", ParserOptions::default()).unwrap_err();
    assert!(err.missing_plugin.is_none());

    let err = parse_expression("a?.b", ParserOptions::default()).unwrap_err();
    assert_eq!(err.missing_plugin, Some(vec!["optionalChaining".to_string()]));
}
