//! Parser integration tests.
//!
//! Verifies that the parser builds the expected statements and expressions
//! from plain ECMAScript source.

use ecma_parser::{parse, parse_expression, Node, NodeKind, ParserOptions, SourceType};

/// Helper: parse a module and return its top-level statements.
fn statements(source: &str) -> Vec<Node> {
    let file = parse(source, ParserOptions::default().with_source_type(SourceType::Module))
        .unwrap_or_else(|err| panic!("{source}: {err}"));
    let NodeKind::File { program, .. } = file.kind else {
        panic!("expected a file");
    };
    let NodeKind::Program { body, .. } = program.kind else {
        panic!("expected a program");
    };
    body
}

/// Helper: assert that parsing produces the expected number of top-level statements.
fn assert_statement_count(source: &str, expected: usize) {
    assert_eq!(statements(source).len(), expected, "source: {}", source);
}

fn assert_statement_types(source: &str, expected: &[&str]) {
    let types: Vec<&str> = statements(source).iter().map(Node::type_name).collect();
    assert_eq!(types, expected, "source: {}", source);
}

fn expression(source: &str) -> Node {
    parse_expression(source, ParserOptions::default()).unwrap_or_else(|err| panic!("{source}: {err}"))
}

// ============================================================================
// Variable Declarations
// ============================================================================

#[test]
fn test_parse_multiple_declarations() {
    assert_statement_count("const a = 1; let b = 2; var c = 3;", 3);
}

#[test]
fn test_parse_declarator_list() {
    let body = statements("let a = 1, { b } = c, [d] = e;");
    let NodeKind::VariableDeclaration { declarations, kind, .. } = &body[0].kind else {
        panic!("expected a variable declaration");
    };
    assert_eq!(*kind, "let");
    let ids: Vec<&str> = declarations
        .iter()
        .map(|declarator| {
            let NodeKind::VariableDeclarator { id, .. } = &declarator.kind else {
                panic!("expected a declarator");
            };
            id.type_name()
        })
        .collect();
    assert_eq!(ids, vec!["Identifier", "ObjectPattern", "ArrayPattern"]);
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_control_flow() {
    assert_statement_types(
        "if (a) b; else c;\nfor (;;) break;\nwhile (x) {}\ndo x(); while (y)\nswitch (z) {}\nthrow e;",
        &["IfStatement", "ForStatement", "WhileStatement", "DoWhileStatement", "SwitchStatement", "ThrowStatement"],
    );
}

#[test]
fn test_parse_for_variants() {
    assert_statement_types(
        "for (const k in o) {}\nfor (const v of xs) {}\nfor (let i = 0; i < n; i++) {}",
        &["ForInStatement", "ForOfStatement", "ForStatement"],
    );
}

#[test]
fn test_parse_let_as_identifier_in_scripts() {
    let file = parse("let = 1; let\n[a] = b;", ParserOptions::default());
    assert!(file.is_ok());
}

#[test]
fn test_parse_labeled_and_empty() {
    assert_statement_types("a: ;\n;\ndebugger;", &["LabeledStatement", "EmptyStatement", "DebuggerStatement"]);
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn test_parse_imports_and_exports() {
    assert_statement_types(
        "import a, { b as c } from 'm';\nimport * as ns from 'n';\nexport { c };\nexport * from 'o';\nexport default function () {}",
        &[
            "ImportDeclaration",
            "ImportDeclaration",
            "ExportNamedDeclaration",
            "ExportAllDeclaration",
            "ExportDefaultDeclaration",
        ],
    );
}

#[test]
fn test_parse_duplicate_export_is_rejected() {
    let options = ParserOptions::default().with_source_type(SourceType::Module);
    assert!(parse("export const a = 1; export { a };", options).is_err());
}

// ============================================================================
// Functions and Classes
// ============================================================================

#[test]
fn test_parse_function_forms() {
    assert_statement_types(
        "function f() {}\nasync function g() {}\nfunction* h() {}\nclass A {}",
        &["FunctionDeclaration", "FunctionDeclaration", "FunctionDeclaration", "ClassDeclaration"],
    );
}

#[test]
fn test_parse_class_members() {
    let body = statements("class A extends B { constructor() { super(); } static s() {} get g() { return 1; } }");
    let NodeKind::ClassDeclaration { class } = &body[0].kind else {
        panic!("expected a class declaration");
    };
    assert!(class.super_class.as_ref().is_some_and(|s| s.is_identifier("B")));
    let NodeKind::ClassBody { body: members } = &class.body.kind else {
        panic!("expected a class body");
    };
    assert_eq!(members.len(), 3);
    assert!(members.iter().all(|m| m.type_name() == "ClassMethod"));
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_parse_precedence() {
    let node = expression("a || b && c + d * e");
    let NodeKind::LogicalExpression { operator, right, .. } = &node.kind else {
        panic!("expected a logical expression");
    };
    assert_eq!(*operator, "||");
    assert!(matches!(&right.kind, NodeKind::LogicalExpression { operator: "&&", .. }));
}

#[test]
fn test_parse_assignment_targets() {
    let node = expression("[a, { b }] = c");
    let NodeKind::AssignmentExpression { left, .. } = &node.kind else {
        panic!("expected an assignment");
    };
    assert_eq!(left.type_name(), "ArrayPattern");
    assert!(parse_expression("a + b = c", ParserOptions::default()).is_err());
}

#[test]
fn test_parse_arrow_and_sequence() {
    assert_eq!(expression("(a, b) => a").type_name(), "ArrowFunctionExpression");
    assert_eq!(expression("(a, b)").type_name(), "SequenceExpression");
    assert_eq!(expression("async (a) => a").type_name(), "ArrowFunctionExpression");
    assert_eq!(expression("async(a)").type_name(), "CallExpression");
}

#[test]
fn test_parse_conditional_and_new() {
    assert_eq!(expression("a ? b : c").type_name(), "ConditionalExpression");
    assert_eq!(expression("new A.B(c)").type_name(), "NewExpression");
    assert_eq!(expression("typeof a").type_name(), "UnaryExpression");
    assert_eq!(expression("a++").type_name(), "UpdateExpression");
}
