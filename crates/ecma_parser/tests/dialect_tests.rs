//! Dialect integration tests.
//!
//! Exercises the JSX, Flow, TypeScript and ESTree plugins through the public
//! entry points, alone and in the combinations that are allowed.

use ecma_parser::{parse, parse_expression, to_json, Node, NodeKind, ParserOptions, Plugin, SourceType};
use serde_json::Value;

fn options(plugins: &[Plugin]) -> ParserOptions {
    ParserOptions::default().with_source_type(SourceType::Module).with_plugins(plugins.iter().copied())
}

/// Helper: the type names of the top-level statements.
fn statement_types(source: &str, plugins: &[Plugin]) -> Vec<&'static str> {
    let file = parse(source, options(plugins)).unwrap();
    let NodeKind::File { program, .. } = file.kind else {
        panic!("expected a file");
    };
    let NodeKind::Program { body, .. } = program.kind else {
        panic!("expected a program");
    };
    body.iter().map(Node::type_name).collect()
}

fn expression_json(source: &str, plugins: &[Plugin]) -> Value {
    let expr = parse_expression(source, options(plugins)).unwrap();
    serde_json::from_str(&to_json(&expr).unwrap()).unwrap()
}

// ============================================================================
// JSX
// ============================================================================

#[test]
fn test_jsx_element_json() {
    let value = expression_json("<a href=\"x\" {...rest}>hi {name}</a>", &[Plugin::Jsx]);
    assert_eq!(value["type"], "JSXElement");
    let opening = &value["openingElement"];
    assert_eq!(opening["name"]["name"], "a");
    assert_eq!(opening["selfClosing"], false);
    assert_eq!(opening["attributes"][0]["type"], "JSXAttribute");
    assert_eq!(opening["attributes"][1]["type"], "JSXSpreadAttribute");
    let children = value["children"].as_array().unwrap();
    assert_eq!(children[0]["type"], "JSXText");
    assert_eq!(children[1]["type"], "JSXExpressionContainer");
}

#[test]
fn test_jsx_requires_plugin() {
    let err = parse_expression("<a />", ParserOptions::default()).unwrap_err();
    assert_eq!(err.pos, 0);
    assert!(parse_expression("<a />", options(&[Plugin::Jsx])).is_ok());
}

// ============================================================================
// Flow
// ============================================================================

#[test]
fn test_flow_program() {
    let source = "\
        import type { Node } from \"./ast\";\n\
        type Visitor = { enter?: (node: Node) => void };\n\
        export function walk(node: Node, visitor: Visitor): void {}\n\
        declare var DEBUG: boolean;\n\
        export type { Visitor };\n";
    assert_eq!(
        statement_types(source, &[Plugin::Flow]),
        vec!["ImportDeclaration", "TypeAlias", "ExportNamedDeclaration", "DeclareVariable", "ExportNamedDeclaration"]
    );
}

#[test]
fn test_flow_with_jsx() {
    let source = "const el = <T>(x: T): T => x;\nconst view = <View style={(s: Style)} />;";
    assert_eq!(statement_types(source, &[Plugin::Jsx, Plugin::Flow]), vec!["VariableDeclaration"; 2]);
}

#[test]
fn test_flow_type_cast_json() {
    let value = expression_json("(x: any)", &[Plugin::Flow]);
    assert_eq!(value["type"], "TypeCastExpression");
    assert_eq!(value["typeAnnotation"]["type"], "TypeAnnotation");
    assert_eq!(value["typeAnnotation"]["typeAnnotation"]["type"], "AnyTypeAnnotation");
    assert_eq!(value["extra"]["parenthesized"], true);
}

// ============================================================================
// TypeScript
// ============================================================================

#[test]
fn test_typescript_program() {
    let source = "\
        import { Node } from \"./ast\";\n\
        export interface Visitor { enter?(node: Node): void }\n\
        export enum Kind { A, B = 2 }\n\
        namespace Util { export const x = 1; }\n\
        export default class Walker<T extends Node> implements Visitor {\n\
            private readonly seen = new Set<T>();\n\
            enter(node: T): void { this.seen.add(node as T); }\n\
        }\n";
    assert_eq!(
        statement_types(source, &[Plugin::Typescript, Plugin::ClassProperties]),
        vec![
            "ImportDeclaration",
            "ExportNamedDeclaration",
            "ExportNamedDeclaration",
            "TSModuleDeclaration",
            "ExportDefaultDeclaration"
        ]
    );
}

#[test]
fn test_typescript_with_jsx_rejects_angle_assertions() {
    assert!(parse_expression("<T>x", options(&[Plugin::Typescript])).is_ok());
    assert!(parse_expression("<T>x", options(&[Plugin::Typescript, Plugin::Jsx])).is_err());
    assert!(parse_expression("<T,>(x: T) => x", options(&[Plugin::Typescript, Plugin::Jsx])).is_ok());
}

#[test]
fn test_typescript_with_jsx_reports_element_error_when_both_readings_fail() {
    let err = parse("x = <T>(y", options(&[Plugin::Typescript, Plugin::Jsx])).unwrap_err();
    assert_eq!(err.reason_code, "UnterminatedJsxContent");
    assert_eq!(err.to_string(), "Unterminated JSX contents (1:7)");
}

#[test]
fn test_flow_and_typescript_cannot_combine() {
    let err = parse("a;", options(&[Plugin::Flow, Plugin::Typescript])).unwrap_err();
    assert_eq!(err.reason_code, "InvalidPluginCombination");
    assert_eq!(err.message, "Cannot combine flow and typescript plugins");
}

// ============================================================================
// ESTree
// ============================================================================

#[test]
fn test_estree_literal_json() {
    let value = expression_json("f('a', 1)", &[Plugin::Estree]);
    let arguments = value["arguments"].as_array().unwrap();
    assert_eq!(arguments[0]["type"], "Literal");
    assert_eq!(arguments[0]["value"], "a");
    assert_eq!(arguments[0]["raw"], "'a'");
    assert_eq!(arguments[1]["value"], 1.0);
}

#[test]
fn test_estree_with_typescript() {
    let types = statement_types("let x: string = 'a'; class A { m(): void {} }", &[Plugin::Estree, Plugin::Typescript]);
    assert_eq!(types, vec!["VariableDeclaration", "ClassDeclaration"]);
    let file = parse("class A { m() {} }", options(&[Plugin::Estree, Plugin::Typescript])).unwrap();
    let value: Value = serde_json::from_str(&to_json(&file).unwrap()).unwrap();
    let member = &value["program"]["body"][0]["body"]["body"][0];
    assert_eq!(member["type"], "MethodDefinition");
    assert_eq!(member["value"]["type"], "FunctionExpression");
}

#[test]
fn test_estree_has_no_directives_field() {
    let file = parse("'use strict';\nfunction f() { 'use strict'; }", options(&[Plugin::Estree])).unwrap();
    let value: Value = serde_json::from_str(&to_json(&file).unwrap()).unwrap();
    let program = &value["program"];
    assert!(program.get("directives").is_none());
    assert_eq!(program["body"][0]["type"], "ExpressionStatement");
    assert_eq!(program["body"][0]["directive"], "use strict");
    let block = &program["body"][1]["body"];
    assert!(block.get("directives").is_none());
    assert_eq!(block["body"][0]["directive"], "use strict");

    let file = parse("'use strict';", options(&[])).unwrap();
    let value: Value = serde_json::from_str(&to_json(&file).unwrap()).unwrap();
    assert_eq!(value["program"]["directives"][0]["type"], "Directive");
}
