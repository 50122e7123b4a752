//! Error reporting integration tests.
//!
//! A malformed input must come back as a `SyntaxError` carrying the message,
//! the reason code and the character position of the first failure.

use ecma_parser::{parse, parse_expression, ParserOptions, Plugin, SourceType, SyntaxError};

fn error(source: &str) -> SyntaxError {
    parse(source, ParserOptions::default()).unwrap_err()
}

fn module_error(source: &str) -> SyntaxError {
    parse(source, ParserOptions::default().with_source_type(SourceType::Module)).unwrap_err()
}

// ============================================================================
// Positions and rendering
// ============================================================================

#[test]
fn test_display_appends_line_and_column() {
    let err = error("let a = 1;\nlet b = ;");
    assert_eq!(err.message, "Unexpected token");
    assert_eq!(err.reason_code, "UnexpectedToken");
    assert_eq!(err.pos, 19);
    assert_eq!((err.loc.line, err.loc.column), (2, 8));
    assert_eq!(err.to_string(), "Unexpected token (2:8)");
}

#[test]
fn test_position_counts_characters() {
    let err = error("'ü' @");
    assert_eq!(err.pos, 4);
    assert_eq!(err.loc.column, 4);
}

#[test]
fn test_unterminated_literals() {
    let err = error("x = 'abc");
    assert_eq!(err.reason_code, "UnterminatedString");
    assert_eq!(err.pos, 4);

    let err = error("x; /* open");
    assert_eq!(err.message, "Unterminated comment");
    assert_eq!(err.pos, 3);
}

#[test]
fn test_report_keeps_message() {
    let source = "a ?? b";
    let err = error(source);
    let report = err.clone().report(source);
    assert_eq!(report.to_string(), err.to_string());
}

// ============================================================================
// Missing plugins
// ============================================================================

#[test]
fn test_missing_plugin_is_named() {
    let err = error("a ?? b");
    assert_eq!(err.reason_code, "MissingPlugin");
    assert_eq!(err.pos, 2);
    assert_eq!(
        err.message,
        "This experimental syntax requires enabling the parser plugin: 'nullishCoalescingOperator'"
    );
    assert_eq!(err.missing_plugin, Some(vec!["nullishCoalescingOperator".to_string()]));
    assert!(err.is_missing_plugin());

    let options = ParserOptions::default().with_plugins([Plugin::NullishCoalescingOperator]);
    assert!(parse("a ?? b", options).is_ok());
}

#[test]
fn test_missing_plugin_in_scanner() {
    let err = parse_expression("1_000", ParserOptions::default()).unwrap_err();
    assert_eq!(err.missing_plugin, Some(vec!["numericSeparator".to_string()]));
    let options = ParserOptions::default().with_plugins([Plugin::NumericSeparator]);
    assert!(parse_expression("1_000", options).is_ok());
}

#[test]
fn test_plain_errors_name_no_plugin() {
    let err = error("a +;");
    assert!(err.missing_plugin.is_none());
    assert!(err.help.is_none());
}

// ============================================================================
// Strictness
// ============================================================================

#[test]
fn test_module_code_is_strict() {
    assert!(parse("var yield = 1;", ParserOptions::default()).is_ok());
    let err = module_error("var yield = 1;");
    assert_eq!(err.pos, 4);

    assert!(parse("delete x;", ParserOptions::default()).is_ok());
    assert_eq!(module_error("delete x;").reason_code, "StrictDelete");
}

#[test]
fn test_use_strict_directive() {
    let err = error("function f() { 'use strict'; with (a) {} }");
    assert_eq!(err.reason_code, "StrictWith");
    assert_eq!(err.to_string(), "'with' in strict mode (1:29)");
}

#[test]
fn test_import_requires_module() {
    let err = error("import a from \"a\";");
    assert_eq!(err.pos, 0);
    assert!(parse("import a from \"a\";", ParserOptions::default().with_source_type(SourceType::Module)).is_ok());
}

#[test]
fn test_first_error_wins() {
    let err = error("a = ; b = ;");
    assert_eq!(err.pos, 4);
}
