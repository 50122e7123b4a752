//! Comment and token output integration tests.

use ecma_parser::{parse, parse_expression, to_json, ParserOptions, TokenEntry};
use serde_json::Value;

fn json(source: &str, options: ParserOptions) -> Value {
    let file = parse(source, options).unwrap();
    serde_json::from_str(&to_json(&file).unwrap()).unwrap()
}

// ============================================================================
// Attachment
// ============================================================================

#[test]
fn test_comments_in_json() {
    let value = json("/** doc */\nfunction f() {} // after\n", ParserOptions::default());
    let comments = value["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["type"], "CommentBlock");
    assert_eq!(comments[0]["value"], "* doc ");
    assert_eq!(comments[1]["type"], "CommentLine");
    assert_eq!(comments[1]["value"], " after");

    let function = &value["program"]["body"][0];
    assert_eq!(function["leadingComments"][0]["value"], "* doc ");
    assert_eq!(function["trailingComments"][0]["value"], " after");
    assert_eq!((comments[0]["start"].as_u64(), comments[0]["end"].as_u64()), (Some(0), Some(10)));
}

#[test]
fn test_comments_inside_expression() {
    let expr = parse_expression("f(/* first */ a, b /* last */)", ParserOptions::default()).unwrap();
    let value: Value = serde_json::from_str(&to_json(&expr).unwrap()).unwrap();
    let arguments = value["arguments"].as_array().unwrap();
    assert_eq!(arguments[0]["leadingComments"][0]["value"], " first ");
    assert_eq!(arguments[1]["trailingComments"][0]["value"], " last ");
}

#[test]
fn test_comment_only_program() {
    let value = json("// nothing here", ParserOptions::default());
    assert_eq!(value["program"]["body"], Value::Array(Vec::new()));
    assert_eq!(value["program"]["innerComments"][0]["value"], " nothing here");
    assert_eq!(value["comments"].as_array().unwrap().len(), 1);
}

#[test]
fn test_html_comment_in_script() {
    let value = json("x; <!-- legacy\n--> also legacy\ny;", ParserOptions::default());
    assert_eq!(value["comments"].as_array().unwrap().len(), 2);
    assert_eq!(value["program"]["body"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_tokens_interleave_comments() {
    let options = ParserOptions { tokens: true, ..ParserOptions::default() };
    let file = parse("a /* c */ = 1;", options).unwrap();
    let ecma_parser::NodeKind::File { tokens: Some(tokens), .. } = &file.kind else {
        panic!("expected recorded tokens");
    };
    let starts: Vec<u32> = tokens.iter().map(TokenEntry::start).collect();
    assert_eq!(starts, vec![0, 2, 10, 12, 13, 14]);
    assert!(matches!(tokens[1], TokenEntry::Comment(_)));
}

#[test]
fn test_token_json_shape() {
    let options = ParserOptions { tokens: true, ..ParserOptions::default() };
    let value = json("x += 2", options);
    let tokens = value["tokens"].as_array().unwrap();
    assert_eq!(tokens[0]["type"]["label"], "name");
    assert_eq!(tokens[0]["value"], "x");
    assert_eq!(tokens[1]["type"]["label"], "_=");
    assert_eq!(tokens[1]["type"]["isAssign"], true);
    assert_eq!(tokens[1]["value"], "+=");
    assert_eq!(tokens[2]["type"]["label"], "num");
    assert_eq!(tokens[2]["value"], 2.0);
    assert_eq!(tokens[3]["type"]["label"], "eof");
    assert!(tokens[3].get("value").is_none());
}
