//! ecma_diagnostics: Syntax errors and the message catalog.
//!
//! Every failure the parser can report is a [`SyntaxError`] built from one of
//! the [`messages`] templates. Errors carry the character offset and the
//! line/column of the failure, and optionally the list of plugins that would
//! have made the input parse.

use ecma_core::text::Position;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The result type used by every fallible tokenizer and parser operation.
pub type ParseResult<T> = Result<T, SyntaxError>;

/// A message template with a stable reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMessage {
    /// Stable identifier for the failure, e.g. `UnterminatedString`.
    pub code: &'static str,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A fatal syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message} ({loc})")]
#[diagnostic(code(ecma::syntax_error))]
pub struct SyntaxError {
    /// The resolved message, without the position suffix.
    pub message: String,
    /// The reason code of the template the message was built from.
    pub reason_code: &'static str,
    /// Character offset of the failure.
    pub pos: u32,
    /// Line/column of the failure.
    pub loc: Position,
    /// Plugins that would make the input valid, for missing-dialect errors.
    pub missing_plugin: Option<Vec<String>>,
    /// Byte span into the source, filled in by [`SyntaxError::report`].
    #[label("here")]
    pub span: Option<SourceSpan>,
    #[help]
    pub help: Option<String>,
}

impl SyntaxError {
    pub fn new(message: &DiagnosticMessage, args: &[&str], pos: u32, loc: Position) -> Self {
        Self {
            message: format_message(message.message, args),
            reason_code: message.code,
            pos,
            loc,
            missing_plugin: None,
            span: None,
            help: None,
        }
    }

    /// Mark this error as caused by a disabled plugin.
    pub fn with_missing_plugin(mut self, plugins: &[&str]) -> Self {
        let names: Vec<String> = plugins.iter().map(|p| p.to_string()).collect();
        self.help = Some(format!("enable one of the parser plugins: {}", names.join(", ")));
        self.missing_plugin = Some(names);
        self
    }

    /// Whether the error would go away with a different plugin set.
    pub fn is_missing_plugin(&self) -> bool {
        self.missing_plugin.is_some()
    }

    /// Attach the source text and produce a report suitable for fancy rendering.
    pub fn report(mut self, source: &str) -> miette::Report {
        let offset = byte_offset(source, self.pos);
        let len = source[offset..].chars().next().map_or(0, char::len_utf8);
        self.span = Some(SourceSpan::new(offset.into(), len));
        miette::Report::new(self).with_source_code(source.to_string())
    }
}

/// Convert a character offset into a byte offset, clamped to the source length.
fn byte_offset(source: &str, pos: u32) -> usize {
    source
        .char_indices()
        .nth(pos as usize)
        .map_or(source.len(), |(offset, _)| offset)
}

// ============================================================================
// Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $msg:expr) => {
            DiagnosticMessage { code: $code, message: $msg }
        };
    }

    // ========================================================================
    // Options
    // ========================================================================
    pub const INVALID_PLUGIN_COMBINATION: DiagnosticMessage = diag!("InvalidPluginCombination", "Cannot combine {0} and {1} plugins");
    pub const INVALID_OPTIONS: DiagnosticMessage = diag!("InvalidOptions", "Invalid parser options: {0}");

    // ========================================================================
    // Tokenizer
    // ========================================================================
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!("UnterminatedComment", "Unterminated comment");
    pub const UNTERMINATED_STRING: DiagnosticMessage = diag!("UnterminatedString", "Unterminated string constant");
    pub const UNTERMINATED_TEMPLATE: DiagnosticMessage = diag!("UnterminatedTemplate", "Unterminated template");
    pub const UNTERMINATED_REGEXP: DiagnosticMessage = diag!("UnterminatedRegExp", "Unterminated regular expression");
    pub const DUPLICATE_REGEXP_FLAG: DiagnosticMessage = diag!("DuplicateRegExpFlags", "Duplicate regular expression flag");
    pub const INVALID_REGEXP_FLAG: DiagnosticMessage = diag!("MalformedRegExpFlags", "Invalid regular expression flag");
    pub const UNEXPECTED_CHARACTER: DiagnosticMessage = diag!("InvalidOrUnexpectedToken", "Unexpected character '{0}'");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!("InvalidNumber", "Invalid number");
    pub const EXPECTED_NUMBER_IN_RADIX: DiagnosticMessage = diag!("InvalidDigit", "Expected number in radix {0}");
    pub const IDENTIFIER_AFTER_NUMBER: DiagnosticMessage = diag!("NumberIdentifier", "Identifier directly after number");
    pub const LEGACY_OCTAL_IN_STRICT: DiagnosticMessage = diag!("StrictOctalLiteral", "Legacy octal literals are not allowed in strict mode");
    pub const INVALID_BIGINT: DiagnosticMessage = diag!("InvalidBigIntLiteral", "Invalid BigIntLiteral");
    pub const UNEXPECTED_NUMERIC_SEPARATOR: DiagnosticMessage = diag!("UnexpectedNumericSeparator", "A numeric separator is only allowed between two digits");
    pub const ZERO_DIGIT_NUMERIC_SEPARATOR: DiagnosticMessage = diag!("ZeroDigitNumericSeparator", "Numeric separator can not be used after leading 0");
    pub const NUMERIC_SEPARATOR_IN_ESCAPE: DiagnosticMessage = diag!("NumericSeparatorInEscapeSequence", "Numeric separators are not allowed inside unicode escape sequences or hex escape sequences");
    pub const BAD_ESCAPE: DiagnosticMessage = diag!("InvalidEscapeSequence", "Bad character escape sequence");
    pub const CODE_POINT_OUT_OF_BOUNDS: DiagnosticMessage = diag!("InvalidCodePoint", "Code point out of bounds");
    pub const OCTAL_IN_STRICT: DiagnosticMessage = diag!("StrictNumericEscape", "Octal literal in strict mode");
    pub const EXPECTING_UNICODE_ESCAPE: DiagnosticMessage = diag!("MissingUnicodeEscape", "Expecting Unicode escape sequence \\uXXXX");
    pub const INVALID_UNICODE_ESCAPE: DiagnosticMessage = diag!("EscapedCharNotAnIdentifier", "Invalid Unicode escape");
    pub const ESCAPED_KEYWORD: DiagnosticMessage = diag!("InvalidEscapedReservedWord", "Escape sequence in keyword {0}");
    pub const UNEXPECTED_DIGIT_AFTER_HASH: DiagnosticMessage = diag!("UnexpectedDigitAfterHash", "Unexpected digit after hash token");
    pub const HTML_COMMENT_IN_MODULE: DiagnosticMessage = diag!("UnexpectedHTMLComment", "HTML comments are not allowed in modules");

    // ========================================================================
    // Generic grammar
    // ========================================================================
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!("UnexpectedToken", "Unexpected token");
    pub const UNEXPECTED_TOKEN_EXPECTED: DiagnosticMessage = diag!("UnexpectedToken", "Unexpected token, expected \"{0}\"");
    pub const MISSING_PLUGIN: DiagnosticMessage = diag!("MissingPlugin", "This experimental syntax requires enabling the parser plugin: '{0}'");
    pub const MISSING_ONE_OF_PLUGINS: DiagnosticMessage = diag!("MissingOneOfPlugins", "This experimental syntax requires enabling one of the following parser plugin(s): '{0}'");
    pub const RESERVED_WORD: DiagnosticMessage = diag!("UnexpectedReservedWord", "{0} is a reserved word");
    pub const RESERVED_WORD_STRICT: DiagnosticMessage = diag!("UnexpectedReservedWord", "{0} is a reserved word in strict mode");
    pub const AWAIT_AS_IDENTIFIER: DiagnosticMessage = diag!("AwaitBindingIdentifier", "Can not use 'await' as identifier inside an async function");
    pub const AWAIT_OUTSIDE_ASYNC: DiagnosticMessage = diag!("AwaitNotInAsyncFunction", "Can not use keyword 'await' outside an async function");
    pub const YIELD_AS_IDENTIFIER: DiagnosticMessage = diag!("YieldBindingIdentifier", "Can not use 'yield' as identifier inside a generator");
    pub const YIELD_IN_PARAMETER: DiagnosticMessage = diag!("YieldInParameter", "Yield expression is not allowed in formal parameters");
    pub const AWAIT_IN_PARAMETER: DiagnosticMessage = diag!("AwaitExpressionFormalParameter", "await is not allowed in async function parameters");
    pub const AWAIT_STAR: DiagnosticMessage = diag!("ObsoleteAwaitStar", "await* has been removed from the async functions proposal. Use Promise.all() instead.");
    pub const DELETE_LOCAL: DiagnosticMessage = diag!("StrictDelete", "Deleting local variable in strict mode");
    pub const DELETE_PRIVATE: DiagnosticMessage = diag!("DeletePrivateField", "Deleting a private field is not allowed");
    pub const EXPONENT_AFTER_UNARY: DiagnosticMessage = diag!("UnexpectedTokenUnaryExponentiation", "Illegal expression. Wrap left hand side or entire exponentiation in parentheses.");
    pub const NULLISH_MIXED_WITH_LOGICAL: DiagnosticMessage = diag!("MixingCoalesceWithLogical", "Nullish coalescing operator(??) requires parens when mixing with logical operators");
    pub const PROTO_REDEFINITION: DiagnosticMessage = diag!("DuplicateProto", "Redefinition of __proto__ property");
    pub const GETTER_PARAMS: DiagnosticMessage = diag!("BadGetterArity", "getter must not have any formal parameters");
    pub const SETTER_PARAMS: DiagnosticMessage = diag!("BadSetterArity", "setter must have exactly one formal parameter");
    pub const SETTER_REST: DiagnosticMessage = diag!("BadSetterRestParameter", "setter function argument must not be a rest parameter");
    pub const TRAILING_OBJECT_DECORATOR: DiagnosticMessage = diag!("TrailingDecorator", "You have trailing decorators with no property");
    pub const INVALID_TEMPLATE_ESCAPE: DiagnosticMessage = diag!("InvalidEscapeSequenceTemplate", "Invalid escape sequence in template");
    pub const NO_LINE_BREAK_BEFORE_ARROW: DiagnosticMessage = diag!("LineTerminatorBeforeArrow", "No line break is allowed before '=>'");
    pub const PARENTHESIZED_ARROW_PARAM: DiagnosticMessage = diag!("InvalidParenthesizedAssignment", "Invalid parenthesized assignment pattern");
    pub const ILLEGAL_USE_STRICT: DiagnosticMessage = diag!("IllegalLanguageModeDirective", "Illegal 'use strict' directive in function with non-simple parameter list");
    pub const OBJECT_LITERAL_DECORATOR: DiagnosticMessage = diag!("UnsupportedPropertyDecorator", "Stage 2 decorators disallow object literal property decorators");
    pub const PARAMETER_DECORATOR: DiagnosticMessage = diag!("UnsupportedParameterDecorator", "Stage 2 decorators cannot be used to decorate parameters");
    pub const BIND_ON_OBJECT_PROPERTY: DiagnosticMessage = diag!("UnsupportedBind", "Binding should be performed on object property.");
    pub const UNEXPECTED_ARGUMENT_PLACEHOLDER: DiagnosticMessage = diag!("UnexpectedSpread", "Spread is not allowed here");

    // ========================================================================
    // Super, new.target, import()
    // ========================================================================
    pub const SUPER_OUTSIDE_METHOD: DiagnosticMessage = diag!("UnexpectedSuper", "super is only allowed in object methods and classes");
    pub const SUPER_CALL_OUTSIDE_CONSTRUCTOR: DiagnosticMessage = diag!("SuperNotAllowed", "super() is only valid inside a class constructor");
    pub const SUPER_WITHOUT_ACCESS: DiagnosticMessage = diag!("UnsupportedSuper", "super can only be used with function calls (i.e. super()) or in property accesses (i.e. super.prop or super[prop])");
    pub const SUPER_PRIVATE_ACCESS: DiagnosticMessage = diag!("SuperPrivateField", "Private fields can't be accessed on super");
    pub const INVALID_META_PROPERTY: DiagnosticMessage = diag!("UnsupportedMetaProperty", "The only valid meta property for {0} is {0}.{1}");
    pub const NEW_TARGET_OUTSIDE_FUNCTION: DiagnosticMessage = diag!("UnexpectedNewTarget", "new.target can only be used in functions");
    pub const NEW_TARGET_OUTSIDE_FUNCTION_OR_PROPERTY: DiagnosticMessage = diag!("UnexpectedNewTarget", "new.target can only be used in functions or class properties");
    pub const NEW_IMPORT: DiagnosticMessage = diag!("ImportCallNotNewExpression", "Cannot use new with import(...)");
    pub const IMPORT_CALL_NEEDS_ARGUMENT: DiagnosticMessage = diag!("ImportCallArgumentRequired", "Dynamic imports require a parameter: import('a.js')");
    pub const IMPORT_CALL_TRAILING_COMMA: DiagnosticMessage = diag!("ImportCallArgumentTrailingComma", "Trailing comma is disallowed inside import(...) arguments");
    pub const IMPORT_META_OUTSIDE_MODULE: DiagnosticMessage = diag!("ImportMetaOutsideModule", "import.meta may appear only with 'sourceType: \"module\"'");
    pub const IMPORT_CALL_ARITY: DiagnosticMessage = diag!("ImportCallArity", "import() requires exactly one argument");
    pub const IMPORT_CALL_SPREAD: DiagnosticMessage = diag!("ImportCallSpreadArgument", "... is not allowed in import()");
    pub const OPTIONAL_CHAIN_NEW: DiagnosticMessage = diag!("OptionalChainingNoNew", "constructors in/after an Optional Chain are not allowed");
    pub const OPTIONAL_CHAIN_TEMPLATE: DiagnosticMessage = diag!("OptionalChainingNoTemplate", "Tagged Template Literals are not allowed in optionalChain");

    // ========================================================================
    // Assignment targets and bindings
    // ========================================================================
    pub const INVALID_LVAL: DiagnosticMessage = diag!("InvalidLhs", "Invalid left-hand side in {0}");
    pub const BINDING_INVALID_LVAL: DiagnosticMessage = diag!("InvalidLhsBinding", "Binding invalid left-hand side in {0}");
    pub const ASSIGN_TO_RVALUE: DiagnosticMessage = diag!("InvalidLhs", "Assigning to rvalue");
    pub const ASSIGN_IN_STRICT: DiagnosticMessage = diag!("StrictEvalArguments", "Assigning to '{0}' in strict mode");
    pub const BINDING_IN_STRICT: DiagnosticMessage = diag!("StrictEvalArgumentsBinding", "Binding '{0}' in strict mode");
    pub const BINDING_MEMBER: DiagnosticMessage = diag!("InvalidPropertyBindingPattern", "Binding member expression");
    pub const MULTIPLE_REST: DiagnosticMessage = diag!("UnexpectedRestElement", "Cannot have multiple rest elements when destructuring");
    pub const INVALID_REST_TARGET: DiagnosticMessage = diag!("InvalidRestAssignmentPattern", "Invalid rest operator's argument");
    pub const ARGUMENT_NAME_CLASH: DiagnosticMessage = diag!("ParamDupe", "Argument name clash");
    pub const LET_IN_LEXICAL_BINDING: DiagnosticMessage = diag!("InvalidLetBinding", "'let' is not allowed to be used as a name in 'let' or 'const' declarations.");
    pub const PATTERN_HAS_ACCESSOR: DiagnosticMessage = diag!("PatternHasAccessor", "Object pattern can't contain getter or setter");
    pub const PATTERN_HAS_METHOD: DiagnosticMessage = diag!("PatternHasMethod", "Object pattern can't contain methods");
    pub const INVALID_DEFAULT_OPERATOR: DiagnosticMessage = diag!("InvalidDefaultOperator", "Only '=' operator can be used for specifying default value.");
    pub const REST_NOT_LAST: DiagnosticMessage = diag!("ElementAfterRest", "Rest element must be last element");
    pub const REST_TRAILING_COMMA: DiagnosticMessage = diag!("RestTrailingComma", "Unexpected trailing comma after rest element");
    pub const BINDING_SHORTHAND_KEYWORD: DiagnosticMessage = diag!("InvalidBinding", "Binding {0}");

    // ========================================================================
    // Statements
    // ========================================================================
    pub const STRICT_WITH: DiagnosticMessage = diag!("StrictWith", "'with' in strict mode");
    pub const ILLEGAL_RETURN: DiagnosticMessage = diag!("IllegalReturn", "'return' outside of function");
    pub const ILLEGAL_BREAK_CONTINUE: DiagnosticMessage = diag!("IllegalBreakContinue", "Unsyntactic {0}");
    pub const LABEL_REDECLARATION: DiagnosticMessage = diag!("LabelRedeclaration", "Label '{0}' is already declared");
    pub const NEWLINE_AFTER_THROW: DiagnosticMessage = diag!("NewlineAfterThrow", "Illegal newline after throw");
    pub const MISSING_CATCH_OR_FINALLY: DiagnosticMessage = diag!("NoCatchOrFinally", "Missing catch or finally clause");
    pub const MULTIPLE_DEFAULTS: DiagnosticMessage = diag!("MultipleDefaultsInSwitch", "Multiple default clauses");
    pub const CONST_WITHOUT_INITIALIZER: DiagnosticMessage = diag!("DeclarationMissingInitializer", "Missing initializer in {0} declaration");
    pub const PATTERN_WITHOUT_INITIALIZER: DiagnosticMessage = diag!("DeclarationMissingInitializer", "Complex binding patterns require an initialization value");
    pub const FOR_IN_OF_INITIALIZER: DiagnosticMessage = diag!("ForInOfLoopInitializer", "{0} loop variable declaration may not have an initializer.");
    pub const FOR_OF_ASYNC: DiagnosticMessage = diag!("ForOfAsync", "The left-hand side of a for-of loop may not be 'async'.");
    pub const LEXICAL_IN_SINGLE_STATEMENT: DiagnosticMessage = diag!("LexicalInSingleStatement", "Lexical declaration cannot appear in a single-statement context");
    pub const GENERATOR_IN_SINGLE_STATEMENT: DiagnosticMessage = diag!("GeneratorInSingleStatementContext", "Generators can only be declared at the top level or inside a block");
    pub const FUNCTION_IN_SINGLE_STATEMENT: DiagnosticMessage = diag!("FunctionInSingleStatement", "In strict mode code, functions can only be declared at top level or inside a block");

    // ========================================================================
    // Classes and decorators
    // ========================================================================
    pub const FUNCTION_IN_SLOPPY_SINGLE_STATEMENT: DiagnosticMessage = diag!("SloppyFunction", "In non-strict mode code, functions can only be declared at top level, inside a block, or as the body of an if statement");
    pub const DUPLICATE_CONSTRUCTOR: DiagnosticMessage = diag!("DuplicateConstructor", "Duplicate constructor in the same class");
    pub const CONSTRUCTOR_IS_ACCESSOR: DiagnosticMessage = diag!("ConstructorIsAccessor", "Constructor can't have get/set modifier");
    pub const CONSTRUCTOR_IS_GENERATOR: DiagnosticMessage = diag!("ConstructorIsGenerator", "Constructor can't be a generator");
    pub const CONSTRUCTOR_IS_ASYNC: DiagnosticMessage = diag!("ConstructorIsAsync", "Constructor can't be an async function");
    pub const CONSTRUCTOR_CLASS_FIELD: DiagnosticMessage = diag!("ConstructorClassField", "Classes may not have a field named 'constructor'");
    pub const STATIC_PROTOTYPE: DiagnosticMessage = diag!("StaticPrototype", "Classes may not have static property named prototype");
    pub const PRIVATE_CONSTRUCTOR: DiagnosticMessage = diag!("ConstructorClassPrivateField", "#constructor is a reserved word");
    pub const TRAILING_CLASS_DECORATOR: DiagnosticMessage = diag!("TrailingDecorator", "You have trailing decorators with no method");
    pub const DECORATED_CONSTRUCTOR: DiagnosticMessage = diag!("DecoratorConstructor", "You can't attach decorators to a class constructor");
    pub const LEADING_DECORATOR: DiagnosticMessage = diag!("UnexpectedLeadingDecorator", "Leading decorators must be attached to a class declaration");
    pub const DECORATOR_BEFORE_EXPORT: DiagnosticMessage = diag!("DecoratorBeforeExport", "Decorators must be placed *before* the 'export' keyword");

    // ========================================================================
    // Modules
    // ========================================================================
    pub const IMPORT_OUTSIDE_MODULE: DiagnosticMessage = diag!("ImportOutsideModule", "'import' and 'export' may appear only with 'sourceType: \"module\"'");
    pub const IMPORT_EXPORT_NOT_TOP_LEVEL: DiagnosticMessage = diag!("UnexpectedImportExport", "'import' and 'export' may only appear at the top level");
    pub const DUPLICATE_EXPORT: DiagnosticMessage = diag!("DuplicateExport", "`{0}` has already been exported. Exported identifiers must be unique.");
    pub const DUPLICATE_DEFAULT_EXPORT: DiagnosticMessage = diag!("DuplicateDefaultExport", "Only one default export allowed per module.");
    pub const EXPORT_DEFAULT_NOT_EXPRESSION: DiagnosticMessage = diag!("UnsupportedDefaultExport", "Only expressions, functions or classes are allowed as the `default` export.");
    pub const DECORATED_NON_CLASS_EXPORT: DiagnosticMessage = diag!("UnsupportedDecoratorExport", "You can only use decorators on an export when exporting a class");
    pub const IMPORT_DESTRUCTURE: DiagnosticMessage = diag!("DestructureNamedImport", "ES2015 named imports do not destructure. Use another statement for destructuring after the import.");

    // ========================================================================
    // JSX
    // ========================================================================
    pub const JSX_UNTERMINATED_CONTENTS: DiagnosticMessage = diag!("UnterminatedJsxContent", "Unterminated JSX contents");
    pub const JSX_EMPTY_EXPRESSION: DiagnosticMessage = diag!("AttributeIsEmpty", "JSX attributes must only be assigned a non-empty expression");
    pub const JSX_MISMATCHED_CLOSE: DiagnosticMessage = diag!("MissingClosingTagElement", "Expected corresponding JSX closing tag for <{0}>");
    pub const JSX_MISMATCHED_FRAGMENT: DiagnosticMessage = diag!("MissingClosingTagFragment", "Expected corresponding JSX closing tag for <>");
    pub const JSX_ADJACENT_ELEMENTS: DiagnosticMessage = diag!("UnwrappedAdjacentJSXElements", "Adjacent JSX elements must be wrapped in an enclosing tag. Did you want a JSX fragment <>...</>?");
    pub const JSX_INVALID_ATTRIBUTE_VALUE: DiagnosticMessage = diag!("UnsupportedJsxValue", "JSX value should be either an expression or a quoted JSX text");
    pub const JSX_NAMESPACE_MEMBER: DiagnosticMessage = diag!("UnexpectedToken", "Unexpected token");

    // ========================================================================
    // Flow
    // ========================================================================
    pub const FLOW_RESERVED_TYPE: DiagnosticMessage = diag!("UnexpectedReservedType", "Cannot overwrite reserved type {0}");
    pub const FLOW_AMBIGUOUS_ARROW: DiagnosticMessage = diag!("AmbiguousConditionalArrow", "Ambiguous expression: wrap the arrow functions in parentheses to disambiguate.");
    pub const FLOW_TYPE_CAST_UNWRAPPED: DiagnosticMessage = diag!("TypeCastInPattern", "The type cast expression is expected to be wrapped with parenthesis");
    pub const FLOW_SPREAD_IN_DECLARATION: DiagnosticMessage = diag!("UnexpectedSpreadType", "Spread operator cannot appear in class or interface definitions");
    pub const FLOW_DECLARE_EXPORT_TYPE: DiagnosticMessage = diag!("UnsupportedDeclareExportKind", "`declare export {0}` is not supported. Use `{1}` instead");
    pub const FLOW_EXACT_INDEXER: DiagnosticMessage = diag!("UnexpectedExplicitInexactInObject", "Explicit inexact syntax must appear at the end of an inexact object");
    pub const FLOW_EXPECTED_ARROW: DiagnosticMessage = diag!("UnexpectedTypeParameterBeforeArrowFunction", "Expected an arrow function after this type parameter declaration");
    pub const FLOW_DECLARE_MODULE_MIXED: DiagnosticMessage = diag!("AmbiguousDeclareModuleKind", "Found both `declare module.exports` and `declare export` in the same module. Modules can only have 1 since they are either an ES module or they are a CommonJS module");
    pub const FLOW_DECLARE_MODULE_STATEMENT: DiagnosticMessage = diag!("UnsupportedStatementInDeclareModule", "Only declares and type imports are allowed inside declare module");
    pub const FLOW_NESTED_DECLARE_MODULE: DiagnosticMessage = diag!("NestedDeclareModule", "`declare module` cannot be used inside another `declare module`");
    pub const FLOW_IMPORT_TYPE_SHORTHAND: DiagnosticMessage = diag!("ImportTypeShorthandOnlyInPureImport", "The `type` and `typeof` keywords on named imports can only be used on regular `import` statements. It cannot be used with `import type` or `import typeof` statements");
    pub const FLOW_TYPEOF_DEFAULT_IMPORT: DiagnosticMessage = diag!("ImportReflectionHasImportType", "import typeof cannot be used with a default import of a reserved type name");
    pub const FLOW_INEXACT_IN_EXACT: DiagnosticMessage = diag!("InexactInsideExact", "Explicit inexact syntax cannot appear inside an explicit exact object type");
    pub const FLOW_OPTIONAL_BINDING_PATTERN: DiagnosticMessage = diag!("OptionalBindingPattern", "A binding pattern parameter cannot be optional in an implementation signature.");
    pub const FLOW_INEXACT_IN_DECLARATION: DiagnosticMessage = diag!("InexactInsideNonObject", "Explicit inexact syntax cannot appear in class or interface definitions");
    pub const FLOW_INEXACT_VARIANCE: DiagnosticMessage = diag!("InexactVariance", "Explicit inexact syntax cannot have variance");
    pub const FLOW_SPREAD_VARIANCE: DiagnosticMessage = diag!("SpreadVariance", "Spread properties cannot have variance");
    pub const FLOW_CHECKS_SPACING: DiagnosticMessage = diag!("UnexpectedSpaceBetweenModuloChecks", "Spaces between `%` and `checks` are not allowed here.");
    pub const FLOW_MISSING_TYPE_PARAMETER_DEFAULT: DiagnosticMessage = diag!("MissingTypeParamDefault", "Type parameter declaration needs a default, since a preceding type parameter declaration has a default.");
    pub const FLOW_DUPLICATE_MODULE_EXPORTS: DiagnosticMessage = diag!("DuplicateDeclareModuleExports", "Duplicate `declare module.exports` statement");
    pub const FLOW_DECLARE_MODULE_IMPORT: DiagnosticMessage = diag!("InvalidNonTypeImportInDeclareModule", "Imports within a `declare module` body must always be `import type` or `import typeof`");

    // ========================================================================
    // TypeScript
    // ========================================================================
    pub const TS_EMPTY_TYPE_ARGUMENTS: DiagnosticMessage = diag!("EmptyTypeArguments", "Type argument list cannot be empty.");
    pub const TS_EMPTY_TYPE_PARAMETERS: DiagnosticMessage = diag!("EmptyTypeParameters", "Type parameter list cannot be empty.");
    pub const TS_EMPTY_HERITAGE: DiagnosticMessage = diag!("EmptyHeritageClauseType", "'{0}' list cannot be empty.");
    pub const TS_DUPLICATE_MODIFIER: DiagnosticMessage = diag!("DuplicateModifier", "Duplicate modifier: '{0}'.");
    pub const TS_DUPLICATE_ACCESSIBILITY: DiagnosticMessage = diag!("DuplicateAccessibilityModifier", "Accessibility modifier already seen.");
    pub const TS_UNEXPECTED_TYPE_ANNOTATION: DiagnosticMessage = diag!("UnexpectedTypeAnnotation", "Did not expect a type annotation here.");
    pub const TS_UNEXPECTED_TYPE_CAST: DiagnosticMessage = diag!("UnexpectedTypeCastInParameter", "Unexpected type cast in parameter position.");
    pub const TS_PARAMETER_PROPERTY_OUTSIDE_CONSTRUCTOR: DiagnosticMessage = diag!("UnexpectedParameterModifier", "A parameter property is only allowed in a constructor implementation.");
    pub const TS_ABSTRACT_PROPERTY_INITIALIZER: DiagnosticMessage = diag!("AbstractPropertyHasInitializer", "Property '{0}' cannot have an initializer because it is marked abstract.");
    pub const TS_DECLARE_FIELD_INITIALIZER: DiagnosticMessage = diag!("DeclareClassFieldHasInitializer", "Initializers are not allowed in ambient contexts.");
    pub const TS_INDEX_SIGNATURE_MODIFIER: DiagnosticMessage = diag!("IndexSignatureHasAccessibility", "Index signatures cannot have an accessibility modifier ('{0}').");
    pub const TS_READONLY_NOT_ARRAY: DiagnosticMessage = diag!("UnexpectedReadonly", "'readonly' type modifier is only permitted on array and tuple literal types.");
    pub const TS_OPTIONAL_AFTER_REST: DiagnosticMessage = diag!("OptionalTypeBeforeRequired", "A required element cannot follow an optional element.");
    pub const TS_ONLY_ONE_REST_IN_TUPLE: DiagnosticMessage = diag!("MultipleRestElementsInTuple", "A tuple type cannot contain more than one rest element.");
    pub const TS_CLASS_METHOD_HAS_READONLY: DiagnosticMessage = diag!("ClassMethodHasReadonly", "Class methods cannot have the 'readonly' modifier.");
    pub const TS_INVALID_MODIFIER_ON_TYPE_MEMBER: DiagnosticMessage = diag!("InvalidModifierOnTypeMember", "'{0}' modifier cannot appear on a type member.");
    pub const TS_NON_NULL_IN_BINDING: DiagnosticMessage = diag!("UnexpectedNonNullInBinding", "Non-null assertions are not allowed in binding positions.");
    pub const TS_ACCESSOR_WITH_TYPE_PARAMETERS: DiagnosticMessage = diag!("AccessorCannotHaveTypeParameters", "An accessor cannot have type parameters.");
    pub const TS_CONSTRUCTOR_WITH_TYPE_PARAMETERS: DiagnosticMessage = diag!("ConstructorHasTypeParameters", "Type parameters cannot appear on a constructor declaration.");
    pub const TS_EXPECTED_ARROW: DiagnosticMessage = diag!("UnexpectedTypeParameterBeforeArrowFunction", "Expected an arrow function after this type parameter declaration");
    pub const TS_PARAMETER_PROPERTY_PATTERN: DiagnosticMessage = diag!("UnsupportedParameterPropertyKind", "A parameter property may not be declared using a binding pattern.");
    pub const TS_OPTIONAL_BINDING_PATTERN: DiagnosticMessage = diag!("PatternIsOptional", "A binding pattern parameter cannot be optional in an implementation signature.");
    pub const TS_UNSUPPORTED_SIGNATURE_PARAMETER: DiagnosticMessage = diag!("UnsupportedSignatureParameterKind", "Name in a signature must be an Identifier, ObjectPattern or ArrayPattern, instead got {0}.");
    pub const TS_TEMPLATE_TYPE_SUBSTITUTION: DiagnosticMessage = diag!("TemplateTypeHasSubstitution", "Template literal types cannot have any substitution.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message(messages::UNEXPECTED_CHARACTER.message, &["@"]);
        assert_eq!(msg, "Unexpected character '@'");
    }

    #[test]
    fn test_format_message_repeated_placeholder() {
        let msg = format_message(messages::INVALID_META_PROPERTY.message, &["new", "target"]);
        assert_eq!(msg, "The only valid meta property for new is new.target");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new(&messages::UNTERMINATED_STRING, &[], 0, Position::new(1, 0));
        assert_eq!(err.to_string(), "Unterminated string constant (1:0)");
        assert_eq!(err.reason_code, "UnterminatedString");
        assert!(!err.is_missing_plugin());
    }

    #[test]
    fn test_missing_plugin() {
        let err = SyntaxError::new(&messages::MISSING_PLUGIN, &["jsx"], 0, Position::new(1, 0))
            .with_missing_plugin(&["jsx"]);
        assert_eq!(err.missing_plugin, Some(vec!["jsx".to_string()]));
        assert!(err.help.as_deref().unwrap_or("").contains("jsx"));
    }

    #[test]
    fn test_report_converts_char_offset_to_bytes() {
        let err = SyntaxError::new(&messages::UNEXPECTED_TOKEN, &[], 2, Position::new(1, 2));
        let report = err.report("é @");
        let inner = report.downcast_ref::<SyntaxError>().map(|e| e.span);
        assert_eq!(inner, Some(Some(SourceSpan::new(3.into(), 1))));
    }
}
