//! AST node definitions.
//!
//! Every syntax tree node is a [`Node`]: the common span/location/comment data
//! plus a [`NodeKind`] carrying the variant-specific children. Variant names
//! are the `type` strings of the serialized tree, and field names serialize in
//! camelCase.

use crate::comment::Comment;
use crate::token::TokenEntry;
use crate::visitor::Walk;
use ecma_core::text::{SourceLocation, TextPos};
use serde::Serialize;

/// An owned child node.
pub type P = Box<Node>;
/// An optional child node.
pub type OptP = Option<Box<Node>>;

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[TextPos; 2]>,
    #[serde(skip_serializing_if = "Extra::is_empty")]
    pub extra: Extra,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leading_comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trailing_comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inner_comments: Vec<Comment>,
}

impl Node {
    pub fn new(kind: NodeKind, start: TextPos, end: TextPos, loc: SourceLocation) -> Self {
        Self {
            kind,
            start,
            end,
            loc,
            range: None,
            extra: Extra::default(),
            leading_comments: Vec::new(),
            trailing_comments: Vec::new(),
            inner_comments: Vec::new(),
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Whether the node was written inside parentheses.
    #[inline]
    pub fn is_parenthesized(&self) -> bool {
        self.extra.parenthesized
    }

    /// The name of an `Identifier` node.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether this is an `Identifier` with the given name.
    pub fn is_identifier(&self, expected: &str) -> bool {
        self.identifier_name() == Some(expected)
    }

    /// The cooked value of a `StringLiteral`.
    pub fn string_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::StringLiteral { value } => Some(value),
            _ => None,
        }
    }

    /// Call `f` for every direct child node, in field order.
    pub fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        self.kind.for_each_child(f)
    }

    pub fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        self.kind.for_each_child_mut(f)
    }
}

/// Extra metadata that does not belong to the node's grammar shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<LiteralValue>,
    #[serde(skip_serializing_if = "is_false")]
    pub parenthesized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paren_start: Option<TextPos>,
    /// Offset of a trailing comma in an object or array literal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_comma: Option<TextPos>,
}

impl Extra {
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
            && self.raw_value.is_none()
            && !self.parenthesized
            && self.paren_start.is_none()
            && self.trailing_comma.is_none()
    }
}

// ============================================================================
// Value types
// ============================================================================

/// A literal value as it appears in `extra.rawValue` and ESTree `Literal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Raw and cooked text of a template chunk. `cooked` is `None` when the
/// chunk holds an escape that is invalid outside a tagged template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateValue {
    pub raw: String,
    pub cooked: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegexInfo {
    pub pattern: String,
    pub flags: String,
}

/// A `readonly`/`?` modifier on a mapped type: bare, `+` or `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedModifier {
    True,
    Plus,
    Minus,
}

impl Serialize for MappedModifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MappedModifier::True => serializer.serialize_bool(true),
            MappedModifier::Plus => serializer.serialize_str("+"),
            MappedModifier::Minus => serializer.serialize_str("-"),
        }
    }
}

// ============================================================================
// Shared field groups
// ============================================================================

/// The fields every function-like node shares.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub id: OptP,
    pub generator: bool,
    pub r#async: bool,
    pub params: Vec<Node>,
    /// `None` for bodiless declarations and signatures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: OptP,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: OptP,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: OptP,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: OptP,
}

/// The fields shared by class declarations and expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: OptP,
    pub super_class: OptP,
    pub body: P,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: OptP,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_type_parameters: OptP,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<Node>,
    #[serde(skip_serializing_if = "is_false")]
    pub r#abstract: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub declare: bool,
}

/// Modifiers that may precede a class member.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberModifiers {
    pub r#static: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<&'static str>,
    #[serde(skip_serializing_if = "is_false")]
    pub r#abstract: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub readonly: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub declare: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub definite: bool,
}

// ============================================================================
// NodeKind
// ============================================================================

macro_rules! node_kinds {
    ($(
        $(#[$vmeta:meta])*
        $variant:ident { $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)? }
    )*) => {
        /// The variant-specific part of a node.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "type")]
        #[allow(clippy::upper_case_acronyms)]
        pub enum NodeKind {
            $(
                $(#[$vmeta])*
                #[serde(rename_all = "camelCase")]
                $variant { $( $(#[$fmeta])* $field : $ty ),* },
            )*
        }

        impl NodeKind {
            /// The `type` string of this variant.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant { .. } => stringify!($variant), )*
                }
            }

            pub fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
                match self {
                    $( NodeKind::$variant { $( $field ),* } => { $( Walk::walk($field, f); )* } )*
                }
            }

            pub fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
                match self {
                    $( NodeKind::$variant { $( $field ),* } => { $( Walk::walk_mut($field, f); )* } )*
                }
            }
        }
    };
}

node_kinds! {
    // ------------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------------
    File {
        program: P,
        comments: Vec<Comment>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tokens: Option<Vec<TokenEntry>>,
    }
    Program {
        source_type: &'static str,
        interpreter: OptP,
        body: Vec<Node>,
        /// `None` in the ESTree shape, where directives are statements.
        #[serde(skip_serializing_if = "Option::is_none")]
        directives: Option<Vec<Node>>,
    }
    InterpreterDirective { value: String }
    Directive { value: P }
    DirectiveLiteral { value: String }

    // ------------------------------------------------------------------------
    // Names and literals
    // ------------------------------------------------------------------------
    Identifier {
        name: String,
        #[serde(skip_serializing_if = "is_false")]
        optional: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptP,
    }
    PrivateName { id: P }
    StringLiteral { value: String }
    NumericLiteral { value: f64 }
    BigIntLiteral { value: String }
    BooleanLiteral { value: bool }
    NullLiteral {}
    RegExpLiteral { pattern: String, flags: String }
    TemplateLiteral { expressions: Vec<Node>, quasis: Vec<Node> }
    TemplateElement { value: TemplateValue, tail: bool }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------
    ThisExpression {}
    Super {}
    Import {}
    ArrayExpression { elements: Vec<Option<Node>> }
    ObjectExpression { properties: Vec<Node> }
    ObjectProperty {
        method: bool,
        key: P,
        computed: bool,
        shorthand: bool,
        value: P,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        decorators: Vec<Node>,
    }
    ObjectMethod {
        method: bool,
        kind: &'static str,
        key: P,
        computed: bool,
        #[serde(flatten)]
        function: Function,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        decorators: Vec<Node>,
    }
    FunctionExpression {
        #[serde(flatten)]
        function: Function,
    }
    ArrowFunctionExpression {
        #[serde(flatten)]
        function: Function,
        #[serde(skip_serializing_if = "Option::is_none")]
        expression: Option<bool>,
    }
    UnaryExpression { operator: &'static str, prefix: bool, argument: P }
    UpdateExpression { operator: &'static str, prefix: bool, argument: P }
    BinaryExpression { left: P, operator: &'static str, right: P }
    LogicalExpression { left: P, operator: &'static str, right: P }
    AssignmentExpression { operator: &'static str, left: P, right: P }
    SequenceExpression { expressions: Vec<Node> }
    ConditionalExpression { test: P, consequent: P, alternate: P }
    CallExpression {
        callee: P,
        arguments: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_parameters: OptP,
    }
    OptionalCallExpression {
        callee: P,
        arguments: Vec<Node>,
        optional: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_parameters: OptP,
    }
    NewExpression {
        callee: P,
        arguments: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_parameters: OptP,
    }
    MemberExpression { object: P, property: P, computed: bool }
    OptionalMemberExpression { object: P, property: P, computed: bool, optional: bool }
    TaggedTemplateExpression {
        tag: P,
        quasi: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_parameters: OptP,
    }
    BindExpression { object: OptP, callee: P }
    MetaProperty { meta: P, property: P }
    YieldExpression { delegate: bool, argument: OptP }
    AwaitExpression { argument: P }
    DoExpression { body: P }
    SpreadElement { argument: P }
    ParenthesizedExpression { expression: P }
    ClassExpression {
        #[serde(flatten)]
        class: Class,
    }
    Decorator { expression: P }

    // ------------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------------
    AssignmentPattern { left: P, right: P }
    ArrayPattern {
        elements: Vec<Option<Node>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptP,
    }
    ObjectPattern {
        properties: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptP,
    }
    RestElement {
        argument: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptP,
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------
    ExpressionStatement {
        expression: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        directive: Option<String>,
    }
    BlockStatement {
        body: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        directives: Option<Vec<Node>>,
    }
    EmptyStatement {}
    DebuggerStatement {}
    WithStatement { object: P, body: P }
    ReturnStatement { argument: OptP }
    LabeledStatement { body: P, label: P }
    BreakStatement { label: OptP }
    ContinueStatement { label: OptP }
    IfStatement { test: P, consequent: P, alternate: OptP }
    SwitchStatement { discriminant: P, cases: Vec<Node> }
    SwitchCase { test: OptP, consequent: Vec<Node> }
    ThrowStatement { argument: P }
    TryStatement { block: P, handler: OptP, finalizer: OptP }
    CatchClause { param: OptP, body: P }
    WhileStatement { test: P, body: P }
    DoWhileStatement { body: P, test: P }
    ForStatement { init: OptP, test: OptP, update: OptP, body: P }
    ForInStatement { left: P, right: P, body: P }
    ForOfStatement { r#await: bool, left: P, right: P, body: P }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------
    FunctionDeclaration {
        #[serde(flatten)]
        function: Function,
    }
    VariableDeclaration {
        kind: &'static str,
        declarations: Vec<Node>,
        #[serde(skip_serializing_if = "is_false")]
        declare: bool,
    }
    VariableDeclarator {
        id: P,
        init: OptP,
        #[serde(skip_serializing_if = "is_false")]
        definite: bool,
    }
    ClassDeclaration {
        #[serde(flatten)]
        class: Class,
    }
    ClassBody { body: Vec<Node> }
    ClassMethod {
        kind: &'static str,
        key: P,
        computed: bool,
        #[serde(flatten)]
        modifiers: MemberModifiers,
        #[serde(flatten)]
        function: Function,
    }
    ClassPrivateMethod {
        kind: &'static str,
        key: P,
        #[serde(flatten)]
        modifiers: MemberModifiers,
        #[serde(flatten)]
        function: Function,
    }
    ClassProperty {
        key: P,
        value: OptP,
        computed: bool,
        #[serde(flatten)]
        modifiers: MemberModifiers,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptP,
        #[serde(skip_serializing_if = "Option::is_none")]
        variance: OptP,
    }
    ClassPrivateProperty {
        key: P,
        value: OptP,
        #[serde(flatten)]
        modifiers: MemberModifiers,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptP,
    }

    // ------------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------------
    ImportDeclaration {
        specifiers: Vec<Node>,
        source: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        import_kind: Option<&'static str>,
    }
    ImportSpecifier {
        imported: P,
        local: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        import_kind: Option<&'static str>,
    }
    ImportDefaultSpecifier { local: P }
    ImportNamespaceSpecifier { local: P }
    ExportNamedDeclaration {
        declaration: OptP,
        specifiers: Vec<Node>,
        source: OptP,
        #[serde(skip_serializing_if = "Option::is_none")]
        export_kind: Option<&'static str>,
    }
    ExportSpecifier { local: P, exported: P }
    ExportDefaultSpecifier { exported: P }
    ExportNamespaceSpecifier { exported: P }
    ExportDefaultDeclaration { declaration: P }
    ExportAllDeclaration {
        source: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        export_kind: Option<&'static str>,
    }

    // ------------------------------------------------------------------------
    // JSX
    // ------------------------------------------------------------------------
    JSXElement { opening_element: P, closing_element: OptP, children: Vec<Node> }
    JSXOpeningElement {
        name: P,
        attributes: Vec<Node>,
        self_closing: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_parameters: OptP,
    }
    JSXClosingElement { name: P }
    JSXFragment { opening_fragment: P, closing_fragment: P, children: Vec<Node> }
    JSXOpeningFragment {}
    JSXClosingFragment {}
    JSXAttribute { name: P, value: OptP }
    JSXSpreadAttribute { argument: P }
    JSXIdentifier { name: String }
    JSXNamespacedName { namespace: P, name: P }
    JSXMemberExpression { object: P, property: P }
    JSXExpressionContainer { expression: P }
    JSXEmptyExpression {}
    JSXSpreadChild { expression: P }
    JSXText { value: String }

    // ------------------------------------------------------------------------
    // Flow
    // ------------------------------------------------------------------------
    TypeAnnotation { type_annotation: P }
    TypeCastExpression { expression: P, type_annotation: P }
    AnyTypeAnnotation {}
    MixedTypeAnnotation {}
    EmptyTypeAnnotation {}
    BooleanTypeAnnotation {}
    NumberTypeAnnotation {}
    StringTypeAnnotation {}
    SymbolTypeAnnotation {}
    VoidTypeAnnotation {}
    NullLiteralTypeAnnotation {}
    ExistsTypeAnnotation {}
    ThisTypeAnnotation {}
    BooleanLiteralTypeAnnotation { value: bool }
    NumberLiteralTypeAnnotation { value: f64 }
    StringLiteralTypeAnnotation { value: String }
    NullableTypeAnnotation { type_annotation: P }
    ArrayTypeAnnotation { element_type: P }
    TupleTypeAnnotation { types: Vec<Node> }
    UnionTypeAnnotation { types: Vec<Node> }
    IntersectionTypeAnnotation { types: Vec<Node> }
    TypeofTypeAnnotation { argument: P }
    GenericTypeAnnotation { id: P, type_parameters: OptP }
    QualifiedTypeIdentifier { qualification: P, id: P }
    FunctionTypeAnnotation { type_parameters: OptP, params: Vec<Node>, rest: OptP, return_type: P }
    FunctionTypeParam { name: OptP, optional: bool, type_annotation: P }
    ObjectTypeAnnotation {
        properties: Vec<Node>,
        indexers: Vec<Node>,
        call_properties: Vec<Node>,
        exact: bool,
        #[serde(skip_serializing_if = "is_false")]
        inexact: bool,
    }
    ObjectTypeProperty {
        key: P,
        value: P,
        r#static: bool,
        proto: bool,
        kind: &'static str,
        method: bool,
        optional: bool,
        variance: OptP,
    }
    ObjectTypeSpreadProperty { argument: P }
    ObjectTypeIndexer { id: OptP, key: P, value: P, variance: OptP, r#static: bool }
    ObjectTypeCallProperty { value: P, r#static: bool }
    InterfaceTypeAnnotation { extends: Vec<Node>, body: P }
    TypeParameterDeclaration { params: Vec<Node> }
    TypeParameter { name: String, variance: OptP, bound: OptP, r#default: OptP }
    TypeParameterInstantiation { params: Vec<Node> }
    Variance { kind: &'static str }
    TypeAlias { id: P, type_parameters: OptP, right: P }
    OpaqueType { id: P, type_parameters: OptP, supertype: OptP, impltype: P }
    InterfaceDeclaration {
        id: P,
        type_parameters: OptP,
        extends: Vec<Node>,
        implements: Vec<Node>,
        mixins: Vec<Node>,
        body: P,
    }
    InterfaceExtends { id: P, type_parameters: OptP }
    ClassImplements { id: P, type_parameters: OptP }
    DeclareVariable { id: P }
    DeclareFunction { id: P, predicate: OptP }
    DeclareClass {
        id: P,
        type_parameters: OptP,
        extends: Vec<Node>,
        implements: Vec<Node>,
        mixins: Vec<Node>,
        body: P,
    }
    DeclareInterface {
        id: P,
        type_parameters: OptP,
        extends: Vec<Node>,
        implements: Vec<Node>,
        mixins: Vec<Node>,
        body: P,
    }
    DeclareModule { id: P, body: P, kind: &'static str }
    DeclareModuleExports { type_annotation: P }
    DeclareTypeAlias { id: P, type_parameters: OptP, right: P }
    DeclareOpaqueType { id: P, type_parameters: OptP, supertype: OptP }
    DeclareExportDeclaration {
        r#default: bool,
        declaration: OptP,
        specifiers: Vec<Node>,
        source: OptP,
    }
    DeclareExportAllDeclaration {
        source: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        export_kind: Option<&'static str>,
    }
    DeclaredPredicate { value: P }
    InferredPredicate {}

    // ------------------------------------------------------------------------
    // TypeScript
    // ------------------------------------------------------------------------
    TSTypeAnnotation { type_annotation: P }
    TSTypeParameterDeclaration { params: Vec<Node> }
    TSTypeParameter { name: String, constraint: OptP, r#default: OptP }
    TSTypeParameterInstantiation { params: Vec<Node> }
    TSAnyKeyword {}
    TSUnknownKeyword {}
    TSNumberKeyword {}
    TSObjectKeyword {}
    TSBooleanKeyword {}
    TSBigIntKeyword {}
    TSStringKeyword {}
    TSSymbolKeyword {}
    TSVoidKeyword {}
    TSUndefinedKeyword {}
    TSNullKeyword {}
    TSNeverKeyword {}
    TSThisType {}
    TSFunctionType { type_parameters: OptP, parameters: Vec<Node>, type_annotation: OptP }
    TSConstructorType { type_parameters: OptP, parameters: Vec<Node>, type_annotation: OptP }
    TSTypeReference { type_name: P, type_parameters: OptP }
    TSQualifiedName { left: P, right: P }
    TSTypePredicate { parameter_name: P, type_annotation: OptP, asserts: bool }
    TSTypeQuery { expr_name: P }
    TSTypeLiteral { members: Vec<Node> }
    TSPropertySignature {
        key: P,
        computed: bool,
        #[serde(skip_serializing_if = "is_false")]
        optional: bool,
        #[serde(skip_serializing_if = "is_false")]
        readonly: bool,
        type_annotation: OptP,
        #[serde(skip_serializing_if = "Option::is_none")]
        initializer: OptP,
    }
    TSMethodSignature {
        key: P,
        computed: bool,
        #[serde(skip_serializing_if = "is_false")]
        optional: bool,
        type_parameters: OptP,
        parameters: Vec<Node>,
        type_annotation: OptP,
    }
    TSIndexSignature {
        parameters: Vec<Node>,
        type_annotation: OptP,
        #[serde(skip_serializing_if = "is_false")]
        readonly: bool,
        #[serde(skip_serializing_if = "is_false")]
        r#static: bool,
    }
    TSCallSignatureDeclaration { type_parameters: OptP, parameters: Vec<Node>, type_annotation: OptP }
    TSConstructSignatureDeclaration { type_parameters: OptP, parameters: Vec<Node>, type_annotation: OptP }
    TSArrayType { element_type: P }
    TSTupleType { element_types: Vec<Node> }
    TSOptionalType { type_annotation: P }
    TSRestType { type_annotation: P }
    TSUnionType { types: Vec<Node> }
    TSIntersectionType { types: Vec<Node> }
    TSConditionalType { check_type: P, extends_type: P, true_type: P, false_type: P }
    TSInferType { type_parameter: P }
    TSParenthesizedType { type_annotation: P }
    TSTypeOperator { operator: &'static str, type_annotation: P }
    TSIndexedAccessType { object_type: P, index_type: P }
    TSMappedType {
        #[serde(skip_serializing_if = "Option::is_none")]
        readonly: Option<MappedModifier>,
        type_parameter: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<MappedModifier>,
        type_annotation: OptP,
    }
    TSLiteralType { literal: P }
    TSExpressionWithTypeArguments { expression: P, type_parameters: OptP }
    TSInterfaceDeclaration {
        id: P,
        type_parameters: OptP,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        extends: Vec<Node>,
        body: P,
        #[serde(skip_serializing_if = "is_false")]
        declare: bool,
    }
    TSInterfaceBody { body: Vec<Node> }
    TSTypeAliasDeclaration {
        id: P,
        type_parameters: OptP,
        type_annotation: P,
        #[serde(skip_serializing_if = "is_false")]
        declare: bool,
    }
    TSAsExpression { expression: P, type_annotation: P }
    TSTypeAssertion { type_annotation: P, expression: P }
    TSNonNullExpression { expression: P }
    TSEnumDeclaration {
        id: P,
        members: Vec<Node>,
        #[serde(skip_serializing_if = "is_false")]
        r#const: bool,
        #[serde(skip_serializing_if = "is_false")]
        declare: bool,
    }
    TSEnumMember { id: P, initializer: OptP }
    TSModuleDeclaration {
        id: P,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: OptP,
        #[serde(skip_serializing_if = "is_false")]
        declare: bool,
        #[serde(skip_serializing_if = "is_false")]
        global: bool,
    }
    TSModuleBlock { body: Vec<Node> }
    TSImportEqualsDeclaration { is_export: bool, id: P, module_reference: P }
    TSExternalModuleReference { expression: P }
    TSExportAssignment { expression: P }
    TSNamespaceExportDeclaration { id: P }
    TSParameterProperty {
        #[serde(skip_serializing_if = "Option::is_none")]
        accessibility: Option<&'static str>,
        #[serde(skip_serializing_if = "is_false")]
        readonly: bool,
        parameter: P,
    }
    TSDeclareFunction {
        #[serde(flatten)]
        function: Function,
        #[serde(skip_serializing_if = "is_false")]
        declare: bool,
    }
    TSDeclareMethod {
        kind: &'static str,
        key: P,
        computed: bool,
        #[serde(flatten)]
        modifiers: MemberModifiers,
        #[serde(flatten)]
        function: Function,
    }

    // ------------------------------------------------------------------------
    // ESTree shape
    // ------------------------------------------------------------------------
    Literal {
        value: LiteralValue,
        raw: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        regex: Option<RegexInfo>,
        #[serde(skip_serializing_if = "Option::is_none")]
        bigint: Option<String>,
    }
    Property {
        key: P,
        value: P,
        kind: &'static str,
        method: bool,
        shorthand: bool,
        computed: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        decorators: Vec<Node>,
    }
    MethodDefinition {
        key: P,
        value: P,
        kind: &'static str,
        computed: bool,
        r#static: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        decorators: Vec<Node>,
    }
}

impl NodeKind {
    /// A plain identifier.
    pub fn identifier(name: impl Into<String>) -> Self {
        NodeKind::Identifier {
            name: name.into(),
            optional: false,
            type_annotation: None,
        }
    }

    /// The function fields of a function-like node.
    pub fn function(&self) -> Option<&Function> {
        match self {
            NodeKind::FunctionDeclaration { function }
            | NodeKind::FunctionExpression { function }
            | NodeKind::ArrowFunctionExpression { function, .. }
            | NodeKind::ObjectMethod { function, .. }
            | NodeKind::ClassMethod { function, .. }
            | NodeKind::ClassPrivateMethod { function, .. }
            | NodeKind::TSDeclareFunction { function, .. }
            | NodeKind::TSDeclareMethod { function, .. } => Some(function),
            _ => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut Function> {
        match self {
            NodeKind::FunctionDeclaration { function }
            | NodeKind::FunctionExpression { function }
            | NodeKind::ArrowFunctionExpression { function, .. }
            | NodeKind::ObjectMethod { function, .. }
            | NodeKind::ClassMethod { function, .. }
            | NodeKind::ClassPrivateMethod { function, .. }
            | NodeKind::TSDeclareFunction { function, .. }
            | NodeKind::TSDeclareMethod { function, .. } => Some(function),
            _ => None,
        }
    }

    /// The slot a binding pattern keeps its type annotation in.
    pub fn type_annotation_slot(&mut self) -> Option<&mut OptP> {
        match self {
            NodeKind::Identifier {
                type_annotation, ..
            }
            | NodeKind::ArrayPattern {
                type_annotation, ..
            }
            | NodeKind::ObjectPattern {
                type_annotation, ..
            }
            | NodeKind::RestElement {
                type_annotation, ..
            } => Some(type_annotation),
            _ => None,
        }
    }
}
