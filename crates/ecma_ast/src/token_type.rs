//! TokenType - every kind of token the tokenizer produces, with a static
//! attribute table.
//!
//! Token kinds are a flat enum. Behavior that depends on the kind (whether an
//! expression may follow, binary precedence, keyword text) is looked up in
//! [`TokenType::attrs`] rather than stored per token.

use serde::ser::{Serialize, SerializeStruct, Serializer};

bitflags::bitflags! {
    /// Static flags carried by a token kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        const NONE          = 0;
        /// An expression may start after this token (`/` is a regexp).
        const BEFORE_EXPR   = 1 << 0;
        /// This token can start an expression.
        const STARTS_EXPR   = 1 << 1;
        const RIGHT_ASSOC   = 1 << 2;
        const IS_LOOP       = 1 << 3;
        const IS_ASSIGN     = 1 << 4;
        const PREFIX        = 1 << 5;
        const POSTFIX       = 1 << 6;
    }
}

/// Binary operator precedence levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum OperatorPrecedence {
    /// `||` and `??`.
    LogicalOr = 1,
    LogicalAnd = 2,
    BitwiseOr = 3,
    BitwiseXor = 4,
    BitwiseAnd = 5,
    Equality = 6,
    /// `<`, `>`, `<=`, `>=`, `in`, `instanceof`.
    Relational = 7,
    Shift = 8,
    Additive = 9,
    Multiplicative = 10,
    Exponentiation = 11,
}

/// Static attributes of a token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAttrs {
    pub label: &'static str,
    pub keyword: Option<&'static str>,
    pub flags: TokenFlags,
    pub binop: Option<OperatorPrecedence>,
}

const fn attrs(label: &'static str, flags: TokenFlags) -> TokenAttrs {
    TokenAttrs {
        label,
        keyword: None,
        flags,
        binop: None,
    }
}

const fn keyword(name: &'static str, flags: TokenFlags) -> TokenAttrs {
    TokenAttrs {
        label: name,
        keyword: Some(name),
        flags,
        binop: None,
    }
}

const fn binop(label: &'static str, prec: OperatorPrecedence) -> TokenAttrs {
    TokenAttrs {
        label,
        keyword: None,
        flags: TokenFlags::BEFORE_EXPR,
        binop: Some(prec),
    }
}

const NONE: TokenFlags = TokenFlags::NONE;
const BEFORE: TokenFlags = TokenFlags::BEFORE_EXPR;
const STARTS: TokenFlags = TokenFlags::STARTS_EXPR;
const BEFORE_STARTS: TokenFlags = TokenFlags::BEFORE_EXPR.union(TokenFlags::STARTS_EXPR);
const PREFIX: TokenFlags = TokenFlags::BEFORE_EXPR
    .union(TokenFlags::STARTS_EXPR)
    .union(TokenFlags::PREFIX);

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Literals and names
    Num,
    BigInt,
    Regexp,
    String,
    Name,
    Eof,

    // Punctuation
    BracketL,
    BracketR,
    BraceL,
    BraceBarL,
    BraceR,
    BraceBarR,
    ParenL,
    ParenR,
    Comma,
    Semi,
    Colon,
    DoubleColon,
    Dot,
    Question,
    QuestionDot,
    Arrow,
    Template,
    Ellipsis,
    BackQuote,
    DollarBraceL,
    At,
    Hash,
    InterpreterDirective,

    // Operators
    Eq,
    Assign,
    IncDec,
    Bang,
    Tilde,
    NullishCoalescing,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    BitShift,
    PlusMin,
    Modulo,
    Star,
    Slash,
    Exponent,

    // Keywords
    Break,
    Case,
    Catch,
    Continue,
    Debugger,
    Default,
    Do,
    Else,
    Finally,
    For,
    Function,
    If,
    Return,
    Switch,
    Throw,
    Try,
    Var,
    Const,
    While,
    With,
    New,
    This,
    Super,
    Class,
    Extends,
    Export,
    Import,
    Null,
    True,
    False,
    In,
    Instanceof,
    Typeof,
    Void,
    Delete,

    // JSX
    JsxName,
    JsxText,
    JsxTagStart,
    JsxTagEnd,
}

impl TokenType {
    /// The static attribute table.
    pub const fn attrs(self) -> TokenAttrs {
        use OperatorPrecedence as P;
        use TokenType::*;
        match self {
            Num => attrs("num", STARTS),
            BigInt => attrs("bigint", STARTS),
            Regexp => attrs("regexp", STARTS),
            String => attrs("string", STARTS),
            Name => attrs("name", STARTS),
            Eof => attrs("eof", NONE),

            BracketL => attrs("[", BEFORE_STARTS),
            BracketR => attrs("]", NONE),
            BraceL => attrs("{", BEFORE_STARTS),
            BraceBarL => attrs("{|", BEFORE_STARTS),
            BraceR => attrs("}", NONE),
            BraceBarR => attrs("|}", NONE),
            ParenL => attrs("(", BEFORE_STARTS),
            ParenR => attrs(")", NONE),
            Comma => attrs(",", BEFORE),
            Semi => attrs(";", BEFORE),
            Colon => attrs(":", BEFORE),
            DoubleColon => attrs("::", BEFORE),
            Dot => attrs(".", NONE),
            Question => attrs("?", BEFORE),
            QuestionDot => attrs("?.", NONE),
            Arrow => attrs("=>", BEFORE),
            Template => attrs("template", NONE),
            Ellipsis => attrs("...", BEFORE),
            BackQuote => attrs("`", STARTS),
            DollarBraceL => attrs("${", BEFORE_STARTS),
            At => attrs("@", NONE),
            Hash => attrs("#", STARTS),
            InterpreterDirective => attrs("#!...", NONE),

            Eq => attrs("=", BEFORE.union(TokenFlags::IS_ASSIGN)),
            Assign => attrs("_=", BEFORE.union(TokenFlags::IS_ASSIGN)),
            IncDec => attrs(
                "++/--",
                TokenFlags::PREFIX
                    .union(TokenFlags::POSTFIX)
                    .union(TokenFlags::STARTS_EXPR),
            ),
            Bang => attrs("!", PREFIX),
            Tilde => attrs("~", PREFIX),
            NullishCoalescing => binop("??", P::LogicalOr),
            LogicalOr => binop("||", P::LogicalOr),
            LogicalAnd => binop("&&", P::LogicalAnd),
            BitwiseOr => binop("|", P::BitwiseOr),
            BitwiseXor => binop("^", P::BitwiseXor),
            BitwiseAnd => binop("&", P::BitwiseAnd),
            Equality => binop("==/!=/===/!==", P::Equality),
            Relational => binop("</>/<=/>=", P::Relational),
            BitShift => binop("<</>>/>>>", P::Shift),
            PlusMin => TokenAttrs {
                label: "+/-",
                keyword: None,
                flags: PREFIX,
                binop: Some(P::Additive),
            },
            Modulo => binop("%", P::Multiplicative),
            Star => binop("*", P::Multiplicative),
            Slash => binop("/", P::Multiplicative),
            Exponent => TokenAttrs {
                label: "**",
                keyword: None,
                flags: BEFORE.union(TokenFlags::RIGHT_ASSOC),
                binop: Some(P::Exponentiation),
            },

            Break => keyword("break", NONE),
            Case => keyword("case", BEFORE),
            Catch => keyword("catch", NONE),
            Continue => keyword("continue", NONE),
            Debugger => keyword("debugger", NONE),
            Default => keyword("default", BEFORE),
            Do => keyword("do", BEFORE.union(TokenFlags::IS_LOOP)),
            Else => keyword("else", BEFORE),
            Finally => keyword("finally", NONE),
            For => keyword("for", TokenFlags::IS_LOOP),
            Function => keyword("function", STARTS),
            If => keyword("if", NONE),
            Return => keyword("return", BEFORE),
            Switch => keyword("switch", NONE),
            Throw => keyword("throw", PREFIX),
            Try => keyword("try", NONE),
            Var => keyword("var", NONE),
            Const => keyword("const", NONE),
            While => keyword("while", TokenFlags::IS_LOOP),
            With => keyword("with", NONE),
            New => keyword("new", BEFORE_STARTS),
            This => keyword("this", STARTS),
            Super => keyword("super", STARTS),
            Class => keyword("class", STARTS),
            Extends => keyword("extends", BEFORE),
            Export => keyword("export", NONE),
            Import => keyword("import", STARTS),
            Null => keyword("null", STARTS),
            True => keyword("true", STARTS),
            False => keyword("false", STARTS),
            In => TokenAttrs {
                label: "in",
                keyword: Some("in"),
                flags: BEFORE,
                binop: Some(P::Relational),
            },
            Instanceof => TokenAttrs {
                label: "instanceof",
                keyword: Some("instanceof"),
                flags: BEFORE,
                binop: Some(P::Relational),
            },
            Typeof => keyword("typeof", PREFIX),
            Void => keyword("void", PREFIX),
            Delete => keyword("delete", PREFIX),

            JsxName => attrs("jsxName", NONE),
            JsxText => attrs("jsxText", BEFORE),
            JsxTagStart => attrs("jsxTagStart", STARTS),
            JsxTagEnd => attrs("jsxTagEnd", NONE),
        }
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        self.attrs().label
    }

    #[inline]
    pub const fn keyword(self) -> Option<&'static str> {
        self.attrs().keyword
    }

    #[inline]
    pub const fn binop(self) -> Option<OperatorPrecedence> {
        self.attrs().binop
    }

    #[inline]
    pub const fn before_expr(self) -> bool {
        self.attrs().flags.contains(TokenFlags::BEFORE_EXPR)
    }

    #[inline]
    pub const fn starts_expr(self) -> bool {
        self.attrs().flags.contains(TokenFlags::STARTS_EXPR)
    }

    #[inline]
    pub const fn right_associative(self) -> bool {
        self.attrs().flags.contains(TokenFlags::RIGHT_ASSOC)
    }

    #[inline]
    pub const fn is_loop(self) -> bool {
        self.attrs().flags.contains(TokenFlags::IS_LOOP)
    }

    #[inline]
    pub const fn is_assign(self) -> bool {
        self.attrs().flags.contains(TokenFlags::IS_ASSIGN)
    }

    #[inline]
    pub const fn prefix(self) -> bool {
        self.attrs().flags.contains(TokenFlags::PREFIX)
    }

    #[inline]
    pub const fn postfix(self) -> bool {
        self.attrs().flags.contains(TokenFlags::POSTFIX)
    }

    /// Whether this is a reserved keyword token.
    #[inline]
    pub const fn is_keyword(self) -> bool {
        self.attrs().keyword.is_some()
    }

    /// Look up the keyword token for a word, if it is one.
    pub fn from_keyword(word: &str) -> Option<TokenType> {
        use TokenType::*;
        let tt = match word {
            "break" => Break,
            "case" => Case,
            "catch" => Catch,
            "continue" => Continue,
            "debugger" => Debugger,
            "default" => Default,
            "do" => Do,
            "else" => Else,
            "finally" => Finally,
            "for" => For,
            "function" => Function,
            "if" => If,
            "return" => Return,
            "switch" => Switch,
            "throw" => Throw,
            "try" => Try,
            "var" => Var,
            "const" => Const,
            "while" => While,
            "with" => With,
            "new" => New,
            "this" => This,
            "super" => Super,
            "class" => Class,
            "extends" => Extends,
            "export" => Export,
            "import" => Import,
            "null" => Null,
            "true" => True,
            "false" => False,
            "in" => In,
            "instanceof" => Instanceof,
            "typeof" => Typeof,
            "void" => Void,
            "delete" => Delete,
            _ => return None,
        };
        Some(tt)
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let attrs = self.attrs();
        let mut s = serializer.serialize_struct("TokenType", 10)?;
        s.serialize_field("label", attrs.label)?;
        s.serialize_field("keyword", &attrs.keyword)?;
        s.serialize_field("beforeExpr", &self.before_expr())?;
        s.serialize_field("startsExpr", &self.starts_expr())?;
        s.serialize_field("rightAssociative", &self.right_associative())?;
        s.serialize_field("isLoop", &self.is_loop())?;
        s.serialize_field("isAssign", &self.is_assign())?;
        s.serialize_field("prefix", &self.prefix())?;
        s.serialize_field("postfix", &self.postfix())?;
        s.serialize_field("binop", &attrs.binop.map(|p| p as u8))?;
        s.end()
    }
}
