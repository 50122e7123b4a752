//! Identifier character classes and reserved-word tables.
//!
//! All tables are immutable statics; nothing here is initialized lazily.

use unicode_xid::UnicodeXID;

/// Whether `ch` may start an identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_ascii_alphabetic() || (ch as u32 > 0x7F && ch.is_xid_start())
}

/// Whether `ch` may continue an identifier.
#[inline]
pub fn is_identifier_char(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch.is_ascii_alphanumeric()
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || (ch as u32 > 0x7F && ch.is_xid_continue())
}

/// Whether a whole string is a valid identifier name.
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_char),
        _ => false,
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "continue", "debugger", "default", "do", "else", "finally", "for",
    "function", "if", "return", "switch", "throw", "try", "var", "const", "while", "with", "new",
    "this", "super", "class", "extends", "export", "import", "null", "true", "false", "in",
    "instanceof", "typeof", "void", "delete",
];

const STRICT_RESERVED_WORDS: &[&str] = &[
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

/// Whether `word` is an ES keyword, which always tokenizes as a keyword token.
#[inline]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Words reserved in every context. `await` is reserved in modules.
pub fn is_reserved_word(word: &str, in_module: bool) -> bool {
    (in_module && word == "await") || word == "enum"
}

/// Words additionally reserved in strict mode.
pub fn is_strict_reserved_word(word: &str, in_module: bool) -> bool {
    is_reserved_word(word, in_module) || STRICT_RESERVED_WORDS.contains(&word)
}

/// Names that may be referenced but not bound in strict mode.
#[inline]
pub fn is_strict_bind_only_reserved_word(word: &str) -> bool {
    word == "eval" || word == "arguments"
}

/// Whether `word` may not be used as a binding name in strict mode.
pub fn is_strict_bind_reserved_word(word: &str, in_module: bool) -> bool {
    is_strict_reserved_word(word, in_module) || is_strict_bind_only_reserved_word(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_chars() {
        assert!(is_identifier_start('$'));
        assert!(is_identifier_start('ä'));
        assert!(!is_identifier_start('1'));
        assert!(is_identifier_char('1'));
        assert!(is_identifier_char('\u{200D}'));
        assert!(!is_identifier_char('-'));
    }

    #[test]
    fn test_identifier_name() {
        assert!(is_identifier_name("café"));
        assert!(!is_identifier_name("1a"));
        assert!(!is_identifier_name(""));
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_keyword("typeof"));
        assert!(!is_keyword("let"));
        assert!(is_reserved_word("enum", false));
        assert!(is_reserved_word("await", true));
        assert!(!is_reserved_word("await", false));
        assert!(is_strict_reserved_word("yield", false));
        assert!(is_strict_bind_reserved_word("eval", false));
        assert!(!is_strict_reserved_word("eval", false));
    }
}
