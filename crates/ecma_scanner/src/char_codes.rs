//! Character classes used by the tokenizer.

/// Check if a character is a line terminator.
#[inline]
pub fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Check if a character is whitespace (not line break).
#[inline]
pub fn is_white_space_single_line(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}' // vertical tab
            | '\u{000C}' // form feed
            | '\u{00A0}' // no-break space
            | '\u{1680}' // ogham space mark
            | '\u{2000}'..='\u{200A}' // various spaces
            | '\u{202F}' // narrow no-break space
            | '\u{205F}' // medium mathematical space
            | '\u{3000}' // ideographic space
            | '\u{FEFF}' // BOM / zero-width no-break space
    )
}

/// Check if a character is a decimal digit.
#[inline]
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if a character is an octal digit (0-7).
#[inline]
pub fn is_octal_digit(ch: char) -> bool {
    matches!(ch, '0'..='7')
}

/// The value of a digit in any radix up to 36, or `None` for non-digits.
#[inline]
pub fn digit_value(ch: char) -> Option<u32> {
    match ch {
        '0'..='9' => Some(ch as u32 - '0' as u32),
        'a'..='z' => Some(ch as u32 - 'a' as u32 + 10),
        'A'..='Z' => Some(ch as u32 - 'A' as u32 + 10),
        _ => None,
    }
}

// ============================================================================
// Numeric separators
// ============================================================================

/// Characters that may not sit next to a `_` separator in decimal, binary and
/// octal literals.
const FORBIDDEN_SIBLINGS_DEC_BIN_OCT: &[char] = &['.', 'B', 'E', 'O', '_', 'b', 'e', 'o'];
/// Characters that may not sit next to a `_` separator in hex literals.
const FORBIDDEN_SIBLINGS_HEX: &[char] = &['.', 'X', '_', 'x'];

/// Whether `ch` may not be adjacent to a numeric separator.
pub fn is_forbidden_separator_sibling(ch: Option<char>, radix: u32) -> bool {
    match ch {
        None => true,
        Some(ch) if radix == 16 => FORBIDDEN_SIBLINGS_HEX.contains(&ch),
        Some(ch) => FORBIDDEN_SIBLINGS_DEC_BIN_OCT.contains(&ch),
    }
}

/// Whether `ch` may follow a numeric separator in a literal of `radix`.
pub fn is_allowed_separator_sibling(ch: Option<char>, radix: u32) -> bool {
    ch.and_then(digit_value).is_some_and(|v| v < radix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_classes() {
        assert!(is_white_space_single_line('\u{FEFF}'));
        assert!(is_white_space_single_line('\u{2003}'));
        assert!(!is_white_space_single_line('\n'));
        assert!(is_line_break('\u{2029}'));
    }

    #[test]
    fn test_digit_value() {
        assert_eq!(digit_value('7'), Some(7));
        assert_eq!(digit_value('f'), Some(15));
        assert_eq!(digit_value('F'), Some(15));
        assert_eq!(digit_value('_'), None);
    }

    #[test]
    fn test_separator_siblings() {
        assert!(is_allowed_separator_sibling(Some('1'), 2));
        assert!(!is_allowed_separator_sibling(Some('2'), 2));
        assert!(is_allowed_separator_sibling(Some('e'), 16));
        assert!(!is_allowed_separator_sibling(None, 10));
        assert!(is_forbidden_separator_sibling(Some('.'), 10));
        assert!(is_forbidden_separator_sibling(Some('x'), 16));
        assert!(!is_forbidden_separator_sibling(Some('e'), 16));
        assert!(is_forbidden_separator_sibling(None, 10));
    }
}
