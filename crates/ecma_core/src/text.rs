//! Source positions and locations.
//!
//! Offsets are measured in characters (Unicode scalar values) from the start of
//! the input. Lines are 1-based and columns are 0-based, matching the shape the
//! AST consumers expect.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A position in source text, measured as a character offset from the start.
pub type TextPos = u32;

/// A line/column pair. `line` is 1-based, `column` is 0-based.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The position `n` columns further on the same line.
    #[inline]
    pub fn offset_columns(self, n: u32) -> Self {
        Self {
            line: self.line,
            column: self.column + n,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The start and end positions of a node, token or comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<Arc<str>>,
}

impl SourceLocation {
    pub fn new(start: Position, end: Position, filename: Option<Arc<str>>) -> Self {
        Self {
            start,
            end,
            filename,
        }
    }
}

/// Whether a character terminates a line.
#[inline]
pub fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// A map from character offsets to line numbers, built from source text.
///
/// The tokenizer tracks lines incrementally while it scans; this map answers
/// the same question for an arbitrary offset, which is what error reporting
/// needs when the failing position is behind the scan position.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Character offsets of the start of each line.
    line_starts: Vec<TextPos>,
    /// The line number assigned to the first line.
    first_line: u32,
}

impl LineMap {
    /// Build a line map from source characters. `\r\n` counts as one break.
    pub fn new(text: &[char], first_line: u32) -> Self {
        let mut line_starts = vec![0u32];
        let mut i = 0;
        while i < text.len() {
            let ch = text[i];
            if is_newline(ch) {
                if ch == '\r' && text.get(i + 1) == Some(&'\n') {
                    i += 1;
                }
                line_starts.push((i + 1) as u32);
            }
            i += 1;
        }
        Self {
            line_starts,
            first_line,
        }
    }

    /// Build a line map directly from a string slice.
    pub fn from_text(text: &str, first_line: u32) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self::new(&chars, first_line)
    }

    /// Get the 0-based line index for an offset.
    pub fn line_index_of(&self, pos: TextPos) -> usize {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(line) => line - 1,
        }
    }

    /// Get the line and column for an offset.
    pub fn position_of(&self, pos: TextPos) -> Position {
        let index = self.line_index_of(pos);
        let line_start = self.line_starts[index];
        Position {
            line: self.first_line + index as u32,
            column: pos - line_start,
        }
    }

    /// Get the offset of the start of a 0-based line index.
    pub fn line_start(&self, index: usize) -> Option<TextPos> {
        self.line_starts.get(index).copied()
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 5) < Position::new(2, 0));
        assert!(Position::new(2, 1) > Position::new(2, 0));
        assert_eq!(Position::new(3, 4).offset_columns(2), Position::new(3, 6));
    }

    #[test]
    fn test_line_map() {
        let map = LineMap::from_text("line1\nline2\nline3", 1);
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.position_of(0), Position::new(1, 0));
        assert_eq!(map.position_of(5), Position::new(1, 5)); // newline char
        assert_eq!(map.position_of(6), Position::new(2, 0));
        assert_eq!(map.position_of(8), Position::new(2, 2));
        assert_eq!(map.position_of(12), Position::new(3, 0));
    }

    #[test]
    fn test_line_map_crlf_and_separators() {
        let map = LineMap::from_text("a\r\nb\rc\u{2028}d", 1);
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.position_of(3), Position::new(2, 0));
        assert_eq!(map.position_of(5), Position::new(3, 0));
        assert_eq!(map.position_of(7), Position::new(4, 0));
    }

    #[test]
    fn test_line_map_start_line() {
        let map = LineMap::from_text("x\ny", 10);
        assert_eq!(map.position_of(2), Position::new(11, 0));
    }
}
