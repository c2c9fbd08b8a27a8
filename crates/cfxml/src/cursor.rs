//! Byte cursor over UTF-8 source with line/column tracking

use crate::error::Pos;

/// Cursor for navigating markup with position tracking.
///
/// All delimiters the parser stops at are ASCII, so every position the
/// cursor rests on between calls is a char boundary of `input`.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Get current byte without consuming
    pub fn current(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub fn starts_with(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    /// Advance cursor by one byte
    pub fn advance(&mut self) {
        if let Some(b) = self.current() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else if b & 0xC0 != 0x80 {
                // continuation bytes do not start a new column
                self.col += 1;
            }
        }
    }

    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Consume byte if it matches
    pub fn consume(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `pattern` if the input continues with it
    pub fn consume_str(&mut self, pattern: &str) -> bool {
        if self.starts_with(pattern) {
            self.advance_by(pattern.len());
            true
        } else {
            false
        }
    }

    /// Advance past the next occurrence of `pattern`, returning whether it was found
    pub fn skip_past(&mut self, pattern: &str) -> bool {
        match self.rest().find(pattern) {
            Some(idx) => {
                self.advance_by(idx + pattern.len());
                true
            }
            None => {
                self.advance_by(self.rest().len());
                false
            }
        }
    }

    /// Skip XML whitespace and return the skipped slice
    pub fn take_whitespace(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.current() {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.advance();
            } else {
                break;
            }
        }
        self.slice_from(start)
    }

    /// Get current position
    pub const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    /// Check if at end of input
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining input
    pub fn rest(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Get current position index
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Get slice from start to current position
    pub fn slice_from(&self, start: usize) -> &'a str {
        self.input.get(start..self.pos).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basic() {
        let mut cursor = Cursor::new("<a/>");
        assert_eq!(cursor.current(), Some(b'<'));
        cursor.advance();
        assert_eq!(cursor.current(), Some(b'a'));
    }

    #[test]
    fn test_cursor_whitespace_keeps_slice() {
        let mut cursor = Cursor::new("\r\n\t\t<b/>");
        assert_eq!(cursor.take_whitespace(), "\r\n\t\t");
        assert_eq!(cursor.current(), Some(b'<'));
        assert_eq!(cursor.position().line, 2);
        assert_eq!(cursor.position().col, 3);
    }

    #[test]
    fn test_cursor_skip_past() {
        let mut cursor = Cursor::new("comment --> tail");
        assert!(cursor.skip_past("-->"));
        assert_eq!(cursor.rest(), " tail");
        assert!(!cursor.skip_past("-->"));
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_cursor_columns_count_chars() {
        let mut cursor = Cursor::new("Имя<");
        cursor.advance_by("Имя".len());
        assert_eq!(cursor.current(), Some(b'<'));
        assert_eq!(cursor.position().col, 4);
    }

    #[test]
    fn test_cursor_slice() {
        let mut cursor = Cursor::new("Form>");
        let start = cursor.pos();
        cursor.advance_by(4);
        assert_eq!(cursor.slice_from(start), "Form");
        assert!(cursor.consume(b'>'));
        assert!(cursor.is_eof());
    }
}
