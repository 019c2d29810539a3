//! Byte cursor over raw document input with position tracking

use crate::error::Pos;

/// Cursor for navigating byte input
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Current byte without consuming it
    pub fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Byte `ahead` positions past the current one
    pub fn peek(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.pos.saturating_add(ahead)).copied()
    }

    /// Advance by one byte, tracking line and column
    pub fn advance(&mut self) {
        if let Some(b) = self.current() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    /// Advance by `count` bytes
    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// Consume the current byte if it matches
    pub fn consume(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// True if the remaining input begins with `pattern`
    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.input
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(pattern))
    }

    /// Skip XML whitespace
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.current() {
            if matches!(b, b' ' | b'\t' | b'\r' | b'\n') {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Current position with line/column information
    pub const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    /// Current byte offset
    pub const fn offset(&self) -> usize {
        self.pos
    }

    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Slice from `start` up to the current offset
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.pos).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basic() {
        let mut cursor = Cursor::new(b"<a>");
        assert_eq!(cursor.current(), Some(b'<'));
        assert_eq!(cursor.peek(1), Some(b'a'));
        cursor.advance();
        assert_eq!(cursor.current(), Some(b'a'));
        assert!(!cursor.is_eof());
        cursor.advance_by(2);
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), None);
    }

    #[test]
    fn test_cursor_line_tracking() {
        let mut cursor = Cursor::new(b"a\nbc");
        cursor.advance();
        cursor.advance();
        let pos = cursor.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.col, 1);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn test_cursor_consume_and_starts_with() {
        let mut cursor = Cursor::new(b"<!--x-->");
        assert!(cursor.starts_with(b"<!--"));
        assert!(cursor.consume(b'<'));
        assert!(!cursor.consume(b'<'));
        assert!(cursor.starts_with(b"!--"));
    }

    #[test]
    fn test_cursor_skip_whitespace_and_slice() {
        let mut cursor = Cursor::new(b"  \t\nabc ");
        cursor.skip_whitespace();
        let start = cursor.offset();
        cursor.advance_by(3);
        assert_eq!(cursor.slice_from(start), b"abc");
    }
}
