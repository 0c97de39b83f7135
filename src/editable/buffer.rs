//! Char-addressed storage behind a cell's text.
//!
//! The edit layer never sees bytes or lines: every position is a char
//! offset, and every offset handed to a buffer is clamped to its length.

use ropey::Rope;
use std::ops::Range;

/// Read access by char offset
pub trait TextBuffer {
    /// Length in chars
    fn len_chars(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Char at `offset`, None at or past the end
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Chars in `range`; a reversed or out-of-range part is dropped
    fn slice(&self, range: Range<usize>) -> String;

    /// The whole text
    fn content(&self) -> String;
}

/// Write access by char offset
pub trait TextBufferMut: TextBuffer {
    fn insert(&mut self, offset: usize, text: &str);

    fn remove(&mut self, range: Range<usize>);

    fn replace(&mut self, range: Range<usize>, text: &str) {
        let start = range.start;
        self.remove(range);
        self.insert(start, text);
    }

    fn set_content(&mut self, text: &str) {
        let len = self.len_chars();
        self.remove(0..len);
        self.insert(0, text);
    }
}

/// Rope storage, so edits deep inside long cells stay cheap
#[derive(Debug, Clone, Default)]
pub struct RopeBuffer {
    rope: Rope,
}

impl RopeBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    fn clamp(&self, offset: usize) -> usize {
        offset.min(self.rope.len_chars())
    }
}

impl TextBuffer for RopeBuffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    fn slice(&self, range: Range<usize>) -> String {
        let (start, end) = (self.clamp(range.start), self.clamp(range.end));
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn content(&self) -> String {
        self.rope.to_string()
    }
}

impl TextBufferMut for RopeBuffer {
    fn insert(&mut self, offset: usize, text: &str) {
        let at = self.clamp(offset);
        self.rope.insert(at, text);
    }

    fn remove(&mut self, range: Range<usize>) {
        let (start, end) = (self.clamp(range.start), self.clamp(range.end));
        if start < end {
            self.rope.remove(start..end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_chars() {
        let buf = RopeBuffer::from_text("α:=β;");
        assert_eq!(buf.len_chars(), 5);
        assert_eq!(buf.char_at(0), Some('α'));
        assert_eq!(buf.char_at(3), Some('β'));
        assert_eq!(buf.char_at(5), None);
        assert_eq!(buf.slice(1..3), ":=");
    }

    #[test]
    fn test_out_of_range_offsets_clamp() {
        let mut buf = RopeBuffer::from_text("f(x)");
        buf.insert(99, ";");
        assert_eq!(buf.content(), "f(x);");
        buf.remove(4..99);
        assert_eq!(buf.content(), "f(x)");
        assert_eq!(buf.slice(3..1), "");
        assert_eq!(buf.slice(2..40), "x)");
    }

    #[test]
    fn test_replace_and_set_content() {
        let mut buf = RopeBuffer::from_text("sin(x)");
        buf.replace(0..3, "cos");
        assert_eq!(buf.content(), "cos(x)");
        buf.set_content("");
        assert!(buf.is_empty());
        buf.set_content("y");
        assert_eq!(buf.content(), "y");
    }
}
