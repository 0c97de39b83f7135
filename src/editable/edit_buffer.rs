//! The mutable text of one editor cell plus its caret and selection.
//!
//! Every offset handed to an `EditBuffer` is clamped into `[0, len]`; nothing
//! here can fail. Mutations set a dirty flag that the styler consumes.

use super::buffer::{RopeBuffer, TextBuffer, TextBufferMut};
use super::selection::Selection;
use crate::util::text::{is_word_char, normalize_line_separators, tab_expand};
use std::ops::Range;

/// Text, caret and selection of one editor cell
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    buffer: RopeBuffer,
    selection: Selection,
    dirty: bool,
}

impl EditBuffer {
    /// Create a buffer holding `text`, caret at the end.
    ///
    /// Line separators are normalised and tabs expanded, as for pasted text.
    pub fn new(text: &str) -> Self {
        let text = tab_expand(&normalize_line_separators(text), 0);
        let buffer = RopeBuffer::from_text(&text);
        let end = buffer.len_chars();
        Self {
            buffer,
            selection: Selection::collapsed(end),
            dirty: true,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn text(&self) -> String {
        self.buffer.content()
    }

    pub fn len(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer.char_at(offset)
    }

    /// Text in a char range (clamped, either order)
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.buffer.slice(start.min(end)..start.max(end))
    }

    pub fn cursor(&self) -> usize {
        self.selection.cursor_position()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    /// The selected range, None without a selection
    pub fn selection_range(&self) -> Option<Range<usize>> {
        self.selection.range()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection_range().map(|r| self.buffer.slice(r))
    }

    pub fn buffer(&self) -> &RopeBuffer {
        &self.buffer
    }

    /// Returns whether the text changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // =========================================================================
    // Caret and selection
    // =========================================================================

    /// Move the caret by `delta` chars, dropping any selection.
    pub fn move_cursor(&mut self, delta: isize) {
        let target = self.cursor().saturating_add_signed(delta);
        self.set_cursor(target);
    }

    /// Place the caret, dropping any selection.
    pub fn set_cursor(&mut self, pos: usize) {
        self.selection = Selection::collapsed(pos.min(self.len()));
    }

    /// Select `anchor..active` (either order); the caret goes to `active`.
    pub fn set_selection(&mut self, anchor: usize, active: usize) {
        self.selection = Selection::new(anchor, active).clamped(self.len());
    }

    pub fn clear_selection(&mut self) {
        self.selection.collapse();
    }

    /// Move the caret to `pos`, keeping the anchor.
    pub fn extend_selection_to(&mut self, pos: usize) {
        self.selection.extend_to(pos.min(self.len()));
    }

    pub fn select_all(&mut self) {
        self.set_selection(0, self.len());
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert at the caret, replacing the selection. The caret ends up after
    /// the inserted text.
    pub fn insert(&mut self, text: &str) {
        self.delete_selection();
        let at = self.cursor();
        self.buffer.insert(at, text);
        self.selection = Selection::collapsed(at + text.chars().count());
        self.dirty = true;
    }

    /// Remove `[start, end)` (clamped, either order). The caret moves to the
    /// lower end. Equal ends are a no-op.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        let len = self.len();
        let (lo, hi) = (start.min(end).min(len), start.max(end).min(len));
        if lo == hi {
            return;
        }
        self.buffer.remove(lo..hi);
        self.selection = Selection::collapsed(lo);
        self.dirty = true;
    }

    /// Delete the selected text. Returns false without a selection.
    pub fn delete_selection(&mut self) -> bool {
        match self.selection_range() {
            Some(range) => {
                self.delete_range(range.start, range.end);
                true
            }
            None => false,
        }
    }

    /// Replace a range and put the caret after the new text.
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let len = self.len();
        let lo = start.min(end).min(len);
        let hi = start.max(end).min(len);
        self.buffer.replace(lo..hi, text);
        self.selection = Selection::collapsed(lo + text.chars().count());
        self.dirty = true;
    }

    /// Replace a range without disturbing the caret or selection more than
    /// the edit forces: offsets after the range shift, offsets inside it
    /// snap to its start.
    pub fn splice(&mut self, start: usize, end: usize, text: &str) {
        let len = self.len();
        let lo = start.min(end).min(len);
        let hi = start.max(end).min(len);
        let inserted = text.chars().count();
        self.buffer.replace(lo..hi, text);

        let shift = |p: usize| {
            if p <= lo {
                p
            } else if p >= hi {
                p - (hi - lo) + inserted
            } else {
                lo
            }
        };
        self.selection = Selection::new(shift(self.selection.anchor), shift(self.selection.head))
            .clamped(self.len());
        self.dirty = true;
    }

    /// Replace the whole text; the caret goes to the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_content(text);
        self.selection = Selection::collapsed(self.len());
        self.dirty = true;
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Restore text and selection exactly, clamping the selection.
    pub fn restore(&mut self, text: &str, selection: Selection) {
        self.buffer.set_content(text);
        self.selection = selection.clamped(self.len());
        self.dirty = true;
    }

    // =========================================================================
    // Line and word navigation
    // =========================================================================

    /// Offset of the first char of the hard line holding `pos`
    pub fn beginning_of_line(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.len());
        while pos > 0 {
            if matches!(self.char_at(pos - 1), Some('\n' | '\r')) {
                break;
            }
            pos -= 1;
        }
        pos
    }

    /// Offset of the hard break ending the line holding `pos` (or the end)
    pub fn end_of_line(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.len());
        while let Some(ch) = self.char_at(pos) {
            if ch == '\n' || ch == '\r' {
                break;
            }
            pos += 1;
        }
        pos
    }

    /// Ctrl+Left target: back over a word (a backslash escapes the char after
    /// it into the word), then over whitespace. Always moves if it can.
    pub fn word_left(&self, from: usize) -> usize {
        let start = from.min(self.len());
        let mut pos = start;
        loop {
            if pos == 0 {
                break;
            }
            let escaped = pos > 1 && self.char_at(pos - 2) == Some('\\');
            let word = self.char_at(pos - 1).is_some_and(is_word_char);
            if !(word || escaped) {
                break;
            }
            pos -= if escaped { 2 } else { 1 };
        }
        while pos > 0 && self.char_at(pos - 1).is_some_and(char::is_whitespace) {
            pos -= 1;
        }
        if pos == start && pos > 0 {
            pos -= 1;
        }
        pos
    }

    /// Ctrl+Right target: over a word (backslash escapes included), then over
    /// whitespace. Always moves if it can.
    pub fn word_right(&self, from: usize) -> usize {
        let len = self.len();
        let start = from.min(len);
        let mut pos = start;
        while let Some(ch) = self.char_at(pos) {
            if ch == '\\' {
                pos = (pos + 2).min(len);
            } else if is_word_char(ch) {
                pos += 1;
            } else {
                break;
            }
        }
        while self.char_at(pos).is_some_and(char::is_whitespace) {
            pos += 1;
        }
        if pos == start && pos < len {
            pos += 1;
        }
        pos
    }

    /// Alt+Left target: the opening bracket of the group enclosing `from`.
    pub fn enclosing_open_bracket(&self, from: usize) -> usize {
        let mut pos = from.min(self.len());
        let mut depth = 0usize;
        while pos > 0 {
            pos -= 1;
            match self.char_at(pos) {
                Some('(' | '[') if depth == 0 => break,
                Some('(' | '[') => depth -= 1,
                Some(')' | ']') => depth += 1,
                _ => {}
            }
        }
        pos
    }

    /// Alt+Right target: just past the closing bracket of the enclosing group.
    pub fn enclosing_close_bracket(&self, from: usize) -> usize {
        let len = self.len();
        let mut pos = from.min(len);
        let mut depth = 0usize;
        while pos < len {
            pos += 1;
            match self.char_at(pos - 1) {
                Some(')' | ']') if depth == 0 => break,
                Some(')' | ']') => depth -= 1,
                Some('(' | '[') => depth += 1,
                _ => {}
            }
        }
        pos
    }
}
