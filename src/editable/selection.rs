//! The one caret/selection value type used throughout the editor.

/// A caret with an optional selection, as two char offsets.
///
/// `anchor` stays fixed while `head` moves during selection extension. The
/// caret is always `head`; when `anchor == head` there is no selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Where the selection started (fixed point)
    pub anchor: usize,
    /// Where the caret is (moving point)
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (caret with no selection)
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Check if selection is empty (anchor == head)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Lower end of the selection
    pub fn left(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper end of the selection
    pub fn right(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// The caret
    pub fn cursor_position(&self) -> usize {
        self.head
    }

    /// The selected range, or None when collapsed
    pub fn range(&self) -> Option<std::ops::Range<usize>> {
        if self.is_empty() {
            None
        } else {
            Some(self.left()..self.right())
        }
    }

    /// Check if selection is reversed (head before anchor)
    pub fn is_reversed(&self) -> bool {
        self.head < self.anchor
    }

    /// Extend selection to new head position
    pub fn extend_to(&mut self, pos: usize) {
        self.head = pos;
    }

    /// Collapse selection to head position
    pub fn collapse(&mut self) {
        self.anchor = self.head;
    }

    /// Check if a position is within this selection (end exclusive)
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.left() && pos < self.right()
    }

    /// Clamp both ends into `[0, len]`
    pub fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_collapsed() {
        let sel = Selection::collapsed(5);
        assert!(sel.is_empty());
        assert_eq!(sel.range(), None);
        assert_eq!(sel.cursor_position(), 5);
    }

    #[test]
    fn test_selection_left_right() {
        let forward = Selection::new(0, 5);
        assert_eq!(forward.left(), 0);
        assert_eq!(forward.right(), 5);
        assert!(!forward.is_reversed());

        let backward = Selection::new(5, 0);
        assert_eq!(backward.left(), 0);
        assert_eq!(backward.right(), 5);
        assert!(backward.is_reversed());
        assert_eq!(backward.cursor_position(), 0);
    }

    #[test]
    fn test_selection_extend_and_collapse() {
        let mut sel = Selection::collapsed(0);
        sel.extend_to(10);
        assert_eq!(sel.range(), Some(0..10));
        sel.collapse();
        assert!(sel.is_empty());
        assert_eq!(sel.head, 10);
    }

    #[test]
    fn test_selection_contains() {
        let sel = Selection::new(8, 2);
        assert!(!sel.contains(1));
        assert!(sel.contains(2));
        assert!(sel.contains(7));
        assert!(!sel.contains(8));
    }

    #[test]
    fn test_selection_clamped() {
        let sel = Selection::new(3, 12).clamped(5);
        assert_eq!(sel, Selection::new(3, 5));
    }
}
