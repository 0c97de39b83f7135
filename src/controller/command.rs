//! Commands understood by [`CellEditor::handle`](super::CellEditor::handle).

/// Target for caret movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// One char left
    Left,
    /// One char right
    Right,
    /// Ctrl+Left
    WordLeft,
    /// Ctrl+Right
    WordRight,
    /// Alt+Left: opening bracket of the enclosing group
    BracketLeft,
    /// Alt+Right: past the closing bracket of the enclosing group
    BracketRight,
    /// Start of the visual line
    LineStart,
    /// End of the hard line
    LineEnd,
    DocumentStart,
    DocumentEnd,
    /// One visual line up
    Up,
    /// One visual line down
    Down,
    PageUp,
    PageDown,
}

impl MoveTarget {
    /// Whether this move keeps the sticky column alive
    pub fn is_vertical(self) -> bool {
        matches!(
            self,
            MoveTarget::Up | MoveTarget::Down | MoveTarget::PageUp | MoveTarget::PageDown
        )
    }
}

/// One keyboard-level editing command.
///
/// Each command is atomic with respect to text, selection and history.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    // === Movement ===
    /// Move the caret, dropping the selection
    Move(MoveTarget),
    /// Move the caret, extending the selection
    MoveWithSelection(MoveTarget),

    // === Insertion ===
    /// Type a char
    InsertChar(char),
    /// Shift+Space
    InsertNonBreakingSpace,
    /// Insert a string (paste, completion)
    InsertText(String),
    /// Enter
    InsertNewline,

    // === Deletion ===
    /// Backspace
    DeleteBackward,
    /// Delete
    DeleteForward,
    /// Ctrl+Backspace
    DeleteWordBackward,
    /// Ctrl+Delete
    DeleteWordForward,
    /// Ctrl+K
    KillLine,

    // === Indentation ===
    /// Next template placeholder, else indent
    Tab,
    /// Previous template placeholder, else outdent
    ShiftTab,

    // === Selection ===
    SelectAll,

    // === Undo/Redo ===
    Undo,
    Redo,

    // === Misc ===
    /// Wrap the selection in a comment
    CommentSelection,
    /// Alt+X: turn the hex digits before the caret into that char
    HexToUnicode,
}

impl EditCommand {
    /// Whether this command may change the text
    pub fn is_editing(&self) -> bool {
        !matches!(
            self,
            EditCommand::Move(_) | EditCommand::MoveWithSelection(_) | EditCommand::SelectAll
        )
    }

    /// Whether this command keeps the sticky column alive
    pub fn is_vertical(&self) -> bool {
        match self {
            EditCommand::Move(target) | EditCommand::MoveWithSelection(target) => {
                target.is_vertical()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_commands() {
        assert!(EditCommand::Move(MoveTarget::Up).is_vertical());
        assert!(EditCommand::MoveWithSelection(MoveTarget::PageDown).is_vertical());
        assert!(!EditCommand::Move(MoveTarget::Left).is_vertical());
        assert!(!EditCommand::InsertNewline.is_vertical());
    }

    #[test]
    fn test_editing_commands() {
        assert!(EditCommand::InsertChar('a').is_editing());
        assert!(EditCommand::Undo.is_editing());
        assert!(!EditCommand::SelectAll.is_editing());
        assert!(!EditCommand::Move(MoveTarget::WordLeft).is_editing());
    }
}
