//! Undo/redo tests through the edit controller

mod common;

use cell_editor::{CellKind, CellEditor, EditCommand, EditorConfig, FocusContext};
use common::{code_cell, type_text};

#[test]
fn test_undo_two_edits_then_redo() {
    let mut cell = code_cell("");
    cell.handle(EditCommand::InsertText("a".into()));
    cell.handle(EditCommand::InsertText("b".into()));

    assert!(cell.handle(EditCommand::Undo));
    assert_eq!(cell.text(), "a");
    assert!(cell.handle(EditCommand::Undo));
    assert_eq!(cell.text(), "");
    assert!(cell.handle(EditCommand::Redo));
    assert_eq!(cell.text(), "a");
}

#[test]
fn test_undo_restores_caret() {
    let mut cell = code_cell("abc");
    cell.set_cursor(1);
    cell.handle(EditCommand::InsertChar('x'));
    assert_eq!(cell.cursor(), 2);
    cell.handle(EditCommand::Undo);
    assert_eq!(cell.text(), "abc");
    assert_eq!(cell.cursor(), 1);
}

#[test]
fn test_undo_kill_line_restores_selection() {
    let mut cell = code_cell("ab\ncd");
    cell.set_selection(0, 2);
    cell.handle(EditCommand::KillLine);
    assert_eq!(cell.text(), "abcd");

    assert!(cell.handle(EditCommand::Undo));
    assert_eq!(cell.text(), "ab\ncd");
    assert_eq!(cell.selected_text().as_deref(), Some("ab"));
}

#[test]
fn test_nothing_to_undo() {
    let mut cell = code_cell("abc");
    assert!(!cell.can_undo());
    assert!(!cell.handle(EditCommand::Undo));
    assert!(!cell.handle(EditCommand::Redo));
    assert_eq!(cell.text(), "abc");
}

#[test]
fn test_new_edit_after_undo_drops_redo() {
    let mut cell = code_cell("");
    type_text(&mut cell, "ab");
    cell.handle(EditCommand::Undo);
    assert!(cell.can_redo());
    cell.handle(EditCommand::InsertChar('z'));
    assert!(!cell.handle(EditCommand::Redo));
}

#[test]
fn test_undo_whole_text_operations() {
    let mut cell = code_cell("x+x");
    assert_eq!(cell.replace_all("x", "y", false), 2);
    assert!(cell.add_ending());
    assert_eq!(cell.text(), "y+y;");
    cell.handle(EditCommand::Undo);
    assert_eq!(cell.text(), "y+y");
    cell.handle(EditCommand::Undo);
    assert_eq!(cell.text(), "x+x");
}

#[test]
fn test_history_limit_bounds_undo_depth() {
    let config = EditorConfig {
        history_limit: 3,
        ..EditorConfig::default()
    };
    let mut cell = CellEditor::new(CellKind::Code, "", FocusContext::shared(), config);
    for ch in "abcdefgh".chars() {
        cell.handle(EditCommand::InsertText(ch.to_string()));
    }
    let mut undone = 0;
    while cell.handle(EditCommand::Undo) {
        undone += 1;
        assert!(undone < 10, "undo never ran out");
    }
    assert!(undone <= 3);
    assert!(!cell.text().is_empty());
}
