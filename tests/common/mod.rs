//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::rc::Rc;

use cell_editor::focus::SharedFocus;
use cell_editor::style::metrics::MonospaceMetrics;
use cell_editor::{CellEditor, CellKind, EditCommand, EditorConfig, FocusContext};

/// Pixel width of every char in measured test cells
pub const CHAR_WIDTH: f32 = 10.0;
/// Pixel height of a visual line in measured test cells
pub const LINE_HEIGHT: f32 = 20.0;

/// Fixed-width metrics used by every measured test cell
pub fn metrics() -> Rc<MonospaceMetrics> {
    Rc::new(MonospaceMetrics::new(CHAR_WIDTH, LINE_HEIGHT))
}

/// Code cell with default config and no metrics, caret at the end
pub fn code_cell(text: &str) -> CellEditor {
    CellEditor::new(
        CellKind::Code,
        text,
        FocusContext::shared(),
        EditorConfig::default(),
    )
}

/// Cell of `kind` measured with [`metrics`], wrapped at `wrap` pixels
pub fn measured_cell(kind: CellKind, text: &str, wrap: f32) -> CellEditor {
    let config = EditorConfig {
        wrap_width: wrap,
        ..EditorConfig::default()
    };
    CellEditor::new(kind, text, FocusContext::shared(), config).with_metrics(metrics())
}

/// Cell registered with an existing focus context
pub fn cell_in(focus: &SharedFocus, kind: CellKind, text: &str) -> CellEditor {
    CellEditor::new(kind, text, focus.clone(), EditorConfig::default())
}

/// Type `text` one char at a time
pub fn type_text(cell: &mut CellEditor, text: &str) {
    for ch in text.chars() {
        if ch == '\n' {
            cell.handle(EditCommand::InsertNewline);
        } else {
            cell.handle(EditCommand::InsertChar(ch));
        }
    }
}

/// Run several commands in order
pub fn run(cell: &mut CellEditor, commands: impl IntoIterator<Item = EditCommand>) {
    for command in commands {
        cell.handle(command);
    }
}

/// Check the caret/selection invariants against the text length
pub fn assert_offsets_valid(cell: &CellEditor) {
    let len = cell.len();
    let selection = cell.selection();
    assert!(cell.cursor() <= len, "cursor {} past end {len}", cell.cursor());
    assert!(selection.anchor <= len, "anchor {} past end {len}", selection.anchor);
    assert!(selection.head <= len, "head {} past end {len}", selection.head);
}
