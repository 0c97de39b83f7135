//! Find and replace tests

mod common;

use cell_editor::{CellKind, SearchDirection, Selection};
use cell_editor::focus::FocusContext;
use common::{cell_in, code_cell};

#[test]
fn test_find_walks_down_without_wrapping() {
    let mut cell = code_cell("x: 1; y: x; z: x;");
    cell.activate();
    cell.set_cursor(0);
    let mut starts = Vec::new();
    while cell.find_next("x", SearchDirection::Down, false) {
        starts.push(cell.selection().left());
    }
    assert_eq!(starts, vec![0, 9, 15]);
    assert_eq!(cell.cursor(), 0);
}

#[test]
fn test_find_walks_up() {
    let mut cell = code_cell("ab-ab-ab");
    cell.activate();
    let mut starts = Vec::new();
    while cell.find_next("ab", SearchDirection::Up, false) {
        starts.push(cell.selection().left());
    }
    assert_eq!(starts, vec![6, 3, 0]);
    assert_eq!(cell.cursor(), 8);
}

#[test]
fn test_find_ignores_case_on_request() {
    let mut cell = code_cell("Sin(x) + sin(y)");
    cell.activate();
    cell.set_cursor(0);
    assert!(cell.find_next("sin", SearchDirection::Down, true));
    assert_eq!(cell.selection(), Selection::new(0, 3));
    assert!(cell.find_next("sin", SearchDirection::Down, false));
    assert_eq!(cell.selection(), Selection::new(9, 12));
}

#[test]
fn test_search_across_cells() {
    let focus = FocusContext::shared();
    let mut first = cell_in(&focus, CellKind::Code, "a: 1;");
    let mut second = cell_in(&focus, CellKind::Code, "b: a;");
    first.activate();
    first.set_cursor(0);
    first.search_started_here();
    assert!(first.find_next("a", SearchDirection::Down, false));
    assert!(!first.find_next("a", SearchDirection::Down, false));

    // an inactive cell is searched from its start
    assert!(second.find_next("a", SearchDirection::Down, false));
    assert_eq!(second.selection(), Selection::new(3, 4));

    let anchor = focus.borrow().search_anchor().unwrap();
    assert_eq!(anchor.cell, first.id());
    assert_eq!(anchor.index, 0);
}

#[test]
fn test_find_regex_and_malformed_pattern() {
    let mut cell = code_cell("f(10) + g(200)");
    cell.activate();
    cell.set_cursor(0);
    assert!(cell.find_next_regex(r"[a-z]\(\d+\)", SearchDirection::Down));
    assert_eq!(cell.selected_text().as_deref(), Some("f(10)"));
    assert!(cell.find_next_regex(r"[a-z]\(\d+\)", SearchDirection::Down));
    assert_eq!(cell.selected_text().as_deref(), Some("g(200)"));
    assert!(!cell.find_next_regex("[", SearchDirection::Down));
}

#[test]
fn test_replace_after_find() {
    let mut cell = code_cell("a+b+a");
    cell.activate();
    cell.set_cursor(0);
    assert!(cell.find_next("a", SearchDirection::Down, false));
    assert!(cell.replace_selection("a", "c", false, false));
    assert_eq!(cell.text(), "c+b+a");
    assert!(cell.find_next("a", SearchDirection::Down, false));
    assert!(cell.replace_selection("a", "c", false, false));
    assert_eq!(cell.text(), "c+b+c");
}

#[test]
fn test_replace_all_counts() {
    let mut cell = code_cell("aaa");
    assert_eq!(cell.replace_all("a", "bb", false), 3);
    assert_eq!(cell.text(), "bbbbbb");
    assert_eq!(cell.replace_all("x", "y", false), 0);
    assert_eq!(cell.replace_all_regex("b{2}", "c"), 3);
    assert_eq!(cell.text(), "ccc");
}
