//! Benchmarks for edit commands on a styled cell
//!
//! Run with: cargo bench editing

use std::rc::Rc;

use cell_editor::style::metrics::MonospaceMetrics;
use cell_editor::{CellEditor, CellKind, EditCommand, EditorConfig, FocusContext, MoveTarget, SearchDirection};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn make_cell(lines: usize) -> CellEditor {
    let text = "for i thru 10 do (a[i]: i^2, print(a[i]));\n".repeat(lines);
    CellEditor::new(
        CellKind::Code,
        &text,
        FocusContext::shared(),
        EditorConfig::default(),
    )
    .with_metrics(Rc::new(MonospaceMetrics::new(8.0, 16.0)))
}

#[divan::bench(args = [10, 100, 500])]
fn type_and_restyle(bencher: divan::Bencher, lines: usize) {
    let mut cell = make_cell(lines);
    bencher.bench_local(|| {
        cell.handle(EditCommand::InsertChar('x'));
        divan::black_box(cell.styled());
        cell.handle(EditCommand::DeleteBackward);
    });
}

#[divan::bench(args = [10, 100, 500])]
fn newline_with_indent(bencher: divan::Bencher, lines: usize) {
    let mut cell = make_cell(lines);
    bencher.bench_local(|| {
        cell.handle(EditCommand::InsertNewline);
        cell.handle(EditCommand::Undo);
    });
}

#[divan::bench(args = [10, 100, 500])]
fn vertical_moves(bencher: divan::Bencher, lines: usize) {
    let mut cell = make_cell(lines);
    bencher.bench_local(|| {
        cell.handle(EditCommand::Move(MoveTarget::DocumentStart));
        for _ in 0..lines {
            cell.handle(EditCommand::Move(MoveTarget::Down));
        }
        divan::black_box(cell.cursor());
    });
}

#[divan::bench(args = [10, 100, 500])]
fn find_all(bencher: divan::Bencher, lines: usize) {
    let mut cell = make_cell(lines);
    cell.activate();
    bencher.bench_local(|| {
        cell.set_cursor(0);
        let mut hits = 0;
        while cell.find_next("print", SearchDirection::Down, false) {
            hits += 1;
        }
        divan::black_box(hits)
    });
}
