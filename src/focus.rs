//! Which cell owns the caret, and where searches and selections started.
//!
//! The document owns one `FocusContext` and hands it to every cell editor.
//! Cells are referred to by [`CellId`] handles only, so a destroyed cell can
//! never be reached through a stale reference: [`FocusContext::forget`]
//! drops every mention of it.

use std::cell::RefCell;
use std::rc::Rc;

/// Opaque handle of a cell registered with a [`FocusContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Where a search started: the cell and the offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAnchor {
    pub cell: CellId,
    pub index: usize,
}

/// Document-wide focus and anchoring state
#[derive(Debug, Default)]
pub struct FocusContext {
    next_id: u64,
    active: Option<CellId>,
    search_anchor: Option<SearchAnchor>,
    mouse_selection_start: Option<CellId>,
    keyboard_selection_start: Option<CellId>,
}

/// How cell editors share a focus context
pub type SharedFocus = Rc<RefCell<FocusContext>>;

impl FocusContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new context wrapped for sharing between cells
    pub fn shared() -> SharedFocus {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Hand out a fresh cell handle
    pub fn register(&mut self) -> CellId {
        self.next_id += 1;
        CellId(self.next_id)
    }

    pub fn set_active(&mut self, cell: CellId) {
        if self.active != Some(cell) {
            tracing::trace!(cell = cell.raw(), "cell activated");
        }
        self.active = Some(cell);
    }

    /// Deactivate `cell` if it is the active one
    pub fn clear_if_active(&mut self, cell: CellId) {
        if self.active == Some(cell) {
            self.active = None;
        }
    }

    pub fn is_active(&self, cell: CellId) -> bool {
        self.active == Some(cell)
    }

    pub fn active(&self) -> Option<CellId> {
        self.active
    }

    /// Record that a search started in `cell` at `index`
    pub fn search_started_here(&mut self, cell: CellId, index: usize) {
        self.search_anchor = Some(SearchAnchor { cell, index });
    }

    pub fn search_anchor(&self) -> Option<SearchAnchor> {
        self.search_anchor
    }

    pub fn clear_search_anchor(&mut self) {
        self.search_anchor = None;
    }

    pub fn mouse_selection_started_here(&mut self, cell: CellId) {
        self.mouse_selection_start = Some(cell);
    }

    pub fn mouse_selection_start(&self) -> Option<CellId> {
        self.mouse_selection_start
    }

    pub fn keyboard_selection_started_here(&mut self, cell: CellId) {
        self.keyboard_selection_start = Some(cell);
    }

    pub fn keyboard_selection_start(&self) -> Option<CellId> {
        self.keyboard_selection_start
    }

    /// Drop every reference to a destroyed cell
    pub fn forget(&mut self, cell: CellId) {
        self.clear_if_active(cell);
        if self.search_anchor.is_some_and(|a| a.cell == cell) {
            self.search_anchor = None;
        }
        if self.mouse_selection_start == Some(cell) {
            self.mouse_selection_start = None;
        }
        if self.keyboard_selection_start == Some(cell) {
            self.keyboard_selection_start = None;
        }
    }
}
