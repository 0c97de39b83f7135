//! Snapshot-based undo/redo for an editor cell.
//!
//! The history stores whole states rather than operations: cells are small,
//! and restoring a snapshot can never leave the caret out of range.

use super::selection::Selection;

/// Text and caret/selection of a cell at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub selection: Selection,
}

impl Snapshot {
    pub fn new(text: impl Into<String>, selection: Selection) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }
}

/// Undo/redo stack of [`Snapshot`]s.
///
/// `position` is None while the user is editing at the head. After an undo
/// it indexes the snapshot currently shown; snapshots after it form the redo
/// tail.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<Snapshot>,
    position: Option<usize>,
    max_size: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStack {
    /// Create a new history with default max size
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    /// Create a new history keeping at most `max_size` snapshots
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            position: None,
            max_size: max_size.max(1),
        }
    }

    /// Record the state about to be edited.
    ///
    /// Drops the redo tail when positioned inside the history. At the head,
    /// nothing is recorded if the text equals the newest snapshot. Returns
    /// whether a snapshot was stored.
    pub fn save(&mut self, current: Snapshot) -> bool {
        if let Some(p) = self.position.take() {
            self.entries.truncate(p + 1);
            self.entries[p] = current;
            return true;
        }

        if self
            .entries
            .last()
            .is_some_and(|last| last.text == current.text)
        {
            return false;
        }

        self.entries.push(current);
        while self.entries.len() > self.max_size {
            self.entries.remove(0);
        }
        true
    }

    /// Step back. `current` is the live state, kept so that redo can return
    /// to it. Returns the snapshot to restore, None at the oldest state.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let target = match self.position {
            None => {
                let last = self.entries.len().checked_sub(1)?;
                if self.entries[last].text == current.text {
                    // nothing happened since the last save
                    if last == 0 {
                        return None;
                    }
                    self.entries[last] = current;
                    last - 1
                } else {
                    self.entries.push(current);
                    let excess = self.entries.len().saturating_sub(self.max_size);
                    self.entries.drain(..excess);
                    last.checked_sub(excess)?
                }
            }
            Some(0) => return None,
            Some(p) => p - 1,
        };

        self.position = Some(target);
        Some(self.entries[target].clone())
    }

    /// Step forward. Returns the snapshot to restore, None at the newest.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let p = self.position?;
        if p + 1 >= self.entries.len() {
            return None;
        }
        self.position = Some(p + 1);
        Some(self.entries[p + 1].clone())
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.position != Some(0)
    }

    pub fn can_redo(&self) -> bool {
        self.position.is_some_and(|p| p + 1 < self.entries.len())
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = None;
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }
}
