//! Text storage, caret/selection state and undo history for editor cells.
//!
//! # Architecture
//!
//! - [`TextBuffer`] / [`TextBufferMut`]: traits abstracting char-offset storage
//! - [`RopeBuffer`]: the `ropey::Rope` backed implementation
//! - [`Selection`]: the single caret/selection value type
//! - [`EditBuffer`]: text + selection with clamping edit primitives
//! - [`HistoryStack`]: snapshot undo/redo
//!
//! # Example
//!
//! ```
//! use cell_editor::editable::EditBuffer;
//!
//! let mut buf = EditBuffer::new("hello");
//! buf.set_selection(0, 5);
//! buf.insert("bye");
//! assert_eq!(buf.text(), "bye");
//! assert_eq!(buf.cursor(), 3);
//! ```

mod buffer;
mod edit_buffer;
mod history;
mod selection;

pub use buffer::{RopeBuffer, TextBuffer, TextBufferMut};
pub use edit_buffer::EditBuffer;
pub use history::{HistoryStack, Snapshot};
pub use selection::Selection;
