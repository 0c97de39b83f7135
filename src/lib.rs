//! In-cell text editing engine for CAS worksheets
//!
//! This crate provides the editing core of one worksheet cell: a text buffer
//! with caret and selection, undo history, syntax styling with soft wrapping,
//! caret/pixel coordinate mapping and the edit controller that ties them
//! together. Rendering and the worksheet around the cells belong to the host.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod config_paths;
pub mod controller;
pub mod editable;
pub mod export;
pub mod focus;
pub mod mapper;
pub mod style;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use config::EditorConfig;
pub use controller::{CellEditor, EditCommand, MoveTarget, SearchDirection};
pub use editable::{EditBuffer, HistoryStack, Selection};
pub use focus::FocusContext;
pub use mapper::{CoordinateMapper, Point};
pub use style::{CellKind, StyledText, Styler};
