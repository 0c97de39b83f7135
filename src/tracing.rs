//! Logging setup and caret/selection diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=cell_editor::controller=trace` - per-command caret changes
//!
//! # Log Files
//!
//! Logs are written to `~/.config/cell-editor/logs/cell-editor.log` with daily
//! rotation. File logging uses debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::editable::EditBuffer;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). When the log directory
/// cannot be created only the console layer is installed.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "cell-editor.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            None
        }
    };

    // A second init (tests, embedding hosts) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Caret and selection of a cell, for diffing around a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub cursor: usize,
    pub anchor: usize,
    pub len: usize,
}

impl SelectionSnapshot {
    pub fn from_buffer(buffer: &EditBuffer) -> Self {
        let selection = buffer.selection();
        Self {
            cursor: selection.head,
            anchor: selection.anchor,
            len: buffer.len(),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &SelectionSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.cursor != other.cursor {
            changes.push(format!("caret {} → {}", self.cursor, other.cursor));
        }
        let before_empty = self.anchor == self.cursor;
        let after_empty = other.anchor == other.cursor;
        if before_empty != after_empty {
            changes.push(format!(
                "selection {}",
                if after_empty { "cleared" } else { "active" }
            ));
        } else if !after_empty && self.anchor != other.anchor {
            changes.push(format!("anchor {} → {}", self.anchor, other.anchor));
        }
        if self.len != other.len {
            changes.push(format!("length {} → {}", self.len, other.len));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
