//! The edit controller of one editor cell.
//!
//! [`CellEditor`] ties an [`EditBuffer`] to its undo history, its styled
//! layout and the document's [`FocusContext`](crate::focus::FocusContext).
//! Every command is atomic: destructive commands snapshot the state first,
//! and the layout is recomputed lazily on the next query.

pub mod command;
pub mod parens;
pub mod search;

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

pub use command::{EditCommand, MoveTarget};
pub use search::SearchDirection;

use crate::clipboard::{Clipboard, RetryPolicy};
use crate::config::EditorConfig;
use crate::editable::{EditBuffer, HistoryStack, Selection, Snapshot};
use crate::export;
use crate::focus::{CellId, SharedFocus};
use crate::mapper::{CoordinateMapper, Point};
use crate::style::metrics::TextMetrics;
use crate::style::run::RunKind;
use crate::style::token::{CasTokenizer, TextStyle, Token, Tokenizer};
use crate::style::{indent_depth, CellKind, StyleOptions, StyledText, Styler};
use crate::tracing::SelectionSnapshot;
use crate::util::text::{
    closing_partner, is_close_bracket, is_symbol_char, normalize_line_separators, tab_expand,
    INDENT_UNIT, NBSP,
};

/// Template placeholder before the caret (the last one)
static PLACEHOLDER_BEFORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<[^> \n]+>)[^>]*$").expect("valid placeholder regex"));

/// Template placeholder after the caret (the first one)
static PLACEHOLDER_AFTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<[^> \n]+>)").expect("valid placeholder regex"));

/// Operators that get a `%` prefix when typed into an empty code cell
const ANS_OPERATORS: &[char] = &['+', '*', '/', '^', '=', ','];

/// Edit controller of one cell
pub struct CellEditor {
    id: CellId,
    kind: CellKind,
    buffer: EditBuffer,
    history: HistoryStack,
    styler: Styler,
    layout: StyledText,
    /// Options changed since the layout was computed
    restyle: bool,
    tokenizer: Rc<dyn Tokenizer>,
    metrics: Option<Rc<dyn TextMetrics>>,
    focus: SharedFocus,
    config: EditorConfig,
    /// Column kept across a run of vertical moves
    sticky_column: Option<usize>,
    parens: Option<(usize, usize)>,
    first_line_only: bool,
}

impl std::fmt::Debug for CellEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellEditor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("buffer", &self.buffer)
            .field("history", &self.history.len())
            .field("measured", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for CellEditor {
    fn drop(&mut self) {
        if let Ok(mut focus) = self.focus.try_borrow_mut() {
            focus.forget(self.id);
        }
    }
}

impl CellEditor {
    /// Create a cell registered with `focus`, caret at the end of `text`.
    pub fn new(kind: CellKind, text: &str, focus: SharedFocus, config: EditorConfig) -> Self {
        let id = focus.borrow_mut().register();
        Self {
            id,
            kind,
            buffer: EditBuffer::new(text),
            history: HistoryStack::with_max_size(config.history_limit),
            styler: Styler::new(),
            layout: StyledText::default(),
            restyle: true,
            tokenizer: Rc::new(CasTokenizer),
            metrics: None,
            focus,
            config,
            sticky_column: None,
            parens: None,
            first_line_only: false,
        }
    }

    /// Use another tokenizer for code cells
    pub fn with_tokenizer(mut self, tokenizer: Rc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self.restyle = true;
        self
    }

    /// Measure and wrap with `metrics`
    pub fn with_metrics(mut self, metrics: Rc<dyn TextMetrics>) -> Self {
        self.set_metrics(Some(metrics));
        self
    }

    /// Bind or unbind the metrics provider
    pub fn set_metrics(&mut self, metrics: Option<Rc<dyn TextMetrics>>) {
        self.metrics = metrics;
        self.styler.cache_mut().clear();
        self.restyle = true;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn selection(&self) -> Selection {
        self.buffer.selection()
    }

    pub fn has_selection(&self) -> bool {
        self.buffer.has_selection()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.buffer.selected_text()
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the configuration; the layout follows on the next query.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
        self.restyle = true;
    }

    /// Matching bracket or quote positions around the caret, code cells only
    pub fn parens(&self) -> Option<(usize, usize)> {
        self.parens
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_active(&self) -> bool {
        self.focus.borrow().is_active(self.id)
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Take the caret. Returns true if the cell was folded and got unfolded.
    pub fn activate(&mut self) -> bool {
        self.focus.borrow_mut().set_active(self.id);
        self.buffer.clear_selection();
        self.parens = None;
        self.sticky_column = None;
        let unfolded = std::mem::take(&mut self.first_line_only);
        if unfolded {
            self.restyle = true;
        }
        if self.kind.is_code() {
            self.update_parens();
        }
        unfolded
    }

    /// Give up the caret
    pub fn deactivate(&mut self) {
        self.buffer.clear_selection();
        self.parens = None;
        self.focus.borrow_mut().clear_if_active(self.id);
    }

    /// Record that a document-level search starts at the caret of this cell
    pub fn search_started_here(&self) {
        self.focus
            .borrow_mut()
            .search_started_here(self.id, self.buffer.cursor());
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// The current layout, restyled first if the text or options changed
    pub fn styled(&mut self) -> &StyledText {
        self.ensure_styled();
        &self.layout
    }

    /// Tokens of the whole text, also when folded
    pub fn all_tokens(&mut self) -> &[Token] {
        self.ensure_styled();
        &self.layout.tokens
    }

    /// Variable and function names found in the text
    pub fn word_list(&mut self) -> &[String] {
        self.ensure_styled();
        &self.layout.word_list
    }

    /// Position mapping for the current layout
    pub fn mapper(&mut self) -> CoordinateMapper<'_> {
        self.ensure_styled();
        let text = self.buffer.text();
        CoordinateMapper::new(&text, &self.layout, self.metrics.as_deref())
    }

    /// Pixel point of the caret drawn before `pos`
    pub fn position_to_point(&mut self, pos: usize) -> Point {
        self.mapper().position_to_point(pos)
    }

    /// Width of the first `column` chars of visual line `line`
    pub fn line_width(&mut self, line: usize, column: usize) -> f32 {
        self.mapper().line_width(line, column)
    }

    pub fn is_first_line_only(&self) -> bool {
        self.first_line_only
    }

    /// Fold the cell to its first line, or unfold it
    pub fn set_first_line_only(&mut self, folded: bool) {
        if self.first_line_only != folded {
            self.first_line_only = folded;
            self.restyle = true;
        }
    }

    pub fn toggle_fold(&mut self) {
        self.set_first_line_only(!self.first_line_only);
    }

    fn style_options(&self, first_line_only: bool) -> StyleOptions {
        StyleOptions {
            first_line_only,
            ..self.config.style_options()
        }
    }

    fn run_styler(&mut self, text: &str, first_line_only: bool) -> StyledText {
        let options = self.style_options(first_line_only);
        if let Some(metrics) = &self.metrics {
            self.styler.cache_mut().sync_zoom(metrics.zoom());
        }
        self.styler.style(
            self.kind,
            text,
            self.tokenizer.as_ref(),
            self.metrics.as_deref(),
            &options,
        )
    }

    fn ensure_styled(&mut self) {
        let dirty = self.buffer.take_dirty();
        if !dirty && !std::mem::take(&mut self.restyle) {
            return;
        }
        self.restyle = false;
        let text = self.buffer.text();
        self.layout = self.run_styler(&text, self.first_line_only);
    }

    /// Run `f` on the text and an unfolded layout of it
    fn with_full_layout<R>(&mut self, f: impl FnOnce(&str, &StyledText) -> R) -> R {
        let text = self.buffer.text();
        if self.first_line_only {
            let full = self.run_styler(&text, false);
            f(&text, &full)
        } else {
            self.ensure_styled();
            f(&text, &self.layout)
        }
    }

    // =========================================================================
    // Command dispatch
    // =========================================================================

    /// Apply one command. Returns whether anything changed.
    pub fn handle(&mut self, command: EditCommand) -> bool {
        let before = SelectionSnapshot::from_buffer(&self.buffer);
        if !command.is_vertical() {
            self.sticky_column = None;
        }

        let changed = match &command {
            EditCommand::Move(target) => self.move_caret(*target, false),
            EditCommand::MoveWithSelection(target) => self.move_caret(*target, true),
            EditCommand::InsertChar(ch) => self.insert_char(*ch, false),
            EditCommand::InsertNonBreakingSpace => self.insert_char(' ', true),
            EditCommand::InsertText(text) => self.insert_text(text),
            EditCommand::InsertNewline => self.insert_newline(),
            EditCommand::DeleteBackward => self.delete_backward(),
            EditCommand::DeleteForward => self.delete_forward(),
            EditCommand::DeleteWordBackward => self.delete_word_backward(),
            EditCommand::DeleteWordForward => self.delete_word_forward(),
            EditCommand::KillLine => self.kill_line(),
            EditCommand::Tab => self.tab(false),
            EditCommand::ShiftTab => self.tab(true),
            EditCommand::SelectAll => {
                self.buffer.select_all();
                true
            }
            EditCommand::Undo => self.undo(),
            EditCommand::Redo => self.redo(),
            EditCommand::CommentSelection => self.comment_selection(),
            EditCommand::HexToUnicode => self.hex_to_unicode(),
        };

        if self.kind.is_code() {
            self.update_parens();
        }

        let after = SelectionSnapshot::from_buffer(&self.buffer);
        if let Some(diff) = before.diff(&after) {
            tracing::trace!(cell = self.id.raw(), ?command, "{diff}");
        }
        changed
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.buffer.text(), self.buffer.selection())
    }

    fn save_history(&mut self) {
        let snapshot = self.snapshot();
        self.history.save(snapshot);
    }

    fn update_parens(&mut self) {
        let cursor = self.buffer.cursor();
        let at_cursor = self.buffer.char_at(cursor);
        self.ensure_styled();
        self.parens = parens::find_matching_parens(&self.layout.tokens, at_cursor, cursor);
    }

    // =========================================================================
    // Movement
    // =========================================================================

    fn move_caret(&mut self, target: MoveTarget, extend: bool) -> bool {
        let cursor = self.buffer.cursor();
        let pos = match target {
            MoveTarget::Left => cursor.saturating_sub(1),
            MoveTarget::Right => (cursor + 1).min(self.buffer.len()),
            MoveTarget::WordLeft => self.buffer.word_left(cursor),
            MoveTarget::WordRight => self.buffer.word_right(cursor),
            MoveTarget::BracketLeft => self.buffer.enclosing_open_bracket(cursor),
            MoveTarget::BracketRight => self.buffer.enclosing_close_bracket(cursor),
            MoveTarget::LineStart => {
                let mapper = self.mapper();
                let (line, _) = mapper.position_to_line_column(cursor);
                mapper.line_column_to_position(line, 0)
            }
            MoveTarget::LineEnd => self.buffer.end_of_line(cursor),
            MoveTarget::DocumentStart => 0,
            MoveTarget::DocumentEnd => self.buffer.len(),
            MoveTarget::Up => self.vertical_target(-1),
            MoveTarget::Down => self.vertical_target(1),
            MoveTarget::PageUp => self.vertical_target(-(self.config.page_lines.max(1) as isize)),
            MoveTarget::PageDown => self.vertical_target(self.config.page_lines.max(1) as isize),
        };

        let before = self.buffer.selection();
        if extend {
            if !self.buffer.has_selection() {
                self.focus
                    .borrow_mut()
                    .keyboard_selection_started_here(self.id);
            }
            self.buffer.extend_selection_to(pos);
        } else {
            self.buffer.set_cursor(pos);
        }
        self.buffer.selection() != before
    }

    /// Target of moving `lines` visual lines, keeping the sticky column.
    ///
    /// Moving past the first or last line goes to the start or end of the
    /// text and ends the vertical run.
    fn vertical_target(&mut self, lines: isize) -> usize {
        let cursor = self.buffer.cursor();
        let sticky = self.sticky_column;
        let mapper = self.mapper();
        let (line, column) = mapper.position_to_line_column(cursor);
        let column = sticky.unwrap_or(column);
        let last = mapper.line_count() - 1;

        let (pos, keep) = if lines < 0 {
            if line == 0 {
                (0, false)
            } else {
                let target = line.saturating_sub(lines.unsigned_abs());
                (mapper.line_column_to_position(target, column), true)
            }
        } else if line >= last {
            (mapper.text_len(), false)
        } else {
            let target = (line + lines.unsigned_abs()).min(last);
            (mapper.line_column_to_position(target, column), true)
        };

        self.sticky_column = keep.then_some(column);
        pos
    }

    /// Place the caret, dropping the selection
    pub fn set_cursor(&mut self, pos: usize) {
        self.sticky_column = None;
        self.buffer.set_cursor(pos);
        if self.kind.is_code() {
            self.update_parens();
        }
    }

    /// Select `anchor..active`; the caret goes to `active`
    pub fn set_selection(&mut self, anchor: usize, active: usize) {
        self.sticky_column = None;
        self.buffer.set_selection(anchor, active);
    }

    pub fn clear_selection(&mut self) {
        self.buffer.clear_selection();
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    fn insert_char(&mut self, ch: char, non_breaking: bool) -> bool {
        self.save_history();
        if ch == ' ' {
            // widths of half-typed words are rarely reused
            self.styler.cache_mut().clear();
        }

        if let Some(range) = self.buffer.selection_range() {
            if let Some((open, close)) = bracket_pair(ch) {
                let inner = self.buffer.slice(range.start, range.end);
                self.buffer
                    .replace_range(range.start, range.end, &format!("{open}{inner}{close}"));
                let caret = if ch == open {
                    range.start + 1
                } else {
                    range.end + 2
                };
                self.buffer.set_cursor(caret);
                return true;
            }
            self.buffer.delete_selection();
        }

        let cursor = self.buffer.cursor();
        if self.config.match_parens
            && (is_close_bracket(ch) || ch == '"')
            && self.buffer.char_at(cursor) == Some(ch)
        {
            self.buffer.set_cursor(cursor + 1);
            return true;
        }

        let typed = if non_breaking && ch == ' ' { NBSP } else { ch };
        self.buffer.insert(typed.encode_utf8(&mut [0; 4]));

        if self.config.match_parens {
            if let Some(close) = closing_partner(ch) {
                let at = self.buffer.cursor();
                self.buffer.splice(at, at, close.encode_utf8(&mut [0; 4]));
            }
        }

        if self.config.insert_ans && self.kind.is_code() && ANS_OPERATORS.contains(&ch) {
            self.apply_insert_ans();
        }
        true
    }

    /// `%` in front of an operator starting the cell, but not before `/*`
    fn apply_insert_ans(&mut self) {
        let len = self.buffer.len();
        let cursor = self.buffer.cursor();
        if len == 1 && cursor == 1 {
            self.buffer.splice(0, 0, "%");
        } else if len == 3 && cursor == 3 && self.buffer.text().starts_with("%/*") {
            self.buffer.splice(0, 1, "");
        }
    }

    /// Insert pasted or completed text at the caret, replacing the selection.
    ///
    /// Line separators become `\n` and tabs are expanded relative to the
    /// caret's column.
    pub fn insert_text(&mut self, text: &str) -> bool {
        self.save_history();
        let at = self
            .buffer
            .selection_range()
            .map_or(self.buffer.cursor(), |r| r.start);
        let column = at - self.buffer.beginning_of_line(at);
        let text = tab_expand(&normalize_line_separators(text), column);
        self.buffer.insert(&text);
        true
    }

    fn insert_newline(&mut self) -> bool {
        self.save_history();
        self.buffer.delete_selection();

        let auto_indent = self.config.auto_indent && self.kind.is_code();
        let mut pos = self.buffer.cursor();

        if auto_indent {
            // caret inside the leading blanks: jump to their end
            let bol = self.buffer.beginning_of_line(pos);
            let only_blanks = (bol..pos).all(|i| self.buffer.char_at(i) == Some(' '));
            if only_blanks {
                while self.buffer.char_at(pos) == Some(' ') {
                    pos += 1;
                }
            }
        }

        let depth = if auto_indent {
            indent_depth(&self.buffer.text(), pos)
        } else {
            0
        };

        let mut tail = pos;
        if auto_indent {
            while self.buffer.char_at(tail) == Some(' ') {
                tail += 1;
            }
        }

        let inserted = format!("\n{}", " ".repeat(depth));
        self.buffer.replace_range(pos, tail, &inserted);

        if !self.config.cursor_jump {
            let bol = self.buffer.beginning_of_line(self.buffer.cursor());
            self.buffer.set_cursor(bol);
        }
        true
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    fn delete_backward(&mut self) -> bool {
        self.save_history();
        if self.buffer.delete_selection() {
            return true;
        }
        let pos = self.buffer.cursor();
        if pos == 0 {
            return false;
        }

        if pos >= INDENT_UNIT && self.buffer.slice(pos - INDENT_UNIT, pos) == "    " {
            self.buffer.delete_range(pos - INDENT_UNIT, pos);
            return true;
        }

        let prev = self.buffer.char_at(pos - 1);
        let next = self.buffer.char_at(pos);
        let empty_pair = self.config.match_parens
            && prev.and_then(closing_partner).is_some()
            && prev.and_then(closing_partner) == next;
        let end = if empty_pair { pos + 1 } else { pos };
        self.buffer.delete_range(pos - 1, end);
        true
    }

    fn delete_forward(&mut self) -> bool {
        self.save_history();
        if self.buffer.delete_selection() {
            return true;
        }
        let pos = self.buffer.cursor();
        if pos >= self.buffer.len() {
            return false;
        }
        self.buffer.delete_range(pos, pos + 1);
        true
    }

    /// Alphanumerics, then whitespace; one char if neither was there.
    fn delete_word_backward(&mut self) -> bool {
        self.save_history();
        if self.buffer.delete_selection() {
            return true;
        }
        let end = self.buffer.cursor();
        if end == 0 {
            return false;
        }
        let mut start = end;
        while start > 0 && self.buffer.char_at(start - 1).is_some_and(char::is_alphanumeric) {
            start -= 1;
        }
        while start > 0 && self.buffer.char_at(start - 1).is_some_and(char::is_whitespace) {
            start -= 1;
        }
        if start == end {
            start -= 1;
        }
        self.buffer.delete_range(start, end);
        true
    }

    /// Alphanumerics, then whitespace; one char if neither was there.
    fn delete_word_forward(&mut self) -> bool {
        self.save_history();
        if self.buffer.delete_selection() {
            return true;
        }
        let start = self.buffer.cursor();
        let len = self.buffer.len();
        if start >= len {
            return false;
        }
        let mut end = start;
        while self.buffer.char_at(end).is_some_and(char::is_alphanumeric) {
            end += 1;
        }
        while self.buffer.char_at(end).is_some_and(char::is_whitespace) {
            end += 1;
        }
        if end == start {
            end += 1;
        }
        self.buffer.delete_range(start, end);
        true
    }

    /// Delete to the end of the line, or the line break when already there
    fn kill_line(&mut self) -> bool {
        self.save_history();
        self.buffer.clear_selection();
        let pos = self.buffer.cursor();
        if pos >= self.buffer.len() {
            return false;
        }
        let mut end = self.buffer.end_of_line(pos);
        if end == pos {
            end += 1;
        }
        self.buffer.delete_range(pos, end);
        true
    }

    // =========================================================================
    // Tab
    // =========================================================================

    fn tab(&mut self, outdent: bool) -> bool {
        if self.find_next_template(outdent) {
            return true;
        }
        self.save_history();

        if let Some(range) = self.buffer.selection_range() {
            let start = self.buffer.beginning_of_line(range.start);
            let block = self.buffer.slice(start, range.end);
            let shifted: String = block
                .split_inclusive('\n')
                .map(|line| shift_line(line, outdent))
                .collect();
            let end = start + shifted.chars().count();
            self.buffer.replace_range(start, range.end, &shifted);
            self.buffer.set_selection(start, end);
            return true;
        }

        let pos = self.buffer.cursor();
        let bol = self.buffer.beginning_of_line(pos);
        if !outdent {
            let column = pos - bol;
            let n = INDENT_UNIT - column % INDENT_UNIT;
            self.buffer.insert(&" ".repeat(n));
            return true;
        }

        if self.buffer.slice(bol, bol + INDENT_UNIT) != "    " {
            return false;
        }
        self.buffer.delete_range(bol, bol + INDENT_UNIT);
        let mut caret = if pos > bol { bol } else { pos };
        if pos > bol {
            while self.buffer.char_at(caret) == Some(' ') {
                caret += 1;
            }
        }
        self.buffer.set_cursor(caret);
        true
    }

    /// Select the next (or, going left, previous) `<placeholder>`.
    ///
    /// Searches from the caret in the given direction first, then the rest
    /// of the text.
    fn find_next_template(&mut self, left: bool) -> bool {
        let text = self.buffer.text();
        let selection = self.buffer.selection();
        let caret = if left {
            selection.left()
        } else {
            selection.right()
        };
        let split = search::char_to_byte(&text, caret);
        let (re, parts) = if left {
            (&*PLACEHOLDER_BEFORE, [(0, &text[..split]), (split, &text[split..])])
        } else {
            (&*PLACEHOLDER_AFTER, [(split, &text[split..]), (0, &text[..split])])
        };

        for (offset, hay) in parts {
            if let Some(m) = re.captures(hay).and_then(|c| c.get(1)) {
                let start = search::byte_to_char(&text, offset + m.start());
                let end = search::byte_to_char(&text, offset + m.end());
                self.buffer.set_selection(start, end);
                return true;
            }
        }
        false
    }

    // =========================================================================
    // Undo / redo
    // =========================================================================

    fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(snapshot) => {
                self.buffer.restore(&snapshot.text, snapshot.selection);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.buffer.restore(&snapshot.text, snapshot.selection);
                true
            }
            None => false,
        }
    }

    /// Forget the undo history
    pub fn clear_undo(&mut self) {
        self.history.clear();
    }

    // =========================================================================
    // Whole-text edits
    // =========================================================================

    /// Wrap the selection in `/* */`, caret after the comment
    pub fn comment_selection(&mut self) -> bool {
        let Some(range) = self.buffer.selection_range() else {
            return false;
        };
        self.save_history();
        let inner = self.buffer.slice(range.start, range.end);
        self.buffer
            .replace_range(range.start, range.end, &format!("/*{inner}*/"));
        true
    }

    /// Replace the hex digits before the caret with the char they encode.
    ///
    /// No digits, or a value that is not a char, leave the text alone.
    pub fn hex_to_unicode(&mut self) -> bool {
        let end = self.buffer.cursor();
        let mut start = end;
        while start > 0 && self.buffer.char_at(start - 1).is_some_and(|c| c.is_ascii_hexdigit()) {
            start -= 1;
        }
        if start == end {
            return false;
        }
        let digits = self.buffer.slice(start, end);
        let Some(ch) = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) else {
            return false;
        };
        self.save_history();
        self.buffer.replace_range(start, end, ch.encode_utf8(&mut [0; 4]));
        true
    }

    /// Append a statement terminator unless the code already ends with one.
    ///
    /// Only code cells outside Lisp mode get one. Comments and whitespace
    /// after the last terminator don't count, so blank and comment-only
    /// text is terminated too.
    pub fn add_ending(&mut self) -> bool {
        if self.config.lisp_mode || !self.kind.is_code() {
            return false;
        }
        self.ensure_styled();
        let mut needed = true;
        for token in &self.layout.tokens {
            match token.style {
                TextStyle::EndOfLine | TextStyle::Lisp => needed = false,
                TextStyle::Comment => {}
                _ if token.is_whitespace() => {}
                _ => needed = true,
            }
        }
        if !needed {
            return false;
        }
        self.save_history();
        let len = self.buffer.len();
        self.buffer.splice(len, len, ";");
        self.parens = None;
        true
    }

    /// Replace the whole text as a programmatic edit.
    ///
    /// In code cells a lone opening bracket or quote becomes a pair (caret
    /// inside) when paren matching is on, and a lone operator gets the `%`
    /// prefix when auto-answer is on.
    pub fn set_value(&mut self, text: &str) {
        self.save_history();
        let text = normalize_line_separators(text);
        let mut chars = text.chars();
        let lone = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };

        if self.kind.is_code() {
            if let Some(close) = lone.filter(|_| self.config.match_parens).and_then(closing_partner) {
                self.buffer.set_text(&format!("{text}{close}"));
                self.buffer.set_cursor(1);
                self.finish_set_value();
                return;
            }
            if let Some(op) = lone.filter(|c| self.config.insert_ans && ANS_OPERATORS.contains(c)) {
                self.buffer.set_text(&format!("%{op}"));
                self.finish_set_value();
                return;
            }
        }
        self.buffer.set_text(&text);
        self.finish_set_value();
    }

    fn finish_set_value(&mut self) {
        self.sticky_column = None;
        if self.kind.is_code() {
            self.update_parens();
        }
    }

    /// Split the cell at the caret: keep the text before it and return the
    /// rest. A line break right at the cut is dropped from both halves.
    pub fn divide_at_caret(&mut self) -> String {
        let text: Vec<char> = self.buffer.text().chars().collect();
        let cut = self.buffer.cursor().min(text.len());

        let mut keep_end = cut;
        let mut i = cut;
        while i > 0 && matches!(text[i - 1], ' ' | '\t') {
            i -= 1;
        }
        if i > 0 && text[i - 1] == '\n' {
            keep_end = i - 1;
        }

        let mut rest_start = cut;
        let mut j = cut;
        while j < text.len() && matches!(text[j], ' ' | '\t') {
            j += 1;
        }
        if j < text.len() && text[j] == '\n' {
            rest_start = j + 1;
        }

        let kept: String = text[..keep_end].iter().collect();
        let rest: String = text[rest_start..].iter().collect();
        self.save_history();
        self.buffer.set_text(&kept);
        self.parens = None;
        rest
    }

    // =========================================================================
    // Search and replace
    // =========================================================================

    /// Select the next occurrence of `needle`.
    ///
    /// In the active cell a still-selected previous match makes the search
    /// continue past it; otherwise it starts at the caret. An inactive cell
    /// is searched from its start (or end, going up). Returns false when the
    /// text has no further match; the caret then goes to the start (or end).
    pub fn find_next(&mut self, needle: &str, direction: SearchDirection, ignore_case: bool) -> bool {
        let down = direction == SearchDirection::Down;
        let len = self.buffer.len();
        if needle.is_empty() {
            self.buffer.set_cursor(if down { 0 } else { len });
            return false;
        }

        let hay = search::searchable(&self.buffer.text(), ignore_case);
        let needle: Vec<char> = search::searchable(needle, ignore_case);

        let bound = if self.is_active() {
            match self.buffer.selection_range() {
                Some(range) if hay.get(range.clone()) == Some(needle.as_slice()) => {
                    if down {
                        range.end
                    } else {
                        range.start
                    }
                }
                Some(range) => {
                    if down {
                        range.start
                    } else {
                        range.end
                    }
                }
                None => self.buffer.cursor(),
            }
        } else if down {
            0
        } else {
            len
        };

        match search::find_plain(&hay, &needle, bound, direction) {
            Some(start) => {
                let end = start + needle.len();
                self.select_match(start, end, down);
                true
            }
            None => {
                self.buffer.set_cursor(if down { 0 } else { len });
                false
            }
        }
    }

    /// [`find_next`](Self::find_next) with a regular expression. A
    /// malformed pattern finds nothing.
    pub fn find_next_regex(&mut self, pattern: &str, direction: SearchDirection) -> bool {
        let down = direction == SearchDirection::Down;
        let len = self.buffer.len();
        let Some(re) = search::compile(pattern) else {
            return false;
        };
        let text: String = search::searchable(&self.buffer.text(), false)
            .into_iter()
            .collect();

        let bound = if self.is_active() {
            match self.buffer.selection_range() {
                Some(range) if search::regex_matches_exactly(&re, &text, &range) => {
                    if down {
                        range.end
                    } else {
                        range.start
                    }
                }
                Some(range) => {
                    if down {
                        range.start
                    } else {
                        range.end
                    }
                }
                None => self.buffer.cursor(),
            }
        } else if down {
            0
        } else {
            len
        };

        match search::find_regex(&re, &text, bound, direction) {
            Some(range) => {
                self.select_match(range.start, range.end, down);
                true
            }
            None => {
                self.buffer.set_cursor(if down { 0 } else { len });
                false
            }
        }
    }

    fn select_match(&mut self, start: usize, end: usize, down: bool) {
        if down {
            self.buffer.set_selection(start, end);
        } else {
            self.buffer.set_selection(end, start);
        }
    }

    /// Replace the selection with `new` if it reads `old`.
    ///
    /// With an empty `old` and no selection, `new` is inserted at the caret.
    pub fn replace_selection(
        &mut self,
        old: &str,
        new: &str,
        keep_selected: bool,
        ignore_case: bool,
    ) -> bool {
        let range = match self.buffer.selection_range() {
            Some(range) => range,
            None if old.is_empty() => {
                let at = self.buffer.cursor();
                at..at
            }
            None => return false,
        };

        let selected = search::searchable(&self.buffer.slice(range.start, range.end), ignore_case);
        if selected != search::searchable(old, ignore_case) {
            return false;
        }

        self.save_history();
        self.buffer.replace_range(range.start, range.end, new);
        if keep_selected {
            let end = self.buffer.cursor();
            self.buffer.set_selection(range.start, end);
        }
        if self.kind.is_code() {
            self.update_parens();
        }
        true
    }

    /// Replace every occurrence of `old`. Returns the number replaced.
    pub fn replace_all(&mut self, old: &str, new: &str, ignore_case: bool) -> usize {
        if old.is_empty() {
            return 0;
        }
        let (text, count) = search::replace_plain(&self.buffer.text(), old, new, ignore_case);
        if count > 0 {
            self.apply_replacement(&text);
        }
        count
    }

    /// Replace every match of `pattern`; `$1`-style groups are expanded.
    pub fn replace_all_regex(&mut self, pattern: &str, replacement: &str) -> usize {
        let Some(re) = search::compile(pattern) else {
            return 0;
        };
        let text: String = search::searchable(&self.buffer.text(), false)
            .into_iter()
            .collect();
        let count = re.find_iter(&text).count();
        if count > 0 {
            let replaced = re.replace_all(&text, replacement).into_owned();
            self.apply_replacement(&replaced);
        }
        count
    }

    /// Replace the selection if `pattern` matches exactly it.
    pub fn replace_selection_regex(&mut self, pattern: &str, replacement: &str) -> bool {
        let Some(range) = self.buffer.selection_range() else {
            return false;
        };
        let Some(re) = search::compile(pattern) else {
            return false;
        };
        let text: String = search::searchable(&self.buffer.text(), false)
            .into_iter()
            .collect();
        if !search::regex_matches_exactly(&re, &text, &range) {
            return false;
        }
        let start = search::char_to_byte(&text, range.start);
        let Some(caps) = re.captures_at(&text, start) else {
            return false;
        };
        let mut expanded = String::new();
        caps.expand(replacement, &mut expanded);

        self.save_history();
        self.buffer.replace_range(range.start, range.end, &expanded);
        if self.kind.is_code() {
            self.update_parens();
        }
        true
    }

    fn apply_replacement(&mut self, text: &str) {
        self.save_history();
        let caret = Selection::collapsed(self.buffer.cursor());
        self.buffer.restore(text, caret);
    }

    // =========================================================================
    // Words and commands
    // =========================================================================

    /// Select the word around the caret and return it.
    ///
    /// Words are identifier chars plus `%` and `?`; a backslash escapes the
    /// char after it. `to_right` also accepts a word starting right at the
    /// caret, `include_quotes` treats `"` as a word char. Returns None when
    /// there is no word there.
    pub fn select_word_under_caret(&mut self, to_right: bool, include_quotes: bool) -> Option<String> {
        let text: Vec<char> = self.buffer.text().chars().collect();
        let limit = self.buffer.cursor() + usize::from(to_right);
        let mut start = 0;
        let mut pos = 0;
        while pos < text.len() {
            let ch = text[pos];
            if ch == '\\' {
                pos = (pos + 2).min(text.len());
                continue;
            }
            if !(is_symbol_char(ch) || (include_quotes && ch == '"')) {
                if pos >= limit {
                    break;
                }
                start = pos + 1;
            }
            pos += 1;
        }
        if pos == 0 || start >= pos {
            return None;
        }
        self.buffer.set_selection(start, pos);
        self.buffer.selected_text()
    }

    /// The word touching the caret, without selecting it.
    ///
    /// Falls back to the single char at the caret.
    pub fn word_under_caret(&self) -> String {
        let text: Vec<char> = self.buffer.text().chars().collect();
        let caret = self.buffer.cursor().min(text.len());
        let is_word = |c: char| is_symbol_char(c) || c == '\\' || c == '&';

        let mut word = String::new();
        let mut pos = 0;
        while pos < text.len() {
            let ch = text[pos];
            if !is_word(ch) {
                if pos >= caret {
                    break;
                }
                word.clear();
                pos += 1;
                continue;
            }
            word.push(ch);
            pos += 1;
            if ch == '\\' {
                if let Some(&escaped) = text.get(pos) {
                    word.push(escaped);
                    pos += 1;
                }
            }
        }

        if word.is_empty() {
            if let Some(&ch) = text.get(caret) {
                word.push(ch);
            }
        }
        word
    }

    /// Name of the function whose argument list holds the caret, or "".
    pub fn current_command(&self) -> String {
        let before: Vec<char> = self.buffer.slice(0, self.buffer.cursor()).chars().collect();
        let n = before.len();
        let mut command = String::new();
        let mut candidate = String::new();
        let mut i = 0;

        let take_word_char = |i: &mut usize, out: &mut String| {
            if before[*i] == '\\' {
                out.push('\\');
                *i += 1;
            }
            if *i < n {
                out.push(before[*i]);
                *i += 1;
            }
        };

        while i < n {
            let ch = before[i];
            if ch.is_alphabetic() || ch == '_' || ch == '\\' {
                take_word_char(&mut i, &mut candidate);
                while i < n && (before[i].is_alphanumeric() || before[i] == '_' || before[i] == '\\') {
                    take_word_char(&mut i, &mut candidate);
                }
                continue;
            }
            match ch {
                ' ' | '\t' | '\n' | '\r' => {
                    while i < n && matches!(before[i], ' ' | '\t' | '\n' | '\r') {
                        i += 1;
                    }
                    if i < n && before[i] == '(' {
                        command = std::mem::take(&mut candidate);
                        i += 1;
                    }
                }
                '(' => {
                    if !candidate.is_empty() {
                        command = candidate.clone();
                    }
                    i += 1;
                }
                ';' | '$' => {
                    command.clear();
                    candidate.clear();
                    i += 1;
                }
                _ => {
                    candidate.clear();
                    i += 1;
                }
            }
        }
        command
    }

    /// The statement (up to and including its `;` or `$`) holding the caret.
    ///
    /// Empty unless this cell is active.
    pub fn full_command_under_cursor(&self) -> String {
        if !self.is_active() {
            return String::new();
        }
        let text: Vec<char> = self.buffer.text().chars().collect();
        let caret = self.buffer.cursor();
        let mut statement = String::new();
        let mut i = 0;
        while i < text.len() {
            let ch = text[i];
            statement.push(ch);
            if ch == '\\' {
                if let Some(&escaped) = text.get(i + 1) {
                    statement.push(escaped);
                }
                i += 2;
                continue;
            }
            if ch == ';' || ch == '$' {
                if caret <= i {
                    return statement;
                }
                statement.clear();
            }
            i += 1;
        }
        statement
    }

    /// Style of the run under the caret, or of the first styled run inside
    /// the selection.
    pub fn selection_style(&mut self) -> Option<TextStyle> {
        self.ensure_styled();
        let selection = self.buffer.selection();
        let runs = self.layout.runs.iter().filter(|r| r.kind == RunKind::Text);
        match selection.range() {
            Some(range) => runs
                .filter(|r| r.start >= range.start && r.end() <= range.end)
                .find_map(|r| r.style),
            None => {
                let caret = selection.cursor_position();
                runs.filter(|r| r.start <= caret && caret < r.end())
                    .find_map(|r| r.style)
            }
        }
    }

    // =========================================================================
    // Mouse
    // =========================================================================

    /// Put the caret under a cell-local pixel point
    pub fn select_point(&mut self, point: Point) {
        let pos = self.mapper().point_to_position(point);
        self.focus.borrow_mut().mouse_selection_started_here(self.id);
        self.set_cursor(pos);
    }

    /// Select between two cell-local pixel points (drag)
    pub fn select_rect(&mut self, from: Point, to: Point) {
        let mapper = self.mapper();
        let anchor = mapper.point_to_position(from);
        let active = mapper.point_to_position(to);
        self.parens = None;
        self.set_selection(anchor, active);
    }

    /// Whether a pixel point lies on selected text of the active cell
    pub fn is_point_in_selection(&mut self, point: Point) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(range) = self.buffer.selection_range() else {
            return false;
        };
        let pos = self.mapper().point_to_position(point);
        range.contains(&pos)
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Copy the selection. Non-breaking spaces in code become spaces.
    pub fn copy(&self, clipboard: &mut dyn Clipboard, policy: &RetryPolicy) -> bool {
        let Some(mut text) = self.buffer.selected_text() else {
            return false;
        };
        if text.is_empty() {
            return false;
        }
        if self.kind.is_code() {
            text = text.replace(NBSP, " ");
        }
        policy
            .run("copy to clipboard", || clipboard.set_text(&text))
            .is_ok()
    }

    /// Copy the selection, then delete it
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard, policy: &RetryPolicy) -> bool {
        if !self.copy(clipboard, policy) {
            return false;
        }
        self.save_history();
        self.buffer.delete_selection();
        self.parens = None;
        true
    }

    /// Insert the clipboard's text at the caret
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard, policy: &RetryPolicy) -> bool {
        match policy.run("paste from clipboard", || clipboard.get_text()) {
            Ok(text) => {
                self.insert_text(&text);
                if self.kind.is_code() {
                    self.update_parens();
                }
                true
            }
            Err(_) => false,
        }
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Logical text; only the selection unless `whole` is set
    pub fn to_plain_text(&self, whole: bool) -> String {
        let range = if whole {
            None
        } else {
            self.buffer.selection_range()
        };
        export::to_plain_text(&self.buffer.text(), range)
    }

    pub fn to_html(&mut self) -> String {
        self.with_full_layout(|_, styled| export::to_html(styled))
    }

    pub fn to_markup(&mut self) -> String {
        let kind = self.kind;
        self.with_full_layout(|text, styled| export::to_markup(kind, text, styled))
    }

    pub fn to_xml(&self) -> String {
        export::to_xml(self.kind, &self.buffer.text())
    }

    pub fn to_tex(&self) -> String {
        export::to_tex(self.kind, &self.buffer.text())
    }
}

/// The bracket or quote pair a typed char wraps a selection in
fn bracket_pair(ch: char) -> Option<(char, char)> {
    match ch {
        '(' | ')' => Some(('(', ')')),
        '[' | ']' => Some(('[', ']')),
        '{' | '}' => Some(('{', '}')),
        '"' => Some(('"', '"')),
        _ => None,
    }
}

/// Indent a line by one unit, or remove up to one unit of leading spaces
fn shift_line(line: &str, outdent: bool) -> String {
    if outdent {
        let blanks = line.chars().take(INDENT_UNIT).take_while(|&c| c == ' ').count();
        line[blanks..].to_string()
    } else {
        format!("{}{line}", " ".repeat(INDENT_UNIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::focus::FocusContext;
    use crate::style::metrics::MonospaceMetrics;

    fn code(text: &str) -> CellEditor {
        CellEditor::new(CellKind::Code, text, FocusContext::shared(), EditorConfig::default())
    }

    fn measured(kind: CellKind, text: &str, wrap: f32) -> CellEditor {
        let config = EditorConfig {
            wrap_width: wrap,
            ..EditorConfig::default()
        };
        CellEditor::new(kind, text, FocusContext::shared(), config)
            .with_metrics(Rc::new(MonospaceMetrics::new(10.0, 20.0)))
    }

    fn type_str(cell: &mut CellEditor, s: &str) {
        for ch in s.chars() {
            cell.handle(EditCommand::InsertChar(ch));
        }
    }

    #[test]
    fn test_bracket_auto_close() {
        let mut cell = code("");
        cell.handle(EditCommand::InsertChar('('));
        assert_eq!(cell.text(), "()");
        assert_eq!(cell.cursor(), 1);
    }

    #[test]
    fn test_closer_skips_over() {
        let mut cell = code("");
        type_str(&mut cell, "(a)");
        assert_eq!(cell.text(), "(a)");
        assert_eq!(cell.cursor(), 3);
        type_str(&mut cell, "\"x\"");
        assert_eq!(cell.text(), "(a)\"x\"");
    }

    #[test]
    fn test_wrap_selection_with_opener() {
        let mut cell = code("ab");
        cell.set_selection(0, 2);
        cell.handle(EditCommand::InsertChar('('));
        assert_eq!(cell.text(), "(ab)");
        assert_eq!(cell.cursor(), 1);
        assert!(!cell.has_selection());
    }

    #[test]
    fn test_wrap_selection_with_closer() {
        let mut cell = code("x ab");
        cell.set_selection(2, 4);
        cell.handle(EditCommand::InsertChar(']'));
        assert_eq!(cell.text(), "x [ab]");
        assert_eq!(cell.cursor(), 6);
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut cell = code("abc");
        cell.set_selection(0, 2);
        cell.handle(EditCommand::InsertChar('x'));
        assert_eq!(cell.text(), "xc");
        assert_eq!(cell.cursor(), 1);
    }

    #[test]
    fn test_no_auto_close_without_match_parens() {
        let config = EditorConfig {
            match_parens: false,
            ..EditorConfig::default()
        };
        let mut cell = CellEditor::new(CellKind::Code, "", FocusContext::shared(), config);
        cell.handle(EditCommand::InsertChar('['));
        assert_eq!(cell.text(), "[");
    }

    #[test]
    fn test_insert_ans() {
        let config = EditorConfig {
            insert_ans: true,
            ..EditorConfig::default()
        };
        let mut cell = CellEditor::new(CellKind::Code, "", FocusContext::shared(), config);
        cell.handle(EditCommand::InsertChar('*'));
        assert_eq!(cell.text(), "%*");
        assert_eq!(cell.cursor(), 2);

        let config = EditorConfig {
            insert_ans: true,
            ..EditorConfig::default()
        };
        let mut cell = CellEditor::new(CellKind::Code, "", FocusContext::shared(), config);
        type_str(&mut cell, "/*");
        assert_eq!(cell.text(), "/*");
        assert_eq!(cell.cursor(), 2);
    }

    #[test]
    fn test_non_breaking_space() {
        let mut cell = code("a");
        cell.handle(EditCommand::InsertNonBreakingSpace);
        assert_eq!(cell.text(), "a\u{00A0}");
    }

    #[test]
    fn test_newline_indents_after_do() {
        let mut cell = code("for i do");
        cell.handle(EditCommand::InsertNewline);
        assert_eq!(cell.text(), "for i do\n    ");
        assert_eq!(cell.cursor(), 13);
    }

    #[test]
    fn test_newline_inside_brackets_strips_following_blanks() {
        let mut cell = code("f(a,   b)");
        cell.set_cursor(4);
        cell.handle(EditCommand::InsertNewline);
        assert_eq!(cell.text(), "f(a,\n    b)");
        assert_eq!(cell.cursor(), 9);
    }

    #[test]
    fn test_newline_without_cursor_jump() {
        let config = EditorConfig {
            cursor_jump: false,
            ..EditorConfig::default()
        };
        let mut cell = CellEditor::new(CellKind::Code, "f(", FocusContext::shared(), config);
        cell.handle(EditCommand::InsertNewline);
        assert_eq!(cell.text(), "f(\n    ");
        assert_eq!(cell.cursor(), 3);
    }

    #[test]
    fn test_newline_in_text_cell_does_not_indent() {
        let mut cell = CellEditor::new(
            CellKind::Text,
            "do",
            FocusContext::shared(),
            EditorConfig::default(),
        );
        cell.handle(EditCommand::InsertNewline);
        assert_eq!(cell.text(), "do\n");
    }

    #[test]
    fn test_backspace_removes_indent_unit() {
        let mut cell = code("x\n        ");
        cell.handle(EditCommand::DeleteBackward);
        assert_eq!(cell.text(), "x\n    ");
    }

    #[test]
    fn test_backspace_removes_empty_pair() {
        let mut cell = code("");
        cell.handle(EditCommand::InsertChar('['));
        cell.handle(EditCommand::DeleteBackward);
        assert_eq!(cell.text(), "");
        assert_eq!(cell.cursor(), 0);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut cell = code("ab");
        cell.set_cursor(0);
        assert!(!cell.handle(EditCommand::DeleteBackward));
        assert_eq!(cell.text(), "ab");
    }

    #[test]
    fn test_delete_forward() {
        let mut cell = code("abc");
        cell.set_cursor(1);
        cell.handle(EditCommand::DeleteForward);
        assert_eq!(cell.text(), "ac");
        assert_eq!(cell.cursor(), 1);
    }

    #[test]
    fn test_word_delete_backward() {
        let mut cell = code("foo bar  ");
        cell.handle(EditCommand::DeleteWordBackward);
        assert_eq!(cell.text(), "foo bar");
        cell.handle(EditCommand::DeleteWordBackward);
        assert_eq!(cell.text(), "foo");
        cell.handle(EditCommand::DeleteWordBackward);
        assert_eq!(cell.text(), "");
    }

    #[test]
    fn test_word_delete_always_progresses() {
        let mut cell = code("a+(");
        let before = cell.len();
        cell.handle(EditCommand::DeleteWordBackward);
        assert_eq!(cell.len(), before - 1);
    }

    #[test]
    fn test_word_delete_forward() {
        let mut cell = code("abc  def");
        cell.set_cursor(0);
        cell.handle(EditCommand::DeleteWordForward);
        assert_eq!(cell.text(), "def");
        cell.set_cursor(0);
        cell.set_value(";x");
        cell.set_cursor(0);
        cell.handle(EditCommand::DeleteWordForward);
        assert_eq!(cell.text(), "x");
    }

    #[test]
    fn test_kill_line() {
        let mut cell = code("ab\ncd");
        cell.set_cursor(1);
        cell.handle(EditCommand::KillLine);
        assert_eq!(cell.text(), "a\ncd");
        cell.handle(EditCommand::KillLine);
        assert_eq!(cell.text(), "acd");
    }

    #[test]
    fn test_tab_inserts_to_next_stop() {
        let mut cell = code("ab");
        cell.handle(EditCommand::Tab);
        assert_eq!(cell.text(), "ab  ");
        cell.handle(EditCommand::Tab);
        assert_eq!(cell.text(), "ab      ");
    }

    #[test]
    fn test_shift_tab_outdents_line() {
        let mut cell = code("      x");
        cell.handle(EditCommand::ShiftTab);
        assert_eq!(cell.text(), "  x");
        assert_eq!(cell.cursor(), 2);
    }

    #[test]
    fn test_tab_block_indent() {
        let mut cell = code("a\nb\nc");
        cell.set_selection(0, 3);
        cell.handle(EditCommand::Tab);
        assert_eq!(cell.text(), "    a\n    b\nc");
        assert_eq!(cell.selection(), Selection::new(0, 11));
        cell.handle(EditCommand::ShiftTab);
        assert_eq!(cell.text(), "a\nb\nc");
    }

    #[test]
    fn test_tab_selects_template_placeholders() {
        let mut cell = code("f(<x>, <y>)");
        cell.set_cursor(0);
        cell.handle(EditCommand::Tab);
        assert_eq!(cell.selected_text().as_deref(), Some("<x>"));
        cell.handle(EditCommand::Tab);
        assert_eq!(cell.selected_text().as_deref(), Some("<y>"));
        cell.handle(EditCommand::ShiftTab);
        assert_eq!(cell.selected_text().as_deref(), Some("<x>"));
    }

    #[test]
    fn test_undo_after_two_edits() {
        let mut cell = code("");
        cell.handle(EditCommand::InsertText("a".into()));
        cell.handle(EditCommand::InsertText("b".into()));
        assert_eq!(cell.text(), "ab");
        cell.handle(EditCommand::Undo);
        assert_eq!(cell.text(), "a");
        cell.handle(EditCommand::Undo);
        assert_eq!(cell.text(), "");
        cell.handle(EditCommand::Redo);
        assert_eq!(cell.text(), "a");
    }

    #[test]
    fn test_add_ending() {
        let mut cell = code("1+1");
        assert!(cell.add_ending());
        assert_eq!(cell.text(), "1+1;");
        assert!(!cell.add_ending());
        assert_eq!(cell.text(), "1+1;");
    }

    #[test]
    fn test_add_ending_terminates_blank_and_comment_only() {
        let mut empty = code("");
        assert!(empty.add_ending());
        assert_eq!(empty.text(), ";");
        assert!(!empty.add_ending());

        let mut comment = code("/* c */");
        assert!(comment.add_ending());
        assert_eq!(comment.text(), "/* c */;");
        assert!(!comment.add_ending());
    }

    #[test]
    fn test_add_ending_skips_terminated_and_lisp() {
        assert!(!code("a; /* note */ ").add_ending());
        assert!(!code(":lisp (+ 1 2)").add_ending());
        assert!(code("a; b /* c */").add_ending());

        let config = EditorConfig {
            lisp_mode: true,
            ..EditorConfig::default()
        };
        let mut lisp = CellEditor::new(CellKind::Code, "x", FocusContext::shared(), config);
        assert!(!lisp.add_ending());
    }

    #[test]
    fn test_parens_follow_caret() {
        let mut cell = code("f(x)");
        cell.set_cursor(1);
        assert_eq!(cell.parens(), Some((1, 3)));
        cell.handle(EditCommand::Move(MoveTarget::Right));
        assert_eq!(cell.parens(), None);
        cell.handle(EditCommand::Move(MoveTarget::Right));
        assert_eq!(cell.parens(), Some((1, 3)));
    }

    #[test]
    fn test_sticky_column() {
        let mut cell = measured(CellKind::Code, "abcdef\nx\nabcdef", 0.0);
        cell.set_cursor(5);
        cell.handle(EditCommand::Move(MoveTarget::Down));
        assert_eq!(cell.cursor(), 8);
        cell.handle(EditCommand::Move(MoveTarget::Down));
        assert_eq!(cell.cursor(), 14);
        cell.handle(EditCommand::Move(MoveTarget::Up));
        cell.handle(EditCommand::Move(MoveTarget::Left));
        cell.handle(EditCommand::Move(MoveTarget::Up));
        assert_eq!(cell.cursor(), 0);
    }

    #[test]
    fn test_vertical_moves_past_ends() {
        let mut cell = code("ab\ncd");
        cell.set_cursor(4);
        cell.handle(EditCommand::Move(MoveTarget::Down));
        assert_eq!(cell.cursor(), 5);
        cell.set_cursor(1);
        cell.handle(EditCommand::Move(MoveTarget::Up));
        assert_eq!(cell.cursor(), 0);
    }

    #[test]
    fn test_selection_extension() {
        let mut cell = code("abc");
        cell.set_cursor(0);
        cell.handle(EditCommand::MoveWithSelection(MoveTarget::Right));
        cell.handle(EditCommand::MoveWithSelection(MoveTarget::Right));
        assert_eq!(cell.selected_text().as_deref(), Some("ab"));
        cell.handle(EditCommand::Move(MoveTarget::LineEnd));
        assert!(!cell.has_selection());
        assert_eq!(cell.cursor(), 3);
    }

    #[test]
    fn test_hex_to_unicode() {
        let mut cell = code("x3b1");
        assert!(cell.handle(EditCommand::HexToUnicode));
        assert_eq!(cell.text(), "x\u{03B1}");
        let mut cell = code("xyz");
        assert!(!cell.handle(EditCommand::HexToUnicode));
        cell.set_cursor(0);
        assert!(!cell.handle(EditCommand::HexToUnicode));
        let mut cell = code("d800");
        assert!(!cell.handle(EditCommand::HexToUnicode));
        assert_eq!(cell.text(), "d800");
    }

    #[test]
    fn test_comment_selection() {
        let mut cell = code("a+b");
        cell.set_selection(2, 3);
        cell.handle(EditCommand::CommentSelection);
        assert_eq!(cell.text(), "a+/*b*/");
        assert_eq!(cell.cursor(), 7);
    }

    #[test]
    fn test_divide_at_caret() {
        let mut cell = code("a;\nb;");
        cell.set_cursor(3);
        assert_eq!(cell.divide_at_caret(), "b;");
        assert_eq!(cell.text(), "a;");

        let mut cell = code("a;\nb;");
        cell.set_cursor(2);
        assert_eq!(cell.divide_at_caret(), "b;");
        assert_eq!(cell.text(), "a;");
    }

    #[test]
    fn test_set_value_pairs_brackets() {
        let mut cell = code("");
        cell.set_value("[");
        assert_eq!(cell.text(), "[]");
        assert_eq!(cell.cursor(), 1);
        cell.set_value("x+1");
        assert_eq!(cell.cursor(), 3);
    }

    #[test]
    fn test_word_queries() {
        let mut cell = code("foo(bar_1, %pi)");
        cell.set_cursor(6);
        assert_eq!(cell.word_under_caret(), "bar_1");
        assert_eq!(cell.current_command(), "foo");
        assert_eq!(cell.select_word_under_caret(false, false).as_deref(), Some("bar_1"));
        assert_eq!(cell.selection(), Selection::new(4, 9));

        cell.set_cursor(12);
        assert_eq!(cell.select_word_under_caret(false, false).as_deref(), Some("%pi"));

        let mut empty = code("(  )");
        empty.set_cursor(2);
        assert_eq!(empty.select_word_under_caret(false, false), None);
    }

    #[test]
    fn test_current_command_resets_at_statement_end() {
        let mut cell = code("f(x); y");
        assert_eq!(cell.current_command(), "");
        cell.set_cursor(3);
        assert_eq!(cell.current_command(), "f");
    }

    #[test]
    fn test_full_command_under_cursor() {
        let mut cell = code("a:1; b:2$ c");
        assert_eq!(cell.full_command_under_cursor(), "");
        cell.activate();
        cell.set_cursor(6);
        assert_eq!(cell.full_command_under_cursor(), " b:2$");
        cell.set_cursor(11);
        assert_eq!(cell.full_command_under_cursor(), " c");
    }

    #[test]
    fn test_find_next_advances_and_stops() {
        let mut cell = code("ab ab ab");
        cell.activate();
        cell.set_cursor(0);
        assert!(cell.find_next("ab", SearchDirection::Down, false));
        assert_eq!(cell.selection(), Selection::new(0, 2));
        assert!(cell.find_next("ab", SearchDirection::Down, false));
        assert_eq!(cell.selection(), Selection::new(3, 5));
        assert!(cell.find_next("ab", SearchDirection::Down, false));
        assert!(!cell.find_next("ab", SearchDirection::Down, false));
        assert_eq!(cell.cursor(), 0);
    }

    #[test]
    fn test_find_next_up_and_ignore_case() {
        let mut cell = code("Ab ab");
        cell.activate();
        assert!(cell.find_next("AB", SearchDirection::Up, true));
        assert_eq!(cell.selection(), Selection::new(5, 3));
        assert!(cell.find_next("AB", SearchDirection::Up, true));
        assert_eq!(cell.selection(), Selection::new(2, 0));
        assert!(!cell.find_next("AB", SearchDirection::Up, true));
    }

    #[test]
    fn test_find_next_in_inactive_cell_starts_at_top() {
        let mut cell = code("x y x");
        assert!(cell.find_next("x", SearchDirection::Down, false));
        assert_eq!(cell.selection(), Selection::new(0, 1));
    }

    #[test]
    fn test_find_next_regex() {
        let mut cell = code("a1 b22");
        cell.activate();
        cell.set_cursor(0);
        assert!(cell.find_next_regex("[0-9]+", SearchDirection::Down));
        assert_eq!(cell.selected_text().as_deref(), Some("1"));
        assert!(cell.find_next_regex("[0-9]+", SearchDirection::Down));
        assert_eq!(cell.selected_text().as_deref(), Some("22"));
        assert!(!cell.find_next_regex("(", SearchDirection::Down));
    }

    #[test]
    fn test_replace() {
        let mut cell = code("x+X+x");
        assert_eq!(cell.replace_all("x", "y", true), 3);
        assert_eq!(cell.text(), "y+y+y");
        cell.set_selection(0, 1);
        assert!(!cell.replace_selection("q", "z", false, false));
        assert!(cell.replace_selection("Y", "zz", true, true));
        assert_eq!(cell.text(), "zz+y+y");
        assert_eq!(cell.selected_text().as_deref(), Some("zz"));
    }

    #[test]
    fn test_replace_regex() {
        let mut cell = code("f(1)+f(22)");
        assert_eq!(cell.replace_all_regex(r"f\(([0-9]+)\)", "g($1)"), 2);
        assert_eq!(cell.text(), "g(1)+g(22)");
        cell.set_selection(0, 4);
        assert!(cell.replace_selection_regex(r"g\((\d)\)", "[$1]"));
        assert_eq!(cell.text(), "[1]+g(22)");
        assert_eq!(cell.replace_all_regex("(", "x"), 0);
    }

    #[test]
    fn test_clipboard_round_trip() {
        let mut clip = MemoryClipboard::new();
        let policy = RetryPolicy::immediate(3);
        let mut cell = code("a\u{00A0}b");
        cell.set_selection(0, 3);
        assert!(cell.cut(&mut clip, &policy));
        assert_eq!(clip.contents().as_deref(), Some("a b"));
        assert_eq!(cell.text(), "");
        assert!(cell.paste(&mut clip, &policy));
        assert_eq!(cell.text(), "a b");
    }

    #[test]
    fn test_copy_fails_after_retries() {
        let mut clip = MemoryClipboard::failing(5);
        let mut cell = code("abc");
        cell.handle(EditCommand::SelectAll);
        assert!(!cell.copy(&mut clip, &RetryPolicy::immediate(3)));
        assert!(!cell.cut(&mut clip, &RetryPolicy::immediate(1)));
        assert_eq!(cell.text(), "abc");
    }

    #[test]
    fn test_paste_expands_tabs_at_column() {
        let mut clip = MemoryClipboard::new();
        clip.set_text("\tx\u{2029}y").unwrap();
        let mut cell = code("ab");
        assert!(cell.paste(&mut clip, &RetryPolicy::immediate(1)));
        assert_eq!(cell.text(), "ab  x\ny");
    }

    #[test]
    fn test_folding_keeps_all_tokens() {
        let mut cell = measured(CellKind::Code, "a;\nb;", 600.0);
        cell.set_first_line_only(true);
        assert_eq!(
            cell.styled().runs.last().map(|r| r.text.as_str()),
            Some(" ... + 1 hidden line")
        );
        let all: String = cell.all_tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(all, "a;\nb;");
        assert!(!cell.to_html().contains("hidden"));
        assert!(cell.activate());
        assert!(!cell.is_first_line_only());
    }

    #[test]
    fn test_selection_style() {
        let mut cell = measured(CellKind::Code, "f(x)", 600.0);
        cell.set_cursor(0);
        assert_eq!(cell.selection_style(), Some(TextStyle::Function));
        cell.set_selection(2, 3);
        assert_eq!(cell.selection_style(), Some(TextStyle::Variable));
    }

    #[test]
    fn test_mouse_selection() {
        let mut cell = measured(CellKind::Code, "abcd\nefgh", 0.0);
        cell.activate();
        cell.select_point(Point::new(25.0, 25.0));
        assert_eq!(cell.cursor(), 7);
        cell.select_rect(Point::new(0.0, 0.0), Point::new(30.0, 0.0));
        assert_eq!(cell.selected_text().as_deref(), Some("abc"));
        assert!(cell.is_point_in_selection(Point::new(15.0, 5.0)));
        assert!(!cell.is_point_in_selection(Point::new(15.0, 25.0)));
    }

    #[test]
    fn test_drop_forgets_cell() {
        let focus = FocusContext::shared();
        let mut cell = CellEditor::new(CellKind::Code, "", focus.clone(), EditorConfig::default());
        cell.activate();
        let id = cell.id();
        drop(cell);
        assert!(!focus.borrow().is_active(id));
        assert_eq!(focus.borrow().active(), None);
    }

    #[test]
    fn test_exports_from_cell() {
        let mut cell = CellEditor::new(
            CellKind::Section,
            "Intro",
            FocusContext::shared(),
            EditorConfig::default(),
        );
        assert_eq!(
            cell.to_xml(),
            "<editor type=\"section\" sectioning_level=\"2\">\n<line>Intro</line>\n</editor>\n"
        );
        assert_eq!(cell.to_tex(), "Intro");
        assert!(cell.to_markup().starts_with("\\pard\\s1"));
        assert_eq!(cell.to_plain_text(true), "Intro");
    }
}
