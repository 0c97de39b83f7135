//! Display runs: styled, line-broken fragments ready for layout.

use super::metrics::{TextMetrics, WidthCache};
use super::token::TextStyle;
use serde::Serialize;

/// Text of a run that stands for a soft line break
pub const SOFT_BREAK: &str = "\r";

/// What a run stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Buffer text drawn as is
    Text,
    /// A `\n` from the buffer
    HardBreak,
    /// A buffer space turned into a wrap point
    SoftBreak,
    /// Decoration with no buffer text behind it (fold marker)
    Annotation,
}

/// One styled fragment of a cell's text.
///
/// A run never spans a style change or a line break. Text and break runs
/// together cover the buffer exactly, one char per buffer char.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRun {
    pub text: String,
    /// None inherits the cell's default style
    pub style: Option<TextStyle>,
    pub kind: RunKind,
    /// Char offset in the buffer
    pub start: usize,
    /// Indentation of the visual line this run starts, for break runs
    pub indent: f32,
    /// Glyph redrawn at the start of a wrapped continuation line
    pub glyph: Option<String>,
    #[serde(skip)]
    width: Option<f32>,
}

impl DisplayRun {
    pub fn text(text: impl Into<String>, style: Option<TextStyle>, start: usize) -> Self {
        Self {
            text: text.into(),
            style,
            kind: RunKind::Text,
            start,
            indent: 0.0,
            glyph: None,
            width: None,
        }
    }

    pub fn hard_break(start: usize) -> Self {
        Self {
            kind: RunKind::HardBreak,
            ..Self::text("\n", None, start)
        }
    }

    pub fn soft_break(start: usize, indent: f32, glyph: Option<String>) -> Self {
        Self {
            kind: RunKind::SoftBreak,
            indent,
            glyph,
            ..Self::text(SOFT_BREAK, None, start)
        }
    }

    pub fn annotation(text: impl Into<String>, style: TextStyle, start: usize) -> Self {
        Self {
            kind: RunKind::Annotation,
            ..Self::text(text, Some(style), start)
        }
    }

    pub fn is_line_break(&self) -> bool {
        matches!(self.kind, RunKind::HardBreak | RunKind::SoftBreak)
    }

    pub fn is_soft_break(&self) -> bool {
        self.kind == RunKind::SoftBreak
    }

    /// Number of buffer chars this run covers
    pub fn buffer_len(&self) -> usize {
        match self.kind {
            RunKind::Annotation => 0,
            RunKind::HardBreak | RunKind::SoftBreak => 1,
            RunKind::Text => self.text.chars().count(),
        }
    }

    /// Char offset just past this run
    pub fn end(&self) -> usize {
        self.start + self.buffer_len()
    }

    /// Pixel width, measured once. Breaks are zero wide.
    pub fn width(&mut self, cache: &mut WidthCache, metrics: &dyn TextMetrics) -> f32 {
        if self.is_line_break() {
            return 0.0;
        }
        if let Some(w) = self.width {
            return w;
        }
        let w = cache
            .measure(metrics, self.style.unwrap_or_default(), &self.text)
            .width;
        self.width = Some(w);
        w
    }

    /// The width computed by the last [`DisplayRun::width`] call
    pub fn cached_width(&self) -> Option<f32> {
        if self.is_line_break() {
            Some(0.0)
        } else {
            self.width
        }
    }

    /// Forget the measured width (font or zoom changed)
    pub fn invalidate_width(&mut self) {
        self.width = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::metrics::MonospaceMetrics;

    #[test]
    fn test_buffer_len_by_kind() {
        assert_eq!(DisplayRun::text("abc", None, 0).buffer_len(), 3);
        assert_eq!(DisplayRun::hard_break(3).buffer_len(), 1);
        assert_eq!(DisplayRun::soft_break(3, 8.0, None).buffer_len(), 1);
        assert_eq!(
            DisplayRun::annotation(" ... + 2 hidden lines", TextStyle::Comment, 3).buffer_len(),
            0
        );
    }

    #[test]
    fn test_width_is_cached_on_the_run() {
        let metrics = MonospaceMetrics::new(10.0, 20.0);
        let mut cache = WidthCache::new();
        let mut run = DisplayRun::text("abcd", Some(TextStyle::Variable), 0);
        assert_eq!(run.cached_width(), None);
        assert_eq!(run.width(&mut cache, &metrics), 40.0);
        assert_eq!(run.cached_width(), Some(40.0));
        run.invalidate_width();
        assert_eq!(run.cached_width(), None);
    }

    #[test]
    fn test_breaks_have_no_width() {
        let metrics = MonospaceMetrics::new(10.0, 20.0);
        let mut cache = WidthCache::new();
        let mut run = DisplayRun::soft_break(0, 16.0, Some("> ".into()));
        assert_eq!(run.width(&mut cache, &metrics), 0.0);
        assert!(run.is_line_break());
        assert_eq!(run.text, SOFT_BREAK);
    }
}
