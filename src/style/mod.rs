//! Styling: from buffer text to styled, line-broken display runs.
//!
//! Code cells are tokenized and wrapped at the last space before the margin
//! with nesting-aware indentation. Prose cells are wrapped word by word with
//! list and quote continuation indents. Soft breaks are an overlay on the
//! text: the buffer itself only ever holds logical content.

pub mod code;
pub mod indent;
pub mod metrics;
pub mod prose;
pub mod run;
pub mod token;

use metrics::{TextMetrics, WidthCache};
use run::DisplayRun;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use token::{TextStyle, Token, Tokenizer};

pub use indent::indent_depth;

/// Kind of editor cell; decides the styling policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    #[default]
    Code,
    Text,
    Title,
    Section,
    Subsection,
    Subsubsection,
    Heading5,
    Heading6,
}

impl CellKind {
    pub fn is_code(self) -> bool {
        self == CellKind::Code
    }

    /// Style of unstyled text in this kind of cell
    pub fn text_style(self) -> TextStyle {
        match self {
            CellKind::Code => TextStyle::Default,
            CellKind::Text => TextStyle::Text,
            CellKind::Title => TextStyle::Title,
            CellKind::Section => TextStyle::Section,
            CellKind::Subsection => TextStyle::Subsection,
            CellKind::Subsubsection => TextStyle::Subsubsection,
            CellKind::Heading5 => TextStyle::Heading5,
            CellKind::Heading6 => TextStyle::Heading6,
        }
    }

    /// Heading level, None for code and plain text
    pub fn sectioning_level(self) -> Option<u8> {
        match self {
            CellKind::Title => Some(1),
            CellKind::Section => Some(2),
            CellKind::Subsection => Some(3),
            CellKind::Subsubsection => Some(4),
            CellKind::Heading5 => Some(5),
            CellKind::Heading6 => Some(6),
            CellKind::Code | CellKind::Text => None,
        }
    }
}

/// Knobs for one styling pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleOptions {
    /// Pixel width lines are wrapped at; 0 disables wrapping
    pub wrap_width: f32,
    /// Wrap prose cells
    pub auto_wrap: bool,
    /// Wrap code cells
    pub auto_wrap_code: bool,
    /// Show only the first line followed by a hidden-lines note
    pub first_line_only: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            wrap_width: 600.0,
            auto_wrap: true,
            auto_wrap_code: true,
            first_line_only: false,
        }
    }
}

/// Output of a styling pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyledText {
    pub runs: Vec<DisplayRun>,
    /// Buffer offsets of spaces drawn as line breaks
    pub soft_breaks: BTreeSet<usize>,
    /// Tokens of the whole text (code cells)
    #[serde(skip)]
    pub tokens: Vec<Token>,
    /// Sorted, unique variable and function names, for autocompletion
    pub word_list: Vec<String>,
    /// Whether a metrics provider was available
    pub measured: bool,
}

impl StyledText {
    /// Whether the buffer char at `offset` ends a visual line
    pub fn is_break_at(&self, text_char: Option<char>, offset: usize) -> bool {
        text_char == Some('\n') || self.soft_breaks.contains(&offset)
    }
}

/// Width measurement through the cache
pub struct Measure<'a> {
    cache: &'a mut WidthCache,
    metrics: &'a dyn TextMetrics,
}

impl<'a> Measure<'a> {
    pub fn new(cache: &'a mut WidthCache, metrics: &'a dyn TextMetrics) -> Self {
        Self { cache, metrics }
    }

    pub fn width(&mut self, style: TextStyle, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.cache.measure(self.metrics, style, text).width
    }
}

/// Runs the styling policies and owns the width cache.
#[derive(Debug, Default)]
pub struct Styler {
    cache: WidthCache,
    warned: bool,
}

impl Styler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &WidthCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut WidthCache {
        &mut self.cache
    }

    /// Style `text` for a cell of `kind`.
    ///
    /// Without a metrics provider nothing is measured or wrapped: the text is
    /// split into unstyled hard lines, tokens are still produced for code.
    pub fn style(
        &mut self,
        kind: CellKind,
        text: &str,
        tokenizer: &dyn Tokenizer,
        metrics: Option<&dyn TextMetrics>,
        options: &StyleOptions,
    ) -> StyledText {
        let tokens = if kind.is_code() {
            tokenizer.tokenize(text)
        } else {
            Vec::new()
        };
        let word_list = code::word_list(&tokens);

        let Some(metrics) = metrics else {
            if self.warned {
                tracing::debug!("no text metrics bound, styling skipped");
            } else {
                tracing::warn!("no text metrics bound, styling skipped");
                self.warned = true;
            }
            return StyledText {
                runs: unstyled_runs(text),
                tokens,
                word_list,
                ..StyledText::default()
            };
        };

        let (visible, hidden_lines) = if options.first_line_only {
            match text.split_once('\n') {
                Some((first, _)) => (first, text.matches('\n').count()),
                None => (text, 0),
            }
        } else {
            (text, 0)
        };

        let mut measure = Measure::new(&mut self.cache, metrics);
        let wrap = |enabled: bool| (enabled && options.wrap_width > 0.0).then_some(options.wrap_width);

        let mut styled = if kind.is_code() {
            let layout = if hidden_lines > 0 {
                let first = code::first_line_tokens(&tokens);
                code::style_code(visible, &first, &mut measure, wrap(options.auto_wrap_code))
            } else {
                code::style_code(text, &tokens, &mut measure, wrap(options.auto_wrap_code))
            };
            StyledText {
                runs: layout.runs,
                soft_breaks: layout.soft_breaks,
                tokens,
                word_list,
                measured: true,
            }
        } else {
            let layout = prose::style_prose(
                visible,
                kind.text_style(),
                &mut measure,
                wrap(options.auto_wrap),
            );
            StyledText {
                runs: layout.runs,
                soft_breaks: layout.soft_breaks,
                tokens,
                word_list,
                measured: true,
            }
        };

        if hidden_lines > 0 {
            let note = if hidden_lines == 1 {
                " ... + 1 hidden line".to_string()
            } else {
                format!(" ... + {hidden_lines} hidden lines")
            };
            let at = visible.chars().count();
            let style = if kind.is_code() {
                TextStyle::Comment
            } else {
                kind.text_style()
            };
            styled.runs.push(DisplayRun::annotation(note, style, at));
        }

        for run in &mut styled.runs {
            run.width(&mut self.cache, metrics);
        }

        styled
    }
}

/// Hard-line split with no styling, used when nothing can be measured
fn unstyled_runs(text: &str) -> Vec<DisplayRun> {
    let mut runs = Vec::new();
    let mut offset = 0;
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        let len = line.chars().count();
        if len > 0 {
            runs.push(DisplayRun::text(line, None, offset));
        }
        offset += len;
        if lines.peek().is_some() {
            runs.push(DisplayRun::hard_break(offset));
            offset += 1;
        }
    }
    runs
}
