//! Conversions between buffer offsets, visual (line, column) pairs and
//! pixel points.
//!
//! Visual lines end at hard breaks and at soft breaks from the current
//! layout. Every result is clamped into the text; hit-testing outside the
//! text saturates at the nearest position.

use crate::style::metrics::TextMetrics;
use crate::style::run::{DisplayRun, RunKind};
use crate::style::StyledText;
use serde::Serialize;
use std::collections::HashMap;

/// A point in cell-local pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
struct VisualLine {
    start: usize,
    len: usize,
    indent: f32,
}

/// Maps positions for one text and its layout
pub struct CoordinateMapper<'a> {
    runs: &'a [DisplayRun],
    metrics: Option<&'a dyn TextMetrics>,
    lines: Vec<VisualLine>,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(text: &str, styled: &'a StyledText, metrics: Option<&'a dyn TextMetrics>) -> Self {
        let indents: HashMap<usize, f32> = styled
            .runs
            .iter()
            .filter(|r| r.is_soft_break())
            .map(|r| (r.start, r.indent))
            .collect();

        let mut lines = Vec::new();
        let mut start = 0;
        let mut indent = 0.0;
        let mut len = 0;
        for (i, ch) in text.chars().enumerate() {
            len = i + 1;
            if styled.is_break_at(Some(ch), i) {
                lines.push(VisualLine {
                    start,
                    len: i - start,
                    indent,
                });
                start = i + 1;
                indent = indents.get(&i).copied().unwrap_or(0.0);
            }
        }
        lines.push(VisualLine {
            start,
            len: len.max(start) - start,
            indent,
        });

        Self {
            runs: &styled.runs,
            metrics,
            lines,
        }
    }

    /// Number of visual lines (always >= 1)
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total text length in chars
    pub fn text_len(&self) -> usize {
        self.lines.last().map_or(0, |l| l.start + l.len)
    }

    /// Visual (line, column) of a buffer offset
    pub fn position_to_line_column(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.text_len());
        let line = self
            .lines
            .partition_point(|l| l.start <= pos)
            .saturating_sub(1);
        let info = self.lines[line];
        (line, (pos - info.start).min(info.len))
    }

    /// Buffer offset of a visual (line, column); both are clamped
    pub fn line_column_to_position(&self, line: usize, column: usize) -> usize {
        let info = self.lines[line.min(self.lines.len() - 1)];
        info.start + column.min(info.len)
    }

    /// Number of chars on a visual line, excluding its break
    pub fn line_length(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| l.len)
    }

    /// Indentation of a visual line in pixels
    pub fn line_indent(&self, line: usize) -> f32 {
        self.lines.get(line).map_or(0.0, |l| l.indent)
    }

    /// Pixel width of the first `column` chars of `line`, plus its indent.
    pub fn line_width(&self, line: usize, column: usize) -> f32 {
        let Some(info) = self.lines.get(line) else {
            return 0.0;
        };
        let target = info.start + column.min(info.len);
        let mut width = info.indent;
        for run in self.line_runs(*info) {
            if run.start >= target {
                break;
            }
            if run.end() <= target {
                width += self.run_width(run);
            } else {
                let prefix: String = run.text.chars().take(target - run.start).collect();
                width += self.measure(run, &prefix);
            }
        }
        width
    }

    /// Pixel point of the caret drawn before `pos`
    pub fn position_to_point(&self, pos: usize) -> Point {
        let (line, column) = self.position_to_line_column(pos);
        Point {
            x: self.line_width(line, column),
            y: line as f32 * self.line_height(),
        }
    }

    /// Buffer offset under a pixel point.
    ///
    /// The line comes from `y`; within it, the position is the last char
    /// boundary whose prefix width does not exceed `x`.
    pub fn point_to_position(&self, point: Point) -> usize {
        let line_height = self.line_height();
        let line = if point.y <= 0.0 || line_height <= 0.0 {
            0
        } else {
            ((point.y / line_height) as usize).min(self.lines.len() - 1)
        };
        let info = self.lines[line];

        let x = point.x - info.indent;
        if x <= 0.0 {
            return info.start;
        }

        let mut acc = 0.0;
        for run in self.line_runs(info) {
            let w = self.run_width(run);
            if acc + w > x {
                let run_len = run.buffer_len();
                for k in 1..=run_len {
                    let prefix: String = run.text.chars().take(k).collect();
                    if acc + self.measure(run, &prefix) > x {
                        return run.start + k - 1;
                    }
                }
                return run.end();
            }
            acc += w;
        }
        info.start + info.len
    }

    pub fn line_height(&self) -> f32 {
        self.metrics.map_or(0.0, |m| m.line_height())
    }

    /// Text runs lying on a visual line
    fn line_runs(&self, info: VisualLine) -> impl Iterator<Item = &'a DisplayRun> {
        let (start, end) = (info.start, info.start + info.len);
        self.runs.iter().filter(move |r| {
            r.kind == RunKind::Text && r.start >= start && r.end() <= end && r.buffer_len() > 0
        })
    }

    fn run_width(&self, run: &DisplayRun) -> f32 {
        match run.cached_width() {
            Some(w) => w,
            None => self.measure(run, &run.text),
        }
    }

    fn measure(&self, run: &DisplayRun, text: &str) -> f32 {
        self.metrics
            .map_or(0.0, |m| m.measure(run.style.unwrap_or_default(), text).width)
    }
}
