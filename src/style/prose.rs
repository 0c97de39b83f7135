//! Prose styling: greedy word wrap with list and quote indentation.

use super::run::DisplayRun;
use super::token::TextStyle;
use super::Measure;
use std::collections::BTreeSet;

/// Markers that start an indented block when they open a line
const INDENT_MARKERS: &[&str] = &["* ", "\u{2022} ", "\u{00B7} ", "> "];

/// An open list item or quote
#[derive(Debug, Clone)]
struct IndentContext {
    /// Lines continuing this block start with this
    prefix: String,
    /// Pixel indent of wrapped continuation lines
    indent: f32,
    /// Redrawn at the start of continuation lines (quotes only)
    glyph: Option<String>,
}

/// Result of one prose styling pass
#[derive(Debug, Default)]
pub(super) struct ProseLayout {
    pub runs: Vec<DisplayRun>,
    pub soft_breaks: BTreeSet<usize>,
}

/// Wrap prose at `wrap_width`, or just split it into hard lines when None.
pub(super) fn style_prose(
    text: &str,
    style: TextStyle,
    measure: &mut Measure<'_>,
    wrap_width: Option<f32>,
) -> ProseLayout {
    let mut layout = ProseLayout::default();
    let mut contexts: Vec<IndentContext> = Vec::new();
    let mut line_start = 0;

    let lines: Vec<&str> = text.split('\n').collect();
    let count = lines.len();
    for (n, line) in lines.into_iter().enumerate() {
        let chars: Vec<char> = line.chars().collect();

        match wrap_width {
            Some(wrap) => {
                let display = open_or_continue(line, &chars, &mut contexts, style, measure);
                wrap_line(&chars, &display, line_start, style, wrap, &contexts, measure, &mut layout);
            }
            None => {
                if !chars.is_empty() {
                    layout
                        .runs
                        .push(DisplayRun::text(line, Some(style), line_start));
                }
            }
        }

        line_start += chars.len();
        if n + 1 < count {
            layout.runs.push(DisplayRun::hard_break(line_start));
            line_start += 1;
        }
    }

    layout
}

/// Update the context stack for a new hard line and return the chars to
/// display for it (list markers drawn as bullets).
fn open_or_continue(
    line: &str,
    chars: &[char],
    contexts: &mut Vec<IndentContext>,
    style: TextStyle,
    measure: &mut Measure<'_>,
) -> Vec<char> {
    let trimmed = line.trim_start();
    let leading = chars.len() - trimmed.chars().count();
    let mut display = chars.to_vec();

    if let Some(marker) = INDENT_MARKERS.iter().find(|m| trimmed.starts_with(**m)) {
        let marker_prefix: String = chars[..leading + 2].iter().collect();
        let indent = measure.width(style, &marker_prefix);
        let glyph = marker.starts_with('>').then(|| marker_prefix.clone());
        if matches!(display[leading], '*' | '\u{00B7}') {
            display[leading] = '\u{2022}';
        }
        contexts.push(IndentContext {
            prefix: format!("  {}", &line[..line.len() - trimmed.len()]),
            indent,
            glyph,
        });
    } else {
        while let Some(ctx) = contexts.last() {
            if line.starts_with(&ctx.prefix) {
                break;
            }
            contexts.pop();
        }
    }

    display
}

/// Break one hard line greedily at spaces.
#[allow(clippy::too_many_arguments)]
fn wrap_line(
    chars: &[char],
    display: &[char],
    line_start: usize,
    style: TextStyle,
    wrap: f32,
    contexts: &[IndentContext],
    measure: &mut Measure<'_>,
    layout: &mut ProseLayout,
) {
    let (ctx_indent, glyph) = contexts
        .last()
        .map_or((0.0, None), |c| (c.indent, c.glyph.clone()));

    let mut seg_start = 0;
    let mut last_space: Option<usize> = None;
    let mut continuation = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == ' ' || i + 1 == chars.len() {
            // a trailing space may hang past the margin
            let end = if ch == ' ' { i } else { i + 1 };
            let segment: String = chars[seg_start..end].iter().collect();
            let width = measure.width(style, &segment);
            let indent = if continuation { ctx_indent } else { 0.0 };

            if width + indent >= wrap {
                let break_at = match last_space {
                    Some(sp) => Some(sp),
                    None if ch == ' ' => Some(i),
                    None => None,
                };
                if let Some(at) = break_at {
                    push_segment(layout, display, seg_start, at, line_start, style);
                    layout.runs.push(DisplayRun::soft_break(
                        line_start + at,
                        ctx_indent,
                        glyph.clone(),
                    ));
                    layout.soft_breaks.insert(line_start + at);
                    seg_start = at + 1;
                    last_space = None;
                    continuation = true;
                    i = at + 1;
                    continue;
                }
            }
        }
        if ch == ' ' {
            last_space = Some(i);
        }
        i += 1;
    }

    push_segment(layout, display, seg_start, chars.len(), line_start, style);
}

fn push_segment(
    layout: &mut ProseLayout,
    display: &[char],
    from: usize,
    to: usize,
    line_start: usize,
    style: TextStyle,
) {
    if from < to {
        let text: String = display[from..to].iter().collect();
        layout
            .runs
            .push(DisplayRun::text(text, Some(style), line_start + from));
    }
}
