//! Code styling: tokens to runs, greedy soft-wrap at the last space.

use super::indent::indent_depth;
use super::run::DisplayRun;
use super::token::{TextStyle, Token};
use super::Measure;
use std::collections::BTreeSet;

/// Result of one code styling pass
#[derive(Debug, Default)]
pub(super) struct CodeLayout {
    pub runs: Vec<DisplayRun>,
    pub soft_breaks: BTreeSet<usize>,
}

/// Sorted, unique variable and function names among `tokens`
pub(super) fn word_list(tokens: &[Token]) -> Vec<String> {
    let mut words: Vec<String> = tokens
        .iter()
        .filter(|t| matches!(t.style, TextStyle::Variable | TextStyle::Function))
        .map(|t| t.text.clone())
        .collect();
    words.sort();
    words.dedup();
    words
}

/// Turn `tokens` (covering `text`) into display runs.
///
/// Every non-space token adds its width to the current line; once the line
/// plus its indentation reaches `wrap_width`, the last unconsumed space run
/// becomes a soft break indented to the code's nesting depth at that space.
/// `wrap_width` of None disables wrapping.
pub(super) fn style_code(
    text: &str,
    tokens: &[Token],
    measure: &mut Measure<'_>,
    wrap_width: Option<f32>,
) -> CodeLayout {
    let mut layout = CodeLayout::default();
    let mut offset = 0;

    let mut candidate: Option<usize> = None;
    let mut line_width = 0.0_f32;
    let mut indentation = 0.0_f32;

    for token in tokens {
        let len = token.len();
        if len == 0 {
            continue;
        }

        if token.text.chars().all(|c| c == ' ') {
            // All but the last space share one run; the last one may break.
            if len > 1 {
                layout
                    .runs
                    .push(DisplayRun::text(" ".repeat(len - 1), None, offset));
            }
            layout.runs.push(DisplayRun::text(" ", None, offset + len - 1));
            candidate = Some(layout.runs.len() - 1);
            offset += len;
            continue;
        }

        let style = (token.style != TextStyle::Default).then_some(token.style);
        let mut segment = String::new();
        let mut segment_start = offset;
        for (k, ch) in token.text.chars().enumerate() {
            if ch == '\n' {
                if !segment.is_empty() {
                    layout.runs.push(DisplayRun::text(
                        std::mem::take(&mut segment),
                        style,
                        segment_start,
                    ));
                }
                layout.runs.push(DisplayRun::hard_break(offset + k));
                segment_start = offset + k + 1;
                line_width = 0.0;
                indentation = 0.0;
                candidate = None;
            } else {
                segment.push(ch);
            }
        }
        let tail_width = if segment.is_empty() {
            0.0
        } else {
            let w = measure.width(token.style, &segment);
            layout
                .runs
                .push(DisplayRun::text(segment, style, segment_start));
            w
        };

        if let Some(wrap) = wrap_width {
            line_width += tail_width;
            if line_width + indentation >= wrap {
                if let Some(index) = candidate.take() {
                    let at = layout.runs[index].start;
                    let char_width = measure.width(TextStyle::Default, " ");
                    indentation = char_width * indent_depth(text, at) as f32;
                    line_width = tail_width + indentation;
                    layout.runs[index] = DisplayRun::soft_break(at, indentation, None);
                    layout.soft_breaks.insert(at);
                }
            }
        }

        offset += len;
    }

    layout
}

/// Tokens covering only the first hard line of the text they were made from.
pub(super) fn first_line_tokens(tokens: &[Token]) -> Vec<Token> {
    let mut out = Vec::new();
    for token in tokens {
        match token.text.find('\n') {
            Some(at) => {
                if at > 0 {
                    out.push(Token::new(&token.text[..at], token.style));
                }
                break;
            }
            None => out.push(token.clone()),
        }
    }
    out
}
