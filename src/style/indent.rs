//! Indentation depth of a position in code.

use crate::util::text::{is_close_bracket, is_open_bracket, is_word_char, INDENT_UNIT};

/// Number of spaces a line starting at `pos` should be indented by.
///
/// Scans `text[..pos]` keeping a stack of indent amounts, one per nesting
/// level: brackets push and pop a level, a comma drops the extra indent a
/// `do`/`if` added to the current level, and `;`/`$` start over at zero.
/// String contents and backslash-escaped chars are skipped. A closing
/// bracket at `pos` is outdented to its opener's level, and a following
/// `else`/`then` by one unit.
pub fn indent_depth(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let pos = pos.min(chars.len());
    let mut levels: Vec<usize> = vec![0];

    let mut i = 0;
    while i < pos {
        let ch = chars[i];
        match ch {
            '\\' => {
                i += 2;
                continue;
            }
            '"' => {
                i += 1;
                while i < pos && chars[i] != '"' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
                continue;
            }
            c if is_open_bracket(c) => {
                let top = levels.last().map_or(INDENT_UNIT, |l| l + INDENT_UNIT);
                levels.push(top);
            }
            c if is_close_bracket(c) => {
                levels.pop();
            }
            ',' => {
                if levels.pop().is_some() {
                    let top = levels.last().map_or(0, |l| l + INDENT_UNIT);
                    levels.push(top);
                }
            }
            ';' | '$' => {
                levels.clear();
                levels.push(0);
            }
            _ => {}
        }

        let at_word_start = i == 0 || !is_word_char(chars[i - 1]);
        if at_word_start && (keyword_at(&chars, i, "do") || keyword_at(&chars, i, "if")) {
            match levels.last_mut() {
                Some(top) => *top += INDENT_UNIT,
                None => levels.push(INDENT_UNIT),
            }
        }

        i += 1;
    }

    if chars.get(pos).copied().is_some_and(is_close_bracket) {
        levels.pop();
    }

    let depth = levels.last().copied().unwrap_or(0);

    let rest: String = chars[pos..].iter().take(8).collect();
    let rest = rest.trim_start_matches(' ');
    let rest: Vec<char> = rest.chars().collect();
    if keyword_at(&rest, 0, "else") || keyword_at(&rest, 0, "then") {
        return depth.saturating_sub(INDENT_UNIT);
    }

    depth
}

/// Whether `word` starts at `at` and is not followed by a word char.
fn keyword_at(chars: &[char], at: usize, word: &str) -> bool {
    let mut i = at;
    for w in word.chars() {
        if chars.get(i) != Some(&w) {
            return false;
        }
        i += 1;
    }
    chars.get(i).is_none_or(|&c| !is_word_char(c))
}
