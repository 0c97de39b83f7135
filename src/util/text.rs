//! Character classification and text normalisation helpers

/// Width of one indentation unit, in spaces
pub const INDENT_UNIT: usize = 4;

/// Tab stops are placed every this many columns when pasting text
pub const TABULATOR_WIDTH: usize = 4;

/// The non-breaking space inserted by Shift+Space
pub const NBSP: char = '\u{00A0}';

/// Check if a character can be part of an identifier or number: letters
/// and digits of any script plus the underscore.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Characters that may appear inside a word selected by double-click or
/// looked up for help: identifiers plus the CAS sigils `%` and `?`.
pub fn is_symbol_char(ch: char) -> bool {
    is_word_char(ch) || ch == '%' || ch == '?'
}

/// Check if a character is an opening bracket
pub fn is_open_bracket(ch: char) -> bool {
    matches!(ch, '(' | '[' | '{')
}

/// Check if a character is a closing bracket
pub fn is_close_bracket(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}')
}

/// The closing partner of an opening bracket or quote
pub fn closing_partner(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        _ => None,
    }
}

/// Replace the Unicode line and paragraph separators with `\n`.
pub fn normalize_line_separators(text: &str) -> String {
    text.replace(['\u{2028}', '\u{2029}'], "\n")
}

/// Expand tabs to spaces, with tab stops every [`TABULATOR_WIDTH`] columns.
///
/// `column` is the column the text will be inserted at, so the first line's
/// tab stops line up with the text already in front of the caret. `\r\n` is
/// folded to `\n` on the way.
pub fn tab_expand(input: &str, column: usize) -> String {
    let input = input.replace("\r\n", "\n");
    let mut out = String::with_capacity(input.len());
    let mut col = column;

    for ch in input.chars() {
        match ch {
            '\n' => {
                out.push('\n');
                col = 0;
            }
            '\t' => {
                let n = TABULATOR_WIDTH - (col % TABULATOR_WIDTH);
                out.extend(std::iter::repeat_n(' ', n));
                col += n;
            }
            _ => {
                out.push(ch);
                col += 1;
            }
        }
    }

    out
}

/// Lowercase a char without changing the char count of the text it is in.
pub fn fold_case(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(c), None) => c,
        _ => ch,
    }
}
