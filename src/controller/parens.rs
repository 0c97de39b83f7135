//! Bracket and quote matching over the token stream.
//!
//! Brackets inside strings and comments belong to those tokens and are never
//! matched. Only the first char of a token is looked at.

use crate::style::token::{TextStyle, Token};
use crate::util::text::{is_close_bracket, is_open_bracket};

/// Partner positions `(open, close)` for the bracket or quote at `cursor`.
///
/// `at_cursor` is the char at `cursor`; None when the caret is at the end.
pub fn find_matching_parens(
    tokens: &[Token],
    at_cursor: Option<char>,
    cursor: usize,
) -> Option<(usize, usize)> {
    let ch = at_cursor?;
    let starts = token_starts(tokens);

    if ch == '"' {
        return matching_quotes(tokens, &starts, cursor);
    }

    // the caret must sit on a token of its own, not inside a string or comment
    let here = starts.iter().position(|&start| start == cursor)?;
    let token = &tokens[here];
    if matches!(token.style, TextStyle::String | TextStyle::Comment)
        || token.text.chars().next() != Some(ch)
    {
        return None;
    }

    if is_open_bracket(ch) {
        let mut depth = 0isize;
        for (token, &start) in tokens[here..].iter().zip(&starts[here..]) {
            match bracket_of(token) {
                Some(c) if is_open_bracket(c) => depth += 1,
                Some(c) if is_close_bracket(c) => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((cursor, start));
                    }
                }
                _ => {}
            }
        }
        return None;
    }

    if is_close_bracket(ch) {
        let mut depth = 0isize;
        for (token, &start) in tokens[..=here].iter().zip(&starts[..=here]).rev() {
            match bracket_of(token) {
                Some(c) if is_close_bracket(c) => depth += 1,
                Some(c) if is_open_bracket(c) => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((start, cursor));
                    }
                }
                _ => {}
            }
        }
    }

    None
}

/// Leading char of a token that can take part in bracket nesting
fn bracket_of(token: &Token) -> Option<char> {
    match token.style {
        TextStyle::String | TextStyle::Comment => None,
        _ => token.text.chars().next(),
    }
}

/// A closed string token with the caret on either of its quotes
fn matching_quotes(tokens: &[Token], starts: &[usize], cursor: usize) -> Option<(usize, usize)> {
    for (token, &start) in tokens.iter().zip(starts) {
        if start > cursor {
            break;
        }
        let len = token.len();
        let closed = token.style == TextStyle::String
            && len >= 2
            && token.text.starts_with('"')
            && token.text.ends_with('"');
        if closed {
            let end = start + len - 1;
            if cursor == start || cursor == end {
                return Some((start, end));
            }
        }
    }
    None
}

fn token_starts(tokens: &[Token]) -> Vec<usize> {
    let mut pos = 0;
    tokens
        .iter()
        .map(|t| {
            let start = pos;
            pos += t.len();
            start
        })
        .collect()
}
