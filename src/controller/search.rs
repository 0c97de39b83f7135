//! Plain and regex search over a cell's text, in char offsets.
//!
//! Searches never wrap around: running off either end of the text is
//! reported as no match so the caller can move on to another cell.

use regex::Regex;
use std::ops::Range;

use crate::util::text::fold_case;

/// Which way a search runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchDirection {
    #[default]
    Down,
    Up,
}

/// Compile a user-supplied pattern. A malformed pattern matches nothing.
pub fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!("ignoring malformed search pattern {pattern:?}: {e}");
            None
        }
    }
}

/// Text as searched: soft-break chars read as spaces, optionally lowercased
pub fn searchable(text: &str, ignore_case: bool) -> Vec<char> {
    text.chars()
        .map(|ch| if ch == '\r' { ' ' } else { ch })
        .map(|ch| if ignore_case { fold_case(ch) } else { ch })
        .collect()
}

/// Start of a match of `needle` in `hay`.
///
/// Down finds the first match starting at or after `bound`; up finds the
/// last match ending at or before `bound`.
pub fn find_plain(
    hay: &[char],
    needle: &[char],
    bound: usize,
    direction: SearchDirection,
) -> Option<usize> {
    let n = needle.len();
    if n == 0 || n > hay.len() {
        return None;
    }
    let last_start = hay.len() - n;
    let hit = |i: &usize| hay[*i..*i + n] == *needle;
    match direction {
        SearchDirection::Down => (bound..=last_start).find(hit),
        SearchDirection::Up => {
            let top = bound.checked_sub(n)?.min(last_start);
            (0..=top).rev().find(hit)
        }
    }
}

/// Replace every non-overlapping occurrence of `old`, left to right.
/// Returns the new text and the number of replacements.
pub fn replace_plain(text: &str, old: &str, new: &str, ignore_case: bool) -> (String, usize) {
    let source: Vec<char> = searchable(text, false);
    let hay = searchable(text, ignore_case);
    let needle = searchable(old, ignore_case);
    if needle.is_empty() {
        return (source.into_iter().collect(), 0);
    }

    let mut out = String::with_capacity(text.len());
    let mut count = 0;
    let mut i = 0;
    while i < hay.len() {
        if hay[i..].starts_with(&needle) {
            out.push_str(new);
            i += needle.len();
            count += 1;
        } else {
            out.push(source[i]);
            i += 1;
        }
    }
    (out, count)
}

/// Byte index of a char offset (clamped to the end)
pub fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Char offset of a byte index on a char boundary
pub fn byte_to_char(text: &str, byte: usize) -> usize {
    text[..byte.min(text.len())].chars().count()
}

/// Char range of a non-empty regex match.
///
/// Down finds the first match starting at or after `bound`; up finds the
/// last match ending at or before `bound`.
pub fn find_regex(
    re: &Regex,
    text: &str,
    bound: usize,
    direction: SearchDirection,
) -> Option<Range<usize>> {
    let to_chars = |m: regex::Match<'_>| byte_to_char(text, m.start())..byte_to_char(text, m.end());
    let bound_byte = char_to_byte(text, bound);
    match direction {
        SearchDirection::Down => {
            let mut at = bound_byte;
            while at <= text.len() {
                let m = re.find_at(text, at)?;
                if !m.is_empty() {
                    return Some(to_chars(m));
                }
                // step past an empty match
                at = text[m.start()..]
                    .chars()
                    .next()
                    .map_or(text.len() + 1, |c| m.start() + c.len_utf8());
            }
            None
        }
        SearchDirection::Up => re
            .find_iter(text)
            .filter(|m| !m.is_empty() && m.end() <= bound_byte)
            .last()
            .map(to_chars),
    }
}

/// Whether `re` matches exactly the char range `range` of `text`
pub fn regex_matches_exactly(re: &Regex, text: &str, range: &Range<usize>) -> bool {
    let start = char_to_byte(text, range.start);
    let end = char_to_byte(text, range.end);
    re.find_at(text, start)
        .is_some_and(|m| m.start() == start && m.end() == end)
}
