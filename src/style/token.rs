//! Style tags, tokens and the tokenizer seam.
//!
//! The styler only needs *some* total, deterministic tokenizer. `CasTokenizer`
//! is a small lexer for a Maxima-like language; hosts with a real grammar
//! plug in their own [`Tokenizer`].

use crate::util::text::{is_word_char, NBSP};
use serde::Serialize;

/// Style tag of a token or display run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    #[default]
    Default,
    Variable,
    Function,
    Comment,
    Number,
    String,
    Operator,
    Lisp,
    EndOfLine,
    Text,
    Title,
    Section,
    Subsection,
    Subsubsection,
    Heading5,
    Heading6,
}

impl TextStyle {
    /// CSS class used by the HTML export, None for unstyled text
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            TextStyle::Comment => Some("code_comment"),
            TextStyle::Variable => Some("code_variable"),
            TextStyle::Function => Some("code_function"),
            TextStyle::Number => Some("code_number"),
            TextStyle::String => Some("code_string"),
            TextStyle::Operator => Some("code_operator"),
            TextStyle::Lisp => Some("code_lisp"),
            TextStyle::EndOfLine => Some("code_endofline"),
            _ => None,
        }
    }

    /// Whether this is one of the syntax-highlighting styles
    pub fn is_code(self) -> bool {
        matches!(
            self,
            TextStyle::Default
                | TextStyle::Variable
                | TextStyle::Function
                | TextStyle::Comment
                | TextStyle::Number
                | TextStyle::String
                | TextStyle::Operator
                | TextStyle::Lisp
                | TextStyle::EndOfLine
        )
    }

    /// Colour slot used by the RTF export's colour table
    pub fn color_index(self) -> u8 {
        match self {
            TextStyle::Default => 1,
            TextStyle::Variable => 2,
            TextStyle::Function => 3,
            TextStyle::Comment => 4,
            TextStyle::Number => 5,
            TextStyle::String => 6,
            TextStyle::Operator => 7,
            TextStyle::Lisp => 8,
            TextStyle::EndOfLine => 9,
            _ => 0,
        }
    }
}

/// One lexical token: its text and style tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub style: TextStyle,
}

impl Token {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the token is nothing but spaces or line breaks
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(|c| c.is_whitespace() || c == NBSP)
    }
}

/// Splits text into styled tokens.
///
/// Must be total and deterministic: the concatenated token texts equal the
/// input for every input.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Words the CAS treats as operators
const KEYWORDS: &[&str] = &[
    "if", "then", "else", "elseif", "do", "for", "from", "while", "unless", "thru", "step",
    "in", "next", "and", "or", "not",
];

/// Multi-char operators, longest first
const OPERATORS: &[&str] = &["::=", ":=", "::", "<=", ">=", "#", "**", "^^"];

/// Tokenizer for a Maxima-like language
#[derive(Debug, Clone, Copy, Default)]
pub struct CasTokenizer;

impl CasTokenizer {
    pub fn new() -> Self {
        Self
    }
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | NBSP)
}

fn starts_with_at(chars: &[char], at: usize, pat: &str) -> bool {
    let mut i = at;
    for p in pat.chars() {
        if chars.get(i) != Some(&p) {
            return false;
        }
        i += 1;
    }
    true
}

impl Tokenizer for CasTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < n {
            let start = i;
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            let style = if c == '\n' {
                i += 1;
                TextStyle::Default
            } else if is_blank(c) {
                while i < n && is_blank(chars[i]) {
                    i += 1;
                }
                TextStyle::Default
            } else if c == '/' && next == Some('*') {
                i += 2;
                while i < n && !starts_with_at(&chars, i, "*/") {
                    i += 1;
                }
                i = (i + 2).min(n);
                TextStyle::Comment
            } else if c == '"' {
                i += 1;
                while i < n {
                    match chars[i] {
                        '\\' => i += 2,
                        '"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                i = i.min(n);
                TextStyle::String
            } else if starts_with_at(&chars, i, ":lisp")
                && chars.get(i + 5).is_none_or(|&ch| !is_word_char(ch))
            {
                while i < n && chars[i] != '\n' {
                    i += 1;
                }
                TextStyle::Lisp
            } else if c.is_ascii_digit() || (c == '.' && next.is_some_and(|d| d.is_ascii_digit()))
            {
                i = scan_number(&chars, i);
                TextStyle::Number
            } else if c.is_alphabetic() || c == '_' || c == '%' || c == '\\' {
                while i < n {
                    let ch = chars[i];
                    if ch == '\\' {
                        i = (i + 2).min(n);
                    } else if is_word_char(ch) || ch == '%' {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let word: String = chars[start..i].iter().collect();
                if KEYWORDS.contains(&word.as_str()) {
                    TextStyle::Operator
                } else {
                    let mut j = i;
                    while j < n && is_blank(chars[j]) {
                        j += 1;
                    }
                    if chars.get(j) == Some(&'(') {
                        TextStyle::Function
                    } else {
                        TextStyle::Variable
                    }
                }
            } else if c == ';' || c == '$' {
                i += 1;
                TextStyle::EndOfLine
            } else {
                let op_len = OPERATORS
                    .iter()
                    .find(|op| starts_with_at(&chars, i, op))
                    .map_or(1, |op| op.chars().count());
                i += op_len;
                TextStyle::Operator
            };

            tokens.push(Token::new(
                chars[start..i].iter().collect::<String>(),
                style,
            ));
        }

        tokens
    }
}

/// End of a number literal starting at `i`: digits, fraction, exponent.
fn scan_number(chars: &[char], mut i: usize) -> usize {
    let n = chars.len();
    while i < n && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < n && chars[i] == '.' {
        i += 1;
        while i < n && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < n && matches!(chars[i], 'e' | 'E' | 'b' | 'B' | 'd' | 'D') {
        let mut j = i + 1;
        if j < n && matches!(chars[j], '+' | '-') {
            j += 1;
        }
        if j < n && chars[j].is_ascii_digit() {
            i = j;
            while i < n && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(text: &str) -> Vec<(String, TextStyle)> {
        CasTokenizer
            .tokenize(text)
            .into_iter()
            .map(|t| (t.text, t.style))
            .collect()
    }

    #[test]
    fn test_tokens_reconstruct_input() {
        let inputs = [
            "f(x):=x^2;",
            "/* open comment",
            "\"unterminated \\\" string",
            "a\\-b + 1.5e-3$\n  :lisp (print 1)\nc",
            "",
            "ü∂x ·",
        ];
        for input in inputs {
            let joined: String = CasTokenizer.tokenize(input).into_iter().map(|t| t.text).collect();
            assert_eq!(joined, input);
        }
    }

    #[test]
    fn test_function_and_variable() {
        let tokens = styles("f (x)+y");
        assert_eq!(tokens[0], ("f".to_string(), TextStyle::Function));
        assert_eq!(tokens[1], (" ".to_string(), TextStyle::Default));
        assert_eq!(tokens[2], ("(".to_string(), TextStyle::Operator));
        assert_eq!(tokens[3], ("x".to_string(), TextStyle::Variable));
        assert_eq!(tokens[6], ("y".to_string(), TextStyle::Variable));
    }

    #[test]
    fn test_keywords_are_operators() {
        let tokens = styles("for i do");
        assert_eq!(tokens[0].1, TextStyle::Operator);
        assert_eq!(tokens[2].1, TextStyle::Variable);
        assert_eq!(tokens[4], ("do".to_string(), TextStyle::Operator));
    }

    #[test]
    fn test_comment_string_number() {
        let tokens = styles("/* c */\"s\"12.5e3");
        assert_eq!(tokens[0], ("/* c */".to_string(), TextStyle::Comment));
        assert_eq!(tokens[1], ("\"s\"".to_string(), TextStyle::String));
        assert_eq!(tokens[2], ("12.5e3".to_string(), TextStyle::Number));
    }

    #[test]
    fn test_end_of_line_and_lisp() {
        let tokens = styles("a;b$\n:lisp (+ 1 2)");
        assert_eq!(tokens[1].1, TextStyle::EndOfLine);
        assert_eq!(tokens[3].1, TextStyle::EndOfLine);
        assert_eq!(tokens[4].0, "\n");
        assert_eq!(tokens[5], (":lisp (+ 1 2)".to_string(), TextStyle::Lisp));
    }

    #[test]
    fn test_multi_char_operators() {
        let tokens = styles("a:=b");
        assert_eq!(tokens[1], (":=".to_string(), TextStyle::Operator));
    }

    #[test]
    fn test_newlines_are_single_tokens() {
        let tokens = styles("a\n\nb");
        assert_eq!(tokens[1].0, "\n");
        assert_eq!(tokens[2].0, "\n");
    }

    #[test]
    fn test_css_class() {
        assert_eq!(TextStyle::Comment.css_class(), Some("code_comment"));
        assert_eq!(TextStyle::Default.css_class(), None);
    }
}
