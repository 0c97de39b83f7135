//! Utility modules

pub mod text;

pub use text::{is_symbol_char, is_word_char};
