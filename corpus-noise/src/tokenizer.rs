//! Rule-based tokenizer with joiner tracking
//!
//! Tokenization keeps track of where whitespace was: every token that was glued
//! to its predecessor in the raw text carries `join_left`, so detokenization can
//! restore the original spacing. Placeholders (`｟…｠`) are always isolated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::token::Token;

/// Marker used in the serialized token form to show a joined token
pub const JOINER: &str = "￭";

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"｟[^｠]*｠").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizationMode {
    /// Split punctuation but keep hyphenated words and decimal numbers together
    #[default]
    Conservative,
    /// Split every punctuation mark and every letter/digit boundary
    Aggressive,
    /// Split on whitespace only
    Space,
}

impl TokenizationMode {
    pub const NAMES: &'static [&'static str] = &["conservative", "aggressive", "space"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Tokenizer {
    pub mode: TokenizationMode,
    pub joiner_annotate: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            mode: TokenizationMode::Conservative,
            joiner_annotate: true,
        }
    }
}

impl Tokenizer {
    pub fn new(mode: TokenizationMode) -> Self {
        Tokenizer {
            mode,
            ..Default::default()
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        for chunk in text.split_whitespace() {
            let mut glued = false;
            let mut push = |surface: &str, tokens: &mut Vec<Token>| {
                tokens.push(Token::new(surface).joined(glued));
                glued = true;
            };

            let mut last = 0;
            for placeholder in PLACEHOLDER_RE.find_iter(chunk) {
                for piece in self.split_word(&chunk[last..placeholder.start()]) {
                    push(&piece, &mut tokens);
                }
                push(placeholder.as_str(), &mut tokens);
                last = placeholder.end();
            }
            for piece in self.split_word(&chunk[last..]) {
                push(&piece, &mut tokens);
            }
        }
        tokens
    }

    fn split_word(&self, word: &str) -> Vec<String> {
        if word.is_empty() {
            return Vec::new();
        }
        if self.mode == TokenizationMode::Space {
            return vec![word.to_string()];
        }

        let chars: Vec<char> = word.chars().collect();
        let mut pieces = Vec::new();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if c.is_alphanumeric() {
                if self.mode == TokenizationMode::Aggressive {
                    if let Some(prev) = current.chars().last() {
                        if prev.is_alphabetic() != c.is_alphabetic() {
                            pieces.push(std::mem::take(&mut current));
                        }
                    }
                }
                current.push(c);
            } else if self.mode == TokenizationMode::Conservative && kept_inside_word(&chars, i) {
                current.push(c);
            } else {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
                pieces.push(c.to_string());
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }

    /// Rebuild plain text: a space goes before every token except the first
    /// and the joined ones.
    pub fn detokenize(&self, tokens: &[Token]) -> String {
        let mut text = String::new();
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 && !token.join_left() {
                text.push(' ');
            }
            text.push_str(token.surface());
        }
        text
    }

    /// Token strings, with the joiner marker on joined tokens when
    /// `joiner_annotate` is enabled
    pub fn serialize(&self, tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if self.joiner_annotate && i > 0 && token.join_left() {
                    format!("{}{}", JOINER, token.surface())
                } else {
                    token.surface().to_string()
                }
            })
            .collect()
    }
}

/// Hyphen between letters, or a decimal/thousands separator between digits
fn kept_inside_word(chars: &[char], i: usize) -> bool {
    if i == 0 || i + 1 >= chars.len() {
        return false;
    }
    let (prev, c, next) = (chars[i - 1], chars[i], chars[i + 1]);
    match c {
        '-' => prev.is_alphabetic() && next.is_alphabetic(),
        '.' | ',' => prev.is_numeric() && next.is_numeric(),
        _ => false,
    }
}
