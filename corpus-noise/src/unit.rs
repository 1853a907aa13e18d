//! Translation units
//!
//! A [`TranslationUnit`] is one source/target sentence pair. Each side keeps its
//! raw text and, once tokenized, the tokenizer used and the token sequence.
//! Operators read and rewrite the token sequence; the text is rebuilt on demand
//! with [`TranslationUnit::detok`].
//!
//! `Clone` is a deep copy: tokens are owned values, so a cloned unit shares
//! nothing mutable with the original.

use crate::token::Token;
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Tokenized {
    tokenizer: Tokenizer,
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct SideData {
    text: String,
    tokenized: Option<Tokenized>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    source: SideData,
    target: Option<SideData>,
}

impl TranslationUnit {
    /// Create a unit with only a source sentence
    pub fn new(source: impl Into<String>) -> Self {
        TranslationUnit {
            source: SideData {
                text: source.into(),
                tokenized: None,
            },
            target: None,
        }
    }

    /// Create a unit from a sentence pair
    pub fn with_target(source: impl Into<String>, target: impl Into<String>) -> Self {
        TranslationUnit {
            target: Some(SideData {
                text: target.into(),
                tokenized: None,
            }),
            ..Self::new(source)
        }
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    fn side(&self, side: Side) -> Option<&SideData> {
        match side {
            Side::Source => Some(&self.source),
            Side::Target => self.target.as_ref(),
        }
    }

    fn side_mut(&mut self, side: Side) -> Option<&mut SideData> {
        match side {
            Side::Source => Some(&mut self.source),
            Side::Target => self.target.as_mut(),
        }
    }

    /// Tokenize a side with `tokenizer`, replacing any previous tokenization.
    /// The current detokenized text is used, so earlier rewrites are kept.
    pub fn tokenize(&mut self, side: Side, tokenizer: Tokenizer) {
        let text = match self.detok(side) {
            Some(text) => text,
            None => return,
        };
        if let Some(data) = self.side_mut(side) {
            data.tokens_from(tokenizer, &text);
        }
    }

    /// Tokenize a side with the default tokenizer if it is not tokenized yet
    pub fn ensure_tokenized(&mut self, side: Side) {
        if let Some(data) = self.side_mut(side) {
            if data.tokenized.is_none() {
                let text = data.text.clone();
                data.tokens_from(Tokenizer::default(), &text);
            }
        }
    }

    pub fn tokenizer(&self, side: Side) -> Option<Tokenizer> {
        self.side(side)
            .and_then(|data| data.tokenized.as_ref())
            .map(|tokenized| tokenized.tokenizer)
    }

    /// Token sequence of a side, empty when the side is not tokenized
    pub fn tokens(&self, side: Side) -> &[Token] {
        self.side(side)
            .and_then(|data| data.tokenized.as_ref())
            .map(|tokenized| tokenized.tokens.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the whole token sequence of a side.
    ///
    /// Nothing precedes the first token, so its `join_left` flag is cleared.
    pub fn set_tokens(&mut self, side: Side, tokens: Vec<Token>) {
        if let Some(data) = self.side_mut(side) {
            let tokenizer = data
                .tokenized
                .as_ref()
                .map(|tokenized| tokenized.tokenizer)
                .unwrap_or_default();
            data.tokenized = Some(Tokenized {
                tokenizer,
                tokens: leading_unjoined(tokens),
            });
        }
    }

    /// Replace `len` tokens starting at `start` with `replacement`.
    ///
    /// `len == 0` inserts. The range is clamped to the sequence length.
    pub fn replace_tokens(&mut self, side: Side, start: usize, len: usize, replacement: Vec<Token>) {
        let mut tokens = self.tokens(side).to_vec();
        let start = start.min(tokens.len());
        let end = (start + len).min(tokens.len());
        tokens.splice(start..end, replacement);
        self.set_tokens(side, tokens);
    }

    /// Plain text of a side: detokenized tokens when tokenized, raw text otherwise.
    /// `None` only for a missing target.
    pub fn detok(&self, side: Side) -> Option<String> {
        self.side(side).map(|data| match &data.tokenized {
            Some(tokenized) => tokenized.tokenizer.detokenize(&tokenized.tokens),
            None => data.text.clone(),
        })
    }

    pub fn src_detok(&self) -> String {
        self.detok(Side::Source).unwrap_or_default()
    }

    pub fn tgt_detok(&self) -> Option<String> {
        self.detok(Side::Target)
    }
}

impl SideData {
    fn tokens_from(&mut self, tokenizer: Tokenizer, text: &str) {
        self.tokenized = Some(Tokenized {
            tokenizer,
            tokens: tokenizer.tokenize(text),
        });
    }
}

pub(crate) fn leading_unjoined(mut tokens: Vec<Token>) -> Vec<Token> {
    if let Some(first) = tokens.first_mut() {
        if first.join_left() {
            *first = first.joined(false);
        }
    }
    tokens
}
