//! Token-level passes of the noise engine

use rand::Rng;
use rand::seq::SliceRandom;

use super::character::apply_character_noise;
use super::equivalence::apply_char_equivalence;
use super::{NoiseOperator, fires};
use crate::token::{Token, is_alphabetic};
use crate::unit::{Side, TranslationUnit};

/// Word-level rules. At most one fires per token: the first, in
/// [`WordRule::PRIORITY`] order, whose gate passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordRule {
    Drop,
    Duplicate,
    /// Move the token before the last emitted token
    Swap,
    /// Replace the surface with an alphabetic embedding neighbor
    Substitute,
    /// Glue the token to its predecessor
    DropSpace,
}

impl WordRule {
    pub const PRIORITY: [WordRule; 5] = [
        WordRule::Drop,
        WordRule::Duplicate,
        WordRule::Swap,
        WordRule::Substitute,
        WordRule::DropSpace,
    ];
}

impl NoiseOperator {
    /// Split random source tokens in two at a random character position.
    ///
    /// Splices go through the unit so positions account for earlier splits.
    pub(super) fn apply_space_insertion<R: Rng + ?Sized>(
        &self,
        tu: &mut TranslationUnit,
        rng: &mut R,
    ) {
        let tokens = tu.tokens(Side::Source).to_vec();
        let mut added = 0;
        for (pos, token) in tokens.iter().enumerate() {
            if token.is_placeholder() {
                continue;
            }
            if fires(rng, self.config.insert_space_prob) && token.len() > 1 {
                let split = rng.gen_range(1..token.len());
                let (head, tail) = split_at_char(token.surface(), split);
                let replacement = vec![
                    token.with_surface(head),
                    token.with_surface(tail).joined(false),
                ];
                tu.replace_tokens(Side::Source, pos + added, 1, replacement);
                added += 1;
            }
        }
    }

    /// Apply word-level rules, then character-level rules, to every
    /// non-placeholder token. Returns the new sequence.
    pub(super) fn apply_word_noise<R: Rng + ?Sized>(
        &self,
        tokens: &[Token],
        rng: &mut R,
    ) -> Vec<Token> {
        let mut output: Vec<Token> = Vec::with_capacity(tokens.len());

        for token in tokens {
            if token.is_placeholder() {
                output.push(token.clone());
                continue;
            }

            let token = match self.pick_word_rule(token, output.len(), rng) {
                Some(WordRule::Drop) => continue,
                Some(WordRule::Duplicate) => {
                    output.push(token.clone());
                    output.push(token.clone());
                    continue;
                }
                Some(WordRule::Swap) => {
                    let last = output.len() - 1;
                    output.insert(last, token.clone());
                    continue;
                }
                Some(WordRule::Substitute) => {
                    output.push(self.substitute_word(token, rng));
                    continue;
                }
                Some(WordRule::DropSpace) => token.joined(true),
                None => token.clone(),
            };

            let token = self.corrupt_characters(token, rng);
            if !token.is_empty() {
                output.push(token);
            }
        }
        output
    }

    pub(super) fn pick_word_rule<R: Rng + ?Sized>(
        &self,
        token: &Token,
        emitted: usize,
        rng: &mut R,
    ) -> Option<WordRule> {
        WordRule::PRIORITY
            .into_iter()
            .find(|rule| self.word_gate(*rule, token, emitted, rng))
    }

    fn word_gate<R: Rng + ?Sized>(
        &self,
        rule: WordRule,
        token: &Token,
        emitted: usize,
        rng: &mut R,
    ) -> bool {
        let config = &self.config;
        match rule {
            WordRule::Drop => fires(rng, config.drop_word_prob),
            WordRule::Duplicate => fires(rng, config.duplicate_word_prob),
            WordRule::Swap => emitted > 0 && fires(rng, config.swap_word_prob),
            WordRule::Substitute => {
                self.embedding.is_some()
                    && fires(rng, config.substitute_word_prob())
                    && token.is_alphabetic()
            }
            WordRule::DropSpace => fires(rng, config.drop_space_prob),
        }
    }

    fn substitute_word<R: Rng + ?Sized>(&self, token: &Token, rng: &mut R) -> Token {
        let Some(embedding) = &self.embedding else {
            return token.clone();
        };
        let candidates: Vec<String> = embedding
            .nearest_neighbors(token.surface(), self.config.nearest_neighbors_num())
            .into_iter()
            .map(|(_, word)| word)
            .filter(|word| is_alphabetic(word))
            .collect();
        match candidates.choose(rng) {
            Some(word) => token.with_surface(word.as_str()),
            None => token.clone(),
        }
    }

    fn corrupt_characters<R: Rng + ?Sized>(&self, token: Token, rng: &mut R) -> Token {
        let config = &self.config;
        let mut token = token;
        if config.has_char_noise() {
            token = token.with_surface(apply_character_noise(token.surface(), config, rng));
        }
        if !config.char_equivalence_table.is_empty() && fires(rng, config.char_equivalence_prob) {
            token = token.with_surface(apply_char_equivalence(
                token.surface(),
                &config.char_equivalence_table,
            ));
        }
        token
    }
}

fn split_at_char(surface: &str, index: usize) -> (&str, &str) {
    let byte = surface
        .char_indices()
        .nth(index)
        .map_or(surface.len(), |(byte, _)| byte);
    surface.split_at(byte)
}
