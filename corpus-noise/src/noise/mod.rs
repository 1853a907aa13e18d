//! Noise injection operator
//!
//! Corrupts the source side of training units to make models robust to noisy
//! input, or to augment the corpus with noisy copies. Runs only for training.
//!
//! Per unit, in order:
//!
//! 1. **Space insertion** splits random tokens in two.
//! 2. **Word noise** walks the tokens and applies at most one word rule to
//!    each (drop, duplicate, swap with the previous output token, embedding
//!    substitution, space drop), see [`WordRule`].
//! 3. Tokens not consumed by drop, duplicate, swap or substitution go through
//!    **character noise** (drop, duplicate, swap, QWERTY substitution) and the
//!    **character equivalence** table. Tokens left empty are removed.
//!
//! Placeholders are never touched. When the result differs from the input,
//! `data_augmentation` also emits the untouched unit after the noisy one and
//! `add_marker` prefixes the noisy one with [`NOISY_MARKER`].
//!
//! Every probability check draws from the pipeline's random generator, so a
//! seeded [`PipelineState`] reproduces the same corruption.

pub mod character;
pub mod config;
pub mod embedding;
pub mod equivalence;
pub mod word;

use std::fmt;

use rand::Rng;
use serde_json::Value;
use tracing::{info, trace};

use crate::error::{PrepError, PrepResult};
use crate::operator::{BuildContext, Operator};
use crate::pipeline::PipelineState;
use crate::process::ProcessType;
use crate::schema::Schema;
use crate::token::Token;
use crate::unit::{Side, TranslationUnit};

pub use character::{apply_character_noise, qwerty_neighbors};
pub use config::{NoiseConfig, SubstituteWordConfig};
pub use embedding::{NearestNeighbors, WordVectors};
pub use equivalence::apply_char_equivalence;
pub use word::WordRule;

/// Token prepended to noisy units when `add_marker` is set
pub const NOISY_MARKER: &str = "｟mrk_noisy｠";

/// Draw once and compare against `prob`. A zero probability never draws.
pub(crate) fn fires<R: Rng + ?Sized>(rng: &mut R, prob: f64) -> bool {
    prob > 0.0 && rng.r#gen::<f64>() <= prob
}

pub struct NoiseOperator {
    config: NoiseConfig,
    embedding: Option<Box<dyn NearestNeighbors>>,
}

impl NoiseOperator {
    pub const NAME: &'static str = "noise";

    /// Build the operator, loading the word embeddings when word
    /// substitution is enabled.
    ///
    /// A configured embedding file must exist even when substitution is
    /// disabled.
    pub fn new(config: NoiseConfig) -> PrepResult<Self> {
        let mut embedding: Option<Box<dyn NearestNeighbors>> = None;
        if let Some(path) = config
            .substitute_word
            .as_ref()
            .and_then(|sw| sw.word_embedding_file.as_ref())
        {
            if !path.is_file() {
                return Err(PrepError::config(format!(
                    "Word embedding file doesn't exist: {}",
                    path.display()
                )));
            }
            if config.substitute_word_prob() > 0.0 {
                embedding = Some(Box::new(WordVectors::load(path)?));
            }
        }
        Ok(NoiseOperator { config, embedding })
    }

    /// Build the operator around an already loaded embedding provider
    pub fn with_embedding(config: NoiseConfig, embedding: Box<dyn NearestNeighbors>) -> Self {
        NoiseOperator {
            config,
            embedding: Some(embedding),
        }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    pub fn config_schema() -> Schema {
        let block = NoiseConfig::block_schema();
        let mut properties = block.clone();
        properties.push(("source", Schema::Object(block)));
        Schema::Object(properties)
    }

    pub fn is_applied_for(process_type: ProcessType) -> bool {
        process_type.is_training()
    }

    pub fn build(config: &Value, context: &BuildContext) -> PrepResult<Box<dyn Operator>> {
        let config = NoiseConfig::from_value(config)?;
        info!(
            "Noise operator for language {}",
            config
                .lang
                .as_deref()
                .or(context.source_lang.as_deref())
                .unwrap_or("<unspecified>")
        );
        Ok(Box::new(Self::new(config)?))
    }

    /// Corrupt the source side of one unit. Returns the noisy unit, followed
    /// by the original one when augmentation applies.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        mut tu: TranslationUnit,
        rng: &mut R,
    ) -> Vec<TranslationUnit> {
        tu.ensure_tokenized(Side::Source);
        let snapshot = (self.config.add_marker || self.config.data_augmentation)
            .then(|| tu.tokens(Side::Source).to_vec());

        if self.config.insert_space_prob > 0.0 {
            self.apply_space_insertion(&mut tu, rng);
        }
        let noisy = self.apply_word_noise(tu.tokens(Side::Source), rng);
        tu.set_tokens(Side::Source, noisy);

        match snapshot {
            Some(original) if tu.tokens(Side::Source) != original.as_slice() => {
                let original_tu = self.config.data_augmentation.then(|| {
                    let mut copy = tu.clone();
                    copy.set_tokens(Side::Source, original);
                    copy
                });
                if self.config.add_marker {
                    tu.replace_tokens(Side::Source, 0, 0, vec![Token::new(NOISY_MARKER)]);
                }
                trace!(
                    "Noisy {} '{}' (augmented: {})",
                    Side::Source.name(),
                    tu.src_detok(),
                    original_tu.is_some()
                );
                std::iter::once(tu).chain(original_tu).collect()
            }
            _ => vec![tu],
        }
    }
}

impl Operator for NoiseOperator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process_unit(
        &self,
        tu: TranslationUnit,
        state: &mut PipelineState,
    ) -> PrepResult<Vec<TranslationUnit>> {
        Ok(self.apply(tu, state.rng()))
    }
}

impl fmt::Debug for NoiseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseOperator")
            .field("config", &self.config)
            .field("embedding", &self.embedding.is_some())
            .finish()
    }
}
