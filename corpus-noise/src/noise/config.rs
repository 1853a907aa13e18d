//! Noise operator configuration
//!
//! All probabilities default to 0, which disables the corresponding rule.
//! When a non-empty `source` block is present it replaces the top-level
//! values entirely.

use std::path::PathBuf;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::PrepResult;
use crate::schema::Schema;

/// Neighbors queried when `nearest_neighbors_num` is not given
pub const DEFAULT_NEAREST_NEIGHBORS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubstituteWordConfig {
    pub prob: f64,
    pub word_embedding_file: Option<PathBuf>,
    pub nearest_neighbors_num: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub lang: Option<String>,
    pub data_augmentation: bool,
    pub add_marker: bool,

    pub drop_word_prob: f64,
    pub duplicate_word_prob: f64,
    pub swap_word_prob: f64,
    pub substitute_word: Option<SubstituteWordConfig>,
    pub drop_space_prob: f64,
    pub insert_space_prob: f64,

    pub drop_char_prob: f64,
    pub duplicate_char_prob: f64,
    pub swap_char_prob: f64,
    pub substitute_char_prob: f64,

    pub char_equivalence_prob: f64,
    /// Replacements applied in declaration order
    #[serde(deserialize_with = "ordered_table")]
    pub char_equivalence_table: Vec<(String, String)>,
}

impl NoiseConfig {
    /// Read the configuration from an operator block, honoring the `source`
    /// override
    pub fn from_value(block: &Value) -> PrepResult<Self> {
        let effective = match block.get("source") {
            Some(Value::Object(source)) if !source.is_empty() => Value::Object(source.clone()),
            _ => block.clone(),
        };
        Ok(serde_json::from_value(effective)?)
    }

    /// Properties of one noise block, shared by the top level and `source`
    pub fn block_schema() -> Vec<(&'static str, Schema)> {
        vec![
            ("lang", Schema::String),
            ("data_augmentation", Schema::Boolean),
            ("drop_word_prob", Schema::probability()),
            ("duplicate_word_prob", Schema::probability()),
            ("swap_word_prob", Schema::probability()),
            (
                "substitute_word",
                Schema::object([
                    ("prob", Schema::probability()),
                    ("word_embedding_file", Schema::String),
                    ("nearest_neighbors_num", Schema::Integer { minimum: 1 }),
                ]),
            ),
            ("drop_space_prob", Schema::probability()),
            ("insert_space_prob", Schema::probability()),
            ("drop_char_prob", Schema::probability()),
            ("duplicate_char_prob", Schema::probability()),
            ("swap_char_prob", Schema::probability()),
            ("substitute_char_prob", Schema::probability()),
            ("add_marker", Schema::Boolean),
            ("char_equivalence_prob", Schema::probability()),
            ("char_equivalence_table", Schema::StringMap),
        ]
    }

    pub fn substitute_word_prob(&self) -> f64 {
        self.substitute_word.as_ref().map_or(0.0, |sw| sw.prob)
    }

    pub fn nearest_neighbors_num(&self) -> usize {
        self.substitute_word
            .as_ref()
            .and_then(|sw| sw.nearest_neighbors_num)
            .unwrap_or(DEFAULT_NEAREST_NEIGHBORS)
    }

    /// Any character-level rule is enabled
    pub fn has_char_noise(&self) -> bool {
        self.drop_char_prob > 0.0
            || self.duplicate_char_prob > 0.0
            || self.swap_char_prob > 0.0
            || self.substitute_char_prob > 0.0
    }
}

fn ordered_table<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(pattern, replacement)| match replacement {
            Value::String(replacement) => Ok((pattern, replacement)),
            other => Err(D::Error::custom(format!(
                "char_equivalence_table.{}: expected a string, got {}",
                pattern, other
            ))),
        })
        .collect()
}
