//! Tokenization operator
//!
//! Tokenizes each side of a unit with the tokenizer configured for that side:
//!
//! ```json
//! {"op": "tokenization", "source": {"mode": "conservative", "joiner_annotate": true}}
//! ```
//!
//! Sides without a block are left as they are.

use serde::Deserialize;
use serde_json::Value;

use crate::error::PrepResult;
use crate::operator::{BuildContext, Operator};
use crate::pipeline::PipelineState;
use crate::process::ProcessType;
use crate::schema::Schema;
use crate::tokenizer::{TokenizationMode, Tokenizer};
use crate::unit::{Side, TranslationUnit};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenizationConfig {
    source: Option<Tokenizer>,
    target: Option<Tokenizer>,
}

#[derive(Debug, Clone)]
pub struct TokenizationOperator {
    source: Option<Tokenizer>,
    target: Option<Tokenizer>,
}

impl TokenizationOperator {
    pub const NAME: &'static str = "tokenization";

    pub fn new(source: Option<Tokenizer>, target: Option<Tokenizer>) -> Self {
        TokenizationOperator { source, target }
    }

    pub fn config_schema() -> Schema {
        let side = || {
            Schema::object([
                ("mode", Schema::Enum(TokenizationMode::NAMES)),
                ("joiner_annotate", Schema::Boolean),
            ])
        };
        Schema::object([("source", side()), ("target", side())])
    }

    pub fn is_applied_for(_process_type: ProcessType) -> bool {
        true
    }

    pub fn build(config: &Value, _context: &BuildContext) -> PrepResult<Box<dyn Operator>> {
        let config: TokenizationConfig = serde_json::from_value(config.clone())?;
        Ok(Box::new(Self::new(config.source, config.target)))
    }
}

impl Operator for TokenizationOperator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process_unit(
        &self,
        mut tu: TranslationUnit,
        _state: &mut PipelineState,
    ) -> PrepResult<Vec<TranslationUnit>> {
        if let Some(tokenizer) = self.source {
            tu.tokenize(Side::Source, tokenizer);
        }
        if let Some(tokenizer) = self.target {
            tu.tokenize(Side::Target, tokenizer);
        }
        Ok(vec![tu])
    }
}
