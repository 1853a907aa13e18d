//! Preprocessing pipeline
//!
//! A [`Pipeline`] is built from a JSON configuration of the form
//!
//! ```json
//! {
//!     "source": "en",
//!     "target": "fr",
//!     "preprocess": [
//!         {"op": "tokenization", "source": {"mode": "conservative"}},
//!         {"op": "noise", "drop_word_prob": 0.1}
//!     ]
//! }
//! ```
//!
//! Every block is validated against its operator schema before any operator is
//! built. Operators that do not apply to the process mode are validated but
//! never instantiated or run.
//!
//! Auxiliary state shared by operators (the random generator and run counters)
//! lives in a [`PipelineState`] owned by the caller, so one pipeline can be run
//! over many batches and runs are reproducible from a seed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PrepError, PrepResult};
use crate::operator::{BuildContext, Operator, find_operator};
use crate::process::ProcessType;
use crate::unit::TranslationUnit;

/// Unit counts observed for one operator across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorCounters {
    pub input: usize,
    pub output: usize,
}

/// State threaded through every operator of a run
#[derive(Debug, Clone)]
pub struct PipelineState {
    rng: ChaCha8Rng,
    counters: BTreeMap<String, OperatorCounters>,
}

impl PipelineState {
    /// State with a fixed seed, for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        PipelineState {
            rng,
            counters: BTreeMap::new(),
        }
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn counters(&self) -> &BTreeMap<String, OperatorCounters> {
        &self.counters
    }

    fn record(&mut self, operator: &str, input: usize, output: usize) {
        let counters = self.counters.entry(operator.to_string()).or_default();
        counters.input += input;
        counters.output += output;
    }
}

#[derive(Debug, Deserialize)]
struct PipelineConfig {
    source: Option<String>,
    target: Option<String>,
    #[serde(default)]
    preprocess: Vec<Value>,
}

pub struct Pipeline {
    operators: Vec<Box<dyn Operator>>,
    process_type: ProcessType,
}

impl Pipeline {
    /// Build a pipeline from its configuration. A bare list is accepted as
    /// the `preprocess` section.
    pub fn new(config: &Value, process_type: ProcessType) -> PrepResult<Self> {
        let config: PipelineConfig = match config {
            Value::Array(blocks) => PipelineConfig {
                source: None,
                target: None,
                preprocess: blocks.clone(),
            },
            other => serde_json::from_value(other.clone())?,
        };

        let context = BuildContext {
            process_type,
            source_lang: config.source,
            target_lang: config.target,
        };

        let mut selected = Vec::new();
        for (index, block) in config.preprocess.iter().enumerate() {
            let name = block
                .get("op")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    PrepError::config(format!("preprocess[{}]: missing 'op' field", index))
                })?;
            let descriptor = find_operator(name)?;
            descriptor.config_schema().validate(block).map_err(|e| match e {
                PrepError::Config(msg) => {
                    PrepError::config(format!("preprocess[{}] ({}): {}", index, name, msg))
                }
                other => other,
            })?;
            if (descriptor.is_applied_for)(process_type) {
                selected.push((descriptor, block));
            } else {
                debug!("Skipping operator '{}' for {} process", name, process_type);
            }
        }

        let mut operators = Vec::with_capacity(selected.len());
        for (descriptor, block) in selected {
            operators.push((descriptor.build)(block, &context)?);
            info!("Built operator '{}'", descriptor.name);
        }

        Ok(Pipeline {
            operators,
            process_type,
        })
    }

    /// Build a pipeline from a JSON configuration file
    pub fn from_file(path: &Path, process_type: ProcessType) -> PrepResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| PrepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Value = serde_json::from_str(&content)?;
        Self::new(&config, process_type)
    }

    pub fn process_type(&self) -> ProcessType {
        self.process_type
    }

    /// Names of the operators that will run, in order
    pub fn operator_names(&self) -> Vec<&str> {
        self.operators.iter().map(|op| op.name()).collect()
    }

    /// Run every operator over the batch. Stops as soon as the batch is empty.
    pub fn run(
        &self,
        batch: Vec<TranslationUnit>,
        state: &mut PipelineState,
    ) -> PrepResult<Vec<TranslationUnit>> {
        let mut batch = batch;
        for operator in &self.operators {
            if batch.is_empty() {
                break;
            }
            let input = batch.len();
            batch = operator.process(batch, state)?;
            state.record(operator.name(), input, batch.len());
            debug!(
                "Operator '{}': {} -> {} units",
                operator.name(),
                input,
                batch.len()
            );
        }
        Ok(batch)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("operators", &self.operator_names())
            .field("process_type", &self.process_type)
            .finish()
    }
}
