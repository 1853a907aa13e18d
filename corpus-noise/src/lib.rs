//! Parallel corpus preprocessing with noise injection
//!
//! This crate runs translation units (source/target sentence pairs) through a
//! configurable sequence of operators before machine translation training.
//! Its main operator is a probabilistic noise engine that corrupts source
//! sentences at the word, character and Unicode level, for robustness
//! training and data augmentation.
//!
//! # Example
//!
//! ```ignore
//! use corpus_noise::{Pipeline, PipelineState, ProcessType, TranslationUnit};
//! use serde_json::json;
//!
//! let config = json!({
//!     "source": "en",
//!     "target": "fr",
//!     "preprocess": [
//!         {"op": "tokenization", "source": {"mode": "conservative", "joiner_annotate": true}},
//!         {"op": "noise", "drop_space_prob": 1, "add_marker": true}
//!     ]
//! });
//!
//! let pipeline = Pipeline::new(&config, ProcessType::Training)?;
//! let mut state = PipelineState::seeded(1234);
//! let units = pipeline.run(vec![TranslationUnit::with_target("hello world.", "bonjour le monde.")], &mut state)?;
//! assert_eq!(units[0].src_detok(), "｟mrk_noisy｠ helloworld.");
//! ```

pub mod error;
pub mod noise;
pub mod operator;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod token;
pub mod tokenization;
pub mod tokenizer;
pub mod unit;

// Integration tests (only available during testing)
#[cfg(test)]
mod integration_tests;

// Re-export main types for convenient access
pub use error::{PrepError, PrepResult};
pub use noise::{NOISY_MARKER, NearestNeighbors, NoiseConfig, NoiseOperator, WordVectors};
pub use operator::{BuildContext, Operator, OperatorDescriptor, find_operator, registered_operators};
pub use pipeline::{OperatorCounters, Pipeline, PipelineState};
pub use process::ProcessType;
pub use schema::Schema;
pub use token::Token;
pub use tokenization::TokenizationOperator;
pub use tokenizer::{TokenizationMode, Tokenizer};
pub use unit::{Side, TranslationUnit};
