//! The summarization capability seen from inside the server.
//!
//! A backend is an opaque "text in, text out" function over a loaded
//! resource. Everything the server knows about it is this trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ModelConfig;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Input too large: {tokens} tokens exceeds the model window of {limit}")]
    InputTooLarge { tokens: usize, limit: usize },

    #[error("Input rejected by the model: {0}")]
    InputRejected(String),

    #[error("Inference unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
}

/// Generation bounds passed to every call (mirrors the model's
/// summarization settings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryParams {
    /// Minimum summary length in tokens.
    pub min_length: usize,

    /// Maximum summary length in tokens.
    pub max_length: usize,

    /// Sample instead of decoding deterministically.
    pub do_sample: bool,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for SummaryParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_length: config.max_length,
            do_sample: config.do_sample,
        }
    }
}

/// A loaded summarization capability.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short backend name for logs and `/health`.
    fn name(&self) -> &str;

    /// Whether calls may overlap. Backends returning `false` are serialized
    /// by the provider.
    fn supports_concurrency(&self) -> bool {
        true
    }

    /// Summarize `text` within `params`.
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String, InferenceError>;
}
