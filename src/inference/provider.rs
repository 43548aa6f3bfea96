//! Inference provider: the one long-lived handle on the summarization
//! capability.
//!
//! The provider is the top-level inference component. It:
//! 1. Loads the configured backend once, at startup
//! 2. Rejects inputs larger than the model window
//! 3. Gates concurrent calls (one at a time for backends that are not
//!    concurrency-safe)
//! 4. Enforces the maximum summary length on whatever the backend returns

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::{BackendKind, ModelConfig};
use crate::inference::backend::{InferenceError, SummaryParams, Summarizer};
use crate::inference::extractive::ExtractiveSummarizer;
use crate::inference::hub::HubSummarizer;
use crate::inference::tokens;

/// Shared, read-only after construction.
pub struct InferenceProvider {
    /// The loaded capability.
    backend: Arc<dyn Summarizer>,

    /// Output bounds.
    params: SummaryParams,

    /// Input window in tokens.
    max_input_tokens: usize,

    /// Model identifier, for reporting.
    model_id: String,

    /// Concurrency gate; closed on shutdown.
    gate: Semaphore,
}

impl InferenceProvider {
    /// Validate `config` and load the backend it names.
    pub fn load(config: &ModelConfig) -> Result<Self, InferenceError> {
        validate(config)?;

        let backend: Arc<dyn Summarizer> = match config.backend {
            BackendKind::Extractive => Arc::new(ExtractiveSummarizer::new()),
            BackendKind::Hub => Arc::new(HubSummarizer::new(config)?),
        };

        Ok(Self::new(backend, config))
    }

    /// Wrap an already constructed backend.
    pub fn new(backend: Arc<dyn Summarizer>, config: &ModelConfig) -> Self {
        let permits = if backend.supports_concurrency() {
            config
                .max_concurrent_inferences
                .clamp(1, Semaphore::MAX_PERMITS)
        } else {
            1
        };

        info!(
            backend = backend.name(),
            model = config.model_id,
            min_length = config.min_length,
            max_length = config.max_length,
            max_input_tokens = config.max_input_tokens,
            permits,
            "Inference provider ready"
        );

        Self {
            backend,
            params: SummaryParams::from(config),
            max_input_tokens: config.max_input_tokens,
            model_id: config.model_id.clone(),
            gate: Semaphore::new(permits),
        }
    }

    /// Summarize `text`. The result never exceeds `max_length` tokens.
    pub async fn summarize(&self, text: &str) -> Result<String, InferenceError> {
        let input_tokens = tokens::count(text);
        if input_tokens > self.max_input_tokens {
            return Err(InferenceError::InputTooLarge {
                tokens: input_tokens,
                limit: self.max_input_tokens,
            });
        }

        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| InferenceError::Unavailable("inference provider is shut down".to_string()))?;

        let start = Instant::now();
        let raw = self.backend.summarize(text, &self.params).await?;
        let summary = tokens::truncate(&raw, self.params.max_length);

        debug!(
            input_tokens,
            output_tokens = tokens::count(summary),
            truncated = summary.len() != raw.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Summary generated"
        );

        Ok(summary.to_string())
    }

    /// Stop accepting calls. In-flight calls finish; later calls fail with
    /// [`InferenceError::Unavailable`].
    pub fn shutdown(&self) {
        self.gate.close();
        info!(backend = self.backend.name(), "Inference provider shut down");
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn params(&self) -> &SummaryParams {
        &self.params
    }
}

fn validate(config: &ModelConfig) -> Result<(), InferenceError> {
    if config.max_length == 0 {
        return Err(InferenceError::InvalidConfig(
            "max_length must be greater than zero".to_string(),
        ));
    }
    if config.min_length > config.max_length {
        return Err(InferenceError::InvalidConfig(format!(
            "min_length ({}) exceeds max_length ({})",
            config.min_length, config.max_length
        )));
    }
    if config.model_id.trim().is_empty() {
        return Err(InferenceError::InvalidConfig("model_id is empty".to_string()));
    }
    if config.max_concurrent_inferences > Semaphore::MAX_PERMITS {
        return Err(InferenceError::InvalidConfig(format!(
            "max_concurrent_inferences ({}) exceeds {}",
            config.max_concurrent_inferences,
            Semaphore::MAX_PERMITS
        )));
    }
    Ok(())
}
