//! Runtime configuration for summary-server.
//!
//! Configuration is loaded from a JSON file or constructed programmatically,
//! then selectively overridden by command-line flags. All knobs for the
//! model, the cross-origin policy, and request parsing live here.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "summary-server", about = "Text summarization HTTP server")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides `server.listen`).
    #[arg(long)]
    pub listen: Option<String>,

    /// Summarization backend (overrides `model.backend`).
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Model identifier (overrides `model.model_id`).
    #[arg(long)]
    pub model: Option<String>,

    /// Allow any origin with credentials. Not for production use.
    #[arg(long)]
    pub cors_permissive: bool,

    /// Reject requests that omit the `text` field.
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Model configuration.
    pub model: ModelConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Request parsing policy.
    pub request: RequestConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:8080").
    pub listen: String,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Which summarization capability backs the inference provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process extractive summarizer.
    Extractive,
    /// Remote model-hub inference endpoint.
    Hub,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Extractive => write!(f, "extractive"),
            BackendKind::Hub => write!(f, "hub"),
        }
    }
}

/// Model-related settings. Lengths are counted in whitespace tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Backend implementation.
    pub backend: BackendKind,

    /// Model identifier on the hub (also reported by `/health`).
    pub model_id: String,

    /// Minimum summary length in tokens.
    pub min_length: usize,

    /// Maximum summary length in tokens.
    pub max_length: usize,

    /// Largest input accepted, in whitespace tokens. Subword models see
    /// more tokens than this (roughly 1.3 per English word), so the default
    /// stays under a 1024-subword window.
    pub max_input_tokens: usize,

    /// Sample instead of decoding deterministically.
    pub do_sample: bool,

    /// Inference calls allowed to run at once (backends that are not
    /// concurrency-safe are always limited to one).
    pub max_concurrent_inferences: usize,

    /// Hub backend settings.
    pub hub: HubConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Extractive,
            model_id: "facebook/bart-large-cnn".to_string(),
            min_length: 30,
            max_length: 130,
            max_input_tokens: 700,
            do_sample: false,
            max_concurrent_inferences: 4,
            hub: HubConfig::default(),
        }
    }
}

/// Remote inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL; the model id is appended as `/models/{model_id}`.
    pub endpoint: String,

    /// Environment variable holding the bearer token (optional).
    pub api_token_env: Option<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co".to_string(),
            api_token_env: Some("HF_API_TOKEN".to_string()),
        }
    }
}

/// Cross-origin resource sharing policy.
///
/// `"*"` in any list means "any". The default denies cross-origin access;
/// [`CorsConfig::permissive`] opts into the wide-open policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Use the permissive policy regardless of the lists below.
    pub permissive: bool,

    /// Origins allowed to call the API.
    pub allowed_origins: Vec<String>,

    /// Whether browsers may send credentials.
    pub allow_credentials: bool,

    /// Allowed request methods.
    pub allowed_methods: Vec<String>,

    /// Allowed request headers.
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            permissive: false,
            allowed_origins: Vec::new(),
            allow_credentials: false,
            allowed_methods: vec!["POST".to_string()],
            allowed_headers: vec!["content-type".to_string()],
        }
    }
}

impl CorsConfig {
    /// Any origin, credentials allowed, all methods and headers.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
            allowed_methods: vec!["*".to_string()],
            allowed_headers: vec!["*".to_string()],
        }
    }
}

/// How strictly request bodies are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// A missing `text` field is treated as an empty string.
    #[default]
    Lenient,
    /// A missing `text` field is rejected.
    Strict,
}

/// Request parsing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub mode: RequestMode,
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Apply command-line overrides on top of the loaded file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.server.listen = listen.clone();
        }
        if let Some(backend) = cli.backend {
            self.model.backend = backend;
        }
        if let Some(model) = &cli.model {
            self.model.model_id = model.clone();
        }
        if cli.cors_permissive {
            self.cors = CorsConfig::permissive();
        }
        if cli.strict {
            self.request.mode = RequestMode::Strict;
        }
    }
}
