//! Remote backend: a hosted summarization model behind a model-hub
//! inference endpoint.
//!
//! Wire format:
//! - request: `POST {endpoint}/models/{model_id}` with
//!   `{"inputs": "...", "parameters": {"min_length", "max_length", "do_sample"}}`
//! - response: `[{"summary_text": "..."}]`

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::inference::backend::{InferenceError, SummaryParams, Summarizer};

#[derive(Debug, Serialize)]
struct HubRequest<'a> {
    inputs: &'a str,
    parameters: HubParameters,
}

#[derive(Debug, Serialize)]
struct HubParameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct HubSummary {
    summary_text: String,
}

/// Client for one hosted model.
pub struct HubSummarizer {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HubSummarizer {
    /// Build the client. The bearer token is read once, here.
    pub fn new(config: &ModelConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("summary-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InferenceError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        let token = match &config.hub.api_token_env {
            Some(var) => match std::env::var(var) {
                Ok(value) if !value.is_empty() => Some(value),
                _ => {
                    warn!(env = var, "Hub API token not set, calling endpoint anonymously");
                    None
                }
            },
            None => None,
        };

        let url = format!(
            "{}/models/{}",
            config.hub.endpoint.trim_end_matches('/'),
            config.model_id
        );
        info!(url = url, authenticated = token.is_some(), "Hub backend configured");

        Ok(Self { client, url, token })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Summarizer for HubSummarizer {
    fn name(&self) -> &str {
        "hub"
    }

    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String, InferenceError> {
        let body = HubRequest {
            inputs: text,
            parameters: HubParameters {
                min_length: params.min_length,
                max_length: params.max_length,
                do_sample: params.do_sample,
            },
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(format!("hub request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            // The hub reports inputs past the model window as a client error.
            if matches!(
                status,
                StatusCode::BAD_REQUEST
                    | StatusCode::PAYLOAD_TOO_LARGE
                    | StatusCode::UNPROCESSABLE_ENTITY
            ) {
                return Err(InferenceError::InputRejected(format!(
                    "hub returned {status}: {detail}"
                )));
            }
            return Err(InferenceError::Unavailable(format!(
                "hub returned {status}: {detail}"
            )));
        }

        let summaries: Vec<HubSummary> = response
            .json()
            .await
            .map_err(|e| InferenceError::Unavailable(format!("invalid hub response: {e}")))?;

        let summary = summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or_else(|| InferenceError::Unavailable("hub returned no summaries".to_string()))?;

        debug!(chars = summary.len(), "Hub summary received");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn mock_hub(status: StatusCode, reply: Value) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route(
                "/models/{org}/{name}",
                post(
                    move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            seen.lock().unwrap().push((auth, body));
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn config_for(endpoint: String, token_env: Option<&str>) -> ModelConfig {
        let mut config = ModelConfig::default();
        config.hub.endpoint = endpoint;
        config.hub.api_token_env = token_env.map(str::to_string);
        config
    }

    #[tokio::test]
    async fn test_summarize_round_trip() {
        let (endpoint, seen) =
            mock_hub(StatusCode::OK, json!([{"summary_text": "short version"}])).await;
        std::env::set_var("SUMMARY_SERVER_TEST_TOKEN", "secret");
        let hub = HubSummarizer::new(&config_for(endpoint, Some("SUMMARY_SERVER_TEST_TOKEN")))
            .unwrap();

        let summary = hub
            .summarize("a long article", &SummaryParams::default())
            .await
            .unwrap();
        assert_eq!(summary, "short version");

        let seen = seen.lock().unwrap();
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer secret"));
        assert_eq!(body["inputs"], "a long article");
        assert_eq!(body["parameters"]["max_length"], 130);
        assert_eq!(body["parameters"]["min_length"], 30);
        assert_eq!(body["parameters"]["do_sample"], false);
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let (endpoint, _) = mock_hub(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": "Model is currently loading"}),
        )
        .await;
        let hub = HubSummarizer::new(&config_for(endpoint, None)).unwrap();

        let err = hub
            .summarize("text", &SummaryParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Unavailable(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_window_rejection_is_input_error() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::PAYLOAD_TOO_LARGE,
            StatusCode::UNPROCESSABLE_ENTITY,
        ] {
            let (endpoint, _) =
                mock_hub(status, json!({"error": "index out of range in self"})).await;
            let hub = HubSummarizer::new(&config_for(endpoint, None)).unwrap();

            let err = hub
                .summarize("text", &SummaryParams::default())
                .await
                .unwrap_err();
            assert!(
                matches!(err, InferenceError::InputRejected(_)),
                "{status} mapped to {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_empty_reply_is_unavailable() {
        let (endpoint, _) = mock_hub(StatusCode::OK, json!([])).await;
        let hub = HubSummarizer::new(&config_for(endpoint, None)).unwrap();

        let err = hub
            .summarize("text", &SummaryParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let hub = HubSummarizer::new(&config_for(format!("http://{addr}/"), None)).unwrap();
        assert_eq!(hub.url(), format!("http://{addr}/models/facebook/bart-large-cnn"));

        let err = hub
            .summarize("text", &SummaryParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Unavailable(_)));
    }
}
