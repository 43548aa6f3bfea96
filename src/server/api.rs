//! Summarization HTTP API.
//!
//! - POST /summarize
//! - GET /health
//! - GET /metrics

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ApiError, ServiceError};
use crate::inference::provider::InferenceProvider;
use crate::inference::tokens;
use crate::server::cors::cors_layer;
use crate::server::metrics::Metrics;
use crate::server::request::{parse_summarize_request, RequestError};

/// Application state shared across handlers.
pub struct AppState {
    pub provider: Arc<InferenceProvider>,
    pub config: Arc<Config>,
    pub metrics: Metrics,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(provider: Arc<InferenceProvider>, config: Arc<Config>) -> prometheus::Result<Self> {
        Ok(Self {
            provider,
            config,
            metrics: Metrics::new()?,
            start_time: Instant::now(),
        })
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes));

    Router::new()
        .route("/summarize", post(summarize))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(middleware)
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Summarization response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub model: String,
    pub backend: String,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn summarize(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let result = run_summarize(&state, body, &request_id).await;
    match &result {
        Ok(_) => state.metrics.record_request("ok"),
        Err(e) => state.metrics.record_request(e.error_type()),
    }

    result.map(Json).map_err(|e| ApiError::new(e, request_id))
}

async fn run_summarize(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
    request_id: &str,
) -> Result<SummarizeResponse, ServiceError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RequestError::BodyTooLarge(rejection.body_text())
        } else {
            RequestError::Malformed(rejection.body_text())
        }
    })?;

    let request = parse_summarize_request(&body, state.config.request.mode)?;

    info!(
        request_id,
        chars = request.text.len(),
        tokens = tokens::count(&request.text),
        "Summarize request"
    );

    let start = Instant::now();
    let summary = state.provider.summarize(&request.text).await?;
    state.metrics.observe_inference(start.elapsed().as_secs_f64());

    info!(
        request_id,
        summary_tokens = tokens::count(&summary),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Summarize complete"
    );

    Ok(SummarizeResponse { summary })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        model: state.provider.model_id().to_string(),
        backend: state.provider.backend_name().to_string(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.render().map_err(|e| ApiError {
        error: ServiceError::Internal(format!("failed to encode metrics: {e}")),
        request_id: None,
    })?;

    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
