//! Error taxonomy at the HTTP boundary.
//!
//! Every failure a handler can produce becomes an [`ApiError`], rendered as
//! a JSON [`ErrorResponse`] with a status code from [`ServiceError::status_code`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::inference::backend::InferenceError;
use crate::server::request::RequestError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Request(RequestError::Malformed(_)) => StatusCode::BAD_REQUEST,
            Self::Request(RequestError::MissingField(_)) => StatusCode::BAD_REQUEST,
            Self::Request(RequestError::BodyTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Inference(InferenceError::InputTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Inference(InferenceError::InputRejected(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Inference(InferenceError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Inference(InferenceError::InvalidConfig(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind, also used as the metrics outcome label.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Request(RequestError::Malformed(_)) => "malformed_request",
            Self::Request(RequestError::MissingField(_)) => "validation_error",
            Self::Request(RequestError::BodyTooLarge(_)) => "payload_too_large",
            Self::Inference(InferenceError::InputTooLarge { .. })
            | Self::Inference(InferenceError::InputRejected(_)) => "input_too_large",
            Self::Inference(InferenceError::Unavailable(_)) => "inference_unavailable",
            Self::Inference(InferenceError::InvalidConfig(_)) | Self::Internal(_) => {
                "internal_error"
            }
        }
    }
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// A [`ServiceError`] tagged with the request it belongs to.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(error: impl Into<ServiceError>, request_id: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            request_id: Some(request_id.into()),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error_type: self.error.error_type().to_string(),
            message: self.error.to_string(),
            request_id: self.request_id.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            error!(request_id = ?self.request_id, status = status.as_u16(), "{}", self.error);
        } else {
            warn!(request_id = ?self.request_id, status = status.as_u16(), "{}", self.error);
        }
        (status, Json(self.to_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ServiceError, StatusCode, &str)> = vec![
            (
                RequestError::Malformed("x".into()).into(),
                StatusCode::BAD_REQUEST,
                "malformed_request",
            ),
            (
                RequestError::MissingField("text").into(),
                StatusCode::BAD_REQUEST,
                "validation_error",
            ),
            (
                InferenceError::InputTooLarge { tokens: 2, limit: 1 }.into(),
                StatusCode::PAYLOAD_TOO_LARGE,
                "input_too_large",
            ),
            (
                InferenceError::InputRejected("index out of range".into()).into(),
                StatusCode::PAYLOAD_TOO_LARGE,
                "input_too_large",
            ),
            (
                InferenceError::Unavailable("down".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
                "inference_unavailable",
            ),
            (
                ServiceError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
        ];

        for (err, status, kind) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.error_type(), kind);
        }
    }

    #[test]
    fn test_response_body() {
        let err = ApiError::new(RequestError::MissingField("text"), "req-1");
        let body = err.to_response();
        assert_eq!(body.error_type, "validation_error");
        assert_eq!(body.message, "Missing required field `text`");
        assert_eq!(body.request_id.as_deref(), Some("req-1"));
    }
}
