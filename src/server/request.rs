//! Request body parsing for `POST /summarize`.
//!
//! Bodies are parsed by hand rather than through `axum::Json` so that the
//! `Content-Type` header is not required and every malformed body maps to
//! the same client error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::RequestMode;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Request body too large: {0}")]
    BodyTooLarge(String),
}

/// Summarization request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: String,
}

/// Parse a raw body. `null` and an absent `text` are treated alike.
pub fn parse_summarize_request(
    body: &[u8],
    mode: RequestMode,
) -> Result<SummarizeRequest, RequestError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RequestError::Malformed(format!("body is not valid JSON: {e}")))?;

    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(RequestError::Malformed(format!(
                "body must be a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    match fields.remove("text") {
        Some(Value::String(text)) => Ok(SummarizeRequest { text }),
        None | Some(Value::Null) => match mode {
            RequestMode::Lenient => Ok(SummarizeRequest::default()),
            RequestMode::Strict => Err(RequestError::MissingField("text")),
        },
        Some(other) => Err(RequestError::Malformed(format!(
            "`text` must be a string, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_extracted() {
        let req = parse_summarize_request(br#"{"text": "hello", "extra": 1}"#, RequestMode::Strict)
            .unwrap();
        assert_eq!(req.text, "hello");
    }

    #[test]
    fn test_lenient_defaults_missing_text() {
        let missing = parse_summarize_request(b"{}", RequestMode::Lenient).unwrap();
        let empty = parse_summarize_request(br#"{"text": ""}"#, RequestMode::Lenient).unwrap();
        let null = parse_summarize_request(br#"{"text": null}"#, RequestMode::Lenient).unwrap();
        assert_eq!(missing, empty);
        assert_eq!(null, empty);
    }

    #[test]
    fn test_strict_rejects_missing_text() {
        let err = parse_summarize_request(b"{}", RequestMode::Strict).unwrap_err();
        assert!(matches!(err, RequestError::MissingField("text")));
    }

    #[test]
    fn test_non_json_rejected() {
        for body in [&b"not json"[..], b"", b"{\"text\": "] {
            let err = parse_summarize_request(body, RequestMode::Lenient).unwrap_err();
            assert!(matches!(err, RequestError::Malformed(_)));
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_summarize_request(b"[1, 2]", RequestMode::Lenient).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed request: body must be a JSON object, got array"
        );
    }

    #[test]
    fn test_non_string_text_rejected() {
        let err = parse_summarize_request(br#"{"text": 42}"#, RequestMode::Lenient).unwrap_err();
        assert!(err.to_string().contains("got number"));
    }
}
