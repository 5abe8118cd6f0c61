//! Backend-specific error types
//!
//! `BackendError` captures one classified remote failure. Classification
//! happens once per failed attempt, in `from_http_status`. Conversion into
//! `deck_foundation::Error` is lossy on structured details by design; the
//! protocol layer only renders code + message.

use deck_foundation::Error as FoundationError;
use thiserror::Error;

/// Errors raised by backend API calls
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    /// HTTP 401 from the backend
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// HTTP 429 from the backend
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Per-attempt deadline elapsed
    #[error("{0}")]
    Timeout(String),

    /// Any other non-success status
    #[error("HTTP {status} [{code}]: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Connection-level failure (DNS, refused, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Error body shape optionally returned by the backend
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<serde_json::Value>,
}

impl BackendError {
    /// Classify a non-success HTTP response
    ///
    /// Prefers message/code/details parsed from a JSON error body; an
    /// unparseable body falls back to the canonical status text.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status");

        let mut message = format!("HTTP {status}: {reason}");
        let mut code = "HTTP_ERROR".to_string();
        let mut details = None;

        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            if let Some(m) = parsed.message {
                message = m;
            }
            if let Some(c) = parsed.code {
                code = c;
            }
            details = parsed.details;
        }

        match status {
            401 => BackendError::Authentication(message),
            429 => BackendError::RateLimited(message),
            _ => BackendError::Api {
                status,
                code,
                message,
                details,
            },
        }
    }
}

impl From<BackendError> for FoundationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Authentication(msg) => FoundationError::Authentication(msg),
            BackendError::RateLimited(msg) => FoundationError::RateLimited(msg),
            BackendError::Timeout(msg) => FoundationError::Timeout(msg),
            BackendError::Api {
                status,
                code,
                message,
                ..
            } => FoundationError::Api {
                status,
                code,
                message,
            },
            BackendError::Network(msg) => FoundationError::Http(msg),
            BackendError::InvalidResponse(msg) => {
                FoundationError::Internal(format!("Invalid response: {msg}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_classifies_as_authentication() {
        let err = BackendError::from_http_status(401, "");
        assert!(matches!(err, BackendError::Authentication(_)));
    }

    #[test]
    fn test_429_classifies_as_rate_limit() {
        let err = BackendError::from_http_status(429, "{\"message\": \"slow down\"}");
        match err {
            BackendError::RateLimited(msg) => assert_eq!(msg, "slow down"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_other_status_carries_code_and_details() {
        let body = r#"{"message": "shard down", "code": "SHARD_DOWN", "details": {"shard": 3}}"#;
        let err = BackendError::from_http_status(503, body);
        match err {
            BackendError::Api {
                status,
                code,
                message,
                details,
            } => {
                assert_eq!(status, 503);
                assert_eq!(code, "SHARD_DOWN");
                assert_eq!(message, "shard down");
                assert_eq!(details.unwrap()["shard"], 3);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status_text() {
        let err = BackendError::from_http_status(500, "<html>oops</html>");
        match err {
            BackendError::Api { code, message, .. } => {
                assert_eq!(code, "HTTP_ERROR");
                assert_eq!(message, "HTTP 500: Internal Server Error");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_conversion_to_foundation_error() {
        let err: FoundationError = BackendError::from_http_status(401, "").into();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.code(), "AUTH_FAILED");

        let err: FoundationError = BackendError::Timeout("Request timeout after 5000ms".into()).into();
        assert_eq!(err.status_code(), 408);
    }
}
