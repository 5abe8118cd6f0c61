//! Error types for QueryDeck
//!
//! All errors are managed centrally. Every variant maps to a stable error
//! code token and an HTTP-shaped status, which the dispatch server embeds in
//! protocol-level error content.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// QueryDeck error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // Validation
    // ========================================================================
    #[error("Validation failed: {0}")]
    Validation(String),

    // ========================================================================
    // Tool dispatch
    // ========================================================================
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    // ========================================================================
    // Backend API
    // ========================================================================
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("API error {status} [{code}]: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    // ========================================================================
    // External error conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Misc
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable error code token for protocol-facing messages
    pub fn code(&self) -> &str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::ToolNotFound(_) => "UNKNOWN_TOOL",
            Error::Authentication(_) => "AUTH_FAILED",
            Error::RateLimited(_) => "RATE_LIMIT",
            Error::Timeout(_) => "REQUEST_TIMEOUT",
            Error::Api { code, .. } => code,
            Error::Http(_) => "HTTP_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP-shaped status associated with this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Config(_) => 500,
            Error::Validation(_) => 400,
            Error::ToolNotFound(_) => 404,
            Error::Authentication(_) => 401,
            Error::RateLimited(_) => 429,
            Error::Timeout(_) => 408,
            Error::Api { status, .. } => *status,
            Error::Http(_) => 502,
            Error::Io(_) | Error::Json(_) | Error::Internal(_) => 500,
        }
    }

    /// Whether a retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::RateLimited(_) | Error::Http(_)
        )
    }

    /// API error construction helper
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
