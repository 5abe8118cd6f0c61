//! Resolved runtime configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "https://api.querydeck.io";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRY_COUNT: u32 = 3;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Immutable settings resolved once at startup
///
/// Values come from environment variables overlaid by an optional config
/// file; see [`crate::config::load_config`]. Out-of-range values reject at
/// load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeckConfig {
    /// Bearer token passed through to the backend unmodified
    pub api_key: String,

    /// Backend base URL
    pub server_url: String,

    /// Per-attempt request timeout in milliseconds, 1000..=300000
    pub timeout: u64,

    /// Additional attempts after the first failure, 0..=10
    pub retry_count: u32,

    pub cache_enabled: bool,

    /// Default cache TTL in seconds
    pub cache_ttl: u64,

    pub log_level: String,

    /// Concurrent tool calls in flight, 1..=20
    pub max_concurrent_requests: usize,

    /// Client-identifying tag sent in the user agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_MS,
            retry_count: DEFAULT_RETRY_COUNT,
            cache_enabled: true,
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
            log_level: "info".to_string(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            client_type: None,
            workspace_id: None,
            team_id: None,
        }
    }
}

impl DeckConfig {
    /// Validate all invariants, rejecting the config at load time
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() || self.api_key == "your-api-key-here" {
            return Err(Error::Config(
                "API key is missing or still set to the example value; set DECK_API_KEY"
                    .to_string(),
            ));
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid server URL: {}",
                self.server_url
            )));
        }

        if !(1_000..=300_000).contains(&self.timeout) {
            return Err(Error::Config(format!(
                "timeout must be between 1000 and 300000 ms, got {}",
                self.timeout
            )));
        }

        if self.retry_count > 10 {
            return Err(Error::Config(format!(
                "retryCount must be between 0 and 10, got {}",
                self.retry_count
            )));
        }

        if !(1..=20).contains(&self.max_concurrent_requests) {
            return Err(Error::Config(format!(
                "maxConcurrentRequests must be between 1 and 20, got {}",
                self.max_concurrent_requests
            )));
        }

        Ok(())
    }
}
