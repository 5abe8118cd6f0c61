//! Configuration loader
//!
//! Resolution order:
//!
//! 1. Environment variables (`DECK_API_KEY`, `DECK_SERVER_URL`, ...)
//! 2. Optional config file (`CONFIG_FILE` env var, else `config/querydeck.toml`)
//!
//! File values override environment values. The merged result is validated;
//! violations are fatal at load time.

use super::types::DeckConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default config file location, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config/querydeck.toml";

/// Partial configuration as read from a file; unset keys fall through
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PartialConfig {
    api_key: Option<String>,
    server_url: Option<String>,
    timeout: Option<u64>,
    retry_count: Option<u32>,
    cache_enabled: Option<bool>,
    cache_ttl: Option<u64>,
    log_level: Option<String>,
    max_concurrent_requests: Option<usize>,
    client_type: Option<String>,
    workspace_id: Option<String>,
    team_id: Option<String>,
}

/// Load and validate the configuration
pub fn load_config(config_path: Option<&Path>) -> Result<DeckConfig> {
    let mut config = load_from_env()?;

    let path = config_path
        .map(PathBuf::from)
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() {
        let file = load_from_file(&path)?;
        info!("Loaded config file: {}", path.display());
        config = merge(config, file);
    } else {
        debug!("No config file at {}, using environment", path.display());
    }

    config.validate()?;
    Ok(config)
}

/// Read recognized environment variables onto the defaults
fn load_from_env() -> Result<DeckConfig> {
    let mut config = DeckConfig::default();

    if let Ok(key) = std::env::var("DECK_API_KEY") {
        config.api_key = key;
    }
    if let Ok(url) = std::env::var("DECK_SERVER_URL") {
        config.server_url = url;
    }
    if let Some(timeout) = env_number::<u64>("REQUEST_TIMEOUT")? {
        config.timeout = timeout;
    }
    if let Some(retries) = env_number::<u32>("RETRY_COUNT")? {
        config.retry_count = retries;
    }
    if let Some(ttl) = env_number::<u64>("CACHE_TTL")? {
        // CACHE_TTL=0 disables the cache entirely
        config.cache_enabled = ttl != 0;
        if ttl != 0 {
            config.cache_ttl = ttl;
        }
    }
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        config.log_level = level;
    }
    if let Some(limit) = env_number::<usize>("MAX_CONCURRENT_REQUESTS")? {
        config.max_concurrent_requests = limit;
    }
    if let Ok(client_type) = std::env::var("CLIENT_TYPE") {
        config.client_type = Some(client_type);
    }
    if let Ok(workspace) = std::env::var("WORKSPACE_ID") {
        config.workspace_id = Some(workspace);
    }
    if let Ok(team) = std::env::var("TEAM_ID") {
        config.team_id = Some(team);
    }

    Ok(config)
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Parse a TOML or JSON config file, chosen by extension
fn load_from_file(path: &Path) -> Result<PartialConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    } else {
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// File values take precedence over environment values
fn merge(mut base: DeckConfig, file: PartialConfig) -> DeckConfig {
    if let Some(api_key) = file.api_key {
        base.api_key = api_key;
    }
    if let Some(server_url) = file.server_url {
        base.server_url = server_url;
    }
    if let Some(timeout) = file.timeout {
        base.timeout = timeout;
    }
    if let Some(retry_count) = file.retry_count {
        base.retry_count = retry_count;
    }
    if let Some(cache_enabled) = file.cache_enabled {
        base.cache_enabled = cache_enabled;
    }
    if let Some(cache_ttl) = file.cache_ttl {
        base.cache_ttl = cache_ttl;
    }
    if let Some(log_level) = file.log_level {
        base.log_level = log_level;
    }
    if let Some(limit) = file.max_concurrent_requests {
        base.max_concurrent_requests = limit;
    }
    if let Some(client_type) = file.client_type {
        base.client_type = Some(client_type);
    }
    if let Some(workspace_id) = file.workspace_id {
        base.workspace_id = Some(workspace_id);
    }
    if let Some(team_id) = file.team_id {
        base.team_id = Some(team_id);
    }
    base
}
