//! Configuration types and loading

mod loader;
mod types;

pub use loader::{load_config, DEFAULT_CONFIG_FILE};
pub use types::{
    DeckConfig, DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_RETRY_COUNT,
    DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_MS,
};
