//! # deck-foundation
//!
//! Foundation layer for QueryDeck:
//! - Error: central error taxonomy with protocol-facing codes
//! - Config: environment + file configuration with load-time validation
//! - Types: wire types shared with the backend (employees, envelopes)
//! - Traits: the `BackendClient` seam implemented by Layer2
//! - Cache: TTL cache, key generation, startup warm-up

pub mod cache;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::{load_config, DeckConfig};

// ============================================================================
// Types
// ============================================================================
pub use types::{
    CapabilityLevel, Employee, EmployeeCapability, EmployeeStatus, HealthState, HealthStatus,
    Priority, QueryRequest, QueryResponse, ResponseMetadata, Source, TokenCounts,
};

// ============================================================================
// Traits
// ============================================================================
pub use traits::BackendClient;

// ============================================================================
// Cache
// ============================================================================
pub use cache::{
    create_cache, employee_key, employee_list_key, health_key, request_key, Cache, CacheWarmer,
    MemoryCache, NoopCache,
};
