//! # deck-backend
//!
//! Backend API layer for QueryDeck:
//! - Client: HTTP calls to the question-answering backend with per-attempt
//!   timeouts and structured error classification
//! - Retry: exponential backoff applied uniformly to every remote call type
//! - Router: scores employee profiles against a question and picks the best
//!   responder before each call

pub mod client;
pub mod error;
pub mod retry;
pub mod router;

pub use client::DeckApiClient;
pub use error::BackendError;
pub use retry::{with_retry, RetryConfig};
pub use router::EmployeeRouter;
