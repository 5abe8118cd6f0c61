//! Core trait seams
//!
//! The backend client interface is defined here so the dispatch server can
//! depend on the seam rather than on the HTTP implementation one layer up.

use crate::types::{Employee, HealthStatus, QueryRequest, QueryResponse};
use crate::Result;
use async_trait::async_trait;

/// Remote question-answering backend
///
/// Implemented by the Layer2 HTTP client; test suites substitute mocks.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Process a question, applying responder routing and retry
    async fn process_request(&self, request: QueryRequest) -> Result<QueryResponse>;

    /// Fetch the employee list, replacing the router's working set
    async fn list_employees(&self) -> Result<Vec<Employee>>;

    /// Fetch a single employee profile
    async fn get_employee(&self, id: &str) -> Result<Employee>;

    /// Connectivity probe; reports failures instead of erroring
    async fn health_check(&self) -> HealthStatus;
}
