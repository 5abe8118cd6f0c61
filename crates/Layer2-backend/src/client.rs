//! Backend HTTP client

use crate::error::BackendError;
use crate::retry::{with_retry, RetryConfig};
use crate::router::EmployeeRouter;
use async_trait::async_trait;
use deck_foundation::types::{Employee, HealthStatus, QueryRequest, QueryResponse};
use deck_foundation::{DeckConfig, Result};
use parking_lot::RwLock;
use reqwest::Method;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Fixed timeout for health probes, independent of the request timeout
const HEALTH_CHECK_TIMEOUT_MS: u64 = 5000;

/// HTTP client for the QueryDeck backend
///
/// Wraps every remote call in retry with exponential backoff and classifies
/// non-success responses once per failed attempt. Routing state (the most
/// recently fetched employee list) lives here and is replaced wholesale by
/// `list_employees`.
pub struct DeckApiClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
    config: DeckConfig,
    retry: RetryConfig,
    router: RwLock<EmployeeRouter>,
}

#[derive(Debug, Deserialize)]
struct EmployeeListBody {
    #[serde(default)]
    employees: Vec<Employee>,
}

#[derive(Debug, Deserialize)]
struct EmployeeBody {
    employee: Employee,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    message: Option<String>,
}

impl DeckApiClient {
    pub fn new(config: DeckConfig) -> Self {
        let base_url = config.server_url.trim_end_matches('/').to_string();
        let user_agent = format!(
            "QueryDeck-MCP-Client/{} ({})",
            env!("CARGO_PKG_VERSION"),
            config.client_type.as_deref().unwrap_or("unknown")
        );
        let retry = RetryConfig::with_max_retries(config.retry_count);

        Self {
            http: reqwest::Client::new(),
            base_url,
            user_agent,
            config,
            retry,
            // Starts empty; populated on the first employee-list fetch
            router: RwLock::new(EmployeeRouter::empty()),
        }
    }

    /// Override retry behavior (primarily for tests)
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Pick an employee id for a question using the current routing state
    ///
    /// Returns `None` until an employee list has been fetched, in which case
    /// the remote call proceeds without an id and the backend applies its
    /// own default.
    pub fn select_employee(
        &self,
        question: &str,
        context: Option<&str>,
        capabilities: Option<&[String]>,
    ) -> Option<String> {
        self.router
            .read()
            .select_best(question, context, capabilities)
            .map(|employee| employee.id.clone())
    }

    /// Number of profiles in the current routing set
    pub fn routing_set_len(&self) -> usize {
        self.router.read().len()
    }

    async fn attempt_process(
        &self,
        mut request: QueryRequest,
    ) -> std::result::Result<QueryResponse, BackendError> {
        if request.employee_id.is_none() {
            request.employee_id = self.select_employee(
                &request.question,
                request.context.as_deref(),
                request.capabilities.as_deref(),
            );
        }

        let metadata = request.metadata.get_or_insert_with(Default::default);
        if let Some(client_type) = &self.config.client_type {
            metadata.insert("clientType".to_string(), client_type.clone().into());
        }
        if let Some(workspace_id) = &self.config.workspace_id {
            metadata.insert("workspaceId".to_string(), workspace_id.clone().into());
        }
        if let Some(team_id) = &self.config.team_id {
            metadata.insert("teamId".to_string(), team_id.clone().into());
        }
        metadata.insert(
            "timestamp".to_string(),
            chrono::Utc::now().to_rfc3339().into(),
        );

        let response = self
            .request(Method::POST, "/v1/chat/completions", Some(&request), None)
            .await?;

        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    /// Perform one HTTP attempt with a per-attempt timeout
    async fn request<B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        timeout_ms: Option<u64>,
    ) -> std::result::Result<reqwest::Response, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let timeout = timeout_ms.unwrap_or(self.config.timeout);

        let mut builder = self
            .http
            .request(method, &url)
            .timeout(Duration::from_millis(timeout))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(format!("Request timeout after {timeout}ms"))
            } else {
                BackendError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_http_status(status.as_u16(), &body));
        }

        Ok(response)
    }
}

#[async_trait]
impl deck_foundation::BackendClient for DeckApiClient {
    async fn process_request(&self, request: QueryRequest) -> Result<QueryResponse> {
        let preview: String = request.question.chars().take(100).collect();
        debug!(question = %preview, priority = ?request.priority, "Processing request");

        let response = with_retry(&self.retry, "process_request", || {
            let request = request.clone();
            async move { self.attempt_process(request).await }
        })
        .await?;

        debug!(
            employee_id = %response.employee_id,
            processing_time = response.metadata.processing_time,
            "Request completed"
        );

        Ok(response)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>> {
        debug!("Fetching employee list");

        let employees = with_retry(&self.retry, "list_employees", || async move {
            let response = self
                .request::<()>(Method::GET, "/v1/employees", None, None)
                .await?;
            response
                .json::<EmployeeListBody>()
                .await
                .map(|body| body.employees)
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))
        })
        .await?;

        // Replace the routing set wholesale; no incremental merge
        *self.router.write() = EmployeeRouter::new(employees.clone());
        info!(count = employees.len(), "Employee list updated");

        Ok(employees)
    }

    async fn get_employee(&self, id: &str) -> Result<Employee> {
        debug!(employee_id = %id, "Fetching employee");
        let path = format!("/v1/employees/{id}");

        let employee = with_retry(&self.retry, "get_employee", || {
            let path = path.clone();
            async move {
                let response = self.request::<()>(Method::GET, &path, None, None).await?;
                response
                    .json::<EmployeeBody>()
                    .await
                    .map(|body| body.employee)
                    .map_err(|e| BackendError::InvalidResponse(e.to_string()))
            }
        })
        .await?;

        Ok(employee)
    }

    async fn health_check(&self) -> HealthStatus {
        let result = self
            .request::<()>(
                Method::GET,
                "/v1/health",
                None,
                Some(HEALTH_CHECK_TIMEOUT_MS),
            )
            .await;

        match result {
            Ok(response) => {
                let message = response
                    .json::<HealthBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_else(|| "API connection healthy".to_string());
                HealthStatus::ok(message)
            }
            Err(e) => HealthStatus::error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeckConfig {
        DeckConfig {
            api_key: "sk-test".to_string(),
            server_url: "https://api.example.com/".to_string(),
            client_type: Some("cursor".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = DeckApiClient::new(config());
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn test_user_agent_includes_client_type() {
        let client = DeckApiClient::new(config());
        assert!(client.user_agent.starts_with("QueryDeck-MCP-Client/"));
        assert!(client.user_agent.ends_with("(cursor)"));
    }

    #[test]
    fn test_selection_before_any_fetch_returns_none() {
        let client = DeckApiClient::new(config());
        assert!(client.select_employee("question", None, None).is_none());
        assert_eq!(client.routing_set_len(), 0);
    }
}
