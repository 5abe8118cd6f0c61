//! MCP dispatch server
//!
//! Protocol-facing component: answers `tools/list` and `tools/call` over a
//! line-delimited JSON-RPC stdio channel. Tool handler errors are converted
//! into error-flagged protocol content and never reach the protocol layer as
//! faults.

use crate::registry::{RegisterError, ToolRegistry};
use crate::rpc::{RpcError, RpcRequest, RpcResponse};
use crate::stats::{CallStats, StatsSnapshot};
use crate::tool::{Content, Tool, ToolContext, ToolResponse};
use deck_foundation::types::{HealthState, HealthStatus};
use deck_foundation::{BackendClient, Cache, DeckConfig, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info};

/// MCP protocol revision spoken on the wire
const PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "querydeck-mcp-server";

/// Tool summary returned by `tools/list`
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Wire result of one `tools/call`
#[derive(Debug, Clone, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

/// Health report combining backend, cache, and server state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHealth {
    pub status: HealthState,
    pub api: HealthStatus,
    pub cache_working: bool,
    pub server: StatsSnapshot,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// The tool dispatch server
pub struct DeckServer {
    registry: ToolRegistry,
    api: Arc<dyn BackendClient>,
    cache: Arc<dyn Cache>,
    config: DeckConfig,
    stats: CallStats,
}

impl DeckServer {
    pub fn new(config: DeckConfig, api: Arc<dyn BackendClient>, cache: Arc<dyn Cache>) -> Self {
        Self {
            registry: ToolRegistry::new(),
            api,
            cache,
            config,
            stats: CallStats::new(),
        }
    }

    /// Register one tool; must happen before serving starts
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> std::result::Result<(), RegisterError> {
        self.registry.register(tool)
    }

    /// Register the default tool set
    pub fn register_default_tools(&mut self) {
        for tool in crate::tools::default_tools() {
            let name = tool.name().to_string();
            if let Err(e) = self.register_tool(tool) {
                unreachable!("default tool '{name}' failed to register: {e}");
            }
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Describe every registered tool for `tools/list`
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        debug!(tool_count = self.registry.len(), "Listing tools");

        let mut descriptors: Vec<ToolDescriptor> = self
            .registry
            .all()
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.schema().to_json_schema(),
            })
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Dispatch one tool call
    ///
    /// Counters are incremented before lookup and validation, so they count
    /// attempted calls. Any error becomes a single error-flagged text block;
    /// this function never fails at the protocol level.
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        self.stats.record_attempt(name);

        info!(request_id = %request_id, tool = %name, "Tool call");

        let result = self.dispatch(name, args, &request_id).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                self.stats.record_success();
                info!(
                    request_id = %request_id,
                    tool = %name,
                    duration_ms,
                    success = true,
                    "Tool call completed"
                );
                CallToolResult {
                    content: response.content,
                    is_error: false,
                }
            }
            Err(e) => {
                self.stats.record_failure();
                error!(
                    request_id = %request_id,
                    tool = %name,
                    duration_ms,
                    error = %e,
                    "Tool call failed"
                );
                CallToolResult {
                    content: vec![Content::text(format!("Error [{}]: {}", e.code(), e))],
                    is_error: true,
                }
            }
        }
    }

    async fn dispatch(&self, name: &str, args: Value, request_id: &str) -> Result<ToolResponse> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        tool.schema()
            .validate(&args)
            .map_err(|violations| Error::Validation(violations.join(", ")))?;

        let ctx = ToolContext {
            request_id: request_id.to_string(),
            client_type: self.config.client_type.clone(),
            workspace_id: self.config.workspace_id.clone(),
            team_id: self.config.team_id.clone(),
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
        };

        tool.execute(args, &ctx).await
    }

    /// Backend health, cache self-test, and server statistics
    pub async fn health_check(&self) -> ServerHealth {
        let api = self.api.health_check().await;
        let cache_working = self.test_cache().await;

        let status = if api.is_ok() && cache_working {
            HealthState::Ok
        } else {
            HealthState::Error
        };

        ServerHealth {
            status,
            api,
            cache_working,
            server: self.stats.snapshot(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Round-trip a probe entry through the cache
    ///
    /// A disabled cache never stores, which is the configured behavior, so
    /// it passes the self-test.
    async fn test_cache(&self) -> bool {
        if !self.config.cache_enabled {
            return true;
        }

        let key = "health-check-test";
        self.cache.set(key, json!("ok"), Some(5)).await;
        let retrieved = self.cache.get(key).await;
        self.cache.delete(key).await;

        retrieved == Some(json!("ok"))
    }

    /// Verify backend connectivity, then serve the stdio channel
    ///
    /// A failed connectivity check is fatal: startup errors terminate the
    /// process, unlike per-call errors.
    pub async fn start(self: Arc<Self>) -> Result<()> {
        info!(
            server_url = %self.config.server_url,
            tools = self.registry.len(),
            cache_enabled = self.config.cache_enabled,
            "Starting QueryDeck MCP server"
        );

        let health = self.api.health_check().await;
        if !health.is_ok() {
            error!("Backend connection failed: {}", health.message);
            return Err(Error::api(
                503,
                "API_CONNECTION_FAILED",
                format!("Failed to connect to backend API: {}", health.message),
            ));
        }
        info!("Backend connection verified");

        self.serve_stdio().await
    }

    /// Serve line-delimited JSON-RPC until stdin closes
    ///
    /// `tools/call` requests run concurrently, bounded by the configured
    /// limit; responses from concurrent calls are serialized through one
    /// writer task, so output lines never interleave.
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let (tx, mut rx) = mpsc::channel::<String>(32);
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = rx.recv().await {
                if stdout.write_all(line.as_bytes()).await.is_err()
                    || stdout.write_all(b"\n").await.is_err()
                    || stdout.flush().await.is_err()
                {
                    break;
                }
            }
        });

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_requests));
        info!(name = SERVER_NAME, "MCP server ready on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request: RpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    debug!("Dropping unparseable request line: {}", e);
                    respond(&tx, RpcResponse::failure(Value::Null, RpcError::parse_error())).await;
                    continue;
                }
            };

            if request.is_notification() {
                debug!(method = %request.method, "Notification received");
                continue;
            }
            let id = request.id.clone().unwrap_or(Value::Null);
            let method = request.method.clone();

            match method.as_str() {
                "initialize" => {
                    let result = json!({
                        "protocolVersion": PROTOCOL_VERSION,
                        "capabilities": {"tools": {}},
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "version": env!("CARGO_PKG_VERSION"),
                        },
                    });
                    respond(&tx, RpcResponse::success(id, result)).await;
                }
                "ping" => {
                    respond(&tx, RpcResponse::success(id, json!({}))).await;
                }
                "tools/list" => {
                    let tools = self.list_tools();
                    respond(&tx, RpcResponse::success(id, json!({ "tools": tools }))).await;
                }
                "tools/call" => {
                    let server = Arc::clone(&self);
                    let semaphore = Arc::clone(&semaphore);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let _permit = semaphore.acquire_owned().await.ok();
                        let response = server.handle_tools_call(id, request.params).await;
                        respond(&tx, response).await;
                    });
                }
                other => {
                    respond(
                        &tx,
                        RpcResponse::failure(id, RpcError::method_not_found(other)),
                    )
                    .await;
                }
            }
        }

        drop(tx);
        let _ = writer.await;
        info!("stdin closed, MCP server stopped");
        Ok(())
    }

    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> RpcResponse {
        let Some(params) = params else {
            return RpcResponse::failure(id, RpcError::invalid_params("params are required"));
        };

        let call: CallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return RpcResponse::failure(
                    id,
                    RpcError::invalid_params(format!("invalid tool call params: {e}")),
                );
            }
        };

        let arguments = if call.arguments.is_null() {
            json!({})
        } else {
            call.arguments
        };

        let result = self.call_tool(&call.name, arguments).await;
        match serde_json::to_value(&result) {
            Ok(value) => RpcResponse::success(id, value),
            Err(e) => RpcResponse::failure(id, RpcError::internal_error(e.to_string())),
        }
    }
}

async fn respond(tx: &mpsc::Sender<String>, response: RpcResponse) {
    match serde_json::to_string(&response) {
        Ok(line) => {
            let _ = tx.send(line).await;
        }
        Err(e) => error!("Failed to serialize response: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, ToolSchema};
    use crate::tool::ToolMeta;
    use async_trait::async_trait;
    use deck_foundation::types::{Employee, QueryRequest, QueryResponse};
    use deck_foundation::NoopCache;

    struct StubBackend;

    #[async_trait]
    impl BackendClient for StubBackend {
        async fn process_request(&self, _request: QueryRequest) -> Result<QueryResponse> {
            Err(Error::Internal("no backend in this test".into()))
        }

        async fn list_employees(&self) -> Result<Vec<Employee>> {
            Ok(vec![])
        }

        async fn get_employee(&self, id: &str) -> Result<Employee> {
            Err(Error::api(404, "NOT_FOUND", format!("no employee {id}")))
        }

        async fn health_check(&self) -> HealthStatus {
            HealthStatus::ok("stubbed")
        }
    }

    struct EchoTool {
        schema: ToolSchema,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                schema: ToolSchema::new().field(FieldSpec::string("question").required().min_len(1)),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "test/echo"
        }

        fn description(&self) -> &str {
            "Echoes the question back"
        }

        fn schema(&self) -> &ToolSchema {
            &self.schema
        }

        fn meta(&self) -> ToolMeta {
            ToolMeta {
                category: "test".to_string(),
                ..Default::default()
            }
        }

        async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<ToolResponse> {
            let question = args["question"].as_str().unwrap_or_default();
            Ok(ToolResponse::text(format!("echo: {question}")))
        }
    }

    fn server() -> DeckServer {
        let config = DeckConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        let mut server = DeckServer::new(config, Arc::new(StubBackend), Arc::new(NoopCache));
        server.register_tool(Arc::new(EchoTool::new())).unwrap();
        server
    }

    #[tokio::test]
    async fn test_successful_call_updates_stats() {
        let server = server();

        let result = server
            .call_tool("test/echo", json!({"question": "hello"}))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.content[0].as_text(), "echo: hello");

        let stats = server.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_content_not_crash() {
        let server = server();

        let result = server.call_tool("does/not-exist", json!({})).await;

        assert!(result.is_error);
        assert!(result.content[0].as_text().contains("UNKNOWN_TOOL"));
        assert!(result.content[0].as_text().contains("does/not-exist"));

        let stats = server.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
    }

    #[tokio::test]
    async fn test_validation_error_names_missing_field() {
        let server = server();

        let result = server.call_tool("test/echo", json!({})).await;

        assert!(result.is_error);
        let text = result.content[0].as_text();
        assert!(text.contains("VALIDATION_ERROR"));
        assert!(text.contains("question"));
    }

    #[tokio::test]
    async fn test_list_tools_reports_schema() {
        let server = server();

        let tools = server.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "test/echo");
        assert_eq!(tools[0].input_schema["required"], json!(["question"]));
    }

    #[tokio::test]
    async fn test_health_check_reports_ok() {
        let server = server();

        let health = server.health_check().await;
        assert_eq!(health.status, HealthState::Ok);
        assert!(health.cache_working);
        assert!(health.api.is_ok());
    }
}
