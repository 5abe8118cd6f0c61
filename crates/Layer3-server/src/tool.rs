//! Tool interface and per-call execution context

use crate::schema::ToolSchema;
use async_trait::async_trait;
use deck_foundation::{BackendClient, Cache, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Tool metadata beyond name and description
#[derive(Debug, Clone)]
pub struct ToolMeta {
    pub category: String,
    pub tags: Vec<String>,
    pub version: String,
}

impl Default for ToolMeta {
    fn default() -> Self {
        Self {
            category: "general".to_string(),
            tags: Vec::new(),
            version: "1.0.0".to_string(),
        }
    }
}

/// A named, schema-validated operation exposed to protocol callers
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, validated on registration
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Declared argument schema; drives validation and `tools/list`
    fn schema(&self) -> &ToolSchema;

    fn meta(&self) -> ToolMeta {
        ToolMeta::default()
    }

    /// Execute with already-validated arguments
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResponse>;
}

/// Per-call execution context handed to tool handlers
///
/// Carries the fresh request id plus the shared collaborators; handlers hold
/// no global state.
pub struct ToolContext {
    pub request_id: String,
    pub client_type: Option<String>,
    pub workspace_id: Option<String>,
    pub team_id: Option<String>,
    pub api: Arc<dyn BackendClient>,
    pub cache: Arc<dyn Cache>,
}

/// One piece of protocol response content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Content::Text { text } => text,
        }
    }
}

/// Result produced by a tool handler
#[derive(Debug, Clone, Default)]
pub struct ToolResponse {
    pub content: Vec<Content>,
    pub metadata: Option<Value>,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            metadata: None,
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.content.push(Content::text(text));
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_serializes_to_wire_shape() {
        let content = Content::text("hello");
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({"type": "text", "text": "hello"})
        );
    }

    #[test]
    fn test_response_builders() {
        let mut response = ToolResponse::text("first").with_metadata(json!({"cached": true}));
        response.push_text("second");

        assert_eq!(response.content.len(), 2);
        assert_eq!(response.content[1].as_text(), "second");
        assert_eq!(response.metadata.unwrap()["cached"], true);
    }
}
