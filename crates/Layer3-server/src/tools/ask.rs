//! The `deck/ask` tool
//!
//! Orchestrates the full answer pipeline: cache lookup, backend call through
//! the router and retry stack, cache store, and response formatting. Backend
//! failures are rendered as friendly text by category instead of propagating
//! to the dispatch layer.

use crate::schema::{FieldSpec, ToolSchema};
use crate::tool::{Tool, ToolContext, ToolMeta, ToolResponse};
use async_trait::async_trait;
use deck_foundation::cache::request_key;
use deck_foundation::types::{Priority, QueryRequest, QueryResponse};
use deck_foundation::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

/// TTL for cached answers, in seconds
const ANSWER_CACHE_TTL: u64 = 300;

const DESCRIPTION: &str = "\
Ask the digital workforce a question and get a professional answer.

This is the core QueryDeck tool. It routes each question to the \
best-matching employee profile, answers with confidence and source \
citations, and caches repeated questions for fast responses.

Suited for:
- Technical questions and code review
- Business strategy and analysis
- Creative and UX direction
- Data analysis and insights
- Project planning and coordination";

const SUGGESTIONS_FOOTER: &str = "\n\nSuggestions:\n\
- Check that the question is clear and specific\n\
- Try providing more context\n\
- Break a complex question into smaller steps";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AskArgs {
    question: String,

    context: Option<String>,

    #[serde(default)]
    priority: Priority,

    employee_id: Option<String>,

    capabilities: Option<Vec<String>>,

    #[serde(default = "default_true")]
    use_cache: bool,

    #[serde(default)]
    include_metadata: bool,
}

fn default_true() -> bool {
    true
}

pub struct AskTool {
    schema: ToolSchema,
}

impl AskTool {
    pub fn new() -> Self {
        let schema = ToolSchema::new()
            .field(
                FieldSpec::string("question")
                    .required()
                    .min_len(1)
                    .max_len(4000)
                    .describe("The question to ask"),
            )
            .field(
                FieldSpec::string("context")
                    .max_len(8000)
                    .describe("Extra context that helps the employee answer"),
            )
            .field(
                FieldSpec::string("priority")
                    .one_of(["low", "normal", "high"])
                    .describe("Request priority, defaults to normal"),
            )
            .field(
                FieldSpec::string("employeeId")
                    .describe("Pin a specific employee instead of automatic routing"),
            )
            .field(
                FieldSpec::array("capabilities")
                    .one_of([
                        "code-review",
                        "architecture",
                        "business",
                        "creative",
                        "analysis",
                        "support",
                    ])
                    .describe("Required capability tags used for routing"),
            )
            .field(
                FieldSpec::boolean("useCache")
                    .describe("Set to false to force a fresh backend request"),
            )
            .field(
                FieldSpec::boolean("includeMetadata")
                    .describe("Include processing details in the answer"),
            );

        Self { schema }
    }

    /// Cache-check, backend call, cache-store
    async fn answer(&self, args: &AskArgs, ctx: &ToolContext) -> Result<(QueryResponse, bool)> {
        let mut request = QueryRequest::new(args.question.clone());
        request.context = args.context.clone();
        request.priority = args.priority;
        request.employee_id = args.employee_id.clone();
        request.capabilities = args.capabilities.clone();
        request.metadata = Some(
            [
                ("requestId".to_string(), json!(ctx.request_id)),
                ("toolName".to_string(), json!("deck/ask")),
                (
                    "timestamp".to_string(),
                    json!(chrono::Utc::now().to_rfc3339()),
                ),
            ]
            .into_iter()
            .collect(),
        );

        if !args.use_cache {
            return Ok((ctx.api.process_request(request).await?, false));
        }

        let key = request_key(
            &args.question,
            args.context.as_deref(),
            args.employee_id.as_deref(),
            args.capabilities.as_deref(),
        );

        if let Some(value) = ctx.cache.get(&key).await {
            match serde_json::from_value::<QueryResponse>(value) {
                Ok(response) => {
                    debug!(request_id = %ctx.request_id, %key, "Using cached response");
                    return Ok((response, true));
                }
                Err(e) => warn!(%key, "Discarding undecodable cache entry: {}", e),
            }
        }

        let response = ctx.api.process_request(request).await?;
        if let Ok(value) = serde_json::to_value(&response) {
            ctx.cache.set(&key, value, Some(ANSWER_CACHE_TTL)).await;
            debug!(request_id = %ctx.request_id, %key, "Response cached");
        }

        Ok((response, false))
    }
}

impl Default for AskTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AskTool {
    fn name(&self) -> &str {
        "deck/ask"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta {
            category: "core".to_string(),
            tags: vec![
                "qa".to_string(),
                "routing".to_string(),
                "cache".to_string(),
            ],
            version: "1.0.0".to_string(),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResponse> {
        let started = Instant::now();
        let args: AskArgs =
            serde_json::from_value(args).map_err(|e| Error::Validation(e.to_string()))?;

        let preview: String = args.question.chars().take(100).collect();
        info!(
            request_id = %ctx.request_id,
            question = %preview,
            priority = ?args.priority,
            use_cache = args.use_cache,
            "deck/ask called"
        );

        match self.answer(&args, ctx).await {
            Ok((response, cached)) => {
                let execution_ms = started.elapsed().as_millis() as u64;
                info!(
                    request_id = %ctx.request_id,
                    employee = %response.employee_name,
                    confidence = response.confidence,
                    cached,
                    execution_ms,
                    "deck/ask completed"
                );
                Ok(success_response(
                    &response,
                    args.include_metadata,
                    cached,
                    execution_ms,
                ))
            }
            Err(e) => {
                let execution_ms = started.elapsed().as_millis() as u64;
                warn!(
                    request_id = %ctx.request_id,
                    error = %e,
                    execution_ms,
                    "deck/ask failed"
                );
                Ok(failure_response(&e, execution_ms))
            }
        }
    }
}

/// Render a successful answer
fn success_response(
    response: &QueryResponse,
    include_metadata: bool,
    cached: bool,
    execution_ms: u64,
) -> ToolResponse {
    let mut formatted = response.answer.clone();

    formatted.push_str(&format!(
        "\n\n---\nAnswered by: {}",
        response.employee_name
    ));
    if response.confidence > 0.0 {
        formatted.push_str(&format!(
            " | Confidence: {}%",
            (response.confidence * 100.0).round() as u32
        ));
    }
    if cached {
        formatted.push_str(" | Cached response");
    }

    if include_metadata {
        formatted.push_str("\n\nDetails:");
        formatted.push_str(&format!("\n- Processing time: {execution_ms}ms"));
        formatted.push_str(&format!("\n- Model: {}", response.metadata.model));
        formatted.push_str(&format!(
            "\n- Tokens: {} in / {} out",
            response.metadata.tokens.input, response.metadata.tokens.output
        ));
        formatted.push_str(&format!("\n- Employee ID: {}", response.employee_id));
    }

    if let Some(suggestions) = response.suggestions.as_deref().filter(|s| !s.is_empty()) {
        formatted.push_str("\n\nSuggestions:\n");
        formatted.push_str(
            &suggestions
                .iter()
                .map(|s| format!("- {s}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    let mut result = ToolResponse::text(formatted);

    if let Some(sources) = response.sources.as_deref().filter(|s| !s.is_empty()) {
        let listing = sources
            .iter()
            .map(|source| {
                format!(
                    "- [{}]({}) - {}",
                    source.title,
                    source.url.as_deref().unwrap_or("#"),
                    source.excerpt
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        result.push_text(format!("\n\nSources:\n{listing}"));
    }

    if let Some(related) = response.related_questions.as_deref().filter(|q| !q.is_empty()) {
        let listing = related
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n");
        result.push_text(format!("\n\nRelated questions:\n{listing}"));
    }

    result.with_metadata(json!({
        "executionTime": execution_ms,
        "employeeId": response.employee_id,
        "cached": cached,
        "suggestions": response.suggestions,
    }))
}

/// Render a failed call as friendly text, mapped by error category
fn failure_response(error: &Error, execution_ms: u64) -> ToolResponse {
    let message = match error {
        Error::Timeout(_) => {
            "The request timed out. Please retry, or simplify your question.".to_string()
        }
        Error::RateLimited(_) => "Too many requests right now. Please retry later.".to_string(),
        Error::Authentication(_) => {
            "API authentication failed. Please check the server configuration.".to_string()
        }
        Error::Validation(message) => format!("Validation failed: {message}"),
        other => format!("Processing failed: {other}"),
    };

    ToolResponse::text(format!("{message}{SUGGESTIONS_FOOTER}")).with_metadata(json!({
        "executionTime": execution_ms,
        "cached": false,
        "error": true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_foundation::types::{ResponseMetadata, Source, TokenCounts};

    fn response() -> QueryResponse {
        QueryResponse {
            answer: "Use an index.".to_string(),
            employee_id: "emp-1".to_string(),
            employee_name: "Ada".to_string(),
            confidence: 0.87,
            sources: None,
            suggestions: None,
            related_questions: None,
            metadata: ResponseMetadata {
                processing_time: 120,
                model: "deck-large".to_string(),
                tokens: TokenCounts {
                    input: 10,
                    output: 20,
                },
            },
        }
    }

    #[test]
    fn test_success_formatting() {
        let result = success_response(&response(), false, false, 42);
        let text = result.content[0].as_text();

        assert!(text.starts_with("Use an index."));
        assert!(text.contains("Answered by: Ada"));
        assert!(text.contains("Confidence: 87%"));
        assert!(!text.contains("Cached response"));
        assert!(!text.contains("Details:"));
    }

    #[test]
    fn test_cached_marker_and_metadata_block() {
        let result = success_response(&response(), true, true, 3);
        let text = result.content[0].as_text();

        assert!(text.contains("Cached response"));
        assert!(text.contains("Details:"));
        assert!(text.contains("Model: deck-large"));
        assert!(text.contains("Tokens: 10 in / 20 out"));

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata["cached"], true);
        assert_eq!(metadata["employeeId"], "emp-1");
    }

    #[test]
    fn test_sources_and_related_questions_become_blocks() {
        let mut r = response();
        r.sources = Some(vec![Source {
            source_type: "document".to_string(),
            title: "Indexing guide".to_string(),
            url: Some("https://docs.example.com/idx".to_string()),
            excerpt: "covering indexes".to_string(),
        }]);
        r.related_questions = Some(vec!["What about composite keys?".to_string()]);

        let result = success_response(&r, false, false, 1);
        assert_eq!(result.content.len(), 3);
        assert!(result.content[1].as_text().contains("Indexing guide"));
        assert!(result.content[2]
            .as_text()
            .contains("What about composite keys?"));
    }

    #[test]
    fn test_failure_messages_by_category() {
        let timeout = failure_response(&Error::Timeout("t".into()), 1);
        assert!(timeout.content[0].as_text().contains("retry, or simplify"));

        let rate = failure_response(&Error::RateLimited("r".into()), 1);
        assert!(rate.content[0].as_text().contains("retry later"));

        let auth = failure_response(&Error::Authentication("a".into()), 1);
        assert!(auth.content[0].as_text().contains("check the server configuration"));

        let other = failure_response(&Error::Internal("boom".into()), 1);
        assert!(other.content[0].as_text().contains("Processing failed"));

        // every failure carries the suggestions footer and the error flag
        for response in [timeout, rate, auth, other] {
            assert!(response.content[0].as_text().contains("Suggestions:"));
            assert_eq!(response.metadata.unwrap()["error"], true);
        }
    }
}
