//! HTTP-level client tests against a stubbed backend

use deck_backend::{DeckApiClient, RetryConfig};
use deck_foundation::types::{Priority, QueryRequest};
use deck_foundation::{BackendClient, DeckConfig, Error};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> DeckConfig {
    DeckConfig {
        api_key: "sk-test".to_string(),
        server_url: server.uri(),
        timeout: 5_000,
        retry_count: 2,
        client_type: Some("cursor".to_string()),
        ..Default::default()
    }
}

/// Millisecond-scale backoff so retry tests stay fast
fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_delay_ms: 1,
        backoff_multiplier: 2.0,
        max_delay_ms: 10,
    }
}

fn answer_body() -> serde_json::Value {
    json!({
        "answer": "Use an index.",
        "employeeId": "emp-1",
        "employeeName": "Ada",
        "confidence": 0.92,
        "metadata": {
            "processingTime": 150,
            "model": "deck-large",
            "tokens": {"input": 20, "output": 40}
        }
    })
}

#[tokio::test]
async fn test_process_request_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server));
    let mut request = QueryRequest::new("how do I speed up this query?");
    request.priority = Priority::High;

    let response = client.process_request(request).await.unwrap();
    assert_eq!(response.answer, "Use an index.");
    assert_eq!(response.employee_name, "Ada");
}

#[tokio::test]
async fn test_rate_limit_exhausts_retry_budget() {
    let server = MockServer::start().await;

    // retry_count = 2 -> exactly 3 attempts
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"message": "too many requests"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server)).with_retry_config(fast_retry(2));
    let err = client
        .process_request(QueryRequest::new("q"))
        .await
        .unwrap_err();

    match err {
        Error::RateLimited(message) => assert_eq!(message, "too many requests"),
        other => panic!("expected rate limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_authentication_failure_is_also_retried() {
    let server = MockServer::start().await;

    // Uniform retry policy: 401 consumes the retry budget like any error
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad token"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server)).with_retry_config(fast_retry(2));
    let err = client
        .process_request(QueryRequest::new("q"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn test_server_error_carries_upstream_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "shard down",
            "code": "SHARD_DOWN"
        })))
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server)).with_retry_config(fast_retry(0));
    let err = client
        .process_request(QueryRequest::new("q"))
        .await
        .unwrap_err();

    match err {
        Error::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 503);
            assert_eq!(code, "SHARD_DOWN");
            assert_eq!(message, "shard down");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_employees_swaps_routing_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "employees": [
                {
                    "id": "emp-rust",
                    "name": "Ada",
                    "role": "technical-expert",
                    "expertise": ["rust"],
                    "capabilities": [],
                    "status": "active"
                },
                {
                    "id": "emp-sales",
                    "name": "Brian",
                    "role": "business-consultant",
                    "expertise": ["sales"],
                    "capabilities": [],
                    "status": "active"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server));
    assert_eq!(client.routing_set_len(), 0);

    let employees = client.list_employees().await.unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(client.routing_set_len(), 2);

    let selected = client.select_employee("a rust borrow checker question", None, None);
    assert_eq!(selected.as_deref(), Some("emp-rust"));
}

#[tokio::test]
async fn test_get_employee_unwraps_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/employees/emp-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "employee": {
                "id": "emp-1",
                "name": "Ada",
                "role": "technical-expert",
                "expertise": [],
                "capabilities": [],
                "status": "busy"
            }
        })))
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server));
    let employee = client.get_employee("emp-1").await.unwrap();
    assert_eq!(employee.name, "Ada");
}

#[tokio::test]
async fn test_health_check_reports_ok() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "all good"})))
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server));
    let health = client.health_check().await;
    assert!(health.is_ok());
    assert_eq!(health.message, "all good");
}

#[tokio::test]
async fn test_health_check_never_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = DeckApiClient::new(config_for(&server));
    let health = client.health_check().await;
    assert!(!health.is_ok());
    assert!(health.message.contains("500"));
}
