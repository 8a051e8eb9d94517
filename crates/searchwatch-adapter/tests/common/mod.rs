/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for searchwatch-adapter tests

use searchwatch_adapter::{ClientConfig, Credentials, SearchwatchClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Mock API key for testing
pub fn mock_api_key() -> String {
    "sk-test-0123456789".to_string()
}

/// Client pointed at the mock server with the mock key installed
pub fn authed_client(server: &MockServer) -> SearchwatchClient {
    SearchwatchClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
        .with_credentials(Credentials {
            api_key: mock_api_key(),
        })
}

/// Execution body as the backend returns it
pub fn execution_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "task_id": "t1",
        "status": status,
        "started_at": "2026-09-02T09:00:00Z",
        "completed_at": if status == "success" || status == "failed" {
            serde_json::Value::from("2026-09-02T09:00:04Z")
        } else {
            serde_json::Value::Null
        },
        "condition_met": status == "success",
        "result": if status == "success" {
            serde_json::json!({"answer": "Tickets go on sale Friday", "grounding_sources": []})
        } else {
            serde_json::Value::Null
        },
        "error_message": if status == "failed" {
            serde_json::Value::from("Search backend returned no results")
        } else {
            serde_json::Value::Null
        }
    })
}
