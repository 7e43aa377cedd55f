//! Mock assistant service shared by the CLI and HTTP tests.

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use threadline_types::config::ChatConfig;

pub const ASSISTANT_ID: &str = "asst_test";
pub const THREAD_ID: &str = "thread_test";
pub const RUN_ID: &str = "run_test";

/// How the mocked run settles.
pub enum Script {
    /// `completed`, with an assistant message carrying `reply`.
    Reply(&'static str),
    /// The given terminal status and no assistant message.
    Silent(&'static str),
    /// The run never leaves `in_progress`.
    Stuck,
    /// Retrieving the assistant is rejected with 401.
    Unauthorized,
}

/// Config pointing at `server` with a short poll interval.
pub fn config_for(server: &MockServer) -> ChatConfig {
    ChatConfig {
        base_url: format!("{}/v1", server.uri()),
        poll_interval_ms: 10,
        run_timeout_secs: 5,
        ..ChatConfig::default()
    }
}

fn run(status: &str) -> Value {
    json!({"id": RUN_ID, "object": "thread.run", "thread_id": THREAD_ID, "status": status})
}

/// Start a mock Assistants API that plays `script`.
pub async fn mock_service(script: Script) -> MockServer {
    let server = MockServer::start().await;

    if let Script::Unauthorized = script {
        Mock::given(method("GET"))
            .and(path(format!("/v1/assistants/{ASSISTANT_ID}")))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;
        return server;
    }

    Mock::given(method("GET"))
        .and(path(format!("/v1/assistants/{ASSISTANT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ASSISTANT_ID, "name": "Test Assistant", "model": "gpt-4o"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": THREAD_ID})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/threads/{THREAD_ID}/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_user", "role": "user", "run_id": null, "created_at": 1, "content": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/threads/{THREAD_ID}/runs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(run("queued")))
        .mount(&server)
        .await;

    let (status, messages) = match script {
        Script::Reply(text) => (
            "completed",
            json!([{
                "id": "msg_reply", "role": "assistant", "run_id": RUN_ID, "created_at": 2,
                "content": [{"type": "text", "text": {"value": text, "annotations": []}}]
            }]),
        ),
        Script::Silent(status) => (status, json!([])),
        Script::Stuck => ("in_progress", json!([])),
        Script::Unauthorized => unreachable!("handled above"),
    };

    Mock::given(method("GET"))
        .and(path(format!("/v1/threads/{THREAD_ID}/runs/{RUN_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(run(status)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/threads/{THREAD_ID}/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": messages})))
        .mount(&server)
        .await;

    server
}
