//! `/chat` contract tests.
//!
//! These tests run the HTTP client, and a full session on top of it, against
//! a mock server to pin down:
//! - the request body (message plus full history, `model` role on the wire)
//! - reply parsing
//! - how non-2xx, malformed bodies and timeouts surface

use std::sync::Arc;
use std::time::Duration;

use palaver_engine::speech::SilentSpeech;
use palaver_engine::{
    drain_events, AssistantClient, ChannelSurface, HttpAssistantClient, Role, SessionController,
    SurfaceEvent, Turn, TurnOutcome, DEFAULT_WELCOME_MESSAGE, REPLY_ERROR_MESSAGE,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpAssistantClient {
    HttpAssistantClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Request format
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_carries_message_and_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "message": "Alice",
            "history": [
                {"role": "model", "parts": [{"text": "Hi there!"}]},
                {"role": "user", "parts": [{"text": "Alice"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Hello Alice"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let history = vec![Turn::assistant("Hi there!"), Turn::user("Alice")];
    let reply = client_for(&mock_server).send("Alice", history).await;

    assert_eq!(reply.unwrap(), Turn::assistant("Hello Alice"));
}

#[tokio::test]
async fn test_trailing_slash_in_server_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/", mock_server.uri());
    let client = HttpAssistantClient::new(&url, Duration::from_secs(5)).unwrap();
    assert!(client.send("ping", vec![Turn::user("ping")]).await.is_ok());
}

// ────────────────────────────────────────────────────────────────────────────
// Failure handling
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"reply": "ignored"})))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .send("Bob", vec![Turn::user("Bob")])
        .await
        .unwrap_err();
    assert!(err.detail().contains("500"));
}

#[tokio::test]
async fn test_wrong_shape_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Hello"})))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .send("Hi", vec![Turn::user("Hi")])
        .await
        .unwrap_err();
    assert!(err.detail().contains("malformed"));
}

#[tokio::test]
async fn test_non_json_body_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .send("Hi", vec![Turn::user("Hi")])
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"reply": "too late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = HttpAssistantClient::new(&mock_server.uri(), Duration::from_millis(200)).unwrap();
    let err = client
        .send("Hi", vec![Turn::user("Hi")])
        .await
        .unwrap_err();
    assert!(err.detail().contains("timed out"));
}

#[tokio::test]
async fn test_unreachable_server_is_a_failure() {
    // Nothing listens on the discard port
    let client = HttpAssistantClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    assert!(client.send("Hi", vec![Turn::user("Hi")]).await.is_err());
}

// ────────────────────────────────────────────────────────────────────────────
// Full session over HTTP
// ────────────────────────────────────────────────────────────────────────────

fn session_for(server: &MockServer) -> (SessionController, tokio::sync::mpsc::UnboundedReceiver<SurfaceEvent>) {
    let (surface, events) = ChannelSurface::new();
    let surface = Arc::new(surface);
    let controller = SessionController::new(
        Arc::new(client_for(server)),
        surface.clone(),
        surface,
        Arc::new(SilentSpeech),
    );
    (controller, events)
}

#[tokio::test]
async fn test_alice_conversation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({"message": "Alice"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"reply": "Nice to meet you, Alice!"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (mut controller, mut events) = session_for(&mock_server);
    controller.initialize_session();
    let outcome = controller.submit_turn("Alice").await;

    assert!(matches!(outcome, TurnOutcome::Replied(_)));
    assert_eq!(
        controller.history().snapshot(),
        vec![
            Turn::assistant(DEFAULT_WELCOME_MESSAGE),
            Turn::user("Alice"),
            Turn::assistant("Nice to meet you, Alice!"),
        ]
    );

    let received = &mock_server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&received.body).unwrap();
    assert_eq!(body["history"][0]["role"], "model");
    assert_eq!(body["history"][1]["parts"][0]["text"], "Alice");

    assert!(drain_events(&mut events).contains(&SurfaceEvent::MessageAppended {
        text: "Nice to meet you, Alice!".into(),
        sender: Role::Assistant,
    }));
}

#[tokio::test]
async fn test_bob_conversation_with_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (mut controller, mut events) = session_for(&mock_server);
    controller.initialize_session();
    let outcome = controller.submit_turn("Bob").await;

    assert!(matches!(outcome, TurnOutcome::Failed(_)));
    assert_eq!(controller.history().last(), Some(&Turn::user("Bob")));

    let events = drain_events(&mut events);
    assert!(events.contains(&SurfaceEvent::MessageAppended {
        text: REPLY_ERROR_MESSAGE.into(),
        sender: Role::Assistant,
    }));
    assert_eq!(events.last(), Some(&SurfaceEvent::InputEnabled(true)));
}
