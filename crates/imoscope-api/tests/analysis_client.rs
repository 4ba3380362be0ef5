use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use imoscope_api::{AnalysisBackend, AnalysisClient};
use imoscope_types::{ChatError, ImageAttachment};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn test_image() -> ImageAttachment {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend_from_slice(&[0u8; 16]);
    ImageAttachment::new("cat.png", bytes).unwrap()
}

#[tokio::test]
async fn analyze_success_returns_session_and_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionId": "abc",
            "result": "A cat."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnalysisClient::new(server.uri());
    let response = client.analyze(&test_image(), "what is this?").await.unwrap();

    assert_eq!(response.session_id, "abc");
    assert_eq!(response.result, "A cat.");
}

#[tokio::test]
async fn analyze_failure_uses_server_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": "image too large"
        })))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(server.uri());
    let err = client.analyze(&test_image(), "what is this?").await.unwrap_err();

    assert_eq!(err, ChatError::Server("image too large".to_string()));
}

#[tokio::test]
async fn analyze_failure_without_body_falls_back_to_generic_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(server.uri());
    let err = client.analyze(&test_image(), "what is this?").await.unwrap_err();

    assert_eq!(
        err,
        ChatError::Server("Something went wrong on the server.".to_string())
    );
}

#[tokio::test]
async fn follow_up_sends_session_id_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/followup"))
        .and(body_json(json!({
            "sessionId": "abc",
            "prompt": "what color?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "Orange."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnalysisClient::new(server.uri());
    let response = client.follow_up("abc", "what color?").await.unwrap();

    assert_eq!(response.result, "Orange.");
}

#[tokio::test]
async fn follow_up_failure_maps_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/followup"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "unknown session"
        })))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(server.uri());
    let err = client.follow_up("gone", "still there?").await.unwrap_err();

    assert_eq!(err, ChatError::Server("unknown session".to_string()));
}

#[tokio::test]
async fn unreachable_host_maps_to_transport_error() {
    // RFC 2606 reserved TLD, guaranteed to fail DNS resolution.
    let client = AnalysisClient::new("http://imoscope.invalid");
    let err = client.follow_up("abc", "hello?").await.unwrap_err();

    assert!(matches!(err, ChatError::Transport(_)));
}

#[tokio::test]
async fn malformed_success_body_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(server.uri());
    let err = client.analyze(&test_image(), "what is this?").await.unwrap_err();

    assert!(matches!(err, ChatError::Server(_)));
}
