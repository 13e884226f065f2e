//! Integration tests for the OpenAI client against a mock HTTP server.
//!
//! Run with: cargo test --test openai_api

use tolmach::config::Config;
use tolmach::openai::{Completion, Error, Message, OpenAiClient};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> OpenAiClient {
    let config = Config::from_lookup(|name| match name {
        "SOURCE_LANGUAGE" => Some("ru".to_string()),
        "BOT_TOKEN_RU" => Some("123456789:ABCdef".to_string()),
        "OPENAI_TOKEN" => Some("sk-test".to_string()),
        "OPENAI_BASE_URL" => Some(base_url.to_string()),
        _ => None,
    })
    .expect("test config");
    OpenAiClient::new(&config)
}

#[tokio::test]
async fn complete_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "translate"},
                {"role": "user", "content": "Привет"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Zdravo"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "Ćao"}, "finish_reason": "stop"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .complete(&[Message::system("translate"), Message::user("Привет")])
        .await;

    assert_eq!(result.unwrap(), "Zdravo");
}

#[tokio::test]
async fn complete_surfaces_service_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "rate limited", "type": "requests", "code": null}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.complete(&[Message::user("Привет")]).await.unwrap_err();

    assert!(matches!(err, Error::Api(_)));
    assert_eq!(err.to_string(), "rate limited");
}

#[tokio::test]
async fn complete_without_choices_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.complete(&[Message::user("Привет")]).await.unwrap_err();

    assert!(matches!(err, Error::Empty));
}

#[tokio::test]
async fn complete_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.complete(&[Message::user("Привет")]).await.unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn transcribe_posts_multipart_with_language() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("name=\"model\""))
        .and(body_string_contains("whisper-1"))
        .and(body_string_contains("name=\"language\""))
        .and(body_string_contains("filename=\"voice.oga\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "Привет"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let transcript = client
        .transcribe(b"OggS\0fake".to_vec(), "voice.oga", "ru")
        .await
        .unwrap();

    assert_eq!(transcript, "Привет");
}

#[tokio::test]
async fn transcribe_error_without_envelope_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .transcribe(b"OggS\0fake".to_vec(), "voice.oga", "sr")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "500 Internal Server Error: boom");
}
