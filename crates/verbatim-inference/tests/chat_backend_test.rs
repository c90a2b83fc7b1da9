//! Integration tests for the OpenAI-compatible chat backend against a mock server.

use verbatim_inference::chat::{ChatBackend, ChatTurn, OpenAiChatBackend, OpenAiChatConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String) -> OpenAiChatConfig {
    OpenAiChatConfig {
        base_url,
        api_key: "test-key".to_string(),
        model: "gpt-4o-mini".to_string(),
        max_tokens: 1000,
        temperature: 0.7,
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn test_complete_returns_assistant_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Two speakers talked."},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiChatBackend::new(test_config(server.uri())).unwrap();
    let messages = vec![
        ChatTurn::system("You analyze transcripts."),
        ChatTurn::user("How many speakers?"),
    ];
    let reply = backend.complete(&messages).await.unwrap();
    assert_eq!(reply, "Two speakers talked.");
}

#[tokio::test]
async fn test_complete_sends_model_and_history() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(move |request: &wiremock::Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            assert_eq!(body["model"], "gpt-4o-mini");
            assert_eq!(body["max_tokens"], 1000);
            let messages = body["messages"].as_array().unwrap();
            assert_eq!(messages.len(), 3);
            assert_eq!(messages[0]["role"], "system");
            assert_eq!(messages[2]["role"], "user");
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-2",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "ok"},
                    "finish_reason": "stop"
                }]
            }))
        })
        .mount(&server)
        .await;

    let backend = OpenAiChatBackend::new(test_config(server.uri())).unwrap();
    let messages = vec![
        ChatTurn::system("sys"),
        ChatTurn {
            role: "assistant".to_string(),
            content: "earlier answer".to_string(),
        },
        ChatTurn::user("follow-up"),
    ];
    assert_eq!(backend.complete(&messages).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_provider_error_message_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let backend = OpenAiChatBackend::new(test_config(server.uri())).unwrap();
    let err = backend.complete(&[ChatTurn::user("hi")]).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Chat provider error"), "got: {msg}");
    assert!(msg.contains("Incorrect API key provided"), "got: {msg}");
}

#[tokio::test]
async fn test_empty_choices_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-3",
            "choices": []
        })))
        .mount(&server)
        .await;

    let backend = OpenAiChatBackend::new(test_config(server.uri())).unwrap();
    let err = backend.complete(&[ChatTurn::user("hi")]).await.unwrap_err();
    assert!(err.to_string().contains("no choices"));
}
