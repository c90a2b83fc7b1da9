//! Integration tests for the AssemblyAI backend against a mock server.

use std::time::Duration;

use verbatim_inference::transcription::{
    AssemblyAiBackend, AssemblyAiConfig, TranscriptionBackend,
};
use wiremock::matchers::{body_json_string, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate, Respond};

fn test_config(base_url: String) -> AssemblyAiConfig {
    AssemblyAiConfig {
        base_url,
        api_key: "test-key".to_string(),
        language_code: "fr".to_string(),
        poll_interval: Duration::from_millis(10),
        poll_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
    }
}

async fn mount_upload_and_submit(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/upload"))
        .and(header("authorization", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "upload_url": "https://cdn.example.com/upload/abc"
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/transcript"))
        .and(header("authorization", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-1",
            "status": "queued"
        })))
        .mount(server)
        .await;
}

/// Responds `processing` a fixed number of times, then a terminal payload.
struct EventualResponder {
    remaining: std::sync::atomic::AtomicUsize,
    terminal: serde_json::Value,
}

impl Respond for EventualResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        use std::sync::atomic::Ordering;
        if self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "job-1",
                "status": "processing"
            }))
        } else {
            ResponseTemplate::new(200).set_body_json(&self.terminal)
        }
    }
}

#[tokio::test]
async fn test_transcribe_polls_until_completed() {
    let server = MockServer::start().await;
    mount_upload_and_submit(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/transcript/job-1"))
        .respond_with(EventualResponder {
            remaining: std::sync::atomic::AtomicUsize::new(2),
            terminal: serde_json::json!({
                "id": "job-1",
                "status": "completed",
                "text": "A: Bonjour\nB: Salut",
                "utterances": [
                    {"speaker": "A", "text": "Bonjour", "start": 0, "end": 1200},
                    {"speaker": "B", "text": "Salut", "start": 1200, "end": 2000}
                ]
            }),
        })
        .mount(&server)
        .await;

    let backend = AssemblyAiBackend::new(test_config(server.uri())).unwrap();
    let result = backend.transcribe(b"fake-mp3-bytes", None).await.unwrap();

    assert_eq!(result.id, "job-1");
    assert_eq!(result.text, "A: Bonjour\nB: Salut");
    assert_eq!(result.utterances.len(), 2);
    assert_eq!(result.utterances[0].speaker, "A");
    assert_eq!(result.raw["status"], "completed");
}

#[tokio::test]
async fn test_transcribe_submits_diarization_and_language() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "upload_url": "https://cdn.example.com/upload/abc"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/transcript"))
        .and(body_json_string(
            serde_json::json!({
                "audio_url": "https://cdn.example.com/upload/abc",
                "speaker_labels": true,
                "language_code": "en"
            })
            .to_string(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-2",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/transcript/job-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-2",
            "status": "completed",
            "text": "hello"
        })))
        .mount(&server)
        .await;

    let backend = AssemblyAiBackend::new(test_config(server.uri())).unwrap();
    let result = backend.transcribe(b"bytes", Some("en")).await.unwrap();
    assert_eq!(result.text, "hello");
}

#[tokio::test]
async fn test_transcribe_error_status_surfaces_provider_message() {
    let server = MockServer::start().await;
    mount_upload_and_submit(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/transcript/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-1",
            "status": "error",
            "error": "audio duration too short"
        })))
        .mount(&server)
        .await;

    let backend = AssemblyAiBackend::new(test_config(server.uri())).unwrap();
    let err = backend.transcribe(b"bytes", None).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Transcription error"), "got: {msg}");
    assert!(msg.contains("audio duration too short"), "got: {msg}");
}

#[tokio::test]
async fn test_transcribe_times_out_on_stuck_job() {
    let server = MockServer::start().await;
    mount_upload_and_submit(&server).await;

    // Job never leaves `processing`.
    Mock::given(method("GET"))
        .and(path("/v2/transcript/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-1",
            "status": "processing"
        })))
        .mount(&server)
        .await;

    let mut config = test_config(server.uri());
    config.poll_interval = Duration::from_millis(20);
    config.poll_timeout = Duration::from_millis(100);

    let backend = AssemblyAiBackend::new(config).unwrap();
    let err = backend.transcribe(b"bytes", None).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Timed out"), "got: {msg}");
    assert!(msg.contains("job-1"), "got: {msg}");
}

#[tokio::test]
async fn test_upload_failure_is_transcription_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/upload"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad api key"))
        .mount(&server)
        .await;

    let backend = AssemblyAiBackend::new(test_config(server.uri())).unwrap();
    let err = backend.transcribe(b"bytes", None).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Upload returned 401"), "got: {msg}");
}
