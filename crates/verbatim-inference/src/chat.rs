//! Chat-completion backend trait and OpenAI-compatible implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use verbatim_core::defaults::{
    CHAT_MAX_TOKENS, CHAT_MODEL, CHAT_TEMPERATURE, ENV_OPENAI_API_KEY, ENV_OPENAI_BASE_URL,
    ENV_OPENAI_CHAT_MODEL, OPENAI_BASE_URL,
};
use verbatim_core::{ChatMessage, Error, Result};

/// One turn of a conversation as sent to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for ChatTurn {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Backend for chat completions.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a full message list and return the assistant's reply content.
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Configuration for the OpenAI-compatible chat backend.
#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model to use for completions.
    pub model: String,
    /// Completion token cap per exchange.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAiChatConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: String::new(),
            model: CHAT_MODEL.to_string(),
            max_tokens: CHAT_MAX_TOKENS,
            temperature: CHAT_TEMPERATURE,
            timeout_seconds: 120,
        }
    }
}

/// OpenAI-compatible chat-completion backend.
#[derive(Debug)]
pub struct OpenAiChatBackend {
    client: reqwest::Client,
    config: OpenAiChatConfig,
}

// Wire types for the /chat/completions endpoint.

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatTurn,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

impl OpenAiChatBackend {
    pub fn new(config: OpenAiChatConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config(format!("{ENV_OPENAI_API_KEY} missing")));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            subsystem = "inference",
            component = "openai_chat",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing chat backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables. Returns None when OPENAI_API_KEY is
    /// not set (the chat endpoints then degrade to a config error).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_OPENAI_API_KEY).ok()?;
        if api_key.is_empty() {
            return None;
        }
        let config = OpenAiChatConfig {
            base_url: std::env::var(ENV_OPENAI_BASE_URL)
                .unwrap_or_else(|_| OPENAI_BASE_URL.to_string()),
            api_key,
            model: std::env::var(ENV_OPENAI_CHAT_MODEL).unwrap_or_else(|_| CHAT_MODEL.to_string()),
            ..OpenAiChatConfig::default()
        };
        Self::new(config).ok()
    }

    pub fn config(&self) -> &OpenAiChatConfig {
        &self.config
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String> {
        debug!(
            subsystem = "inference",
            component = "openai_chat",
            op = "complete",
            model = %self.config.model,
            message_count = messages.len(),
            "Requesting chat completion"
        );

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Chat(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ProviderErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => "Unknown error".to_string(),
            };
            return Err(Error::Chat(format!("Provider returned {status}: {message}")));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Chat(format!("Failed to parse response: {e}")))?;

        let reply = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Chat("Response contained no choices".to_string()))?;

        Ok(reply.message.content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verbatim_core::ChatRole;

    #[test]
    fn test_chat_turn_constructors() {
        let system = ChatTurn::system("be terse");
        assert_eq!(system.role, "system");
        let user = ChatTurn::user("hello");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "hello");
    }

    #[test]
    fn test_chat_turn_from_stored_message() {
        let msg = ChatMessage {
            id: uuid::Uuid::nil(),
            transcript_id: uuid::Uuid::nil(),
            role: ChatRole::Assistant,
            content: "answer".to_string(),
            created_at: chrono::Utc::now(),
        };
        let turn = ChatTurn::from(&msg);
        assert_eq!(turn.role, "assistant");
        assert_eq!(turn.content, "answer");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatTurn::system("sys"), ChatTurn::user("hi")];
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.7,
            max_tokens: 1000,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }]
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Hello!");
    }

    #[test]
    fn test_error_response_deserialization() {
        let json = r#"{"error": {"message": "Invalid API key", "type": "invalid_request_error"}}"#;
        let response: ProviderErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.message, "Invalid API key");
    }

    #[test]
    fn test_new_rejects_missing_api_key() {
        let err = OpenAiChatBackend::new(OpenAiChatConfig::default()).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }
}
