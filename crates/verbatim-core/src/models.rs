//! Shared data models for verbatim.
//!
//! Entities mirror the database schema; request/response types are shared
//! between the API layer and the repositories that serve them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// ENTITIES
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    /// Argon2id PHC string. Never serialized out.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user preferences (1:1 with users).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Custom system-prompt template; `{transcript}` is substituted if present.
    pub system_prompt_template: Option<String>,
    /// Message pre-filled in the chat input by clients.
    pub default_user_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Provider-opaque job identifier (kept for archival and support).
    pub provider_id: String,
    /// Original uploaded filename.
    pub filename: String,
    /// Speaker-labeled text, one `<label>: <utterance>` per line.
    pub text_content: String,
    /// Raw provider response, when the provider returned one.
    pub json_content: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Listing row for a transcript (full text replaced by a preview).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub id: Uuid,
    pub provider_id: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub preview: String,
}

/// One speaker rename for a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerMapping {
    pub id: Uuid,
    pub transcript_id: Uuid,
    pub original_label: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(Error::InvalidInput(format!("unknown chat role: {other}"))),
        }
    }
}

/// One stored chat message, ordered by creation time within a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub transcript_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A diarized utterance as reported by the transcription provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    /// Start offset in milliseconds.
    #[serde(default)]
    pub start: u64,
    /// End offset in milliseconds.
    #[serde(default)]
    pub end: u64,
}

// =============================================================================
// QUALITY TIERS
// =============================================================================

/// Target bitrate tier for audio conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Low,
}

impl Quality {
    /// The ffmpeg `-b:a` argument for this tier.
    pub fn bitrate(&self) -> &'static str {
        match self {
            Quality::High => defaults::BITRATE_HIGH,
            Quality::Medium => defaults::BITRATE_MEDIUM,
            Quality::Low => defaults::BITRATE_LOW,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::High
    }
}

impl std::str::FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Quality::High),
            "medium" => Ok(Quality::Medium),
            "low" => Ok(Quality::Low),
            other => Err(Error::InvalidInput(format!(
                "Invalid quality value: {other}"
            ))),
        }
    }
}

// =============================================================================
// REQUEST / RESPONSE TYPES
// =============================================================================

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

/// Access + refresh token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

/// Speaker rename payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerUpdate {
    pub original_label: String,
    pub display_name: String,
}

/// Settings update payload. Absent fields clear the stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub system_prompt_template: Option<String>,
    #[serde(default)]
    pub default_user_prompt: Option<String>,
}

/// Chat request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Chat reply returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub content: String,
    pub role: ChatRole,
    pub created_at: DateTime<Utc>,
}

/// Transcript rename payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameTranscript {
    pub filename: String,
}

/// Truncate transcript text for listings, appending an ellipsis marker.
pub fn preview_text(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_parse() {
        assert_eq!("high".parse::<Quality>().unwrap(), Quality::High);
        assert_eq!("MEDIUM".parse::<Quality>().unwrap(), Quality::Medium);
        assert_eq!("low".parse::<Quality>().unwrap(), Quality::Low);
        assert!("ultra".parse::<Quality>().is_err());
    }

    #[test]
    fn test_quality_bitrate() {
        assert_eq!(Quality::High.bitrate(), "128k");
        assert_eq!(Quality::Medium.bitrate(), "96k");
        assert_eq!(Quality::Low.bitrate(), "64k");
    }

    #[test]
    fn test_chat_role_round_trip() {
        assert_eq!("user".parse::<ChatRole>().unwrap(), ChatRole::User);
        assert_eq!(
            "assistant".parse::<ChatRole>().unwrap(),
            ChatRole::Assistant
        );
        assert_eq!(ChatRole::User.as_str(), "user");
        assert!("system".parse::<ChatRole>().is_err());
    }

    #[test]
    fn test_chat_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        let role: ChatRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, ChatRole::Assistant);
    }

    #[test]
    fn test_utterance_serialization() {
        let utt = Utterance {
            speaker: "A".to_string(),
            text: "Hi".to_string(),
            start: 1000,
            end: 2000,
        };
        let json = serde_json::to_value(&utt).unwrap();
        assert_eq!(json["speaker"], "A");
        assert_eq!(json["text"], "Hi");
        assert_eq!(json["start"], 1000);

        let back: Utterance = serde_json::from_value(json).unwrap();
        assert_eq!(back, utt);
    }

    #[test]
    fn test_preview_text_short_unchanged() {
        assert_eq!(preview_text("hello", 200), "hello");
    }

    #[test]
    fn test_preview_text_truncates_with_ellipsis() {
        let long = "x".repeat(300);
        let preview = preview_text(&long, 200);
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_preview_text_multibyte_boundary() {
        let text = "é".repeat(250);
        let preview = preview_text(&text, 200);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 203);
    }

    #[test]
    fn test_token_pair_bearer() {
        let pair = TokenPair::bearer("a".into(), "r".into());
        assert_eq!(pair.token_type, "bearer");
    }
}
