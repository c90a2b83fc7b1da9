//! Centralized default constants for the verbatim system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// AUDIO CONVERSION
// =============================================================================

/// Bitrate for the `high` quality tier.
pub const BITRATE_HIGH: &str = "128k";

/// Bitrate for the `medium` quality tier.
pub const BITRATE_MEDIUM: &str = "96k";

/// Bitrate for the `low` quality tier.
pub const BITRATE_LOW: &str = "64k";

/// Output sample rate in Hz (mono speech, matched to provider expectations).
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Wall-clock budget for a single ffmpeg invocation.
pub const FFMPEG_TIMEOUT_SECS: u64 = 600;

/// ffmpeg binary name (overridable via ConverterConfig).
pub const FFMPEG_BIN: &str = "ffmpeg";

// =============================================================================
// TRANSCRIPTION
// =============================================================================

/// AssemblyAI API base URL.
pub const AAI_BASE_URL: &str = "https://api.assemblyai.com";

/// Language requested for every transcription job (ISO 639-1).
pub const LANGUAGE_CODE: &str = "fr";

/// Seconds slept between job status polls.
pub const POLL_INTERVAL_SECS: u64 = 3;

/// Wall-clock budget for a transcription job before giving up.
pub const POLL_TIMEOUT_SECS: u64 = 1800;

/// HTTP timeout for individual provider requests (upload can be large).
pub const PROVIDER_REQUEST_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// CHAT
// =============================================================================

/// OpenAI-compatible API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat-completion model.
pub const CHAT_MODEL: &str = "gpt-4o-mini";

/// Completion token cap per exchange.
pub const CHAT_MAX_TOKENS: u32 = 1000;

/// Sampling temperature for chat completions.
pub const CHAT_TEMPERATURE: f32 = 0.7;

/// Number of most recent stored messages included in the prompt.
pub const CHAT_HISTORY_LIMIT: i64 = 20;

/// System instruction used when the user has no custom template.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant analyzing an audio transcript. Here is the full transcript:\n\n{transcript}\n\nAnswer questions about this transcript accurately and concisely.";

/// Placeholder substituted with the transcript text in prompt templates.
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

// =============================================================================
// AUTH
// =============================================================================

/// Access token lifetime in hours.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

/// Refresh token lifetime in days.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Prefix for access tokens.
pub const ACCESS_TOKEN_PREFIX: &str = "vb_at_";

/// Prefix for refresh tokens.
pub const REFRESH_TOKEN_PREFIX: &str = "vb_rt_";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Maximum request body size in bytes (long recordings).
pub const MAX_BODY_SIZE_BYTES: usize = 512 * 1024 * 1024;

/// Upload ceiling for unauthenticated guest transcriptions.
pub const GUEST_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Characters of transcript text shown in list previews.
pub const PREVIEW_LENGTH: usize = 200;

/// Default directory for stored uploads.
pub const INPUT_DIR: &str = "inputs";

/// Default directory for converted audio and transcript exports.
pub const OUTPUT_DIR: &str = "outputs";

/// Separator between speaker and text in TXT exports.
pub const TXT_SEPARATOR: &str = "▶";

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

/// Transcription provider API key.
pub const ENV_AAI_API_KEY: &str = "AAI_API_KEY";

/// Transcription provider base URL override.
pub const ENV_AAI_BASE_URL: &str = "AAI_BASE_URL";

/// Chat provider API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Chat provider base URL override.
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Chat model override.
pub const ENV_OPENAI_CHAT_MODEL: &str = "OPENAI_CHAT_MODEL";

/// PostgreSQL connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Comma-separated CORS origin whitelist.
pub const ENV_CORS_ORIGINS: &str = "CORS_ORIGINS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bitrates() {
        assert_eq!(BITRATE_HIGH, "128k");
        assert_eq!(BITRATE_MEDIUM, "96k");
        assert_eq!(BITRATE_LOW, "64k");
    }

    #[test]
    fn test_default_prompt_contains_placeholder() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains(TRANSCRIPT_PLACEHOLDER));
    }

    #[test]
    fn test_token_prefixes_distinct() {
        assert_ne!(ACCESS_TOKEN_PREFIX, REFRESH_TOKEN_PREFIX);
    }
}
