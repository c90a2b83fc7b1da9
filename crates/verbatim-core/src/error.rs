//! Error types for verbatim.

use thiserror::Error;

/// Result type alias using verbatim's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for verbatim operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transcript not found (or owned by another user)
    #[error("Transcript not found: {0}")]
    TranscriptNotFound(uuid::Uuid),

    /// Audio conversion failed (ffmpeg non-zero exit, diagnostic passed through)
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Transcription provider reported a terminal error status
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// A bounded wait on an external job expired
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Chat-completion provider failure or malformed response
    #[error("Chat provider error: {0}")]
    Chat(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (missing credentials, bad env values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
