//! # verbatim-inference
//!
//! Provider clients for verbatim.
//!
//! This crate provides:
//! - Pluggable transcription backend trait with an AssemblyAI implementation
//!   (speaker-diarized jobs, bounded status polling)
//! - Pluggable chat-completion backend trait with an OpenAI-compatible
//!   implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use verbatim_inference::transcription::{AssemblyAiBackend, AssemblyAiConfig, TranscriptionBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = AssemblyAiBackend::new(AssemblyAiConfig {
//!         api_key: "key".into(),
//!         ..AssemblyAiConfig::default()
//!     }).unwrap();
//!     let audio = std::fs::read("meeting.mp3").unwrap();
//!     let result = backend.transcribe(&audio, None).await.unwrap();
//!     println!("{}", result.text);
//! }
//! ```

pub mod chat;
pub mod transcription;

pub use chat::{ChatBackend, ChatTurn, OpenAiChatBackend, OpenAiChatConfig};
pub use transcription::{
    AssemblyAiBackend, AssemblyAiConfig, TranscriptionBackend, TranscriptionResult,
};
