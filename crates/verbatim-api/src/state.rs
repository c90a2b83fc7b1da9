//! Application state shared across handlers.

use std::sync::Arc;

use verbatim_db::Database;
use verbatim_inference::chat::ChatBackend;
use verbatim_media::TranscriptionPipeline;

use crate::config::ApiConfig;

/// Shared per-process state. Cheap to clone; handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    /// Convert → transcribe → export workflow. None when AAI_API_KEY is
    /// unset; the transcribe endpoints then degrade to a config error.
    pub pipeline: Option<Arc<TranscriptionPipeline>>,
    /// Chat-completion backend. None when OPENAI_API_KEY is unset; the chat
    /// endpoint then degrades to a config error.
    pub chat_backend: Option<Arc<dyn ChatBackend>>,
}

impl AppState {
    /// The pipeline, or the config error the transcribe endpoints surface.
    pub fn require_pipeline(&self) -> Result<&Arc<TranscriptionPipeline>, verbatim_core::Error> {
        self.pipeline.as_ref().ok_or_else(|| {
            verbatim_core::Error::Config(format!(
                "{} missing in environment",
                verbatim_core::defaults::ENV_AAI_API_KEY
            ))
        })
    }

    /// The chat backend, or the config error the chat endpoint surfaces.
    pub fn require_chat_backend(&self) -> Result<&Arc<dyn ChatBackend>, verbatim_core::Error> {
        self.chat_backend.as_ref().ok_or_else(|| {
            verbatim_core::Error::Config(format!(
                "{} not configured. Please add it to your environment variables.",
                verbatim_core::defaults::ENV_OPENAI_API_KEY
            ))
        })
    }
}
