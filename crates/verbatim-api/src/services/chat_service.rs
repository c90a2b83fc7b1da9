//! Chat orchestration: prompt assembly, history truncation, persistence.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use verbatim_core::defaults::CHAT_HISTORY_LIMIT;
use verbatim_core::{build_system_prompt, ChatMessage, ChatRole, Error, Result, User};
use verbatim_db::Database;
use verbatim_inference::chat::{ChatBackend, ChatTurn};

/// Orchestrates one chat exchange about a transcript.
pub struct ChatService {
    db: Database,
    backend: Arc<dyn ChatBackend>,
}

impl ChatService {
    pub fn new(db: Database, backend: Arc<dyn ChatBackend>) -> Self {
        Self { db, backend }
    }

    /// Send one user message and return the persisted assistant reply.
    ///
    /// The system instruction embeds the transcript with speaker display
    /// names applied; the prompt carries the most recent stored messages
    /// (bounded) ahead of the new user message. Both sides of the exchange
    /// are persisted before the reply is returned.
    pub async fn send(
        &self,
        user: &User,
        transcript_id: Uuid,
        message: &str,
    ) -> Result<ChatMessage> {
        let transcript = self
            .db
            .transcripts
            .get_owned(transcript_id, user.id)
            .await?
            .ok_or(Error::TranscriptNotFound(transcript_id))?;

        let speaker_map = self.db.speakers.map(transcript_id).await?;
        let transcript_text = speaker_map.apply_to_text(&transcript.text_content);

        let settings = self.db.settings.get(user.id).await?;
        let template = settings
            .as_ref()
            .and_then(|s| s.system_prompt_template.as_deref());
        let system_prompt = build_system_prompt(template, &transcript_text);

        let user_message = self
            .db
            .chat
            .append(transcript_id, ChatRole::User, message)
            .await?;

        // Most recent history, excluding the message just persisted (it is
        // appended explicitly as the final turn).
        let history = self.db.chat.recent(transcript_id, CHAT_HISTORY_LIMIT).await?;
        let mut turns = Vec::with_capacity(history.len() + 2);
        turns.push(ChatTurn::system(system_prompt));
        turns.extend(
            history
                .iter()
                .filter(|m| m.id != user_message.id)
                .map(ChatTurn::from),
        );
        turns.push(ChatTurn::user(message));

        debug!(
            subsystem = "api",
            component = "chat_service",
            transcript_id = %transcript_id,
            turn_count = turns.len(),
            "Requesting completion"
        );

        let reply = self.backend.complete(&turns).await?;

        let assistant_message = self
            .db
            .chat
            .append(transcript_id, ChatRole::Assistant, &reply)
            .await?;

        info!(
            subsystem = "api",
            component = "chat_service",
            op = "send",
            transcript_id = %transcript_id,
            model = self.backend.model_name(),
            "Chat exchange persisted"
        );

        Ok(assistant_message)
    }
}
