//! Transcript chat handlers.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use verbatim_core::{ChatMessage, ChatRequest, ChatResponse};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::services::ChatService;
use crate::state::AppState;

/// POST /chat/:transcript_id
pub async fn send(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(transcript_id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".to_string()));
    }

    let backend = state.require_chat_backend()?.clone();
    let service = ChatService::new(state.db.clone(), backend);
    let reply = service.send(&user, transcript_id, &req.message).await?;

    Ok(Json(ChatResponse {
        content: reply.content,
        role: reply.role,
        created_at: reply.created_at,
    }))
}

/// GET /chat/:transcript_id/history
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(transcript_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    // Ownership check; foreign transcripts read as missing.
    state
        .db
        .transcripts
        .get_owned(transcript_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transcript not found".to_string()))?;

    Ok(Json(state.db.chat.history(transcript_id).await?))
}

/// DELETE /chat/:transcript_id/history
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(transcript_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .db
        .transcripts
        .get_owned(transcript_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transcript not found".to_string()))?;

    state.db.chat.clear(transcript_id).await?;
    Ok(Json(serde_json::json!({"message": "Chat history cleared"})))
}
