//! Chat message repository implementation.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use verbatim_core::{ChatMessage, ChatRole, Error, Result};

/// PostgreSQL implementation of the chat message repository.
#[derive(Clone)]
pub struct PgChatRepository {
    pool: Pool<Postgres>,
}

fn row_to_message(r: &sqlx::postgres::PgRow) -> Result<ChatMessage> {
    let role: String = r.get("role");
    Ok(ChatMessage {
        id: r.get("id"),
        transcript_id: r.get("transcript_id"),
        role: role.parse::<ChatRole>()?,
        content: r.get("content"),
        created_at: r.get("created_at"),
    })
}

impl PgChatRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append one message to a transcript's conversation.
    pub async fn append(
        &self,
        transcript_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO chat_messages (id, transcript_id, role, content, created_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(id)
        .bind(transcript_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(ChatMessage {
            id,
            transcript_id,
            role,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Full conversation, oldest first.
    pub async fn history(&self, transcript_id: Uuid) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r#"SELECT id, transcript_id, role, content, created_at
               FROM chat_messages WHERE transcript_id = $1 ORDER BY created_at, id"#,
        )
        .bind(transcript_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(row_to_message).collect()
    }

    /// The most recent `limit` messages, returned oldest first.
    pub async fn recent(&self, transcript_id: Uuid, limit: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r#"SELECT id, transcript_id, role, content, created_at FROM (
                   SELECT id, transcript_id, role, content, created_at
                   FROM chat_messages WHERE transcript_id = $1
                   ORDER BY created_at DESC, id DESC LIMIT $2
               ) recent ORDER BY created_at, id"#,
        )
        .bind(transcript_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(row_to_message).collect()
    }

    /// Delete the whole conversation. Returns the number of messages removed.
    pub async fn clear(&self, transcript_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE transcript_id = $1")
            .bind(transcript_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}
