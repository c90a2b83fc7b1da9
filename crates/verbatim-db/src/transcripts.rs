//! Transcript repository implementation.
//!
//! All reads are scoped by owner: a transcript owned by another user is
//! indistinguishable from a missing one.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use verbatim_core::defaults::PREVIEW_LENGTH;
use verbatim_core::{preview_text, Error, Result, Transcript, TranscriptSummary};

/// PostgreSQL implementation of the transcript repository.
#[derive(Clone)]
pub struct PgTranscriptRepository {
    pool: Pool<Postgres>,
}

fn row_to_transcript(r: &sqlx::postgres::PgRow) -> Transcript {
    Transcript {
        id: r.get("id"),
        user_id: r.get("user_id"),
        provider_id: r.get("provider_id"),
        filename: r.get("filename"),
        text_content: r.get("text_content"),
        json_content: r.get("json_content"),
        created_at: r.get("created_at"),
    }
}

impl PgTranscriptRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Persist a completed transcription.
    pub async fn insert(
        &self,
        user_id: Uuid,
        provider_id: &str,
        filename: &str,
        text_content: &str,
        json_content: Option<&serde_json::Value>,
    ) -> Result<Transcript> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO transcripts
                   (id, user_id, provider_id, filename, text_content, json_content, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(provider_id)
        .bind(filename)
        .bind(text_content)
        .bind(json_content)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Transcript {
            id,
            user_id,
            provider_id: provider_id.to_string(),
            filename: filename.to_string(),
            text_content: text_content.to_string(),
            json_content: json_content.cloned(),
            created_at: now,
        })
    }

    /// Fetch a transcript owned by the given user.
    pub async fn get_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Transcript>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, provider_id, filename, text_content, json_content, created_at
               FROM transcripts WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_transcript))
    }

    /// Listing summaries for a user, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<TranscriptSummary>> {
        let rows = sqlx::query(
            r#"SELECT id, provider_id, filename, text_content, created_at
               FROM transcripts WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|r| TranscriptSummary {
                id: r.get("id"),
                provider_id: r.get("provider_id"),
                filename: r.get("filename"),
                created_at: r.get("created_at"),
                preview: preview_text(r.get::<String, _>("text_content").as_str(), PREVIEW_LENGTH),
            })
            .collect())
    }

    /// Full transcripts for a user, newest first (data export).
    pub async fn list_full(&self, user_id: Uuid) -> Result<Vec<Transcript>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, provider_id, filename, text_content, json_content, created_at
               FROM transcripts WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_transcript).collect())
    }

    /// Rename the stored filename. Returns false when the transcript is
    /// missing or foreign-owned.
    pub async fn rename(&self, id: Uuid, user_id: Uuid, filename: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE transcripts SET filename = $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(filename)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a transcript; chat messages and speaker mappings cascade.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transcripts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
