//! Speaker mapping repository (upsert on (transcript, original_label)).

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use verbatim_core::{Error, Result, SpeakerMap, SpeakerMapping};

/// PostgreSQL implementation of the speaker mapping repository.
#[derive(Clone)]
pub struct PgSpeakerRepository {
    pool: Pool<Postgres>,
}

fn row_to_mapping(r: &sqlx::postgres::PgRow) -> SpeakerMapping {
    SpeakerMapping {
        id: r.get("id"),
        transcript_id: r.get("transcript_id"),
        original_label: r.get("original_label"),
        display_name: r.get("display_name"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

impl PgSpeakerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create or replace the mapping for one label.
    pub async fn upsert(
        &self,
        transcript_id: Uuid,
        original_label: &str,
        display_name: &str,
    ) -> Result<SpeakerMapping> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let row = sqlx::query(
            r#"INSERT INTO speaker_mappings
                   (id, transcript_id, original_label, display_name, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $5)
               ON CONFLICT (transcript_id, original_label) DO UPDATE SET
                   display_name = EXCLUDED.display_name,
                   updated_at = EXCLUDED.updated_at
               RETURNING id, transcript_id, original_label, display_name, created_at, updated_at"#,
        )
        .bind(id)
        .bind(transcript_id)
        .bind(original_label)
        .bind(display_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row_to_mapping(&row))
    }

    pub async fn list(&self, transcript_id: Uuid) -> Result<Vec<SpeakerMapping>> {
        let rows = sqlx::query(
            r#"SELECT id, transcript_id, original_label, display_name, created_at, updated_at
               FROM speaker_mappings WHERE transcript_id = $1 ORDER BY original_label"#,
        )
        .bind(transcript_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_mapping).collect())
    }

    /// Current mappings as a label → display-name map.
    pub async fn map(&self, transcript_id: Uuid) -> Result<SpeakerMap> {
        let mappings = self.list(transcript_id).await?;
        Ok(mappings
            .into_iter()
            .map(|m| (m.original_label, m.display_name))
            .collect())
    }
}
