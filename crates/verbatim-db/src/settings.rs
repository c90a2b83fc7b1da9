//! User settings repository (1:1 with users, upsert semantics).

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use verbatim_core::{Error, Result, SettingsUpdate, UserSettings};

/// PostgreSQL implementation of the settings repository.
#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: Pool<Postgres>,
}

fn row_to_settings(r: &sqlx::postgres::PgRow) -> UserSettings {
    UserSettings {
        id: r.get("id"),
        user_id: r.get("user_id"),
        system_prompt_template: r.get("system_prompt_template"),
        default_user_prompt: r.get("default_user_prompt"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

impl PgSettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<UserSettings>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, system_prompt_template, default_user_prompt,
                      created_at, updated_at
               FROM user_settings WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_settings))
    }

    /// Create or replace the settings record for a user.
    pub async fn upsert(&self, user_id: Uuid, update: &SettingsUpdate) -> Result<UserSettings> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let row = sqlx::query(
            r#"INSERT INTO user_settings
                   (id, user_id, system_prompt_template, default_user_prompt, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $5)
               ON CONFLICT (user_id) DO UPDATE SET
                   system_prompt_template = EXCLUDED.system_prompt_template,
                   default_user_prompt = EXCLUDED.default_user_prompt,
                   updated_at = EXCLUDED.updated_at
               RETURNING id, user_id, system_prompt_template, default_user_prompt,
                         created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&update.system_prompt_template)
        .bind(&update.default_user_prompt)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row_to_settings(&row))
    }
}
