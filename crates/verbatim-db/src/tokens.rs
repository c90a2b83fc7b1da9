//! Persisted bearer token repository.
//!
//! Tokens are opaque random secrets; only their SHA-256 hash is stored, with
//! expiry and revocation checked in SQL. Refresh is rotation: the presented
//! refresh token is revoked and a fresh pair is issued.

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use verbatim_core::defaults::{
    ACCESS_TOKEN_PREFIX, ACCESS_TOKEN_TTL_HOURS, REFRESH_TOKEN_PREFIX, REFRESH_TOKEN_TTL_DAYS,
};
use verbatim_core::{Error, Result, TokenPair};

/// Token kind discriminator as stored in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// PostgreSQL implementation of the auth token repository.
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: Pool<Postgres>,
}

impl PgTokenRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically random secret string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a secret using SHA-256.
    fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn insert(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        token_hash: &str,
        ttl: Duration,
    ) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO auth_tokens (id, user_id, token_hash, kind, expires_at, revoked, created_at)
               VALUES ($1, $2, $3, $4, $5, FALSE, $6)"#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(token_hash)
        .bind(kind.as_str())
        .bind(Utc::now() + ttl)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Issue a fresh access + refresh token pair for a user.
    pub async fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair> {
        let access = format!("{}{}", ACCESS_TOKEN_PREFIX, Self::generate_secret(48));
        let refresh = format!("{}{}", REFRESH_TOKEN_PREFIX, Self::generate_secret(48));

        self.insert(
            user_id,
            TokenKind::Access,
            &Self::hash_secret(&access),
            Duration::hours(ACCESS_TOKEN_TTL_HOURS),
        )
        .await?;
        self.insert(
            user_id,
            TokenKind::Refresh,
            &Self::hash_secret(&refresh),
            Duration::days(REFRESH_TOKEN_TTL_DAYS),
        )
        .await?;

        Ok(TokenPair::bearer(access, refresh))
    }

    /// Resolve a live token of the given kind to its user id.
    async fn validate(&self, token: &str, kind: TokenKind) -> Result<Option<Uuid>> {
        let hash = Self::hash_secret(token);
        let row = sqlx::query(
            r#"SELECT user_id FROM auth_tokens
               WHERE token_hash = $1 AND kind = $2 AND revoked = FALSE AND expires_at > $3"#,
        )
        .bind(&hash)
        .bind(kind.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("user_id")))
    }

    /// Validate an access token, returning the owning user id.
    pub async fn validate_access(&self, token: &str) -> Result<Option<Uuid>> {
        self.validate(token, TokenKind::Access).await
    }

    /// Rotate a refresh token: revoke it and issue a fresh pair.
    ///
    /// Returns None when the presented token is unknown, expired, revoked, or
    /// not a refresh token.
    pub async fn rotate_refresh(&self, refresh_token: &str) -> Result<Option<TokenPair>> {
        let user_id = match self.validate(refresh_token, TokenKind::Refresh).await? {
            Some(user_id) => user_id,
            None => return Ok(None),
        };

        sqlx::query("UPDATE auth_tokens SET revoked = TRUE WHERE token_hash = $1")
            .bind(Self::hash_secret(refresh_token))
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(Some(self.issue_pair(user_id).await?))
    }

    /// Revoke every token belonging to a user (logout-everywhere, password
    /// change, account deletion).
    pub async fn revoke_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE auth_tokens SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    /// Drop expired rows. Run opportunistically at startup.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length_and_charset() {
        let secret = PgTokenRepository::generate_secret(48);
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_secret_unique() {
        let a = PgTokenRepository::generate_secret(48);
        let b = PgTokenRepository::generate_secret(48);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_secret_deterministic() {
        let h1 = PgTokenRepository::hash_secret("vb_at_example");
        let h2 = PgTokenRepository::hash_secret("vb_at_example");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_hash_secret_differs_per_input() {
        assert_ne!(
            PgTokenRepository::hash_secret("a"),
            PgTokenRepository::hash_secret("b")
        );
    }
}
