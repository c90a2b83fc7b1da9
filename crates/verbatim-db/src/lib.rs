//! # verbatim-db
//!
//! PostgreSQL database layer for verbatim.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, transcripts, speaker mappings,
//!   chat messages, settings, and persisted bearer tokens
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use verbatim_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/verbatim").await?;
//!     let user = db.users.get_by_username("alice").await?;
//!     println!("{user:?}");
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod pool;
pub mod settings;
pub mod speakers;
pub mod tokens;
pub mod transcripts;
pub mod users;

// Test fixtures for integration tests
// Note: always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use verbatim_core::*;

// Re-export repository implementations
pub use chat::PgChatRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use settings::PgSettingsRepository;
pub use speakers::PgSpeakerRepository;
pub use tokens::{PgTokenRepository, TokenKind};
pub use transcripts::PgTranscriptRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User accounts.
    pub users: PgUserRepository,
    /// Per-user settings (1:1).
    pub settings: PgSettingsRepository,
    /// Transcripts, owner-scoped.
    pub transcripts: PgTranscriptRepository,
    /// Speaker display-name mappings.
    pub speakers: PgSpeakerRepository,
    /// Chat message history.
    pub chat: PgChatRepository,
    /// Persisted bearer tokens.
    pub tokens: PgTokenRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            settings: PgSettingsRepository::new(pool.clone()),
            transcripts: PgTranscriptRepository::new(pool.clone()),
            speakers: PgSpeakerRepository::new(pool.clone()),
            chat: PgChatRepository::new(pool.clone()),
            tokens: PgTokenRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
