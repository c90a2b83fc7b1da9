//! Server configuration gathered from the environment at startup.
//!
//! All runtime knobs live in this struct and are passed down explicitly;
//! components never consult global state after construction.

use std::path::PathBuf;

use verbatim_core::defaults::{
    ENV_CORS_ORIGINS, ENV_DATABASE_URL, GUEST_MAX_UPLOAD_BYTES, INPUT_DIR, MAX_BODY_SIZE_BYTES,
    OUTPUT_DIR, SERVER_PORT,
};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// CORS origin whitelist.
    pub cors_origins: Vec<String>,
    /// Directory where uploads are stored before conversion.
    pub input_dir: PathBuf,
    /// Directory for converted audio and transcript exports.
    pub output_dir: PathBuf,
    /// Upload ceiling for unauthenticated guest transcriptions.
    pub guest_max_upload_bytes: usize,
    /// Request body limit.
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: SERVER_PORT,
            database_url: "postgres://localhost/verbatim".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            input_dir: PathBuf::from(INPUT_DIR),
            output_dir: PathBuf::from(OUTPUT_DIR),
            guest_max_upload_bytes: GUEST_MAX_UPLOAD_BYTES,
            max_body_bytes: MAX_BODY_SIZE_BYTES,
        }
    }
}

impl ApiConfig {
    /// Gather configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            database_url: std::env::var(ENV_DATABASE_URL).unwrap_or(defaults.database_url),
            cors_origins: match std::env::var(ENV_CORS_ORIGINS) {
                Ok(origins) => parse_origins(&origins),
                Err(_) => defaults.cors_origins,
            },
            input_dir: std::env::var("INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_dir),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            guest_max_upload_bytes: std::env::var("GUEST_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.guest_max_upload_bytes),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        }
    }
}

/// Parse a comma-separated origin whitelist, dropping empty entries.
fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
