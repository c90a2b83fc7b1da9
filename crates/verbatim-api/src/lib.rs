//! # verbatim-api
//!
//! HTTP API server library for verbatim: application state, configuration,
//! error mapping, auth extractors, services, and request handlers. The
//! `verbatim-api` binary in `main.rs` wires these into an axum router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;
