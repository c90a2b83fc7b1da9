//! # verbatim-core
//!
//! Core types, errors, and text transforms for the verbatim transcription
//! service. This crate provides the foundational data structures that the
//! other verbatim crates depend on.

pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod models;
pub mod prompt;
pub mod speakers;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use file_safety::sanitize_filename;
pub use models::*;
pub use prompt::build_system_prompt;
pub use speakers::SpeakerMap;
