//! Request handlers, grouped by resource.

pub mod account;
pub mod chat;
pub mod export;
pub mod guest;
pub mod settings;
pub mod transcripts;
