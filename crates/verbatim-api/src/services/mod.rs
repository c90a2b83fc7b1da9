//! Request-scoped services composed from repositories and provider backends.

pub mod chat_service;

pub use chat_service::ChatService;
