//! Conversation persistence and the chat pipeline.
//!
//! - `repository`: the `TranscriptStore` port
//! - `session_store`: process-lifetime store keyed by session tokens
//! - `context`: prompt assembly with a fixed trailing window
//! - `service`: the request-level orchestrator

pub mod context;
pub mod repository;
pub mod service;
pub mod session_store;
