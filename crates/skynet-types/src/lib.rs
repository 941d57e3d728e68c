//! Shared domain types for SkyNet.
//!
//! This crate contains the core domain types used across the SkyNet chat
//! backend: personas, conversations and their turns, LLM request/response
//! shapes, configuration, and the associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod persona;
