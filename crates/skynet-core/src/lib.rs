//! Business logic and port definitions for SkyNet.
//!
//! This crate defines the "ports" (store and provider traits) that the
//! infrastructure layer implements, plus the logic that sits between them:
//! the persona catalog, context assembly, and the chat orchestrator.
//! It depends only on `skynet-types` -- never on `skynet-infra` or any
//! database/HTTP crate.

pub mod chat;
pub mod llm;
pub mod persona;
