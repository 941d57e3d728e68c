//! Infrastructure layer for SkyNet.
//!
//! Contains implementations of the ports defined in `skynet-core`:
//! the SQLite transcript store, the OpenAI-compatible LLM provider, and the
//! configuration loader (data directory, `config.toml`, environment).

pub mod config;
pub mod llm;
pub mod sqlite;
