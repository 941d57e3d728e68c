//! LLM provider implementations.
//!
//! - [`openai`]: OpenAI chat completions via `async-openai`, optionally
//!   pointed at any OpenAI-compatible base URL.

pub mod openai;
