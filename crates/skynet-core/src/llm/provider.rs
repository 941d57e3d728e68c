//! LlmProvider trait definition.
//!
//! The single outbound capability the chat orchestrator needs: turn an
//! assembled message list into generated text. Calls may fail or be slow;
//! nothing here retries.

use skynet_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for text-generation backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in skynet-infra (e.g., `OpenAiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
