//! TranscriptStore trait definition.
//!
//! Provides create/append/read/clear/delete/list operations over
//! conversations and their turns. Uses native async fn in traits (RPITIT,
//! Rust 2024 edition), the same pattern as the LLM provider port.

use std::fmt;
use std::future::Future;
use std::hash::Hash;

use skynet_types::chat::{Conversation, ConversationSummary, NewTurn, Turn};
use skynet_types::error::RepositoryError;

/// Repository trait owning every conversation and turn record.
///
/// Implementations: `InMemoryTranscriptStore` (process lifetime, keyed by a
/// client token) and `SqliteTranscriptStore` in skynet-infra (durable, keyed
/// by a store-generated integer). Callers must not cache anything between
/// requests; all state is re-read from the store.
pub trait TranscriptStore: Send + Sync {
    /// The identity model this backend uses.
    type Id: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Create a conversation with a fresh id. `created_at == updated_at`.
    fn create_conversation(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<Conversation<Self::Id>, RepositoryError>> + Send;

    /// Resolve the conversation a chat message targets.
    ///
    /// Durable backends return `NotFound` for unknown ids; session backends
    /// create an empty conversation on first use of a token.
    fn open_conversation(
        &self,
        id: &Self::Id,
    ) -> impl Future<Output = Result<Conversation<Self::Id>, RepositoryError>> + Send;

    /// Get a conversation by id, `None` if absent.
    fn get_conversation(
        &self,
        id: &Self::Id,
    ) -> impl Future<Output = Result<Option<Conversation<Self::Id>>, RepositoryError>> + Send;

    /// Set the title and refresh `updated_at`.
    fn rename_conversation(
        &self,
        id: &Self::Id,
        title: &str,
    ) -> impl Future<Output = Result<Conversation<Self::Id>, RepositoryError>> + Send;

    /// Append a turn and refresh the parent's `updated_at` atomically.
    ///
    /// Returns `NotFound` if the conversation does not exist.
    fn append_turn(
        &self,
        turn: NewTurn<Self::Id>,
    ) -> impl Future<Output = Result<Turn<Self::Id>, RepositoryError>> + Send;

    /// All turns of a conversation in ascending creation order.
    ///
    /// Empty for a conversation without turns; `NotFound` if it does not exist.
    fn read_turns(
        &self,
        id: &Self::Id,
    ) -> impl Future<Output = Result<Vec<Turn<Self::Id>>, RepositoryError>> + Send;

    /// Every conversation with its turn count, most recently updated first.
    fn list_conversations(
        &self,
    ) -> impl Future<Output = Result<Vec<ConversationSummary<Self::Id>>, RepositoryError>> + Send;

    /// Remove all turns but keep the conversation. Unknown ids are a no-op.
    fn clear_turns(
        &self,
        id: &Self::Id,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and its turns. Idempotent.
    fn delete_conversation(
        &self,
        id: &Self::Id,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
