//! Chat orchestrator coordinating personas, transcripts and generation.
//!
//! ChatService holds no conversation state of its own. Every request
//! re-reads what it needs from the `TranscriptStore`, so several processes
//! sharing a durable store observe the same conversations.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use skynet_types::chat::{ChatReply, Conversation, ConversationSummary, NewTurn, Turn};
use skynet_types::config::GenerationConfig;
use skynet_types::error::{ChatError, RepositoryError};
use skynet_types::llm::CompletionRequest;
use skynet_types::persona::Persona;

use super::context::build_prompt;
use super::repository::TranscriptStore;
use crate::llm::box_provider::BoxLlmProvider;
use crate::persona::PersonaCatalog;

/// Chat message that clears the conversation instead of being answered.
pub const RESET_COMMAND: &str = "__reset__";

/// Reply text returned after a reset.
pub const RESET_ACKNOWLEDGEMENT: &str = "Session reset.";

/// Whether `message` is the reset sentinel (ASCII case-insensitive).
pub fn is_reset_command(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(RESET_COMMAND)
}

/// Check a non-reset message and resolve its persona without touching a store.
pub fn validate_message<'a>(
    catalog: &'a PersonaCatalog,
    persona_key: &str,
    message: &str,
) -> Result<&'a Persona, ChatError> {
    if message.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    catalog
        .lookup(persona_key)
        .map_err(|_| ChatError::InvalidPersona {
            requested: persona_key.to_string(),
            available: catalog.keys(),
        })
}

/// What a chat message produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome<I> {
    /// The model answered and both turns were stored.
    Reply(ChatReply<I>),
    /// The message was the reset sentinel; history was cleared.
    Reset { conversation_id: I },
}

/// Orchestrates one chat exchange per call.
///
/// Generic over `TranscriptStore` so the same pipeline serves durable chats
/// and ephemeral sessions.
pub struct ChatService<S: TranscriptStore> {
    store: S,
    catalog: Arc<PersonaCatalog>,
    llm: Arc<BoxLlmProvider>,
    generation: GenerationConfig,
}

impl<S: TranscriptStore> ChatService<S> {
    pub fn new(
        store: S,
        catalog: Arc<PersonaCatalog>,
        llm: Arc<BoxLlmProvider>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            llm,
            generation,
        }
    }

    /// Access the transcript store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Chat pipeline ---

    /// Handle one user message addressed to `persona_key` in conversation `id`.
    ///
    /// The reset command skips persona validation but still resolves the
    /// conversation, so an unknown durable chat is `ConversationNotFound`.
    /// Nothing is written unless the persona and conversation both resolve.
    /// If generation fails the user turn stays stored and no assistant turn
    /// is written.
    pub async fn send_message(
        &self,
        id: &S::Id,
        persona_key: &str,
        message: &str,
    ) -> Result<ChatOutcome<S::Id>, ChatError> {
        if is_reset_command(message) {
            self.store
                .open_conversation(id)
                .await
                .map_err(|e| store_error(id, e))?;
            self.reset(id).await?;
            return Ok(ChatOutcome::Reset {
                conversation_id: id.clone(),
            });
        }

        let persona = validate_message(&self.catalog, persona_key, message)?;

        self.store
            .open_conversation(id)
            .await
            .map_err(|e| store_error(id, e))?;

        self.store
            .append_turn(NewTurn::user(id.clone(), message))
            .await
            .map_err(|e| store_error(id, e))?;

        let turns = self
            .store
            .read_turns(id)
            .await
            .map_err(|e| store_error(id, e))?;

        let reply = self.generate(id, persona, &turns).await?;

        self.store
            .append_turn(NewTurn::assistant(id.clone(), reply.clone(), persona))
            .await
            .map_err(|e| store_error(id, e))?;

        Ok(ChatOutcome::Reply(ChatReply {
            reply,
            persona_name: persona.display_name.clone(),
            accent_color: persona.accent_color.clone(),
            conversation_id: id.clone(),
        }))
    }

    /// Clear a conversation's history without deleting it.
    pub async fn reset(&self, id: &S::Id) -> Result<(), ChatError> {
        self.store
            .clear_turns(id)
            .await
            .map_err(|e| store_error(id, e))?;
        info!(conversation_id = %id, "Conversation history cleared");
        Ok(())
    }

    async fn generate(
        &self,
        id: &S::Id,
        persona: &Persona,
        turns: &[Turn<S::Id>],
    ) -> Result<String, ChatError> {
        let messages = build_prompt(persona, turns);
        debug!(
            conversation_id = %id,
            persona = %persona.key,
            transcript_len = turns.len(),
            prompt_len = messages.len(),
            "Prompt assembled"
        );

        let request = CompletionRequest {
            model: self.generation.model.clone(),
            messages,
            max_tokens: self.generation.effective_max_tokens(),
            temperature: Some(self.generation.temperature),
        };

        let started = Instant::now();
        let response = self.llm.complete(&request).await.map_err(|e| {
            warn!(
                conversation_id = %id,
                provider = %self.llm.name(),
                error = %e,
                "Generation failed"
            );
            ChatError::GenerationFailed(e.to_string())
        })?;

        info!(
            conversation_id = %id,
            persona = %persona.key,
            model = %response.model,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation complete"
        );

        Ok(response.content.trim().to_string())
    }

    // --- Conversation management ---

    /// Create a conversation. A missing or blank title gets a timestamped default.
    pub async fn create_conversation(
        &self,
        title: Option<&str>,
    ) -> Result<Conversation<S::Id>, ChatError> {
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => default_title(),
        };
        let conversation = self.store.create_conversation(&title).await?;
        info!(conversation_id = %conversation.id, title = %conversation.title, "Conversation created");
        Ok(conversation)
    }

    pub async fn rename_conversation(
        &self,
        id: &S::Id,
        title: &str,
    ) -> Result<Conversation<S::Id>, ChatError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::EmptyTitle);
        }
        self.store
            .rename_conversation(id, title)
            .await
            .map_err(|e| store_error(id, e))
    }

    /// A conversation without its turns, `None` if absent.
    pub async fn get_conversation(
        &self,
        id: &S::Id,
    ) -> Result<Option<Conversation<S::Id>>, ChatError> {
        self.store
            .get_conversation(id)
            .await
            .map_err(|e| store_error(id, e))
    }

    /// A conversation with its full transcript.
    pub async fn transcript(
        &self,
        id: &S::Id,
    ) -> Result<(Conversation<S::Id>, Vec<Turn<S::Id>>), ChatError> {
        let conversation = self
            .store
            .get_conversation(id)
            .await?
            .ok_or_else(|| ChatError::ConversationNotFound(id.to_string()))?;
        let turns = self
            .store
            .read_turns(id)
            .await
            .map_err(|e| store_error(id, e))?;
        Ok((conversation, turns))
    }

    /// Turns of a conversation; an unknown id reads as an empty history.
    pub async fn history(&self, id: &S::Id) -> Result<Vec<Turn<S::Id>>, ChatError> {
        match self.store.read_turns(id).await {
            Ok(turns) => Ok(turns),
            Err(RepositoryError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(store_error(id, e)),
        }
    }

    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary<S::Id>>, ChatError> {
        Ok(self.store.list_conversations().await?)
    }

    /// Delete a conversation. Deleting an absent id succeeds.
    pub async fn delete_conversation(&self, id: &S::Id) -> Result<(), ChatError> {
        self.store
            .delete_conversation(id)
            .await
            .map_err(|e| store_error(id, e))?;
        info!(conversation_id = %id, "Conversation deleted");
        Ok(())
    }
}

/// Map a store error for `id`, logging unexpected defects.
fn store_error<I: fmt::Display>(id: &I, err: RepositoryError) -> ChatError {
    match err {
        RepositoryError::NotFound => ChatError::ConversationNotFound(id.to_string()),
        RepositoryError::Connection(msg) => {
            error!(conversation_id = %id, error = %msg, "Transcript store unreachable");
            ChatError::StorageUnavailable(msg)
        }
        other => {
            error!(conversation_id = %id, error = %other, "Transcript store failure");
            ChatError::Storage(other.to_string())
        }
    }
}

fn default_title() -> String {
    format!("Mission {}", Utc::now().format("%m/%d %H:%M"))
}
