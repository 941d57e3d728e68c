use thiserror::Error;

/// Errors from repository operations (used by trait definitions in skynet-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors related to persona lookup.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("unknown persona '{0}'")]
    NotFound(String),
}

/// Errors surfaced by the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid domain '{requested}'. Available: {}", available.join(", "))]
    InvalidPersona {
        requested: String,
        available: Vec<String>,
    },

    #[error("conversation '{0}' not found")]
    ConversationNotFound(String),

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("Error processing chat: {0}")]
    GenerationFailed(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Unexpected storage defect (bad row, failed query).
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Connection(msg) => ChatError::StorageUnavailable(msg),
            other => ChatError::Storage(other.to_string()),
        }
    }
}
