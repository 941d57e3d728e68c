//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. `ChatService` is generic over the transcript store; AppState pins one
//! instance to SQLite (durable chats) and one to the in-memory store
//! (ephemeral sessions).

use std::path::PathBuf;
use std::sync::Arc;

use skynet_core::chat::service::ChatService;
use skynet_core::chat::session_store::InMemoryTranscriptStore;
use skynet_core::llm::box_provider::BoxLlmProvider;
use skynet_core::persona::PersonaCatalog;
use skynet_infra::config::{database_url, load_app_config, resolve_data_dir, web_dir};
use skynet_infra::llm::openai::{OpenAiProvider, OpenAiSettings};
use skynet_infra::sqlite::pool::DatabasePool;
use skynet_infra::sqlite::transcript::SqliteTranscriptStore;
use skynet_types::config::AppConfig;
use skynet_types::error::ChatError;

pub type DurableChatService = ChatService<SqliteTranscriptStore>;

pub type SessionChatService = ChatService<InMemoryTranscriptStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// `Err` holds the reason the database could not be opened.
    pub chats: Result<Arc<DurableChatService>, String>,
    pub sessions: Arc<SessionChatService>,
    pub catalog: Arc<PersonaCatalog>,
    pub config: Arc<AppConfig>,
    pub web_dir: Option<PathBuf>,
}

impl AppState {
    /// Resolve configuration, open the database and wire the services.
    ///
    /// A database that cannot be opened is logged and recorded; the session
    /// endpoints keep working and the durable ones report it per request.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_app_config(&data_dir).await;
        tracing::debug!(data_dir = %data_dir.display(), "Configuration loaded");

        let settings = OpenAiSettings::from_env(&config.generation.chats.model);
        if settings.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail until it is provided");
        }
        let llm = Arc::new(BoxLlmProvider::new(OpenAiProvider::new(settings)));

        let db_url = database_url(&data_dir);
        let store = match DatabasePool::connect(&db_url).await {
            Ok(pool) => Ok(SqliteTranscriptStore::new(pool)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to open chat database; durable chats disabled");
                Err(e.to_string())
            }
        };

        let mut state = Self::from_parts(PersonaCatalog::builtin(), llm, store, config);
        state.web_dir = web_dir();
        Ok(state)
    }

    /// Wire services from already-built parts.
    pub fn from_parts(
        catalog: PersonaCatalog,
        llm: Arc<BoxLlmProvider>,
        store: Result<SqliteTranscriptStore, String>,
        config: AppConfig,
    ) -> Self {
        let catalog = Arc::new(catalog);

        let chats = store.map(|store| {
            Arc::new(ChatService::new(
                store,
                catalog.clone(),
                llm.clone(),
                config.generation.chats.clone(),
            ))
        });

        let sessions = Arc::new(ChatService::new(
            InMemoryTranscriptStore::new(),
            catalog.clone(),
            llm,
            config.generation.sessions.clone(),
        ));

        Self {
            chats,
            sessions,
            catalog,
            config: Arc::new(config),
            web_dir: None,
        }
    }

    /// The durable chat service, or `StorageUnavailable` if the database never opened.
    pub fn chats(&self) -> Result<&DurableChatService, ChatError> {
        self.chats
            .as_deref()
            .map_err(|reason| ChatError::StorageUnavailable(reason.clone()))
    }
}
