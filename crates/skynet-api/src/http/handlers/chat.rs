//! The chat endpoint.
//!
//! POST /chat accepts exactly one of `session_id` (ephemeral session, created
//! on first use) or `chat_id` (durable chat, must already exist). The reply is
//! returned under both `response` and `reply`.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use skynet_core::chat::service::{
    ChatOutcome, RESET_ACKNOWLEDGEMENT, is_reset_command, validate_message,
};
use skynet_types::chat::{ChatId, ChatReply, SessionId};

use crate::http::error::{ApiJson, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub domain: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub chat_id: Option<i64>,
}

/// Which conversation a response belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChatTarget {
    #[serde(rename = "session_id")]
    Session(SessionId),
    #[serde(rename = "chat_id")]
    Chat(ChatId),
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Present (and empty) only after a reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<serde_json::Value>>,
    #[serde(flatten)]
    pub target: ChatTarget,
}

impl ChatResponse {
    fn from_outcome<I>(outcome: ChatOutcome<I>, target: ChatTarget) -> Self {
        match outcome {
            ChatOutcome::Reply(ChatReply {
                reply,
                persona_name,
                accent_color,
                ..
            }) => Self {
                response: reply.clone(),
                reply,
                personality: Some(persona_name),
                color: Some(accent_color),
                history: None,
                target,
            },
            ChatOutcome::Reset { .. } => Self {
                response: RESET_ACKNOWLEDGEMENT.to_string(),
                reply: RESET_ACKNOWLEDGEMENT.to_string(),
                personality: None,
                color: None,
                history: Some(Vec::new()),
                target,
            },
        }
    }
}

/// POST /chat - Send one message to a persona.
///
/// Request errors are reported before the backend is consulted, so a bad
/// domain is a 400 even while the database is down.
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if !is_reset_command(&req.message) {
        validate_message(&state.catalog, &req.domain, &req.message)?;
    }

    let response = match (req.session_id, req.chat_id) {
        (Some(session_id), None) => {
            let id = SessionId::new(session_id).map_err(AppError::Validation)?;
            let outcome = state
                .sessions
                .send_message(&id, &req.domain, &req.message)
                .await?;
            ChatResponse::from_outcome(outcome, ChatTarget::Session(id))
        }
        (None, Some(chat_id)) => {
            let id = ChatId(chat_id);
            let outcome = state
                .chats()?
                .send_message(&id, &req.domain, &req.message)
                .await?;
            ChatResponse::from_outcome(outcome, ChatTarget::Chat(id))
        }
        _ => {
            return Err(AppError::Validation(
                "exactly one of session_id or chat_id is required".to_string(),
            ));
        }
    };

    Ok(Json(response))
}
