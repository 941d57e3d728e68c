//! Durable chat CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /chats       - Create a chat
//! - GET    /chats       - List chats, most recently active first
//! - GET    /chats/{id}  - Get a chat with its messages
//! - PATCH  /chats/{id}  - Rename a chat
//! - DELETE /chats/{id}  - Delete a chat (idempotent)

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use skynet_types::chat::ChatId;

use crate::http::error::{ApiJson, AppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameChatRequest {
    pub title: String,
}

/// Parse a chat id from a path parameter, returning a 400 error on invalid format.
pub fn parse_chat_id(s: &str) -> Result<ChatId, AppError> {
    s.parse::<ChatId>().map_err(AppError::Validation)
}

/// POST /chats - Create a chat. A missing title gets a timestamped default.
pub async fn create_chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateChatRequest>,
) -> Result<Json<Value>, AppError> {
    let chat = state
        .chats()?
        .create_conversation(req.title.as_deref())
        .await?;

    Ok(Json(json!({ "id": chat.id, "title": chat.title })))
}

/// GET /chats - List chats with message counts.
pub async fn list_chats(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let chats = state.chats()?.list_conversations().await?;
    Ok(Json(json!({ "chats": chats })))
}

/// GET /chats/{id} - A chat and its full transcript.
pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_chat_id(&id)?;
    let (chat, messages) = state.chats()?.transcript(&id).await?;
    Ok(Json(json!({ "chat": chat, "messages": messages })))
}

/// PATCH /chats/{id} - Rename a chat.
pub async fn rename_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RenameChatRequest>,
) -> Result<Json<Value>, AppError> {
    let id = parse_chat_id(&id)?;
    let chat = state.chats()?.rename_conversation(&id, &req.title).await?;
    Ok(Json(json!({ "id": chat.id, "title": chat.title })))
}

/// DELETE /chats/{id} - Delete a chat and its messages.
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_chat_id(&id)?;
    state.chats()?.delete_conversation(&id).await?;
    Ok(Json(json!({ "message": "Chat deleted" })))
}
