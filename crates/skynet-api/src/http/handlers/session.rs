//! Ephemeral session HTTP handlers.
//!
//! Endpoints:
//! - GET    /session/{id}        - Session history (empty for unknown tokens)
//! - DELETE /session/{id}        - Clear history, keep the session
//! - POST   /session/{id}/reset  - Same as sending the reset command

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use skynet_types::chat::SessionId;

use crate::http::error::AppError;
use crate::state::AppState;

fn parse_session_id(s: &str) -> Result<SessionId, AppError> {
    SessionId::new(s).map_err(AppError::Validation)
}

/// GET /session/{id} - Messages in a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_session_id(&id)?;
    let messages = state.sessions.history(&id).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// DELETE /session/{id} - Clear a session's history.
pub async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_session_id(&id)?;
    state.sessions.reset(&id).await?;
    Ok(Json(json!({ "message": "Session cleared" })))
}

/// POST /session/{id}/reset - Explicit reset.
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_session_id(&id)?;
    state.sessions.reset(&id).await?;
    Ok(Json(json!({
        "message": "Session reset.",
        "session_id": id,
        "history": [],
    })))
}
