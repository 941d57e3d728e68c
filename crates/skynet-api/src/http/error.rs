//! Application error type mapping to HTTP status codes.
//!
//! Every error body has the shape `{"detail": "...", "code": "..."}`.

use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use skynet_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the chat orchestrator.
    Chat(ChatError),
    /// Malformed request (bad id, unreadable body, conflicting fields).
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the `{detail, code}` error body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(e @ ChatError::InvalidPersona { .. }) => {
                (StatusCode::BAD_REQUEST, "INVALID_PERSONA", e.to_string())
            }
            AppError::Chat(e @ ChatError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "EMPTY_MESSAGE", e.to_string())
            }
            AppError::Chat(e @ ChatError::EmptyTitle) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Chat(e @ ChatError::ConversationNotFound(_)) => {
                (StatusCode::NOT_FOUND, "CONVERSATION_NOT_FOUND", e.to_string())
            }
            AppError::Chat(e @ ChatError::GenerationFailed(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "GENERATION_FAILED", e.to_string())
            }
            AppError::Chat(e @ ChatError::StorageUnavailable(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_UNAVAILABLE", e.to_string())
            }
            AppError::Chat(e @ ChatError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, detail = %detail, "Request failed");
        }

        (status, Json(json!({ "detail": detail, "code": code }))).into_response()
    }
}
