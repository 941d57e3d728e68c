//! Axum router configuration with middleware.
//!
//! Middleware: permissive CORS and request tracing.
//!
//! When `SKYNET_WEB_DIR` points at a built web UI, unknown paths fall
//! through to it; API routes take priority.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let web_dir = state.web_dir.clone();

    let mut router = Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        .route(
            "/personalities",
            get(handlers::persona::list_personalities),
        )
        // Chat pipeline (sessions and durable chats)
        .route("/chat", post(handlers::chat::chat))
        // Durable chats
        .route(
            "/chats",
            get(handlers::conversation::list_chats).post(handlers::conversation::create_chat),
        )
        .route(
            "/chats/{id}",
            get(handlers::conversation::get_chat)
                .patch(handlers::conversation::rename_chat)
                .delete(handlers::conversation::delete_chat),
        )
        // Ephemeral sessions
        .route(
            "/session/{id}",
            get(handlers::session::get_session).delete(handlers::session::clear_session),
        )
        .route(
            "/session/{id}/reset",
            post(handlers::session::reset_session),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(dir) = web_dir.filter(|d| d.exists()) {
        let serve_dir = ServeDir::new(&dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %dir.display(), "Static web UI serving enabled");
    }

    router
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use skynet_core::llm::box_provider::BoxLlmProvider;
    use skynet_core::llm::provider::LlmProvider;
    use skynet_core::persona::PersonaCatalog;
    use skynet_infra::sqlite::pool::{DatabasePool, default_database_url};
    use skynet_infra::sqlite::transcript::SqliteTranscriptStore;
    use skynet_types::config::AppConfig;
    use skynet_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

    use super::*;

    /// Echoes the last message back and records every request.
    #[derive(Clone, Default)]
    struct ScriptedProvider {
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
        fail: bool,
    }

    impl ScriptedProvider {
        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(LlmError::Provider {
                    message: "upstream exploded".to_string(),
                });
            }
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(CompletionResponse {
                id: "resp-1".to_string(),
                content: format!("echo: {last}"),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    async fn sqlite_store() -> SqliteTranscriptStore {
        let dir = tempfile::tempdir().unwrap();
        let url = default_database_url(dir.path());
        std::mem::forget(dir);
        SqliteTranscriptStore::new(DatabasePool::new(&url).await.unwrap())
    }

    async fn test_app(provider: ScriptedProvider) -> Router {
        let state = AppState::from_parts(
            PersonaCatalog::builtin(),
            Arc::new(BoxLlmProvider::new(provider)),
            Ok(sqlite_store().await),
            AppConfig::default(),
        );
        build_router(state)
    }

    fn no_storage_app() -> Router {
        let state = AppState::from_parts(
            PersonaCatalog::builtin(),
            Arc::new(BoxLlmProvider::new(ScriptedProvider::default())),
            Err("unable to open database file".to_string()),
            AppConfig::default(),
        );
        build_router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let app = test_app(ScriptedProvider::default()).await;

        let (status, body) = send(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "SkyNetAI Backend Online");

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_personalities_withhold_instructions() {
        let app = test_app(ScriptedProvider::default()).await;
        let (status, body) = send(&app, "GET", "/personalities", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hacker"]["name"], "Neo");
        assert_eq!(body["hacker"]["color"], "#00ff41");
        assert_eq!(body.as_object().unwrap().len(), 5);
        assert!(!body.to_string().contains("system_instruction"));
    }

    #[tokio::test]
    async fn test_session_chat_flow() {
        let provider = ScriptedProvider::default();
        let app = test_app(provider.clone()).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "ping", "domain": "hacker", "session_id": "tok-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "echo: ping");
        assert_eq!(body["reply"], "echo: ping");
        assert_eq!(body["personality"], "Neo");
        assert_eq!(body["color"], "#00ff41");
        assert_eq!(body["session_id"], "tok-1");

        let (_, body) = send(&app, "GET", "/session/tok-1", None).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["personality"], "Neo");

        // Sessions use their own sampling profile.
        let request = provider.requests.lock().unwrap()[0].clone();
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, 500);
    }

    #[tokio::test]
    async fn test_reset_sentinel_skips_model() {
        let provider = ScriptedProvider::default();
        let app = test_app(provider.clone()).await;

        send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hello", "domain": "corpo", "session_id": "tok-r"})),
        )
        .await;
        assert_eq!(provider.calls(), 1);

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "__RESET__", "domain": "corpo", "session_id": "tok-r"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Session reset.");
        assert_eq!(body["history"], json!([]));
        assert_eq!(provider.calls(), 1);

        let (_, body) = send(&app, "GET", "/session/tok-r", None).await;
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_clear_and_explicit_reset() {
        let app = test_app(ScriptedProvider::default()).await;
        send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "netrunner", "session_id": "tok-c"})),
        )
        .await;

        let (status, body) = send(&app, "DELETE", "/session/tok-c", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session cleared");
        let (_, body) = send(&app, "GET", "/session/tok-c", None).await;
        assert!(body["messages"].as_array().unwrap().is_empty());

        let (status, body) = send(&app, "POST", "/session/tok-c/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session reset.");

        // Unknown sessions read as empty.
        let (status, body) = send(&app, "GET", "/session/never-seen", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_domain_is_400_and_writes_nothing() {
        let provider = ScriptedProvider::default();
        let app = test_app(provider.clone()).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "nonexistent-key", "session_id": "tok-x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PERSONA");
        assert!(body["detail"].as_str().unwrap().contains("hacker"));
        assert_eq!(provider.calls(), 0);

        let (_, body) = send(&app, "GET", "/session/tok-x", None).await;
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_requires_exactly_one_target() {
        let app = test_app(ScriptedProvider::default()).await;

        let (status, _) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "hacker"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "hacker", "session_id": "a", "chat_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_durable_chat_lifecycle() {
        let provider = ScriptedProvider::default();
        let app = test_app(provider.clone()).await;

        let (status, created) = send(&app, "POST", "/chats", Some(json!({"title": "Op Kuang"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["title"], "Op Kuang");
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "status?", "domain": "ai_construct", "chat_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["personality"], "Wintermute");
        assert_eq!(body["chat_id"], id);
        assert_eq!(provider.requests.lock().unwrap()[0].temperature, Some(0.8));

        let (status, body) = send(&app, "GET", &format!("/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chat"]["title"], "Op Kuang");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "status?");
        assert_eq!(messages[1]["color"], "#ff6600");

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/chats/{id}"),
            Some(json!({"title": "Op Straylight"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Op Straylight");

        let (_, body) = send(&app, "GET", "/chats", None).await;
        let chats = body["chats"].as_array().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["message_count"], 2);
        assert_eq!(chats[0]["title"], "Op Straylight");

        let (status, body) = send(&app, "DELETE", &format!("/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Chat deleted");
        let (status, _) = send(&app, "DELETE", &format!("/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", &format!("/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "CONVERSATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_chat_default_title() {
        let app = test_app(ScriptedProvider::default()).await;
        let (status, body) = send(&app, "POST", "/chats", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["title"].as_str().unwrap().starts_with("Mission "));
    }

    #[tokio::test]
    async fn test_chat_on_missing_chat_is_404() {
        let provider = ScriptedProvider::default();
        let app = test_app(provider.clone()).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "hacker", "chat_id": 4242})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "CONVERSATION_NOT_FOUND");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_reset_on_missing_chat_is_404() {
        let provider = ScriptedProvider::default();
        let app = test_app(provider.clone()).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "__reset__", "domain": "hacker", "chat_id": 4242})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "CONVERSATION_NOT_FOUND");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_reset_on_existing_chat_clears_it() {
        let app = test_app(ScriptedProvider::default()).await;
        let (_, created) = send(&app, "POST", "/chats", Some(json!({"title": "Wipe"}))).await;
        let id = created["id"].as_i64().unwrap();

        send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "hacker", "chat_id": id})),
        )
        .await;
        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "__reset__", "domain": "hacker", "chat_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chat_id"], id);

        let (_, body) = send(&app, "GET", &format!("/chats/{id}"), None).await;
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_body_is_structured_error() {
        let app = test_app(ScriptedProvider::default()).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "session_id": "tok"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["detail"].as_str().unwrap().contains("domain"));

        let (status, body) = send(&app, "PATCH", "/chats/1", Some(json!({"name": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method("POST")
            .uri("/chats")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bad_chat_id_is_400() {
        let app = test_app(ScriptedProvider::default()).await;
        let (status, body) = send(&app, "GET", "/chats/not-a-number", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generation_failure_is_500() {
        let provider = ScriptedProvider {
            fail: true,
            ..ScriptedProvider::default()
        };
        let app = test_app(provider).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "street_samurai", "session_id": "tok-f"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "GENERATION_FAILED");
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .starts_with("Error processing chat:")
        );
    }

    #[tokio::test]
    async fn test_storage_unavailable_only_affects_durable_routes() {
        let app = no_storage_app();

        let (status, body) = send(&app, "GET", "/chats", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "STORAGE_UNAVAILABLE");

        let (status, _) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "hacker", "chat_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        // Request errors still come first.
        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "bogus", "chat_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PERSONA");

        let (status, body) = send(
            &app,
            "POST",
            "/chat",
            Some(json!({"message": "hi", "domain": "hacker", "session_id": "tok-ok"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["personality"], "Neo");
    }
}
