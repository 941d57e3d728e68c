//! Liveness endpoints.
//!
//! - GET /       - Banner
//! - GET /health - Status and build version

use axum::Json;
use serde_json::{Value, json};

/// GET / - Liveness banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "SkyNetAI Backend Online",
        "status": "Connected to the Matrix",
    }))
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
