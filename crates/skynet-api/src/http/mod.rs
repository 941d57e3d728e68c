//! HTTP/REST API layer for SkyNet.
//!
//! Axum-based JSON API consumed by the web UI, with permissive CORS.

pub mod error;
pub mod handlers;
pub mod router;
