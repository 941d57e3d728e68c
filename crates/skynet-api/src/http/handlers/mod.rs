//! HTTP request handlers for the REST API.

pub mod chat;
pub mod conversation;
pub mod persona;
pub mod root;
pub mod session;
