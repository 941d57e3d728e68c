//! Persona listing.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PersonaView {
    pub name: String,
    pub color: String,
}

/// GET /personalities - Map of persona key to display name and color.
///
/// System instructions are never exposed.
pub async fn list_personalities(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, PersonaView>> {
    let personas = state
        .catalog
        .list()
        .into_iter()
        .map(|p| {
            (
                p.key,
                PersonaView {
                    name: p.name,
                    color: p.color,
                },
            )
        })
        .collect();

    Json(personas)
}
