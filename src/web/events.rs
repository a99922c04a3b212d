//! Event catalog routes

use axum::{
    extract::{Path, State},
    Json,
};

use super::server::AppState;
use crate::error::{AppError, Result};
use crate::models::Event;

/// GET /api/events - All events, earliest first
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    let store = state.event_store.read().await;
    Json(store.list_events())
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>> {
    let id: u64 = id.trim().parse().map_err(|_| AppError::EventNotFound)?;
    let store = state.event_store.read().await;
    store
        .get_event(id)
        .cloned()
        .map(Json)
        .ok_or(AppError::EventNotFound)
}
