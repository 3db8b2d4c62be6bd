//! Event catalog endpoint.

use axum::extract::State;
use axum::Json;

use hubbub_core::events::client::EventSearchClient;
use hubbub_types::event::EventCatalog;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /events -- the full catalog from the remote service.
pub async fn list_events(State(state): State<AppState>) -> Result<Json<EventCatalog>, AppError> {
    let catalog = state
        .events
        .get_all()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(catalog))
}
