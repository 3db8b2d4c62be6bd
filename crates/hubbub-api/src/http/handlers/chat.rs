//! Chat endpoints.
//!
//! `POST /chat` runs one conversation turn; `/chat/local` and
//! `/chat/events` are aliases that pin the retrieval mode. A well-formed
//! request always gets a 200 with some reply text -- failures inside the
//! turn are contained by the controller. Only malformed bodies produce a
//! transport-level error.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use hubbub_observe::genai_attrs::{GEN_AI_OPERATION_NAME, OP_CHAT};
use hubbub_types::retrieval::{RetrievalMode, RetrievalSource};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub retrieval_mode: RetrievalMode,
}

/// Request body for the mode-pinned aliases (no `retrievalMode` field).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedChatRequest {
    pub message: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_session_id() -> String {
    "default".to_string()
}

/// Response body for all chat endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub sources_used: Vec<RetrievalSource>,
}

/// POST /chat -- one conversation turn with a selectable retrieval mode.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    run_turn(state, body.session_id, body.message, body.retrieval_mode).await
}

/// POST /chat/local -- knowledge-base-only retrieval.
pub async fn chat_local(
    State(state): State<AppState>,
    Json(body): Json<PinnedChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    run_turn(state, body.session_id, body.message, RetrievalMode::Local).await
}

/// POST /chat/events -- event-search-only retrieval.
pub async fn chat_events(
    State(state): State<AppState>,
    Json(body): Json<PinnedChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    run_turn(state, body.session_id, body.message, RetrievalMode::Events).await
}

async fn run_turn(
    state: AppState,
    session_id: String,
    message: String,
    mode: RetrievalMode,
) -> Result<Json<ChatResponse>, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let span = tracing::info_span!(
        "chat",
        { GEN_AI_OPERATION_NAME } = OP_CHAT,
        session_id = %session_id,
        mode = %mode,
    );

    let outcome = state
        .controller
        .respond(&session_id, &message, mode)
        .instrument(span)
        .await;

    Ok(Json(ChatResponse {
        response: outcome.reply,
        session_id,
        sources_used: outcome.sources_used,
    }))
}
