//! Axum router configuration with middleware.
//!
//! Middleware: CORS for the localhost dev origins, request tracing.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:8080"),
            HeaderValue::from_static("http://127.0.0.1:8000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/chat/local", post(handlers::chat::chat_local))
        .route("/chat/events", post(handlers::chat::chat_events))
        .route("/events", get(handlers::events::list_events))
        .route("/", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - health status.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "Hubbub Chatbot API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
