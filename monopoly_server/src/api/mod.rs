//! HTTP/WebSocket edge for the simulation engine.
//!
//! Thin by design: every handler here does little more than look up a
//! session in the registry and call into `monopoly_core`. The engine owns
//! all game logic; this module owns transport.
//!
//! # Endpoints
//!
//! - `POST   /api/v1/sessions`                    - start a new session
//! - `GET    /api/v1/sessions`                     - list active sessions
//! - `GET    /api/v1/sessions/{id}`                 - full state snapshot
//! - `DELETE /api/v1/sessions/{id}`                 - stop and remove
//! - `GET    /api/v1/sessions/{id}/history`         - paginated event history
//! - `POST   /api/v1/sessions/{id}/pause`           - pause the run loop
//! - `POST   /api/v1/sessions/{id}/resume`          - resume the run loop
//! - `POST   /api/v1/sessions/{id}/speed`           - change playback speed
//! - `GET    /ws/{id}`                             - live event stream
//! - `GET    /health`                              - health check

pub mod request_id;
pub mod sessions;
pub mod websocket;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use monopoly_core::registry::SessionRegistry;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::config::ServerConfig;

/// Shared state handed to every handler. Cheap to clone: every field is
/// `Arc`-backed.
///
/// `stream_consumers` counts live `StreamEvents` connections per session,
/// since `monopoly_core::Session` itself has no notion of a connected
/// client. When the count for a session drops to zero, the websocket
/// handler stops that session's runner and removes it from the registry.
#[derive(Clone)]
pub struct AppState {
    pub registry: SessionRegistry,
    pub config: Arc<ServerConfig>,
    pub stream_consumers: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl AppState {
    pub fn new(registry: SessionRegistry, config: Arc<ServerConfig>) -> Self {
        Self { registry, config, stream_consumers: Arc::new(Mutex::new(HashMap::new())) }
    }
}

pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/sessions", post(sessions::start_game).get(sessions::list_sessions))
        .route("/sessions/{id}", get(sessions::get_state).delete(sessions::delete_session))
        .route("/sessions/{id}/history", get(sessions::get_history))
        .route("/sessions/{id}/pause", post(sessions::pause_session))
        .route("/sessions/{id}/resume", post(sessions::resume_session))
        .route("/sessions/{id}/speed", post(sessions::set_speed));

    Router::new()
        .route("/health", get(health_check))
        .route("/ws/{id}", get(websocket::stream_events))
        .nest("/api/v1", v1)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let session_count = state.registry.len().await;
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": session_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
