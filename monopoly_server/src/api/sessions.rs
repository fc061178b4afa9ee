//! Session control and query handlers: start/pause/resume/speed, full-state
//! snapshots, and paginated history reads. Grounded on the REST surface in
//! `pp_server/src/api/tables.rs`, adapted from "take a poker action" to
//! "control or inspect a running Monopoly session".

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use monopoly_core::agent::{Agent, FallbackAgent};
use monopoly_core::api::{
    AckResponse, GetHistoryResponse, GetStateResponse, SessionStatus, SetSpeedRequest,
    StartGameRequest, StartGameResponse, players_snapshot,
};
use monopoly_core::event_bus::EventBus;
use monopoly_core::history::History;
use monopoly_core::orchestrator::GameRunner;
use monopoly_core::registry::{RegistryError, Session};
use monopoly_core::types::EventType;
use serde::Serialize;
use uuid::Uuid;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn err(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message.into() }))
}

fn not_found(e: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    err(StatusCode::NOT_FOUND, e.to_string())
}

/// Every seat is driven by the deterministic fallback policy: the concrete
/// LLM client adapters are an external collaborator this crate only defines
/// the contract for (spec's agent-adapter boundary), so a bare server has no
/// primary agent to plug in beyond the safe default.
fn build_seats() -> Vec<Arc<dyn Agent>> {
    (0..4).map(|id| Arc::new(FallbackAgent::new(id)) as Arc<dyn Agent>).collect()
}

/// `StartGame(seed?, speed?, agents?)` — creates a session, launches its run
/// loop as a background task, and returns its id immediately.
pub async fn start_game(
    State(state): State<AppState>,
    Json(req): Json<StartGameRequest>,
) -> Result<Json<StartGameResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !(monopoly_core::orchestrator::MIN_SPEED..=monopoly_core::orchestrator::MAX_SPEED).contains(&req.speed) {
        return Err(err(StatusCode::BAD_REQUEST, "speed out of range"));
    }

    let event_bus = Arc::new(EventBus::new());
    let history = Arc::new(History::new());
    event_bus.subscribe(None, history.clone()).await;

    let runner = Arc::new(
        GameRunner::with_event_bus(build_seats(), req.seed, req.speed, Some(event_bus.clone()))
            .map_err(|e| err(StatusCode::BAD_REQUEST, e.to_string()))?,
    );
    let seed = runner.seed();
    let created_at = chrono::Utc::now();
    let session_id = Uuid::new_v4();

    state
        .registry
        .insert(session_id, Session { runner: runner.clone(), event_bus, history, created_at })
        .await;

    let max_turns = req.max_turns;
    tokio::spawn(async move {
        runner.run_game(max_turns).await;
    });

    let session = state.registry.get(session_id).await.map_err(not_found)?;
    let players = session.runner.with_game(players_snapshot).await;

    Ok(Json(StartGameResponse {
        session_id,
        players,
        status: SessionStatus::Running,
        seed,
        created_at,
    }))
}

/// `GetState(session_id)` — a complete snapshot of the running session.
pub async fn get_state(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GetStateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.registry.get(session_id).await.map_err(not_found)?;
    let stats = session.runner.stats().await;
    let response = GetStateResponse::build(session_id, &session.runner, stats, session.created_at).await;
    Ok(Json(response))
}

#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub since: u64,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Comma-separated event type wire names, e.g. `?types=DICE_ROLLED,RENT_PAID`.
    #[serde(default)]
    pub types: Option<String>,
}

/// `GetHistory(session_id, since, limit, types?)`.
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<GetHistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.registry.get(session_id).await.map_err(not_found)?;
    let types: Option<Vec<EventType>> = query.types.as_deref().map(|raw| {
        raw.split(',')
            .filter_map(|name| EventType::from_wire_name(name.trim()))
            .collect()
    });
    let (events, total_events, has_more) =
        session.history.query(query.since, query.limit, types.as_deref());
    Ok(Json(GetHistoryResponse { events, total_events, has_more }))
}

/// `Pause(session_id)` — takes effect at the next turn boundary.
pub async fn pause_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.registry.get(session_id).await.map_err(not_found)?;
    session.runner.pause();
    Ok(Json(AckResponse::ok()))
}

pub async fn resume_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.registry.get(session_id).await.map_err(not_found)?;
    session.runner.resume();
    Ok(Json(AckResponse::ok()))
}

/// `SetSpeed(session_id, speed)`.
pub async fn set_speed(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SetSpeedRequest>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.registry.get(session_id).await.map_err(not_found)?;
    session
        .runner
        .set_speed(req.speed)
        .await
        .map_err(|e| err(StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(AckResponse::ok()))
}

#[derive(Debug, Serialize)]
pub struct SessionListEntry {
    pub session_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Lists every session this process currently holds (registry's `list`
/// operation, spec §4.10).
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionListEntry>> {
    let mut entries = Vec::new();
    for id in state.registry.session_ids().await {
        if let Ok(session) = state.registry.get(id).await {
            entries.push(SessionListEntry { session_id: id, created_at: session.created_at });
        }
    }
    Json(entries)
}

/// Explicitly tears down a session: stops its run loop and removes it from
/// the registry regardless of any connected stream consumers.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.registry.remove(session_id).await.map_err(not_found)?;
    session.runner.stop();
    Ok(Json(AckResponse::ok()))
}
