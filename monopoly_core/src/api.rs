//! Request/response DTOs for the session control and query surface. These
//! are transport-agnostic: `monopoly_server` maps them onto HTTP/WebSocket,
//! but nothing here depends on axum or any wire format beyond serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::Game;
use crate::history::EnrichedEvent;
use crate::orchestrator::{GameRunner, GameStats, DEFAULT_MAX_TURNS};
use crate::types::{EventType, SpaceType};

fn default_speed() -> f64 {
    1.0
}

fn default_max_turns() -> u64 {
    DEFAULT_MAX_TURNS
}

/// Request to create and begin running a new four-player session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameRequest {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_max_turns")]
    pub max_turns: u64,
}

impl Default for StartGameRequest {
    fn default() -> Self {
        Self { seed: None, speed: default_speed(), max_turns: default_max_turns() }
    }
}

/// Lifecycle state of a session, as seen from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub session_id: Uuid,
    pub players: Vec<PlayerSnapshot>,
    pub status: SessionStatus,
    pub seed: u64,
    pub created_at: DateTime<Utc>,
}

/// A single player's public state, as returned by `GetState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_id: usize,
    pub name: String,
    pub cash: i64,
    pub position: usize,
    pub properties: Vec<usize>,
    pub houses: std::collections::HashMap<usize, u8>,
    pub mortgaged: Vec<usize>,
    pub in_jail: bool,
    pub jail_turns: u8,
    pub jail_cards: i64,
    pub is_bankrupt: bool,
    pub net_worth: i64,
}

impl PlayerSnapshot {
    pub fn from_game(game: &Game, player_id: usize) -> Self {
        let player = game.players.iter().find(|p| p.player_id == player_id).expect("known player");
        Self {
            player_id: player.player_id,
            name: player.name.clone(),
            cash: player.cash,
            position: player.position,
            properties: player.properties.iter().copied().collect(),
            houses: player.houses.clone(),
            mortgaged: player.mortgaged.iter().copied().collect(),
            in_jail: player.in_jail,
            jail_turns: player.jail_turns,
            jail_cards: player.jail_cards,
            is_bankrupt: player.is_bankrupt,
            net_worth: player.net_worth(&game.board),
        }
    }
}

/// One board space's static identity plus its current ownership/building
/// state, as returned in `GetState`'s board snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceSnapshot {
    pub position: usize,
    pub name: String,
    pub space_type: SpaceType,
    pub owner_id: Option<usize>,
    pub houses: u8,
    pub is_mortgaged: bool,
}

/// Every player's public snapshot, in seating order.
pub fn players_snapshot(game: &Game) -> Vec<PlayerSnapshot> {
    game.players.iter().map(|p| PlayerSnapshot::from_game(game, p.player_id)).collect()
}

fn board_snapshot(game: &Game) -> Vec<SpaceSnapshot> {
    (0..crate::board::BOARD_SIZE)
        .map(|position| {
            let space = game.board.space(position);
            let owner = game.players.iter().find(|p| !p.is_bankrupt && p.owns_property(position));
            SpaceSnapshot {
                position,
                name: space.name.to_string(),
                space_type: space.space_type,
                owner_id: owner.map(|p| p.player_id),
                houses: owner.map(|p| p.house_count(position)).unwrap_or(0),
                is_mortgaged: owner.is_some_and(|p| p.is_mortgaged(position)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStateResponse {
    pub session_id: Uuid,
    pub turn_number: u64,
    pub phase: crate::types::GamePhase,
    pub turn_phase: crate::types::TurnPhase,
    pub current_player_id: usize,
    pub players: Vec<PlayerSnapshot>,
    pub board: Vec<SpaceSnapshot>,
    pub bank_houses_remaining: i64,
    pub bank_hotels_remaining: i64,
    pub last_roll: Option<crate::types::DiceRoll>,
    pub speed: f64,
    pub is_paused: bool,
    pub is_over: bool,
    pub stats: GameStats,
    pub created_at: DateTime<Utc>,
}

impl GetStateResponse {
    /// Builds a complete snapshot from a session's live state. `created_at`
    /// is passed in rather than read from the clock, since sessions track
    /// their own creation time in the registry.
    pub async fn build(
        session_id: Uuid,
        runner: &GameRunner,
        stats: GameStats,
        created_at: DateTime<Utc>,
    ) -> Self {
        let speed = runner.speed().await;
        let is_paused = runner.is_paused();
        runner
            .with_game(|game| Self {
                session_id,
                turn_number: game.turn_number,
                phase: game.phase,
                turn_phase: game.turn_phase,
                current_player_id: game.current_player().player_id,
                players: players_snapshot(game),
                board: board_snapshot(game),
                bank_houses_remaining: game.bank.houses_available,
                bank_hotels_remaining: game.bank.hotels_available,
                last_roll: game.last_roll,
                speed,
                is_paused,
                is_over: game.is_over(),
                stats,
                created_at,
            })
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHistoryRequest {
    #[serde(default)]
    pub since_sequence: u64,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub types: Option<Vec<EventType>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHistoryResponse {
    pub events: Vec<EnrichedEvent>,
    pub total_events: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSpeedRequest {
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Payload carried under `data` in the first `StreamEvents` message: a full
/// state snapshot plus whatever trailing history the client might have
/// missed while the connection was being established.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateSyncData {
    pub state: GetStateResponse,
    pub recent_events: Vec<EnrichedEvent>,
}

/// The first message sent on a newly opened `StreamEvents` WebSocket, so
/// clients can render a consistent view before live events start arriving.
/// Shares its envelope (`event`, `data`, `timestamp`, `turn_number`,
/// `sequence`) with every other message on the stream rather than inventing
/// a one-off shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateSyncMessage {
    pub event: String,
    pub data: GameStateSyncData,
    pub timestamp: DateTime<Utc>,
    pub turn_number: u64,
    pub sequence: u64,
}

impl GameStateSyncMessage {
    pub fn new(state: GetStateResponse, recent_events: Vec<EnrichedEvent>) -> Self {
        let turn_number = state.turn_number;
        Self {
            event: "game_state_sync".to_string(),
            data: GameStateSyncData { state, recent_events },
            timestamp: Utc::now(),
            turn_number,
            sequence: 0,
        }
    }
}
