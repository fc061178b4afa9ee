//! # Monopoly Simulation Kernel
//!
//! An autonomous, deterministic four-player Monopoly engine. Four LLM-backed
//! agents (or, on error or timeout, a safe deterministic fallback policy)
//! play a complete game; every state transition is driven by the engine and
//! observable as a sequence of typed events.
//!
//! ## Architecture
//!
//! - [`board`], [`types`], [`rules`]: immutable board data and the pure
//!   predicates/calculators (rent, building legality, trade legality) built
//!   on it.
//! - [`player`], [`bank`], [`cards`], [`dice`], [`rng`]: per-game mutable
//!   state and the deterministic sources of randomness it depends on.
//! - [`game`]: the turn state machine and every mutation the rest of the
//!   crate drives.
//! - [`agent`]: the async contract LLM-backed players implement, plus the
//!   deterministic [`agent::FallbackAgent`] used on error or timeout.
//! - [`orchestrator`]: [`orchestrator::GameRunner`], which drives one
//!   [`game::Game`] to completion by calling out to agents each turn.
//! - [`event_bus`], [`history`]: event fan-out and the durable,
//!   sequence-numbered log built on top of it.
//! - [`registry`]: the process-wide map of live sessions.
//! - [`api`]: transport-agnostic request/response DTOs for session control.
//!
//! ## Example
//!
//! ```
//! use monopoly_core::agent::{Agent, FallbackAgent};
//! use monopoly_core::orchestrator::GameRunner;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let agents: Vec<Arc<dyn Agent>> =
//!     (0..4).map(|id| Arc::new(FallbackAgent::new(id)) as Arc<dyn Agent>).collect();
//! let runner = GameRunner::new(agents, Some(42), 1.0).unwrap();
//! runner.run_game(1000).await;
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod bank;
pub mod board;
pub mod cards;
pub mod dice;
pub mod event_bus;
pub mod game;
pub mod history;
pub mod orchestrator;
pub mod player;
pub mod registry;
pub mod rng;
pub mod rules;
pub mod types;

pub use agent::{Agent, FallbackAgent, GameView};
pub use game::Game;
pub use orchestrator::{GameRunner, GameStats};
pub use registry::{Session, SessionRegistry};
pub use types::{EventType, GameEvent};
