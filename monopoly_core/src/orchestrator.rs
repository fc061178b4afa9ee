//! Drives a `Game` end to end by calling out to agents for every decision.
//! Grounded on
//! `original_source/backend/src/monopoly/orchestrator/game_runner.py`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;

use crate::agent::{Agent, BankruptcyAction, FallbackAgent, GameView, OpponentView, PhaseAction};
use crate::event_bus::EventBus;
use crate::game::{BankruptcyCreditor, Game, LandingResult, MoveOutcome, SPEEDING_DOUBLES_LIMIT};
use crate::types::{EventType, GameEvent, JailAction, TradeProposal};

pub const AGENT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_TURNS: u64 = 1000;
pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("GameRunner requires exactly 4 agents, got {0}")]
    WrongAgentCount(usize),
    #[error("speed must be within [{MIN_SPEED}, {MAX_SPEED}], got {0}")]
    InvalidSpeed(f64),
}

/// Aggregate counters kept across a whole game, surfaced to callers through
/// the control API. Grounded on `GameStats` in `game_runner.py`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct GameStats {
    pub turns_completed: u64,
    pub trades_proposed: u64,
    pub trades_accepted: u64,
    pub properties_purchased: u64,
    pub bankruptcies: u64,
    pub agent_errors: HashMap<usize, u64>,
    pub fallback_uses: HashMap<usize, u64>,
}

struct RunnerStats {
    inner: Mutex<GameStats>,
}

impl RunnerStats {
    fn new() -> Self {
        Self { inner: Mutex::new(GameStats::default()) }
    }

    async fn snapshot(&self) -> GameStats {
        self.inner.lock().await.clone()
    }

    async fn record_agent_error(&self, player_id: usize) {
        *self.inner.lock().await.agent_errors.entry(player_id).or_insert(0) += 1;
    }

    async fn record_fallback(&self, player_id: usize) {
        *self.inner.lock().await.fallback_uses.entry(player_id).or_insert(0) += 1;
    }

    async fn increment<F: FnOnce(&mut GameStats)>(&self, f: F) {
        f(&mut self.inner.lock().await);
    }
}

/// Text recorded on `AGENT_THOUGHT` whenever a primary agent call fails and
/// the fallback policy takes over. Grounded on `game_runner.py`'s
/// `_record_fallback`.
fn fallback_thought(decision: &str) -> String {
    format!("[FALLBACK] Agent failed on {decision}, using safe default.")
}

/// What a jail-turn decision resolved to. Grounded on the jail-turn
/// branching in `game_runner.py`'s `_handle_jail_turn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JailOutcome {
    /// The player is still in jail; the turn ends here with no roll/move.
    StillJailed,
    /// The player was freed this turn (fine paid, card used, or doubles
    /// rolled) and proceeds to a normal `PRE_ROLL`/`ROLL` this same turn,
    /// with a fresh roll — the jail-escape roll is not reused as the
    /// movement roll.
    Freed,
}

/// Owns one `Game` plus the agents driving it, and runs it to completion
/// (or a turn limit) one turn at a time.
pub struct GameRunner {
    game: Mutex<Game>,
    seed: u64,
    agents: Vec<Arc<dyn Agent>>,
    fallback_agents: Vec<FallbackAgent>,
    event_bus: Option<Arc<EventBus>>,
    stats: RunnerStats,
    paused: AtomicBool,
    stopped: AtomicBool,
    speed: RwLock<f64>,
    last_emitted: AtomicU64,
}

impl GameRunner {
    pub fn new(agents: Vec<Arc<dyn Agent>>, seed: Option<u64>, speed: f64) -> Result<Self, RunnerError> {
        Self::with_event_bus(agents, seed, speed, None)
    }

    pub fn with_event_bus(
        agents: Vec<Arc<dyn Agent>>,
        seed: Option<u64>,
        speed: f64,
        event_bus: Option<Arc<EventBus>>,
    ) -> Result<Self, RunnerError> {
        if agents.len() != 4 {
            return Err(RunnerError::WrongAgentCount(agents.len()));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(RunnerError::InvalidSpeed(speed));
        }
        let seed = seed.unwrap_or(0);
        Ok(Self {
            game: Mutex::new(Game::new(4, seed)),
            seed,
            agents,
            fallback_agents: (0..4).map(FallbackAgent::new).collect(),
            event_bus,
            stats: RunnerStats::new(),
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            speed: RwLock::new(speed),
            last_emitted: AtomicU64::new(0),
        })
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub async fn set_speed(&self, speed: f64) -> Result<(), RunnerError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(RunnerError::InvalidSpeed(speed));
        }
        *self.speed.write().await = speed;
        Ok(())
    }

    pub async fn stats(&self) -> GameStats {
        self.stats.snapshot().await
    }

    /// Gives read-only access to the underlying game state without exposing
    /// the lock or the `Game` type's internals beyond what `f` projects out.
    pub async fn with_game<R>(&self, f: impl FnOnce(&Game) -> R) -> R {
        f(&self.game.lock().await)
    }

    pub async fn speed(&self) -> f64 {
        *self.speed.read().await
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Events emitted since the last call, draining the internal cursor.
    pub async fn drain_new_events(&self) -> Vec<GameEvent> {
        let game = self.game.lock().await;
        let cursor = self.last_emitted.load(Ordering::SeqCst) as usize;
        let events = game.events_since(cursor).to_vec();
        self.last_emitted.store(game.event_count() as u64, Ordering::SeqCst);
        events
    }

    async fn emit_drained(&self) {
        let events = self.drain_new_events().await;
        for event in events {
            if let Some(bus) = &self.event_bus {
                bus.emit(event).await;
            }
        }
    }

    /// Calls `primary` with a timeout; on timeout, records the failure,
    /// emits `AGENT_THOUGHT`, and awaits `fallback` instead.
    async fn call_with_fallback<T>(
        &self,
        player_id: usize,
        decision: &str,
        primary: impl Future<Output = T>,
        fallback: impl Future<Output = T>,
    ) -> T {
        match timeout(AGENT_TIMEOUT, primary).await {
            Ok(value) => value,
            Err(_) => {
                log::warn!("player {player_id} timed out on {decision}, falling back to safe default");
                self.stats.record_agent_error(player_id).await;
                self.stats.record_fallback(player_id).await;
                if let Some(bus) = &self.event_bus {
                    let turn_number = self.game.lock().await.turn_number;
                    bus.emit(
                        GameEvent::new(EventType::AgentThought, Some(player_id), turn_number)
                            .with("thought", fallback_thought(decision)),
                    )
                    .await;
                }
                fallback.await
            }
        }
    }

    /// Runs turns until the game ends or `max_turns` is reached, honoring
    /// pause and stop requests between turns.
    pub async fn run_game(&self, max_turns: u64) {
        // `Game::new` already recorded `GAME_STARTED` in the engine log;
        // `emit_drained` below replays it to the bus, so no direct emit here.
        let mut turns = 0;
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            while self.paused.load(Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            let is_over = self.game.lock().await.is_over();
            if is_over || turns >= max_turns {
                break;
            }
            self.run_turn().await;
            self.stats.increment(|s| s.turns_completed += 1).await;
            turns += 1;
            let speed = *self.speed.read().await;
            tokio::time::sleep(Duration::from_secs_f64(0.5 / speed)).await;
        }
        let reason = if self.stopped.load(Ordering::SeqCst) {
            "paused"
        } else if self.game.lock().await.is_over() {
            "completed"
        } else {
            "max_turns_reached"
        };
        self.game.lock().await.finish(reason);
        self.emit_drained().await;
    }

    /// Runs one player's turn following the engine's phase algorithm:
    /// `START_TURN` → (jail resolution, if jailed) → `PRE_ROLL` →
    /// `[ROLL → MOVE → LANDED → POST_ROLL]`, repeating the bracketed block
    /// for each extra turn earned by rolling doubles (capped at three
    /// consecutive doubles, after which the third sends the player to jail
    /// and skips `LANDED`/`POST_ROLL` for that roll entirely). A player
    /// still in jail at the end of their jail decision skips straight to
    /// `advance_turn`; a player freed this turn proceeds to a normal,
    /// freshly rolled `PRE_ROLL`/`ROLL` like any other turn.
    async fn run_turn(&self) {
        let (is_bankrupt, in_jail, player_id, player_index) = {
            let game = self.game.lock().await;
            let p = game.current_player();
            (p.is_bankrupt, p.in_jail, p.player_id, game.current_player_index)
        };
        if is_bankrupt {
            self.game.lock().await.advance_turn();
            return;
        }
        self.game.lock().await.start_turn();

        if in_jail && self.handle_jail_turn(player_index, player_id).await == JailOutcome::StillJailed {
            self.game.lock().await.advance_turn();
            self.emit_drained().await;
            return;
        }

        self.handle_pre_roll_phase(player_index, player_id).await;
        loop {
            let continues = self.move_and_land(player_index, player_id).await;
            if !continues {
                break;
            }
            self.handle_post_roll_phase(player_index, player_id).await;
            let bonus_turn = {
                let game = self.game.lock().await;
                let p = &game.players[player_index];
                game.last_roll.is_some_and(|r| r.is_doubles())
                    && p.consecutive_doubles < SPEEDING_DOUBLES_LIMIT
                    && !p.in_jail
                    && !p.is_bankrupt
            };
            if !bonus_turn {
                break;
            }
        }
        self.game.lock().await.advance_turn();
        self.emit_drained().await;
    }

    fn agent_for(&self, index: usize) -> &Arc<dyn Agent> {
        &self.agents[index]
    }

    fn fallback_for(&self, index: usize) -> &FallbackAgent {
        &self.fallback_agents[index]
    }

    async fn build_view(&self, player_index: usize) -> GameView {
        let game = self.game.lock().await;
        let me = &game.players[player_index];
        let opponents = game
            .players
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != player_index)
            .map(|(_, p)| OpponentView {
                player_id: p.player_id,
                name: p.name.clone(),
                cash: p.cash,
                position: p.position,
                property_count: p.properties.len(),
                properties: p.properties.iter().copied().collect(),
                is_bankrupt: p.is_bankrupt,
                in_jail: p.in_jail,
                jail_cards: p.jail_cards,
                net_worth: p.net_worth(&game.board),
            })
            .collect();
        let mut property_ownership = HashMap::new();
        let mut houses_on_board = HashMap::new();
        for p in &game.players {
            for &pos in &p.properties {
                property_ownership.insert(pos, p.player_id);
                let count = p.house_count(pos);
                if count > 0 {
                    houses_on_board.insert(pos, count);
                }
            }
        }
        let recent_events = game.events_since(game.event_count().saturating_sub(20)).to_vec();
        GameView {
            my_player_id: me.player_id,
            turn_number: game.turn_number,
            my_cash: me.cash,
            my_position: me.position,
            my_properties: me.properties.iter().copied().collect(),
            my_houses: me.houses.clone(),
            my_mortgaged: me.mortgaged.iter().copied().collect(),
            my_jail_cards: me.jail_cards,
            my_in_jail: me.in_jail,
            my_jail_turns: me.jail_turns,
            opponents,
            property_ownership,
            houses_on_board,
            bank_houses_remaining: game.bank.houses_available,
            bank_hotels_remaining: game.bank.hotels_available,
            last_dice_roll: game.last_roll,
            recent_events,
        }
    }

    async fn handle_jail_turn(&self, player_index: usize, player_id: usize) -> JailOutcome {
        let view = self.build_view(player_index).await;
        let action = self
            .call_with_fallback(
                player_id,
                "decide_jail_action",
                self.agent_for(player_index).decide_jail_action(&view),
                self.fallback_for(player_index).decide_jail_action(&view),
            )
            .await;
        match action {
            JailAction::PayFine => {
                let freed = self.game.lock().await.pay_jail_fine(player_id).is_ok();
                if freed { JailOutcome::Freed } else { JailOutcome::StillJailed }
            }
            JailAction::UseCard => {
                let freed = self.game.lock().await.use_jail_card(player_id).is_ok();
                if freed { JailOutcome::Freed } else { JailOutcome::StillJailed }
            }
            JailAction::RollDoubles => {
                let (_, freed) = self.game.lock().await.attempt_jail_roll();
                if freed { JailOutcome::Freed } else { JailOutcome::StillJailed }
            }
        }
    }

    async fn handle_pre_roll_phase(&self, player_index: usize, player_id: usize) {
        let view = self.build_view(player_index).await;
        let action = self
            .call_with_fallback(
                player_id,
                "decide_pre_roll",
                self.agent_for(player_index).decide_pre_roll(&view),
                self.fallback_for(player_index).decide_pre_roll(&view),
            )
            .await;
        self.execute_phase_action(player_id, action).await;
    }

    async fn handle_post_roll_phase(&self, player_index: usize, player_id: usize) {
        let view = self.build_view(player_index).await;
        let action = self
            .call_with_fallback(
                player_id,
                "decide_post_roll",
                self.agent_for(player_index).decide_post_roll(&view),
                self.fallback_for(player_index).decide_post_roll(&view),
            )
            .await;
        self.execute_phase_action(player_id, action).await;
    }

    async fn execute_phase_action(&self, player_id: usize, action: PhaseAction) {
        for proposal in action.trades {
            self.stats.increment(|s| s.trades_proposed += 1).await;
            self.handle_trade_proposal(proposal).await;
        }
        for build in action.builds {
            let result = if build.build_hotel {
                self.game.lock().await.build_hotel(player_id, build.position)
            } else {
                self.game.lock().await.build_house(player_id, build.position)
            };
            let _ = result;
        }
        for position in action.mortgages {
            let _ = self.game.lock().await.mortgage_property(player_id, position);
        }
        for position in action.unmortgages {
            let _ = self.game.lock().await.unmortgage_property(player_id, position);
        }
    }

    async fn handle_trade_proposal(&self, proposal: TradeProposal) {
        let (receiver_index, turn_number) = {
            let game = self.game.lock().await;
            let Some(index) = game.players.iter().position(|p| p.player_id == proposal.receiver_id) else {
                return;
            };
            (index, game.turn_number)
        };
        if let Some(bus) = &self.event_bus {
            bus.emit(
                GameEvent::new(EventType::TradeProposed, Some(proposal.proposer_id), turn_number)
                    .with("receiver_id", proposal.receiver_id)
                    .with("offered_properties", proposal.offered_properties.clone())
                    .with("requested_properties", proposal.requested_properties.clone())
                    .with("offered_cash", proposal.offered_cash)
                    .with("requested_cash", proposal.requested_cash),
            )
            .await;
        }
        let view = self.build_view(receiver_index).await;
        let receiver_id = proposal.receiver_id;
        let accepted = self
            .call_with_fallback(
                receiver_id,
                "respond_to_trade",
                self.agent_for(receiver_index).respond_to_trade(&view, &proposal),
                self.fallback_for(receiver_index).respond_to_trade(&view, &proposal),
            )
            .await;
        if accepted {
            let outcome = self.game.lock().await.execute_trade(&proposal);
            if outcome.is_ok() {
                self.stats.increment(|s| s.trades_accepted += 1).await;
            }
        } else if let Some(bus) = &self.event_bus {
            bus.emit(
                GameEvent::new(EventType::TradeRejected, Some(proposal.proposer_id), turn_number)
                    .with("receiver_id", proposal.receiver_id)
                    .with("reason", "declined by receiver"),
            )
            .await;
        }
    }

    /// Rolls, moves, and resolves the resulting landing. Returns `false`
    /// when a third consecutive double sent the player to jail instead of
    /// moving — in that case `LANDED`/`POST_ROLL` are skipped entirely for
    /// this roll.
    async fn move_and_land(&self, player_index: usize, player_id: usize) -> bool {
        let outcome = {
            let mut game = self.game.lock().await;
            game.roll_dice();
            game.move_current_player()
        };
        if matches!(outcome, MoveOutcome::JailedForSpeeding) {
            return false;
        }
        let landing = self.game.lock().await.process_landing();
        self.resolve_landing(player_index, player_id, landing).await;
        true
    }

    /// Recursively resolves a landing, following `ADVANCE_TO`/`GO_BACK`
    /// card chains that land the player somewhere new.
    fn resolve_landing<'a>(
        &'a self,
        player_index: usize,
        player_id: usize,
        landing: LandingResult,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            match landing {
                LandingResult::UnownedProperty { position, price } => {
                    self.handle_buy_decision(player_index, player_id, position, price).await;
                }
                LandingResult::OwnedByOther { owner_id, rent, .. } => {
                    let paid = self.game.lock().await.pay_rent(owner_id, rent);
                    if !paid {
                        self.resolve_debt(player_index, player_id, BankruptcyCreditor::Player(owner_id), rent).await;
                    }
                }
                LandingResult::Tax { position, amount } => {
                    let paid = self.game.lock().await.pay_tax(position, amount);
                    if !paid {
                        self.resolve_debt(player_index, player_id, BankruptcyCreditor::Bank, amount).await;
                    }
                }
                LandingResult::DrewCard { card } => {
                    if let Some(nested) = self.game.lock().await.apply_card_effect(card) {
                        self.resolve_landing(player_index, player_id, nested).await;
                    }
                }
                LandingResult::CardDebt { amount } => {
                    self.resolve_debt(player_index, player_id, BankruptcyCreditor::Bank, amount).await;
                }
                LandingResult::OwnedBySelf | LandingResult::SentToJail | LandingResult::Nothing => {}
            }
        })
    }

    async fn handle_buy_decision(&self, player_index: usize, player_id: usize, position: usize, price: i64) {
        let view = self.build_view(player_index).await;
        let wants_to_buy = self
            .call_with_fallback(
                player_id,
                "decide_buy_or_auction",
                self.agent_for(player_index).decide_buy_or_auction(&view, position, price),
                self.fallback_for(player_index).decide_buy_or_auction(&view, position, price),
            )
            .await;
        if wants_to_buy {
            if self.game.lock().await.buy_property(position).is_ok() {
                self.stats.increment(|s| s.properties_purchased += 1).await;
            }
        } else {
            self.handle_auction(position).await;
        }
    }

    async fn handle_auction(&self, position: usize) {
        let (active_indices, turn_number) = {
            let game = self.game.lock().await;
            let active = (0..game.players.len()).filter(|&i| !game.players[i].is_bankrupt).collect();
            (active, game.turn_number)
        };
        if let Some(bus) = &self.event_bus {
            bus.emit(GameEvent::new(EventType::AuctionStarted, None, turn_number).with("position", position)).await;
        }
        let mut bids = Vec::new();
        let mut current_bid = 0;
        for index in active_indices {
            let player_id = self.game.lock().await.players[index].player_id;
            let view = self.build_view(index).await;
            let bid = self
                .call_with_fallback(
                    player_id,
                    "decide_auction_bid",
                    self.agent_for(index).decide_auction_bid(&view, position, current_bid),
                    self.fallback_for(index).decide_auction_bid(&view, position, current_bid),
                )
                .await;
            if let Some(bus) = &self.event_bus {
                bus.emit(
                    GameEvent::new(EventType::AuctionBid, Some(player_id), turn_number)
                        .with("position", position)
                        .with("bid", bid),
                )
                .await;
            }
            if bid > current_bid {
                current_bid = bid;
                bids.push((player_id, bid));
            }
        }
        self.game.lock().await.auction_property(position, &bids);
    }

    async fn resolve_debt(&self, player_index: usize, player_id: usize, creditor: BankruptcyCreditor, debt: i64) {
        let view = self.build_view(player_index).await;
        let action: BankruptcyAction = self
            .call_with_fallback(
                player_id,
                "decide_bankruptcy_resolution",
                self.agent_for(player_index).decide_bankruptcy_resolution(&view, debt),
                self.fallback_for(player_index).decide_bankruptcy_resolution(&view, debt),
            )
            .await;
        {
            let mut game = self.game.lock().await;
            for position in action.sell_hotels.iter().chain(action.sell_houses.iter()) {
                let _ = game.sell_building(player_id, *position);
            }
            for position in &action.mortgage {
                let _ = game.mortgage_property(player_id, *position);
            }
        }
        let can_cover = self.game.lock().await.players[player_index].cash >= debt;
        if action.declare_bankruptcy || !can_cover {
            let _ = self.game.lock().await.declare_bankruptcy(player_id, creditor);
            self.stats.increment(|s| s.bankruptcies += 1).await;
        } else {
            self.game.lock().await.force_pay_debt(player_id, creditor, debt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FallbackAgent;

    fn four_fallback_agents() -> Vec<Arc<dyn Agent>> {
        (0..4).map(|id| Arc::new(FallbackAgent::new(id)) as Arc<dyn Agent>).collect()
    }

    #[test]
    fn rejects_anything_other_than_four_agents() {
        let agents: Vec<Arc<dyn Agent>> = (0..3).map(|id| Arc::new(FallbackAgent::new(id)) as Arc<dyn Agent>).collect();
        assert!(matches!(GameRunner::new(agents, Some(1), 1.0), Err(RunnerError::WrongAgentCount(3))));
    }

    #[test]
    fn rejects_out_of_range_speed() {
        assert!(matches!(GameRunner::new(four_fallback_agents(), Some(1), 20.0), Err(RunnerError::InvalidSpeed(_))));
        assert!(matches!(GameRunner::new(four_fallback_agents(), Some(1), 0.0), Err(RunnerError::InvalidSpeed(_))));
    }

    #[tokio::test]
    async fn a_full_turn_completes_and_advances_the_player() {
        let runner = GameRunner::new(four_fallback_agents(), Some(7), 10.0).unwrap();
        let before = runner.game.lock().await.current_player_index;
        runner.run_turn().await;
        let after = runner.game.lock().await.current_player_index;
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn runs_to_a_max_turn_limit_with_only_fallback_agents() {
        let runner = GameRunner::new(four_fallback_agents(), Some(42), 10.0).unwrap();
        runner.run_game(5).await;
        let stats = runner.stats().await;
        assert!(stats.turns_completed <= 5);
    }

    #[tokio::test]
    async fn pause_halts_progress_until_resumed() {
        let runner = Arc::new(GameRunner::new(four_fallback_agents(), Some(3), 10.0).unwrap());
        runner.pause();
        assert!(runner.is_paused());
        let handle = tokio::spawn({
            let runner = runner.clone();
            async move {
                runner.run_game(2).await;
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runner.stats().await.turns_completed, 0);
        runner.resume();
        handle.await.unwrap();
        assert!(runner.stats().await.turns_completed > 0);
    }

    /// Wraps `FallbackAgent` but attempts to mortgage its way out of a debt
    /// instead of conceding immediately, so tests can exercise the
    /// liquidation-then-pay path `FallbackAgent` itself never takes.
    struct LiquidatingAgent(FallbackAgent);

    #[async_trait::async_trait]
    impl Agent for LiquidatingAgent {
        async fn decide_pre_roll(&self, view: &GameView) -> PhaseAction {
            self.0.decide_pre_roll(view).await
        }
        async fn decide_buy_or_auction(&self, view: &GameView, position: usize, price: i64) -> bool {
            self.0.decide_buy_or_auction(view, position, price).await
        }
        async fn decide_auction_bid(&self, view: &GameView, position: usize, current_bid: i64) -> i64 {
            self.0.decide_auction_bid(view, position, current_bid).await
        }
        async fn decide_trade(&self, view: &GameView) -> Option<TradeProposal> {
            self.0.decide_trade(view).await
        }
        async fn respond_to_trade(&self, view: &GameView, proposal: &TradeProposal) -> bool {
            self.0.respond_to_trade(view, proposal).await
        }
        async fn decide_jail_action(&self, view: &GameView) -> JailAction {
            self.0.decide_jail_action(view).await
        }
        async fn decide_post_roll(&self, view: &GameView) -> PhaseAction {
            self.0.decide_post_roll(view).await
        }
        async fn decide_bankruptcy_resolution(&self, _view: &GameView, _debt: i64) -> BankruptcyAction {
            BankruptcyAction { mortgage: vec![3], declare_bankruptcy: false, ..Default::default() }
        }
    }

    #[tokio::test]
    async fn resolve_debt_actually_pays_the_creditor_once_liquidation_covers_it() {
        let mut seats = four_fallback_agents();
        seats[0] = Arc::new(LiquidatingAgent(FallbackAgent::new(0)));
        let runner = GameRunner::new(seats, Some(11), 10.0).unwrap();
        let (player_id, creditor_id, creditor_cash_before) = {
            let mut game = runner.game.lock().await;
            game.players[0].cash = 10;
            game.players[0].add_property(3);
            (game.players[0].player_id, game.players[1].player_id, game.players[1].cash)
        };
        // Mortgaging position 3 (Baltic Avenue, value 30) comfortably covers
        // a debt of 10, so this should pay the creditor rather than concede.
        runner.resolve_debt(0, player_id, BankruptcyCreditor::Player(creditor_id), 10).await;
        let game = runner.game.lock().await;
        assert!(!game.players[0].is_bankrupt);
        assert_eq!(game.players[1].cash, creditor_cash_before + 10);
    }

    #[tokio::test]
    async fn uncovered_card_debt_declares_bankruptcy_through_resolve_landing() {
        let runner = GameRunner::new(four_fallback_agents(), Some(11), 10.0).unwrap();
        let player_id = {
            let mut game = runner.game.lock().await;
            game.players[0].cash = 0;
            game.players[0].player_id
        };
        runner.resolve_landing(0, player_id, LandingResult::CardDebt { amount: 500 }).await;
        let game = runner.game.lock().await;
        assert!(game.players[0].is_bankrupt);
        assert_eq!(runner.stats().await.bankruptcies, 1);
    }
}
