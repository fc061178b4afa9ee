//! The per-player view agents see, the actions they can request, and the
//! async contract every agent implements. Grounded on
//! `original_source/backend/src/monopoly/agents/base.py`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{DiceRoll, GameEvent, TradeProposal};

/// What one player can see of an opponent. Cash is deliberately public —
/// this simulation models full-information Monopoly, not a bluffing game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentView {
    pub player_id: usize,
    pub name: String,
    pub cash: i64,
    pub position: usize,
    pub property_count: usize,
    pub properties: Vec<usize>,
    pub is_bankrupt: bool,
    pub in_jail: bool,
    pub jail_cards: i64,
    pub net_worth: i64,
}

/// The full, filtered snapshot passed to an agent for every decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub my_player_id: usize,
    pub turn_number: u64,
    pub my_cash: i64,
    pub my_position: usize,
    pub my_properties: Vec<usize>,
    pub my_houses: HashMap<usize, u8>,
    pub my_mortgaged: Vec<usize>,
    pub my_jail_cards: i64,
    pub my_in_jail: bool,
    pub my_jail_turns: u8,
    pub opponents: Vec<OpponentView>,
    /// position -> owning player_id, for every owned purchasable space.
    pub property_ownership: HashMap<usize, usize>,
    /// position -> house count (5 == hotel), for every built-on space.
    pub houses_on_board: HashMap<usize, u8>,
    pub bank_houses_remaining: i64,
    pub bank_hotels_remaining: i64,
    pub last_dice_roll: Option<DiceRoll>,
    pub recent_events: Vec<GameEvent>,
}

/// A request to build a house, or a hotel if `build_hotel` is set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuildOrder {
    pub position: usize,
    #[serde(default)]
    pub build_hotel: bool,
}

/// Side actions an agent may bundle into a pre-roll or post-roll decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseAction {
    #[serde(default)]
    pub trades: Vec<TradeProposal>,
    #[serde(default)]
    pub builds: Vec<BuildOrder>,
    #[serde(default)]
    pub mortgages: Vec<usize>,
    #[serde(default)]
    pub unmortgages: Vec<usize>,
    #[serde(default = "default_true")]
    pub end_phase: bool,
}

fn default_true() -> bool {
    true
}

pub type PreRollAction = PhaseAction;
pub type PostRollAction = PhaseAction;

/// What a bankrupt-or-nearly-bankrupt player tries before the engine
/// declares them bankrupt outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankruptcyAction {
    #[serde(default)]
    pub sell_houses: Vec<usize>,
    #[serde(default)]
    pub sell_hotels: Vec<usize>,
    #[serde(default)]
    pub mortgage: Vec<usize>,
    #[serde(default)]
    pub declare_bankruptcy: bool,
}

/// The async contract every LLM-backed player implements. Every method
/// receives a fresh `GameView` so an agent never needs to track state
/// between calls. Grounded on `AgentInterface` in `agents/base.py`.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    async fn decide_pre_roll(&self, view: &GameView) -> PreRollAction;

    async fn decide_buy_or_auction(&self, view: &GameView, position: usize, price: i64) -> bool;

    /// Returns a bid, or 0 to pass. `current_bid` is the highest accepted
    /// bid so far in this auction.
    async fn decide_auction_bid(&self, view: &GameView, position: usize, current_bid: i64) -> i64;

    /// Only ever called on the active player; returns `None` to propose no
    /// trade this phase.
    async fn decide_trade(&self, view: &GameView) -> Option<TradeProposal>;

    async fn respond_to_trade(&self, view: &GameView, proposal: &TradeProposal) -> bool;

    async fn decide_jail_action(&self, view: &GameView) -> crate::types::JailAction;

    async fn decide_post_roll(&self, view: &GameView) -> PostRollAction;

    async fn decide_bankruptcy_resolution(&self, view: &GameView, debt: i64) -> BankruptcyAction;
}

/// The safe, deterministic policy every agent falls back to on error or
/// timeout. Grounded on `RandomAgent` in `agents/random_agent.py` — despite
/// the name, its choices are simple deterministic rules, not randomized.
pub struct FallbackAgent {
    pub player_id: usize,
}

impl FallbackAgent {
    pub fn new(player_id: usize) -> Self {
        Self { player_id }
    }
}

#[async_trait::async_trait]
impl Agent for FallbackAgent {
    async fn decide_pre_roll(&self, _view: &GameView) -> PreRollAction {
        PreRollAction::default()
    }

    /// Buys whenever at least twice the price is in hand, else defers to
    /// auction.
    async fn decide_buy_or_auction(&self, view: &GameView, _position: usize, price: i64) -> bool {
        view.my_cash >= price * 2
    }

    /// Raises by 10 if it can still afford the new bid, else passes.
    async fn decide_auction_bid(&self, view: &GameView, _position: usize, current_bid: i64) -> i64 {
        let next_bid = current_bid + 10;
        if view.my_cash >= next_bid {
            next_bid
        } else {
            0
        }
    }

    /// Never initiates trades.
    async fn decide_trade(&self, _view: &GameView) -> Option<TradeProposal> {
        None
    }

    /// Never accepts a trade.
    async fn respond_to_trade(&self, _view: &GameView, _proposal: &TradeProposal) -> bool {
        false
    }

    /// Prefers a held card, then paying the fine, and only rolls as a last
    /// resort.
    async fn decide_jail_action(&self, view: &GameView) -> crate::types::JailAction {
        if view.my_jail_cards > 0 {
            crate::types::JailAction::UseCard
        } else if view.my_cash >= crate::game::JAIL_FINE {
            crate::types::JailAction::PayFine
        } else {
            crate::types::JailAction::RollDoubles
        }
    }

    async fn decide_post_roll(&self, _view: &GameView) -> PostRollAction {
        PostRollAction::default()
    }

    /// Declares bankruptcy immediately rather than attempting a liquidation.
    async fn decide_bankruptcy_resolution(&self, _view: &GameView, _debt: i64) -> BankruptcyAction {
        BankruptcyAction { declare_bankruptcy: true, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with_cash(cash: i64) -> GameView {
        GameView {
            my_player_id: 0,
            turn_number: 1,
            my_cash: cash,
            my_position: 0,
            my_properties: vec![],
            my_houses: HashMap::new(),
            my_mortgaged: vec![],
            my_jail_cards: 0,
            my_in_jail: false,
            my_jail_turns: 0,
            opponents: vec![],
            property_ownership: HashMap::new(),
            houses_on_board: HashMap::new(),
            bank_houses_remaining: 32,
            bank_hotels_remaining: 12,
            last_dice_roll: None,
            recent_events: vec![],
        }
    }

    #[tokio::test]
    async fn fallback_buys_when_cash_covers_double_price() {
        let agent = FallbackAgent::new(0);
        let view = view_with_cash(400);
        assert!(agent.decide_buy_or_auction(&view, 1, 200).await);
        assert!(!agent.decide_buy_or_auction(&view, 1, 201).await);
    }

    #[tokio::test]
    async fn fallback_bids_ten_over_when_affordable() {
        let agent = FallbackAgent::new(0);
        let view = view_with_cash(100);
        assert_eq!(agent.decide_auction_bid(&view, 1, 95).await, 0);
        assert_eq!(agent.decide_auction_bid(&view, 1, 85).await, 95);
    }

    #[tokio::test]
    async fn fallback_never_proposes_or_accepts_trades() {
        let agent = FallbackAgent::new(0);
        let view = view_with_cash(1000);
        assert!(agent.decide_trade(&view).await.is_none());
        let proposal = TradeProposal {
            proposer_id: 1,
            receiver_id: 0,
            offered_properties: vec![],
            requested_properties: vec![],
            offered_cash: 500,
            requested_cash: 0,
            offered_jail_cards: 0,
            requested_jail_cards: 0,
        };
        assert!(!agent.respond_to_trade(&view, &proposal).await);
    }

    #[tokio::test]
    async fn fallback_jail_priority_is_card_then_fine_then_roll() {
        let agent = FallbackAgent::new(0);
        let mut view = view_with_cash(1000);
        view.my_jail_cards = 1;
        assert!(matches!(agent.decide_jail_action(&view).await, crate::types::JailAction::UseCard));
        view.my_jail_cards = 0;
        assert!(matches!(agent.decide_jail_action(&view).await, crate::types::JailAction::PayFine));
        view.my_cash = 0;
        assert!(matches!(agent.decide_jail_action(&view).await, crate::types::JailAction::RollDoubles));
    }

    #[tokio::test]
    async fn fallback_always_declares_bankruptcy() {
        let agent = FallbackAgent::new(0);
        let view = view_with_cash(0);
        let action = agent.decide_bankruptcy_resolution(&view, 500).await;
        assert!(action.declare_bankruptcy);
    }
}
