//! Core shared types: spaces, color groups, cards, dice, events, trades.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Types of spaces on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceType {
    Go,
    Property,
    Railroad,
    Utility,
    Tax,
    Chance,
    CommunityChest,
    Jail,
    FreeParking,
    GoToJail,
}

/// One of the eight property color groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
}

/// Static data for a color-group property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyData {
    pub name: &'static str,
    pub position: usize,
    pub color_group: ColorGroup,
    pub price: i64,
    pub mortgage_value: i64,
    /// (base, 1 house, 2 houses, 3 houses, 4 houses, hotel)
    pub rent: [i64; 6],
    pub house_cost: i64,
}

/// Static data for a railroad space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailroadData {
    pub name: &'static str,
    pub position: usize,
    pub price: i64,
    pub mortgage_value: i64,
}

/// Static data for a utility space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityData {
    pub name: &'static str,
    pub position: usize,
    pub price: i64,
    pub mortgage_value: i64,
}

/// Static data for a tax space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxData {
    pub name: &'static str,
    pub position: usize,
    pub amount: i64,
}

/// Data describing any purchasable space, regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PurchasableData {
    Property(PropertyData),
    Railroad(RailroadData),
    Utility(UtilityData),
}

impl PurchasableData {
    pub fn price(&self) -> i64 {
        match self {
            PurchasableData::Property(p) => p.price,
            PurchasableData::Railroad(r) => r.price,
            PurchasableData::Utility(u) => u.price,
        }
    }

    pub fn mortgage_value(&self) -> i64 {
        match self {
            PurchasableData::Property(p) => p.mortgage_value,
            PurchasableData::Railroad(r) => r.mortgage_value,
            PurchasableData::Utility(u) => u.mortgage_value,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PurchasableData::Property(p) => p.name,
            PurchasableData::Railroad(r) => r.name,
            PurchasableData::Utility(u) => u.name,
        }
    }
}

/// One space on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub position: usize,
    pub name: &'static str,
    pub space_type: SpaceType,
}

/// Which deck a card or card-effect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Chance,
    CommunityChest,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardType::Chance => write!(f, "CHANCE"),
            CardType::CommunityChest => write!(f, "COMMUNITY_CHEST"),
        }
    }
}

/// Target kind for `ADVANCE_TO_NEAREST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NearestTarget {
    Railroad,
    Utility,
}

/// The effect a drawn card applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffectKind {
    AdvanceTo { destination: usize },
    AdvanceToNearest { target: NearestTarget },
    GoBack { spaces: i64 },
    Collect { amount: i64 },
    Pay { amount: i64 },
    PayEachPlayer { amount: i64 },
    CollectFromEach { amount: i64 },
    Repairs { per_house: i64, per_hotel: i64 },
    GoToJail,
    GetOutOfJail,
}

/// A single Chance or Community Chest card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub deck: CardType,
    pub description: &'static str,
    pub effect: CardEffectKind,
}

/// The result of rolling two six-sided dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub die1: i64,
    pub die2: i64,
}

impl DiceRoll {
    pub fn total(&self) -> i64 {
        self.die1 + self.die2
    }

    pub fn is_doubles(&self) -> bool {
        self.die1 == self.die2
    }
}

/// How a player attempts to leave jail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JailAction {
    PayFine,
    UseCard,
    RollDoubles,
}

/// Phases within a single player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnPhase {
    PreRoll,
    Roll,
    Landed,
    PostRoll,
    EndTurn,
}

/// High-level game lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Setup,
    InProgress,
    Finished,
}

/// A proposed exchange of properties, cash, and jail cards between players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub proposer_id: usize,
    pub receiver_id: usize,
    #[serde(default)]
    pub offered_properties: Vec<usize>,
    #[serde(default)]
    pub requested_properties: Vec<usize>,
    #[serde(default)]
    pub offered_cash: i64,
    #[serde(default)]
    pub requested_cash: i64,
    #[serde(default)]
    pub offered_jail_cards: i64,
    #[serde(default)]
    pub requested_jail_cards: i64,
}

/// Every event kind the engine can emit. Exact spelling on the wire matters —
/// observers depend on it (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    GameStarted,
    TurnStarted,
    DiceRolled,
    PlayerMoved,
    PassedGo,
    PropertyPurchased,
    AuctionStarted,
    AuctionBid,
    AuctionWon,
    RentPaid,
    CardDrawn,
    CardEffect,
    TaxPaid,
    HouseBuilt,
    HotelBuilt,
    BuildingSold,
    PropertyMortgaged,
    PropertyUnmortgaged,
    TradeProposed,
    TradeAccepted,
    TradeRejected,
    PlayerJailed,
    PlayerFreed,
    PlayerBankrupt,
    AgentSpoke,
    AgentThought,
    GameOver,
}

impl EventType {
    /// The exact uppercase wire name, per spec §6.
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventType::GameStarted => "GAME_STARTED",
            EventType::TurnStarted => "TURN_STARTED",
            EventType::DiceRolled => "DICE_ROLLED",
            EventType::PlayerMoved => "PLAYER_MOVED",
            EventType::PassedGo => "PASSED_GO",
            EventType::PropertyPurchased => "PROPERTY_PURCHASED",
            EventType::AuctionStarted => "AUCTION_STARTED",
            EventType::AuctionBid => "AUCTION_BID",
            EventType::AuctionWon => "AUCTION_WON",
            EventType::RentPaid => "RENT_PAID",
            EventType::CardDrawn => "CARD_DRAWN",
            EventType::CardEffect => "CARD_EFFECT",
            EventType::TaxPaid => "TAX_PAID",
            EventType::HouseBuilt => "HOUSE_BUILT",
            EventType::HotelBuilt => "HOTEL_BUILT",
            EventType::BuildingSold => "BUILDING_SOLD",
            EventType::PropertyMortgaged => "PROPERTY_MORTGAGED",
            EventType::PropertyUnmortgaged => "PROPERTY_UNMORTGAGED",
            EventType::TradeProposed => "TRADE_PROPOSED",
            EventType::TradeAccepted => "TRADE_ACCEPTED",
            EventType::TradeRejected => "TRADE_REJECTED",
            EventType::PlayerJailed => "PLAYER_JAILED",
            EventType::PlayerFreed => "PLAYER_FREED",
            EventType::PlayerBankrupt => "PLAYER_BANKRUPT",
            EventType::AgentSpoke => "AGENT_SPOKE",
            EventType::AgentThought => "AGENT_THOUGHT",
            EventType::GameOver => "GAME_OVER",
        }
    }

    /// Parses a wire name back into an `EventType`, for type-filtered
    /// history queries. Case-sensitive, matching `wire_name()` exactly.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Some(match name {
            "GAME_STARTED" => EventType::GameStarted,
            "TURN_STARTED" => EventType::TurnStarted,
            "DICE_ROLLED" => EventType::DiceRolled,
            "PLAYER_MOVED" => EventType::PlayerMoved,
            "PASSED_GO" => EventType::PassedGo,
            "PROPERTY_PURCHASED" => EventType::PropertyPurchased,
            "AUCTION_STARTED" => EventType::AuctionStarted,
            "AUCTION_BID" => EventType::AuctionBid,
            "AUCTION_WON" => EventType::AuctionWon,
            "RENT_PAID" => EventType::RentPaid,
            "CARD_DRAWN" => EventType::CardDrawn,
            "CARD_EFFECT" => EventType::CardEffect,
            "TAX_PAID" => EventType::TaxPaid,
            "HOUSE_BUILT" => EventType::HouseBuilt,
            "HOTEL_BUILT" => EventType::HotelBuilt,
            "BUILDING_SOLD" => EventType::BuildingSold,
            "PROPERTY_MORTGAGED" => EventType::PropertyMortgaged,
            "PROPERTY_UNMORTGAGED" => EventType::PropertyUnmortgaged,
            "TRADE_PROPOSED" => EventType::TradeProposed,
            "TRADE_ACCEPTED" => EventType::TradeAccepted,
            "TRADE_REJECTED" => EventType::TradeRejected,
            "PLAYER_JAILED" => EventType::PlayerJailed,
            "PLAYER_FREED" => EventType::PlayerFreed,
            "PLAYER_BANKRUPT" => EventType::PlayerBankrupt,
            "AGENT_SPOKE" => EventType::AgentSpoke,
            "AGENT_THOUGHT" => EventType::AgentThought,
            "GAME_OVER" => EventType::GameOver,
            _ => return None,
        })
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// A single occurrence during gameplay. `player_id: None` means the event is
/// not attributable to a specific player (e.g. `GAME_STARTED`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub event_type: EventType,
    pub player_id: Option<usize>,
    pub data: HashMap<String, serde_json::Value>,
    pub turn_number: u64,
}

impl GameEvent {
    pub fn new(event_type: EventType, player_id: Option<usize>, turn_number: u64) -> Self {
        Self {
            event_type,
            player_id,
            data: HashMap::new(),
            turn_number,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_type_round_trips_through_its_wire_name() {
        let all = [
            EventType::GameStarted,
            EventType::TurnStarted,
            EventType::DiceRolled,
            EventType::PlayerMoved,
            EventType::PassedGo,
            EventType::PropertyPurchased,
            EventType::AuctionStarted,
            EventType::AuctionBid,
            EventType::AuctionWon,
            EventType::RentPaid,
            EventType::CardDrawn,
            EventType::CardEffect,
            EventType::TaxPaid,
            EventType::HouseBuilt,
            EventType::HotelBuilt,
            EventType::BuildingSold,
            EventType::PropertyMortgaged,
            EventType::PropertyUnmortgaged,
            EventType::TradeProposed,
            EventType::TradeAccepted,
            EventType::TradeRejected,
            EventType::PlayerJailed,
            EventType::PlayerFreed,
            EventType::PlayerBankrupt,
            EventType::AgentSpoke,
            EventType::AgentThought,
            EventType::GameOver,
        ];
        for event_type in all {
            assert_eq!(EventType::from_wire_name(event_type.wire_name()), Some(event_type));
        }
    }

    #[test]
    fn serde_serializes_event_type_as_its_wire_name() {
        let json = serde_json::to_string(&EventType::DiceRolled).unwrap();
        assert_eq!(json, "\"DICE_ROLLED\"");
    }

    #[test]
    fn from_wire_name_rejects_unknown_strings() {
        assert_eq!(EventType::from_wire_name("NOT_A_REAL_EVENT"), None);
    }
}
