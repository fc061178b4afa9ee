//! The simulation kernel: board state, turn state machine, and every
//! mutation the orchestrator drives. Grounded on
//! `original_source/backend/src/monopoly/engine/game.py`.

use std::collections::HashMap;

use crate::bank::Bank;
use crate::board::Board;
use crate::cards::Deck;
use crate::dice::Dice;
use crate::player::Player;
use crate::rules::Rules;
use crate::types::{
    Card, CardEffectKind, DiceRoll, EventType, GameEvent, GamePhase, NearestTarget, SpaceType,
    TradeProposal, TurnPhase,
};

pub const JAIL_FINE: i64 = 50;
pub const MAX_JAIL_TURNS: u8 = 3;
pub const SPEEDING_DOUBLES_LIMIT: u8 = 3;

/// What happened when the current player attempted to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { passed_go: bool },
    JailedForSpeeding,
}

/// What happened when the current player's new position was processed.
#[derive(Debug, Clone)]
pub enum LandingResult {
    Nothing,
    UnownedProperty { position: usize, price: i64 },
    OwnedByOther { position: usize, owner_id: usize, rent: i64 },
    OwnedBySelf,
    Tax { position: usize, amount: i64 },
    DrewCard { card: Card },
    SentToJail,
    /// A `PAY`/`REPAIRS` card effect exceeded the player's cash on hand.
    CardDebt { amount: i64 },
}

/// Outcome of resolving an auction.
#[derive(Debug, Clone)]
pub struct AuctionResult {
    pub position: usize,
    pub winner_id: Option<usize>,
    pub winning_bid: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum BankruptcyCreditor {
    #[default]
    Bank,
    Player(usize),
}

/// The full mutable game state. Owns everything needed to replay or
/// snapshot a single game session.
///
/// `Game` itself is never serialized: external views go through
/// `GameView`/`api` DTOs, since `Deck`/`Dice` hold RNG state that is
/// reconstructible from the session seed but not meaningfully serializable.
pub struct Game {
    pub board: Board,
    pub bank: Bank,
    pub players: Vec<Player>,
    chance: Deck,
    community_chest: Deck,
    dice: Dice,
    pub turn_number: u64,
    pub current_player_index: usize,
    pub phase: GamePhase,
    pub turn_phase: TurnPhase,
    pub last_roll: Option<DiceRoll>,
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("turn_number", &self.turn_number)
            .field("current_player_index", &self.current_player_index)
            .field("phase", &self.phase)
            .field("turn_phase", &self.turn_phase)
            .finish()
    }
}

impl Game {
    /// Builds a fresh game for exactly `num_players` players. The seed
    /// drives dice and both card decks from three derived, non-overlapping
    /// streams (`seed`, `seed+1`, `seed+2`).
    pub fn new(num_players: usize, seed: u64) -> Self {
        let players = (0..num_players)
            .map(|id| Player::new(id, format!("Player {}", id + 1)))
            .collect();
        let mut game = Self {
            board: Board,
            bank: Bank::default(),
            players,
            chance: Deck::chance(seed.wrapping_add(1)),
            community_chest: Deck::community_chest(seed.wrapping_add(2)),
            dice: Dice::new(seed),
            turn_number: 0,
            current_player_index: 0,
            phase: GamePhase::Setup,
            turn_phase: TurnPhase::PreRoll,
            last_roll: None,
            events: Vec::new(),
        };
        game.phase = GamePhase::InProgress;
        game.emit(EventType::GameStarted, None, HashMap::new());
        game
    }

    fn emit(&mut self, event_type: EventType, player_id: Option<usize>, data: HashMap<String, serde_json::Value>) {
        let mut event = GameEvent::new(event_type, player_id, self.turn_number);
        event.data = data;
        self.events.push(event);
    }

    pub fn events_since(&self, index: usize) -> &[GameEvent] {
        if index >= self.events.len() {
            &[]
        } else {
            &self.events[index..]
        }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current_player_index]
    }

    pub fn rules(&self) -> Rules<'_> {
        Rules::new(&self.board)
    }

    fn owner_of(&self, position: usize) -> Option<usize> {
        self.players.iter().position(|p| !p.is_bankrupt && p.owns_property(position))
    }

    fn emit_dice_rolled(&mut self, player_id: usize, roll: DiceRoll) {
        self.emit(
            EventType::DiceRolled,
            Some(player_id),
            HashMap::from([
                ("die1".into(), roll.die1.into()),
                ("die2".into(), roll.die2.into()),
                ("total".into(), roll.total().into()),
                ("doubles".into(), roll.is_doubles().into()),
            ]),
        );
    }

    // ----- Turn lifecycle -----------------------------------------------

    pub fn start_turn(&mut self) {
        self.turn_number += 1;
        self.turn_phase = TurnPhase::PreRoll;
        let player_id = self.current_player().player_id;
        self.emit(EventType::TurnStarted, Some(player_id), HashMap::new());
    }

    pub fn roll_dice(&mut self) -> DiceRoll {
        let roll = self.dice.roll();
        self.last_roll = Some(roll);
        let idx = self.current_player_index;
        if roll.is_doubles() {
            self.players[idx].consecutive_doubles += 1;
        } else {
            self.players[idx].consecutive_doubles = 0;
        }
        let player_id = self.players[idx].player_id;
        self.turn_phase = TurnPhase::Roll;
        self.emit_dice_rolled(player_id, roll);
        roll
    }

    /// Moves the current player according to the last roll, unless the
    /// third consecutive double sends them straight to jail instead.
    pub fn move_current_player(&mut self) -> MoveOutcome {
        let roll = self.last_roll.expect("roll_dice must be called before moving");
        let idx = self.current_player_index;
        if self.players[idx].consecutive_doubles >= SPEEDING_DOUBLES_LIMIT {
            self.players[idx].consecutive_doubles = 0;
            self.send_current_player_to_jail("speeding");
            self.turn_phase = TurnPhase::PostRoll;
            return MoveOutcome::JailedForSpeeding;
        }
        let passed_go = self.players[idx].move_forward(roll.total());
        if passed_go {
            self.players[idx].add_cash(200);
        }
        let player_id = self.players[idx].player_id;
        let position = self.players[idx].position;
        self.emit(
            EventType::PlayerMoved,
            Some(player_id),
            HashMap::from([
                ("new_position".into(), position.into()),
                ("space_name".into(), self.board.space(position).name.into()),
            ]),
        );
        if passed_go {
            self.emit(EventType::PassedGo, Some(player_id), HashMap::from([("salary".into(), 200.into())]));
        }
        self.turn_phase = TurnPhase::Landed;
        MoveOutcome::Moved { passed_go }
    }

    fn send_current_player_to_jail(&mut self, reason: &str) {
        let idx = self.current_player_index;
        self.players[idx].send_to_jail();
        let player_id = self.players[idx].player_id;
        self.emit(
            EventType::PlayerJailed,
            Some(player_id),
            HashMap::from([("reason".into(), reason.into())]),
        );
    }

    /// Inspects the current player's new position and resolves automatic
    /// effects (tax charged, card drawn, GO TO JAIL triggered). Rent and
    /// purchase decisions are left to the caller.
    pub fn process_landing(&mut self) -> LandingResult {
        let idx = self.current_player_index;
        let position = self.players[idx].position;
        let space = self.board.space(position);
        self.turn_phase = TurnPhase::Landed;
        match space.space_type {
            SpaceType::Property | SpaceType::Railroad | SpaceType::Utility => {
                match self.owner_of(position) {
                    None => {
                        let price = self.board.purchase_price(position).expect("purchasable space has a price");
                        LandingResult::UnownedProperty { position, price }
                    }
                    Some(owner_idx) if owner_idx == idx => LandingResult::OwnedBySelf,
                    Some(owner_idx) => {
                        let rent = self.rules().calculate_rent(position, &self.players[owner_idx], self.last_roll);
                        let owner_id = self.players[owner_idx].player_id;
                        LandingResult::OwnedByOther { position, owner_id, rent }
                    }
                }
            }
            SpaceType::Tax => {
                let amount = self.board.tax_data(position).expect("tax space has tax data").amount;
                LandingResult::Tax { position, amount }
            }
            SpaceType::Chance => LandingResult::DrewCard { card: self.draw_chance() },
            SpaceType::CommunityChest => LandingResult::DrewCard { card: self.draw_community_chest() },
            SpaceType::GoToJail => {
                self.send_current_player_to_jail("landed on Go To Jail");
                LandingResult::SentToJail
            }
            SpaceType::Go | SpaceType::Jail | SpaceType::FreeParking => LandingResult::Nothing,
        }
    }

    fn draw_chance(&mut self) -> Card {
        let card = self.chance.draw();
        self.after_card_drawn(&card);
        card
    }

    fn draw_community_chest(&mut self) -> Card {
        let card = self.community_chest.draw();
        self.after_card_drawn(&card);
        card
    }

    fn after_card_drawn(&mut self, card: &Card) {
        let player_id = self.current_player().player_id;
        self.emit(
            EventType::CardDrawn,
            Some(player_id),
            HashMap::from([
                ("deck".into(), card.deck.to_string().into()),
                ("description".into(), card.description.into()),
            ]),
        );
    }

    /// Applies a card's effect. Returns any property the player now has a
    /// chance to buy (from an `ADVANCE_TO`/`ADVANCE_TO_NEAREST` effect that
    /// lands on an unowned purchasable space).
    ///
    /// `ADVANCE_TO_NEAREST` is special-cased when the destination is owned
    /// by another player: railroads charge double the normal railroad rent
    /// and utilities charge `10 ×` a fresh dice roll, regardless of how many
    /// of that kind the owner holds (Monopoly convention for these two
    /// cards, overriding the usual count-based formula in `Rules`).
    pub fn apply_card_effect(&mut self, card: Card) -> Option<LandingResult> {
        let idx = self.current_player_index;
        let player_id = self.players[idx].player_id;
        let mut landed_again = false;
        let mut shortfall = None;
        match card.effect {
            CardEffectKind::AdvanceTo { destination } => {
                let passed_go = self.players[idx].move_to(destination);
                if passed_go {
                    self.players[idx].add_cash(200);
                    self.emit(EventType::PassedGo, Some(player_id), HashMap::from([("salary".into(), 200.into())]));
                }
                landed_again = true;
            }
            CardEffectKind::AdvanceToNearest { target } => {
                let from = self.players[idx].position;
                let destination = match target {
                    NearestTarget::Railroad => self.board.nearest_railroad(from),
                    NearestTarget::Utility => self.board.nearest_utility(from),
                };
                let passed_go = self.players[idx].move_to(destination);
                if passed_go {
                    self.players[idx].add_cash(200);
                    self.emit(EventType::PassedGo, Some(player_id), HashMap::from([("salary".into(), 200.into())]));
                }
                match self.owner_of(destination) {
                    Some(owner_idx) if owner_idx != idx => {
                        let owner_id = self.players[owner_idx].player_id;
                        let rent = match target {
                            NearestTarget::Railroad => {
                                2 * self.rules().calculate_rent(destination, &self.players[owner_idx], None)
                            }
                            NearestTarget::Utility => {
                                let roll = self.dice.roll();
                                self.last_roll = Some(roll);
                                self.emit_dice_rolled(player_id, roll);
                                roll.total() * 10
                            }
                        };
                        self.emit(
                            EventType::CardEffect,
                            Some(player_id),
                            HashMap::from([("description".into(), card.description.into())]),
                        );
                        return Some(LandingResult::OwnedByOther { position: destination, owner_id, rent });
                    }
                    _ => {
                        landed_again = true;
                    }
                }
            }
            CardEffectKind::GoBack { spaces } => {
                self.players[idx].move_forward(-spaces);
                landed_again = true;
            }
            CardEffectKind::Collect { amount } => {
                self.players[idx].add_cash(amount);
            }
            CardEffectKind::Pay { amount } => {
                if !self.players[idx].remove_cash(amount) {
                    shortfall = Some(amount);
                }
            }
            // Capped at available cash rather than routed through bankruptcy
            // resolution: splitting one shortfall across up to three
            // creditors at once has no counterpart in the single-creditor
            // bankruptcy protocol the other debts use.
            CardEffectKind::PayEachPlayer { amount } => {
                let n = self.players.len();
                for other in 0..n {
                    if other == idx {
                        continue;
                    }
                    let paid = amount.min(self.players[idx].cash.max(0));
                    self.players[idx].remove_cash(paid);
                    self.players[other].add_cash(paid);
                }
            }
            CardEffectKind::CollectFromEach { amount } => {
                let n = self.players.len();
                for other in 0..n {
                    if other == idx {
                        continue;
                    }
                    let paid = amount.min(self.players[other].cash.max(0));
                    self.players[other].remove_cash(paid);
                    self.players[idx].add_cash(paid);
                }
            }
            CardEffectKind::Repairs { per_house, per_hotel } => {
                let mut total = 0;
                for &pos in self.players[idx].properties.clone().iter() {
                    let count = self.players[idx].house_count(pos);
                    total += if count == 5 { per_hotel } else { per_house * count as i64 };
                }
                if !self.players[idx].remove_cash(total) {
                    shortfall = Some(total);
                }
            }
            CardEffectKind::GoToJail => {
                self.send_current_player_to_jail("Go To Jail card");
            }
            CardEffectKind::GetOutOfJail => {
                self.players[idx].jail_cards += 1;
                if card.deck == crate::types::CardType::Chance {
                    self.chance.mark_jail_card_held();
                } else {
                    self.community_chest.mark_jail_card_held();
                }
            }
        }
        self.emit(
            EventType::CardEffect,
            Some(player_id),
            HashMap::from([("description".into(), card.description.into())]),
        );
        if let Some(amount) = shortfall {
            return Some(LandingResult::CardDebt { amount });
        }
        if landed_again {
            Some(self.process_landing())
        } else {
            None
        }
    }

    // ----- Property transactions -----------------------------------------

    pub fn buy_property(&mut self, position: usize) -> Result<(), String> {
        let idx = self.current_player_index;
        if !self.rules().can_buy_property(&self.players[idx], position) {
            return Err(format!("cannot buy property at position {position}"));
        }
        let price = self.board.purchase_price(position).expect("purchasable");
        self.players[idx].remove_cash(price);
        self.players[idx].add_property(position);
        let player_id = self.players[idx].player_id;
        self.emit(
            EventType::PropertyPurchased,
            Some(player_id),
            HashMap::from([
                ("position".into(), position.into()),
                ("name".into(), self.board.space(position).name.into()),
                ("price".into(), price.into()),
            ]),
        );
        Ok(())
    }

    pub fn pay_rent(&mut self, owner_id: usize, amount: i64) -> bool {
        let debtor_idx = self.current_player_index;
        let Some(owner_idx) = self.players.iter().position(|p| p.player_id == owner_id) else {
            return false;
        };
        let paid_in_full = self.players[debtor_idx].remove_cash(amount);
        if paid_in_full {
            self.players[owner_idx].add_cash(amount);
        }
        let debtor_id = self.players[debtor_idx].player_id;
        self.emit(
            EventType::RentPaid,
            Some(debtor_id),
            HashMap::from([
                ("to_player".into(), owner_id.into()),
                ("amount".into(), amount.into()),
                ("paid_in_full".into(), paid_in_full.into()),
            ]),
        );
        paid_in_full
    }

    pub fn pay_tax(&mut self, position: usize, amount: i64) -> bool {
        let idx = self.current_player_index;
        let paid_in_full = self.players[idx].remove_cash(amount);
        let player_id = self.players[idx].player_id;
        self.emit(
            EventType::TaxPaid,
            Some(player_id),
            HashMap::from([
                ("amount".into(), amount.into()),
                ("space".into(), position.into()),
                ("paid_in_full".into(), paid_in_full.into()),
            ]),
        );
        paid_in_full
    }

    /// Completes a debt that liquidation (selling buildings, mortgaging
    /// property) has just made affordable. Unlike `pay_rent`/`pay_tax`, this
    /// never fails: the caller is expected to have already confirmed the
    /// debtor's cash covers `amount`, so this only moves it. Uses the same
    /// all-or-nothing `remove_cash` as a sanity check rather than a decision
    /// point.
    pub fn force_pay_debt(&mut self, player_id: usize, creditor: BankruptcyCreditor, amount: i64) -> bool {
        let Some(idx) = self.players.iter().position(|p| p.player_id == player_id) else {
            return false;
        };
        if !self.players[idx].remove_cash(amount) {
            return false;
        }
        if let BankruptcyCreditor::Player(creditor_id) = creditor {
            if let Some(creditor_idx) = self.players.iter().position(|p| p.player_id == creditor_id) {
                self.players[creditor_idx].add_cash(amount);
            }
        }
        true
    }

    /// Resolves an auction given each participant's bid (0 means passed).
    /// Bids exceeding the bidder's cash or placed by a bankrupt player are
    /// ignored. Ties are broken in favor of the lowest player id.
    pub fn auction_property(&mut self, position: usize, bids: &[(usize, i64)]) -> AuctionResult {
        let winner = bids
            .iter()
            .filter(|(id, bid)| {
                *bid > 0 && self.players.iter().any(|p| p.player_id == *id && !p.is_bankrupt && p.cash >= *bid)
            })
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .copied();
        if let Some((winner_id, bid)) = winner {
            if let Some(idx) = self.players.iter().position(|p| p.player_id == winner_id) {
                self.players[idx].remove_cash(bid);
                self.players[idx].add_property(position);
            }
            self.emit(
                EventType::AuctionWon,
                Some(winner_id),
                HashMap::from([
                    ("position".into(), position.into()),
                    ("name".into(), self.board.space(position).name.into()),
                    ("bid".into(), bid.into()),
                ]),
            );
            AuctionResult { position, winner_id: Some(winner_id), winning_bid: bid }
        } else {
            AuctionResult { position, winner_id: None, winning_bid: 0 }
        }
    }

    pub fn build_house(&mut self, player_id: usize, position: usize) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        if !self.rules().can_build_house(&self.players[idx], self.bank.houses_available, position) {
            return Err(format!("cannot build house at position {position}"));
        }
        let cost = self.board.property_data(position).expect("property").house_cost;
        self.bank.buy_house();
        self.players[idx].remove_cash(cost);
        let count = self.players[idx].house_count(position) + 1;
        self.players[idx].set_houses(position, count);
        self.emit(
            EventType::HouseBuilt,
            Some(player_id),
            HashMap::from([
                ("position".into(), position.into()),
                ("name".into(), self.board.space(position).name.into()),
                ("houses".into(), count.into()),
                ("cost".into(), cost.into()),
            ]),
        );
        Ok(())
    }

    pub fn build_hotel(&mut self, player_id: usize, position: usize) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        if !self.rules().can_build_hotel(&self.players[idx], self.bank.hotels_available, position) {
            return Err(format!("cannot build hotel at position {position}"));
        }
        let cost = self.board.property_data(position).expect("property").house_cost;
        if !self.bank.upgrade_to_hotel() {
            return Err("bank has no hotels in stock".to_string());
        }
        self.players[idx].remove_cash(cost);
        self.players[idx].set_houses(position, 5);
        self.emit(
            EventType::HotelBuilt,
            Some(player_id),
            HashMap::from([
                ("position".into(), position.into()),
                ("name".into(), self.board.space(position).name.into()),
                ("cost".into(), cost.into()),
            ]),
        );
        Ok(())
    }

    /// Sells one building level back to the bank for half its build cost.
    pub fn sell_building(&mut self, player_id: usize, position: usize) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        let count = self.players[idx].house_count(position);
        if count == 0 {
            return Err(format!("no building to sell at position {position}"));
        }
        let house_cost = self.board.property_data(position).expect("property").house_cost;
        let refund = if count == 5 {
            if !self.rules().can_sell_hotel(&self.players[idx], position) {
                return Err(format!("cannot sell hotel at position {position}"));
            }
            if self.bank.downgrade_from_hotel() {
                self.players[idx].set_houses(position, 4);
                house_cost / 2
            } else {
                // Bank can't supply the 4 houses a downgrade needs: the
                // hotel is fully demolished instead.
                self.bank.return_hotel();
                self.players[idx].set_houses(position, 0);
                5 * (house_cost / 2)
            }
        } else {
            if !self.rules().can_sell_house(&self.players[idx], position) {
                return Err(format!("cannot sell house at position {position}"));
            }
            self.bank.return_house();
            self.players[idx].set_houses(position, count - 1);
            house_cost / 2
        };
        self.players[idx].add_cash(refund);
        self.emit(
            EventType::BuildingSold,
            Some(player_id),
            HashMap::from([("position".into(), position.into()), ("refund".into(), refund.into())]),
        );
        Ok(())
    }

    pub fn mortgage_property(&mut self, player_id: usize, position: usize) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        if !self.rules().can_mortgage(&self.players[idx], position) {
            return Err(format!("cannot mortgage position {position}"));
        }
        let value = self.rules().mortgage_value(position);
        self.players[idx].mortgage_property(position);
        self.players[idx].add_cash(value);
        self.emit(
            EventType::PropertyMortgaged,
            Some(player_id),
            HashMap::from([("position".into(), position.into()), ("value".into(), value.into())]),
        );
        Ok(())
    }

    pub fn unmortgage_property(&mut self, player_id: usize, position: usize) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        if !self.rules().can_unmortgage(&self.players[idx], position) {
            return Err(format!("cannot unmortgage position {position}"));
        }
        let cost = self.rules().unmortgage_cost(position);
        self.players[idx].remove_cash(cost);
        self.players[idx].unmortgage_property(position);
        self.emit(
            EventType::PropertyUnmortgaged,
            Some(player_id),
            HashMap::from([("position".into(), position.into()), ("cost".into(), cost.into())]),
        );
        Ok(())
    }

    // ----- Trades ----------------------------------------------------------

    pub fn execute_trade(&mut self, proposal: &TradeProposal) -> Result<(), String> {
        let proposer_idx = self
            .players
            .iter()
            .position(|p| p.player_id == proposal.proposer_id)
            .ok_or("unknown proposer")?;
        let receiver_idx = self
            .players
            .iter()
            .position(|p| p.player_id == proposal.receiver_id)
            .ok_or("unknown receiver")?;
        {
            let (proposer, receiver) = (&self.players[proposer_idx], &self.players[receiver_idx]);
            if let Err(reason) = self.rules().validate_trade(proposal, proposer, receiver) {
                self.emit(
                    EventType::TradeRejected,
                    Some(proposal.proposer_id),
                    HashMap::from([
                        ("receiver_id".into(), proposal.receiver_id.into()),
                        ("reason".into(), reason.clone().into()),
                    ]),
                );
                return Err(reason);
            }
        }
        for &pos in &proposal.offered_properties {
            self.transfer_property(proposer_idx, receiver_idx, pos);
        }
        for &pos in &proposal.requested_properties {
            self.transfer_property(receiver_idx, proposer_idx, pos);
        }
        self.players[proposer_idx].remove_cash(proposal.offered_cash);
        self.players[receiver_idx].add_cash(proposal.offered_cash);
        self.players[receiver_idx].remove_cash(proposal.requested_cash);
        self.players[proposer_idx].add_cash(proposal.requested_cash);
        self.players[proposer_idx].jail_cards -= proposal.offered_jail_cards;
        self.players[receiver_idx].jail_cards += proposal.offered_jail_cards;
        self.players[receiver_idx].jail_cards -= proposal.requested_jail_cards;
        self.players[proposer_idx].jail_cards += proposal.requested_jail_cards;
        self.emit(
            EventType::TradeAccepted,
            Some(proposal.proposer_id),
            HashMap::from([
                ("receiver_id".into(), proposal.receiver_id.into()),
                ("offered_properties".into(), proposal.offered_properties.clone().into()),
                ("requested_properties".into(), proposal.requested_properties.clone().into()),
                ("offered_cash".into(), proposal.offered_cash.into()),
                ("requested_cash".into(), proposal.requested_cash.into()),
            ]),
        );
        Ok(())
    }

    fn transfer_property(&mut self, from_idx: usize, to_idx: usize, position: usize) {
        let fee = if self.players[from_idx].is_mortgaged(position) {
            self.rules().mortgage_transfer_fee(position)
        } else {
            0
        };
        let was_mortgaged = self.players[from_idx].is_mortgaged(position);
        self.players[from_idx].remove_property(position);
        self.players[to_idx].add_property(position);
        if was_mortgaged {
            self.players[to_idx].mortgage_property(position);
            self.players[to_idx].remove_cash(fee);
        }
    }

    // ----- Jail --------------------------------------------------------

    pub fn pay_jail_fine(&mut self, player_id: usize) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        if !self.players[idx].in_jail {
            return Err("player is not in jail".to_string());
        }
        if !self.players[idx].remove_cash(JAIL_FINE) {
            return Err("insufficient cash to pay jail fine".to_string());
        }
        self.players[idx].release_from_jail();
        self.emit(EventType::PlayerFreed, Some(player_id), HashMap::from([("method".into(), "paid_fine".into())]));
        Ok(())
    }

    pub fn use_jail_card(&mut self, player_id: usize) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        if !self.players[idx].in_jail {
            return Err("player is not in jail".to_string());
        }
        if self.players[idx].jail_cards <= 0 {
            return Err("player holds no jail card".to_string());
        }
        self.players[idx].jail_cards -= 1;
        self.players[idx].release_from_jail();
        self.chance.return_jail_card();
        self.community_chest.return_jail_card();
        self.emit(EventType::PlayerFreed, Some(player_id), HashMap::from([("method".into(), "used_card".into())]));
        Ok(())
    }

    /// Attempts to roll out of jail. Frees the player on doubles; on a
    /// third failed attempt in a row, forces the fine and frees them
    /// regardless of the roll.
    pub fn attempt_jail_roll(&mut self) -> (DiceRoll, bool) {
        let idx = self.current_player_index;
        let roll = self.dice.roll();
        self.last_roll = Some(roll);
        let player_id = self.players[idx].player_id;
        self.emit_dice_rolled(player_id, roll);
        if roll.is_doubles() {
            self.players[idx].release_from_jail();
            self.emit(EventType::PlayerFreed, Some(player_id), HashMap::from([("method".into(), "rolled_doubles".into())]));
            return (roll, true);
        }
        self.players[idx].jail_turns += 1;
        if self.players[idx].jail_turns >= MAX_JAIL_TURNS {
            self.players[idx].remove_cash(JAIL_FINE);
            self.players[idx].release_from_jail();
            self.emit(EventType::PlayerFreed, Some(player_id), HashMap::from([("method".into(), "forced_payment".into())]));
            return (roll, true);
        }
        (roll, false)
    }

    // ----- Bankruptcy ----------------------------------------------------

    /// Liquidates every building back to the bank, then transfers cash and
    /// properties to `creditor` (or back to the bank, which simply returns
    /// properties to the unowned pool). Houses/hotels are always sold
    /// before transfer, regardless of creditor.
    pub fn declare_bankruptcy(&mut self, player_id: usize, creditor: BankruptcyCreditor) -> Result<(), String> {
        let idx = self.players.iter().position(|p| p.player_id == player_id).ok_or("unknown player")?;
        let properties: Vec<usize> = self.players[idx].properties.iter().copied().collect();
        for &pos in &properties {
            let count = self.players[idx].house_count(pos);
            if count == 5 {
                self.bank.return_hotel();
                self.players[idx].set_houses(pos, 0);
            } else if count > 0 {
                for _ in 0..count {
                    self.bank.return_house();
                }
                self.players[idx].set_houses(pos, 0);
            }
        }
        match creditor {
            BankruptcyCreditor::Bank => {
                for &pos in &properties {
                    self.players[idx].remove_property(pos);
                }
            }
            BankruptcyCreditor::Player(creditor_id) => {
                if let Some(creditor_idx) = self.players.iter().position(|p| p.player_id == creditor_id) {
                    let cash = self.players[idx].cash.max(0);
                    self.players[idx].cash -= cash;
                    self.players[creditor_idx].add_cash(cash);
                    for &pos in &properties {
                        self.transfer_property(idx, creditor_idx, pos);
                    }
                }
            }
        }
        self.players[idx].is_bankrupt = true;
        self.emit(EventType::PlayerBankrupt, Some(player_id), HashMap::new());
        Ok(())
    }

    // ----- Game lifecycle --------------------------------------------------

    pub fn advance_turn(&mut self) {
        self.turn_phase = TurnPhase::EndTurn;
        let n = self.players.len();
        for step in 1..=n {
            let next = (self.current_player_index + step) % n;
            if !self.players[next].is_bankrupt {
                self.current_player_index = next;
                return;
            }
        }
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_bankrupt)
    }

    pub fn is_over(&self) -> bool {
        self.active_players().count() <= 1
    }

    /// The sole remaining active player, if the game has ended by
    /// elimination (`None` if more than one player remains active).
    pub fn winner_by_elimination(&self) -> Option<usize> {
        let mut active = self.active_players();
        let first = active.next()?;
        if active.next().is_some() {
            None
        } else {
            Some(first.player_id)
        }
    }

    /// Highest net worth among active players, used when a turn limit is
    /// reached before anyone is eliminated. Ties favor the lowest player id.
    pub fn winner_by_net_worth(&self) -> Option<usize> {
        self.active_players()
            .map(|p| (p.player_id, p.net_worth(&self.board)))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(id, _)| id)
    }

    pub fn finish(&mut self, reason: &str) {
        self.phase = GamePhase::Finished;
        let winner_id = self.winner_by_elimination().or_else(|| self.winner_by_net_worth());
        let winner = winner_id.map(|id| {
            let player = self.players.iter().find(|p| p.player_id == id).expect("winner is a known player");
            serde_json::json!({
                "player_id": id,
                "name": player.name,
                "net_worth": player.net_worth(&self.board),
            })
        });
        self.emit(
            EventType::GameOver,
            winner_id,
            HashMap::from([
                ("turns".into(), self.turn_number.into()),
                ("winner".into(), winner.unwrap_or(serde_json::Value::Null)),
                ("reason".into(), reason.into()),
            ]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_has_four_players_with_starting_cash() {
        let game = Game::new(4, 1);
        assert_eq!(game.players.len(), 4);
        assert!(game.players.iter().all(|p| p.cash == 1500));
        assert_eq!(game.event_count(), 1); // GAME_STARTED
    }

    #[test]
    fn same_seed_produces_same_dice_sequence() {
        let mut a = Game::new(4, 99);
        let mut b = Game::new(4, 99);
        for _ in 0..20 {
            assert_eq!(a.roll_dice(), b.roll_dice());
        }
    }

    #[test]
    fn buying_unowned_property_transfers_cash_and_title() {
        let mut game = Game::new(2, 1);
        game.players[0].position = 1; // Mediterranean Avenue, price 60
        game.buy_property(1).unwrap();
        assert_eq!(game.players[0].cash, 1440);
        assert!(game.players[0].owns_property(1));
    }

    #[test]
    fn rent_is_paid_from_debtor_to_owner() {
        let mut game = Game::new(2, 1);
        game.players[1].add_property(1);
        game.players[0].position = 1;
        let rent = game.rules().calculate_rent(1, &game.players[1], None);
        let before = (game.players[0].cash, game.players[1].cash);
        let paid = game.pay_rent(game.players[1].player_id, rent);
        assert!(paid);
        assert_eq!(game.players[0].cash, before.0 - rent);
        assert_eq!(game.players[1].cash, before.1 + rent);
    }

    #[test]
    fn third_consecutive_double_sends_to_jail_instead_of_moving() {
        let mut game = Game::new(2, 1);
        game.players[0].consecutive_doubles = 2;
        game.last_roll = Some(DiceRoll { die1: 3, die2: 3 });
        let outcome = game.move_current_player();
        assert!(matches!(outcome, MoveOutcome::JailedForSpeeding));
        assert!(game.players[0].in_jail);
    }

    #[test]
    fn advance_turn_skips_bankrupt_players() {
        let mut game = Game::new(3, 1);
        game.players[1].is_bankrupt = true;
        game.current_player_index = 0;
        game.advance_turn();
        assert_eq!(game.current_player_index, 2);
    }

    #[test]
    fn game_is_over_when_only_one_player_remains() {
        let mut game = Game::new(3, 1);
        game.players[0].is_bankrupt = true;
        game.players[1].is_bankrupt = true;
        assert!(game.is_over());
        assert_eq!(game.winner_by_elimination(), Some(game.players[2].player_id));
    }

    #[test]
    fn bankruptcy_to_bank_liquidates_buildings_and_clears_title() {
        let mut game = Game::new(2, 1);
        game.players[0].add_property(1);
        game.players[0].set_houses(1, 2);
        let houses_before = game.bank.houses_available;
        game.declare_bankruptcy(game.players[0].player_id, BankruptcyCreditor::Bank).unwrap();
        assert!(game.players[0].is_bankrupt);
        assert!(!game.players[0].owns_property(1));
        assert_eq!(game.bank.houses_available, houses_before + 2);
    }

    #[test]
    fn bankruptcy_to_player_transfers_cash_and_properties() {
        let mut game = Game::new(2, 1);
        game.players[0].add_property(3);
        game.players[0].cash = 40;
        let creditor_id = game.players[1].player_id;
        let creditor_cash_before = game.players[1].cash;
        game.declare_bankruptcy(game.players[0].player_id, BankruptcyCreditor::Player(creditor_id)).unwrap();
        assert_eq!(game.players[0].cash, 0);
        assert_eq!(game.players[1].cash, creditor_cash_before + 40);
        assert!(game.players[1].owns_property(3));
    }

    #[test]
    fn auction_awards_to_highest_bidder_breaking_ties_by_lowest_id() {
        let mut game = Game::new(3, 1);
        let result = game.auction_property(1, &[(0, 50), (1, 50), (2, 30)]);
        assert_eq!(result.winner_id, Some(0));
        assert_eq!(result.winning_bid, 50);
    }

    #[test]
    fn trade_moves_properties_cash_and_jail_cards_both_ways() {
        let mut game = Game::new(2, 1);
        game.players[0].add_property(1);
        game.players[1].add_property(3);
        game.players[1].jail_cards = 1;
        let proposal = TradeProposal {
            proposer_id: game.players[0].player_id,
            receiver_id: game.players[1].player_id,
            offered_properties: vec![1],
            requested_properties: vec![3],
            offered_cash: 50,
            requested_cash: 0,
            offered_jail_cards: 0,
            requested_jail_cards: 1,
        };
        game.execute_trade(&proposal).unwrap();
        assert!(game.players[0].owns_property(3));
        assert!(game.players[1].owns_property(1));
        assert_eq!(game.players[0].jail_cards, 1);
    }

    #[test]
    fn jail_roll_forces_release_on_third_failed_attempt() {
        let mut game = Game::new(2, 1);
        game.players[0].in_jail = true;
        game.players[0].jail_turns = MAX_JAIL_TURNS - 1;
        game.players[0].cash = 100;
        // Drain rolls until a non-double appears to exercise the forced path;
        // deterministic seed 1 is used purely for reproducibility here.
        loop {
            let (roll, freed) = game.attempt_jail_roll();
            if !roll.is_doubles() {
                assert!(freed);
                assert!(!game.players[0].in_jail);
                break;
            }
            if !game.players[0].in_jail {
                break;
            }
        }
    }

    #[test]
    fn pay_card_effect_reports_shortfall_instead_of_capping() {
        let mut game = Game::new(2, 1);
        game.players[0].cash = 40;
        let card = Card { deck: crate::types::CardType::Chance, description: "Pay a fee", effect: CardEffectKind::Pay { amount: 100 } };
        let result = game.apply_card_effect(card);
        assert_eq!(game.players[0].cash, 40); // all-or-nothing: untouched, not capped
        assert!(matches!(result, Some(LandingResult::CardDebt { amount: 100 })));
    }

    #[test]
    fn pay_card_effect_with_sufficient_cash_deducts_in_full() {
        let mut game = Game::new(2, 1);
        game.players[0].cash = 500;
        let card = Card { deck: crate::types::CardType::Chance, description: "Pay a fee", effect: CardEffectKind::Pay { amount: 100 } };
        let result = game.apply_card_effect(card);
        assert_eq!(game.players[0].cash, 400);
        assert!(result.is_none());
    }

    #[test]
    fn force_pay_debt_transfers_cash_to_a_player_creditor() {
        let mut game = Game::new(2, 1);
        let debtor_id = game.players[0].player_id;
        let creditor_id = game.players[1].player_id;
        game.players[0].cash = 200;
        let creditor_before = game.players[1].cash;
        assert!(game.force_pay_debt(debtor_id, BankruptcyCreditor::Player(creditor_id), 150));
        assert_eq!(game.players[0].cash, 50);
        assert_eq!(game.players[1].cash, creditor_before + 150);
    }

    #[test]
    fn force_pay_debt_to_bank_only_removes_the_debtor_cash() {
        let mut game = Game::new(2, 1);
        let debtor_id = game.players[0].player_id;
        game.players[0].cash = 200;
        assert!(game.force_pay_debt(debtor_id, BankruptcyCreditor::Bank, 150));
        assert_eq!(game.players[0].cash, 50);
    }

    #[test]
    fn selling_a_hotel_downgrades_to_four_houses_when_the_bank_has_enough() {
        let mut game = Game::new(2, 1);
        game.players[0].add_property(1);
        game.players[0].set_houses(1, 5);
        game.bank.hotels_available = 11; // one hotel already out, matching the one on the board
        let houses_before = game.bank.houses_available;
        game.sell_building(game.players[0].player_id, 1).unwrap();
        assert_eq!(game.players[0].house_count(1), 4);
        assert_eq!(game.bank.houses_available, houses_before - 4);
        assert_eq!(game.bank.hotels_available, 12);
        assert_eq!(game.players[0].cash, 1500 + 25); // house_cost 50 / 2
    }

    #[test]
    fn selling_a_hotel_demolishes_it_when_the_bank_has_too_few_houses() {
        let mut game = Game::new(2, 1);
        game.players[0].add_property(1);
        game.players[0].set_houses(1, 5);
        game.bank.houses_available = 2;
        game.bank.hotels_available = 11;
        game.sell_building(game.players[0].player_id, 1).unwrap();
        assert_eq!(game.players[0].house_count(1), 0);
        assert_eq!(game.bank.houses_available, 2); // untouched: no houses were handed over
        assert_eq!(game.bank.hotels_available, 12);
        assert_eq!(game.players[0].cash, 1500 + 125); // 5 * (house_cost 50 / 2)
    }

    #[test]
    fn bankruptcy_returns_a_hotel_without_crediting_phantom_houses() {
        let mut game = Game::new(2, 1);
        game.players[0].add_property(1);
        game.players[0].set_houses(1, 5);
        game.bank.hotels_available = 11;
        let houses_before = game.bank.houses_available;
        game.declare_bankruptcy(game.players[0].player_id, BankruptcyCreditor::Bank).unwrap();
        assert_eq!(game.bank.houses_available, houses_before);
        assert_eq!(game.bank.hotels_available, 12);
    }
}
