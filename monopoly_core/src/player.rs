//! Per-player mutable state. Grounded on `original_source/.../engine/player.py`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::board::Board;

pub const STARTING_CASH: i64 = 1500;
pub const BOARD_SIZE: usize = 40;
pub const JAIL_POSITION: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: usize,
    pub name: String,
    pub position: usize,
    pub cash: i64,
    pub properties: HashSet<usize>,
    /// position -> house count, 0..5 (5 == hotel).
    pub houses: HashMap<usize, u8>,
    pub mortgaged: HashSet<usize>,
    pub in_jail: bool,
    pub jail_turns: u8,
    pub jail_cards: i64,
    pub is_bankrupt: bool,
    pub consecutive_doubles: u8,
}

impl Player {
    pub fn new(player_id: usize, name: impl Into<String>) -> Self {
        Self {
            player_id,
            name: name.into(),
            position: 0,
            cash: STARTING_CASH,
            properties: HashSet::new(),
            houses: HashMap::new(),
            mortgaged: HashSet::new(),
            in_jail: false,
            jail_turns: 0,
            jail_cards: 0,
            is_bankrupt: false,
            consecutive_doubles: 0,
        }
    }

    pub fn add_cash(&mut self, amount: i64) {
        self.cash += amount;
    }

    /// Returns false (no-op) if insufficient funds.
    pub fn remove_cash(&mut self, amount: i64) -> bool {
        if self.cash < amount {
            return false;
        }
        self.cash -= amount;
        true
    }

    pub fn add_property(&mut self, position: usize) {
        self.properties.insert(position);
    }

    pub fn remove_property(&mut self, position: usize) {
        self.properties.remove(&position);
        self.mortgaged.remove(&position);
        self.houses.remove(&position);
    }

    pub fn owns_property(&self, position: usize) -> bool {
        self.properties.contains(&position)
    }

    pub fn mortgage_property(&mut self, position: usize) {
        self.mortgaged.insert(position);
    }

    pub fn unmortgage_property(&mut self, position: usize) {
        self.mortgaged.remove(&position);
    }

    pub fn is_mortgaged(&self, position: usize) -> bool {
        self.mortgaged.contains(&position)
    }

    pub fn house_count(&self, position: usize) -> u8 {
        *self.houses.get(&position).unwrap_or(&0)
    }

    pub fn set_houses(&mut self, position: usize, count: u8) {
        if count == 0 {
            self.houses.remove(&position);
        } else {
            self.houses.insert(position, count);
        }
    }

    pub fn send_to_jail(&mut self) {
        self.position = JAIL_POSITION;
        self.in_jail = true;
        self.jail_turns = 0;
        self.consecutive_doubles = 0;
    }

    pub fn release_from_jail(&mut self) {
        self.in_jail = false;
        self.jail_turns = 0;
    }

    /// Moves to an absolute position. Returns whether GO was passed, under
    /// the "new position strictly less than old" rule — callers decide
    /// whether to honor the salary (spec §4.4).
    pub fn move_to(&mut self, position: usize) -> bool {
        let old = self.position;
        self.position = position % BOARD_SIZE;
        self.position < old
    }

    /// Moves forward by `spaces`. Returns whether GO was passed.
    pub fn move_forward(&mut self, spaces: i64) -> bool {
        let old = self.position;
        let raw = (old as i64 + spaces).rem_euclid(BOARD_SIZE as i64);
        self.position = raw as usize;
        self.position < old
    }

    /// `cash + Σ(mortgage_value if mortgaged else price) + house_cost ×
    /// house_count` (hotel counts as 5 × house_cost, per spec §4.4).
    pub fn net_worth(&self, board: &Board) -> i64 {
        let mut total = self.cash;
        for &pos in &self.properties {
            let (list_price, mortgage_value, house_cost) =
                if let Some(p) = board.property_data(pos) {
                    (p.price, p.mortgage_value, p.house_cost)
                } else if let Some(r) = board.railroad_data(pos) {
                    (r.price, r.mortgage_value, 0)
                } else if let Some(u) = board.utility_data(pos) {
                    (u.price, u.mortgage_value, 0)
                } else {
                    continue;
                };
            total += if self.mortgaged.contains(&pos) { mortgage_value } else { list_price };
            total += house_cost * self.house_count(pos) as i64;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_1500_cash_and_position_zero() {
        let p = Player::new(0, "Player1");
        assert_eq!(p.cash, STARTING_CASH);
        assert_eq!(p.position, 0);
        assert!(p.properties.is_empty());
    }

    #[test]
    fn move_forward_wraps_and_detects_passed_go() {
        let mut p = Player::new(0, "P");
        p.position = 38;
        let passed = p.move_forward(4);
        assert_eq!(p.position, 2);
        assert!(passed);
    }

    #[test]
    fn move_forward_exactly_40_does_not_pass_go() {
        let mut p = Player::new(0, "P");
        p.position = 7;
        let passed = p.move_forward(40);
        assert_eq!(p.position, 7);
        assert!(!passed);
    }

    #[test]
    fn remove_cash_fails_on_insufficient_funds() {
        let mut p = Player::new(0, "P");
        p.cash = 10;
        assert!(!p.remove_cash(20));
        assert_eq!(p.cash, 10);
    }

    #[test]
    fn send_to_jail_resets_doubles_and_turns() {
        let mut p = Player::new(0, "P");
        p.consecutive_doubles = 2;
        p.send_to_jail();
        assert_eq!(p.position, JAIL_POSITION);
        assert!(p.in_jail);
        assert_eq!(p.jail_turns, 0);
        assert_eq!(p.consecutive_doubles, 0);
    }

    #[test]
    fn net_worth_counts_mortgage_value_when_mortgaged() {
        let board = Board;
        let mut p = Player::new(0, "P");
        p.cash = 0;
        p.add_property(1); // Mediterranean Avenue: price 60, mortgage 30
        p.mortgage_property(1);
        assert_eq!(p.net_worth(&board), 30);
    }
}
