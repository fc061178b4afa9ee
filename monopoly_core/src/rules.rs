//! Pure predicates and calculators. Grounded on
//! `original_source/.../engine/rules.py`. Holds a `Board` reference only;
//! never mutates Player/Bank itself (spec §4.5).

use crate::board::Board;
use crate::player::Player;
use crate::types::{ColorGroup, DiceRoll, SpaceType, TradeProposal};

#[derive(Debug, Clone, Copy)]
pub struct Rules<'b> {
    pub board: &'b Board,
}

impl<'b> Rules<'b> {
    pub fn new(board: &'b Board) -> Self {
        Self { board }
    }

    /// Rent owed on `position` to its `owner`. Utility rent requires a dice
    /// roll; panics if asked for without one (programmer error — the engine
    /// always has a roll by the time rent is calculated).
    pub fn calculate_rent(&self, position: usize, owner: &Player, dice_roll: Option<DiceRoll>) -> i64 {
        if owner.is_mortgaged(position) {
            return 0;
        }
        let space = self.board.space(position);
        match space.space_type {
            SpaceType::Property => self.property_rent(position, owner),
            SpaceType::Railroad => self.railroad_rent(owner),
            SpaceType::Utility => {
                let roll = dice_roll.expect("utility rent requires a dice roll");
                self.utility_rent(owner, roll)
            }
            _ => 0,
        }
    }

    fn property_rent(&self, position: usize, owner: &Player) -> i64 {
        let data = self.board.property_data(position).expect("property data");
        let houses = owner.house_count(position);
        if houses > 0 {
            return data.rent[houses as usize];
        }
        if self.has_monopoly(owner, data.color_group) {
            data.rent[0] * 2
        } else {
            data.rent[0]
        }
    }

    fn railroad_rent(&self, owner: &Player) -> i64 {
        let count = [5usize, 15, 25, 35]
            .iter()
            .filter(|&&pos| owner.owns_property(pos) && !owner.is_mortgaged(pos))
            .count();
        crate::board::railroad_rent(count)
    }

    fn utility_rent(&self, owner: &Player, roll: DiceRoll) -> i64 {
        let count = [12usize, 28]
            .iter()
            .filter(|&&pos| owner.owns_property(pos) && !owner.is_mortgaged(pos))
            .count();
        roll.total() * crate::board::utility_multiplier(count)
    }

    pub fn has_monopoly(&self, player: &Player, group: ColorGroup) -> bool {
        self.board
            .color_group_positions(group)
            .iter()
            .all(|pos| player.owns_property(*pos))
    }

    fn group_of(&self, position: usize) -> Option<ColorGroup> {
        self.board.color_group(position)
    }

    fn siblings_of(&self, position: usize) -> &'static [usize] {
        match self.group_of(position) {
            Some(group) => self.board.color_group_positions(group),
            None => &[],
        }
    }

    fn any_sibling_mortgaged(&self, player: &Player, position: usize) -> bool {
        self.siblings_of(position)
            .iter()
            .any(|&s| player.is_mortgaged(s))
    }

    /// A house may be built on `position` only with a full monopoly, no
    /// mortgaged sibling, current count < 4, even-build across siblings,
    /// cash for the cost, and bank stock.
    pub fn can_build_house(&self, player: &Player, bank_houses_available: i64, position: usize) -> bool {
        let Some(group) = self.group_of(position) else { return false };
        if !self.has_monopoly(player, group) {
            return false;
        }
        if self.any_sibling_mortgaged(player, position) {
            return false;
        }
        let current = player.house_count(position);
        if current >= 4 {
            return false;
        }
        let even = self
            .siblings_of(position)
            .iter()
            .filter(|&&s| s != position)
            .all(|&s| player.house_count(s) >= current);
        if !even {
            return false;
        }
        let data = self.board.property_data(position).expect("property data");
        if player.cash < data.house_cost {
            return false;
        }
        bank_houses_available > 0
    }

    /// A hotel may replace the 4th house only when every sibling has at
    /// least 4 houses (or a hotel already), with the same ownership/cash
    /// preconditions as `can_build_house`.
    pub fn can_build_hotel(&self, player: &Player, bank_hotels_available: i64, position: usize) -> bool {
        let Some(group) = self.group_of(position) else { return false };
        if !self.has_monopoly(player, group) {
            return false;
        }
        if self.any_sibling_mortgaged(player, position) {
            return false;
        }
        if player.house_count(position) != 4 {
            return false;
        }
        let even = self
            .siblings_of(position)
            .iter()
            .filter(|&&s| s != position)
            .all(|&s| player.house_count(s) >= 4);
        if !even {
            return false;
        }
        let data = self.board.property_data(position).expect("property data");
        if player.cash < data.house_cost {
            return false;
        }
        bank_hotels_available > 0
    }

    /// Mirror of `can_build_house`: no sibling may hold more houses than
    /// `position` after the sale.
    pub fn can_sell_house(&self, player: &Player, position: usize) -> bool {
        let current = player.house_count(position);
        if !(1..=4).contains(&current) {
            return false;
        }
        self.siblings_of(position)
            .iter()
            .filter(|&&s| s != position)
            .all(|&s| player.house_count(s) <= current)
    }

    pub fn can_sell_hotel(&self, player: &Player, position: usize) -> bool {
        player.house_count(position) == 5
    }

    pub fn can_mortgage(&self, player: &Player, position: usize) -> bool {
        if !player.owns_property(position) || player.is_mortgaged(position) {
            return false;
        }
        if self.group_of(position).is_some() {
            return self
                .siblings_of(position)
                .iter()
                .all(|&s| player.house_count(s) == 0);
        }
        true
    }

    pub fn can_unmortgage(&self, player: &Player, position: usize) -> bool {
        player.owns_property(position)
            && player.is_mortgaged(position)
            && player.cash >= self.unmortgage_cost(position)
    }

    /// `floor(mortgage_value × 1.1)`.
    pub fn unmortgage_cost(&self, position: usize) -> i64 {
        (self.mortgage_value(position) as f64 * 1.1) as i64
    }

    /// `floor(mortgage_value × 0.1)`, charged to whoever receives a
    /// mortgaged property in a trade.
    pub fn mortgage_transfer_fee(&self, position: usize) -> i64 {
        (self.mortgage_value(position) as f64 * 0.1) as i64
    }

    pub fn mortgage_value(&self, position: usize) -> i64 {
        if let Some(p) = self.board.property_data(position) {
            return p.mortgage_value;
        }
        if let Some(r) = self.board.railroad_data(position) {
            return r.mortgage_value;
        }
        if let Some(u) = self.board.utility_data(position) {
            return u.mortgage_value;
        }
        0
    }

    pub fn can_buy_property(&self, player: &Player, position: usize) -> bool {
        self.board.is_purchasable(position)
            && self
                .board
                .purchase_price(position)
                .is_some_and(|price| player.cash >= price)
    }

    /// Every offered/requested item must be legally movable; at least one
    /// item must change hands.
    pub fn validate_trade(
        &self,
        proposal: &TradeProposal,
        proposer: &Player,
        receiver: &Player,
    ) -> Result<(), String> {
        for &pos in &proposal.offered_properties {
            if !proposer.owns_property(pos) {
                return Err(format!("proposer does not own property at position {pos}"));
            }
            if proposer.house_count(pos) > 0 {
                return Err(format!("must sell buildings before trading property at position {pos}"));
            }
        }
        for &pos in &proposal.requested_properties {
            if !receiver.owns_property(pos) {
                return Err(format!("receiver does not own property at position {pos}"));
            }
            if receiver.house_count(pos) > 0 {
                return Err(format!("must sell buildings before trading property at position {pos}"));
            }
        }
        if proposal.offered_cash > proposer.cash {
            return Err("proposer cannot afford offered cash".to_string());
        }
        if proposal.requested_cash > receiver.cash {
            return Err("receiver cannot afford requested cash".to_string());
        }
        if proposal.offered_jail_cards > proposer.jail_cards {
            return Err("proposer does not hold enough jail cards".to_string());
        }
        if proposal.requested_jail_cards > receiver.jail_cards {
            return Err("receiver does not hold enough jail cards".to_string());
        }
        let nothing_moves = proposal.offered_properties.is_empty()
            && proposal.requested_properties.is_empty()
            && proposal.offered_cash == 0
            && proposal.requested_cash == 0
            && proposal.offered_jail_cards == 0
            && proposal.requested_jail_cards == 0;
        if nothing_moves {
            return Err("trade must involve at least one item".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;

    fn owner_with(positions: &[usize]) -> Player {
        let mut p = Player::new(0, "Owner");
        for &pos in positions {
            p.add_property(pos);
        }
        p
    }

    #[test]
    fn monopoly_doubles_base_rent() {
        let board = Board;
        let rules = Rules::new(&board);
        let owner = owner_with(&[1, 3]);
        assert_eq!(rules.calculate_rent(1, &owner, None), 4);
    }

    #[test]
    fn rent_with_one_house_uses_rent_table() {
        let board = Board;
        let rules = Rules::new(&board);
        let mut owner = owner_with(&[1, 3]);
        owner.set_houses(1, 1);
        assert_eq!(rules.calculate_rent(1, &owner, None), 10);
    }

    #[test]
    fn railroad_rent_by_count() {
        let board = Board;
        let rules = Rules::new(&board);
        let owner = owner_with(&[5, 15]);
        assert_eq!(rules.calculate_rent(5, &owner, None), 50);
    }

    #[test]
    fn mortgaged_railroad_excluded_from_count() {
        let board = Board;
        let rules = Rules::new(&board);
        let mut owner = owner_with(&[5, 15]);
        owner.mortgage_property(15);
        assert_eq!(rules.calculate_rent(5, &owner, None), 25);
    }

    #[test]
    fn utility_rent_uses_dice_total() {
        let board = Board;
        let rules = Rules::new(&board);
        let owner = owner_with(&[12]);
        let roll = DiceRoll { die1: 3, die2: 4 };
        assert_eq!(rules.calculate_rent(12, &owner, Some(roll)), 28);
    }

    #[test]
    fn unmortgage_cost_is_110_percent_floor() {
        let board = Board;
        let rules = Rules::new(&board);
        assert_eq!(rules.unmortgage_cost(1), 33); // 30 * 1.1 = 33
    }

    #[test]
    fn mortgage_transfer_fee_is_10_percent_floor() {
        let board = Board;
        let rules = Rules::new(&board);
        assert_eq!(rules.mortgage_transfer_fee(1), 3); // 30 * 0.1 = 3
    }

    #[test]
    fn even_build_blocks_building_further_ahead_of_siblings() {
        let board = Board;
        let rules = Rules::new(&board);
        let mut owner = owner_with(&[1, 3]);
        owner.set_houses(1, 2);
        owner.cash = 1000;
        // 1 already has 2 houses while 3 has 0: building further on 1 is blocked.
        assert!(!rules.can_build_house(&owner, 10, 1));
        // Building on the lagging property 3 is fine.
        assert!(rules.can_build_house(&owner, 10, 3));
    }

    #[test]
    fn can_mortgage_blocked_by_buildings_in_group() {
        let board = Board;
        let rules = Rules::new(&board);
        let mut owner = owner_with(&[1, 3]);
        owner.set_houses(1, 1);
        assert!(!rules.can_mortgage(&owner, 3));
    }

    #[test]
    fn trade_validation_rejects_unowned_offer() {
        let board = Board;
        let rules = Rules::new(&board);
        let proposer = Player::new(0, "A");
        let receiver = Player::new(1, "B");
        let proposal = TradeProposal {
            proposer_id: 0,
            receiver_id: 1,
            offered_properties: vec![1],
            requested_properties: vec![],
            offered_cash: 0,
            requested_cash: 0,
            offered_jail_cards: 0,
            requested_jail_cards: 0,
        };
        assert!(rules.validate_trade(&proposal, &proposer, &receiver).is_err());
    }
}
