//! Chance and Community Chest decks.
//!
//! Card contents are fixed; only the shuffle order is seeded. Grounded on
//! `original_source/backend/src/monopoly/engine/cards.py`.

use crate::rng::DeterministicRng;
use crate::types::{Card, CardEffectKind, CardType, NearestTarget};

fn chance_cards() -> Vec<Card> {
    use CardEffectKind::*;
    vec![
        Card { deck: CardType::Chance, description: "Advance to Boardwalk", effect: AdvanceTo { destination: 39 } },
        Card { deck: CardType::Chance, description: "Advance to GO (Collect $200)", effect: AdvanceTo { destination: 0 } },
        Card { deck: CardType::Chance, description: "Advance to Illinois Avenue. If you pass GO, collect $200", effect: AdvanceTo { destination: 24 } },
        Card { deck: CardType::Chance, description: "Advance to St. Charles Place. If you pass GO, collect $200", effect: AdvanceTo { destination: 11 } },
        Card { deck: CardType::Chance, description: "Advance to the nearest Railroad. Pay owner twice the rental", effect: AdvanceToNearest { target: NearestTarget::Railroad } },
        Card { deck: CardType::Chance, description: "Advance to the nearest Railroad. Pay owner twice the rental", effect: AdvanceToNearest { target: NearestTarget::Railroad } },
        Card { deck: CardType::Chance, description: "Advance to the nearest Utility. If unowned, you may buy it; if owned, pay owner 10x dice roll", effect: AdvanceToNearest { target: NearestTarget::Utility } },
        Card { deck: CardType::Chance, description: "Bank pays you dividend of $50", effect: Collect { amount: 50 } },
        Card { deck: CardType::Chance, description: "Get Out of Jail Free", effect: GetOutOfJail },
        Card { deck: CardType::Chance, description: "Go Back 3 Spaces", effect: GoBack { spaces: 3 } },
        Card { deck: CardType::Chance, description: "Go to Jail", effect: GoToJail },
        Card { deck: CardType::Chance, description: "Make general repairs: $25/house, $100/hotel", effect: Repairs { per_house: 25, per_hotel: 100 } },
        Card { deck: CardType::Chance, description: "Speeding fine $15", effect: Pay { amount: 15 } },
        Card { deck: CardType::Chance, description: "Take a trip to Reading Railroad. If you pass GO, collect $200", effect: AdvanceTo { destination: 5 } },
        Card { deck: CardType::Chance, description: "You have been elected Chairman of the Board. Pay each player $50", effect: PayEachPlayer { amount: 50 } },
        Card { deck: CardType::Chance, description: "Your building loan matures. Collect $150", effect: Collect { amount: 150 } },
    ]
}

fn community_chest_cards() -> Vec<Card> {
    use CardEffectKind::*;
    vec![
        Card { deck: CardType::CommunityChest, description: "Advance to GO (Collect $200)", effect: AdvanceTo { destination: 0 } },
        Card { deck: CardType::CommunityChest, description: "Bank error in your favor. Collect $200", effect: Collect { amount: 200 } },
        Card { deck: CardType::CommunityChest, description: "Doctor's fee. Pay $50", effect: Pay { amount: 50 } },
        Card { deck: CardType::CommunityChest, description: "From sale of stock you get $50", effect: Collect { amount: 50 } },
        Card { deck: CardType::CommunityChest, description: "Get Out of Jail Free", effect: GetOutOfJail },
        Card { deck: CardType::CommunityChest, description: "Go to Jail", effect: GoToJail },
        Card { deck: CardType::CommunityChest, description: "Grand Opera Night. Collect $50 from every player", effect: CollectFromEach { amount: 50 } },
        Card { deck: CardType::CommunityChest, description: "Income tax refund. Collect $20", effect: Collect { amount: 20 } },
        Card { deck: CardType::CommunityChest, description: "It is your birthday. Collect $10 from every player", effect: CollectFromEach { amount: 10 } },
        Card { deck: CardType::CommunityChest, description: "Life insurance matures. Collect $100", effect: Collect { amount: 100 } },
        Card { deck: CardType::CommunityChest, description: "Pay hospital fees of $100", effect: Pay { amount: 100 } },
        Card { deck: CardType::CommunityChest, description: "Pay school fees of $50", effect: Pay { amount: 50 } },
        Card { deck: CardType::CommunityChest, description: "Receive $25 consultancy fee", effect: Collect { amount: 25 } },
        Card { deck: CardType::CommunityChest, description: "You are assessed for street repairs: $40/house, $115/hotel", effect: Repairs { per_house: 40, per_hotel: 115 } },
        Card { deck: CardType::CommunityChest, description: "You have won second prize in a beauty contest. Collect $10", effect: Collect { amount: 10 } },
        Card { deck: CardType::CommunityChest, description: "You inherit $100", effect: Collect { amount: 100 } },
    ]
}

/// A shuffled, reshuffle-on-exhaustion draw pile for one deck.
pub struct Deck {
    cards: Vec<Card>,
    draw_pile: Vec<Card>,
    rng: DeterministicRng,
    jail_card_held: bool,
}

impl Deck {
    fn new(cards: Vec<Card>, seed: u64) -> Self {
        let mut deck = Self {
            cards,
            draw_pile: Vec::new(),
            rng: DeterministicRng::new(seed),
            jail_card_held: false,
        };
        deck.shuffle();
        deck
    }

    pub fn chance(seed: u64) -> Self {
        Self::new(chance_cards(), seed)
    }

    pub fn community_chest(seed: u64) -> Self {
        Self::new(community_chest_cards(), seed)
    }

    fn shuffle(&mut self) {
        let mut pile = self.cards.clone();
        self.rng.shuffle(&mut pile);
        self.draw_pile = pile;
    }

    /// Draw the top card, reshuffling (excluding the held jail card, if any)
    /// on exhaustion.
    pub fn draw(&mut self) -> Card {
        if self.draw_pile.is_empty() {
            self.shuffle();
            if self.jail_card_held {
                self.draw_pile
                    .retain(|c| !matches!(c.effect, CardEffectKind::GetOutOfJail));
            }
        }
        self.draw_pile.remove(0)
    }

    pub fn return_jail_card(&mut self) {
        self.jail_card_held = false;
    }

    pub fn mark_jail_card_held(&mut self) {
        self.jail_card_held = true;
    }

    pub fn cards_remaining(&self) -> usize {
        self.draw_pile.len()
    }
}
