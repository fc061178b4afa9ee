//! Seeded dice rolls. Grounded on `original_source/.../engine/dice.py`.

use crate::rng::DeterministicRng;
use crate::types::DiceRoll;

pub struct Dice {
    rng: DeterministicRng,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self { rng: DeterministicRng::new(seed) }
    }

    pub fn roll(&mut self) -> DiceRoll {
        DiceRoll {
            die1: self.rng.gen_range_inclusive(1, 6),
            die2: self.rng.gen_range_inclusive(1, 6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_are_in_range() {
        let mut dice = Dice::new(1);
        for _ in 0..1000 {
            let roll = dice.roll();
            assert!((1..=6).contains(&roll.die1));
            assert!((1..=6).contains(&roll.die2));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Dice::new(42);
        let mut b = Dice::new(42);
        for _ in 0..50 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn total_and_doubles_derived_correctly() {
        let roll = DiceRoll { die1: 3, die2: 3 };
        assert_eq!(roll.total(), 6);
        assert!(roll.is_doubles());
        let roll = DiceRoll { die1: 3, die2: 4 };
        assert!(!roll.is_doubles());
    }
}
