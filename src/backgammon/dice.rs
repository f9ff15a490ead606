use std::fmt::Debug;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The outcome of rolling two dice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dice {
    die1: u8,
    die2: u8,
}

impl Dice {
    /// Every distinct roll, without regard to order.
    pub const ALL: [Self; 21] = [
        Dice::from_numbers(1, 1), Dice::from_numbers(1, 2), Dice::from_numbers(1, 3),
        Dice::from_numbers(1, 4), Dice::from_numbers(1, 5), Dice::from_numbers(1, 6),
        Dice::from_numbers(2, 2), Dice::from_numbers(2, 3), Dice::from_numbers(2, 4),
        Dice::from_numbers(2, 5), Dice::from_numbers(2, 6),
        Dice::from_numbers(3, 3), Dice::from_numbers(3, 4), Dice::from_numbers(3, 5),
        Dice::from_numbers(3, 6),
        Dice::from_numbers(4, 4), Dice::from_numbers(4, 5), Dice::from_numbers(4, 6),
        Dice::from_numbers(5, 5), Dice::from_numbers(5, 6),
        Dice::from_numbers(6, 6)
    ];

    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        let die1 = rng.random_range(1..=6);
        let die2 = rng.random_range(1..=6);
        Dice::from_numbers(die1, die2)
    }

    /// Rolls until the two dice differ. Used to decide who opens a game.
    pub fn rollout<R: Rng>(rng: &mut R) -> Self {
        loop {
            let dice = Dice::roll(rng);
            if !dice.is_double() {
                return dice;
            }
        }
    }

    pub const fn from_numbers(die1: u8, die2: u8) -> Self {
        Dice { die1, die2 }
    }

    /// Checked constructor for dice coming from outside the engine.
    pub fn new(die1: u8, die2: u8) -> Result<Self, EngineError> {
        if !(1..=6).contains(&die1) || !(1..=6).contains(&die2) {
            return Err(EngineError::StructuralError(format!("invalid dice {die1}/{die2}")));
        }
        Ok(Dice::from_numbers(die1, die2))
    }

    pub fn die1(&self) -> u8 {
        self.die1
    }

    pub fn die2(&self) -> u8 {
        self.die2
    }

    pub fn is_double(&self) -> bool {
        self.die1 == self.die2
    }

    /// The dice available to move with: two values, or four equal ones for a double.
    pub fn values(&self) -> Vec<u8> {
        if self.is_double() {
            vec![self.die1; 4]
        } else {
            vec![self.die1, self.die2]
        }
    }

    /// Checks a list of die values for move generation: two values, or four equal
    /// values, each in `1..=6`.
    pub fn check_values(values: &[u8]) -> Result<(), EngineError> {
        if values.len() != 2 && values.len() != 4 {
            return Err(EngineError::StructuralError(format!(
                "dice must have 2 or 4 values, got {values:?}"
            )));
        }
        if values.iter().any(|d| !(1..=6).contains(d)) {
            return Err(EngineError::StructuralError(format!("die out of range in {values:?}")));
        }
        if values.len() == 4 && values.iter().any(|&d| d != values[0]) {
            return Err(EngineError::StructuralError(format!("4 dice must be a double, got {values:?}")));
        }
        Ok(())
    }
}

impl Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_double() {
            write!(f, "Double({})", self.die1)
        } else {
            write!(f, "Dice({} | {})", self.die1, self.die2)
        }
    }
}

impl std::fmt::Display for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.die1, self.die2)
    }
}
