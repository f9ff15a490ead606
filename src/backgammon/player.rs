use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// +1 for White (moves 0 -> 23), -1 for Black (moves 23 -> 0).
    pub fn direction(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn home_points(&self) -> RangeInclusive<u8> {
        match self {
            Color::White => 18..=23,
            Color::Black => 0..=5,
        }
    }

    pub fn is_home(&self, point: u8) -> bool {
        self.home_points().contains(&point)
    }

    /// Numeric index of the bar sentinel, one step before the first point this color enters on.
    pub fn bar_index(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 24,
        }
    }

    /// Numeric index of the off sentinel, one step past this color's last home point.
    pub fn off_index(&self) -> i8 {
        match self {
            Color::White => 24,
            Color::Black => -1,
        }
    }

    /// Point a checker from the bar lands on when entering with `die`.
    pub fn entry_point(&self, die: u8) -> u8 {
        match self {
            Color::White => die - 1,
            Color::Black => 24 - die,
        }
    }

    /// Array slot used by per-color tables.
    pub(crate) fn slot(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}
