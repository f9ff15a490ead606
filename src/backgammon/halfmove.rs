use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::backgammon::{Color, Location};

/// A single checker movement covering one die.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HalfMove {
    from: Location,
    to: Location,
}

impl HalfMove {
    pub fn new(from: Location, to: Location) -> Self {
        HalfMove { from, to }
    }

    /// Builds a move from raw indices as seen by `color`; the target is clamped
    /// to the bar/off sentinels so overshooting bear-offs land on [`Location::Off`].
    pub fn from_indices(color: Color, from: i8, to: i8) -> Self {
        HalfMove {
            from: Location::from_index(color, from),
            to: Location::from_index(color, to.clamp(-1, 24)),
        }
    }

    pub fn from(&self) -> Location {
        self.from
    }

    pub fn to(&self) -> Location {
        self.to
    }

    /// Number of pips between origin and target for `color`.
    pub fn distance(&self, color: Color) -> u8 {
        (self.to.index(color) - self.from.index(color)).unsigned_abs()
    }

    pub fn is_bear_off(&self) -> bool {
        self.to == Location::Off
    }

    pub fn is_entry(&self) -> bool {
        self.from == Location::Bar
    }
}

impl Debug for HalfMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}/{:?}", self.from, self.to)
    }
}
