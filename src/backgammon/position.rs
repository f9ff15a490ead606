use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::backgammon::Color;

/// Where a checker can be. Which bar or off tray is meant depends on the
/// color of the checker being moved.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Bar,
    Off,
    Point(u8),
}

impl Location {
    /// Maps a raw index in `-1..=24` (values outside are clamped) to a location
    /// as seen by `color`. White enters from -1 and bears off at 24, Black the other way round.
    pub fn from_index(color: Color, index: i8) -> Self {
        match index {
            0..=23 => Location::Point(index as u8),
            i if i < 0 => match color {
                Color::White => Location::Bar,
                Color::Black => Location::Off,
            },
            _ => match color {
                Color::White => Location::Off,
                Color::Black => Location::Bar,
            },
        }
    }

    /// Inverse of [`Self::from_index`].
    pub fn index(&self, color: Color) -> i8 {
        match self {
            Location::Bar => color.bar_index(),
            Location::Off => color.off_index(),
            Location::Point(p) => *p as i8,
        }
    }

    pub fn point(&self) -> Option<u8> {
        match self {
            Location::Point(p) => Some(*p),
            _ => None,
        }
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Bar => write!(f, "Bar"),
            Location::Off => write!(f, "Off"),
            Location::Point(p) => write!(f, "{p}"),
        }
    }
}
