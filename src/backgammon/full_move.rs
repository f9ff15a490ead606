use std::{fmt::Debug, ops::Deref};

use serde::{Deserialize, Serialize};

use crate::{backgammon::HalfMove, misc::TinyVec};

/// An ordered sequence of up to four half moves played with one roll.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<HalfMove>", try_from = "Vec<HalfMove>")]
pub struct FullMove {
    half_moves: TinyVec<HalfMove, 4>,
}

impl FullMove {
    pub fn new() -> Self {
        FullMove {
            half_moves: TinyVec::new(),
        }
    }

    pub fn add_half_move(&mut self, half_move: HalfMove) {
        self.half_moves.push(half_move);
    }

    /// Returns a copy with `half_move` put in front.
    pub fn prepended(&self, half_move: HalfMove) -> Self {
        let mut mv = FullMove::new();
        mv.add_half_move(half_move);
        for &hm in self.iter() {
            mv.add_half_move(hm);
        }
        mv
    }

    /// The half moves left to play after `played`, if `played` is a prefix of this move.
    pub fn remainder_after(&self, played: &[HalfMove]) -> Option<&[HalfMove]> {
        self.strip_prefix(played)
    }
}

impl Deref for FullMove {
    type Target = [HalfMove];

    fn deref(&self) -> &Self::Target {
        &self.half_moves
    }
}

impl From<FullMove> for Vec<HalfMove> {
    fn from(mv: FullMove) -> Self {
        mv.to_vec()
    }
}

impl TryFrom<Vec<HalfMove>> for FullMove {
    type Error = String;

    fn try_from(half_moves: Vec<HalfMove>) -> Result<Self, Self::Error> {
        FullMove::try_from(half_moves.as_slice())
    }
}

impl TryFrom<&[HalfMove]> for FullMove {
    type Error = String;

    fn try_from(half_moves: &[HalfMove]) -> Result<Self, Self::Error> {
        if half_moves.len() > 4 {
            return Err(format!("a full move has at most 4 half moves, got {}", half_moves.len()));
        }
        let mut mv = FullMove::new();
        for &hm in half_moves {
            mv.add_half_move(hm);
        }
        Ok(mv)
    }
}

impl Debug for FullMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move: ")?;
        for (i, half_move) in self.half_moves.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", half_move)?;
        }
        Ok(())
    }
}
