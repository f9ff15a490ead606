use serde::{Deserialize, Serialize};

use crate::backgammon::Color;

/// How big a win is. Also the value of a resignation offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinKind {
    Normal,
    Gammon,
    Backgammon,
}

impl WinKind {
    pub fn points(&self) -> u32 {
        match self {
            WinKind::Normal => 1,
            WinKind::Gammon => 2,
            WinKind::Backgammon => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Win {
    pub winner: Color,
    pub kind: WinKind,
}

impl Win {
    pub fn points(&self) -> u32 {
        self.kind.points()
    }
}
