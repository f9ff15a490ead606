//! Notifications a [`crate::backgammon::Match`] sends to its observers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backgammon::{Color, Dice, HalfMove, WinKind};

/// Score, cube and turn at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub length: u32,
    pub score_white: u32,
    pub score_black: u32,
    pub cube: u32,
    pub color_to_move: Option<Color>,
    pub white_may_double: bool,
    pub black_may_double: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    MatchCreated { length: u32 },
    MatchState(MatchSnapshot),
    /// Opening roll of a game; the higher die moves first.
    Rollout { white: u8, black: u8 },
    DiceRolled { color: Color, dice: Dice },
    MoveApplied { color: Color, half_move: HalfMove },
    MoveUndone { color: Color, half_move: HalfMove },
    /// `color` is the color of the checker sent to the bar.
    CheckerHit { color: Color, point: u8 },
    CheckerUnhit { color: Color, point: u8 },
    TurnCommitted { color: Color, moves: Vec<HalfMove> },
    CubeChallenge { from: Color, proposed_cube: u32 },
    CubeAccepted { by: Color, cube: u32 },
    ResignationOffered { from: Color, kind: WinKind },
    OfferRejected { by: Color },
    GameEnded { winner: Color, points: u32 },
    MatchEnded { winner: Color, score_white: u32, score_black: u32 },
}

/// Receives every event synchronously, right after the state change it describes.
pub trait MatchObserver {
    fn notify(&mut self, event: &MatchEvent);
}

impl<F> MatchObserver for F
where
    F: FnMut(&MatchEvent),
{
    fn notify(&mut self, event: &MatchEvent) {
        self(event)
    }
}

/// Logs every event at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MatchObserver for TracingObserver {
    fn notify(&mut self, event: &MatchEvent) {
        debug!(?event, "match event");
    }
}
