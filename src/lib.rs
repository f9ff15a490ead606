//! Backgammon rules engine: a [`Board`] that knows the legal moves for a roll and
//! a [`Match`] that runs turns, the doubling cube, resignations and the score.

pub mod backgammon;
pub mod config;
pub mod error;
pub mod misc;

pub use backgammon::{Board, Color, Dice, FullMove, HalfMove, Location, Match, MatchEvent, Phase, WinKind};
pub use config::MatchConfig;
pub use error::EngineError;
