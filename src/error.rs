//! Error type shared by the board and the match.

use derive_more::{Display, Error};

use crate::backgammon::HalfMove;

/// Everything the engine can refuse or detect.
///
/// `IllegalMove`, `InvalidCommit` and `InvalidOperation` are recoverable: the
/// command was rejected and no state changed. `InconsistentBoard` and
/// `StructuralError` mean the caller broke a contract and should be
/// propagated to the command boundary.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// The move is not a prefix of any legal full move for the current roll.
    #[display("illegal move {_0:?}")]
    IllegalMove(#[error(not(source))] HalfMove),

    /// Dice remain and the moves played so far are not a complete legal move.
    #[display("commit not possible with dice remaining")]
    InvalidCommit,

    #[display("invalid operation: {_0}")]
    InvalidOperation(#[error(not(source))] String),

    #[display("inconsistent board: {_0}")]
    InconsistentBoard(#[error(not(source))] String),

    #[display("structural error: {_0}")]
    StructuralError(#[error(not(source))] String),
}

impl EngineError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::IllegalMove(_) | EngineError::InvalidCommit | EngineError::InvalidOperation(_)
        )
    }
}
