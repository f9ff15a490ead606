use std::fmt;

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, instrument, warn};

use crate::{
    backgammon::{
        Board, Color, Dice, FullMove, HalfMove, Location, MatchEvent, MatchObserver,
        MatchSnapshot, WinKind,
    },
    config::MatchConfig,
    error::EngineError,
};

/// The cube is never turned past this value.
pub const MAX_CUBE: u32 = 64;

/// Where a match stands, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nobody has been chosen to move yet.
    AwaitingOpeningRoll,
    AwaitingDiceRoll(Color),
    /// Dice rolled, the moves played so far are not a complete move.
    MidTurn(Color),
    /// The turn can be committed.
    AwaitingCommit(Color),
    CubeOffered { from: Color },
    ResignationOffered { from: Color, kind: WinKind },
    MatchOver(Color),
}

/// A contest between two colors played to `length` points.
///
/// All play goes through the methods below. A rejected command returns an error,
/// is logged and changes nothing.
pub struct Match {
    length: u32,
    pub(crate) score: [u32; 2],
    pub(crate) color_to_move_next: Option<Color>,
    pub(crate) initial_dice: Vec<u8>,
    pub(crate) remaining_dice: Vec<u8>,
    /// Dice used by the moves on the board's stack, in the same order.
    consumed_dice: Vec<u8>,
    pub(crate) cube: u32,
    pub(crate) may_double: [bool; 2],
    pub(crate) open_cube_challenge_from: Option<Color>,
    resignation_offered: Option<(Color, WinKind)>,
    pub(crate) board: Board,
    players: [Option<String>; 2],
    winner: Option<Color>,
    rng: StdRng,
    observers: Vec<Box<dyn MatchObserver>>,
}

impl Match {
    /// Creates a match and sets up its first game.
    pub fn new(config: MatchConfig) -> Self {
        Match::with_observers(config, Vec::new())
    }

    /// Like [`Self::new`], with observers that also see the events of the first game's setup.
    pub fn with_observers(config: MatchConfig, observers: Vec<Box<dyn MatchObserver>>) -> Self {
        let mut m = Match::blank(config);
        m.observers = observers;
        m.emit(MatchEvent::MatchCreated { length: m.length });
        m.new_game();
        m
    }

    /// A match with the starting position and nobody to move. No game is set up.
    pub(crate) fn blank(config: MatchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Match {
            length: config.length.max(1),
            score: [0; 2],
            color_to_move_next: None,
            initial_dice: Vec::new(),
            remaining_dice: Vec::new(),
            consumed_dice: Vec::new(),
            cube: 1,
            may_double: [true; 2],
            open_cube_challenge_from: None,
            resignation_offered: None,
            board: Board::new(),
            players: [None, None],
            winner: None,
            rng,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn MatchObserver>) {
        self.observers.push(observer);
    }

    fn emit(&mut self, event: MatchEvent) {
        for observer in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn score(&self, color: Color) -> u32 {
        self.score[color.slot()]
    }

    pub fn cube(&self) -> u32 {
        self.cube
    }

    pub fn may_double(&self, color: Color) -> bool {
        self.may_double[color.slot()]
    }

    pub fn color_to_move_next(&self) -> Option<Color> {
        self.color_to_move_next
    }

    pub fn initial_dice(&self) -> &[u8] {
        &self.initial_dice
    }

    pub fn remaining_dice(&self) -> &[u8] {
        &self.remaining_dice
    }

    pub fn open_cube_challenge_from(&self) -> Option<Color> {
        self.open_cube_challenge_from
    }

    pub fn resignation_offered(&self) -> Option<(Color, WinKind)> {
        self.resignation_offered
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Legal full moves for the current roll.
    pub fn legal_full_moves(&self) -> &[FullMove] {
        self.board.legal_full_moves()
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn register_player(&mut self, name: impl Into<String>, color: Color) {
        let name = name.into();
        debug!(%name, ?color, "player registered");
        self.players[color.slot()] = Some(name);
    }

    pub fn player(&self, color: Color) -> Option<&str> {
        self.players[color.slot()].as_deref()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            length: self.length,
            score_white: self.score(Color::White),
            score_black: self.score(Color::Black),
            cube: self.cube,
            color_to_move: self.color_to_move_next,
            white_may_double: self.may_double(Color::White),
            black_may_double: self.may_double(Color::Black),
        }
    }

    pub fn phase(&self) -> Phase {
        if let Some(winner) = self.winner {
            return Phase::MatchOver(winner);
        }
        if let Some(from) = self.open_cube_challenge_from {
            return Phase::CubeOffered { from };
        }
        if let Some((from, kind)) = self.resignation_offered {
            return Phase::ResignationOffered { from, kind };
        }
        match self.color_to_move_next {
            None => Phase::AwaitingOpeningRoll,
            Some(color) if self.initial_dice.is_empty() => Phase::AwaitingDiceRoll(color),
            Some(color) if self.commit_possible() => Phase::AwaitingCommit(color),
            Some(color) => Phase::MidTurn(color),
        }
    }

    /// Starts the next game: resets cube, doubling rights, dice and board, and rolls
    /// for who opens.
    #[instrument(level = "debug", skip(self))]
    pub fn new_game(&mut self) {
        if let Some(winner) = self.winner {
            warn!(?winner, "match is over, no new game");
            return;
        }
        self.cube = 1;
        // Crawford game: no doubling while exactly one side is a point away from winning
        let crawford_white = self.score(Color::White) == self.length - 1;
        let crawford_black = self.score(Color::Black) == self.length - 1;
        let may_double = crawford_white == crawford_black;
        self.may_double = [may_double; 2];

        self.open_cube_challenge_from = None;
        self.resignation_offered = None;
        self.clear_dice();

        let rollout = Dice::rollout(&mut self.rng);
        let opener = if rollout.die1() > rollout.die2() { Color::White } else { Color::Black };
        self.color_to_move_next = Some(opener);
        self.board = Board::new();
        debug!(?opener, %rollout, "new game");

        self.emit(MatchEvent::Rollout { white: rollout.die1(), black: rollout.die2() });
        self.emit(MatchEvent::MatchState(self.snapshot()));
    }

    fn clear_dice(&mut self) {
        self.initial_dice.clear();
        self.remaining_dice.clear();
        self.consumed_dice.clear();
    }

    fn ensure_in_play(&self) -> Result<(), EngineError> {
        match self.winner {
            Some(winner) => rejected(format!("match is over, {winner} won")),
            None => Ok(()),
        }
    }

    fn ensure_turn(&self, color: Color) -> Result<(), EngineError> {
        if self.color_to_move_next != Some(color) {
            return rejected(format!("not {color}'s turn"));
        }
        Ok(())
    }

    fn ensure_no_offer(&self) -> Result<(), EngineError> {
        if self.open_cube_challenge_from.is_some() || self.resignation_offered.is_some() {
            return rejected("an offer is waiting for an answer");
        }
        Ok(())
    }

    fn ensure_may_roll(&self, color: Color) -> Result<(), EngineError> {
        self.ensure_in_play()?;
        self.ensure_no_offer()?;
        self.ensure_turn(color)?;
        if !self.initial_dice.is_empty() {
            return rejected(format!("{color} already rolled"));
        }
        Ok(())
    }

    /// Rolls the dice for `color` and works out the legal moves for them.
    #[instrument(level = "debug", skip(self))]
    pub fn roll(&mut self, color: Color) -> Result<Dice, EngineError> {
        self.ensure_may_roll(color)?;
        let dice = Dice::roll(&mut self.rng);
        self.set_dice(color, dice)?;
        Ok(dice)
    }

    /// Same as [`Self::roll`] with dice rolled elsewhere, e.g. by a game server.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_roll(&mut self, color: Color, dice: Dice) -> Result<(), EngineError> {
        self.ensure_may_roll(color)?;
        self.set_dice(color, dice)
    }

    fn set_dice(&mut self, color: Color, dice: Dice) -> Result<(), EngineError> {
        let values = dice.values();
        self.board.store_initial_possibilities(&values, color)?;
        self.initial_dice = values.clone();
        self.remaining_dice = values;
        self.consumed_dice.clear();
        if self.board.legal_full_moves().is_empty() {
            info!(?color, %dice, "no legal moves");
        }
        self.emit(MatchEvent::DiceRolled { color, dice });
        Ok(())
    }

    /// Plays one checker from `origin` to `target`. Uses up the smallest remaining die
    /// that covers the distance, so a bear-off may use a die larger than the pips.
    /// Returns the color of a hit checker.
    #[instrument(level = "debug", skip(self))]
    pub fn execute_move(&mut self, origin: Location, target: Location, color: Color) -> Result<Option<Color>, EngineError> {
        self.ensure_may_move(color)?;
        let half_move = HalfMove::new(origin, target);
        let distance = half_move.distance(color);
        let Some(die) = self.remaining_dice.iter().copied().filter(|&d| d >= distance).min() else {
            warn!(?half_move, remaining = ?self.remaining_dice, "no die covers the move");
            return Err(EngineError::IllegalMove(half_move));
        };
        self.play(half_move, die, color)
    }

    /// Moves the checker on `origin` by `die` pips and uses up exactly that die.
    #[instrument(level = "debug", skip(self))]
    pub fn make_temporary_move(&mut self, origin: Location, die: u8, color: Color) -> Result<Option<Color>, EngineError> {
        self.ensure_may_move(color)?;
        if !self.remaining_dice.contains(&die) {
            return rejected(format!("no {die} left in {:?}", self.remaining_dice));
        }
        let from = origin.index(color);
        let half_move = HalfMove::from_indices(color, from, from + die as i8 * color.direction());
        self.play(half_move, die, color)
    }

    fn ensure_may_move(&self, color: Color) -> Result<(), EngineError> {
        self.ensure_in_play()?;
        self.ensure_no_offer()?;
        self.ensure_turn(color)?;
        if self.remaining_dice.is_empty() {
            return rejected(format!("{color} has no dice left to move with"));
        }
        Ok(())
    }

    fn play(&mut self, half_move: HalfMove, die: u8, color: Color) -> Result<Option<Color>, EngineError> {
        let hit = self
            .board
            .digest_move(half_move, color)
            .inspect_err(|err| warn!(%err, "move rejected"))?;

        if let Some(i) = self.remaining_dice.iter().position(|&d| d == die) {
            self.remaining_dice.remove(i);
        }
        self.consumed_dice.push(die);

        self.emit(MatchEvent::MoveApplied { color, half_move });
        if let (Some(hit_color), Some(point)) = (hit, half_move.to().point()) {
            self.emit(MatchEvent::CheckerHit { color: hit_color, point });
        }
        Ok(hit)
    }

    /// Takes back the last move of the turn and gives its die back.
    #[instrument(level = "debug", skip(self))]
    pub fn undo(&mut self, color: Color) -> Result<HalfMove, EngineError> {
        self.ensure_in_play()?;
        self.ensure_turn(color)?;
        if self.board.move_stack().is_empty() {
            return rejected("no moves to undo");
        }
        let played = self.board.undo_last_move()?;
        if let Some(die) = self.consumed_dice.pop() {
            self.remaining_dice.push(die);
        }

        self.emit(MatchEvent::MoveUndone { color, half_move: played.half_move });
        if let (Some(hit_color), Some(point)) = (played.hit, played.half_move.to().point()) {
            self.emit(MatchEvent::CheckerUnhit { color: hit_color, point });
        }
        Ok(played.half_move)
    }

    /// True once the dice are rolled and either all of them are used or the moves
    /// played already form a complete legal move.
    pub fn commit_possible(&self) -> bool {
        !self.initial_dice.is_empty()
            && (self.remaining_dice.is_empty() || self.board.early_commit_possible())
    }

    /// Finishes the turn. Scores the game if it is won, otherwise passes the turn.
    #[instrument(level = "debug", skip(self))]
    pub fn commit(&mut self, color: Color) -> Result<(), EngineError> {
        self.ensure_in_play()?;
        self.ensure_no_offer()?;
        self.ensure_turn(color)?;
        if self.initial_dice.is_empty() {
            return rejected(format!("{color} has not rolled"));
        }
        if !self.commit_possible() {
            warn!(?color, remaining = ?self.remaining_dice, "commit not possible");
            return Err(EngineError::InvalidCommit);
        }

        let moves = self.board.played_moves();
        self.board.clear_turn();
        self.clear_dice();
        self.emit(MatchEvent::TurnCommitted { color, moves });

        match self.board.get_winner() {
            Some(win) => self.end_game(win.winner, win.points()),
            None => {
                self.color_to_move_next = Some(color.opponent());
                self.emit(MatchEvent::MatchState(self.snapshot()));
            }
        }
        Ok(())
    }

    /// Doubling is allowed before rolling, for the player to move, when that player
    /// owns the cube and the cube can still matter for the match.
    pub fn doubling_possible(&self, color: Color) -> bool {
        self.winner.is_none()
            && self.cube < MAX_CUBE
            && self.initial_dice.is_empty()
            && self.may_double(color)
            && self.color_to_move_next == Some(color)
            && self.open_cube_challenge_from.is_none()
            && self.resignation_offered.is_none()
            && self.score.iter().any(|&s| s + self.cube < self.length)
    }

    /// Offers the cube at twice its value. The cube changes only when the offer is accepted.
    #[instrument(level = "debug", skip(self))]
    pub fn double(&mut self, color: Color) -> Result<(), EngineError> {
        if !self.doubling_possible(color) {
            return rejected(format!("{color} may not double now"));
        }
        self.open_cube_challenge_from = Some(color);
        self.emit(MatchEvent::CubeChallenge { from: color, proposed_cube: self.cube * 2 });
        Ok(())
    }

    /// `by` takes the cube; from now on only `by` may redouble.
    #[instrument(level = "debug", skip(self))]
    pub fn double_accepted(&mut self, by: Color) -> Result<(), EngineError> {
        if self.open_cube_challenge_from != Some(by.opponent()) {
            return rejected(format!("no double for {by} to accept"));
        }
        if self.cube >= MAX_CUBE {
            return rejected(format!("the cube is already at {MAX_CUBE}"));
        }
        self.open_cube_challenge_from = None;
        self.may_double[by.slot()] = true;
        self.may_double[by.opponent().slot()] = false;
        self.cube *= 2;
        self.emit(MatchEvent::CubeAccepted { by, cube: self.cube });
        self.emit(MatchEvent::MatchState(self.snapshot()));
        Ok(())
    }

    /// `by` passes the double and loses the game at the current cube value.
    #[instrument(level = "debug", skip(self))]
    pub fn double_rejected(&mut self, by: Color) -> Result<(), EngineError> {
        let Some(challenger) = self.open_cube_challenge_from.filter(|&c| c == by.opponent()) else {
            return rejected(format!("no double for {by} to reject"));
        };
        self.open_cube_challenge_from = None;
        self.emit(MatchEvent::OfferRejected { by });
        self.end_game(challenger, WinKind::Normal.points());
        Ok(())
    }

    /// Offers to give up the game for the points of `kind`. Either color may resign at any time.
    #[instrument(level = "debug", skip(self))]
    pub fn offer_resignation(&mut self, color: Color, kind: WinKind) -> Result<(), EngineError> {
        self.ensure_in_play()?;
        self.ensure_no_offer()?;
        self.resignation_offered = Some((color, kind));
        self.emit(MatchEvent::ResignationOffered { from: color, kind });
        Ok(())
    }

    fn accept_resignation(&mut self, by: Color) -> Result<(), EngineError> {
        let Some((_, kind)) = self.resignation_offered.filter(|&(from, _)| from == by.opponent()) else {
            return rejected(format!("no resignation for {by} to accept"));
        };
        self.resignation_offered = None;
        self.end_game(by, kind.points());
        Ok(())
    }

    fn reject_resignation(&mut self, by: Color) -> Result<(), EngineError> {
        if !matches!(self.resignation_offered, Some((from, _)) if from == by.opponent()) {
            return rejected(format!("no resignation for {by} to reject"));
        }
        self.resignation_offered = None;
        self.emit(MatchEvent::OfferRejected { by });
        Ok(())
    }

    /// Accepts whatever is on offer to `color`: a double or a resignation.
    /// Does nothing when nothing is on offer.
    #[instrument(level = "debug", skip(self))]
    pub fn accept_open_offer(&mut self, color: Color) -> Result<(), EngineError> {
        if self.open_cube_challenge_from.is_some() {
            self.double_accepted(color)
        } else if self.resignation_offered.is_some() {
            self.accept_resignation(color)
        } else {
            info!(?color, "no open offer to accept");
            Ok(())
        }
    }

    /// Rejects whatever is on offer to `color`. Does nothing when nothing is on offer.
    #[instrument(level = "debug", skip(self))]
    pub fn reject_open_offer(&mut self, color: Color) -> Result<(), EngineError> {
        if self.open_cube_challenge_from.is_some() {
            self.double_rejected(color)
        } else if self.resignation_offered.is_some() {
            self.reject_resignation(color)
        } else {
            info!(?color, "no open offer to reject");
            Ok(())
        }
    }

    /// Scores `points` times the cube for `winner`, then ends the match or starts the next game.
    fn end_game(&mut self, winner: Color, points: u32) {
        let awarded = points * self.cube;
        self.score[winner.slot()] += awarded;
        info!(?winner, points = awarded, "game over");
        self.emit(MatchEvent::GameEnded { winner, points: awarded });

        if self.score(winner) >= self.length {
            self.winner = Some(winner);
            self.color_to_move_next = None;
            self.open_cube_challenge_from = None;
            self.resignation_offered = None;
            self.clear_dice();
            self.board.clear_turn();
            info!(?winner, white = self.score(Color::White), black = self.score(Color::Black), "match over");
            self.emit(MatchEvent::MatchEnded {
                winner,
                score_white: self.score(Color::White),
                score_black: self.score(Color::Black),
            });
        } else {
            self.new_game();
        }
    }
}

fn rejected<T>(reason: impl Into<String>) -> Result<T, EngineError> {
    let err = EngineError::InvalidOperation(reason.into());
    warn!(%err, "command rejected");
    Err(err)
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("length", &self.length)
            .field("score", &self.score)
            .field("color_to_move_next", &self.color_to_move_next)
            .field("remaining_dice", &self.remaining_dice)
            .field("cube", &self.cube)
            .field("may_double", &self.may_double)
            .field("open_cube_challenge_from", &self.open_cube_challenge_from)
            .field("resignation_offered", &self.resignation_offered)
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(
            f,
            "score {}-{} of {}, cube {}, turn {:?}, dice {:?}",
            self.score(Color::White),
            self.score(Color::Black),
            self.length,
            self.cube,
            self.color_to_move_next,
            self.remaining_dice
        )
    }
}
