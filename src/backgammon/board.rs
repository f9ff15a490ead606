use std::{fmt, ops::{Deref, DerefMut}};

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    backgammon::{Color, Dice, FullMove, HalfMove, Location, Win, WinKind},
    error::EngineError,
};

pub const CHECKERS_PER_COLOR: u8 = 15;

/// A half move that was applied to the board and can be taken back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayedMove {
    pub half_move: HalfMove,
    pub color: Color,
    /// Color of the checker sent to the bar, if the move hit one.
    pub hit: Option<Color>,
}

/// Checker placement plus the moves provisionally played during the current turn.
///
/// Points hold a count per color. Legal play never puts both colors on a point,
/// but positions built from outside input can, which is what
/// [`Board::check_consistency`] is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    points: [[u8; 2]; 24],
    bar: [u8; 2],
    borne_off: [u8; 2],
    move_stack: Vec<PlayedMove>,
    /// Legal full moves for the roll being played, computed once per roll.
    legal_full_moves: Vec<FullMove>,
}

impl Board {

    /// Creates a new board with the default starting position.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for color in Color::ALL {
            board.initialize_checkers(color);
        }
        board
    }

    /// Creates an empty board with no checkers on it.
    pub fn empty() -> Self {
        Board {
            points: [[0; 2]; 24],
            bar: [0; 2],
            borne_off: [0; 2],
            move_stack: Vec::new(),
            legal_full_moves: Vec::new(),
        }
    }

    fn initialize_checkers(&mut self, color: Color) {
        let layout: [(u8, u8); 4] = match color {
            Color::White => [(0, 2), (11, 5), (16, 3), (18, 5)],
            Color::Black => [(23, 2), (12, 5), (7, 3), (5, 5)],
        };
        for (point, count) in layout {
            self.points[point as usize][color.slot()] = count;
        }
    }

    pub fn checkers(&self, point: u8, color: Color) -> u8 {
        self.points[point as usize][color.slot()]
    }

    /// Signed checker count on a point: positive for White, negative for Black.
    pub fn checkers_on_position(&self, point: u8) -> i8 {
        let [white, black] = self.points[point as usize];
        white as i8 - black as i8
    }

    /// Sets the number of `color` checkers on a point, leaving the other color untouched.
    pub fn set_checkers(&mut self, point: u8, color: Color, count: u8) {
        self.points[point as usize][color.slot()] = count;
    }

    pub fn bar(&self, color: Color) -> u8 {
        self.bar[color.slot()]
    }

    pub fn set_bar(&mut self, color: Color, count: u8) {
        self.bar[color.slot()] = count;
    }

    pub fn borne_off(&self, color: Color) -> u8 {
        self.borne_off[color.slot()]
    }

    pub fn set_borne_off(&mut self, color: Color, count: u8) {
        self.borne_off[color.slot()] = count;
    }

    pub fn move_stack(&self) -> &[PlayedMove] {
        &self.move_stack
    }

    /// The half moves played since the last roll, in order.
    pub fn played_moves(&self) -> Vec<HalfMove> {
        self.move_stack.iter().map(|m| m.half_move).collect()
    }

    pub fn legal_full_moves(&self) -> &[FullMove] {
        &self.legal_full_moves
    }

    /// Checkers of `color` on points or on the bar.
    pub fn checkers_in_play(&self, color: Color) -> u8 {
        let on_points: u8 = (0..24).map(|p| self.checkers(p, color)).sum();
        on_points + self.bar(color)
    }

    /// True iff no checker of `color` is on the bar or outside its home region.
    pub fn all_checkers_home(&self, color: Color) -> bool {
        self.bar(color) == 0
            && (0..24u8)
                .filter(|&p| !color.is_home(p))
                .all(|p| self.checkers(p, color) == 0)
    }

    /// A point is open for `color` while the opponent has fewer than two checkers on it.
    pub fn is_open_for(&self, point: u8, color: Color) -> bool {
        self.checkers(point, color.opponent()) < 2
    }

    fn has_checkers_behind(&self, point: u8, color: Color) -> bool {
        color
            .home_points()
            .filter(|&p| match color {
                Color::White => p < point,
                Color::Black => p > point,
            })
            .any(|p| self.checkers(p, color) > 0)
    }

    /// All single moves `color` could make with `die` on the current position.
    pub fn legal_half_moves(&self, die: u8, color: Color) -> Vec<HalfMove> {
        let mut half_moves = Vec::new();
        if !(1..=6).contains(&die) {
            return half_moves;
        }

        if self.bar(color) > 0 {
            let target = color.entry_point(die);
            if self.is_open_for(target, color) {
                half_moves.push(HalfMove::new(Location::Bar, Location::Point(target)));
            }
            return half_moves;
        }

        let all_home = self.all_checkers_home(color);
        for point in 0..24u8 {
            if self.checkers(point, color) == 0 {
                continue;
            }
            let target = point as i8 + die as i8 * color.direction();
            if (0..24).contains(&target) {
                if self.is_open_for(target as u8, color) {
                    half_moves.push(HalfMove::new(Location::Point(point), Location::Point(target as u8)));
                }
            } else if all_home
                && (target == color.off_index() || !self.has_checkers_behind(point, color))
            {
                // exact bear-off, or wasting pips with the rearmost checker
                half_moves.push(HalfMove::new(Location::Point(point), Location::Off));
            }
        }
        half_moves
    }

    pub fn is_legal_for(&self, origin: Location, target: Location, color: Color, die: u8) -> bool {
        self.legal_half_moves(die, color)
            .contains(&HalfMove::new(origin, target))
    }

    /// Every maximal full move `color` can play with `dice` (2 values, or 4 for a double).
    /// An empty result means the player cannot move at all.
    #[instrument(level = "debug", skip(self))]
    pub fn find_possible_moves(&mut self, dice: &[u8], color: Color) -> Result<Vec<FullMove>, EngineError> {
        Dice::check_values(dice)?;

        let mut moves = self.moves_for_dice(dice, color)?;
        if dice[0] != dice[1] {
            let swapped = [dice[1], dice[0]];
            moves.extend(self.moves_for_dice(&swapped, color)?);
        }

        let moves = self.filter_too_short_moves(filter_duplicates(moves), color);
        debug!(count = moves.len(), "enumerated full moves");
        Ok(moves)
    }

    /// Depth-first search over the dice in the given order. Every branch is played
    /// on the board itself and taken back when the guard goes out of scope.
    fn moves_for_dice(&mut self, dice: &[u8], color: Color) -> Result<Vec<FullMove>, EngineError> {
        let Some((&die, rest)) = dice.split_first() else {
            return Ok(Vec::new());
        };

        let mut all_moves = Vec::new();
        for half_move in self.legal_half_moves(die, color) {
            let mut board = ProvisionalMove::apply(self, half_move, color)?;
            let continuations = board.moves_for_dice(rest, color)?;
            if continuations.is_empty() {
                all_moves.push(FullMove::new().prepended(half_move));
            } else {
                all_moves.extend(continuations.iter().map(|c| c.prepended(half_move)));
            }
        }
        Ok(all_moves)
    }

    /// Only moves of maximal length are playable, except that a player with a single
    /// checker left may bear it off with one die.
    fn filter_too_short_moves(&self, moves: Vec<FullMove>, color: Color) -> Vec<FullMove> {
        let Some(max_len) = moves.iter().map(|m| m.len()).max() else {
            return moves;
        };
        let last_checker = self.checkers_in_play(color) <= 1;
        moves
            .into_iter()
            .filter(|m| {
                m.len() == max_len || (last_checker && m.len() == 1 && m[0].is_bear_off())
            })
            .collect()
    }

    /// Starts a new turn: forgets provisional moves and caches the legal full moves for `dice`.
    pub fn store_initial_possibilities(&mut self, dice: &[u8], color: Color) -> Result<(), EngineError> {
        self.move_stack.clear();
        self.legal_full_moves = self.find_possible_moves(dice, color)?;
        debug!(?color, ?dice, moves = ?self.legal_full_moves, "calculated moves");
        Ok(())
    }

    /// Ends the turn: keeps the position, drops the move history and the cached moves.
    pub fn clear_turn(&mut self) {
        self.move_stack.clear();
        self.legal_full_moves.clear();
    }

    /// Continuations still playable after the moves already on the stack.
    pub fn remaining_possible_moves(&self) -> Vec<FullMove> {
        let played = self.played_moves();
        let mut seen = HashSet::new();
        self.legal_full_moves
            .iter()
            .filter_map(|fm| fm.remainder_after(&played))
            .filter(|rest| !rest.is_empty())
            .filter_map(|rest| FullMove::try_from(rest).ok())
            .filter(|rest| seen.insert(*rest))
            .collect()
    }

    /// A half move is legal when the moves played so far plus this one are a prefix
    /// of one of the cached legal full moves.
    pub fn is_legal_partial_move(&self, half_move: HalfMove) -> bool {
        let mut candidate = self.played_moves();
        candidate.push(half_move);
        self.legal_full_moves
            .iter()
            .any(|fm| fm.starts_with(&candidate))
    }

    /// Plays `half_move` if it continues a legal full move; returns the color hit, if any.
    pub fn digest_move(&mut self, half_move: HalfMove, color: Color) -> Result<Option<Color>, EngineError> {
        if !self.is_legal_partial_move(half_move) {
            debug!(?half_move, played = ?self.played_moves(), "not the prefix of any legal move");
            return Err(EngineError::IllegalMove(half_move));
        }
        self.apply_move(half_move, color)
    }

    /// True when the moves on the stack already form a complete legal move,
    /// or when there is nothing to play at all.
    pub fn early_commit_possible(&self) -> bool {
        if self.legal_full_moves.is_empty() {
            return true;
        }
        let played = self.played_moves();
        self.legal_full_moves.iter().any(|fm| **fm == *played)
    }

    /// Moves a checker of `color` without checking the rules, only that the move is
    /// physically possible. Returns the color of a hit checker.
    pub fn apply_move(&mut self, half_move: HalfMove, color: Color) -> Result<Option<Color>, EngineError> {
        let opponent = color.opponent();
        match half_move.from() {
            Location::Bar if self.bar(color) == 0 => {
                return Err(EngineError::StructuralError(format!("{color} has no checker on the bar for {half_move:?}")));
            }
            Location::Off => {
                return Err(EngineError::StructuralError(format!("cannot move a borne off checker: {half_move:?}")));
            }
            Location::Point(p) if self.checkers(p, color) == 0 => {
                return Err(EngineError::StructuralError(format!("{color} has no checker on {p} for {half_move:?}")));
            }
            _ => {}
        }
        match half_move.to() {
            Location::Bar => {
                return Err(EngineError::StructuralError(format!("cannot move onto the bar: {half_move:?}")));
            }
            Location::Point(p) if self.checkers(p, opponent) > 1 => {
                return Err(EngineError::StructuralError(format!("move {half_move:?} is blocked")));
            }
            _ => {}
        }

        match half_move.from() {
            Location::Bar => self.bar[color.slot()] -= 1,
            Location::Point(p) => self.points[p as usize][color.slot()] -= 1,
            Location::Off => unreachable!(),
        }

        let mut hit = None;
        match half_move.to() {
            Location::Off => self.borne_off[color.slot()] += 1,
            Location::Point(p) => {
                if self.checkers(p, opponent) == 1 {
                    self.points[p as usize][opponent.slot()] = 0;
                    self.bar[opponent.slot()] += 1;
                    hit = Some(opponent);
                }
                self.points[p as usize][color.slot()] += 1;
            }
            Location::Bar => unreachable!(),
        }

        self.move_stack.push(PlayedMove { half_move, color, hit });
        Ok(hit)
    }

    /// Takes back the most recent move, putting a hit checker back where it was.
    pub fn undo_last_move(&mut self) -> Result<PlayedMove, EngineError> {
        let Some(played) = self.move_stack.pop() else {
            return Err(EngineError::InvalidOperation("no moves to undo".to_string()));
        };
        let PlayedMove { half_move, color, hit } = played;

        match half_move.to() {
            Location::Off => self.borne_off[color.slot()] -= 1,
            Location::Point(p) => self.points[p as usize][color.slot()] -= 1,
            Location::Bar => unreachable!("moves onto the bar are never applied"),
        }
        match half_move.from() {
            Location::Bar => self.bar[color.slot()] += 1,
            Location::Point(p) => self.points[p as usize][color.slot()] += 1,
            Location::Off => unreachable!("moves from off are never applied"),
        }
        if let (Some(hit_color), Location::Point(p)) = (hit, half_move.to()) {
            self.bar[hit_color.slot()] -= 1;
            self.points[p as usize][hit_color.slot()] += 1;
        }
        Ok(played)
    }

    /// Fails if a point holds both colors or a color does not have exactly 15 checkers.
    pub fn check_consistency(&self) -> Result<(), EngineError> {
        for point in 0..24u8 {
            if self.checkers(point, Color::White) > 0 && self.checkers(point, Color::Black) > 0 {
                return Err(EngineError::InconsistentBoard(format!("checkers of both colors on point {point}")));
            }
        }
        for color in Color::ALL {
            let total = self.checkers_in_play(color) as u32 + self.borne_off(color) as u32;
            if total != CHECKERS_PER_COLOR as u32 {
                return Err(EngineError::InconsistentBoard(format!("there are {total} {color} checkers")));
            }
        }
        Ok(())
    }

    /// The winner once one color has borne off all its checkers.
    pub fn get_winner(&self) -> Option<Win> {
        let winner = Color::ALL
            .into_iter()
            .find(|&c| self.borne_off(c) == CHECKERS_PER_COLOR)?;
        let loser = winner.opponent();

        let kind = if self.borne_off(loser) > 0 {
            WinKind::Normal
        } else if self.bar(loser) > 0
            || winner.home_points().any(|p| self.checkers(p, loser) > 0)
        {
            WinKind::Backgammon
        } else {
            WinKind::Gammon
        };
        Some(Win { winner, kind })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_duplicates(moves: Vec<FullMove>) -> Vec<FullMove> {
    let mut seen = HashSet::with_capacity(moves.len());
    moves.into_iter().filter(|m| seen.insert(*m)).collect()
}

/// A move played during the search. Dropping the guard takes the move back, so the
/// board is restored on every exit path, including early returns through `?`.
struct ProvisionalMove<'a> {
    board: &'a mut Board,
}

impl<'a> ProvisionalMove<'a> {
    fn apply(board: &'a mut Board, half_move: HalfMove, color: Color) -> Result<Self, EngineError> {
        board.apply_move(half_move, color)?;
        Ok(ProvisionalMove { board })
    }
}

impl Deref for ProvisionalMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for ProvisionalMove<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for ProvisionalMove<'_> {
    fn drop(&mut self) {
        // the stack cannot be empty: this guard pushed the top entry
        let _ = self.board.undo_last_move();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, points: &[u8], bar: u8| -> fmt::Result {
            for (i, &p) in points.iter().enumerate() {
                if i == 6 {
                    write!(f, "| {bar:1} | ")?;
                }
                write!(f, "{:3} ", self.checkers_on_position(p))?;
            }
            writeln!(f)
        };
        let top: Vec<u8> = (12..24).collect();
        let bottom: Vec<u8> = (0..12).rev().collect();

        writeln!(f, " 13  14  15  16  17  18 | B |  19  20  21  22  23  24")?;
        row(f, &top, self.bar(Color::Black))?;
        writeln!(f, "=======================================================")?;
        row(f, &bottom, self.bar(Color::White))?;
        writeln!(f, " 12  11  10   9   8   7 | W |   6   5   4   3   2   1")?;
        write!(
            f,
            "off: White {}, Black {}",
            self.borne_off(Color::White),
            self.borne_off(Color::Black)
        )
    }
}
