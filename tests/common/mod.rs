#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use gammon_core::{Board, Color, MatchEvent, backgammon::MatchObserver};

/// Fields of a server snapshot that tests care about. Everything else gets the
/// values a server sends for a plain game.
pub struct Snapshot {
    pub length: i32,
    pub score_black: i32,
    pub score_white: i32,
    /// Field 0 and 25 are the bars, 1 to 24 the points. Negative is White.
    pub board: [i32; 26],
    pub turn: i32,
    pub dice: [i32; 4],
    pub cube: i32,
    pub may_double_black: i32,
    pub may_double_white: i32,
    pub just_doubled: i32,
}

impl Snapshot {
    pub fn start() -> Self {
        Snapshot {
            length: 5,
            score_black: 0,
            score_white: 0,
            board: [
                0, -2, 0, 0, 0, 0, 5, 0, 3, 0, 0, 0, -5, 5, 0, 0, 0, -3, 0, -5, 0, 0, 0, 0, 2, 0,
            ],
            turn: 0,
            dice: [0; 4],
            cube: 1,
            may_double_black: 1,
            may_double_white: 1,
            just_doubled: 0,
        }
    }

    pub fn line(&self) -> String {
        let mut fields: Vec<String> = vec!["board".into(), "You".into(), "opponent".into()];
        let mut numbers = vec![self.length, self.score_black, self.score_white];
        numbers.extend(self.board);
        numbers.push(self.turn);
        numbers.extend(self.dice);
        numbers.extend([self.cube, self.may_double_black, self.may_double_white, self.just_doubled]);
        // color, direction, home, bar, on home x2, on bar x2, can move, forced, crawford, redoubles
        numbers.extend([1, -1, 0, 25, 0, 0, 0, 0, 2, 0, 0, 0]);
        fields.extend(numbers.iter().map(|n| n.to_string()));
        fields.join(":")
    }
}

/// Board with the given `(point, count)` stacks. Checkers not placed count as borne off.
pub fn board_with(white: &[(u8, u8)], black: &[(u8, u8)]) -> Board {
    let mut board = Board::empty();
    for (color, stacks) in [(Color::White, white), (Color::Black, black)] {
        for &(point, count) in stacks {
            board.set_checkers(point, color, count);
        }
    }
    for color in Color::ALL {
        board.set_borne_off(color, 15 - board.checkers_in_play(color));
    }
    board
}

/// Observer that keeps every event for inspection.
pub fn recorder() -> (Rc<RefCell<Vec<MatchEvent>>>, Box<dyn MatchObserver>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let observer: Box<dyn MatchObserver> = Box::new(move |event: &MatchEvent| sink.borrow_mut().push(event.clone()));
    (events, observer)
}
