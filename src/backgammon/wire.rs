//! Text format of the remote play server: board snapshots in, move lists out.
//!
//! A snapshot is one line of 53 colon-separated fields:
//!
//! ```text
//! board:You:opponent:3:0:0:0:-2:0:0:0:0:5:0:3:0:0:0:-5:5:0:0:0:-3:0:-5:0:0:0:0:2:0:1:6:2:0:0:1:1:1:0:1:-1:0:25:0:0:0:0:2:6:0:0
//! ```
//!
//! The first named player plays Black, the second White. Board fields hold signed
//! counts, negative for White and positive for Black. Field 0 and 25 of the board
//! are the bars, fields 1 to 24 the points.

use tracing::debug;

use crate::{
    backgammon::{Board, CHECKERS_PER_COLOR, Color, Dice, HalfMove, Location, MAX_CUBE, Match},
    config::MatchConfig,
    error::EngineError,
};

pub const SNAPSHOT_FIELDS: usize = 53;

const LENGTH: usize = 3;
const SCORE_BLACK: usize = 4;
const SCORE_WHITE: usize = 5;
const BOARD_START: usize = 6;
const BOARD_FIELDS: usize = 26;
const TURN: usize = 32;
const DICE_FIRST: usize = 33;
const DICE_SECOND: usize = 35;
const CUBE: usize = 37;
const MAY_DOUBLE_BLACK: usize = 38;
const MAY_DOUBLE_WHITE: usize = 39;
const JUST_DOUBLED: usize = 40;
const COLOR: usize = 41;

/// Rebuilds a match from a snapshot line. When a player is to move and dice are
/// shown, the legal moves for them are computed right away.
pub fn parse_snapshot(line: &str) -> Result<Match, EngineError> {
    let parts: Vec<&str> = line.trim().split(':').collect();
    if parts.len() != SNAPSHOT_FIELDS {
        return Err(EngineError::StructuralError(format!(
            "snapshot has {} fields, expected {SNAPSHOT_FIELDS}",
            parts.len()
        )));
    }
    if parts[0] != "board" {
        return Err(EngineError::StructuralError(format!("not a board snapshot: {:?}", parts[0])));
    }

    let numbers = parts[LENGTH..]
        .iter()
        .map(|p| {
            p.trim()
                .parse::<i32>()
                .map_err(|_| EngineError::StructuralError(format!("not a number: {p:?}")))
        })
        .collect::<Result<Vec<i32>, _>>()?;
    let field = |index: usize| numbers[index - LENGTH];

    let length = non_negative(field(LENGTH), "match length")?;
    let mut m = Match::blank(MatchConfig::new(length));
    m.register_player(parts[1], Color::Black);
    m.register_player(parts[2], Color::White);
    m.score = [
        non_negative(field(SCORE_WHITE), "score")?,
        non_negative(field(SCORE_BLACK), "score")?,
    ];

    let board_fields: Vec<i32> = (BOARD_START..BOARD_START + BOARD_FIELDS).map(field).collect();
    m.board = parse_board(&board_fields)?;

    m.color_to_move_next = match field(TURN) {
        t if t > 0 => Some(Color::Black),
        t if t < 0 => Some(Color::White),
        _ => None,
    };

    let dice = parse_dice(field(DICE_FIRST), field(DICE_FIRST + 1))?
        .or(parse_dice(field(DICE_SECOND), field(DICE_SECOND + 1))?);

    let cube = non_negative(field(CUBE), "cube")?;
    if !cube.is_power_of_two() || cube > MAX_CUBE {
        return Err(EngineError::StructuralError(format!("cube {cube} is not a power of two up to {MAX_CUBE}")));
    }
    m.cube = cube;
    m.may_double = [field(MAY_DOUBLE_WHITE) != 0, field(MAY_DOUBLE_BLACK) != 0];
    if field(JUST_DOUBLED) != 0 {
        if cube == MAX_CUBE {
            return Err(EngineError::StructuralError(format!("double offered on a cube of {MAX_CUBE}")));
        }
        // the snapshot is written for Black, so a fresh double came from White
        m.open_cube_challenge_from = Some(Color::White);
    }
    debug!(color = field(COLOR), turn = ?m.color_to_move_next, ?dice, "parsed snapshot");

    if let Some(dice) = dice {
        let Some(color) = m.color_to_move_next else {
            return Err(EngineError::StructuralError(format!("dice {dice} shown but nobody is to move")));
        };
        let values = dice.values();
        m.board.store_initial_possibilities(&values, color)?;
        m.initial_dice = values.clone();
        m.remaining_dice = values;
    }
    Ok(m)
}

fn non_negative(value: i32, what: &str) -> Result<u32, EngineError> {
    u32::try_from(value).map_err(|_| EngineError::StructuralError(format!("negative {what}: {value}")))
}

/// A pair of zeros means no dice.
fn parse_dice(die1: i32, die2: i32) -> Result<Option<Dice>, EngineError> {
    if die1 == 0 && die2 == 0 {
        return Ok(None);
    }
    let to_die = |d: i32| {
        u8::try_from(d).map_err(|_| EngineError::StructuralError(format!("invalid die {d}")))
    };
    Dice::new(to_die(die1)?, to_die(die2)?).map(Some)
}

fn parse_board(fields: &[i32]) -> Result<Board, EngineError> {
    let count = |value: i32| -> Result<(Color, u8), EngineError> {
        let color = if value < 0 { Color::White } else { Color::Black };
        let n = u8::try_from(value.unsigned_abs())
            .ok()
            .filter(|&n| n <= CHECKERS_PER_COLOR)
            .ok_or_else(|| EngineError::InconsistentBoard(format!("{value} checkers on one location")))?;
        Ok((color, n))
    };

    let mut board = Board::empty();
    for index in [0, BOARD_FIELDS - 1] {
        let (color, n) = count(fields[index])?;
        if n > 0 {
            board.set_bar(color, board.bar(color) + n);
        }
    }
    for (point, &value) in fields[1..BOARD_FIELDS - 1].iter().enumerate() {
        let (color, n) = count(value)?;
        board.set_checkers(point as u8, color, n);
    }

    for color in Color::ALL {
        let in_play = board.checkers_in_play(color);
        if in_play > CHECKERS_PER_COLOR {
            return Err(EngineError::InconsistentBoard(format!("{color} has {in_play} checkers in play")));
        }
        board.set_borne_off(color, CHECKERS_PER_COLOR - in_play);
    }
    board.check_consistency()?;
    Ok(board)
}

fn encode_location(location: Location) -> String {
    match location {
        Location::Bar => "bar".to_string(),
        Location::Off => "off".to_string(),
        Location::Point(p) => (p + 1).to_string(),
    }
}

/// Space separated `origin-target` tokens with 1-based points, e.g. `bar-3 13-off`.
pub fn encode_moves(half_moves: &[HalfMove]) -> String {
    half_moves
        .iter()
        .map(|hm| format!("{}-{}", encode_location(hm.from()), encode_location(hm.to())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_location(token: &str) -> Result<Location, EngineError> {
    match token.to_ascii_lowercase().as_str() {
        "bar" => Ok(Location::Bar),
        "off" => Ok(Location::Off),
        number => number
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=24).contains(n))
            .map(|n| Location::Point(n - 1))
            .ok_or_else(|| EngineError::StructuralError(format!("invalid location {token:?}"))),
    }
}

/// Inverse of [`encode_moves`]. `bar` and `off` only make sense for a known color,
/// which the caller passes in; it is checked against the direction of each move.
pub fn decode_moves(text: &str, color: Color) -> Result<Vec<HalfMove>, EngineError> {
    text.split_whitespace()
        .map(|token| {
            let (origin, target) = token
                .split_once('-')
                .ok_or_else(|| EngineError::StructuralError(format!("invalid move {token:?}")))?;
            let half_move = HalfMove::new(decode_location(origin)?, decode_location(target)?);
            let step = half_move.to().index(color) - half_move.from().index(color);
            if step == 0 || step.signum() != color.direction() {
                return Err(EngineError::StructuralError(format!("{token:?} runs backwards for {color}")));
            }
            Ok(half_move)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "board:You:someplayer:3:0:0:0:-2:0:0:0:0:5:0:3:0:0:0:-5:5:0:0:0:-3:0:-5:0:0:0:0:2:0:1:6:2:0:0:1:1:1:0:1:-1:0:25:0:0:0:0:2:6:0:0";

    #[test]
    fn test_parse_starting_position() {
        let m = parse_snapshot(START).unwrap();
        assert_eq!(m.board().checkers_on_position(0), 2);
        assert_eq!(m.board().checkers_on_position(23), -2);
        assert_eq!(m.board(), &{
            let mut expected = Board::new();
            expected.store_initial_possibilities(&[6, 2], Color::Black).unwrap();
            expected
        });
        assert_eq!(m.color_to_move_next(), Some(Color::Black));
        assert_eq!(m.initial_dice(), &[6, 2]);
        assert_eq!(m.player(Color::Black), Some("You"));
        assert_eq!(m.length(), 3);
        assert!(!m.legal_full_moves().is_empty());
    }

    #[test]
    fn test_location_tokens() {
        assert_eq!(decode_location("BAR").unwrap(), Location::Bar);
        assert_eq!(decode_location("24").unwrap(), Location::Point(23));
        assert!(decode_location("0").is_err());
        assert!(decode_location("25").is_err());
        assert_eq!(encode_location(Location::Point(0)), "1");
    }

    #[test]
    fn test_backward_moves_are_rejected() {
        assert!(decode_moves("13-8", Color::White).is_err());
        assert!(decode_moves("13-8", Color::Black).is_ok());
        assert!(decode_moves("20-bar", Color::White).is_err());
        assert_eq!(
            decode_moves("bar-3 24-off", Color::White).unwrap(),
            vec![
                HalfMove::new(Location::Bar, Location::Point(2)),
                HalfMove::new(Location::Point(23), Location::Off),
            ]
        );
    }
}
