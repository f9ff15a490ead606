//! Snapshot parsing and move notation of the remote play format.

mod common;

use common::Snapshot;
use gammon_core::{
    Board, Color, EngineError, HalfMove, Location, Phase,
    backgammon::wire::{self, decode_moves, encode_moves, parse_snapshot},
};

#[test]
fn test_starting_snapshot_matches_new_board() {
    let m = parse_snapshot(&Snapshot::start().line()).unwrap();
    assert_eq!(m.board(), &Board::new());
    assert_eq!(m.color_to_move_next(), None);
    assert_eq!(m.phase(), Phase::AwaitingOpeningRoll);
    assert_eq!(m.player(Color::Black), Some("You"));
    assert_eq!(m.player(Color::White), Some("opponent"));
}

#[test]
fn test_scores_cube_and_flags() {
    let line = Snapshot {
        length: 7,
        score_black: 3,
        score_white: 2,
        cube: 4,
        may_double_black: 0,
        may_double_white: 1,
        ..Snapshot::start()
    }
    .line();
    let m = parse_snapshot(&line).unwrap();
    assert_eq!(m.length(), 7);
    assert_eq!(m.score(Color::Black), 3);
    assert_eq!(m.score(Color::White), 2);
    assert_eq!(m.cube(), 4);
    assert!(!m.may_double(Color::Black));
    assert!(m.may_double(Color::White));
}

#[test]
fn test_bars_and_borne_off_are_derived() {
    let mut board = Snapshot::start().board;
    // two White checkers from point 1 on the bar, one Black checker from point 24 on the bar
    board[0] = -2;
    board[1] = 0;
    board[24] = 1;
    board[25] = 1;
    board[19] = -3;
    let m = parse_snapshot(&Snapshot { board, ..Snapshot::start() }.line()).unwrap();

    assert_eq!(m.board().bar(Color::White), 2);
    assert_eq!(m.board().bar(Color::Black), 1);
    assert_eq!(m.board().borne_off(Color::White), 2);
    assert_eq!(m.board().borne_off(Color::Black), 0);
}

#[test]
fn test_double_dice_expand_and_moves_are_cached() {
    let line = Snapshot { turn: 1, dice: [0, 0, 3, 3], ..Snapshot::start() }.line();
    let m = parse_snapshot(&line).unwrap();

    assert_eq!(m.color_to_move_next(), Some(Color::Black));
    assert_eq!(m.initial_dice(), &[3, 3, 3, 3]);
    assert_eq!(m.remaining_dice(), &[3, 3, 3, 3]);
    assert!(m.legal_full_moves().iter().all(|fm| fm.len() == 4));
    assert_eq!(m.phase(), Phase::MidTurn(Color::Black));
}

#[test]
fn test_just_doubled_opens_challenge() {
    let line = Snapshot { turn: 1, just_doubled: 1, ..Snapshot::start() }.line();
    let m = parse_snapshot(&line).unwrap();
    assert_eq!(m.open_cube_challenge_from(), Some(Color::White));
    assert_eq!(m.phase(), Phase::CubeOffered { from: Color::White });
}

#[test]
fn test_cube_must_be_a_reachable_value() {
    for cube in [0, 3, 48, 128, 1 << 30] {
        let line = Snapshot { cube, ..Snapshot::start() }.line();
        assert!(
            matches!(parse_snapshot(&line), Err(EngineError::StructuralError(_))),
            "cube {cube} was accepted"
        );
    }
    let line = Snapshot { cube: 64, ..Snapshot::start() }.line();
    assert_eq!(parse_snapshot(&line).unwrap().cube(), 64);

    let redouble_past_max = Snapshot { turn: 1, cube: 64, just_doubled: 1, length: 500, ..Snapshot::start() }.line();
    assert!(matches!(parse_snapshot(&redouble_past_max), Err(EngineError::StructuralError(_))));

    let line = Snapshot { turn: 1, cube: 32, just_doubled: 1, length: 500, ..Snapshot::start() }.line();
    let mut m = parse_snapshot(&line).unwrap();
    m.accept_open_offer(Color::Black).unwrap();
    assert_eq!(m.cube(), 64);
    assert!(!m.doubling_possible(Color::Black));
}

#[test]
fn test_structural_problems() {
    let line = Snapshot::start().line();

    let short = line.rsplit_once(':').unwrap().0;
    assert!(matches!(parse_snapshot(short), Err(EngineError::StructuralError(_))));

    let garbled = line.replacen(":5:", ":five:", 1);
    assert!(matches!(parse_snapshot(&garbled), Err(EngineError::StructuralError(_))));

    let not_board = line.replacen("board", "bored", 1);
    assert!(matches!(parse_snapshot(&not_board), Err(EngineError::StructuralError(_))));

    let bad_dice = Snapshot { turn: -1, dice: [7, 2, 0, 0], ..Snapshot::start() }.line();
    assert!(matches!(parse_snapshot(&bad_dice), Err(EngineError::StructuralError(_))));

    let nobody_to_move = Snapshot { dice: [3, 2, 0, 0], ..Snapshot::start() }.line();
    assert!(matches!(parse_snapshot(&nobody_to_move), Err(EngineError::StructuralError(_))));
}

#[test]
fn test_too_many_checkers_is_inconsistent() {
    let mut board = Snapshot::start().board;
    board[2] = -1;
    let err = parse_snapshot(&Snapshot { board, ..Snapshot::start() }.line()).unwrap_err();
    assert!(matches!(err, EngineError::InconsistentBoard(_)));
    assert!(!err.is_recoverable());
}

#[test]
fn test_move_notation() {
    let moves = [
        HalfMove::new(Location::Bar, Location::Point(2)),
        HalfMove::new(Location::Point(12), Location::Point(17)),
        HalfMove::new(Location::Point(20), Location::Off),
    ];
    assert_eq!(encode_moves(&moves), "bar-3 13-18 21-off");
    assert_eq!(decode_moves("bar-3 13-18 21-off", Color::White).unwrap(), moves.to_vec());
    assert_eq!(encode_moves(&[]), "");
    assert!(decode_moves("13/18", Color::White).is_err());
    assert!(decode_moves("13-x", Color::White).is_err());
}

#[test]
fn test_legal_moves_survive_the_notation() {
    let line = Snapshot { turn: -1, dice: [6, 4, 0, 0], ..Snapshot::start() }.line();
    let m = parse_snapshot(&line).unwrap();
    assert!(!m.legal_full_moves().is_empty());
    for full_move in m.legal_full_moves() {
        let text = wire::encode_moves(full_move);
        assert_eq!(decode_moves(&text, Color::White).unwrap(), full_move.to_vec());
    }
}
