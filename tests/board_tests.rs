//! Rules of the board: legality, enumeration, apply/undo and scoring.

mod common;

use common::board_with;
use gammon_core::{
    Board, Color, Dice, EngineError, HalfMove, Location, WinKind,
    backgammon::Win,
};

fn hm(from: Location, to: Location) -> HalfMove {
    HalfMove::new(from, to)
}

#[test]
fn test_initial_six_five_uses_both_dice() {
    let mut board = Board::new();
    let before = board.clone();
    let moves = board.find_possible_moves(&[5, 6], Color::White).unwrap();

    assert!(moves.iter().any(|m| m.len() == 2));
    assert!(moves.iter().all(|m| m.len() == 2));
    assert_eq!(board, before);
    assert!(board.check_consistency().is_ok());
}

#[test]
fn test_enumeration_is_symmetric_on_initial_position() {
    let mut board = Board::new();
    for dice in Dice::ALL {
        let values = dice.values();
        let white = board.find_possible_moves(&values, Color::White).unwrap();
        let black = board.find_possible_moves(&values, Color::Black).unwrap();
        assert_eq!(white.len(), black.len(), "dice {dice}");
        assert!(!white.is_empty(), "dice {dice}");
    }
}

#[test]
fn test_last_checker_may_bear_off_with_one_die() {
    let mut board = board_with(&[(18, 1)], &[(0, 15)]);
    let moves = board.find_possible_moves(&[6, 1], Color::White).unwrap();

    let single = [hm(Location::Point(18), Location::Off)];
    assert!(moves.iter().any(|m| **m == single));
    assert!(moves.iter().any(|m| m.len() == 2 && m.last().is_some_and(|h| h.is_bear_off())));
}

#[test]
fn test_short_moves_are_dropped_when_longer_exist() {
    // playing the 1 with the checker on 10 leaves the 3 unplayable
    let mut board = board_with(&[(0, 1), (10, 1)], &[(3, 2), (13, 2), (14, 2), (23, 9)]);
    let moves = board.find_possible_moves(&[3, 1], Color::White).unwrap();

    assert_eq!(moves.len(), 1);
    assert_eq!(
        *moves[0],
        [
            hm(Location::Point(0), Location::Point(1)),
            hm(Location::Point(1), Location::Point(4)),
        ]
    );
}

#[test]
fn test_bar_checker_must_enter_first() {
    let mut board = Board::new();
    board.set_checkers(0, Color::White, 1);
    board.set_bar(Color::White, 1);

    for dice in Dice::ALL {
        let moves = board.find_possible_moves(&dice.values(), Color::White).unwrap();
        assert!(moves.iter().all(|m| m[0].is_entry()), "dice {dice}");
    }
    assert!(board.legal_half_moves(3, Color::White).iter().all(|m| m.is_entry()));
    assert!(!board.is_legal_for(Location::Point(11), Location::Point(14), Color::White, 3));
}

#[test]
fn test_closed_board_means_dance() {
    let mut board = board_with(
        &[(12, 14)],
        &[(0, 2), (1, 2), (2, 2), (3, 2), (4, 2), (5, 2), (23, 3)],
    );
    board.set_bar(Color::White, 1);
    board.set_borne_off(Color::White, 0);
    assert!(board.check_consistency().is_ok());

    board.store_initial_possibilities(&[4, 4, 4, 4], Color::White).unwrap();
    assert!(board.legal_full_moves().is_empty());
    assert!(board.early_commit_possible());
}

#[test]
fn test_bear_off_overshoot_needs_no_checker_behind() {
    let board = board_with(&[(19, 1), (22, 1)], &[(0, 15)]);
    // 22 + 5 overshoots, but 19 is still behind it
    assert!(!board.is_legal_for(Location::Point(22), Location::Off, Color::White, 5));
    assert!(board.is_legal_for(Location::Point(19), Location::Off, Color::White, 5));
    assert!(board.is_legal_for(Location::Point(22), Location::Off, Color::White, 2));

    let board = board_with(&[(0, 15)], &[(4, 1), (1, 1)]);
    assert!(!board.is_legal_for(Location::Point(1), Location::Off, Color::Black, 6));
    assert!(board.is_legal_for(Location::Point(4), Location::Off, Color::Black, 6));
}

#[test]
fn test_no_bear_off_with_checkers_outside_home() {
    let board = board_with(&[(17, 1), (23, 14)], &[(0, 15)]);
    assert!(!board.is_legal_for(Location::Point(23), Location::Off, Color::White, 1));
}

#[test]
fn test_malformed_dice_are_structural_errors() {
    let mut board = Board::new();
    let cases: [&[u8]; 5] = [&[1, 2, 3], &[2, 2, 2, 3], &[0, 3], &[7, 1], &[4]];
    for dice in cases {
        let err = board.find_possible_moves(dice, Color::White).unwrap_err();
        assert!(matches!(err, EngineError::StructuralError(_)), "{dice:?}");
        assert!(!err.is_recoverable());
    }
}

#[test]
fn test_hit_and_undo_reinstates_checker() {
    let mut board = board_with(&[(0, 15)], &[(3, 1), (23, 14)]);
    let before = board.clone();

    let hit = board.apply_move(hm(Location::Point(0), Location::Point(3)), Color::White).unwrap();
    assert_eq!(hit, Some(Color::Black));
    assert_eq!(board.bar(Color::Black), 1);
    assert_eq!(board.checkers(3, Color::Black), 0);
    assert!(board.check_consistency().is_ok());

    let played = board.undo_last_move().unwrap();
    assert_eq!(played.hit, Some(Color::Black));
    assert_eq!(board, before);
}

#[test]
fn test_undo_with_empty_stack() {
    let mut board = Board::new();
    let err = board.undo_last_move().unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_digest_follows_cached_moves() {
    let mut board = Board::new();
    board.store_initial_possibilities(&[6, 5], Color::White).unwrap();
    let first = board.legal_full_moves()[0];

    let before = board.clone();
    let bogus = hm(Location::Point(0), Location::Point(1));
    assert_eq!(board.digest_move(bogus, Color::White), Err(EngineError::IllegalMove(bogus)));
    assert_eq!(board, before);

    board.digest_move(first[0], Color::White).unwrap();
    assert!(!board.early_commit_possible());
    let rest = board.remaining_possible_moves();
    assert!(rest.iter().any(|m| **m == first[1..]));
    assert!(rest.iter().all(|m| m.len() == 1));

    board.digest_move(first[1], Color::White).unwrap();
    assert!(board.early_commit_possible());
    assert!(board.remaining_possible_moves().is_empty());
    assert_eq!(board.played_moves(), first.to_vec());
}

#[test]
fn test_consistency_detects_broken_boards() {
    let mut board = Board::new();
    board.set_checkers(5, Color::White, 1);
    assert!(matches!(board.check_consistency(), Err(EngineError::InconsistentBoard(_))));

    let mut board = Board::new();
    board.set_borne_off(Color::Black, 1);
    assert!(matches!(board.check_consistency(), Err(EngineError::InconsistentBoard(_))));
}

#[test]
fn test_winner_scoring() {
    assert_eq!(Board::new().get_winner(), None);

    let mut backgammon = board_with(&[(0, 14)], &[]);
    backgammon.set_bar(Color::White, 1);
    backgammon.set_borne_off(Color::White, 0);
    assert_eq!(
        backgammon.get_winner(),
        Some(Win { winner: Color::Black, kind: WinKind::Backgammon })
    );
    assert_eq!(backgammon.get_winner().map(|w| w.points()), Some(3));

    let mut gammon = board_with(&[], &[(12, 15)]);
    gammon.set_borne_off(Color::Black, 0);
    assert_eq!(gammon.get_winner(), Some(Win { winner: Color::White, kind: WinKind::Gammon }));

    let normal = board_with(&[], &[(12, 10)]);
    assert_eq!(normal.get_winner(), Some(Win { winner: Color::White, kind: WinKind::Normal }));
}

#[test]
fn test_board_renders_as_text() {
    let text = Board::new().to_string();
    assert!(text.contains("off: White 0, Black 0"));
    assert_eq!(text.lines().count(), 6);
}
