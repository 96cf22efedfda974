//! Tests for board dealing and fixed layouts.

use bytenames::{
    ASSASSINS, Allegiance, BLUE_AGENTS, BOARD_SIZE, Board, BoardError, NEUTRALS, RED_AGENTS,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

fn words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("word{}", i)).collect()
}

fn assert_quota(board: &Board) {
    assert_eq!(board.count(Allegiance::Red), RED_AGENTS);
    assert_eq!(board.count(Allegiance::Blue), BLUE_AGENTS);
    assert_eq!(board.count(Allegiance::Neutral), NEUTRALS);
    assert_eq!(board.count(Allegiance::Assassin), ASSASSINS);
}

#[test]
fn test_generate_fills_quota() {
    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let board = Board::generate(&words(BOARD_SIZE), &mut rng).unwrap();
        assert_eq!(board.slots().len(), BOARD_SIZE);
        assert_quota(&board);
    }
}

#[test]
fn test_generate_keeps_word_order_and_uppercases() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let board = Board::generate(&words(BOARD_SIZE), &mut rng).unwrap();
    let expected: Vec<String> = (0..BOARD_SIZE).map(|i| format!("WORD{}", i)).collect();
    assert_eq!(board.words(), expected);
}

#[test]
fn test_generate_uses_first_25_words() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let board = Board::generate(&words(40), &mut rng).unwrap();
    assert_eq!(board.words().len(), BOARD_SIZE);
    assert_eq!(board.words().last().map(String::as_str), Some("WORD24"));
}

#[test]
fn test_generate_is_deterministic_per_seed() {
    let first = Board::generate(&words(BOARD_SIZE), &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
    let second = Board::generate(&words(BOARD_SIZE), &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_generate_rejects_short_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let result = Board::generate(&words(24), &mut rng);
    assert_eq!(result, Err(BoardError::NotEnoughWords(24)));
}

#[test]
fn test_generate_rejects_duplicates() {
    let mut input = words(BOARD_SIZE);
    input[10] = "Word3".to_string();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let result = Board::generate(&input, &mut rng);
    assert_eq!(result, Err(BoardError::DuplicateWord("WORD3".to_string())));
}

#[test]
fn test_fresh_board_is_unrevealed() {
    let board = Board::generate(&words(BOARD_SIZE), &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert!(board.revealed_indices().is_empty());
    assert_eq!(board.hidden_words(Allegiance::Red).len(), RED_AGENTS);

    let unique: HashSet<String> = board.words().into_iter().collect();
    assert_eq!(unique.len(), BOARD_SIZE);
}

#[test]
fn test_from_layout_checks_quota() {
    let layout: Vec<(String, Allegiance)> = words(BOARD_SIZE)
        .into_iter()
        .map(|w| (w, Allegiance::Neutral))
        .collect();
    assert!(matches!(
        Board::from_layout(layout),
        Err(BoardError::QuotaMismatch(_))
    ));
}

#[test]
fn test_from_layout_preserves_positions() {
    let layout: Vec<(String, Allegiance)> = words(BOARD_SIZE)
        .into_iter()
        .enumerate()
        .map(|(i, w)| {
            let allegiance = match i {
                0..=8 => Allegiance::Red,
                9..=16 => Allegiance::Blue,
                17..=23 => Allegiance::Neutral,
                _ => Allegiance::Assassin,
            };
            (w, allegiance)
        })
        .collect();
    let board = Board::from_layout(layout).unwrap();
    assert_quota(&board);
    assert_eq!(board.get(24).map(|s| s.allegiance()), Some(Allegiance::Assassin));
    assert_eq!(board.get(0).map(|s| s.word()), Some("WORD0"));
    assert!(board.get(25).is_none());
}

#[test]
fn test_display_has_five_rows() {
    let board = Board::generate(&words(BOARD_SIZE), &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
    assert_eq!(board.display().lines().count(), 5);
}
