//! Tests for clue safety scoring and validation.

use bytenames::{Dangers, Lexicon, SafetyEvaluator, StaticClassifier, UnsafeClue};
use std::sync::Arc;

const LEXICON: &str = r#"
[[themes]]
name = "ANIMAL"
clues = ["PET", "FUR"]
shared = ["FUR"]
words = ["CAT", "DOG", "LION", "SHARK"]

[[themes]]
name = "METAL"
clues = ["SHINY"]
words = ["IRON", "COPPER", "GOLD"]

[associations]
CAT = ["WHISKERS"]
"#;

fn evaluator() -> SafetyEvaluator {
    let lexicon = Lexicon::from_toml(LEXICON).unwrap();
    SafetyEvaluator::new(Arc::new(StaticClassifier::new(lexicon)))
}

fn dangers(enemy: &[&str], neutral: &[&str], assassin: &[&str]) -> Dangers {
    let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
    Dangers {
        enemy: owned(enemy),
        neutral: owned(neutral),
        assassin: owned(assassin),
    }
}

#[test]
fn test_score_without_dangers_is_base() {
    let safety = evaluator();
    assert_eq!(safety.score("ANIMAL", &Dangers::default()), 1.0);
}

#[test]
fn test_score_penalizes_each_dangerous_member() {
    let safety = evaluator();
    assert_eq!(safety.score("ANIMAL", &dangers(&["LION"], &[], &[])), 0.5);
    assert_eq!(safety.score("ANIMAL", &dangers(&["LION"], &["DOG"], &[])), 0.0);
}

#[test]
fn test_score_ignores_words_outside_theme() {
    let safety = evaluator();
    assert_eq!(safety.score("METAL", &dangers(&["LION"], &["DOG"], &["SHARK"])), 1.0);
}

#[test]
fn test_assassin_penalty_clamps_at_zero() {
    let safety = evaluator();
    let score = safety.score("ANIMAL", &dangers(&[], &[], &["SHARK"]));
    assert_eq!(score, 0.0);
    assert!(!safety.is_safe("ANIMAL", &dangers(&[], &[], &["SHARK"])));
}

#[test]
fn test_score_never_negative() {
    let safety = evaluator();
    let score = safety.score("ANIMAL", &dangers(&["LION", "DOG"], &["CAT"], &["SHARK"]));
    assert_eq!(score, 0.0);
}

#[test]
fn test_matches_clue_rules() {
    let safety = evaluator();
    assert!(safety.matches_clue("CAT", "cat"), "equality is case-insensitive");
    assert!(safety.matches_clue("CATFISH", "CAT"), "substring");
    assert!(safety.matches_clue("CAT", "CATFISH"), "superstring");
    assert!(safety.matches_clue("CAT", "ANIMAL"), "theme membership");
    assert!(safety.matches_clue("CAT", "WHISKERS"), "curated association");
    assert!(safety.matches_clue("DOG", "PET"), "theme clue");
    assert!(!safety.matches_clue("IRON", "PET"));
}

#[test]
fn test_validate_rejects_matching_token() {
    let safety = evaluator();
    let result = safety.validate("PET", &dangers(&["IRON"], &[], &["DOG"]));
    assert_eq!(
        result,
        Err(UnsafeClue::MatchesWord {
            token: "PET".to_string(),
            word: "DOG".to_string(),
        })
    );
}

#[test]
fn test_validate_accepts_unrelated_token() {
    let safety = evaluator();
    let result = safety.validate("SHINY", &dangers(&["LION"], &["DOG"], &["SHARK"]));
    assert_eq!(result, Ok(1.0));
}

#[test]
fn test_dangers_order_and_len() {
    let d = dangers(&["A"], &["B", "C"], &["D"]);
    assert_eq!(d.all().collect::<Vec<_>>(), vec!["A", "B", "C", "D"]);
    assert_eq!(d.len(), 4);
    assert!(Dangers::default().is_empty());
}

#[test]
fn test_embedded_lexicon_rejects_theme_clues_for_dangerous_words() {
    let safety = SafetyEvaluator::new(Arc::new(StaticClassifier::embedded().unwrap()));
    for (token, word) in [("SPACE", "ASTRONAUT"), ("GAME", "KITE"), ("MUSIC", "VIOLIN")] {
        let result = safety.validate(token, &dangers(&[], &[], &[word]));
        assert_eq!(
            result,
            Err(UnsafeClue::MatchesWord {
                token: token.to_string(),
                word: word.to_string(),
            }),
            "{} should be rejected next to {}",
            token,
            word
        );
    }
}
