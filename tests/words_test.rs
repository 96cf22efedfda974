//! Tests for word lists, the used-word registry and the fallback chain.

use async_trait::async_trait;
use bytenames::{
    BOARD_SIZE, Difficulty, GenerationFailure, LlmWordSource, StaticWordSource, UsedWordRegistry,
    WordSource, WordSupply,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::sync::Arc;
use strum::IntoEnumIterator;

fn quoted(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("\"{}{}\"", prefix, i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list(prefix: &str, count: usize) -> String {
    format!("[{}]", quoted(prefix, count))
}

#[derive(Debug)]
struct FailingSource;

#[async_trait]
impl WordSource for FailingSource {
    async fn supply(&self, _difficulty: Difficulty) -> Result<Vec<String>, GenerationFailure> {
        Err(GenerationFailure::new("quota exceeded".to_string()))
    }
}

#[derive(Debug)]
struct FixedSource(Vec<String>);

#[async_trait]
impl WordSource for FixedSource {
    async fn supply(&self, _difficulty: Difficulty) -> Result<Vec<String>, GenerationFailure> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_embedded_lists_have_enough_distinct_words() {
    let source = StaticWordSource::embedded(0).unwrap();
    for difficulty in Difficulty::iter() {
        let words = source.list(difficulty);
        let unique: HashSet<&String> = words.iter().collect();
        assert_eq!(unique.len(), words.len(), "{} list has repeats", difficulty);
        assert!(words.len() >= BOARD_SIZE);
    }
}

#[test]
fn test_draw_returns_distinct_board() {
    let source = StaticWordSource::embedded(0).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let words = source.draw(Difficulty::Easy, &mut rng);
    let unique: HashSet<&String> = words.iter().collect();
    assert_eq!(words.len(), BOARD_SIZE);
    assert_eq!(unique.len(), BOARD_SIZE);
    assert!(words.iter().all(|w| source.list(Difficulty::Easy).contains(w)));
}

#[test]
fn test_from_toml_deduplicates_and_uppercases() {
    let content = format!(
        "easy = [\"cat\", \"CAT\", {}]\nmedium = {}\nhard = {}\n",
        quoted("E", 25),
        list("M", 25),
        list("H", 25)
    );
    let source = StaticWordSource::from_toml(&content, 1).unwrap();
    let easy = source.list(Difficulty::Easy);
    assert_eq!(easy.len(), 26);
    assert_eq!(easy[0], "CAT");
}

#[test]
fn test_from_toml_rejects_short_list() {
    let content = format!(
        "easy = {}\nmedium = {}\nhard = {}\n",
        list("E", 25),
        list("M", 24),
        list("H", 25)
    );
    let result = StaticWordSource::from_toml(&content, 1);
    assert!(result.is_err());
}

#[test]
fn test_registry_records_once() {
    let registry = UsedWordRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.record(["cat", "DOG"]), 2);
    assert_eq!(registry.record(["CAT", "bird"]), 1);
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("Cat"));
    assert_eq!(registry.snapshot(), vec!["BIRD", "CAT", "DOG"]);
}

#[test]
fn test_registry_clones_share_state() {
    let registry = UsedWordRegistry::new();
    let clone = registry.clone();
    clone.record(["OWL"]);
    assert!(registry.contains("OWL"));

    registry.reset();
    assert!(clone.is_empty());
}

#[test]
fn test_parse_words_filters_lines() {
    let reply = "APPLE\n  river \nice\nAB\nNEW YORK\nSEA-SHELL\nAPPLE\nEXTRAORDINARILY\nBUTTERFLY\n";
    let words = LlmWordSource::parse_words(reply);
    assert_eq!(words, vec!["APPLE", "RIVER", "ICE", "BUTTERFLY"]);
}

#[test]
fn test_prompt_lists_used_words() {
    let fresh = LlmWordSource::prompt(Difficulty::Medium, &[]);
    assert!(fresh.contains("30"));
    assert!(!fresh.contains("Do not use"));

    let used = LlmWordSource::prompt(Difficulty::Medium, &["CAT".to_string(), "DOG".to_string()]);
    assert!(used.contains("Do not use any of these: CAT, DOG"));
}

#[test]
fn test_prompt_follows_difficulty() {
    let easy = LlmWordSource::prompt(Difficulty::Easy, &[]);
    let hard = LlmWordSource::prompt(Difficulty::Hard, &[]);
    assert!(easy.contains("a child would know"));
    assert!(hard.contains("more abstract"));
    assert_ne!(easy, hard);
}

#[tokio::test]
async fn test_supply_falls_back_on_failure() {
    let fallback = Arc::new(StaticWordSource::embedded(7).unwrap());
    let supply = WordSupply::new(fallback).with_primary(Arc::new(FailingSource));

    let words = supply.words(Difficulty::Medium).await;
    assert_eq!(words.len(), BOARD_SIZE);
    assert!(words.iter().all(|w| supply.fallback().list(Difficulty::Medium).contains(w)));
}

#[tokio::test]
async fn test_supply_falls_back_on_short_primary() {
    let fallback = Arc::new(StaticWordSource::embedded(7).unwrap());
    let short: Vec<String> = (0..10).map(|i| format!("G{}", i)).collect();
    let supply = WordSupply::new(fallback).with_primary(Arc::new(FixedSource(short)));

    let words = supply.words(Difficulty::Hard).await;
    assert_eq!(words.len(), BOARD_SIZE);
    assert!(words.iter().all(|w| supply.fallback().list(Difficulty::Hard).contains(w)));
}

#[tokio::test]
async fn test_supply_prefers_primary() {
    let fallback = Arc::new(StaticWordSource::embedded(7).unwrap());
    let generated: Vec<String> = (0..30).map(|i| format!("GEN{}", i)).collect();
    let supply = WordSupply::new(fallback).with_primary(Arc::new(FixedSource(generated)));

    let words = supply.words(Difficulty::Easy).await;
    assert_eq!(words.len(), BOARD_SIZE);
    assert_eq!(words[0], "GEN0");
    assert_eq!(words[24], "GEN24");
}

#[tokio::test]
async fn test_static_source_supplies_board() {
    let source = StaticWordSource::embedded(2).unwrap();
    let words = source.supply(Difficulty::Easy).await.unwrap();
    assert_eq!(words.len(), BOARD_SIZE);
}
