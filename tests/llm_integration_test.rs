//! Integration tests against live LLM providers.
//!
//! Run with `--features api` and the provider keys in the environment.

use bytenames::{
    ClueRequest, ClueSupplier, Difficulty, LlmClient, LlmClueSupplier, LlmConfig, LlmProvider,
    LlmWordSource, Team, UsedWordRegistry, WordSource,
};
use tracing::instrument;

fn request() -> ClueRequest {
    let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
    ClueRequest {
        team: Team::Red,
        team_words: words(&["CAT", "DOG", "HORSE", "PIANO"]),
        enemy_words: words(&["LION", "GUITAR"]),
        neutral_words: words(&["RIVER", "CLOUD"]),
        assassin_words: words(&["SHARK"]),
        used_tokens: Vec::new(),
    }
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    dotenvy::dotenv().ok();

    let config = LlmConfig::from_env(
        LlmProvider::Anthropic,
        LlmProvider::Anthropic.default_model().to_string(),
        0.7,
        50,
    )
    .expect("ANTHROPIC_API_KEY not set");

    let client = LlmClient::new(config);

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_connectivity() {
    dotenvy::dotenv().ok();

    let config = LlmConfig::from_env(
        LlmProvider::OpenAI,
        LlmProvider::OpenAI.default_model().to_string(),
        0.7,
        50,
    )
    .expect("OPENAI_API_KEY not set");

    let client = LlmClient::new(config);

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_clue_parses() {
    dotenvy::dotenv().ok();

    let config = LlmConfig::from_env(
        LlmProvider::OpenAI,
        LlmProvider::OpenAI.default_model().to_string(),
        0.7,
        100,
    )
    .expect("OPENAI_API_KEY not set");

    let supplier = LlmClueSupplier::new(LlmClient::new(config));
    let clue = supplier.supply(&request()).await.expect("Failed to get clue");

    eprintln!("Clue: {:?}", clue);
    assert!(!clue.token.is_empty());
    assert!(!clue.token.contains(' '));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_words_are_fresh() {
    dotenvy::dotenv().ok();

    let config = LlmConfig::from_env(
        LlmProvider::OpenAI,
        LlmProvider::OpenAI.default_model().to_string(),
        0.7,
        100,
    )
    .expect("OPENAI_API_KEY not set");

    let registry = UsedWordRegistry::new();
    let source = LlmWordSource::new(config, registry.clone());
    let words = source
        .supply(Difficulty::Medium)
        .await
        .expect("Failed to generate words");

    eprintln!("Words: {:?}", words);
    assert_eq!(words.len(), 25);
    assert!(words.iter().all(|w| registry.contains(w)));
}
