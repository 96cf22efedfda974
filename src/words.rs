//! Word sources for dealing boards.
//!
//! The static lists always work. A generative source may be tried first; it
//! avoids words already handed out anywhere in the process, tracked by a
//! shared [`UsedWordRegistry`].

use crate::games::bytenames::BOARD_SIZE;
use crate::llm_client::{LlmClient, LlmConfig};
use async_trait::async_trait;
use derive_more::{Display, Error};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use tracing::{debug, info, instrument, warn};

const EMBEDDED_WORD_LISTS: &str = include_str!("../data/word_lists.toml");

/// Words requested from a generative source.
pub const GENERATED_WORD_COUNT: usize = 30;

/// Shortest generated word kept.
pub const MIN_WORD_LEN: usize = 3;

/// Longest generated word kept.
pub const MAX_WORD_LEN: usize = 14;

/// Static list to draw from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// Concrete everyday nouns.
    Easy,
    /// Broader vocabulary.
    #[default]
    Medium,
    /// Abstract and less common words.
    Hard,
}

/// The word source could not produce a board's worth of words.
#[derive(Debug, Clone, Display, Error)]
#[display("Word generation failure: {} at {}:{}", message, file, line)]
pub struct GenerationFailure {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GenerationFailure {
    /// Creates a new generation failure.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Supplies board words.
#[async_trait]
pub trait WordSource: Send + Sync + std::fmt::Debug {
    /// Returns at least 25 unique uppercase words.
    async fn supply(&self, difficulty: Difficulty) -> Result<Vec<String>, GenerationFailure>;
}

// ─────────────────────────────────────────────────────────────
//  Used-word registry
// ─────────────────────────────────────────────────────────────

/// Process-wide record of generated words.
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct UsedWordRegistry {
    words: Arc<Mutex<BTreeSet<String>>>,
}

impl UsedWordRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.words.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records words, returning how many were new.
    #[instrument(skip(self, words))]
    pub fn record<I, S>(&self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = self.lock();
        let added = words
            .into_iter()
            .filter(|w| set.insert(w.as_ref().to_ascii_uppercase()))
            .count();
        debug!(added, total = set.len(), "Recorded used words");
        added
    }

    /// Whether the word has been handed out.
    pub fn contains(&self, word: &str) -> bool {
        self.lock().contains(&word.to_ascii_uppercase())
    }

    /// Sorted copy of every recorded word.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// Number of recorded words.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every recorded word.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        let mut set = self.lock();
        info!(cleared = set.len(), "Resetting used word registry");
        set.clear();
    }
}

// ─────────────────────────────────────────────────────────────
//  Static lists
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct WordLists {
    easy: Vec<String>,
    medium: Vec<String>,
    hard: Vec<String>,
}

/// Draws boards from fixed difficulty lists.
#[derive(Debug)]
pub struct StaticWordSource {
    easy: Vec<String>,
    medium: Vec<String>,
    hard: Vec<String>,
    rng: Mutex<ChaCha8Rng>,
}

impl StaticWordSource {
    /// Source over the lists shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationFailure`] if the embedded lists fail to parse.
    pub fn embedded(seed: u64) -> Result<Self, GenerationFailure> {
        Self::from_toml(EMBEDDED_WORD_LISTS, seed)
    }

    /// Parses `easy`, `medium` and `hard` arrays from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationFailure`] on malformed TOML or any list with
    /// fewer than 25 distinct words.
    #[instrument(skip(content), fields(len = content.len()))]
    pub fn from_toml(content: &str, seed: u64) -> Result<Self, GenerationFailure> {
        let lists: WordLists = toml::from_str(content)
            .map_err(|e| GenerationFailure::new(format!("Failed to parse word lists: {}", e)))?;

        let source = Self {
            easy: distinct(&lists.easy),
            medium: distinct(&lists.medium),
            hard: distinct(&lists.hard),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        };

        for (name, list) in [
            ("easy", &source.easy),
            ("medium", &source.medium),
            ("hard", &source.hard),
        ] {
            if list.len() < BOARD_SIZE {
                return Err(GenerationFailure::new(format!(
                    "List {} has {} distinct words, need {}",
                    name,
                    list.len(),
                    BOARD_SIZE
                )));
            }
        }

        info!(
            easy = source.easy.len(),
            medium = source.medium.len(),
            hard = source.hard.len(),
            "Loaded static word lists"
        );
        Ok(source)
    }

    /// The de-duplicated list for a difficulty.
    pub fn list(&self, difficulty: Difficulty) -> &[String] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Draws 25 distinct words with the caller's RNG.
    pub fn draw<R: Rng + ?Sized>(&self, difficulty: Difficulty, rng: &mut R) -> Vec<String> {
        self.list(difficulty)
            .choose_multiple(rng, BOARD_SIZE)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl WordSource for StaticWordSource {
    #[instrument(skip(self))]
    async fn supply(&self, difficulty: Difficulty) -> Result<Vec<String>, GenerationFailure> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let words = self.draw(difficulty, &mut *rng);
        debug!(count = words.len(), "Drew static words");
        Ok(words)
    }
}

/// Uppercased words in first-seen order without repeats.
fn distinct(words: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .iter()
        .map(|w| w.trim().to_ascii_uppercase())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

// ─────────────────────────────────────────────────────────────
//  Generative source
// ─────────────────────────────────────────────────────────────

const WORD_SYSTEM_PROMPT: &str =
    "You pick words for a party word-guessing game. Reply with common English nouns only.";

/// Asks a language model for fresh nouns.
#[derive(Debug, Clone)]
pub struct LlmWordSource {
    client: LlmClient,
    registry: UsedWordRegistry,
}

impl LlmWordSource {
    /// Builds a source from a client configuration.
    ///
    /// Word generation samples hotter and longer than clue giving.
    pub fn new(config: LlmConfig, registry: UsedWordRegistry) -> Self {
        let config = config.with_temperature(0.8).with_max_tokens(500);
        Self {
            client: LlmClient::new(config),
            registry,
        }
    }

    /// The registry this source avoids and records into.
    pub fn registry(&self) -> &UsedWordRegistry {
        &self.registry
    }

    /// Renders the request for `difficulty`, listing registered words to avoid.
    pub fn prompt(difficulty: Difficulty, used: &[String]) -> String {
        let level = match difficulty {
            Difficulty::Easy => "Simple, concrete words a child would know",
            Difficulty::Medium => "Everyday objects, places, animals or things",
            Difficulty::Hard => "Less common or more abstract nouns",
        };
        let mut prompt = format!(
            "List {} different nouns for a word game.\n\
             - {}; no names or proper nouns\n\
             - One word each, no phrases\n\
             - Vary the topics and avoid near-synonyms\n\
             - One word per line, in capitals, nothing else",
            GENERATED_WORD_COUNT, level
        );
        if !used.is_empty() {
            prompt.push_str(&format!("\n\nDo not use any of these: {}", used.join(", ")));
        }
        prompt
    }

    /// Keeps lines that are single words of 3 to 14 ASCII letters, uppercased
    /// and without repeats.
    pub fn parse_words(reply: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        reply
            .lines()
            .map(|line| line.trim().to_ascii_uppercase())
            .filter(|w| (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&w.len()))
            .filter(|w| w.chars().all(|c| c.is_ascii_uppercase()))
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }
}

#[async_trait]
impl WordSource for LlmWordSource {
    #[instrument(skip(self))]
    async fn supply(&self, difficulty: Difficulty) -> Result<Vec<String>, GenerationFailure> {
        let reply = self
            .client
            .generate(
                WORD_SYSTEM_PROMPT,
                &Self::prompt(difficulty, &self.registry.snapshot()),
            )
            .await
            .map_err(|e| GenerationFailure::new(format!("LLM call failed: {}", e)))?;

        let words: Vec<String> = Self::parse_words(&reply)
            .into_iter()
            .filter(|w| !self.registry.contains(w))
            .collect();
        self.registry.record(&words);
        info!(kept = words.len(), registered = self.registry.len(), "Generated words");

        if words.len() < BOARD_SIZE {
            return Err(GenerationFailure::new(format!(
                "Generated only {} usable words",
                words.len()
            )));
        }
        Ok(words.into_iter().take(BOARD_SIZE).collect())
    }
}

// ─────────────────────────────────────────────────────────────
//  Fallback chain
// ─────────────────────────────────────────────────────────────

/// Generative source with the static lists behind it.
#[derive(Debug, Clone)]
pub struct WordSupply {
    primary: Option<Arc<dyn WordSource>>,
    fallback: Arc<StaticWordSource>,
}

impl WordSupply {
    /// Static lists only.
    pub fn new(fallback: Arc<StaticWordSource>) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    /// Tries `primary` before the static lists.
    pub fn with_primary(mut self, primary: Arc<dyn WordSource>) -> Self {
        self.primary = Some(primary);
        self
    }

    /// The static source.
    pub fn fallback(&self) -> &StaticWordSource {
        &self.fallback
    }

    /// Returns 25 unique words, falling back to the static lists on any
    /// generation failure.
    #[instrument(skip(self), fields(primary = self.primary.is_some()))]
    pub async fn words(&self, difficulty: Difficulty) -> Vec<String> {
        if let Some(primary) = &self.primary {
            match primary.supply(difficulty).await {
                Ok(words) if distinct(&words).len() >= BOARD_SIZE => {
                    return distinct(&words).into_iter().take(BOARD_SIZE).collect();
                }
                Ok(words) => warn!(count = words.len(), "Too few distinct words, using static list"),
                Err(failure) => warn!(%failure, "Word generation failed, using static list"),
            }
        }

        let mut rng = self.fallback.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.fallback.draw(difficulty, &mut *rng)
    }
}
