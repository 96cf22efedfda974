//! Safety evaluation for clue tokens.
//!
//! A token is dangerous when it points at words the clue-giving team does not
//! own. Two independent checks exist: a numeric score used to rank generated
//! candidates, and a word-by-word match test used to reject fully formed clues.

use super::classifier::CategoryClassifier;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Starting score of every token.
pub const BASE_SAFETY: f64 = 1.0;

/// Penalty per dangerous word belonging to the token's theme.
pub const DANGER_PENALTY: f64 = 0.5;

/// Extra penalty when that word is the assassin.
pub const ASSASSIN_PENALTY: f64 = 0.8;

/// Words a clue must steer away from, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dangers {
    /// Unrevealed words of the opposing team.
    pub enemy: Vec<String>,
    /// Unrevealed neutral words.
    pub neutral: Vec<String>,
    /// Unrevealed assassin words.
    pub assassin: Vec<String>,
}

impl Dangers {
    /// Every dangerous word: enemy, then neutral, then assassin.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.enemy
            .iter()
            .chain(&self.neutral)
            .chain(&self.assassin)
            .map(String::as_str)
    }

    /// Total number of dangerous words.
    pub fn len(&self) -> usize {
        self.enemy.len() + self.neutral.len() + self.assassin.len()
    }

    /// Whether there are no dangerous words at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Why a clue token was rejected.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum UnsafeClue {
    /// The token relates directly to a dangerous word.
    #[display("Clue {} matches dangerous word {}", token, word)]
    MatchesWord {
        /// Rejected token.
        token: String,
        /// Dangerous word it matched.
        word: String,
    },

    /// The token's theme covers too many dangerous words.
    #[display("Clue {} has no safety margin", _0)]
    NoMargin(String),
}

impl std::error::Error for UnsafeClue {}

/// Scores and validates clue tokens against dangerous words.
#[derive(Debug, Clone)]
pub struct SafetyEvaluator {
    classifier: Arc<dyn CategoryClassifier>,
}

impl SafetyEvaluator {
    /// Creates an evaluator over the given classifier.
    pub fn new(classifier: Arc<dyn CategoryClassifier>) -> Self {
        Self { classifier }
    }

    /// The classifier used for theme membership.
    pub fn classifier(&self) -> &Arc<dyn CategoryClassifier> {
        &self.classifier
    }

    /// Safety score of `token`, never below zero.
    ///
    /// Starts at 1.0 and loses 0.5 for each dangerous word in the token's
    /// theme, plus another 0.8 when that word is the assassin.
    #[instrument(skip(self, dangers), fields(dangerous = dangers.len()))]
    pub fn score(&self, token: &str, dangers: &Dangers) -> f64 {
        let mut score = BASE_SAFETY;

        for word in dangers.all() {
            if self.classifier.belongs_to(word, token) {
                score = (score - DANGER_PENALTY).max(0.0);
            }
        }
        for word in &dangers.assassin {
            if self.classifier.belongs_to(word, token) {
                score = (score - ASSASSIN_PENALTY).max(0.0);
            }
        }

        debug!(score, "Scored clue token");
        score
    }

    /// Whether `token` keeps a positive score.
    pub fn is_safe(&self, token: &str, dangers: &Dangers) -> bool {
        self.score(token, dangers) > 0.0
    }

    /// Whether `token` would point a guesser at `word`.
    ///
    /// True when the two are equal, one contains the other, the word is a
    /// member of the theme the token names, or the token is a known
    /// association of the word.
    pub fn matches_clue(&self, word: &str, token: &str) -> bool {
        let word = word.trim().to_ascii_uppercase();
        let token = token.trim().to_ascii_uppercase();

        if word == token {
            return true;
        }
        if word.contains(&token) || token.contains(&word) {
            return true;
        }
        if self.classifier.belongs_to(&word, &token) {
            return true;
        }
        self.classifier.is_known_association(&word, &token)
    }

    /// Full validation of a formed clue token.
    ///
    /// # Errors
    ///
    /// Returns [`UnsafeClue::MatchesWord`] if the token matches any dangerous
    /// word, or [`UnsafeClue::NoMargin`] if its score is zero.
    #[instrument(skip(self, dangers), fields(dangerous = dangers.len()))]
    pub fn validate(&self, token: &str, dangers: &Dangers) -> Result<f64, UnsafeClue> {
        if let Some(word) = dangers.all().find(|word| self.matches_clue(word, token)) {
            debug!(word, "Clue matches dangerous word");
            return Err(UnsafeClue::MatchesWord {
                token: token.to_string(),
                word: word.to_string(),
            });
        }

        let score = self.score(token, dangers);
        if score > 0.0 {
            Ok(score)
        } else {
            Err(UnsafeClue::NoMargin(token.to_string()))
        }
    }
}
