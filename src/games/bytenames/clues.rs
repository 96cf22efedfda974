//! Rule-based clue candidate generation.
//!
//! Candidates come from three pools, all computed before selection:
//! themes covering team words, category tags shared by a pair of team words,
//! and contextual tokens shared by a pair. The best candidate maximizes
//! `connected words x safety score`, earliest wins ties. When no pool
//! survives, a single-word clue is drawn at random, and failing that the
//! spymaster passes.

use super::board::Board;
use super::classifier::CategoryClassifier;
use super::safety::{Dangers, SafetyEvaluator};
use super::types::{Allegiance, Team};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{debug, info, instrument};

/// Whether a session may hand out the same clue token twice.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CluePolicy {
    /// Tokens may repeat across turns.
    #[default]
    AllowReuse,
    /// Tokens already given this session are skipped.
    ForbidReuse,
}

/// What the clue-giving team can see when choosing a clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamView {
    /// Team receiving the clue.
    pub team: Team,
    /// The team's unrevealed words, in board order.
    pub team_words: Vec<String>,
    /// Unrevealed words the clue must avoid.
    pub dangers: Dangers,
    /// Every unrevealed word on the board.
    pub board_words: Vec<String>,
    /// Tokens already given this session.
    pub used_tokens: BTreeSet<String>,
}

impl TeamView {
    /// Builds the view of `team` over the unrevealed part of `board`.
    pub fn from_board(board: &Board, team: Team, used_tokens: &BTreeSet<String>) -> Self {
        let enemy = team.opponent().allegiance();
        Self {
            team,
            team_words: board.hidden_words(team.allegiance()),
            dangers: Dangers {
                enemy: board.hidden_words(enemy),
                neutral: board.hidden_words(Allegiance::Neutral),
                assassin: board.hidden_words(Allegiance::Assassin),
            },
            board_words: board
                .slots()
                .iter()
                .filter(|s| !s.is_revealed())
                .map(|s| s.word().to_string())
                .collect(),
            used_tokens: used_tokens.clone(),
        }
    }

    /// Whether `token` is itself an unrevealed board word.
    pub fn is_board_word(&self, token: &str) -> bool {
        self.board_words.iter().any(|w| w.eq_ignore_ascii_case(token))
    }
}

/// A scored clue with the team words it connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueCandidate {
    /// The clue word.
    pub token: String,
    /// Team words the clue points at, never empty.
    pub connected_words: Vec<String>,
    /// Safety score at generation time, always positive.
    pub safety_score: f64,
}

impl ClueCandidate {
    /// Selection weight: connected words times safety.
    pub fn weight(&self) -> f64 {
        self.connected_words.len() as f64 * self.safety_score
    }
}

/// Outcome of clue generation.
#[derive(Debug, Clone, PartialEq)]
pub enum ClueProposal {
    /// A clue to give.
    Candidate(ClueCandidate),
    /// No safe clue exists.
    Pass,
}

/// Generates clue candidates for a team.
#[derive(Debug, Clone)]
pub struct ClueGenerator {
    safety: SafetyEvaluator,
    policy: CluePolicy,
}

impl ClueGenerator {
    /// Creates a generator over the given classifier.
    pub fn new(classifier: Arc<dyn CategoryClassifier>, policy: CluePolicy) -> Self {
        Self {
            safety: SafetyEvaluator::new(classifier),
            policy,
        }
    }

    /// The reuse policy in force.
    pub fn policy(&self) -> CluePolicy {
        self.policy
    }

    /// The safety evaluator used to filter candidates.
    pub fn safety(&self) -> &SafetyEvaluator {
        &self.safety
    }

    fn classifier(&self) -> &dyn CategoryClassifier {
        self.safety.classifier().as_ref()
    }

    /// Whether the token may be proposed at all, before safety scoring.
    fn admissible(&self, token: &str, view: &TeamView) -> bool {
        if view.is_board_word(token) {
            return false;
        }
        match self.policy {
            CluePolicy::AllowReuse => true,
            CluePolicy::ForbidReuse => !view.used_tokens.contains(&token.to_ascii_uppercase()),
        }
    }

    fn scored(&self, token: &str, connected: Vec<String>, view: &TeamView) -> Option<ClueCandidate> {
        if !self.admissible(token, view) {
            return None;
        }
        let safety_score = self.safety.score(token, &view.dangers);
        (safety_score > 0.0).then(|| ClueCandidate {
            token: token.to_string(),
            connected_words: connected,
            safety_score,
        })
    }

    /// Every multi-source candidate in enumeration order.
    ///
    /// Theme candidates come first in theme order, then pair candidates by
    /// shared category, then pair candidates by contextual association.
    /// Pairs follow board order.
    #[instrument(skip(self, view), fields(team_words = view.team_words.len()))]
    pub fn candidates(&self, view: &TeamView) -> Vec<ClueCandidate> {
        let mut candidates = Vec::new();

        for theme in self.classifier().themes() {
            let connected: Vec<String> = view
                .team_words
                .iter()
                .filter(|w| self.classifier().belongs_to(w, &theme))
                .cloned()
                .collect();
            if connected.is_empty() {
                continue;
            }
            candidates.extend(self.scored(&theme, connected, view));
        }

        let pairs = pairs(&view.team_words);

        for (first, second) in &pairs {
            let second_tags = self.classifier().tags_of(second);
            for tag in self
                .classifier()
                .tags_of(first)
                .into_iter()
                .filter(|t| second_tags.contains(t))
            {
                candidates.extend(self.scored(
                    &tag,
                    vec![first.to_string(), second.to_string()],
                    view,
                ));
            }
        }

        for (first, second) in &pairs {
            for token in self.classifier().shared_associations(first, second) {
                candidates.extend(self.scored(
                    &token,
                    vec![first.to_string(), second.to_string()],
                    view,
                ));
            }
        }

        debug!(count = candidates.len(), "Enumerated clue candidates");
        candidates
    }

    /// Highest-weight candidate; the earliest one wins ties.
    pub fn select(candidates: &[ClueCandidate]) -> Option<&ClueCandidate> {
        candidates.iter().fold(None, |best, current| match best {
            Some(b) if current.weight() <= b.weight() => Some(b),
            _ => Some(current),
        })
    }

    /// Single-word candidates, one per (team word, token) pair.
    ///
    /// Tokens come from the representative clues of the word's themes and from
    /// its curated associations. Each must keep a positive safety score and
    /// must not match any dangerous word.
    #[instrument(skip(self, view), fields(team_words = view.team_words.len()))]
    pub fn single_word_candidates(&self, view: &TeamView) -> Vec<ClueCandidate> {
        let mut candidates: Vec<ClueCandidate> = Vec::new();

        for word in &view.team_words {
            let mut tokens: Vec<String> = self
                .classifier()
                .tags_of(word)
                .iter()
                .flat_map(|theme| self.classifier().theme_clues(theme))
                .collect();
            tokens.extend(self.classifier().associations_of(word));

            let mut seen = BTreeSet::new();
            for token in tokens {
                if !seen.insert(token.clone()) || !self.admissible(&token, view) {
                    continue;
                }
                match self.safety.validate(&token, &view.dangers) {
                    Ok(safety_score) => candidates.push(ClueCandidate {
                        token,
                        connected_words: vec![word.clone()],
                        safety_score,
                    }),
                    Err(reason) => debug!(%reason, "Discarded single-word clue"),
                }
            }
        }

        candidates
    }

    /// Proposes a clue for the view, or a pass.
    #[instrument(skip(self, view, rng), fields(team = %view.team, policy = %self.policy))]
    pub fn propose<R: Rng + ?Sized>(&self, view: &TeamView, rng: &mut R) -> ClueProposal {
        if view.team_words.is_empty() {
            info!("No team words left, passing");
            return ClueProposal::Pass;
        }

        let candidates = self.candidates(view);
        if let Some(best) = Self::select(&candidates) {
            info!(
                token = %best.token,
                connected = best.connected_words.len(),
                safety = best.safety_score,
                "Selected clue"
            );
            return ClueProposal::Candidate(best.clone());
        }

        let singles = self.single_word_candidates(view);
        if !singles.is_empty() {
            let pick = singles[rng.gen_range(0..singles.len())].clone();
            info!(token = %pick.token, word = ?pick.connected_words, "Selected single-word clue");
            return ClueProposal::Candidate(pick);
        }

        info!("No safe clue found, passing");
        ClueProposal::Pass
    }
}

/// Unordered pairs of words in input order.
fn pairs(words: &[String]) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    for (i, first) in words.iter().enumerate() {
        for second in &words[i + 1..] {
            pairs.push((first.as_str(), second.as_str()));
        }
    }
    pairs
}
