//! Clue giving: an optional generative supplier backed by the rule-based
//! generator.
//!
//! The [`Spymaster`] asks its [`ClueSupplier`] first, bounded by a timeout.
//! Anything the supplier returns is checked against the board before it is
//! accepted; on any failure the rule-based [`ClueGenerator`] decides.

use crate::games::bytenames::{
    ClueCandidate, ClueGenerator, ClueProposal, CluePolicy, PASS_TOKEN, Team, TeamView,
};
use crate::llm_client::LlmClient;
use async_trait::async_trait;
use derive_more::{Display, Error};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default bound on a supplier call.
pub const DEFAULT_SUPPLIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a supplier needs to propose a clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueRequest {
    /// Team receiving the clue.
    pub team: Team,
    /// The team's unrevealed words.
    pub team_words: Vec<String>,
    /// Unrevealed words of the other team.
    pub enemy_words: Vec<String>,
    /// Unrevealed neutral words.
    pub neutral_words: Vec<String>,
    /// Unrevealed assassin words.
    pub assassin_words: Vec<String>,
    /// Tokens already given this game.
    pub used_tokens: Vec<String>,
}

impl From<&TeamView> for ClueRequest {
    fn from(view: &TeamView) -> Self {
        Self {
            team: view.team,
            team_words: view.team_words.clone(),
            enemy_words: view.dangers.enemy.clone(),
            neutral_words: view.dangers.neutral.clone(),
            assassin_words: view.dangers.assassin.clone(),
            used_tokens: view.used_tokens.iter().cloned().collect(),
        }
    }
}

/// A clue as proposed by a supplier, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppliedClue {
    /// Clue word, uppercase.
    pub token: String,
    /// Claimed number of connected words.
    pub number: usize,
    /// Words the supplier says the clue connects, uppercase.
    pub target_words: Vec<String>,
}

impl SuppliedClue {
    /// Whether the supplier chose to pass.
    pub fn is_pass(&self) -> bool {
        self.token == PASS_TOKEN
    }
}

/// The supplier failed or produced an unusable clue.
#[derive(Debug, Clone, Display, Error)]
#[display("Clue supplier failure: {} at {}:{}", message, file, line)]
pub struct ClueSupplierFailure {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ClueSupplierFailure {
    /// Creates a new supplier failure.
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

/// External source of clues.
#[async_trait]
pub trait ClueSupplier: Send + Sync + std::fmt::Debug {
    /// Proposes a clue for the request.
    async fn supply(&self, request: &ClueRequest) -> Result<SuppliedClue, ClueSupplierFailure>;
}

// ─────────────────────────────────────────────────────────────
//  LLM-backed supplier
// ─────────────────────────────────────────────────────────────

const SYSTEM_PROMPT: &str = "You are the spymaster in a team word-guessing game. \
Give a single-word clue that leads your team to its own words and to nothing else. \
If any reading of a clue could point at an enemy, neutral or assassin word, pick another clue.";

/// Clue supplier that asks a hosted language model.
#[derive(Debug, Clone)]
pub struct LlmClueSupplier {
    client: LlmClient,
}

impl LlmClueSupplier {
    /// Wraps a client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Renders the user prompt for a request.
    pub fn prompt(request: &ClueRequest) -> String {
        let used = if request.used_tokens.is_empty() {
            "none".to_string()
        } else {
            request.used_tokens.join(", ")
        };

        format!(
            "You give clues to the {team} team.\n\n\
             Your words: {team_words}\n\
             Enemy words (avoid): {enemy}\n\
             Neutral words (avoid, they end the turn): {neutral}\n\
             Assassin words (never, they lose the game): {assassin}\n\
             Clues already used (do not repeat): {used}\n\n\
             The clue must be one word with no spaces or hyphens and must not be a word on the board.\n\
             Only count words a typical player would connect to the clue.\n\n\
             Answer on one line as CLUE N: WORD1, WORD2\n\
             Example: ANIMAL 2: CAT, DOG",
            team = request.team.to_string().to_uppercase(),
            team_words = request.team_words.join(", "),
            enemy = request.enemy_words.join(", "),
            neutral = request.neutral_words.join(", "),
            assassin = request.assassin_words.join(", "),
            used = used,
        )
    }

    /// Parses a model reply.
    ///
    /// Accepts `CLUE N: W1, W2`. Quotes are ignored; a reply starting with
    /// `PASS` yields the pass clue.
    ///
    /// # Errors
    ///
    /// Returns [`ClueSupplierFailure`] for a reply without target words, a
    /// negative or missing count, or a multi-part clue word.
    #[instrument(fields(len = response.len()))]
    pub fn parse_response(response: &str) -> Result<SuppliedClue, ClueSupplierFailure> {
        let cleaned: String = response
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect();
        let cleaned = cleaned.trim();
        let line = cleaned.lines().next().unwrap_or_default().trim();

        let first_word = line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if first_word.eq_ignore_ascii_case(PASS_TOKEN) {
            debug!("Supplier passed");
            return Ok(SuppliedClue {
                token: PASS_TOKEN.to_string(),
                number: 0,
                target_words: Vec::new(),
            });
        }

        let (head, targets) = line.split_once(':').unwrap_or((line, ""));

        let mut parts = head.split_whitespace();
        let token = parts
            .next()
            .ok_or_else(|| ClueSupplierFailure::new(format!("Empty reply: {:?}", response)))?
            .to_ascii_uppercase();
        let number = parts
            .next()
            .ok_or_else(|| ClueSupplierFailure::new(format!("No count in reply: {:?}", response)))?
            .parse::<usize>()
            .map_err(|e| ClueSupplierFailure::new(format!("Bad count in {:?}: {}", response, e)))?;

        if parts.next().is_some() || token.contains('-') {
            return Err(ClueSupplierFailure::new(format!(
                "Clue must be a single word: {:?}",
                head
            )));
        }

        let target_words: Vec<String> = targets
            .split(',')
            .map(|w| w.trim().to_ascii_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        if target_words.is_empty() {
            return Err(ClueSupplierFailure::new(format!(
                "Reply names no target words: {:?}",
                response
            )));
        }

        Ok(SuppliedClue {
            token,
            number,
            target_words,
        })
    }
}

#[async_trait]
impl ClueSupplier for LlmClueSupplier {
    #[instrument(skip(self, request), fields(team = %request.team))]
    async fn supply(&self, request: &ClueRequest) -> Result<SuppliedClue, ClueSupplierFailure> {
        let reply = self
            .client
            .generate(SYSTEM_PROMPT, &Self::prompt(request))
            .await
            .map_err(|e| ClueSupplierFailure::new(format!("LLM call failed: {}", e)))?;
        debug!(reply = %reply, "LLM clue reply");
        Self::parse_response(&reply)
    }
}

// ─────────────────────────────────────────────────────────────
//  Spymaster
// ─────────────────────────────────────────────────────────────

/// Chooses clues for a game.
#[derive(Debug, Clone)]
pub struct Spymaster {
    generator: ClueGenerator,
    supplier: Option<Arc<dyn ClueSupplier>>,
    timeout: Duration,
}

impl Spymaster {
    /// Rule-based spymaster with no supplier.
    pub fn new(generator: ClueGenerator) -> Self {
        Self {
            generator,
            supplier: None,
            timeout: DEFAULT_SUPPLIER_TIMEOUT,
        }
    }

    /// Adds a supplier consulted before the rules, bounded by `timeout`.
    pub fn with_supplier(mut self, supplier: Arc<dyn ClueSupplier>, timeout: Duration) -> Self {
        self.supplier = Some(supplier);
        self.timeout = timeout;
        self
    }

    /// The rule-based generator.
    pub fn generator(&self) -> &ClueGenerator {
        &self.generator
    }

    /// Whether a supplier is configured.
    pub fn has_supplier(&self) -> bool {
        self.supplier.is_some()
    }

    /// Picks a clue for the view.
    ///
    /// An accepted supplier clue wins; otherwise the rule-based generator
    /// proposes.
    #[instrument(skip(self, view, rng), fields(team = %view.team, supplier = self.supplier.is_some()))]
    pub async fn choose<R: Rng + ?Sized + Send>(&self, view: &TeamView, rng: &mut R) -> ClueProposal {
        if view.team_words.is_empty() {
            info!("No team words left, passing");
            return ClueProposal::Pass;
        }

        if let Some(supplier) = &self.supplier {
            match self.consult(supplier.as_ref(), view).await {
                Ok(candidate) => {
                    info!(token = %candidate.token, targets = ?candidate.connected_words, "Accepted supplier clue");
                    return ClueProposal::Candidate(candidate);
                }
                Err(failure) => warn!(%failure, "Supplier clue rejected, using rules"),
            }
        }

        self.generator.propose(view, rng)
    }

    async fn consult(
        &self,
        supplier: &dyn ClueSupplier,
        view: &TeamView,
    ) -> Result<ClueCandidate, ClueSupplierFailure> {
        let request = ClueRequest::from(view);
        let supplied = tokio::time::timeout(self.timeout, supplier.supply(&request))
            .await
            .map_err(|_| {
                ClueSupplierFailure::new(format!("Supplier timed out after {:?}", self.timeout))
            })??;
        self.accept(supplied, view)
    }

    /// Validates a supplied clue against the view.
    ///
    /// # Errors
    ///
    /// Rejects passes, reused tokens under [`CluePolicy::ForbidReuse`], board
    /// words, targets outside the team's unrevealed words, counts that
    /// disagree with the targets, and tokens failing safety validation.
    #[instrument(skip(self, view), fields(token = %supplied.token))]
    pub fn accept(
        &self,
        supplied: SuppliedClue,
        view: &TeamView,
    ) -> Result<ClueCandidate, ClueSupplierFailure> {
        let supplied = SuppliedClue {
            token: supplied.token.trim().to_ascii_uppercase(),
            number: supplied.number,
            target_words: supplied
                .target_words
                .iter()
                .map(|w| w.trim().to_ascii_uppercase())
                .collect(),
        };
        if supplied.is_pass() {
            return Err(ClueSupplierFailure::new("Supplier passed".to_string()));
        }
        if self.generator.policy() == CluePolicy::ForbidReuse
            && view.used_tokens.contains(&supplied.token)
        {
            return Err(ClueSupplierFailure::new(format!(
                "Clue {} was already used",
                supplied.token
            )));
        }
        if view.is_board_word(&supplied.token) {
            return Err(ClueSupplierFailure::new(format!(
                "Clue {} is a board word",
                supplied.token
            )));
        }
        if supplied.target_words.is_empty() || supplied.target_words.len() != supplied.number {
            return Err(ClueSupplierFailure::new(format!(
                "Clue {} claims {} words but names {:?}",
                supplied.token, supplied.number, supplied.target_words
            )));
        }
        let distinct: std::collections::BTreeSet<&String> = supplied.target_words.iter().collect();
        if distinct.len() != supplied.target_words.len() {
            return Err(ClueSupplierFailure::new(format!(
                "Clue {} repeats a target",
                supplied.token
            )));
        }
        if let Some(stray) = supplied
            .target_words
            .iter()
            .find(|w| !view.team_words.iter().any(|t| t.eq_ignore_ascii_case(w)))
        {
            return Err(ClueSupplierFailure::new(format!(
                "Target {} is not an unrevealed team word",
                stray
            )));
        }

        let safety_score = self
            .generator
            .safety()
            .validate(&supplied.token, &view.dangers)
            .map_err(|e| ClueSupplierFailure::new(e.to_string()))?;

        Ok(ClueCandidate {
            token: supplied.token,
            connected_words: supplied.target_words,
            safety_score,
        })
    }
}
