//! Session state machine for one bytenames game.
//!
//! A game moves `Waiting -> Playing -> Ended`. `Playing` loops across turn
//! switches. Clues are dealt at turn boundaries by a [`Spymaster`], which the
//! caller passes in so one spymaster can serve many rooms.

use super::board::{Board, BoardError};
use super::clues::{ClueProposal, TeamView};
use super::types::{Allegiance, Clue, ClueRecord, Phase, SlotReveal, Team};
use crate::Spymaster;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// Team that opens every game.
pub const STARTING_TEAM: Team = Team::Red;

/// Errors from game operations. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// Wrong phase, no guesses left, or slot out of range.
    #[display("Invalid move: {}", _0)]
    InvalidMove(String),

    /// The slot was already uncovered.
    #[display("Slot {} is already revealed", _0)]
    AlreadyRevealed(usize),
}

impl std::error::Error for GameError {}

/// What happens to the turn after a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TurnResult {
    /// Correct guess, the same team keeps guessing.
    ContinueGuessing,
    /// The turn passed to `next`.
    SwitchTeams {
        /// Team now on turn.
        next: Team,
    },
    /// The game ended.
    #[serde(rename_all = "camelCase")]
    GameOver {
        /// Winning team.
        winner: Team,
        /// Every slot's word and allegiance.
        reveal: Vec<SlotReveal>,
        /// All clues given this game.
        clue_history: Vec<ClueRecord>,
    },
}

/// Result of a successful guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    /// Slot that was uncovered.
    pub slot: usize,
    /// Its word.
    pub word: String,
    /// Its allegiance.
    pub allegiance: Allegiance,
    /// Turn consequence.
    pub turn: TurnResult,
}

impl GuessOutcome {
    /// Whether the game ended on this guess.
    pub fn is_game_over(&self) -> bool {
        matches!(self.turn, TurnResult::GameOver { .. })
    }

    /// Whether the turn passed to the other team.
    pub fn switched_teams(&self) -> bool {
        matches!(self.turn, TurnResult::SwitchTeams { .. })
    }
}

/// One game's mutable state.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_team: Team,
    phase: Phase,
    red_score: usize,
    blue_score: usize,
    red_remaining: usize,
    blue_remaining: usize,
    current_clue: Option<Clue>,
    guesses_remaining: usize,
    clue_history: Vec<ClueRecord>,
    used_clue_tokens: BTreeSet<String>,
    winner: Option<Team>,
    rng: ChaCha8Rng,
}

// ─────────────────────────────────────────────────────────────
//  Construction
// ─────────────────────────────────────────────────────────────

impl Game {
    /// Deals a fresh board from `words`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if `words` cannot fill a board.
    #[instrument(skip(words), fields(supplied = words.len()))]
    pub fn deal(words: &[String], seed: u64) -> Result<Self, BoardError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let board = Board::generate(words, &mut rng)?;
        Ok(Self::with_rng(board, rng))
    }

    /// Wraps an existing board in a waiting game.
    pub fn from_board(board: Board, seed: u64) -> Self {
        Self::with_rng(board, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(board: Board, rng: ChaCha8Rng) -> Self {
        Self {
            board,
            current_team: STARTING_TEAM,
            phase: Phase::Waiting,
            red_score: 0,
            blue_score: 0,
            red_remaining: Team::Red.agent_count(),
            blue_remaining: Team::Blue.agent_count(),
            current_clue: None,
            guesses_remaining: 0,
            clue_history: Vec::new(),
            used_clue_tokens: BTreeSet::new(),
            winner: None,
            rng,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Accessors
// ─────────────────────────────────────────────────────────────

impl Game {
    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Team on turn.
    pub fn current_team(&self) -> Team {
        self.current_team
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Words found for `team`.
    pub fn score(&self, team: Team) -> usize {
        match team {
            Team::Red => self.red_score,
            Team::Blue => self.blue_score,
        }
    }

    /// Words `team` still has to find.
    pub fn remaining(&self, team: Team) -> usize {
        match team {
            Team::Red => self.red_remaining,
            Team::Blue => self.blue_remaining,
        }
    }

    /// Clue in force, if any.
    pub fn current_clue(&self) -> Option<&Clue> {
        self.current_clue.as_ref()
    }

    /// Guesses left this turn.
    pub fn guesses_remaining(&self) -> usize {
        self.guesses_remaining
    }

    /// Clues given this game, oldest first.
    pub fn clue_history(&self) -> &[ClueRecord] {
        &self.clue_history
    }

    /// Clue tokens given this game.
    pub fn used_clue_tokens(&self) -> &BTreeSet<String> {
        &self.used_clue_tokens
    }

    /// Winner once the game has ended.
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// What `team`'s spymaster sees.
    pub fn team_view(&self, team: Team) -> TeamView {
        TeamView::from_board(&self.board, team, &self.used_clue_tokens)
    }
}

// ─────────────────────────────────────────────────────────────
//  Operations
// ─────────────────────────────────────────────────────────────

impl Game {
    /// Starts play: deals the first clue and enters `Playing`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] unless the game is waiting.
    #[instrument(skip(self, spymaster), fields(team = %self.current_team))]
    pub async fn start(&mut self, spymaster: &Spymaster) -> Result<Clue, GameError> {
        if self.phase != Phase::Waiting {
            warn!(phase = %self.phase, "Start rejected");
            return Err(GameError::InvalidMove(format!(
                "cannot start a game that is {}",
                self.phase
            )));
        }

        let clue = self.give_clue(spymaster).await;
        self.phase = Phase::Playing;
        info!(token = %clue.token, number = clue.number, "Game started");
        Ok(clue)
    }

    /// Uncovers the slot at `index` for the team on turn.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] outside `Playing`, with no guesses
    /// left, or for an index off the board, and
    /// [`GameError::AlreadyRevealed`] for an uncovered slot.
    #[instrument(skip(self), fields(team = %self.current_team, guesses = self.guesses_remaining))]
    pub fn guess(&mut self, index: usize) -> Result<GuessOutcome, GameError> {
        if self.phase != Phase::Playing {
            warn!(phase = %self.phase, "Guess outside play");
            return Err(GameError::InvalidMove(format!(
                "cannot guess while the game is {}",
                self.phase
            )));
        }
        if self.guesses_remaining == 0 {
            warn!("Guess with none remaining");
            return Err(GameError::InvalidMove("no guesses remaining".to_string()));
        }

        let slot = self.board.get_mut(index).ok_or_else(|| {
            warn!("Guess off the board");
            GameError::InvalidMove(format!("slot {} is not on the board", index))
        })?;
        if !slot.reveal() {
            warn!("Guess on revealed slot");
            return Err(GameError::AlreadyRevealed(index));
        }
        let word = slot.word().to_string();
        let allegiance = slot.allegiance();

        self.guesses_remaining -= 1;
        match allegiance {
            Allegiance::Red => {
                self.red_score += 1;
                self.red_remaining = self.red_remaining.saturating_sub(1);
            }
            Allegiance::Blue => {
                self.blue_score += 1;
                self.blue_remaining = self.blue_remaining.saturating_sub(1);
            }
            Allegiance::Neutral | Allegiance::Assassin => {}
        }

        let turn = if self.red_remaining == 0 || self.blue_remaining == 0 {
            let winner = if self.red_remaining == 0 {
                Team::Red
            } else {
                Team::Blue
            };
            self.finish(winner)
        } else if allegiance == Allegiance::Assassin {
            self.finish(self.current_team.opponent())
        } else if allegiance == self.current_team.allegiance() && self.guesses_remaining > 0 {
            TurnResult::ContinueGuessing
        } else {
            self.switch_team()
        };

        info!(index, word = %word, allegiance = %allegiance, ?turn, "Guess resolved");
        Ok(GuessOutcome {
            slot: index,
            word,
            allegiance,
            turn,
        })
    }

    /// Passes the turn to the other team and deals it a clue.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] unless the game is in play.
    #[instrument(skip(self, spymaster), fields(team = %self.current_team))]
    pub async fn end_turn(&mut self, spymaster: &Spymaster) -> Result<Clue, GameError> {
        if self.phase != Phase::Playing {
            warn!(phase = %self.phase, "End turn outside play");
            return Err(GameError::InvalidMove(format!(
                "cannot end a turn while the game is {}",
                self.phase
            )));
        }
        self.switch_team();
        Ok(self.give_clue(spymaster).await)
    }

    /// Deals a clue to the team on turn, replacing the current one.
    ///
    /// Used after a guess switches teams.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] unless the game is in play.
    #[instrument(skip(self, spymaster), fields(team = %self.current_team))]
    pub async fn deal_clue(&mut self, spymaster: &Spymaster) -> Result<Clue, GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::InvalidMove(format!(
                "cannot deal a clue while the game is {}",
                self.phase
            )));
        }
        Ok(self.give_clue(spymaster).await)
    }

    /// Replaces the board and returns to `Waiting` with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if `words` cannot fill a board; the game is
    /// left untouched.
    #[instrument(skip(self, words), fields(supplied = words.len()))]
    pub fn reset(&mut self, words: &[String]) -> Result<(), BoardError> {
        let board = Board::generate(words, &mut self.rng)?;
        let rng = self.rng.clone();
        *self = Self::with_rng(board, rng);
        info!("Game reset");
        Ok(())
    }

    async fn give_clue(&mut self, spymaster: &Spymaster) -> Clue {
        let view = self.team_view(self.current_team);
        let clue = match spymaster.choose(&view, &mut self.rng).await {
            ClueProposal::Candidate(candidate) => {
                let token = candidate.token.to_ascii_uppercase();
                self.used_clue_tokens.insert(token.clone());
                self.clue_history.push(ClueRecord {
                    team: self.current_team,
                    clue_token: token.clone(),
                    target_count: candidate.connected_words.len(),
                    target_words: candidate.connected_words.clone(),
                });
                Clue {
                    token,
                    number: candidate.connected_words.len(),
                    target_words: candidate.connected_words,
                }
            }
            ClueProposal::Pass => Clue::pass(),
        };

        self.guesses_remaining = clue.number + 1;
        self.current_clue = Some(clue.clone());
        clue
    }

    fn switch_team(&mut self) -> TurnResult {
        self.current_team = self.current_team.opponent();
        self.current_clue = None;
        self.guesses_remaining = 0;
        TurnResult::SwitchTeams {
            next: self.current_team,
        }
    }

    fn finish(&mut self, winner: Team) -> TurnResult {
        self.phase = Phase::Ended;
        self.winner = Some(winner);
        self.guesses_remaining = 0;
        info!(winner = %winner, "Game over");
        TurnResult::GameOver {
            winner,
            reveal: self.board.reveal_all(),
            clue_history: self.clue_history.clone(),
        }
    }
}
