//! Bytenames: a two-team word-deduction game.
//!
//! Red and blue share a 25-word board. Each turn a spymaster gives one clue
//! word and a count, and the team uncovers words hoping to hit its own agents
//! while avoiding the other team's, the neutrals and the single assassin.

mod board;
mod classifier;
mod clues;
mod game;
mod safety;
mod types;

pub use board::{Board, BoardError};
pub use classifier::{Affinity, CategoryClassifier, Lexicon, LexiconError, StaticClassifier, Theme};
pub use clues::{ClueCandidate, ClueGenerator, CluePolicy, ClueProposal, TeamView};
pub use game::{Game, GameError, GuessOutcome, STARTING_TEAM, TurnResult};
pub use safety::{
    ASSASSIN_PENALTY, BASE_SAFETY, DANGER_PENALTY, Dangers, SafetyEvaluator, UnsafeClue,
};
pub use types::{
    ASSASSINS, Allegiance, BLUE_AGENTS, BOARD_SIZE, Clue, ClueRecord, NEUTRALS, PASS_TOKEN, Phase,
    RED_AGENTS, Slot, SlotReveal, Team,
};
