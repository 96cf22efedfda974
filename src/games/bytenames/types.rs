//! Core domain types for bytenames.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Number of slots on a board.
pub const BOARD_SIZE: usize = 25;

/// Words owned by the starting team.
pub const RED_AGENTS: usize = 9;

/// Words owned by the second team.
pub const BLUE_AGENTS: usize = 8;

/// Assassin words on a board.
pub const ASSASSINS: usize = 1;

/// Neutral words on a board.
pub const NEUTRALS: usize = BOARD_SIZE - RED_AGENTS - BLUE_AGENTS - ASSASSINS;

/// Token used when the spymaster cannot find a safe clue.
pub const PASS_TOKEN: &str = "PASS";

/// One of the two competing teams.
///
/// Red always starts and owns nine words; blue owns eight.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Team {
    /// Starting team (nine words).
    Red,
    /// Second team (eight words).
    Blue,
}

impl Team {
    /// Returns the opposing team.
    pub fn opponent(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// The allegiance carried by this team's slots.
    pub fn allegiance(self) -> Allegiance {
        match self {
            Team::Red => Allegiance::Red,
            Team::Blue => Allegiance::Blue,
        }
    }

    /// Number of words this team owns on a fresh board.
    pub fn agent_count(self) -> usize {
        match self {
            Team::Red => RED_AGENTS,
            Team::Blue => BLUE_AGENTS,
        }
    }
}

/// Fixed ownership of a board slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Allegiance {
    /// Belongs to the red team.
    Red,
    /// Belongs to the blue team.
    Blue,
    /// Belongs to nobody; ends the turn.
    Neutral,
    /// Ends the game for the guessing team.
    Assassin,
}

impl Allegiance {
    /// Returns the owning team, if any.
    pub fn team(self) -> Option<Team> {
        match self {
            Allegiance::Red => Some(Team::Red),
            Allegiance::Blue => Some(Team::Blue),
            Allegiance::Neutral | Allegiance::Assassin => None,
        }
    }
}

/// One of the 25 board positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    word: String,
    allegiance: Allegiance,
    revealed: bool,
}

impl Slot {
    /// Creates an unrevealed slot.
    pub fn new(word: impl Into<String>, allegiance: Allegiance) -> Self {
        Self {
            word: word.into(),
            allegiance,
            revealed: false,
        }
    }

    /// The display word.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The fixed allegiance.
    pub fn allegiance(&self) -> Allegiance {
        self.allegiance
    }

    /// Whether the slot has been uncovered.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Uncovers the slot. Returns false if it was already revealed.
    pub(crate) fn reveal(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        self.revealed = true;
        true
    }
}

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Board dealt, waiting for `start`.
    Waiting,
    /// Teams are taking turns.
    Playing,
    /// A team won; terminal until reset.
    Ended,
}

/// The clue currently in force for the active team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    /// The single clue word.
    pub token: String,
    /// How many team words the clue claims to connect.
    pub number: usize,
    /// The connected words, when known.
    pub target_words: Vec<String>,
}

impl Clue {
    /// The explicit pass clue.
    pub fn pass() -> Self {
        Self {
            token: PASS_TOKEN.to_string(),
            number: 0,
            target_words: Vec::new(),
        }
    }

    /// Whether this is the pass clue.
    pub fn is_pass(&self) -> bool {
        self.token == PASS_TOKEN && self.target_words.is_empty()
    }
}

/// An entry in the append-only clue history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueRecord {
    /// Team the clue was given to.
    pub team: Team,
    /// The clue word.
    #[serde(rename = "clue")]
    pub clue_token: String,
    /// Number of words the clue targeted.
    #[serde(rename = "number")]
    pub target_count: usize,
    /// Words the clue was meant to connect.
    pub target_words: Vec<String>,
}

/// A slot's word and allegiance, as revealed at game end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotReveal {
    /// The display word.
    pub word: String,
    /// The slot's allegiance.
    #[serde(rename = "type")]
    pub allegiance: Allegiance,
}
