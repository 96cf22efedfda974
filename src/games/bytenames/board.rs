//! Board generation.
//!
//! A board is 25 slots carrying exactly 9 red, 8 blue, 7 neutral and 1
//! assassin allegiance over 25 distinct words. Allegiances are placed by
//! rejection sampling: draw a random slot, keep it if still neutral, repeat
//! until each quota is filled.

use super::types::{
    ASSASSINS, Allegiance, BLUE_AGENTS, BOARD_SIZE, NEUTRALS, RED_AGENTS, Slot, SlotReveal,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Errors raised when building a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// Fewer than 25 words were supplied.
    #[display("Need {} words for a board, got {}", BOARD_SIZE, _0)]
    NotEnoughWords(usize),

    /// A word appears twice.
    #[display("Duplicate board word {}", _0)]
    DuplicateWord(String),

    /// Allegiance counts do not match 9/8/7/1.
    #[display("Allegiance quota mismatch: {}", _0)]
    QuotaMismatch(String),
}

impl std::error::Error for BoardError {}

/// The 25-slot board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    slots: Vec<Slot>,
}

impl Board {
    /// Deals a new board from the first 25 of `words`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NotEnoughWords`] for fewer than 25 words and
    /// [`BoardError::DuplicateWord`] if the first 25 are not distinct.
    #[instrument(skip(words, rng), fields(supplied = words.len()))]
    pub fn generate<R: Rng + ?Sized>(words: &[String], rng: &mut R) -> Result<Self, BoardError> {
        let words = normalize(words)?;

        let mut allegiances = [Allegiance::Neutral; BOARD_SIZE];
        for (allegiance, quota) in [
            (Allegiance::Red, RED_AGENTS),
            (Allegiance::Blue, BLUE_AGENTS),
            (Allegiance::Assassin, ASSASSINS),
        ] {
            let mut placed = 0;
            while placed < quota {
                let index = rng.gen_range(0..BOARD_SIZE);
                if allegiances[index] == Allegiance::Neutral {
                    allegiances[index] = allegiance;
                    placed += 1;
                }
            }
        }

        let slots = words
            .into_iter()
            .zip(allegiances)
            .map(|(word, allegiance)| Slot::new(word, allegiance))
            .collect();

        debug!("Dealt new board");
        Ok(Self { slots })
    }

    /// Builds a board with a fixed layout.
    ///
    /// # Errors
    ///
    /// Rejects layouts that are not 25 distinct words with a 9/8/7/1 split.
    #[instrument(skip(layout), fields(supplied = layout.len()))]
    pub fn from_layout(layout: Vec<(String, Allegiance)>) -> Result<Self, BoardError> {
        let (words, allegiances): (Vec<String>, Vec<Allegiance>) = layout.into_iter().unzip();
        if words.len() != BOARD_SIZE {
            return Err(BoardError::NotEnoughWords(words.len()));
        }
        let words = normalize(&words)?;

        let count = |wanted: Allegiance| allegiances.iter().filter(|a| **a == wanted).count();
        let counts = (
            count(Allegiance::Red),
            count(Allegiance::Blue),
            count(Allegiance::Neutral),
            count(Allegiance::Assassin),
        );
        if counts != (RED_AGENTS, BLUE_AGENTS, NEUTRALS, ASSASSINS) {
            warn!(?counts, "Rejected board layout");
            return Err(BoardError::QuotaMismatch(format!(
                "red {} blue {} neutral {} assassin {}",
                counts.0, counts.1, counts.2, counts.3
            )));
        }

        let slots = words
            .into_iter()
            .zip(allegiances)
            .map(|(word, allegiance)| Slot::new(word, allegiance))
            .collect();
        Ok(Self { slots })
    }

    /// All slots in board order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The slot at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// Display words in board order.
    pub fn words(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.word().to_string()).collect()
    }

    /// Allegiance of every slot in board order.
    pub fn allegiances(&self) -> Vec<Allegiance> {
        self.slots.iter().map(Slot::allegiance).collect()
    }

    /// Indices of revealed slots, ascending.
    pub fn revealed_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_revealed())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of slots with the given allegiance.
    pub fn count(&self, allegiance: Allegiance) -> usize {
        self.slots.iter().filter(|s| s.allegiance() == allegiance).count()
    }

    /// Number of revealed slots with the given allegiance.
    pub fn revealed_count(&self, allegiance: Allegiance) -> usize {
        self.slots
            .iter()
            .filter(|s| s.is_revealed() && s.allegiance() == allegiance)
            .count()
    }

    /// Unrevealed words with the given allegiance, in board order.
    pub fn hidden_words(&self, allegiance: Allegiance) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| !s.is_revealed() && s.allegiance() == allegiance)
            .map(|s| s.word().to_string())
            .collect()
    }

    /// Every slot's word and allegiance.
    pub fn reveal_all(&self) -> Vec<SlotReveal> {
        self.slots
            .iter()
            .map(|s| SlotReveal {
                word: s.word().to_string(),
                allegiance: s.allegiance(),
            })
            .collect()
    }

    /// Formats the board as a 5x5 grid, marking allegiance and reveal state.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let mark = match slot.allegiance() {
                Allegiance::Red => 'R',
                Allegiance::Blue => 'B',
                Allegiance::Neutral => '.',
                Allegiance::Assassin => 'X',
            };
            let shown = if slot.is_revealed() { '*' } else { ' ' };
            result.push_str(&format!("{:>2} {}{} {:<14}", index, mark, shown, slot.word()));
            if index % 5 == 4 {
                result.push('\n');
            }
        }
        result
    }
}

/// Takes the first 25 words, uppercased, and checks they are distinct.
fn normalize(words: &[String]) -> Result<Vec<String>, BoardError> {
    if words.len() < BOARD_SIZE {
        warn!(supplied = words.len(), "Not enough words for a board");
        return Err(BoardError::NotEnoughWords(words.len()));
    }

    let mut seen = HashSet::with_capacity(BOARD_SIZE);
    let mut normalized = Vec::with_capacity(BOARD_SIZE);
    for word in words.iter().take(BOARD_SIZE) {
        let word = word.trim().to_ascii_uppercase();
        if !seen.insert(word.clone()) {
            warn!(word = %word, "Duplicate word in board input");
            return Err(BoardError::DuplicateWord(word));
        }
        normalized.push(word);
    }
    Ok(normalized)
}
