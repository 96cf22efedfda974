//! Bytenames library - a team word-deduction game engine and server
//!
//! Two teams race to uncover their agents on a 25-slot board. Each turn a
//! spymaster gives a one-word clue and a count, and operatives guess slots.
//! Landing on the assassin loses the game outright.
//!
//! # Architecture
//!
//! - **Games**: board dealing, turn rules, category classifier, clue safety
//!   scoring and the rule-based clue generator
//! - **Spymaster**: optional generative clue supplier validated against the
//!   rules, with rule-based fallback on any failure
//! - **Words**: static difficulty lists and an optional generated source that
//!   never repeats a word
//! - **Session**: rooms, players and command dispatch
//! - **Server**: HTTP and WebSocket transport over axum
//!
//! # Example
//!
//! ```no_run
//! use bytenames::{
//!     ClueGenerator, CluePolicy, Game, Spymaster, StaticClassifier, StaticWordSource,
//!     Difficulty,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let classifier = Arc::new(StaticClassifier::embedded()?);
//! let spymaster = Spymaster::new(ClueGenerator::new(classifier, CluePolicy::AllowReuse));
//!
//! let words = StaticWordSource::embedded(7)?;
//! let mut rng = <rand_chacha::ChaCha8Rng as rand::SeedableRng>::seed_from_u64(7);
//! let mut game = Game::deal(&words.draw(Difficulty::Easy, &mut rng), 7)?;
//! game.start(&spymaster).await?;
//! let outcome = game.guess(0)?;
//! println!("{} was {}", outcome.word, outcome.allegiance);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod events;
mod games;
mod llm_client;
mod server;
mod session;
mod spymaster;
mod words;

// Crate-level exports - Configuration
pub use config::{ConfigError, LlmSettings, PORT_VAR, ServerConfig};

// Crate-level exports - Wire types
pub use events::{
    Command, Event, GameSnapshot, GuessError, GuessResult, JoinRoom, MakeGuess, NewClue,
    PlayerJoined, RoomId, RoomRef, TeamCounts,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Server
pub use server::GameServer;

// Crate-level exports - Session management
pub use session::{Dispatched, GameSession, Player, ROOM_CHANNEL_CAPACITY, Role, SessionManager};

// Crate-level exports - Spymaster
pub use spymaster::{
    ClueRequest, ClueSupplier, ClueSupplierFailure, DEFAULT_SUPPLIER_TIMEOUT, LlmClueSupplier,
    Spymaster, SuppliedClue,
};

// Crate-level exports - Word sources
pub use words::{
    Difficulty, GENERATED_WORD_COUNT, GenerationFailure, LlmWordSource, MAX_WORD_LEN,
    MIN_WORD_LEN, StaticWordSource, UsedWordRegistry, WordSource, WordSupply,
};

// Crate-level exports - Game types
pub use games::bytenames::{
    ASSASSIN_PENALTY, ASSASSINS, Affinity, Allegiance, BASE_SAFETY, BLUE_AGENTS, BOARD_SIZE, Board,
    BoardError, CategoryClassifier, Clue, ClueCandidate, ClueGenerator, CluePolicy, ClueProposal,
    ClueRecord, DANGER_PENALTY, Dangers, Game, GameError, GuessOutcome, Lexicon, LexiconError,
    NEUTRALS, PASS_TOKEN, Phase, RED_AGENTS, STARTING_TEAM, SafetyEvaluator, Slot, SlotReveal,
    StaticClassifier, TeamView, Theme, TurnResult, UnsafeClue, Team,
};
