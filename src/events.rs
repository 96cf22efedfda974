//! Wire types for commands and events.
//!
//! Both travel as `{"event": "<name>", "data": {...}}` with camelCase fields.

use crate::games::bytenames::{
    Allegiance, Clue, ClueRecord, Game, GuessOutcome, Phase, SlotReveal, Team, TurnResult,
};
use crate::session::{Player, Role};
use serde::{Deserialize, Serialize};

/// Identifier of a room; one game per room.
pub type RoomId = String;

// ─────────────────────────────────────────────────────────────
//  Commands
// ─────────────────────────────────────────────────────────────

/// A client command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Command {
    /// Join a room, creating its game if needed.
    JoinRoom(JoinRoom),
    /// Start the room's game.
    StartGame(RoomRef),
    /// Uncover a slot.
    MakeGuess(MakeGuess),
    /// Pass the turn.
    EndTurn(RoomRef),
    /// Deal a new board.
    PlayAgain(RoomRef),
}

impl Command {
    /// The room the command targets.
    pub fn room_id(&self) -> &str {
        match self {
            Command::JoinRoom(join) => &join.room_id,
            Command::StartGame(room) | Command::EndTurn(room) | Command::PlayAgain(room) => {
                &room.room_id
            }
            Command::MakeGuess(guess) => &guess.room_id,
        }
    }

    /// The command's wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::JoinRoom(_) => "join-room",
            Command::StartGame(_) => "start-game",
            Command::MakeGuess(_) => "make-guess",
            Command::EndTurn(_) => "end-turn",
            Command::PlayAgain(_) => "play-again",
        }
    }
}

/// Payload naming only a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    /// Target room.
    pub room_id: RoomId,
}

/// `join-room` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    /// Room to join.
    pub room_id: RoomId,
    /// Display name.
    pub player_name: String,
    /// Spymaster or operative.
    #[serde(default)]
    pub role: Role,
    /// Team to join; red when absent.
    #[serde(default)]
    pub team: Option<Team>,
}

/// `make-guess` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeGuess {
    /// Target room.
    pub room_id: RoomId,
    /// Board slot to uncover.
    pub word_index: usize,
}

// ─────────────────────────────────────────────────────────────
//  Events
// ─────────────────────────────────────────────────────────────

/// A server event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Event {
    /// Full state, sent to a joining client.
    GameState(GameSnapshot),
    /// Someone joined the room.
    PlayerJoined(PlayerJoined),
    /// Play began with the first clue.
    GameStarted(GameSnapshot),
    /// A slot was uncovered.
    GuessResult(GuessResult),
    /// A clue was dealt after a turn switch.
    NewClue(NewClue),
    /// A team ended its turn early.
    TurnEnded(NewClue),
    /// A new board was dealt.
    GameReset(GameSnapshot),
    /// A command was rejected.
    GuessError(GuessError),
}

impl Event {
    /// The event's wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Event::GameState(_) => "game-state",
            Event::PlayerJoined(_) => "player-joined",
            Event::GameStarted(_) => "game-started",
            Event::GuessResult(_) => "guess-result",
            Event::NewClue(_) => "new-clue",
            Event::TurnEnded(_) => "turn-ended",
            Event::GameReset(_) => "game-reset",
            Event::GuessError(_) => "guess-error",
        }
    }

    /// Builds a rejection event.
    pub fn error(message: impl Into<String>) -> Self {
        Event::GuessError(GuessError {
            message: message.into(),
        })
    }
}

/// Per-team counter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCounts {
    /// Red team's count.
    pub red: usize,
    /// Blue team's count.
    pub blue: usize,
}

impl TeamCounts {
    fn scores(game: &Game) -> Self {
        Self {
            red: game.score(Team::Red),
            blue: game.score(Team::Blue),
        }
    }

    fn remaining(game: &Game) -> Self {
        Self {
            red: game.remaining(Team::Red),
            blue: game.remaining(Team::Blue),
        }
    }
}

/// Full game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Room the game belongs to.
    pub room_id: RoomId,
    /// Board words in slot order.
    pub words: Vec<String>,
    /// Allegiance of every slot.
    pub allegiances: Vec<Allegiance>,
    /// Uncovered slot indices, ascending.
    pub revealed_slots: Vec<usize>,
    /// Team on turn.
    pub current_team: Team,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Words found per team.
    pub scores: TeamCounts,
    /// Words left per team.
    pub remaining: TeamCounts,
    /// Clues given this game.
    pub clue_history: Vec<ClueRecord>,
    /// Clue in force.
    pub current_clue: Option<Clue>,
    /// Guesses left this turn.
    pub guesses_remaining: usize,
    /// Winner once ended.
    pub winner: Option<Team>,
    /// Players in the room.
    pub players: Vec<Player>,
}

impl GameSnapshot {
    /// Captures a room's state.
    pub fn capture(room_id: &str, game: &Game, players: &[Player]) -> Self {
        Self {
            room_id: room_id.to_string(),
            words: game.board().words(),
            allegiances: game.board().allegiances(),
            revealed_slots: game.board().revealed_indices(),
            current_team: game.current_team(),
            phase: game.phase(),
            scores: TeamCounts::scores(game),
            remaining: TeamCounts::remaining(game),
            clue_history: game.clue_history().to_vec(),
            current_clue: game.current_clue().cloned(),
            guesses_remaining: game.guesses_remaining(),
            winner: game.winner(),
            players: players.to_vec(),
        }
    }
}

/// `player-joined` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoined {
    /// The new player.
    pub player: Player,
    /// Everyone now in the room.
    pub players: Vec<Player>,
}

/// `guess-result` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
    /// Uncovered slot.
    pub word_index: usize,
    /// Its word.
    pub word: String,
    /// Its allegiance.
    #[serde(rename = "cardType")]
    pub allegiance: Allegiance,
    /// Team on turn after the guess.
    pub current_team: Team,
    /// Guesses left after the guess.
    pub guesses_remaining: usize,
    /// Words found per team.
    pub scores: TeamCounts,
    /// Words left per team.
    pub remaining: TeamCounts,
    /// The same team keeps guessing.
    pub continue_guessing: bool,
    /// The turn passed to the other team.
    pub switch_teams: bool,
    /// The game ended.
    pub game_over: bool,
    /// Winner when the game ended.
    pub winner: Option<Team>,
    /// Every slot, only when the game ended.
    pub all_cards: Option<Vec<SlotReveal>>,
    /// All clues, only when the game ended.
    pub clue_history: Option<Vec<ClueRecord>>,
}

impl GuessResult {
    /// Builds the payload from a resolved guess.
    pub fn new(outcome: &GuessOutcome, game: &Game) -> Self {
        let (winner, all_cards, clue_history) = match &outcome.turn {
            TurnResult::GameOver {
                winner,
                reveal,
                clue_history,
            } => (Some(*winner), Some(reveal.clone()), Some(clue_history.clone())),
            TurnResult::ContinueGuessing | TurnResult::SwitchTeams { .. } => (None, None, None),
        };

        Self {
            word_index: outcome.slot,
            word: outcome.word.clone(),
            allegiance: outcome.allegiance,
            current_team: game.current_team(),
            guesses_remaining: game.guesses_remaining(),
            scores: TeamCounts::scores(game),
            remaining: TeamCounts::remaining(game),
            continue_guessing: outcome.turn == TurnResult::ContinueGuessing,
            switch_teams: outcome.switched_teams(),
            game_over: outcome.is_game_over(),
            winner,
            all_cards,
            clue_history,
        }
    }
}

/// `new-clue` and `turn-ended` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClue {
    /// Team the clue was dealt to.
    pub current_team: Team,
    /// The clue.
    pub clue: Clue,
    /// Guesses granted.
    pub guesses_remaining: usize,
    /// Clues given so far, oldest first.
    pub clue_history: Vec<ClueRecord>,
}

impl NewClue {
    /// Captures the clue in force.
    pub fn new(game: &Game, clue: Clue) -> Self {
        Self {
            current_team: game.current_team(),
            clue,
            guesses_remaining: game.guesses_remaining(),
            clue_history: game.clue_history().to_vec(),
        }
    }
}

/// `guess-error` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessError {
    /// Human-readable reason.
    pub message: String,
}
