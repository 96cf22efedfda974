//! Room registry and command dispatch.
//!
//! Each room owns one [`GameSession`] behind its own async mutex, so commands
//! for a room run one at a time while different rooms proceed in parallel.
//! Every room also owns a broadcast channel carrying the events all of its
//! clients should see.

use crate::config::{ConfigError, ServerConfig};
use crate::events::{
    Command, Event, GameSnapshot, GuessResult, JoinRoom, MakeGuess, NewClue, PlayerJoined, RoomId,
};
use crate::games::bytenames::{
    ClueGenerator, Game, Lexicon, StaticClassifier, Team,
};
use crate::llm_client::LlmClient;
use crate::spymaster::{LlmClueSupplier, Spymaster};
use crate::words::{Difficulty, LlmWordSource, StaticWordSource, UsedWordRegistry, WordSupply};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use strum::{Display, EnumString};
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tracing::{debug, info, instrument, warn};

/// Buffered events per room before slow subscribers start lagging.
pub const ROOM_CHANNEL_CAPACITY: usize = 64;

/// What a player does in a team.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Sees allegiances and gives clues.
    Spymaster,
    /// Guesses words.
    #[default]
    Operative,
}

/// A player in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, unique within the room.
    pub name: String,
    /// Spymaster or operative.
    pub role: Role,
    /// Team the player is on.
    pub team: Team,
}

/// One room's game and players.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Room id.
    pub room_id: RoomId,
    /// The game.
    pub game: Game,
    /// Joined players in join order.
    pub players: Vec<Player>,
}

impl GameSession {
    /// Creates a session around a dealt game.
    #[instrument(skip(game))]
    pub fn new(room_id: RoomId, game: Game) -> Self {
        info!(room_id = %room_id, "Creating game session");
        Self {
            room_id,
            game,
            players: Vec::new(),
        }
    }

    /// Adds a player, or updates role and team for a returning name.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn join(&mut self, name: String, role: Role, team: Team) -> Player {
        let player = Player { name, role, team };
        match self.players.iter_mut().find(|p| p.name == player.name) {
            Some(existing) => {
                debug!("Player rejoined");
                *existing = player.clone();
            }
            None => {
                info!(players = self.players.len() + 1, "Player joined");
                self.players.push(player.clone());
            }
        }
        player
    }

    /// Full state of the room.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.room_id, &self.game, &self.players)
    }
}

/// Events produced by one command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatched {
    /// Events only for the sender.
    pub reply: Vec<Event>,
    /// Events sent to everyone in the room.
    pub broadcast: Vec<Event>,
}

impl Dispatched {
    fn reply(event: Event) -> Self {
        Self {
            reply: vec![event],
            broadcast: Vec::new(),
        }
    }

    /// Every event, replies first.
    pub fn all(&self) -> Vec<Event> {
        self.reply.iter().chain(&self.broadcast).cloned().collect()
    }
}

#[derive(Debug)]
struct Room {
    session: AsyncMutex<GameSession>,
    events: broadcast::Sender<Event>,
}

/// Owns every room in the process.
#[derive(Debug, Clone)]
pub struct SessionManager {
    rooms: Arc<Mutex<HashMap<RoomId, Arc<Room>>>>,
    spymaster: Arc<Spymaster>,
    words: WordSupply,
    difficulty: Difficulty,
    seeds: Arc<Mutex<ChaCha8Rng>>,
}

impl SessionManager {
    /// Creates a manager. With a seed, every room's randomness is reproducible.
    #[instrument(skip(spymaster, words))]
    pub fn new(spymaster: Spymaster, words: WordSupply, difficulty: Difficulty, seed: Option<u64>) -> Self {
        info!(supplier = spymaster.has_supplier(), "Creating session manager");
        let seeds = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            spymaster: Arc::new(spymaster),
            words,
            difficulty,
            seeds: Arc::new(Mutex::new(seeds)),
        }
    }

    /// Assembles the classifier, spymaster and word sources a configuration
    /// describes.
    ///
    /// A configured `[llm]` table without an API key in the environment is
    /// logged and the server runs rule-based.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the lexicon or word lists cannot be loaded.
    #[instrument(skip(config))]
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let lexicon = match config.lexicon_path() {
            Some(path) => Lexicon::from_file(path),
            None => Lexicon::embedded(),
        }
        .map_err(|e| ConfigError::new(e.message))?;
        let classifier = Arc::new(StaticClassifier::new(lexicon));
        let generator = ClueGenerator::new(classifier, *config.clue_policy());

        let static_seed = config.seed().unwrap_or_else(rand::random);
        let static_words = StaticWordSource::embedded(static_seed)
            .map_err(|e| ConfigError::new(e.message))?;

        let mut spymaster = Spymaster::new(generator);
        let mut words = WordSupply::new(Arc::new(static_words));

        if let Some(llm) = config.llm() {
            match llm.create_llm_config() {
                Ok(llm_config) => {
                    info!(provider = %llm.provider(), model = %llm_config.model(), "LLM spymaster enabled");
                    let supplier = LlmClueSupplier::new(LlmClient::new(llm_config.clone()));
                    spymaster = spymaster.with_supplier(Arc::new(supplier), llm.timeout());
                    if *llm.generate_words() {
                        let source = LlmWordSource::new(llm_config, UsedWordRegistry::new());
                        words = words.with_primary(Arc::new(source));
                    }
                }
                Err(e) => warn!(error = %e, "No API key, running rule-based only"),
            }
        }

        Ok(Self::new(spymaster, words, *config.difficulty(), *config.seed()))
    }

    fn rooms(&self) -> std::sync::MutexGuard<'_, HashMap<RoomId, Arc<Room>>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn room(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms().get(room_id).cloned()
    }

    fn next_seed(&self) -> u64 {
        self.seeds.lock().unwrap_or_else(PoisonError::into_inner).r#gen()
    }

    /// Ids of every room.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Current state of a room.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, room_id: &str) -> Option<GameSnapshot> {
        let room = self.room(room_id)?;
        let session = room.session.lock().await;
        Some(session.snapshot())
    }

    /// Receiver for a room's broadcast events.
    pub fn subscribe(&self, room_id: &str) -> Option<broadcast::Receiver<Event>> {
        self.room(room_id).map(|room| room.events.subscribe())
    }

    /// Returns the room, dealing a new game if it does not exist yet.
    #[instrument(skip(self))]
    async fn open_room(&self, room_id: &str) -> Result<Arc<Room>, String> {
        if let Some(room) = self.room(room_id) {
            return Ok(room);
        }

        let words = self.words.words(self.difficulty).await;
        let game = Game::deal(&words, self.next_seed()).map_err(|e| e.to_string())?;
        let (events, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        let fresh = Arc::new(Room {
            session: AsyncMutex::new(GameSession::new(room_id.to_string(), game)),
            events,
        });

        let room = self
            .rooms()
            .entry(room_id.to_string())
            .or_insert(fresh)
            .clone();
        Ok(room)
    }

    /// Runs one command and returns the events it produced.
    ///
    /// Room events are also published on the room's channel. Rejections come
    /// back as a `guess-error` reply and leave the game untouched.
    #[instrument(skip(self, command), fields(command = command.name(), room_id = %command.room_id()))]
    pub async fn dispatch(&self, command: Command) -> Dispatched {
        let dispatched = match command {
            Command::JoinRoom(join) => self.join(join).await,
            Command::StartGame(room) => self.start(&room.room_id).await,
            Command::MakeGuess(guess) => self.guess(guess).await,
            Command::EndTurn(room) => self.end_turn(&room.room_id).await,
            Command::PlayAgain(room) => self.play_again(&room.room_id).await,
        };

        match dispatched {
            Ok((room, dispatched)) => {
                for event in &dispatched.broadcast {
                    if room.events.send(event.clone()).is_err() {
                        debug!(event = event.name(), "No subscribers for room event");
                    }
                }
                dispatched
            }
            Err(message) => {
                warn!(%message, "Command rejected");
                Dispatched::reply(Event::error(message))
            }
        }
    }

    async fn join(&self, join: JoinRoom) -> Result<(Arc<Room>, Dispatched), String> {
        let room = self.open_room(&join.room_id).await?;
        let mut session = room.session.lock().await;
        let player = session.join(
            join.player_name,
            join.role,
            join.team.unwrap_or(Team::Red),
        );
        let dispatched = Dispatched {
            reply: vec![Event::GameState(session.snapshot())],
            broadcast: vec![Event::PlayerJoined(PlayerJoined {
                player,
                players: session.players.clone(),
            })],
        };
        drop(session);
        Ok((room, dispatched))
    }

    async fn start(&self, room_id: &str) -> Result<(Arc<Room>, Dispatched), String> {
        let room = self.existing(room_id)?;
        let mut session = room.session.lock().await;
        session
            .game
            .start(&self.spymaster)
            .await
            .map_err(|e| e.to_string())?;
        let dispatched = Dispatched {
            reply: Vec::new(),
            broadcast: vec![Event::GameStarted(session.snapshot())],
        };
        drop(session);
        Ok((room, dispatched))
    }

    async fn guess(&self, guess: MakeGuess) -> Result<(Arc<Room>, Dispatched), String> {
        let room = self.existing(&guess.room_id)?;
        let mut session = room.session.lock().await;
        let outcome = session
            .game
            .guess(guess.word_index)
            .map_err(|e| e.to_string())?;

        let mut broadcast = vec![Event::GuessResult(GuessResult::new(&outcome, &session.game))];
        if outcome.switched_teams() {
            let clue = session
                .game
                .deal_clue(&self.spymaster)
                .await
                .map_err(|e| e.to_string())?;
            broadcast.push(Event::NewClue(NewClue::new(&session.game, clue)));
        }
        drop(session);

        Ok((
            room,
            Dispatched {
                reply: Vec::new(),
                broadcast,
            },
        ))
    }

    async fn end_turn(&self, room_id: &str) -> Result<(Arc<Room>, Dispatched), String> {
        let room = self.existing(room_id)?;
        let mut session = room.session.lock().await;
        let clue = session
            .game
            .end_turn(&self.spymaster)
            .await
            .map_err(|e| e.to_string())?;
        let dispatched = Dispatched {
            reply: Vec::new(),
            broadcast: vec![Event::TurnEnded(NewClue::new(&session.game, clue))],
        };
        drop(session);
        Ok((room, dispatched))
    }

    async fn play_again(&self, room_id: &str) -> Result<(Arc<Room>, Dispatched), String> {
        let room = self.existing(room_id)?;
        let words = self.words.words(self.difficulty).await;
        let mut session = room.session.lock().await;
        session.game.reset(&words).map_err(|e| e.to_string())?;
        let dispatched = Dispatched {
            reply: Vec::new(),
            broadcast: vec![Event::GameReset(session.snapshot())],
        };
        drop(session);
        Ok((room, dispatched))
    }

    fn existing(&self, room_id: &str) -> Result<Arc<Room>, String> {
        self.room(room_id)
            .ok_or_else(|| format!("Room {} not found", room_id))
    }
}
