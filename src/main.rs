//! Bytenames - unified CLI
//!
//! Serves games over HTTP and WebSocket, or deals a single board offline.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use bytenames::{
    ClueGenerator, CluePolicy, ClueProposal, Difficulty, Game, GameServer, PORT_VAR, ServerConfig,
    SessionManager, StaticClassifier, StaticWordSource, Team,
};
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            difficulty,
            clue_policy,
            seed,
        } => run_server(config, host, port, difficulty, clue_policy, seed).await,
        Command::Deal {
            difficulty,
            seed,
            clue_policy,
        } => run_deal(difficulty, seed, clue_policy),
    }
}

/// Run the game server
#[instrument(skip_all)]
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    difficulty: Option<Difficulty>,
    clue_policy: Option<CluePolicy>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = ServerConfig::load(config_path.as_deref())?
        .with_port_override(std::env::var(PORT_VAR).ok().as_deref())?;

    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(difficulty) = difficulty {
        config = config.with_difficulty(difficulty);
    }
    if let Some(clue_policy) = clue_policy {
        config = config.with_clue_policy(clue_policy);
    }
    if seed.is_some() {
        config = config.with_seed(seed);
    }

    info!(
        host = %config.host(),
        port = config.port(),
        difficulty = %config.difficulty(),
        "Starting bytenames server"
    );

    let sessions = SessionManager::from_config(&config)?;
    GameServer::new(sessions)
        .serve(config.host(), *config.port())
        .await?;

    Ok(())
}

/// Deal one board and show what the rule-based spymaster would say
#[instrument]
fn run_deal(difficulty: Difficulty, seed: u64, clue_policy: CluePolicy) -> Result<()> {
    let words = StaticWordSource::embedded(seed)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let game = Game::deal(&words.draw(difficulty, &mut rng), seed)?;

    let classifier = Arc::new(StaticClassifier::embedded()?);
    let generator = ClueGenerator::new(classifier, clue_policy);

    println!("{}", game.board().display());
    for team in Team::iter() {
        match generator.propose(&game.team_view(team), &mut rng) {
            ClueProposal::Candidate(candidate) => println!(
                "{}: {} {} ({}) safety {:.2}",
                team,
                candidate.token,
                candidate.connected_words.len(),
                candidate.connected_words.join(", "),
                candidate.safety_score
            ),
            ClueProposal::Pass => println!("{}: PASS", team),
        }
    }

    Ok(())
}
