//! Command-line interface for bytenames.

use bytenames::{CluePolicy, Difficulty};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bytenames - team word-deduction game server
#[derive(Parser, Debug)]
#[command(name = "bytenames")]
#[command(about = "Word-deduction game server with rule-based and LLM spymasters", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP and WebSocket game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Word list difficulty (overrides config)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Clue reuse policy (overrides config)
        #[arg(long)]
        clue_policy: Option<CluePolicy>,

        /// Seed for reproducible boards and clues
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Deal one board and print the rule-based clue for each team
    Deal {
        /// Word list difficulty
        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,

        /// Seed for the board
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Clue reuse policy
        #[arg(long, default_value = "allow-reuse")]
        clue_policy: CluePolicy,
    },
}
