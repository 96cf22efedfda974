//! Tests for the JSON shape of commands and events.

use bytenames::{
    Allegiance, Board, ClueGenerator, CluePolicy, Command, Event, Game, GameSnapshot, GuessResult,
    JoinRoom, Lexicon, MakeGuess, NewClue, Player, Role, Spymaster, StaticClassifier, Team,
};
use serde_json::json;
use std::sync::Arc;

fn game() -> Game {
    let layout = (0..25)
        .map(|i| {
            let allegiance = match i {
                0..=8 => Allegiance::Red,
                9..=16 => Allegiance::Blue,
                17..=23 => Allegiance::Neutral,
                _ => Allegiance::Assassin,
            };
            (format!("W{}", i), allegiance)
        })
        .collect();
    Game::from_board(Board::from_layout(layout).unwrap(), 0)
}

fn passing_spymaster() -> Spymaster {
    let classifier = Arc::new(StaticClassifier::new(Lexicon::default()));
    Spymaster::new(ClueGenerator::new(classifier, CluePolicy::AllowReuse))
}

fn theme_spymaster() -> Spymaster {
    let lexicon = Lexicon::from_toml(
        r#"
[[themes]]
name = "NUMBER"
words = ["W0", "W1"]
"#,
    )
    .unwrap();
    let classifier = Arc::new(StaticClassifier::new(lexicon));
    Spymaster::new(ClueGenerator::new(classifier, CluePolicy::AllowReuse))
}

#[test]
fn test_join_command_defaults() {
    let command: Command = serde_json::from_value(json!({
        "event": "join-room",
        "data": { "roomId": "r1", "playerName": "Ada" }
    }))
    .unwrap();

    assert_eq!(
        command,
        Command::JoinRoom(JoinRoom {
            room_id: "r1".to_string(),
            player_name: "Ada".to_string(),
            role: Role::Operative,
            team: None,
        })
    );
    assert_eq!(command.room_id(), "r1");
    assert_eq!(command.name(), "join-room");
}

#[test]
fn test_join_command_with_team_and_role() {
    let command: Command = serde_json::from_value(json!({
        "event": "join-room",
        "data": { "roomId": "r1", "playerName": "Ada", "role": "spymaster", "team": "blue" }
    }))
    .unwrap();

    match command {
        Command::JoinRoom(join) => {
            assert_eq!(join.role, Role::Spymaster);
            assert_eq!(join.team, Some(Team::Blue));
        }
        other => panic!("Expected join, got {:?}", other),
    }
}

#[test]
fn test_guess_command() {
    let command: Command = serde_json::from_str(
        r#"{"event":"make-guess","data":{"roomId":"r2","wordIndex":7}}"#,
    )
    .unwrap();
    assert_eq!(
        command,
        Command::MakeGuess(MakeGuess {
            room_id: "r2".to_string(),
            word_index: 7,
        })
    );
}

#[test]
fn test_unknown_command_is_rejected() {
    let result = serde_json::from_str::<Command>(r#"{"event":"flip-table","data":{}}"#);
    assert!(result.is_err());
}

#[test]
fn test_error_event_shape() {
    let value = serde_json::to_value(Event::error("Room r9 not found")).unwrap();
    assert_eq!(
        value,
        json!({ "event": "guess-error", "data": { "message": "Room r9 not found" } })
    );
}

#[tokio::test]
async fn test_snapshot_shape() {
    let mut game = game();
    game.start(&passing_spymaster()).await.unwrap();
    game.guess(0).unwrap();

    let players = vec![Player {
        name: "Ada".to_string(),
        role: Role::Operative,
        team: Team::Red,
    }];
    let value = serde_json::to_value(Event::GameState(GameSnapshot::capture("r1", &game, &players)))
        .unwrap();

    assert_eq!(value["event"], "game-state");
    let data = &value["data"];
    assert_eq!(data["roomId"], "r1");
    assert_eq!(data["words"].as_array().map(Vec::len), Some(25));
    assert_eq!(data["allegiances"][24], "assassin");
    assert_eq!(data["revealedSlots"], json!([0]));
    assert_eq!(data["currentTeam"], "blue");
    assert_eq!(data["phase"], "playing");
    assert_eq!(data["scores"], json!({ "red": 1, "blue": 0 }));
    assert_eq!(data["remaining"], json!({ "red": 8, "blue": 8 }));
    assert_eq!(data["guessesRemaining"], 0);
    assert!(data["winner"].is_null());
    assert_eq!(data["players"][0]["name"], "Ada");
}

#[tokio::test]
async fn test_guess_result_shape_on_game_over() {
    let mut game = game();
    game.start(&passing_spymaster()).await.unwrap();
    let outcome = game.guess(24).unwrap();

    let value = serde_json::to_value(Event::GuessResult(GuessResult::new(&outcome, &game))).unwrap();
    let data = &value["data"];
    assert_eq!(value["event"], "guess-result");
    assert_eq!(data["wordIndex"], 24);
    assert_eq!(data["word"], "W24");
    assert_eq!(data["cardType"], "assassin");
    assert_eq!(data["gameOver"], true);
    assert_eq!(data["continueGuessing"], false);
    assert_eq!(data["switchTeams"], false);
    assert_eq!(data["winner"], "blue");
    assert_eq!(data["allCards"].as_array().map(Vec::len), Some(25));
    assert_eq!(data["allCards"][0], json!({ "word": "W0", "type": "red" }));
    assert_eq!(data["clueHistory"], json!([]));
}

#[tokio::test]
async fn test_guess_result_shape_mid_game() {
    let mut game = game();
    game.start(&passing_spymaster()).await.unwrap();
    let outcome = game.guess(17).unwrap();

    let result = GuessResult::new(&outcome, &game);
    assert!(result.switch_teams);
    assert!(!result.game_over);
    assert!(result.all_cards.is_none());
    assert_eq!(result.current_team, Team::Blue);
}

#[tokio::test]
async fn test_turn_ended_carries_clue_history() {
    let spymaster = theme_spymaster();
    let mut game = game();
    game.start(&spymaster).await.unwrap();
    let clue = game.end_turn(&spymaster).await.unwrap();

    let value = serde_json::to_value(Event::TurnEnded(NewClue::new(&game, clue))).unwrap();
    let data = &value["data"];
    assert_eq!(value["event"], "turn-ended");
    assert_eq!(data["currentTeam"], "blue");
    assert_eq!(
        data["clueHistory"],
        json!([{ "team": "red", "clue": "NUMBER", "number": 2, "targetWords": ["W0", "W1"] }])
    );
}
