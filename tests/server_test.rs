//! Tests for the HTTP routes over a local listener.

use bytenames::{
    ClueGenerator, CluePolicy, Difficulty, Event, GameServer, GameSnapshot, SessionManager,
    Spymaster, StaticClassifier, StaticWordSource, WordSupply,
};
use serde_json::json;
use std::sync::Arc;

async fn spawn_server() -> String {
    let classifier = Arc::new(StaticClassifier::embedded().unwrap());
    let spymaster = Spymaster::new(ClueGenerator::new(classifier, CluePolicy::AllowReuse));
    let words = WordSupply::new(Arc::new(StaticWordSource::embedded(1).unwrap()));
    let sessions = SessionManager::new(spymaster, words, Difficulty::Medium, Some(1));
    let router = GameServer::new(sessions).router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}

#[tokio::test]
async fn test_health() {
    let base = spawn_server().await;
    let body = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_commands_and_room_state() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let events: Vec<Event> = client
        .post(format!("{}/commands", base))
        .json(&json!({
            "event": "join-room",
            "data": { "roomId": "lobby", "playerName": "Ada" }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = events.iter().map(Event::name).collect();
    assert_eq!(names, vec!["game-state", "player-joined"]);

    let response = client
        .get(format!("{}/rooms/lobby", base))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let snapshot: GameSnapshot = response.json().await.unwrap();
    assert_eq!(snapshot.room_id, "lobby");
    assert_eq!(snapshot.players.len(), 1);
}

#[tokio::test]
async fn test_unknown_room_is_not_found() {
    let base = spawn_server().await;
    let response = reqwest::get(format!("{}/rooms/missing", base)).await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
