//! HTTP and WebSocket transport.
//!
//! Routes:
//! - `GET /health`
//! - `GET /rooms/{room_id}`: full state of a room
//! - `POST /commands`: run one command, respond with every event it produced
//! - `GET /ws`: send commands, receive replies plus the broadcasts of the
//!   room last joined

use crate::events::{Command, Event};
use crate::session::SessionManager;
use axum::{
    Json, Router,
    body::Body,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument, warn};

/// Outgoing messages buffered per WebSocket before commands wait.
const SOCKET_BUFFER: usize = 100;

/// Game server over a shared [`SessionManager`].
#[derive(Debug, Clone)]
pub struct GameServer {
    sessions: SessionManager,
}

impl GameServer {
    /// Creates a server over `sessions`.
    #[instrument(skip(sessions))]
    pub fn new(sessions: SessionManager) -> Self {
        info!("Creating game server");
        Self { sessions }
    }

    /// The session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Builds the axum router with request logging.
    pub fn router(self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/rooms/{room_id}", get(room_state))
            .route("/commands", post(run_command))
            .route("/ws", get(websocket_handler))
            .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
                debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
                req
            }))
            .with_state(self)
    }

    /// Binds `host:port` and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if binding or serving fails.
    #[instrument(skip(self))]
    pub async fn serve(self, host: &str, port: u16) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind((host, port)).await?;
        info!(address = %listener.local_addr()?, "Server ready");
        axum::serve(listener, self.router()).await
    }
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(server))]
async fn room_state(State(server): State<GameServer>, Path(room_id): Path<String>) -> Response {
    match server.sessions.snapshot(&room_id).await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (StatusCode::NOT_FOUND, Json(Event::error(format!("Room {} not found", room_id))))
            .into_response(),
    }
}

#[instrument(skip(server, command))]
async fn run_command(State(server): State<GameServer>, Json(command): Json<Command>) -> Json<Vec<Event>> {
    Json(server.sessions.dispatch(command).await.all())
}

async fn websocket_handler(State(server): State<GameServer>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, server.sessions))
}

#[instrument(skip_all)]
async fn handle_socket(socket: WebSocket, sessions: SessionManager) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Event>(SOCKET_BUFFER);

    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut room_forwarder: Option<(String, JoinHandle<()>)> = None;

    while let Some(message) = ws_receiver.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "WebSocket receive failed");
                break;
            }
        };

        let command = match serde_json::from_str::<Command>(text.as_str()) {
            Ok(command) => command,
            Err(e) => {
                if tx.send(Event::error(format!("Malformed command: {}", e))).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let joining = match &command {
            Command::JoinRoom(join) => Some(join.room_id.clone()),
            _ => None,
        };

        let dispatched = sessions.dispatch(command).await;
        for event in dispatched.reply {
            if tx.send(event).await.is_err() {
                break;
            }
        }

        if let Some(room_id) = joining {
            let already = matches!(&room_forwarder, Some((current, _)) if *current == room_id);
            if !already {
                if let Some(receiver) = sessions.subscribe(&room_id) {
                    if let Some((_, previous)) = room_forwarder.take() {
                        previous.abort();
                    }
                    debug!(room_id = %room_id, "Forwarding room events");
                    let task = tokio::spawn(forward_room(receiver, tx.clone()));
                    room_forwarder = Some((room_id, task));
                }
            }
        }
    }

    if let Some((_, task)) = room_forwarder {
        task.abort();
    }
    drop(tx);
    if let Err(e) = sender_task.await {
        debug!(error = %e, "Sender task ended abnormally");
    }
    debug!("WebSocket closed");
}

async fn forward_room(mut receiver: broadcast::Receiver<Event>, tx: mpsc::Sender<Event>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "Room broadcast lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
