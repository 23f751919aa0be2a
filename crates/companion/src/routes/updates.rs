//! WebSocket that tells the overlay page to reload the speech file.

use std::path::PathBuf;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use crate::error::Result;
use crate::state::AppState;

pub async fn check_for_updates(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let orchestrator = state.orchestrator()?;
    let speech = orchestrator.subscribe_speech();
    Ok(ws.on_upgrade(move |socket| notify(socket, speech)))
}

async fn notify(mut socket: WebSocket, mut speech: broadcast::Receiver<PathBuf>) {
    let payload = serde_json::json!({ "updated": true }).to_string();
    loop {
        tokio::select! {
            update = speech.recv() => match update {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    if socket.send(Message::Text(payload.clone())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("Update socket closed");
}
