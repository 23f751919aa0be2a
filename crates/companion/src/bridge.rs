//! Adapters between the Twitch crates and the orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use orchestrator::{ChatTransport, InboundChat, OrchestratorError};
use tokio::sync::mpsc;
use twitch_auth::CredentialManager;
use twitch_chat::{normalize_channel, ChatError, PrivMsg, TokenProvider, TwitchClient};

const EVENT_BUFFER: usize = 256;

/// Sends replies through the IRC connection.
pub struct TwitchTransport {
    client: TwitchClient,
}

impl TwitchTransport {
    pub fn new(client: TwitchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatTransport for TwitchTransport {
    /// Accepts channels with or without the leading `#`.
    async fn send(&self, channel: &str, text: &str) -> Result<(), OrchestratorError> {
        let channel = normalize_channel(channel)
            .ok_or_else(|| OrchestratorError::SendFailed(format!("invalid channel {:?}", channel)))?;
        self.client
            .say(&channel, text)
            .await
            .map_err(|e| OrchestratorError::SendFailed(e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), OrchestratorError> {
        self.client.disconnect();
        Ok(())
    }
}

/// Pulls a fresh password from the credential manager on every connect.
pub struct ManagerToken(pub Arc<CredentialManager>);

#[async_trait]
impl TokenProvider for ManagerToken {
    async fn token(&self) -> Result<String, ChatError> {
        self.0
            .get_valid_token()
            .await
            .map_err(|e| ChatError::Token(e.to_string()))
    }
}

pub fn inbound(msg: PrivMsg) -> InboundChat {
    InboundChat {
        channel: msg.channel,
        author: msg.author,
        text: msg.text,
        is_self: msg.is_self,
        is_highlighted: msg.is_highlighted,
    }
}

pub fn convert(event: twitch_chat::ChatEvent) -> orchestrator::ChatEvent {
    match event {
        twitch_chat::ChatEvent::Connected => orchestrator::ChatEvent::Connected,
        twitch_chat::ChatEvent::Message(msg) => orchestrator::ChatEvent::Message(inbound(msg)),
        twitch_chat::ChatEvent::Disconnected { reason } => {
            orchestrator::ChatEvent::Disconnected { reason }
        }
    }
}

/// Re-type the client's event stream for [`orchestrator::Orchestrator::run`].
pub fn forward_events(
    mut events: mpsc::Receiver<twitch_chat::ChatEvent>,
) -> mpsc::Receiver<orchestrator::ChatEvent> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if tx.send(convert(event)).await.is_err() {
                break;
            }
        }
    });
    rx
}
