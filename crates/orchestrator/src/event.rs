//! Typed events delivered by a chat transport.

use serde::{Deserialize, Serialize};

/// One inbound chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundChat {
    pub channel: String,
    pub author: String,
    pub text: String,
    /// Sent by the bot's own account.
    pub is_self: bool,
    /// Flagged by the platform as a highlighted (channel points) message.
    pub is_highlighted: bool,
}

impl InboundChat {
    pub fn new(channel: impl Into<String>, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            author: author.into(),
            text: text.into(),
            is_self: false,
            is_highlighted: false,
        }
    }

    pub fn highlighted(mut self) -> Self {
        self.is_highlighted = true;
        self
    }

    pub fn from_self(mut self) -> Self {
        self.is_self = true;
        self
    }
}

/// Transport lifecycle and message events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Connected,
    Message(InboundChat),
    Disconnected { reason: String },
}
