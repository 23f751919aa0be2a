//! Error types for twitch-chat.

use thiserror::Error;

/// Errors that can occur when talking to Twitch chat.
#[derive(Debug, Error)]
pub enum ChatError {
    /// WebSocket connection or transport failure.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Twitch rejected the login.
    #[error("Login authentication failed")]
    AuthFailed,

    /// No welcome from the server in time.
    #[error("Timed out waiting for login")]
    AuthTimeout,

    /// The token provider could not supply a token.
    #[error("Token unavailable: {0}")]
    Token(String),

    /// The client task has stopped.
    #[error("Client closed")]
    Closed,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ChatError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ChatError::Connection(e.to_string())
    }
}
