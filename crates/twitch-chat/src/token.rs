//! Token sources consulted before each connection attempt.

use async_trait::async_trait;

use crate::error::ChatError;

/// Supplies the IRC password for a connection attempt.
///
/// Called on every (re)connect so short-lived tokens can be refreshed
/// between sessions.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token, with or without the `oauth:` prefix.
    async fn token(&self) -> Result<String, ChatError>;
}

/// A fixed token, e.g. a legacy `oauth:` chat token.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, ChatError> {
        Ok(self.0.clone())
    }
}

/// Ensure the `oauth:` prefix Twitch expects on `PASS`.
pub(crate) fn irc_password(token: &str) -> String {
    if token.starts_with("oauth:") {
        token.to_string()
    } else {
        format!("oauth:{}", token)
    }
}
