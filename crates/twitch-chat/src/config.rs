//! Configuration types for twitch-chat.

use std::time::Duration;

use crate::reconnect::ReconnectConfig;

/// Twitch's IRC-over-WebSocket endpoint.
pub const DEFAULT_SERVER_URL: &str = "wss://irc-ws.chat.twitch.tv:443";

/// Configuration for a chat connection.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// WebSocket URL of the IRC gateway.
    pub server_url: String,
    /// Bot login, lowercased.
    pub username: String,
    /// Channels to join, each with a leading `#`.
    pub channels: Vec<String>,
    /// How long to wait for the server welcome after sending credentials.
    pub login_timeout: Duration,
    /// Interval between client-initiated keepalive PINGs.
    pub keepalive: Duration,
    /// Backoff applied between connection attempts.
    pub reconnect: ReconnectConfig,
}

impl ChatConfig {
    /// Create a configuration for the public Twitch gateway.
    pub fn new<I, S>(username: impl Into<String>, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            username: username.into().to_lowercase(),
            channels: channels
                .into_iter()
                .filter_map(|c| normalize_channel(c.as_ref()))
                .collect(),
            login_timeout: Duration::from_secs(10),
            keepalive: Duration::from_secs(300),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Point the client at a different gateway (used by tests).
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Replace the reconnect policy.
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }
}

/// Lowercase a channel name and ensure it starts with `#`.
///
/// Returns `None` for blank input.
pub fn normalize_channel(channel: &str) -> Option<String> {
    let trimmed = channel.trim().trim_start_matches('#');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("#{}", trimmed.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_channel() {
        assert_eq!(normalize_channel("GigaSnail"), Some("#gigasnail".to_string()));
        assert_eq!(normalize_channel(" #foo "), Some("#foo".to_string()));
        assert_eq!(normalize_channel("#"), None);
        assert_eq!(normalize_channel("   "), None);
    }

    #[test]
    fn test_new_normalizes() {
        let config = ChatConfig::new("Companion_Bot", ["a", "", "#B"]);
        assert_eq!(config.username, "companion_bot");
        assert_eq!(config.channels, vec!["#a".to_string(), "#b".to_string()]);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }
}
