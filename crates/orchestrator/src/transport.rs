//! Outbound chat transport trait and implementations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::OrchestratorError;

/// Sends text into a chat channel.
///
/// Abstracted to support different transports (Twitch IRC, tests, etc.)
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Open the connection. Transports that connect on construction keep the default.
    async fn connect(&self) -> Result<(), OrchestratorError> {
        Ok(())
    }

    /// Send one chat line.
    async fn send(&self, channel: &str, text: &str) -> Result<(), OrchestratorError>;

    async fn disconnect(&self) -> Result<(), OrchestratorError> {
        Ok(())
    }
}

/// A transport that discards everything.
#[derive(Debug, Clone, Default)]
pub struct NoOpTransport;

#[async_trait]
impl ChatTransport for NoOpTransport {
    async fn send(&self, _channel: &str, _text: &str) -> Result<(), OrchestratorError> {
        Ok(())
    }
}

/// A transport that only logs what it would send.
#[derive(Debug, Clone, Default)]
pub struct LoggingTransport;

#[async_trait]
impl ChatTransport for LoggingTransport {
    async fn send(&self, channel: &str, text: &str) -> Result<(), OrchestratorError> {
        tracing::info!("[{}] {}", channel, text);
        Ok(())
    }
}

/// A line captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: String,
    pub text: String,
    pub at: Instant,
}

/// Records every sent line with its send time. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, channel: &str, text: &str) -> Result<(), OrchestratorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(OrchestratorError::SendFailed("transport offline".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentMessage {
                channel: channel.to_string(),
                text: text.to_string(),
                at: Instant::now(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_and_logging_transports() {
        NoOpTransport.send("#chan", "test").await.unwrap();
        LoggingTransport.connect().await.unwrap();
        LoggingTransport.send("#chan", "test").await.unwrap();
        LoggingTransport.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_recording_transport() {
        let transport = RecordingTransport::new();
        transport.send("#chan", "one").await.unwrap();

        transport.set_failing(true);
        assert!(transport.send("#chan", "two").await.is_err());

        transport.set_failing(false);
        transport.send("#other", "three").await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].channel, "#other");
        assert_eq!(transport.texts(), vec!["one", "three"]);

        transport.clear();
        assert!(transport.sent().is_empty());
    }
}
