//! Backend traits.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::BrainError;
use crate::message::CompletionRequest;

/// A text-generation service.
///
/// Implementations must be safe to call concurrently; the orchestrator issues
/// overlapping requests from independent mode handlers.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Run one completion and return the generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError>;

    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Whether the backend is ready to accept requests.
    async fn is_ready(&self) -> bool {
        true
    }
}

/// A text-to-speech service that renders audio to a file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` and return the path of the written audio file.
    async fn synthesize(&self, text: &str) -> Result<PathBuf, BrainError>;
}
