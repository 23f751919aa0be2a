//! Error types for orchestrator operations.

use brain_core::BrainError;
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Completion or speech backend failed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),

    /// The completion service did not answer in time.
    #[error("completion timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Message sending failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Configuration value missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown mode name on the control surface.
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}
