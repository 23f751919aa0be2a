//! Error types for completion backends.

use thiserror::Error;

/// Errors that can occur while talking to a completion or speech backend.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The backend is misconfigured (missing key, bad URL, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never reached the backend or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with an error or an unparseable body.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The backend answered but produced no usable text.
    #[error("empty response")]
    EmptyResponse,

    /// The request took too long.
    #[error("request timed out")]
    Timeout,
}
