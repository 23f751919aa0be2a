//! Error types for twitch-auth.

use thiserror::Error;

/// Errors from the credential lifecycle.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable credential; the user must complete the authorization flow.
    #[error("Not authorized: visit the authorization URL to grant chat access")]
    NotAuthorized,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with an error.
    #[error("Token endpoint error {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    /// Reading or writing the credential store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
