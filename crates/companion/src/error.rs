//! Error types for the control surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The chat bot has not started yet.
    #[error("Bot not initialized")]
    NotInitialized,

    /// Malformed toggle body.
    #[error("enabled must be a boolean")]
    InvalidToggle,

    /// No mode with that route name.
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// The OAuth routes were hit in legacy token mode.
    #[error("OAuth not configured. TWITCH_CLIENT_ID and TWITCH_CLIENT_SECRET are required.")]
    OAuthNotConfigured,

    /// Callback without a code.
    #[error("No authorization code provided")]
    MissingCode,

    /// Credential lifecycle error.
    #[error("Authorization failed: {0}")]
    Auth(#[from] twitch_auth::AuthError),

    /// Completion or companion error.
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] orchestrator::OrchestratorError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidToggle | ApiError::OAuthNotConfigured | ApiError::MissingCode => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UnknownMode(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(err) => {
                tracing::error!("Authorization error: {}", err);
                StatusCode::BAD_GATEWAY
            }
            ApiError::Orchestrator(err) => {
                tracing::error!("Orchestrator error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
