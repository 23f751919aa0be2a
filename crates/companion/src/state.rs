//! Application state shared across handlers.

use std::sync::{Arc, PoisonError, RwLock};

use orchestrator::Orchestrator;
use tokio::sync::Notify;
use twitch_auth::CredentialManager;

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone, Default)]
pub struct AppState {
    /// Set once the chat bot is running.
    bot: Arc<RwLock<Option<Orchestrator>>>,
    /// Present in OAuth mode.
    pub auth: Option<Arc<CredentialManager>>,
    /// Signalled after a successful authorization-code exchange.
    pub authorized: Arc<Notify>,
}

impl AppState {
    /// Create new application state.
    pub fn new(auth: Option<Arc<CredentialManager>>) -> Self {
        Self {
            auth,
            ..Self::default()
        }
    }

    /// Publish the running bot to the handlers.
    pub fn install(&self, orchestrator: Orchestrator) {
        *self.bot.write().unwrap_or_else(PoisonError::into_inner) = Some(orchestrator);
    }

    /// The running bot, or [`ApiError::NotInitialized`].
    pub fn orchestrator(&self) -> Result<Orchestrator, ApiError> {
        self.bot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ApiError::NotInitialized)
    }

    /// The credential manager, or [`ApiError::OAuthNotConfigured`].
    pub fn auth(&self) -> Result<&Arc<CredentialManager>, ApiError> {
        self.auth.as_ref().ok_or(ApiError::OAuthNotConfigured)
    }
}
