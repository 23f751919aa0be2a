//! Twitch OAuth credential lifecycle.
//!
//! The [`CredentialManager`] owns the bot's chat credential. It loads a
//! persisted credential on first use, refreshes it when it is within five
//! minutes of expiry, persists every change before adopting it, and falls
//! back to an unauthorized state that only a new authorization-code exchange
//! can leave.
//!
//! ```no_run
//! use std::sync::Arc;
//! use twitch_auth::{CredentialManager, FileTokenStore, OAuthConfig, TwitchTokenClient};
//!
//! # async fn example() -> Result<(), twitch_auth::AuthError> {
//! let oauth = OAuthConfig::new("client-id", "client-secret", "http://localhost:3000/auth/twitch/callback");
//! let manager = CredentialManager::new(
//!     Arc::new(TwitchTokenClient::new(oauth)?),
//!     Arc::new(FileTokenStore::new(".twitch_tokens.json")),
//! );
//!
//! let password = manager.get_valid_token().await?; // "oauth:..."
//! # let _ = password;
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod manager;
pub mod refresh;
pub mod store;

pub use credentials::Credentials;
pub use endpoint::{
    OAuthConfig, TokenEndpoint, TokenGrant, TokenValidation, TwitchTokenClient, DEFAULT_SCOPES,
    REAUTH_SCOPES,
};
pub use error::AuthError;
pub use manager::{AuthState, CredentialManager, REFRESH_WINDOW};
pub use refresh::spawn_refresh_loop;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, DEFAULT_TOKEN_FILE};
