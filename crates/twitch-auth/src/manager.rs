//! Credential lifecycle state machine.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use crate::credentials::Credentials;
use crate::endpoint::{TokenEndpoint, TokenGrant, DEFAULT_SCOPES, REAUTH_SCOPES};
use crate::error::AuthError;
use crate::store::TokenStore;

/// Refresh when the access token expires within this window.
pub const REFRESH_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// No usable credential.
    Unauthorized,
    /// Holding a credential believed valid.
    Authorized,
    /// A refresh request is in flight.
    Refreshing,
}

#[derive(Debug, Default)]
struct Inner {
    credentials: Option<Credentials>,
    loaded: bool,
    seed_refresh_token: Option<String>,
    /// Set after a failed refresh; cleared only by a code exchange.
    reauthorization_required: bool,
}

/// Owns the chat credential and keeps it fresh.
///
/// All mutation goes through one async mutex, so concurrent callers of
/// [`get_valid_token`](Self::get_valid_token) trigger at most one refresh.
pub struct CredentialManager {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn TokenStore>,
    inner: Mutex<Inner>,
    state: watch::Sender<AuthState>,
    refresh_window: Duration,
}

impl CredentialManager {
    pub fn new(endpoint: Arc<dyn TokenEndpoint>, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthorized);
        Self {
            endpoint,
            store,
            inner: Mutex::new(Inner::default()),
            state,
            refresh_window: REFRESH_WINDOW,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Seed a refresh token used when nothing has been stored yet.
    pub async fn set_refresh_token(&self, refresh_token: impl Into<String>) {
        self.inner.lock().await.seed_refresh_token = Some(refresh_token.into());
    }

    /// Whether a failed refresh is waiting on a new authorization.
    pub async fn reauthorization_required(&self) -> bool {
        self.inner.lock().await.reauthorization_required
    }

    /// Consent URL with the chat scopes.
    pub fn authorization_url(&self) -> String {
        self.endpoint.authorization_url(DEFAULT_SCOPES, false)
    }

    /// Consent URL with the extended scopes, forcing the consent screen.
    pub fn reauthorization_url(&self) -> String {
        self.endpoint.authorization_url(REAUTH_SCOPES, true)
    }

    /// Return a usable IRC password (`oauth:<token>`), refreshing if needed.
    ///
    /// Loads the stored credential on first use. Fails with
    /// [`AuthError::NotAuthorized`] when there is nothing to refresh from or
    /// a previous refresh failed.
    pub async fn get_valid_token(&self) -> Result<String, AuthError> {
        let mut inner = self.inner.lock().await;

        if inner.reauthorization_required {
            return Err(AuthError::NotAuthorized);
        }

        if inner.credentials.is_none() && !inner.loaded {
            inner.credentials = self.store.load().await?;
            inner.loaded = true;
            if inner.credentials.is_some() {
                self.state.send_replace(AuthState::Authorized);
            }
        }

        let refresh_token = match &inner.credentials {
            Some(creds) if !creds.expires_within(now_ms(), self.refresh_window) => {
                return Ok(irc_password(creds));
            }
            Some(creds) => creds.refresh_token.clone(),
            None => match inner.seed_refresh_token.clone() {
                Some(seed) => seed,
                None => return Err(AuthError::NotAuthorized),
            },
        };

        info!("Access token expired or about to expire, refreshing");
        self.refresh_locked(&mut inner, &refresh_token).await
    }

    async fn refresh_locked(
        &self,
        inner: &mut Inner,
        refresh_token: &str,
    ) -> Result<String, AuthError> {
        let previous = self.state.send_replace(AuthState::Refreshing);

        let grant = match self.endpoint.refresh(refresh_token).await {
            Ok(grant) => grant,
            Err(e) => {
                error!("Token refresh failed, re-authorization required: {}", e);
                inner.credentials = None;
                inner.reauthorization_required = true;
                self.state.send_replace(AuthState::Unauthorized);
                return Err(AuthError::NotAuthorized);
            }
        };

        let credentials = credentials_from_grant(grant, Some(refresh_token));
        if let Err(e) = self.store.save(&credentials).await {
            warn!("Refreshed token could not be persisted: {}", e);
            self.state.send_replace(previous);
            return Err(e);
        }

        let password = irc_password(&credentials);
        inner.credentials = Some(credentials);
        inner.seed_refresh_token = None;
        self.state.send_replace(AuthState::Authorized);
        info!("Access token refreshed");

        Ok(password)
    }

    /// Trade a one-time authorization code for a credential.
    ///
    /// The only way out of the terminal unauthorized state.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<(), AuthError> {
        let grant = self.endpoint.exchange_code(code).await?;
        if grant.refresh_token.is_none() {
            warn!("Authorization grant carried no refresh token");
        }
        let credentials = credentials_from_grant(grant, None);

        let mut inner = self.inner.lock().await;
        self.store.save(&credentials).await?;

        inner.credentials = Some(credentials);
        inner.loaded = true;
        inner.reauthorization_required = false;
        self.state.send_replace(AuthState::Authorized);
        info!("Authorization code exchanged, credentials saved");

        Ok(())
    }

    /// Check the cached token with the identity service and adopt the
    /// expiry it reports. Returns `false` when there is no token or the
    /// service rejects it.
    pub async fn validate_token(&self) -> Result<bool, AuthError> {
        let mut inner = self.inner.lock().await;
        let Some(current) = inner.credentials.clone() else {
            return Ok(false);
        };

        match self.endpoint.validate(&current.access_token).await? {
            Some(validation) => {
                info!("Token validated, expires in {}s", validation.expires_in);
                let updated = Credentials::issued(
                    current.access_token,
                    current.refresh_token,
                    now_ms(),
                    Duration::from_secs(validation.expires_in),
                );
                self.store.save(&updated).await?;
                inner.credentials = Some(updated);
                Ok(true)
            }
            None => {
                warn!("Stored access token was rejected by the identity service");
                Ok(false)
            }
        }
    }

    /// Expiry of the cached credential in Unix milliseconds.
    pub async fn expires_at(&self) -> Option<i64> {
        self.inner
            .lock()
            .await
            .credentials
            .as_ref()
            .map(|c| c.expires_at)
    }
}

fn credentials_from_grant(grant: TokenGrant, previous_refresh: Option<&str>) -> Credentials {
    let refresh_token = grant
        .refresh_token
        .or_else(|| previous_refresh.map(str::to_string))
        .unwrap_or_default();

    Credentials::issued(
        grant.access_token,
        refresh_token,
        now_ms(),
        Duration::from_secs(grant.expires_in),
    )
}

fn irc_password(credentials: &Credentials) -> String {
    format!("oauth:{}", credentials.access_token)
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
