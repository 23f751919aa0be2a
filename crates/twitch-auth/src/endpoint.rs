//! Twitch OAuth token endpoint client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AuthError;

/// Scopes requested by the regular authorization link.
pub const DEFAULT_SCOPES: &[&str] = &["chat:read", "chat:edit"];

/// Scopes requested when re-consenting from the control surface.
pub const REAUTH_SCOPES: &[&str] = &[
    "chat:read",
    "chat:edit",
    "channel:moderate",
    "whispers:read",
    "whispers:edit",
];

/// OAuth application settings.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Base of the identity service, e.g. `https://id.twitch.tv/oauth2`.
    pub base_url: String,
}

impl OAuthConfig {
    /// Create a config for the public Twitch identity service.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            base_url: "https://id.twitch.tv/oauth2".to_string(),
        }
    }

    /// Point at a different identity service (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.base_url)
    }

    pub fn validate_url(&self) -> String {
        format!("{}/validate", self.base_url)
    }

    /// Build the consent URL the user visits to grant `scopes`.
    pub fn authorization_url(&self, scopes: &[&str], force_verify: bool) -> String {
        let scope = scopes
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("+");

        let mut url = format!(
            "{}/authorize?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            scope
        );
        if force_verify {
            url.push_str("&force_verify=true");
        }
        url
    }
}

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Twitch always returns one today; older grants may omit it.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires.
    pub expires_in: u64,
}

/// Successful validation response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenValidation {
    #[serde(default)]
    pub login: Option<String>,
    /// Seconds until the access token expires.
    pub expires_in: u64,
}

/// The identity-service operations the credential manager needs.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Exchange a one-time authorization code for a token pair.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError>;

    /// Trade a refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError>;

    /// Check an access token. `Ok(None)` means the token is no longer valid.
    async fn validate(&self, access_token: &str) -> Result<Option<TokenValidation>, AuthError>;

    /// Consent URL for the given scopes.
    fn authorization_url(&self, scopes: &[&str], force_verify: bool) -> String;
}

/// [`TokenEndpoint`] backed by the real identity service.
pub struct TwitchTokenClient {
    http: Client,
    config: OAuthConfig,
}

impl TwitchTokenClient {
    pub fn new(config: OAuthConfig) -> Result<Self, AuthError> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(AuthError::Config(
                "client id and client secret are required".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { http, config })
    }

    async fn post_token(&self, form: &[(&str, &str)]) -> Result<TokenGrant, AuthError> {
        let response = self
            .http
            .post(self.config.token_url())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TokenEndpoint for TwitchTokenClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError> {
        info!("Exchanging authorization code for tokens");
        self.post_token(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        debug!("Requesting token refresh");
        self.post_token(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn validate(&self, access_token: &str) -> Result<Option<TokenValidation>, AuthError> {
        let response = self
            .http
            .get(self.config.validate_url())
            .header("Authorization", format!("OAuth {}", access_token))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED => Ok(None),
            status => Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    fn authorization_url(&self, scopes: &[&str], force_verify: bool) -> String {
        self.config.authorization_url(scopes, force_verify)
    }
}
