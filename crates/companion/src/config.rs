//! Server and credential configuration loaded from environment variables.
//!
//! Companion behaviour (modes, cooldowns) is read by
//! [`orchestrator::CompanionConfig::from_env`]; the completion client by
//! [`openai_brain::OpenAiConfig::from_env`].

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use twitch_auth::{OAuthConfig, DEFAULT_TOKEN_FILE};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/auth/twitch/callback";

/// Where the chat password comes from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Legacy fixed `oauth:` token.
    Static(String),
    /// Managed OAuth credential with refresh.
    OAuth {
        oauth: OAuthConfig,
        refresh_token: Option<String>,
        token_file: PathBuf,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Control surface bind address.
    pub addr: SocketAddr,
    /// Chat credential source.
    pub credentials: CredentialSource,
    /// Directory served under `/public` (speech output lands here).
    pub public_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BIND_ADDR` | Server bind address | `0.0.0.0:3000` |
    /// | `TWITCH_CLIENT_ID` | OAuth client id | - |
    /// | `TWITCH_CLIENT_SECRET` | OAuth client secret | - |
    /// | `TWITCH_REDIRECT_URI` | OAuth callback | `http://localhost:3000/auth/twitch/callback` |
    /// | `TWITCH_REFRESH_TOKEN` | Seed refresh token | - |
    /// | `TWITCH_TOKEN_FILE` | Credential file | `.twitch_tokens.json` |
    /// | `TWITCH_AUTH` | Legacy static token | - |
    /// | `PUBLIC_DIR` | Static files | `./public` |
    ///
    /// OAuth wins when both a client id/secret pair and `TWITCH_AUTH` are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let credentials = match (var("TWITCH_CLIENT_ID"), var("TWITCH_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => {
                let redirect_uri =
                    var("TWITCH_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
                CredentialSource::OAuth {
                    oauth: OAuthConfig::new(client_id, client_secret, redirect_uri),
                    refresh_token: var("TWITCH_REFRESH_TOKEN"),
                    token_file: var("TWITCH_TOKEN_FILE")
                        .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string())
                        .into(),
                }
            }
            _ => match var("TWITCH_AUTH") {
                Some(token) => CredentialSource::Static(token),
                None => return Err(ConfigError::MissingCredentials),
            },
        };

        let public_dir = var("PUBLIC_DIR").unwrap_or_else(|| "./public".to_string()).into();

        Ok(Self {
            addr,
            credentials,
            public_dir,
        })
    }

    /// Whether the OAuth flow is available.
    pub fn uses_oauth(&self) -> bool {
        matches!(self.credentials, CredentialSource::OAuth { .. })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BIND_ADDR format")]
    InvalidAddr,

    #[error("Set TWITCH_CLIENT_ID and TWITCH_CLIENT_SECRET, or TWITCH_AUTH")]
    MissingCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_oauth_defaults() {
        let config = load(&[("TWITCH_CLIENT_ID", "id"), ("TWITCH_CLIENT_SECRET", "secret")]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert!(config.uses_oauth());
        match config.credentials {
            CredentialSource::OAuth {
                oauth,
                refresh_token,
                token_file,
            } => {
                assert_eq!(oauth.client_id, "id");
                assert_eq!(oauth.redirect_uri, DEFAULT_REDIRECT_URI);
                assert!(refresh_token.is_none());
                assert_eq!(token_file, PathBuf::from(".twitch_tokens.json"));
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_legacy_token() {
        let config = load(&[("TWITCH_AUTH", "oauth:abc"), ("BIND_ADDR", "127.0.0.1:8080")]).unwrap();

        assert!(!config.uses_oauth());
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert!(matches!(config.credentials, CredentialSource::Static(ref t) if t == "oauth:abc"));
    }

    #[test]
    fn test_oauth_needs_both_halves() {
        assert!(matches!(
            load(&[("TWITCH_CLIENT_ID", "id")]),
            Err(ConfigError::MissingCredentials)
        ));
        assert!(matches!(
            load(&[("TWITCH_CLIENT_ID", "id"), ("TWITCH_AUTH", "oauth:x")]).map(|c| c.uses_oauth()),
            Ok(false)
        ));
    }

    #[test]
    fn test_invalid_addr() {
        assert!(matches!(
            load(&[("TWITCH_AUTH", "x"), ("BIND_ADDR", "nope")]),
            Err(ConfigError::InvalidAddr)
        ));
    }
}
