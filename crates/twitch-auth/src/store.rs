//! Credential persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::error::AuthError;

/// Default credential file, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = ".twitch_tokens.json";

/// Where the credential manager keeps its record.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored credential, `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Credentials>, AuthError>;

    /// Replace the stored credential.
    async fn save(&self, credentials: &Credentials) -> Result<(), AuthError>;
}

/// JSON file store.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash never leaves a half-written credential behind.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FILE)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<Credentials>, AuthError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let credentials = serde_json::from_str(&raw)?;
                info!("Loaded credentials from {}", self.path.display());
                Ok(Some(credentials))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No saved credentials at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let raw = serde_json::to_string_pretty(credentials)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, raw).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credentials: Mutex<Option<Credentials>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a stored credential.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(Some(credentials)),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with an I/O error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Currently stored credential.
    pub async fn stored(&self) -> Option<Credentials> {
        self.credentials.lock().await.clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<Credentials>, AuthError> {
        Ok(self.credentials.lock().await.clone())
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AuthError::Storage(std::io::Error::new(
                ErrorKind::Other,
                "store unavailable",
            )));
        }
        *self.credentials.lock().await = Some(credentials.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let store = FileTokenStore::new(&path);

        store.save(&sample()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(sample()));
        assert!(!dir.path().join("tokens.json.tmp").exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"refreshToken\": \"refresh\""));
    }

    #[tokio::test]
    async fn test_file_store_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(
            &path,
            r#"{"accessToken":"a","refreshToken":"r","expiresAt":42}"#,
        )
        .unwrap();

        let loaded = FileTokenStore::new(&path).load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "a");
        assert_eq!(loaded.expires_at, 42);
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileTokenStore::new(&path).load().await,
            Err(AuthError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store_failing_saves() {
        let store = MemoryTokenStore::new();
        store.fail_saves(true);
        assert!(store.save(&sample()).await.is_err());
        assert_eq!(store.saves(), 0);
        assert!(store.stored().await.is_none());
    }
}
