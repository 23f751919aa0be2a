//! The persisted credential record.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Access/refresh token pair with its absolute expiry.
///
/// Serialized as `{"accessToken", "refreshToken", "expiresAt"}` with
/// `expiresAt` in Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl Credentials {
    /// Build credentials expiring `expires_in` after `now_ms`.
    pub fn issued(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        now_ms: i64,
        expires_in: Duration,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: now_ms.saturating_add(expires_in.as_millis() as i64),
        }
    }

    /// Whether the token expires within `window` of `now_ms` (or already has).
    pub fn expires_within(&self, now_ms: i64, window: Duration) -> bool {
        now_ms >= self.expires_at.saturating_sub(window.as_millis() as i64)
    }

    /// Whether an access token is present at all.
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60_000;

    #[test]
    fn test_expiry_window() {
        let creds = Credentials::issued("a", "r", 0, Duration::from_secs(3600));
        let window = Duration::from_secs(300);

        assert!(!creds.expires_within(0, window));
        assert!(!creds.expires_within(54 * MINUTE, window));
        assert!(creds.expires_within(55 * MINUTE, window));
        assert!(creds.expires_within(90 * MINUTE, window));
    }

    #[test]
    fn test_file_format_is_camel_case() {
        let creds = Credentials {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["expiresAt"], 1_700_000_000_000i64);
    }
}
