//! Background refresh task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::manager::CredentialManager;

/// Periodically call [`CredentialManager::get_valid_token`] so the token is
/// refreshed ahead of the next reconnect.
pub fn spawn_refresh_loop(manager: Arc<CredentialManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match manager.get_valid_token().await {
                Ok(_) => debug!("Periodic token check ok"),
                Err(AuthError::NotAuthorized) => debug!("Periodic token check: not authorized"),
                Err(e) => warn!("Periodic token check failed: {}", e),
            }
        }
    })
}
