//! Route handlers for the control surface.

pub mod ask;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod modes;
pub mod updates;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(dashboard::dashboard_page))
        // Health check
        .route("/health", get(health::health))
        // OAuth flow
        .route("/auth/twitch", get(auth::authorize))
        .route("/auth/twitch/callback", get(auth::callback))
        .route("/api/oauth/auth-url", get(auth::auth_url))
        .route("/api/oauth/status", get(auth::status))
        // Mode controls; `bot` is the master switch
        .route("/api/:mode/status", get(modes::status))
        .route("/api/:mode/toggle", post(modes::toggle))
        // Direct completion and speech notifications
        .route("/gpt/:text", get(ask::ask))
        .route("/check-for-updates", get(updates::check_for_updates))
}
