//! OAuth authorization flow.

use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Redirect to the consent screen.
pub async fn authorize(State(state): State<AppState>) -> Result<Redirect> {
    let url = state.auth()?.authorization_url();
    Ok(Redirect::to(&url))
}

/// Exchange the one-time code and wake the deferred bot start.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<&'static str>> {
    let manager = state.auth()?;

    if let Some(error) = params.error {
        warn!(
            "Authorization denied: {} {}",
            error,
            params.error_description.unwrap_or_default()
        );
        return Err(ApiError::MissingCode);
    }
    let code = params.code.ok_or(ApiError::MissingCode)?;

    manager.exchange_authorization_code(&code).await?;
    info!("Authorization complete, starting bot");
    state.authorized.notify_one();

    Ok(Html(
        "<h1>Authorization Successful!</h1>\
         <p>The bot is authorized and connecting. You can close this window.</p>",
    ))
}

/// Consent URL with the extended scopes, for re-authorization.
pub async fn auth_url(State(state): State<AppState>) -> Result<Json<Value>> {
    let url = state.auth()?.reauthorization_url();
    Ok(Json(json!({ "auth_url": url })))
}

pub async fn status(State(state): State<AppState>) -> Result<Json<Value>> {
    let manager = state.auth()?;
    Ok(Json(json!({
        "state": manager.state(),
        "expires_at": manager.expires_at().await,
        "reauthorization_required": manager.reauthorization_required().await,
    })))
}
