//! Direct completion endpoint.

use axum::extract::{Path, State};

use crate::error::Result;
use crate::state::AppState;

/// Answer `text` with the command context. Nothing is posted to chat.
pub async fn ask(State(state): State<AppState>, Path(text): Path<String>) -> Result<String> {
    let orchestrator = state.orchestrator()?;
    Ok(orchestrator.ask(&text).await?)
}
