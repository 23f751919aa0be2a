//! Per-mode status and toggle endpoints.
//!
//! `:mode` is a route name (`auto-chat`, `afk-mode`, ...) or `bot` for the
//! master switch.

use axum::extract::{Path, State};
use axum::Json;
use orchestrator::Mode;
use serde_json::{json, Value};

use crate::error::{ApiError, Result};
use crate::state::AppState;

const MASTER_ROUTE: &str = "bot";

pub async fn status(State(state): State<AppState>, Path(route): Path<String>) -> Result<Json<Value>> {
    let orchestrator = state.orchestrator()?;

    if route == MASTER_ROUTE {
        return Ok(Json(json!({ "enabled": orchestrator.bot_enabled() })));
    }

    let mode = parse_mode(&route)?;
    Ok(Json(json!(orchestrator.mode_status(mode))))
}

/// Body: `{"enabled": bool}`. Anything else is rejected without a state change.
pub async fn toggle(
    State(state): State<AppState>,
    Path(route): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let orchestrator = state.orchestrator()?;
    let enabled = body
        .get("enabled")
        .and_then(Value::as_bool)
        .ok_or(ApiError::InvalidToggle)?;

    if route == MASTER_ROUTE {
        orchestrator.set_bot_enabled(enabled);
        return Ok(Json(json!({
            "success": true,
            "enabled": orchestrator.bot_enabled(),
        })));
    }

    let mode = parse_mode(&route)?;
    let status = orchestrator.set_mode_enabled(mode, enabled);
    Ok(Json(json!({
        "success": true,
        "status": status,
    })))
}

fn parse_mode(route: &str) -> Result<Mode> {
    Mode::from_route(route).ok_or_else(|| ApiError::UnknownMode(route.to_string()))
}
