//! Dashboard page.

use askama::Template;
use axum::extract::State;
use orchestrator::{Mode, Orchestrator};

use crate::state::AppState;

const RECENT_MESSAGES: usize = 10;

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub running: bool,
    pub bot_enabled: bool,
    pub oauth: bool,
    pub modes: Vec<ModeRow>,
    pub topics: Vec<String>,
    pub messages: Vec<MessageRow>,
}

/// One mode in the controls table.
pub struct ModeRow {
    pub route: &'static str,
    pub enabled: bool,
    pub cooldown: u64,
    pub probability: String,
}

pub struct MessageRow {
    pub author: String,
    pub text: String,
}

/// Render the dashboard page. Works before the bot has started.
pub async fn dashboard_page(State(state): State<AppState>) -> DashboardTemplate {
    let oauth = state.auth.is_some();
    match state.orchestrator() {
        Ok(orchestrator) => render(&orchestrator, oauth),
        Err(_) => DashboardTemplate {
            running: false,
            bot_enabled: false,
            oauth,
            modes: Vec::new(),
            topics: Vec::new(),
            messages: Vec::new(),
        },
    }
}

fn render(orchestrator: &Orchestrator, oauth: bool) -> DashboardTemplate {
    let modes = Mode::ALL
        .into_iter()
        .map(|mode| {
            let status = orchestrator.mode_status(mode);
            ModeRow {
                route: mode.route_name(),
                enabled: status.enabled,
                cooldown: status.cooldown,
                probability: format!("{:.0}%", status.probability * 100.0),
            }
        })
        .collect();

    let messages = orchestrator
        .recent_messages(RECENT_MESSAGES)
        .into_iter()
        .map(|m| MessageRow {
            author: m.author,
            text: m.text,
        })
        .collect();

    DashboardTemplate {
        running: true,
        bot_enabled: orchestrator.bot_enabled(),
        oauth,
        modes,
        topics: orchestrator.tracked_topics(),
        messages,
    }
}
