//! Twitch chat companion.
//!
//! Connects the message orchestrator to Twitch chat and serves the control
//! surface: dashboard, per-mode toggles, OAuth flow and speech updates.

mod bridge;
mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use brain_core::{Brain, SpeechSynthesizer};
use openai_brain::{OpenAiBrain, OpenAiSpeech};
use orchestrator::{CompanionConfig, Orchestrator};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use twitch_auth::{
    spawn_refresh_loop, AuthError, CredentialManager, FileTokenStore, TwitchTokenClient,
};
use twitch_chat::{ChatConfig, StaticToken, TokenProvider, TwitchClient};

use crate::bridge::{forward_events, ManagerToken, TwitchTransport};
use crate::config::{Config, CredentialSource};
use crate::state::AppState;

/// How often the refresh loop checks the credential.
const REFRESH_CHECK: Duration = Duration::from_secs(60);

/// Pause before retrying a bot start that failed for a reason other than
/// missing authorization.
const START_RETRY: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let companion = CompanionConfig::from_env()?;
    info!(
        addr = %config.addr,
        bot = %companion.bot_username,
        channels = ?companion.channels,
        oauth = config.uses_oauth(),
        "Starting chat companion"
    );

    // Completion and speech clients
    let openai = OpenAiBrain::from_env()?;
    let speech: Option<Arc<dyn SpeechSynthesizer>> = if companion.command.speech {
        Some(Arc::new(OpenAiSpeech::new(openai.config().clone())?))
    } else {
        None
    };
    let brain: Arc<dyn Brain> = Arc::new(openai);

    // Chat credential
    let (tokens, manager): (Arc<dyn TokenProvider>, Option<Arc<CredentialManager>>) =
        match &config.credentials {
            CredentialSource::Static(token) => {
                info!("Using static chat token");
                (Arc::new(StaticToken::new(token.clone())), None)
            }
            CredentialSource::OAuth {
                oauth,
                refresh_token,
                token_file,
            } => {
                let manager = Arc::new(CredentialManager::new(
                    Arc::new(TwitchTokenClient::new(oauth.clone())?),
                    Arc::new(FileTokenStore::new(token_file.clone())),
                ));
                if let Some(refresh_token) = refresh_token {
                    manager.set_refresh_token(refresh_token.clone()).await;
                }
                spawn_refresh_loop(manager.clone(), REFRESH_CHECK);
                (Arc::new(ManagerToken(manager.clone())), Some(manager))
            }
        };

    // Build application state
    let state = AppState::new(manager);
    tokio::spawn(start_bot(state.clone(), config.addr, companion, brain, speech, tokens));

    // Build router
    let app = routes::router()
        .nest_service("/public", ServeDir::new(&config.public_dir))
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "Control surface listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for a usable credential, then connect and run the bot until the
/// event stream ends.
async fn start_bot(
    state: AppState,
    addr: SocketAddr,
    companion: CompanionConfig,
    brain: Arc<dyn Brain>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    tokens: Arc<dyn TokenProvider>,
) {
    if let Some(manager) = state.auth.clone() {
        loop {
            match manager.get_valid_token().await {
                Ok(_) => break,
                Err(AuthError::NotAuthorized) => {
                    warn!("Authorization required, visit http://{}/auth/twitch", addr);
                    state.authorized.notified().await;
                }
                Err(e) => {
                    warn!("Cannot start bot yet: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(START_RETRY) => {}
                        _ = state.authorized.notified() => {}
                    }
                }
            }
        }
    }

    let chat = ChatConfig::new(companion.bot_username.clone(), &companion.channels);
    let (client, events) = TwitchClient::spawn(chat, tokens);

    let mut builder = Orchestrator::builder(companion, brain, Arc::new(TwitchTransport::new(client)));
    if let Some(speech) = speech {
        builder = builder.speech(speech);
    }
    let orchestrator = match builder.build() {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Failed to build orchestrator: {}", e);
            return;
        }
    };

    state.install(orchestrator.clone());
    let timer = orchestrator.spawn_idle_timer();
    info!("Bot started");

    orchestrator.run(forward_events(events)).await;
    timer.abort();
    info!("Bot stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
