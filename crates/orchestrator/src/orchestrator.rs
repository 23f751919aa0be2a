//! Main orchestrator that coordinates message processing.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use brain_core::{Brain, ConversationHistory, SpeechSynthesizer};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::buffer::{ChatMessage, ConversationBuffer, DEFAULT_BUFFER_CAPACITY};
use crate::chain::ArbitrationChain;
use crate::clock::{Clock, TokioClock};
use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::{ChatEvent, InboundChat};
use crate::modes::{AmbientMode, IdleAction, IdleMode, TopicMode};
use crate::shared::Shared;
use crate::state::RuntimeState;
use crate::transport::ChatTransport;

/// History key for questions asked outside of chat.
const ASK_HISTORY_KEY: &str = "http";

/// What happened to one dispatched message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The exclusive mode that claimed the message, if any.
    pub claimed_by: Option<Mode>,
    pub idle: Option<IdleAction>,
    pub ambient_replied: bool,
    pub topics_updated: bool,
}

/// Control-surface view of one mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeStatus {
    pub mode: String,
    pub enabled: bool,
    /// Seconds.
    pub cooldown: u64,
    pub probability: f64,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

enum Background {
    Idle(Result<Option<IdleAction>, OrchestratorError>),
    Ambient(Result<bool, OrchestratorError>),
    Topic(Result<bool, OrchestratorError>),
}

struct Inner {
    shared: Shared,
    chain: ArbitrationChain,
    idle: IdleMode,
    ambient: AmbientMode,
    topic: TopicMode,
}

/// Decides whether and how to answer each chat message.
///
/// The orchestrator:
/// - Buffers every inbound message in arrival order
/// - Offers it to highlight, command, hype, mention and emoji handlers in
///   priority order, stopping at the first that claims it
/// - Runs idle, ambient and topic checks alongside, each isolated
/// - Owns the runtime configuration behind narrow setters
///
/// Cloning is cheap; clones share all state.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    config: CompanionConfig,
    brain: Arc<dyn Brain>,
    transport: Arc<dyn ChatTransport>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    clock: Arc<dyn Clock>,
    rng_seed: Option<u64>,
    brain_timeout: Duration,
    chunk_delay: Duration,
    buffer_capacity: usize,
}

impl OrchestratorBuilder {
    /// Text-to-speech backend for command replies.
    pub fn speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Deterministic gate sampling.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn brain_timeout(mut self, timeout: Duration) -> Self {
        self.brain_timeout = timeout;
        self
    }

    /// Pause between chunks of a long reply.
    pub fn chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Orchestrator, OrchestratorError> {
        let now = self.clock.now();
        let (speech_updates, _) = broadcast::channel(16);

        let shared = Shared {
            buffer: Mutex::new(ConversationBuffer::new(self.buffer_capacity)),
            state: Mutex::new(RuntimeState::new(self.config.commit_policy, now, self.rng_seed)),
            story_flight: tokio::sync::Mutex::new(()),
            history: ConversationHistory::new(self.config.command.history_length.max(1)),
            config: RwLock::new(self.config),
            brain: self.brain,
            transport: self.transport,
            speech: self.speech,
            clock: self.clock,
            brain_timeout: self.brain_timeout,
            chunk_delay: self.chunk_delay,
            speech_updates,
        };

        info!(
            "Orchestrator ready (brain: {}, commit policy: {})",
            shared.brain.name(),
            shared.config().commit_policy
        );

        Ok(Orchestrator {
            inner: Arc::new(Inner {
                shared,
                chain: ArbitrationChain::standard()?,
                idle: IdleMode::new()?,
                ambient: AmbientMode,
                topic: TopicMode,
            }),
        })
    }
}

impl Orchestrator {
    pub fn builder(
        config: CompanionConfig,
        brain: Arc<dyn Brain>,
        transport: Arc<dyn ChatTransport>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            brain,
            transport,
            speech: None,
            clock: Arc::new(TokioClock),
            rng_seed: None,
            brain_timeout: Duration::from_secs(30),
            chunk_delay: Duration::from_secs(1),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    fn shared(&self) -> &Shared {
        &self.inner.shared
    }

    /// Record an inbound message. Returns false for the bot's own messages,
    /// which are neither buffered nor dispatched.
    pub fn ingest(&self, message: &InboundChat) -> bool {
        let shared = self.shared();
        let own = message.is_self
            || shared
                .config
                .read()
                .map(|c| c.bot_username.eq_ignore_ascii_case(&message.author))
                .unwrap_or(false);
        if own {
            debug!("Ignoring own message");
            return false;
        }

        let now = shared.now();
        shared
            .buffer()
            .append(ChatMessage::new(&message.author, &message.text, now));

        let mut state = shared.state();
        state.silence.on_message(now);
        state.messages_since_response += 1;
        true
    }

    /// Run the arbitration chain, then the idle, ambient and topic checks.
    ///
    /// Expects the message to have been ingested already.
    pub async fn dispatch(&self, message: InboundChat) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let config = Arc::new(self.shared().config());
        if !config.bot_enabled {
            debug!("Bot disabled, not dispatching");
            return outcome;
        }

        // 1. Exclusive handlers, first claim wins
        outcome.claimed_by = self.inner.chain.run(self.shared(), &message, &config).await;

        // 2. Independent checks, each failure isolated
        let mut tasks = JoinSet::new();
        {
            let this = self.clone();
            let config = config.clone();
            let channel = message.channel.clone();
            tasks.spawn(async move {
                let inner = &this.inner;
                Background::Idle(inner.idle.check(&inner.shared, &config, &channel).await)
            });
        }
        {
            let this = self.clone();
            let config = config.clone();
            let channel = message.channel.clone();
            tasks.spawn(async move {
                let inner = &this.inner;
                Background::Ambient(inner.ambient.check(&inner.shared, &config, &channel).await)
            });
        }
        {
            let this = self.clone();
            let config = config.clone();
            tasks.spawn(async move {
                let inner = &this.inner;
                Background::Topic(inner.topic.check(&inner.shared, &config).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Background::Idle(Ok(action))) => outcome.idle = action,
                Ok(Background::Idle(Err(e))) => warn!("Idle check failed: {}", e),
                Ok(Background::Ambient(Ok(replied))) => outcome.ambient_replied = replied,
                Ok(Background::Ambient(Err(e))) => warn!("Ambient check failed: {}", e),
                Ok(Background::Topic(Ok(updated))) => outcome.topics_updated = updated,
                Ok(Background::Topic(Err(e))) => warn!("Topic extraction failed: {}", e),
                Err(e) => error!("Background handler aborted: {}", e),
            }
        }

        outcome
    }

    /// Ingest and dispatch in one step.
    pub async fn handle_message(&self, message: InboundChat) -> DispatchOutcome {
        if !self.ingest(&message) {
            return DispatchOutcome::default();
        }
        self.dispatch(message).await
    }

    /// Consume transport events until the stream ends.
    ///
    /// Messages are ingested in arrival order; each dispatch runs as its own
    /// task so the next message is read while the previous one is answered.
    /// In-flight dispatches are awaited before returning.
    pub async fn run(&self, mut events: mpsc::Receiver<ChatEvent>) {
        let transport = self.shared().transport.clone();
        if let Err(e) = transport.connect().await {
            warn!("Transport connect failed: {}", e);
        }

        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(ChatEvent::Message(message)) => {
                        if self.ingest(&message) {
                            let this = self.clone();
                            tasks.spawn(async move { this.dispatch(message).await });
                        }
                    }
                    Some(ChatEvent::Connected) => info!("Chat connected"),
                    Some(ChatEvent::Disconnected { reason }) => warn!("Chat disconnected: {}", reason),
                    None => break,
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!("Dispatch task aborted: {}", e);
                    }
                }
            }
        }

        info!("Event stream closed, waiting for {} dispatches", tasks.len());
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Dispatch task aborted: {}", e);
            }
        }

        if let Err(e) = transport.disconnect().await {
            warn!("Transport disconnect failed: {}", e);
        }
    }

    /// One idle check in the home channel, as the timer does it.
    pub async fn idle_tick(&self) -> Option<IdleAction> {
        let config = self.shared().config();
        if !config.bot_enabled || !config.idle.mode.enabled {
            return None;
        }
        let channel = config.home_channel()?.to_string();

        match self.inner.idle.check(self.shared(), &config, &channel).await {
            Ok(action) => action,
            Err(e) => {
                warn!("Idle timer check failed: {}", e);
                None
            }
        }
    }

    /// Run [`Orchestrator::idle_tick`] every `AFK_CHECK_INTERVAL`.
    pub fn spawn_idle_timer(&self) -> JoinHandle<()> {
        let this = self.clone();
        let period = self.shared().config().idle.check_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Some(action) = this.idle_tick().await {
                    debug!("Idle timer: {:?}", action);
                }
            }
        })
    }

    /// Answer `text` with the command context without posting to chat.
    pub async fn ask(&self, text: &str) -> Result<String, OrchestratorError> {
        let config = self.shared().config();
        self.shared().converse(&config.command, ASK_HISTORY_KEY, text).await
    }

    pub fn bot_enabled(&self) -> bool {
        self.shared().config().bot_enabled
    }

    /// Master switch. While off, messages are buffered but never answered.
    pub fn set_bot_enabled(&self, enabled: bool) {
        self.shared().update_config(|c| c.bot_enabled = enabled);
        info!("Bot {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn set_mode_enabled(&self, mode: Mode, enabled: bool) -> ModeStatus {
        self.shared().update_config(|c| c.mode_mut(mode).enabled = enabled);
        if mode == Mode::Idle && enabled {
            self.shared().state().silence.reset_story_flag();
        }
        info!("{} {}", mode, if enabled { "enabled" } else { "disabled" });
        self.mode_status(mode)
    }

    pub fn mode_status(&self, mode: Mode) -> ModeStatus {
        let shared = self.shared();
        let config = shared.config();
        let now = shared.now();
        let state = shared.state();

        let since = |at: Option<Instant>| at.map(|t| now.saturating_duration_since(t).as_secs());
        let gate_key = if mode == Mode::Highlight { Mode::Command } else { mode };
        let last = since(state.gates.state(gate_key).last_triggered_at());

        let details = match mode {
            Mode::Command => json!({
                "prefixes": config.command.prefixes,
                "send_username": config.command.send_username,
                "history_length": config.command.history_length,
                "speech": config.command.speech,
                "seconds_since_last": last,
            }),
            Mode::Highlight | Mode::Emoji => json!({ "seconds_since_last": last }),
            Mode::Hype => json!({
                "commands": config.hype.commands,
                "seconds_since_last": last,
            }),
            Mode::Mention => json!({ "streamer_names": config.mention.names }),
            Mode::Idle => json!({
                "story_interval": config.idle.story_interval.as_secs(),
                "min_silence": config.idle.min_silence.as_secs(),
                "seconds_since_last_story": since(state.silence.last_story_at()),
                "seconds_since_last_message": since(Some(state.silence.last_message_at())),
            }),
            Mode::Ambient => json!({
                "min_messages": config.ambient.min_messages,
                "messages_since_last": state.messages_since_response,
                "seconds_since_last": last,
            }),
            Mode::Topic => json!({
                "current_topics": state.topics,
                "seconds_since_last": last,
            }),
        };

        let settings = config.mode(mode);
        ModeStatus {
            mode: mode.route_name().to_string(),
            enabled: settings.enabled,
            cooldown: settings.cooldown.as_secs(),
            probability: settings.probability,
            details: match details {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// Topics from the last extraction.
    pub fn tracked_topics(&self) -> Vec<String> {
        self.shared().state().topics.clone()
    }

    /// The last `n` buffered messages.
    pub fn recent_messages(&self, n: usize) -> Vec<ChatMessage> {
        self.shared().buffer().recent(n)
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> CompanionConfig {
        self.shared().config()
    }

    /// Paths of freshly rendered speech files.
    pub fn subscribe_speech(&self) -> broadcast::Receiver<PathBuf> {
        self.shared().speech_updates.subscribe()
    }
}
