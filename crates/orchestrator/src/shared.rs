//! State and collaborators shared by every handler and the idle timer.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use brain_core::{Brain, CompletionRequest, ConversationHistory, SpeechSynthesizer};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::buffer::ConversationBuffer;
use crate::clock::Clock;
use crate::config::{CommandConfig, CompanionConfig, Mode, ModeConfig};
use crate::error::OrchestratorError;
use crate::formatting::split_message;
use crate::gate::{Denied, GateTicket};
use crate::prompts::{self, Persona};
use crate::state::RuntimeState;
use crate::transport::ChatTransport;

pub(crate) struct Shared {
    pub(crate) config: RwLock<CompanionConfig>,
    pub(crate) buffer: Mutex<ConversationBuffer>,
    pub(crate) state: Mutex<RuntimeState>,
    /// Held for the whole generate-and-send of a story.
    pub(crate) story_flight: tokio::sync::Mutex<()>,
    pub(crate) history: ConversationHistory,
    pub(crate) brain: Arc<dyn Brain>,
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) brain_timeout: Duration,
    pub(crate) chunk_delay: Duration,
    pub(crate) speech_updates: broadcast::Sender<PathBuf>,
}

impl Shared {
    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }

    pub(crate) fn config(&self) -> CompanionConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn update_config<T>(&self, f: impl FnOnce(&mut CompanionConfig) -> T) -> T {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut config)
    }

    pub(crate) fn buffer(&self) -> MutexGuard<'_, ConversationBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn persona(config: &CompanionConfig) -> Persona {
        Persona::new(&config.bot_username, &config.streamer_name)
    }

    /// Check the gate stored under `key` using `settings`.
    pub(crate) fn acquire(&self, key: Mode, settings: &ModeConfig) -> Result<GateTicket, Denied> {
        let now = self.now();
        let mut state = self.state();
        let state = &mut *state;
        let result = state
            .gates
            .acquire(key, settings.cooldown, settings.probability, now, &mut state.rng);
        if let Err(denied) = &result {
            debug!("Gate {} refused: {:?}", key, denied);
        }
        result
    }

    /// Commit the ticket when `result` is Ok, release it otherwise.
    pub(crate) fn settle<T>(
        &self,
        ticket: GateTicket,
        result: Result<T, OrchestratorError>,
    ) -> Result<T, OrchestratorError> {
        let now = self.now();
        let mut state = self.state();
        match &result {
            Ok(_) => state.gates.commit(ticket, now),
            Err(_) => state.gates.release(ticket),
        }
        result
    }

    /// Run one completion under the configured timeout.
    pub(crate) async fn complete(&self, request: CompletionRequest) -> Result<String, OrchestratorError> {
        match tokio::time::timeout(self.brain_timeout, self.brain.complete(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(OrchestratorError::Timeout(self.brain_timeout)),
        }
    }

    /// Completion with the command system prompt and per-channel history.
    pub(crate) async fn converse(
        &self,
        command: &CommandConfig,
        history_key: &str,
        input: &str,
    ) -> Result<String, OrchestratorError> {
        let mut history = self.history.get(history_key).await;
        let keep = command.history_length * 2;
        if history.len() > keep {
            history.drain(..history.len() - keep);
        }

        let reply = self
            .complete(prompts::command(&command.system_prompt, history, input))
            .await?;
        self.history.add_exchange(history_key, input, &reply).await;
        Ok(reply)
    }

    pub(crate) async fn say(&self, channel: &str, text: &str) -> Result<(), OrchestratorError> {
        info!("[{}] Sending: {}", channel, text);
        self.transport.send(channel, text).await
    }

    /// Send a reply split into chat-sized chunks, pausing between them.
    pub(crate) async fn say_chunked(&self, channel: &str, text: &str) -> Result<usize, OrchestratorError> {
        let chunks = split_message(text);
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.chunk_delay).await;
            }
            self.say(channel, chunk).await?;
        }
        Ok(chunks.len())
    }

    /// Render `text` to audio when speech is configured. Failures are logged.
    pub(crate) async fn speak(&self, text: &str) {
        let Some(speech) = &self.speech else {
            return;
        };
        match speech.synthesize(text).await {
            Ok(path) => {
                info!("Speech written to {}", path.display());
                // No subscribers is fine.
                let _ = self.speech_updates.send(path);
            }
            Err(e) => warn!("Speech synthesis failed: {}", e),
        }
    }
}
