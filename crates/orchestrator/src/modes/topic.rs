//! Topic tracking: keep a short list of what chat is talking about.

use tracing::info;

use crate::buffer::transcript;
use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::prompts;
use crate::shared::Shared;

pub(crate) struct TopicMode;

impl TopicMode {
    /// Returns true when the stored topics were replaced.
    pub(crate) async fn check(
        &self,
        shared: &Shared,
        config: &CompanionConfig,
    ) -> Result<bool, OrchestratorError> {
        let settings = &config.topic;
        if !settings.mode.enabled {
            return Ok(false);
        }

        let recent = {
            let buffer = shared.buffer();
            if buffer.len() < settings.min_messages {
                return Ok(false);
            }
            buffer.recent(settings.window)
        };
        let Ok(ticket) = shared.acquire(Mode::Topic, &settings.mode) else {
            return Ok(false);
        };

        let result = shared.complete(prompts::topics(&transcript(&recent))).await;
        let reply = shared.settle(ticket, result)?;

        let topics = prompts::parse_topics(&reply);
        if topics.is_empty() {
            return Ok(false);
        }
        info!("Chat topics: {}", topics.join(", "));
        shared.state().topics = topics;
        Ok(true)
    }
}
