//! Ambient mode: join a lively conversation when the model agrees it fits.

use tracing::{debug, info};

use crate::buffer::transcript;
use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::prompts;
use crate::shared::Shared;

pub(crate) struct AmbientMode;

impl AmbientMode {
    pub(crate) async fn check(
        &self,
        shared: &Shared,
        config: &CompanionConfig,
        channel: &str,
    ) -> Result<bool, OrchestratorError> {
        let settings = &config.ambient;
        if !settings.mode.enabled {
            return Ok(false);
        }

        // Phase 1: local checks only.
        let since = shared.state().messages_since_response;
        if since < settings.min_messages {
            return Ok(false);
        }
        let Ok(ticket) = shared.acquire(Mode::Ambient, &settings.mode) else {
            return Ok(false);
        };

        // Phase 2: ask whether to speak, then what to say.
        let context = transcript(&shared.buffer().recent(settings.window));
        let verdict = match shared.complete(prompts::relevance(&context)).await {
            Ok(verdict) => verdict,
            Err(e) => return shared.settle(ticket, Err(e)),
        };
        if !prompts::is_affirmative(&verdict) {
            debug!("Relevance check said no: {}", verdict.trim());
            shared.state().gates.release(ticket);
            return Ok(false);
        }

        let result = async {
            let reply = shared
                .complete(prompts::contextual(&Shared::persona(config), &context))
                .await?;
            info!("Joining the conversation: {}", reply);
            shared.say_chunked(channel, &reply).await?;
            Ok::<_, OrchestratorError>(())
        }
        .await;
        shared.settle(ticket, result)?;

        shared.state().messages_since_response = 0;
        Ok(true)
    }
}
