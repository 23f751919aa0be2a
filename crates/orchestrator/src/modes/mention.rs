use async_trait::async_trait;
use tracing::info;

use crate::buffer::transcript;
use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::InboundChat;
use crate::modes::ExclusiveMode;
use crate::prompts;
use crate::shared::Shared;

/// Messages recent enough to give a mention some context.
const CONTEXT_MESSAGES: usize = 5;

/// Reacts when someone talks about the streamer.
pub(crate) struct MentionMode;

impl MentionMode {
    fn mentions_streamer(text: &str, config: &CompanionConfig) -> bool {
        let lower = text.to_lowercase();
        config
            .mention
            .names
            .iter()
            .any(|n| !n.is_empty() && lower.contains(&n.to_lowercase()))
    }
}

#[async_trait]
impl ExclusiveMode for MentionMode {
    fn mode(&self) -> Mode {
        Mode::Mention
    }

    fn can_handle(&self, message: &InboundChat, config: &CompanionConfig) -> bool {
        config.mention.mode.enabled && Self::mentions_streamer(&message.text, config)
    }

    async fn handle(
        &self,
        shared: &Shared,
        message: &InboundChat,
        config: &CompanionConfig,
    ) -> Result<bool, OrchestratorError> {
        let Ok(ticket) = shared.acquire(Mode::Mention, &config.mention.mode) else {
            return Ok(false);
        };

        let context = transcript(&shared.buffer().recent(CONTEXT_MESSAGES));
        let request = prompts::mention(
            &Shared::persona(config),
            &message.author,
            &message.text,
            &context,
        );

        let result = async {
            let reply = shared.complete(request).await?;
            info!("Streamer mention by {}, replying: {}", message.author, reply);
            shared.say_chunked(&message.channel, &reply).await?;
            Ok::<_, OrchestratorError>(())
        }
        .await;
        shared.settle(ticket, result)?;
        Ok(true)
    }
}
