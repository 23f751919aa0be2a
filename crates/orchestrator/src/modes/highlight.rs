use async_trait::async_trait;
use tracing::info;

use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::InboundChat;
use crate::gate::Denied;
use crate::modes::{cooldown_notice, ExclusiveMode};
use crate::shared::Shared;

/// Messages the platform flagged as highlighted. No prefix needed.
///
/// Shares the command gate, so a highlight and a command cannot both fire
/// inside one cooldown.
pub(crate) struct HighlightMode;

#[async_trait]
impl ExclusiveMode for HighlightMode {
    fn mode(&self) -> Mode {
        Mode::Highlight
    }

    fn can_handle(&self, message: &InboundChat, config: &CompanionConfig) -> bool {
        config.highlight.enabled && message.is_highlighted
    }

    async fn handle(
        &self,
        shared: &Shared,
        message: &InboundChat,
        config: &CompanionConfig,
    ) -> Result<bool, OrchestratorError> {
        let ticket = match shared.acquire(Mode::Command, &config.highlight) {
            Ok(ticket) => ticket,
            Err(Denied::CoolingDown { remaining }) => {
                if config.command.cooldown_notice {
                    shared.say(&message.channel, &cooldown_notice(remaining)).await?;
                }
                return Ok(true);
            }
            Err(Denied::Chance) => return Ok(false),
        };

        info!("Highlighted message from {}: {}", message.author, message.text);

        let result = async {
            let reply = shared
                .converse(&config.command, &message.channel, message.text.trim())
                .await?;
            shared.say_chunked(&message.channel, &reply).await?;
            Ok::<_, OrchestratorError>(())
        }
        .await;
        shared.settle(ticket, result)?;
        Ok(true)
    }
}
