use async_trait::async_trait;

use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::InboundChat;
use crate::modes::ExclusiveMode;
use crate::shared::Shared;

/// Echoes hype keywords back, rotating through the configured list.
pub(crate) struct HypeMode;

impl HypeMode {
    fn mentions_hype(text: &str, config: &CompanionConfig) -> bool {
        let lower = text.to_lowercase();
        config
            .hype
            .commands
            .iter()
            .any(|c| !c.is_empty() && lower.contains(&c.to_lowercase()))
    }
}

#[async_trait]
impl ExclusiveMode for HypeMode {
    fn mode(&self) -> Mode {
        Mode::Hype
    }

    fn can_handle(&self, message: &InboundChat, config: &CompanionConfig) -> bool {
        config.hype.mode.enabled && Self::mentions_hype(&message.text, config)
    }

    async fn handle(
        &self,
        shared: &Shared,
        message: &InboundChat,
        config: &CompanionConfig,
    ) -> Result<bool, OrchestratorError> {
        let Ok(ticket) = shared.acquire(Mode::Hype, &config.hype.mode) else {
            return Ok(false);
        };

        let reply = shared.state().hype.next(&config.hype.commands).map(String::from);
        let result = match reply {
            Some(reply) => shared.say(&message.channel, &reply).await,
            None => Err(OrchestratorError::Config("no hype commands configured".to_string())),
        };
        shared.settle(ticket, result)?;
        Ok(true)
    }
}
