use async_trait::async_trait;
use tracing::info;

use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::InboundChat;
use crate::gate::Denied;
use crate::modes::{cooldown_notice, ExclusiveMode};
use crate::shared::Shared;

/// `!gpt <question>` style commands answered by the completion service.
pub(crate) struct CommandMode;

impl CommandMode {
    /// The configured prefix the message starts with, compared case-insensitively.
    fn matched_prefix<'a>(text: &str, config: &'a CompanionConfig) -> Option<&'a str> {
        let lower = text.to_lowercase();
        config
            .command
            .prefixes
            .iter()
            .find(|p| !p.is_empty() && lower.starts_with(&p.to_lowercase()))
            .map(String::as_str)
    }

    fn completion_input(message: &InboundChat, prefix: &str, config: &CompanionConfig) -> String {
        let rest = message
            .text
            .char_indices()
            .nth(prefix.chars().count())
            .map(|(i, _)| &message.text[i..])
            .unwrap_or("")
            .trim();

        if config.command.send_username {
            format!("Message from user {}: {}", message.author, rest)
        } else {
            rest.to_string()
        }
    }
}

#[async_trait]
impl ExclusiveMode for CommandMode {
    fn mode(&self) -> Mode {
        Mode::Command
    }

    fn can_handle(&self, message: &InboundChat, config: &CompanionConfig) -> bool {
        config.command.mode.enabled && Self::matched_prefix(&message.text, config).is_some()
    }

    async fn handle(
        &self,
        shared: &Shared,
        message: &InboundChat,
        config: &CompanionConfig,
    ) -> Result<bool, OrchestratorError> {
        let Some(prefix) = Self::matched_prefix(&message.text, config) else {
            return Ok(false);
        };

        let ticket = match shared.acquire(Mode::Command, &config.command.mode) {
            Ok(ticket) => ticket,
            Err(Denied::CoolingDown { remaining }) => {
                if config.command.cooldown_notice {
                    shared.say(&message.channel, &cooldown_notice(remaining)).await?;
                }
                return Ok(true);
            }
            Err(Denied::Chance) => return Ok(false),
        };

        let input = Self::completion_input(message, prefix, config);
        info!("Command from {}: {}", message.author, input);

        let result = async {
            let reply = shared.converse(&config.command, &message.channel, &input).await?;
            shared.say_chunked(&message.channel, &reply).await?;
            Ok::<_, OrchestratorError>(reply)
        }
        .await;
        let reply = shared.settle(ticket, result)?;

        if config.command.speech {
            shared.speak(&reply).await;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CompanionConfig {
        let mut config = CompanionConfig::new("bot", ["#chan"]);
        config.command.prefixes = vec!["!gpt".to_string(), "!ask".to_string()];
        config
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let config = config();
        let mode = CommandMode;

        assert!(mode.can_handle(&InboundChat::new("#chan", "a", "!ASK what"), &config));
        assert!(mode.can_handle(&InboundChat::new("#chan", "a", "!gpt"), &config));
        assert!(!mode.can_handle(&InboundChat::new("#chan", "a", "hey !gpt"), &config));

        let mut disabled = config.clone();
        disabled.command.mode.enabled = false;
        assert!(!mode.can_handle(&InboundChat::new("#chan", "a", "!gpt hi"), &disabled));
    }

    #[test]
    fn test_completion_input() {
        let mut config = config();
        let message = InboundChat::new("#chan", "alice", "!Ask   what time is it ");
        assert_eq!(
            CommandMode::completion_input(&message, "!ask", &config),
            "Message from user alice: what time is it"
        );

        config.command.send_username = false;
        assert_eq!(
            CommandMode::completion_input(&message, "!ask", &config),
            "what time is it"
        );

        let bare = InboundChat::new("#chan", "alice", "!ask");
        assert_eq!(CommandMode::completion_input(&bare, "!ask", &config), "");
    }
}
