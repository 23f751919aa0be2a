//! Mode handlers.
//!
//! Exclusive handlers implement [`ExclusiveMode`] and are tried in priority
//! order by the arbitration chain. Idle, ambient and topic run for every
//! message on their own.

use async_trait::async_trait;

use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::InboundChat;
use crate::shared::Shared;

mod ambient;
mod command;
mod emoji;
mod highlight;
mod hype;
mod idle;
mod mention;
mod topic;

pub(crate) use ambient::AmbientMode;
pub(crate) use command::CommandMode;
pub(crate) use emoji::EmojiMode;
pub(crate) use highlight::HighlightMode;
pub(crate) use hype::HypeMode;
pub use idle::IdleAction;
pub(crate) use idle::IdleMode;
pub(crate) use mention::MentionMode;
pub(crate) use topic::TopicMode;

/// A handler that claims a message for itself.
#[async_trait]
pub(crate) trait ExclusiveMode: Send + Sync {
    fn mode(&self) -> Mode;

    /// Cheap synchronous eligibility test. No side effects.
    fn can_handle(&self, message: &InboundChat, config: &CompanionConfig) -> bool;

    /// Act on the message. `Ok(true)` claims it and stops the chain.
    async fn handle(
        &self,
        shared: &Shared,
        message: &InboundChat,
        config: &CompanionConfig,
    ) -> Result<bool, OrchestratorError>;
}

/// `Cooldown active. Please wait 4.2 seconds before sending another message.`
pub(crate) fn cooldown_notice(remaining: std::time::Duration) -> String {
    format!(
        "Cooldown active. Please wait {:.1} seconds before sending another message.",
        remaining.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cooldown_notice_format() {
        assert_eq!(
            cooldown_notice(Duration::from_millis(4_240)),
            "Cooldown active. Please wait 4.2 seconds before sending another message."
        );
        assert_eq!(
            cooldown_notice(Duration::from_secs(10)),
            "Cooldown active. Please wait 10.0 seconds before sending another message."
        );
    }
}
