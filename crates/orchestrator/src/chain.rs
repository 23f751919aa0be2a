//! Priority-ordered arbitration over the exclusive handlers.

use tracing::{debug, warn};

use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::InboundChat;
use crate::modes::{CommandMode, EmojiMode, ExclusiveMode, HighlightMode, HypeMode, MentionMode};
use crate::shared::Shared;

pub(crate) struct ArbitrationChain {
    handlers: Vec<Box<dyn ExclusiveMode>>,
}

impl ArbitrationChain {
    /// Highlight, command, hype, mention, emoji.
    pub(crate) fn standard() -> Result<Self, OrchestratorError> {
        Ok(Self {
            handlers: vec![
                Box::new(HighlightMode),
                Box::new(CommandMode),
                Box::new(HypeMode),
                Box::new(MentionMode),
                Box::new(EmojiMode::new()?),
            ],
        })
    }

    /// Offer the message to each eligible handler in order. The first to
    /// claim it wins. A failing handler counts as not handled.
    pub(crate) async fn run(
        &self,
        shared: &Shared,
        message: &InboundChat,
        config: &CompanionConfig,
    ) -> Option<Mode> {
        for handler in &self.handlers {
            if !handler.can_handle(message, config) {
                continue;
            }
            match handler.handle(shared, message, config).await {
                Ok(true) => {
                    debug!("{} handled message from {}", handler.mode(), message.author);
                    return Some(handler.mode());
                }
                Ok(false) => continue,
                Err(e) => warn!("{} handler failed: {}", handler.mode(), e),
            }
        }
        None
    }
}
