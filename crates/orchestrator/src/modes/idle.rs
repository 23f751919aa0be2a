//! Idle-silence mode: a story when chat goes quiet, and answers to open
//! questions.

use regex::Regex;
use tracing::{debug, info};

use crate::buffer::{transcript, ChatMessage};
use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::prompts;
use crate::shared::Shared;

const QUESTION_PATTERN: &str = r"(?i)\?|\b(what|why|how|when|where|who|can|should|would|could)\b";

/// Messages scanned for an open question.
const QUESTION_WINDOW: usize = 5;

/// What an idle check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleAction {
    Story,
    Answer,
}

pub(crate) struct IdleMode {
    question: Regex,
}

impl IdleMode {
    pub(crate) fn new() -> Result<Self, OrchestratorError> {
        let question = Regex::new(QUESTION_PATTERN)
            .map_err(|e| OrchestratorError::Config(format!("invalid question pattern: {}", e)))?;
        Ok(Self { question })
    }

    pub(crate) fn is_question(&self, text: &str) -> bool {
        self.question.is_match(text)
    }

    /// Run both branches. Called per message and by the idle timer.
    pub(crate) async fn check(
        &self,
        shared: &Shared,
        config: &CompanionConfig,
        channel: &str,
    ) -> Result<Option<IdleAction>, OrchestratorError> {
        if !config.idle.mode.enabled {
            return Ok(None);
        }

        if self.tell_story(shared, config, channel).await? {
            return Ok(Some(IdleAction::Story));
        }
        if self.answer_question(shared, config, channel).await? {
            return Ok(Some(IdleAction::Answer));
        }
        Ok(None)
    }

    /// Single-flight: a second caller skips while a story is being told.
    async fn tell_story(
        &self,
        shared: &Shared,
        config: &CompanionConfig,
        channel: &str,
    ) -> Result<bool, OrchestratorError> {
        let Ok(_flight) = shared.story_flight.try_lock() else {
            debug!("Story already in flight");
            return Ok(false);
        };

        let now = shared.now();
        let silence_started = {
            let state = shared.state();
            let due = state
                .silence
                .story_due(now, config.idle.min_silence, config.idle.story_interval);
            if !due {
                return Ok(false);
            }
            state.silence.last_message_at()
        };

        let story = shared.complete(prompts::story(&Shared::persona(config))).await?;
        info!("Chat is quiet, telling a story: {}", story);
        shared.say_chunked(channel, &story).await?;

        let now = shared.now();
        shared.state().silence.mark_story(now, silence_started);
        Ok(true)
    }

    /// Answer the first unanswered question among the last few messages.
    async fn answer_question(
        &self,
        shared: &Shared,
        config: &CompanionConfig,
        channel: &str,
    ) -> Result<bool, OrchestratorError> {
        let recent = shared.buffer().recent(QUESTION_WINDOW);
        let answered_until = shared.state().questions_answered_until;
        let Some(question) = self.first_open_question(&recent, answered_until) else {
            return Ok(false);
        };

        let Ok(ticket) = shared.acquire(Mode::Idle, &config.idle.mode) else {
            return Ok(false);
        };

        debug!("Answering question from {}: {}", question.author, question.text);
        let request = prompts::contextual(&Shared::persona(config), &transcript(&recent));
        let result = async {
            let reply = shared.complete(request).await?;
            info!("Answering idle question: {}", reply);
            shared.say_chunked(channel, &reply).await?;
            Ok::<_, OrchestratorError>(())
        }
        .await;
        shared.settle(ticket, result)?;

        let mut state = shared.state();
        state.questions_answered_until = recent.last().map(|m| m.received_at);
        state.messages_since_response = 0;
        Ok(true)
    }

    fn first_open_question<'a>(
        &self,
        recent: &'a [ChatMessage],
        answered_until: Option<tokio::time::Instant>,
    ) -> Option<&'a ChatMessage> {
        recent
            .iter()
            .filter(|m| answered_until.map_or(true, |at| m.received_at > at))
            .find(|m| self.is_question(&m.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    #[test]
    fn test_question_markers() {
        let idle = IdleMode::new().unwrap();

        assert!(idle.is_question("is this the final boss?"));
        assert!(idle.is_question("What game is next"));
        assert!(idle.is_question("anyone know how to beat him"));
        assert!(idle.is_question("COULD be worse"));

        assert!(!idle.is_question("gg"));
        assert!(!idle.is_question("somehow that worked"));
        assert!(!idle.is_question("whatever"));
    }

    #[test]
    fn test_first_open_question_skips_answered() {
        let idle = IdleMode::new().unwrap();
        let t0 = Instant::now();
        let recent = vec![
            ChatMessage::new("a", "why is he so good", t0),
            ChatMessage::new("b", "lol", t0 + Duration::from_secs(1)),
            ChatMessage::new("c", "when is the next stream?", t0 + Duration::from_secs(2)),
        ];

        assert_eq!(idle.first_open_question(&recent, None).unwrap().author, "a");
        assert_eq!(
            idle.first_open_question(&recent, Some(t0)).unwrap().author,
            "c"
        );
        assert!(idle
            .first_open_question(&recent, Some(t0 + Duration::from_secs(2)))
            .is_none());
    }
}
