use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::config::{CompanionConfig, Mode};
use crate::error::OrchestratorError;
use crate::event::InboundChat;
use crate::modes::ExclusiveMode;
use crate::shared::Shared;

/// Unicode pictographs plus `:)`-style emoticons.
const EMOJI_PATTERN: &str = r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}]|[:;8][-']?[)(\[\]DPpOo]";

/// Emotes recognised in chat, matched case-insensitively. The first
/// [`REPLY_POOL`] are also used as replies.
const EMOTES: &[&str] = &[
    "LUL",
    "KEKW",
    "Pog",
    "PogChamp",
    "OMEGALUL",
    "MonkaS",
    "Pepega",
    "FeelsGoodMan",
    "FeelsBadMan",
    "Sadge",
    "Copium",
    "EZ",
    "5Head",
    "PepeHands",
    "Clap",
    "TriHard",
    "KappaPride",
    "SeemsGood",
    "BlessRNG",
    "NotLikeThis",
    "Kappa",
    "PogU",
    "widepeepoHappy",
    "POGGERS",
    "monkaW",
    "PepeLaugh",
    "WeirdChamp",
    "ResidentSleeper",
    "CmonBruh",
    "WutFace",
];

const REPLY_POOL: usize = 20;

/// Answers emoji-heavy chat with a few emotes. No completion call.
pub(crate) struct EmojiMode {
    pattern: Regex,
}

impl EmojiMode {
    pub(crate) fn new() -> Result<Self, OrchestratorError> {
        let pattern = Regex::new(EMOJI_PATTERN)
            .map_err(|e| OrchestratorError::Config(format!("invalid emoji pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    fn contains_emoji(&self, text: &str) -> bool {
        if self.pattern.is_match(text) {
            return true;
        }
        let lower = text.to_lowercase();
        EMOTES.iter().any(|e| lower.contains(&e.to_lowercase()))
    }

    /// One to three distinct emotes joined by spaces.
    fn pick_reply<R: Rng + ?Sized>(rng: &mut R) -> String {
        let count = rng.gen_range(1..=3);
        EMOTES[..REPLY_POOL]
            .choose_multiple(rng, count)
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl ExclusiveMode for EmojiMode {
    fn mode(&self) -> Mode {
        Mode::Emoji
    }

    fn can_handle(&self, message: &InboundChat, config: &CompanionConfig) -> bool {
        config.emoji.enabled && self.contains_emoji(&message.text)
    }

    async fn handle(
        &self,
        shared: &Shared,
        message: &InboundChat,
        config: &CompanionConfig,
    ) -> Result<bool, OrchestratorError> {
        let Ok(ticket) = shared.acquire(Mode::Emoji, &config.emoji) else {
            return Ok(false);
        };

        let reply = Self::pick_reply(&mut shared.state().rng);
        let result = shared.say(&message.channel, &reply).await;
        shared.settle(ticket, result)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_detects_unicode_emoticons_and_emotes() {
        let mode = EmojiMode::new().unwrap();

        assert!(mode.contains_emoji("that was great 😂"));
        assert!(mode.contains_emoji("rocket 🚀"));
        assert!(mode.contains_emoji("sunny ☀ day"));
        assert!(mode.contains_emoji("nice :)"));
        assert!(mode.contains_emoji("wink ;-D"));
        assert!(mode.contains_emoji("kekw that was bad"));
        assert!(mode.contains_emoji("POGGERS"));

        assert!(!mode.contains_emoji("just a normal sentence"));
        assert!(!mode.contains_emoji(""));
    }

    #[test]
    fn test_can_handle_respects_enabled() {
        let mode = EmojiMode::new().unwrap();
        let mut config = CompanionConfig::new("bot", ["#chan"]);
        let message = InboundChat::new("#chan", "a", "LUL");

        assert!(!mode.can_handle(&message, &config));
        config.emoji.enabled = true;
        assert!(mode.can_handle(&message, &config));
    }

    #[test]
    fn test_reply_uses_one_to_three_pool_emotes() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let reply = EmojiMode::pick_reply(&mut rng);
            let tokens: Vec<_> = reply.split(' ').collect();
            assert!((1..=3).contains(&tokens.len()), "{}", reply);
            for token in &tokens {
                assert!(EMOTES[..REPLY_POOL].contains(token), "{}", token);
            }
            let mut unique = tokens.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), tokens.len());
        }
    }
}
