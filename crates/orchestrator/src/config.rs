//! Companion configuration: per-mode settings plus the master switch.
//!
//! The orchestrator owns one [`CompanionConfig`]. Handlers read a snapshot
//! per dispatch; only the control setters on the orchestrator mutate it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;
use crate::gate::CommitPolicy;

/// Default command prefix.
pub const DEFAULT_COMMAND_PREFIX: &str = "!gpt";

/// System prompt used when no context file is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful Twitch Chatbot.";

/// Hype keywords used when `HYPE_COMMANDS` is unset.
pub const DEFAULT_HYPE_COMMANDS: &[&str] = &[
    "!hype",
    "!riot",
    "!riot2",
    "!chels",
    "!rendan",
    "!holunka",
    "!snailarmy",
    "!riot3",
];

/// Names that count as a streamer mention when `STREAMER_NAMES` is unset.
pub const DEFAULT_STREAMER_NAMES: &[&str] = &["gigasnail", "giga"];

/// A behavioural mode of the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Highlight,
    Command,
    Hype,
    Mention,
    Emoji,
    Idle,
    Ambient,
    Topic,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Highlight,
        Mode::Command,
        Mode::Hype,
        Mode::Mention,
        Mode::Emoji,
        Mode::Idle,
        Mode::Ambient,
        Mode::Topic,
    ];

    /// Path segment used by the control surface (`/api/<route>/status`).
    pub fn route_name(&self) -> &'static str {
        match self {
            Mode::Highlight => "highlight",
            Mode::Command => "command",
            Mode::Hype => "hype-mode",
            Mode::Mention => "streamer-mention",
            Mode::Emoji => "emoji-react",
            Mode::Idle => "afk-mode",
            Mode::Ambient => "auto-chat",
            Mode::Topic => "topic-tracking",
        }
    }

    pub fn from_route(route: &str) -> Option<Mode> {
        Mode::ALL.into_iter().find(|m| m.route_name() == route)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_name())
    }
}

impl FromStr for Mode {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::from_route(s).ok_or_else(|| OrchestratorError::UnknownMode(s.to_string()))
    }
}

/// Settings every mode has.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeConfig {
    pub enabled: bool,
    pub cooldown: Duration,
    /// Chance in `[0, 1]` that a passed cooldown actually fires.
    pub probability: f64,
}

impl ModeConfig {
    pub fn new(enabled: bool, cooldown: Duration, probability: f64) -> Self {
        Self {
            enabled,
            cooldown,
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandConfig {
    pub mode: ModeConfig,
    /// Matched case-insensitively at the start of a message.
    pub prefixes: Vec<String>,
    /// Prepend `Message from user <author>: ` to the completion input.
    pub send_username: bool,
    /// Reply with the remaining cooldown instead of staying silent.
    pub cooldown_notice: bool,
    pub speech: bool,
    pub system_prompt: String,
    /// Command exchanges kept per channel.
    pub history_length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HypeConfig {
    pub mode: ModeConfig,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MentionConfig {
    pub mode: ModeConfig,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdleConfig {
    /// Cooldown and probability apply to question answers only.
    pub mode: ModeConfig,
    pub story_interval: Duration,
    pub min_silence: Duration,
    pub check_interval: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientConfig {
    pub mode: ModeConfig,
    pub min_messages: usize,
    pub window: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicConfig {
    pub mode: ModeConfig,
    pub min_messages: usize,
    pub window: usize,
}

/// Everything the orchestrator needs to decide and phrase replies.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionConfig {
    /// Bot login. Messages from it are ignored.
    pub bot_username: String,
    /// Channels the bot sits in. The idle timer talks in the first.
    pub channels: Vec<String>,
    /// How prompts refer to the streamer.
    pub streamer_name: String,
    /// Master switch.
    pub bot_enabled: bool,
    pub commit_policy: CommitPolicy,
    pub command: CommandConfig,
    /// Highlighted messages share the command gate.
    pub highlight: ModeConfig,
    pub hype: HypeConfig,
    pub mention: MentionConfig,
    pub emoji: ModeConfig,
    pub idle: IdleConfig,
    pub ambient: AmbientConfig,
    pub topic: TopicConfig,
}

impl CompanionConfig {
    /// Defaults: command mode on, everything else off.
    pub fn new<I, S>(bot_username: impl Into<String>, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let streamer_names: Vec<String> =
            DEFAULT_STREAMER_NAMES.iter().map(|s| s.to_string()).collect();

        Self {
            bot_username: bot_username.into().to_lowercase(),
            channels: channels.into_iter().map(Into::into).collect(),
            streamer_name: streamer_names.first().map(|n| display_name(n)).unwrap_or_default(),
            bot_enabled: true,
            commit_policy: CommitPolicy::Lazy,
            command: CommandConfig {
                mode: ModeConfig::new(true, Duration::from_secs(10), 1.0),
                prefixes: vec![DEFAULT_COMMAND_PREFIX.to_string()],
                send_username: true,
                cooldown_notice: true,
                speech: false,
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
                history_length: 5,
            },
            highlight: ModeConfig::new(false, Duration::from_secs(10), 1.0),
            hype: HypeConfig {
                mode: ModeConfig::new(false, Duration::from_secs(5), 1.0),
                commands: DEFAULT_HYPE_COMMANDS.iter().map(|s| s.to_string()).collect(),
            },
            mention: MentionConfig {
                mode: ModeConfig::new(false, Duration::ZERO, 1.0),
                names: streamer_names,
            },
            emoji: ModeConfig::new(false, Duration::from_secs(10), 0.15),
            idle: IdleConfig {
                mode: ModeConfig::new(false, Duration::from_secs(30), 0.5),
                story_interval: Duration::from_secs(180),
                min_silence: Duration::from_secs(60),
                check_interval: Duration::from_secs(30),
            },
            ambient: AmbientConfig {
                mode: ModeConfig::new(false, Duration::from_secs(300), 0.15),
                min_messages: 5,
                window: 10,
            },
            topic: TopicConfig {
                mode: ModeConfig::new(false, Duration::from_secs(60), 1.0),
                min_messages: 10,
                window: 10,
            },
        }
    }

    /// Load from the process environment and read the command context file.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        let mut config = Self::from_vars(|key| std::env::var(key).ok())?;

        let path = std::env::var("FILE_CONTEXT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./file_context.txt"));
        match std::fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => config.command.system_prompt = text,
            Ok(_) => {}
            Err(e) => tracing::warn!(
                "Could not read context file {}: {}, using default prompt",
                path.display(),
                e
            ),
        }

        Ok(config)
    }

    /// Build from a variable lookup. `TWITCH_USER` and `CHANNELS` are required.
    pub fn from_vars<F>(lookup: F) -> Result<Self, OrchestratorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let bot_username = vars
            .string("TWITCH_USER")
            .ok_or_else(|| OrchestratorError::Config("TWITCH_USER not set".to_string()))?;
        let channels = vars
            .list("CHANNELS")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| OrchestratorError::Config("CHANNELS not set".to_string()))?;

        let mut config = Self::new(bot_username, channels);

        if let Some(policy) = vars.string("GATE_COMMIT_POLICY") {
            config.commit_policy = policy.parse()?;
        }
        config.bot_enabled = vars.bool("BOT_ENABLED", true)?;

        let command_cooldown = vars.secs("COOLDOWN_DURATION", 10)?;
        if let Some(prefixes) = vars.list("COMMAND_NAME").filter(|p| !p.is_empty()) {
            config.command.prefixes = prefixes;
        }
        config.command.mode.cooldown = command_cooldown;
        config.command.send_username = vars.bool("SEND_USERNAME", true)?;
        config.command.speech = vars.bool("ENABLE_TTS", false)?;
        config.command.history_length = vars.parse("HISTORY_LENGTH", 5)?;

        config.highlight.enabled = vars.bool("ENABLE_CHANNEL_POINTS", false)?;
        config.highlight.cooldown = command_cooldown;

        config.hype.mode.enabled = vars.bool("ENABLE_HYPE_MODE", false)?;
        if let Some(commands) = vars.list("HYPE_COMMANDS").filter(|c| !c.is_empty()) {
            config.hype.commands = commands;
        }

        config.mention.mode.enabled = vars.bool("ENABLE_STREAMER_MENTION", false)?;
        if let Some(names) = vars.list("STREAMER_NAMES").filter(|n| !n.is_empty()) {
            config.mention.names = names.into_iter().map(|n| n.to_lowercase()).collect();
        }
        config.streamer_name = vars
            .string("STREAMER_DISPLAY_NAME")
            .or_else(|| config.mention.names.first().map(|n| display_name(n)))
            .unwrap_or_default();

        config.emoji = ModeConfig::new(
            vars.bool("ENABLE_EMOJI_REACT", false)?,
            vars.secs("EMOJI_REACT_COOLDOWN", 10)?,
            vars.parse("EMOJI_REACT_PROBABILITY", 0.15)?,
        );

        config.idle.mode.enabled = vars.bool("ENABLE_AFK_MODE", false)?;
        config.idle.mode.cooldown = vars.secs("AFK_QUESTION_COOLDOWN", 30)?;
        config.idle.story_interval = vars.secs("AFK_STORY_INTERVAL", 180)?;
        config.idle.min_silence = vars.secs("AFK_MIN_SILENCE", 60)?;
        config.idle.check_interval = vars.secs("AFK_CHECK_INTERVAL", 30)?.max(Duration::from_secs(1));

        config.ambient.mode = ModeConfig::new(
            vars.bool("ENABLE_AUTO_CHAT", false)?,
            vars.secs("AUTO_CHAT_COOLDOWN", 300)?,
            vars.parse("AUTO_CHAT_PROBABILITY", 0.15)?,
        );
        config.ambient.min_messages = vars.parse("AUTO_CHAT_MIN_MESSAGES", 5)?;

        config.topic.mode.enabled = vars.bool("ENABLE_TOPIC_TRACKING", false)?;
        config.topic.mode.cooldown = vars.secs("TOPIC_COOLDOWN", 60)?;

        Ok(config)
    }

    pub fn mode(&self, mode: Mode) -> &ModeConfig {
        match mode {
            Mode::Highlight => &self.highlight,
            Mode::Command => &self.command.mode,
            Mode::Hype => &self.hype.mode,
            Mode::Mention => &self.mention.mode,
            Mode::Emoji => &self.emoji,
            Mode::Idle => &self.idle.mode,
            Mode::Ambient => &self.ambient.mode,
            Mode::Topic => &self.topic.mode,
        }
    }

    pub fn mode_mut(&mut self, mode: Mode) -> &mut ModeConfig {
        match mode {
            Mode::Highlight => &mut self.highlight,
            Mode::Command => &mut self.command.mode,
            Mode::Hype => &mut self.hype.mode,
            Mode::Mention => &mut self.mention.mode,
            Mode::Emoji => &mut self.emoji,
            Mode::Idle => &mut self.idle.mode,
            Mode::Ambient => &mut self.ambient.mode,
            Mode::Topic => &mut self.topic.mode,
        }
    }

    /// Channel used for unprompted messages.
    pub fn home_channel(&self) -> Option<&str> {
        self.channels.first().map(String::as_str)
    }
}

/// `gigasnail` -> `Gigasnail`.
fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.string(key).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }

    fn bool(&self, key: &str, default: bool) -> Result<bool, OrchestratorError> {
        match self.string(key) {
            None => Ok(default),
            Some(v) => match v.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(OrchestratorError::Config(format!(
                    "{} must be true or false, got '{}'",
                    key, v
                ))),
            },
        }
    }

    fn parse<T: FromStr>(&self, key: &str, default: T) -> Result<T, OrchestratorError> {
        match self.string(key) {
            None => Ok(default),
            Some(v) => v
                .parse()
                .map_err(|_| OrchestratorError::Config(format!("{} has invalid value '{}'", key, v))),
        }
    }

    fn secs(&self, key: &str, default: u64) -> Result<Duration, OrchestratorError> {
        self.parse(key, default).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_mode_routes_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_route(mode.route_name()), Some(mode));
        }
        assert_eq!("auto-chat".parse::<Mode>().unwrap(), Mode::Ambient);
        assert!("bot".parse::<Mode>().is_err());
    }

    #[test]
    fn test_defaults_from_minimal_vars() {
        let config =
            CompanionConfig::from_vars(lookup(&[("TWITCH_USER", "GigaRob0t"), ("CHANNELS", "gigasnail")]))
                .unwrap();

        assert_eq!(config.bot_username, "gigarob0t");
        assert_eq!(config.channels, vec!["gigasnail"]);
        assert_eq!(config.streamer_name, "Gigasnail");
        assert!(config.bot_enabled);
        assert_eq!(config.commit_policy, CommitPolicy::Lazy);
        assert_eq!(config.command.prefixes, vec!["!gpt"]);
        assert_eq!(config.command.mode.cooldown, Duration::from_secs(10));
        assert!(config.command.mode.enabled);
        assert!(!config.highlight.enabled);
        assert_eq!(config.hype.commands.len(), 8);
        assert_eq!(config.hype.mode.cooldown, Duration::from_secs(5));
        assert_eq!(config.emoji.probability, 0.15);
        assert_eq!(config.idle.story_interval, Duration::from_secs(180));
        assert_eq!(config.idle.min_silence, Duration::from_secs(60));
        assert_eq!(config.idle.mode.probability, 0.5);
        assert_eq!(config.ambient.mode.cooldown, Duration::from_secs(300));
        assert_eq!(config.ambient.min_messages, 5);
        assert_eq!(config.topic.min_messages, 10);
        assert_eq!(config.home_channel(), Some("gigasnail"));
    }

    #[test]
    fn test_overrides() {
        let config = CompanionConfig::from_vars(lookup(&[
            ("TWITCH_USER", "bot"),
            ("CHANNELS", "a, b"),
            ("COMMAND_NAME", "!ask,!gpt"),
            ("SEND_USERNAME", "false"),
            ("COOLDOWN_DURATION", "3"),
            ("ENABLE_CHANNEL_POINTS", "true"),
            ("ENABLE_AUTO_CHAT", "TRUE"),
            ("AUTO_CHAT_PROBABILITY", "2.5"),
            ("STREAMER_NAMES", "Snail, Giga"),
            ("STREAMER_DISPLAY_NAME", "The Snail"),
            ("GATE_COMMIT_POLICY", "eager"),
            ("BOT_ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.channels, vec!["a", "b"]);
        assert_eq!(config.command.prefixes, vec!["!ask", "!gpt"]);
        assert!(!config.command.send_username);
        assert_eq!(config.command.mode.cooldown, Duration::from_secs(3));
        assert_eq!(config.highlight.cooldown, Duration::from_secs(3));
        assert!(config.highlight.enabled);
        assert!(config.ambient.mode.enabled);
        assert_eq!(config.ambient.mode.probability, 1.0);
        assert_eq!(config.mention.names, vec!["snail", "giga"]);
        assert_eq!(config.streamer_name, "The Snail");
        assert_eq!(config.commit_policy, CommitPolicy::Eager);
        assert!(!config.bot_enabled);
    }

    #[test]
    fn test_missing_required_vars() {
        let err = CompanionConfig::from_vars(lookup(&[("CHANNELS", "a")])).unwrap_err();
        assert!(err.to_string().contains("TWITCH_USER"));

        let err = CompanionConfig::from_vars(lookup(&[("TWITCH_USER", "bot"), ("CHANNELS", " , ")]))
            .unwrap_err();
        assert!(err.to_string().contains("CHANNELS"));
    }

    #[test]
    fn test_malformed_values_are_errors() {
        let base = [("TWITCH_USER", "bot"), ("CHANNELS", "a")];

        let mut vars = base.to_vec();
        vars.push(("ENABLE_AFK_MODE", "maybe"));
        assert!(CompanionConfig::from_vars(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("AFK_MIN_SILENCE", "soon"));
        assert!(CompanionConfig::from_vars(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("GATE_COMMIT_POLICY", "whenever"));
        assert!(CompanionConfig::from_vars(lookup(&vars)).is_err());
    }

    #[test]
    fn test_mode_accessors() {
        let mut config = CompanionConfig::new("bot", ["chan"]);
        config.mode_mut(Mode::Topic).enabled = true;
        assert!(config.mode(Mode::Topic).enabled);
        assert!(config.topic.mode.enabled);
        assert!(!config.mode(Mode::Emoji).enabled);
    }
}
