//! Configuration for the OpenAI backend.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use brain_core::BrainError;

/// Default location the speech backend writes to.
pub const DEFAULT_SPEECH_PATH: &str = "./public/file.mp3";

/// Configuration shared by [`crate::OpenAiBrain`] and [`crate::OpenAiSpeech`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base API URL (without `/v1`).
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Chat model name.
    pub model: String,

    /// Default max tokens when a request does not set one.
    pub max_tokens: Option<u32>,

    /// Default temperature when a request does not set one.
    pub temperature: Option<f32>,

    /// Per-request HTTP timeout.
    pub timeout: Duration,

    /// Speech model name.
    pub speech_model: String,

    /// Speech voice.
    pub speech_voice: String,

    /// Where rendered speech is written.
    pub speech_path: PathBuf,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: None,
            temperature: None,
            timeout: Duration::from_secs(30),
            speech_model: "tts-1".to_string(),
            speech_voice: "alloy".to_string(),
            speech_path: PathBuf::from(DEFAULT_SPEECH_PATH),
        }
    }
}

impl OpenAiConfig {
    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `OPENAI_API_KEY`
    ///
    /// Optional:
    /// - `OPENAI_API_URL` (default: https://api.openai.com)
    /// - `MODEL_NAME` (default: gpt-3.5-turbo)
    /// - `OPENAI_MAX_TOKENS`
    /// - `OPENAI_TEMPERATURE`
    /// - `OPENAI_TIMEOUT_SECS` (default: 30)
    /// - `TTS_MODEL` (default: tts-1)
    /// - `TTS_VOICE` (default: alloy)
    /// - `TTS_OUTPUT_PATH` (default: ./public/file.mp3)
    pub fn from_env() -> Result<Self, BrainError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BrainError::Configuration("OPENAI_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("OPENAI_API_URL").unwrap_or(defaults.api_url);
        let model = env::var("MODEL_NAME").unwrap_or(defaults.model);

        let max_tokens = env::var("OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok());

        let temperature = env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok());

        let timeout = env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let speech_model = env::var("TTS_MODEL").unwrap_or(defaults.speech_model);
        let speech_voice = env::var("TTS_VOICE").unwrap_or(defaults.speech_voice);
        let speech_path = env::var("TTS_OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.speech_path);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
            timeout,
            speech_model,
            speech_voice,
            speech_path,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OpenAiConfigBuilder {
        OpenAiConfigBuilder::default()
    }

    /// Chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'))
    }

    /// Speech endpoint.
    pub fn speech_url(&self) -> String {
        format!("{}/v1/audio/speech", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for [`OpenAiConfig`].
#[derive(Debug, Default)]
pub struct OpenAiConfigBuilder {
    config: OpenAiConfig,
}

impl OpenAiConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn speech_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.speech_path = path.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenAiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAiConfig::default();

        assert_eq!(config.api_url, "https://api.openai.com");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.max_tokens.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.speech_path, PathBuf::from("./public/file.mp3"));
    }

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        let config = OpenAiConfig::builder()
            .api_url("http://localhost:9999/")
            .build();

        assert_eq!(
            config.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
        assert_eq!(config.speech_url(), "http://localhost:9999/v1/audio/speech");
    }

    #[test]
    fn test_builder_all_options() {
        let config = OpenAiConfig::builder()
            .api_key("my-key")
            .model("gpt-4o-mini")
            .max_tokens(256)
            .temperature(0.4)
            .timeout(Duration::from_secs(5))
            .speech_path("/tmp/out.mp3")
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, Some(256));
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.speech_path, PathBuf::from("/tmp/out.mp3"));
    }

    // Env vars are process-global, so all env scenarios live in one test.
    #[test]
    fn test_from_env_scenarios() {
        fn clear_all() {
            for key in [
                "OPENAI_API_KEY",
                "OPENAI_API_URL",
                "MODEL_NAME",
                "OPENAI_MAX_TOKENS",
                "OPENAI_TEMPERATURE",
                "OPENAI_TIMEOUT_SECS",
            ] {
                std::env::remove_var(key);
            }
        }

        clear_all();
        match OpenAiConfig::from_env() {
            Err(BrainError::Configuration(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("expected configuration error, got {:?}", other),
        }

        std::env::set_var("OPENAI_API_KEY", "env-key");
        std::env::set_var("MODEL_NAME", "gpt-4o");
        std::env::set_var("OPENAI_MAX_TOKENS", "300");
        std::env::set_var("OPENAI_TIMEOUT_SECS", "12");

        let config = OpenAiConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, Some(300));
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.api_url, "https://api.openai.com");

        clear_all();
    }
}
