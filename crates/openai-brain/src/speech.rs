//! Text-to-speech backed [`SpeechSynthesizer`].

use std::path::PathBuf;

use brain_core::{async_trait, BrainError, SpeechSynthesizer};
use reqwest::Client;
use tracing::info;

use crate::api_types::SpeechRequest;
use crate::config::OpenAiConfig;

/// Renders text to an mp3 file through the speech endpoint.
///
/// Every call overwrites the same file; consumers poll or serve it
/// statically.
pub struct OpenAiSpeech {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiSpeech {
    /// Create a speech backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, BrainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, BrainError> {
        let body = SpeechRequest {
            model: &self.config.speech_model,
            voice: &self.config.speech_voice,
            input: text,
        };

        let response = self
            .client
            .post(self.config.speech_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send speech request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BrainError::ProcessingFailed(format!(
                "speech API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to read speech body: {}", e)))?;

        let path = self.config.speech_path.clone();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BrainError::ProcessingFailed(format!("Failed to create audio dir: {}", e)))?;
        }
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to write audio: {}", e)))?;

        info!("Wrote {} bytes of speech to {}", audio.len(), path.display());
        Ok(path)
    }
}
