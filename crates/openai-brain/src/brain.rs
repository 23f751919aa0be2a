//! Chat-completions backed [`Brain`].

use brain_core::{async_trait, Brain, BrainError, CompletionRequest};
use reqwest::Client;
use tracing::debug;

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::OpenAiConfig;

/// A brain that calls an OpenAI-compatible chat completions endpoint.
pub struct OpenAiBrain {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBrain {
    /// Create a new brain with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, BrainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("OpenAiBrain initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Create a brain from environment variables.
    ///
    /// See [`OpenAiConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_request(&self, request: CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: request.messages,
            max_tokens: request.max_tokens.or(self.config.max_tokens),
            temperature: request.temperature.or(self.config.temperature),
        }
    }
}

#[async_trait]
impl Brain for OpenAiBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BrainError::Timeout
                } else {
                    BrainError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&error_text)
                .map(|api_error| api_error.error.message)
                .unwrap_or(error_text);

            return Err(BrainError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                detail
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        extract_text(completion)
    }

    fn name(&self) -> &str {
        "OpenAiBrain"
    }
}

fn extract_text(completion: ChatCompletionResponse) -> Result<String, BrainError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(BrainError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::ChatTurn;

    fn brain() -> OpenAiBrain {
        let config = OpenAiConfig::builder()
            .api_key("test-key")
            .max_tokens(200)
            .build();
        OpenAiBrain::new(config).unwrap()
    }

    #[test]
    fn test_request_overrides_config_defaults() {
        let request = CompletionRequest::prompt("sys", "yes or no?").max_tokens(10);
        let body = brain().build_request(request);

        assert_eq!(body.max_tokens, Some(10));
        assert_eq!(body.model, "gpt-3.5-turbo");
        assert_eq!(body.messages[0], ChatTurn::system("sys"));
    }

    #[test]
    fn test_request_falls_back_to_config_defaults() {
        let body = brain().build_request(CompletionRequest::prompt("sys", "hi"));
        assert_eq!(body.max_tokens, Some(200));
        assert!(body.temperature.is_none());
    }

    #[test]
    fn test_extract_text_trims_and_rejects_empty() {
        let ok: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "  hello chat \n"}, "finish_reason": "stop"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(ok).unwrap(), "hello chat");

        let blank: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "   "}, "finish_reason": "stop"}]}"#,
        )
        .unwrap();
        assert!(matches!(extract_text(blank), Err(BrainError::EmptyResponse)));

        let none: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(extract_text(none), Err(BrainError::EmptyResponse)));
    }

    #[test]
    fn test_brain_name() {
        assert_eq!(brain().name(), "OpenAiBrain");
    }
}
