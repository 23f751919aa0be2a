//! OpenAI-compatible backend for the chat companion.
//!
//! Provides [`OpenAiBrain`], a [`Brain`] that talks to any
//! `/v1/chat/completions` endpoint, and [`OpenAiSpeech`], a
//! [`SpeechSynthesizer`] backed by `/v1/audio/speech`.
//!
//! ```rust,no_run
//! use openai_brain::OpenAiBrain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = OpenAiBrain::from_env()?;
//!     // hand the brain to the orchestrator...
//!     # let _ = brain;
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;
mod speech;

pub use brain::OpenAiBrain;
pub use config::{OpenAiConfig, OpenAiConfigBuilder};
pub use speech::OpenAiSpeech;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, ChatTurn, CompletionRequest, SpeechSynthesizer};
