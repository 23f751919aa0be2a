//! Core traits and types for completion backends.
//!
//! Every language task the companion performs (command replies, relevance
//! judgments, idle stories, topic extraction) goes through a [`Brain`]. This
//! crate defines:
//!
//! - [`Brain`] - request/response completion service
//! - [`SpeechSynthesizer`] - optional text-to-speech backend
//! - [`ChatTurn`] / [`CompletionRequest`] - the request payload
//! - [`ConversationHistory`] - bounded per-channel exchange history
//! - [`BrainError`] - error type shared by all backends
//!
//! # Example
//!
//! ```rust
//! use brain_core::{async_trait, Brain, BrainError, CompletionRequest};
//!
//! struct Parrot;
//!
//! #[async_trait]
//! impl Brain for Parrot {
//!     async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
//!         Ok(request.last_user_content().unwrap_or_default().to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Parrot"
//!     }
//! }
//! ```

mod error;
mod history;
mod message;
mod trait_def;

pub use error::BrainError;
pub use history::ConversationHistory;
pub use message::{ChatTurn, CompletionRequest};
pub use trait_def::{Brain, SpeechSynthesizer};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
