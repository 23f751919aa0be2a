//! Mock completion backends for exercising the orchestrator without a network.
//!
//! This crate provides mock implementations of the `Brain` trait for testing:
//! - `EchoBrain` - Echoes the last user turn back
//! - `ScriptedBrain` - Answers by substring rules and records every request
//! - `FailingBrain` - Always errors
//! - `DelayedBrain` - Adds fixed latency and counts overlapping calls
//!
//! Plus `RecordingSpeech`, a `SpeechSynthesizer` that only remembers its input.
//!
//! For production processing, use the `openai-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, CompletionRequest, ScriptedBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = ScriptedBrain::new("fallback").when("yes or no", "yes");
//!
//!     let request = CompletionRequest::prompt("judge", "Answer yes or no: is this on topic?");
//!     assert_eq!(brain.complete(request).await?, "yes");
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;
mod scripted;
mod speech;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, ChatTurn, CompletionRequest, SpeechSynthesizer};

pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use failing::FailingBrain;
pub use scripted::ScriptedBrain;
pub use speech::RecordingSpeech;
