//! Message response orchestrator for the chat companion.
//!
//! This crate provides the [`Orchestrator`] type which decides, for every
//! inbound chat message, whether and how the companion answers.
//!
//! # Features
//!
//! - Bounded conversation buffer shared by all modes
//! - Per-mode cooldown and probability gates with a lazy or eager commit policy
//! - Priority arbitration over the exclusive modes
//! - Idle stories behind a single-flight guard, driven by messages and a timer
//! - Runtime toggles for every mode plus a master switch
//!
//! # Architecture
//!
//! ```text
//! ChatEvent::Message (from the transport)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Ingest: append to buffer, reset silence                 │
//! │         ↓                                                   │
//! │  2. Arbitration chain (first claim wins):                   │
//! │     highlight → command → hype → mention → emoji            │
//! │         ↓                                                   │
//! │  3. Independent checks, each failure isolated:              │
//! │     idle silence │ ambient relevance │ topic extraction     │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑
//!   Idle timer (every AFK_CHECK_INTERVAL)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{CompanionConfig, InboundChat, LoggingTransport, Orchestrator};
//!
//! let config = CompanionConfig::from_env()?;
//! let orchestrator = Orchestrator::builder(config, brain, Arc::new(LoggingTransport)).build()?;
//! let _timer = orchestrator.spawn_idle_timer();
//!
//! orchestrator
//!     .handle_message(InboundChat::new("#gigasnail", "alice", "!gpt what time is it"))
//!     .await;
//! ```

mod buffer;
mod chain;
mod clock;
mod config;
mod error;
mod event;
mod formatting;
mod gate;
mod modes;
mod orchestrator;
mod prompts;
mod shared;
mod state;
mod transport;

pub use buffer::{transcript, ChatMessage, ConversationBuffer, DEFAULT_BUFFER_CAPACITY};
pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{
    AmbientConfig, CommandConfig, CompanionConfig, HypeConfig, IdleConfig, MentionConfig, Mode,
    ModeConfig, TopicConfig, DEFAULT_COMMAND_PREFIX, DEFAULT_HYPE_COMMANDS, DEFAULT_STREAMER_NAMES,
    DEFAULT_SYSTEM_PROMPT,
};
pub use error::OrchestratorError;
pub use event::{ChatEvent, InboundChat};
pub use formatting::{split_message, MAX_CHUNK_CHARS};
pub use gate::{try_acquire, CommitPolicy, CooldownState, Denied, GateTable, GateTicket};
pub use modes::IdleAction;
pub use orchestrator::{DispatchOutcome, ModeStatus, Orchestrator, OrchestratorBuilder};
pub use prompts::Persona;
pub use state::{HypeRotation, RuntimeState, SilenceState};
pub use transport::{ChatTransport, LoggingTransport, NoOpTransport, RecordingTransport, SentMessage};
