//! Twitch chat client.
//!
//! Speaks Twitch's IRC dialect over `wss://irc-ws.chat.twitch.tv` and
//! supports:
//!
//! - Authenticating with an OAuth token pulled fresh on every connect
//! - Joining channels and sending `PRIVMSG`s
//! - Receiving parsed chat messages with tags (highlighted messages, display names)
//! - Automatic reconnection with exponential backoff
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use twitch_chat::{ChatConfig, ChatEvent, StaticToken, TwitchClient};
//!
//! # async fn example() -> Result<(), twitch_chat::ChatError> {
//! let config = ChatConfig::new("companion_bot", ["#somechannel"]);
//! let tokens = Arc::new(StaticToken::new("oauth:abc123"));
//!
//! let (client, mut events) = TwitchClient::spawn(config, tokens);
//! while let Some(event) = events.recv().await {
//!     if let ChatEvent::Message(msg) = event {
//!         println!("{}: {}", msg.author, msg.text);
//!         client.say(&msg.channel, "hello!").await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod irc;
pub mod reconnect;
pub mod token;

pub use client::{ChatEvent, TwitchClient};
pub use config::{normalize_channel, ChatConfig, DEFAULT_SERVER_URL};
pub use error::ChatError;
pub use irc::{IrcLine, PrivMsg};
pub use reconnect::ReconnectConfig;
pub use token::{StaticToken, TokenProvider};
