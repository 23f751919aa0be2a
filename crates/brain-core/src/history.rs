//! Per-channel exchange history.
//!
//! Keeps the last few command/answer exchanges for each chat channel so the
//! completion service sees a short running conversation. Channels are evicted
//! least-recently-used once the channel limit is reached.

use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::message::ChatTurn;

/// Default maximum number of channels to track before LRU eviction.
const DEFAULT_MAX_CHANNELS: usize = 64;

/// Bounded per-channel conversation history.
///
/// # Example
///
/// ```rust
/// use brain_core::ConversationHistory;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let history = ConversationHistory::new(5);
///
///     history.add_exchange("#stream", "hello", "hi there").await;
///     history.add_exchange("#stream", "how are you?", "great").await;
///
///     assert_eq!(history.get("#stream").await.len(), 4);
/// }
/// ```
#[derive(Debug)]
pub struct ConversationHistory {
    /// Insertion order doubles as LRU order.
    histories: RwLock<IndexMap<String, Vec<ChatTurn>>>,
    /// Maximum number of exchanges (user + assistant pairs) per channel.
    max_turns: usize,
    max_channels: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(5)
    }
}

impl ConversationHistory {
    /// Create a history keeping `max_turns` exchanges per channel.
    pub fn new(max_turns: usize) -> Self {
        Self {
            histories: RwLock::new(IndexMap::new()),
            max_turns,
            max_channels: DEFAULT_MAX_CHANNELS,
        }
    }

    /// Get the history for a channel, marking it as recently used.
    pub async fn get(&self, channel: &str) -> Vec<ChatTurn> {
        let mut histories = self.histories.write().await;

        match histories.shift_remove(channel) {
            Some(entry) => {
                let result = entry.clone();
                histories.insert(channel.to_string(), entry);
                result
            }
            None => Vec::new(),
        }
    }

    /// Record one user message and the assistant's answer.
    pub async fn add_exchange(&self, channel: &str, user_msg: &str, assistant_msg: &str) {
        if self.max_turns == 0 {
            return;
        }

        let mut histories = self.histories.write().await;
        let mut history = histories.shift_remove(channel).unwrap_or_default();

        history.push(ChatTurn::user(user_msg));
        history.push(ChatTurn::assistant(assistant_msg));

        let max_messages = self.max_turns * 2;
        if history.len() > max_messages {
            let excess = history.len() - max_messages;
            history.drain(0..excess);
        }

        histories.insert(channel.to_string(), history);

        while histories.len() > self.max_channels {
            histories.shift_remove_index(0);
        }
    }
}
