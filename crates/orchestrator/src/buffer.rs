//! Bounded conversation buffer shared by the mode handlers.

use std::collections::VecDeque;

use tokio::time::Instant;

/// Default number of messages kept.
pub const DEFAULT_BUFFER_CAPACITY: usize = 20;

/// One chat line as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: String,
    pub text: String,
    pub received_at: Instant,
}

impl ChatMessage {
    pub fn new(author: impl Into<String>, text: impl Into<String>, received_at: Instant) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            received_at,
        }
    }
}

/// FIFO of the most recent chat messages.
///
/// Only message intake appends; handlers read suffix slices through
/// [`ConversationBuffer::recent`].
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl Default for ConversationBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl ConversationBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a message, evicting the oldest when full.
    pub fn append(&mut self, message: ChatMessage) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// The last `n` messages in arrival order. `n` clamps to the buffer size.
    pub fn recent(&self, n: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Render messages as `author: text` lines for prompts.
pub fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.author, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(i: usize) -> ChatMessage {
        ChatMessage::new(format!("user{}", i), format!("message {}", i), Instant::now())
    }

    #[test]
    fn test_buffer_keeps_newest_in_order() {
        let mut buffer = ConversationBuffer::default();
        for i in 0..25 {
            buffer.append(msg(i));
        }

        assert_eq!(buffer.len(), 20);
        let all = buffer.recent(100);
        let texts: Vec<_> = all.iter().map(|m| m.text.as_str()).collect();
        let expected: Vec<_> = (5..25).map(|i| format!("message {}", i)).collect();
        assert_eq!(texts, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_recent_returns_suffix() {
        let mut buffer = ConversationBuffer::default();
        for i in 0..8 {
            buffer.append(msg(i));
        }

        let last = buffer.recent(5);
        assert_eq!(last.len(), 5);
        assert_eq!(last[0].text, "message 3");
        assert_eq!(last[4].text, "message 7");
        // Reading does not consume.
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn test_recent_clamps_and_handles_empty() {
        let mut buffer = ConversationBuffer::new(3);
        assert!(buffer.recent(5).is_empty());
        assert!(buffer.is_empty());

        buffer.append(msg(1));
        assert_eq!(buffer.recent(10).len(), 1);
        assert!(buffer.recent(0).is_empty());
    }

    #[test]
    fn test_transcript_format() {
        let now = Instant::now();
        let messages = vec![
            ChatMessage::new("alice", "hi", now),
            ChatMessage::new("bob", "yo", now),
        ];
        assert_eq!(transcript(&messages), "alice: hi\nbob: yo");
        assert_eq!(transcript(&[]), "");
    }
}
