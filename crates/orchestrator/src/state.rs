//! In-memory runtime state. Reset on restart.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::Instant;

use crate::gate::{CommitPolicy, GateTable};

/// Tracks the current stretch of chat silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilenceState {
    last_message_at: Instant,
    last_story_at: Option<Instant>,
    story_told: bool,
}

impl SilenceState {
    pub fn new(now: Instant) -> Self {
        Self {
            last_message_at: now,
            last_story_at: None,
            story_told: false,
        }
    }

    /// A message ends the silence.
    pub fn on_message(&mut self, now: Instant) {
        self.last_message_at = now;
        self.story_told = false;
    }

    /// At most one story per silence, and not more often than `story_interval`.
    pub fn story_due(&self, now: Instant, min_silence: Duration, story_interval: Duration) -> bool {
        if self.story_told {
            return false;
        }
        if now.saturating_duration_since(self.last_message_at) < min_silence {
            return false;
        }
        match self.last_story_at {
            Some(at) => now.saturating_duration_since(at) >= story_interval,
            None => true,
        }
    }

    /// Record a story told for the silence that began at `silence_started`.
    ///
    /// A message that arrived while the story was generated starts a new
    /// silence, which keeps its own story.
    pub fn mark_story(&mut self, now: Instant, silence_started: Instant) {
        self.last_story_at = Some(now);
        if self.last_message_at == silence_started {
            self.story_told = true;
        }
    }

    pub fn reset_story_flag(&mut self) {
        self.story_told = false;
    }

    pub fn story_told(&self) -> bool {
        self.story_told
    }

    pub fn last_message_at(&self) -> Instant {
        self.last_message_at
    }

    pub fn last_story_at(&self) -> Option<Instant> {
        self.last_story_at
    }
}

/// Round-robin over the hype replies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HypeRotation {
    last_index: Option<usize>,
}

impl HypeRotation {
    /// Next reply. Never repeats the previous one while more than one exists.
    pub fn next<'a>(&mut self, commands: &'a [String]) -> Option<&'a str> {
        if commands.is_empty() {
            return None;
        }
        let index = match self.last_index {
            Some(last) => (last + 1) % commands.len(),
            None => 0,
        };
        self.last_index = Some(index);
        commands.get(index).map(String::as_str)
    }
}

/// Everything handlers mutate between dispatches.
#[derive(Debug)]
pub struct RuntimeState {
    pub gates: GateTable,
    pub silence: SilenceState,
    pub hype: HypeRotation,
    /// Buffered messages since ambient or idle last replied.
    pub messages_since_response: usize,
    /// Newest message seen by the last idle answer.
    pub questions_answered_until: Option<Instant>,
    pub topics: Vec<String>,
    pub rng: StdRng,
}

impl RuntimeState {
    pub fn new(policy: CommitPolicy, now: Instant, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            gates: GateTable::new(policy),
            silence: SilenceState::new(now),
            hype: HypeRotation::default(),
            messages_since_response: 0,
            questions_answered_until: None,
            topics: Vec::new(),
            rng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_SILENCE: Duration = Duration::from_secs(60);
    const INTERVAL: Duration = Duration::from_secs(180);

    #[test]
    fn test_one_story_per_silence() {
        let t0 = Instant::now();
        let mut silence = SilenceState::new(t0);

        assert!(!silence.story_due(t0 + Duration::from_secs(59), MIN_SILENCE, INTERVAL));
        let t1 = t0 + MIN_SILENCE;
        assert!(silence.story_due(t1, MIN_SILENCE, INTERVAL));

        silence.mark_story(t1, t0);
        assert!(silence.story_told());
        assert!(!silence.story_due(t1 + Duration::from_secs(600), MIN_SILENCE, INTERVAL));
    }

    #[test]
    fn test_message_resets_flag_but_interval_holds() {
        let t0 = Instant::now();
        let mut silence = SilenceState::new(t0);
        let story_at = t0 + MIN_SILENCE;
        silence.mark_story(story_at, t0);

        let msg_at = story_at + Duration::from_secs(10);
        silence.on_message(msg_at);
        assert!(!silence.story_told());

        // Silent long enough again, but too soon after the last story.
        assert!(!silence.story_due(msg_at + MIN_SILENCE, MIN_SILENCE, INTERVAL));
        assert!(silence.story_due(story_at + INTERVAL, MIN_SILENCE, INTERVAL));
    }

    #[test]
    fn test_late_story_keeps_new_silence_open() {
        let t0 = Instant::now();
        let mut silence = SilenceState::new(t0);
        let started = silence.last_message_at();

        // A message lands while the story is still being generated.
        let msg_at = t0 + MIN_SILENCE + Duration::from_secs(1);
        silence.on_message(msg_at);
        let story_at = msg_at + Duration::from_secs(4);
        silence.mark_story(story_at, started);

        assert!(!silence.story_told());
        assert_eq!(silence.last_story_at(), Some(story_at));
        assert!(silence.story_due(story_at + INTERVAL, MIN_SILENCE, INTERVAL));
    }

    #[test]
    fn test_hype_rotation_never_repeats() {
        let commands: Vec<String> = ["!a", "!b", "!c"].iter().map(|s| s.to_string()).collect();
        let mut rotation = HypeRotation::default();

        let picks: Vec<_> = (0..7).map(|_| rotation.next(&commands).unwrap().to_string()).collect();
        assert_eq!(picks, vec!["!a", "!b", "!c", "!a", "!b", "!c", "!a"]);
        for pair in picks.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_hype_rotation_edge_cases() {
        let mut rotation = HypeRotation::default();
        assert_eq!(rotation.next(&[]), None);

        let single = vec!["!only".to_string()];
        assert_eq!(rotation.next(&single), Some("!only"));
        assert_eq!(rotation.next(&single), Some("!only"));

        // A shorter list after a change still yields a valid index.
        let mut rotation = HypeRotation::default();
        let long: Vec<String> = (0..5).map(|i| format!("!{}", i)).collect();
        for _ in 0..4 {
            rotation.next(&long);
        }
        let short = vec!["!x".to_string(), "!y".to_string()];
        assert!(rotation.next(&short).is_some());
    }
}
