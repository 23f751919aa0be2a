//! Speech backend that records its input instead of rendering audio.

use std::path::PathBuf;

use brain_core::{async_trait, BrainError, SpeechSynthesizer};
use tokio::sync::Mutex;

/// Remembers every text it was asked to speak.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts synthesized so far, oldest first.
    pub async fn spoken(&self) -> Vec<String> {
        self.spoken.lock().await.clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeech {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, BrainError> {
        self.spoken.lock().await.push(text.to_string());
        Ok(PathBuf::from("./public/file.mp3"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_text() {
        let speech = RecordingSpeech::new();
        let path = speech.synthesize("hello chat").await.unwrap();
        assert_eq!(path, PathBuf::from("./public/file.mp3"));
        assert_eq!(speech.spoken().await, vec!["hello chat".to_string()]);
    }
}
