//! A brain that never succeeds.

use std::sync::atomic::{AtomicUsize, Ordering};

use brain_core::{async_trait, Brain, BrainError, CompletionRequest};

/// Fails every request with [`BrainError::ProcessingFailed`].
#[derive(Debug, Default)]
pub struct FailingBrain {
    calls: AtomicUsize,
}

impl FailingBrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BrainError::ProcessingFailed("scripted failure".to_string()))
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }
}
