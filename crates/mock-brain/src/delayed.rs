//! Slow completion backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use brain_core::{async_trait, Brain, BrainError, CompletionRequest};

/// Holds every completion for a fixed latency before handing it to `inner`.
///
/// Tracks how many completions are waiting at once, so tests can check that
/// generation never overlaps where it must not.
pub struct DelayedBrain<B> {
    inner: B,
    latency: Duration,
    waiting: AtomicUsize,
    peak: AtomicUsize,
}

impl<B: Brain> DelayedBrain<B> {
    pub fn with_secs(inner: B, secs: u64) -> Self {
        Self {
            inner,
            latency: Duration::from_secs(secs),
            waiting: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Largest number of completions that were waiting at the same time.
    pub fn peak_overlap(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Decrements the waiting count even when the caller drops the future.
struct Waiting<'a>(&'a AtomicUsize);

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<B: Brain> Brain for DelayedBrain<B> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        let now_waiting = self.waiting.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_waiting, Ordering::SeqCst);
        let _waiting = Waiting(&self.waiting);

        tokio::time::sleep(self.latency).await;
        self.inner.complete(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_ready(&self) -> bool {
        self.inner.is_ready().await
    }
}
