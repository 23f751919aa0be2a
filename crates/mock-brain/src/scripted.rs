//! Rule-driven brain that records what it was asked.

use std::sync::atomic::{AtomicUsize, Ordering};

use brain_core::{async_trait, Brain, BrainError, CompletionRequest};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail,
}

/// Answers each request with the first rule whose needle appears in any
/// turn of the request, or the fallback when none match.
///
/// Every request is kept so tests can assert on prompts and sampling
/// parameters afterwards.
#[derive(Debug)]
pub struct ScriptedBrain {
    rules: Vec<(String, Reply)>,
    fallback: Reply,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedBrain {
    /// Create a brain that answers `fallback` to everything.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Reply::Text(fallback.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a brain whose fallback is an error.
    pub fn failing_by_default() -> Self {
        Self {
            fallback: Reply::Fail,
            ..Self::new("")
        }
    }

    /// Answer `reply` when `needle` appears in the request.
    pub fn when(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Text(reply.into())));
        self
    }

    /// Fail when `needle` appears in the request.
    pub fn fail_when(mut self, needle: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Fail));
        self
    }

    /// Number of requests seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every request seen so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of recorded requests containing `needle`.
    pub async fn calls_matching(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|request| mentions(request, needle))
            .count()
    }

    fn pick(&self, request: &CompletionRequest) -> &Reply {
        self.rules
            .iter()
            .find(|(needle, _)| mentions(request, needle))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.fallback)
    }
}

fn mentions(request: &CompletionRequest, needle: &str) -> bool {
    request.messages.iter().any(|turn| turn.content.contains(needle))
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.pick(&request).clone();
        self.requests.lock().await.push(request);

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail => Err(BrainError::ProcessingFailed("scripted failure".to_string())),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let brain = ScriptedBrain::new("fallback")
            .when("story", "once upon a time")
            .when("yes or no", "no");

        let story = brain
            .complete(CompletionRequest::prompt("tell a story", "go"))
            .await
            .unwrap();
        let judged = brain
            .complete(CompletionRequest::prompt("judge", "yes or no?"))
            .await
            .unwrap();
        let other = brain
            .complete(CompletionRequest::prompt("sys", "hi"))
            .await
            .unwrap();

        assert_eq!(story, "once upon a time");
        assert_eq!(judged, "no");
        assert_eq!(other, "fallback");
        assert_eq!(brain.calls(), 3);
    }

    #[tokio::test]
    async fn test_fail_rules_and_recording() {
        let brain = ScriptedBrain::new("ok").fail_when("boom");

        assert!(brain
            .complete(CompletionRequest::prompt("sys", "boom").max_tokens(5))
            .await
            .is_err());

        let requests = brain.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, Some(5));
        assert_eq!(brain.calls_matching("boom").await, 1);
        assert_eq!(brain.calls_matching("absent").await, 0);
    }

    #[tokio::test]
    async fn test_failing_by_default() {
        let brain = ScriptedBrain::failing_by_default().when("safe", "fine");
        assert_eq!(
            brain
                .complete(CompletionRequest::prompt("s", "safe"))
                .await
                .unwrap(),
            "fine"
        );
        assert!(brain
            .complete(CompletionRequest::prompt("s", "other"))
            .await
            .is_err());
    }
}
