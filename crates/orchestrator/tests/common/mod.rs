#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use mock_brain::Brain;
use orchestrator::{CompanionConfig, InboundChat, ManualClock, Orchestrator, RecordingTransport};

pub const CHANNEL: &str = "#gigasnail";

pub fn config() -> CompanionConfig {
    CompanionConfig::new("gigarob0t", [CHANNEL])
}

pub fn msg(author: &str, text: &str) -> InboundChat {
    InboundChat::new(CHANNEL, author, text)
}

/// Orchestrator on a manual clock with instant chunk sends.
pub fn manual(
    config: CompanionConfig,
    brain: Arc<dyn Brain>,
) -> (Orchestrator, Arc<RecordingTransport>, ManualClock) {
    let transport = Arc::new(RecordingTransport::new());
    let clock = ManualClock::new();
    let orchestrator = Orchestrator::builder(config, brain, transport.clone())
        .clock(Arc::new(clock.clone()))
        .rng_seed(7)
        .chunk_delay(Duration::ZERO)
        .build()
        .unwrap();
    (orchestrator, transport, clock)
}

/// Orchestrator on the tokio clock, for tests with paused time.
pub fn tokio_clock(
    config: CompanionConfig,
    brain: Arc<dyn Brain>,
) -> (Orchestrator, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let orchestrator = Orchestrator::builder(config, brain, transport.clone())
        .rng_seed(7)
        .build()
        .unwrap();
    (orchestrator, transport)
}
