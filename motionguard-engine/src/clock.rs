//! Monotonic engine clock

use motionguard_core::{TimeSource, Timestamp};
use tokio::time::Instant;

/// Milliseconds since the engine was created
///
/// Built on the runtime's clock, so paused-time tests advance it
/// deterministically.
#[derive(Debug, Clone, Copy)]
pub struct EngineClock {
    epoch: Instant,
}

impl EngineClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for EngineClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for EngineClock {
    fn now(&self) -> Timestamp {
        self.epoch.elapsed().as_millis() as Timestamp
    }
}
