//! Time management for the motion engine
//!
//! The core never reads a clock itself. Everything that needs "now" takes a
//! [`Timestamp`], and the runtime side supplies one through [`TimeSource`]:
//! - Board tick counter (firmware)
//! - Runtime monotonic clock (the tokio engine)

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Milliseconds elapsed from `earlier` to `later`, zero if the clock went backwards
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// True once strictly more than `window_ms` has passed since `since`
///
/// Mirrors the firmware's `millis() > since + window` checks without the
/// overflow of the addition.
pub fn window_elapsed(since: Timestamp, now: Timestamp, window_ms: u64) -> bool {
    elapsed_ms(since, now) > window_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_strict() {
        assert!(!window_elapsed(1000, 2500, 1500));
        assert!(window_elapsed(1000, 2501, 1500));
        // Clock going backwards never counts as elapsed
        assert!(!window_elapsed(5000, 1000, 0));
    }
}
