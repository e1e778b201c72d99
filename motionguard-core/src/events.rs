//! Sticky motion events
//!
//! ## Overview
//!
//! The classifier runs every few tens of milliseconds; the device main loop
//! polls much less often and may be asleep when motion happens. Flags are
//! therefore *sticky*: once set they stay set until the reader consumes
//! them with [`MotionEvent::take`], which returns everything accumulated
//! since the previous take and clears the event in the same step.
//!
//! ```text
//! classifier:  x ── roll ─────────── yaw ──────
//! reader:                 take()            take()
//!                         {x, roll}         {yaw}
//! ```
//!
//! The `interrupt` flag records a hardware wake-on-motion interrupt. In DMP
//! mode the interrupt does not set any axis flag by itself; the delta
//! comparison against the baseline is authoritative.

use crate::time::Timestamp;

/// Which deltas exceeded their thresholds for one sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisFlags {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub roll: bool,
    pub pitch: bool,
    pub yaw: bool,
}

impl AxisFlags {
    /// Any axis or angle flagged
    pub const fn any(&self) -> bool {
        self.x || self.y || self.z || self.roll || self.pitch || self.yaw
    }

    /// Set-union of two flag sets
    pub const fn union(self, other: Self) -> Self {
        Self {
            x: self.x || other.x,
            y: self.y || other.y,
            z: self.z || other.z,
            roll: self.roll || other.roll,
            pitch: self.pitch || other.pitch,
            yaw: self.yaw || other.yaw,
        }
    }
}

/// Motion accumulated since the last read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionEvent {
    /// Hardware wake-on-motion interrupt fired
    pub interrupt: bool,
    /// Per-axis and per-angle sticky flags
    pub axes: AxisFlags,
    /// Time of the most recent flagging sample or interrupt, 0 if none
    pub timestamp: Timestamp,
}

impl MotionEvent {
    /// Anything detected at all
    pub const fn detected(&self) -> bool {
        self.interrupt || self.axes.any()
    }

    /// Accumulate axis flags from one sample
    ///
    /// Flags only ever turn on here. The timestamp advances to `at` when at
    /// least one flag is set; it never moves backwards.
    pub fn record(&mut self, flags: AxisFlags, at: Timestamp) {
        if flags.any() {
            self.axes = self.axes.union(flags);
            self.timestamp = self.timestamp.max(at);
        }
    }

    /// Record a wake-on-motion interrupt
    pub fn record_interrupt(&mut self, at: Timestamp) {
        self.interrupt = true;
        self.timestamp = self.timestamp.max(at);
    }

    /// Read and clear in one step
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

/// Sticky event plus the last-moved time, read and written together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionState {
    pub event: MotionEvent,
    /// Time of the most recent detected motion
    pub last_moved: Timestamp,
}

impl MotionState {
    pub fn new(now: Timestamp) -> Self {
        Self { event: MotionEvent::default(), last_moved: now }
    }

    /// Record flagged axes and advance `last_moved`
    pub fn record_motion(&mut self, flags: AxisFlags, at: Timestamp) {
        if flags.any() {
            self.event.record(flags, at);
            self.last_moved = self.last_moved.max(at);
        }
    }

    /// Record a wake-on-motion interrupt and advance `last_moved`
    pub fn record_interrupt(&mut self, at: Timestamp) {
        self.event.record_interrupt(at);
        self.last_moved = self.last_moved.max(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accumulate_until_taken() {
        let mut event = MotionEvent::default();
        event.record(AxisFlags { x: true, ..AxisFlags::default() }, 100);
        event.record(AxisFlags { roll: true, ..AxisFlags::default() }, 200);
        // A quiet sample does not clear or move the timestamp
        event.record(AxisFlags::default(), 300);

        let taken = event.take();
        assert!(taken.detected());
        assert!(taken.axes.x && taken.axes.roll);
        assert!(!taken.axes.yaw);
        assert_eq!(taken.timestamp, 200);

        let again = event.take();
        assert!(!again.detected());
        assert_eq!(again, MotionEvent::default());
    }

    #[test]
    fn interrupt_alone_is_detected() {
        let mut event = MotionEvent::default();
        event.record_interrupt(42);
        assert!(event.detected());
        assert!(!event.axes.any());
        assert_eq!(event.timestamp, 42);
    }

    #[test]
    fn last_moved_never_goes_back() {
        let mut state = MotionState::new(1000);
        state.record_motion(AxisFlags { z: true, ..AxisFlags::default() }, 900);
        assert_eq!(state.last_moved, 1000);
        state.record_interrupt(1500);
        assert_eq!(state.last_moved, 1500);
        state.record_motion(AxisFlags::default(), 2000);
        assert_eq!(state.last_moved, 1500);
    }

    #[test]
    fn late_batch_keeps_newer_interrupt_time() {
        // Batch captured at 90 is classified after the interrupt at 100
        let mut state = MotionState::new(0);
        state.record_interrupt(100);
        state.record_motion(AxisFlags { roll: true, ..AxisFlags::default() }, 90);

        assert_eq!(state.event.timestamp, 100);
        assert_eq!(state.last_moved, 100);
        let event = state.event.take();
        assert!(event.interrupt && event.axes.roll);
    }

    #[test]
    fn union_is_or() {
        let a = AxisFlags { x: true, yaw: true, ..AxisFlags::default() };
        let b = AxisFlags { y: true, yaw: true, ..AxisFlags::default() };
        let u = a.union(b);
        assert!(u.x && u.y && u.yaw);
        assert!(!u.z && !u.roll && !u.pitch);
    }
}
