//! Timing Constants
//!
//! Cadences and bounded waits for the interrupt bridge, calibration routine
//! and classifier loop. All values in milliseconds.

// ===== LOOP CADENCES =====

/// Interrupt bridge poll cadence (ms).
///
/// Upper bound on how long a raised interrupt waits before the bridge
/// services it, and how long shutdown waits for the bridge to notice.
pub const BRIDGE_POLL_MS: u64 = 25;

/// Classifier loop cadence (ms).
pub const CLASSIFIER_PERIOD_MS: u64 = 50;

/// Back-off after a failed calibration attempt (ms).
pub const CALIBRATION_RETRY_MS: u64 = 500;

/// Calibration sleep-poll interval while waiting for a DMP sample (ms).
pub const CALIBRATION_POLL_MS: u64 = 30;

/// Longest a single calibration sample is waited for (ms).
///
/// The DMP delivers several batches per second; two seconds of silence
/// means the FIFO interrupt stopped.
pub const CALIBRATION_SAMPLE_TIMEOUT_MS: u64 = 2000;

// ===== LOCK TIMEOUTS =====

/// Bus lock timeout for the bridge and FIFO resets (ms).
pub const BUS_LOCK_TIMEOUT_MS: u64 = 10;

/// Latest-sample slot lock timeout (ms).
pub const SLOT_LOCK_TIMEOUT_MS: u64 = 30;

/// Motion state lock timeout for the WOM callback (ms).
pub const WOM_LOCK_TIMEOUT_MS: u64 = 15;

/// Motion state lock timeout for getters and the classifier (ms).
pub const STATE_LOCK_TIMEOUT_MS: u64 = 30;

/// Grace period for worker tasks to exit on shutdown (ms).
///
/// Tasks still running after this are aborted at their next await point.
pub const SHUTDOWN_GRACE_MS: u64 = 100;

// ===== RECALIBRATION POLICY =====

/// Quiet window before a periodic baseline reset is considered (ms).
pub const QUIET_WINDOW_MS: u64 = 1500;

/// Minimum baseline age before a periodic reset (ms).
pub const MIN_BASELINE_AGE_MS: u64 = 15_000;
