//! Constants for MotionGuard Core
//!
//! Centralised, documented constants for the motion engine. Units are part
//! of every name.
//!
//! ## Organization
//!
//! - **Thresholds**: default delta thresholds and material-movement bounds
//! - **Timing**: loop cadences, lock timeouts and recalibration windows
//! - **Calibration**: sample counts, hysteresis limits and fixed-point scales
//! - **Filter**: vibration-energy band-pass parameters

/// Default delta thresholds for classification.
pub mod thresholds;

/// Cadences, bounded waits and recalibration windows.
pub mod timing;

/// Baseline sampling and hysteresis limits.
pub mod calibration;

/// Band-pass filter and energy buffer parameters.
pub mod filter;

pub use thresholds::{
    DEFAULT_ACCEL_X_G, DEFAULT_ACCEL_Y_G, DEFAULT_ACCEL_Z_G,
    DEFAULT_ROLL_DEG, DEFAULT_PITCH_DEG, DEFAULT_YAW_DEG,
    DEFAULT_WOM_THRESHOLD_MG,
};

pub use timing::{
    BRIDGE_POLL_MS, CLASSIFIER_PERIOD_MS, QUIET_WINDOW_MS, MIN_BASELINE_AGE_MS,
};

pub use calibration::{
    BASELINE_SAMPLES, FIFO_BATCH_SIZE, MOTION_HYSTERESIS_TRIGGER,
    CALIBRATION_DEBOUNCE_LIMIT,
};
