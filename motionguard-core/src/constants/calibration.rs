//! Calibration and Hysteresis Constants

/// Samples collected to build a baseline.
///
/// At the DMP's batch rate this is a few seconds of data, long enough to
/// average out FIFO jitter without delaying detection after boot.
pub const BASELINE_SAMPLES: u16 = 50;

/// Maximum entries read from the DMP FIFO per interrupt.
pub const FIFO_BATCH_SIZE: usize = 5;

/// Net-motion counter value above which a quiet device re-learns its
/// baseline.
pub const MOTION_HYSTERESIS_TRIGGER: u16 = 30;

/// Material-movement samples tolerated before forcing recalibration.
///
/// Once the debounce counter is past this value, the next material sample
/// invalidates the baseline.
pub const CALIBRATION_DEBOUNCE_LIMIT: u16 = 15;

/// Gravity bias removed from the world-frame vertical axis (g).
pub const GRAVITY_G: f32 = 1.0;

/// Scale of the DMP's Q30 fixed-point quaternion (2^30).
pub const Q30_SCALE: f32 = 1_073_741_824.0;
