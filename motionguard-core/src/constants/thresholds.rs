//! Default Classification Thresholds
//!
//! Compiled defaults used when the settings store has no value for a key.
//! Tuned on a vehicle-mounted MPU-6500 running the DMP at its default rate.

// ===== LINEAR ACCELERATION (g) =====

/// Default world-frame X delta threshold (g).
///
/// ~0.0075 g is roughly 0.07 m/s², below a door closing but above the
/// DMP's resting noise floor.
pub const DEFAULT_ACCEL_X_G: f32 = 0.0075;

/// Default world-frame Y delta threshold (g).
pub const DEFAULT_ACCEL_Y_G: f32 = 0.0075;

/// Default world-frame Z delta threshold (g).
///
/// Slightly looser than X/Y: the vertical axis carries the gravity
/// subtraction residual.
pub const DEFAULT_ACCEL_Z_G: f32 = 0.0085;

// ===== ORIENTATION (degrees) =====

/// Default roll delta threshold (degrees).
pub const DEFAULT_ROLL_DEG: f32 = 0.5;

/// Default pitch delta threshold (degrees).
pub const DEFAULT_PITCH_DEG: f32 = 0.5;

/// Default yaw delta threshold (degrees).
pub const DEFAULT_YAW_DEG: f32 = 0.5;

// ===== MATERIAL MOVEMENT =====

/// Angular delta beyond which a flagged sample counts toward forced
/// recalibration (degrees).
pub const MATERIAL_ANGLE_DEG: f32 = 1.0;

/// Linear delta beyond which a flagged sample counts toward forced
/// recalibration (g).
pub const MATERIAL_ACCEL_G: f32 = 0.1;

// ===== WAKE-ON-MOTION =====

/// Default wake-on-motion threshold passed to the driver (mg).
pub const DEFAULT_WOM_THRESHOLD_MG: f32 = 15.0;

/// Highest wake-on-motion threshold the hardware register can express (mg).
///
/// 8-bit register at 4 mg/LSB.
pub const MAX_WOM_THRESHOLD_MG: f32 = 1020.0;
