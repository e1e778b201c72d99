//! Math helpers for orientation and vibration processing
//!
//! - [`Quaternion`]: Q30 conversion and world-frame rotation
//! - [`angle_diff`], [`wrap_degrees`], [`CircularMean`]: wrapped-angle arithmetic
//! - [`Biquad`]: band-pass filter for vibration energy

pub mod angles;
pub mod filter;
pub mod quaternion;

pub use angles::{angle_diff, wrap_degrees, CircularMean};
pub use filter::Biquad;
pub use quaternion::{Quaternion, Vector3};

use crate::constants::calibration::GRAVITY_G;

/// World-frame linear acceleration magnitudes per axis (g)
///
/// Rotates the sensor reading into the world frame, removes 1 g from the
/// vertical axis and takes the absolute value of each component.
pub fn world_linear_accel(orientation: &Quaternion, accel_g: Vector3) -> Vector3 {
    let world = orientation.rotate(accel_g);
    [
        libm::fabsf(world[0]),
        libm::fabsf(world[1]),
        libm::fabsf(world[2] - GRAVITY_G),
    ]
}
