//! Angle helpers for wrapped orientation data
//!
//! Roll, pitch and yaw from the DMP wrap at ±180°/360°. Plain subtraction
//! and plain averaging both break at the seam: 359° and 1° are 2° apart, and
//! their mean is 0°, not 180°.

use core::f32::consts::PI;

/// Fold any angle in degrees into `[0, 360)`
pub fn wrap_degrees(angle: f32) -> f32 {
    let folded = libm::fmodf(angle, 360.0);
    let folded = if folded < 0.0 { folded + 360.0 } else { folded };
    // -1e-6 + 360.0 rounds to 360.0 in f32
    if folded >= 360.0 { 0.0 } else { folded }
}

/// Minimum circular distance between two angles in degrees, in `[0, 180]`
///
/// ```rust
/// use motionguard_core::math::angle_diff;
///
/// assert_eq!(angle_diff(359.0, 1.0), 2.0);
/// assert_eq!(angle_diff(1.0, 359.0), 2.0);
/// ```
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let d = wrap_degrees(a - b);
    if d > 180.0 { 360.0 - d } else { d }
}

/// Running circular mean of angles in degrees
///
/// Accumulates `sin` and `cos` of each angle; the mean direction is
/// `atan2(Σsin, Σcos)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircularMean {
    sum_sin: f32,
    sum_cos: f32,
    count: u32,
}

impl CircularMean {
    pub const fn new() -> Self {
        Self { sum_sin: 0.0, sum_cos: 0.0, count: 0 }
    }

    /// Add one angle in degrees
    pub fn push(&mut self, degrees: f32) {
        let rad = degrees * PI / 180.0;
        self.sum_sin += libm::sinf(rad);
        self.sum_cos += libm::cosf(rad);
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean direction in `[0, 360)`, `None` before the first sample
    pub fn mean(&self) -> Option<f32> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f32;
        let rad = libm::atan2f(self.sum_sin / n, self.sum_cos / n);
        Some(wrap_degrees(rad * 180.0 / PI))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn diff_across_seam() {
        assert_eq!(angle_diff(359.0, 1.0), 2.0);
        assert_eq!(angle_diff(-179.0, 179.0), 2.0);
        assert_eq!(angle_diff(0.0, 180.0), 180.0);
        assert_eq!(angle_diff(90.0, 90.0), 0.0);
    }

    #[test]
    fn wrap_folds_negative() {
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        assert_eq!(wrap_degrees(359.5), 359.5);
    }

    #[test]
    fn circular_mean_across_seam() {
        let mut mean = CircularMean::new();
        mean.push(359.0);
        mean.push(1.0);
        let m = mean.mean().unwrap();
        // Either just above 0 or just below 360
        assert!(angle_diff(m, 0.0) < 1e-3, "mean = {}", m);
    }

    #[test]
    fn circular_mean_empty() {
        assert_eq!(CircularMean::new().mean(), None);
    }

    #[test]
    fn circular_mean_negative_inputs() {
        let mut mean = CircularMean::new();
        for a in [-10.0, -12.0, -8.0] {
            mean.push(a);
        }
        let m = mean.mean().unwrap();
        assert!((m - 350.0).abs() < 1e-3, "mean = {}", m);
    }

    proptest! {
        #[test]
        fn diff_is_symmetric_and_bounded(a in -720.0f32..720.0, b in -720.0f32..720.0) {
            let ab = angle_diff(a, b);
            let ba = angle_diff(b, a);
            prop_assert!((0.0..=180.0).contains(&ab));
            prop_assert!((ab - ba).abs() < 1e-3);
        }

        #[test]
        fn wrap_in_range(a in -10_000.0f32..10_000.0) {
            let w = wrap_degrees(a);
            prop_assert!((0.0..360.0).contains(&w));
        }
    }
}
