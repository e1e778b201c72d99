//! Baseline calibration
//!
//! The baseline is the learned "at rest" reference. Linear acceleration is
//! averaged in the world frame so the reference does not depend on how the
//! unit is mounted; roll, pitch and yaw use a circular mean so a vehicle
//! parked facing north (yaw hovering around 0°/360°) gets a sensible value.
//!
//! [`BaselineAccumulator`] is the pure arithmetic. Collecting the samples
//! (FIFO reset, bounded waits, abort on wake-on-motion) is the engine's job.

use crate::math::CircularMean;
use crate::sample::{OrientationSample, SampleBatch};
use crate::time::Timestamp;

/// Learned resting reference
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Baseline {
    /// Mean absolute world-frame X acceleration (g)
    pub ax: f32,
    /// Mean absolute world-frame Y acceleration (g)
    pub ay: f32,
    /// Mean absolute world-frame Z acceleration minus gravity (g)
    pub az: f32,
    /// Circular-mean roll in `[0, 360)`
    pub roll: f32,
    /// Circular-mean pitch in `[0, 360)`
    pub pitch: f32,
    /// Circular-mean yaw in `[0, 360)`
    pub yaw: f32,
    /// Classification only runs while this is set
    pub ready: bool,
    /// When the baseline was last (re)computed
    pub last_reset: Timestamp,
}

impl Baseline {
    /// Mark the baseline stale; reference values are kept for inspection
    pub fn invalidate(&mut self) {
        self.ready = false;
    }
}

/// Running sums for one calibration pass
#[derive(Debug, Clone, Default)]
pub struct BaselineAccumulator {
    sum_accel: [f32; 3],
    roll: CircularMean,
    pitch: CircularMean,
    yaw: CircularMean,
    count: u32,
}

impl BaselineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one DMP entry
    pub fn add(&mut self, sample: &OrientationSample) {
        let lin = sample.linear_accel();
        for (sum, v) in self.sum_accel.iter_mut().zip(lin) {
            *sum += v;
        }
        self.roll.push(sample.roll);
        self.pitch.push(sample.pitch);
        self.yaw.push(sample.yaw);
        self.count += 1;
    }

    /// Add every entry of a FIFO batch
    pub fn add_batch(&mut self, batch: &SampleBatch) {
        for sample in batch.iter() {
            self.add(sample);
        }
    }

    /// Samples accumulated so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Produce a ready baseline stamped `now`, or `None` with zero samples
    pub fn finish(&self, now: Timestamp) -> Option<Baseline> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f32;

        Some(Baseline {
            ax: self.sum_accel[0] / n,
            ay: self.sum_accel[1] / n,
            az: self.sum_accel[2] / n,
            roll: self.roll.mean()?,
            pitch: self.pitch.mean()?,
            yaw: self.yaw.mean()?,
            ready: true,
            last_reset: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angle_diff;

    #[test]
    fn empty_pass_is_not_ready() {
        assert!(BaselineAccumulator::new().finish(100).is_none());
    }

    #[test]
    fn averages_linear_accel() {
        let mut acc = BaselineAccumulator::new();
        let mut s = OrientationSample::at_rest(0.0, 0.0, 0.0);
        s.accel_g = [0.01, -0.03, 1.02];
        acc.add(&s);
        s.accel_g = [0.03, 0.01, 0.98];
        acc.add(&s);

        let b = acc.finish(5000).unwrap();
        assert!(b.ready);
        assert_eq!(b.last_reset, 5000);
        assert!((b.ax - 0.02).abs() < 1e-6);
        assert!((b.ay - 0.02).abs() < 1e-6);
        assert!((b.az - 0.02).abs() < 1e-5);
    }

    #[test]
    fn yaw_mean_wraps_at_north() {
        let mut acc = BaselineAccumulator::new();
        for yaw in [359.0, 1.0, 358.0, 2.0] {
            acc.add(&OrientationSample::at_rest(-5.0, 3.0, yaw));
        }
        let b = acc.finish(0).unwrap();
        assert!(angle_diff(b.yaw, 0.0) < 1e-3, "yaw = {}", b.yaw);
        assert!((b.roll - 355.0).abs() < 1e-3, "roll = {}", b.roll);
        assert!((b.pitch - 3.0).abs() < 1e-3);
        assert!((0.0..360.0).contains(&b.yaw));
    }

    #[test]
    fn batch_adds_every_entry() {
        let batch = SampleBatch::from_slice(&[OrientationSample::at_rest(0.0, 0.0, 0.0); 4], 0);
        let mut acc = BaselineAccumulator::new();
        acc.add_batch(&batch);
        assert_eq!(acc.count(), 4);
    }

    #[test]
    fn invalidate_keeps_reference() {
        let mut b = Baseline { roll: 12.0, ready: true, ..Baseline::default() };
        b.invalidate();
        assert!(!b.ready);
        assert_eq!(b.roll, 12.0);
    }
}
