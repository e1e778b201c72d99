//! Fused orientation samples from the DMP FIFO
//!
//! One FIFO read yields up to [`FIFO_BATCH_SIZE`] entries. The driver fills a
//! [`SampleBatch`], the bridge stamps it with the capture time and publishes
//! it, and the calibrator or classifier consumes it once.

use heapless::Vec;

use crate::constants::calibration::FIFO_BATCH_SIZE;
use crate::math::{world_linear_accel, Quaternion, Vector3};
use crate::time::Timestamp;

/// One fused DMP output entry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrientationSample {
    /// Normalised orientation quaternion
    pub orientation: Quaternion,
    /// Sensor-frame acceleration (g)
    pub accel_g: Vector3,
    /// Device-estimated roll (degrees)
    pub roll: f32,
    /// Device-estimated pitch (degrees)
    pub pitch: f32,
    /// Device-estimated yaw (degrees)
    pub yaw: f32,
}

impl OrientationSample {
    /// Build a sample from the driver's raw Q30 quaternion
    pub fn from_q30(quat: [i32; 4], accel_g: Vector3, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            orientation: Quaternion::from_q30(quat),
            accel_g,
            roll,
            pitch,
            yaw,
        }
    }

    /// Level, motionless sample at the given attitude
    pub fn at_rest(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            orientation: Quaternion::IDENTITY,
            accel_g: [0.0, 0.0, 1.0],
            roll,
            pitch,
            yaw,
        }
    }

    /// Gravity-free world-frame acceleration magnitudes per axis (g)
    pub fn linear_accel(&self) -> Vector3 {
        world_linear_accel(&self.orientation, self.accel_g)
    }
}

/// A FIFO read: up to [`FIFO_BATCH_SIZE`] samples plus when they were captured
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBatch {
    /// Valid entries, oldest first
    pub samples: Vec<OrientationSample, FIFO_BATCH_SIZE>,
    /// Capture time of the read
    pub timestamp: Timestamp,
}

impl SampleBatch {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            samples: Vec::new(),
            timestamp,
        }
    }

    /// Build from a slice, keeping at most [`FIFO_BATCH_SIZE`] entries
    pub fn from_slice(samples: &[OrientationSample], timestamp: Timestamp) -> Self {
        let mut batch = Self::new(timestamp);
        for s in samples.iter().take(FIFO_BATCH_SIZE) {
            // Cannot fail: take() bounds the count
            let _ = batch.samples.push(*s);
        }
        batch
    }

    /// Append a sample; returns it back when the batch is full
    pub fn push(&mut self, sample: OrientationSample) -> Result<(), OrientationSample> {
        self.samples.push(sample)
    }

    /// Number of valid entries
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrientationSample> {
        self.samples.iter()
    }
}
