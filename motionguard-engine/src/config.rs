//! Engine tunables
//!
//! Defaults come from [`motionguard_core::constants`]; boards override the
//! bus address and tests shorten the waits.

use std::time::Duration;

use motionguard_core::constants::calibration::{BASELINE_SAMPLES, FIFO_BATCH_SIZE};
use motionguard_core::constants::timing::{
    BRIDGE_POLL_MS, BUS_LOCK_TIMEOUT_MS, CALIBRATION_POLL_MS, CALIBRATION_RETRY_MS,
    CALIBRATION_SAMPLE_TIMEOUT_MS, CLASSIFIER_PERIOD_MS, SHUTDOWN_GRACE_MS, SLOT_LOCK_TIMEOUT_MS,
    STATE_LOCK_TIMEOUT_MS, WOM_LOCK_TIMEOUT_MS,
};
use motionguard_core::RecalibrationPolicy;

/// 7-bit address of the IMU with AD0 low
pub const DEFAULT_I2C_ADDRESS: u8 = 0x68;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Sensor bus address passed to the driver on init
    pub i2c_address: u8,
    /// Batches collected per baseline
    pub baseline_samples: u16,
    /// Maximum FIFO entries read per interrupt
    pub fifo_batch: usize,
    /// Periodic and debounce recalibration rules
    pub policy: RecalibrationPolicy,

    pub bridge_poll: Duration,
    pub classifier_period: Duration,
    pub calibration_retry: Duration,
    pub calibration_poll: Duration,
    pub calibration_sample_timeout: Duration,

    pub bus_lock_timeout: Duration,
    pub slot_lock_timeout: Duration,
    pub wom_lock_timeout: Duration,
    pub state_lock_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            i2c_address: DEFAULT_I2C_ADDRESS,
            baseline_samples: BASELINE_SAMPLES,
            fifo_batch: FIFO_BATCH_SIZE,
            policy: RecalibrationPolicy::default(),
            bridge_poll: Duration::from_millis(BRIDGE_POLL_MS),
            classifier_period: Duration::from_millis(CLASSIFIER_PERIOD_MS),
            calibration_retry: Duration::from_millis(CALIBRATION_RETRY_MS),
            calibration_poll: Duration::from_millis(CALIBRATION_POLL_MS),
            calibration_sample_timeout: Duration::from_millis(CALIBRATION_SAMPLE_TIMEOUT_MS),
            bus_lock_timeout: Duration::from_millis(BUS_LOCK_TIMEOUT_MS),
            slot_lock_timeout: Duration::from_millis(SLOT_LOCK_TIMEOUT_MS),
            wom_lock_timeout: Duration::from_millis(WOM_LOCK_TIMEOUT_MS),
            state_lock_timeout: Duration::from_millis(STATE_LOCK_TIMEOUT_MS),
            shutdown_grace: Duration::from_millis(SHUTDOWN_GRACE_MS),
        }
    }
}

impl EngineConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.i2c_address = address;
        self
    }

    pub fn with_baseline_samples(mut self, samples: u16) -> Self {
        self.baseline_samples = samples.max(1);
        self
    }

    pub fn with_policy(mut self, policy: RecalibrationPolicy) -> Self {
        self.policy = policy;
        self
    }
}
