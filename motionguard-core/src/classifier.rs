//! Delta/threshold motion classifier
//!
//! ## Overview
//!
//! Each DMP entry is compared against the learned [`Baseline`]:
//!
//! ```text
//!                 ┌──────────────┐
//! sample ───────▶ │   Deltas     │──▶ exceeds threshold? ──▶ sticky flags
//!   baseline ───▶ │ 3 accel, 3 ∠ │                           last_moved
//!                 └──────────────┘                           hysteresis
//! ```
//!
//! - Angular deltas are the minimum circular distance, so 359° vs 1° is 2°.
//! - Linear deltas compare gravity-free world-frame magnitudes, so the
//!   result does not depend on mounting pose.
//!
//! ## Hysteresis
//!
//! Two counters keep sensor drift from causing false triggers or endless
//! recalibration:
//!
//! - `motion_after_baseline` goes up on every flagged sample and down on
//!   every quiet one (never below zero). A periodic re-centre is only
//!   allowed once it is high, i.e. the device really moved since the last
//!   baseline, and has since been quiet for a while.
//! - `calibration_debounce` counts flagged samples that are also *material*
//!   (well beyond thresholds). Past its limit the device has settled in a
//!   different pose and the baseline is dropped immediately.

use crate::baseline::Baseline;
use crate::buffer::EnergyBuffer;
use crate::constants::calibration::{CALIBRATION_DEBOUNCE_LIMIT, MOTION_HYSTERESIS_TRIGGER};
use crate::constants::filter::{
    ENERGY_BAND_HIGH_HZ, ENERGY_BAND_LOW_HZ, ENERGY_BUFFER_LEN, ENERGY_SAMPLE_RATE_HZ,
};
use crate::constants::thresholds::{MATERIAL_ACCEL_G, MATERIAL_ANGLE_DEG};
use crate::constants::timing::{MIN_BASELINE_AGE_MS, QUIET_WINDOW_MS};
use crate::events::{AxisFlags, MotionState};
use crate::math::{angle_diff, Biquad};
use crate::sample::{OrientationSample, SampleBatch};
use crate::settings::MotionThresholds;
use crate::time::{window_elapsed, Timestamp};

/// Per-sample distance from the baseline, all non-negative
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deltas {
    /// |linear accel - baseline| per world axis (g)
    pub accel: [f32; 3],
    /// Circular roll distance (degrees)
    pub roll: f32,
    /// Circular pitch distance (degrees)
    pub pitch: f32,
    /// Circular yaw distance (degrees)
    pub yaw: f32,
}

impl Deltas {
    pub fn between(sample: &OrientationSample, baseline: &Baseline) -> Self {
        let lin = sample.linear_accel();
        Self {
            accel: [
                libm::fabsf(lin[0] - baseline.ax),
                libm::fabsf(lin[1] - baseline.ay),
                libm::fabsf(lin[2] - baseline.az),
            ],
            roll: angle_diff(sample.roll, baseline.roll),
            pitch: angle_diff(sample.pitch, baseline.pitch),
            yaw: angle_diff(sample.yaw, baseline.yaw),
        }
    }

    /// Which deltas are strictly above their threshold
    pub fn exceeded(&self, t: &MotionThresholds) -> AxisFlags {
        AxisFlags {
            x: self.accel[0] > t.accel_x,
            y: self.accel[1] > t.accel_y,
            z: self.accel[2] > t.accel_z,
            roll: self.roll > t.roll,
            pitch: self.pitch > t.pitch,
            yaw: self.yaw > t.yaw,
        }
    }

    /// Beyond the coarse bound that counts toward forced recalibration
    pub fn is_material(&self) -> bool {
        self.roll > MATERIAL_ANGLE_DEG
            || self.pitch > MATERIAL_ANGLE_DEG
            || self.yaw > MATERIAL_ANGLE_DEG
            || self.accel.iter().any(|a| *a > MATERIAL_ACCEL_G)
    }
}

/// Limits for both recalibration paths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecalibrationPolicy {
    /// No motion for this long before a periodic reset (ms)
    pub quiet_window_ms: u64,
    /// Baseline must be at least this old (ms)
    pub min_baseline_age_ms: u64,
    /// Net-motion counter must exceed this
    pub hysteresis_trigger: u16,
    /// Material-movement debounce limit
    pub debounce_limit: u16,
}

impl Default for RecalibrationPolicy {
    fn default() -> Self {
        Self {
            quiet_window_ms: QUIET_WINDOW_MS,
            min_baseline_age_ms: MIN_BASELINE_AGE_MS,
            hysteresis_trigger: MOTION_HYSTERESIS_TRIGGER,
            debounce_limit: CALIBRATION_DEBOUNCE_LIMIT,
        }
    }
}

/// Hysteresis counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceCounters {
    /// Material-movement samples since calibration started
    pub calibration_debounce: u16,
    /// Flagged minus quiet samples since the baseline, floored at zero
    pub motion_after_baseline: u16,
}

impl DebounceCounters {
    /// Count a flagged sample; true when the debounce limit trips
    pub fn record_motion(&mut self, material: bool, limit: u16) -> bool {
        self.motion_after_baseline = self.motion_after_baseline.saturating_add(1);
        if !material {
            return false;
        }
        let previous = self.calibration_debounce;
        self.calibration_debounce = previous.saturating_add(1);
        previous > limit
    }

    /// Count a quiet sample
    pub fn record_still(&mut self) {
        self.motion_after_baseline = self.motion_after_baseline.saturating_sub(1);
    }
}

/// Why the classifier dropped its baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecalibrationReason {
    /// Quiet long enough after real movement
    Periodic,
    /// Too many material deltas: settled in a new pose
    Debounce,
    /// Requested by a caller
    Manual,
}

impl RecalibrationReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Periodic => "periodic",
            Self::Debounce => "debounce",
            Self::Manual => "manual",
        }
    }
}

/// What one batch did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchOutcome {
    /// Entries compared against the baseline
    pub classified: usize,
    /// Entries with at least one flag
    pub flagged: usize,
    /// Union of flags set by this batch
    pub flags: AxisFlags,
    /// Set when the batch forced a baseline reset
    pub recalibrate: Option<RecalibrationReason>,
}

/// Baseline-relative motion classifier
///
/// Owns the baseline, the hysteresis counters and the vibration energy
/// history. Single owner; the engine worker drives it.
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    baseline: Baseline,
    counters: DebounceCounters,
    policy: RecalibrationPolicy,
    bandpass: Biquad,
    energy: EnergyBuffer<ENERGY_BUFFER_LEN>,
}

impl Default for MotionClassifier {
    fn default() -> Self {
        Self::new(RecalibrationPolicy::default())
    }
}

impl MotionClassifier {
    pub fn new(policy: RecalibrationPolicy) -> Self {
        Self {
            baseline: Baseline::default(),
            counters: DebounceCounters::default(),
            policy,
            bandpass: Biquad::bandpass(ENERGY_SAMPLE_RATE_HZ, ENERGY_BAND_LOW_HZ, ENERGY_BAND_HIGH_HZ),
            energy: EnergyBuffer::new(),
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn counters(&self) -> &DebounceCounters {
        &self.counters
    }

    pub fn policy(&self) -> &RecalibrationPolicy {
        &self.policy
    }

    /// A calibration pass is starting: clear the material-movement debounce
    pub fn begin_calibration(&mut self) {
        self.counters.calibration_debounce = 0;
    }

    /// Adopt a freshly computed baseline
    pub fn install_baseline(&mut self, baseline: Baseline) {
        self.baseline = baseline;
        self.bandpass.reset();
    }

    /// Invalidate the baseline and clear the net-motion counter
    pub fn reset_baseline(&mut self, reason: RecalibrationReason) {
        log_info!("Dropping baseline ({})", reason.as_str());
        self.baseline.invalidate();
        self.counters.motion_after_baseline = 0;
    }

    /// Quiet window passed, baseline old enough, and real movement happened since
    pub fn periodic_reset_due(&self, now: Timestamp, last_moved: Timestamp) -> bool {
        self.baseline.ready
            && window_elapsed(last_moved, now, self.policy.quiet_window_ms)
            && window_elapsed(self.baseline.last_reset, now, self.policy.min_baseline_age_ms)
            && self.counters.motion_after_baseline > self.policy.hysteresis_trigger
    }

    /// Classify every entry of a batch against the baseline
    ///
    /// Flags accumulate into `state`; nothing is classified while the
    /// baseline is not ready. Stops early if the batch forces a reset.
    pub fn classify(
        &mut self,
        batch: &SampleBatch,
        thresholds: &MotionThresholds,
        state: &mut MotionState,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for sample in batch.iter() {
            if !self.baseline.ready {
                break;
            }

            let deltas = Deltas::between(sample, &self.baseline);
            let flags = deltas.exceeded(thresholds);
            outcome.classified += 1;
            self.push_energy(sample);

            if !flags.any() {
                self.counters.record_still();
                continue;
            }

            log_exceeded(&deltas, &flags);
            outcome.flagged += 1;
            outcome.flags = outcome.flags.union(flags);
            state.record_motion(flags, batch.timestamp);

            if self.counters.record_motion(deltas.is_material(), self.policy.debounce_limit) {
                let reason = RecalibrationReason::Debounce;
                self.reset_baseline(reason);
                outcome.recalibrate = Some(reason);
            }
        }

        outcome
    }

    /// RMS of band-passed linear acceleration over the newest `window` samples (g)
    pub fn vibration_rms(&self, window: usize) -> f32 {
        self.energy.rms_last(window)
    }

    fn push_energy(&mut self, sample: &OrientationSample) {
        let lin = sample.linear_accel();
        let magnitude = libm::sqrtf(lin[0] * lin[0] + lin[1] * lin[1] + lin[2] * lin[2]);
        let filtered = self.bandpass.process(magnitude);
        self.energy.push(filtered);
    }
}

fn log_exceeded(deltas: &Deltas, flags: &AxisFlags) {
    if flags.x {
        log_debug!("Motion diff x = {}", deltas.accel[0]);
    }
    if flags.y {
        log_debug!("Motion diff y = {}", deltas.accel[1]);
    }
    if flags.z {
        log_debug!("Motion diff z = {}", deltas.accel[2]);
    }
    if flags.roll {
        log_debug!("Motion droll = {}", deltas.roll);
    }
    if flags.pitch {
        log_debug!("Motion dpitch = {}", deltas.pitch);
    }
    if flags.yaw {
        log_debug!("Motion dyaw = {}", deltas.yaw);
    }
}
