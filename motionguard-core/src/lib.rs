//! Motion detection core for MotionGuard
//!
//! Learns a mounting-pose-independent "at rest" reference from DMP samples
//! and classifies later samples as moved or still against it.
//! Designed for battery-powered trackers with an MPU-6500 class IMU.
//!
//! Key constraints:
//! - `no_std` capable, no heap allocation
//! - No clocks or threads here: time comes in as [`Timestamp`] arguments
//! - Pure arithmetic, so every rule is unit-testable off target
//!
//! ```no_run
//! use motionguard_core::{
//!     BaselineAccumulator, MotionClassifier, MotionState, MotionThresholds,
//!     OrientationSample, SampleBatch,
//! };
//!
//! // Learn the baseline from a resting device
//! let mut acc = BaselineAccumulator::new();
//! for _ in 0..50 {
//!     acc.add(&OrientationSample::at_rest(0.0, 0.0, 0.0));
//! }
//! let mut classifier = MotionClassifier::default();
//! classifier.install_baseline(acc.finish(1_000).unwrap());
//!
//! // Classify a tilted sample
//! let batch = SampleBatch::from_slice(&[OrientationSample::at_rest(1.0, 0.0, 0.0)], 2_000);
//! let mut state = MotionState::new(1_000);
//! classifier.classify(&batch, &MotionThresholds::default(), &mut state);
//! assert!(state.event.take().axes.roll);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod baseline;
pub mod buffer;
pub mod classifier;
pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod sample;
pub mod settings;
pub mod time;
pub mod traits;

// Public API
pub use baseline::{Baseline, BaselineAccumulator};
pub use classifier::{
    BatchOutcome, DebounceCounters, Deltas, MotionClassifier, RecalibrationPolicy,
    RecalibrationReason,
};
pub use errors::{MotionError, MotionResult};
pub use events::{AxisFlags, MotionEvent, MotionState};
pub use math::Quaternion;
pub use sample::{OrientationSample, SampleBatch};
pub use settings::{
    DmpConfig, ImuMode, ImuSettings, LowPassFilter, ModeRequest, MotionThresholds, WomConfig,
    WomOutputRate, WomPatch,
};
pub use time::{TimeSource, Timestamp};
pub use traits::SettingsStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
