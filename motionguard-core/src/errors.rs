//! Error Types for the Motion Engine
//!
//! ## Design Philosophy
//!
//! Errors here follow the same rules as the rest of the core:
//!
//! 1. **Small Size**: variants carry at most a couple of integers or a
//!    `&'static str`, so they can be returned from the classifier hot path.
//!
//! 2. **No Heap Allocation**: no `String` payloads.
//!
//! 3. **Copy Semantics**: errors are `Copy` and cheap to log or stash.
//!
//! ## Error Categories
//!
//! ### Transient (retried automatically)
//! - `CalibrationAborted`: a wake-on-motion interrupt fired while the
//!   baseline was being sampled
//! - `CalibrationEmpty`: no sample arrived in the calibration window
//! - `BusTimeout`: a lock on a shared resource could not be taken in time
//!
//! ### Surfaced to the caller
//! - `DriverInit`: the sensor did not come up, even after a power cycle
//! - `InvalidSetting`: a persisted or user-supplied value is out of range
//! - `NotRunning`: an operation needs the engine started
//!
//! None of these are fatal to the host. The worst outcome is "motion
//! detection temporarily unavailable".
//!
//! ```rust
//! use motionguard_core::MotionError;
//!
//! fn on_calibration(result: Result<(), MotionError>) {
//!     match result {
//!         Ok(()) => {}
//!         Err(MotionError::CalibrationAborted) => {
//!             // Vehicle moved while learning, try again next cycle
//!         }
//!         Err(MotionError::BusTimeout { .. }) => {
//!             // Skip this cycle
//!         }
//!         Err(_) => {}
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for motion engine operations
pub type MotionResult<T> = Result<T, MotionError>;

/// Motion engine errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// Sensor driver initialisation failed on every attempt
    #[error("Sensor init failed after {attempts} attempts")]
    DriverInit {
        /// Number of init attempts made, including the retry after power cycle
        attempts: u8,
    },

    /// Wake-on-motion fired while sampling the baseline
    #[error("Baseline calibration aborted by motion interrupt")]
    CalibrationAborted,

    /// Calibration window closed without a single sample
    #[error("Baseline calibration collected no samples")]
    CalibrationEmpty,

    /// Lock on a shared resource not acquired within its timeout
    #[error("Timed out waiting for {resource}")]
    BusTimeout {
        /// Which shared resource was contended
        resource: &'static str,
    },

    /// Setting value outside the accepted range
    #[error("Invalid value for setting {key}")]
    InvalidSetting {
        /// Persisted key of the rejected setting
        key: &'static str,
    },

    /// Engine has not been started or was shut down
    #[error("Motion engine not running")]
    NotRunning,
}

impl MotionError {
    /// Transient errors are retried by the engine on its next cycle
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::CalibrationAborted | Self::CalibrationEmpty | Self::BusTimeout { .. }
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MotionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::DriverInit { attempts } =>
                defmt::write!(fmt, "Sensor init failed after {} attempts", attempts),
            Self::CalibrationAborted =>
                defmt::write!(fmt, "Calibration aborted"),
            Self::CalibrationEmpty =>
                defmt::write!(fmt, "Calibration empty"),
            Self::BusTimeout { resource } =>
                defmt::write!(fmt, "Timeout on {}", resource),
            Self::InvalidSetting { key } =>
                defmt::write!(fmt, "Invalid setting {}", key),
            Self::NotRunning =>
                defmt::write!(fmt, "Not running"),
        }
    }
}
