//! Engine error types

use motionguard_core::MotionError;
use thiserror::Error;

/// Errors reported by a sensor driver implementation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    #[error("Bus transfer failed")]
    Bus,

    #[error("Device not responding")]
    NotResponding,

    #[error("FIFO read failed")]
    Fifo,

    #[error("DMP firmware load failed")]
    Firmware,
}

/// Errors surfaced by [`crate::MotionEngine`]
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Settings store error: {0}")]
    Store(String),

    #[error("Invalid settings document: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Store errors are only `Debug`, so they are flattened to text
    pub(crate) fn store<E: core::fmt::Debug>(err: E) -> Self {
        Self::Store(format!("{:?}", err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
