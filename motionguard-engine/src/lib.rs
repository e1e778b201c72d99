//! Runtime for the MotionGuard core
//!
//! ## Overview
//!
//! `motionguard-core` is pure arithmetic. This crate runs it on a device:
//!
//! - **Interrupt bridge**: the sensor's interrupt line raises a notification;
//!   a task reads the interrupt status over the bus and either publishes the
//!   FIFO batch or records a wake-on-motion event.
//! - **Sample slot**: newest-wins hand-off from the bridge to the consumer.
//! - **Calibration**: learns the resting baseline, aborting on
//!   wake-on-motion.
//! - **Classifier**: every cycle, compares the newest batch against the
//!   baseline and keeps the sticky motion event up to date.
//! - **[`MotionEngine`]**: lifecycle, consume-once motion API and persisted
//!   settings.
//!
//! ## Locking
//!
//! | Lock       | Guards                          | Timeout |
//! |------------|---------------------------------|---------|
//! | bus        | every driver call               | 10 ms   |
//! | slot       | latest FIFO batch               | 30 ms   |
//! | state      | motion event and `last_moved`   | 15/30 ms|
//! | classifier | baseline, counters, energy      | 30 ms   |
//!
//! Every acquisition is bounded. A timeout skips that operation for the
//! cycle and is logged; nothing here is fatal to the host. No lock is held
//! across a sleep.
//!
//! ## Board integration
//!
//! Implement [`ImuDriver`] over the sensor's register interface,
//! [`InterruptPin`] over the GPIO interrupt, and [`SettingsStore`] over
//! the board's non-volatile storage ([`MemoryStore`] stands in on hosts).

mod bridge;
mod calibrate;
mod clock;
mod config;
mod driver;
mod engine;
mod error;
mod lock;
mod shared;
mod slot;
mod store;
mod worker;

pub use clock::EngineClock;
pub use config::{EngineConfig, DEFAULT_I2C_ADDRESS};
pub use driver::{ImuDriver, InterruptKind, InterruptPin, IrqNotifier};
pub use engine::MotionEngine;
pub use error::{DriverError, EngineError, EngineResult};
pub use store::{MemoryStore, StoreError};

pub use motionguard_core::SettingsStore;
