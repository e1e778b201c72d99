//! State shared between the engine handle and its tasks

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use motionguard_core::{
    MotionClassifier, MotionState, MotionThresholds, TimeSource, Timestamp,
};
use tokio::sync::{watch, Mutex};

use crate::clock::EngineClock;
use crate::config::EngineConfig;
use crate::lock::{lock_within, resource};
use crate::slot::SampleSlot;

pub(crate) struct Shared<D> {
    /// Sensor bus; every driver call happens under this lock
    pub bus: Mutex<D>,
    pub slot: SampleSlot,
    pub state: Mutex<MotionState>,
    pub classifier: Mutex<MotionClassifier>,
    /// Latest thresholds; the classifier reads them every cycle
    pub thresholds: watch::Sender<MotionThresholds>,
    /// Wake-on-motion fired since last observed
    pub wom_pending: AtomicBool,
    pub running: AtomicBool,
    pub clock: EngineClock,
    pub config: EngineConfig,
}

impl<D> Shared<D> {
    pub fn new(driver: D, config: EngineConfig) -> Self {
        let clock = EngineClock::new();
        let (thresholds, _) = watch::channel(MotionThresholds::default());
        Self {
            bus: Mutex::new(driver),
            slot: SampleSlot::new(),
            state: Mutex::new(MotionState::new(clock.now())),
            classifier: Mutex::new(MotionClassifier::new(config.policy)),
            thresholds,
            wom_pending: AtomicBool::new(false),
            running: AtomicBool::new(false),
            clock,
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn current_thresholds(&self) -> MotionThresholds {
        *self.thresholds.borrow()
    }

    /// Wake-on-motion callback body
    pub async fn on_motion_interrupt(&self, at: Timestamp) {
        self.wom_pending.store(true, Ordering::Release);
        info!("Wake-on-motion interrupt at {}", at);

        match lock_within(&self.state, self.config.wom_lock_timeout, resource::STATE).await {
            Ok(mut state) => state.record_interrupt(at),
            Err(e) => warn!("Wake-on-motion not recorded: {}", e),
        }
    }
}
