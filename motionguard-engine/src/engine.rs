//! Public motion engine handle
//!
//! Owns the driver (behind the bus lock), the interrupt pin and the settings
//! store, and runs the bridge and classifier as tokio tasks between
//! [`MotionEngine::setup`] and [`MotionEngine::shutdown`].

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use motionguard_core::{
    Baseline, DebounceCounters, ImuMode, ImuSettings, LowPassFilter, MotionClassifier,
    MotionError, MotionEvent, ModeRequest, MotionThresholds, RecalibrationReason, SettingsStore,
    Timestamp, WomConfig, WomOutputRate, WomPatch,
};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::EngineConfig;
use crate::driver::{ImuDriver, InterruptPin, IrqNotifier};
use crate::error::{EngineError, EngineResult};
use crate::lock::{lock_within, resource};
use crate::shared::Shared;
use crate::{bridge, worker};

/// Driver init attempts, the second after a power cycle
const INIT_ATTEMPTS: u8 = 2;

/// Motion detection engine
///
/// ```no_run
/// # use motionguard_engine::{EngineConfig, ImuDriver, InterruptPin, MemoryStore, MotionEngine};
/// # use motionguard_core::ModeRequest;
/// # async fn run<D: ImuDriver, P: InterruptPin>(driver: D, pin: P) -> Result<(), motionguard_engine::EngineError> {
/// let mut engine = MotionEngine::new(driver, pin, MemoryStore::new(), EngineConfig::default());
/// engine.setup(ModeRequest::Dmp).await?;
///
/// if engine.get_motion().await?.detected() {
///     // report position
/// }
/// engine.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct MotionEngine<D: ImuDriver, P: InterruptPin, S: SettingsStore> {
    shared: Arc<Shared<D>>,
    pin: P,
    store: S,
    settings: ImuSettings,
    mode: ImuMode,
    tasks: Vec<JoinHandle<()>>,
}

impl<D: ImuDriver, P: InterruptPin, S: SettingsStore> MotionEngine<D, P, S> {
    /// Create a stopped engine; persisted settings are read here and again on setup
    pub fn new(driver: D, pin: P, store: S, config: EngineConfig) -> Self {
        let settings = ImuSettings::load(&store);
        let shared = Arc::new(Shared::new(driver, config));
        shared.thresholds.send_replace(settings.thresholds);

        Self {
            shared,
            pin,
            store,
            settings,
            mode: ImuMode::Off,
            tasks: Vec::new(),
        }
    }

    // ===== LIFECYCLE =====

    /// Initialise the sensor in the requested mode and start the tasks
    ///
    /// Already running engines are shut down first.
    pub async fn setup(&mut self, request: ModeRequest) -> EngineResult<()> {
        if self.is_running() {
            self.shutdown().await?;
        }

        self.settings = ImuSettings::load(&self.store);
        self.shared.thresholds.send_replace(self.settings.thresholds);
        let mode = self.settings.mode_for(request);
        info!("Motion engine setup in {:?} mode", request);

        self.init_driver(&mode).await?;
        if let Err(e) = self.reset_runtime_state().await {
            warn!("Setup failed after sensor init: {}", e);
            self.deinit_driver().await;
            return Err(e);
        }

        let (notifier, irq) = IrqNotifier::channel();
        self.shared.running.store(true, Ordering::Release);

        self.tasks
            .push(tokio::spawn(bridge::run(Arc::clone(&self.shared), irq)));
        if let ImuMode::Dmp(_) = mode {
            self.tasks
                .push(tokio::spawn(worker::run(Arc::clone(&self.shared))));
        }
        self.pin.attach(notifier);

        self.mode = mode;
        Ok(())
    }

    /// Shut down and set up again, picking up persisted settings
    pub async fn restart(&mut self, request: ModeRequest) -> EngineResult<()> {
        info!("Motion engine restart");
        self.shutdown().await?;
        self.setup(request).await
    }

    /// Stop the tasks, power down the sensor and detach the interrupt
    ///
    /// Safe to call any number of times.
    pub async fn shutdown(&mut self) -> EngineResult<()> {
        if !self.is_running() && self.tasks.is_empty() {
            return Ok(());
        }
        info!("Motion engine shutdown");

        self.shared.running.store(false, Ordering::Release);
        self.pin.detach();

        let grace = self.shared.config.shutdown_grace;
        for task in self.tasks.drain(..) {
            let abort = task.abort_handle();
            if tokio::time::timeout(grace, task).await.is_err() {
                warn!("Task still running after {:?}, aborting", grace);
                abort.abort();
            }
        }

        self.deinit_driver().await;
        self.mode = ImuMode::Off;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn mode(&self) -> ImuMode {
        self.mode
    }

    /// Engine clock, milliseconds since construction
    pub fn now(&self) -> Timestamp {
        self.shared.now()
    }

    async fn init_driver(&self, mode: &ImuMode) -> EngineResult<()> {
        let address = self.shared.config.i2c_address;

        for attempt in 1..=INIT_ATTEMPTS {
            let mut bus =
                lock_within(&self.shared.bus, self.shared.config.bus_lock_timeout, resource::BUS)
                    .await?;
            let result = match mode {
                ImuMode::Dmp(config) => bus.init_dmp(address, config),
                ImuMode::Wom(config) => bus.init_wom(address, config),
                ImuMode::Off => Ok(()),
            };

            match result {
                Ok(()) => {
                    info!("Sensor initialised at 0x{:02x} on attempt {}", address, attempt);
                    if let ImuMode::Wom(config) = mode {
                        info!(
                            "Wake-on-motion at {} mg, {} Hz output, {} Hz bandwidth",
                            config.threshold_mg,
                            config.rate.hz(),
                            config.lpf.bandwidth_hz()
                        );
                    }
                    return Ok(());
                }
                Err(e) => {
                    warn!("Sensor init attempt {} failed: {}", attempt, e);
                    if attempt < INIT_ATTEMPTS {
                        bus.power_cycle();
                    }
                }
            }
        }

        Err(MotionError::DriverInit { attempts: INIT_ATTEMPTS }.into())
    }

    async fn deinit_driver(&self) {
        match lock_within(&self.shared.bus, self.shared.config.bus_lock_timeout, resource::BUS).await {
            Ok(mut bus) => {
                if let Err(e) = bus.deinit() {
                    warn!("Sensor deinit failed: {}", e);
                }
            }
            Err(e) => warn!("Sensor deinit skipped: {}", e),
        }
    }

    /// Fresh baseline and empty hand-off state for a new run
    async fn reset_runtime_state(&self) -> EngineResult<()> {
        let config = &self.shared.config;
        *lock_within(&self.shared.classifier, config.state_lock_timeout, resource::CLASSIFIER)
            .await? = MotionClassifier::new(config.policy);
        self.shared.slot.clear(config.slot_lock_timeout).await?;
        self.shared.wom_pending.store(false, Ordering::Release);
        Ok(())
    }

    // ===== MOTION =====

    /// Read and clear everything flagged since the previous call
    pub async fn get_motion(&self) -> EngineResult<MotionEvent> {
        let mut state = self.lock_state().await?;
        Ok(state.event.take())
    }

    /// When motion was last detected
    pub async fn last_moved(&self) -> EngineResult<Timestamp> {
        Ok(self.lock_state().await?.last_moved)
    }

    /// True when nothing has moved for longer than `timeout_ms`
    ///
    /// A contended state lock reads as "moved" so the caller stays awake.
    pub async fn no_motion_since(&self, timeout_ms: u64) -> bool {
        match self.last_moved().await {
            Ok(last) => motionguard_core::time::window_elapsed(last, self.now(), timeout_ms),
            Err(_) => false,
        }
    }

    pub async fn baseline(&self) -> EngineResult<Baseline> {
        Ok(*self.lock_classifier().await?.baseline())
    }

    pub async fn counters(&self) -> EngineResult<DebounceCounters> {
        Ok(*self.lock_classifier().await?.counters())
    }

    /// Drop the baseline; the classifier recalibrates on its next cycle
    pub async fn reset_baseline(&self) -> EngineResult<()> {
        info!("Manual baseline reset");
        self.lock_classifier()
            .await?
            .reset_baseline(RecalibrationReason::Manual);
        Ok(())
    }

    /// Poll until the baseline is ready, at most `timeout`
    pub async fn wait_for_baseline(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(baseline) = self.baseline().await {
                if baseline.ready {
                    return true;
                }
            }
            if !self.is_running() || Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.shared.config.classifier_period).await;
        }
    }

    /// Band-passed vibration RMS over the newest `window` classified samples (g)
    pub async fn vibration_rms(&self, window: usize) -> EngineResult<f32> {
        Ok(self.lock_classifier().await?.vibration_rms(window))
    }

    async fn lock_state(&self) -> EngineResult<tokio::sync::MutexGuard<'_, motionguard_core::MotionState>> {
        Ok(lock_within(&self.shared.state, self.shared.config.state_lock_timeout, resource::STATE).await?)
    }

    async fn lock_classifier(&self) -> EngineResult<tokio::sync::MutexGuard<'_, MotionClassifier>> {
        Ok(lock_within(
            &self.shared.classifier,
            self.shared.config.state_lock_timeout,
            resource::CLASSIFIER,
        )
        .await?)
    }

    // ===== SETTINGS =====

    pub fn thresholds(&self) -> MotionThresholds {
        self.settings.thresholds
    }

    /// Persist new thresholds; the classifier uses them from its next cycle
    ///
    /// On a store error nothing changes, in memory or in the store.
    pub fn set_thresholds(&mut self, thresholds: MotionThresholds) -> EngineResult<()> {
        thresholds.validate()?;
        thresholds
            .save_changes(&self.settings.thresholds, &mut self.store)
            .map_err(EngineError::store)?;
        self.settings.thresholds = thresholds;
        self.shared.thresholds.send_replace(thresholds);
        info!("Motion thresholds updated: {:?}", thresholds);
        Ok(())
    }

    pub fn wom_config(&self) -> WomConfig {
        self.settings.wom
    }

    /// Wake-on-motion threshold (mg); applied on the next restart
    pub fn set_wom_threshold(&mut self, threshold_mg: f32) -> EngineResult<()> {
        let threshold_mg = WomConfig::validate_threshold(threshold_mg)?;
        self.update_wom(|wom| wom.threshold_mg = threshold_mg)
    }

    /// Accelerometer low-pass filter; applied on the next restart
    pub fn set_wom_lpf(&mut self, lpf: LowPassFilter) -> EngineResult<()> {
        self.update_wom(|wom| wom.lpf = lpf)
    }

    /// Low-power output rate; applied on the next restart
    pub fn set_wom_rate(&mut self, rate: WomOutputRate) -> EngineResult<()> {
        self.update_wom(|wom| wom.rate = rate)
    }

    /// Compare against the previous sample; applied on the next restart
    pub fn set_accel_compare(&mut self, enabled: bool) -> EngineResult<()> {
        self.update_wom(|wom| wom.accel_compare = enabled)
    }

    /// Apply a maintenance UI settings document
    ///
    /// Unknown keys and out-of-range values are ignored. Returns true when
    /// anything changed and was persisted.
    pub fn apply_wom_json(&mut self, json: &str) -> EngineResult<bool> {
        let patch: WomPatch = serde_json::from_str(json)?;
        let mut wom = self.settings.wom;
        if !wom.apply(&patch) {
            return Ok(false);
        }
        self.update_wom(|current| *current = wom)?;
        Ok(true)
    }

    /// Current wake-on-motion settings as the maintenance UI reads them
    pub fn wom_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(&self.settings.wom)?)
    }

    fn update_wom(&mut self, change: impl FnOnce(&mut WomConfig)) -> EngineResult<()> {
        let mut wom = self.settings.wom;
        change(&mut wom);
        wom.save_changes(&self.settings.wom, &mut self.store)
            .map_err(EngineError::store)?;
        self.settings.wom = wom;
        info!("Wake-on-motion settings updated: {:?}", wom);
        Ok(())
    }

    /// Settings store, for inspection
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<D: ImuDriver, P: InterruptPin, S: SettingsStore> Drop for MotionEngine<D, P, S> {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.pin.detach();
    }
}
