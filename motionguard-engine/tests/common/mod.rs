//! Simulated board for engine integration tests
//!
//! Provides:
//! - A sensor driver with a scriptable FIFO and interrupt status
//! - An interrupt pin that hands the notifier back to the test
//! - A streaming task that feeds one DMP entry per tick, like a running DMP
//!
//! Everything runs on tokio paused time, so cadences are deterministic.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use motionguard_core::{DmpConfig, ModeRequest, OrientationSample, SampleBatch, WomConfig};
use motionguard_engine::{
    DriverError, EngineConfig, ImuDriver, InterruptKind, InterruptPin, IrqNotifier, MemoryStore,
    MotionEngine,
};
use tokio::task::JoinHandle;

pub type SimEngine = MotionEngine<SimDriver, SimPin, MemoryStore>;

/// Everything the simulated sensor and pin share with the test
#[derive(Debug, Default)]
pub struct BoardState {
    pub fifo: VecDeque<OrientationSample>,
    pub data_pending: bool,
    pub motion_pending: bool,
    pub notifier: Option<IrqNotifier>,
    pub pose: OrientationSample,
    pub streaming: bool,

    /// Init calls that still fail before one succeeds
    pub failing_inits: u32,
    pub init_calls: u32,
    pub power_cycles: u32,
    pub deinit_calls: u32,
    pub fifo_resets: u32,
    pub attach_calls: u32,
    pub last_mode: Option<ModeRequest>,
    pub last_wom: Option<WomConfig>,
    pub last_address: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    state: Arc<Mutex<BoardState>>,
}

impl Board {
    pub fn new() -> Self {
        let board = Self::default();
        board.set_pose(OrientationSample::at_rest(0.0, 0.0, 0.0));
        board
    }

    pub fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap()
    }

    pub fn driver(&self) -> SimDriver {
        SimDriver { board: self.clone() }
    }

    pub fn pin(&self) -> SimPin {
        SimPin { board: self.clone() }
    }

    /// Engine on this board with default tunables
    pub fn engine(&self, store: MemoryStore) -> SimEngine {
        MotionEngine::new(self.driver(), self.pin(), store, EngineConfig::default())
    }

    pub fn fail_next_inits(&self, count: u32) {
        self.state().failing_inits = count;
    }

    pub fn set_pose(&self, pose: OrientationSample) {
        self.state().pose = pose;
    }

    /// Queue DMP entries and raise the data interrupt
    pub fn push_samples(&self, samples: &[OrientationSample]) {
        let notifier = {
            let mut state = self.state();
            state.fifo.extend(samples.iter().copied());
            state.data_pending = true;
            state.notifier.clone()
        };
        if let Some(n) = notifier {
            n.notify();
        }
    }

    /// Raise the wake-on-motion interrupt
    pub fn fire_motion(&self) {
        let notifier = {
            let mut state = self.state();
            state.motion_pending = true;
            state.notifier.clone()
        };
        if let Some(n) = notifier {
            n.notify();
        }
    }

    /// Feed the current pose every `period` until [`Board::stop_stream`]
    pub fn start_stream(&self, period: Duration) -> JoinHandle<()> {
        self.state().streaming = true;
        let board = self.clone();
        tokio::spawn(async move {
            loop {
                let pose = {
                    let state = board.state();
                    if !state.streaming {
                        break;
                    }
                    state.pose
                };
                board.push_samples(&[pose]);
                tokio::time::sleep(period).await;
            }
        })
    }

    pub fn stop_stream(&self) {
        self.state().streaming = false;
    }

    pub fn is_attached(&self) -> bool {
        self.state().notifier.is_some()
    }
}

pub struct SimDriver {
    board: Board,
}

impl SimDriver {
    fn init(&mut self, address: u8, mode: ModeRequest) -> Result<(), DriverError> {
        let mut state = self.board.state();
        state.init_calls += 1;
        state.last_address = Some(address);
        if state.failing_inits > 0 {
            state.failing_inits -= 1;
            return Err(DriverError::NotResponding);
        }
        state.last_mode = Some(mode);
        Ok(())
    }
}

impl ImuDriver for SimDriver {
    fn init_dmp(&mut self, address: u8, _config: &DmpConfig) -> Result<(), DriverError> {
        self.init(address, ModeRequest::Dmp)
    }

    fn init_wom(&mut self, address: u8, config: &WomConfig) -> Result<(), DriverError> {
        self.init(address, ModeRequest::Wom)?;
        self.board.state().last_wom = Some(*config);
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), DriverError> {
        let mut state = self.board.state();
        state.deinit_calls += 1;
        state.last_mode = None;
        Ok(())
    }

    fn handle_interrupt(&mut self) -> Result<Option<InterruptKind>, DriverError> {
        let mut state = self.board.state();
        let kind = if state.motion_pending {
            state.motion_pending = false;
            Some(InterruptKind::Motion)
        } else if state.data_pending {
            state.data_pending = false;
            Some(InterruptKind::DataReady)
        } else {
            None
        };

        // Line stays asserted while another source is pending
        if state.motion_pending || state.data_pending {
            if let Some(n) = &state.notifier {
                n.notify();
            }
        }
        Ok(kind)
    }

    fn read_fifo(&mut self, max: usize, out: &mut SampleBatch) -> Result<(), DriverError> {
        let mut state = self.board.state();
        for _ in 0..max {
            let Some(sample) = state.fifo.pop_front() else {
                break;
            };
            if out.push(sample).is_err() {
                break;
            }
        }
        if !state.fifo.is_empty() {
            state.data_pending = true;
            if let Some(n) = &state.notifier {
                n.notify();
            }
        }
        Ok(())
    }

    fn reset_fifo(&mut self) -> Result<(), DriverError> {
        let mut state = self.board.state();
        state.fifo.clear();
        state.data_pending = false;
        state.fifo_resets += 1;
        Ok(())
    }

    fn power_cycle(&mut self) {
        self.board.state().power_cycles += 1;
    }
}

pub struct SimPin {
    board: Board,
}

impl InterruptPin for SimPin {
    fn attach(&mut self, notifier: IrqNotifier) {
        let mut state = self.board.state();
        state.attach_calls += 1;
        state.notifier = Some(notifier);
    }

    fn detach(&mut self) {
        self.board.state().notifier = None;
    }
}

/// Still DMP entry at the given attitude
pub fn still(roll: f32, pitch: f32, yaw: f32) -> OrientationSample {
    OrientationSample::at_rest(roll, pitch, yaw)
}

/// Level entry with extra sensor-frame acceleration on X (g)
pub fn shaken_x(extra_g: f32) -> OrientationSample {
    OrientationSample {
        accel_g: [extra_g, 0.0, 1.0],
        ..OrientationSample::at_rest(0.0, 0.0, 0.0)
    }
}

/// Set up in DMP mode, stream still samples and wait for the baseline
pub async fn calibrated_engine(board: &Board) -> (SimEngine, JoinHandle<()>) {
    let mut engine = board.engine(MemoryStore::new());
    engine.setup(ModeRequest::Dmp).await.unwrap();
    let stream = board.start_stream(Duration::from_millis(20));
    assert!(engine.wait_for_baseline(Duration::from_secs(10)).await);
    (engine, stream)
}
