//! Seams to the board: sensor driver and interrupt line
//!
//! The engine never touches registers or GPIO itself. A board crate
//! implements [`ImuDriver`] over its I2C bus and [`InterruptPin`] over its
//! GPIO interrupt, and the engine drives both.

use motionguard_core::{DmpConfig, SampleBatch, WomConfig};
use tokio::sync::mpsc;

use crate::error::DriverError;

/// Interrupt classes the sensor can raise; DMP and WOM never run together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    /// DMP FIFO has fused samples
    DataReady,
    /// Wake-on-motion threshold crossed
    Motion,
}

/// Register-level sensor driver
///
/// Every method is called with the bus lock held and must not block for
/// long.
pub trait ImuDriver: Send + 'static {
    /// Load DMP firmware and start fused output
    fn init_dmp(&mut self, address: u8, config: &DmpConfig) -> Result<(), DriverError>;

    /// Configure low-power wake-on-motion
    fn init_wom(&mut self, address: u8, config: &WomConfig) -> Result<(), DriverError>;

    /// Power the sensor down and release the bus
    fn deinit(&mut self) -> Result<(), DriverError>;

    /// Read the interrupt status and report which class fired, if any
    fn handle_interrupt(&mut self) -> Result<Option<InterruptKind>, DriverError>;

    /// Read up to `max` fused entries into `out`
    fn read_fifo(&mut self, max: usize, out: &mut SampleBatch) -> Result<(), DriverError>;

    /// Drop whatever is queued in the FIFO
    fn reset_fifo(&mut self) -> Result<(), DriverError>;

    /// Cut and restore sensor power before an init retry
    fn power_cycle(&mut self) {}
}

/// Falling-edge interrupt line from the sensor
pub trait InterruptPin: Send + 'static {
    /// Arm the interrupt; the handler calls [`IrqNotifier::notify`]
    fn attach(&mut self, notifier: IrqNotifier);

    /// Disarm the interrupt and drop the notifier
    fn detach(&mut self);
}

/// Interrupt-context handle into the bridge task
///
/// Backed by a one-slot channel: a notification raised while one is still
/// pending is coalesced, the same way a level flag would be.
#[derive(Debug, Clone)]
pub struct IrqNotifier {
    tx: mpsc::Sender<()>,
}

impl IrqNotifier {
    pub(crate) fn channel() -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Raise the interrupt; never blocks
    pub fn notify(&self) {
        // Full means one is already pending; Closed means the bridge is gone
        let _ = self.tx.try_send(());
    }

    /// Bridge task has exited
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
