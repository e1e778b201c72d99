//! Interrupt bridge task
//!
//! The interrupt handler only raises a notification. This task does the
//! bus work: it reads the interrupt status under the bus lock and
//! dispatches to the FIFO reader or the wake-on-motion handler. The bus is
//! released before the slot or motion state is touched.

use std::sync::Arc;

use log::{debug, info, warn};
use motionguard_core::{MotionResult, SampleBatch};
use tokio::sync::mpsc;

use crate::driver::{ImuDriver, InterruptKind};
use crate::lock::{lock_within, resource};
use crate::shared::Shared;

enum Dispatch {
    Samples(SampleBatch),
    Motion,
    Nothing,
}

pub(crate) async fn run<D: ImuDriver>(shared: Arc<Shared<D>>, mut irq: mpsc::Receiver<()>) {
    info!("Interrupt bridge started");
    let poll = shared.config.bridge_poll;
    let mut pending = false;

    while shared.is_running() {
        if !pending {
            match tokio::time::timeout(poll, irq.recv()).await {
                Ok(Some(())) => pending = true,
                Ok(None) => {
                    debug!("Interrupt line detached");
                    break;
                }
                // Poll tick: re-check the running flag
                Err(_) => continue,
            }
        }

        match service(&shared).await {
            Ok(()) => pending = false,
            Err(e) => {
                // Interrupt stays pending and is retried next tick
                warn!("Interrupt deferred: {}", e);
                tokio::time::sleep(poll).await;
            }
        }
    }

    info!("Interrupt bridge stopped");
}

/// Handle one raised interrupt
async fn service<D: ImuDriver>(shared: &Shared<D>) -> MotionResult<()> {
    let captured = shared.now();

    let dispatch = {
        let mut bus = lock_within(&shared.bus, shared.config.bus_lock_timeout, resource::BUS).await?;
        match bus.handle_interrupt() {
            Ok(Some(InterruptKind::DataReady)) => {
                let mut batch = SampleBatch::new(captured);
                match bus.read_fifo(shared.config.fifo_batch, &mut batch) {
                    Ok(()) if batch.is_empty() => Dispatch::Nothing,
                    Ok(()) => Dispatch::Samples(batch),
                    Err(e) => {
                        warn!("FIFO read failed: {}", e);
                        Dispatch::Nothing
                    }
                }
            }
            Ok(Some(InterruptKind::Motion)) => Dispatch::Motion,
            Ok(None) => Dispatch::Nothing,
            Err(e) => {
                warn!("Interrupt status read failed: {}", e);
                Dispatch::Nothing
            }
        }
    };

    match dispatch {
        Dispatch::Samples(batch) => {
            debug!("FIFO batch of {} at {}", batch.len(), captured);
            if let Err(e) = shared.slot.publish(batch, shared.config.slot_lock_timeout).await {
                warn!("Sample batch dropped: {}", e);
            }
        }
        Dispatch::Motion => shared.on_motion_interrupt(captured).await,
        Dispatch::Nothing => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use motionguard_core::{DmpConfig, OrientationSample, WomConfig};

    use crate::config::EngineConfig;
    use crate::driver::IrqNotifier;
    use crate::error::DriverError;

    /// Raises one data interrupt with a single resting sample
    #[derive(Default)]
    struct OneBatch {
        serviced: u32,
    }

    impl ImuDriver for OneBatch {
        fn init_dmp(&mut self, _: u8, _: &DmpConfig) -> Result<(), DriverError> {
            Ok(())
        }
        fn init_wom(&mut self, _: u8, _: &WomConfig) -> Result<(), DriverError> {
            Ok(())
        }
        fn deinit(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn handle_interrupt(&mut self) -> Result<Option<InterruptKind>, DriverError> {
            self.serviced += 1;
            Ok((self.serviced == 1).then_some(InterruptKind::DataReady))
        }
        fn read_fifo(&mut self, _: usize, out: &mut SampleBatch) -> Result<(), DriverError> {
            let _ = out.push(OrientationSample::at_rest(0.0, 0.0, 0.0));
            Ok(())
        }
        fn reset_fifo(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn held_bus_defers_interrupt_until_released() {
        let shared = Arc::new(Shared::new(OneBatch::default(), EngineConfig::default()));
        shared.running.store(true, Ordering::Release);
        let (notifier, irq) = IrqNotifier::channel();

        let bus = shared.bus.lock().await;
        let task = tokio::spawn(run(Arc::clone(&shared), irq));
        notifier.notify();

        // Several bus timeouts pass; nothing is read or published
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!shared.slot.is_ready());
        assert_eq!(bus.serviced, 0);
        drop(bus);

        // The same interrupt is serviced once the bus frees up
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(shared.slot.is_ready());
        let batch = shared
            .slot
            .take(Duration::from_millis(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(shared.bus.lock().await.serviced, 1);

        shared.running.store(false, Ordering::Release);
        task.await.unwrap();
    }
}
