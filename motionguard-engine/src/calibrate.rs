//! Baseline calibration routine
//!
//! Collects a fixed number of FIFO batches while the device is expected to
//! be still. A wake-on-motion interrupt at any point aborts the pass; a
//! FIFO that stops delivering ends it early with what was collected.

use std::sync::atomic::Ordering;

use log::{debug, info, warn};
use motionguard_core::{Baseline, BaselineAccumulator, MotionError, MotionResult, SampleBatch};
use tokio::time::Instant;

use crate::driver::ImuDriver;
use crate::lock::{lock_within, resource};
use crate::shared::Shared;

pub(crate) async fn calibrate<D: ImuDriver>(shared: &Shared<D>) -> MotionResult<Baseline> {
    let config = &shared.config;

    lock_within(&shared.classifier, config.state_lock_timeout, resource::CLASSIFIER)
        .await?
        .begin_calibration();

    shared.slot.clear(config.slot_lock_timeout).await?;
    shared.wom_pending.store(false, Ordering::Release);

    match lock_within(&shared.bus, config.bus_lock_timeout, resource::BUS).await {
        Ok(mut bus) => {
            if let Err(e) = bus.reset_fifo() {
                warn!("FIFO reset failed: {}", e);
            }
        }
        Err(e) => warn!("FIFO reset skipped: {}", e),
    }

    info!("Baseline calibration started");
    let mut acc = BaselineAccumulator::new();
    for _ in 0..config.baseline_samples {
        if shared.wom_pending.load(Ordering::Acquire) {
            warn!("Baseline calibration aborted by wake-on-motion");
            return Err(MotionError::CalibrationAborted);
        }
        match next_batch(shared).await? {
            Some(batch) => acc.add_batch(&batch),
            None => {
                warn!("No DMP data for {:?}, closing calibration early", config.calibration_sample_timeout);
                break;
            }
        }
    }

    let baseline = acc
        .finish(shared.now())
        .ok_or(MotionError::CalibrationEmpty)?;

    lock_within(&shared.classifier, config.state_lock_timeout, resource::CLASSIFIER)
        .await?
        .install_baseline(baseline);

    let t = shared.current_thresholds();
    info!(
        "Baseline ready from {} samples: accel [{:.4}, {:.4}, {:.4}] g, roll {:.2} pitch {:.2} yaw {:.2}",
        acc.count(),
        baseline.ax,
        baseline.ay,
        baseline.az,
        baseline.roll,
        baseline.pitch,
        baseline.yaw
    );
    info!(
        "Thresholds: accel [{}, {}, {}] g, roll {} pitch {} yaw {}",
        t.accel_x, t.accel_y, t.accel_z, t.roll, t.pitch, t.yaw
    );

    Ok(baseline)
}

/// Sleep-poll the slot for the next batch
///
/// `None` once the per-sample timeout elapses. No lock is held across the
/// sleep.
async fn next_batch<D: ImuDriver>(shared: &Shared<D>) -> MotionResult<Option<SampleBatch>> {
    let config = &shared.config;
    let deadline = Instant::now() + config.calibration_sample_timeout;

    loop {
        if !shared.is_running() {
            return Err(MotionError::NotRunning);
        }
        if shared.wom_pending.load(Ordering::Acquire) {
            warn!("Baseline calibration aborted by wake-on-motion");
            return Err(MotionError::CalibrationAborted);
        }
        if let Some(batch) = shared.slot.take(config.slot_lock_timeout).await? {
            debug!("Calibration batch of {}", batch.len());
            return Ok(Some(batch));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(config.calibration_poll).await;
    }
}
