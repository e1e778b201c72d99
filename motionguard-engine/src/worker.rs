//! Classifier task
//!
//! One cycle, every classifier period:
//! 1. drop the baseline if a periodic reset is due
//! 2. calibrate while the baseline is not ready
//! 3. observe and clear any wake-on-motion flag
//! 4. classify the newest batch into the motion state

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{debug, info, warn};
use motionguard_core::{MotionError, MotionResult, RecalibrationReason};

use crate::calibrate::calibrate;
use crate::driver::ImuDriver;
use crate::lock::{lock_within, resource};
use crate::shared::Shared;

pub(crate) async fn run<D: ImuDriver>(shared: Arc<Shared<D>>) {
    info!("Motion classifier started");
    let config = &shared.config;

    while shared.is_running() {
        match cycle(&shared).await {
            Ok(()) => tokio::time::sleep(config.classifier_period).await,
            Err(MotionError::NotRunning) => break,
            Err(MotionError::BusTimeout { resource }) => {
                debug!("Classifier cycle skipped, {} busy", resource);
                tokio::time::sleep(config.classifier_period).await;
            }
            Err(e) if e.is_transient() => {
                warn!("Calibration failed: {}, retrying in {:?}", e, config.calibration_retry);
                tokio::time::sleep(config.calibration_retry).await;
            }
            Err(e) => {
                warn!("Classifier cycle failed: {}", e);
                tokio::time::sleep(config.classifier_period).await;
            }
        }
    }

    info!("Motion classifier stopped");
}

async fn cycle<D: ImuDriver>(shared: &Shared<D>) -> MotionResult<()> {
    let config = &shared.config;
    let now = shared.now();

    let last_moved = lock_within(&shared.state, config.state_lock_timeout, resource::STATE)
        .await?
        .last_moved;

    let ready = {
        let mut classifier =
            lock_within(&shared.classifier, config.state_lock_timeout, resource::CLASSIFIER).await?;
        if classifier.periodic_reset_due(now, last_moved) {
            info!(
                "Periodic recalibration after {} net motion samples",
                classifier.counters().motion_after_baseline
            );
            classifier.reset_baseline(RecalibrationReason::Periodic);
        }
        classifier.baseline().ready
    };

    if !ready {
        calibrate(shared).await?;
    }

    if shared.wom_pending.swap(false, Ordering::AcqRel) {
        info!("Wake-on-motion observed in DMP mode");
    }

    let Some(batch) = shared.slot.take(config.slot_lock_timeout).await? else {
        return Ok(());
    };
    let thresholds = shared.current_thresholds();

    let mut classifier =
        lock_within(&shared.classifier, config.state_lock_timeout, resource::CLASSIFIER).await?;
    let mut state = lock_within(&shared.state, config.state_lock_timeout, resource::STATE).await?;
    let outcome = classifier.classify(&batch, &thresholds, &mut state);

    if outcome.flagged > 0 {
        debug!(
            "{} of {} samples flagged at {}",
            outcome.flagged, outcome.classified, batch.timestamp
        );
    }
    if let Some(reason) = outcome.recalibrate {
        info!("Baseline dropped: {}", reason.as_str());
    }

    Ok(())
}
